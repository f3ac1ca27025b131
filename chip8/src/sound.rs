//! Sound timer with edge-triggered tone cues.

/// A change in whether the buzzer should be audible.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tone {
    Start,
    Stop,
}

/// Counts down like the delay timer, but reports a `Tone::Start` once per
/// sound and a `Tone::Stop` on the first silent tick after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundTimer {
    left: u8,
    sounding: bool,
    audible: bool,
}

impl SoundTimer {
    pub fn new() -> SoundTimer {
        SoundTimer {
            left: 0,
            sounding: false,
            audible: false,
        }
    }

    pub fn set(&mut self, ticks: u8) {
        self.left = ticks;
    }

    pub fn get(&self) -> u8 {
        self.left
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    pub fn tick(&mut self) -> Option<Tone> {
        if self.left == 0 {
            self.sounding = false;
            if self.audible {
                self.audible = false;
                return Some(Tone::Stop);
            }
            return None;
        }

        let cue = if self.sounding {
            None
        } else {
            self.sounding = true;
            self.audible = true;
            Some(Tone::Start)
        };

        self.left -= 1;
        if self.left == 0 {
            self.sounding = false;
        }
        cue
    }

    /// Zeroes the timer. Returns whether a started tone was never stopped.
    pub fn silence(&mut self) -> bool {
        let audible = self.audible;
        self.left = 0;
        self.sounding = false;
        self.audible = false;
        audible
    }
}
