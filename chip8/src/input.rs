use crate::Result;

pub const KEY_COUNT: usize = 16;

/// What the host loop should do after pumping events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A 16-key hexadecimal keypad.
///
/// `wait_for_key` never blocks. It hands out each press at most once; the
/// engine retries `Fx0A` on the next tick until it gets one.
pub trait Input {
    /// Drains host events. Called once per tick, before any instruction runs.
    fn pump_events(&mut self) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    /// Cheap refresh of the key state, called before every instruction.
    fn refresh(&mut self) {}

    fn is_pressed(&self, key: u8) -> bool;

    /// Takes the most recent press not handed out yet.
    fn wait_for_key(&mut self) -> Option<u8>;

    /// Forgets presses that happened before a wait began.
    fn flush_presses(&mut self) {}
}

/// Key state table shared by the backends, and usable on its own to script
/// input in tests and headless runs.
#[derive(Clone, Debug, Default)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
    last_press: Option<u8>,
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad::default()
    }

    pub fn press(&mut self, key: u8) {
        if let Some(held) = self.keys.get_mut(key as usize) {
            *held = true;
            self.last_press = Some(key);
        }
    }

    pub fn release(&mut self, key: u8) {
        if let Some(held) = self.keys.get_mut(key as usize) {
            *held = false;
        }
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}

impl Input for Keypad {
    fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).cloned().unwrap_or(false)
    }

    fn wait_for_key(&mut self) -> Option<u8> {
        self.last_press.take()
    }

    fn flush_presses(&mut self) {
        self.last_press = None;
    }
}

/// Input that never has a key down. Stands in for a failed backend.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoInput;

impl Input for NoInput {
    fn is_pressed(&self, _key: u8) -> bool {
        false
    }

    fn wait_for_key(&mut self) -> Option<u8> {
        None
    }
}
