use std::io::{self, Write};

use chip8::Audio;

/// Rings the terminal bell once per sound.
pub struct Bell;

impl Audio for Bell {
    fn on_sound_start(&mut self) -> chip8::Result<()> {
        let mut out = io::stdout();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(feature = "sdl")]
pub use self::square::Beeper;

#[cfg(feature = "sdl")]
mod square {
    use chip8::Audio;
    use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};
    use sdl2::AudioSubsystem;

    const SAMPLE_RATE: i32 = 44_100;
    const TONE_HZ: f32 = 440.0;
    const VOLUME: f32 = 0.15;

    pub struct SquareWave {
        phase_inc: f32,
        phase: f32,
    }

    impl AudioCallback for SquareWave {
        type Channel = f32;

        fn callback(&mut self, out: &mut [f32]) {
            for sample in out.iter_mut() {
                *sample = if self.phase < 0.5 { VOLUME } else { -VOLUME };
                self.phase = (self.phase + self.phase_inc) % 1.0;
            }
        }
    }

    /// Continuous tone for as long as the sound timer runs.
    pub struct Beeper {
        device: AudioDevice<SquareWave>,
    }

    impl Beeper {
        pub fn new(audio: &AudioSubsystem) -> crate::Result<Beeper> {
            let desired = AudioSpecDesired {
                freq: Some(SAMPLE_RATE),
                channels: Some(1),
                samples: None,
            };
            let device = audio.open_playback(None, &desired, |spec| SquareWave {
                phase_inc: TONE_HZ / spec.freq as f32,
                phase: 0.0,
            })?;
            Ok(Beeper { device })
        }
    }

    impl Audio for Beeper {
        fn on_sound_start(&mut self) -> chip8::Result<()> {
            self.device.resume();
            Ok(())
        }

        fn on_sound_stop(&mut self) -> chip8::Result<()> {
            self.device.pause();
            Ok(())
        }
    }
}
