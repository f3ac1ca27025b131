use crate::Result;

/// Buzzer driven by `Tone` edges of the sound timer.
pub trait Audio {
    fn on_sound_start(&mut self) -> Result<()>;

    /// Only continuous-tone backends need to act on this.
    fn on_sound_stop(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Silence;

impl Audio for Silence {
    fn on_sound_start(&mut self) -> Result<()> {
        Ok(())
    }
}
