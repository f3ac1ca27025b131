//! One 60Hz frame of emulation: input, instructions, timers, present.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::{Audio, Silence};
use crate::display::Display;
use crate::input::{Flow, Input, NoInput};
use crate::sound::Tone;
use crate::vm::{Env, Vm};
use crate::Result;

pub const DEFAULT_INSTRUCTIONS_PER_TICK: usize = 700;

pub struct Scheduler {
    vm: Vm,
    display: Box<dyn Display>,
    input: Box<dyn Input>,
    audio: Box<dyn Audio>,
    rng: StdRng,
    instructions_per_tick: usize,
}

impl Scheduler {
    pub fn new(vm: Vm, display: Box<dyn Display>, input: Box<dyn Input>, audio: Box<dyn Audio>) -> Scheduler {
        Scheduler {
            vm,
            display,
            input,
            audio,
            rng: StdRng::from_entropy(),
            instructions_per_tick: DEFAULT_INSTRUCTIONS_PER_TICK,
        }
    }

    pub fn with_instructions_per_tick(mut self, instructions_per_tick: usize) -> Scheduler {
        self.instructions_per_tick = instructions_per_tick;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Scheduler {
        self.rng = rng;
        self
    }

    pub fn instructions_per_tick(&self) -> usize {
        self.instructions_per_tick
    }

    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut Vm {
        &mut self.vm
    }

    /// Drops the backends and hands back the engine.
    pub fn into_vm(self) -> Vm {
        self.vm
    }

    /// Runs one frame.
    ///
    /// A fault is returned only after the timers ticked and the frame was
    /// presented; later ticks keep doing both without executing anything.
    pub fn tick(&mut self) -> Result<Flow> {
        match self.input.pump_events() {
            Ok(Flow::Quit) => return Ok(Flow::Quit),
            Ok(Flow::Continue) => {}
            Err(e) => {
                warn!("input backend failed, ignoring keys from now on: {}", e);
                self.input = Box::new(NoInput);
            }
        }

        let fault = if self.vm.is_halted() { None } else { self.run_instructions().err() };

        if let Some(tone) = self.vm.tick_timers() {
            self.sound(tone);
        }

        self.display.present()?;

        match fault {
            Some(e) => Err(e),
            None => Ok(Flow::Continue),
        }
    }

    fn run_instructions(&mut self) -> Result<()> {
        let mut env = Env {
            display: &mut *self.display,
            input: &mut *self.input,
            rng: &mut self.rng,
        };

        for _ in 0..self.instructions_per_tick {
            self.vm.step(&mut env)?;
            if self.vm.waiting_for_key().is_some() {
                break;
            }
        }
        Ok(())
    }

    fn sound(&mut self, tone: Tone) {
        let result = match tone {
            Tone::Start => self.audio.on_sound_start(),
            Tone::Stop => self.audio.on_sound_stop(),
        };
        if let Err(e) = result {
            warn!("audio backend failed, muting: {}", e);
            self.audio = Box::new(Silence);
        }
    }

    /// Stops a tone that is still playing. Call before dropping the backends.
    pub fn shutdown(&mut self) {
        if self.vm.silence() {
            self.sound(Tone::Stop);
        }
    }
}
