#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use chip8::{Audio, Display, FrameBuffer, Input, Keypad, Result};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn assemble(program: &[u16]) -> Vec<u8> {
    program.iter().flat_map(|word| vec![(word >> 8) as u8, *word as u8]).collect()
}

/// Display that renders into a buffer the test keeps a handle to.
pub struct SharedDisplay {
    pub fb: Rc<RefCell<FrameBuffer>>,
    pub presented: Rc<RefCell<usize>>,
}

impl SharedDisplay {
    pub fn new() -> SharedDisplay {
        SharedDisplay {
            fb: Rc::new(RefCell::new(FrameBuffer::new())),
            presented: Rc::new(RefCell::new(0)),
        }
    }

    pub fn handle(&self) -> SharedDisplay {
        SharedDisplay {
            fb: self.fb.clone(),
            presented: self.presented.clone(),
        }
    }
}

impl Display for SharedDisplay {
    fn clear(&mut self) {
        self.fb.borrow_mut().clear();
    }

    fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8], wrap: bool) -> bool {
        self.fb.borrow_mut().draw_sprite(x, y, rows, wrap)
    }

    fn present(&mut self) -> Result<()> {
        *self.presented.borrow_mut() += 1;
        Ok(())
    }
}

/// Keypad the test can press keys on while the scheduler owns it.
#[derive(Clone)]
pub struct SharedKeypad {
    pub keypad: Rc<RefCell<Keypad>>,
    pub quit: Rc<RefCell<bool>>,
    pub fail_pump: Rc<RefCell<bool>>,
}

impl SharedKeypad {
    pub fn new() -> SharedKeypad {
        SharedKeypad {
            keypad: Rc::new(RefCell::new(Keypad::new())),
            quit: Rc::new(RefCell::new(false)),
            fail_pump: Rc::new(RefCell::new(false)),
        }
    }
}

impl Input for SharedKeypad {
    fn pump_events(&mut self) -> Result<chip8::Flow> {
        if *self.fail_pump.borrow() {
            return Err("input device unplugged".into());
        }
        if *self.quit.borrow() {
            return Ok(chip8::Flow::Quit);
        }
        Ok(chip8::Flow::Continue)
    }

    fn is_pressed(&self, key: u8) -> bool {
        self.keypad.borrow().is_pressed(key)
    }

    fn wait_for_key(&mut self) -> Option<u8> {
        self.keypad.borrow_mut().wait_for_key()
    }

    fn flush_presses(&mut self) {
        self.keypad.borrow_mut().flush_presses()
    }
}

#[derive(Clone)]
pub struct RecordingAudio {
    pub events: Rc<RefCell<Vec<&'static str>>>,
    pub fail: bool,
}

impl RecordingAudio {
    pub fn new() -> RecordingAudio {
        RecordingAudio {
            events: Rc::new(RefCell::new(Vec::new())),
            fail: false,
        }
    }
}

impl Audio for RecordingAudio {
    fn on_sound_start(&mut self) -> Result<()> {
        self.events.borrow_mut().push("start");
        if self.fail {
            return Err("audio device lost".into());
        }
        Ok(())
    }

    fn on_sound_stop(&mut self) -> Result<()> {
        self.events.borrow_mut().push("stop");
        Ok(())
    }
}
