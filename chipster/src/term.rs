//! Console backend: half-block rendering and raw-mode keyboard input.

use std::io::{self, Stdout, Write};
use std::rc::Rc;
use std::time::Duration;

use chip8::display::{HEIGHT, WIDTH};
use chip8::{Display, Flow, FrameBuffer, Input, Keypad};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use crate::keymap::key_for_char;

/// Terminals report presses but not releases, so a key counts as held for
/// this many ticks after its last press or auto-repeat. Must outlast the
/// keyboard's auto-repeat delay.
const HOLD_TICKS: u8 = 40;

/// Raw mode and the alternate screen, restored when the last holder drops it.
pub struct Session {
    _private: (),
}

impl Session {
    pub fn start() -> io::Result<Rc<Session>> {
        terminal::enable_raw_mode()?;
        let session = Session { _private: () };
        execute!(io::stdout(), EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Rc::new(session))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub struct TermDisplay {
    _session: Rc<Session>,
    fb: FrameBuffer,
    out: Stdout,
}

impl TermDisplay {
    pub fn new(session: Rc<Session>) -> io::Result<TermDisplay> {
        let (cols, rows) = terminal::size()?;
        if (cols as usize) < WIDTH || (rows as usize) < HEIGHT / 2 {
            warn!("terminal is {}x{}, the screen needs {}x{}", cols, rows, WIDTH, HEIGHT / 2);
        }

        Ok(TermDisplay {
            _session: session,
            fb: FrameBuffer::new(),
            out: io::stdout(),
        })
    }
}

/// Two pixel rows per text row.
fn half_block(top: bool, bottom: bool) -> char {
    match (top, bottom) {
        (true, true) => '█',
        (true, false) => '▀',
        (false, true) => '▄',
        (false, false) => ' ',
    }
}

fn render_line(fb: &FrameBuffer, row: usize) -> String {
    (0..WIDTH)
        .map(|x| half_block(fb.get(x, row * 2), fb.get(x, row * 2 + 1)))
        .collect()
}

impl Display for TermDisplay {
    fn clear(&mut self) {
        self.fb.clear();
    }

    fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8], wrap: bool) -> bool {
        self.fb.draw_sprite(x, y, rows, wrap)
    }

    fn present(&mut self) -> chip8::Result<()> {
        if !self.fb.take_dirty() {
            return Ok(());
        }

        for row in 0..HEIGHT / 2 {
            let line = render_line(&self.fb, row);
            queue!(self.out, MoveTo(0, row as u16), Print(line))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Key state for an input source that only reports presses.
struct HeldKeys {
    keypad: Keypad,
    held: [u8; 16],
}

impl HeldKeys {
    fn new() -> HeldKeys {
        HeldKeys {
            keypad: Keypad::new(),
            held: [0; 16],
        }
    }

    fn press(&mut self, key: u8) {
        self.keypad.press(key);
        self.held[key as usize] = HOLD_TICKS;
    }

    /// Called once per tick, before new presses are read.
    fn decay(&mut self) {
        for (key, left) in self.held.iter_mut().enumerate() {
            if *left > 0 {
                *left -= 1;
                if *left == 0 {
                    self.keypad.release(key as u8);
                }
            }
        }
    }
}

pub struct TermInput {
    _session: Rc<Session>,
    keys: HeldKeys,
}

impl TermInput {
    pub fn new(session: Rc<Session>) -> TermInput {
        TermInput {
            _session: session,
            keys: HeldKeys::new(),
        }
    }
}

impl Input for TermInput {
    fn pump_events(&mut self) -> chip8::Result<Flow> {
        self.keys.decay();

        while event::poll(Duration::from_millis(0))? {
            let (code, modifiers) = match event::read()? {
                Event::Key(KeyEvent { code, modifiers, .. }) => (code, modifiers),
                _ => continue,
            };

            match code {
                KeyCode::Esc => return Ok(Flow::Quit),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(Flow::Quit),
                KeyCode::Char(c) => match key_for_char(c) {
                    Some(key) => self.keys.press(key),
                    None => debug!("unmapped key {:?}", c),
                },
                other => debug!("unmapped key {:?}", other),
            }
        }

        Ok(Flow::Continue)
    }

    fn is_pressed(&self, key: u8) -> bool {
        self.keys.keypad.is_pressed(key)
    }

    fn wait_for_key(&mut self) -> Option<u8> {
        self.keys.keypad.wait_for_key()
    }

    fn flush_presses(&mut self) {
        self.keys.keypad.flush_presses()
    }
}
