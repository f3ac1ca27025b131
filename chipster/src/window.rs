//! SDL2 window backend.

use chip8::display::{HEIGHT, WIDTH};
use chip8::{Audio, Display, Flow, FrameBuffer, Input, Keypad};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::EventPump;

use crate::beep::Beeper;
use crate::{Error, Result};

const CLEAR_COLOR: Color = Color::RGB(250, 242, 219);
const SOLID_COLOR: Color = Color::RGB(5, 31, 38);

pub struct WindowDisplay {
    canvas: Canvas<Window>,
    fb: FrameBuffer,
    scale: u32,
}

pub struct WindowInput {
    events: EventPump,
    keypad: Keypad,
}

/// Opens the window, its event pump and, unless muted, a tone generator.
pub fn open(scale: u32, mute: bool) -> Result<(WindowDisplay, WindowInput, Option<Box<dyn Audio>>)> {
    let ctx = sdl2::init()?;
    let video_ctx = ctx.video()?;
    let window = video_ctx
        .window("chipster", WIDTH as u32 * scale, HEIGHT as u32 * scale)
        .position_centered()
        .build()
        .map_err(|e| e.to_string())?;
    let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
    let events = ctx.event_pump()?;

    let audio: Option<Box<dyn Audio>> = if mute {
        None
    } else {
        match ctx.audio().map_err(Error::from).and_then(|audio| Beeper::new(&audio)) {
            Ok(beeper) => Some(Box::new(beeper)),
            Err(e) => {
                warn!("no audio device, falling back to the terminal bell: {}", e);
                None
            }
        }
    };

    let display = WindowDisplay {
        canvas,
        fb: FrameBuffer::new(),
        scale,
    };
    let input = WindowInput {
        events,
        keypad: Keypad::new(),
    };
    Ok((display, input, audio))
}

impl Display for WindowDisplay {
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

        self.canvas.set_draw_color(CLEAR_COLOR);
        self.canvas.clear();

        self.canvas.set_draw_color(SOLID_COLOR);
        let scale = self.scale;
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                if self.fb.get(x, y) {
                    let rect = Rect::new(x as i32 * scale as i32, y as i32 * scale as i32, scale, scale);
                    self.canvas.fill_rect(rect)?;
                }
            }
        }

        self.canvas.present();
        Ok(())
    }
}

impl Input for WindowInput {
    fn pump_events(&mut self) -> chip8::Result<Flow> {
        for event in self.events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => {
                    return Ok(Flow::Quit);
                }

                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => match map_keycode(keycode) {
                    Some(key) => self.keypad.press(key),
                    None => debug!("unmapped key {:?}", keycode),
                },
                Event::KeyUp {
                    keycode: Some(keycode), ..
                } => {
                    if let Some(key) = map_keycode(keycode) {
                        self.keypad.release(key);
                    }
                }
                _ => {}
            }
        }
        Ok(Flow::Continue)
    }

    fn is_pressed(&self, key: u8) -> bool {
        self.keypad.is_pressed(key)
    }

    fn wait_for_key(&mut self) -> Option<u8> {
        self.keypad.wait_for_key()
    }

    fn flush_presses(&mut self) {
        self.keypad.flush_presses()
    }
}

/// See `keymap` for the layout.
fn map_keycode(k: Keycode) -> Option<u8> {
    match k {
        Keycode::Num1 => Some(0x1),
        Keycode::Num2 => Some(0x2),
        Keycode::Num3 => Some(0x3),
        Keycode::Num4 => Some(0xC),

        Keycode::Q => Some(0x4),
        Keycode::W => Some(0x5),
        Keycode::E => Some(0x6),
        Keycode::R => Some(0xD),

        Keycode::A => Some(0x7),
        Keycode::S => Some(0x8),
        Keycode::D => Some(0x9),
        Keycode::F => Some(0xE),

        Keycode::Z => Some(0xA),
        Keycode::X => Some(0x0),
        Keycode::C => Some(0xB),
        Keycode::V => Some(0xF),
        _ => None,
    }
}
