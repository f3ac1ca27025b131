use crate::Result;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

pub trait Display {
    fn clear(&mut self);

    /// XORs `rows` onto the screen with the top-left corner at (`x`, `y`),
    /// one byte per row, MSB leftmost. Returns whether any lit pixel was
    /// turned off. Without `wrap`, pixels past the right or bottom edge are
    /// dropped.
    fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8], wrap: bool) -> bool;

    /// Shows the current frame. Called once per tick.
    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}

/// 64x32 monochrome pixel buffer.
#[derive(Clone)]
pub struct FrameBuffer {
    pixels: [bool; WIDTH * HEIGHT],
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> FrameBuffer {
        FrameBuffer {
            pixels: [false; WIDTH * HEIGHT],
            dirty: true,
        }
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y * WIDTH + x]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Returns whether the buffer changed since the last call, and resets it.
    pub fn take_dirty(&mut self) -> bool {
        let dirty = self.dirty;
        self.dirty = false;
        dirty
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&lit| lit).count()
    }
}

impl Default for FrameBuffer {
    fn default() -> FrameBuffer {
        FrameBuffer::new()
    }
}

impl Display for FrameBuffer {
    fn clear(&mut self) {
        for pixel in self.pixels.iter_mut() {
            *pixel = false;
        }
        self.dirty = true;
    }

    fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8], wrap: bool) -> bool {
        let mut collision = false;

        for (sy, byte) in rows.iter().enumerate() {
            let dy = if wrap { (y + sy) % HEIGHT } else { y + sy };
            if dy >= HEIGHT {
                break;
            }

            for sx in 0..8 {
                let bit_mask = 0b1000_0000 >> sx;
                if byte & bit_mask == 0 {
                    continue;
                }

                let dx = if wrap { (x + sx) % WIDTH } else { x + sx };
                if dx >= WIDTH {
                    break;
                }

                let index = dy * WIDTH + dx;
                if self.pixels[index] {
                    collision = true;
                }
                self.pixels[index] ^= true;
                self.dirty = true;
            }
        }

        collision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_ROWS: [u8; 5] = [0xFF; 5];

    #[test]
    fn clip_at_right_edge() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.draw_sprite(60, 0, &FULL_ROWS, false));

        for y in 0..5 {
            for x in 60..64 {
                assert!(fb.get(x, y));
            }
            for x in 0..4 {
                assert!(!fb.get(x, y));
            }
        }
        assert_eq!(fb.lit_count(), 20);
    }

    #[test]
    fn wrap_at_right_edge() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.draw_sprite(60, 0, &FULL_ROWS, true));

        for y in 0..5 {
            for col in 0..8 {
                assert!(fb.get((60 + col) % WIDTH, y));
            }
        }
        assert_eq!(fb.lit_count(), 40);
    }

    #[test]
    fn clip_and_wrap_at_bottom_edge() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 30, &FULL_ROWS, false);
        assert_eq!(fb.lit_count(), 16);
        assert!(!fb.get(0, 0));

        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 30, &FULL_ROWS, true);
        assert_eq!(fb.lit_count(), 40);
        assert!(fb.get(0, 0));
        assert!(fb.get(7, 2));
    }

    #[test]
    fn redraw_erases_and_collides() {
        let mut fb = FrameBuffer::new();
        let sprite = [0b1010_0101, 0b0101_1010];

        assert!(!fb.draw_sprite(10, 10, &sprite, false));
        assert_eq!(fb.lit_count(), 8);
        assert!(fb.draw_sprite(10, 10, &sprite, false));
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn overlap_without_shared_pixels_does_not_collide() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.draw_sprite(0, 0, &[0b1010_1010], false));
        assert!(!fb.draw_sprite(0, 0, &[0b0101_0101], false));
        assert_eq!(fb.lit_count(), 8);
    }

    #[test]
    fn dirty_tracking() {
        let mut fb = FrameBuffer::new();
        assert!(fb.take_dirty());
        assert!(!fb.take_dirty());

        fb.draw_sprite(0, 0, &[0], false);
        assert!(!fb.take_dirty());

        fb.draw_sprite(0, 0, &[0x80], false);
        assert!(fb.take_dirty());

        fb.clear();
        assert!(fb.take_dirty());
        assert_eq!(fb.lit_count(), 0);
    }
}
