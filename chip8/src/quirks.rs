//! Switches between historically divergent interpreter behaviours.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quirks {
    /// `8xy6`/`8xyE` shift Vy into Vx instead of shifting Vx in place.
    pub shift_legacy: bool,
    /// `Fx55`/`Fx65` leave I pointing past the last register transferred.
    pub load_store_increment: bool,
    /// Sprites wrap around the screen edges instead of being clipped.
    pub draw_wrap: bool,
    /// `Bnnn` jumps to nnn + V0. When cleared, it is read as `Bxnn` and
    /// jumps to xnn + Vx.
    pub jump_adds_v0: bool,
}

impl Quirks {
    /// COSMAC VIP interpreter.
    pub fn cosmac() -> Quirks {
        Quirks {
            shift_legacy: true,
            load_store_increment: true,
            draw_wrap: false,
            jump_adds_v0: true,
        }
    }

    /// SUPER-CHIP 1.1 on the HP-48.
    pub fn superchip() -> Quirks {
        Quirks {
            shift_legacy: false,
            load_store_increment: false,
            draw_wrap: false,
            jump_adds_v0: false,
        }
    }
}

impl Default for Quirks {
    fn default() -> Quirks {
        Quirks {
            shift_legacy: false,
            load_store_increment: false,
            draw_wrap: false,
            jump_adds_v0: true,
        }
    }
}
