use std::fmt;

use enum_primitive::FromPrimitive;

/// A raw 16-bit instruction word, as fetched big-endian from memory.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct InstructionWord(pub u16);

impl InstructionWord {
    /// Top nibble, the primary opcode class.
    pub fn class(self) -> u8 {
        (self.0 >> 12) as u8
    }

    pub fn nnn(self) -> Addr {
        Addr(self.0 & 0x0FFF)
    }

    pub fn nn(self) -> Imm {
        Imm((self.0 & 0xFF) as u8)
    }

    pub fn n(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    pub fn x(self) -> u8 {
        ((self.0 & 0x0F00) >> 8) as u8
    }

    pub fn y(self) -> u8 {
        ((self.0 & 0x00F0) >> 4) as u8
    }
}

impl fmt::Debug for InstructionWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// 12-bit address operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Addr(pub u16);

/// 8-bit immediate operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Imm(pub u8);

enum_from_primitive! {
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reg {
    V0 = 0x0,
    V1 = 0x1,
    V2 = 0x2,
    V3 = 0x3,
    V4 = 0x4,
    V5 = 0x5,
    V6 = 0x6,
    V7 = 0x7,
    V8 = 0x8,
    V9 = 0x9,
    Va = 0xA,
    Vb = 0xB,
    Vc = 0xC,
    Vd = 0xD,
    Ve = 0xE,
    Vf = 0xF
}
}

impl Reg {
    pub fn index(self) -> u8 {
        self as u8
    }
}

enum_from_primitive! {
/// ALU operation of the `8xyN` group, keyed by the low nibble.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fun {
    Id = 0x0,
    Or = 0x1,
    And = 0x2,
    Xor = 0x3,
    Add = 0x4,
    Subtract = 0x5,
    ShiftRight = 0x6,
    SubtractInv = 0x7,
    ShiftLeft = 0xE
}
}

/// Every instruction the engine executes. `inv` flips a skip condition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen,
    Ret,
    Jump(Addr),
    Call(Addr),
    SkipEqImm { vx: Reg, imm: Imm, inv: bool },
    SkipEqReg { vx: Reg, vy: Reg, inv: bool },
    PutImm { vx: Reg, imm: Imm },
    AddImm { vx: Reg, imm: Imm },
    Apply { vx: Reg, vy: Reg, f: Fun },
    SetI(Addr),
    /// `Bnnn`. `vx` is the register named by the top nibble of `addr`, used
    /// by interpreters that treat the opcode as `Bxnn`.
    JumpOffset { addr: Addr, vx: Reg },
    Randomize { vx: Reg, imm: Imm },
    Draw { vx: Reg, vy: Reg, n: u8 },
    SkipPressed { vx: Reg, inv: bool },
    GetDT(Reg),
    WaitKey(Reg),
    SetDT(Reg),
    SetST(Reg),
    AddI(Reg),
    LoadGlyph(Reg),
    StoreBCD(Reg),
    StoreRegs(Reg),
    LoadRegs(Reg),
}

impl Instruction {
    /// Decodes a word, or `None` if the bit pattern names no instruction.
    pub fn decode(word: InstructionWord) -> Option<Instruction> {
        use self::Instruction::*;

        let vx = Reg::from_u8(word.x())?;
        let vy = Reg::from_u8(word.y())?;

        let instruction = match word.class() {
            0x0 => match word.0 {
                0x00E0 => ClearScreen,
                0x00EE => Ret,
                _ => return None,
            },
            0x1 => Jump(word.nnn()),
            0x2 => Call(word.nnn()),
            0x3 => SkipEqImm { vx, imm: word.nn(), inv: false },
            0x4 => SkipEqImm { vx, imm: word.nn(), inv: true },
            0x5 if word.n() == 0 => SkipEqReg { vx, vy, inv: false },
            0x6 => PutImm { vx, imm: word.nn() },
            0x7 => AddImm { vx, imm: word.nn() },
            0x8 => Apply { vx, vy, f: Fun::from_u8(word.n())? },
            0x9 if word.n() == 0 => SkipEqReg { vx, vy, inv: true },
            0xA => SetI(word.nnn()),
            0xB => JumpOffset { addr: word.nnn(), vx },
            0xC => Randomize { vx, imm: word.nn() },
            0xD => Draw { vx, vy, n: word.n() },
            0xE => match word.nn().0 {
                0x9E => SkipPressed { vx, inv: false },
                0xA1 => SkipPressed { vx, inv: true },
                _ => return None,
            },
            0xF => match word.nn().0 {
                0x07 => GetDT(vx),
                0x0A => WaitKey(vx),
                0x15 => SetDT(vx),
                0x18 => SetST(vx),
                0x1E => AddI(vx),
                0x29 => LoadGlyph(vx),
                0x33 => StoreBCD(vx),
                0x55 => StoreRegs(vx),
                0x65 => LoadRegs(vx),
                _ => return None,
            },
            _ => return None,
        };

        Some(instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    fn decode(raw: u16) -> Option<Instruction> {
        Instruction::decode(InstructionWord(raw))
    }

    #[test]
    fn word_fields() {
        let word = InstructionWord(0xBEEF);
        assert_eq!(word.class(), 0xB);
        assert_eq!(word.x(), 0xE);
        assert_eq!(word.y(), 0xE);
        assert_eq!(word.n(), 0xF);
        assert_eq!(word.nn(), Imm(0xEF));
        assert_eq!(word.nnn(), Addr(0xEEF));
    }

    #[test]
    #[rustfmt::skip]
    fn decodes_every_opcode() {
        use super::Reg::*;
        let table = [
            (0x00E0, ClearScreen),
            (0x00EE, Ret),
            (0x1ABC, Jump(Addr(0xABC))),
            (0x2ABC, Call(Addr(0xABC))),
            (0x3ABC, SkipEqImm { vx: Va, imm: Imm(0xBC), inv: false }),
            (0x4ABC, SkipEqImm { vx: Va, imm: Imm(0xBC), inv: true }),
            (0x5AB0, SkipEqReg { vx: Va, vy: Vb, inv: false }),
            (0x6ABC, PutImm { vx: Va, imm: Imm(0xBC) }),
            (0x7ABC, AddImm { vx: Va, imm: Imm(0xBC) }),
            (0x8AB0, Apply { vx: Va, vy: Vb, f: Fun::Id }),
            (0x8AB1, Apply { vx: Va, vy: Vb, f: Fun::Or }),
            (0x8AB2, Apply { vx: Va, vy: Vb, f: Fun::And }),
            (0x8AB3, Apply { vx: Va, vy: Vb, f: Fun::Xor }),
            (0x8AB4, Apply { vx: Va, vy: Vb, f: Fun::Add }),
            (0x8AB5, Apply { vx: Va, vy: Vb, f: Fun::Subtract }),
            (0x8AB6, Apply { vx: Va, vy: Vb, f: Fun::ShiftRight }),
            (0x8AB7, Apply { vx: Va, vy: Vb, f: Fun::SubtractInv }),
            (0x8ABE, Apply { vx: Va, vy: Vb, f: Fun::ShiftLeft }),
            (0x9AB0, SkipEqReg { vx: Va, vy: Vb, inv: true }),
            (0xAABC, SetI(Addr(0xABC))),
            (0xBABC, JumpOffset { addr: Addr(0xABC), vx: Va }),
            (0xCABC, Randomize { vx: Va, imm: Imm(0xBC) }),
            (0xDABC, Draw { vx: Va, vy: Vb, n: 0xC }),
            (0xEA9E, SkipPressed { vx: Va, inv: false }),
            (0xEAA1, SkipPressed { vx: Va, inv: true }),
            (0xFA07, GetDT(Va)),
            (0xFA0A, WaitKey(Va)),
            (0xFA15, SetDT(Va)),
            (0xFA18, SetST(Va)),
            (0xFA1E, AddI(Va)),
            (0xFA29, LoadGlyph(Va)),
            (0xFA33, StoreBCD(Va)),
            (0xFA55, StoreRegs(Va)),
            (0xFA65, LoadRegs(Va)),
        ];

        for &(raw, expected) in table.iter() {
            assert_eq!(decode(raw), Some(expected), "decoding {:04X}", raw);
        }
    }

    #[test]
    fn unknown_patterns_within_a_class() {
        for &raw in [0x0000, 0x0123, 0x00FF, 0x5AB1, 0x8AB8, 0x8ABF, 0x9AB3, 0xEA00, 0xFA00, 0xFAFF].iter() {
            assert_eq!(decode(raw), None, "decoding {:04X}", raw);
        }
    }
}
