use std::fmt;
use std::ops::{Index, IndexMut};

use crate::instruction::Reg;

pub const REG_COUNT: usize = 16;

#[derive(Clone, PartialEq, Eq)]
pub struct RegFile {
    gpr: [u8; REG_COUNT],
}

impl RegFile {
    pub fn new() -> RegFile {
        RegFile { gpr: [0; REG_COUNT] }
    }

    pub fn read_at_index(&self, index: usize) -> u8 {
        self.gpr[index]
    }

    pub fn write_at_index(&mut self, index: usize, value: u8) {
        self.gpr[index] = value;
    }

    pub fn as_bytes(&self) -> &[u8; REG_COUNT] {
        &self.gpr
    }

    pub fn load(&mut self, values: [u8; REG_COUNT]) {
        self.gpr = values;
    }
}

impl Index<Reg> for RegFile {
    type Output = u8;

    fn index(&self, index: Reg) -> &u8 {
        &self.gpr[index.index() as usize]
    }
}

impl IndexMut<Reg> for RegFile {
    fn index_mut(&mut self, index: Reg) -> &mut u8 {
        &mut self.gpr[index.index() as usize]
    }
}

impl fmt::Debug for RegFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut dbg = f.debug_struct("RegFile");
        for i in 0..REG_COUNT {
            let reg_name = format!("V{:X}", i);
            let reg_value = format!("{:02x}", self.read_at_index(i));
            dbg.field(&reg_name, &reg_value);
        }
        dbg.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_by_reg_and_by_position() {
        let mut regs = RegFile::new();
        regs[Reg::Va] = 0x42;
        assert_eq!(regs.read_at_index(0xA), 0x42);

        regs.write_at_index(0xF, 1);
        assert_eq!(regs[Reg::Vf], 1);
    }

    #[test]
    fn debug_lists_every_register() {
        let mut regs = RegFile::new();
        regs[Reg::Vc] = 0xAB;
        let dbg = format!("{:?}", regs);
        assert!(dbg.contains("V0"));
        assert!(dbg.contains("VF"));
        assert!(dbg.contains("ab"));
    }
}
