//! Flat binary copy of the machine state.
//!
//! Layout: memory (4096), V0..VF (16), stack frames (16 x u16, little-endian),
//! PC (u16, big-endian), I (u16, big-endian), stack pointer, delay timer,
//! sound timer. The format carries no version tag.

use std::fmt;
use std::io::{Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::stack::STACK_DEPTH;
use crate::vm::MEMORY_SIZE;
use crate::Result;

pub const SNAPSHOT_SIZE: usize = MEMORY_SIZE + 16 + STACK_DEPTH * 2 + 2 + 2 + 1 + 1 + 1;

#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub memory: [u8; MEMORY_SIZE],
    pub v: [u8; 16],
    pub stack: [u16; STACK_DEPTH],
    pub pc: u16,
    pub i: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl Snapshot {
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.memory)?;
        writer.write_all(&self.v)?;
        for frame in self.stack.iter() {
            writer.write_u16::<LittleEndian>(*frame)?;
        }
        writer.write_u16::<BigEndian>(self.pc)?;
        writer.write_u16::<BigEndian>(self.i)?;
        writer.write_u8(self.sp)?;
        writer.write_u8(self.delay_timer)?;
        writer.write_u8(self.sound_timer)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a snapshot. A truncated stream is an I/O error.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Snapshot> {
        let mut memory = [0; MEMORY_SIZE];
        reader.read_exact(&mut memory)?;
        let mut v = [0; 16];
        reader.read_exact(&mut v)?;
        let mut stack = [0; STACK_DEPTH];
        reader.read_u16_into::<LittleEndian>(&mut stack)?;

        Ok(Snapshot {
            memory,
            v,
            stack,
            pc: reader.read_u16::<BigEndian>()?,
            i: reader.read_u16::<BigEndian>()?,
            sp: reader.read_u8()?,
            delay_timer: reader.read_u8()?,
            sound_timer: reader.read_u8()?,
        })
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("v", &self.v)
            .field("stack", &&self.stack[..self.sp.min(STACK_DEPTH as u8) as usize])
            .field("pc", &format!("{:04x}", self.pc))
            .field("i", &format!("{:04x}", self.i))
            .field("dt", &self.delay_timer)
            .field("st", &self.sound_timer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_size() {
        assert_eq!(SNAPSHOT_SIZE, 4151);
    }

    #[test]
    fn field_byte_order() {
        let mut stack = [0; STACK_DEPTH];
        stack[0] = 0x0204;
        let snapshot = Snapshot {
            memory: [0; MEMORY_SIZE],
            v: [0; 16],
            stack,
            pc: 0x0ABC,
            i: 0x0123,
            sp: 2,
            delay_timer: 7,
            sound_timer: 9,
        };
        let mut bytes = Vec::new();
        snapshot.write_to(&mut bytes).unwrap();

        assert_eq!(bytes.len(), SNAPSHOT_SIZE);
        let frames = MEMORY_SIZE + 16;
        assert_eq!(&bytes[frames..frames + 4], &[0x04, 0x02, 0x00, 0x00]);
        let tail = &bytes[SNAPSHOT_SIZE - 7..];
        assert_eq!(tail, &[0x0A, 0xBC, 0x01, 0x23, 2, 7, 9]);
    }
}
