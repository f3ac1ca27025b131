// `error_chain!` can recurse deeply
#![recursion_limit = "1024"]

#[macro_use]
extern crate enum_primitive;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

mod regfile;
mod stack;
mod timer;

pub mod audio;
pub mod display;
pub mod input;
pub mod instruction;
pub mod pacer;
pub mod quirks;
pub mod scheduler;
pub mod snapshot;
pub mod sound;
pub mod vm;

pub use self::audio::{Audio, Silence};
pub use self::display::{Display, FrameBuffer};
pub use self::input::{Flow, Input, Keypad, NoInput};
pub use self::instruction::Reg;
pub use self::pacer::Pacer;
pub use self::quirks::Quirks;
pub use self::scheduler::Scheduler;
pub use self::snapshot::Snapshot;
pub use self::sound::Tone;
pub use self::vm::{Env, Vm};

error_chain! {
    foreign_links {
        Io(::std::io::Error);
    }

    errors {
        FetchOutOfBounds(pc: u16) {
            description("instruction fetch outside of memory")
            display("instruction fetch outside of memory at pc={:#06x}", pc)
        }
        StackOverflow(pc: u16) {
            description("call stack overflow")
            display("call stack overflow at pc={:#06x}", pc)
        }
        StackUnderflow(pc: u16) {
            description("return with an empty call stack")
            display("return with an empty call stack at pc={:#06x}", pc)
        }
        SpriteOutOfBounds(i: u16, rows: u8) {
            description("sprite data outside of memory")
            display("sprite of {} rows at i={:#06x} reaches outside of memory", rows, i)
        }
        MemoryOutOfBounds(i: u16, len: usize) {
            description("memory access outside of memory")
            display("access of {} bytes at i={:#06x} reaches outside of memory", len, i)
        }
        RomTooLarge(len: usize, max: usize) {
            description("rom does not fit into memory")
            display("rom is {} bytes, at most {} bytes fit", len, max)
        }
        InvalidSnapshot(reason: String) {
            description("malformed snapshot")
            display("malformed snapshot: {}", reason)
        }
    }
}

impl Error {
    /// Whether this error is an engine fault, i.e. the engine halted while
    /// executing a program, as opposed to a load or I/O failure.
    pub fn is_fault(&self) -> bool {
        match *self.kind() {
            ErrorKind::FetchOutOfBounds(..)
            | ErrorKind::StackOverflow(..)
            | ErrorKind::StackUnderflow(..)
            | ErrorKind::SpriteOutOfBounds(..)
            | ErrorKind::MemoryOutOfBounds(..) => true,
            _ => false,
        }
    }
}
