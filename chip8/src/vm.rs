use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use rand::{Rng, RngCore};

use crate::display::Display;
use crate::input::Input;
use crate::instruction::*;
use crate::quirks::Quirks;
use crate::regfile::RegFile;
use crate::snapshot::Snapshot;
use crate::sound::{SoundTimer, Tone};
use crate::stack::Stack;
use crate::timer::Timer;
use crate::{ErrorKind, Result};

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Collaborators an instruction may reach out to, borrowed for one step.
pub struct Env<'a> {
    pub display: &'a mut dyn Display,
    pub input: &'a mut dyn Input,
    pub rng: &'a mut dyn RngCore,
}

pub struct Vm {
    memory: [u8; MEMORY_SIZE],
    gpr: RegFile,
    stack: Stack,
    pc: u16,
    i: u16,
    dt: Timer,
    st: SoundTimer,
    quirks: Quirks,
    halted: bool,
    waiting: Option<Reg>,
}

impl Vm {
    pub fn new(quirks: Quirks) -> Vm {
        let mut vm = Vm {
            memory: [0; MEMORY_SIZE],
            gpr: RegFile::new(),
            stack: Stack::new(),
            pc: PROGRAM_START,
            i: 0,
            dt: Timer::new(),
            st: SoundTimer::new(),
            quirks,
            halted: false,
            waiting: None,
        };

        {
            let font_memory = &mut vm.memory[FONT_MEMORY_OFFSET..FONT_MEMORY_OFFSET + FONT_SPRITES.len()];
            font_memory.copy_from_slice(&FONT_SPRITES);
        }

        vm
    }

    pub fn with_rom(quirks: Quirks, rom: &[u8]) -> Result<Vm> {
        let mut vm = Vm::new(quirks);
        vm.load_rom(rom)?;
        Ok(vm)
    }

    /// Copies `rom` to the program area and restarts execution there.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        if rom.len() > MAX_ROM_SIZE {
            bail!(ErrorKind::RomTooLarge(rom.len(), MAX_ROM_SIZE));
        }

        let start = PROGRAM_START as usize;
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        self.pc = PROGRAM_START;
        self.halted = false;
        self.waiting = None;

        info!("loaded {} byte rom", rom.len());
        Ok(())
    }

    /// Soft reset. Memory, and with it the font and the loaded program, is kept.
    pub fn reset(&mut self) {
        self.gpr = RegFile::new();
        self.stack = Stack::new();
        self.pc = PROGRAM_START;
        self.i = 0;
        self.dt.set(0);
        self.st.set(0);
        self.halted = false;
        self.waiting = None;
    }

    /// Executes a single instruction. Does nothing once the engine has halted.
    ///
    /// Any error returned is a fault: the engine is halted until it is reset,
    /// restored or given a new program.
    pub fn step(&mut self, env: &mut Env) -> Result<()> {
        if self.halted {
            return Ok(());
        }

        env.input.refresh();

        let result = self.cycle(env);
        if let Err(ref e) = result {
            self.halted = true;
            error!("halted: {}", e);
        }
        result
    }

    fn cycle(&mut self, env: &mut Env) -> Result<()> {
        let pc = self.pc;
        let word = self.fetch()?;
        self.pc += 2;

        match Instruction::decode(word) {
            Some(instruction) => {
                trace!("{:04x}: {:?} {:?}", pc, word, instruction);
                self.execute(pc, instruction, env)
            }
            None => {
                debug!("unrecognized opcode {:?} at pc={:#06x}", word, pc);
                Ok(())
            }
        }
    }

    fn fetch(&self) -> Result<InstructionWord> {
        let pc = self.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            bail!(ErrorKind::FetchOutOfBounds(self.pc));
        }
        Ok(InstructionWord(BigEndian::read_u16(&self.memory[pc..])))
    }

    /// Bounds-checked view of `len` bytes starting at I.
    fn span_at_i(&self, len: usize) -> Option<(usize, usize)> {
        let from = self.i as usize;
        let to = from + len;
        if to > MEMORY_SIZE {
            None
        } else {
            Some((from, to))
        }
    }

    fn execute(&mut self, pc: u16, instruction: Instruction, env: &mut Env) -> Result<()> {
        use crate::instruction::Instruction::*;

        match instruction {
            ClearScreen => env.display.clear(),
            Ret => match self.stack.pop() {
                Some(retaddr) => self.pc = retaddr,
                None => bail!(ErrorKind::StackUnderflow(pc)),
            },
            Jump(addr) => {
                self.pc = addr.0;
            }
            Call(addr) => {
                if !self.stack.push(self.pc) {
                    bail!(ErrorKind::StackOverflow(pc));
                }
                self.pc = addr.0;
            }
            SkipEqImm { vx, imm, inv } => {
                if (self.gpr[vx] == imm.0) != inv {
                    self.pc += 2;
                }
            }
            SkipEqReg { vx, vy, inv } => {
                if (self.gpr[vx] == self.gpr[vy]) != inv {
                    self.pc += 2;
                }
            }
            PutImm { vx, imm } => {
                self.gpr[vx] = imm.0;
            }
            AddImm { vx, imm } => {
                let x = self.gpr[vx];
                self.gpr[vx] = x.wrapping_add(imm.0);
            }
            Apply { vx, vy, f } => self.apply(vx, vy, f),
            SetI(addr) => {
                self.i = addr.0;
            }
            JumpOffset { addr, vx } => {
                let offset = if self.quirks.jump_adds_v0 {
                    self.gpr[Reg::V0]
                } else {
                    self.gpr[vx]
                };
                self.pc = addr.0 + offset as u16;
            }
            Randomize { vx, imm } => {
                let random_byte = env.rng.gen::<u8>();
                self.gpr[vx] = random_byte & imm.0;
            }
            Draw { vx, vy, n } => {
                let x = self.gpr[vx] as usize;
                let y = self.gpr[vy] as usize;
                let (from, to) = match self.span_at_i(n as usize) {
                    Some(span) => span,
                    None => bail!(ErrorKind::SpriteOutOfBounds(self.i, n)),
                };

                let collision = env
                    .display
                    .draw_sprite(x, y, &self.memory[from..to], self.quirks.draw_wrap);
                self.gpr[Reg::Vf] = collision as u8;
            }
            SkipPressed { vx, inv } => {
                let key = self.gpr[vx];
                if env.input.is_pressed(key) != inv {
                    self.pc += 2;
                }
            }
            GetDT(vx) => {
                self.gpr[vx] = self.dt.get();
            }
            WaitKey(vx) => {
                if self.waiting.is_none() {
                    env.input.flush_presses();
                }
                match env.input.wait_for_key() {
                    Some(key) => {
                        self.gpr[vx] = key;
                        self.waiting = None;
                    }
                    None => {
                        self.pc = pc;
                        self.waiting = Some(vx);
                    }
                }
            }
            SetDT(vx) => {
                let x = self.gpr[vx];
                self.dt.set(x);
            }
            SetST(vx) => {
                let x = self.gpr[vx];
                self.st.set(x);
            }
            AddI(vx) => {
                let x = self.gpr[vx] as u16;
                self.i = self.i.wrapping_add(x);
            }
            LoadGlyph(vx) => {
                let digit = self.gpr[vx] & 0xF;
                self.i = (FONT_MEMORY_OFFSET + digit as usize * GLYPH_SIZE) as u16;
            }
            StoreBCD(vx) => {
                let (from, _) = match self.span_at_i(3) {
                    Some(span) => span,
                    None => bail!(ErrorKind::MemoryOutOfBounds(self.i, 3)),
                };

                let v = self.gpr[vx];
                self.memory[from] = v / 100;
                self.memory[from + 1] = (v / 10) % 10;
                self.memory[from + 2] = v % 10;
            }
            StoreRegs(vx) => {
                let count = vx.index() as usize + 1;
                let (from, _) = match self.span_at_i(count) {
                    Some(span) => span,
                    None => bail!(ErrorKind::MemoryOutOfBounds(self.i, count)),
                };

                for offset in 0..count {
                    self.memory[from + offset] = self.gpr.read_at_index(offset);
                }
                if self.quirks.load_store_increment {
                    self.i += count as u16;
                }
            }
            LoadRegs(vx) => {
                let count = vx.index() as usize + 1;
                let (from, _) = match self.span_at_i(count) {
                    Some(span) => span,
                    None => bail!(ErrorKind::MemoryOutOfBounds(self.i, count)),
                };

                for offset in 0..count {
                    self.gpr.write_at_index(offset, self.memory[from + offset]);
                }
                if self.quirks.load_store_increment {
                    self.i += count as u16;
                }
            }
        }

        Ok(())
    }

    // VF is always written after Vx, so `8xFy` ends with the flag.
    fn apply(&mut self, vx: Reg, vy: Reg, f: Fun) {
        let x = self.gpr[vx];
        let y = self.gpr[vy];
        let shift_source = if self.quirks.shift_legacy { y } else { x };

        let (value, flag) = match f {
            Fun::Id => (y, None),
            Fun::Or => (x | y, None),
            Fun::And => (x & y, None),
            Fun::Xor => (x ^ y, None),
            Fun::Add => {
                let (v, overflow) = x.overflowing_add(y);
                (v, Some(overflow as u8))
            }
            Fun::Subtract => (x.wrapping_sub(y), Some((x > y) as u8)),
            Fun::ShiftRight => (shift_source >> 1, Some(shift_source & 0x01)),
            Fun::SubtractInv => (y.wrapping_sub(x), Some((y > x) as u8)),
            Fun::ShiftLeft => (shift_source << 1, Some(shift_source >> 7)),
        };

        self.gpr[vx] = value;
        if let Some(flag) = flag {
            self.gpr[Reg::Vf] = flag;
        }
    }

    /// Advances the delay and sound timers by one 60Hz tick.
    pub fn tick_timers(&mut self) -> Option<Tone> {
        self.dt.tick();
        self.st.tick()
    }

    /// Zeroes the sound timer. Returns whether a tone was left playing.
    pub fn silence(&mut self) -> bool {
        self.st.silence()
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut v = [0; 16];
        v.copy_from_slice(self.gpr.as_bytes());

        Snapshot {
            memory: self.memory,
            v,
            stack: *self.stack.frames(),
            pc: self.pc,
            i: self.i,
            sp: self.stack.depth() as u8,
            delay_timer: self.dt.get(),
            sound_timer: self.st.get(),
        }
    }

    /// Replaces the whole machine state. Quirks are kept.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        let stack = match Stack::from_raw(snapshot.sp as usize, snapshot.stack) {
            Some(stack) => stack,
            None => bail!(ErrorKind::InvalidSnapshot(format!(
                "stack pointer {} exceeds stack depth",
                snapshot.sp
            ))),
        };

        self.memory = snapshot.memory;
        self.gpr.load(snapshot.v);
        self.stack = stack;
        self.pc = snapshot.pc;
        self.i = snapshot.i;
        self.dt.set(snapshot.delay_timer);
        self.st.set(snapshot.sound_timer);
        self.halted = false;
        self.waiting = None;

        info!("restored snapshot at pc={:#06x}", self.pc);
        Ok(())
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn reg(&self, reg: Reg) -> u8 {
        self.gpr[reg]
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn delay_timer(&self) -> u8 {
        self.dt.get()
    }

    pub fn sound_timer(&self) -> u8 {
        self.st.get()
    }

    pub fn is_sounding(&self) -> bool {
        self.st.is_sounding()
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The register an `Fx0A` is waiting to fill, if any.
    pub fn waiting_for_key(&self) -> Option<Reg> {
        self.waiting
    }
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Vm")
            .field("gpr", &self.gpr)
            .field("pc", &format!("{:04x}", self.pc))
            .field("i", &format!("{:04x}", self.i))
            .field("dt", &format!("{:02x}", self.dt.get()))
            .field("st", &format!("{:02x}", self.st.get()))
            .field("stack", &self.stack)
            .field("halted", &self.halted)
            .finish()
    }
}

const FONT_MEMORY_OFFSET: usize = 0;
const GLYPH_SIZE: usize = 5;

#[rustfmt::skip]
const FONT_SPRITES: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
