use chip8::Pacer;

use crate::Result;

pub enum Step {
    Cont,
    Done,
}

pub trait Looper {
    fn start_loop<F>(self, f: F) -> Result<()>
    where
        F: FnMut() -> Result<Step>;
}

/// Calls `f` at a fixed rate on the current thread until it is done.
pub struct BlockingLooper {
    pacer: Pacer,
}

impl BlockingLooper {
    pub fn new(ticks_per_second: u32) -> BlockingLooper {
        BlockingLooper {
            pacer: Pacer::new(ticks_per_second),
        }
    }
}

impl Looper for BlockingLooper {
    fn start_loop<F>(mut self, mut f: F) -> Result<()>
    where
        F: FnMut() -> Result<Step>,
    {
        loop {
            match f()? {
                Step::Cont => self.pacer.wait(),
                Step::Done => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_when_done() {
        let mut calls = 0;
        let result = BlockingLooper::new(1000).start_loop(|| {
            calls += 1;
            Ok(if calls == 3 { Step::Done } else { Step::Cont })
        });
        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[test]
    fn error_ends_the_loop() {
        let result = BlockingLooper::new(1000).start_loop(|| Err("boom".into()));
        assert!(result.is_err());
    }
}
