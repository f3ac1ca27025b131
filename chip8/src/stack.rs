pub const STACK_DEPTH: usize = 16;

/// Return-address stack. `sp` counts the frames in use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stack {
    sp: usize,
    frames: [u16; STACK_DEPTH],
}

impl Stack {
    pub fn new() -> Stack {
        Stack {
            sp: 0,
            frames: [0; STACK_DEPTH],
        }
    }

    /// Rebuilds a stack from persisted parts, or `None` if `sp` is out of range.
    pub fn from_raw(sp: usize, frames: [u16; STACK_DEPTH]) -> Option<Stack> {
        if sp > STACK_DEPTH {
            return None;
        }
        Some(Stack { sp, frames })
    }

    pub fn pop(&mut self) -> Option<u16> {
        if self.sp == 0 {
            return None;
        }
        self.sp -= 1;
        Some(self.frames[self.sp])
    }

    /// Pushes a return address. Returns `false` when every frame is in use.
    pub fn push(&mut self, value: u16) -> bool {
        if self.sp == STACK_DEPTH {
            return false;
        }
        self.frames[self.sp] = value;
        self.sp += 1;
        true
    }

    pub fn depth(&self) -> usize {
        self.sp
    }

    pub fn frames(&self) -> &[u16; STACK_DEPTH] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_from_empty() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn simple_push_pop() {
        let mut stack = Stack::new();
        assert!(stack.push(128));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.pop(), Some(128));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn push_into_full() {
        let mut stack = Stack::new();
        for frame in 0..STACK_DEPTH as u16 {
            assert!(stack.push(0x200 + frame * 2));
        }
        assert!(!stack.push(0xFFF));
        assert_eq!(stack.depth(), STACK_DEPTH);
        assert_eq!(stack.pop(), Some(0x21E));
    }

    #[test]
    fn from_raw_rejects_deep_sp() {
        assert!(Stack::from_raw(STACK_DEPTH, [0; STACK_DEPTH]).is_some());
        assert!(Stack::from_raw(STACK_DEPTH + 1, [0; STACK_DEPTH]).is_none());
    }
}
