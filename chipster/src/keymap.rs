// Classical layout, see http://devernay.free.fr/hacks/chip8/C8TECH10.HTM#2.3
// +---+---+---+---+
// | 1 | 2 | 3 | C |
// +---+---+---+---+
// | 4 | 5 | 6 | D |
// +---+---+---+---+
// | 7 | 8 | 9 | E |
// +---+---+---+---+
// | A | 0 | B | F |
// +---+---+---+---+
//
// mapped onto the left-hand side of a qwerty keyboard.
const CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('1', 0x1),
    ('2', 0x2),
    ('3', 0x3),
    ('4', 0xC),
    ('q', 0x4),
    ('w', 0x5),
    ('e', 0x6),
    ('r', 0xD),
    ('a', 0x7),
    ('s', 0x8),
    ('d', 0x9),
    ('f', 0xE),
    ('z', 0xA),
    ('x', 0x0),
    ('c', 0xB),
    ('v', 0xF),
];

pub fn key_for_char(c: char) -> Option<u8> {
    let c = c.to_ascii_lowercase();
    CONVENTIONAL_KEYMAP
        .iter()
        .find(|&&(mapped, _)| mapped == c)
        .map(|&(_, key)| key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_is_reachable_once() {
        let mut seen = [false; 16];
        for &(_, key) in CONVENTIONAL_KEYMAP.iter() {
            assert!(!seen[key as usize]);
            seen[key as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn lookup() {
        assert_eq!(key_for_char('x'), Some(0x0));
        assert_eq!(key_for_char('4'), Some(0xC));
        assert_eq!(key_for_char('V'), Some(0xF));
        assert_eq!(key_for_char('p'), None);
    }
}
