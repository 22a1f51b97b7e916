use subtle::ConstantTimeEq;

/// Compare two byte strings without an early exit on the first mismatch.
///
/// Inputs of different length compare unequal immediately; the length of a
/// hex digest is public, only its content is secret. Equal-length inputs are
/// compared by accumulating the XOR of every byte pair.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_inputs() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn differing_last_byte() {
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
    }

    #[test]
    fn differing_first_byte() {
        assert!(!constant_time_eq(b"xbcdef", b"abcdef"));
    }

    #[test]
    fn differing_length() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
