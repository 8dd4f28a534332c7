//! Utility maths functions

/// Wrap a signed index into the range `[0, len)`, treating the underlying sequence as circular.
///
/// # Panics
/// - If `len` is zero.
pub fn wrap_index(index: i64, len: usize) -> usize {
    index.rem_euclid(len as i64) as usize
}

/// Number of forward steps needed to get from `from` to `to` in a circular sequence of length
/// `len`.
///
/// The result is always in the range `[0, len)`.
///
/// # Panics
/// - If `len` is zero.
pub fn circular_offset(from: usize, to: usize, len: usize) -> usize {
    wrap_index(to as i64 - from as i64, len)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, 10), 0);
        assert_eq!(wrap_index(9, 10), 9);
        assert_eq!(wrap_index(10, 10), 0);
        assert_eq!(wrap_index(-1, 10), 9);
        assert_eq!(wrap_index(-11, 10), 9);
        assert_eq!(wrap_index(25, 10), 5);
    }

    #[test]
    fn test_circular_offset() {
        assert_eq!(circular_offset(2, 6, 10), 4);
        assert_eq!(circular_offset(6, 2, 10), 6);
        assert_eq!(circular_offset(9, 0, 10), 1);
        assert_eq!(circular_offset(4, 4, 10), 0);
    }
}
