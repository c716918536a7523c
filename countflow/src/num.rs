//! Bit-width utilities.

/// Returns the number of bits needed to represent every value in `[0, max]`.
///
/// A zero-width register does not exist in hardware, so the result is at least 1.
pub const fn bits_for(max: u64) -> u32 {
    let bits = u64::BITS - max.leading_zeros();
    if bits == 0 {
        1
    } else {
        bits
    }
}

/// Returns the all-ones mask of the given width.
pub const fn mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// Truncates `value` to `width` bits, as assigning it to a register of that width would.
pub const fn truncate(value: u128, width: u32) -> u64 { (value & mask(width) as u128) as u64 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_for_covers_the_inclusive_range() {
        assert_eq!(bits_for(0), 1);
        assert_eq!(bits_for(1), 1);
        assert_eq!(bits_for(7), 3);
        assert_eq!(bits_for(8), 4);
        assert_eq!(bits_for(u64::MAX), 64);
    }

    #[test]
    fn truncate_wraps_like_a_register() {
        assert_eq!(mask(3), 0b111);
        assert_eq!(mask(64), u64::MAX);
        assert_eq!(truncate(8, 3), 0);
        assert_eq!(truncate(9, 3), 1);
        assert_eq!(truncate(u128::from(u64::MAX) + 1, 64), 0);
        // 0 - 1 in two's complement
        assert_eq!(truncate(u128::MAX, 3), 7);
    }
}
