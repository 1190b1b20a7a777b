//! # Security Scorer
//!
//! Informational 0–100 ranking. The pass/fail verdict never depends on it.

/// Points removed per critical finding.
pub const CRITICAL_PENALTY: u32 = 50;
/// Points removed per warning.
pub const WARNING_PENALTY: u32 = 10;
/// Points removed per info finding.
pub const INFO_PENALTY: u32 = 2;

/// `clamp(100 - 50c - 10w - 2i, 0, 100)`.
#[must_use]
pub fn score(critical: usize, warnings: usize, info: usize) -> u8 {
    let penalty = [
        (critical, CRITICAL_PENALTY),
        (warnings, WARNING_PENALTY),
        (info, INFO_PENALTY),
    ]
    .iter()
    .fold(0u64, |acc, &(count, weight)| {
        acc.saturating_add((count as u64).saturating_mul(u64::from(weight)))
    });

    // At most 100, so the narrowing cast is lossless.
    100u64.saturating_sub(penalty) as u8
}

/// Rounded mean of two scores, halves rounding up.
#[must_use]
pub fn combined_score(source: u8, bytecode: u8) -> u8 {
    ((u16::from(source) + u16::from(bytecode) + 1) / 2) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_score() {
        assert_eq!(score(0, 0, 0), 100);
    }

    #[test]
    fn test_floor_at_zero() {
        assert_eq!(score(3, 0, 0), 0);
        assert_eq!(score(usize::MAX, usize::MAX, usize::MAX), 0);
    }

    #[test]
    fn test_combined_score_rounds() {
        assert_eq!(combined_score(100, 98), 99);
        assert_eq!(combined_score(90, 97), 94);
        assert_eq!(combined_score(0, 0), 0);
    }

    proptest! {
        #[test]
        fn prop_each_severity_has_fixed_cost(c in 0usize..3, w in 0usize..10, i in 0usize..50) {
            let base = i64::from(score(c, w, i));
            let raw = 100 - 50 * c as i64 - 10 * w as i64 - 2 * i as i64;
            prop_assert_eq!(base, raw.clamp(0, 100));
            prop_assert_eq!(i64::from(score(c, w + 1, i)), (raw - 10).clamp(0, 100));
            prop_assert_eq!(i64::from(score(c, w, i + 1)), (raw - 2).clamp(0, 100));
            prop_assert_eq!(i64::from(score(c + 1, w, i)), (raw - 50).clamp(0, 100));
        }
    }
}
