use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// All simulation quantities (fill yields, radii, world coordinates,
/// tolerances) use this type so recomputation is bit-identical across
/// platforms and runs.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time. One tick per external
/// rotation trigger or grid transaction.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in the
/// simulation loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display, never in the simulation loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Checked multiplication for Fixed64 that returns None on overflow.
#[inline]
pub fn checked_mul_64(a: Fixed64, b: Fixed64) -> Option<Fixed64> {
    a.checked_mul(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(0.25);
        let b = f64_to_fixed64(1.5);
        assert_eq!(fixed64_to_f64(a + b), 1.75);
        assert_eq!(fixed64_to_f64(a * b), 0.375);
    }

    #[test]
    fn fixed64_determinism() {
        let a = f64_to_fixed64(0.06);
        let b = f64_to_fixed64(0.06);
        assert_eq!(a, b);
        assert_eq!(a * f64_to_fixed64(1.25), b * f64_to_fixed64(1.25));
    }

    #[test]
    fn fixed64_checked_mul_overflow() {
        let big = Fixed64::MAX;
        let two = f64_to_fixed64(2.0);
        assert!(checked_mul_64(big, two).is_none());
    }

    #[test]
    fn fixed64_ordering() {
        assert!(f64_to_fixed64(0.2) < f64_to_fixed64(0.25));
    }
}
