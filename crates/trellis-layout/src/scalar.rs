//! Numeric domains for layout arithmetic.
//!
//! The layout algorithm is written once against [`LayoutScalar`]. `f64` is
//! the default domain; [`Fixed`] gives results that are identical on every
//! platform regardless of floating-point behavior.

use std::fmt::Debug;
use std::ops::{Add, Sub};

/// Arithmetic the layout algorithm needs.
pub trait LayoutScalar:
    Copy + Debug + Default + PartialOrd + Add<Output = Self> + Sub<Output = Self>
{
    const ZERO: Self;
    /// One layout unit (one pixel).
    const UNIT: Self;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;

    fn mul(self, other: Self) -> Self;
    /// Division; dividing by zero yields zero.
    fn div(self, other: Self) -> Self;
    /// Round toward negative infinity to a whole unit.
    fn floor(self) -> Self;

    fn from_count(count: usize) -> Self {
        Self::from_f64(count as f64)
    }

    /// `self * percent / 100`.
    fn percent(self, percent: f64) -> Self {
        self.mul(Self::from_f64(percent)).div(Self::from_f64(100.0))
    }

    fn half(self) -> Self {
        self.div(Self::from_f64(2.0))
    }

    fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    fn non_negative(self) -> Self {
        self.max(Self::ZERO)
    }
}

impl LayoutScalar for f64 {
    const ZERO: Self = 0.0;
    const UNIT: Self = 1.0;

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn mul(self, other: Self) -> Self {
        self * other
    }

    fn div(self, other: Self) -> Self {
        if other == 0.0 {
            0.0
        } else {
            self / other
        }
    }

    fn floor(self) -> Self {
        f64::floor(self)
    }
}

/// Number of fractional bits in [`Fixed`].
pub const FRACTIONAL_BITS: u32 = 16;

/// Signed fixed-point number with 16 fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(i64);

impl Fixed {
    const ONE: i64 = 1 << FRACTIONAL_BITS;

    pub const fn from_raw(raw: i64) -> Self {
        Fixed(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    fn saturate(value: i128) -> Self {
        Fixed(value.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(other.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(other.0))
    }
}

impl LayoutScalar for Fixed {
    const ZERO: Self = Fixed(0);
    const UNIT: Self = Fixed(Fixed::ONE);

    /// Rounds to the nearest representable value. Non-finite input maps to
    /// zero; `as` saturates out-of-range values.
    fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Fixed(0);
        }
        Fixed((value * Fixed::ONE as f64).round() as i64)
    }

    fn to_f64(self) -> f64 {
        self.0 as f64 / Fixed::ONE as f64
    }

    fn mul(self, other: Self) -> Self {
        Fixed::saturate((self.0 as i128 * other.0 as i128) >> FRACTIONAL_BITS)
    }

    fn div(self, other: Self) -> Self {
        if other.0 == 0 {
            return Fixed(0);
        }
        Fixed::saturate(((self.0 as i128) << FRACTIONAL_BITS) / other.0 as i128)
    }

    fn floor(self) -> Self {
        Fixed(self.0 & !(Fixed::ONE - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_conversion_is_exact_for_binary_fractions() {
        for v in [0.0, 1.0, -1.5, 300.25, 1024.0 + 1.0 / 65536.0] {
            assert_eq!(Fixed::from_f64(v).to_f64(), v);
        }
    }

    #[test]
    fn test_fixed_floor() {
        assert_eq!(Fixed::from_f64(2.75).floor().to_f64(), 2.0);
        assert_eq!(Fixed::from_f64(-2.25).floor().to_f64(), -3.0);
        assert_eq!(Fixed::from_f64(3.0).floor().to_f64(), 3.0);
    }

    #[test]
    fn test_fixed_mul_div() {
        let a = Fixed::from_f64(300.0);
        assert_eq!(a.percent(50.0).to_f64(), 150.0);
        assert_eq!(a.div(Fixed::from_f64(3.0)).to_f64(), 100.0);
        assert_eq!(a.div(Fixed::ZERO), Fixed::ZERO);
        assert_eq!(Fixed::from_f64(1.5).mul(Fixed::from_f64(-2.0)).to_f64(), -3.0);
    }

    #[test]
    fn test_f64_domain() {
        assert_eq!(LayoutScalar::floor(2.9_f64), 2.0);
        assert_eq!(LayoutScalar::div(5.0_f64, 0.0), 0.0);
        assert_eq!(200.0_f64.percent(25.0), 50.0);
        assert_eq!((-4.0_f64).non_negative(), 0.0);
    }

    #[test]
    fn test_fixed_saturates() {
        let big = Fixed::from_raw(i64::MAX);
        assert_eq!(big + Fixed::UNIT, big);
        assert_eq!(Fixed::from_f64(f64::NAN), Fixed::ZERO);
    }
}
