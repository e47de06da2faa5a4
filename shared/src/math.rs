use std::ops::{Add, AddAssign, Mul, Sub};

use fixed::types::I32F32;

use orbit_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

/// Simulation scalar: signed 64-bit fixed point with 32 fractional bits.
/// Every operation is exact integer arithmetic, so results are identical on
/// every platform.
pub type Float = I32F32;

/// Deterministic square root. Non-positive input yields zero.
pub fn sqrt(value: Float) -> Float {
    if value <= Float::ZERO {
        return Float::ZERO;
    }
    let bits = u128::from(value.to_bits().unsigned_abs());
    from_root_bits(isqrt(bits << 32))
}

/// Deterministic cube root, odd for negative input.
pub fn cbrt(value: Float) -> Float {
    let bits = u128::from(value.to_bits().unsigned_abs());
    let root = from_root_bits(icbrt(bits << 64));
    if value < Float::ZERO {
        -root
    } else {
        root
    }
}

fn from_root_bits(root: u128) -> Float {
    Float::from_bits(i64::try_from(root).unwrap_or(i64::MAX))
}

fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    // start above the root and walk down
    let mut x = 1_u128 << ((128 - n.leading_zeros() + 1) / 2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

fn icbrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = 1_u128 << ((128 - n.leading_zeros() + 2) / 3);
    loop {
        let y = (2 * x + n / (x * x)) / 3;
        if y >= x {
            return x;
        }
        x = y;
    }
}

pub(crate) fn write_float(value: Float, writer: &mut dyn BitWrite) {
    value.to_bits().ser(writer);
}

pub(crate) fn read_float(reader: &mut BitReader) -> Result<Float, SerdeErr> {
    Ok(Float::from_bits(i64::de(reader)?))
}

/// 2D vector of [`Float`]. Arithmetic saturates instead of overflowing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vec2 {
    pub x: Float,
    pub y: Float,
}

impl Vec2 {
    pub const ZERO: Self = Self {
        x: Float::ZERO,
        y: Float::ZERO,
    };

    pub fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }

    /// Converts host coordinates. Returns `None` for NaN, infinite or
    /// out-of-range components.
    pub fn try_from_f32(x: f32, y: f32) -> Option<Self> {
        Some(Self::new(
            Float::checked_from_num(x)?,
            Float::checked_from_num(y)?,
        ))
    }

    pub fn length_squared(self) -> Float {
        self.x
            .saturating_mul(self.x)
            .saturating_add(self.y.saturating_mul(self.y))
    }

    pub fn distance_squared(self, other: Self) -> Float {
        (other - self).length_squared()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl Mul<Float> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self::new(self.x.saturating_mul(rhs), self.y.saturating_mul(rhs))
    }
}

impl Serde for Vec2 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_float(self.x, writer);
        write_float(self.y, writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let x = read_float(reader)?;
        let y = read_float(reader)?;
        Ok(Self { x, y })
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for Vec2 {
    fn const_bit_length() -> u32 {
        2 * <i64 as ConstBitLength>::const_bit_length()
    }
}
