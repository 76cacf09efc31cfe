//! Numeric conversion ladder.
//!
//! A typed getter pairs a destination type (`i64`, `u64`, `f64`) with a
//! [`Conversions`] mask naming the source representations the caller is
//! willing to accept. The basic converters handle the scalar sources;
//! the `_all` converters add bignums, decimal fractions and bigfloats.

use core::ops::BitOr;

use crate::item::{Item, Mantissa, Value};
use crate::{CborError, ErrorCode};

/// Mask of source representations a conversion accepts.
///
/// Combine flags with `|`. The strict getters use [`Conversions::XINT64`]
/// (integers of either sign) or [`Conversions::FLOAT`] `|`
/// [`Conversions::DOUBLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversions(u32);

impl Conversions {
    /// Integers representable as `i64`.
    pub const INT64: Self = Self(0x01);
    /// Positive integers above `i64::MAX`.
    pub const UINT64: Self = Self(0x02);
    /// Single-precision floats.
    pub const FLOAT: Self = Self(0x04);
    /// Bigfloats (tag 5).
    pub const BIGFLOAT: Self = Self(0x08);
    /// Decimal fractions (tag 4).
    pub const DECIMAL_FRACTION: Self = Self(0x10);
    /// Positive and negative bignums (tags 2 and 3).
    pub const BIG_NUM: Self = Self(0x20);
    /// Double-precision floats (half-precision widens to double).
    pub const DOUBLE: Self = Self(0x40);
    /// Integers of either CBOR major type (0 or 1).
    pub const XINT64: Self = Self(0x80 | 0x01 | 0x02);
    /// Every supported source representation.
    pub const ALL: Self = Self(0xff);

    /// Whether any flag of `other` is enabled in `self`.
    #[must_use]
    pub const fn allows(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Conversions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

const TWO_POW_63: u64 = 1 << 63;

fn err(code: ErrorCode, item: &Item<'_>) -> CborError {
    CborError::new(code, item.start)
}

/// Basic ladder to `i64`: integer and float sources only.
pub(crate) fn int64(item: &Item<'_>, opts: Conversions) -> Result<i64, CborError> {
    match item.value {
        Value::Int(n) if opts.allows(Conversions::INT64) => Ok(n),
        Value::UInt(_) if opts.allows(Conversions::UINT64) => {
            Err(err(ErrorCode::ConversionUnderOverflow, item))
        }
        Value::TooNegative(_) if opts.allows(Conversions::INT64) => {
            Err(err(ErrorCode::IntOverflow, item))
        }
        #[cfg(feature = "float")]
        Value::Float(f) if opts.allows(Conversions::FLOAT) => {
            float_to_int64(f64::from(f)).map_err(|code| err(code, item))
        }
        #[cfg(feature = "float")]
        Value::Double(d) if opts.allows(Conversions::DOUBLE) => {
            float_to_int64(d).map_err(|code| err(code, item))
        }
        _ => Err(err(ErrorCode::UnexpectedType, item)),
    }
}

/// Full ladder to `i64`: adds bignums, decimal fractions and bigfloats.
pub(crate) fn int64_all(item: &Item<'_>, opts: Conversions) -> Result<i64, CborError> {
    match item.value {
        Value::PosBignum(mag) if opts.allows(Conversions::BIG_NUM) => {
            signed(bignum_to_u64(mag).map_err(|code| err(code, item))?, false)
                .map_err(|code| err(code, item))
        }
        Value::NegBignum(mag) if opts.allows(Conversions::BIG_NUM) => {
            signed(bignum_to_u64(mag).map_err(|code| err(code, item))?, true)
                .map_err(|code| err(code, item))
        }
        Value::DecimalFraction { exponent, mantissa }
            if opts.allows(Conversions::DECIMAL_FRACTION) =>
        {
            scaled_signed(mantissa, 10, exponent).map_err(|code| err(code, item))
        }
        Value::Bigfloat { exponent, mantissa } if opts.allows(Conversions::BIGFLOAT) => {
            scaled_signed(mantissa, 2, exponent).map_err(|code| err(code, item))
        }
        _ => int64(item, opts),
    }
}

/// Basic ladder to `u64`: integer and float sources only.
pub(crate) fn uint64(item: &Item<'_>, opts: Conversions) -> Result<u64, CborError> {
    match item.value {
        Value::Int(n) if opts.allows(Conversions::INT64) => {
            u64::try_from(n).map_err(|_| err(ErrorCode::NumberSignConversion, item))
        }
        Value::UInt(u) if opts.allows(Conversions::UINT64) => Ok(u),
        Value::TooNegative(_) if opts.allows(Conversions::INT64) => {
            Err(err(ErrorCode::NumberSignConversion, item))
        }
        #[cfg(feature = "float")]
        Value::Float(f) if opts.allows(Conversions::FLOAT) => {
            float_to_uint64(f64::from(f)).map_err(|code| err(code, item))
        }
        #[cfg(feature = "float")]
        Value::Double(d) if opts.allows(Conversions::DOUBLE) => {
            float_to_uint64(d).map_err(|code| err(code, item))
        }
        _ => Err(err(ErrorCode::UnexpectedType, item)),
    }
}

/// Full ladder to `u64`.
pub(crate) fn uint64_all(item: &Item<'_>, opts: Conversions) -> Result<u64, CborError> {
    match item.value {
        Value::PosBignum(mag) if opts.allows(Conversions::BIG_NUM) => {
            bignum_to_u64(mag).map_err(|code| err(code, item))
        }
        Value::NegBignum(_) if opts.allows(Conversions::BIG_NUM) => {
            Err(err(ErrorCode::NumberSignConversion, item))
        }
        Value::DecimalFraction { exponent, mantissa }
            if opts.allows(Conversions::DECIMAL_FRACTION) =>
        {
            scaled_unsigned(mantissa, 10, exponent).map_err(|code| err(code, item))
        }
        Value::Bigfloat { exponent, mantissa } if opts.allows(Conversions::BIGFLOAT) => {
            scaled_unsigned(mantissa, 2, exponent).map_err(|code| err(code, item))
        }
        _ => uint64(item, opts),
    }
}

/// Basic ladder to `f64`: integer and float sources only.
///
/// Large 64-bit integers can carry more precision than a double; the
/// conversion is the usual nearest-representable one.
#[cfg(feature = "float")]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn double(item: &Item<'_>, opts: Conversions) -> Result<f64, CborError> {
    match item.value {
        Value::Int(n) if opts.allows(Conversions::INT64) => Ok(n as f64),
        Value::UInt(u) if opts.allows(Conversions::UINT64) => Ok(u as f64),
        Value::TooNegative(n) if opts.allows(Conversions::INT64) => Ok(-1.0 - n as f64),
        Value::Float(f) if opts.allows(Conversions::FLOAT) => Ok(f64::from(f)),
        Value::Double(d) if opts.allows(Conversions::DOUBLE) => Ok(d),
        _ => Err(err(ErrorCode::UnexpectedType, item)),
    }
}

/// Full ladder to `f64`.
///
/// Values too small or too large for a double come back as ±0 or ±∞ rather
/// than as an error, and precision may be lost.
#[cfg(feature = "float")]
pub(crate) fn double_all(item: &Item<'_>, opts: Conversions) -> Result<f64, CborError> {
    match item.value {
        Value::PosBignum(mag) if opts.allows(Conversions::BIG_NUM) => Ok(bignum_to_f64(mag)),
        Value::NegBignum(mag) if opts.allows(Conversions::BIG_NUM) => {
            Ok(-1.0 - bignum_to_f64(mag))
        }
        Value::DecimalFraction { exponent, mantissa }
            if opts.allows(Conversions::DECIMAL_FRACTION) =>
        {
            Ok(scaled_double(mantissa, 10.0, exponent))
        }
        Value::Bigfloat { exponent, mantissa } if opts.allows(Conversions::BIGFLOAT) => {
            Ok(scaled_double(mantissa, 2.0, exponent))
        }
        _ => double(item, opts),
    }
}

/// Round to nearest (ties to even) and range-check into `i64`.
#[cfg(feature = "float")]
#[allow(clippy::cast_possible_truncation)]
fn float_to_int64(d: f64) -> Result<i64, ErrorCode> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63

    let r = d.round_ties_even();
    if !r.is_finite() || r >= LIMIT || r < -LIMIT {
        return Err(ErrorCode::ConversionUnderOverflow);
    }
    Ok(r as i64)
}

#[cfg(feature = "float")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_uint64(d: f64) -> Result<u64, ErrorCode> {
    const LIMIT: f64 = 18_446_744_073_709_551_616.0; // 2^64

    let r = d.round_ties_even();
    if r.is_sign_negative() && r != 0.0 {
        return Err(ErrorCode::NumberSignConversion);
    }
    if !r.is_finite() || r >= LIMIT {
        return Err(ErrorCode::ConversionUnderOverflow);
    }
    Ok(r as u64)
}

/// Big-endian unsigned magnitude to `u64`; leading zeros are allowed.
pub(crate) fn bignum_to_u64(magnitude: &[u8]) -> Result<u64, ErrorCode> {
    let significant = match magnitude.iter().position(|&b| b != 0) {
        Some(i) => &magnitude[i..],
        None => return Ok(0),
    };
    if significant.len() > 8 {
        return Err(ErrorCode::ConversionUnderOverflow);
    }
    let mut v = 0u64;
    for &b in significant {
        v = v << 8 | u64::from(b);
    }
    Ok(v)
}

#[cfg(feature = "float")]
fn bignum_to_f64(magnitude: &[u8]) -> f64 {
    let mut v = 0.0f64;
    for &b in magnitude {
        v = v * 256.0 + f64::from(b);
    }
    v
}

/// Apply the bignum sign to a magnitude, negative meaning `-1 - magnitude`.
fn signed(mag: u64, negative: bool) -> Result<i64, ErrorCode> {
    if negative {
        // -1 - mag
        if mag >= TWO_POW_63 {
            return Err(ErrorCode::ConversionUnderOverflow);
        }
        #[allow(clippy::cast_possible_wrap)]
        Ok(-1 - (mag as i64))
    } else {
        i64::try_from(mag).map_err(|_| ErrorCode::ConversionUnderOverflow)
    }
}

/// A mantissa as `i64`; bignum mantissas must fit.
pub(crate) fn mantissa_to_i64(mantissa: Mantissa<'_>) -> Result<i64, ErrorCode> {
    match mantissa {
        Mantissa::Int(n) => Ok(n),
        Mantissa::PosBig(b) => signed(bignum_to_u64(b)?, false),
        Mantissa::NegBig(b) => signed(bignum_to_u64(b)?, true),
    }
}

/// Magnitude and sign of a mantissa; negative bignums fold the `-1 - n`
/// offset into the magnitude.
fn mantissa_parts(mantissa: Mantissa<'_>) -> Result<(u64, bool), ErrorCode> {
    match mantissa {
        Mantissa::Int(n) => Ok((n.unsigned_abs(), n < 0)),
        Mantissa::PosBig(b) => Ok((bignum_to_u64(b)?, false)),
        Mantissa::NegBig(b) => {
            let mag = bignum_to_u64(b)?
                .checked_add(1)
                .ok_or(ErrorCode::ConversionUnderOverflow)?;
            Ok((mag, true))
        }
    }
}

/// `magnitude * base^exp` with overflow guards.
///
/// Negative exponents divide, truncating toward zero; a non-zero magnitude
/// that scales below one is an underflow error. A zero magnitude yields zero
/// for any exponent.
fn scale_magnitude(magnitude: u64, base: u64, exp: i64) -> Result<u64, ErrorCode> {
    if magnitude == 0 {
        return Ok(0);
    }

    let mut mag = magnitude;
    if exp >= 0 {
        for _ in 0..exp {
            mag = mag
                .checked_mul(base)
                .ok_or(ErrorCode::ConversionUnderOverflow)?;
        }
    } else {
        for _ in 0..exp.unsigned_abs() {
            if mag == 0 {
                break;
            }
            mag /= base;
        }
        if mag == 0 {
            return Err(ErrorCode::ConversionUnderOverflow);
        }
    }
    Ok(mag)
}

fn scaled_signed(mantissa: Mantissa<'_>, base: u64, exp: i64) -> Result<i64, ErrorCode> {
    let (mag, negative) = mantissa_parts(mantissa)?;
    let scaled = scale_magnitude(mag, base, exp)?;
    if negative {
        if scaled > TWO_POW_63 {
            return Err(ErrorCode::ConversionUnderOverflow);
        }
        #[allow(clippy::cast_possible_wrap)]
        Ok((scaled as i64).wrapping_neg())
    } else {
        i64::try_from(scaled).map_err(|_| ErrorCode::ConversionUnderOverflow)
    }
}

fn scaled_unsigned(mantissa: Mantissa<'_>, base: u64, exp: i64) -> Result<u64, ErrorCode> {
    let (mag, negative) = mantissa_parts(mantissa)?;
    if negative && mag != 0 {
        return Err(ErrorCode::NumberSignConversion);
    }
    scale_magnitude(mag, base, exp)
}

#[cfg(feature = "float")]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn scaled_double(mantissa: Mantissa<'_>, base: f64, exp: i64) -> f64 {
    let m = match mantissa {
        Mantissa::Int(n) => n as f64,
        Mantissa::PosBig(b) => bignum_to_f64(b),
        Mantissa::NegBig(b) => -1.0 - bignum_to_f64(b),
    };
    // powi saturates well past the f64 range; clamp keeps the exponent in
    // i32 without changing the result.
    let e = exp.clamp(-1_100, 1_100) as i32;
    m * base.powi(e)
}
