//! The decoded item model and the one-complete-item read primitive.
//!
//! An [`Item`] is one node of the pre-order walk: a scalar, a string, or a
//! container *header* whose children are reachable only by entering it.
//! Payload-bearing variants borrow from the input buffer; the decoder never
//! copies payload bytes, so the input must outlive every returned item.

use crate::stream::{len_to_usize, ByteStream, BREAK_BYTE};
use crate::{CborError, ErrorCode};

/// How many CBOR tag numbers are preserved per decoded item.
pub const MAX_TAGS_PER_ITEM: usize = 4;

const CBOR_TAG_DATE_STRING: u64 = 0;
const CBOR_TAG_EPOCH_DATE: u64 = 1;
const CBOR_TAG_POS_BIGNUM: u64 = 2;
const CBOR_TAG_NEG_BIGNUM: u64 = 3;
const CBOR_TAG_DECIMAL_FRACTION: u64 = 4;
const CBOR_TAG_BIGFLOAT: u64 = 5;
const CBOR_TAG_CBOR: u64 = 24;
const CBOR_TAG_URI: u64 = 32;
const CBOR_TAG_B64URL: u64 = 33;
const CBOR_TAG_B64: u64 = 34;
const CBOR_TAG_REGEX: u64 = 35;
const CBOR_TAG_MIME: u64 = 36;
const CBOR_TAG_UUID: u64 = 37;
const CBOR_TAG_CBOR_SEQUENCE: u64 = 63;
const CBOR_TAG_BINARY_MIME: u64 = 257;

/// Byte range of a container's children within the input buffer.
///
/// `end` is exclusive and, for an indefinite-length container, points at the
/// `break` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Offset of the first child (or of the `break` if the container is empty).
    pub start: usize,
    /// Exclusive end of the children.
    pub end: usize,
}

/// The type token of a decoded item, used for filters and tag matching.
///
/// Positive integers that fit `i64` carry the [`CborType::Int64`] token, like
/// negative ones; only values above `i64::MAX` are [`CborType::UInt64`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CborType {
    /// Integer representable as `i64` (major type 0 or 1).
    Int64,
    /// Positive integer above `i64::MAX` (major type 0).
    UInt64,
    /// Negative integer below `i64::MIN` (major type 1).
    TooNegative,
    /// Byte string.
    ByteString,
    /// Text string.
    TextString,
    /// Array header.
    Array,
    /// Map header.
    Map,
    /// Boolean simple value.
    Bool,
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// Any other simple value.
    Simple,
    /// Single-precision float.
    Float,
    /// Double-precision float (half widens to this).
    Double,
    /// Tag 0: RFC 3339 date text.
    DateString,
    /// Tag 1: epoch-relative date.
    EpochDate,
    /// Tag 32: URI text.
    Uri,
    /// Tag 34: base64 text.
    Base64,
    /// Tag 33: base64url text.
    Base64Url,
    /// Tag 35: regular-expression text.
    Regex,
    /// Tag 36: MIME message text.
    Mime,
    /// Tag 257: binary MIME message.
    BinaryMime,
    /// Tag 37: binary UUID.
    Uuid,
    /// Tag 2: positive bignum magnitude.
    PosBignum,
    /// Tag 3: negative bignum magnitude.
    NegBignum,
    /// Tag 4: decimal fraction.
    DecimalFraction,
    /// Tag 5: bigfloat.
    Bigfloat,
    /// Tag 24 or 63: byte-string-wrapped CBOR.
    WrappedCbor,
    /// Wildcard for queries; matches every item type.
    Any,
}

/// A map label: a signed integer or a text string.
///
/// `From` conversions let one `_in_map` method serve both label kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label<'a> {
    /// Integer label.
    Int(i64),
    /// Text label.
    Text(&'a str),
}

impl From<i64> for Label<'_> {
    fn from(label: i64) -> Self {
        Self::Int(label)
    }
}

impl<'a> From<&'a str> for Label<'a> {
    fn from(label: &'a str) -> Self {
        Self::Text(label)
    }
}

/// The ordered list of CBOR tag numbers preserved from the wire for one item,
/// outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tags {
    nums: [u64; MAX_TAGS_PER_ITEM],
    len: u8,
}

impl Tags {
    /// The preserved tag numbers, outermost first.
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.nums[..usize::from(self.len)]
    }

    /// Number of preserved tags.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the item carried no tags.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The tag directly on the content, if any.
    #[must_use]
    pub fn innermost(&self) -> Option<u64> {
        self.as_slice().last().copied()
    }

    fn push(&mut self, tag: u64) -> Result<(), ()> {
        if usize::from(self.len) == MAX_TAGS_PER_ITEM {
            return Err(());
        }
        self.nums[usize::from(self.len)] = tag;
        self.len += 1;
        Ok(())
    }
}

/// The mantissa of a decimal fraction or bigfloat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mantissa<'a> {
    /// Mantissa representable as `i64`.
    Int(i64),
    /// Positive bignum mantissa, big-endian magnitude.
    PosBig(&'a [u8]),
    /// Negative bignum mantissa, value `-1 - magnitude`.
    NegBig(&'a [u8]),
}

/// The payload of a decoded item.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum Value<'a> {
    /// Integer representable as `i64`.
    Int(i64),
    /// Positive integer above `i64::MAX`.
    UInt(u64),
    /// Negative integer below `i64::MIN`; the value is `-1 - n`.
    TooNegative(u64),
    /// Byte string, borrowed from the input.
    Bytes(&'a [u8]),
    /// Text string, borrowed from the input.
    Text(&'a str),
    /// Array header. `count` is `None` for indefinite length.
    Array {
        /// Declared element count, if definite.
        count: Option<u64>,
        /// Byte range of the elements.
        body: Span,
    },
    /// Map header. `count` is `None` for indefinite length.
    Map {
        /// Declared entry (pair) count, if definite.
        count: Option<u64>,
        /// Byte range of the entries.
        body: Span,
    },
    /// Boolean.
    Bool(bool),
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// Any other simple value.
    Simple(u8),
    /// Single-precision float.
    Float(f32),
    /// Double-precision float; half-precision input widens losslessly.
    Double(f64),
    /// Tag 0 date text.
    DateString(&'a str),
    /// Tag 1 epoch date, split into whole seconds and a fraction in `[0, 1)`.
    EpochDate {
        /// Whole seconds, rounded toward negative infinity.
        seconds: i64,
        /// Fractional part of the epoch value.
        fraction: f64,
    },
    /// Tag 32 URI text.
    Uri(&'a str),
    /// Tag 34 base64 text (still encoded).
    Base64(&'a str),
    /// Tag 33 base64url text (still encoded).
    Base64Url(&'a str),
    /// Tag 35 regular-expression text.
    Regex(&'a str),
    /// Tag 36 MIME message text.
    Mime(&'a str),
    /// Tag 257 binary MIME message.
    BinaryMime(&'a [u8]),
    /// Tag 37 binary UUID bytes.
    Uuid(&'a [u8]),
    /// Tag 2 bignum magnitude, big-endian.
    PosBignum(&'a [u8]),
    /// Tag 3 bignum magnitude; the value is `-1 - magnitude`.
    NegBignum(&'a [u8]),
    /// Tag 4 decimal fraction: `mantissa * 10^exponent`.
    DecimalFraction {
        /// Base-10 exponent.
        exponent: i64,
        /// Mantissa, plain or bignum.
        mantissa: Mantissa<'a>,
    },
    /// Tag 5 bigfloat: `mantissa * 2^exponent`.
    Bigfloat {
        /// Base-2 exponent.
        exponent: i64,
        /// Mantissa, plain or bignum.
        mantissa: Mantissa<'a>,
    },
    /// Tag 24 or 63: CBOR wrapped in a byte string.
    WrappedCbor(&'a [u8]),
}

/// One decoded CBOR data item.
///
/// `start..end` is the byte range of the item (tags included, label excluded).
/// A container item spans its entire subtree; entering it makes the children
/// reachable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item<'a> {
    /// The decoded payload.
    pub value: Value<'a>,
    /// The label this item was stored under, when it came from a map.
    pub label: Option<Label<'a>>,
    /// Tag numbers preserved from the wire, outermost first.
    pub tags: Tags,
    /// Offset of the item's first byte.
    pub start: usize,
    /// Offset just past the item (past the `break` for indefinite containers).
    pub end: usize,
}

impl Item<'_> {
    /// The type token of this item.
    #[must_use]
    pub const fn cbor_type(&self) -> CborType {
        match self.value {
            Value::Int(_) => CborType::Int64,
            Value::UInt(_) => CborType::UInt64,
            Value::TooNegative(_) => CborType::TooNegative,
            Value::Bytes(_) => CborType::ByteString,
            Value::Text(_) => CborType::TextString,
            Value::Array { .. } => CborType::Array,
            Value::Map { .. } => CborType::Map,
            Value::Bool(_) => CborType::Bool,
            Value::Null => CborType::Null,
            Value::Undefined => CborType::Undefined,
            Value::Simple(_) => CborType::Simple,
            Value::Float(_) => CborType::Float,
            Value::Double(_) => CborType::Double,
            Value::DateString(_) => CborType::DateString,
            Value::EpochDate { .. } => CborType::EpochDate,
            Value::Uri(_) => CborType::Uri,
            Value::Base64(_) => CborType::Base64,
            Value::Base64Url(_) => CborType::Base64Url,
            Value::Regex(_) => CborType::Regex,
            Value::Mime(_) => CborType::Mime,
            Value::BinaryMime(_) => CborType::BinaryMime,
            Value::Uuid(_) => CborType::Uuid,
            Value::PosBignum(_) => CborType::PosBignum,
            Value::NegBignum(_) => CborType::NegBignum,
            Value::DecimalFraction { .. } => CborType::DecimalFraction,
            Value::Bigfloat { .. } => CborType::Bigfloat,
            Value::WrappedCbor(_) => CborType::WrappedCbor,
        }
    }
}

fn validate_text(bytes: &[u8], off: usize) -> Result<&str, CborError> {
    #[cfg(feature = "simdutf8")]
    {
        simdutf8::basic::from_utf8(bytes).map_err(|_| CborError::new(ErrorCode::Utf8Invalid, off))
    }

    #[cfg(not(feature = "simdutf8"))]
    {
        core::str::from_utf8(bytes).map_err(|_| CborError::new(ErrorCode::Utf8Invalid, off))
    }
}

/// Read one complete data item, label included when `in_map` is set.
///
/// The stream is left just past the item's entire subtree.
pub(crate) fn read_item<'a>(
    stream: &mut ByteStream<'a>,
    in_map: bool,
    depth_budget: usize,
) -> Result<Item<'a>, CborError> {
    let label = if in_map {
        Some(read_label(stream, depth_budget)?)
    } else {
        None
    };

    let mut item = read_one(stream, depth_budget)?;
    item.label = label;
    Ok(item)
}

fn read_label<'a>(stream: &mut ByteStream<'a>, depth_budget: usize) -> Result<Label<'a>, CborError> {
    let off = stream.position();
    let item = read_one(stream, depth_budget)?;
    match item.value {
        Value::Int(n) if item.tags.is_empty() => Ok(Label::Int(n)),
        Value::Text(s) if item.tags.is_empty() => Ok(Label::Text(s)),
        _ => Err(CborError::new(ErrorCode::MapLabelType, off)),
    }
}

fn read_one<'a>(stream: &mut ByteStream<'a>, depth_budget: usize) -> Result<Item<'a>, CborError> {
    let start = stream.position();

    // Collect the tag chain in front of the content.
    let mut tags = Tags::default();
    let head = loop {
        let head = stream.read_head()?;
        if head.major != 6 {
            break head;
        }
        if head.is_indefinite() {
            return Err(CborError::new(ErrorCode::ReservedAdditionalInfo, head.offset));
        }
        tags.push(head.arg)
            .map_err(|()| CborError::new(ErrorCode::TooManyTags, head.offset))?;
    };

    let off = head.offset;
    let value = match head.major {
        0 | 1 if head.is_indefinite() => {
            return Err(CborError::new(ErrorCode::ReservedAdditionalInfo, off));
        }
        0 => match i64::try_from(head.arg) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::UInt(head.arg),
        },
        1 => match i64::try_from(head.arg) {
            Ok(n) => Value::Int(-1 - n),
            Err(_) => Value::TooNegative(head.arg),
        },
        2 | 3 => {
            if head.is_indefinite() {
                return Err(CborError::new(ErrorCode::IndefiniteStringUnsupported, off));
            }
            let len = len_to_usize(head.arg, off)?;
            let payload = stream.read_exact(len)?;
            if head.major == 2 {
                Value::Bytes(payload)
            } else {
                Value::Text(validate_text(payload, off)?)
            }
        }
        4 | 5 => {
            if depth_budget == 0 {
                return Err(CborError::new(ErrorCode::ArrayNestingTooDeep, off));
            }
            let pairs = head.major == 5;
            let count = if head.is_indefinite() {
                None
            } else {
                Some(head.arg)
            };
            let body_start = stream.position();
            match count {
                Some(n) => {
                    let children = if pairs {
                        n.checked_mul(2)
                            .ok_or_else(|| CborError::new(ErrorCode::StringTooLong, off))?
                    } else {
                        n
                    };
                    for _ in 0..children {
                        skip_one(stream, depth_budget - 1)?;
                    }
                }
                None => {
                    while stream.peek_u8() != Some(BREAK_BYTE) {
                        skip_one(stream, depth_budget - 1)?;
                        if pairs {
                            skip_one(stream, depth_budget - 1)?;
                        }
                    }
                }
            }
            let body = Span {
                start: body_start,
                end: stream.position(),
            };
            if count.is_none() {
                let _ = stream.read_u8()?; // consume the break
            }
            if pairs {
                Value::Map { count, body }
            } else {
                Value::Array { count, body }
            }
        }
        7 => read_type7(head.ai, head.arg, off)?,
        _ => unreachable!("major out of range"),
    };

    let value = match tags.innermost() {
        Some(tag) => interpret_tag(stream.data(), tag, value, off, depth_budget)?,
        None => value,
    };

    Ok(Item {
        value,
        label: None,
        tags,
        start,
        end: stream.position(),
    })
}

/// Decode a major type 7 head. The argument already holds the simple value
/// or the raw float bits.
#[allow(clippy::cast_possible_truncation)]
fn read_type7<'a>(ai: u8, arg: u64, off: usize) -> Result<Value<'a>, CborError> {
    match ai {
        0..=19 => Ok(Value::Simple(ai)),
        20 => Ok(Value::Bool(false)),
        21 => Ok(Value::Bool(true)),
        22 => Ok(Value::Null),
        23 => Ok(Value::Undefined),
        24 => {
            // Two-byte encodings of values below 32 are reserved.
            if arg < 32 {
                Err(CborError::new(ErrorCode::BadType7, off))
            } else {
                Ok(Value::Simple(arg as u8))
            }
        }
        #[cfg(feature = "float")]
        25 => Ok(Value::Double(f64::from(half::f16::from_bits(arg as u16)))),
        #[cfg(feature = "float")]
        26 => Ok(Value::Float(f32::from_bits(arg as u32))),
        #[cfg(feature = "float")]
        27 => Ok(Value::Double(f64::from_bits(arg))),
        #[cfg(not(feature = "float"))]
        25..=27 => Err(CborError::new(ErrorCode::FloatDisabled, off)),
        _ => Err(CborError::new(ErrorCode::BadBreak, off)),
    }
}

/// Map the innermost tag plus its content to a semantic value.
///
/// Unknown tags and the expected-encoding hints 21..=23 leave the content
/// untouched; the tag numbers stay visible on the item.
fn interpret_tag<'a>(
    data: &'a [u8],
    tag: u64,
    value: Value<'a>,
    off: usize,
    depth_budget: usize,
) -> Result<Value<'a>, CborError> {
    match tag {
        CBOR_TAG_DATE_STRING => match value {
            Value::Text(s) => Ok(Value::DateString(s)),
            _ => Err(CborError::new(ErrorCode::BadTagContent, off)),
        },
        CBOR_TAG_EPOCH_DATE => epoch_date(value, off),
        CBOR_TAG_POS_BIGNUM => match value {
            Value::Bytes(b) => Ok(Value::PosBignum(b)),
            _ => Err(CborError::new(ErrorCode::BadTagContent, off)),
        },
        CBOR_TAG_NEG_BIGNUM => match value {
            Value::Bytes(b) => Ok(Value::NegBignum(b)),
            _ => Err(CborError::new(ErrorCode::BadTagContent, off)),
        },
        CBOR_TAG_DECIMAL_FRACTION | CBOR_TAG_BIGFLOAT => {
            let (exponent, mantissa) = exp_and_mantissa(data, value, off, depth_budget)?;
            if tag == CBOR_TAG_DECIMAL_FRACTION {
                Ok(Value::DecimalFraction { exponent, mantissa })
            } else {
                Ok(Value::Bigfloat { exponent, mantissa })
            }
        }
        CBOR_TAG_CBOR | CBOR_TAG_CBOR_SEQUENCE => match value {
            Value::Bytes(b) => Ok(Value::WrappedCbor(b)),
            _ => Err(CborError::new(ErrorCode::BadTagContent, off)),
        },
        CBOR_TAG_URI => text_tag(value, off, Value::Uri),
        CBOR_TAG_B64URL => text_tag(value, off, Value::Base64Url),
        CBOR_TAG_B64 => text_tag(value, off, Value::Base64),
        CBOR_TAG_REGEX => text_tag(value, off, Value::Regex),
        CBOR_TAG_MIME => text_tag(value, off, Value::Mime),
        CBOR_TAG_UUID => match value {
            Value::Bytes(b) => Ok(Value::Uuid(b)),
            _ => Err(CborError::new(ErrorCode::BadTagContent, off)),
        },
        CBOR_TAG_BINARY_MIME => match value {
            Value::Bytes(b) => Ok(Value::BinaryMime(b)),
            _ => Err(CborError::new(ErrorCode::BadTagContent, off)),
        },
        _ => Ok(value),
    }
}

fn text_tag<'a>(
    value: Value<'a>,
    off: usize,
    wrap: fn(&'a str) -> Value<'a>,
) -> Result<Value<'a>, CborError> {
    match value {
        Value::Text(s) => Ok(wrap(s)),
        _ => Err(CborError::new(ErrorCode::BadTagContent, off)),
    }
}

fn epoch_date<'a>(value: Value<'a>, off: usize) -> Result<Value<'a>, CborError> {
    match value {
        Value::Int(n) => Ok(Value::EpochDate {
            seconds: n,
            fraction: 0.0,
        }),
        #[cfg(feature = "float")]
        Value::Float(f) => float_epoch(f64::from(f), off),
        #[cfg(feature = "float")]
        Value::Double(d) => float_epoch(d, off),
        Value::UInt(_) | Value::TooNegative(_) => {
            Err(CborError::new(ErrorCode::DateOverflow, off))
        }
        _ => Err(CborError::new(ErrorCode::BadTagContent, off)),
    }
}

#[cfg(feature = "float")]
fn float_epoch<'a>(d: f64, off: usize) -> Result<Value<'a>, CborError> {
    let (seconds, fraction) = split_epoch(d, off)?;
    Ok(Value::EpochDate { seconds, fraction })
}

/// Split a float epoch into whole seconds (toward negative infinity) and a
/// fraction in `[0, 1)`.
#[cfg(feature = "float")]
pub(crate) fn split_epoch(d: f64, off: usize) -> Result<(i64, f64), CborError> {
    const MAX_EPOCH: f64 = 9_223_372_036_854_775_808.0; // 2^63

    let whole = d.floor();
    if !whole.is_finite() || whole >= MAX_EPOCH || whole < -MAX_EPOCH {
        return Err(CborError::new(ErrorCode::DateOverflow, off));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok((whole as i64, d - whole))
}

/// Decode the `[exponent, mantissa]` pair of a decimal fraction or bigfloat
/// from an already-skipped two-element array.
pub(crate) fn exp_and_mantissa<'a>(
    data: &'a [u8],
    value: Value<'a>,
    off: usize,
    depth_budget: usize,
) -> Result<(i64, Mantissa<'a>), CborError> {
    let Value::Array {
        count: Some(2),
        body,
    } = value
    else {
        return Err(CborError::new(ErrorCode::BadExpAndMantissa, off));
    };

    let mut parts = ByteStream::new(data, body.start);
    let exp_item = read_one(&mut parts, depth_budget)?;
    let mant_item = read_one(&mut parts, depth_budget)?;

    let exponent = match exp_item.value {
        Value::Int(n) if exp_item.tags.is_empty() => n,
        _ => return Err(CborError::new(ErrorCode::BadExpAndMantissa, off)),
    };

    let mantissa = match mant_item.value {
        Value::Int(n) => Mantissa::Int(n),
        Value::PosBignum(b) => Mantissa::PosBig(b),
        Value::NegBignum(b) => Mantissa::NegBig(b),
        _ => return Err(CborError::new(ErrorCode::BadExpAndMantissa, off)),
    };

    Ok((exponent, mantissa))
}

/// Skip one complete data item without materializing it.
///
/// Skipping is purely structural: string payloads are not UTF-8 checked and
/// float payloads are passed over as bytes even when floats are disabled.
pub(crate) fn skip_one(stream: &mut ByteStream<'_>, depth_budget: usize) -> Result<(), CborError> {
    // Skip any tag chain.
    let head = loop {
        let head = stream.read_head()?;
        if head.major != 6 {
            break head;
        }
        if head.is_indefinite() {
            return Err(CborError::new(ErrorCode::ReservedAdditionalInfo, head.offset));
        }
    };

    let off = head.offset;
    match head.major {
        0 | 1 => {
            if head.is_indefinite() {
                return Err(CborError::new(ErrorCode::ReservedAdditionalInfo, off));
            }
            Ok(())
        }
        2 | 3 => {
            if head.is_indefinite() {
                return Err(CborError::new(ErrorCode::IndefiniteStringUnsupported, off));
            }
            let len = len_to_usize(head.arg, off)?;
            stream.read_exact(len)?;
            Ok(())
        }
        4 | 5 => {
            if depth_budget == 0 {
                return Err(CborError::new(ErrorCode::ArrayNestingTooDeep, off));
            }
            let pairs = head.major == 5;
            if head.is_indefinite() {
                while stream.peek_u8() != Some(BREAK_BYTE) {
                    skip_one(stream, depth_budget - 1)?;
                    if pairs {
                        skip_one(stream, depth_budget - 1)?;
                    }
                }
                let _ = stream.read_u8()?;
            } else {
                let children = if pairs {
                    head.arg
                        .checked_mul(2)
                        .ok_or_else(|| CborError::new(ErrorCode::StringTooLong, off))?
                } else {
                    head.arg
                };
                for _ in 0..children {
                    skip_one(stream, depth_budget - 1)?;
                }
            }
            Ok(())
        }
        7 => {
            // The head read already consumed any simple-value or float
            // payload into the argument.
            if head.is_indefinite() {
                return Err(CborError::new(ErrorCode::BadBreak, off));
            }
            Ok(())
        }
        _ => unreachable!("major out of range"),
    }
}
