use core::fmt;

/// A structured error code identifying the reason a decode operation failed.
///
/// This enum is intentionally stable and string-free to support `no_std` and to remain hot-path friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The data item is not of the type requested, or its tagging does not
    /// satisfy the caller's tag requirement.
    UnexpectedType,
    /// The cursor is at the end of the current bounded region (or of the
    /// whole input) and there is no further item to consume.
    NoMoreItems,
    /// Maps, arrays and wrapped regions are nested deeper than the fixed
    /// nesting stack allows.
    ArrayNestingTooDeep,
    /// An exit was requested for a different region kind than the one
    /// currently entered.
    CloseMismatch,
    /// Unexpected end of input in the middle of a data item.
    HitEnd,
    /// No entry with the requested label exists in the map.
    LabelNotFound,
    /// The map holds more than one entry with a label being searched for.
    DuplicateLabel,
    /// A map operation was requested but the current region is not a map.
    MapNotEntered,
    /// `finish` was called while a map, array or wrapped region is still
    /// entered.
    UnclosedMapOrArray,
    /// A map label is neither an integer nor a text string.
    MapLabelType,

    /// A negative integer is too far from zero to represent in the target.
    IntOverflow,
    /// The value is representable in the source encoding but not in the
    /// requested destination type.
    ConversionUnderOverflow,
    /// A negative value was requested as an unsigned integer.
    NumberSignConversion,
    /// The exponent or mantissa of a decimal fraction or bigfloat cannot be
    /// coerced as requested.
    BadExpAndMantissa,
    /// An epoch date is non-finite or outside the representable range.
    DateOverflow,
    /// Floating-point support is compiled out and the operation needs it.
    FloatDisabled,

    /// Reserved or malformed major type 7 encoding.
    BadType7,
    /// Reserved additional-info value (28..=30) was used.
    ReservedAdditionalInfo,
    /// Input remains after the top-level item was fully consumed.
    ExtraBytes,
    /// A string length does not fit the platform's address space.
    StringTooLong,
    /// A `break` byte appeared outside an indefinite-length container.
    BadBreak,
    /// A data item carries more tags than are preserved per item.
    TooManyTags,
    /// The content under an interpreted tag has the wrong type.
    BadTagContent,
    /// Invalid UTF-8 in a text string.
    Utf8Invalid,
    /// Indefinite-length strings need an allocator to splice chunks and are
    /// not supported by this allocation-free core.
    IndefiniteStringUnsupported,

    /// Reserved for map-search callbacks to signal a caller-defined failure.
    CallbackFail,
}

/// A decode error with a stable code and the byte offset where it was detected.
///
/// Offsets refer to the byte position in the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CborError {
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset into the input where the error was detected.
    pub offset: usize,
}

impl CborError {
    /// Construct an error at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }
}

impl fmt::Display for CborError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.code {
            ErrorCode::UnexpectedType => "unexpected item type or tagging",
            ErrorCode::NoMoreItems => "no more items in the bounded region",
            ErrorCode::ArrayNestingTooDeep => "nesting deeper than the fixed stack",
            ErrorCode::CloseMismatch => "exit does not match the entered region",
            ErrorCode::HitEnd => "unexpected end of input",
            ErrorCode::LabelNotFound => "label not found in map",
            ErrorCode::DuplicateLabel => "duplicate label in map",
            ErrorCode::MapNotEntered => "no map is entered",
            ErrorCode::UnclosedMapOrArray => "map or array still entered at finish",
            ErrorCode::MapLabelType => "map label is neither integer nor text",

            ErrorCode::IntOverflow => "negative integer too far from zero",
            ErrorCode::ConversionUnderOverflow => "value not representable in destination",
            ErrorCode::NumberSignConversion => "negative value requested as unsigned",
            ErrorCode::BadExpAndMantissa => "bad decimal fraction or bigfloat parts",
            ErrorCode::DateOverflow => "epoch date outside representable range",
            ErrorCode::FloatDisabled => "floating-point support is compiled out",

            ErrorCode::BadType7 => "reserved or malformed major type 7",
            ErrorCode::ReservedAdditionalInfo => "reserved additional info value",
            ErrorCode::ExtraBytes => "trailing bytes after top-level item",
            ErrorCode::StringTooLong => "string length exceeds address space",
            ErrorCode::BadBreak => "break outside indefinite-length container",
            ErrorCode::TooManyTags => "too many tags on one item",
            ErrorCode::BadTagContent => "wrong content type under tag",
            ErrorCode::Utf8Invalid => "text must be valid UTF-8",
            ErrorCode::IndefiniteStringUnsupported => "indefinite-length string unsupported",

            ErrorCode::CallbackFail => "map-search callback failed",
        };

        write!(f, "cbor error at {}: {msg}", self.offset)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CborError {}
