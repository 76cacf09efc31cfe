//! Typed getters.
//!
//! Each getter consumes exactly one complete data item (or searches the
//! entered map when given a label), checks type and tagging, converts, and
//! writes the result through its output parameter. On any failure the error
//! latches and the outputs are left untouched, so long decode sequences can
//! run without intermediate checks.

use crate::convert::{self, Conversions};
use crate::decoder::CborDecoder;
use crate::item::{exp_and_mantissa, CborType, Item, Label, Mantissa, Value};
use crate::tags::{TagRequirement, TagSpec};
use crate::{CborError, ErrorCode};

fn unexpected(item: &Item<'_>) -> CborError {
    CborError::new(ErrorCode::UnexpectedType, item.start)
}

fn text_payload<'a>(item: &Item<'a>) -> Option<&'a str> {
    match item.value {
        Value::Text(s)
        | Value::DateString(s)
        | Value::Uri(s)
        | Value::Base64(s)
        | Value::Base64Url(s)
        | Value::Regex(s)
        | Value::Mime(s) => Some(s),
        _ => None,
    }
}

fn copy_into<'b>(src: &[u8], buf: &'b mut [u8], off: usize) -> Result<&'b [u8], CborError> {
    if src.len() > buf.len() {
        return Err(CborError::new(ErrorCode::StringTooLong, off));
    }
    let (dst, _) = buf.split_at_mut(src.len());
    dst.copy_from_slice(src);
    Ok(dst)
}

/// Copy a mantissa's magnitude into `buf`, minimal-length for plain
/// integers, verbatim for bignums. Returns the magnitude and the sign,
/// negative meaning a value of `-1 - magnitude`.
fn copy_mantissa<'b>(
    mantissa: Mantissa<'_>,
    buf: &'b mut [u8],
    off: usize,
) -> Result<(&'b [u8], bool), CborError> {
    match mantissa {
        Mantissa::Int(n) => {
            let negative = n < 0;
            let mag = if negative {
                (-1 - n).unsigned_abs()
            } else {
                n.unsigned_abs()
            };
            let raw = mag.to_be_bytes();
            let skip = raw.iter().position(|&b| b != 0).unwrap_or(raw.len());
            Ok((copy_into(&raw[skip..], buf, off)?, negative))
        }
        Mantissa::PosBig(b) => Ok((copy_into(b, buf, off)?, false)),
        Mantissa::NegBig(b) => Ok((copy_into(b, buf, off)?, true)),
    }
}

impl<'a> CborDecoder<'a> {
    // ---- signed integers ----

    /// Decode the next item as an `i64`. The item must be a CBOR integer of
    /// either sign; a negative integer below `i64::MIN` reports
    /// [`ErrorCode::ConversionUnderOverflow`].
    pub fn get_int64(&mut self, value: &mut i64) {
        self.get_int64_convert(Conversions::XINT64, value);
    }

    /// [`get_int64`](Self::get_int64) for the map entry labeled `label`.
    pub fn get_int64_in_map<'l>(&mut self, label: impl Into<Label<'l>>, value: &mut i64) {
        self.get_int64_convert_in_map(label, Conversions::XINT64, value);
    }

    /// Decode the next item as an `i64`, converting from the integer and
    /// float representations enabled in `opts`.
    pub fn get_int64_convert(&mut self, opts: Conversions, value: &mut i64) {
        let Some(item) = self.consume_checked() else {
            return;
        };
        let r = convert::int64(&item, opts);
        self.apply(value, r);
    }

    /// [`get_int64_convert`](Self::get_int64_convert) by map label.
    pub fn get_int64_convert_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        opts: Conversions,
        value: &mut i64,
    ) {
        let Some(item) = self.find_checked(label.into()) else {
            return;
        };
        let r = convert::int64(&item, opts);
        self.apply(value, r);
    }

    /// Decode the next item as an `i64` with the full conversion ladder:
    /// bignums, decimal fractions and bigfloats join the scalar sources.
    ///
    /// Those representations hold numbers far beyond 64 bits, so
    /// [`ErrorCode::ConversionUnderOverflow`] is a common outcome. A value
    /// that scales below one reports the same error unless its mantissa is
    /// zero, in which case the result is zero.
    pub fn get_int64_convert_all(&mut self, opts: Conversions, value: &mut i64) {
        let Some(item) = self.consume_checked() else {
            return;
        };
        let r = convert::int64_all(&item, opts);
        self.apply(value, r);
    }

    /// [`get_int64_convert_all`](Self::get_int64_convert_all) by map label.
    pub fn get_int64_convert_all_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        opts: Conversions,
        value: &mut i64,
    ) {
        let Some(item) = self.find_checked(label.into()) else {
            return;
        };
        let r = convert::int64_all(&item, opts);
        self.apply(value, r);
    }

    // ---- unsigned integers ----

    /// Decode the next item as a `u64`. A negative integer reports
    /// [`ErrorCode::NumberSignConversion`].
    pub fn get_uint64(&mut self, value: &mut u64) {
        self.get_uint64_convert(Conversions::XINT64, value);
    }

    /// [`get_uint64`](Self::get_uint64) for the map entry labeled `label`.
    pub fn get_uint64_in_map<'l>(&mut self, label: impl Into<Label<'l>>, value: &mut u64) {
        self.get_uint64_convert_in_map(label, Conversions::XINT64, value);
    }

    /// Decode the next item as a `u64`, converting from the integer and
    /// float representations enabled in `opts`.
    pub fn get_uint64_convert(&mut self, opts: Conversions, value: &mut u64) {
        let Some(item) = self.consume_checked() else {
            return;
        };
        let r = convert::uint64(&item, opts);
        self.apply(value, r);
    }

    /// [`get_uint64_convert`](Self::get_uint64_convert) by map label.
    pub fn get_uint64_convert_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        opts: Conversions,
        value: &mut u64,
    ) {
        let Some(item) = self.find_checked(label.into()) else {
            return;
        };
        let r = convert::uint64(&item, opts);
        self.apply(value, r);
    }

    /// Decode the next item as a `u64` with the full conversion ladder.
    pub fn get_uint64_convert_all(&mut self, opts: Conversions, value: &mut u64) {
        let Some(item) = self.consume_checked() else {
            return;
        };
        let r = convert::uint64_all(&item, opts);
        self.apply(value, r);
    }

    /// [`get_uint64_convert_all`](Self::get_uint64_convert_all) by map label.
    pub fn get_uint64_convert_all_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        opts: Conversions,
        value: &mut u64,
    ) {
        let Some(item) = self.find_checked(label.into()) else {
            return;
        };
        let r = convert::uint64_all(&item, opts);
        self.apply(value, r);
    }

    // ---- floats ----

    /// Decode the next item as an `f64`. The item must be a half-, single-
    /// or double-precision float.
    #[cfg(feature = "float")]
    pub fn get_double(&mut self, value: &mut f64) {
        self.get_double_convert(Conversions::FLOAT | Conversions::DOUBLE, value);
    }

    /// [`get_double`](Self::get_double) for the map entry labeled `label`.
    #[cfg(feature = "float")]
    pub fn get_double_in_map<'l>(&mut self, label: impl Into<Label<'l>>, value: &mut f64) {
        self.get_double_convert_in_map(label, Conversions::FLOAT | Conversions::DOUBLE, value);
    }

    /// Decode the next item as an `f64`, converting from the integer and
    /// float representations enabled in `opts`. Integer sources always
    /// convert, though a large 64-bit integer may lose precision.
    #[cfg(feature = "float")]
    pub fn get_double_convert(&mut self, opts: Conversions, value: &mut f64) {
        let Some(item) = self.consume_checked() else {
            return;
        };
        let r = convert::double(&item, opts);
        self.apply(value, r);
    }

    /// [`get_double_convert`](Self::get_double_convert) by map label.
    #[cfg(feature = "float")]
    pub fn get_double_convert_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        opts: Conversions,
        value: &mut f64,
    ) {
        let Some(item) = self.find_checked(label.into()) else {
            return;
        };
        let r = convert::double(&item, opts);
        self.apply(value, r);
    }

    /// Decode the next item as an `f64` with the full conversion ladder.
    /// Values outside the double range come back as ±0 or ±∞ rather than
    /// as an error.
    #[cfg(feature = "float")]
    pub fn get_double_convert_all(&mut self, opts: Conversions, value: &mut f64) {
        let Some(item) = self.consume_checked() else {
            return;
        };
        let r = convert::double_all(&item, opts);
        self.apply(value, r);
    }

    /// [`get_double_convert_all`](Self::get_double_convert_all) by map label.
    #[cfg(feature = "float")]
    pub fn get_double_convert_all_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        opts: Conversions,
        value: &mut f64,
    ) {
        let Some(item) = self.find_checked(label.into()) else {
            return;
        };
        let r = convert::double_all(&item, opts);
        self.apply(value, r);
    }

    // ---- strings and booleans ----

    /// Decode the next item as a byte string. Any tag on the item is a
    /// mismatch; use [`get_next`](Self::get_next) for tagged bytes.
    pub fn get_bytes(&mut self, value: &mut &'a [u8]) {
        let spec = TagSpec::new(
            TagRequirement::ContentType,
            &[CborType::ByteString],
            &[CborType::ByteString],
        );
        let Some(item) = self.tagged_at_cursor(&spec) else {
            return;
        };
        match item.value {
            Value::Bytes(b) => *value = b,
            _ => {
                let e = unexpected(&item);
                self.latch(e);
            }
        }
    }

    /// [`get_bytes`](Self::get_bytes) for the map entry labeled `label`.
    pub fn get_bytes_in_map<'l>(&mut self, label: impl Into<Label<'l>>, value: &mut &'a [u8]) {
        let spec = TagSpec::new(
            TagRequirement::ContentType,
            &[CborType::ByteString],
            &[CborType::ByteString],
        );
        let Some(item) = self.tagged_in_map(label.into(), &spec) else {
            return;
        };
        match item.value {
            Value::Bytes(b) => *value = b,
            _ => {
                let e = unexpected(&item);
                self.latch(e);
            }
        }
    }

    /// Decode the next item as a text string.
    pub fn get_text(&mut self, value: &mut &'a str) {
        let spec = TagSpec::new(
            TagRequirement::ContentType,
            &[CborType::TextString],
            &[CborType::TextString],
        );
        self.tagged_string(&spec, value);
    }

    /// [`get_text`](Self::get_text) for the map entry labeled `label`.
    pub fn get_text_in_map<'l>(&mut self, label: impl Into<Label<'l>>, value: &mut &'a str) {
        let spec = TagSpec::new(
            TagRequirement::ContentType,
            &[CborType::TextString],
            &[CborType::TextString],
        );
        self.tagged_string_in_map(label.into(), &spec, value);
    }

    /// Decode the next item as a boolean.
    pub fn get_bool(&mut self, value: &mut bool) {
        let Some(item) = self.consume_checked() else {
            return;
        };
        self.store_bool(&item, value);
    }

    /// [`get_bool`](Self::get_bool) for the map entry labeled `label`.
    pub fn get_bool_in_map<'l>(&mut self, label: impl Into<Label<'l>>, value: &mut bool) {
        let Some(item) = self.find_checked(label.into()) else {
            return;
        };
        self.store_bool(&item, value);
    }

    // ---- tagged strings ----

    /// Decode the next item as an RFC 3339 date string (tag 0).
    pub fn get_date_string(&mut self, req: TagRequirement, value: &mut &'a str) {
        self.tagged_string(&date_string_spec(req), value);
    }

    /// [`get_date_string`](Self::get_date_string) by map label.
    pub fn get_date_string_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        value: &mut &'a str,
    ) {
        self.tagged_string_in_map(label.into(), &date_string_spec(req), value);
    }

    /// Decode the next item as a URI (tag 32).
    pub fn get_uri(&mut self, req: TagRequirement, value: &mut &'a str) {
        self.tagged_string(&uri_spec(req), value);
    }

    /// [`get_uri`](Self::get_uri) by map label.
    pub fn get_uri_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        value: &mut &'a str,
    ) {
        self.tagged_string_in_map(label.into(), &uri_spec(req), value);
    }

    /// Decode the next item as base64 text (tag 34). The base64 encoding is
    /// not removed.
    pub fn get_b64(&mut self, req: TagRequirement, value: &mut &'a str) {
        self.tagged_string(&b64_spec(req), value);
    }

    /// [`get_b64`](Self::get_b64) by map label.
    pub fn get_b64_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        value: &mut &'a str,
    ) {
        self.tagged_string_in_map(label.into(), &b64_spec(req), value);
    }

    /// Decode the next item as base64url text (tag 33). The encoding is not
    /// removed.
    pub fn get_b64url(&mut self, req: TagRequirement, value: &mut &'a str) {
        self.tagged_string(&b64url_spec(req), value);
    }

    /// [`get_b64url`](Self::get_b64url) by map label.
    pub fn get_b64url_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        value: &mut &'a str,
    ) {
        self.tagged_string_in_map(label.into(), &b64url_spec(req), value);
    }

    /// Decode the next item as a regular expression (tag 35).
    pub fn get_regex(&mut self, req: TagRequirement, value: &mut &'a str) {
        self.tagged_string(&regex_spec(req), value);
    }

    /// [`get_regex`](Self::get_regex) by map label.
    pub fn get_regex_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        value: &mut &'a str,
    ) {
        self.tagged_string_in_map(label.into(), &regex_spec(req), value);
    }

    /// Decode the next item as a MIME message (tag 36 or 257; the message
    /// itself is not parsed).
    ///
    /// `is_not_7bit`, when given, is set when the message came as tag 257
    /// or as a bare byte string, which may carry binary or 8-bit MIME.
    pub fn get_mime_message(
        &mut self,
        req: TagRequirement,
        message: &mut &'a [u8],
        is_not_7bit: Option<&mut bool>,
    ) {
        let Some(item) = self.tagged_at_cursor(&mime_spec(req)) else {
            return;
        };
        self.store_mime(&item, message, is_not_7bit);
    }

    /// [`get_mime_message`](Self::get_mime_message) by map label.
    pub fn get_mime_message_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        message: &mut &'a [u8],
        is_not_7bit: Option<&mut bool>,
    ) {
        let Some(item) = self.tagged_in_map(label.into(), &mime_spec(req)) else {
            return;
        };
        self.store_mime(&item, message, is_not_7bit);
    }

    /// Decode the next item as a binary UUID (tag 37).
    pub fn get_binary_uuid(&mut self, req: TagRequirement, value: &mut &'a [u8]) {
        let Some(item) = self.tagged_at_cursor(&uuid_spec(req)) else {
            return;
        };
        self.store_byte_payload(&item, value);
    }

    /// [`get_binary_uuid`](Self::get_binary_uuid) by map label.
    pub fn get_binary_uuid_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        value: &mut &'a [u8],
    ) {
        let Some(item) = self.tagged_in_map(label.into(), &uuid_spec(req)) else {
            return;
        };
        self.store_byte_payload(&item, value);
    }

    // ---- dates ----

    /// Decode the next item as an epoch date (tag 1), in whole seconds.
    ///
    /// Float epochs round toward negative infinity and the fractional part
    /// is discarded; use [`get_next`](Self::get_next) to see it.
    pub fn get_epoch_date(&mut self, req: TagRequirement, seconds: &mut i64) {
        let Some(item) = self.tagged_at_cursor(&epoch_spec(req)) else {
            return;
        };
        self.store_epoch(&item, seconds);
    }

    /// [`get_epoch_date`](Self::get_epoch_date) by map label.
    pub fn get_epoch_date_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        seconds: &mut i64,
    ) {
        let Some(item) = self.tagged_in_map(label.into(), &epoch_spec(req)) else {
            return;
        };
        self.store_epoch(&item, seconds);
    }

    // ---- bignums ----

    /// Decode the next item as a big number: a big-endian magnitude which
    /// may carry leading zeros.
    ///
    /// With an explicit tag the sign is on the wire and `is_negative`
    /// reports it; a negative value is `-1 - magnitude`. For a bare byte
    /// string the protocol must convey the sign and `is_negative` is set
    /// to `false`.
    pub fn get_bignum(
        &mut self,
        req: TagRequirement,
        value: &mut &'a [u8],
        is_negative: &mut bool,
    ) {
        let Some(item) = self.tagged_at_cursor(&bignum_spec(req)) else {
            return;
        };
        self.store_bignum(&item, value, is_negative);
    }

    /// [`get_bignum`](Self::get_bignum) by map label.
    pub fn get_bignum_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        value: &mut &'a [u8],
        is_negative: &mut bool,
    ) {
        let Some(item) = self.tagged_in_map(label.into(), &bignum_spec(req)) else {
            return;
        };
        self.store_bignum(&item, value, is_negative);
    }

    // ---- decimal fractions and bigfloats ----

    /// Decode the next item as a decimal fraction (tag 4), the value being
    /// `mantissa * 10^exponent`.
    ///
    /// A bignum mantissa is converted to `i64`;
    /// [`ErrorCode::ConversionUnderOverflow`] if it does not fit, and
    /// [`ErrorCode::BadExpAndMantissa`] for structural problems with the
    /// pair.
    pub fn get_decimal_fraction(
        &mut self,
        req: TagRequirement,
        mantissa: &mut i64,
        exponent: &mut i64,
    ) {
        let Some(item) = self.tagged_at_cursor(&decimal_fraction_spec(req)) else {
            return;
        };
        self.store_fraction_small(&item, CborType::DecimalFraction, mantissa, exponent);
    }

    /// [`get_decimal_fraction`](Self::get_decimal_fraction) by map label.
    pub fn get_decimal_fraction_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        mantissa: &mut i64,
        exponent: &mut i64,
    ) {
        let Some(item) = self.tagged_in_map(label.into(), &decimal_fraction_spec(req)) else {
            return;
        };
        self.store_fraction_small(&item, CborType::DecimalFraction, mantissa, exponent);
    }

    /// Decode the next item as a decimal fraction, copying the mantissa
    /// magnitude into `mantissa_buf` and borrowing the result from it.
    ///
    /// The copy keeps the core allocation-free while letting mantissas of
    /// any size through; [`ErrorCode::StringTooLong`] when the buffer cannot
    /// hold the magnitude. A negative mantissa is `-1 - magnitude`.
    pub fn get_decimal_fraction_big<'b>(
        &mut self,
        req: TagRequirement,
        mantissa_buf: &'b mut [u8],
        mantissa: &mut &'b [u8],
        is_negative: &mut bool,
        exponent: &mut i64,
    ) {
        let Some(item) = self.tagged_at_cursor(&decimal_fraction_spec(req)) else {
            return;
        };
        self.store_fraction_big(
            &item,
            CborType::DecimalFraction,
            mantissa_buf,
            mantissa,
            is_negative,
            exponent,
        );
    }

    /// [`get_decimal_fraction_big`](Self::get_decimal_fraction_big) by map
    /// label.
    pub fn get_decimal_fraction_big_in_map<'l, 'b>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        mantissa_buf: &'b mut [u8],
        mantissa: &mut &'b [u8],
        is_negative: &mut bool,
        exponent: &mut i64,
    ) {
        let Some(item) = self.tagged_in_map(label.into(), &decimal_fraction_spec(req)) else {
            return;
        };
        self.store_fraction_big(
            &item,
            CborType::DecimalFraction,
            mantissa_buf,
            mantissa,
            is_negative,
            exponent,
        );
    }

    /// Decode the next item as a bigfloat (tag 5), the value being
    /// `mantissa * 2^exponent`. Error handling matches
    /// [`get_decimal_fraction`](Self::get_decimal_fraction).
    pub fn get_big_float(&mut self, req: TagRequirement, mantissa: &mut i64, exponent: &mut i64) {
        let Some(item) = self.tagged_at_cursor(&bigfloat_spec(req)) else {
            return;
        };
        self.store_fraction_small(&item, CborType::Bigfloat, mantissa, exponent);
    }

    /// [`get_big_float`](Self::get_big_float) by map label.
    pub fn get_big_float_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        mantissa: &mut i64,
        exponent: &mut i64,
    ) {
        let Some(item) = self.tagged_in_map(label.into(), &bigfloat_spec(req)) else {
            return;
        };
        self.store_fraction_small(&item, CborType::Bigfloat, mantissa, exponent);
    }

    /// Decode the next item as a bigfloat with a caller-buffered mantissa;
    /// see [`get_decimal_fraction_big`](Self::get_decimal_fraction_big).
    pub fn get_big_float_big<'b>(
        &mut self,
        req: TagRequirement,
        mantissa_buf: &'b mut [u8],
        mantissa: &mut &'b [u8],
        is_negative: &mut bool,
        exponent: &mut i64,
    ) {
        let Some(item) = self.tagged_at_cursor(&bigfloat_spec(req)) else {
            return;
        };
        self.store_fraction_big(
            &item,
            CborType::Bigfloat,
            mantissa_buf,
            mantissa,
            is_negative,
            exponent,
        );
    }

    /// [`get_big_float_big`](Self::get_big_float_big) by map label.
    pub fn get_big_float_big_in_map<'l, 'b>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        mantissa_buf: &'b mut [u8],
        mantissa: &mut &'b [u8],
        is_negative: &mut bool,
        exponent: &mut i64,
    ) {
        let Some(item) = self.tagged_in_map(label.into(), &bigfloat_spec(req)) else {
            return;
        };
        self.store_fraction_big(
            &item,
            CborType::Bigfloat,
            mantissa_buf,
            mantissa,
            is_negative,
            exponent,
        );
    }

    // ---- shared plumbing ----

    fn consume_checked(&mut self) -> Option<Item<'a>> {
        if self.gate().is_err() {
            return None;
        }
        match self.next_item_raw() {
            Ok(item) => Some(item),
            Err(e) => {
                self.latch(e);
                None
            }
        }
    }

    fn find_checked(&mut self, label: Label<'_>) -> Option<Item<'a>> {
        if self.gate().is_err() {
            return None;
        }
        match self.search_one(label, CborType::Any) {
            Ok(item) => Some(item),
            Err(e) => {
                self.latch(e);
                None
            }
        }
    }

    fn apply<T>(&mut self, out: &mut T, r: Result<T, CborError>) {
        match r {
            Ok(v) => *out = v,
            Err(e) => {
                self.latch(e);
            }
        }
    }

    fn tagged_at_cursor(&mut self, spec: &TagSpec) -> Option<Item<'a>> {
        let item = self.consume_checked()?;
        self.check_spec(item, spec)
    }

    fn tagged_in_map(&mut self, label: Label<'_>, spec: &TagSpec) -> Option<Item<'a>> {
        let item = self.find_checked(label)?;
        self.check_spec(item, spec)
    }

    fn check_spec(&mut self, item: Item<'a>, spec: &TagSpec) -> Option<Item<'a>> {
        if spec.matches(&item) {
            Some(item)
        } else {
            let e = unexpected(&item);
            self.latch(e);
            None
        }
    }

    fn tagged_string(&mut self, spec: &TagSpec, value: &mut &'a str) {
        let Some(item) = self.tagged_at_cursor(spec) else {
            return;
        };
        self.store_text(&item, value);
    }

    fn tagged_string_in_map(&mut self, label: Label<'_>, spec: &TagSpec, value: &mut &'a str) {
        let Some(item) = self.tagged_in_map(label, spec) else {
            return;
        };
        self.store_text(&item, value);
    }

    fn store_text(&mut self, item: &Item<'a>, value: &mut &'a str) {
        match text_payload(item) {
            Some(s) => *value = s,
            None => {
                let e = unexpected(item);
                self.latch(e);
            }
        }
    }

    fn store_bool(&mut self, item: &Item<'a>, value: &mut bool) {
        match item.value {
            Value::Bool(b) if item.tags.is_empty() => *value = b,
            _ => {
                let e = unexpected(item);
                self.latch(e);
            }
        }
    }

    fn store_byte_payload(&mut self, item: &Item<'a>, value: &mut &'a [u8]) {
        match item.value {
            Value::Bytes(b) | Value::Uuid(b) => *value = b,
            _ => {
                let e = unexpected(item);
                self.latch(e);
            }
        }
    }

    fn store_mime(
        &mut self,
        item: &Item<'a>,
        message: &mut &'a [u8],
        is_not_7bit: Option<&mut bool>,
    ) {
        let (payload, binary) = match item.value {
            Value::Mime(s) | Value::Text(s) => (s.as_bytes(), false),
            Value::BinaryMime(b) | Value::Bytes(b) => (b, true),
            _ => {
                let e = unexpected(item);
                self.latch(e);
                return;
            }
        };
        *message = payload;
        if let Some(flag) = is_not_7bit {
            *flag = binary;
        }
    }

    fn store_epoch(&mut self, item: &Item<'a>, seconds: &mut i64) {
        let r = match item.value {
            Value::EpochDate { seconds: s, .. } => Ok(s),
            Value::Int(n) => Ok(n),
            #[cfg(feature = "float")]
            Value::Double(d) => crate::item::split_epoch(d, item.start).map(|(s, _)| s),
            _ => Err(unexpected(item)),
        };
        self.apply(seconds, r);
    }

    fn store_bignum(&mut self, item: &Item<'a>, value: &mut &'a [u8], is_negative: &mut bool) {
        let (mag, negative) = match item.value {
            Value::PosBignum(b) => (b, false),
            Value::NegBignum(b) => (b, true),
            Value::Bytes(b) => (b, false),
            _ => {
                let e = unexpected(item);
                self.latch(e);
                return;
            }
        };
        *value = mag;
        *is_negative = negative;
    }

    /// The exponent and mantissa of a fraction item, decoding a bare
    /// `[exponent, mantissa]` array when the tag was not required.
    fn fraction_parts(
        &mut self,
        item: &Item<'a>,
        tagged: CborType,
    ) -> Option<(i64, Mantissa<'a>)> {
        let r = match item.value {
            Value::DecimalFraction { exponent, mantissa }
                if tagged == CborType::DecimalFraction =>
            {
                Ok((exponent, mantissa))
            }
            Value::Bigfloat { exponent, mantissa } if tagged == CborType::Bigfloat => {
                Ok((exponent, mantissa))
            }
            Value::Array { .. } => {
                exp_and_mantissa(self.stream().data(), item.value, item.start, self.depth_budget())
            }
            _ => Err(unexpected(item)),
        };
        match r {
            Ok(parts) => Some(parts),
            Err(e) => {
                self.latch(e);
                None
            }
        }
    }

    fn store_fraction_small(
        &mut self,
        item: &Item<'a>,
        tagged: CborType,
        mantissa: &mut i64,
        exponent: &mut i64,
    ) {
        let Some((exp, mant)) = self.fraction_parts(item, tagged) else {
            return;
        };
        match convert::mantissa_to_i64(mant) {
            Ok(m) => {
                *mantissa = m;
                *exponent = exp;
            }
            Err(code) => {
                let e = CborError::new(code, item.start);
                self.latch(e);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn store_fraction_big<'b>(
        &mut self,
        item: &Item<'a>,
        tagged: CborType,
        mantissa_buf: &'b mut [u8],
        mantissa: &mut &'b [u8],
        is_negative: &mut bool,
        exponent: &mut i64,
    ) {
        let Some((exp, mant)) = self.fraction_parts(item, tagged) else {
            return;
        };
        match copy_mantissa(mant, mantissa_buf, item.start) {
            Ok((mag, negative)) => {
                *mantissa = mag;
                *is_negative = negative;
                *exponent = exp;
            }
            Err(e) => {
                self.latch(e);
            }
        }
    }
}

const fn date_string_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(req, &[CborType::DateString], &[CborType::TextString])
}

const fn uri_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(req, &[CborType::Uri], &[CborType::TextString])
}

const fn b64_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(req, &[CborType::Base64], &[CborType::TextString])
}

const fn b64url_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(req, &[CborType::Base64Url], &[CborType::TextString])
}

const fn regex_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(req, &[CborType::Regex], &[CborType::TextString])
}

const fn mime_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(
        req,
        &[CborType::Mime, CborType::BinaryMime],
        &[CborType::TextString, CborType::ByteString],
    )
}

const fn uuid_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(req, &[CborType::Uuid], &[CborType::ByteString])
}

const fn epoch_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(
        req,
        &[CborType::EpochDate],
        &[CborType::Int64, CborType::Double],
    )
}

const fn bignum_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(
        req,
        &[CborType::PosBignum, CborType::NegBignum],
        &[CborType::ByteString],
    )
}

const fn decimal_fraction_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(req, &[CborType::DecimalFraction], &[CborType::Array])
}

const fn bigfloat_spec(req: TagRequirement) -> TagSpec {
    TagSpec::new(req, &[CborType::Bigfloat], &[CborType::Array])
}
