use cbor_cursor::{CborDecoder, Conversions, ErrorCode};

fn int64_of(bytes: &[u8], opts: Conversions) -> Result<i64, cbor_cursor::CborError> {
    let mut d = CborDecoder::new(bytes);
    let mut v = 0i64;
    d.get_int64_convert_all(opts, &mut v);
    d.finish().map(|()| v)
}

fn uint64_of(bytes: &[u8], opts: Conversions) -> Result<u64, cbor_cursor::CborError> {
    let mut d = CborDecoder::new(bytes);
    let mut v = 0u64;
    d.get_uint64_convert_all(opts, &mut v);
    d.finish().map(|()| v)
}

fn double_of(bytes: &[u8], opts: Conversions) -> Result<f64, cbor_cursor::CborError> {
    let mut d = CborDecoder::new(bytes);
    let mut v = 0f64;
    d.get_double_convert_all(opts, &mut v);
    d.finish().map(|()| v)
}

#[test]
fn plain_integers() {
    assert_eq!(int64_of(&[0x01], Conversions::XINT64).unwrap(), 1);
    assert_eq!(int64_of(&[0x29], Conversions::XINT64).unwrap(), -10);
    // -500
    assert_eq!(int64_of(&[0x39, 0x01, 0xf3], Conversions::XINT64).unwrap(), -500);
    assert_eq!(
        int64_of(
            &[0x1b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            Conversions::XINT64
        )
        .unwrap(),
        i64::MAX
    );
}

#[test]
fn uint64_range_overflows_int64() {
    // u64::MAX
    let bytes = [0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    assert_eq!(
        int64_of(&bytes, Conversions::XINT64).unwrap_err().code,
        ErrorCode::ConversionUnderOverflow
    );
    assert_eq!(uint64_of(&bytes, Conversions::XINT64).unwrap(), u64::MAX);
}

#[test]
fn too_negative_overflows() {
    // -1 - (2^64 - 1)
    let bytes = [0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    assert_eq!(
        int64_of(&bytes, Conversions::XINT64).unwrap_err().code,
        ErrorCode::IntOverflow
    );
}

#[test]
fn negative_to_unsigned_is_a_sign_error() {
    assert_eq!(
        uint64_of(&[0x20], Conversions::XINT64).unwrap_err().code,
        ErrorCode::NumberSignConversion
    );
}

#[test]
fn mask_gates_source_types() {
    // An integer is not accepted when only float sources are enabled.
    let mut d = CborDecoder::new(&[0x01]);
    let mut v = 0i64;
    d.get_int64_convert(Conversions::FLOAT | Conversions::DOUBLE, &mut v);
    assert_eq!(d.finish().unwrap_err().code, ErrorCode::UnexpectedType);
}

#[test]
fn strict_getter_rejects_floats() {
    // 2.5
    let bytes = [0xfb, 0x40, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    let mut d = CborDecoder::new(&bytes);
    let mut v = 0i64;
    d.get_int64(&mut v);
    assert_eq!(d.finish().unwrap_err().code, ErrorCode::UnexpectedType);
}

#[test]
fn float_to_int_rounds_ties_to_even() {
    // 2.5 -> 2
    let bytes = [0xfb, 0x40, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    assert_eq!(int64_of(&bytes, Conversions::DOUBLE).unwrap(), 2);

    // 3.5 -> 4
    let bytes = [0xfb, 0x40, 0x0c, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    assert_eq!(int64_of(&bytes, Conversions::DOUBLE).unwrap(), 4);

    // half-precision 1.5 -> 2
    let bytes = [0xf9, 0x3e, 0x00];
    assert_eq!(
        int64_of(&bytes, Conversions::FLOAT | Conversions::DOUBLE).unwrap(),
        2
    );
}

#[test]
fn double_at_two_pow_63_overflows_int64() {
    // 2^63
    let bytes = [0xfb, 0x43, 0xe0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    let mut d = CborDecoder::new(&bytes);
    let mut v = 0i64;
    d.get_int64_convert(Conversions::FLOAT | Conversions::DOUBLE, &mut v);
    assert_eq!(
        d.finish().unwrap_err().code,
        ErrorCode::ConversionUnderOverflow
    );
    assert_eq!(v, 0);
}

#[test]
fn nan_and_infinity_do_not_convert() {
    // NaN
    let bytes = [0xf9, 0x7e, 0x00];
    assert_eq!(
        int64_of(&bytes, Conversions::FLOAT | Conversions::DOUBLE)
            .unwrap_err()
            .code,
        ErrorCode::ConversionUnderOverflow
    );

    // Infinity
    let bytes = [0xf9, 0x7c, 0x00];
    assert_eq!(
        uint64_of(&bytes, Conversions::FLOAT | Conversions::DOUBLE)
            .unwrap_err()
            .code,
        ErrorCode::ConversionUnderOverflow
    );
}

#[test]
fn negative_float_to_unsigned() {
    // -1.5
    let bytes = [0xf9, 0xbe, 0x00];
    assert_eq!(
        uint64_of(&bytes, Conversions::FLOAT | Conversions::DOUBLE)
            .unwrap_err()
            .code,
        ErrorCode::NumberSignConversion
    );
}

#[test]
fn floats_decode_to_double() {
    // 100000.0 single-precision
    let bytes = [0xfa, 0x47, 0xc3, 0x50, 0x00];
    assert_eq!(
        double_of(&bytes, Conversions::FLOAT | Conversions::DOUBLE).unwrap(),
        100_000.0
    );

    // 65504.0 half-precision
    let bytes = [0xf9, 0x7b, 0xff];
    assert_eq!(
        double_of(&bytes, Conversions::FLOAT | Conversions::DOUBLE).unwrap(),
        65504.0
    );
}

#[test]
fn integers_convert_to_double() {
    assert_eq!(double_of(&[0x18, 0x64], Conversions::INT64).unwrap(), 100.0);
    assert_eq!(double_of(&[0x29], Conversions::INT64).unwrap(), -10.0);
    // u64::MAX rounds to 2^64
    let bytes = [0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    assert_eq!(
        double_of(&bytes, Conversions::UINT64).unwrap(),
        18_446_744_073_709_551_616.0
    );
}

#[test]
fn bignum_conversions() {
    // 2(h'0100') = 256
    let bytes = [0xc2, 0x42, 0x01, 0x00];
    assert_eq!(int64_of(&bytes, Conversions::BIG_NUM).unwrap(), 256);
    assert_eq!(uint64_of(&bytes, Conversions::BIG_NUM).unwrap(), 256);

    // 3(h'0100') = -257
    let bytes = [0xc3, 0x42, 0x01, 0x00];
    assert_eq!(int64_of(&bytes, Conversions::BIG_NUM).unwrap(), -257);
    assert_eq!(
        uint64_of(&bytes, Conversions::BIG_NUM).unwrap_err().code,
        ErrorCode::NumberSignConversion
    );
}

#[test]
fn bignum_leading_zeros_are_insignificant() {
    // 2(h'00000005') = 5
    let bytes = [0xc2, 0x44, 0x00, 0x00, 0x00, 0x05];
    assert_eq!(int64_of(&bytes, Conversions::BIG_NUM).unwrap(), 5);
}

#[test]
fn bignum_overflow_detected_by_magnitude() {
    // nine significant bytes
    let bytes = [
        0xc2, 0x49, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    assert_eq!(
        uint64_of(&bytes, Conversions::BIG_NUM).unwrap_err().code,
        ErrorCode::ConversionUnderOverflow
    );

    // 2^64 - 1 fits u64 but not i64
    let bytes = [
        0xc2, 0x48, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    ];
    assert_eq!(uint64_of(&bytes, Conversions::BIG_NUM).unwrap(), u64::MAX);
    assert_eq!(
        int64_of(&bytes, Conversions::BIG_NUM).unwrap_err().code,
        ErrorCode::ConversionUnderOverflow
    );
}

#[test]
fn basic_convert_ignores_extended_sources() {
    // The ALL mask enables bignums, but the non-all converter does not
    // handle them.
    let bytes = [0xc2, 0x42, 0x01, 0x00];
    let mut d = CborDecoder::new(&bytes);
    let mut v = 0i64;
    d.get_int64_convert(Conversions::ALL, &mut v);
    assert_eq!(d.finish().unwrap_err().code, ErrorCode::UnexpectedType);
}

#[test]
fn decimal_fraction_to_int_truncates() {
    // 4([-2, 27315]) = 273.15
    let bytes = [0xc4, 0x82, 0x21, 0x19, 0x6a, 0xb3];
    assert_eq!(
        int64_of(&bytes, Conversions::DECIMAL_FRACTION).unwrap(),
        273
    );
}

#[test]
fn decimal_fraction_scaling_up() {
    // 4([3, 2]) = 2000
    let bytes = [0xc4, 0x82, 0x03, 0x02];
    assert_eq!(
        int64_of(&bytes, Conversions::DECIMAL_FRACTION).unwrap(),
        2000
    );
    assert_eq!(
        uint64_of(&bytes, Conversions::DECIMAL_FRACTION).unwrap(),
        2000
    );
}

#[test]
fn decimal_fraction_underflow_toward_zero() {
    // 4([-3, 5]) scales below one
    let bytes = [0xc4, 0x82, 0x22, 0x05];
    assert_eq!(
        int64_of(&bytes, Conversions::DECIMAL_FRACTION)
            .unwrap_err()
            .code,
        ErrorCode::ConversionUnderOverflow
    );
}

#[test]
fn decimal_fraction_zero_mantissa_is_zero() {
    // 4([-3, 0]) = 0
    let bytes = [0xc4, 0x82, 0x22, 0x00];
    assert_eq!(int64_of(&bytes, Conversions::DECIMAL_FRACTION).unwrap(), 0);
}

#[test]
fn decimal_fraction_overflow() {
    // 4([100, 1])
    let bytes = [0xc4, 0x82, 0x18, 0x64, 0x01];
    assert_eq!(
        int64_of(&bytes, Conversions::DECIMAL_FRACTION)
            .unwrap_err()
            .code,
        ErrorCode::ConversionUnderOverflow
    );
}

#[test]
fn negative_decimal_fraction_to_unsigned() {
    // 4([0, -1])
    let bytes = [0xc4, 0x82, 0x00, 0x20];
    assert_eq!(
        uint64_of(&bytes, Conversions::DECIMAL_FRACTION)
            .unwrap_err()
            .code,
        ErrorCode::NumberSignConversion
    );
}

#[test]
fn bigfloat_scales_by_two() {
    // 5([-1, 3]) = 1.5
    let bytes = [0xc5, 0x82, 0x20, 0x03];
    assert_eq!(int64_of(&bytes, Conversions::BIGFLOAT).unwrap(), 1);
    assert_eq!(double_of(&bytes, Conversions::BIGFLOAT).unwrap(), 1.5);

    // 5([4, 3]) = 48
    let bytes = [0xc5, 0x82, 0x04, 0x03];
    assert_eq!(int64_of(&bytes, Conversions::BIGFLOAT).unwrap(), 48);
}

#[test]
fn decimal_fraction_with_bignum_mantissa() {
    // 4([2, 2(h'05')]) = 500
    let bytes = [0xc4, 0x82, 0x02, 0xc2, 0x41, 0x05];
    assert_eq!(
        int64_of(&bytes, Conversions::DECIMAL_FRACTION).unwrap(),
        500
    );

    // 4([0, 3(h'05')]) = -6
    let bytes = [0xc4, 0x82, 0x00, 0xc3, 0x41, 0x05];
    assert_eq!(int64_of(&bytes, Conversions::DECIMAL_FRACTION).unwrap(), -6);
}

#[test]
fn decimal_fraction_to_double() {
    // 4([-2, 27315]) = 273.15
    let bytes = [0xc4, 0x82, 0x21, 0x19, 0x6a, 0xb3];
    let v = double_of(&bytes, Conversions::DECIMAL_FRACTION).unwrap();
    assert!((v - 273.15).abs() < 1e-9);
}

#[test]
fn extreme_exponents_saturate_doubles() {
    // 4([10000, 1]) saturates to infinity rather than erroring
    let bytes = [0xc4, 0x82, 0x19, 0x27, 0x10, 0x01];
    assert_eq!(
        double_of(&bytes, Conversions::DECIMAL_FRACTION).unwrap(),
        f64::INFINITY
    );

    // 4([-10000, 1]) collapses to zero
    let bytes = [0xc4, 0x82, 0x39, 0x27, 0x0f, 0x01];
    assert_eq!(
        double_of(&bytes, Conversions::DECIMAL_FRACTION).unwrap(),
        0.0
    );
}

#[test]
fn bignum_to_double_folds_bytes() {
    // 2(h'010000000000000000') = 2^64
    let bytes = [
        0xc2, 0x49, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    assert_eq!(
        double_of(&bytes, Conversions::BIG_NUM).unwrap(),
        18_446_744_073_709_551_616.0
    );
}

#[test]
fn malformed_fraction_pairs() {
    // 4(1): content is not an array
    let bytes = [0xc4, 0x01];
    let mut d = CborDecoder::new(&bytes);
    assert_eq!(
        d.get_next().unwrap_err().code,
        ErrorCode::BadExpAndMantissa
    );

    // 4([1]): wrong arity
    let bytes = [0xc4, 0x81, 0x01];
    let mut d = CborDecoder::new(&bytes);
    assert_eq!(
        d.get_next().unwrap_err().code,
        ErrorCode::BadExpAndMantissa
    );

    // 4(["x", 1]): exponent is not an integer
    let bytes = [0xc4, 0x82, 0x61, 0x78, 0x01];
    let mut d = CborDecoder::new(&bytes);
    assert_eq!(
        d.get_next().unwrap_err().code,
        ErrorCode::BadExpAndMantissa
    );
}

#[test]
fn conversions_by_label() {
    // {1: 2.5, 2: 4([3, 2])}
    let bytes = [
        0xa2, 0x01, 0xfb, 0x40, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0xc4, 0x82,
        0x03, 0x02,
    ];

    let mut d = CborDecoder::new(&bytes);
    d.enter_map();
    let mut half = 0i64;
    let mut scaled = 0u64;
    d.get_int64_convert_in_map(1, Conversions::DOUBLE, &mut half);
    d.get_uint64_convert_all_in_map(2, Conversions::DECIMAL_FRACTION, &mut scaled);
    d.exit_map();
    d.finish().unwrap();
    assert_eq!(half, 2);
    assert_eq!(scaled, 2000);
}
