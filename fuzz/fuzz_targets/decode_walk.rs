#![no_main]

use libfuzzer_sys::fuzz_target;

use cbor_cursor::CborDecoder;

// Walk arbitrary input as a CBOR sequence and make sure the traversal
// engine neither panics nor runs away.
fuzz_target!(|data: &[u8]| {
    let mut d = CborDecoder::new(data);
    let mut steps = 0usize;

    while steps < 1 << 16 && d.get_next().is_ok() {
        steps += 1;
    }

    let _ = d.take_error();
    let _ = d.partial_finish();
    let _ = d.finish();
});
