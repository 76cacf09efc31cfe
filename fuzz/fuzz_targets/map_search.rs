#![no_main]

use libfuzzer_sys::fuzz_target;

use cbor_cursor::{CborDecoder, CborType, MapQuery};

// Enter whatever map might be at the front and search it every way.
fuzz_target!(|data: &[u8]| {
    let mut d = CborDecoder::new(data);
    d.enter_map();

    let mut queries = [
        MapQuery::new(0i64, CborType::Any),
        MapQuery::new("a", CborType::Any),
        MapQuery::new(-1i64, CborType::Int64),
    ];
    let _ = d.get_items_in_map(&mut queries);
    let _ = d.get_item_in_map(1i64, CborType::Any);

    let mut none: [MapQuery<'_, '_>; 0] = [];
    let mut count = 0usize;
    let _ = d.get_items_in_map_with_callback(&mut none, |_| {
        count += 1;
        Ok(())
    });

    d.rewind_map();
    d.exit_map();
    let _ = d.finish();
});
