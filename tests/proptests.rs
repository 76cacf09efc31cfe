// Property-based tests for the bounded traversal engine.
//
// These build random documents with a minimal test-local encoder and check
// the cursor invariants: bound fidelity, enter/exit vs. skip equivalence,
// and rewind determinism. Sizes are intentionally conservative to keep CI
// fast.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;

use cbor_cursor::{CborDecoder, CborType, ErrorCode, Value};

#[derive(Debug, Clone)]
enum Doc {
    Int(i64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<Doc>),
    Map(Vec<(i64, Doc)>),
}

fn write_head(out: &mut Vec<u8>, major: u8, arg: u64) {
    let m = major << 5;
    if arg < 24 {
        out.push(m | u8::try_from(arg).unwrap());
    } else if arg <= u64::from(u8::MAX) {
        out.push(m | 24);
        out.push(u8::try_from(arg).unwrap());
    } else if arg <= u64::from(u16::MAX) {
        out.push(m | 25);
        out.extend_from_slice(&u16::try_from(arg).unwrap().to_be_bytes());
    } else if arg <= u64::from(u32::MAX) {
        out.push(m | 26);
        out.extend_from_slice(&u32::try_from(arg).unwrap().to_be_bytes());
    } else {
        out.push(m | 27);
        out.extend_from_slice(&arg.to_be_bytes());
    }
}

fn write_int(out: &mut Vec<u8>, n: i64) {
    if n >= 0 {
        write_head(out, 0, n.unsigned_abs());
    } else {
        write_head(out, 1, (-1 - n).unsigned_abs());
    }
}

fn encode(doc: &Doc, out: &mut Vec<u8>) {
    match doc {
        Doc::Int(n) => write_int(out, *n),
        Doc::Bytes(b) => {
            write_head(out, 2, b.len() as u64);
            out.extend_from_slice(b);
        }
        Doc::Text(s) => {
            write_head(out, 3, s.len() as u64);
            out.extend_from_slice(s.as_bytes());
        }
        Doc::Array(items) => {
            write_head(out, 4, items.len() as u64);
            for item in items {
                encode(item, out);
            }
        }
        Doc::Map(entries) => {
            write_head(out, 5, entries.len() as u64);
            for (label, value) in entries {
                write_int(out, *label);
                encode(value, out);
            }
        }
    }
}

fn arb_doc() -> impl Strategy<Value = Doc> {
    let leaf = prop_oneof![
        4 => any::<i64>().prop_map(Doc::Int),
        2 => proptest::collection::vec(any::<u8>(), 0..=24).prop_map(Doc::Bytes),
        2 => "[a-z]{0,24}".prop_map(Doc::Text),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..=6).prop_map(Doc::Array),
            proptest::collection::vec((any::<i64>(), inner), 0..=6)
                .prop_map(|mut entries| {
                    // Unique labels so lookups are never duplicates.
                    entries.sort_by_key(|(label, _)| *label);
                    entries.dedup_by_key(|(label, _)| *label);
                    Doc::Map(entries)
                }),
        ]
    })
}

/// Recursively consume one document, entering every container.
fn walk(d: &mut CborDecoder<'_>, doc: &Doc) {
    match doc {
        Doc::Int(_) | Doc::Bytes(_) | Doc::Text(_) => {
            d.get_next().unwrap();
        }
        Doc::Array(items) => {
            d.enter_array();
            for item in items {
                walk(d, item);
            }
            assert_eq!(d.get_next().unwrap_err().code, ErrorCode::NoMoreItems);
            d.exit_array();
        }
        Doc::Map(entries) => {
            d.enter_map();
            for (_, value) in entries {
                walk(d, value);
            }
            assert_eq!(d.get_next().unwrap_err().code, ErrorCode::NoMoreItems);
            d.exit_map();
        }
    }
}

proptest! {
    /// One `get_next` consumes a whole document, however nested.
    #[test]
    fn skip_consumes_whole_documents(doc in arb_doc()) {
        let mut bytes = Vec::new();
        encode(&doc, &mut bytes);

        let mut d = CborDecoder::new(&bytes);
        d.get_next().unwrap();
        d.finish().unwrap();
    }

    /// A full walk entering every container balances out.
    #[test]
    fn full_walk_balances(doc in arb_doc()) {
        let mut bytes = Vec::new();
        encode(&doc, &mut bytes);

        let mut d = CborDecoder::new(&bytes);
        walk(&mut d, &doc);
        d.finish().unwrap();
    }

    /// Enter-then-exit leaves the cursor exactly where skipping would.
    #[test]
    fn enter_exit_equals_skip(doc in arb_doc(), tail in any::<i64>()) {
        let mut bytes = Vec::new();
        encode(&doc, &mut bytes);
        write_int(&mut bytes, tail);

        let mut by_skip = CborDecoder::new(&bytes);
        by_skip.get_next().unwrap();
        let skipped = by_skip.get_next().unwrap();

        let mut by_enter = CborDecoder::new(&bytes);
        match doc {
            Doc::Array(_) => {
                by_enter.enter_array();
                by_enter.exit_array();
            }
            Doc::Map(_) => {
                by_enter.enter_map();
                by_enter.exit_map();
            }
            _ => {
                by_enter.get_next().unwrap();
            }
        }
        let entered = by_enter.get_next().unwrap();

        prop_assert_eq!(skipped, entered);
        by_skip.finish().unwrap();
        by_enter.finish().unwrap();
    }

    /// An entered array yields exactly its declared count of items.
    #[test]
    fn bound_fidelity(items in proptest::collection::vec(any::<i64>(), 0..=12)) {
        let mut bytes = Vec::new();
        encode(&Doc::Array(items.iter().copied().map(Doc::Int).collect()), &mut bytes);

        let mut d = CborDecoder::new(&bytes);
        d.enter_array();
        for expected in &items {
            let item = d.get_next().unwrap();
            prop_assert_eq!(item.value, Value::Int(*expected));
        }
        prop_assert_eq!(d.get_next().unwrap_err().code, ErrorCode::NoMoreItems);
        d.exit_array();
        d.finish().unwrap();
    }

    /// Rewinding a map replays identical items.
    #[test]
    fn rewind_is_deterministic(entries in proptest::collection::btree_map(any::<i64>(), any::<i64>(), 0..=8)) {
        let doc = Doc::Map(entries.iter().map(|(k, v)| (*k, Doc::Int(*v))).collect());
        let mut bytes = Vec::new();
        encode(&doc, &mut bytes);

        let mut d = CborDecoder::new(&bytes);
        d.enter_map();
        let mut first_pass = Vec::new();
        while let Ok(item) = d.get_next() {
            first_pass.push(item);
        }
        d.rewind_map();
        let mut second_pass = Vec::new();
        while let Ok(item) = d.get_next() {
            second_pass.push(item);
        }
        prop_assert_eq!(first_pass, second_pass);
        d.exit_map();
        d.finish().unwrap();
    }

    /// Every present label is found by search, with the right value.
    #[test]
    fn search_finds_every_label(entries in proptest::collection::btree_map(any::<i64>(), any::<i64>(), 1..=8)) {
        let doc = Doc::Map(entries.iter().map(|(k, v)| (*k, Doc::Int(*v))).collect());
        let mut bytes = Vec::new();
        encode(&doc, &mut bytes);

        let mut d = CborDecoder::new(&bytes);
        d.enter_map();
        for (label, value) in &entries {
            let item = d.get_item_in_map(*label, CborType::Any).unwrap();
            prop_assert_eq!(item.value, Value::Int(*value));
        }
        d.exit_map();
        d.finish().unwrap();
    }
}
