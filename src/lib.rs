//! # cbor-cursor
//!
//! Bounded, cursor-based pull decoding of CBOR (RFC 7049 / RFC 8949).
//!
//! Encoded CBOR is a tree: the leaves are integers, strings and other
//! scalars, the interior nodes are arrays and maps. Decoding with this crate
//! is a pre-order traversal of that tree driven by a single logical cursor.
//! [`CborDecoder::get_next`] consumes one item at a time; entering a map or
//! array narrows the traversal to it, and entered maps support lookup by
//! label, including batched lookup that fills many labels from one scan.
//!
//! ## Design principles
//!
//! - **Straight-line decoding.** The decoder keeps a sticky internal error:
//!   after the first failure every operation is a no-op and output
//!   parameters stay untouched, so decode code needs one error check, at
//!   [`CborDecoder::finish`].
//! - **Allocation-free.** The nesting stack is a fixed inline array, search
//!   builds no index, and every returned slice borrows from the input
//!   buffer (bignum mantissa copies go into caller-supplied buffers).
//! - **Tags are policy.** Typed getters take a [`TagRequirement`] stating
//!   whether the semantic tag must be present, must be absent, or may be
//!   either, matching how CBOR protocols actually fix tagging per field.
//!
//! ## Example
//!
//! ```
//! use cbor_cursor::CborDecoder;
//!
//! // {1: 2, 3: 4}
//! let input = [0xa2, 0x01, 0x02, 0x03, 0x04];
//!
//! let mut d = CborDecoder::new(&input);
//! let mut v = 0i64;
//! d.enter_map();
//! d.get_int64_in_map(3, &mut v);
//! d.exit_map();
//! d.finish().unwrap();
//! assert_eq!(v, 4);
//! ```
//!
//! ## Feature flags
//!
//! - `std` *(default)*: implements `std::error::Error` for [`CborError`].
//! - `float` *(default, implies `std`)*: half/single/double float decoding
//!   and the float legs of the conversion ladder. Without it, float-bearing
//!   input reports [`ErrorCode::FloatDisabled`].
//! - `simdutf8` *(default)*: SIMD validation of text strings.
//!
//! ## Safety
//!
//! This crate forbids `unsafe` code.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible (disable `float`, which needs the
//! standard library's float math). No allocator is required.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod convert;
mod decoder;
mod error;
mod getters;
mod item;
mod nesting;
mod search;
mod stream;
mod tags;

pub use crate::convert::Conversions;
pub use crate::decoder::CborDecoder;
pub use crate::error::{CborError, ErrorCode};
pub use crate::item::{CborType, Item, Label, Mantissa, Span, Tags, Value, MAX_TAGS_PER_ITEM};
pub use crate::nesting::MAX_NESTING;
pub use crate::search::MapQuery;
pub use crate::tags::TagRequirement;
