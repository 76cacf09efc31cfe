//! The decode context and traversal engine.
//!
//! Decoding is a pre-order walk driven by a single logical cursor. Entering
//! a map, array or byte-string-wrapped region narrows the cursor to that
//! region; exiting resumes just past it. Once any operation fails, the error
//! latches and every subsequent operation is a no-op, so decode code can run
//! straight-line with a single check at [`CborDecoder::finish`].

use crate::item::{read_item, CborType, Item, Value};
use crate::nesting::{Frame, FrameKind, NestingStack, MAX_NESTING};
use crate::stream::ByteStream;
use crate::tags::{TagRequirement, TagSpec};
use crate::{CborError, ErrorCode};

/// A bounded, cursor-based decoder over one CBOR input buffer.
///
/// The decoder owns only its fixed-size nesting stack and scalar state; all
/// returned slices borrow from the input buffer.
pub struct CborDecoder<'a> {
    stream: ByteStream<'a>,
    nesting: NestingStack,
    error: Option<CborError>,
}

impl<'a> CborDecoder<'a> {
    /// Attach a decoder to `data`, positioned at the first data item.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            stream: ByteStream::new(data, 0),
            nesting: NestingStack::new(),
            error: None,
        }
    }

    /// The latched error, if any operation has failed so far.
    ///
    /// # Errors
    ///
    /// Returns the first error any prior operation latched.
    pub fn last_error(&self) -> Result<(), CborError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Return and clear the latched error, allowing decoding to continue.
    ///
    /// # Errors
    ///
    /// Returns the first error any prior operation latched.
    pub fn take_error(&mut self) -> Result<(), CborError> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Whether a map, array or wrapped region is currently entered.
    #[must_use]
    pub const fn in_bounded_mode(&self) -> bool {
        !self.nesting.is_empty()
    }

    /// Validate complete, clean consumption of the input.
    ///
    /// # Errors
    ///
    /// Surfaces the latched error if any operation failed;
    /// [`ErrorCode::UnclosedMapOrArray`] if a region is still entered;
    /// [`ErrorCode::ExtraBytes`] if input remains past the top-level item.
    pub fn finish(&self) -> Result<(), CborError> {
        self.last_error()?;
        if !self.nesting.is_empty() {
            return Err(CborError::new(
                ErrorCode::UnclosedMapOrArray,
                self.stream.position(),
            ));
        }
        if self.stream.remaining() != 0 {
            return Err(CborError::new(ErrorCode::ExtraBytes, self.stream.position()));
        }
        Ok(())
    }

    /// Like [`finish`](Self::finish) but tolerating trailing input; returns
    /// the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Surfaces the latched error, or [`ErrorCode::UnclosedMapOrArray`] if a
    /// region is still entered.
    pub fn partial_finish(&self) -> Result<usize, CborError> {
        self.last_error()?;
        if !self.nesting.is_empty() {
            return Err(CborError::new(
                ErrorCode::UnclosedMapOrArray,
                self.stream.position(),
            ));
        }
        Ok(self.stream.position())
    }

    /// Consume and return the next data item in the current region,
    /// label and preserved tags included.
    ///
    /// An array or map comes back as a single header item spanning its whole
    /// subtree; enter it to visit the children.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::NoMoreItems`] at the end of the bounded region, or any
    /// decode error; all errors latch.
    pub fn get_next(&mut self) -> Result<Item<'a>, CborError> {
        self.gate()?;
        match self.next_item_raw() {
            Ok(item) => Ok(item),
            Err(e) => Err(self.latch(e)),
        }
    }

    /// Enter the map at the cursor, bounding decoding to it and enabling
    /// lookup by label.
    pub fn enter_map(&mut self) {
        self.enter_container(FrameKind::Map);
    }

    /// Enter the array at the cursor, bounding decoding to it.
    pub fn enter_array(&mut self) {
        self.enter_container(FrameKind::Array);
    }

    /// Exit the entered map, skipping any unread remainder. The cursor
    /// resumes just past the map.
    ///
    /// A pending [`ErrorCode::NoMoreItems`] is absorbed, so walking a map to
    /// its end and closing it is not an error.
    pub fn exit_map(&mut self) {
        self.exit_container(FrameKind::Map);
    }

    /// Exit the entered array, skipping any unread remainder.
    pub fn exit_array(&mut self) {
        self.exit_container(FrameKind::Array);
    }

    /// Enter the byte-string-wrapped CBOR at the cursor.
    ///
    /// Tags 24 (encoded CBOR item) and 63 (encoded CBOR sequence) are
    /// treated identically; `req` states whether such a tag must be present.
    /// The reader is re-aimed at the wrapped bytes — no separate decoder
    /// instance is created — and decoding is bounded to them until
    /// [`exit_bstr_wrapped`](Self::exit_bstr_wrapped).
    ///
    /// On success `bstr`, when given, receives the wrapped bytes. This is
    /// useful when the same bytes also need hashing or signature
    /// verification.
    pub fn enter_bstr_wrapped(&mut self, req: TagRequirement, bstr: Option<&mut &'a [u8]>) {
        if self.error.is_some() {
            return;
        }
        let item = match self.next_item_raw() {
            Ok(item) => item,
            Err(e) => {
                self.latch(e);
                return;
            }
        };
        self.enter_wrapped_item(&item, req, bstr);
    }

    /// Exit the entered byte-string-wrapped region.
    pub fn exit_bstr_wrapped(&mut self) {
        self.exit_container(FrameKind::BstrWrap);
    }

    /// Reset the cursor to the first entry of the entered map.
    ///
    /// Clears a pending [`ErrorCode::NoMoreItems`] so a map can be walked
    /// repeatedly. A no-op with [`ErrorCode::MapNotEntered`] when the top
    /// region is not a map.
    pub fn rewind_map(&mut self) {
        if let Some(e) = self.error {
            if e.code != ErrorCode::NoMoreItems {
                return;
            }
        }
        match self.nesting.top() {
            Some(frame) if frame.kind == FrameKind::Map => {
                let target = frame.first_child;
                self.error = None;
                self.stream.seek(target);
            }
            _ => {
                let e = CborError::new(ErrorCode::MapNotEntered, self.stream.position());
                self.latch(e);
            }
        }
    }

    // ---- crate-internal plumbing used by the search and getter layers ----

    pub(crate) fn gate(&self) -> Result<(), CborError> {
        self.last_error()
    }

    /// Latch `e` unless an earlier error already holds; returns the
    /// prevailing error.
    pub(crate) fn latch(&mut self, e: CborError) -> CborError {
        *self.error.get_or_insert(e)
    }

    pub(crate) const fn stream(&self) -> &ByteStream<'a> {
        &self.stream
    }

    pub(crate) fn top_frame(&self) -> Option<&Frame> {
        self.nesting.top()
    }

    pub(crate) const fn depth_budget(&self) -> usize {
        MAX_NESTING - self.nesting.depth()
    }

    /// Bound-gated read of the next item; does not latch.
    pub(crate) fn next_item_raw(&mut self) -> Result<Item<'a>, CborError> {
        let pos = self.stream.position();
        let in_map = match self.nesting.top() {
            Some(frame) => {
                if pos >= frame.end {
                    return Err(CborError::new(ErrorCode::NoMoreItems, pos));
                }
                frame.kind == FrameKind::Map
            }
            None => {
                if self.stream.remaining() == 0 {
                    return Err(CborError::new(ErrorCode::NoMoreItems, pos));
                }
                false
            }
        };
        let depth_budget = self.depth_budget();
        read_item(&mut self.stream, in_map, depth_budget)
    }

    fn enter_container(&mut self, kind: FrameKind) {
        if self.error.is_some() {
            return;
        }
        let item = match self.next_item_raw() {
            Ok(item) => item,
            Err(e) => {
                self.latch(e);
                return;
            }
        };
        self.enter_container_item(&item, kind);
    }

    /// Push a bounded frame for an already-read map or array item and aim
    /// the cursor at its first child.
    pub(crate) fn enter_container_item(&mut self, item: &Item<'a>, kind: FrameKind) {
        let body = match item.value {
            Value::Map { body, .. } if kind == FrameKind::Map => body,
            Value::Array { body, .. } if kind == FrameKind::Array => body,
            _ => {
                let e = CborError::new(ErrorCode::UnexpectedType, item.start);
                self.latch(e);
                return;
            }
        };
        let frame = Frame {
            kind,
            first_child: body.start,
            end: body.end,
            total_end: item.end,
        };
        if let Err(e) = self.nesting.push(frame, item.start) {
            self.latch(e);
            return;
        }
        self.stream.seek(body.start);
    }

    /// Push a byte-bounded frame for an already-read wrapped byte string.
    pub(crate) fn enter_wrapped_item(
        &mut self,
        item: &Item<'a>,
        req: TagRequirement,
        bstr: Option<&mut &'a [u8]>,
    ) {
        let spec = TagSpec::new(req, &[CborType::WrappedCbor], &[CborType::ByteString]);
        let payload = match item.value {
            Value::WrappedCbor(b) | Value::Bytes(b) if spec.matches(item) => b,
            _ => {
                let e = CborError::new(ErrorCode::UnexpectedType, item.start);
                self.latch(e);
                return;
            }
        };

        let payload_start = item.end - payload.len();
        let frame = Frame {
            kind: FrameKind::BstrWrap,
            first_child: payload_start,
            end: item.end,
            total_end: item.end,
        };
        if let Err(e) = self.nesting.push(frame, item.start) {
            self.latch(e);
            return;
        }
        if let Some(out) = bstr {
            *out = payload;
        }
        self.stream.seek(payload_start);
    }

    fn exit_container(&mut self, kind: FrameKind) {
        if let Some(e) = self.error {
            if e.code != ErrorCode::NoMoreItems {
                return;
            }
            // Walking a region to its end and then closing it is not an
            // error; absorb the pending state before the mismatch check.
            self.error = None;
        }
        match self.nesting.top() {
            Some(frame) if frame.kind == kind => {
                let target = frame.total_end;
                self.nesting.pop();
                self.stream.seek(target);
            }
            _ => {
                let e = CborError::new(ErrorCode::CloseMismatch, self.stream.position());
                self.latch(e);
            }
        }
    }
}
