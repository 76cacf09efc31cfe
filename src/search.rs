//! Label-based map search.
//!
//! Lookup is a linear scan of the entered map, by design: the decoder builds
//! no index, so each lookup costs one traversal of the map's top level.
//! The batch and callback forms amortize that scan across many labels.
//! Every search walks the *whole* map so duplicate labels are always
//! detected, and the caller's pre-order cursor never moves.

use crate::decoder::CborDecoder;
use crate::item::{read_item, CborType, Item, Label};
use crate::nesting::FrameKind;
use crate::stream::ByteStream;
use crate::tags::TagRequirement;
use crate::{CborError, ErrorCode};

/// One slot of a batch map lookup: the label and type filter to search for,
/// and the found item, if any.
#[derive(Debug, Clone, Copy)]
pub struct MapQuery<'a, 'l> {
    /// The label to search for.
    pub label: Label<'l>,
    /// The required item type; [`CborType::Any`] matches every type.
    pub wanted: CborType,
    /// The found entry; `None` when the label is absent from the map.
    pub item: Option<Item<'a>>,
}

impl<'a, 'l> MapQuery<'a, 'l> {
    /// A query slot for `label`, filtered to `wanted`.
    pub fn new(label: impl Into<Label<'l>>, wanted: CborType) -> Self {
        Self {
            label: label.into(),
            wanted,
            item: None,
        }
    }
}

fn label_eq(a: Label<'_>, b: Label<'_>) -> bool {
    match (a, b) {
        (Label::Int(x), Label::Int(y)) => x == y,
        (Label::Text(x), Label::Text(y)) => x == y,
        _ => false,
    }
}

impl<'a> CborDecoder<'a> {
    /// Find the entry labeled `label` in the entered map.
    ///
    /// The whole map is scanned regardless of the cursor, which does not
    /// move. `wanted` filters the found entry's type; [`CborType::Any`]
    /// matches every type.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::MapNotEntered`] when the current region is not a map,
    /// [`ErrorCode::LabelNotFound`] when the label is absent,
    /// [`ErrorCode::DuplicateLabel`] when the map holds the label twice,
    /// [`ErrorCode::UnexpectedType`] on a type-filter mismatch; all latch.
    pub fn get_item_in_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        wanted: CborType,
    ) -> Result<Item<'a>, CborError> {
        self.gate()?;
        match self.search_one(label.into(), wanted) {
            Ok(item) => Ok(item),
            Err(e) => Err(self.latch(e)),
        }
    }

    /// Fill every query slot from one traversal of the entered map.
    ///
    /// Absent labels leave their slot's `item` as `None`; that is not an
    /// error. Duplicate detection still covers the whole map.
    ///
    /// # Errors
    ///
    /// As for [`get_item_in_map`](Self::get_item_in_map), minus
    /// `LabelNotFound`; all latch.
    pub fn get_items_in_map(&mut self, queries: &mut [MapQuery<'a, '_>]) -> Result<(), CborError> {
        self.gate()?;
        match self.map_search(queries, None) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.latch(e)),
        }
    }

    /// Like [`get_items_in_map`](Self::get_items_in_map), additionally
    /// invoking `cb` on every top-level entry no query matches. Entries
    /// nested inside child maps and arrays are not visited.
    ///
    /// The callback may abort the search by returning an error code
    /// (conventionally [`ErrorCode::CallbackFail`] for protocol-level
    /// failures), which latches like any other error.
    ///
    /// # Errors
    ///
    /// As for [`get_items_in_map`](Self::get_items_in_map), plus whatever
    /// code the callback returns.
    pub fn get_items_in_map_with_callback<F>(
        &mut self,
        queries: &mut [MapQuery<'a, '_>],
        mut cb: F,
    ) -> Result<(), CborError>
    where
        F: FnMut(&Item<'a>) -> Result<(), ErrorCode>,
    {
        self.gate()?;
        match self.map_search(queries, Some(&mut cb)) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.latch(e)),
        }
    }

    /// Search for `label`, then enter the found map. Exiting resumes just
    /// past that entry.
    pub fn enter_map_from_map<'l>(&mut self, label: impl Into<Label<'l>>) {
        self.enter_from_map(label.into(), FrameKind::Map);
    }

    /// Search for `label`, then enter the found array.
    pub fn enter_array_from_map<'l>(&mut self, label: impl Into<Label<'l>>) {
        self.enter_from_map(label.into(), FrameKind::Array);
    }

    /// Search for `label`, then enter the found byte-string-wrapped CBOR.
    ///
    /// Tag handling and the optional `bstr` output match
    /// [`enter_bstr_wrapped`](Self::enter_bstr_wrapped).
    pub fn enter_bstr_wrapped_from_map<'l>(
        &mut self,
        label: impl Into<Label<'l>>,
        req: TagRequirement,
        bstr: Option<&mut &'a [u8]>,
    ) {
        if self.gate().is_err() {
            return;
        }
        let item = match self.search_one(label.into(), CborType::Any) {
            Ok(item) => item,
            Err(e) => {
                self.latch(e);
                return;
            }
        };
        self.enter_wrapped_item(&item, req, bstr);
    }

    fn enter_from_map(&mut self, label: Label<'_>, kind: FrameKind) {
        if self.gate().is_err() {
            return;
        }
        let wanted = match kind {
            FrameKind::Map => CborType::Map,
            _ => CborType::Array,
        };
        let item = match self.search_one(label, wanted) {
            Ok(item) => item,
            Err(e) => {
                self.latch(e);
                return;
            }
        };
        self.enter_container_item(&item, kind);
    }

    /// Single-label search; does not latch.
    pub(crate) fn search_one(
        &mut self,
        label: Label<'_>,
        wanted: CborType,
    ) -> Result<Item<'a>, CborError> {
        let mut queries = [MapQuery {
            label,
            wanted,
            item: None,
        }];
        self.map_search(&mut queries, None)?;
        queries[0]
            .item
            .ok_or_else(|| CborError::new(ErrorCode::LabelNotFound, self.stream().position()))
    }

    /// One full traversal of the entered map; does not latch and does not
    /// move the cursor.
    fn map_search(
        &mut self,
        queries: &mut [MapQuery<'a, '_>],
        mut on_unmatched: Option<&mut dyn FnMut(&Item<'a>) -> Result<(), ErrorCode>>,
    ) -> Result<(), CborError> {
        let frame = match self.top_frame() {
            Some(frame) if frame.kind == FrameKind::Map => *frame,
            _ => {
                return Err(CborError::new(
                    ErrorCode::MapNotEntered,
                    self.stream().position(),
                ))
            }
        };

        let budget = self.depth_budget();
        let mut scratch = ByteStream::new(self.stream().data(), frame.first_child);

        while scratch.position() < frame.end {
            let entry = read_item(&mut scratch, true, budget)?;
            let Some(entry_label) = entry.label else {
                unreachable!("map entries always carry a label")
            };

            let matched = queries
                .iter_mut()
                .find(|q| label_eq(q.label, entry_label));

            match matched {
                Some(q) => {
                    if q.item.is_some() {
                        return Err(CborError::new(ErrorCode::DuplicateLabel, entry.start));
                    }
                    if q.wanted != CborType::Any && q.wanted != entry.cbor_type() {
                        return Err(CborError::new(ErrorCode::UnexpectedType, entry.start));
                    }
                    q.item = Some(entry);
                }
                None => {
                    if let Some(cb) = on_unmatched.as_mut() {
                        cb(&entry).map_err(|code| CborError::new(code, entry.start))?;
                    }
                }
            }
        }

        Ok(())
    }
}
