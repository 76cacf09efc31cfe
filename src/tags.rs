//! Tag-matching policy for typed getters.

use crate::item::{CborType, Item};

/// Whether a data item must, must not, or may carry its semantic tag.
///
/// Protocols normally fix this per field: either the wire is explicitly
/// tagged ([`TagRequirement::Tag`]) or the type is implied by the label or
/// position and tagging is forbidden ([`TagRequirement::ContentType`]).
/// [`TagRequirement::Either`] accepts both; the CBOR specification
/// discourages protocol designs that need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRequirement {
    /// The item must be explicitly tagged as the semantic type.
    Tag,
    /// The item must be the bare content type, with no tag present.
    ContentType,
    /// Tagged or bare are both accepted.
    Either,
}

/// A matching policy: the requirement plus the semantic types that satisfy
/// explicit tagging and the raw types that satisfy implicit tagging.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TagSpec {
    pub require: TagRequirement,
    pub tagged: &'static [CborType],
    pub content: &'static [CborType],
}

impl TagSpec {
    pub(crate) const fn new(
        require: TagRequirement,
        tagged: &'static [CborType],
        content: &'static [CborType],
    ) -> Self {
        Self {
            require,
            tagged,
            content,
        }
    }

    /// Whether `item` satisfies this policy.
    ///
    /// A content-type match requires that no tag at all is present on the
    /// item; an either-match accepts any of the listed types regardless.
    pub(crate) fn matches(&self, item: &Item<'_>) -> bool {
        let t = item.cbor_type();
        match self.require {
            TagRequirement::Tag => self.tagged.contains(&t),
            TagRequirement::ContentType => self.content.contains(&t) && item.tags.is_empty(),
            TagRequirement::Either => self.tagged.contains(&t) || self.content.contains(&t),
        }
    }
}
