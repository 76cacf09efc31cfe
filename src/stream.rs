use crate::{CborError, ErrorCode};

/// Additional-information value marking an indefinite length (or `break`).
pub(crate) const AI_INDEFINITE: u8 = 31;

/// The single-byte `break` that terminates an indefinite-length container.
pub(crate) const BREAK_BYTE: u8 = 0xff;

/// One decoded CBOR head: major type, additional info and argument.
///
/// For an indefinite-length container the argument is meaningless and
/// `ai` is [`AI_INDEFINITE`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Head {
    pub major: u8,
    pub ai: u8,
    pub arg: u64,
    /// Offset of the initial byte of this head.
    pub offset: usize,
}

impl Head {
    pub(crate) const fn is_indefinite(&self) -> bool {
        self.ai == AI_INDEFINITE
    }
}

/// Cursor over the raw input bytes.
///
/// The stream accepts any argument width the wire carries, including
/// non-shortest encodings; canonicality is not this decoder's concern.
#[derive(Clone, Copy)]
pub(crate) struct ByteStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteStream<'a> {
    pub(crate) const fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub(crate) const fn data(&self) -> &'a [u8] {
        self.data
    }

    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, CborError> {
        let off = self.pos;
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| CborError::new(ErrorCode::HitEnd, off))?;
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn read_exact(&mut self, n: usize) -> Result<&'a [u8], CborError> {
        let off = self.pos;
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| CborError::new(ErrorCode::StringTooLong, off))?;
        if end > self.data.len() {
            return Err(CborError::new(ErrorCode::HitEnd, off));
        }
        let s = &self.data[self.pos..end];
        self.pos = end;
        Ok(s)
    }

    pub(crate) fn read_be_u16(&mut self) -> Result<u16, CborError> {
        let s = self.read_exact(2)?;
        Ok(u16::from_be_bytes([s[0], s[1]]))
    }

    pub(crate) fn read_be_u32(&mut self) -> Result<u32, CborError> {
        let s = self.read_exact(4)?;
        Ok(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }

    pub(crate) fn read_be_u64(&mut self) -> Result<u64, CborError> {
        let s = self.read_exact(8)?;
        Ok(u64::from_be_bytes([
            s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7],
        ]))
    }

    /// Read the argument selected by `ai` for majors 0..=6.
    ///
    /// `ai` 28..=30 is reserved in every major type; 31 is rejected here
    /// and must be handled by the caller where an indefinite length or a
    /// `break` is legal.
    pub(crate) fn read_arg(&mut self, ai: u8, off: usize) -> Result<u64, CborError> {
        match ai {
            0..=23 => Ok(u64::from(ai)),
            24 => Ok(u64::from(self.read_u8()?)),
            25 => Ok(u64::from(self.read_be_u16()?)),
            26 => Ok(u64::from(self.read_be_u32()?)),
            27 => Ok(self.read_be_u64()?),
            _ => Err(CborError::new(ErrorCode::ReservedAdditionalInfo, off)),
        }
    }

    /// Read one head, argument included. Indefinite lengths are returned,
    /// not rejected. For major type 7 the argument carries the simple value
    /// or the raw float bits.
    pub(crate) fn read_head(&mut self) -> Result<Head, CborError> {
        let offset = self.pos;
        let ib = self.read_u8()?;
        let major = ib >> 5;
        let ai = ib & 0x1f;

        let arg = if ai == AI_INDEFINITE {
            0
        } else if major == 7 && matches!(ai, 28..=30) {
            return Err(CborError::new(ErrorCode::BadType7, offset));
        } else {
            self.read_arg(ai, offset)?
        };

        Ok(Head {
            major,
            ai,
            arg,
            offset,
        })
    }
}

/// Convert a wire length to `usize`, failing on 32-bit address-space overflow.
pub(crate) fn len_to_usize(len: u64, off: usize) -> Result<usize, CborError> {
    usize::try_from(len).map_err(|_| CborError::new(ErrorCode::StringTooLong, off))
}
