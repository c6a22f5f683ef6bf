use crate::{Data, ErrorKind};
use log::trace;
use std::mem::size_of;

/// Bounds-checked, forward-only reader over a borrowed ccache image.
///
/// Every read goes through [`Cursor::read`], which refuses to hand out more
/// bytes than remain and leaves the position untouched when it does.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

// File format versions 3 and 4 always use big-endian byte order.
macro_rules! read_int {
    ($fn:ident, $type:ident) => {
        pub fn $fn(&mut self) -> Result<$type, ErrorKind> {
            let mut buf = [0; size_of::<$type>()];
            buf.copy_from_slice(self.read(size_of::<$type>())?);
            Ok($type::from_be_bytes(buf))
        }
    };
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn read(&mut self, length: usize) -> Result<&'a [u8], ErrorKind> {
        let remaining = self.remaining();
        if length > remaining {
            return Err(ErrorKind::Truncated {
                needed: length,
                remaining,
            });
        }
        let bytes = &self.buffer[self.position..self.position + length];
        self.position += length;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, ErrorKind> {
        Ok(self.read(1)?[0])
    }

    read_int!(read_u16, u16);
    read_int!(read_u32, u32);
    read_int!(read_u64, u64);

    // data ::=
    //     length (32 bits)
    //     value (length bytes)
    pub fn read_data(&mut self) -> Result<Data, ErrorKind> {
        let length = self.read_u32()? as usize;
        trace!("data of {} bytes at offset {}", length, self.position);
        Ok(self.read(length)?.to_vec())
    }

    /// Checks that `count` items of at least `min_size` bytes each could fit
    /// in the rest of the buffer, before anything is allocated for them.
    pub fn check_count(
        &self,
        count: u32,
        min_size: usize,
        what: &'static str,
    ) -> Result<usize, ErrorKind> {
        let count = count as usize;
        match count.checked_mul(min_size) {
            Some(size) if size <= self.remaining() => Ok(count),
            _ => Err(ErrorKind::Malformed(what)),
        }
    }
}
