use crate::{Cursor, ErrorKind};

pub const FCC_TAG_DELTATIME: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub length: u16,
    pub fields: Vec<HeaderField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderField {
    pub tag: u16,
    pub length: u16,
    pub time1: u32,
    pub time2: u32,
}

impl Header {
    // The header begins with a 16-bit integer giving the length of the entire
    // header, followed by the fields. Each field consists of a 16-bit tag, a
    // 16-bit length and its value.
    //
    // Only the DeltaTime field (tag 1) is defined, whose value is two 32-bit
    // integers giving the seconds and microseconds of the KDC time offset.
    // The field is read at that fixed shape whatever the declared lengths say.
    pub(super) fn decode(cursor: &mut Cursor) -> Result<Self, ErrorKind> {
        let length = cursor.read_u16()?;
        let field = HeaderField {
            tag: cursor.read_u16()?,
            length: cursor.read_u16()?,
            time1: cursor.read_u32()?,
            time2: cursor.read_u32()?,
        };
        Ok(Header {
            length,
            fields: vec![field],
        })
    }

    /// Seconds and microseconds to add to the client clock to get the KDC's.
    pub fn kdc_time_offset(&self) -> Option<(i32, i32)> {
        self.fields
            .iter()
            .find(|field| field.tag == FCC_TAG_DELTATIME)
            .map(|field| (field.time1 as i32, field.time2 as i32))
    }
}
