#![allow(dead_code)]

/// Assembles version 4 ccache images field by field.
#[derive(Debug, Default, Clone)]
pub struct CCacheBuilder {
    buf: Vec<u8>,
}

impl CCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Magic, version and a DeltaTime header.
    pub fn v4(time_offset: u32, usec_offset: u32) -> Self {
        let mut builder = Self::new();
        builder
            .u8(5)
            .u8(4)
            .u16(12)
            .u16(1)
            .u16(8)
            .u32(time_offset)
            .u32(usec_offset);
        builder
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn data(&mut self, bytes: &[u8]) -> &mut Self {
        self.u32(bytes.len() as u32).raw(bytes)
    }

    pub fn principal(&mut self, name_type: u32, realm: &str, components: &[&str]) -> &mut Self {
        self.u32(name_type)
            .u32(components.len() as u32)
            .data(realm.as_bytes());
        for component in components {
            self.data(component.as_bytes());
        }
        self
    }

    pub fn tagged(&mut self, tag: u16, bytes: &[u8]) -> &mut Self {
        self.u16(tag).data(bytes)
    }

    /// A ticket from `client@realm` for `server@realm` with one IPv4
    /// address and no authdata.
    pub fn credential(
        &mut self,
        realm: &str,
        client: &[&str],
        server: &[&str],
        times: [u32; 4],
        flags: u32,
    ) -> &mut Self {
        self.principal(1, realm, client)
            .principal(2, realm, server)
            .tagged(18, &[0x5a; 32]);
        for time in times {
            self.u32(time);
        }
        self.u8(0)
            .u32(flags)
            .u32(1)
            .tagged(2, &[192, 168, 0, 10])
            .u32(0)
            .data(b"\x61\x82ticket")
            .data(b"")
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn build(&self) -> Vec<u8> {
        self.buf.clone()
    }
}
