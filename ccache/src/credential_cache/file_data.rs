use super::{header::Header, Credential, MIN_CREDENTIAL_LEN};
use crate::{Cursor, DecodeError, Error, ErrorKind, Principal, Stage};
use log::{debug, warn};
use std::{fs, io, path::Path};

const FILE_FIRST_BYTE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormatVersion {
    V4 = 4,
}

impl TryFrom<u8> for FileFormatVersion {
    type Error = ErrorKind;

    // Versions 1 to 3 predate the header and use other integer layouts;
    // only version 4 is understood.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::V4),
            found => Err(ErrorKind::UnsupportedFormat {
                expected: Self::V4 as u8,
                found,
            }),
        }
    }
}

/// A fully decoded FILE credential cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CCacheFile {
    pub version: FileFormatVersion,
    pub header: Header,
    pub default_principal: Principal,
    pub credentials: Vec<Credential>,
    /// Bytes left after the last credential that were too few to hold
    /// another one.
    pub trailing_bytes: usize,
}

impl CCacheFile {
    // After the two-byte version indicator, the file has three parts:
    // - the header,
    // - the default principal name,
    // - and a sequence of credentials.
    pub fn decode(buffer: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(buffer);
        let version = read_version(&mut cursor)?;
        debug!("file format version {:?}", version);

        let header = Header::decode(&mut cursor).map_err(|kind| kind.at(Stage::Header))?;
        debug!("header: {:?}", header);

        let default_principal = Principal::decode(&mut cursor)
            .map_err(|kind| kind.at(Stage::DefaultPrincipal))?;
        debug!("default principal: {}", default_principal.unparse_name());

        let credentials = CredentialsIter::new(&mut cursor).collect::<Result<Vec<_>, _>>()?;
        let trailing_bytes = cursor.remaining();
        if trailing_bytes > 0 {
            warn!(
                "ignoring {} trailing bytes after {} credentials",
                trailing_bytes,
                credentials.len()
            );
        }

        Ok(CCacheFile {
            version,
            header,
            default_principal,
            credentials,
            trailing_bytes,
        })
    }

    pub fn read_file(path: &Path) -> anyhow::Result<Self> {
        let buffer = match fs::read(path) {
            Ok(buffer) => buffer,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::KRB5_FCC_NOFILE)?,
            Err(e) => Err(e)?,
        };
        debug!("read {} bytes from {}", buffer.len(), path.display());
        Self::decode(&buffer).map_err(|e| anyhow::anyhow!("{} ({})", e.krb5_error(), e))
    }

    pub fn config_entries(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter().filter(|credential| credential.is_config())
    }

    pub fn tickets(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter().filter(|credential| !credential.is_config())
    }
}

// The first byte of the file always has the value 5, and the second byte
// contains the version number.
fn read_version(cursor: &mut Cursor) -> Result<FileFormatVersion, DecodeError> {
    let magic = cursor.read_u8().map_err(|kind| kind.at(Stage::Magic))?;
    if magic != FILE_FIRST_BYTE {
        return Err(ErrorKind::UnsupportedFormat {
            expected: FILE_FIRST_BYTE,
            found: magic,
        }
        .at(Stage::Magic));
    }
    let version = cursor.read_u8().map_err(|kind| kind.at(Stage::Version))?;
    FileFormatVersion::try_from(version).map_err(|kind| kind.at(Stage::Version))
}

// There is no count of credentials or marker at the end of the sequence of
// credentials; the sequence ends when the file ends.
struct CredentialsIter<'a, 'b> {
    cursor: &'a mut Cursor<'b>,
    index: usize,
    failed: bool,
}

impl<'a, 'b> CredentialsIter<'a, 'b> {
    fn new(cursor: &'a mut Cursor<'b>) -> Self {
        Self {
            cursor,
            index: 0,
            failed: false,
        }
    }

    fn next_entry(&mut self) -> Result<Option<Credential>, DecodeError> {
        if self.failed || self.cursor.remaining() < MIN_CREDENTIAL_LEN {
            return Ok(None);
        }
        let stage = Stage::Credential(self.index);
        let credential = Credential::decode(self.cursor).map_err(|kind| {
            self.failed = true;
            kind.at(stage)
        })?;
        debug!(
            "credential #{}: {} -> {}",
            self.index,
            credential.client.unparse_name(),
            credential.server.unparse_name()
        );
        self.index += 1;
        Ok(Some(credential))
    }
}

impl<'a, 'b> Iterator for CredentialsIter<'a, 'b> {
    type Item = Result<Credential, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

/// Decodes a complete version 4 credential cache image.
pub fn decode(buffer: &[u8]) -> Result<CCacheFile, DecodeError> {
    CCacheFile::decode(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREAMBLE: [u8; 16] = [5, 4, 0, 12, 0, 1, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0];

    fn with_default_principal() -> Vec<u8> {
        let mut buf = PREAMBLE.to_vec();
        buf.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1]);
        buf.extend_from_slice(&[0, 0, 0, 1, b'R', 0, 0, 0, 4]);
        buf.extend_from_slice(b"user");
        buf
    }

    #[test]
    fn empty_cache() {
        let ccache = CCacheFile::decode(&with_default_principal()).unwrap();
        assert_eq!(ccache.version, FileFormatVersion::V4);
        assert_eq!(ccache.header.kdc_time_offset(), Some((0, 0)));
        assert_eq!(ccache.default_principal.unparse_name(), "user@R");
        assert!(ccache.credentials.is_empty());
        assert_eq!(ccache.trailing_bytes, 0);
    }

    #[test]
    fn bad_magic_is_checked_first() {
        let mut buf = with_default_principal();
        buf[0] = 0x07;
        let err = CCacheFile::decode(&buf).unwrap_err();
        assert_eq!(err.stage, Stage::Magic);
        assert_eq!(
            err.kind,
            ErrorKind::UnsupportedFormat {
                expected: 5,
                found: 7
            }
        );
    }

    #[test]
    fn only_version_4() {
        for version in [1, 2, 3, 5, 0xff] {
            let mut buf = with_default_principal();
            buf[1] = version;
            let err = CCacheFile::decode(&buf).unwrap_err();
            assert_eq!(err.stage, Stage::Version);
            assert!(matches!(err.kind, ErrorKind::UnsupportedFormat { .. }));
            assert_eq!(err.krb5_error().code, Error::KRB5_CCACHE_BADVNO.code);
        }
    }

    #[test]
    fn short_buffers_name_the_stage_that_ran_out() {
        for length in 0..PREAMBLE.len() {
            let err = CCacheFile::decode(&PREAMBLE[..length]).unwrap_err();
            let stage = match length {
                0 => Stage::Magic,
                1 => Stage::Version,
                _ => Stage::Header,
            };
            assert_eq!(err.stage, stage, "prefix of {} bytes", length);
            assert!(matches!(err.kind, ErrorKind::Truncated { .. }));
            assert_eq!(err.krb5_error().code, Error::KRB5_CC_FORMAT.code);
        }

        let err = CCacheFile::decode(&[5, 4, 0, 12, 0, 1, 0, 8]).unwrap_err();
        assert_eq!(err.stage, Stage::Header);
        assert_eq!(
            err.kind,
            ErrorKind::Truncated {
                needed: 4,
                remaining: 0
            }
        );
    }

    #[test]
    fn short_buffers_still_check_magic_and_version() {
        let err = CCacheFile::decode(&[0x07, 0x04, 0, 0]).unwrap_err();
        assert_eq!(err.stage, Stage::Magic);
        assert!(matches!(err.kind, ErrorKind::UnsupportedFormat { .. }));

        let err = CCacheFile::decode(&[0x07]).unwrap_err();
        assert_eq!(err.stage, Stage::Magic);
        assert!(matches!(err.kind, ErrorKind::UnsupportedFormat { .. }));

        let err = CCacheFile::decode(&[5, 3, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(err.stage, Stage::Version);
        assert_eq!(
            err.kind,
            ErrorKind::UnsupportedFormat {
                expected: 4,
                found: 3
            }
        );
        assert_eq!(err.code(), Error::KRB5_CCACHE_BADVNO.code);
    }

    #[test]
    fn missing_default_principal() {
        let err = CCacheFile::decode(&PREAMBLE).unwrap_err();
        assert_eq!(err.stage, Stage::DefaultPrincipal);
        assert!(matches!(err.kind, ErrorKind::Truncated { .. }));
    }

    #[test]
    fn short_tail_is_not_a_credential() {
        let mut buf = with_default_principal();
        buf.extend_from_slice(&[0; MIN_CREDENTIAL_LEN - 1]);
        let ccache = CCacheFile::decode(&buf).unwrap();
        assert!(ccache.credentials.is_empty());
        assert_eq!(ccache.trailing_bytes, MIN_CREDENTIAL_LEN - 1);
    }

    #[test]
    fn zeroed_minimal_credential() {
        let mut buf = with_default_principal();
        buf.extend_from_slice(&[0; MIN_CREDENTIAL_LEN]);
        let ccache = CCacheFile::decode(&buf).unwrap();
        assert_eq!(ccache.credentials.len(), 1);
        assert_eq!(ccache.tickets().count(), 1);
        assert_eq!(ccache.config_entries().count(), 0);
        assert_eq!(ccache.trailing_bytes, 0);
    }

    #[test]
    fn broken_credential_fails_the_whole_decode() {
        let mut buf = with_default_principal();
        buf.extend_from_slice(&[0; MIN_CREDENTIAL_LEN]);
        let mut broken = vec![0; MIN_CREDENTIAL_LEN];
        // client realm length
        broken[11] = 0x40;
        buf.extend_from_slice(&broken);
        let err = CCacheFile::decode(&buf).unwrap_err();
        assert_eq!(err.stage, Stage::Credential(1));
        assert!(matches!(err.kind, ErrorKind::Truncated { .. }));
    }
}
