use super::{Error, ErrorCode};
use std::fmt;

/// Part of the file a decode failure was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Magic,
    Version,
    Header,
    DefaultPrincipal,
    /// Zero-based index of the credential in the stream.
    Credential(usize),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Magic => write!(f, "file magic"),
            Self::Version => write!(f, "file format version"),
            Self::Header => write!(f, "header"),
            Self::DefaultPrincipal => write!(f, "default principal"),
            Self::Credential(index) => write!(f, "credential #{}", index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("truncated data: {needed} bytes needed, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("unsupported value {found} (expected {expected})")]
    UnsupportedFormat { expected: u8, found: u8 },
    #[error("malformed {0}")]
    Malformed(&'static str),
}

impl ErrorKind {
    pub(crate) fn at(self, stage: Stage) -> DecodeError {
        DecodeError { stage, kind: self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} while decoding {stage}")]
pub struct DecodeError {
    pub stage: Stage,
    pub kind: ErrorKind,
}

impl DecodeError {
    /// The krb5 library error this failure is reported as.
    pub fn krb5_error(&self) -> &'static Error {
        match (&self.kind, self.stage) {
            (ErrorKind::UnsupportedFormat { .. }, Stage::Version) => Error::KRB5_CCACHE_BADVNO,
            _ => Error::KRB5_CC_FORMAT,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.krb5_error().code
    }
}
