mod decode_error;
mod krb5_error;

pub use self::decode_error::{DecodeError, ErrorKind, Stage};

use std::fmt;

pub type ErrorCode = i32;

#[derive(Debug)]
pub struct Error {
    pub code: ErrorCode,
    pub message: &'static str,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

macro_rules! error {
    ($error:ident, $code:expr, $message:expr) => {
        pub const $error: &'static Error = &Error {
            code: $code,
            message: $message,
        };
    };
}

pub(self) use error;
