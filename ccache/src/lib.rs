pub mod context;
mod credential_cache;
mod cursor;
pub mod error;
mod principal;
pub mod str_conv;

pub use self::{
    context::{Conf, Context},
    credential_cache::{
        decode, Address, AuthData, CCacheFile, Credential, CredentialCache, FileFormatVersion,
        Header, HeaderField, Keyblock, TaggedBlob, TicketTimes, AD_TYPE_AND_OR,
        AD_TYPE_IF_RELEVANT, AD_TYPE_KDC_ISSUED, AD_TYPE_MANDATORY_FOR_KDC, AD_TYPE_WIN2K_PAC,
        ADDRTYPE_ADDRPORT, ADDRTYPE_CHAOS, ADDRTYPE_DDP, ADDRTYPE_INET, ADDRTYPE_INET6,
        ADDRTYPE_IPPORT, ADDRTYPE_ISO, ADDRTYPE_XNS, FCC_TAG_DELTATIME, MIN_CREDENTIAL_LEN,
    },
    cursor::Cursor,
    error::{DecodeError, Error, ErrorKind, Stage},
    principal::{NameType, Principal},
};

use std::process::ExitCode;

pub type Enctype = u16;
pub type Flags = u32;
pub type Timestamp = u32;
pub type Data = Vec<u8>;

pub fn prefix_progname_to_error_if_needed(
    progname: &str,
    result: anyhow::Result<()>,
    quiet: bool,
) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) if quiet => ExitCode::FAILURE,
        Err(err) if err.to_string().trim_start().starts_with("Usage: ") => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{}: {:#}", progname, err);
            ExitCode::FAILURE
        }
    }
}
