mod credential;
mod file_data;
mod header;

pub use self::{
    credential::{
        Address, AuthData, Credential, Keyblock, TaggedBlob, TicketTimes, AD_TYPE_AND_OR,
        AD_TYPE_IF_RELEVANT, AD_TYPE_KDC_ISSUED, AD_TYPE_MANDATORY_FOR_KDC, AD_TYPE_WIN2K_PAC,
        ADDRTYPE_ADDRPORT, ADDRTYPE_CHAOS, ADDRTYPE_DDP, ADDRTYPE_INET, ADDRTYPE_INET6,
        ADDRTYPE_IPPORT, ADDRTYPE_ISO, ADDRTYPE_XNS, MIN_CREDENTIAL_LEN,
    },
    file_data::{decode, CCacheFile, FileFormatVersion},
    header::{Header, HeaderField, FCC_TAG_DELTATIME},
};
use crate::{Conf, Context, Error};
use log::debug;
use std::{env, path::Path};

const KRB5_ENV_CCNAME: &str = "KRB5CCNAME";
const DEFCCNAME: &str = "FILE:/tmp/krb5cc_%{uid}";
const FILE_PREFIX: &str = "FILE";

/// A FILE credential cache, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialCache {
    name: String,
}

impl CredentialCache {
    pub fn default_name(context: &mut Context) -> anyhow::Result<String> {
        if let Some(name) = context.default_ccname.to_owned() {
            return Ok(name);
        }
        if let Ok(name) = env::var(KRB5_ENV_CCNAME) {
            context.set_default_ccname(&name);
            return Ok(name);
        }
        let key = format!("{}.{}", Conf::LIBDEFAULTS, Conf::DEFAULT_CCACHE_NAME);
        let name = Context::expand_path_tokens(
            context
                .profile
                .get_string(&key)
                .as_deref()
                .unwrap_or(DEFCCNAME),
        )?;
        context.set_default_ccname(&name);
        Ok(name)
    }

    pub fn default(context: &mut Context) -> anyhow::Result<Self> {
        let default_name = Self::default_name(context)?;
        Self::resolve(&default_name)
    }

    pub fn resolve(name: &str) -> anyhow::Result<Self> {
        let residual = match name.split_once(':') {
            None => name,
            // Use `FILE` when prefix is a drive letter
            Some((p, _)) if p.len() == 1 && p.as_bytes()[0].is_ascii_alphabetic() => name,
            Some((FILE_PREFIX, residual)) => residual,
            Some(_) => Err(Error::KRB5_CC_UNKNOWN_TYPE)?,
        };
        if residual.is_empty() {
            Err(Error::KRB5_CC_BADNAME)?
        }
        debug!("resolved credential cache {}", residual);
        Ok(Self {
            name: residual.to_owned(),
        })
    }

    pub fn get_type(&self) -> &str {
        FILE_PREFIX
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_full_name(&self) -> String {
        format!("{}:{}", self.get_type(), self.get_name())
    }

    pub fn read(&self) -> anyhow::Result<CCacheFile> {
        CCacheFile::read_file(Path::new(&self.name))
    }
}
