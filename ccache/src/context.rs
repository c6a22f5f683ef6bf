mod profile;

pub use self::profile::Profile;
use crate::Error;
use nix::unistd::{Uid, User};

pub struct Conf;

macro_rules! conf {
    ($name:ident, $value:expr) => {
        pub const $name: &'static str = $value;
    };
}

impl Conf {
    conf!(DEFAULT_CCACHE_NAME, "default_ccache_name");
    conf!(LIBDEFAULTS, "libdefaults");
}

/// Library state needed to find the credential cache to read.
#[derive(Debug)]
pub struct Context {
    pub profile: Profile,
    pub default_ccname: Option<String>,
}

impl Context {
    pub fn init() -> anyhow::Result<Self> {
        Ok(Self {
            profile: Profile::new()?,
            default_ccname: None,
        })
    }

    pub fn with_profile_files(files: &[String]) -> Self {
        Self {
            profile: Profile::from_files(files),
            default_ccname: None,
        }
    }

    pub fn set_default_ccname(&mut self, name: &str) {
        self.default_ccname = Some(name.to_owned())
    }

    pub fn expand_path_tokens(path: &str) -> anyhow::Result<String> {
        let mut buf = String::new();
        let mut path_remained = path;
        while !path_remained.is_empty() {
            let token_begin = match path_remained.find("%{") {
                Some(token_begin) => {
                    buf.push_str(&path_remained[..token_begin]);
                    token_begin
                }
                None => {
                    buf.push_str(path_remained);
                    break;
                }
            };
            let token_end = match path_remained[token_begin..].find('}') {
                Some(token_end) => token_begin + token_end,
                None => Err(Error::KRB5_CC_BADNAME)?,
            };
            buf.push_str(&Self::expand_token(
                &path_remained[token_begin + 2..token_end],
            )?);
            path_remained = &path_remained[token_end + 1..];
        }
        Ok(buf)
    }

    fn expand_token(token: &str) -> anyhow::Result<String> {
        let token_value = match token {
            "euid" => Uid::effective().to_string(),
            "username" => User::from_uid(Uid::effective())?
                .map(|u| u.name)
                .unwrap_or_else(|| Uid::effective().to_string()),
            "uid" | "USERID" => Uid::current().to_string(),
            _ => Err(Error::KRB5_CC_BADNAME)?,
        };
        Ok(token_value)
    }
}
