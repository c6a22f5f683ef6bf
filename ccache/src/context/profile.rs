use config::{Config, File, FileFormat};
use log::{debug, warn};
use std::{env, path::Path};

const DEFAULT_PROFILE_PATH: &str = "/etc/krb5.conf";

/// Relations from the krb5 profile files, looked up as `section.relation`.
#[derive(Debug)]
pub struct Profile {
    files: Vec<ProfileFile>,
}

impl Profile {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::from_files(&Self::default_config_files()))
    }

    /// Files that do not exist or cannot be parsed are skipped.
    pub fn from_files(files: &[String]) -> Self {
        let mut profile_files = vec![];
        for file in files {
            match ProfileFile::new(file) {
                Ok(Some(profile_file)) => profile_files.push(profile_file),
                Ok(None) => debug!("profile {} not found", file),
                Err(e) => warn!("skipping profile {}: {}", file, e),
            }
        }
        Self {
            files: profile_files,
        }
    }

    fn default_config_files() -> Vec<String> {
        env::var("KRB5_CONFIG")
            .unwrap_or(DEFAULT_PROFILE_PATH.to_owned())
            .split(':')
            .filter(|f| !f.is_empty())
            .map(|f| f.to_owned())
            .collect()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        for file in &self.files {
            if let Ok(value) = file.config.get_string(key) {
                return Some(value);
            }
        }
        None
    }
}

#[derive(Debug)]
struct ProfileFile {
    config: Config,
}

impl ProfileFile {
    fn new(filename: &str) -> anyhow::Result<Option<Self>> {
        let expanded_filename = match (filename.starts_with("~/"), env::var("HOME")) {
            (true, Ok(home_env)) => format!("{}{}", home_env, &filename[1..]),
            _ => filename.to_owned(),
        };
        if !Path::new(&expanded_filename).is_file() {
            return Ok(None);
        }
        let config = Config::builder()
            .add_source(File::with_name(&expanded_filename).format(FileFormat::Ini))
            .build()?;
        Ok(Some(Self { config }))
    }
}
