//! Repository configuration.
//!
//! The on-disk file is INI. Only the `[core]` section is interpreted; other
//! sections are preserved and readable through [`RepoConfig::get`].

use std::path::Path;

use ini::Ini;

use crate::error::{RepoError, RepoResult};

/// The only repository format this crate reads.
pub const SUPPORTED_FORMAT_VERSION: u32 = 0;

const CORE: Option<&str> = Some("core");

/// Typed view of the `[core]` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    pub repository_format_version: u32,
    pub filemode: bool,
    pub bare: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            repository_format_version: SUPPORTED_FORMAT_VERSION,
            filemode: false,
            bare: false,
        }
    }
}

/// Loaded repository configuration.
#[derive(Clone, Debug)]
pub struct RepoConfig {
    ini: Ini,
}

impl RepoConfig {
    /// Read a config file.
    pub fn load(path: &Path) -> RepoResult<Self> {
        if !path.is_file() {
            return Err(RepoError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(err) => RepoError::Io(err),
            other => RepoError::InvalidConfig(other.to_string()),
        })?;
        Ok(Self { ini })
    }

    /// Write the config to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> RepoResult<()> {
        self.ini.write_to_file(path)?;
        Ok(())
    }

    /// Raw lookup of `key` in `section`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini.get_from(Some(section), key)
    }

    /// Parse the `[core]` section.
    ///
    /// Missing `filemode` and `bare` default to `false`; a missing format
    /// version is an error.
    pub fn core(&self) -> RepoResult<CoreConfig> {
        let section = self
            .ini
            .section(CORE)
            .ok_or_else(|| RepoError::InvalidConfig("missing [core] section".into()))?;
        let raw_version = section.get("repositoryformatversion").ok_or_else(|| {
            RepoError::InvalidConfig("missing core.repositoryformatversion".into())
        })?;
        let repository_format_version = raw_version
            .trim()
            .parse()
            .map_err(|_| RepoError::UnsupportedFormatVersion(raw_version.to_string()))?;

        Ok(CoreConfig {
            repository_format_version,
            filemode: parse_bool(section.get("filemode"), "filemode")?,
            bare: parse_bool(section.get("bare"), "bare")?,
        })
    }

    /// Parse `[core]` and reject format versions other than `0`.
    pub fn validate(&self) -> RepoResult<CoreConfig> {
        let core = self.core()?;
        if core.repository_format_version != SUPPORTED_FORMAT_VERSION {
            return Err(RepoError::UnsupportedFormatVersion(
                core.repository_format_version.to_string(),
            ));
        }
        Ok(core)
    }
}

impl Default for RepoConfig {
    /// The config written by `init`.
    fn default() -> Self {
        let core = CoreConfig::default();
        let mut ini = Ini::new();
        ini.with_section(CORE)
            .set(
                "repositoryformatversion",
                core.repository_format_version.to_string(),
            )
            .set("filemode", core.filemode.to_string())
            .set("bare", core.bare.to_string());
        Self { ini }
    }
}

fn parse_bool(raw: Option<&str>, key: &str) -> RepoResult<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None => Ok(false),
        Some("true" | "yes" | "on" | "1") => Ok(true),
        Some("false" | "no" | "off" | "0" | "") => Ok(false),
        Some(other) => Err(RepoError::InvalidConfig(format!(
            "core.{key} is not a boolean: {other:?}"
        ))),
    }
}
