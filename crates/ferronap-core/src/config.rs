//! Typed client settings.
//!
//! Settings are built once at start-up and handed to each subsystem client.
//! Keys use the upper-case names of the platform's deployment conventions,
//! so a settings file looks like:
//!
//! ```json
//! { "SDC_BE_URL": "https://sdc.lab:30204", "DEFAULT_RETRIES": 5 }
//! ```
//!
//! Keys absent from the file keep their built-in default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment variable naming a JSON settings file.
pub const SETTINGS_ENV_VAR: &str = "FERRONAP_SETTINGS";

/// Errors raised while loading or checking settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("setting {key} is not a valid URL '{value}': {source}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Settings {
    pub sdc_be_onboarding_url: String,
    pub sdc_be_url: String,
    pub sdc_username: String,
    pub sdc_password: String,
    pub sdc_user_id: String,

    pub aai_url: String,
    pub aai_api_version: String,
    pub aai_username: String,
    pub aai_password: String,

    pub dmaap_url: String,

    pub ves_url: String,
    pub ves_api_version: String,
    pub ves_username: String,
    pub ves_password: String,

    /// Sent as `X-ECOMP-InstanceID` / `X-FromAppId`.
    pub instance_id: String,
    pub verify_tls: bool,
    pub default_timeout_ms: u64,
    pub default_retries: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sdc_be_onboarding_url: String::from("https://sdc.api.fe.simpledemo.onap.org:30207"),
            sdc_be_url: String::from("https://sdc.api.be.simpledemo.onap.org:30204"),
            sdc_username: String::from("aai"),
            sdc_password: String::from("Kp8bJ4SXszM0WXlhak3eHlcse2gAw84vaoGGmJvUy2U"),
            sdc_user_id: String::from("cs0008"),
            aai_url: String::from("https://aai.api.sparky.simpledemo.onap.org:30233"),
            aai_api_version: String::from("v16"),
            aai_username: String::from("AAI"),
            aai_password: String::from("AAI"),
            dmaap_url: String::from("http://dmaap.api.simpledemo.onap.org:3904"),
            ves_url: String::from("http://ves.api.simpledemo.onap.org:30417"),
            ves_api_version: String::from("v7"),
            ves_username: String::from("sample1"),
            ves_password: String::from("sample1"),
            instance_id: String::from("ferronap"),
            verify_tls: true,
            default_timeout_ms: 30_000,
            default_retries: 3,
        }
    }
}

impl Settings {
    /// Load a JSON settings file; keys it omits keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults, or the file named by [`SETTINGS_ENV_VAR`] when it is set.
    pub fn from_env() -> Result<Self, SettingsError> {
        match std::env::var_os(SETTINGS_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::from_file(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let urls = [
            ("SDC_BE_ONBOARDING_URL", &self.sdc_be_onboarding_url),
            ("SDC_BE_URL", &self.sdc_be_url),
            ("AAI_URL", &self.aai_url),
            ("DMAAP_URL", &self.dmaap_url),
            ("VES_URL", &self.ves_url),
        ];
        for (key, value) in urls {
            Url::parse(value).map_err(|source| SettingsError::InvalidUrl {
                key,
                value: value.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Copy with every credential replaced, safe to print.
    pub fn redacted(&self) -> Self {
        let hidden = String::from("***");
        Self {
            sdc_password: hidden.clone(),
            aai_password: hidden.clone(),
            ves_password: hidden,
            ..self.clone()
        }
    }
}
