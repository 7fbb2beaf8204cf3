use core::fmt;

use heapless::String;

use crate::error::ConfigError;

pub const WIFI_SSID_MAX: usize = 32;
pub const WIFI_PASSWORD_MAX: usize = 64;
pub const DEFAULT_MAX_RETRIES: u32 = 5;

#[derive(Clone, PartialEq, Eq)]
pub struct StationConfig {
    ssid: String<WIFI_SSID_MAX>,
    credential: String<WIFI_PASSWORD_MAX>,
    max_retries: u32,
}

impl StationConfig {
    pub fn new(ssid: &str, credential: &str, max_retries: u32) -> Result<Self, ConfigError> {
        if ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        let ssid = String::try_from(ssid).map_err(|_| ConfigError::SsidTooLong {
            len: ssid.len(),
            max: WIFI_SSID_MAX,
        })?;
        let credential =
            String::try_from(credential).map_err(|_| ConfigError::CredentialTooLong {
                len: credential.len(),
                max: WIFI_PASSWORD_MAX,
            })?;
        Ok(Self {
            ssid,
            credential,
            max_retries,
        })
    }

    /// Credentials baked in at build time, if any were provided.
    pub fn compiled() -> Option<Result<Self, ConfigError>> {
        let ssid = option_env!("WIFI_STATION_SSID").or(option_env!("SSID"))?;
        let credential = option_env!("WIFI_STATION_PASSWORD")
            .or(option_env!("PASSWORD"))
            .unwrap_or("");
        let max_retries = match option_env!("WIFI_STATION_MAX_RETRY") {
            Some(raw) => match parse_max_retries(raw) {
                Ok(value) => value,
                Err(err) => return Some(Err(err)),
            },
            None => DEFAULT_MAX_RETRIES,
        };
        Some(Self::new(ssid, credential, max_retries))
    }

    #[cfg(feature = "config-toml")]
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: StationConfigFile =
            toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Self::new(&file.ssid, &file.password, file.max_retries)
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// An empty credential selects an open (unauthenticated) network.
    pub fn is_open(&self) -> bool {
        self.credential.is_empty()
    }
}

impl fmt::Debug for StationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StationConfig")
            .field("ssid", &self.ssid.as_str())
            .field("credential", &if self.is_open() { "<open>" } else { "<redacted>" })
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

pub(crate) fn parse_max_retries(raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidMaxRetries(raw.into()))
}

#[cfg(feature = "config-toml")]
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct StationConfigFile {
    ssid: std::string::String,
    #[serde(default)]
    password: std::string::String,
    #[serde(default = "default_max_retries")]
    max_retries: u32,
}

#[cfg(feature = "config-toml")]
fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
