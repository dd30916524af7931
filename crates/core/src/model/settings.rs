use thiserror::Error;
use url::Url;

/// Backend base URL used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default assessment time limit: 15 minutes.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 15 * 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientSettings {
    api_base_url: String,
    time_limit_secs: u32,
}

#[derive(Clone, Debug, Default)]
pub struct ClientSettingsDraft {
    pub api_base_url: Option<String>,
    pub time_limit_secs: Option<u32>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClientSettingsError {
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("API base URL must use http or https")]
    UnsupportedScheme,
    #[error("time limit must be > 0")]
    InvalidTimeLimit,
}

impl ClientSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `ClientSettingsError` if the base URL is present but invalid,
    /// or the time limit is zero.
    pub fn validate(self) -> Result<ClientSettings, ClientSettingsError> {
        let raw = normalize_optional(self.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let parsed =
            Url::parse(&raw).map_err(|_| ClientSettingsError::InvalidBaseUrl(raw.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientSettingsError::UnsupportedScheme);
        }
        let api_base_url = raw.trim_end_matches('/').to_string();

        let time_limit_secs = self.time_limit_secs.unwrap_or(DEFAULT_TIME_LIMIT_SECS);
        if time_limit_secs == 0 {
            return Err(ClientSettingsError::InvalidTimeLimit);
        }

        Ok(ClientSettings {
            api_base_url,
            time_limit_secs,
        })
    }
}

impl ClientSettings {
    /// Base URL without a trailing slash, ready for path concatenation.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_uses_defaults() {
        let settings = ClientSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(settings.time_limit_secs(), 900);
    }

    #[test]
    fn trims_and_strips_trailing_slash() {
        let settings = ClientSettingsDraft {
            api_base_url: Some("  https://prep.example.com/api/v1/ ".into()),
            time_limit_secs: None,
        }
        .validate()
        .unwrap();
        assert_eq!(settings.api_base_url(), "https://prep.example.com/api/v1");
    }

    #[test]
    fn rejects_bad_urls_and_zero_limit() {
        let bad = ClientSettingsDraft {
            api_base_url: Some("not a url".into()),
            time_limit_secs: None,
        };
        assert!(matches!(bad.validate(), Err(ClientSettingsError::InvalidBaseUrl(_))));

        let ftp = ClientSettingsDraft {
            api_base_url: Some("ftp://example.com".into()),
            time_limit_secs: None,
        };
        assert_eq!(ftp.validate(), Err(ClientSettingsError::UnsupportedScheme));

        let zero = ClientSettingsDraft {
            api_base_url: None,
            time_limit_secs: Some(0),
        };
        assert_eq!(zero.validate(), Err(ClientSettingsError::InvalidTimeLimit));
    }
}
