//! Checker configuration: registry endpoints, timeout, probing.

use std::time::Duration;

use serde::Deserialize;

use super::error::ConfigError;

pub const DEFAULT_VIES_BASE_URL: &str = "https://ec.europa.eu/taxation_customs/vies/rest-api";
pub const DEFAULT_HMRC_BASE_URL: &str =
    "https://api.service.hmrc.gov.uk/organisations/vat/check-vat-number/lookup";
pub const DEFAULT_BRREG_BASE_URL: &str = "https://data.brreg.no/enhetsregisteret/api/enheter";
pub const DEFAULT_UID_SERVICE_URL: &str = "https://www.uid-wse-a.admin.ch/V5.0/PublicServices.svc";

/// Settings for a [`VatChecker`](crate::VatChecker) session.
///
/// Deserializable so it can live inside a larger application's config file;
/// every key is optional and falls back to [`CheckerConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// VIES REST API root; `check-vat-number` and `check-status` hang off it.
    pub vies_base_url: String,
    /// HMRC lookup root; the VAT number is appended as a path segment.
    pub hmrc_base_url: String,
    /// Enhetsregisteret root; the organisation number is appended.
    pub brreg_base_url: String,
    /// Swiss UID public services SOAP endpoint.
    pub uid_service_url: String,
    /// Per-request timeout handed to the transport.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Query VIES member state availability when the session starts.
    pub probe_availability: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            vies_base_url: DEFAULT_VIES_BASE_URL.into(),
            hmrc_base_url: DEFAULT_HMRC_BASE_URL.into(),
            brreg_base_url: DEFAULT_BRREG_BASE_URL.into(),
            uid_service_url: DEFAULT_UID_SERVICE_URL.into(),
            timeout_secs: 30,
            user_agent: concat!("vat-checker/", env!("CARGO_PKG_VERSION")).into(),
            probe_availability: true,
        }
    }
}

impl CheckerConfig {
    /// Defaults overlaid with `VAT_CHECKER_*` environment variables.
    ///
    /// Recognised keys: `VAT_CHECKER_VIES_URL`, `VAT_CHECKER_HMRC_URL`,
    /// `VAT_CHECKER_BRREG_URL`, `VAT_CHECKER_UID_URL`,
    /// `VAT_CHECKER_TIMEOUT_SECS`, `VAT_CHECKER_USER_AGENT`,
    /// `VAT_CHECKER_PROBE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("VAT_CHECKER_VIES_URL") {
            config.vies_base_url = v;
        }
        if let Some(v) = get("VAT_CHECKER_HMRC_URL") {
            config.hmrc_base_url = v;
        }
        if let Some(v) = get("VAT_CHECKER_BRREG_URL") {
            config.brreg_base_url = v;
        }
        if let Some(v) = get("VAT_CHECKER_UID_URL") {
            config.uid_service_url = v;
        }
        if let Some(v) = get("VAT_CHECKER_TIMEOUT_SECS") {
            config.timeout_secs = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "VAT_CHECKER_TIMEOUT_SECS".into(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("VAT_CHECKER_USER_AGENT") {
            config.user_agent = v;
        }
        if let Some(v) = get("VAT_CHECKER_PROBE") {
            let flag = v.trim().to_ascii_lowercase();
            config.probe_availability = match flag.as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "VAT_CHECKER_PROBE".into(),
                        value: v,
                    });
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every endpoint is an http(s) URL and the timeout is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".into(),
                value: "0".into(),
            });
        }
        for (key, value) in [
            ("vies_base_url", &self.vies_base_url),
            ("hmrc_base_url", &self.hmrc_base_url),
            ("brreg_base_url", &self.brreg_base_url),
            ("uid_service_url", &self.uid_service_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ConfigError::InvalidUrl {
                    key: key.into(),
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join a base URL and a path segment with exactly one slash.
    pub(crate) fn join(base: &str, segment: &str) -> String {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            segment.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = CheckerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.probe_availability);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn env_overrides() {
        let config = CheckerConfig::from_lookup(lookup(&[
            ("VAT_CHECKER_VIES_URL", "http://localhost:8080/vies"),
            ("VAT_CHECKER_TIMEOUT_SECS", "5"),
            ("VAT_CHECKER_PROBE", "off"),
        ]))
        .unwrap();
        assert_eq!(config.vies_base_url, "http://localhost:8080/vies");
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.probe_availability);
        assert_eq!(config.hmrc_base_url, DEFAULT_HMRC_BASE_URL);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = CheckerConfig::from_lookup(lookup(&[("VAT_CHECKER_VIES_URL", "  ")])).unwrap();
        assert_eq!(config.vies_base_url, DEFAULT_VIES_BASE_URL);
    }

    #[test]
    fn rejects_bad_url() {
        let err = CheckerConfig::from_lookup(lookup(&[("VAT_CHECKER_UID_URL", "ftp://x")]));
        assert!(matches!(err, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = CheckerConfig::from_lookup(lookup(&[("VAT_CHECKER_TIMEOUT_SECS", "soon")]));
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = CheckerConfig::from_lookup(lookup(&[("VAT_CHECKER_TIMEOUT_SECS", "0")]));
        assert!(matches!(
            err,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "timeout_secs"
        ));

        let config = CheckerConfig {
            timeout_secs: 0,
            ..CheckerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_partial_config() {
        let config: CheckerConfig =
            serde_json::from_str(r#"{"timeout_secs": 10, "probe_availability": false}"#).unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert!(!config.probe_availability);
        assert_eq!(config.vies_base_url, DEFAULT_VIES_BASE_URL);
    }

    #[test]
    fn join_handles_slashes() {
        assert_eq!(CheckerConfig::join("http://a/b/", "/c"), "http://a/b/c");
        assert_eq!(CheckerConfig::join("http://a/b", "c"), "http://a/b/c");
    }
}
