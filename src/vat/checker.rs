//! The lookup session: format check, availability gate, dispatch, normalize.

use crate::core::{CheckerConfig, LookupError, LookupResult, Registry, country};
use crate::registry::{RegistryResponse, Transport, brreg, hmrc, uid, vies};

use super::format::{clean_vat_input, registry_number, validate_vat_format};
use super::normalize::normalize;
use super::status::{Availability, fetch_unavailable_states};

/// A VAT lookup session.
///
/// The VIES availability probe runs once, when the session is built, and its
/// result is reused for every lookup made through this value. Build a new
/// session to probe again.
#[derive(Debug)]
pub struct VatChecker<T> {
    config: CheckerConfig,
    transport: T,
    availability: Availability,
}

#[cfg(feature = "http")]
impl VatChecker<crate::registry::ReqwestTransport> {
    /// Build a session on the blocking `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or the HTTP client cannot be
    /// built.
    pub fn new(config: CheckerConfig) -> Result<Self, LookupError> {
        config.validate()?;
        let transport = crate::registry::ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> VatChecker<T> {
    /// Build a session on any transport, probing VIES unless disabled.
    pub fn with_transport(config: CheckerConfig, transport: T) -> Self {
        let availability = if config.probe_availability {
            fetch_unavailable_states(&transport, &config)
        } else {
            Availability::all_available()
        };
        Self {
            config,
            transport,
            availability,
        }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The availability recorded when the session was built.
    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Ask the registry responsible for `country_code` about `number`.
    ///
    /// `number` is the body after the prefix. EU member states that the
    /// probe marked unavailable fail without a network call.
    ///
    /// # Errors
    ///
    /// [`LookupError::UnsupportedCountry`] for an unknown prefix,
    /// [`LookupError::NoRegistry`] for a country that cannot be queried, and
    /// whatever the registry adapter reports otherwise.
    pub fn lookup(&self, country_code: &str, number: &str) -> Result<RegistryResponse, LookupError> {
        let Some(known) = country(country_code) else {
            return Err(LookupError::UnsupportedCountry(country_code.to_string()));
        };
        let number = registry_number(known.code, number);

        let Some(registry) = known.registry else {
            return Err(LookupError::NoRegistry {
                vat_id: format!("{}{number}", known.code),
                country: known.name.to_string(),
            });
        };
        tracing::debug!(country = known.code, ?registry, "dispatching lookup");

        match registry {
            Registry::Vies => {
                if !self.availability.is_available(known.code) {
                    return Err(self.availability.unavailable_error(known.code));
                }
                vies::check_vat(&self.transport, &self.config, known.code, number)
            }
            Registry::Hmrc => hmrc::check_vat(&self.transport, &self.config, number),
            Registry::Brreg => brreg::check_vat(&self.transport, &self.config, number),
            Registry::SwissUid => uid::check_vat(&self.transport, &self.config, number),
        }
    }

    /// Run the full pipeline for one raw VAT number.
    ///
    /// Never fails: every error ends up in the returned result's `err_msg`
    /// and `return_code`.
    pub fn do_lookup(&self, raw: &str) -> LookupResult {
        let cleaned = clean_vat_input(raw);
        let prefix = cleaned.get(..2).unwrap_or(&cleaned);

        let result = match self.run(&cleaned) {
            Ok(result) => result,
            Err(e) => {
                match e.return_code() {
                    1 => tracing::warn!(vat_id = %cleaned, error = %e, "lookup failed"),
                    _ => tracing::info!(vat_id = %cleaned, error = %e, "lookup rejected"),
                }
                let mut result = LookupResult::from_error(&e);
                if country(prefix).is_some() {
                    result.set_country(prefix);
                }
                return result;
            }
        };

        tracing::info!(
            vat_id = %cleaned,
            valid = result.is_valid,
            vat_enabled = result.vat_enabled,
            has_details = result.has_details,
            "lookup complete"
        );
        result
    }

    fn run(&self, cleaned: &str) -> Result<LookupResult, LookupError> {
        let prefix = cleaned.get(..2).unwrap_or(cleaned);
        if prefix.len() < 2 || country(prefix).is_none() {
            return Err(LookupError::UnsupportedCountry(prefix.to_string()));
        }

        let (country_code, number) = validate_vat_format(cleaned)?;
        let response = self.lookup(&country_code, &number)?;
        Ok(normalize(response, &country_code, cleaned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{HttpReply, RecordingTransport};

    const STATUS_OK: &str = r#"{"vow":{"available":true},"countries":[]}"#;

    fn checker(t: RecordingTransport) -> VatChecker<RecordingTransport> {
        VatChecker::with_transport(CheckerConfig::default(), t)
    }

    #[test]
    fn probe_runs_once_at_construction() {
        let c = checker(RecordingTransport::new().route("/check-status", HttpReply::new(200, STATUS_OK)));
        assert_eq!(c.transport().call_count(), 1);
        assert!(c.availability().is_available("AT"));
    }

    #[test]
    fn probe_can_be_disabled() {
        let config = CheckerConfig {
            probe_availability: false,
            ..CheckerConfig::default()
        };
        let c = VatChecker::with_transport(config, RecordingTransport::new());
        assert_eq!(c.transport().call_count(), 0);
        assert_eq!(c.availability(), &Availability::all_available());
    }

    #[test]
    fn unknown_prefix_is_unsupported() {
        let c = checker(RecordingTransport::new().route("/check-status", HttpReply::new(200, STATUS_OK)));
        assert!(matches!(
            c.lookup("XX", "123"),
            Err(LookupError::UnsupportedCountry(ref cc)) if cc == "XX"
        ));
    }

    #[test]
    fn format_only_country() {
        let c = checker(RecordingTransport::new().route("/check-status", HttpReply::new(200, STATUS_OK)));
        let r = c.do_lookup("SM12345");
        assert!(!r.is_valid);
        assert!(r.error_message.unwrap().contains("San Marino"));
        assert_eq!(r.country.as_deref(), Some("San Marino"));
        assert_eq!(c.transport().call_count(), 1);
    }

    #[test]
    fn short_input() {
        let c = checker(RecordingTransport::new().route("/check-status", HttpReply::new(200, STATUS_OK)));
        for raw in ["", "D", " - "] {
            let r = c.do_lookup(raw);
            assert!(!r.is_valid);
            assert!(r.error_message.is_some());
            assert_eq!(r.country_code, None);
        }
        assert_eq!(c.transport().call_count(), 1);
    }

    #[test]
    fn norwegian_suffix_is_stripped() {
        let t = RecordingTransport::new()
            .route("/check-status", HttpReply::new(200, STATUS_OK))
            .route(
                "/enheter/923609016",
                HttpReply::new(200, r#"{"navn":"EQUINOR ASA","registrertIMvaregisteret":true}"#),
            );
        let c = checker(t);
        let r = c.do_lookup("NO 923 609 016 MVA");
        assert!(r.is_valid && r.vat_enabled);
        assert_eq!(r.company_name.as_deref(), Some("EQUINOR ASA"));
        assert!(c.transport().requests()[1].url.ends_with("/enheter/923609016"));
    }
}
