//! Adapters for the upstream VAT registries.
//!
//! Every adapter turns an HTTP reply from its registry into the same
//! [`RegistryResponse`], which the normalizer maps onto a
//! [`LookupResult`](crate::LookupResult).
//!
//! | Adapter | Countries | Wire format |
//! |---------|-----------|-------------|
//! | [`vies`] | EU member states, `XI` | REST/JSON |
//! | [`hmrc`] | `GB` | REST/JSON |
//! | [`brreg`] | `NO` | REST/JSON |
//! | [`uid`] | `CH` | SOAP 1.1 |

use chrono::NaiveDate;

pub mod brreg;
pub mod hmrc;
mod transport;
pub mod uid;
pub mod vies;
mod xml;

pub use transport::*;

/// What a registry said about one VAT number, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryResponse {
    /// The number exists in the register.
    pub valid: bool,
    /// `Some(false)` when the registry states the number is not VAT-enabled;
    /// `None` when it only reports existence.
    pub vat_enabled: Option<bool>,
    pub name: Option<String>,
    pub address: Option<RegistryAddress>,
    /// Country the registry reports for the trader.
    pub country_code: Option<String>,
    pub request_date: Option<NaiveDate>,
    /// Informational message from the registry, e.g. why details are missing.
    pub message: Option<String>,
}

/// Address data as the registry returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryAddress {
    /// One free-text blob that needs country-specific parsing.
    Text(String),
    /// Already split into fields by the registry.
    Structured {
        street: Option<String>,
        postal_code: Option<String>,
        city: Option<String>,
        country_code: Option<String>,
    },
}

/// Treat empty strings and the VIES placeholder `---` as absent.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "---")
}

/// Parse the date part of `2024-01-15`, `2024-01-15+01:00` or an RFC 3339
/// timestamp.
pub(crate) fn parse_date_prefix(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    let date = value.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
