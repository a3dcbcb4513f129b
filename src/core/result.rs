//! The uniform lookup result returned for every VAT number.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use super::countries::country_name;
use super::error::LookupError;

/// `return_code` of a result no lookup stage has completed.
pub const RETURN_UNTOUCHED: i32 = -1;
/// `return_code` of a completed registry lookup.
pub const RETURN_OK: i32 = 0;

/// Outcome of a single VAT number lookup.
///
/// Field order matches the serialized key order: `return_code`, `valid`,
/// `vat_enabled`, `err_msg`, `has_details`, `company_name`, `street`,
/// `postal_code`, `city`, `country_code`, `country`. The raw `address`
/// and the registry `request_date` follow only when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    pub return_code: i32,
    #[serde(rename = "valid")]
    pub is_valid: bool,
    pub vat_enabled: bool,
    #[serde(rename = "err_msg")]
    pub error_message: Option<String>,
    pub has_details: bool,
    pub company_name: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,
    /// Address text exactly as the registry returned it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_date: Option<NaiveDate>,
}

impl Default for LookupResult {
    fn default() -> Self {
        Self {
            return_code: RETURN_UNTOUCHED,
            is_valid: false,
            vat_enabled: false,
            error_message: None,
            has_details: false,
            company_name: None,
            street: None,
            postal_code: None,
            city: None,
            country_code: None,
            country: None,
            address: None,
            request_date: None,
        }
    }
}

impl LookupResult {
    /// A fresh result with nothing populated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Result for a lookup that ended with `err`.
    pub fn from_error(err: &LookupError) -> Self {
        Self {
            return_code: err.return_code(),
            error_message: Some(err.to_string()),
            ..Self::default()
        }
    }

    /// Set `country_code` and derive the display `country` from the table.
    pub fn set_country(&mut self, code: &str) {
        let code = code.trim().to_ascii_uppercase();
        self.country = country_name(&code).map(str::to_string);
        self.country_code = Some(code);
    }

    /// Whether any company or address field carries text.
    pub fn has_text_details(&self) -> bool {
        [
            &self.company_name,
            &self.street,
            &self.postal_code,
            &self.city,
            &self.address,
        ]
        .iter()
        .any(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    /// The result as an insertion-ordered key-value map.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct of plain fields always serializes to an object.
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_result_is_untouched() {
        let r = LookupResult::new();
        assert_eq!(r.return_code, RETURN_UNTOUCHED);
        assert!(!r.is_valid);
        assert!(!r.vat_enabled);
        assert!(!r.has_details);
        assert!(!r.has_text_details());
    }

    #[test]
    fn map_keeps_insertion_order() {
        let keys: Vec<String> = LookupResult::new().to_map().keys().cloned().collect();
        assert_eq!(
            keys,
            [
                "return_code",
                "valid",
                "vat_enabled",
                "err_msg",
                "has_details",
                "company_name",
                "street",
                "postal_code",
                "city",
                "country_code",
                "country",
            ]
        );
    }

    #[test]
    fn raw_address_is_appended_when_present() {
        let r = LookupResult {
            address: Some("1 High Street\nLONDON".into()),
            ..LookupResult::new()
        };
        let map = r.to_map();
        assert_eq!(map.keys().last().map(String::as_str), Some("address"));
        assert!(r.has_text_details());
    }

    #[test]
    fn set_country_resolves_name() {
        let mut r = LookupResult::new();
        r.set_country("el");
        assert_eq!(r.country_code.as_deref(), Some("EL"));
        assert_eq!(r.country.as_deref(), Some("Greece"));

        r.set_country("US");
        assert_eq!(r.country, None);
    }

    #[test]
    fn error_result_carries_message() {
        let r = LookupResult::from_error(&LookupError::UnsupportedCountry("XX".into()));
        assert!(!r.is_valid);
        assert_eq!(r.return_code, RETURN_UNTOUCHED);
        assert!(r.error_message.unwrap().contains("XX"));
    }
}
