//! Mapping of registry responses onto [`LookupResult`].

use crate::core::{LookupError, LookupResult, RETURN_OK};
use crate::registry::{RegistryAddress, RegistryResponse};

use super::address::{AddressLayout, address_layout, parse_address};

/// Build the result for a registry answer about `vat_id`.
///
/// `country_code` is the VAT prefix the number was looked up under. It picks
/// the address layout and stands in for the country when the registry does
/// not report one.
pub fn normalize(response: RegistryResponse, country_code: &str, vat_id: &str) -> LookupResult {
    let country = response
        .country_code
        .clone()
        .unwrap_or_else(|| country_code.to_string());

    if !response.valid {
        let mut result = LookupResult::from_error(&LookupError::NotFound(vat_id.to_string()));
        if let Some(message) = response.message {
            result.error_message = Some(message);
        }
        result.set_country(&country);
        return result;
    }

    let vat_enabled = response.vat_enabled != Some(false);
    let mut result = LookupResult {
        return_code: RETURN_OK,
        is_valid: true,
        vat_enabled,
        error_message: response.message,
        request_date: response.request_date,
        ..LookupResult::new()
    };
    if !vat_enabled && result.error_message.is_none() {
        result.error_message = Some(format!(
            "The number {vat_id} exists in the register but is not VAT enabled."
        ));
    }

    if address_layout(country_code) == AddressLayout::Withheld {
        tracing::debug!(country = country_code, "registry withholds company details");
    } else {
        result.company_name = response.name;
        match response.address {
            Some(RegistryAddress::Text(text)) => {
                let parsed = parse_address(&text, country_code);
                result.street = parsed.street;
                result.postal_code = parsed.postal_code;
                result.city = parsed.city;
                result.address = Some(text);
            }
            Some(RegistryAddress::Structured {
                street,
                postal_code,
                city,
                ..
            }) => {
                result.street = street;
                result.postal_code = postal_code;
                result.city = city;
            }
            None => {}
        }
    }

    result.set_country(&country);
    result.has_details = result.has_text_details();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vies(name: &str, address: &str) -> RegistryResponse {
        RegistryResponse {
            valid: true,
            name: Some(name.into()),
            address: Some(RegistryAddress::Text(address.into())),
            country_code: Some("AT".into()),
            ..RegistryResponse::default()
        }
    }

    #[test]
    fn valid_with_parsed_address() {
        let r = normalize(
            vies("Example GmbH", "Hauptstrasse 1\n1010 Wien"),
            "AT",
            "ATU12345678",
        );
        assert_eq!(r.return_code, 0);
        assert!(r.is_valid && r.vat_enabled && r.has_details);
        assert_eq!(r.company_name.as_deref(), Some("Example GmbH"));
        assert_eq!(r.street.as_deref(), Some("Hauptstrasse 1"));
        assert_eq!(r.postal_code.as_deref(), Some("1010"));
        assert_eq!(r.city.as_deref(), Some("Wien"));
        assert_eq!(r.country.as_deref(), Some("Austria"));
        assert_eq!(r.address.as_deref(), Some("Hauptstrasse 1\n1010 Wien"));
        assert_eq!(r.error_message, None);
    }

    #[test]
    fn not_valid_is_not_found() {
        let resp = RegistryResponse {
            valid: false,
            ..RegistryResponse::default()
        };
        let r = normalize(resp, "FR", "FR12345678901");
        assert!(!r.is_valid);
        assert!(!r.vat_enabled);
        assert_eq!(r.return_code, -1);
        assert!(r.error_message.unwrap().contains("FR12345678901"));
        assert_eq!(r.country_code.as_deref(), Some("FR"));
    }

    #[test]
    fn withheld_country_has_no_details() {
        let mut resp = vies("Should Not Appear", "Somewhere 1\n10115 Berlin");
        resp.country_code = Some("DE".into());
        let r = normalize(resp, "DE", "DE123456789");
        assert!(r.is_valid);
        assert!(!r.has_details);
        assert_eq!(r.company_name, None);
        assert_eq!(r.address, None);
    }

    #[test]
    fn not_vat_enabled() {
        let resp = RegistryResponse {
            valid: true,
            vat_enabled: Some(false),
            name: Some("LITEN FORENING".into()),
            ..RegistryResponse::default()
        };
        let r = normalize(resp, "NO", "NO999999999");
        assert_eq!(r.return_code, 0);
        assert!(r.is_valid);
        assert!(!r.vat_enabled);
        assert!(r.error_message.unwrap().contains("not VAT enabled"));
        assert_eq!(r.country_code.as_deref(), Some("NO"));
        assert_eq!(r.country.as_deref(), Some("Norway"));
    }

    #[test]
    fn unparsed_country_keeps_raw_text() {
        let resp = RegistryResponse {
            valid: true,
            vat_enabled: Some(true),
            name: Some("ACME LTD".into()),
            address: Some(RegistryAddress::Text("1 High Street\nLONDON\nSW1A 1AA".into())),
            ..RegistryResponse::default()
        };
        let r = normalize(resp, "GB", "GB999999973");
        assert!(r.has_details);
        assert_eq!(r.street, None);
        assert_eq!(r.postal_code, None);
        assert_eq!(r.city, None);
        assert!(r.address.is_some());
        assert_eq!(r.country.as_deref(), Some("United Kingdom"));
    }

    #[test]
    fn structured_address_maps_directly() {
        let resp = RegistryResponse {
            valid: true,
            vat_enabled: Some(true),
            address: Some(RegistryAddress::Structured {
                street: Some("Hilfikerstrasse 1".into()),
                postal_code: Some("3000".into()),
                city: Some("Bern".into()),
                country_code: Some("CH".into()),
            }),
            country_code: Some("CH".into()),
            ..RegistryResponse::default()
        };
        let r = normalize(resp, "CH", "CHE116281710");
        assert!(r.has_details);
        assert_eq!(r.company_name, None);
        assert_eq!(r.city.as_deref(), Some("Bern"));
        assert_eq!(r.address, None);
    }

    #[test]
    fn no_details_is_not_an_error() {
        let resp = RegistryResponse {
            valid: true,
            ..RegistryResponse::default()
        };
        let r = normalize(resp, "BE", "BE0123456789");
        assert_eq!(r.return_code, 0);
        assert!(r.is_valid && r.vat_enabled);
        assert!(!r.has_details);
        assert_eq!(r.country_code.as_deref(), Some("BE"));
    }
}
