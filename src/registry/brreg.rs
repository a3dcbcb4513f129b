//! Norwegian Central Coordinating Register for Legal Entities (Enhetsregisteret).
//!
//! A Norwegian VAT number is the 9-digit organisation number; whether the
//! entity is VAT-registered is a separate flag (`registrertIMvaregisteret`).

use serde::Deserialize;

use super::{HttpRequest, RegistryAddress, RegistryResponse, Transport, present};
use crate::core::{CheckerConfig, LookupError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Enhet {
    navn: Option<String>,
    #[serde(rename = "registrertIMvaregisteret")]
    registrert_i_mvaregisteret: Option<bool>,
    forretningsadresse: Option<Adresse>,
    postadresse: Option<Adresse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Adresse {
    #[serde(default)]
    adresse: Vec<String>,
    postnummer: Option<String>,
    poststed: Option<String>,
    landkode: Option<String>,
}

impl From<Adresse> for RegistryAddress {
    fn from(a: Adresse) -> Self {
        let street = a
            .adresse
            .into_iter()
            .filter_map(|l| present(Some(l)))
            .collect::<Vec<_>>()
            .join(", ");
        RegistryAddress::Structured {
            street: present(Some(street)),
            postal_code: present(a.postnummer),
            city: present(a.poststed),
            country_code: present(a.landkode),
        }
    }
}

/// Look up a Norwegian organisation number (9 digits, no `MVA` suffix).
///
/// # Errors
///
/// 404 and 410 (deleted entity) are [`LookupError::NotFound`], 400 is
/// [`LookupError::Rejected`], anything else non-2xx is
/// [`LookupError::ServiceUnavailable`].
pub fn check_vat<T: Transport + ?Sized>(
    transport: &T,
    config: &CheckerConfig,
    org_number: &str,
) -> Result<RegistryResponse, LookupError> {
    let url = CheckerConfig::join(&config.brreg_base_url, org_number);
    let reply = transport.send(&HttpRequest::get(url).header("Accept", "application/json"))?;

    match reply.status {
        200 => {}
        404 | 410 => return Err(LookupError::NotFound(format!("NO{org_number}"))),
        400 => {
            return Err(LookupError::Rejected {
                message: format!("The organisation number {org_number} was rejected by the register"),
                code: "INVALID_INPUT".into(),
            });
        }
        status => {
            return Err(LookupError::unavailable(format!(
                "The Norwegian register returned HTTP {status}"
            )));
        }
    }

    let enhet: Enhet = serde_json::from_str(&reply.body).map_err(|e| {
        LookupError::unavailable(format!("unexpected Enhetsregisteret response: {e}"))
    })?;
    let vat_enabled = enhet.registrert_i_mvaregisteret.unwrap_or(false);
    let address = enhet.forretningsadresse.or(enhet.postadresse);

    Ok(RegistryResponse {
        valid: true,
        vat_enabled: Some(vat_enabled),
        name: present(enhet.navn),
        country_code: address
            .as_ref()
            .and_then(|a| present(a.landkode.clone()))
            .or_else(|| Some("NO".into())),
        address: address.map(RegistryAddress::from),
        request_date: None,
        message: (!vat_enabled).then(|| {
            format!("Company number {org_number} exists in the register but is not VAT enabled.")
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{HttpReply, RecordingTransport};

    const ENHET: &str = r#"{
        "organisasjonsnummer": "923609016",
        "navn": "EQUINOR ASA",
        "registrertIMvaregisteret": true,
        "forretningsadresse": {
            "land": "Norge",
            "landkode": "NO",
            "postnummer": "4035",
            "poststed": "STAVANGER",
            "adresse": ["Forusbeen 50"],
            "kommune": "STAVANGER"
        }
    }"#;

    #[test]
    fn vat_registered_entity() {
        let t = RecordingTransport::new().route("/enheter/923609016", HttpReply::new(200, ENHET));
        let resp = check_vat(&t, &CheckerConfig::default(), "923609016").unwrap();
        assert!(resp.valid);
        assert_eq!(resp.vat_enabled, Some(true));
        assert_eq!(resp.name.as_deref(), Some("EQUINOR ASA"));
        assert_eq!(
            resp.address,
            Some(RegistryAddress::Structured {
                street: Some("Forusbeen 50".into()),
                postal_code: Some("4035".into()),
                city: Some("STAVANGER".into()),
                country_code: Some("NO".into()),
            })
        );
        assert_eq!(resp.message, None);
    }

    #[test]
    fn not_in_vat_register() {
        let body = r#"{"navn":"LITEN FORENING","registrertIMvaregisteret":false,
            "postadresse":{"adresse":["Postboks 1", ""],"postnummer":"0101","poststed":"OSLO","landkode":"NO"}}"#;
        let t = RecordingTransport::new().route("/enheter/", HttpReply::new(200, body));
        let resp = check_vat(&t, &CheckerConfig::default(), "999999999").unwrap();
        assert!(resp.valid);
        assert_eq!(resp.vat_enabled, Some(false));
        assert!(resp.message.unwrap().contains("not VAT enabled"));
        assert!(matches!(
            resp.address,
            Some(RegistryAddress::Structured { street: Some(ref s), .. }) if s == "Postboks 1"
        ));
    }

    #[test]
    fn missing_and_deleted_entities() {
        for status in [404, 410] {
            let t = RecordingTransport::new().route("/enheter/", HttpReply::new(status, ""));
            let err = check_vat(&t, &CheckerConfig::default(), "123456789").unwrap_err();
            assert_eq!(err, LookupError::NotFound("NO123456789".into()));
        }
    }

    #[test]
    fn server_error() {
        let t = RecordingTransport::new().route("/enheter/", HttpReply::new(500, "oops"));
        let err = check_vat(&t, &CheckerConfig::default(), "123456789").unwrap_err();
        assert_eq!(err.return_code(), 1);
    }
}
