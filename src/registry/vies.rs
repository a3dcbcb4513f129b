//! EU VIES REST API client: number check and member state status.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{HttpRequest, RegistryAddress, RegistryResponse, Transport, parse_date_prefix, present};
use crate::core::{CheckerConfig, LookupError};

/// VIES API response structure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViesApiResponse {
    #[serde(alias = "isValid")]
    valid: Option<bool>,
    country_code: Option<String>,
    request_date: Option<String>,
    name: Option<String>,
    address: Option<String>,
    user_error: Option<String>,
    // Error fields
    error_wrappers: Option<Vec<ViesErrorWrapper>>,
}

#[derive(Debug, Deserialize)]
struct ViesErrorWrapper {
    error: Option<String>,
    message: Option<String>,
}

/// VIES API request body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViesRequest<'a> {
    country_code: &'a str,
    vat_number: &'a str,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    vow: Option<StatusVow>,
    #[serde(default)]
    countries: Vec<CountryStatus>,
}

#[derive(Debug, Deserialize)]
struct StatusVow {
    available: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountryStatus {
    country_code: String,
    availability: String,
}

/// Check a VAT number against the EU VIES API.
///
/// `country_code` is the VAT prefix (e.g. "DE", "EL"); `vat_number` the
/// number part without it.
///
/// # Errors
///
/// VIES error codes map to [`LookupError::ServiceUnavailable`] or
/// [`LookupError::Rejected`] (see [`map_error_code`]); a non-2xx reply
/// without an error code, or a body that is not the expected JSON, is
/// `ServiceUnavailable` as well.
pub fn check_vat<T: Transport + ?Sized>(
    transport: &T,
    config: &CheckerConfig,
    country_code: &str,
    vat_number: &str,
) -> Result<RegistryResponse, LookupError> {
    let body = serde_json::to_string(&ViesRequest {
        country_code,
        vat_number,
    })
    .map_err(|e| LookupError::Transport(e.to_string()))?;
    let url = CheckerConfig::join(&config.vies_base_url, "check-vat-number");
    let request = HttpRequest::post(url, body)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json");

    let reply = transport.send(&request)?;
    let parsed: Result<ViesApiResponse, _> = serde_json::from_str(&reply.body);

    // Error codes come with both 2xx and 4xx/5xx statuses
    if let Ok(api_resp) = &parsed {
        if let Some(err) = api_resp.error_wrappers.as_ref().and_then(|e| e.first()) {
            let code = err
                .error
                .clone()
                .or_else(|| err.message.clone())
                .unwrap_or_else(|| "unknown error".into());
            return Err(map_error_code(&code, country_code, vat_number));
        }
        if let Some(code) = api_resp.user_error.as_deref() {
            if code != "VALID" && code != "INVALID" {
                return Err(map_error_code(code, country_code, vat_number));
            }
        }
    }

    if !reply.is_success() {
        return Err(LookupError::ServiceUnavailable {
            message: format!("VIES returned HTTP {}", reply.status),
            code: None,
        });
    }

    let api_resp = parsed.map_err(|e| {
        LookupError::unavailable(format!("unexpected VIES response: {e}"))
    })?;
    let Some(valid) = api_resp.valid else {
        return Err(LookupError::unavailable(
            "unexpected VIES response: no validity flag",
        ));
    };

    Ok(RegistryResponse {
        valid,
        vat_enabled: None,
        name: present(api_resp.name),
        address: present(api_resp.address).map(RegistryAddress::Text),
        country_code: present(api_resp.country_code),
        request_date: parse_date_prefix(api_resp.request_date.as_deref()),
        message: None,
    })
}

/// Query the member state status endpoint.
///
/// Returns the codes of member states whose national service is currently
/// unavailable. Fails when the gateway itself is unreachable, replies with a
/// non-2xx status, or reports its own status checker as down.
pub fn check_status<T: Transport + ?Sized>(
    transport: &T,
    config: &CheckerConfig,
) -> Result<BTreeSet<String>, LookupError> {
    let url = CheckerConfig::join(&config.vies_base_url, "check-status");
    let reply = transport.send(&HttpRequest::get(url).header("Accept", "application/json"))?;
    if !reply.is_success() {
        return Err(LookupError::unavailable(format!(
            "VIES status checker error code: {}",
            reply.status
        )));
    }

    let status: StatusResponse = serde_json::from_str(&reply.body)
        .map_err(|e| LookupError::unavailable(format!("unexpected VIES status response: {e}")))?;
    if status.vow.and_then(|v| v.available) != Some(true) {
        return Err(LookupError::unavailable(
            "the VIES status checker is up but reports the service as unavailable",
        ));
    }

    Ok(status
        .countries
        .into_iter()
        .filter(|c| c.availability.eq_ignore_ascii_case("unavailable"))
        .map(|c| c.country_code.to_ascii_uppercase())
        .collect())
}

/// Translate a VIES error code into a lookup error.
///
/// Codes tied to the queried number become [`LookupError::Rejected`];
/// everything else, including unknown codes, is
/// [`LookupError::ServiceUnavailable`].
pub fn map_error_code(code: &str, country_code: &str, vat_number: &str) -> LookupError {
    let vat_id = format!("{country_code}{vat_number}");
    let rejected = |message: String| LookupError::Rejected {
        message,
        code: code.to_string(),
    };
    let unavailable = |message: String| LookupError::ServiceUnavailable {
        message,
        code: Some(code.to_string()),
    };

    match code {
        "VAT_BLOCKED" => rejected(format!(
            "The VAT number being queried, '{vat_id}', is BLOCKED. This may be an indication \
             of financial issues."
        )),
        "INVALID_INPUT" => rejected(format!(
            "The VAT number, '{vat_id}', you are looking up is invalid, please check it and retry."
        )),
        "GLOBAL_MAX_CONCURRENT_REQ" => {
            unavailable("The VIES system is currently overloaded, please try again later.".into())
        }
        "GLOBAL_MAX_CONCURRENT_REQ_TIME" => unavailable(
            "The VIES system has too many requests resulting in delays in response, \
             please try again later."
                .into(),
        ),
        "MS_MAX_CONCURRENT_REQ" => unavailable(format!(
            "The member state '{country_code}' that the VIES system is trying to contact is \
             currently overloaded, try again later."
        )),
        "MS_MAX_CONCURRENT_REQ_TIME" => unavailable(format!(
            "The member state '{country_code}' that the VIES system is trying to contact has \
             too many requests resulting in delays in response, try again later."
        )),
        "TIMEOUT" => unavailable(
            "There was a timeout trying to reach the VIES system, try again later.".into(),
        ),
        "SERVICE_UNAVAILABLE" => unavailable(
            "The VIES system is currently unavailable and may be undergoing maintenance, \
             try again later."
                .into(),
        ),
        "SERVER_BUSY" => unavailable(
            "The VIES system is too busy to service your request, try again later.".into(),
        ),
        "MS_UNAVAILABLE" => unavailable(format!(
            "The VIES system is currently unable to contact the member state '{country_code}', \
             try this lookup later."
        )),
        "IP_BLOCKED" => unavailable(
            "The querying IP address has been blocked by VIES, please inform IT support.".into(),
        ),
        other => unavailable(format!(
            "There was an error, '{other}', trying to look up the VAT number {vat_id} in the \
             VIES system."
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{HttpReply, Method, RecordingTransport};

    fn config() -> CheckerConfig {
        CheckerConfig {
            vies_base_url: "https://vies.test/rest-api".into(),
            ..CheckerConfig::default()
        }
    }

    #[test]
    fn vies_request_serialization() {
        let req = ViesRequest {
            country_code: "DE",
            vat_number: "123456789",
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"countryCode\":\"DE\""));
        assert!(json.contains("\"vatNumber\":\"123456789\""));
    }

    #[test]
    fn valid_number_with_details() {
        let t = RecordingTransport::new().route(
            "/check-vat-number",
            HttpReply::new(
                200,
                r#"{"countryCode":"AT","vatNumber":"U12345678","requestDate":"2024-01-15+01:00",
                    "valid":true,"name":"Example GmbH","address":"Hauptstrasse 1\n1010 Wien"}"#,
            ),
        );
        let resp = check_vat(&t, &config(), "AT", "U12345678").unwrap();
        assert!(resp.valid);
        assert_eq!(resp.name.as_deref(), Some("Example GmbH"));
        assert_eq!(
            resp.address,
            Some(RegistryAddress::Text("Hauptstrasse 1\n1010 Wien".into()))
        );
        assert_eq!(resp.country_code.as_deref(), Some("AT"));
        assert!(resp.request_date.is_some());

        let sent = t.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].url, "https://vies.test/rest-api/check-vat-number");
        assert!(sent[0].body.as_deref().unwrap().contains("\"vatNumber\":\"U12345678\""));
    }

    #[test]
    fn is_valid_alias_and_placeholders() {
        let t = RecordingTransport::new().route(
            "/check-vat-number",
            HttpReply::new(200, r#"{"isValid":true,"userError":"VALID","name":"---","address":"---"}"#),
        );
        let resp = check_vat(&t, &config(), "DE", "123456789").unwrap();
        assert!(resp.valid);
        assert_eq!(resp.name, None);
        assert_eq!(resp.address, None);
    }

    #[test]
    fn invalid_number() {
        let t = RecordingTransport::new().route(
            "/check-vat-number",
            HttpReply::new(200, r#"{"valid":false,"name":"---","address":"---"}"#),
        );
        assert!(!check_vat(&t, &config(), "FR", "12345678901").unwrap().valid);
    }

    #[test]
    fn error_wrapper_on_http_error() {
        let t = RecordingTransport::new().route(
            "/check-vat-number",
            HttpReply::new(
                500,
                r#"{"actionSucceed":false,"errorWrappers":[{"error":"MS_UNAVAILABLE"}]}"#,
            ),
        );
        let err = check_vat(&t, &config(), "IT", "12345678901").unwrap_err();
        assert!(matches!(
            err,
            LookupError::ServiceUnavailable { code: Some(ref c), .. } if c == "MS_UNAVAILABLE"
        ));
        assert_eq!(err.return_code(), 1);
    }

    #[test]
    fn blocked_number_is_rejected() {
        let t = RecordingTransport::new().route(
            "/check-vat-number",
            HttpReply::new(200, r#"{"userError":"VAT_BLOCKED","valid":false}"#),
        );
        let err = check_vat(&t, &config(), "NL", "123456789B01").unwrap_err();
        assert_eq!(err.return_code(), 2);
        assert!(err.to_string().contains("NL123456789B01"));
    }

    #[test]
    fn unknown_shape_is_unavailable() {
        let t = RecordingTransport::new()
            .route("/check-vat-number", HttpReply::new(200, "<html>sorry</html>"));
        let err = check_vat(&t, &config(), "BE", "0123456789").unwrap_err();
        assert!(matches!(err, LookupError::ServiceUnavailable { .. }));

        let t = RecordingTransport::new()
            .route("/check-vat-number", HttpReply::new(200, r#"{"name":"X"}"#));
        assert!(check_vat(&t, &config(), "BE", "0123456789").is_err());
    }

    #[test]
    fn unknown_error_code_is_unavailable() {
        let err = map_error_code("SOMETHING_NEW", "DE", "123456789");
        assert!(matches!(err, LookupError::ServiceUnavailable { .. }));
        assert!(err.to_string().contains("SOMETHING_NEW"));
    }

    #[test]
    fn status_lists_unavailable_states() {
        let t = RecordingTransport::new().route(
            "/check-status",
            HttpReply::new(
                200,
                r#"{"vow":{"available":true},"countries":[
                    {"countryCode":"AT","availability":"Available"},
                    {"countryCode":"DE","availability":"Unavailable"},
                    {"countryCode":"EL","availability":"Unavailable"}]}"#,
            ),
        );
        let down = check_status(&t, &config()).unwrap();
        assert_eq!(down.into_iter().collect::<Vec<_>>(), ["DE", "EL"]);
        assert_eq!(t.requests()[0].url, "https://vies.test/rest-api/check-status");
    }

    #[test]
    fn status_checker_down() {
        let t = RecordingTransport::new().route(
            "/check-status",
            HttpReply::new(200, r#"{"vow":{"available":false},"countries":[]}"#),
        );
        assert!(check_status(&t, &config()).is_err());

        let t = RecordingTransport::new().route("/check-status", HttpReply::new(503, ""));
        assert!(check_status(&t, &config()).is_err());
    }
}
