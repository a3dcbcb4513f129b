//! HMRC "check a UK VAT number" API.
//!
//! UK addresses come back as up to five free lines plus a postcode. The lines
//! mix street, locality and town in no fixed order, so they are joined into
//! one text and left unparsed.

use serde::Deserialize;

use super::{HttpRequest, RegistryAddress, RegistryResponse, Transport, parse_date_prefix, present};
use crate::core::{CheckerConfig, LookupError};

const ACCEPT: &str = "application/vnd.hmrc.1.0+json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HmrcResponse {
    target: HmrcTarget,
    processing_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HmrcTarget {
    name: Option<String>,
    address: Option<HmrcAddress>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HmrcAddress {
    line1: Option<String>,
    line2: Option<String>,
    line3: Option<String>,
    line4: Option<String>,
    line5: Option<String>,
    postcode: Option<String>,
    country_code: Option<String>,
}

impl HmrcAddress {
    fn text(self) -> Option<String> {
        let lines: Vec<String> = [
            self.line1, self.line2, self.line3, self.line4, self.line5, self.postcode,
        ]
        .into_iter()
        .filter_map(present)
        .collect();
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

#[derive(Debug, Deserialize)]
struct HmrcError {
    code: Option<String>,
    message: Option<String>,
}

/// Look up a UK VAT number (9 or 12 digits, without the `GB` prefix).
///
/// # Errors
///
/// 404 is [`LookupError::NotFound`], 400 is [`LookupError::Rejected`], any
/// other non-2xx status or an unexpected body is
/// [`LookupError::ServiceUnavailable`].
pub fn check_vat<T: Transport + ?Sized>(
    transport: &T,
    config: &CheckerConfig,
    vat_number: &str,
) -> Result<RegistryResponse, LookupError> {
    let url = CheckerConfig::join(&config.hmrc_base_url, vat_number);
    let reply = transport.send(&HttpRequest::get(url).header("Accept", ACCEPT))?;

    match reply.status {
        200 => {}
        404 => return Err(LookupError::NotFound(format!("GB{vat_number}"))),
        400 => {
            let err: Option<HmrcError> = serde_json::from_str(&reply.body).ok();
            let code = err
                .as_ref()
                .and_then(|e| e.code.clone())
                .unwrap_or_else(|| "INVALID_REQUEST".into());
            let message = err
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("HMRC rejected the VAT number GB{vat_number}"));
            return Err(LookupError::Rejected { message, code });
        }
        status => {
            return Err(LookupError::unavailable(format!(
                "The lookup process for GB{vat_number} failed, HMRC returned HTTP {status}"
            )));
        }
    }

    let resp: HmrcResponse = serde_json::from_str(&reply.body)
        .map_err(|e| LookupError::unavailable(format!("unexpected HMRC response: {e}")))?;

    let (address, country_code) = match resp.target.address {
        Some(addr) => {
            let cc = present(addr.country_code.clone());
            (addr.text(), cc)
        }
        None => (None, None),
    };

    Ok(RegistryResponse {
        valid: true,
        vat_enabled: Some(true),
        name: present(resp.target.name),
        address: address.map(RegistryAddress::Text),
        country_code: country_code.or_else(|| Some("GB".into())),
        request_date: parse_date_prefix(resp.processing_date.as_deref()),
        message: None,
    })
}
