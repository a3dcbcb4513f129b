//! Swiss federal UID register, public SOAP services.
//!
//! A lookup is two calls: `ValidateUID` answers whether the UID is a valid
//! VAT registration, `GetByUID` returns the organisation record. Some records
//! are restricted; the service then answers `GetByUID` with a fault or an
//! empty result and the number stays valid without details.

use super::xml::{XmlWriter, first_texts, soap_fault};
use super::{HttpRequest, RegistryAddress, RegistryResponse, Transport, present};
use crate::core::{CheckerConfig, LookupError};

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const UID_NS: &str = "http://www.uid.admin.ch/xmlns/uid-wse";
const ECH_0097_NS: &str = "http://www.ech.ch/xmlns/eCH-0097/5";
const ACTION_PREFIX: &str = "http://www.uid.admin.ch/xmlns/uid-wse/IPublicServices/";

/// Elements read from a `GetByUID` reply.
const ORGANISATION_FIELDS: &[&str] = &[
    "organisationName",
    "organisationAdditionalName",
    "street",
    "houseNumber",
    "town",
    "swissZipCode",
    "foreignZipCode",
    "countryIdISO2",
];

/// Write the envelope around a body produced by `body`.
fn envelope<F>(body: F) -> Result<String, LookupError>
where
    F: FnOnce(&mut XmlWriter) -> Result<(), LookupError>,
{
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "soapenv:Envelope",
        &[
            ("xmlns:soapenv", SOAP_ENV_NS),
            ("xmlns:uid", UID_NS),
            ("xmlns:ech", ECH_0097_NS),
        ],
    )?;
    w.start_element("soapenv:Body")?;
    body(&mut w)?;
    w.end_element("soapenv:Body")?;
    w.end_element("soapenv:Envelope")?;
    w.into_string()
}

fn validate_uid_request(uid: &str) -> Result<String, LookupError> {
    envelope(|w| {
        w.start_element("uid:ValidateUID")?
            .text_element("uid:uid", uid)?
            .end_element("uid:ValidateUID")?;
        Ok(())
    })
}

fn get_by_uid_request(category: &str, id: &str) -> Result<String, LookupError> {
    envelope(|w| {
        w.start_element("uid:GetByUID")?
            .start_element("uid:uid")?
            .text_element("ech:uidOrganisationIdCategorie", category)?
            .text_element("ech:uidOrganisationId", id)?
            .end_element("uid:uid")?
            .end_element("uid:GetByUID")?;
        Ok(())
    })
}

fn call<T: Transport + ?Sized>(
    transport: &T,
    config: &CheckerConfig,
    action: &str,
    body: String,
) -> Result<super::HttpReply, LookupError> {
    let request = HttpRequest::post(config.uid_service_url.clone(), body)
        .header("Content-Type", "text/xml; charset=utf-8")
        .header("SOAPAction", format!("\"{ACTION_PREFIX}{action}\""));
    transport.send(&request)
}

/// Look up a Swiss UID. `number` is the body after `CH`, e.g. `E116281710`.
///
/// # Errors
///
/// A `ValidateUID` answer of `false` is [`LookupError::NotFound`]; a fault
/// mentioning a request limit is [`LookupError::ServiceUnavailable`], any
/// other fault [`LookupError::Rejected`].
pub fn check_vat<T: Transport + ?Sized>(
    transport: &T,
    config: &CheckerConfig,
    number: &str,
) -> Result<RegistryResponse, LookupError> {
    let uid = format!("CH{number}");
    // "CHE" is the category, the 9 digits the id
    let (category, id) = uid.split_at(3.min(uid.len()));

    let reply = call(transport, config, "ValidateUID", validate_uid_request(&uid)?)?;
    if let Some(fault) = soap_fault(&reply.body) {
        return Err(fault_error(&fault, &uid));
    }
    if !reply.is_success() {
        return Err(LookupError::unavailable(format!(
            "The Swiss UID register returned HTTP {}",
            reply.status
        )));
    }
    let texts = first_texts(&reply.body, &["ValidateUIDResult"])
        .map_err(|e| LookupError::unavailable(e.to_string()))?;
    match texts.get("ValidateUIDResult").map(String::as_str) {
        Some("true") => {}
        Some("false") => {
            return Err(LookupError::NotFound(format!(
                "{uid} (the number may exist, but not be of type VAT)"
            )));
        }
        _ => {
            return Err(LookupError::unavailable(format!(
                "There was an unexpected error looking up VAT number {uid}."
            )));
        }
    }

    let mut response = RegistryResponse {
        valid: true,
        vat_enabled: Some(true),
        country_code: Some("CH".into()),
        ..RegistryResponse::default()
    };

    let details = call(
        transport,
        config,
        "GetByUID",
        get_by_uid_request(category, id)?,
    );
    let reply = match details {
        Ok(reply) => reply,
        Err(e) => {
            response.message = Some(format!(
                "The VAT/UID number {uid} is valid, but the details lookup failed: {e}"
            ));
            return Ok(response);
        }
    };
    if let Some(fault) = soap_fault(&reply.body) {
        response.message = Some(format!(
            "There was a lookup error, {fault}, trying to look up the details of the UID/VAT \
             number {uid}."
        ));
        return Ok(response);
    }

    if !reply.is_success() {
        response.message = Some(format!(
            "The VAT/UID number {uid} is valid, but the details lookup failed: HTTP {}",
            reply.status
        ));
        return Ok(response);
    }
    let fields = match first_texts(&reply.body, ORGANISATION_FIELDS) {
        Ok(fields) => fields,
        Err(e) => {
            response.message = Some(format!(
                "The VAT/UID number {uid} is valid, but the details lookup failed: {e}"
            ));
            return Ok(response);
        }
    };
    let field = |name: &str| present(fields.get(name).cloned());

    response.name = field("organisationAdditionalName").or_else(|| field("organisationName"));
    if response.name.is_none() && field("town").is_none() {
        response.message = Some(format!(
            "The VAT/UID number {uid} is valid, but the company details are withheld."
        ));
        return Ok(response);
    }

    let street = [field("street"), field("houseNumber")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let country_code = field("countryIdISO2");
    response.address = Some(RegistryAddress::Structured {
        street: present(Some(street)),
        postal_code: field("swissZipCode").or_else(|| field("foreignZipCode")),
        city: field("town"),
        country_code: country_code.clone(),
    });
    if country_code.is_some() {
        response.country_code = country_code;
    }
    Ok(response)
}

fn fault_error(fault: &str, uid: &str) -> LookupError {
    if fault.to_ascii_lowercase().contains("limit") {
        LookupError::ServiceUnavailable {
            message: format!("The Swiss UID register is rate limiting requests: {fault}"),
            code: Some(fault.to_string()),
        }
    } else {
        LookupError::Rejected {
            message: format!("The Swiss UID register rejected {uid}: {fault}"),
            code: fault.to_string(),
        }
    }
}
