use thiserror::Error;

/// Everything that can end a VAT lookup early.
///
/// None of these escape [`VatChecker::do_lookup`](crate::VatChecker::do_lookup):
/// the pipeline converts each one into a populated
/// [`LookupResult`](crate::LookupResult).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// The number does not match its country's VAT number pattern.
    #[error(transparent)]
    Format(#[from] VatFormatError),

    /// The two-letter prefix is not a supported country.
    #[error("the country code '{0}' is not in the supported list of VAT countries")]
    UnsupportedCountry(String),

    /// The prefix and format are known but no registry can be queried.
    ///
    /// Existence cannot be confirmed, so the number is reported as not
    /// valid (`return_code` -1) rather than valid with a format-only note.
    #[error(
        "the VAT number {vat_id} matches the format for {country}, \
         but no lookup service is available for this country"
    )]
    NoRegistry { vat_id: String, country: String },

    /// The registry (or the member state behind VIES) cannot answer right now.
    #[error("{message}")]
    ServiceUnavailable {
        message: String,
        /// Upstream error code, if the registry reported one.
        code: Option<String>,
    },

    /// The registry refused to answer for this specific number.
    #[error("{message}")]
    Rejected { message: String, code: String },

    /// The registry confirms the number does not exist.
    #[error("the VAT number {0} does not exist in the register, it is NOT valid")]
    NotFound(String),

    /// The checker could not be set up from its configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transport-level failure (connection refused, TLS, timeout, ...).
    #[error("lookup failure, error = {0}")]
    Transport(String),
}

impl LookupError {
    /// Shorthand for a `ServiceUnavailable` without an upstream code.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
            code: None,
        }
    }

    /// The `return_code` reported for this error.
    ///
    /// `1` marks a service-side failure where a later retry may succeed,
    /// `2` a failure tied to the queried number, `-1` leaves the result untouched.
    pub fn return_code(&self) -> i32 {
        match self {
            Self::ServiceUnavailable { .. } | Self::Transport(_) => 1,
            Self::Rejected { .. } => 2,
            _ => -1,
        }
    }
}

/// Error returned when a VAT ID fails format validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid VAT ID '{value}': {reason}")]
pub struct VatFormatError {
    /// The invalid input value.
    pub value: String,
    /// Why the value failed validation.
    pub reason: String,
}

impl VatFormatError {
    pub(crate) fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building a [`CheckerConfig`](crate::CheckerConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A URL setting is empty or not http(s).
    #[error("{key} must start with http:// or https://, got '{value}'")]
    InvalidUrl { key: String, value: String },

    /// A numeric or boolean setting could not be parsed.
    #[error("{key} has an invalid value '{value}'")]
    InvalidValue { key: String, value: String },
}
