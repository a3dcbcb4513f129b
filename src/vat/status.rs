//! Per-session VIES availability.

use std::collections::BTreeSet;

use crate::core::{CheckerConfig, LookupError};
use crate::registry::{Transport, vies};

/// Which EU member state services can be queried in this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// The gateway is up; the listed member states are not.
    Partial(BTreeSet<String>),
    /// The gateway itself is down or its status could not be read.
    GatewayDown(String),
}

impl Default for Availability {
    fn default() -> Self {
        Self::Partial(BTreeSet::new())
    }
}

impl Availability {
    /// Every member state available; used when probing is disabled.
    pub fn all_available() -> Self {
        Self::default()
    }

    /// Whether lookups for member state `country_code` may be sent.
    pub fn is_available(&self, country_code: &str) -> bool {
        match self {
            Self::Partial(down) => !down.contains(&country_code.to_ascii_uppercase()),
            Self::GatewayDown(_) => false,
        }
    }

    /// The error reported for a lookup that is not sent.
    pub fn unavailable_error(&self, country_code: &str) -> LookupError {
        match self {
            Self::GatewayDown(reason) => LookupError::ServiceUnavailable {
                message: format!("The VIES service is currently unavailable: {reason}"),
                code: Some("SERVICE_UNAVAILABLE".into()),
            },
            Self::Partial(_) => LookupError::ServiceUnavailable {
                message: format!(
                    "The member state service for '{country_code}' is currently unavailable \
                     in VIES, try this lookup later."
                ),
                code: Some("MS_UNAVAILABLE".into()),
            },
        }
    }
}

/// Query the VIES status endpoint once.
///
/// Never fails: any problem reading the status marks the whole gateway as
/// down for the session.
pub fn fetch_unavailable_states<T: Transport + ?Sized>(
    transport: &T,
    config: &CheckerConfig,
) -> Availability {
    match vies::check_status(transport, config) {
        Ok(down) => {
            if !down.is_empty() {
                tracing::warn!(states = ?down, "VIES member state services unavailable");
            }
            Availability::Partial(down)
        }
        Err(e) => {
            tracing::warn!(error = %e, "VIES status check failed, treating the gateway as down");
            Availability::GatewayDown(e.to_string())
        }
    }
}
