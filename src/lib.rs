//! # vat-checker
//!
//! European VAT number validation and company lookup: format checks for
//! every supported prefix, the EU VIES gateway for member states, and the
//! national registries of the UK (HMRC), Norway (Brønnøysund) and
//! Switzerland (UID register).
//!
//! Every lookup ends in one [`LookupResult`], whatever went wrong on the way.
//!
//! ## Quick Start
//!
//! ```rust
//! use vat_checker::*;
//!
//! let transport = RecordingTransport::new()
//!     .route("/check-status", HttpReply::new(200, r#"{"vow":{"available":true},"countries":[]}"#))
//!     .route(
//!         "/check-vat-number",
//!         HttpReply::new(
//!             200,
//!             r#"{"valid":true,"name":"Example GmbH","address":"Hauptstrasse 1\n1010 Wien"}"#,
//!         ),
//!     );
//!
//! let checker = VatChecker::with_transport(CheckerConfig::default(), transport);
//! let result = checker.do_lookup("ATU12345678");
//!
//! assert!(result.is_valid && result.vat_enabled);
//! assert_eq!(result.street.as_deref(), Some("Hauptstrasse 1"));
//! assert_eq!(result.city.as_deref(), Some("Wien"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `http` (default) | Blocking `reqwest` transport, [`VatChecker::new`] |
//! | `cli` | The `vat-check` binary |

pub mod core;
pub mod registry;
pub mod vat;

// Re-export the everyday API at crate root for convenience
pub use crate::core::*;
#[cfg(feature = "http")]
pub use crate::registry::ReqwestTransport;
pub use crate::registry::{HttpReply, HttpRequest, RecordingTransport, Transport};
pub use crate::vat::{Availability, VatChecker, parse_address, validate, validate_vat_format};
