//! VAT number validation and company lookup.
//!
//! Validates VAT IDs by format, checks them against VIES or the national
//! registry, and decomposes the returned address.
//!
//! # Example
//!
//! ```ignore
//! use vat_checker::vat::*;
//!
//! // Format-only validation (no network)
//! assert!(validate("DE123456789"));
//!
//! // Full lookup (blocking, requires network)
//! let checker = VatChecker::new(CheckerConfig::from_env()?)?;
//! let result = checker.do_lookup("ATU12345678");
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! ```

mod address;
mod checker;
mod format;
mod normalize;
mod status;

pub use address::{AddressLayout, ParsedAddress, address_layout, parse_address};
pub use checker::VatChecker;
pub use format::{clean_vat_input, registry_number, validate, validate_vat_format};
pub use normalize::normalize;
pub use status::{Availability, fetch_unavailable_states};
