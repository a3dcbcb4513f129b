//! Core types: the country table, lookup results, errors and configuration.

mod config;
pub mod countries;
mod error;
mod result;

pub use config::*;
pub use countries::{Country, Registry, country, country_name};
pub use error::*;
pub use result::*;
