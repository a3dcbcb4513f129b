//! Supported VAT countries and the registry that answers for each.
//!
//! EU member states (and Northern Ireland, `XI`) are routed through the VIES
//! gateway. Non-EU countries either have a dedicated national registry or are
//! format-checked only.

use serde::Serialize;

/// The upstream service that answers lookups for a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum Registry {
    /// EU VAT Information Exchange System gateway.
    Vies,
    /// UK HM Revenue & Customs VAT number check.
    Hmrc,
    /// Norwegian Brønnøysund Register Centre (Enhetsregisteret).
    Brreg,
    /// Swiss federal UID register (SOAP).
    SwissUid,
}

/// One row of the country table.
#[derive(Debug, Clone, Copy)]
pub struct Country {
    /// VAT prefix, which is also the ISO code except for Greece (`EL`).
    pub code: &'static str,
    pub name: &'static str,
    /// `None` when no registry can be queried for the country.
    pub registry: Option<Registry>,
    /// Shape of the number body after the prefix, without anchors.
    pub vat_pattern: &'static str,
}

impl Country {
    /// Whether lookups go through the shared EU gateway.
    pub fn is_eu(&self) -> bool {
        self.registry == Some(Registry::Vies)
    }
}

const fn row(
    code: &'static str,
    name: &'static str,
    registry: Option<Registry>,
    vat_pattern: &'static str,
) -> Country {
    Country {
        code,
        name,
        registry,
        vat_pattern,
    }
}

use Registry::*;

/// Sorted by code for binary search.
static COUNTRIES: &[Country] = &[
    row("AT", "Austria", Some(Vies), r"U\d{8}"),
    row("BE", "Belgium", Some(Vies), r"[01]\d{9}"),
    row("BG", "Bulgaria", Some(Vies), r"\d{9,10}"),
    row("CH", "Switzerland", Some(SwissUid), r"E\d{9}(?:MWST|TVA|IVA)?"),
    row("CY", "Cyprus", Some(Vies), r"\d{8}[A-Z]"),
    row("CZ", "Czech Republic", Some(Vies), r"\d{8,10}"),
    row("DE", "Germany", Some(Vies), r"[1-9]\d{8}"),
    row("DK", "Denmark", Some(Vies), r"\d{8}"),
    row("EE", "Estonia", Some(Vies), r"\d{9}"),
    row("EL", "Greece", Some(Vies), r"\d{9}"),
    row("ES", "Spain", Some(Vies), r"[0-9A-Z]\d{7}[0-9A-Z]"),
    row("FI", "Finland", Some(Vies), r"\d{8}"),
    row("FR", "France", Some(Vies), r"[0-9A-HJ-NP-Z]{2}\d{9}"),
    row("GB", "United Kingdom", Some(Hmrc), r"\d{9}(?:\d{3})?"),
    row("HR", "Croatia", Some(Vies), r"\d{11}"),
    row("HU", "Hungary", Some(Vies), r"\d{8}"),
    row("IE", "Ireland", Some(Vies), r"\d{7}[A-W][A-I]?|\d[A-Z]\d{5}[A-W]"),
    row("IT", "Italy", Some(Vies), r"\d{11}"),
    row("LI", "Liechtenstein", None, r"\d{5}"),
    row("LT", "Lithuania", Some(Vies), r"\d{9}(?:\d{3})?"),
    row("LU", "Luxembourg", Some(Vies), r"\d{8}"),
    row("LV", "Latvia", Some(Vies), r"\d{11}"),
    row("MT", "Malta", Some(Vies), r"\d{8}"),
    row("NL", "Netherlands", Some(Vies), r"\d{9}B\d{2}"),
    row("NO", "Norway", Some(Brreg), r"\d{9}(?:MVA)?"),
    row("PL", "Poland", Some(Vies), r"\d{10}"),
    row("PT", "Portugal", Some(Vies), r"\d{9}"),
    row("RO", "Romania", Some(Vies), r"\d{2,10}"),
    row("RS", "Serbia", None, r"\d{9}"),
    row("SE", "Sweden", Some(Vies), r"\d{12}"),
    row("SI", "Slovenia", Some(Vies), r"\d{8}"),
    row("SK", "Slovakia", Some(Vies), r"\d{10}"),
    row("SM", "San Marino", None, r"\d{5}"),
    row("XI", "Northern Ireland - United Kingdom", Some(Vies), r"\d{9}"),
];

/// Look up a supported country by its VAT prefix (case-insensitive).
pub fn country(code: &str) -> Option<&'static Country> {
    let code = code.to_ascii_uppercase();
    COUNTRIES
        .binary_search_by(|c| c.code.cmp(code.as_str()))
        .ok()
        .map(|i| &COUNTRIES[i])
}

/// Display name for a country or VAT prefix, if it is in the table.
pub fn country_name(code: &str) -> Option<&'static str> {
    country(code).map(|c| c.name)
}

/// Every supported country, sorted by code.
pub fn countries() -> &'static [Country] {
    COUNTRIES
}
