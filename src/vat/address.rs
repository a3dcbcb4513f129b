//! Per-country decomposition of registry address text.
//!
//! VIES returns the address of a trader as one free-text blob whose layout
//! differs for every member state. Each country with a known layout gets a
//! regex with the named groups `street`, `postal_code` and `city`.
//! A miss is never an error: the fields just stay empty.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// How a country's registry address text is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressLayout {
    /// A regex with named groups `street`, `postal_code`, `city`.
    Pattern(&'static str),
    /// No regex; the raw text is kept as is.
    Unparsed,
    /// The registry does not release company name or address.
    Withheld,
}

// Street may span several lines; the last line is "<postal code> <city>".
const STREET_THEN_CODE_CITY: &str =
    r"^(?P<street>(?s:.*))\n(?P<postal_code>\S+)[ \t]+(?P<city>.+)$";

static ADDRESS_LAYOUTS: &[(&str, AddressLayout)] = &[
    ("AT", AddressLayout::Pattern(STREET_THEN_CODE_CITY)),
    ("BE", AddressLayout::Pattern(STREET_THEN_CODE_CITY)),
    (
        "BG",
        AddressLayout::Pattern(r"^(?P<street>.*),\s(?P<city>[^,]*)\s(?P<postal_code>\d+)$"),
    ),
    ("CY", AddressLayout::Pattern(STREET_THEN_CODE_CITY)),
    ("CZ", AddressLayout::Unparsed),
    ("DE", AddressLayout::Withheld),
    ("DK", AddressLayout::Pattern(STREET_THEN_CODE_CITY)),
    (
        "EE",
        AddressLayout::Pattern(r"^(?P<street>.*?)\s{3}(?P<postal_code>\d{5})\s+(?P<city>.+)$"),
    ),
    (
        "EL",
        AddressLayout::Pattern(r"^(?P<street>.*?)\s{3,}(?P<postal_code>\d{5})\s-\s(?P<city>.+)$"),
    ),
    ("ES", AddressLayout::Withheld),
    ("FI", AddressLayout::Pattern(STREET_THEN_CODE_CITY)),
    (
        "FR",
        AddressLayout::Pattern(r"^(?P<street>(?s:.*))\n(?P<postal_code>\d{5})[ \t]+(?P<city>.+)$"),
    ),
    (
        "HR",
        AddressLayout::Pattern(r"^(?P<street>.*),\s+(?P<city>[^,]*),\s+(?P<postal_code>.+)$"),
    ),
    (
        "HU",
        AddressLayout::Pattern(r"^(?P<street>.*)\s+(?P<postal_code>\d{4})\s+(?P<city>.+)$"),
    ),
    ("IE", AddressLayout::Unparsed),
    (
        "IT",
        AddressLayout::Pattern(
            r"^(?P<street>(?s:.*))\n(?P<postal_code>\d{5})[ \t]+(?P<city>.+?)[ \t]+[A-Z]{2}$",
        ),
    ),
    (
        "LT",
        AddressLayout::Pattern(
            r"^(?P<street>.*),\s+(?P<city>[^,]*),\s+(?:(?P<postal_code>LT-?\d{5})|.*)$",
        ),
    ),
    ("LU", AddressLayout::Pattern(STREET_THEN_CODE_CITY)),
    (
        "LV",
        AddressLayout::Pattern(r"^(?P<street>.*),\s+(?P<city>[^,]*),\s+(?P<postal_code>\S+)$"),
    ),
    ("MT", AddressLayout::Unparsed),
    (
        "NL",
        AddressLayout::Pattern(
            r"^(?P<street>(?s:.*))\n(?P<postal_code>\d{4}[ \t]?[A-Z]{2})[ \t]+(?P<city>.+)$",
        ),
    ),
    ("PL", AddressLayout::Unparsed),
    // An optional municipality line sits between street and postal code.
    (
        "PT",
        AddressLayout::Pattern(
            r"^(?P<street>.*)\n(?:.*\n)?(?P<postal_code>\d{4}-\d{3})[ \t]+(?P<city>.+)$",
        ),
    ),
    ("RO", AddressLayout::Withheld),
    (
        "SE",
        AddressLayout::Pattern(
            r"^(?P<street>(?s:.*))\n(?P<postal_code>\d{3}[ \t]?\d{2})[ \t]+(?P<city>.+)$",
        ),
    ),
    (
        "SI",
        AddressLayout::Pattern(r"^(?P<street>.*),\s+(?P<postal_code>\d{4})\s+(?P<city>.+)$"),
    ),
    (
        "SK",
        AddressLayout::Pattern(
            r"^(?P<street>.*)\n(?P<postal_code>\d{3}[ \t]?\d{2})[ \t]+(?P<city>.+)(?:\n.*)?$",
        ),
    ),
    ("XI", AddressLayout::Unparsed),
];

static COMPILED: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    ADDRESS_LAYOUTS
        .iter()
        .filter_map(|(cc, layout)| match layout {
            AddressLayout::Pattern(p) => Some((*cc, p)),
            _ => None,
        })
        .map(|(cc, p)| {
            let re = Regex::new(p).unwrap_or_else(|e| panic!("bad address pattern for {cc}: {e}"));
            (cc, re)
        })
        .collect()
});

/// Street, postal code and city extracted from an address text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

impl ParsedAddress {
    pub fn is_empty(&self) -> bool {
        self.street.is_none() && self.postal_code.is_none() && self.city.is_none()
    }
}

/// Address handling for `country_code`. Countries without an entry
/// (GB, CH, NO, ...) are [`AddressLayout::Unparsed`].
pub fn address_layout(country_code: &str) -> AddressLayout {
    let cc = country_code.to_ascii_uppercase();
    ADDRESS_LAYOUTS
        .iter()
        .find(|(code, _)| *code == cc)
        .map(|(_, layout)| *layout)
        .unwrap_or(AddressLayout::Unparsed)
}

/// Split `text` into street, postal code and city using the country's layout.
///
/// Surrounding whitespace is ignored. Groups that did not participate in the
/// match, or matched only whitespace, come back as `None`.
pub fn parse_address(text: &str, country_code: &str) -> ParsedAddress {
    let cc = country_code.to_ascii_uppercase();
    let Some(re) = COMPILED.get(cc.as_str()) else {
        return ParsedAddress::default();
    };
    let Some(caps) = re.captures(text.trim()) else {
        tracing::debug!(country = %cc, "address text did not match the country layout");
        return ParsedAddress::default();
    };

    let group = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    ParsedAddress {
        street: group("street"),
        postal_code: group("postal_code"),
        city: group("city"),
    }
}
