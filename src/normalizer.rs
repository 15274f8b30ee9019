//! Canonicalization of raw phone numbers.
//!
//! Wraps the `phonenumber` crate behind a single statically-typed interface
//! constructed once at startup. Validity follows libphonenumber's numbering
//! plans; a supplied country hint constrains the number to that country.

use std::str::FromStr;

use phonenumber::{country, Mode};

use crate::country::{alpha2_to_alpha3, alpha3_to_alpha2};

/// Canonical output for a recognized number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPhone {
    /// E.164 representation, e.g. `+12125550123`. This is the stored value.
    pub formatted: String,
    /// ISO 3166-1 alpha-3 code, e.g. `USA`.
    pub country_iso3: String,
    /// Country calling code with leading plus, e.g. `+1`.
    pub dial_code: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneNormalizer;

impl PhoneNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parses and validates `raw`, returning its canonical form.
    ///
    /// `country_hint` is an alpha-2 or alpha-3 code, case-insensitive; an
    /// empty hint means auto-detect, which requires the number to carry an
    /// international `+CC` prefix. Returns `None` for anything that does
    /// not validate, including an unknown hint or a number that belongs to
    /// a different country than the hinted one.
    pub fn normalize(&self, raw: &str, country_hint: &str) -> Option<NormalizedPhone> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let hint = match country_hint.trim() {
            "" => None,
            h => Some(region_id(h)?),
        };

        let parsed = phonenumber::parse(hint, raw).ok()?;
        if !phonenumber::is_valid(&parsed) {
            return None;
        }

        let region = parsed.country().id()?;
        if let Some(hinted) = hint {
            if hinted != region {
                return None;
            }
        }

        let country_iso3 = alpha2_to_alpha3(region.as_ref())?.to_string();
        Some(NormalizedPhone {
            formatted: parsed.format().mode(Mode::E164).to_string(),
            country_iso3,
            dial_code: format!("+{}", parsed.country().code()),
        })
    }
}

/// Resolves an alpha-2 or alpha-3 hint to the library's region identifier.
fn region_id(hint: &str) -> Option<country::Id> {
    let upper = hint.to_ascii_uppercase();
    let alpha2 = match upper.len() {
        2 => upper,
        3 => alpha3_to_alpha2(&upper)?.to_string(),
        _ => return None,
    };
    country::Id::from_str(&alpha2).ok()
}
