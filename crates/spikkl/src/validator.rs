//! Country-specific input validation and normalization
//!
//! The Spikkl API expects postal codes, street numbers, and coordinates in a
//! canonical form. [`Validator`] applies the per-country rules before any
//! request is built: postal codes are uppercased and stripped of country
//! prefixes and whitespace, street numbers are split into number and suffix,
//! and coordinates are range-checked and fixed to 9 decimal places.
//!
//! Rule sets are compiled once per process and keyed by lowercase ISO3
//! country code. Only the Netherlands (`nld`) is currently supported.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Errors produced while validating caller input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The country is not in the supported rule set
    #[error("Unsupported country iso3 code provided: {country}.")]
    UnsupportedCountry {
        /// The rejected country code, uppercased
        country: String,
    },

    /// Postal code does not match the country's pattern
    #[error("Invalid postal code provided [{postal_code}] for country [{country}].")]
    InvalidPostalCode {
        /// The rejected input, verbatim
        postal_code: String,
        /// Lowercase ISO3 country code
        country: String,
    },

    /// Street number does not match the country's pattern
    #[error("Invalid street number provided [{street_number}] for country [{country}].")]
    InvalidStreetNumber {
        /// The rejected input, verbatim
        street_number: String,
        /// Lowercase ISO3 country code
        country: String,
    },

    /// Street number suffix does not match the country's pattern
    #[error("Invalid street number suffix provided [{suffix}] for country [{country}].")]
    InvalidStreetNumberSuffix {
        /// The rejected input, verbatim
        suffix: String,
        /// Lowercase ISO3 country code
        country: String,
    },

    /// Longitude outside [-180, 180] or not finite
    #[error("Invalid longitude provided [{longitude}].")]
    InvalidLongitude {
        /// The rejected value
        longitude: f64,
    },

    /// Latitude outside [-90, 90] or not finite
    #[error("Invalid latitude provided [{latitude}].")]
    InvalidLatitude {
        /// The rejected value
        latitude: f64,
    },
}

/// Compiled validation rules for a single country
#[derive(Debug)]
struct CountryRules {
    /// Full-match postal code pattern (prefix, digits, letters)
    postal_code: Regex,
    /// Letter pairs rejected even when the postal pattern matches
    excluded_postal_suffixes: &'static [&'static str],
    /// Full-match street number pattern
    street_number: Regex,
    /// Capturing variant splitting a street number into number and suffix
    street_number_parts: Regex,
    /// Full-match street number suffix pattern
    street_number_suffix: Regex,
}

/// Rule sets keyed by lowercase ISO3 country code, built once per process
static COUNTRY_RULES: LazyLock<HashMap<&'static str, CountryRules>> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Infallible with valid static patterns
    let compile = |pattern: &str| Regex::new(pattern).expect("Failed to compile validation rule");

    let mut rules = HashMap::new();
    rules.insert(
        "nld",
        CountryRules {
            postal_code: compile(r"(?i)^(?:(?:nld|nl)-?)?[1-9][0-9]{3}\s*([a-z]{2})$"),
            excluded_postal_suffixes: &["sa", "sd", "ss"],
            street_number: compile(r"^([1-9][0-9]{0,4})\s?(?:[a-z])?\s?(?:[a-z0-9]{1,4})?$"),
            street_number_parts: compile(
                r"(?i)^(?P<number>[1-9][0-9]{0,4})\s*(?P<suffix>(?:[a-z])?(?:[a-z0-9]{1,4})?)$",
            ),
            street_number_suffix: compile(r"(?i)^(?:[a-z])?\s?(?:[a-z0-9]{1,4})?$"),
        },
    );
    rules
});

/// Leading 1-3 letter country code with optional hyphen, e.g. `NLD-` or `NL`
static POSTAL_COUNTRY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Infallible with a valid static pattern
    Regex::new(r"(?i)^[a-z]{1,3}-?").expect("Failed to compile prefix pattern")
});

/// Validates and normalizes address input for a single country
///
/// Construction fails for unsupported countries, so every validation method
/// can assume its rule set exists.
///
/// # Examples
///
/// ```
/// use spikkl::{ValidationError, Validator};
///
/// let validator = Validator::new("NLD")?;
/// assert_eq!(validator.country_iso3_code(), "nld");
///
/// let postal = validator.validate_and_normalize_postal_code("nl-2611 kl")?;
/// assert_eq!(postal, "2611KL");
/// # Ok::<(), ValidationError>(())
/// ```
#[derive(Debug)]
pub struct Validator {
    country: String,
    rules: &'static CountryRules,
}

impl Validator {
    /// Create a validator for the given ISO3 country code
    ///
    /// The code is matched case-insensitively and stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedCountry`] if no rule set exists
    /// for the country.
    pub fn new(country_iso3_code: &str) -> Result<Self, ValidationError> {
        let country = country_iso3_code.to_lowercase();

        let Some(rules) = COUNTRY_RULES.get(country.as_str()) else {
            return Err(ValidationError::UnsupportedCountry {
                country: country_iso3_code.to_uppercase(),
            });
        };

        Ok(Self { country, rules })
    }

    /// The lowercase ISO3 country code this validator applies
    #[must_use]
    pub fn country_iso3_code(&self) -> &str {
        &self.country
    }

    /// Validate a postal code and return its canonical form
    ///
    /// Canonical form is uppercase with the country prefix and all
    /// whitespace removed, e.g. `nl-2611 kl` becomes `2611KL`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPostalCode`] if the input does not
    /// match the country's pattern.
    pub fn validate_and_normalize_postal_code(
        &self,
        postal_code: &str,
    ) -> Result<String, ValidationError> {
        let rules = self.rules;

        let invalid = || ValidationError::InvalidPostalCode {
            postal_code: postal_code.to_string(),
            country: self.country.clone(),
        };

        let captures = rules.postal_code.captures(postal_code).ok_or_else(invalid)?;

        // Letter combinations reserved by the postal service are rejected
        // even though they fit the general pattern.
        let letters = captures.get(1).map_or(String::new(), |m| m.as_str().to_lowercase());
        if rules.excluded_postal_suffixes.contains(&letters.as_str()) {
            return Err(invalid());
        }

        let normalized = postal_code.to_uppercase();
        let normalized = POSTAL_COUNTRY_PREFIX.replace(&normalized, "");

        Ok(normalized.chars().filter(|c| !c.is_whitespace()).collect())
    }

    /// Validate a street number and split it into number and suffix
    ///
    /// A suffix embedded in the street number itself (`"1a1b2c"` carries
    /// `a1b2c`) takes precedence over the caller-supplied suffix argument.
    /// Both returned values are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidStreetNumber`] if the input does
    /// not match the country's pattern.
    pub fn validate_and_normalize_street_number(
        &self,
        street_number: &str,
        street_number_suffix: Option<&str>,
    ) -> Result<(String, String), ValidationError> {
        let rules = self.rules;

        if !rules.street_number.is_match(street_number) {
            return Err(ValidationError::InvalidStreetNumber {
                street_number: street_number.to_string(),
                country: self.country.clone(),
            });
        }

        let fallback_suffix = street_number_suffix.unwrap_or_default();

        // The capturing pattern cannot fail once validation passed; return
        // the inputs untouched if it somehow does.
        let Some(captures) = rules.street_number_parts.captures(street_number) else {
            return Ok((
                street_number.trim().to_string(),
                fallback_suffix.trim().to_string(),
            ));
        };

        let number = captures.name("number").map_or("", |m| m.as_str());
        let embedded = captures.name("suffix").map_or("", |m| m.as_str());
        let suffix = if embedded.is_empty() { fallback_suffix } else { embedded };

        Ok((number.trim().to_string(), suffix.trim().to_string()))
    }

    /// Validate a street number suffix and return it trimmed
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidStreetNumberSuffix`] if the input
    /// does not match the country's pattern.
    pub fn validate_and_normalize_street_number_suffix(
        &self,
        street_number_suffix: &str,
    ) -> Result<String, ValidationError> {
        let rules = self.rules;

        if !rules.street_number_suffix.is_match(street_number_suffix) {
            return Err(ValidationError::InvalidStreetNumberSuffix {
                suffix: street_number_suffix.to_string(),
                country: self.country.clone(),
            });
        }

        Ok(street_number_suffix.trim().to_string())
    }

    /// Validate a coordinate pair and format both values to 9 decimal places
    ///
    /// Longitude must lie in [-180, 180] and latitude in [-90, 90].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLongitude`] or
    /// [`ValidationError::InvalidLatitude`] for out-of-range or non-finite
    /// values.
    pub fn validate_and_normalize_coordinate(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> Result<(String, String), ValidationError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::InvalidLongitude { longitude });
        }

        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::InvalidLatitude { latitude });
        }

        Ok((format!("{longitude:.9}"), format!("{latitude:.9}")))
    }
}
