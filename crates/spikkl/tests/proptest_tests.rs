//! Property-based tests for the input validator
//!
//! These tests use proptest to verify normalization invariants across many
//! random inputs.

use proptest::prelude::*;

use spikkl::Validator;

#[allow(clippy::unwrap_used)]
fn validator() -> Validator {
    Validator::new("nld").unwrap()
}

/// Two postal code letters, excluding the reserved sa/sd/ss pairs
fn postal_letters() -> impl Strategy<Value = String> {
    "[a-z]{2}".prop_filter("reserved letter pair", |s| {
        !matches!(s.as_str(), "sa" | "sd" | "ss")
    })
}

mod postal_code_tests {
    use super::*;

    proptest! {
        #[test]
        fn valid_postal_codes_normalize_to_canonical_form(
            digits in 1000u16..=9999,
            letters in postal_letters(),
            prefix in prop_oneof![
                Just(""),
                Just("nl"),
                Just("nl-"),
                Just("nld"),
                Just("nld-"),
                Just("NL-"),
                Just("NLD-")
            ],
            spacing in prop_oneof![Just(""), Just(" "), Just("   ")],
            uppercase in any::<bool>()
        ) {
            let letters = if uppercase { letters.to_uppercase() } else { letters };
            let raw = format!("{prefix}{digits}{spacing}{letters}");

            let normalized = validator().validate_and_normalize_postal_code(&raw);
            prop_assert!(normalized.is_ok(), "input: {raw}");

            let expected = format!("{digits}{}", letters.to_uppercase());
            prop_assert_eq!(normalized.unwrap(), expected);
        }

        #[test]
        fn normalization_is_idempotent(
            digits in 1000u16..=9999,
            letters in postal_letters()
        ) {
            let validator = validator();
            let raw = format!("{digits}{letters}");

            let once = validator.validate_and_normalize_postal_code(&raw).unwrap();
            let twice = validator.validate_and_normalize_postal_code(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn reserved_letter_pairs_always_rejected(
            digits in 1000u16..=9999,
            reserved in prop_oneof![Just("sa"), Just("sd"), Just("ss")]
        ) {
            let raw = format!("{digits}{reserved}");
            prop_assert!(validator().validate_and_normalize_postal_code(&raw).is_err());
        }
    }
}

mod street_number_tests {
    use super::*;

    proptest! {
        #[test]
        fn bare_street_numbers_split_into_number_and_empty_suffix(
            number in 1u32..=99999
        ) {
            let (normalized, suffix) = validator()
                .validate_and_normalize_street_number(&number.to_string(), None)
                .unwrap();
            prop_assert_eq!(normalized, number.to_string());
            prop_assert_eq!(suffix, "");
        }

        #[test]
        fn embedded_suffix_always_overrides_argument(
            number in 1u32..=99999,
            embedded in "[a-z]",
            argument in "[a-z]"
        ) {
            let raw = format!("{number}{embedded}");
            let (normalized, suffix) = validator()
                .validate_and_normalize_street_number(&raw, Some(&argument))
                .unwrap();
            prop_assert_eq!(normalized, number.to_string());
            prop_assert_eq!(suffix, embedded);
        }
    }
}

mod coordinate_tests {
    use super::*;

    proptest! {
        #[test]
        fn in_range_coordinates_format_to_nine_decimals(
            longitude in -180.0f64..=180.0f64,
            latitude in -90.0f64..=90.0f64
        ) {
            let (lon, lat) = validator()
                .validate_and_normalize_coordinate(longitude, latitude)
                .unwrap();

            for formatted in [&lon, &lat] {
                let (_, decimals) = formatted.split_once('.').unwrap();
                prop_assert_eq!(decimals.len(), 9, "formatted: {}", formatted);
            }
        }

        #[test]
        fn out_of_range_longitude_rejected(
            longitude in prop_oneof![
                (-10_000.0f64..-180.1f64),
                (180.1f64..10_000.0f64)
            ],
            latitude in -90.0f64..=90.0f64
        ) {
            prop_assert!(
                validator()
                    .validate_and_normalize_coordinate(longitude, latitude)
                    .is_err()
            );
        }

        #[test]
        fn out_of_range_latitude_rejected(
            longitude in -180.0f64..=180.0f64,
            latitude in prop_oneof![
                (-10_000.0f64..-90.1f64),
                (90.1f64..10_000.0f64)
            ]
        ) {
            prop_assert!(
                validator()
                    .validate_and_normalize_coordinate(longitude, latitude)
                    .is_err()
            );
        }
    }
}
