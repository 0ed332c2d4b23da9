use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use tax_address::limits::ScopedLimitsTable;
use tax_address::{
    AddressNormalizer, ConfigurationError, CountryInfo, CountryResolver, FieldLimits,
    FieldLimitsProvider, RawAddressInput, Region, Scope, ZipCodeFixer,
};

struct FakeCountries {
    countries: HashMap<String, CountryInfo>,
    lookups: Mutex<Vec<String>>,
}

impl FakeCountries {
    fn new(countries: Vec<CountryInfo>) -> Self {
        let countries = countries
            .into_iter()
            .filter_map(|country| country.iso2_code.clone().map(|code| (code, country)))
            .collect();
        Self {
            countries,
            lookups: Mutex::new(Vec::new()),
        }
    }

    fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("lookup mutex").clone()
    }
}

impl CountryResolver for FakeCountries {
    fn resolve(&self, country_code: &str) -> CountryInfo {
        self.lookups
            .lock()
            .expect("lookup mutex")
            .push(country_code.to_string());
        self.countries
            .get(country_code)
            .cloned()
            .unwrap_or_else(CountryInfo::unknown)
    }
}

struct UnconfiguredLimits;

impl FieldLimitsProvider for UnconfiguredLimits {
    fn limits_for(&self, scope: &Scope) -> Result<FieldLimits, ConfigurationError> {
        Err(ConfigurationError::MissingScope {
            scope: scope.clone(),
        })
    }
}

fn reference_limits() -> FieldLimits {
    FieldLimits {
        street: 50,
        city: 50,
        main_division: 2,
        postal_code: 10,
        country: 3,
    }
}

fn united_states() -> CountryInfo {
    CountryInfo::new("US", "USA")
        .with_region(Region::new("12", "IA"))
        .with_region(Region::new("13", "IL"))
        .with_region(Region::new("14", "IN"))
}

fn limits_table(limits: FieldLimits) -> Arc<ScopedLimitsTable> {
    Arc::new(ScopedLimitsTable::new().with_scope(Scope::store("main"), limits))
}

fn reference_input() -> RawAddressInput {
    let mut input = RawAddressInput::new();
    input
        .set_street(["123 Main St", ""])
        .set_city("Springfield")
        .set_country_code("US")
        .set_region_id("13")
        .set_postal_code("62704")
        .set_scope_code(Some("main".to_string()));
    input
}

fn truncated(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

#[test]
fn normalizes_reference_address() {
    let countries = Arc::new(FakeCountries::new(vec![united_states()]));
    let normalizer = AddressNormalizer::new(
        countries.clone(),
        limits_table(reference_limits()),
        Arc::new(ZipCodeFixer),
    );

    let address = normalizer
        .normalize(&reference_input())
        .expect("address normalizes");

    let json = serde_json::to_value(&address).expect("serializes");
    assert_eq!(
        json,
        serde_json::json!({
            "street_address": ["123 Main St"],
            "city": "Springfield",
            "main_division": "IL",
            "postal_code": "62704",
            "country": "USA",
        })
    );
    assert_eq!(countries.lookups(), vec!["US".to_string()]);
}

#[test]
fn postal_code_is_fixed_before_truncation() {
    let expand = |raw: &str| {
        if raw.len() == 9 {
            format!("{}-{}", &raw[..5], &raw[5..])
        } else {
            raw.to_string()
        }
    };
    let normalizer = AddressNormalizer::new(
        Arc::new(FakeCountries::new(vec![united_states()])),
        limits_table(FieldLimits {
            postal_code: 5,
            ..reference_limits()
        }),
        Arc::new(expand),
    );

    let mut input = reference_input();
    input.set_postal_code("123456789");
    let address = normalizer.normalize(&input).expect("address normalizes");
    assert_eq!(address.postal_code(), Some("12345"));

    let normalizer = AddressNormalizer::new(
        Arc::new(FakeCountries::new(vec![united_states()])),
        limits_table(reference_limits()),
        Arc::new(expand),
    );
    let address = normalizer.normalize(&input).expect("address normalizes");
    assert_eq!(address.postal_code(), Some("12345-6789"));
}

#[test]
fn unknown_country_yields_partial_address_without_error() {
    let normalizer = AddressNormalizer::new(
        Arc::new(FakeCountries::new(vec![united_states()])),
        limits_table(reference_limits()),
        Arc::new(ZipCodeFixer),
    );

    let mut input = reference_input();
    input.set_country_code("ZZ");
    let address = normalizer.normalize(&input).expect("address normalizes");

    assert_eq!(address.country(), None);
    assert_eq!(address.main_division(), None);
    assert_eq!(address.city(), Some("Springfield"));
    assert_eq!(address.street_address(), ["123 Main St".to_string()]);
}

#[test]
fn unmatched_region_id_is_omitted() {
    let normalizer = AddressNormalizer::new(
        Arc::new(FakeCountries::new(vec![united_states()])),
        limits_table(reference_limits()),
        Arc::new(ZipCodeFixer),
    );

    let mut input = reference_input();
    input.set_region_id(999u32);
    let address = normalizer.normalize(&input).expect("address normalizes");
    assert_eq!(address.main_division(), None);
    assert_eq!(address.country(), Some("USA"));
}

#[test]
fn duplicate_region_ids_resolve_to_first_in_directory_order() {
    let country = CountryInfo::new("US", "USA")
        .with_region(Region::new(13u32, "IL"))
        .with_region(Region::new("13", "XX"));
    let normalizer = AddressNormalizer::new(
        Arc::new(FakeCountries::new(vec![country])),
        limits_table(reference_limits()),
        Arc::new(ZipCodeFixer),
    );

    let address = normalizer
        .normalize(&reference_input())
        .expect("address normalizes");
    assert_eq!(address.main_division(), Some("IL"));
}

#[test]
fn missing_scope_configuration_fails_the_build() {
    let normalizer = AddressNormalizer::new(
        Arc::new(FakeCountries::new(vec![united_states()])),
        Arc::new(UnconfiguredLimits),
        Arc::new(ZipCodeFixer),
    );

    match normalizer.normalize(&reference_input()) {
        Err(ConfigurationError::MissingScope { scope }) => {
            assert_eq!(scope, Scope::store("main"));
        }
        other => panic!("expected missing scope error, got {other:?}"),
    }
}

#[test]
fn unregistered_scope_in_table_fails_the_build() {
    let normalizer = AddressNormalizer::new(
        Arc::new(FakeCountries::new(vec![united_states()])),
        limits_table(reference_limits()),
        Arc::new(ZipCodeFixer),
    );

    let mut input = reference_input();
    input.set_scope_code(Some("outlet".to_string()));
    assert!(normalizer.normalize(&input).is_err());
}

#[test]
fn empty_input_produces_empty_address() {
    let normalizer = AddressNormalizer::new(
        Arc::new(FakeCountries::new(vec![united_states()])),
        limits_table(reference_limits()),
        Arc::new(ZipCodeFixer),
    );

    let mut input = RawAddressInput::new();
    input.set_scope_code(Some("main".to_string()));
    let address = normalizer.normalize(&input).expect("address normalizes");

    assert_eq!(
        serde_json::to_value(&address).expect("serializes"),
        serde_json::json!({})
    );
}

#[test]
fn normalizer_works_with_trait_objects() {
    let countries: Arc<dyn CountryResolver> = Arc::new(FakeCountries::new(vec![united_states()]));
    let limits: Arc<dyn FieldLimitsProvider> = limits_table(reference_limits());
    let normalizer = AddressNormalizer::new(countries, limits, Arc::new(ZipCodeFixer));

    let address = normalizer
        .builder()
        .street_line("500 Elm")
        .country_code("US")
        .region("Iowa")
        .scope_code("main")
        .build()
        .expect("address builds");
    assert_eq!(address.main_division(), Some("Io"));
}

fn region_text() -> impl Strategy<Value = String> {
    " {0,3}[A-Za-z][A-Za-z ]{0,30}"
}

proptest! {
    #[test]
    fn street_lines_respect_limit_and_are_never_empty(
        lines in prop::collection::vec("\\PC{0,80}", 0..6),
        limit in 0usize..60,
    ) {
        let normalizer = AddressNormalizer::new(
            Arc::new(FakeCountries::new(vec![united_states()])),
            limits_table(FieldLimits { street: limit, ..reference_limits() }),
            Arc::new(ZipCodeFixer),
        );
        let mut input = reference_input();
        input.set_street(lines);

        let address = normalizer.normalize(&input).expect("address normalizes");
        for line in address.street_address() {
            prop_assert!(line.chars().count() <= limit);
            prop_assert!(!line.trim().is_empty());
        }
    }

    #[test]
    fn free_text_region_overrides_region_id(
        region in region_text(),
        region_id in 0u32..50,
        limit in 1usize..10,
    ) {
        let normalizer = AddressNormalizer::new(
            Arc::new(FakeCountries::new(vec![united_states()])),
            limits_table(FieldLimits { main_division: limit, ..reference_limits() }),
            Arc::new(ZipCodeFixer),
        );
        let mut input = reference_input();
        input.set_region(region.clone()).set_region_id(region_id);

        let address = normalizer.normalize(&input).expect("address normalizes");
        let expected = truncated(region.trim(), limit);
        prop_assert_eq!(address.main_division(), Some(expected.as_str()));
    }

    #[test]
    fn independently_built_inputs_normalize_identically(
        street in prop::collection::vec("[a-zA-Z0-9 ]{0,70}", 0..4),
        city in "[a-zA-Z ]{0,70}",
        postal in "[0-9]{0,10}",
        region_id in 10u32..16,
    ) {
        let normalizer = AddressNormalizer::new(
            Arc::new(FakeCountries::new(vec![united_states()])),
            limits_table(reference_limits()),
            Arc::new(ZipCodeFixer),
        );
        let build_input = || {
            let mut input = RawAddressInput::new();
            input
                .set_street(street.clone())
                .set_city(city.clone())
                .set_country_code("US")
                .set_region_id(region_id)
                .set_postal_code(postal.clone())
                .set_scope_code(Some("main".to_string()));
            input
        };

        let first = normalizer.normalize(&build_input()).expect("first build");
        let second = normalizer.normalize(&build_input()).expect("second build");
        prop_assert_eq!(first, second);
    }
}
