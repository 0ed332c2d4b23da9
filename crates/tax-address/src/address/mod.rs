//! Normalization of raw address fields into provider-ready, length-bounded records.
//!
//! The normalizer resolves the country and region through a [`CountryResolver`], bounds
//! every field with the [`FieldLimits`] configured for the address scope, and repairs the
//! postal code with a [`PostalCodeFixer`] before truncating it. Lengths are counted in
//! characters, never bytes.

mod domain;
mod truncate;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::directory::{CountryInfo, CountryResolver, RegionId};
use crate::limits::{ConfigurationError, FieldLimits, FieldLimitsProvider, ScopeType};
use crate::postal::PostalCodeFixer;

pub use domain::{NormalizedAddress, RawAddressInput};

use domain::is_blank;
use truncate::truncate_chars;

/// Builds [`NormalizedAddress`] values using injected lookup collaborators.
pub struct AddressNormalizer<C: ?Sized, L: ?Sized, P: ?Sized> {
    countries: Arc<C>,
    limits: Arc<L>,
    postal: Arc<P>,
}

impl<C: ?Sized, L: ?Sized, P: ?Sized> Clone for AddressNormalizer<C, L, P> {
    fn clone(&self) -> Self {
        Self {
            countries: Arc::clone(&self.countries),
            limits: Arc::clone(&self.limits),
            postal: Arc::clone(&self.postal),
        }
    }
}

impl<C, L, P> AddressNormalizer<C, L, P>
where
    C: CountryResolver + ?Sized,
    L: FieldLimitsProvider + ?Sized,
    P: PostalCodeFixer + ?Sized,
{
    pub fn new(countries: Arc<C>, limits: Arc<L>, postal: Arc<P>) -> Self {
        Self {
            countries,
            limits,
            postal,
        }
    }

    /// Starts a fresh builder bound to this normalizer's collaborators.
    pub fn builder(&self) -> AddressBuilder<'_, C, L, P> {
        AddressBuilder {
            normalizer: self,
            input: RawAddressInput::new(),
        }
    }

    /// Normalizes `input` without modifying it.
    ///
    /// Fails only when the limits provider has no configuration for the input scope.
    pub fn normalize(
        &self,
        input: &RawAddressInput,
    ) -> Result<NormalizedAddress, ConfigurationError> {
        let country = match input.country_code.as_deref() {
            Some(code) if !is_blank(code) => self.countries.resolve(code),
            _ => CountryInfo::unknown(),
        };
        let main_division = resolve_main_division(input, &country);

        let limits = self.limits.limits_for(&input.scope).map_err(|err| {
            warn!(scope = %input.scope, "address field limits unavailable");
            err
        })?;

        let address = self.bound_fields(input, &country, main_division, &limits);
        debug!(
            scope = %input.scope,
            street_lines = address.street_address.len(),
            has_main_division = address.main_division.is_some(),
            has_country = address.country.is_some(),
            "normalized address"
        );
        Ok(address)
    }

    fn bound_fields(
        &self,
        input: &RawAddressInput,
        country: &CountryInfo,
        main_division: Option<&str>,
        limits: &FieldLimits,
    ) -> NormalizedAddress {
        let street_address = input
            .street
            .iter()
            .filter_map(|line| bounded(Some(line.as_str()), limits.street))
            .collect();

        let postal_code = input
            .postal_code
            .as_deref()
            .filter(|raw| !is_blank(raw))
            .map(|raw| self.postal.fix(raw))
            .and_then(|fixed| bounded(Some(fixed.as_str()), limits.postal_code));

        NormalizedAddress {
            street_address,
            city: bounded(input.city.as_deref(), limits.city),
            main_division: bounded(main_division, limits.main_division),
            postal_code,
            country: bounded(country.iso3_code.as_deref(), limits.country),
        }
    }
}

/// Free-text region wins; otherwise the region id is looked up in the country's regions.
fn resolve_main_division<'a>(
    input: &'a RawAddressInput,
    country: &'a CountryInfo,
) -> Option<&'a str> {
    if let Some(region) = input.region.as_deref().filter(|region| !is_blank(region)) {
        return Some(region);
    }

    let region_id = input.region_id.as_ref().filter(|id| !id.is_blank())?;
    let code = country.region_code_by_id(region_id);
    if code.is_none() {
        debug!(
            region_id = %region_id,
            country_code = input.country_code.as_deref().unwrap_or_default(),
            "region id did not match any region of the country"
        );
    }
    code
}

/// Surrounding whitespace is dropped before the limit applies.
fn bounded(value: Option<&str>, limit: usize) -> Option<String> {
    value
        .map(str::trim)
        .map(|value| truncate_chars(value, limit))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Chaining front end over [`RawAddressInput`] for a specific normalizer.
///
/// [`AddressBuilder::build`] reads the accumulated fields without consuming or altering
/// them, so building twice yields the same address.
pub struct AddressBuilder<'a, C: ?Sized, L: ?Sized, P: ?Sized> {
    normalizer: &'a AddressNormalizer<C, L, P>,
    input: RawAddressInput,
}

impl<'a, C, L, P> AddressBuilder<'a, C, L, P>
where
    C: CountryResolver + ?Sized,
    L: FieldLimitsProvider + ?Sized,
    P: PostalCodeFixer + ?Sized,
{
    pub fn street<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.set_street(lines);
        self
    }

    pub fn street_line(mut self, line: impl Into<String>) -> Self {
        self.input.push_street_line(line);
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.input.set_city(city);
        self
    }

    pub fn country_code(mut self, country_code: impl Into<String>) -> Self {
        self.input.set_country_code(country_code);
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.input.set_region(region);
        self
    }

    pub fn region_id(mut self, region_id: impl Into<RegionId>) -> Self {
        self.input.set_region_id(region_id);
        self
    }

    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.input.set_postal_code(postal_code);
        self
    }

    pub fn scope_code(mut self, scope_code: impl Into<String>) -> Self {
        self.input.set_scope_code(Some(scope_code.into()));
        self
    }

    pub fn scope_type(mut self, scope_type: ScopeType) -> Self {
        self.input.set_scope_type(scope_type);
        self
    }

    pub fn input(&self) -> &RawAddressInput {
        &self.input
    }

    pub fn into_input(self) -> RawAddressInput {
        self.input
    }

    pub fn build(&self) -> Result<NormalizedAddress, ConfigurationError> {
        self.normalizer.normalize(&self.input)
    }
}
