use serde::{Deserialize, Deserializer, Serialize};

use crate::directory::RegionId;
use crate::limits::{Scope, ScopeType};

/// Loosely structured address fields as captured at checkout.
///
/// Street lines are filtered of blank entries whenever they are set or deserialized;
/// every other field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAddressInput {
    #[serde(default, deserialize_with = "deserialize_street")]
    pub street: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_id: Option<RegionId>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub scope: Scope,
}

impl RawAddressInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the street lines, dropping blank ones.
    pub fn set_street<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.street = lines
            .into_iter()
            .map(Into::into)
            .filter(|line| !is_blank(line))
            .collect();
        self
    }

    pub fn push_street_line(&mut self, line: impl Into<String>) -> &mut Self {
        let line = line.into();
        if !is_blank(&line) {
            self.street.push(line);
        }
        self
    }

    pub fn set_city(&mut self, city: impl Into<String>) -> &mut Self {
        self.city = Some(city.into());
        self
    }

    pub fn set_country_code(&mut self, country_code: impl Into<String>) -> &mut Self {
        self.country_code = Some(country_code.into());
        self
    }

    pub fn set_region(&mut self, region: impl Into<String>) -> &mut Self {
        self.region = Some(region.into());
        self
    }

    pub fn set_region_id(&mut self, region_id: impl Into<RegionId>) -> &mut Self {
        self.region_id = Some(region_id.into());
        self
    }

    pub fn set_postal_code(&mut self, postal_code: impl Into<String>) -> &mut Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn set_scope_code(&mut self, scope_code: Option<String>) -> &mut Self {
        self.scope.code = scope_code;
        self
    }

    pub fn set_scope_type(&mut self, scope_type: ScopeType) -> &mut Self {
        self.scope.scope_type = scope_type;
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StreetInput {
    Line(String),
    Lines(Vec<String>),
}

fn deserialize_street<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let lines = match Option::<StreetInput>::deserialize(deserializer)? {
        Some(StreetInput::Line(line)) => vec![line],
        Some(StreetInput::Lines(lines)) => lines,
        None => Vec::new(),
    };
    Ok(lines.into_iter().filter(|line| !is_blank(line)).collect())
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Length-bounded address ready for the tax provider. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedAddress {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) street_address: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) main_division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) country: Option<String>,
}

impl NormalizedAddress {
    pub fn street_address(&self) -> &[String] {
        &self.street_address
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// State, province or region short code.
    pub fn main_division(&self) -> Option<&str> {
        self.main_division.as_deref()
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    /// ISO-3 country code.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}
