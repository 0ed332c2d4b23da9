//! Country and region metadata used to resolve ISO-3 codes and region short codes.

mod region_id;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use region_id::RegionId;

/// A region (state, province) belonging to a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Region {
    pub fn new(id: impl Into<RegionId>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Result of a country lookup. An unknown country has no codes and no regions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso2_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso3_code: Option<String>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl CountryInfo {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn new(iso2_code: impl Into<String>, iso3_code: impl Into<String>) -> Self {
        Self {
            iso2_code: Some(iso2_code.into()),
            iso3_code: Some(iso3_code.into()),
            regions: Vec::new(),
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    pub fn is_known(&self) -> bool {
        self.iso2_code.is_some() || self.iso3_code.is_some()
    }

    /// Short code of the first region whose id matches, in directory order.
    pub fn region_code_by_id(&self, region_id: &RegionId) -> Option<&str> {
        self.regions
            .iter()
            .find(|region| region.id == *region_id)
            .map(|region| region.code.as_str())
    }
}

/// Looks up country metadata by code. Unknown codes resolve to [`CountryInfo::unknown`].
pub trait CountryResolver: Send + Sync {
    fn resolve(&self, country_code: &str) -> CountryInfo;
}

/// Failure while loading a country directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read country directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid country directory CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("country code '{0}' must be two letters")]
    InvalidCountryCode(String),
    #[error("country {country} lists conflicting ISO-3 codes {existing} and {found}")]
    ConflictingIso3 {
        country: String,
        existing: String,
        found: String,
    },
    #[error("ISO-3 code {iso3} is claimed by both {existing} and {found}")]
    DuplicateIso3 {
        iso3: String,
        existing: String,
        found: String,
    },
}

#[derive(Debug, Deserialize)]
struct DirectoryRow {
    country_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    iso3_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    region_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    region_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    region_name: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// In-memory country directory keyed by ISO-2 code, also answering ISO-3 lookups.
#[derive(Debug, Clone, Default)]
pub struct CountryDirectory {
    countries: HashMap<String, CountryInfo>,
    iso3_index: HashMap<String, String>,
}

impl CountryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a country, replacing any previous entry with the same ISO-2 code.
    ///
    /// Codes are stored upper-cased. An ISO-3 code already owned by another country is
    /// rejected.
    pub fn insert(&mut self, mut country: CountryInfo) -> Result<(), DirectoryError> {
        let iso2 = country
            .iso2_code
            .as_deref()
            .map(normalize_code)
            .filter(|code| code.len() == 2)
            .ok_or_else(|| {
                DirectoryError::InvalidCountryCode(country.iso2_code.clone().unwrap_or_default())
            })?;
        let iso3 = country.iso3_code.as_deref().map(normalize_code);

        if let Some(iso3) = iso3.as_deref() {
            if let Some(owner) = self.iso3_index.get(iso3).filter(|owner| **owner != iso2) {
                return Err(DirectoryError::DuplicateIso3 {
                    iso3: iso3.to_string(),
                    existing: owner.clone(),
                    found: iso2,
                });
            }
        }

        if let Some(previous) = self.countries.get(&iso2) {
            if let Some(stale) = previous.iso3_code.as_deref() {
                self.iso3_index.remove(stale);
            }
        }
        if let Some(iso3) = iso3.as_deref() {
            self.iso3_index.insert(iso3.to_string(), iso2.clone());
        }

        country.iso2_code = Some(iso2.clone());
        country.iso3_code = iso3;
        self.countries.insert(iso2, country);
        Ok(())
    }

    pub fn with_country(mut self, country: CountryInfo) -> Result<Self, DirectoryError> {
        self.insert(country)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads `country_id,iso3_code,region_id,region_code,region_name` rows.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut order: Vec<String> = Vec::new();
        let mut staged: HashMap<String, CountryInfo> = HashMap::new();

        for record in csv_reader.deserialize::<DirectoryRow>() {
            let row = record?;
            let iso2 = normalize_code(&row.country_id);
            if iso2.len() != 2 {
                return Err(DirectoryError::InvalidCountryCode(row.country_id));
            }

            let entry = staged.entry(iso2.clone()).or_insert_with(|| {
                order.push(iso2.clone());
                CountryInfo {
                    iso2_code: Some(iso2.clone()),
                    iso3_code: None,
                    regions: Vec::new(),
                }
            });

            if let Some(found) = row.iso3_code.as_deref().map(normalize_code) {
                let existing = entry.iso3_code.get_or_insert_with(|| found.clone());
                if *existing != found {
                    return Err(DirectoryError::ConflictingIso3 {
                        country: iso2,
                        existing: existing.clone(),
                        found,
                    });
                }
            }

            if let (Some(id), Some(code)) = (row.region_id, row.region_code) {
                entry.regions.push(Region {
                    id: RegionId::new(id),
                    code,
                    name: row.region_name,
                });
            }
        }

        let mut directory = Self::new();
        for iso2 in order {
            if let Some(country) = staged.remove(&iso2) {
                directory.insert(country)?;
            }
        }

        tracing::debug!(countries = directory.len(), "loaded country directory");
        Ok(directory)
    }
}

impl CountryResolver for CountryDirectory {
    fn resolve(&self, country_code: &str) -> CountryInfo {
        let code = normalize_code(country_code);
        let iso2 = match code.len() {
            2 => Some(code.as_str()),
            3 => self.iso3_index.get(&code).map(String::as_str),
            _ => None,
        };

        match iso2.and_then(|iso2| self.countries.get(iso2)) {
            Some(country) => country.clone(),
            None => {
                tracing::debug!(country_code, "country not found in directory");
                CountryInfo::unknown()
            }
        }
    }
}
