use std::path::{Path, PathBuf};
use std::sync::Arc;
use tax_address::directory::CountryDirectory;
use tax_address::error::AppError;
use tax_address::limits::ScopedLimitsTable;
use tax_address::{AddressNormalizer, ScopeType, ZipCodeFixer};
use tracing::{info, warn};

pub(crate) type FileBackedNormalizer =
    AddressNormalizer<CountryDirectory, ScopedLimitsTable, ZipCodeFixer>;

pub(crate) fn parse_scope_type(raw: &str) -> Result<ScopeType, String> {
    ScopeType::parse(raw)
        .ok_or_else(|| format!("unknown scope type '{raw}' (expected default, website or store)"))
}

/// Picks the command-line path over the configured one.
pub(crate) fn choose_path(flag: Option<PathBuf>, configured: Option<&PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| configured.cloned())
}

pub(crate) fn load_directory(path: Option<&Path>) -> Result<CountryDirectory, AppError> {
    match path {
        Some(path) => {
            let directory = CountryDirectory::from_path(path)?;
            info!(path = %path.display(), countries = directory.len(), "country directory loaded");
            Ok(directory)
        }
        None => {
            warn!("no country directory configured; countries and region ids will not resolve");
            Ok(CountryDirectory::new())
        }
    }
}

pub(crate) fn load_limits(path: Option<&Path>) -> Result<ScopedLimitsTable, AppError> {
    match path {
        Some(path) => {
            let table = ScopedLimitsTable::from_path(path)?;
            info!(path = %path.display(), scopes = table.len(), "field limits loaded");
            Ok(table)
        }
        None => {
            warn!("no field limits configured; every scope will be reported as unconfigured");
            Ok(ScopedLimitsTable::new())
        }
    }
}

pub(crate) fn file_backed_normalizer(
    directory: CountryDirectory,
    limits: ScopedLimitsTable,
) -> FileBackedNormalizer {
    AddressNormalizer::new(Arc::new(directory), Arc::new(limits), Arc::new(ZipCodeFixer))
}
