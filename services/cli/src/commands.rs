use crate::infra::{
    choose_path, file_backed_normalizer, load_directory, load_limits, parse_scope_type,
};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::PathBuf;
use tax_address::config::AppConfig;
use tax_address::error::AppError;
use tax_address::{CountryResolver, RawAddressInput, Scope, ScopeType};

#[derive(Args, Debug, Default)]
pub(crate) struct NormalizeArgs {
    /// JSON file holding the raw address; flags below override its fields
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Street line (repeat for multiple lines)
    #[arg(long)]
    pub(crate) street: Vec<String>,
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Two-letter country code
    #[arg(long)]
    pub(crate) country: Option<String>,
    /// Free-text region; takes precedence over --region-id
    #[arg(long)]
    pub(crate) region: Option<String>,
    #[arg(long)]
    pub(crate) region_id: Option<String>,
    #[arg(long)]
    pub(crate) postal_code: Option<String>,
    #[arg(long)]
    pub(crate) scope_code: Option<String>,
    /// One of default, website or store
    #[arg(long, value_parser = parse_scope_type)]
    pub(crate) scope_type: Option<ScopeType>,
    /// Field limits JSON (overrides ADDRESS_LIMITS_PATH)
    #[arg(long)]
    pub(crate) limits: Option<PathBuf>,
    /// Country directory CSV (overrides ADDRESS_DIRECTORY_PATH)
    #[arg(long)]
    pub(crate) directory: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct CountryArgs {
    /// Two- or three-letter country code
    pub(crate) code: String,
    /// Country directory CSV (overrides ADDRESS_DIRECTORY_PATH)
    #[arg(long)]
    pub(crate) directory: Option<PathBuf>,
}

pub(crate) fn run_normalize(args: NormalizeArgs, config: &AppConfig) -> Result<(), AppError> {
    let directory = load_directory(
        choose_path(args.directory.clone(), config.data.directory_path.as_ref()).as_deref(),
    )?;
    let limits = load_limits(
        choose_path(args.limits.clone(), config.data.limits_path.as_ref()).as_deref(),
    )?;

    let base = match args.input.as_ref() {
        Some(path) => read_input(std::fs::File::open(path)?, &config.scope)?,
        None => RawAddressInput {
            scope: config.scope.clone(),
            ..RawAddressInput::default()
        },
    };
    let input = apply_overrides(base, args);

    let normalizer = file_backed_normalizer(directory, limits);
    let address = normalizer.normalize(&input)?;
    write_json(&address)
}

pub(crate) fn run_country(args: CountryArgs, config: &AppConfig) -> Result<(), AppError> {
    let directory = load_directory(
        choose_path(args.directory, config.data.directory_path.as_ref()).as_deref(),
    )?;
    let country = directory.resolve(&args.code);
    if !country.is_known() {
        tracing::info!(code = %args.code, "country not present in directory");
    }
    write_json(&country)
}

/// Input file shape: the address fields plus a scope that may be left out.
#[derive(Deserialize)]
struct InputFile {
    #[serde(flatten)]
    address: RawAddressInput,
    #[serde(default)]
    scope: Option<Scope>,
}

/// Parses an input file; a file without a `scope` object takes `fallback`.
fn read_input<R: Read>(reader: R, fallback: &Scope) -> Result<RawAddressInput, AppError> {
    let InputFile { mut address, scope } = serde_json::from_reader(reader)?;
    address.scope = scope.unwrap_or_else(|| fallback.clone());
    Ok(address)
}

fn apply_overrides(mut input: RawAddressInput, args: NormalizeArgs) -> RawAddressInput {
    let NormalizeArgs {
        street,
        city,
        country,
        region,
        region_id,
        postal_code,
        scope_code,
        scope_type,
        ..
    } = args;

    if !street.is_empty() {
        input.set_street(street);
    }
    if let Some(city) = city {
        input.set_city(city);
    }
    if let Some(country) = country {
        input.set_country_code(country);
    }
    if let Some(region) = region {
        input.set_region(region);
    }
    if let Some(region_id) = region_id {
        input.set_region_id(region_id);
    }
    if let Some(postal_code) = postal_code {
        input.set_postal_code(postal_code);
    }
    if scope_code.is_some() || scope_type.is_some() {
        input.scope = Scope::new(
            scope_code.or(input.scope.code),
            scope_type.unwrap_or(input.scope.scope_type),
        );
    }
    input
}

fn write_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
