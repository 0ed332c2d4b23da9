pub mod address;
pub mod config;
pub mod directory;
pub mod error;
pub mod limits;
pub mod postal;
pub mod telemetry;

pub use address::{AddressBuilder, AddressNormalizer, NormalizedAddress, RawAddressInput};
pub use directory::{CountryDirectory, CountryInfo, CountryResolver, Region, RegionId};
pub use limits::{ConfigurationError, FieldLimits, FieldLimitsProvider, Scope, ScopeType};
pub use postal::{PostalCodeFixer, ZipCodeFixer};
