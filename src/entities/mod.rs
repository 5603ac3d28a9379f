// Entity registries - read-only lookups built from merged tables
//
// Tables stay the source of truth; a registry is a typed view over one of
// them, rebuilt whenever a downstream stage needs it:
// - athletes: name → id, id → birth date, id → NOC
// - countries: NOC → country name
// - editions: edition → (start, end), plus the known-edition overrides

pub mod athlete;
pub mod country;
pub mod edition;

pub use athlete::AthleteRegistry;
pub use country::CountryRegistry;
pub use edition::{default_known_editions, EditionDates, EditionRegistry, KnownEdition, NewEdition};
