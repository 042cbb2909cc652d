pub mod catalog;
pub mod languages;
pub mod localized;

pub use catalog::{Catalog, CatalogKey};
pub use languages::{rare_label, Language, DEFAULT_LANGUAGE, LANGUAGES};
pub use localized::{resolve, Locale, LocalizedText};
