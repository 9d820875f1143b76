//! Domain types: the raw movie record and the genre table.

pub mod genre;
pub mod movie;

pub use genre::{genre_name, GENRES};
pub use movie::{parse_release_date, MovieRecord, ProductionCountry};
