//! Fixed catalog genre table.
//!
//! The catalog identifies genres by numeric code. Codes outside the table
//! still render, as `"Genre {id}"`.

use std::borrow::Cow;

/// Genre code → display name, as published by the catalog.
pub const GENRES: [(i64, &str); 19] = [
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

/// Display name for a genre code.
pub fn genre_name(id: i64) -> Cow<'static, str> {
    GENRES
        .iter()
        .find(|(code, _)| *code == id)
        .map(|(_, name)| Cow::Borrowed(*name))
        .unwrap_or_else(|| Cow::Owned(format!("Genre {id}")))
}
