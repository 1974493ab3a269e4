use diesel::sql_types::{Integer, Text};
use diesel::QueryableByName;
use serde_derive::Serialize;

/// Model representing a Bible verse as returned by a verse query.
#[derive(Clone, Debug, PartialEq, QueryableByName, Serialize)]
pub struct Verse {
    #[diesel(sql_type = Integer)]
    pub book: i32,
    #[diesel(sql_type = Integer)]
    pub chapter: i32,
    #[diesel(sql_type = Integer)]
    pub verse: i32,
    #[diesel(sql_type = Text)]
    pub text: String,
}

/// Model representing a row of the `bible_version_key` translation
/// catalog.
#[derive(Clone, Debug, PartialEq, QueryableByName, Serialize)]
pub struct Translation {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    /// Name of the table holding this translation's verses.
    #[diesel(sql_type = Text)]
    pub table_name: String,
    /// Translation code, e.g. `KJV`.
    #[diesel(sql_type = Text)]
    pub abbreviation: String,
    #[diesel(sql_type = Text)]
    pub language: String,
    #[diesel(sql_type = Text)]
    pub version: String,
}

mod reference;
pub use self::reference::Reference;
