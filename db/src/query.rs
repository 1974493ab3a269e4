//! SQL statements for the verse tables and the translation catalog.
//!
//! Every user-supplied value travels as a bound parameter. The only text
//! spliced into SQL is a translation's table name, which comes from the
//! catalog and must be a plain identifier.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Reference, Translation};
use crate::DbError;

/// A value bound to a `?` placeholder.
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Int(i32),
    Text(String),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Param::Int(n) => write!(f, "{}", n),
            Param::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

/// SQL text with positional `?` placeholders and the values bound to
/// them, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Param>,
}

impl Statement {
    fn new(sql: impl Into<String>, params: Vec<Param>) -> Statement {
        Statement {
            sql: sql.into(),
            params,
        }
    }

    /// Number of `?` placeholders in the SQL text.
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

/// Renders the SQL with each placeholder replaced by its value. Only
/// meant for logs; never executed.
impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut params = self.params.iter();
        for (i, part) in self.sql.split('?').enumerate() {
            if i > 0 {
                match params.next() {
                    Some(param) => write!(f, "{}", param)?,
                    None => f.write_str("?")?,
                }
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

const VERSE_COLUMNS: &str = "SELECT b AS book, c AS chapter, v AS verse, t AS text";

const TRANSLATION_COLUMNS: &str =
    "SELECT id, `table` AS table_name, abbreviation, language, version FROM bible_version_key";

/// Whether `name` can be used as a table name without quoting concerns.
pub fn is_identifier(name: &str) -> bool {
    lazy_static! {
        static ref IDENT_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").unwrap();
    }
    IDENT_RE.is_match(name)
}

/// Builds the query selecting the verses of `reference` from the table of
/// `translation`, ordered by chapter then verse.
pub fn build_query(reference: &Reference, translation: &Translation) -> Result<Statement, DbError> {
    if !is_identifier(&translation.table_name) {
        return Err(DbError::InvalidTable {
            table: translation.table_name.clone(),
        });
    }

    let mut sql = format!(
        "{} FROM `{}` WHERE b = ?",
        VERSE_COLUMNS, translation.table_name
    );
    let mut params = vec![Param::Int(reference.book)];

    match *reference {
        Reference { chapter: None, .. } => {}
        Reference {
            chapter: Some(chapter),
            verse: None,
            end_chapter,
            ..
        } => {
            sql.push_str(" AND c BETWEEN ? AND ?");
            params.push(Param::Int(chapter));
            params.push(Param::Int(end_chapter.unwrap_or(chapter)));
        }
        Reference {
            chapter: Some(chapter),
            verse: Some(verse),
            end_chapter,
            end_verse,
            ..
        } => {
            let end_chapter = end_chapter.unwrap_or(chapter);
            let end_verse = end_verse.unwrap_or(verse);

            if chapter == end_chapter {
                sql.push_str(" AND c = ? AND v BETWEEN ? AND ?");
                params.extend([chapter, verse, end_verse].iter().map(|&n| Param::Int(n)));
            } else {
                sql.push_str(" AND ((c = ? AND v >= ?) OR (c > ? AND c < ?) OR (c = ? AND v <= ?))");
                params.extend(
                    [chapter, verse, chapter, end_chapter, end_chapter, end_verse]
                        .iter()
                        .map(|&n| Param::Int(n)),
                );
            }
        }
    }

    sql.push_str(" ORDER BY c ASC, v ASC");
    Ok(Statement::new(sql, params))
}

/// Looks up one catalog row by translation code.
pub fn translation_query(code: &str) -> Statement {
    Statement::new(
        format!("{} WHERE abbreviation = ?", TRANSLATION_COLUMNS),
        vec![Param::Text(code.trim().to_uppercase())],
    )
}

/// Lists the whole catalog.
pub fn translations_query() -> Statement {
    Statement::new(format!("{} ORDER BY id ASC", TRANSLATION_COLUMNS), vec![])
}
