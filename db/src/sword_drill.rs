use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::query_dsl::LoadQuery;
use diesel::result::OptionalExtension;
use diesel::sql_types::{Integer, Text};
use log::{debug, error, warn};

use crate::models::*;
use crate::query::{self, Param, Statement};
use crate::{DbBackend, DbConnection, DbError};

/// Receives every statement right before it is executed.
pub type SqlSink = Box<dyn FnMut(&Statement) + Send>;

/// Trait implemented by types that can query for and return types of Bible structures.
pub trait SwordDrillable {
    /// Looks up Bible verses for the given reference in the given
    /// translation.
    ///
    /// The translation code is matched case-insensitively against the
    /// `bible_version_key` catalog. An unknown code is not an error; it
    /// simply has no verses.
    fn verses(
        reference: &Reference,
        translation: &str,
        conn: &mut DbConnection,
        sink: &mut Option<SqlSink>,
    ) -> Result<Vec<Verse>, DbError>;

    /// Looks up the catalog row for a translation code.
    fn translation(
        code: &str,
        conn: &mut DbConnection,
        sink: &mut Option<SqlSink>,
    ) -> Result<Option<Translation>, DbError>;

    /// Gets every translation in the catalog, in catalog order.
    fn translations(
        conn: &mut DbConnection,
        sink: &mut Option<SqlSink>,
    ) -> Result<Vec<Translation>, DbError>;
}

/// Main implementation for the [SwordDrillable](crate::sword_drill::SwordDrillable) trait.
pub struct SwordDrill;

impl SwordDrillable for SwordDrill {
    fn verses(
        reference: &Reference,
        translation: &str,
        conn: &mut DbConnection,
        sink: &mut Option<SqlSink>,
    ) -> Result<Vec<Verse>, DbError> {
        let translation = match Self::translation(translation, conn, sink)? {
            Some(translation) => translation,
            None => {
                warn!("Translation '{}' not found in database", translation);
                return Ok(vec![]);
            }
        };

        let verses: Vec<Verse> = load(&query::build_query(reference, &translation)?, conn, sink)?;
        if verses.is_empty() {
            warn!(
                "No verses found for reference '{}' in translation '{}'",
                reference, translation.abbreviation
            );
        }
        Ok(verses)
    }

    fn translation(
        code: &str,
        conn: &mut DbConnection,
        sink: &mut Option<SqlSink>,
    ) -> Result<Option<Translation>, DbError> {
        let stmt = query::translation_query(code);
        trace(&stmt, sink);
        bind(&stmt)
            .get_result::<Translation>(conn)
            .optional()
            .map_err(query_error)
    }

    fn translations(
        conn: &mut DbConnection,
        sink: &mut Option<SqlSink>,
    ) -> Result<Vec<Translation>, DbError> {
        load(&query::translations_query(), conn, sink)
    }
}

/// Hands the statement to the debug log and the caller's sink.
fn trace(stmt: &Statement, sink: &mut Option<SqlSink>) {
    debug!("SQL: {}", stmt);
    if let Some(sink) = sink {
        sink(stmt);
    }
}

/// Builds a boxed raw query with every parameter bound in order.
fn bind(stmt: &Statement) -> BoxedSqlQuery<'static, DbBackend, SqlQuery> {
    stmt.params.iter().fold(
        diesel::sql_query(stmt.sql.as_str()).into_boxed(),
        |query, param| match param {
            Param::Int(n) => query.bind::<Integer, _>(*n),
            Param::Text(s) => query.bind::<Text, _>(s.clone()),
        },
    )
}

fn load<T>(
    stmt: &Statement,
    conn: &mut DbConnection,
    sink: &mut Option<SqlSink>,
) -> Result<Vec<T>, DbError>
where
    BoxedSqlQuery<'static, DbBackend, SqlQuery>: LoadQuery<'static, DbConnection, T>,
{
    trace(stmt, sink);
    bind(stmt).load(conn).map_err(query_error)
}

fn query_error(e: diesel::result::Error) -> DbError {
    error!("Error running query: {}", e);
    DbError::Query {
        cause: e.to_string(),
    }
}

#[cfg(all(test, not(feature = "mysql")))]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::test_connection;

    fn verses(reference: &str, translation: &str, conn: &mut DbConnection) -> Vec<Verse> {
        SwordDrill::verses(&reference.parse().unwrap(), translation, conn, &mut None).unwrap()
    }

    fn locations(verses: &[Verse]) -> Vec<(i32, i32)> {
        verses.iter().map(|v| (v.chapter, v.verse)).collect()
    }

    #[test]
    fn all() {
        let conn = &mut test_connection();

        // Single verse
        {
            let result = verses("John 3:16", "KJV", conn);
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].book, 43);
            assert_eq!(
                result[0].text,
                "For God so loved the world, that he gave his only begotten Son, that whosoever believeth in him should not perish, but have everlasting life."
            );
        }

        // Translation codes are case-insensitive
        {
            let result = verses("John 3:16", "web", conn);
            assert_eq!(locations(&result), vec![(3, 16)]);
            assert!(result[0].text.starts_with("For God so loved the world, that he gave his one and only Son"));
        }

        // Verse range
        {
            let result = verses("Romans 8:38-39", "KJV", conn);
            assert_eq!(locations(&result), vec![(8, 38), (8, 39)]);
        }

        // Range across chapters comes back in order
        {
            let result = verses("John 3:35-4:2", "KJV", conn);
            assert_eq!(locations(&result), vec![(3, 35), (3, 36), (4, 1), (4, 2)]);
        }

        // Whole chapter
        {
            let result = verses("Gen 1", "KJV", conn);
            assert_eq!(locations(&result), vec![(1, 1), (1, 2), (1, 3)]);
        }

        // Whole book
        {
            let result = verses("John", "KJV", conn);
            assert_eq!(result.len(), 8);
            assert_eq!(result.first().map(|v| (v.chapter, v.verse)), Some((3, 16)));
            assert_eq!(result.last().map(|v| (v.chapter, v.verse)), Some((4, 3)));
        }

        // Single-chapter book
        {
            let result = verses("Jude 24-25", "KJV", conn);
            assert_eq!(locations(&result), vec![(1, 24), (1, 25)]);
        }

        // No matching verses is an empty result
        {
            assert!(verses("Revelation 22:21", "KJV", conn).is_empty());
        }

        // Unknown translation is an empty result
        {
            assert!(verses("John 3:16", "NOPE", conn).is_empty());
        }

        // Translations
        {
            let result = SwordDrill::translations(conn, &mut None).unwrap();
            let codes: Vec<&str> = result.iter().map(|t| t.abbreviation.as_str()).collect();
            assert_eq!(codes, vec!["KJV", "WEB"]);
            assert_eq!(result[0].table_name, "t_kjv");
            assert_eq!(result[1].version, "World English Bible");
        }

        // Single translation
        {
            let result = SwordDrill::translation(" kjv ", conn, &mut None).unwrap();
            assert_eq!(result.map(|t| t.table_name), Some("t_kjv".to_string()));
            assert_eq!(SwordDrill::translation("NOPE", conn, &mut None), Ok(None));
        }
    }

    fn gone_translation(conn: &mut DbConnection) {
        diesel::sql_query("INSERT INTO bible_version_key (id, `table`, abbreviation, language, version) VALUES (9, 't_gone', 'GONE', 'english', 'Missing')")
            .execute(conn)
            .unwrap();
    }

    #[test]
    fn sink_sees_statements() {
        let conn = &mut test_connection();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut sink: Option<SqlSink> = {
            let seen = Arc::clone(&seen);
            Some(Box::new(move |stmt: &Statement| seen.lock().unwrap().push(stmt.clone())))
        };

        SwordDrill::verses(&"John 3:16".parse().unwrap(), "KJV", conn, &mut sink).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].sql.contains("FROM bible_version_key WHERE abbreviation = ?"));
        assert_eq!(seen[0].params, vec![Param::Text("KJV".to_string())]);
        assert!(seen[1].sql.contains("FROM `t_kjv`"));
        assert_eq!(seen[1].params.len(), seen[1].placeholder_count());
    }

    #[test]
    fn sink_sees_statements_before_they_run() {
        let conn = &mut test_connection();
        gone_translation(conn);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut sink: Option<SqlSink> = {
            let seen = Arc::clone(&seen);
            Some(Box::new(move |stmt: &Statement| seen.lock().unwrap().push(stmt.sql.clone())))
        };

        // The verse table does not exist, so the statement can only have
        // reached the sink before execution failed.
        match SwordDrill::verses(&"John 3:16".parse().unwrap(), "GONE", conn, &mut sink) {
            Err(DbError::Query { .. }) => {}
            other => panic!("expected a query error, got {:?}", other),
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].contains("FROM `t_gone`"));
    }

    #[test]
    fn broken_table_is_a_query_error() {
        let conn = &mut test_connection();
        gone_translation(conn);

        match SwordDrill::verses(&"John 3:16".parse().unwrap(), "GONE", conn, &mut None) {
            Err(DbError::Query { .. }) => {}
            other => panic!("expected a query error, got {:?}", other),
        }
    }
}
