use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Match, Regex};

use crate::books::{self, Book};
use crate::DbError;

/// Model representing a parsed Bible reference used to look up a
/// passage in the database.
///
/// A reference with no `chapter` spans the whole book. A reference with
/// chapters but no verses spans whole chapters, from `chapter` through
/// `end_chapter`. Otherwise it runs from `chapter:verse` through
/// `end_chapter:end_verse`. References produced by parsing always have
/// the end fields filled in and never end before they start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub book: i32,
    pub chapter: Option<i32>,
    pub verse: Option<i32>,
    pub end_chapter: Option<i32>,
    pub end_verse: Option<i32>,
}

impl Reference {
    /// A reference spanning the whole of the given book.
    pub fn whole_book(book: i32) -> Reference {
        Reference {
            book,
            chapter: None,
            verse: None,
            end_chapter: None,
            end_verse: None,
        }
    }

    /// A reference to a single verse.
    pub fn single(book: i32, chapter: i32, verse: i32) -> Reference {
        Reference {
            book,
            chapter: Some(chapter),
            verse: Some(verse),
            end_chapter: Some(chapter),
            end_verse: Some(verse),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let book = books::book(self.book).ok();
        match book {
            Some(book) => write!(f, "{}", book.name)?,
            None => write!(f, "{}", self.book)?,
        }

        match *self {
            Reference { chapter: None, .. } => Ok(()),
            Reference {
                chapter: Some(chapter),
                verse: None,
                end_chapter,
                ..
            } => {
                let end_chapter = end_chapter.unwrap_or(chapter);
                if end_chapter == chapter {
                    write!(f, " {}", chapter)
                } else {
                    write!(f, " {}-{}", chapter, end_chapter)
                }
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
                let single = book.map_or(false, Book::is_single_chapter);

                if single && chapter == 1 && end_chapter == 1 {
                    if verse == end_verse {
                        write!(f, " {}", verse)
                    } else {
                        write!(f, " {}-{}", verse, end_verse)
                    }
                } else if chapter != end_chapter {
                    write!(f, " {}:{}-{}:{}", chapter, verse, end_chapter, end_verse)
                } else if verse == end_verse {
                    write!(f, " {}:{}", chapter, verse)
                } else {
                    write!(f, " {}:{}-{}", chapter, verse, end_verse)
                }
            }
        }
    }
}

impl FromStr for Reference {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Reference, Self::Err> {
        lazy_static! {
            static ref LOCATOR_RE: Regex =
                Regex::new(r"^(\d{1,3})(?:[:.](\d{1,3}))?(?:\s*-\s*(\d{1,3})(?:[:.](\d{1,3}))?)?$")
                    .unwrap();
        }

        let input = s.trim();
        let (book, rest) = books::longest_prefix(input).ok_or_else(|| unknown_book(s))?;

        let locator = rest
            .trim_start_matches(|c: char| c.is_whitespace() || c == '.')
            .trim_end();
        if locator.is_empty() {
            return Ok(Reference::whole_book(book.id));
        }

        let caps = LOCATOR_RE
            .captures(locator)
            .ok_or_else(|| invalid_reference(s))?;
        let num = |i: usize| caps.get(i).map(|m| parse_num_match(m, s)).transpose();
        let (first, start_verse, second, end_verse) = (num(1)?, num(2)?, num(3)?, num(4)?);
        let first = first.ok_or_else(|| invalid_reference(s))?;

        let ((chapter, verse), (end_chapter, end_verse)) =
            match (start_verse, second, end_verse) {
                // A bare number in a single-chapter book is a verse
                (None, None, None) if book.is_single_chapter() => ((1, Some(first)), (1, Some(first))),
                (None, Some(end), None) if book.is_single_chapter() => {
                    ((1, Some(first)), (1, Some(end)))
                }
                (None, Some(end_chapter), Some(end_verse)) if book.is_single_chapter() => {
                    ((1, Some(first)), (end_chapter, Some(end_verse)))
                }
                // Whole chapters
                (None, None, None) => ((first, None), (first, None)),
                (None, Some(end_chapter), None) => ((first, None), (end_chapter, None)),
                // Chapter through a later chapter and verse
                (None, Some(end_chapter), Some(end_verse)) => {
                    ((first, Some(1)), (end_chapter, Some(end_verse)))
                }
                // Chapter and verse, with an optional end
                (Some(verse), None, None) => ((first, Some(verse)), (first, Some(verse))),
                (Some(verse), Some(end), None) => ((first, Some(verse)), (first, Some(end))),
                (Some(verse), Some(end_chapter), Some(end_verse)) => {
                    ((first, Some(verse)), (end_chapter, Some(end_verse)))
                }
                (_, None, Some(_)) => return Err(invalid_reference(s)),
            };

        if chapter > book.chapter_count
            || end_chapter > book.chapter_count
            || (end_chapter, end_verse) < (chapter, verse)
        {
            return Err(invalid_reference(s));
        }

        Ok(Reference {
            book: book.id,
            chapter: Some(chapter),
            verse,
            end_chapter: Some(end_chapter),
            end_verse,
        })
    }
}

/// Parse a [Match](regex.Match.html) into a positive i32.
fn parse_num_match(m: Match, reference: &str) -> Result<i32, DbError> {
    match m.as_str().parse() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid_reference(reference)),
    }
}

/// Create an invalid reference error from the input.
fn invalid_reference(s: &str) -> DbError {
    DbError::InvalidReference {
        reference: s.to_string(),
    }
}

/// Blames the book part of the input when no book name matched, unless
/// there is no book part at all.
fn unknown_book(s: &str) -> DbError {
    let book = s
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_digit() || c.is_whitespace() || ":.-".contains(c));
    if book.is_empty() {
        invalid_reference(s)
    } else {
        DbError::UnknownBook {
            book: book.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::models::Reference;
    use crate::DbError;

    fn reference(
        book: i32,
        chapter: Option<i32>,
        verse: Option<i32>,
        end_chapter: Option<i32>,
        end_verse: Option<i32>,
    ) -> Reference {
        Reference {
            book,
            chapter,
            verse,
            end_chapter,
            end_verse,
        }
    }

    #[test]
    fn from_str() {
        vec![
            ("John 3:16", reference(43, Some(3), Some(16), Some(3), Some(16))),
            ("Gen 1:1-3", reference(1, Some(1), Some(1), Some(1), Some(3))),
            ("Genesis 1", reference(1, Some(1), None, Some(1), None)),
            ("Genesis", reference(1, None, None, None, None)),
            ("Genesis 1-3", reference(1, Some(1), None, Some(3), None)),
            ("Romans 8:38-39", reference(45, Some(8), Some(38), Some(8), Some(39))),
            ("John 3:16-4:3", reference(43, Some(3), Some(16), Some(4), Some(3))),
            ("John 3-4:3", reference(43, Some(3), Some(1), Some(4), Some(3))),
            ("Song of Solomon 2:1", reference(22, Some(2), Some(1), Some(2), Some(1))),
            ("1 Timothy 3:16 - 18", reference(54, Some(3), Some(16), Some(3), Some(18))),
            ("I Timothy 3:16", reference(54, Some(3), Some(16), Some(3), Some(16))),
            ("1tim 3.16", reference(54, Some(3), Some(16), Some(3), Some(16))),
            ("jhn.1.1", reference(43, Some(1), Some(1), Some(1), Some(1))),
            ("Jn3:16", reference(43, Some(3), Some(16), Some(3), Some(16))),
            ("I Sa 3", reference(9, Some(3), None, Some(3), None)),
            ("Isa 3", reference(23, Some(3), None, Some(3), None)),
            ("II Kgs 2:11", reference(12, Some(2), Some(11), Some(2), Some(11))),
            ("1 Sam. 3:10", reference(9, Some(3), Some(10), Some(3), Some(10))),
            ("  psalm 119:105  ", reference(19, Some(119), Some(105), Some(119), Some(105))),
        ]
        .into_iter()
        .for_each(|(raw, expected)| {
            assert_eq!(raw.parse::<Reference>(), Ok(expected), "{}", raw);
        });
    }

    // Whether a bare number is a chapter or a verse depends on the book's
    // chapter count, not on the syntax.
    #[test]
    fn single_chapter_books() {
        vec![
            ("Jude 5", reference(65, Some(1), Some(5), Some(1), Some(5))),
            ("Jude 1", reference(65, Some(1), Some(1), Some(1), Some(1))),
            ("Jude 1-13", reference(65, Some(1), Some(1), Some(1), Some(13))),
            ("Jude 1:5", reference(65, Some(1), Some(5), Some(1), Some(5))),
            ("Jude 1:5-7", reference(65, Some(1), Some(5), Some(1), Some(7))),
            ("Obadiah 3", reference(31, Some(1), Some(3), Some(1), Some(3))),
            ("3 John 4", reference(64, Some(1), Some(4), Some(1), Some(4))),
            ("Jude", reference(65, None, None, None, None)),
            // Same syntax, multi-chapter book
            ("Joel 3", reference(29, Some(3), None, Some(3), None)),
        ]
        .into_iter()
        .for_each(|(raw, expected)| {
            assert_eq!(raw.parse::<Reference>(), Ok(expected), "{}", raw);
        });
    }

    #[test]
    fn invalid() {
        vec![
            "",
            "   ",
            "3:16",
            "John three",
            "John 3:a",
            "John 3:16-",
            "John 0:1",
            "John 3:0",
            "John 3:16-15",
            "John 4:1-3:16",
            "Genesis 3-1",
            "John 22:1",
            "Jude 2:1",
            "John 3:16 extra",
        ]
        .into_iter()
        .for_each(|raw| match raw.parse::<Reference>() {
            Err(DbError::InvalidReference { reference }) => assert_eq!(reference, raw),
            other => panic!("{:?} parsed as {:?}", raw, other),
        });
    }

    #[test]
    fn unknown_book() {
        assert_eq!(
            "NotABook 1:1".parse::<Reference>(),
            Err(DbError::UnknownBook {
                book: "NotABook".to_string()
            })
        );
        assert_eq!(
            "Hezekiah".parse::<Reference>(),
            Err(DbError::UnknownBook {
                book: "Hezekiah".to_string()
            })
        );
    }

    #[test]
    fn fmt() {
        vec![
            ("Genesis", reference(1, None, None, None, None)),
            ("Exodus 20", reference(2, Some(20), None, Some(20), None)),
            ("Genesis 1-3", reference(1, Some(1), None, Some(3), None)),
            ("John 1:1", reference(43, Some(1), Some(1), Some(1), Some(1))),
            ("1 Timothy 3:16-18", reference(54, Some(3), Some(16), Some(3), Some(18))),
            ("John 3:16-4:3", reference(43, Some(3), Some(16), Some(4), Some(3))),
            ("Jude 5", reference(65, Some(1), Some(5), Some(1), Some(5))),
            ("Jude 5-7", reference(65, Some(1), Some(5), Some(1), Some(7))),
        ]
        .into_iter()
        .for_each(|(expected, reference)| {
            assert_eq!(reference.to_string(), expected);
        });
    }

    #[test]
    fn round_trip() {
        vec![
            "john 3:16",
            "Gen 1:1-3",
            "gen 1",
            "Genesis 1-3",
            "rev",
            "Jude 5",
            "jude 1-13",
            "Jude 1:5-1:7",
            "ps 119:105-176",
            "John 3:16-4:3",
            "Matt 5-7:29",
            "iii john 2",
            "Song 1:1",
        ]
        .into_iter()
        .for_each(|raw| {
            let parsed: Reference = raw.parse().unwrap();
            assert_eq!(parsed.to_string().parse::<Reference>(), Ok(parsed), "{}", raw);
        });
    }
}
