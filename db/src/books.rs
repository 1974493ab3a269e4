use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::DbError;

/// Enum for the testaments in the Bible (Old or New).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Testament {
    Old,
    New,
}

/// A book in the Bible, identified by its canonical ordinal (1-66).
#[derive(Clone, Debug)]
pub struct Book {
    pub id: i32,
    pub name: &'static str,
    pub chapter_count: i32,
    pub testament: Testament,
    /// Accepted abbreviations, in addition to the canonical name.
    pub aliases: &'static [&'static str],
}

impl Book {
    /// Whether the book has only one chapter (Obadiah, Philemon, 2 and 3
    /// John, Jude). References into these books may omit the chapter.
    pub fn is_single_chapter(&self) -> bool {
        self.chapter_count == 1
    }
}

macro_rules! books {
    ($($id:expr, $name:expr, $chapters:expr, $testament:ident, [$($alias:expr),*];)*) => {
        &[$(Book {
            id: $id,
            name: $name,
            chapter_count: $chapters,
            testament: Testament::$testament,
            aliases: &[$($alias),*],
        }),*]
    };
}

/// All books of the Protestant canon, in canonical order.
pub static BOOKS: &[Book] = books! {
    1, "Genesis", 50, Old, ["gen", "ge", "gn"];
    2, "Exodus", 40, Old, ["exod", "exo", "ex"];
    3, "Leviticus", 27, Old, ["lev", "le", "lv"];
    4, "Numbers", 36, Old, ["num", "nu", "nm", "nb"];
    5, "Deuteronomy", 34, Old, ["deut", "deu", "de", "dt"];
    6, "Joshua", 24, Old, ["josh", "jos", "jsh"];
    7, "Judges", 21, Old, ["judg", "jdg", "jdgs", "jg"];
    8, "Ruth", 4, Old, ["rth", "ru"];
    9, "1 Samuel", 31, Old, ["1 sam", "1 sa", "1 sm", "1 s"];
    10, "2 Samuel", 24, Old, ["2 sam", "2 sa", "2 sm", "2 s"];
    11, "1 Kings", 22, Old, ["1 kgs", "1 ki", "1 kin", "1 k"];
    12, "2 Kings", 25, Old, ["2 kgs", "2 ki", "2 kin", "2 k"];
    13, "1 Chronicles", 29, Old, ["1 chron", "1 chr", "1 ch"];
    14, "2 Chronicles", 36, Old, ["2 chron", "2 chr", "2 ch"];
    15, "Ezra", 10, Old, ["ezr"];
    16, "Nehemiah", 13, Old, ["neh", "ne"];
    17, "Esther", 10, Old, ["esth", "est", "es"];
    18, "Job", 42, Old, ["jb"];
    19, "Psalms", 150, Old, ["psalm", "psa", "psm", "pss", "ps"];
    20, "Proverbs", 31, Old, ["prov", "pro", "prv", "pr"];
    21, "Ecclesiastes", 12, Old, ["eccl", "ecc", "ec", "qoh"];
    22, "Song of Solomon", 8, Old, ["song of songs", "song", "sng", "sos", "so", "canticles"];
    23, "Isaiah", 66, Old, ["isa", "is"];
    24, "Jeremiah", 52, Old, ["jer", "je", "jr"];
    25, "Lamentations", 5, Old, ["lam", "la"];
    26, "Ezekiel", 48, Old, ["ezek", "eze", "ezk"];
    27, "Daniel", 12, Old, ["dan", "da", "dn"];
    28, "Hosea", 14, Old, ["hos", "ho"];
    29, "Joel", 3, Old, ["joe", "jl"];
    30, "Amos", 9, Old, ["amo", "am"];
    31, "Obadiah", 1, Old, ["obad", "oba", "ob"];
    32, "Jonah", 4, Old, ["jon", "jnh"];
    33, "Micah", 7, Old, ["mic", "mc"];
    34, "Nahum", 3, Old, ["nah", "na"];
    35, "Habakkuk", 3, Old, ["hab", "hb"];
    36, "Zephaniah", 3, Old, ["zeph", "zep", "zp"];
    37, "Haggai", 2, Old, ["hag", "hg"];
    38, "Zechariah", 14, Old, ["zech", "zec", "zc"];
    39, "Malachi", 4, Old, ["mal", "ml"];
    40, "Matthew", 28, New, ["matt", "mat", "mt"];
    41, "Mark", 16, New, ["mrk", "mk", "mr"];
    42, "Luke", 24, New, ["luk", "lk"];
    43, "John", 21, New, ["joh", "jhn", "jn"];
    44, "Acts", 28, New, ["act", "ac"];
    45, "Romans", 16, New, ["rom", "ro", "rm"];
    46, "1 Corinthians", 16, New, ["1 cor", "1 co"];
    47, "2 Corinthians", 13, New, ["2 cor", "2 co"];
    48, "Galatians", 6, New, ["gal", "ga"];
    49, "Ephesians", 6, New, ["ephes", "eph"];
    50, "Philippians", 4, New, ["phil", "php", "pp"];
    51, "Colossians", 4, New, ["col"];
    52, "1 Thessalonians", 5, New, ["1 thess", "1 thes", "1 th"];
    53, "2 Thessalonians", 3, New, ["2 thess", "2 thes", "2 th"];
    54, "1 Timothy", 6, New, ["1 tim", "1 ti"];
    55, "2 Timothy", 4, New, ["2 tim", "2 ti"];
    56, "Titus", 3, New, ["tit"];
    57, "Philemon", 1, New, ["philem", "phm", "pm"];
    58, "Hebrews", 13, New, ["heb"];
    59, "James", 5, New, ["jas", "jm"];
    60, "1 Peter", 5, New, ["1 pet", "1 pe", "1 pt"];
    61, "2 Peter", 3, New, ["2 pet", "2 pe", "2 pt"];
    62, "1 John", 5, New, ["1 jhn", "1 jn", "1 jo"];
    63, "2 John", 1, New, ["2 jhn", "2 jn", "2 jo"];
    64, "3 John", 1, New, ["3 jhn", "3 jn", "3 jo"];
    65, "Jude", 1, New, ["jud", "jd"];
    66, "Revelation", 22, New, ["revelations", "rev", "re", "rv", "apocalypse"];
};

/// Spellings accepted in place of a leading book number.
const NUMBER_PREFIXES: [(&str, &[&str]); 3] = [
    ("1", &["i", "first"]),
    ("2", &["ii", "second"]),
    ("3", &["iii", "third"]),
];

lazy_static! {
    /// Normalized alias -> index into `BOOKS`.
    static ref ALIASES: HashMap<String, usize> = {
        let mut aliases = HashMap::new();
        for (i, book) in BOOKS.iter().enumerate() {
            for name in std::iter::once(&book.name).chain(book.aliases.iter()) {
                for key in keys(name) {
                    aliases.insert(key, i);
                }
            }
        }
        aliases
    };
}

/// Lowercases, treats periods as spaces, and collapses each run of
/// whitespace to a single space, so "1 Sam." and "1  sam" share a key
/// while "I Sa" and "Isa" do not.
pub(crate) fn normalize(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '.')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Every key a name is reachable by. Numbered names ("1 sam") also get
/// the run-together form ("1sam") and the spelled-out prefixes
/// ("i sam", "first sam").
fn keys(name: &str) -> Vec<String> {
    let key = normalize(name);
    let mut keys = vec![key.clone()];

    if let Some((number, rest)) = key.split_once(' ') {
        if let Some((_, spellings)) = NUMBER_PREFIXES.iter().find(|(n, _)| *n == number) {
            keys.push(format!("{}{}", number, rest));
            keys.extend(spellings.iter().map(|spelling| format!("{} {}", spelling, rest)));
        }
    }

    keys
}

/// Looks up a book by its normalized alias without building an error.
pub(crate) fn lookup(name: &str) -> Option<&'static Book> {
    ALIASES.get(&normalize(name)).map(|&i| &BOOKS[i])
}

/// Resolves a book name or abbreviation to its canonical ordinal.
///
/// Matching is case-insensitive and ignores surrounding whitespace, so
/// "Gen", " genesis " and "GE" all resolve to 1.
pub fn resolve_book(name: &str) -> Result<i32, DbError> {
    lookup(name)
        .map(|book| book.id)
        .ok_or_else(|| DbError::UnknownBook {
            book: name.trim().to_string(),
        })
}

/// Gets the book with the given ordinal.
pub fn book(ordinal: i32) -> Result<&'static Book, DbError> {
    if (1..=BOOKS.len() as i32).contains(&ordinal) {
        Ok(&BOOKS[(ordinal - 1) as usize])
    } else {
        Err(DbError::InvalidOrdinal { ordinal })
    }
}

/// Gets the canonical name of the book with the given ordinal.
pub fn ordinal_to_name(ordinal: i32) -> Result<&'static str, DbError> {
    book(ordinal).map(|b| b.name)
}

/// Finds the longest book name or alias at the start of `s`.
///
/// A candidate must end at the end of the input, before whitespace or a
/// period, or before a digit that directly follows a letter ("Jn3:16").
/// Returns the book and the unconsumed remainder.
pub(crate) fn longest_prefix(s: &str) -> Option<(&'static Book, &str)> {
    let mut found = None;
    let mut prev: Option<char> = None;

    for (i, c) in s.char_indices().chain(std::iter::once((s.len(), ' '))) {
        let boundary = c.is_whitespace()
            || c == '.'
            || (c.is_ascii_digit() && prev.map_or(false, char::is_alphabetic));
        if i > 0 && boundary {
            if let Some(book) = lookup(&s[..i]) {
                found = Some((book, &s[i..]));
            }
        }
        prev = Some(c);
    }

    found
}
