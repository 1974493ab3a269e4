use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use bible_db::{BibleDatabase, Config, Reference};

/// CLI for looking up Bible verses
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The Bible reference to look up, e.g. "John 3:16" or "Jude 5"
    #[arg(default_value = "John 3:16")]
    reference: String,

    /// Translation code
    #[arg(short, long, default_value = "KJV")]
    translation: String,

    /// List the translations in the database instead of looking up verses
    #[arg(long)]
    list_translations: bool,

    /// Print the verses as JSON
    #[arg(long)]
    json: bool,

    /// Print every SQL statement to stderr before it runs
    #[arg(long)]
    debug: bool,

    /// Env file with the connection settings
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

fn main() {
    let args = Args::parse();
    init_logging();

    if let Err(e) = run(&args) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Without `RUST_LOG` the logger passes everything and the `log` max
/// level alone decides, starting at warnings. The client then applies
/// `LOG_LEVEL` on top of that.
fn init_logging() {
    let rust_log = env::var("RUST_LOG").ok();
    builder(rust_log.as_deref()).init();
    if rust_log.is_none() {
        log::set_max_level(LevelFilter::Warn);
    }
}

fn builder(rust_log: Option<&str>) -> Builder {
    let mut builder = Builder::new();
    match rust_log {
        Some(filters) => builder.parse_filters(filters),
        None => builder.filter_level(LevelFilter::Trace),
    };
    builder
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = BibleDatabase::new(Config::from_env_file(&args.env_file)?)?;
    if args.debug {
        db.enable_debug(|stmt| eprintln!("SQL: {}", stmt));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.list_translations {
        let translations = db.scoped(|db| db.translations())?;
        if args.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&translations)?)?;
        } else if translations.is_empty() {
            writeln!(out, "No translations found.")?;
        } else {
            for t in translations {
                writeln!(out, "{} - {}", t.abbreviation, t.version)?;
            }
        }
        return Ok(());
    }

    let reference: Reference = args.reference.parse()?;
    let verses = db.scoped(|db| db.verses(&reference, &args.translation))?;

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&verses)?)?;
        return Ok(());
    }

    writeln!(out, "{} ({})", reference, args.translation.to_uppercase())?;
    if verses.is_empty() {
        writeln!(out, "No verses found.")?;
    }
    for v in verses {
        writeln!(out, "{}:{} {}", v.chapter, v.verse, v.text)?;
    }
    Ok(())
}
