//! Command-line and environment configuration.
//!
//! Precedence: built-in defaults, then `READING_*` environment variables,
//! then flags.

use std::fmt;
use std::path::PathBuf;

use reading_core::DEFAULT_TIME_BUDGET_SECS;

pub const DEFAULT_DB_URL: &str = "sqlite://reading.sqlite3";
pub const DEFAULT_QUESTIONS_PATH: &str = "data/questions.json";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidBudget { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidBudget { raw } => {
                write!(f, "invalid --budget value (expected seconds > 0): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quiz,
    Report { save: bool },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub command: Command,
    pub db_url: String,
    pub questions_path: PathBuf,
    pub budget_secs: u32,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_budget(raw: String) -> Result<u32, ArgsError> {
    match raw.trim().parse::<u32>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ArgsError::InvalidBudget { raw }),
    }
}

impl Settings {
    /// Parse settings from process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown arguments or invalid values.
    pub fn from_env() -> Result<Self, ArgsError> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Parse settings from `args` (without the program name), reading
    /// environment variables through `env`.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown arguments or invalid values.
    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("READING_DB_URL")
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut questions_path = env("READING_QUESTIONS")
            .map_or_else(|| PathBuf::from(DEFAULT_QUESTIONS_PATH), PathBuf::from);
        let mut budget_secs = match env("READING_TIME_BUDGET") {
            Some(raw) => parse_budget(raw)?,
            None => DEFAULT_TIME_BUDGET_SECS,
        };

        let mut args = args.into_iter().peekable();
        // Default behavior: run the quiz when no subcommand is provided.
        let first = args.peek().cloned();
        let mut command = match first.as_deref() {
            None => Command::Quiz,
            Some(first) if first.starts_with('-') => Command::Quiz,
            Some("quiz") => {
                args.next();
                Command::Quiz
            }
            Some("report") => {
                args.next();
                Command::Report { save: false }
            }
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => {
                    questions_path = require_value(&mut args, "--questions")?.into();
                }
                "--budget" => {
                    budget_secs = parse_budget(require_value(&mut args, "--budget")?)?;
                }
                "--save" if matches!(command, Command::Report { .. }) => {
                    command = Command::Report { save: true };
                }
                "--help" | "-h" => command = Command::Help,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command,
            db_url,
            questions_path,
            budget_secs,
        })
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [quiz] [--db <sqlite_url>] [--questions <path>] [--budget <secs>]");
    eprintln!("  cargo run -p app -- report [--save] [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --questions {DEFAULT_QUESTIONS_PATH}");
    eprintln!("  --budget {DEFAULT_TIME_BUDGET_SECS}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  READING_DB_URL, READING_QUESTIONS, READING_TIME_BUDGET, RUST_LOG");
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:")
    {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory if missing.
///
/// # Errors
///
/// Returns an error if the URL is not a file URL or the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Settings, ArgsError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Settings::parse(args.iter().map(|a| (*a).to_owned()), |key| env.get(key).cloned())
    }

    #[test]
    fn defaults_to_quiz_with_standard_budget() {
        let settings = parse(&[], &[]).unwrap();
        assert_eq!(settings.command, Command::Quiz);
        assert_eq!(settings.budget_secs, 1_080);
        assert_eq!(settings.db_url, DEFAULT_DB_URL);
        assert_eq!(settings.questions_path, PathBuf::from(DEFAULT_QUESTIONS_PATH));
    }

    #[test]
    fn flags_override_environment() {
        let settings = parse(
            &["quiz", "--budget", "600", "--questions", "set.json"],
            &[("READING_TIME_BUDGET", "900"), ("READING_QUESTIONS", "env.json")],
        )
        .unwrap();
        assert_eq!(settings.budget_secs, 600);
        assert_eq!(settings.questions_path, PathBuf::from("set.json"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = parse(&[], &[("READING_TIME_BUDGET", "900")]).unwrap();
        assert_eq!(settings.budget_secs, 900);
    }

    #[test]
    fn report_accepts_save_flag() {
        let settings = parse(&["report", "--save"], &[]).unwrap();
        assert_eq!(settings.command, Command::Report { save: true });
        assert!(matches!(
            parse(&["quiz", "--save"], &[]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse(&["--budget", "0"], &[]),
            Err(ArgsError::InvalidBudget { .. })
        ));
        assert!(matches!(
            parse(&["--db"], &[]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(
            parse(&["play"], &[]),
            Err(ArgsError::UnknownCommand(_))
        ));
    }

    #[test]
    fn shared_memory_urls_pass_through() {
        let url = "sqlite:file:memdb_app?mode=memory&cache=shared".to_owned();
        assert_eq!(normalize_sqlite_url(url.clone()), url);
        assert!(prepare_sqlite_file(&url).is_ok());
    }
}
