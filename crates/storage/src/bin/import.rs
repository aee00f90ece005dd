use std::fmt;
use std::path::PathBuf;

use storage::import::parse_text;

#[derive(Debug, Clone)]
struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingInput,
    UnknownArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingInput => write!(f, "--input is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut input: Option<PathBuf> = None;
        let mut output = std::env::var("READING_QUESTIONS").ok().map(PathBuf::from);

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--input" | "-i" => {
                    input = Some(require_value(&mut args, "--input")?.into());
                }
                "--output" | "-o" => {
                    output = Some(require_value(&mut args, "--output")?.into());
                }
                "--stdout" => output = None,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            input: input.ok_or(ArgsError::MissingInput)?,
            output,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin import -- --input <dump.txt> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -i, --input <path>        Plain-text question dump to convert");
    eprintln!("  -o, --output <path>       Write the JSON question set here");
    eprintln!("  --stdout                  Print the JSON instead of writing a file");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  READING_QUESTIONS         Default output path");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let raw = tokio::fs::read_to_string(&args.input).await?;
    let set = parse_text(&raw)?;
    let json = serde_json::to_string_pretty(&set)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, json).await?;
            println!(
                "Imported {} questions from {} into {}",
                set.len(),
                args.input.display(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
