mod debug_report;

use chrono::NaiveDate;
use consent_facts::{Context, Options, Segment, extract_verbose_with};
use std::io::{self, IsTerminal, Read};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CONSENT_FACTS_LOG";

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn run(config: &CliConfig) -> consent_facts::Result<()> {
    let segments: Vec<Segment> = serde_json::from_str(&config.input)?;
    let ctx = match config.reference_date {
        Some(reference_date) => Context { reference_date },
        None => Context::default(),
    };

    let res = extract_verbose_with(&segments, &ctx, &Options::default())?;
    if config.json {
        println!("{}", serde_json::to_string_pretty(&res)?);
    } else {
        debug_report::print_run(&config.source, &res.report, &res.details, config.color);
    }
    Ok(())
}

struct CliConfig {
    /// File name, or `<stdin>`.
    source: String,
    input: String,
    reference_date: Option<NaiveDate>,
    color: bool,
    json: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut path: Option<String> = None;
    let mut reference_date = None;
    let mut color = io::stdout().is_terminal();
    let mut json = false;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("consent-facts {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--reference" => {
                let value = args.next().ok_or_else(|| "error: --reference expects a value".to_string())?;
                reference_date = Some(parse_reference(&value)?);
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                set_path(&mut path, value)?;
            }
            _ if arg.starts_with("--reference=") => {
                let value = arg.trim_start_matches("--reference=");
                reference_date = Some(parse_reference(value)?);
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                set_path(&mut path, value.to_string())?;
            }
            _ if arg.starts_with('-') && arg != "-" => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => set_path(&mut path, arg)?,
        }
    }

    let (source, input) = match path.as_deref() {
        None | Some("-") => ("<stdin>".to_string(), read_stdin_input()?),
        Some(file) => {
            let input =
                std::fs::read_to_string(file).map_err(|err| format!("error: failed to read '{file}': {err}"))?;
            (file.to_string(), input)
        }
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { source, input, reference_date, color, json })
}

fn set_path(path: &mut Option<String>, value: String) -> Result<(), String> {
    if path.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *path = Some(value);
    Ok(())
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_reference(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("error: invalid --reference '{value}' (expected YYYY-MM-DD)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "consent-facts {version}

Fact extraction over annotated consent and privacy-policy documents.

Reads a JSON array of segments ({{\"id\", \"tag\", \"text\", \"sentences\"}}),
each sentence a list of tokens ({{\"form\", \"lemma\", \"space_after\", \"tags\"}}).

Usage:
  consent-facts [OPTIONS] [<file>]
  consent-facts [OPTIONS] --input <file>
  consent-facts [OPTIONS] < segments.json

Options:
  -i, --input <file>         JSON file to read. '-' or no file reads stdin.
  --reference <date>         Date retention periods are counted from,
                             YYYY-MM-DD. Default: today.
  --json                     Print the report and run details as JSON.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}          Log filter (e.g. debug, consent_facts=trace).
                             Default: warn

Exit codes:
  0  Success.
  1  Extraction failed (malformed input or JSON).
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV
    )
}
