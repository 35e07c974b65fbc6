//! yconf command-line tool for checking, querying, and transcoding yconf files.
//!
//! Usage: yconf [OPTIONS] [FILE|DIR|-]
//!
//! Options:
//!   -f, --from <FORMAT>    Input format (conf, yaml) [default: conf]
//!   -t, --to <FORMAT>      Output format (conf, json, yaml, toml) [default: conf]
//!   -k, --key <PATH>       Print only the value at PATH
//!       --sep <SEP>        Path separator for --key [default: .]
//!   -w, --write            Write output to file with inferred name
//!   -o, --output <FILE>    Write output to specified file
//!       --check            Check if input is valid (exit 0 if valid, 1 if invalid)
//!   -v, --verbose          Trace includes and document splits on stderr
//!   -h, --help             Print help
//!   -V, --version          Print version
//!
//! A directory input processes every `.conf` file in it.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use libyconf::{encode, load_file, merge, parse, Format, Tree, DEFAULT_SEPARATOR};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod transcode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Conf,
    #[value(alias = "yml")]
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Conf,
    Json,
    #[value(alias = "yml")]
    Yaml,
    Toml,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Conf => "conf",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Toml => "toml",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "yconf", version, about = "Check, query, and transcode yconf files")]
struct Cli {
    /// Input file or directory (stdin when absent or `-`)
    input: Option<PathBuf>,

    /// Input format
    #[arg(short = 'f', long, value_enum, default_value_t = InputFormat::Conf)]
    from: InputFormat,

    /// Output format
    #[arg(short = 't', long, value_enum, default_value_t = OutputFormat::Conf)]
    to: OutputFormat,

    /// Print only the value at PATH
    #[arg(short = 'k', long, value_name = "PATH")]
    key: Option<String>,

    /// Path separator for --key
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    sep: String,

    /// Write output to file with inferred name
    #[arg(short = 'w', long, conflicts_with = "output")]
    write: bool,

    /// Write output to specified file
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Check if input is valid (exit 0 if valid, 1 if invalid)
    #[arg(long)]
    check: bool,

    /// Trace includes and document splits on stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Returns whether every input was valid.
fn run(cli: &Cli) -> Result<bool> {
    let input = cli.input.as_deref().filter(|p| *p != Path::new("-"));

    match input {
        Some(path) if path.is_dir() => {
            if cli.output.is_some() {
                bail!("--output cannot be used with directory input");
            }
            process_directory(path, cli)
        }
        _ => process_input(input, cli),
    }
}

fn process_directory(dir: &Path, cli: &Cli) -> Result<bool> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "conf").unwrap_or(false))
        .collect();
    paths.sort();

    let mut all_ok = true;
    for path in &paths {
        debug!(path = %path.display(), "processing");
        all_ok &= process_input(Some(path.as_path()), cli)?;
    }
    Ok(all_ok)
}

/// Load, select, and write one input. Invalid input is reported on stderr
/// and yields `false`; failures to read or write are errors.
fn process_input(input_file: Option<&Path>, cli: &Cli) -> Result<bool> {
    let loaded = match (cli.from, input_file) {
        (InputFormat::Conf, Some(path)) => load_file(path)
            .map(|documents| merge(&documents))
            .map_err(|e| e.to_string()),
        (InputFormat::Conf, None) => parse(&read_input(None)?)
            .map(|documents| merge(&documents))
            .map_err(|e| e.to_string()),
        (InputFormat::Yaml, _) => transcode::yaml::decode(&read_input(input_file)?).map(Tree::new),
    };

    let tree = match loaded {
        Ok(tree) => tree.use_sep(&cli.sep),
        Err(e) => {
            match input_file {
                Some(path) => eprintln!("{}: {}", path.display(), e),
                None => eprintln!("Parse error: {}", e),
            }
            return Ok(false);
        }
    };

    if cli.check {
        match input_file {
            Some(path) => println!("{}: ok", path.display()),
            None => println!("ok"),
        }
        return Ok(true);
    }

    let selected = match &cli.key {
        Some(key) if tree.get(key).is_none() => {
            eprintln!("Error: no value at {}", key);
            return Ok(false);
        }
        Some(key) => tree.get_tree(key),
        None => tree,
    };

    let output = match cli.to {
        OutputFormat::Conf => match selected.export() {
            Ok(output) => output,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(false);
            }
        },
        OutputFormat::Json => encode(selected.root(), Format::JsonPretty),
        OutputFormat::Yaml => match transcode::yaml::encode(selected.root()) {
            Ok(output) => output,
            Err(e) => {
                eprintln!("Error: Cannot convert to YAML: {}", e);
                return Ok(false);
            }
        },
        OutputFormat::Toml => match transcode::toml::encode(selected.root()) {
            Ok(output) => output,
            Err(e) => {
                eprintln!("Error: Cannot convert to TOML: {}", e);
                return Ok(false);
            }
        },
    };

    write_text_output(&output, cli, input_file)?;
    Ok(true)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
    }
}

fn write_text_output(output: &str, cli: &Cli, input_file: Option<&Path>) -> Result<()> {
    let target = match (&cli.output, cli.write, input_file) {
        (Some(path), _, _) => Some(path.clone()),
        (None, true, Some(input)) => Some(input.with_extension(cli.to.extension())),
        (None, true, None) => bail!("--write requires an input file"),
        (None, false, _) => None,
    };

    match target {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            print!("{}", output);
            // Ensure output ends with newline
            if !output.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}
