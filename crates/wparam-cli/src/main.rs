//! wparam CLI - inspect and edit parameter blobs, run demo models
//!
//! Works on the same JSON the browser UI stores between generation passes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::fs;
use std::path::{Path, PathBuf};
use wparam::{generate, ParameterGroup};

mod config;
mod edit;
mod models;

use config::Config;
use edit::Assignment;
use models::ModelKind;

#[derive(Parser)]
#[command(name = "wparam")]
#[command(about = "Parameter blobs for parametric CAD generators", long_about = None)]
struct Cli {
    /// Settings file (default: ./wparam.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the bundled demo models
    Models,
    /// Write a model's default parameters
    Init {
        model: ModelKind,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a parameter blob as a tree
    Show {
        file: PathBuf,
    },
    /// Print one parameter or group as JSON (dotted paths reach nested groups)
    Get {
        file: PathBuf,
        path: String,
    },
    /// Assign values, e.g. `length=100 holes.dia=8`
    Set {
        file: PathBuf,
        #[arg(required = true)]
        assignments: Vec<Assignment>,
        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report values outside their bounds
    Validate {
        file: PathBuf,
    },
    /// Run a generation pass and print the model's features
    Generate {
        model: ModelKind,
        /// Blob from an earlier pass whose values should be reused
        #[arg(short, long)]
        seed: Option<PathBuf>,
        /// Where to write the resulting blob (default: not written)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        config.level_filter()?
    };
    // Fails only if a logger is already installed.
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    match cli.command {
        Commands::Models => {
            for kind in ModelKind::value_variants() {
                let params = kind.model().parameters();
                let names: Vec<&str> = params.names().collect();
                println!("{:<6} {}", kind.name(), names.join(", "));
            }
        }
        Commands::Init { model, output } => {
            let params = model.model().parameters();
            emit(&params, output.as_deref(), &config)?;
        }
        Commands::Show { file } => {
            let group = read_group(&file)?;
            print!("{group}");
        }
        Commands::Get { file, path } => {
            let group = read_group(&file)?;
            let node = group.lookup(&path)?;
            println!("{}", serde_json::to_string_pretty(node)?);
        }
        Commands::Set {
            file,
            assignments,
            output,
        } => {
            let mut group = read_group(&file)?;
            for assignment in &assignments {
                if let Some(d) = edit::apply(&mut group, assignment)? {
                    eprintln!("skipped {}: {d}", assignment.path);
                }
            }
            emit(&group, Some(output.as_deref().unwrap_or(&file)), &config)?;
        }
        Commands::Validate { file } => {
            let group = read_group(&file)?;
            let issues = group.validate();
            if issues.is_empty() {
                println!("{}: ok", file.display());
            } else {
                for issue in &issues {
                    println!("{issue}");
                }
                anyhow::bail!("{} value(s) out of range", issues.len());
            }
        }
        Commands::Generate {
            model,
            seed,
            output,
        } => {
            let seed = seed
                .map(|path| {
                    fs::read_to_string(&path)
                        .with_context(|| format!("reading seed {}", path.display()))
                })
                .transpose()?;
            let run = generate(model.model(), seed.as_deref())?;
            for d in &run.diagnostics {
                eprintln!("warning: {d}");
            }
            println!("{}", serde_json::to_string_pretty(&run.output)?);
            if let Some(path) = output {
                emit(&run.params, Some(path.as_path()), &config)?;
            }
        }
    }

    Ok(())
}

fn read_group(path: &Path) -> Result<ParameterGroup> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    ParameterGroup::from_json(&json).with_context(|| format!("decoding {}", path.display()))
}

fn emit(group: &ParameterGroup, output: Option<&Path>, config: &Config) -> Result<()> {
    let json = if config.pretty {
        group.dumps_pretty()?
    } else {
        group.dumps()?
    };
    match output {
        Some(path) => {
            fs::write(path, json + "\n").with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.json");
        let compact = Config {
            pretty: false,
            ..Config::default()
        };

        let params = ModelKind::Plate.model().parameters();
        emit(&params, Some(path.as_path()), &compact).unwrap();

        let restored = read_group(&path).unwrap();
        assert_eq!(restored, params);
        assert_eq!(restored.names().count(), 5);
    }

    #[test]
    fn read_group_rejects_single_parameter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        fs::write(&path, r#"{"name":"x","type":"num","value":1}"#).unwrap();
        assert!(read_group(&path).is_err());
    }

    #[test]
    fn cli_parses_assignments() {
        let cli = Cli::try_parse_from(["wparam", "set", "p.json", "length=100", "holes.dia=8"])
            .unwrap();
        match cli.command {
            Commands::Set { assignments, .. } => {
                assert_eq!(assignments.len(), 2);
                assert_eq!(assignments[1].path, "holes.dia");
            }
            _ => panic!("expected set"),
        }
        assert!(Cli::try_parse_from(["wparam", "set", "p.json"]).is_err());
        assert!(Cli::try_parse_from(["wparam", "init", "sphere"]).is_err());
    }
}
