//! sift CLI binary entry point.
//!
//! Loads a binding universe from a JSON file, runs test discovery over a
//! named region or a single type, and prints a JSON report to stdout.
//! Diagnostics go to stderr, so stdout stays machine-readable.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sift_core::progress::NullProgress;
use sift_java::binding::BindingStore;
use sift_java::classify::TestClassifier;
use sift_java::discovery::{DiscoveryError, Scope, TestDiscovery};
use sift_java::markers::TestMarkers;
use sift_java::search::StructuralSearchEngine;

/// Test discovery over Java binding models.
#[derive(Parser)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate the test types reachable from a scope.
    Discover {
        /// Path to the binding universe JSON file
        #[arg(long)]
        universe: PathBuf,

        /// Search a named region
        #[arg(long, conflicts_with = "type_name", required_unless_present = "type_name")]
        region: Option<String>,

        /// Search a single type by qualified name
        #[arg(long = "type", value_name = "QUALIFIED_NAME")]
        type_name: Option<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid universe file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("failed to render report: {0}")]
    Render(#[source] serde_json::Error),
}

/// On-disk universe: the binding store plus optional marker overrides.
#[derive(Deserialize)]
struct UniverseFile {
    #[serde(default)]
    markers: TestMarkers,
    bindings: BindingStore,
}

#[derive(Serialize)]
struct DiscoverReport {
    scope: String,
    count: usize,
    tests: Vec<String>,
}

fn load_universe(path: &Path) -> Result<UniverseFile, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn run_discover(universe_path: &Path, scope: Scope) -> Result<String, CliError> {
    let universe = load_universe(universe_path)?;
    info!(
        path = %universe_path.display(),
        types = universe.bindings.len(),
        "universe loaded"
    );
    let classifier = TestClassifier::new(universe.markers.clone());
    let search = StructuralSearchEngine::new(universe.markers);
    let discovery = TestDiscovery::new(
        &universe.bindings,
        &universe.bindings,
        &classifier,
        &search,
    );

    let tests = discovery.find_tests(&scope, &NullProgress)?;
    info!(scope = %scope, count = tests.len(), "discovery finished");
    let report = DiscoverReport {
        scope: scope.to_string(),
        count: tests.len(),
        tests: tests.into_iter().collect(),
    };
    serde_json::to_string_pretty(&report).map_err(CliError::Render)
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Discover {
            universe,
            region,
            type_name,
        } => {
            let scope = match (region, type_name) {
                (Some(name), None) => Scope::Region(name),
                (None, Some(name)) => Scope::Type(name),
                // clap enforces exactly one of --region/--type.
                _ => {
                    eprintln!("error: exactly one of --region or --type is required");
                    return ExitCode::from(2);
                }
            };
            run_discover(&universe, scope)
        }
    };

    match result {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
