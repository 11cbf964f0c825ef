//! `dsa` command-line front end
//!
//! Runs analyzer requests against a JSON fixture file and prints the
//! responses as JSON. `serve` reads one request per line from stdin and
//! writes one response per line to stdout.
//!
//! Usage:
//!   dsa analyze -f page.json --policy extended
//!   dsa find-variables -f page.json --hex '#ff0000'
//!   dsa replace-color -f page.json --hex '#ff0000' --key 4f2a... --write
//!   dsa serve -f page.json < requests.jsonl

mod fixture;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dsa_core::analysis::{
    AnalysisConfig, ComponentPolicy, IssueSeverity, LintConfig, ResolutionPolicy,
};
use dsa_core::document::{MemoryDocument, MemoryPreferences, MemoryVariableStore, NodeId};
use dsa_core::protocol::{BindPayload, ColorPayload, CreatePayload};
use dsa_core::{Request, RequestHandler, ResolverConfig, Response};
use fixture::Fixture;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type Handler = RequestHandler<MemoryDocument, MemoryVariableStore, MemoryPreferences>;

/// Design-system consistency analyzer.
#[derive(Parser, Debug)]
#[command(name = "dsa", version)]
#[command(about = "Analyze design documents for style and component consistency")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Fixture file holding the document, variables, and preferences
    #[arg(long, short = 'f', global = true, default_value = "document.json")]
    fixture: PathBuf,

    /// Node ids to select instead of the fixture's selection
    #[arg(long, global = true)]
    select: Vec<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(flatten)]
    analysis: AnalysisArgs,
}

#[derive(clap::Args, Debug)]
struct AnalysisArgs {
    /// Node kinds recorded as components
    #[arg(long, global = true, value_enum, default_value_t = PolicyArg::Minimal)]
    policy: PolicyArg,

    /// Resolve bound variables after traversal instead of per node
    #[arg(long, global = true)]
    deferred: bool,

    /// Count solid strokes in the color index
    #[arg(long, global = true)]
    strokes: bool,

    /// Lowest severity to report (info, low, medium, high)
    #[arg(long, global = true, default_value = "info")]
    min_severity: IssueSeverity,

    /// Stop reporting after this many findings (0 = unlimited)
    #[arg(long, global = true, default_value_t = 0)]
    max_issues: usize,

    /// Rule ids to skip
    #[arg(long = "disable", global = true)]
    disabled_rules: Vec<String>,

    /// Drop whole-selection findings
    #[arg(long, global = true)]
    no_summary: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Minimal,
    Extended,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze the selection
    Analyze,
    /// List color variables matching a color
    FindVariables {
        #[arg(long)]
        hex: String,
        /// Per-channel match tolerance
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Create a color variable for a color
    CreateVariable {
        #[arg(long)]
        hex: String,
        /// Collection name to create the variable in
        #[arg(long)]
        collection: Option<String>,
        /// Save the updated variables back to the fixture
        #[arg(long)]
        write: bool,
    },
    /// Bind every exact-match solid fill in the selection to a variable
    ReplaceColor {
        #[arg(long)]
        hex: String,
        /// Variable key, local or from a library
        #[arg(long)]
        key: String,
        /// Save the updated document back to the fixture
        #[arg(long)]
        write: bool,
    },
    /// Answer JSON requests from stdin, one per line
    Serve {
        /// Save state back to the fixture on exit
        #[arg(long)]
        write: bool,
    },
}

impl AnalysisArgs {
    fn config(&self) -> AnalysisConfig {
        let policy = match self.policy {
            PolicyArg::Minimal => ComponentPolicy::Minimal,
            PolicyArg::Extended => ComponentPolicy::Extended,
        };
        let resolution = if self.deferred {
            ResolutionPolicy::Deferred
        } else {
            ResolutionPolicy::Inline
        };
        let lint = LintConfig::default()
            .with_min_severity(self.min_severity)
            .with_max_issues(self.max_issues)
            .with_disabled_rules(self.disabled_rules.iter().cloned())
            .with_summary_rules(!self.no_summary);

        AnalysisConfig::default()
            .with_component_policy(policy)
            .with_resolution(resolution)
            .with_strokes(self.strokes)
            .with_lint(lint)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print(responses: &[Response], pretty: bool, out: &mut impl Write) -> Result<()> {
    for response in responses {
        let line = if pretty {
            serde_json::to_string_pretty(response)?
        } else {
            serde_json::to_string(response)?
        };
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn save(handler: Handler, path: &std::path::Path) -> Result<()> {
    let (document, store, prefs) = handler.into_parts();
    Fixture::from_parts(document, &store, &prefs).save(path)?;
    info!(path = %path.display(), "fixture saved");
    Ok(())
}

async fn serve(handler: &mut Handler, pretty: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let responses = handler.handle_json(&line).await;
        print(&responses, pretty, &mut stdout)?;
        stdout.flush()?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    debug!(?cli, "parsed arguments");

    let (mut document, store, prefs) = Fixture::load(&cli.fixture)?.into_parts();
    if !cli.select.is_empty() {
        document.selection = cli.select.iter().map(|id| NodeId::new(id.as_str())).collect();
    }

    let mut resolver = ResolverConfig::default();
    if let Command::FindVariables {
        tolerance: Some(tolerance),
        ..
    } = cli.command
    {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            bail!("Tolerance must be a positive number, got {tolerance}");
        }
        resolver = resolver.with_tolerance(tolerance);
    }

    let mut handler = RequestHandler::new(document, store, prefs)
        .with_analysis_config(cli.analysis.config())
        .with_resolver_config(resolver);

    let (request, write) = match cli.command {
        Command::Analyze => (Request::AnalyzeDesignSystem, false),
        Command::FindVariables { hex, .. } => (
            Request::FindVariables {
                data: ColorPayload { hex },
            },
            false,
        ),
        Command::CreateVariable {
            hex,
            collection,
            write,
        } => (
            Request::CreateVariable {
                data: CreatePayload { hex, collection },
            },
            write,
        ),
        Command::ReplaceColor { hex, key, write } => (
            Request::ReplaceColor {
                data: BindPayload {
                    hex,
                    variable_key: key,
                },
            },
            write,
        ),
        Command::Serve { write } => {
            serve(&mut handler, cli.pretty).await?;
            if write {
                save(handler, &cli.fixture)?;
            }
            return Ok(());
        }
    };

    let responses = handler.handle(request).await;
    print(&responses, cli.pretty, &mut io::stdout().lock())?;

    if responses.iter().any(Response::is_error) {
        std::process::exit(1);
    }
    if write {
        save(handler, &cli.fixture)?;
    }
    Ok(())
}
