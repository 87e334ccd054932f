//! Showfs CLI - Command line interface
//!
//! Every command runs against the current directory and prints its result as
//! pretty JSON on stdout. Errors go to stderr with a non-zero exit code.

mod config;
mod logging;
mod platform;

use clap::{Parser, Subcommand};
use serde_json::json;
use serde::Serialize;
use showfs_api::{
    parse_assignment, ApiError, ApiResult, BatchFailure, BatchReport, ObjectKind, Session,
    SessionConfig,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};

use crate::config::{load_config, parse_log_level, LogConfig};
use crate::logging::{init_with_file, LogFormat};
use crate::platform::{print_error_with_source, print_json};

const LOG_CLI: &str = "showfs::cli";

#[derive(Parser)]
#[command(
    name = "showfs",
    about = "Query and edit show metadata on the file system",
    version
)]
struct Cli {
    /// Configuration file (default: ./showfs.json when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level: silent, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    log_format: LogFormat,

    /// Also append logs to this file
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an expression from the current directory
    Get {
        #[arg(value_name = "EXPR", default_value = "")]
        expr: String,
    },
    /// Set user metadata; an empty value removes the key
    Set {
        #[arg(short = 'd', long = "data", value_name = "KEY:VALUE", required = true)]
        data: Vec<String>,
        #[arg(value_name = "TARGETS", default_value = ".")]
        targets: Vec<String>,
    },
    /// Print the show root of a target, or create shows
    #[command(args_conflicts_with_subcommands = true)]
    Show {
        #[command(subcommand)]
        action: Option<ShowAction>,
        #[arg(value_name = "TARGET")]
        target: Option<String>,
    },
    /// Print the prototype of targets, list or link prototypes
    #[command(args_conflicts_with_subcommands = true)]
    Proto {
        #[command(subcommand)]
        action: Option<ProtoAction>,
        #[arg(value_name = "TARGETS")]
        targets: Vec<String>,
    },
    /// Create directories (or files) for every generated path
    New {
        /// Create empty files instead of directories
        #[arg(short = 'f', long = "file")]
        file: bool,
        /// Prototype to link instead of the name-matched one
        #[arg(short = 'p', long = "proto", value_name = "PROTO")]
        proto: Option<String>,
        #[arg(value_name = "EXPR")]
        expr: String,
    },
    /// Store a contract pattern on every generated target
    Contract {
        #[arg(short = 'p', long = "pattern", value_name = "PATTERN")]
        pattern: String,
        #[arg(value_name = "EXPR")]
        expr: String,
    },
}

#[derive(Subcommand)]
enum ShowAction {
    /// Create show roots
    New {
        #[arg(value_name = "EXPR")]
        expr: String,
    },
}

#[derive(Subcommand)]
enum ProtoAction {
    /// List prototypes visible from a target
    List {
        #[arg(value_name = "TARGET", default_value = ".")]
        target: String,
    },
    /// Link a target to the nearest prototype called NAME
    Set {
        #[arg(value_name = "TARGET")]
        target: String,
        #[arg(value_name = "NAME")]
        name: String,
    },
}

impl Command {
    /// Expression text the command parses, for error context
    fn source(&self) -> Option<&str> {
        match self {
            Command::Get { expr }
            | Command::New { expr, .. }
            | Command::Contract { expr, .. }
            | Command::Show {
                action: Some(ShowAction::New { expr }),
                ..
            } => Some(expr.as_str()),
            _ => None,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: cannot read current directory: {e}");
            process::exit(1);
        }
    };

    let showfs_config = match load_config(cli.config.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let cli_level = match cli.log_level.as_deref().map(|s| (s, parse_log_level(s))) {
        Some((s, None)) => {
            eprintln!("error: unknown log level '{s}'");
            process::exit(2);
        }
        Some((_, level)) => level,
        None => None,
    };
    let log_config = LogConfig::from_logging(&showfs_config.logging, cli_level);
    if let Err(e) = init_with_file(&log_config, cli.log_format, cli.log_file.as_deref()) {
        eprintln!("error: cannot open log file: {e}");
        process::exit(1);
    }
    debug!(target: LOG_CLI, cwd = %cwd.display(), "starting");

    let session_config = SessionConfig::from_config(&showfs_config, &cwd);
    let mut session = match Session::native(session_config) {
        Ok(s) => s,
        Err(e) => {
            print_error_with_source(&e, None);
            process::exit(1);
        }
    };

    let code = match run(&mut session, &cli.command) {
        Ok(code) => code,
        Err(e) => {
            print_error_with_source(&e, cli.command.source());
            1
        }
    };
    process::exit(code);
}

/// Run one command; the returned exit code is non-zero when a batch
/// recorded failures.
fn run(session: &mut Session, command: &Command) -> ApiResult<i32> {
    match command {
        Command::Get { expr } => {
            let value = session.get(expr)?;
            emit(&value)
        }
        Command::Set { data, targets } => {
            let pairs = data
                .iter()
                .map(|d| parse_assignment(d))
                .collect::<ApiResult<Vec<_>>>()?;
            let mut report = BatchReport::default();
            for target in targets {
                match set_all(session, target, &pairs) {
                    Ok(()) => report.created.push(PathBuf::from(target)),
                    Err(e) => report.fail(PathBuf::from(target), &e),
                }
            }
            emit_report(&report)
        }
        Command::Show { action: None, target } => {
            let root = session.show_root(target.as_deref().unwrap_or("."))?;
            emit(&root)
        }
        Command::Show {
            action: Some(ShowAction::New { expr }),
            ..
        } => {
            let report = session.create_shows(expr)?;
            emit_report(&report)
        }
        Command::Proto { action: None, targets } => {
            let dot = [".".to_string()];
            let targets = if targets.is_empty() { &dot[..] } else { &targets[..] };
            let lookup = lookup_protos(session, targets);
            emit(&lookup)?;
            Ok(if lookup.failed.is_empty() { 0 } else { 1 })
        }
        Command::Proto {
            action: Some(ProtoAction::List { target }),
            ..
        } => {
            let protos = session.list_protos(target)?;
            emit(&protos)
        }
        Command::Proto {
            action: Some(ProtoAction::Set { target, name }),
            ..
        } => {
            let proto = session.link_proto(target, name)?;
            info!(target: LOG_CLI, proto = %proto.display(), "linked");
            emit(&json!({ "target": target, "proto": proto }))
        }
        Command::New { file, proto, expr } => {
            let kind = if *file { ObjectKind::File } else { ObjectKind::Dir };
            let report = session.create_objects(expr, kind, proto.as_deref())?;
            emit_report(&report)
        }
        Command::Contract { pattern, expr } => {
            let report = session.set_contract_pattern(expr, pattern)?;
            emit_report(&report)
        }
    }
}

/// `proto` output: stored reference per target, failures per target
#[derive(Debug, Default, Serialize)]
struct ProtoLookup {
    protos: BTreeMap<String, Option<String>>,
    failed: Vec<BatchFailure>,
}

fn lookup_protos(session: &mut Session, targets: &[String]) -> ProtoLookup {
    let mut lookup = ProtoLookup::default();
    for target in targets {
        match session.proto_of(target) {
            Ok(proto) => {
                lookup.protos.insert(target.clone(), proto);
            }
            Err(e) => lookup.failed.push(BatchFailure {
                path: PathBuf::from(target),
                error: e.to_report(),
            }),
        }
    }
    lookup
}

fn set_all(session: &mut Session, target: &str, pairs: &[(&str, &str)]) -> ApiResult<()> {
    for (key, value) in pairs {
        session.set_meta(target, key, value)?;
    }
    Ok(())
}

fn emit<T: Serialize + ?Sized>(value: &T) -> ApiResult<i32> {
    print_json(value).map_err(|e| ApiError::InvalidArgument(format!("cannot encode result: {e}")))?;
    Ok(0)
}

fn emit_report(report: &BatchReport) -> ApiResult<i32> {
    emit(report)?;
    Ok(if report.is_success() { 0 } else { 1 })
}
