//! `undelete`: restore the most recently deleted policy, or a specific one by id.
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use policy_undelete::api::errors::UndeleteError;
use policy_undelete::config::{Config, PartialFailurePolicy};
use policy_undelete::logging::LogSink;
use policy_undelete::types::{Listing, UndoId};
use policy_undelete::Undeleter;

#[derive(Parser, Debug)]
#[command(name = "undelete")]
#[command(about = "Undo the deletion of a policy or policy group")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Undo record to restore; defaults to the most recent one
    id: Option<String>,
    /// List restorable records, newest first
    #[arg(long, conflicts_with = "id")]
    list: bool,
    /// Undo log location
    #[arg(long, env = "UNDELETE_LOG_PATH")]
    log_path: Option<PathBuf>,
    /// Policy server base URL, including the organization
    #[arg(long, env = "UNDELETE_SERVER_URL")]
    server_url: Option<String>,
    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Extra request header, as NAME:VALUE (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,
    /// How long to wait for a concurrent invocation to release the log
    #[arg(long)]
    lock_timeout_ms: Option<u64>,
    /// Records kept in the undo log
    #[arg(long)]
    max_records: Option<usize>,
    /// Revisions sent in parallel while restoring one record
    #[arg(long)]
    concurrency: Option<usize>,
    /// Drop the record even when some of its revisions failed to restore
    #[arg(long)]
    consume_on_partial_failure: bool,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME:VALUE, got '{s}'")),
    }
}

impl Cli {
    fn config(&self) -> Config {
        let mut cfg = Config::default();
        if let Some(p) = &self.log_path {
            cfg.store.log_path.clone_from(p);
        }
        if let Some(ms) = self.lock_timeout_ms {
            cfg.store.lock_timeout_ms = ms;
        }
        if let Some(n) = self.max_records {
            cfg.store.max_records = Some(n);
        }
        if let Some(n) = self.concurrency {
            cfg.replay.concurrency = n;
        }
        if self.consume_on_partial_failure {
            cfg.replay.partial_failure = PartialFailurePolicy::Consume;
        }
        cfg.server.base_url.clone_from(&self.server_url);
        if let Some(ms) = self.timeout_ms {
            cfg.server.timeout_ms = ms;
        }
        cfg.server.headers.clone_from(&self.headers);
        cfg
    }

    fn target(&self) -> Result<Option<UndoId>, UndeleteError> {
        self.id
            .as_deref()
            .map(|s| {
                s.parse::<UndoId>()
                    .map_err(|_| UndeleteError::UnknownId(s.to_string()))
            })
            .transpose()
    }
}

fn exit_with(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn report_error(e: &UndeleteError) {
    eprintln!("undelete: {e}");
    if let Some(report) = e.partial_report() {
        for unit in &report.failed {
            eprintln!("  {}: {}", unit.revision, unit.reason);
        }
        if !report.consumed {
            eprintln!("record {} was kept; run again to retry", report.record_id);
        }
    }
}

fn run(cli: &Cli) -> Result<(), UndeleteError> {
    let target = cli.target()?;
    let mut undeleter = Undeleter::builder(LogSink, LogSink, cli.config()).build()?;
    if cli.list {
        match undeleter.list() {
            Listing::NothingToUndo => eprintln!("Nothing to undo."),
            listing => {
                for line in listing.lines() {
                    println!("{line}");
                }
            }
        }
        return Ok(());
    }
    let report = undeleter.run(target.as_ref())?;
    for unit in &report.restored {
        println!("Restored policy '{}'", unit.policy_name);
    }
    if let Some(group) = &report.policy_group {
        println!("Restored policy group '{group}'");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            exit_with(e.exit_code())
        }
    }
}
