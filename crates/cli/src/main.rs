//! `dag-integrity` CLI entry-point.
//!
//! Available sub-commands:
//! - `check`    — import every declaration in a directory and run the
//!   integrity rules (`--json` prints the whole report).
//! - `topology` — print one graph's topology as JSON.
//! - `order`    — print one graph's execution order.

mod loader;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use integrity::{
    topology, validate_import_sources, ImportReport, IntegrityPolicy, IntegrityReport,
    IntegrityValidator,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "dag-integrity",
    about = "Build workflow graphs from declarations and check their integrity",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import all declarations and report failures and violations.
    Check {
        /// Directory holding `*.json` graph declarations.
        #[arg(default_value = "dags")]
        dags_dir: PathBuf,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Print the full report as JSON instead of one line per result.
        #[arg(long)]
        json: bool,
    },
    /// Print a graph's topology as JSON.
    Topology {
        dags_dir: PathBuf,
        dag_id: String,
    },
    /// Print a graph's tasks in execution order.
    Order {
        dags_dir: PathBuf,
        dag_id: String,
    },
}

#[derive(Args)]
struct PolicyArgs {
    /// JSON policy file; omitted fields keep their defaults.
    #[arg(long)]
    policy: Option<PathBuf>,
    /// Allowed owners; replaces the policy's list.
    #[arg(long = "owner", env = "DAG_VALID_OWNERS", value_delimiter = ',')]
    owners: Vec<String>,
    /// Allowed notification targets; replaces the policy's list.
    #[arg(long = "email", env = "DAG_VALID_EMAILS", value_delimiter = ',')]
    emails: Vec<String>,
    /// Address every graph's default email must include.
    #[arg(long, env = "DAG_ALERT_EMAIL", value_name = "ADDR")]
    alert_email: Option<String>,
    /// Don't require an alert address at all.
    #[arg(long, conflicts_with = "alert_email")]
    no_alert_email: bool,
}

impl PolicyArgs {
    fn load(self) -> Result<IntegrityPolicy> {
        let mut policy = match &self.policy {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read policy {}", path.display()))?;
                IntegrityPolicy::from_json(&content)
                    .with_context(|| format!("invalid policy {}", path.display()))?
            }
            None => IntegrityPolicy::default(),
        };

        if !self.owners.is_empty() {
            policy = policy.with_owners(self.owners);
        }
        if !self.emails.is_empty() {
            policy = policy.with_targets(self.emails);
        }
        if self.no_alert_email {
            policy = policy.with_required_alert_target(None);
        } else if self.alert_email.is_some() {
            policy = policy.with_required_alert_target(self.alert_email);
        }
        Ok(policy)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check {
            dags_dir,
            policy,
            json,
        } => {
            let validator = IntegrityValidator::new(policy.load()?);
            let sources = loader::load_sources(&dags_dir)?;
            info!("Checking {} declaration(s) in {}", sources.len(), dags_dir.display());

            let report = validator.check_sources(sources);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            if !report.is_clean() {
                std::process::exit(1);
            }
        }
        Command::Topology { dags_dir, dag_id } => {
            let report = import(&dags_dir)?;
            let dag = find(&report, &dag_id)?;
            println!("{}", serde_json::to_string_pretty(&topology(dag))?);
        }
        Command::Order { dags_dir, dag_id } => {
            let report = import(&dags_dir)?;
            let dag = find(&report, &dag_id)?;
            for task_id in dag.topological_order() {
                println!("{task_id}");
            }
        }
    }

    Ok(())
}

fn print_report(report: &IntegrityReport) {
    for failure in &report.import.failures {
        eprintln!("❌ Import failed: {}: {}", failure.origin, failure.error);
    }
    for (dag_id, violations) in &report.violations {
        if violations.is_empty() {
            println!("✅ {dag_id}");
        }
        for violation in violations {
            eprintln!("❌ {violation}");
        }
    }
}

fn import(dags_dir: &Path) -> Result<ImportReport> {
    let report = validate_import_sources(loader::load_sources(dags_dir)?);
    for failure in &report.failures {
        eprintln!("⚠️  Skipped {}: {}", failure.origin, failure.error);
    }
    Ok(report)
}

fn find<'a>(report: &'a ImportReport, dag_id: &str) -> Result<&'a taskgraph::Dag> {
    match report.registry.get(dag_id) {
        Some(dag) => Ok(dag),
        None => bail!("graph '{dag_id}' not found (loaded: {:?})", report.registry.dag_ids()),
    }
}
