//! btedit - behaviour tree editor core tools.
//!
//! - `btedit verify <dir>` - verify every tree in a collection directory
//! - `btedit roles <file>` - check (or apply) role propagation on one tree

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use bt_model::Registry;
use bt_verify::{propagate_roles, PropagationMode, Verifier};

mod loader;

#[derive(Parser)]
#[command(name = "btedit")]
#[command(about = "Behaviour tree verification and role propagation", version)]
struct Cli {
    /// Node type catalogue file
    #[arg(short, long, global = true, default_value = "config/node_types.json")]
    catalogue: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify every tree in a collection directory
    Verify {
        /// Directory holding keeper/ roles/ tactics/ strategies/
        dir: PathBuf,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute role propagation for one tree file
    Roles {
        /// The tree file to check
        file: PathBuf,

        /// Write the computed ROLE values back into the file
        #[arg(long)]
        apply: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let registry = loader::load_registry(&cli.catalogue)?;

    match cli.command {
        Commands::Verify { dir, json } => run_verify(&registry, &dir, json),
        Commands::Roles { file, apply } => run_roles(&registry, &file, apply),
    }
}

fn run_verify(registry: &Registry, dir: &Path, json: bool) -> Result<()> {
    let collection = loader::load_collection(dir, registry)?;
    let verifier = Verifier::new(registry);
    let reports = verifier.verify_all(&collection);
    let failed = reports.iter().filter(|(_, _, r)| !r.passed).count();

    if json {
        let rows: Vec<_> = reports
            .iter()
            .map(|(category, name, report)| {
                serde_json::json!({
                    "category": category,
                    "name": name,
                    "report": report,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for (category, name, report) in &reports {
            let status = if report.passed { "ok  " } else { "FAIL" };
            println!("{status} {category}/{name}");
            for finding in &report.findings {
                println!("     [{:?}] {}", finding.kind, finding.message);
            }
        }
        println!("{} trees verified, {} failed", reports.len(), failed);
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_roles(registry: &Registry, file: &Path, apply: bool) -> Result<()> {
    let mut tree = loader::load_tree(file, registry)?;
    let mode = if apply {
        PropagationMode::AutoUpdate
    } else {
        PropagationMode::ReadOnly
    };

    let Some(result) = propagate_roles(&mut tree, mode) else {
        anyhow::bail!(
            "tree {} has no unique root; fix its structure before propagating roles",
            tree.name
        );
    };

    for mismatch in &result.mismatches {
        println!(
            "node {}: missing inherited ROLE {}",
            mismatch.node, mismatch.expected
        );
    }

    if apply {
        if result.changed.is_empty() {
            println!("roles already consistent, nothing written");
        } else {
            loader::save_tree(&tree, file)?;
            println!("updated {} node(s) in {}", result.changed.len(), file.display());
        }
    } else if result.mismatches.is_empty() {
        println!("roles consistent across {} node(s)", tree.len());
    }

    Ok(())
}
