//! Build script for ipenforcer-cli.
//!
//! Renders the man page with clap_mangen into OUT_DIR.
//!
//! Build scripts cannot depend on the crate being built, so the command
//! structure is declared here as well.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// Keep this structure synchronized with src/cli.rs.
fn build_cli() -> Command {
    Command::new("ipenforcer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Enforce the managed external IP policy")
        .long_about(
            "Releases every external IP address reserved in the enforced projects, \
             deleting the forwarding rule, instance or router that uses it first",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file (defaults to ./ipenforcer.yaml when present)")
                .value_name("PATH")
                .global(true)
                .env("IPENFORCER_CONFIG"),
        )
        .arg(
            Arg::new("host-project")
                .long("host-project")
                .help("Host project the job runs on behalf of")
                .value_name("PROJECT_ID")
                .global(true)
                .env("IPENFORCER_HOST_PROJECT"),
        )
        .subcommands(vec![
            Command::new("run")
                .about("Release every external address in the selected projects")
                .long_about(
                    "Delete consumers and release external addresses, then print a report",
                ),
            Command::new("plan")
                .about("Show what a run would delete in a project")
                .long_about("List external addresses with the deletes a run would issue"),
            Command::new("projects")
                .about("List the projects a run would enforce")
                .long_about("Resolve the host project's profile and apply the exclusion list"),
            Command::new("validate")
                .about("Validate a configuration file")
                .long_about("Check an ipenforcer configuration file for errors"),
        ])
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(
        std::env::var_os("OUT_DIR")
            .ok_or_else(|| std::io::Error::other("OUT_DIR is not set"))?,
    );
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let mut buffer = Vec::new();
    Man::new(build_cli()).render(&mut buffer)?;
    fs::write(man_dir.join("ipenforcer.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
