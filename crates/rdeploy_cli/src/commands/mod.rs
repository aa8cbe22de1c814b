//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

pub mod deploy;

/// rancher-deploy - Rancher deployment tool
#[derive(Parser, Debug)]
#[command(name = "rancher-deploy")]
#[command(version, about = "Rancher deployment tool")]
#[command(long_about = r#"
Deploys the stacks listed in a manifest to a Rancher environment.

Every compose document is checked for the variables it references before
anything is deployed. Stacks are then upgraded one at a time, in manifest
order, with `rancher up`.

EXIT CODES:
  0 - Success
  1 - Validation or deployment failure
  2 - Invalid arguments
"#)]
pub struct Cli {
    /// The deployment config file
    #[arg(value_name = "config.yml")]
    pub config_file: PathBuf,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Force the deployment, even if there are no changes on the stack definition
    #[arg(short, long)]
    pub force: bool,

    /// Validate the manifest and print the commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the rancher cli (default: next to this executable, then PATH)
    #[arg(long, env = "RANCHER_CLI", value_name = "PATH")]
    pub rancher_cli: Option<PathBuf>,
}
