//! # rdeploy_runner
//!
//! Rancher CLI execution wrapper for rancher-deploy.
//!
//! # Features
//!
//! - **CLI Discovery**: Finds `rancher` next to the executable or on `PATH`
//! - **Connection Check**: Verifies the configured server and environment
//! - **Sequential Upgrades**: One `rancher up` per stack, in manifest order
//! - **Dry-Run Mode**: Print commands without executing
//! - **Mock Orchestrator**: For testing without the Rancher CLI
//!
//! # Example
//!
//! ```rust,no_run
//! use rdeploy_manifest::{HttpFetcher, ManifestReader, TempFiles};
//! use rdeploy_runner::{DeployOptions, Deployer, RancherCli};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::new();
//!     let mut temp_files = TempFiles::new();
//!     let manifest = ManifestReader::new(&fetcher).read("deploy.yml", &mut temp_files)?;
//!
//!     let cli = RancherCli::locate()?;
//!     let deployer = Deployer::new(&cli, DeployOptions::new().force(true));
//!     deployer.check_connection(&manifest)?;
//!     deployer.deploy_all(&manifest)?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod deploy;
pub mod error;
pub mod mock;
pub mod runner;

pub use cli::RancherCli;
pub use deploy::{DeployOptions, Deployer};
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockOrchestrator};
pub use runner::{Orchestrator, UpInvocation, BATCH_SIZE};
