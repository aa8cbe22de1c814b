//! Deploy command - Validate a manifest and roll out its stacks.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use rdeploy_manifest::{HttpFetcher, ManifestReader, RemoteFetcher, ResolvedManifest, TempFiles};
use rdeploy_runner::{DeployOptions, Deployer, Orchestrator, RancherCli};

use super::Cli;

pub fn execute(cli: Cli) -> Result<()> {
    let fetcher = HttpFetcher::new();
    let mut temp_files = TempFiles::new();

    let result = run(&cli, &fetcher, &mut temp_files);

    debug!("Removing {} temporary file(s)", temp_files.len());
    temp_files.close();
    result
}

fn run(cli: &Cli, fetcher: &dyn RemoteFetcher, temp_files: &mut TempFiles) -> Result<()> {
    let manifest = ManifestReader::new(fetcher)
        .read(&cli.config_file, temp_files)
        .with_context(|| format!("Invalid deployment config {}", cli.config_file.display()))?;
    info!(
        "Validated {} stack(s) from {}",
        manifest.stacks.len(),
        cli.config_file.display()
    );

    let rancher = locate_cli(cli)?;
    let options = DeployOptions::new().force(cli.force).dry_run(cli.dry_run);
    deploy(&manifest, &rancher, options)
}

fn locate_cli(cli: &Cli) -> Result<RancherCli> {
    if let Some(path) = &cli.rancher_cli {
        return Ok(RancherCli::new(path));
    }

    match RancherCli::locate() {
        Ok(rancher) => {
            debug!("Using rancher cli {}", rancher.binary().display());
            Ok(rancher)
        }
        Err(e) if cli.dry_run => {
            warn!("{}", e);
            Ok(RancherCli::new(RancherCli::binary_name()))
        }
        Err(e) => Err(e.into()),
    }
}

fn deploy(
    manifest: &ResolvedManifest,
    orchestrator: &dyn Orchestrator,
    options: DeployOptions,
) -> Result<()> {
    let deployer = Deployer::new(orchestrator, options);

    if options.dry_run {
        info!(
            "[DRY-RUN] Skipping connection check for {} on {}",
            manifest.environment, manifest.rancher_url
        );
    } else {
        deployer.check_connection(manifest)?;
    }

    let deployed = deployer.deploy_all(manifest)?;
    if options.dry_run {
        info!("[DRY-RUN] {} stack(s) would be deployed", deployed);
    } else {
        info!("Deployed {} stack(s)", deployed);
    }
    Ok(())
}
