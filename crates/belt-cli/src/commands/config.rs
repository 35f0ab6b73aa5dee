//! `belt config`: write and inspect configuration files.

use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

use belt_cli::cli::BalancerArgs;
use belt_cli::config::{resolve_balancer, FileConfig};

pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite it", path.display());
    }
    FileConfig::default().save_to(path)?;
    info!(path = %path.display(), "wrote default configuration");
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

pub fn show(args: &BalancerArgs) -> Result<()> {
    let file = FileConfig::for_args(args)?;
    let resolved = FileConfig {
        balancer: resolve_balancer(&file, args),
        solver: file.solver,
    };
    print!("{}", resolved.to_toml()?);
    Ok(())
}
