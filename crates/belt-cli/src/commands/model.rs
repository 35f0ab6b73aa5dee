//! `belt model`: generate without solving.

use anyhow::{Context, Result};
use tracing::info;

use belt_algo::export::{dump, write_lp, ModelSummary};
use belt_algo::BalancerModel;
use belt_cli::cli::ModelArgs;
use belt_cli::config::{resolve_balancer, FileConfig};

pub fn handle(args: &ModelArgs) -> Result<()> {
    let file = FileConfig::for_args(&args.balancer)?;
    let config = resolve_balancer(&file, &args.balancer);
    info!(%config, "building model");

    let model = BalancerModel::build(&config).context("building balancer model")?;

    if args.full {
        print!("{}", dump(&model));
    } else {
        println!("{}", ModelSummary::of(&model));
    }

    if let Some(path) = &args.lp {
        write_lp(&model, path)
            .with_context(|| format!("writing LP model to {}", path.display()))?;
        println!("Wrote LP model to {}", path.display());
    }
    Ok(())
}
