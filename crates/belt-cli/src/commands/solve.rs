//! `belt solve`: generate, solve and print a balancer.

use std::io::Write;

use anyhow::{bail, Context, Result};
use tabwriter::TabWriter;
use tracing::info;

use belt_algo::{design, verify, BeltGraph};
use belt_cli::cli::{OutputFormat, SolveArgs};
use belt_cli::config::{resolve_balancer, resolve_solver, FileConfig};

pub fn handle(args: &SolveArgs) -> Result<()> {
    let file = FileConfig::for_args(&args.balancer)?;
    let config = resolve_balancer(&file, &args.balancer);
    let solver = resolve_solver(&file, args)?;
    info!(%config, solver = %solver.solver, timeout = ?solver.timeout_seconds, "solving balancer");

    let run = design(&config, &solver).with_context(|| format!("designing balancer ({config})"))?;

    let rendered = render(&run.graph, args.format)?;
    print!("{rendered}");

    if let Some(path) = &args.out {
        std::fs::write(path, &rendered)
            .with_context(|| format!("writing result to {}", path.display()))?;
        println!("Wrote result to {}", path.display());
    }

    if args.verify {
        let report = verify(&run.model, &run.outcome.assignment, args.tolerance)
            .context("verifying solved assignment")?;
        eprintln!("{report}");
        if !report.is_ok() {
            bail!(
                "solution violates the model by up to {:e}",
                report.max_violation()
            );
        }
    }
    Ok(())
}

fn render(graph: &BeltGraph, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!("{graph}\n")),
        OutputFormat::Json => {
            let json = graph.to_json().context("serializing belt graph to JSON")?;
            Ok(format!("{json}\n"))
        }
        OutputFormat::Table => render_table(graph),
    }
}

fn render_table(graph: &BeltGraph) -> Result<String> {
    let mut buf = Vec::new();
    let mut writer = TabWriter::new(&mut buf);
    writeln!(writer, "FROM\tTO\tVOLUME\tCARGO")?;
    for conn in &graph.connections {
        let mix = conn
            .cargo
            .iter()
            .map(|share| format!("{}={:.4}", share.cargo, share.amount))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            writer,
            "{}\t{}\t{:.8}\t{}",
            conn.producer, conn.consumer, conn.volume, mix
        )?;
    }
    writer.flush()?;
    drop(writer);
    let table = String::from_utf8(buf).context("table output is not UTF-8")?;
    Ok(format!(
        "{table}Objective: {:.8} ({}), {} splitter(s) in use\n",
        graph.objective,
        graph.status,
        graph.splitters.len()
    ))
}
