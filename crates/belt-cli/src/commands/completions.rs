//! `belt completions`: shell completion scripts.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap_complete::{generate, Shell};
use tracing::info;

use belt_cli::cli::build_cli_command;

pub fn handle(shell: Shell, out: Option<&Path>) -> Result<()> {
    let script = render(shell);
    let Some(path) = out else {
        return std::io::stdout()
            .lock()
            .write_all(&script)
            .context("writing completions to stdout");
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, &script)
        .with_context(|| format!("writing {shell} completions to {}", path.display()))?;
    info!(%shell, path = %path.display(), bytes = script.len(), "wrote completion script");
    println!("Wrote {shell} completions to {}", path.display());
    Ok(())
}

/// Completion script for `shell`, generated from the command tree.
fn render(shell: Shell) -> Vec<u8> {
    let mut cmd = build_cli_command();
    let name = cmd.get_name().to_string();
    let mut script = Vec::new();
    generate(shell, &mut cmd, name, &mut script);
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_covers_subcommands() {
        let script = String::from_utf8(render(Shell::Bash)).unwrap();
        assert!(script.contains("belt"));
        assert!(script.contains("solve"));
        assert!(script.contains("config"));
    }
}
