//! Configuration file support for the `belt` command line.
//!
//! A config file is TOML with two optional sections:
//!
//! ```toml
//! [balancer]
//! inbound = 4
//! outbound = 4
//! splitters = 4
//!
//! [balancer.big_m]
//! u_x = 2.0
//!
//! [solver]
//! solver = "microlp"
//! timeout_seconds = 120
//! ```
//!
//! Missing keys take their defaults. Command line flags win over the file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use belt_algo::{MipSolverKind, SolverConfig};
use belt_core::BalancerConfig;

use crate::cli::{BalancerArgs, SolveArgs};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub balancer: BalancerConfig,
    pub solver: SolverConfig,
}

impl FileConfig {
    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Render as the TOML accepted by [`FileConfig::load_from`].
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing config")
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .with_context(|| format!("writing config file {}", path.display()))?;
        Ok(())
    }

    /// The file named by `--config`, or defaults.
    pub fn for_args(args: &BalancerArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }
}

/// Balancer layout after applying flag overrides.
pub fn resolve_balancer(file: &FileConfig, args: &BalancerArgs) -> BalancerConfig {
    let mut config = file.balancer.clone();
    if let Some(inbound) = args.inbound {
        config.inbound = inbound;
    }
    if let Some(outbound) = args.outbound {
        config.outbound = outbound;
    }
    if let Some(splitters) = args.splitters {
        config.splitters = splitters;
    }
    if let Some(u_t) = args.u_t {
        config.big_m.u_t = u_t;
    }
    if let Some(u_x) = args.u_x {
        config.big_m.u_x = u_x;
    }
    config
}

/// Solver settings after applying flag overrides.
pub fn resolve_solver(file: &FileConfig, args: &SolveArgs) -> Result<SolverConfig> {
    let mut config = file.solver.clone();
    if let Some(name) = &args.solver {
        config.solver = name
            .parse::<MipSolverKind>()
            .with_context(|| format!("selecting solver '{name}'"))?;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_seconds = Some(timeout);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [balancer]
            inbound = 4

            [solver]
            timeout_seconds = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.balancer.inbound, 4);
        assert_eq!(config.balancer.outbound, 8);
        assert_eq!(config.balancer.big_m.u_x, 2.0);
        assert_eq!(config.solver.solver, MipSolverKind::Microlp);
        assert_eq!(config.solver.timeout_seconds, Some(9));
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[balancer]\ninbound = 3\noutbound = 5\nsplitters = 6").unwrap();

        let args = BalancerArgs {
            config: Some(file.path().to_path_buf()),
            outbound: Some(3),
            u_x: Some(4.0),
            ..Default::default()
        };
        let loaded = FileConfig::for_args(&args).unwrap();
        let config = resolve_balancer(&loaded, &args);
        assert_eq!(config.inbound, 3);
        assert_eq!(config.outbound, 3);
        assert_eq!(config.splitters, 6);
        assert_eq!(config.big_m.u_x, 4.0);
        assert_eq!(config.big_m.u_t, 1.0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("belt.toml");
        let config = FileConfig {
            balancer: BalancerConfig::new(2, 3, 4),
            solver: SolverConfig::default().with_timeout(7),
        };
        config.save_to(&path).unwrap();
        assert_eq!(FileConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_default_file_round_trips_without_timeout() {
        let text = FileConfig::default().to_toml().unwrap();
        assert!(text.contains("[balancer]"));
        assert!(!text.contains("timeout_seconds"));
        let parsed: FileConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, FileConfig::default());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = FileConfig::load_from(Path::new("/nonexistent/belt.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("reading config file"));
    }
}
