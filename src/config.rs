//! Dashboard settings: defaults, optional JSON file, then command-line flags.

use crate::chart::ScaleKind;
use crate::locate::Metric;
use crate::names::AliasTable;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const USAGE: &str = "\
usage: tui-covid [--config FILE] [--feed FILE] [--geometry FILE] [--date M/D/YY] [--daily] [--log-scale]

  --config FILE     JSON settings file
  --feed FILE       confirmed-cases CSV (default data/confirmed.csv)
  --geometry FILE   country polygons GeoJSON (default data/countries.json)
  --date M/D/YY     initial map date (default 1/1/21, else the latest date)
  --daily           chart daily new cases instead of cumulative totals
  --log-scale       logarithmic case axis
  --log FILE        diagnostics log (default tui-covid.log)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub feed_path: PathBuf,
    pub geometry_path: PathBuf,
    pub target_date: String,
    pub metric: Metric,
    pub scale: ScaleKind,
    /// Case count at the dark end of the map gradient
    pub color_max: u64,
    /// Extra geometry-name → feed-name aliases, merged over the built-ins
    pub aliases: BTreeMap<String, String>,
    pub log_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            feed_path: PathBuf::from("data/confirmed.csv"),
            geometry_path: PathBuf::from("data/countries.json"),
            target_date: "1/1/21".to_string(),
            metric: Metric::Cumulative,
            scale: ScaleKind::Linear,
            color_max: 40_000,
            aliases: BTreeMap::new(),
            log_path: PathBuf::from("tui-covid.log"),
        }
    }
}

/// What the command line asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(DashboardConfig),
    Help,
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Built-in aliases plus the configured ones
    pub fn alias_table(&self) -> AliasTable {
        let mut table = AliasTable::builtin();
        table.extend(&self.aliases);
        table
    }

    /// Parse flags (without the program name). `--config` is applied first
    /// so the other flags override the file.
    pub fn from_args<I>(args: I) -> Result<Command>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        let mut config = match args.iter().position(|a| a == "--config") {
            Some(i) => {
                let path = args.get(i + 1).context("--config needs a file")?;
                Self::load(Path::new(path))?
            }
            None => Self::default(),
        };

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--config" => {
                    iter.next();
                }
                "--feed" => config.feed_path = PathBuf::from(value(&mut iter, arg)?),
                "--geometry" => config.geometry_path = PathBuf::from(value(&mut iter, arg)?),
                "--date" => config.target_date = value(&mut iter, arg)?.to_string(),
                "--log" => config.log_path = PathBuf::from(value(&mut iter, arg)?),
                "--daily" => config.metric = Metric::Daily,
                "--log-scale" => config.scale = ScaleKind::Log,
                other => bail!("unknown argument `{other}`\n{USAGE}"),
            }
        }

        Ok(Command::Run(config))
    }
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .with_context(|| format!("{flag} needs a value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let Command::Run(config) = DashboardConfig::from_args(Vec::new()).unwrap() else {
            panic!("expected run");
        };
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.color_max, 40_000);
    }

    #[test]
    fn test_flags_override() {
        let parsed = DashboardConfig::from_args(args(&[
            "--feed", "a.csv", "--date", "3/1/21", "--daily", "--log-scale",
        ]))
        .unwrap();
        let Command::Run(config) = parsed else {
            panic!("expected run");
        };
        assert_eq!(config.feed_path, PathBuf::from("a.csv"));
        assert_eq!(config.target_date, "3/1/21");
        assert_eq!(config.metric, Metric::Daily);
        assert_eq!(config.scale, ScaleKind::Log);
    }

    #[test]
    fn test_help_and_errors() {
        assert_eq!(
            DashboardConfig::from_args(args(&["--help"])).unwrap(),
            Command::Help
        );
        assert!(DashboardConfig::from_args(args(&["--bogus"])).is_err());
        assert!(DashboardConfig::from_args(args(&["--feed"])).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        fs::write(
            &path,
            r#"{"color_max": 1000, "metric": "daily", "aliases": {"Czech Rep.": "Czechia"}}"#,
        )
        .unwrap();

        let parsed = DashboardConfig::from_args(args(&[
            "--config",
            path.to_str().unwrap(),
            "--date",
            "2/2/21",
        ]))
        .unwrap();
        let Command::Run(config) = parsed else {
            panic!("expected run");
        };
        assert_eq!(config.color_max, 1000);
        assert_eq!(config.metric, Metric::Daily);
        assert_eq!(config.target_date, "2/2/21");
        assert_eq!(config.feed_path, PathBuf::from("data/confirmed.csv"));
        assert_eq!(config.alias_table().resolve_key("czech rep."), "CZECHIA");
    }
}
