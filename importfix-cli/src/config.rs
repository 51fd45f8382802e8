//! Configuration file loading for importfix.
//!
//! Discovers and loads `importfix.toml` from the solution root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use importfix_core::settings::OfferSettings;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "importfix.toml";

/// Top-level configuration from importfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportfixConfig {
    /// Import directive placement.
    pub imports: ImportsConfig,

    /// Which fix kinds are offered, and how many.
    pub offer: OfferConfig,

    /// Where binding resolution looks for containers.
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportsConfig {
    /// Keep `System` namespaces ahead of all others.
    pub place_system_first: bool,
}

impl Default for ImportsConfig {
    fn default() -> Self {
        Self {
            place_system_first: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OfferConfig {
    pub max_fixes: Option<usize>,
    pub projects: bool,
    pub assemblies: bool,
    pub packages: bool,
}

impl Default for OfferConfig {
    fn default() -> Self {
        Self {
            max_fixes: None,
            projects: true,
            assemblies: true,
            packages: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Directories searched for `.dll` and `.nupkg` files, relative to the
    /// solution root. Empty means the default `refs`.
    pub search_paths: Vec<Utf8PathBuf>,
}

/// Discover the importfix.toml config file.
///
/// Returns `None` if no config file is found.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<ImportfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<ImportfixConfig> {
    let config: ImportfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the solution root, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<ImportfixConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(ImportfixConfig::default()),
    }
}

/// Offer flags as given on the command line. `None` and `false` mean
/// "not given".
#[derive(Debug, Clone, Default)]
pub struct OfferOverrides {
    pub max_fixes: Option<usize>,
    pub no_projects: bool,
    pub no_assemblies: bool,
    pub no_packages: bool,
    pub no_system_first: bool,
    pub search_paths: Vec<Utf8PathBuf>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ImportfixConfig,
}

impl ConfigMerger {
    pub fn new(config: ImportfixConfig) -> Self {
        Self { config }
    }

    /// Produce offer settings for `root`.
    ///
    /// `--no-*` flags switch a setting off regardless of the config file.
    /// CLI search paths extend the config file list.
    pub fn merge_offer_args(self, root: Utf8PathBuf, cli: &OfferOverrides) -> OfferSettings {
        let defaults = OfferSettings::default();

        let mut search_paths = self.config.resolver.search_paths.clone();
        for path in &cli.search_paths {
            if !search_paths.contains(path) {
                search_paths.push(path.clone());
            }
        }
        if search_paths.is_empty() {
            search_paths = defaults.search_paths;
        }

        OfferSettings {
            solution_root: root,
            place_system_first: self.config.imports.place_system_first && !cli.no_system_first,
            max_fixes: cli.max_fixes.or(self.config.offer.max_fixes),
            projects: self.config.offer.projects && !cli.no_projects,
            assemblies: self.config.offer.assemblies && !cli.no_assemblies,
            packages: self.config.offer.packages && !cli.no_packages,
            search_paths,
        }
    }
}
