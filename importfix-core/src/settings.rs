//! Clap-free settings for offer and apply pipelines.

use camino::Utf8PathBuf;
use importfix_domain::ProviderConfig;

/// Settings for the offer pipeline.
#[derive(Debug, Clone)]
pub struct OfferSettings {
    pub solution_root: Utf8PathBuf,

    // Import placement
    pub place_system_first: bool,

    // Discovery
    pub max_fixes: Option<usize>,
    pub projects: bool,
    pub assemblies: bool,
    pub packages: bool,

    // Resolution
    pub search_paths: Vec<Utf8PathBuf>,
}

impl Default for OfferSettings {
    fn default() -> Self {
        Self {
            solution_root: Utf8PathBuf::from("."),
            place_system_first: true,
            max_fixes: None,
            projects: true,
            assemblies: true,
            packages: true,
            search_paths: vec![Utf8PathBuf::from("refs")],
        }
    }
}

impl OfferSettings {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            place_system_first: self.place_system_first,
            max_fixes: self.max_fixes,
            projects: self.projects,
            assemblies: self.assemblies,
            packages: self.packages,
        }
    }
}

/// Settings for the apply pipeline.
#[derive(Debug, Clone)]
pub struct ApplySettings {
    pub offer: OfferSettings,

    /// Compute the patch without touching the filesystem.
    pub dry_run: bool,
}

impl Default for ApplySettings {
    fn default() -> Self {
        Self {
            offer: OfferSettings::default(),
            dry_run: true,
        }
    }
}
