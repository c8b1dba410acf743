use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use svault_constants::{
    DEFAULT_LOAD_TIMEOUT_SECS, DEFAULT_THUMBNAIL_MAX_EDGE, DEFAULT_THUMBNAIL_TIMEOUT_SECS,
};
use svault_paths::{PathResolver, VariantDescriptor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaverConfig {
    /// Parent of the `StatusSaver` folder.
    pub public_media_root: PathBuf,
    /// Substituted for `{storage}` in variant templates.
    pub storage_root: PathBuf,
    pub load_timeout_secs: u64,
    pub thumbnail_timeout_secs: u64,
    pub thumbnail_max_edge: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_variants: Vec<VariantDescriptor>,
}

impl Default for SaverConfig {
    fn default() -> Self {
        Self {
            public_media_root: dirs::picture_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            storage_root: PathResolver::default_storage_root(),
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
            thumbnail_timeout_secs: DEFAULT_THUMBNAIL_TIMEOUT_SECS,
            thumbnail_max_edge: DEFAULT_THUMBNAIL_MAX_EDGE,
            extra_variants: Vec::new(),
        }
    }
}

impl SaverConfig {
    #[must_use]
    pub const fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    #[must_use]
    pub const fn thumbnail_timeout(&self) -> Duration {
        Duration::from_secs(self.thumbnail_timeout_secs)
    }

    #[must_use]
    pub fn path_resolver(&self) -> PathResolver {
        PathResolver::with_extra(self.storage_root.clone(), &self.extra_variants)
    }
}
