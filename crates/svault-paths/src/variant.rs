use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use svault_constants::{STORAGE_PLACEHOLDER, VARIANT_TABLE};

/// A messaging-app installation and the template of its status cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDescriptor {
    pub name: String,
    pub path_template: String,
}

impl VariantDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, path_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path_template: path_template.into(),
        }
    }

    /// Substitutes `{storage}` with `storage_root`. Templates without the placeholder are
    /// returned unchanged.
    #[must_use]
    pub fn resolve(&self, storage_root: &Path) -> PathBuf {
        match self.path_template.strip_prefix(STORAGE_PLACEHOLDER) {
            Some(rest) => storage_root.join(rest.trim_start_matches('/')),
            None => PathBuf::from(self.path_template.replace(
                STORAGE_PLACEHOLDER,
                &storage_root.to_string_lossy(),
            )),
        }
    }
}

static BUILTIN_VARIANTS: OnceLock<Vec<VariantDescriptor>> = OnceLock::new();

#[must_use]
pub fn builtin_variants() -> &'static [VariantDescriptor] {
    BUILTIN_VARIANTS.get_or_init(|| {
        VARIANT_TABLE
            .iter()
            .map(|(name, template)| VariantDescriptor::new(*name, *template))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use svault_constants::PRIMARY_VARIANT;

    #[test]
    fn templates_resolve_against_the_storage_root() {
        let variant =
            VariantDescriptor::new("whatsapp-legacy", "{storage}/WhatsApp/Media/.Statuses");
        assert_eq!(
            variant.resolve(Path::new("/storage/emulated/0")),
            PathBuf::from("/storage/emulated/0/WhatsApp/Media/.Statuses")
        );

        let absolute = VariantDescriptor::new(
            "ace-999-legacy",
            "/storage/ace-999/WhatsApp/Media/.Statuses",
        );
        assert_eq!(
            absolute.resolve(Path::new("/ignored")),
            PathBuf::from("/storage/ace-999/WhatsApp/Media/.Statuses")
        );
    }

    #[test]
    fn builtin_table_is_ordered_and_contains_the_primary() {
        let table = builtin_variants();
        assert_eq!(table.len(), VARIANT_TABLE.len());
        assert_eq!(table.first().map(|v| v.name.as_str()), Some("whatsapp"));
        assert!(table.iter().any(|v| v.name == PRIMARY_VARIANT));
        // Loaded once.
        assert!(std::ptr::eq(table, builtin_variants()));
    }
}
