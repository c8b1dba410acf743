use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use svault_constants::{PRIMARY_VARIANT, VARIANT_TABLE};

use crate::variant::{VariantDescriptor, builtin_variants};

/// Result of checking one candidate status directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Missing,
    NotDirectory,
    Unreadable(io::ErrorKind),
    Empty,
    /// Directory exists, can be listed and has this many entries.
    Ready(usize),
}

impl ProbeOutcome {
    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Exists, is a directory, can be listed, and listing yields at least one entry.
#[must_use]
pub fn probe(path: &Path) -> ProbeOutcome {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ProbeOutcome::Missing,
        Err(e) => return ProbeOutcome::Unreadable(e.kind()),
    };
    if !metadata.is_dir() {
        return ProbeOutcome::NotDirectory;
    }

    match fs::read_dir(path) {
        Ok(listing) => match listing.count() {
            0 => ProbeOutcome::Empty,
            n => ProbeOutcome::Ready(n),
        },
        Err(e) => ProbeOutcome::Unreadable(e.kind()),
    }
}

/// Knows where each supported app variant keeps its status cache under a storage root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    storage_root: PathBuf,
    variants: Vec<VariantDescriptor>,
}

impl PathResolver {
    #[must_use]
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self::with_variants(storage_root, builtin_variants().to_vec())
    }

    #[must_use]
    pub fn with_variants(
        storage_root: impl Into<PathBuf>,
        variants: Vec<VariantDescriptor>,
    ) -> Self {
        Self {
            storage_root: storage_root.into(),
            variants,
        }
    }

    /// Built-in table followed by `extra`. An extra entry reusing a built-in name replaces it
    /// in place.
    #[must_use]
    pub fn with_extra(storage_root: impl Into<PathBuf>, extra: &[VariantDescriptor]) -> Self {
        let mut variants = builtin_variants().to_vec();
        for descriptor in extra {
            match variants.iter_mut().find(|v| v.name == descriptor.name) {
                Some(existing) => existing.clone_from(descriptor),
                None => variants.push(descriptor.clone()),
            }
        }
        Self::with_variants(storage_root, variants)
    }

    /// Shared-storage root of the current user; the home directory on desktop hosts.
    #[must_use]
    pub fn default_storage_root() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("/storage/emulated/0"))
    }

    #[must_use]
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    #[must_use]
    pub fn variants(&self) -> &[VariantDescriptor] {
        &self.variants
    }

    /// The fallback variant. Tables that lack it get the built-in definition.
    #[must_use]
    pub fn primary(&self) -> VariantDescriptor {
        self.variants
            .iter()
            .find(|v| v.name == PRIMARY_VARIANT)
            .cloned()
            .or_else(|| {
                VARIANT_TABLE
                    .iter()
                    .find(|(name, _)| *name == PRIMARY_VARIANT)
                    .map(|(name, template)| VariantDescriptor::new(*name, *template))
            })
            .unwrap_or_else(|| {
                VariantDescriptor::new(PRIMARY_VARIANT, "{storage}/WhatsApp/Media/.Statuses")
            })
    }

    /// Variants whose directory passes [`probe`], in table order. May be empty.
    #[must_use]
    pub fn detect_variants(&self) -> Vec<VariantDescriptor> {
        self.variants
            .iter()
            .filter(|variant| {
                let path = variant.resolve(&self.storage_root);
                let outcome = probe(&path);
                svault_logger::debug(&format!(
                    "Probe {} at {}: {outcome:?}",
                    variant.name,
                    path.display()
                ));
                outcome.is_ready()
            })
            .cloned()
            .collect()
    }

    /// Like [`Self::detect_variants`], but never empty: the primary variant stands in when
    /// nothing validated.
    #[must_use]
    pub fn detect_or_fallback(&self) -> Vec<VariantDescriptor> {
        let detected = self.detect_variants();
        if detected.is_empty() {
            svault_logger::debug(&format!(
                "No status directory found, falling back to {PRIMARY_VARIANT}"
            ));
            vec![self.primary()]
        } else {
            detected
        }
    }

    /// Directory of the first validated variant, or the primary variant's directory.
    #[must_use]
    pub fn best_available(&self) -> PathBuf {
        self.detect_variants()
            .first()
            .map_or_else(|| self.primary(), Clone::clone)
            .resolve(&self.storage_root)
    }

    /// Unknown names resolve to the primary variant's directory.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .cloned()
            .unwrap_or_else(|| self.primary())
            .resolve(&self.storage_root)
    }

    /// Resolved directories of the validated variants, in table order.
    #[must_use]
    pub fn detected_dirs(&self) -> Vec<(VariantDescriptor, PathBuf)> {
        self.detect_variants()
            .into_iter()
            .map(|variant| {
                let path = variant.resolve(&self.storage_root);
                (variant, path)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn two_variant_resolver() -> (TempDir, PathResolver) {
        let storage = tempfile::tempdir().unwrap();
        let resolver = PathResolver::with_variants(
            storage.path(),
            vec![
                VariantDescriptor::new("filled", "{storage}/Filled/.Statuses"),
                VariantDescriptor::new("hollow", "{storage}/Hollow/.Statuses"),
            ],
        );
        (storage, resolver)
    }

    #[test]
    fn detection_keeps_only_non_empty_directories() {
        let (storage, resolver) = two_variant_resolver();
        let filled = storage.path().join("Filled/.Statuses");
        fs::create_dir_all(&filled).unwrap();
        fs::write(filled.join("IMG-1-WA0001.jpg"), b"x").unwrap();
        fs::create_dir_all(storage.path().join("Hollow/.Statuses")).unwrap();

        let detected = resolver.detect_variants();
        let names: Vec<_> = detected.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["filled"]);
    }

    #[test]
    fn nothing_detected_yields_empty_list_and_primary_fallback() {
        let (storage, resolver) = two_variant_resolver();
        assert!(resolver.detect_variants().is_empty());

        let fallback = resolver.detect_or_fallback();
        assert_eq!(fallback.len(), 1);
        assert_eq!(fallback[0].name, PRIMARY_VARIANT);
        assert_eq!(
            resolver.best_available(),
            storage.path().join("WhatsApp/Media/.Statuses")
        );
    }

    #[test]
    fn probe_distinguishes_failure_modes() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(probe(&dir.path().join("missing")), ProbeOutcome::Missing);

        let file = dir.path().join("file.jpg");
        fs::write(&file, b"x").unwrap();
        assert_eq!(probe(&file), ProbeOutcome::NotDirectory);

        let empty = dir.path().join("empty");
        fs::create_dir(&empty).unwrap();
        assert_eq!(probe(&empty), ProbeOutcome::Empty);

        // A marker file alone still counts as a listing entry.
        fs::write(empty.join(".nomedia"), b"").unwrap();
        assert_eq!(probe(&empty), ProbeOutcome::Ready(1));
    }

    #[test]
    fn path_for_falls_back_to_primary() {
        let resolver = PathResolver::new("/storage/emulated/0");
        assert_eq!(
            resolver.path_for("whatsapp-business"),
            Path::new("/storage/emulated/0/Android/media/com.whatsapp.w4b")
                .join("WhatsApp Business/Media/.Statuses")
        );
        assert_eq!(
            resolver.path_for("no-such-app"),
            resolver.path_for(PRIMARY_VARIANT)
        );
    }

    #[test]
    fn best_available_prefers_table_order() {
        let storage = tempfile::tempdir().unwrap();
        let resolver = PathResolver::with_variants(
            storage.path(),
            vec![
                VariantDescriptor::new("first", "{storage}/A"),
                VariantDescriptor::new("second", "{storage}/B"),
            ],
        );
        for dir in ["A", "B"] {
            fs::create_dir_all(storage.path().join(dir)).unwrap();
            fs::write(storage.path().join(dir).join("x.jpg"), b"x").unwrap();
        }
        assert_eq!(resolver.best_available(), storage.path().join("A"));
        assert_eq!(resolver.detected_dirs().len(), 2);
    }

    #[test]
    fn extra_variants_override_by_name() {
        let resolver = PathResolver::with_extra(
            "/s",
            &[
                VariantDescriptor::new(PRIMARY_VARIANT, "{storage}/Custom/.Statuses"),
                VariantDescriptor::new("side-loaded", "{storage}/Side/.Statuses"),
            ],
        );
        assert_eq!(resolver.variants().len(), VARIANT_TABLE.len() + 1);
        assert_eq!(
            resolver.path_for(PRIMARY_VARIANT),
            PathBuf::from("/s/Custom/.Statuses")
        );
    }
}
