use futures::future::{join, join_all};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use svault_config::{PreferenceStore, SaverConfig};
use svault_error::{Result, SaverError};
use svault_paths::VariantDescriptor;
use svault_source::{FrameExtractor, ImageThumbnailer, SourceReader, Thumbnailer};
use svault_store::{Location, ManagedRoots, ManagedStore};
use svault_utils::{DocumentTreeAccess, MediaCatalog, SourceRef, StatusEntry};

use crate::coordinator::{Channel, LoadCoordinator, LoadResult, LoadState, Snapshot};

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| SaverError::io("blocking task", std::io::Error::other(e.to_string())))?
}

/// The operations a presentation layer drives: discovery, managed-store commands and
/// coordinated loads.
pub struct StatusVault {
    reader: SourceReader,
    store: ManagedStore,
    coordinator: Arc<LoadCoordinator>,
    thumbnailer: Thumbnailer,
    video_extractor: Option<Arc<dyn FrameExtractor>>,
    preferences: Arc<dyn PreferenceStore>,
    config: SaverConfig,
}

impl StatusVault {
    #[must_use]
    pub fn from_config(config: SaverConfig, preferences: Arc<dyn PreferenceStore>) -> Self {
        let reader = SourceReader::new(config.path_resolver());
        let store = ManagedStore::new(ManagedRoots::from_public_media_root(
            &config.public_media_root,
        ));
        let coordinator = Arc::new(LoadCoordinator::new(config.load_timeout()));
        let mut vault = Self {
            thumbnailer: Thumbnailer::new(Arc::new(ImageThumbnailer::new(reader.clone()))),
            reader,
            store,
            coordinator,
            video_extractor: None,
            preferences,
            config,
        };
        vault.rebuild_thumbnailer();
        vault
    }

    #[must_use]
    pub fn with_store(mut self, store: ManagedStore) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn MediaCatalog>) -> Self {
        self.reader = self.reader.with_catalog(catalog);
        self.rebuild_thumbnailer();
        self
    }

    /// Enables tree-grant handles for reading, saving and deleting.
    #[must_use]
    pub fn with_document_access(mut self, documents: Arc<dyn DocumentTreeAccess>) -> Self {
        self.reader = self.reader.with_tree_access(Arc::clone(&documents));
        self.store = self.store.with_document_access(documents);
        self.rebuild_thumbnailer();
        self
    }

    #[must_use]
    pub fn with_video_extractor(mut self, extractor: Arc<dyn FrameExtractor>) -> Self {
        self.video_extractor = Some(extractor);
        self.rebuild_thumbnailer();
        self
    }

    fn rebuild_thumbnailer(&mut self) {
        let mut thumbnailer =
            Thumbnailer::new(Arc::new(ImageThumbnailer::new(self.reader.clone())))
                .with_budget(self.config.thumbnail_timeout())
                .with_max_edge(self.config.thumbnail_max_edge);
        if let Some(video) = &self.video_extractor {
            thumbnailer = thumbnailer.with_video_extractor(Arc::clone(video));
        }
        self.thumbnailer = thumbnailer;
    }

    #[must_use]
    pub fn reader(&self) -> &SourceReader {
        &self.reader
    }

    #[must_use]
    pub fn store(&self) -> &ManagedStore {
        &self.store
    }

    #[must_use]
    pub fn coordinator(&self) -> &Arc<LoadCoordinator> {
        &self.coordinator
    }

    #[must_use]
    pub fn config(&self) -> &SaverConfig {
        &self.config
    }

    /// Validated variants in table order, or the primary variant when none validated.
    pub async fn detect_sources(&self) -> Vec<VariantDescriptor> {
        let resolver = self.reader.resolver().clone();
        run_blocking(move || Ok(resolver.detect_or_fallback()))
            .await
            .unwrap_or_default()
    }

    pub async fn enumerate(&self, source: &SourceRef) -> Vec<StatusEntry> {
        let reader = self.reader.clone();
        let source = source.clone();
        run_blocking(move || Ok(reader.enumerate(&source, &CancellationToken::new())))
            .await
            .unwrap_or_default()
    }

    pub async fn list_managed(&self, location: Location) -> Result<Vec<StatusEntry>> {
        let store = self.store.clone();
        run_blocking(move || store.list(location)).await
    }

    /// Saves `entry` under its own display name.
    pub async fn save(&self, entry: &StatusEntry) -> Result<PathBuf> {
        self.save_as(&entry.source_ref, &entry.display_name).await
    }

    pub async fn save_as(&self, source: &SourceRef, display_name: &str) -> Result<PathBuf> {
        let store = self.store.clone();
        let source = source.clone();
        let name = display_name.to_string();
        let saved = run_blocking(move || store.save(&source, &name)).await?;
        self.coordinator.invalidate(Channel::Managed);
        Ok(saved)
    }

    pub async fn mark_favorite(&self, target: &SourceRef) -> Result<SourceRef> {
        let store = self.store.clone();
        let target = target.clone();
        let moved = run_blocking(move || store.mark_favorite(&target)).await?;
        self.coordinator.invalidate(Channel::Managed);
        Ok(moved)
    }

    pub async fn unmark_favorite(&self, target: &SourceRef) -> Result<SourceRef> {
        let store = self.store.clone();
        let target = target.clone();
        let moved = run_blocking(move || store.unmark_favorite(&target)).await?;
        self.coordinator.invalidate(Channel::Managed);
        Ok(moved)
    }

    pub async fn toggle_favorite(&self, target: &SourceRef) -> Result<SourceRef> {
        let store = self.store.clone();
        let target = target.clone();
        let moved = run_blocking(move || store.toggle_favorite(&target)).await?;
        self.coordinator.invalidate(Channel::Managed);
        Ok(moved)
    }

    pub async fn delete(&self, target: &SourceRef) -> Result<()> {
        let store = self.store.clone();
        let owned = target.clone();
        run_blocking(move || store.delete(&owned)).await?;
        self.coordinator.invalidate(Channel::Managed);
        if target.is_handle() {
            self.coordinator.invalidate(Channel::Source);
        }
        Ok(())
    }

    #[must_use]
    pub fn location_of(&self, path: &Path) -> Location {
        self.store.location_of(path)
    }

    /// The stored source selection, parsed into a path or handle.
    #[must_use]
    pub fn source_handle(&self) -> Option<SourceRef> {
        self.preferences
            .source_handle()
            .filter(|raw| !raw.is_empty())
            .map(|raw| SourceRef::parse(&raw))
    }

    pub fn set_source_handle(&self, value: Option<&SourceRef>) -> Result<()> {
        let raw = value.map(SourceRef::to_key);
        self.preferences.set_source_handle(raw.as_deref())?;
        self.coordinator.invalidate(Channel::Source);
        Ok(())
    }

    fn fetcher(
        &self,
        channel: Channel,
    ) -> impl FnOnce(CancellationToken) -> Result<Vec<StatusEntry>> + Send + 'static {
        let reader = self.reader.clone();
        let store = self.store.clone();
        let selection = self.source_handle();
        move |cancel| match channel {
            Channel::Source => Ok(reader.read(selection.as_ref(), &cancel)),
            Channel::Managed => {
                let mut entries = store.list(Location::Saved)?;
                if !cancel.is_cancelled() {
                    entries.extend(store.list(Location::Favorite)?);
                }
                Ok(entries)
            }
        }
    }

    pub async fn try_load(&self, channel: Channel) -> LoadResult {
        let fetch = self.fetcher(channel);
        self.coordinator.try_load(channel, fetch).await
    }

    pub async fn ensure_loaded(&self, channel: Channel) -> LoadResult {
        let fetch = self.fetcher(channel);
        self.coordinator.ensure_loaded(channel, fetch).await
    }

    pub async fn force_refresh(&self, channel: Channel) -> LoadResult {
        let fetch = self.fetcher(channel);
        self.coordinator.force_refresh(channel, fetch).await
    }

    /// Loads both channels concurrently; they share no lock.
    pub async fn load_all(&self) -> (LoadResult, LoadResult) {
        join(self.try_load(Channel::Source), self.try_load(Channel::Managed)).await
    }

    #[must_use]
    pub fn subscribe(&self, channel: Channel) -> watch::Receiver<LoadState> {
        self.coordinator.subscribe(channel)
    }

    #[must_use]
    pub fn snapshot(&self, channel: Channel) -> Arc<Snapshot> {
        self.coordinator.snapshot(channel)
    }

    pub async fn thumbnail(&self, entry: &StatusEntry) -> Option<StatusEntry> {
        self.thumbnailer.load(entry).await
    }

    /// Thumbnails for a batch, each under its own budget. Entries whose extraction failed
    /// come back unchanged.
    pub async fn thumbnails(&self, entries: &[StatusEntry]) -> Vec<StatusEntry> {
        let loads = entries.iter().map(|entry| async move {
            self.thumbnailer
                .load(entry)
                .await
                .unwrap_or_else(|| entry.clone())
        });
        join_all(loads).await
    }
}
