pub mod coordinator;
pub mod vault;

pub use coordinator::{
    Channel, LoadCoordinator, LoadResult, LoadState, Snapshot, sort_entries, structural_hash,
};
pub use vault::StatusVault;

pub use svault_config::{MemoryPreferences, PreferenceStore, SaverConfig};
pub use svault_error::{ReasonCode, SaverError};
pub use svault_paths::{ProbeOutcome, VariantDescriptor, probe};
pub use svault_store::{Location, ManagedRoots, ManagedStore};
pub use svault_utils::{MediaKind, SourceRef, StatusEntry};
