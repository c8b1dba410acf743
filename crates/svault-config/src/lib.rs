pub mod config;
pub mod io;
pub mod preferences;

pub use config::SaverConfig;
pub use io::{default_config_dir, default_config_path, load_or_default, read_config, write_config};
pub use preferences::{JsonPreferences, MemoryPreferences, PreferenceStore, SOURCE_HANDLE_KEY};
