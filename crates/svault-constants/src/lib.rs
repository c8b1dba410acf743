pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = "Finds messaging-app statuses and keeps saved copies safe";
pub const BIN_NAME: &str = "svault";
pub const APP_NAME: &str = "statusvault";

pub const COMMANDS: &[(&str, &str, &[&str])] = &[
    ("detect", "Lists status folders found on this device", &["scan"]),
    (
        "list",
        "Lists statuses, or saved/favourite items with --saved/--favourites",
        &["ls"],
    ),
    ("save", "Copies a status into the saved folder", &["s"]),
    ("favorite", "Moves a saved item into favourites", &["fav"]),
    ("unfavorite", "Moves a favourite back to saved", &["unfav"]),
    ("toggle", "Toggles the favourite flag of a saved item", &[]),
    ("delete", "Deletes a saved or favourite item", &["rm"]),
    ("where", "Shows whether a path is saved, favourite or unmanaged", &[]),
    ("load", "Loads both channels once and prints a summary", &[]),
    ("set-source", "Remembers the status folder or tree handle to read", &[]),
    ("help", "Shows help information for svault or a command", &[]),
];
pub const EXAMPLES: &[(&str, &str)] = &[
    ("svault detect", "Find status folders"),
    ("svault list", "List current statuses"),
    ("svault list --favourites", "List favourites"),
    ("svault save ~/WhatsApp/Media/.Statuses/IMG-1-WA0001.jpg", "Save a status"),
    ("svault toggle <saved-path>", "Favourite or unfavourite an item"),
    ("svault delete <saved-path>", "Delete a saved item"),
];

/// Directory created under the public media root.
pub const APP_DIR_NAME: &str = "StatusSaver";
pub const SAVED_DIR_NAME: &str = "downloaded";
pub const FAVOURITES_DIR_NAME: &str = "favourites";

/// Substring every catalog row must carry in its storage path.
pub const STATUS_DIR_FRAGMENT: &str = "/.Statuses/";
pub const NO_MEDIA: &str = ".nomedia";
pub const HANDLE_SCHEME_SEPARATOR: &str = "://";

/// Prefix and suffix of in-flight copies inside a managed root.
pub const TEMP_FILE_PREFIX: &str = ".svault-";
pub const TEMP_FILE_SUFFIX: &str = ".part";

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "heif", "tiff", "tif",
];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "3gp", "mkv", "avi", "mov", "wmv", "flv", "m4v"];

pub const STORAGE_PLACEHOLDER: &str = "{storage}";
pub const PRIMARY_VARIANT: &str = "whatsapp-legacy";

/// Known status caches, in tie-break order.
pub const VARIANT_TABLE: &[(&str, &str)] = &[
    (
        "whatsapp",
        "{storage}/Android/media/com.whatsapp/WhatsApp/Media/.Statuses",
    ),
    ("whatsapp-legacy", "{storage}/WhatsApp/Media/.Statuses"),
    (
        "whatsapp-business",
        "{storage}/Android/media/com.whatsapp.w4b/WhatsApp Business/Media/.Statuses",
    ),
    (
        "whatsapp-business-legacy",
        "{storage}/WhatsApp Business/Media/.Statuses",
    ),
    (
        "parallel-lite",
        "{storage}/parallel_lite/0/WhatsApp/Media/.Statuses",
    ),
    (
        "parallel-intl",
        "{storage}/parallel_intl/0/WhatsApp/Media/.Statuses",
    ),
    ("gb-whatsapp-legacy", "{storage}/GBWhatsApp/Media/.Statuses"),
    ("dual-app-legacy", "{storage}/DualApp/WhatsApp/Media/.Statuses"),
    ("dual-user-999", "/storage/emulated/999/WhatsApp/Media/.Statuses"),
    ("ace-999-legacy", "/storage/ace-999/WhatsApp/Media/.Statuses"),
    (
        "ace-999",
        "/storage/ace-999/Android/media/com.whatsapp/WhatsApp/Media/.Statuses",
    ),
    (
        "dual-app",
        "{storage}/DualApp/Android/media/com.whatsapp/WhatsApp/Media/.Statuses",
    ),
    (
        "gb-whatsapp",
        "{storage}/Android/media/com.gbwhatsapp/GBWhatsApp/Media/.Statuses",
    ),
    ("fm-whatsapp-legacy", "{storage}/FMWhatsApp/Media/.Statuses"),
    (
        "fm-whatsapp",
        "{storage}/Android/media/com.fmwhatsapp/FMWhatsApp/Media/.Statuses",
    ),
    ("yo-whatsapp-legacy", "{storage}/YoWhatsApp/Media/.Statuses"),
    (
        "yo-whatsapp",
        "{storage}/Android/media/com.yowhatsapp/YoWhatsApp/Media/.Statuses",
    ),
];

pub const COPY_BUFFER_SIZE: usize = 8192;
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_THUMBNAIL_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_THUMBNAIL_MAX_EDGE: u32 = 256;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";
