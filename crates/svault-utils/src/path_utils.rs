use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir_exists(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Milliseconds since the Unix epoch, 0 for times before it.
#[must_use]
pub fn system_time_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

#[must_use]
pub fn now_millis() -> u64 {
    system_time_millis(SystemTime::now())
}

/// Makes `path` absolute and folds `.` and `..` without touching the filesystem.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolves symlinks for the part of `path` that exists, keeping the missing tail as is.
#[must_use]
pub fn resolve_path(path: &Path) -> PathBuf {
    let normalized = normalize_path(path);
    if let Ok(real) = normalized.canonicalize() {
        return real;
    }

    let mut missing = Vec::new();
    let mut cursor = normalized.as_path();
    while let Some(parent) = cursor.parent() {
        if let Some(name) = cursor.file_name() {
            missing.push(name.to_os_string());
        }
        if let Ok(real) = parent.canonicalize() {
            let mut resolved = real;
            for name in missing.iter().rev() {
                resolved.push(name);
            }
            return resolved;
        }
        cursor = parent;
    }
    normalized
}

/// `IMG-1.jpg` becomes `IMG-1_<millis>.jpg`; names without an extension just get the suffix.
#[must_use]
pub fn disambiguated_name(name: &str, millis: u64) -> String {
    match name.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() => format!("{base}_{millis}.{ext}"),
        _ => format!("{name}_{millis}"),
    }
}

/// A display name is acceptable when it names a single entry inside a directory.
#[must_use]
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

#[must_use]
pub fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}
