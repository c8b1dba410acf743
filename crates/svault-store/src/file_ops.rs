use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use svault_constants::{COPY_BUFFER_SIZE, TEMP_FILE_PREFIX, TEMP_FILE_SUFFIX};

/// How a finished copy replaces its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    Overwrite,
    /// Fails with `AlreadyExists` when the destination appeared meanwhile.
    NoClobber,
}

/// Filesystem primitives used by the managed store.
pub trait FileOps: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Whether the current process can open `path` for reading.
    fn is_readable(&self, path: &Path) -> bool;

    fn len(&self, path: &Path) -> io::Result<u64>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Streams `source` into a hidden temporary file beside `dest`, syncs it and renames it
    /// onto `dest`. Returns the number of bytes written.
    fn publish(&self, source: &mut dyn Read, dest: &Path, mode: Publish) -> io::Result<u64>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_readable(&self, path: &Path) -> bool {
        fs::File::open(path).is_ok()
    }

    fn len(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        svault_utils::ensure_dir_exists(path)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    fn publish(&self, source: &mut dyn Read, dest: &Path, mode: Publish) -> io::Result<u64> {
        let dir = dest.parent().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no parent directory", dest.display()),
            )
        })?;

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(TEMP_FILE_SUFFIX)
            .tempfile_in(dir)?;

        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut written = 0u64;
        loop {
            let read = match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let chunk = buffer.get(..read).unwrap_or_default();
            temp.as_file_mut().write_all(chunk)?;
            written += chunk.len() as u64;
        }
        temp.as_file().sync_all()?;

        match mode {
            Publish::Overwrite => temp.persist(dest).map_err(|e| e.error)?,
            Publish::NoClobber => temp.persist_noclobber(dest).map_err(|e| e.error)?,
        };
        Ok(written)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_writes_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.jpg");
        let payload = vec![7u8; COPY_BUFFER_SIZE * 3 + 11];

        let written = StdFileOps
            .publish(&mut payload.as_slice(), &dest, Publish::Overwrite)
            .unwrap();
        assert_eq!(written, payload.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), payload);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(TEMP_FILE_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn no_clobber_refuses_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.jpg");
        fs::write(&dest, b"first").unwrap();

        let err = StdFileOps
            .publish(&mut &b"second"[..], &dest, Publish::NoClobber)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dest).unwrap(), b"first");

        StdFileOps
            .publish(&mut &b"second"[..], &dest, Publish::Overwrite)
            .unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"second");
    }
}
