/// Filesystem primitives the scaffolder is built on.
pub mod fs {
    use std::fs::{self, OpenOptions};
    use std::io;
    use std::path::Path;

    /// Ensure a directory exists, creating it recursively if needed.
    ///
    /// Returns `true` when the directory was created by this call.
    pub fn ensure_dir(path: &Path) -> io::Result<bool> {
        if dir_present(path)? {
            return Ok(false);
        }
        fs::create_dir_all(path)?;
        Ok(true)
    }

    /// Create an empty file unless something already exists at `path`.
    ///
    /// Returns `true` when the file was created by this call. Existing files
    /// are never opened for writing, so their content is left untouched.
    pub fn create_empty(path: &Path) -> io::Result<bool> {
        if file_present(path)? {
            return Ok(false);
        }
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => appeared_meanwhile(path),
            Err(err) => Err(err),
        }
    }

    /// Something showed up at `path` after the presence check. A file counts as
    /// existing; a directory is still the wrong kind.
    fn appeared_meanwhile(path: &Path) -> io::Result<bool> {
        file_present(path).map(|_| false)
    }

    /// Whether a directory exists at `path`. Anything else at that path is an error.
    pub fn dir_present(path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(true),
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} exists but is not a directory", path.display()),
            )),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Whether a non-directory entry exists at `path`. A directory there is an error.
    pub fn file_present(path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} exists but is a directory", path.display()),
            )),
            Ok(_) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

}
