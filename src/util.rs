use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Opens `path`, annotating failures with what kind of file it was (e.g.
/// `project` or `template`).
pub fn open(path: &Path, kind: &'static str) -> Result<File, OpenError> {
    File::open(path).map_err(|err| OpenError {
        kind,
        path: path.to_owned(),
        err,
    })
}

/// Joins a site-relative path such as `/content/post.md` under `root`. A
/// leading `/` means "relative to `root`", not the filesystem root.
pub fn resolve(root: &Path, relative: &str) -> PathBuf {
    root.join(relative.trim_start_matches('/'))
}

#[derive(Debug)]
pub struct OpenError {
    pub kind: &'static str,
    pub path: PathBuf,
    pub err: std::io::Error,
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Opening {} file `{}`: {}", self.kind, self.path.display(), self.err)
    }
}

impl std::error::Error for OpenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}
