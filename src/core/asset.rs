//! Asset - a file's contents flowing through a stream

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// A single file read from a stream's sources
///
/// `relative` is the path below the glob base the file was matched under and
/// decides where the asset lands in the destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Directory the source glob was rooted at
    pub base: PathBuf,

    /// Path relative to `base`
    pub relative: PathBuf,

    /// File contents
    pub contents: Vec<u8>,
}

impl Asset {
    pub fn new(base: impl Into<PathBuf>, relative: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            base: base.into(),
            relative: relative.into(),
            contents,
        }
    }

    /// Path of the source this asset was read from
    pub fn source_path(&self) -> PathBuf {
        self.base.join(&self.relative)
    }

    /// File name of the asset
    pub fn file_name(&self) -> &OsStr {
        self.relative.file_name().unwrap_or_else(|| self.relative.as_os_str())
    }

    /// Replace the file name, keeping the parent directory
    pub fn set_file_name(&mut self, name: impl AsRef<OsStr>) {
        self.relative.set_file_name(name);
    }

    /// Replace the extension (`md` -> `html`)
    pub fn set_extension(&mut self, extension: &str) {
        self.relative.set_extension(extension);
    }

    /// Append a suffix to the file name (`app.js` -> `app.js.gz`)
    pub fn append_extension(&mut self, extension: &str) {
        let mut name = self.file_name().to_os_string();
        name.push(".");
        name.push(extension);
        self.set_file_name(name);
    }

    /// Contents as UTF-8 text
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.contents)
    }

    /// Destination path of this asset under `dest`
    pub fn output_path(&self, dest: &Path) -> PathBuf {
        dest.join(&self.relative)
    }
}
