//! Platform-independent file identity, used to tell rotation apart from
//! in-place growth.
//!
//! The identity stays the same while a file is appended to or truncated, and
//! changes when the path is made to point at a different file (rename and
//! recreate, copy over, etc).

use std::fmt;
use std::io;
use std::path::Path;

use tokio::fs::{File, OpenOptions};

/// Device + inode (Unix) or volume serial + file index (Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    dev: u64,
    ino: u64,
}

impl FileId {
    /// Identity of whatever file `path` currently names.
    ///
    /// A missing file yields an `io::ErrorKind::NotFound` error, which callers
    /// treat as a rotation still in progress.
    #[cfg(unix)]
    pub async fn of_path(path: impl AsRef<Path>) -> io::Result<Self> {
        use std::os::unix::fs::MetadataExt;

        let metadata = tokio::fs::metadata(path).await?;
        Ok(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    /// Identity of whatever file `path` currently names.
    #[cfg(windows)]
    pub async fn of_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = open(path).await?;
        Self::of_file(&file).await
    }

    /// Identity of an already open handle.
    #[cfg(unix)]
    pub async fn of_file(file: &File) -> io::Result<Self> {
        use std::os::unix::fs::MetadataExt;

        let metadata = file.metadata().await?;
        Ok(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    /// Identity of an already open handle.
    #[cfg(windows)]
    pub async fn of_file(file: &File) -> io::Result<Self> {
        use std::os::windows::io::AsRawHandle;
        use windows_sys::Win32::Foundation::HANDLE;
        use windows_sys::Win32::Storage::FileSystem::{
            GetFileInformationByHandle, BY_HANDLE_FILE_INFORMATION,
        };

        let handle = file.as_raw_handle() as HANDLE;
        // SAFETY: plain-old-data struct filled in by the call below.
        let mut info: BY_HANDLE_FILE_INFORMATION = unsafe { std::mem::zeroed() };

        // SAFETY: `handle` is owned by `file` and stays open for the call.
        if unsafe { GetFileInformationByHandle(handle, &mut info) } == 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            dev: info.dwVolumeSerialNumber as u64,
            ino: ((info.nFileIndexHigh as u64) << 32) | info.nFileIndexLow as u64,
        })
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dev, self.ino)
    }
}

/// Opens `path` for reading without preventing others from renaming or
/// deleting it.
///
/// Unix never blocks rename/unlink of open files. Windows does unless the
/// handle is opened with `FILE_SHARE_DELETE`.
pub(crate) async fn open(path: impl AsRef<Path>) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);

    #[cfg(windows)]
    {
        use windows_sys::Win32::Storage::FileSystem::{
            FILE_SHARE_DELETE, FILE_SHARE_READ, FILE_SHARE_WRITE,
        };
        options.share_mode(FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE);
    }

    options.open(path).await
}
