use std::{
    fs::{File, OpenOptions, TryLockError},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use super::StableStore;
use crate::Error;

/// A [`StableStore`] that keeps the high-water mark in a pair of files.
///
/// Each write goes to the file holding the older value, so a crash in the middle of a write leaves
/// the other file intact; reads take the larger of the two readable values. A stamp is stored as
/// the text `[0x` followed by 16 lowercase hex digits and `]`. A file that is empty or holds
/// anything else is treated as holding no value.
///
/// Both files are locked exclusively for as long as the store lives, so a second store on the same
/// pair fails to open, whether it belongs to another process or to this one. The locks are
/// advisory and released on drop.
#[derive(Debug)]
pub struct FileStore {
    files: [StampFile; 2],
}

impl FileStore {
    /// Default name of the first file.
    pub const FIRST_FILE_NAME: &'static str = "uuid1.lck";

    /// Default name of the second file.
    pub const SECOND_FILE_NAME: &'static str = "uuid2.lck";

    /// Opens and locks the pair of files, creating any that do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a file cannot be opened or read, with
    /// [`io::ErrorKind::WouldBlock`] if another store holds its lock.
    pub fn open(first: impl AsRef<Path>, second: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Self {
            files: [
                StampFile::open(first.as_ref())?,
                StampFile::open(second.as_ref())?,
            ],
        })
    }

    /// Opens [`FIRST_FILE_NAME`](Self::FIRST_FILE_NAME) and
    /// [`SECOND_FILE_NAME`](Self::SECOND_FILE_NAME) in `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        Self::open(
            dir.join(Self::FIRST_FILE_NAME),
            dir.join(Self::SECOND_FILE_NAME),
        )
    }

    /// Returns the paths of the two files.
    pub fn paths(&self) -> [&Path; 2] {
        [&self.files[0].path, &self.files[1].path]
    }

    fn latest(&self) -> Option<u64> {
        self.files[0].stamp.max(self.files[1].stamp)
    }
}

impl StableStore for FileStore {
    fn load(&mut self) -> Result<Option<u64>, Error> {
        for e in self.files.iter_mut() {
            e.read()?;
        }
        Ok(self.latest())
    }

    fn store(&mut self, stamp: u64) -> Result<(), Error> {
        match self.latest() {
            Some(existing) if stamp < existing => {
                return Err(Error::StaleStamp {
                    existing,
                    requested: stamp,
                })
            }
            Some(existing) if stamp == existing => return Ok(()),
            _ => {}
        }

        let target = if self.files[0].stamp <= self.files[1].stamp {
            0
        } else {
            1
        };
        self.files[target].write(stamp)
    }
}

#[derive(Debug)]
struct StampFile {
    path: PathBuf,
    file: File,
    stamp: Option<u64>,
}

impl StampFile {
    fn open(path: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                return Err(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    format!("{} is locked by another timestamp store", path.display()),
                )
                .into())
            }
            Err(TryLockError::Error(err)) => return Err(err.into()),
        }
        let mut e = Self {
            path: path.to_owned(),
            file,
            stamp: None,
        };
        e.read()?;
        Ok(e)
    }

    fn read(&mut self) -> Result<(), Error> {
        let mut text = String::new();
        self.file.seek(SeekFrom::Start(0))?;
        let parsed = match self.file.read_to_string(&mut text) {
            Ok(_) => parse_stamp(&text),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => None,
            Err(err) => return Err(err.into()),
        };
        if parsed.is_none() && !text.is_empty() {
            tracing::warn!(
                path = %self.path.display(),
                "ignoring unreadable timestamp file contents"
            );
        }
        self.stamp = parsed;
        Ok(())
    }

    fn write(&mut self, stamp: u64) -> Result<(), Error> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.set_len(0)?;
        self.file.write_all(format_stamp(stamp).as_bytes())?;
        self.file.sync_data()?;
        self.stamp = Some(stamp);
        tracing::trace!(path = %self.path.display(), stamp, "persisted timestamp");
        Ok(())
    }
}

fn format_stamp(stamp: u64) -> String {
    format!("[{stamp:#018x}]")
}

fn parse_stamp(text: &str) -> Option<u64> {
    let digits = text.trim().strip_prefix("[0x")?.strip_suffix(']')?;
    if digits.is_empty() || digits.len() > 16 || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}
