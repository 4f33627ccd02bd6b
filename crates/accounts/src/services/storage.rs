//! Media file storage on the local filesystem.
//!
//! Stored files are addressed by a name relative to the media root, e.g.
//! `user-avatars/avatar3.jpg`. That name is what gets saved in the
//! database.

use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distr::Alphanumeric;
use rand::seq::IndexedRandom;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Upload directory for user avatars.
pub const AVATAR_UPLOAD_TO: &str = "user-avatars";

/// Length of the random suffix added to resolve name collisions.
const COLLISION_SUFFIX_LEN: usize = 7;

/// Gives up finding a free name after this many collisions.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Errors from media storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file name has no usable final component.
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// Every candidate name was taken.
    #[error("could not find a free name for {0}")]
    NoAvailableName(String),
}

impl StorageError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A file picked from the avatar pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarFile {
    /// Bare file name, e.g. `avatar3.jpg`.
    pub name: String,
    /// Full path to the file in the pool.
    pub path: PathBuf,
}

/// Pick one file uniformly at random from the avatar directory.
///
/// Subdirectories and dotfiles are ignored. Returns `None` for an empty
/// pool.
///
/// # Errors
///
/// Returns `StorageError::Io` if the directory cannot be read.
pub async fn get_random_avatar(avatars_dir: &Path) -> Result<Option<AvatarFile>, StorageError> {
    let mut entries = fs::read_dir(avatars_dir)
        .await
        .map_err(StorageError::io(avatars_dir))?;

    let mut pool = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(StorageError::io(avatars_dir))?
    {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map_err(StorageError::io(&path))?
            .is_file();
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if is_file && !name.starts_with('.') {
            pool.push(AvatarFile { name, path });
        }
    }

    Ok(pool.choose(&mut rand::rng()).cloned())
}

/// Local media storage rooted at one directory.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    /// Storage rooted at `root`. The directory is created on first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path of a stored name.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Copy `source` into `upload_to/` under `file_name`.
    ///
    /// If the name is taken, `_` and seven random alphanumerics are
    /// appended to the stem until a free name is found. Returns the stored
    /// name relative to the media root.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidName` for names without a file stem,
    /// `StorageError::Io` on filesystem failures.
    pub async fn save(
        &self,
        upload_to: &str,
        file_name: &str,
        source: &Path,
    ) -> Result<String, StorageError> {
        let file_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidName(file_name.to_owned()))?;

        let dir = self.root.join(upload_to);
        fs::create_dir_all(&dir)
            .await
            .map_err(StorageError::io(&dir))?;

        let mut source_file = fs::File::open(source)
            .await
            .map_err(StorageError::io(source))?;

        let mut candidate = file_name.to_owned();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let target = dir.join(&candidate);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
            {
                Ok(file) => {
                    write_claimed(&target, file, &mut source_file).await?;

                    let stored = format!("{upload_to}/{candidate}");
                    tracing::debug!(name = %stored, "media file stored");
                    return Ok(stored);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    candidate = with_random_suffix(file_name)?;
                }
                Err(e) => return Err(StorageError::io(&target)(e)),
            }
        }

        Err(StorageError::NoAvailableName(file_name.to_owned()))
    }

    /// Delete a stored file. Deleting a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file exists but cannot be removed.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path(name);
        match fs::remove_file(&path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(StorageError::io(&path)(e)),
            _ => Ok(()),
        }
    }
}

/// Stream `contents` into a freshly claimed `target`.
///
/// A partial file is removed again so the name is not left taken.
async fn write_claimed<R>(
    target: &Path,
    mut file: fs::File,
    contents: &mut R,
) -> Result<(), StorageError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let written = async {
        tokio::io::copy(contents, &mut file).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(cleanup) = fs::remove_file(target).await {
            tracing::warn!(error = %cleanup, path = %target.display(), "failed to remove partial media file");
        }
        return Err(StorageError::io(target)(e));
    }
    Ok(())
}

/// `avatar.jpg` -> `avatar_a1B2c3D.jpg`
fn with_random_suffix(file_name: &str) -> Result<String, StorageError> {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StorageError::InvalidName(file_name.to_owned()))?;

    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(COLLISION_SUFFIX_LEN)
        .map(char::from)
        .collect();

    Ok(match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{stem}_{suffix}"),
    })
}
