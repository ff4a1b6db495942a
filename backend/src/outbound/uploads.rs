//! Filesystem [`ImageStore`] rooted at a capability-scoped directory.
//!
//! All access goes through a `cap_std` [`Dir`] handle, so names can never
//! escape the uploads directory even if validation were bypassed. Blocking
//! file I/O runs on Tokio's blocking pool.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ImageStore, ImageStoreError, UPLOADS_PREFIX};

/// Image store writing `<uuid><ext>` files into one directory.
#[derive(Clone)]
pub struct FilesystemImageStore {
    dir: Arc<Dir>,
}

impl FilesystemImageStore {
    /// Open `path`, creating it if missing.
    ///
    /// # Errors
    ///
    /// [`ImageStoreError::Io`] when the directory cannot be created or opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageStoreError> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority()).map_err(io_error)?;
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(io_error)?;
        Ok(Self { dir: Arc::new(dir) })
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, ImageStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, ImageStoreError> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || work(&dir))
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))?
    }
}

fn io_error(error: io::Error) -> ImageStoreError {
    ImageStoreError::io(error.to_string())
}

/// Names the store hands out: no separators, no leading dot.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

fn checked_name(name: &str) -> Result<String, ImageStoreError> {
    if is_plain_name(name) {
        Ok(name.to_owned())
    } else {
        Err(ImageStoreError::invalid_name(name))
    }
}

fn not_found_or_io(name: String) -> impl FnOnce(io::Error) -> ImageStoreError {
    move |error| {
        if error.kind() == io::ErrorKind::NotFound {
            ImageStoreError::not_found(name)
        } else {
            io_error(error)
        }
    }
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn save(&self, extension: &str, bytes: &[u8]) -> Result<String, ImageStoreError> {
        let name = checked_name(&format!("{}{extension}", Uuid::new_v4()))?;
        let bytes = bytes.to_vec();
        let written = name.clone();
        self.blocking(move |dir| dir.write(&written, &bytes).map_err(io_error))
            .await?;
        debug!(file = %name, "stored uploaded image");
        Ok(format!("{UPLOADS_PREFIX}{name}"))
    }

    async fn remove(&self, reference: &str) -> Result<(), ImageStoreError> {
        // Seeded listings point at external URLs; there is nothing to delete.
        let Some(name) = reference.strip_prefix(UPLOADS_PREFIX) else {
            return Ok(());
        };
        let name = checked_name(name)?;
        self.blocking(move |dir| {
            dir.remove_file(&name)
                .map_err(not_found_or_io(name.clone()))
        })
        .await
    }

    async fn read(&self, file_name: &str) -> Result<Vec<u8>, ImageStoreError> {
        let name = checked_name(file_name)?;
        self.blocking(move |dir| dir.read(&name).map_err(not_found_or_io(name.clone())))
            .await
    }
}
