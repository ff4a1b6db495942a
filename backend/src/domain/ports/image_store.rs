//! Driven port for uploaded pet images.
use async_trait::async_trait;

use super::define_port_error;

/// Prefix of image references stored on pet rows.
pub const UPLOADS_PREFIX: &str = "uploads/";

define_port_error! {
    /// Failures raised by image stores.
    pub enum ImageStoreError {
        /// Reading or writing the backing storage failed.
        Io { message: String } => "image store I/O failed: {message}",
        /// The name is not a plain file name inside the store.
        InvalidName { name: String } => "invalid image name: {name}",
        /// No image with that name.
        NotFound { name: String } => "image not found: {name}",
    }
}

/// Storage for image bytes, addressed by generated file names.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `bytes` under a fresh UUID name with `extension` appended and
    /// return the reference to store on the pet, e.g. `uploads/<uuid>.jpg`.
    async fn save(&self, extension: &str, bytes: &[u8]) -> Result<String, ImageStoreError>;

    /// Delete an image by the reference returned from [`ImageStore::save`].
    async fn remove(&self, reference: &str) -> Result<(), ImageStoreError>;

    /// Read an image by bare file name.
    async fn read(&self, file_name: &str) -> Result<Vec<u8>, ImageStoreError>;
}
