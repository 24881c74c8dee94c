//! Port for uploading images to hosted storage.

use async_trait::async_trait;

use crate::domain::validation::ValidationError;

use super::define_port_error;

/// Largest accepted upload, in bytes.
pub const IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;
/// Accepted image MIME types.
pub const IMAGE_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

define_port_error! {
    /// Failures raised by image storage adapters.
    pub enum ImageStoreError {
        /// No storage credentials were configured.
        NotConfigured => "image storage is not configured",
        /// The provider could not be reached.
        Transport { message: String } => "image upload failed: {message}",
        /// The provider refused the upload.
        Rejected { status: u16, message: String } => "image upload rejected ({status}): {message}",
    }
}

/// Destination folder for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFolder {
    Avatars,
    News,
}

impl ImageFolder {
    /// Folder name used by the storage provider.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Avatars => "pitchside/avatars",
            Self::News => "pitchside/news",
        }
    }
}

/// Validated image ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    folder: ImageFolder,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check the MIME type and size of an uploaded file.
    ///
    /// `field` names the form field in validation errors.
    pub fn try_new(
        field: &'static str,
        folder: ImageFolder,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        let content_type = content_type
            .map(|ct| ct.trim().to_ascii_lowercase())
            .filter(|ct| IMAGE_CONTENT_TYPES.contains(&ct.as_str()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field,
                expected: IMAGE_CONTENT_TYPES.join(", "),
            })?;
        if bytes.is_empty() {
            return Err(ValidationError::Blank { field });
        }
        if bytes.len() > IMAGE_MAX_BYTES {
            return Err(ValidationError::invalid(field, "must be at most 5 MiB"));
        }
        let file_name = file_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .to_owned();
        Ok(Self {
            folder,
            file_name,
            content_type,
            bytes,
        })
    }

    /// Destination folder.
    pub fn folder(&self) -> ImageFolder {
        self.folder
    }

    /// Client-supplied file name, or `upload`.
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// Normalised MIME type.
    pub fn content_type(&self) -> &str {
        self.content_type.as_str()
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("folder", &self.folder)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Port for hosted image storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload an image and return its public URL.
    async fn upload(&self, image: &ImageUpload) -> Result<String, ImageStoreError>;
}

/// Image store used when no provider is configured: every upload fails with
/// [`ImageStoreError::NotConfigured`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredImageStore;

#[async_trait]
impl ImageStore for UnconfiguredImageStore {
    async fn upload(&self, _image: &ImageUpload) -> Result<String, ImageStoreError> {
        Err(ImageStoreError::not_configured())
    }
}
