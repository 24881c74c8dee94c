//! Multipart form reading for image uploads.
//!
//! Text fields are collected as UTF-8 strings; one named file field is
//! buffered in memory up to [`IMAGE_MAX_BYTES`] and turned into an
//! [`ImageUpload`]. Unknown file fields are drained and ignored.
//!
//! Whole forms are bounded too: at most [`MAX_FIELDS`] parts, text parts
//! sharing [`TEXT_TOTAL_MAX`] bytes and file parts sharing
//! [`IMAGE_MAX_BYTES`].

use std::collections::HashMap;

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;

use crate::domain::Error;
use crate::domain::ports::{IMAGE_MAX_BYTES, ImageFolder, ImageUpload};

/// Largest text field accepted, in bytes.
const TEXT_FIELD_MAX: usize = 64 * 1024;
/// Combined size of all text fields in one form.
pub const TEXT_TOTAL_MAX: usize = 256 * 1024;
/// Parts accepted in one form.
pub const MAX_FIELDS: usize = 32;

/// Parsed multipart form.
#[derive(Debug, Default)]
pub struct UploadForm {
    texts: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl UploadForm {
    /// Text value of `name`, if submitted.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    /// Take the uploaded image, if any.
    pub fn take_image(&mut self) -> Option<ImageUpload> {
        self.image.take()
    }
}

fn malformed(err: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("malformed multipart body: {err}"))
}

fn form_too_large() -> Error {
    Error::invalid_request("multipart body is too large")
}

/// Buffer one part, charging its bytes to `budget`.
async fn read_field(
    field: &mut Field,
    name: &str,
    limit: usize,
    budget: &mut usize,
) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if buffer.len() + chunk.len() > limit {
            return Err(Error::invalid_field(name, format!("{name} is too large")));
        }
        *budget = budget.checked_sub(chunk.len()).ok_or_else(form_too_large)?;
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

/// Read a form whose file part is named `file_field`.
///
/// An empty file part (a form submitted without choosing a file) counts as
/// no upload.
pub async fn read_upload_form(
    mut payload: Multipart,
    file_field: &'static str,
    folder: ImageFolder,
) -> Result<UploadForm, Error> {
    let mut form = UploadForm::default();
    let mut fields = 0;
    let mut text_budget = TEXT_TOTAL_MAX;
    let mut file_budget = IMAGE_MAX_BYTES;
    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        fields += 1;
        if fields > MAX_FIELDS {
            return Err(Error::invalid_request(format!(
                "multipart body has more than {MAX_FIELDS} parts"
            )));
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);
        if name == file_field {
            let content_type = field.content_type().map(|mime| mime.essence_str().to_owned());
            let bytes = read_field(&mut field, file_field, IMAGE_MAX_BYTES, &mut file_budget).await?;
            if bytes.is_empty() {
                continue;
            }
            form.image = Some(ImageUpload::try_new(
                file_field,
                folder,
                file_name.as_deref(),
                content_type.as_deref(),
                bytes,
            )?);
        } else if file_name.is_some() {
            read_field(&mut field, &name, IMAGE_MAX_BYTES, &mut file_budget).await?;
        } else {
            let bytes = read_field(&mut field, &name, TEXT_FIELD_MAX, &mut text_budget).await?;
            let text = String::from_utf8(bytes)
                .map_err(|_| Error::invalid_field(&name, format!("{name} must be UTF-8 text")))?;
            form.texts.insert(name, text);
        }
    }
    Ok(form)
}
