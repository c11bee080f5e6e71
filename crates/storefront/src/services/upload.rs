//! Product image uploads.
//!
//! Images land in `<public>/images/products/` under a sanitized, timestamped
//! name and are served back from `/images/products/<name>`.

use std::path::Path;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use thiserror::Error;

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix uploaded images are served under.
pub const PRODUCT_IMAGE_URL_PREFIX: &str = "/images/products";

/// Trailing `.ext` of a file name.
static EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^/.]+$").expect("Invalid regex"));

/// Characters replaced with `_` in stored names.
static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^a-z0-9]").expect("Invalid regex"));

/// Errors from storing an uploaded image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No image file provided")]
    NoFile,
    #[error("Only PNG, JPEG, and WebP images are allowed")]
    UnsupportedType,
    #[error("Image must be under 5MB")]
    TooLarge,
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// An uploaded image, as received from the multipart form.
#[derive(Debug)]
pub struct ImageUpload<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// Canonical extension for an accepted content type.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Validate an upload and choose its stored file name.
///
/// # Errors
///
/// Returns `UploadError::UnsupportedType` for anything but PNG, JPEG or WebP
/// and `UploadError::TooLarge` above [`MAX_IMAGE_BYTES`].
pub fn stored_file_name(upload: &ImageUpload<'_>, millis: i64) -> Result<String, UploadError> {
    let fallback_ext = extension_for(upload.content_type).ok_or(UploadError::UnsupportedType)?;
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge);
    }

    // Keep the client's extension only when it is an image extension.
    let ext = upload
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "webp"))
        .unwrap_or_else(|| fallback_ext.to_owned());

    let stem = EXTENSION_RE.replace(upload.file_name, "");
    let safe_name = UNSAFE_CHARS_RE.replace_all(&stem, "_").to_lowercase();

    Ok(format!("{safe_name}_{millis}.{ext}"))
}

/// Write an upload into `dir`, creating it if needed, and return its public URL.
///
/// # Errors
///
/// Returns a validation error from [`stored_file_name`] or `UploadError::Io`.
#[tracing::instrument(skip(upload), fields(file_name = upload.file_name, size = upload.bytes.len()))]
pub async fn save_image(dir: &Path, upload: ImageUpload<'_>) -> Result<String, UploadError> {
    let file_name = stored_file_name(&upload, Utc::now().timestamp_millis())?;

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&file_name), upload.bytes).await?;

    tracing::info!(%file_name, "Image uploaded");
    Ok(format!("{PRODUCT_IMAGE_URL_PREFIX}/{file_name}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn upload<'a>(file_name: &'a str, content_type: &'a str, bytes: &'a [u8]) -> ImageUpload<'a> {
        ImageUpload {
            file_name,
            content_type,
            bytes,
        }
    }

    #[test]
    fn test_file_name_sanitized() {
        let name = stored_file_name(&upload("Kaju Katli (1).PNG", "image/png", b"x"), 42).unwrap();
        assert_eq!(name, "kaju_katli__1__42.png");
    }

    #[test]
    fn test_path_separators_replaced() {
        let name = stored_file_name(&upload("../../etc/passwd.jpg", "image/jpeg", b"x"), 7).unwrap();
        assert_eq!(name, "______etc_passwd_7.jpg");
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_extension_from_content_type_when_untrusted() {
        let name = stored_file_name(&upload("script.php", "image/webp", b"x"), 1).unwrap();
        assert_eq!(name, "script_1.webp");
        let name = stored_file_name(&upload("noext", "image/jpeg", b"x"), 1).unwrap();
        assert_eq!(name, "noext_1.jpg");
    }

    #[test]
    fn test_rejects_type_and_size() {
        assert!(matches!(
            stored_file_name(&upload("a.gif", "image/gif", b"x"), 1),
            Err(UploadError::UnsupportedType)
        ));
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            stored_file_name(&upload("a.png", "image/png", &big), 1),
            Err(UploadError::TooLarge)
        ));
        let exact = vec![0u8; MAX_IMAGE_BYTES];
        assert!(stored_file_name(&upload("a.png", "image/png", &exact), 1).is_ok());
    }

    #[tokio::test]
    async fn test_save_image_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("images").join("products");

        let url = save_image(&target, upload("Figs.webp", "image/webp", b"RIFF"))
            .await
            .unwrap();
        assert!(url.starts_with("/images/products/figs_"));
        assert!(url.ends_with(".webp"));

        let file_name = url.rsplit('/').next().unwrap();
        assert_eq!(std::fs::read(target.join(file_name)).unwrap(), b"RIFF");
    }
}
