use actix_web::web;
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::ApiError;
use crate::helper::form_helpers::FilePart;
use crate::models::StoredObject;

/// Upload ceiling shared by every bucket.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];
const DOCUMENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif", "application/pdf"];

/// Maps an accepted MIME type to the extension used on disk.
fn mime_to_safe_extension(mime_type: &str) -> Option<&'static str> {
    let map: BTreeMap<&str, &str> = [
        ("application/pdf", "pdf"),
        ("image/gif", "gif"),
        ("image/jpeg", "jpg"),
        ("image/png", "png"),
        ("image/webp", "webp"),
    ]
    .iter()
    .cloned()
    .collect();

    map.get(mime_type).cloned()
}

/// Extensions a client may keep for a given MIME type.
fn extensions_for(mime_type: &str) -> &'static [&'static str] {
    match mime_type {
        "image/jpeg" => &["jpg", "jpeg"],
        "image/png" => &["png"],
        "image/webp" => &["webp"],
        "image/gif" => &["gif"],
        "application/pdf" => &["pdf"],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    MemberPhotos,
    MembershipDocuments,
    EventImages,
    GalleryImages,
    NewsImages,
}

impl Bucket {
    pub const ALL: &'static [Bucket] = &[
        Bucket::MemberPhotos,
        Bucket::MembershipDocuments,
        Bucket::EventImages,
        Bucket::GalleryImages,
        Bucket::NewsImages,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Bucket::MemberPhotos => "member-photos",
            Bucket::MembershipDocuments => "membership-documents",
            Bucket::EventImages => "events",
            Bucket::GalleryImages => "gallery",
            Bucket::NewsImages => "news",
        }
    }

    pub fn allowed_types(&self) -> &'static [&'static str] {
        match self {
            Bucket::MembershipDocuments => DOCUMENT_TYPES,
            _ => IMAGE_TYPES,
        }
    }
}

/// Checks size and type and returns the extension the object will be stored with.
pub fn validate_upload(bucket: Bucket, file: &FilePart) -> Result<&'static str, ApiError> {
    if file.size == 0 {
        return Err(ApiError::validation("No file was uploaded."));
    }
    if file.size > MAX_UPLOAD_BYTES {
        return Err(ApiError::validation(format!(
            "File is too large. Maximum size is {}MB.",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }

    let content_type = file.content_type.as_deref().unwrap_or_default();
    if !bucket.allowed_types().iter().any(|allowed| *allowed == content_type) {
        return Err(ApiError::validation(format!(
            "Unsupported file type: '{}'. Allowed types: {}.",
            content_type,
            bucket.allowed_types().join(", ")
        )));
    }

    let original = file
        .filename
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    if let Some(ext) = original {
        if let Some(kept) = extensions_for(content_type).iter().find(|e| **e == ext) {
            return Ok(*kept);
        }
    }

    mime_to_safe_extension(content_type).ok_or_else(|| {
        log::error!("Allowed MIME type '{}' has no extension mapping.", content_type);
        ApiError::Storage(String::new())
    })
}

fn check_folder(folder: &str) -> Result<(), ApiError> {
    let ok = !folder.is_empty()
        && folder.len() <= 64
        && folder.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ApiError::validation(
            "Folder names may only contain letters, digits, '-' and '_'.",
        ))
    }
}

/// `{millis}-{random hex}.{ext}`
fn object_name(ext: &str) -> String {
    let token: [u8; 6] = rand::random();
    format!("{}-{}.{}", Utc::now().timestamp_millis(), hex::encode(token), ext)
}

/// Resolves a public object URL back to its path below the media root.
/// Anything that is not one of our URLs, or that tries to escape the root, yields `None`.
pub fn relative_path_for_url(public_base_url: &str, url: &str) -> Option<PathBuf> {
    let prefix = format!("{}/media/", public_base_url);
    let rest = url.strip_prefix(&prefix)?;
    let relative = PathBuf::from(rest);
    let clean = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if clean && relative.components().count() >= 2 {
        Some(relative)
    } else {
        None
    }
}

/// Filesystem-backed object store served under `/media`.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        MediaStore {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn store(
        &self,
        bucket: Bucket,
        folder: Option<&str>,
        file: FilePart,
    ) -> Result<StoredObject, ApiError> {
        let ext = validate_upload(bucket, &file)?;
        let name = object_name(ext);
        let path = match folder {
            Some(folder) => {
                check_folder(folder)?;
                format!("{}/{}", folder, name)
            }
            None => name,
        };

        let target = self.root.join(bucket.dir_name()).join(&path);
        let bytes = file.bytes;
        web::block(move || -> std::io::Result<()> {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &bytes)
        })
        .await??;

        log::info!("Stored upload {}/{}", bucket.dir_name(), path);
        Ok(StoredObject {
            url: format!("{}/media/{}/{}", self.public_base_url, bucket.dir_name(), path),
            path,
        })
    }

    /// Deletes the object behind `url`. Returns whether a file was removed.
    pub async fn remove_by_url(&self, url: &str) -> Result<bool, ApiError> {
        let relative = match relative_path_for_url(&self.public_base_url, url) {
            Some(relative) => relative,
            None => {
                log::warn!("Not removing '{}': it is not a stored object URL.", url);
                return Ok(false);
            }
        };
        let target = self.root.join(relative);
        let removed = web::block(move || match fs::remove_file(&target) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        })
        .await??;
        Ok(removed)
    }

    /// Best-effort cleanup after a record is deleted.
    pub async fn discard(&self, url: Option<&str>) {
        if let Some(url) = url {
            if let Err(e) = self.remove_by_url(url).await {
                log::error!("Failed to delete stored object {}: {}", url, e);
            }
        }
    }
}
