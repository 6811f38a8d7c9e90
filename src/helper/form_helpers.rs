use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::collections::HashMap;

use crate::error::ApiError;

/// Largest accepted non-file form field.
pub const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;
/// Most text fields one form may carry.
pub const MAX_TEXT_FIELDS: usize = 64;

/// Trims a submitted value; blank or absent becomes `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Checkbox-style flag: `true`, `on`, `yes` and `1` count as set.
pub fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true") | Some("on") | Some("yes") | Some("1")
    )
}

/// One uploaded file. `size` is the full streamed length; `bytes` holds at
/// most the read limit, so an oversized part is detectable without buffering it.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(false, |ct| ct.starts_with("image/"))
    }
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<FilePart>,
}

impl MultipartForm {
    /// Normalized text value of a field.
    pub fn text(&self, name: &str) -> Option<String> {
        normalize_optional(self.fields.get(name).cloned())
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn take_file(&mut self, name: &str) -> Option<FilePart> {
        let index = self.files.iter().position(|f| f.field == name)?;
        Some(self.files.remove(index))
    }

    #[cfg(test)]
    pub fn from_parts(fields: Vec<(&str, &str)>, files: Vec<FilePart>) -> Self {
        MultipartForm {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files,
        }
    }
}

/// Discards the rest of a part without keeping any of it.
async fn skip_part(field: &mut actix_multipart::Field) -> Result<u64, ApiError> {
    let mut skipped: u64 = 0;
    while let Some(chunk) = field.next().await {
        skipped += chunk?.len() as u64;
    }
    Ok(skipped)
}

/// Drains a multipart body into text fields and the single file part named
/// `file_field`. Other file parts are read past without being buffered, and
/// file bytes beyond `file_limit` are counted but not kept.
pub async fn read_multipart(
    mut payload: Multipart,
    file_field: &str,
    file_limit: u64,
) -> Result<MultipartForm, ApiError> {
    let mut form = MultipartForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let filename = disposition.get_filename().map(|s| s.to_string());

        match filename {
            Some(filename) => {
                if name != file_field || !form.files.is_empty() {
                    let skipped = skip_part(&mut field).await?;
                    log::debug!("Ignored file part '{}' ({} bytes).", name, skipped);
                    continue;
                }
                let content_type = field.content_type().map(|m| m.essence_str().to_string());
                let mut size: u64 = 0;
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let data = chunk?;
                    size += data.len() as u64;
                    if size <= file_limit {
                        bytes.extend_from_slice(&data);
                    }
                }
                // Browsers send an empty part when no file was chosen.
                if filename.is_empty() && size == 0 {
                    continue;
                }
                form.files.push(FilePart {
                    field: name,
                    filename: Some(filename),
                    content_type,
                    size,
                    bytes,
                });
            }
            None => {
                if form.fields.len() >= MAX_TEXT_FIELDS && !form.fields.contains_key(&name) {
                    return Err(ApiError::validation("The form has too many fields."));
                }
                let mut data = Vec::new();
                while let Some(chunk) = field.next().await {
                    data.extend_from_slice(&chunk?);
                    if data.len() > MAX_TEXT_FIELD_BYTES {
                        return Err(ApiError::validation(format!("Field '{}' is too long.", name)));
                    }
                }
                let value = String::from_utf8(data)
                    .map_err(|_| ApiError::validation("Invalid UTF-8 in form field."))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_normalize_to_none() {
        assert_eq!(normalize_optional(Some("   ".into())), None);
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some(" Dhaka ".into())), Some("Dhaka".into()));
    }

    #[test]
    fn declaration_flags() {
        assert!(is_truthy(Some("true")));
        assert!(is_truthy(Some("ON")));
        assert!(is_truthy(Some("1")));
        assert!(!is_truthy(Some("false")));
        assert!(!is_truthy(Some("")));
        assert!(!is_truthy(None));
    }

    #[test]
    fn take_file_removes_the_named_part() {
        let part = FilePart {
            field: "photo".into(),
            filename: Some("me.png".into()),
            content_type: Some("image/png".into()),
            size: 3,
            bytes: vec![1, 2, 3],
        };
        let mut form = MultipartForm::from_parts(vec![("name", "Rahim")], vec![part]);
        assert!(form.take_file("file").is_none());
        assert!(form.take_file("photo").unwrap().is_image());
        assert!(form.take_file("photo").is_none());
        assert_eq!(form.text("name").as_deref(), Some("Rahim"));
    }
}
