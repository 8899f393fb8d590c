use std::cell::Cell;

use chrono::Utc;

use crate::controllers::{LocalFile, SharedQuota, UploadView};
use crate::error::{ApiError, FileRejection};
use crate::models::Role;
use crate::services::api::ChatApi;
use crate::state::{Banner, FilePreview, TranscriptEntry};
use crate::utils::{format_file_size, MarkdownRenderer, PlainText};

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// MIME type, extension, icon and label for every accepted upload.
const ALLOWED_TYPES: [(&str, &str, &str, &str); 5] = [
    ("text/plain", ".txt", "fas fa-file-alt", "Text"),
    ("application/pdf", ".pdf", "fas fa-file-pdf", "PDF"),
    ("image/jpeg", ".jpg", "fas fa-file-image", "JPEG"),
    ("image/jpg", ".jpg", "fas fa-file-image", "JPG"),
    ("image/png", ".png", "fas fa-file-image", "PNG"),
];

const UPLOAD_ERROR_PREFIX: &str = "❌ Upload Error";
const UPLOAD_NETWORK_FAILURE: &str = "❌ Network error during file upload. Please try again.";

pub fn allowed_extensions() -> Vec<&'static str> {
    let mut extensions: Vec<&'static str> = Vec::new();
    for (_, ext, _, _) in ALLOWED_TYPES {
        if !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }
    extensions
}

/// Value for the file input's `accept` attribute. MIME types are listed too
/// so `.jpeg` files stay selectable.
pub fn accept_attribute() -> String {
    let mut accepted = allowed_extensions();
    for (mime, ..) in ALLOWED_TYPES {
        if !accepted.contains(&mime) {
            accepted.push(mime);
        }
    }
    accepted.join(",")
}

/// Hint shown on the drop overlay.
pub fn supported_files_hint() -> String {
    format!("Supported: {} (max {})", allowed_extensions().join(", "), format_file_size(MAX_FILE_SIZE))
}

/// Checks type, then size ceiling, then emptiness.
pub fn validate_file(mime_type: &str, size: u64) -> Result<(), FileRejection> {
    if !ALLOWED_TYPES.iter().any(|(mime, ..)| *mime == mime_type) {
        return Err(FileRejection::UnsupportedType { allowed: allowed_extensions().join(", ") });
    }
    if size > MAX_FILE_SIZE {
        return Err(FileRejection::TooLarge { limit: format_file_size(MAX_FILE_SIZE) });
    }
    if size == 0 {
        return Err(FileRejection::Empty);
    }
    Ok(())
}

pub fn file_icon(mime_type: &str) -> &'static str {
    ALLOWED_TYPES
        .iter()
        .find(|(mime, ..)| *mime == mime_type)
        .map(|(_, _, icon, _)| *icon)
        .unwrap_or("fas fa-file")
}

pub fn file_type_label(mime_type: &str) -> &'static str {
    ALLOWED_TYPES
        .iter()
        .find(|(mime, ..)| *mime == mime_type)
        .map(|(_, _, _, label)| *label)
        .unwrap_or("File")
}

/// True once a drag has left the visible page. Browsers report `(0, 0)` on
/// leaving the window; anything on or past an edge counts too.
pub fn left_viewport(x: i32, y: i32, width: f64, height: f64) -> bool {
    let (x, y) = (f64::from(x), f64::from(y));
    x <= 0.0 || y <= 0.0 || x >= width || y >= height
}

/// Single-file uploads from the picker or a document-wide drop.
pub struct UploadController<A, V> {
    api: A,
    view: V,
    renderer: Box<dyn MarkdownRenderer>,
    quota: SharedQuota,
    uploading: Cell<bool>,
}

impl<A, V> UploadController<A, V>
where
    A: ChatApi,
    A::File: LocalFile,
    V: UploadView,
{
    pub fn new(api: A, view: V, renderer: Box<dyn MarkdownRenderer>, quota: SharedQuota) -> Self {
        Self { api, view, renderer, quota, uploading: Cell::new(false) }
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.get()
    }

    pub async fn upload(&self, file: A::File) {
        if self.uploading.get() {
            log::debug!("upload of {} ignored, another upload is in flight", file.name());
            return;
        }

        if let Err(rejection) = validate_file(&file.mime_type(), file.size()) {
            log::debug!("rejected {}: {}", file.name(), rejection);
            self.view.show_banner(Banner::danger(rejection.to_string()));
            return;
        }

        self.uploading.set(true);
        self.view.set_upload_busy(true);
        self.view.append(Self::local_preview(&file));

        match self.api.upload_file(&file).await {
            Ok(uploaded) => {
                self.view.append(TranscriptEntry::message(
                    Role::Assistant,
                    self.renderer.render(&uploaded.response),
                    Utc::now(),
                ));
                self.quota.publish(uploaded.messages_remaining, &self.view);
            }
            Err(err) => self.report_failure(&err),
        }

        self.uploading.set(false);
        self.view.set_upload_busy(false);
        self.view.reset_file_input();
    }

    fn local_preview(file: &A::File) -> TranscriptEntry {
        let mime = file.mime_type();
        let preview = FilePreview {
            filename: file.name(),
            size_label: format_file_size(file.size()),
            type_label: file_type_label(&mime).to_string(),
            icon: file_icon(&mime).to_string(),
            image_url: if mime.starts_with("image/") { file.preview_url() } else { None },
        };
        TranscriptEntry::message(Role::User, String::new(), Utc::now()).with_file(preview)
    }

    fn report_failure(&self, err: &ApiError) {
        let text = match err.user_message() {
            Some(message) => {
                log::warn!("upload rejected: {}", err);
                format!("{}: {}", UPLOAD_ERROR_PREFIX, message)
            }
            None => {
                log::error!("upload failed: {}", err);
                UPLOAD_NETWORK_FAILURE.to_string()
            }
        };
        self.view.append(TranscriptEntry::error(PlainText.render(&text), Utc::now()));

        if err.is_quota_exhausted() {
            self.view.show_banner(Banner::quota_exhausted());
        }
    }

    pub fn drag_entered(&self, carries_files: bool) {
        if carries_files {
            self.view.set_drop_overlay(true);
        }
    }

    pub fn drag_left(&self, x: i32, y: i32, viewport: (f64, f64)) {
        if left_viewport(x, y, viewport.0, viewport.1) {
            self.view.set_drop_overlay(false);
        }
    }

    /// Only the first dropped file is uploaded.
    pub async fn dropped(&self, files: Vec<A::File>) {
        self.view.set_drop_overlay(false);
        if let Some(first) = files.into_iter().next() {
            self.upload(first).await;
        }
    }
}
