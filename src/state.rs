use std::rc::Rc;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use yew::Reducible;

use crate::models::{FileData, QuotaState, Role};
use crate::utils::format_file_size;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryKind {
    Message,
    Error,
}

/// File block shown above an entry's text.
#[derive(Clone, PartialEq, Debug)]
pub struct FilePreview {
    pub filename: String,
    pub size_label: String,
    pub type_label: String,
    pub icon: String,
    pub image_url: Option<String>,
}

impl From<&FileData> for FilePreview {
    fn from(data: &FileData) -> Self {
        Self {
            filename: data.filename.clone(),
            size_label: format_file_size(data.size),
            type_label: data.extension.to_uppercase(),
            icon: "fas fa-file".to_string(),
            image_url: data.preview_url.clone().filter(|_| data.is_image()),
        }
    }
}

/// One rendered row of the transcript. Never mutated once appended.
#[derive(Clone, PartialEq, Debug)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub role: Role,
    pub kind: EntryKind,
    /// Already sanitized markup.
    pub body_html: String,
    pub at: DateTime<Utc>,
    pub file: Option<FilePreview>,
}

impl TranscriptEntry {
    pub fn message(role: Role, body_html: String, at: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4(), role, kind: EntryKind::Message, body_html, at, file: None }
    }

    pub fn error(body_html: String, at: DateTime<Utc>) -> Self {
        Self { kind: EntryKind::Error, ..Self::message(Role::Assistant, body_html, at) }
    }

    pub fn with_file(mut self, file: FilePreview) -> Self {
        self.file = Some(file);
        self
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BannerLevel {
    Warning,
    Danger,
}

impl BannerLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            BannerLevel::Warning => "alert alert-warning",
            BannerLevel::Danger => "alert alert-danger",
        }
    }
}

/// Dismissible notice shown above the transcript.
#[derive(Clone, PartialEq, Debug)]
pub struct Banner {
    pub id: Uuid,
    pub level: BannerLevel,
    pub title: Option<String>,
    pub text: String,
}

impl Banner {
    pub fn quota_exhausted() -> Self {
        Self {
            id: Uuid::new_v4(),
            level: BannerLevel::Warning,
            title: Some("Message limit reached!".to_string()),
            text: "Sign in to get higher limits.".to_string(),
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), level: BannerLevel::Danger, title: None, text: text.into() }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct PageState {
    pub entries: Vec<TranscriptEntry>,
    pub show_welcome: bool,
    pub chat_pending: bool,
    pub upload_pending: bool,
    pub controls_disabled: bool,
    pub quota: QuotaState,
    pub banners: Vec<Banner>,
    pub selected_model: String,
    pub drop_overlay: bool,
    /// Bumped whenever the composer should take focus after the next render.
    pub focus_request: u64,
}

impl PageState {
    pub fn new(selected_model: String) -> Self {
        Self {
            entries: Vec::new(),
            show_welcome: true,
            chat_pending: false,
            upload_pending: false,
            controls_disabled: false,
            quota: QuotaState::default(),
            banners: Vec::new(),
            selected_model,
            drop_overlay: false,
            focus_request: 0,
        }
    }

    pub fn typing_visible(&self) -> bool {
        self.chat_pending || self.upload_pending
    }

    /// True when applying `action` would leave the state as it is.
    fn unchanged_by(&self, action: &PageAction) -> bool {
        match action {
            PageAction::ShowWelcome => self.show_welcome && self.entries.is_empty(),
            PageAction::SetChatPending(pending) => self.chat_pending == *pending,
            PageAction::SetUploadPending(pending) => self.upload_pending == *pending,
            PageAction::SetControlsDisabled(disabled) => self.controls_disabled == *disabled,
            PageAction::SetQuota(quota) => self.quota == *quota,
            PageAction::DismissBanner(id) => self.banners.iter().all(|b| b.id != *id),
            PageAction::SelectModel(model) => self.selected_model == *model,
            PageAction::SetDropOverlay(visible) => self.drop_overlay == *visible,
            PageAction::Append(_)
            | PageAction::Replace(_)
            | PageAction::ShowBanner(_)
            | PageAction::RequestFocus => false,
        }
    }
}

pub enum PageAction {
    Append(TranscriptEntry),
    Replace(Vec<TranscriptEntry>),
    ShowWelcome,
    SetChatPending(bool),
    SetUploadPending(bool),
    SetControlsDisabled(bool),
    SetQuota(QuotaState),
    ShowBanner(Banner),
    DismissBanner(Uuid),
    SelectModel(String),
    SetDropOverlay(bool),
    RequestFocus,
}

impl Reducible for PageState {
    type Action = PageAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        // Same Rc back means no re-render.
        if self.unchanged_by(&action) {
            return self;
        }
        let mut next = (*self).clone();
        match action {
            PageAction::Append(entry) => {
                next.show_welcome = false;
                next.entries.push(entry);
            }
            PageAction::Replace(entries) => {
                next.show_welcome = false;
                next.entries = entries;
            }
            PageAction::ShowWelcome => {
                next.entries.clear();
                next.show_welcome = true;
            }
            PageAction::SetChatPending(pending) => next.chat_pending = pending,
            PageAction::SetUploadPending(pending) => next.upload_pending = pending,
            PageAction::SetControlsDisabled(disabled) => next.controls_disabled = disabled,
            PageAction::SetQuota(quota) => next.quota = quota,
            PageAction::ShowBanner(banner) => next.banners.push(banner),
            PageAction::DismissBanner(id) => next.banners.retain(|b| b.id != id),
            PageAction::SelectModel(model) => next.selected_model = model,
            PageAction::SetDropOverlay(visible) => next.drop_overlay = visible,
            PageAction::RequestFocus => next.focus_request = next.focus_request.wrapping_add(1),
        }
        Rc::new(next)
    }
}
