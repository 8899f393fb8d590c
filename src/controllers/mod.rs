//! Page controllers. Each owns one slice of the UI and reaches the page only
//! through the capability traits below, so the browser bridge and the test
//! fakes are interchangeable.

pub mod conversation;
pub mod theme;
pub mod upload;

use std::cell::Cell;
use std::rc::Rc;

use crate::models::{QuotaState, Theme, ThemeHint};
use crate::state::{Banner, TranscriptEntry};

/// Last quota the backend reported, shared by every controller that
/// receives one.
#[derive(Clone, Debug, Default)]
pub struct SharedQuota(Rc<Cell<QuotaState>>);

impl SharedQuota {
    pub fn get(&self) -> QuotaState {
        self.0.get()
    }

    /// Records `quota` and shows it.
    pub fn publish(&self, quota: QuotaState, view: &impl TranscriptView) {
        self.0.set(quota);
        view.set_quota(quota);
    }
}

/// What every controller may do to the shared transcript area.
pub trait TranscriptView {
    fn append(&self, entry: TranscriptEntry);
    fn set_quota(&self, quota: QuotaState);
    fn show_banner(&self, banner: Banner);
}

/// The message composer and the transcript operations only the
/// conversation controller performs.
pub trait ComposerView: TranscriptView {
    fn input_value(&self) -> String;
    fn clear_input(&self);
    fn focus_input(&self);
    fn set_controls_disabled(&self, disabled: bool);
    fn set_typing(&self, visible: bool);
    fn show_welcome(&self);
    fn replace_transcript(&self, entries: Vec<TranscriptEntry>);
    fn confirm(&self, prompt: &str) -> bool;
    fn show_model(&self, model: &str);
}

pub trait UploadView: TranscriptView {
    /// Disables the upload trigger and shows the typing indicator.
    fn set_upload_busy(&self, busy: bool);
    fn reset_file_input(&self);
    fn set_drop_overlay(&self, visible: bool);
}

/// A file picked or dropped by the user.
pub trait LocalFile {
    fn name(&self) -> String;
    fn size(&self) -> u64;
    fn mime_type(&self) -> String;
    /// Short-lived URL for an inline preview, when the browser can make one.
    fn preview_url(&self) -> Option<String>;
}

pub trait ThemeSurface {
    fn apply(&self, theme: Theme);
    fn set_hint(&self, hint: ThemeHint);
    fn pulse_transition(&self, duration_ms: u32);
}
