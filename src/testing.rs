//! In-memory stand-ins for the browser and the backend.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use async_trait::async_trait;

use crate::controllers::{ComposerView, LocalFile, ThemeSurface, TranscriptView, UploadView};
use crate::error::{ApiError, StorageError};
use crate::models::{
    HistoryResponse, ModelPreference, QuotaState, ReplyResponse, Role, SearchRequest, SearchResponse,
    SendMessageRequest, Theme, ThemeHint, UploadResponse,
};
use crate::services::api::ChatApi;
use crate::services::storage::KeyValueStore;
use crate::state::{Banner, EntryKind, TranscriptEntry};

/// Ordered record of requests and view updates, shared by the fakes.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn record(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.0.borrow().iter().position(|e| e == event)
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

/// Suspends once so concurrently joined futures get a turn while a request
/// is "in flight".
pub struct YieldOnce(bool);

impl YieldOnce {
    pub fn new() -> Self {
        YieldOnce(false)
    }
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[derive(Clone, Debug)]
pub struct FakeFile {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

impl FakeFile {
    pub fn new(name: &str, size: u64, mime: &str) -> Self {
        Self { name: name.into(), size, mime: mime.into() }
    }
}

impl LocalFile for FakeFile {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mime_type(&self) -> String {
        self.mime.clone()
    }

    fn preview_url(&self) -> Option<String> {
        self.mime.starts_with("image/").then(|| format!("blob:{}", self.name))
    }
}

#[derive(Default)]
pub struct ApiLog {
    pub journal: Journal,
    pub replies: RefCell<VecDeque<Result<ReplyResponse, ApiError>>>,
    pub search_results: RefCell<VecDeque<Result<SearchResponse, ApiError>>>,
    pub upload_results: RefCell<VecDeque<Result<UploadResponse, ApiError>>>,
    pub history: RefCell<Option<Result<HistoryResponse, ApiError>>>,
    pub clear_result: RefCell<Option<Result<(), ApiError>>>,
    pub preference: RefCell<Option<Result<ModelPreference, ApiError>>>,
    pub save_result: RefCell<Option<Result<(), ApiError>>>,
    pub sent: RefCell<Vec<SendMessageRequest>>,
    pub searched: RefCell<Vec<SearchRequest>>,
    pub uploaded: RefCell<Vec<String>>,
    pub saved: RefCell<Vec<ModelPreference>>,
    pub clears: Cell<usize>,
}

#[derive(Clone, Default)]
pub struct FakeApi(Rc<ApiLog>);

impl FakeApi {
    pub fn with_journal(journal: Journal) -> Self {
        FakeApi(Rc::new(ApiLog { journal, ..ApiLog::default() }))
    }
}

impl Deref for FakeApi {
    type Target = ApiLog;

    fn deref(&self) -> &ApiLog {
        &self.0
    }
}

fn no_canned_response() -> ApiError {
    ApiError::Transport("no canned response".into())
}

pub fn reply(text: &str, remaining: i64) -> Result<ReplyResponse, ApiError> {
    Ok(ReplyResponse { response: text.into(), messages_remaining: QuotaState::from(remaining) })
}

pub fn app_error(status: u16, message: &str) -> ApiError {
    ApiError::Application { status, message: message.into() }
}

#[async_trait(?Send)]
impl ChatApi for FakeApi {
    type File = FakeFile;

    async fn send_message(&self, request: &SendMessageRequest) -> Result<ReplyResponse, ApiError> {
        self.journal.record("request:send_message");
        self.sent.borrow_mut().push(request.clone());
        YieldOnce::new().await;
        self.replies.borrow_mut().pop_front().unwrap_or_else(|| Err(no_canned_response()))
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        self.journal.record("request:search");
        self.searched.borrow_mut().push(request.clone());
        YieldOnce::new().await;
        self.search_results.borrow_mut().pop_front().unwrap_or_else(|| Err(no_canned_response()))
    }

    async fn upload_file(&self, file: &FakeFile) -> Result<UploadResponse, ApiError> {
        self.journal.record("request:upload_file");
        self.uploaded.borrow_mut().push(file.name.clone());
        YieldOnce::new().await;
        self.upload_results.borrow_mut().pop_front().unwrap_or_else(|| Err(no_canned_response()))
    }

    async fn chat_history(&self) -> Result<HistoryResponse, ApiError> {
        self.journal.record("request:get_chat_history");
        self.history.borrow_mut().take().unwrap_or_else(|| Err(no_canned_response()))
    }

    async fn clear_chat(&self) -> Result<(), ApiError> {
        self.journal.record("request:clear_chat");
        self.clears.set(self.clears.get() + 1);
        self.clear_result.borrow_mut().take().unwrap_or(Ok(()))
    }

    async fn model_preference(&self) -> Result<ModelPreference, ApiError> {
        self.journal.record("request:get_model_preference");
        self.preference.borrow_mut().take().unwrap_or_else(|| Ok(ModelPreference::default()))
    }

    async fn save_model_preference(&self, preference: &ModelPreference) -> Result<(), ApiError> {
        self.journal.record("request:save_model_preference");
        self.saved.borrow_mut().push(preference.clone());
        self.save_result.borrow_mut().take().unwrap_or(Ok(()))
    }
}

#[derive(Default)]
pub struct ViewLog {
    pub journal: Journal,
    pub input: RefCell<String>,
    pub entries: RefCell<Vec<TranscriptEntry>>,
    pub welcome_count: Cell<usize>,
    pub banners: RefCell<Vec<Banner>>,
    pub quota: Cell<Option<QuotaState>>,
    pub controls_disabled: Cell<bool>,
    pub typing: Cell<bool>,
    pub focus_count: Cell<usize>,
    pub confirm_answer: Cell<bool>,
    pub prompts: RefCell<Vec<String>>,
    pub model: RefCell<Option<String>>,
    pub upload_busy: Cell<bool>,
    pub file_input_resets: Cell<usize>,
    pub overlay: Cell<bool>,
}

impl ViewLog {
    pub fn count(&self, role: Role, kind: EntryKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.role == role && e.kind == kind)
            .count()
    }

    pub fn last_body(&self) -> String {
        self.entries.borrow().last().map(|e| e.body_html.clone()).unwrap_or_default()
    }
}

#[derive(Clone, Default)]
pub struct FakeView(Rc<ViewLog>);

impl FakeView {
    pub fn with_journal(journal: Journal) -> Self {
        FakeView(Rc::new(ViewLog { journal, ..ViewLog::default() }))
    }

    pub fn type_input(&self, text: &str) {
        *self.input.borrow_mut() = text.to_string();
    }
}

impl Deref for FakeView {
    type Target = ViewLog;

    fn deref(&self) -> &ViewLog {
        &self.0
    }
}

impl TranscriptView for FakeView {
    fn append(&self, entry: TranscriptEntry) {
        let label = match entry.kind {
            EntryKind::Error => "append:error".to_string(),
            EntryKind::Message => format!("append:{}", entry.role.as_str()),
        };
        self.journal.record(label);
        self.entries.borrow_mut().push(entry);
    }

    fn set_quota(&self, quota: QuotaState) {
        self.journal.record("quota");
        self.quota.set(Some(quota));
    }

    fn show_banner(&self, banner: Banner) {
        self.journal.record("banner");
        self.banners.borrow_mut().push(banner);
    }
}

impl ComposerView for FakeView {
    fn input_value(&self) -> String {
        self.input.borrow().clone()
    }

    fn clear_input(&self) {
        self.input.borrow_mut().clear();
    }

    fn focus_input(&self) {
        self.focus_count.set(self.focus_count.get() + 1);
    }

    fn set_controls_disabled(&self, disabled: bool) {
        self.journal.record(format!("controls_disabled:{}", disabled));
        self.controls_disabled.set(disabled);
    }

    fn set_typing(&self, visible: bool) {
        self.journal.record(format!("typing:{}", visible));
        self.typing.set(visible);
    }

    fn show_welcome(&self) {
        self.journal.record("welcome");
        self.entries.borrow_mut().clear();
        self.welcome_count.set(self.welcome_count.get() + 1);
    }

    fn replace_transcript(&self, entries: Vec<TranscriptEntry>) {
        self.journal.record("replace");
        *self.entries.borrow_mut() = entries;
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.confirm_answer.get()
    }

    fn show_model(&self, model: &str) {
        *self.model.borrow_mut() = Some(model.to_string());
    }
}

impl UploadView for FakeView {
    fn set_upload_busy(&self, busy: bool) {
        self.journal.record(format!("upload_busy:{}", busy));
        self.upload_busy.set(busy);
    }

    fn reset_file_input(&self) {
        self.file_input_resets.set(self.file_input_resets.get() + 1);
    }

    fn set_drop_overlay(&self, visible: bool) {
        self.overlay.set(visible);
    }
}

#[derive(Default)]
pub struct StoreLog {
    pub values: RefCell<HashMap<String, String>>,
    pub read_only: Cell<bool>,
    pub disabled: Cell<bool>,
}

#[derive(Clone, Default)]
pub struct FakeStore(Rc<StoreLog>);

impl FakeStore {
    pub fn with(key: &str, value: &str) -> Self {
        let store = FakeStore::default();
        store.values.borrow_mut().insert(key.into(), value.into());
        store
    }
}

impl Deref for FakeStore {
    type Target = StoreLog;

    fn deref(&self) -> &StoreLog {
        &self.0
    }
}

impl KeyValueStore for FakeStore {
    fn get(&self, key: &str) -> Option<String> {
        if self.disabled.get() {
            return None;
        }
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.disabled.get() {
            return Err(StorageError::Unavailable);
        }
        if self.read_only.get() {
            return Err(StorageError::Rejected("QuotaExceededError".into()));
        }
        self.values.borrow_mut().insert(key.into(), value.into());
        Ok(())
    }
}

#[derive(Default)]
pub struct SurfaceLog {
    pub applied: RefCell<Vec<Theme>>,
    pub hints: RefCell<Vec<ThemeHint>>,
    pub pulses: RefCell<Vec<u32>>,
}

#[derive(Clone, Default)]
pub struct FakeSurface(Rc<SurfaceLog>);

impl Deref for FakeSurface {
    type Target = SurfaceLog;

    fn deref(&self) -> &SurfaceLog {
        &self.0
    }
}

impl ThemeSurface for FakeSurface {
    fn apply(&self, theme: Theme) {
        self.applied.borrow_mut().push(theme);
    }

    fn set_hint(&self, hint: ThemeHint) {
        self.hints.borrow_mut().push(hint);
    }

    fn pulse_transition(&self, duration_ms: u32) {
        self.pulses.borrow_mut().push(duration_ms);
    }
}
