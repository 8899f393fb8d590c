use std::cell::{Cell, RefCell};
use std::future::Future;

use chrono::Utc;

use crate::controllers::{ComposerView, SharedQuota};
use crate::error::ApiError;
use crate::models::{HistoryMessage, ModelPreference, QuotaState, Role, SearchRequest, SendMessageRequest};
use crate::services::api::ChatApi;
use crate::state::{Banner, FilePreview, TranscriptEntry};
use crate::utils::{parse_server_timestamp, MarkdownRenderer, PlainText};

pub const CLEAR_CONFIRMATION: &str = "Are you sure you want to clear the chat history?";

/// User-facing wording for one kind of exchange.
struct Wording {
    error_prefix: &'static str,
    network_failure: &'static str,
}

const CHAT: Wording = Wording {
    error_prefix: "❌ Error",
    network_failure: "❌ Network error. Please try again.",
};

const SEARCH: Wording = Wording {
    error_prefix: "❌ Search Error",
    network_failure: "❌ Search failed. Please try again.",
};

/// Chat and search turns, history sync, quota display and the model
/// preference. At most one chat-or-search request is in flight; further
/// attempts are dropped while `is_typing` is set.
pub struct ConversationController<A, V> {
    api: A,
    view: V,
    renderer: Box<dyn MarkdownRenderer>,
    is_typing: Cell<bool>,
    quota: SharedQuota,
    model: RefCell<String>,
}

impl<A, V> ConversationController<A, V>
where
    A: ChatApi,
    V: ComposerView,
{
    pub fn new(
        api: A,
        view: V,
        renderer: Box<dyn MarkdownRenderer>,
        quota: SharedQuota,
        default_model: String,
    ) -> Self {
        Self {
            api,
            view,
            renderer,
            is_typing: Cell::new(false),
            quota,
            model: RefCell::new(default_model),
        }
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing.get()
    }

    pub fn selected_model(&self) -> String {
        self.model.borrow().clone()
    }

    pub async fn send_message(&self) {
        let Some(message) = self.take_input() else { return };

        let request = SendMessageRequest { message: message.clone(), model: self.selected_model() };
        let call = async {
            self.api
                .send_message(&request)
                .await
                .map(|reply| (reply.response, reply.messages_remaining))
        };
        self.exchange(&message, call, &CHAT).await;
    }

    pub async fn perform_search(&self) {
        let Some(query) = self.take_input() else { return };

        let echo = format!("🔍 Search: {}", query);
        let request = SearchRequest { query };
        let call = async {
            self.api
                .search(&request)
                .await
                .map(|found| (found.results, found.messages_remaining))
        };
        self.exchange(&echo, call, &SEARCH).await;
    }

    /// Trimmed composer text, or `None` when there is nothing to send or a
    /// request is already outstanding.
    fn take_input(&self) -> Option<String> {
        let text = self.view.input_value().trim().to_string();
        if text.is_empty() || self.is_typing.get() {
            return None;
        }
        Some(text)
    }

    async fn exchange<F>(&self, echo: &str, call: F, wording: &Wording)
    where
        F: Future<Output = Result<(String, QuotaState), ApiError>>,
    {
        self.view.clear_input();
        self.view.set_controls_disabled(true);
        self.view
            .append(TranscriptEntry::message(Role::User, self.renderer.render(echo), Utc::now()));
        self.is_typing.set(true);
        self.view.set_typing(true);

        match call.await {
            Ok((reply, quota)) => {
                self.view.append(TranscriptEntry::message(
                    Role::Assistant,
                    self.renderer.render(&reply),
                    Utc::now(),
                ));
                self.update_message_count(quota);
            }
            Err(err) => self.report_failure(&err, wording),
        }

        self.is_typing.set(false);
        self.view.set_typing(false);
        self.view.set_controls_disabled(false);
        self.view.focus_input();
    }

    fn report_failure(&self, err: &ApiError, wording: &Wording) {
        let text = match err.user_message() {
            Some(message) => {
                log::warn!("backend rejected request: {}", err);
                format!("{}: {}", wording.error_prefix, message)
            }
            None => {
                log::error!("request failed: {}", err);
                wording.network_failure.to_string()
            }
        };
        self.view.append(TranscriptEntry::error(PlainText.render(&text), Utc::now()));

        if err.is_quota_exhausted() {
            self.view.show_banner(Banner::quota_exhausted());
        }
    }

    pub fn update_message_count(&self, quota: QuotaState) {
        self.quota.publish(quota, &self.view);
    }

    /// Replaces whatever the transcript shows with the server's history.
    pub async fn load_chat_history(&self) {
        let history = match self.api.chat_history().await {
            Ok(history) => history,
            Err(err) => {
                log::error!("could not load chat history: {}", err);
                return;
            }
        };

        if history.messages.is_empty() {
            self.view.show_welcome();
        } else {
            let entries = history.messages.iter().map(|m| self.history_entry(m)).collect();
            self.view.replace_transcript(entries);
        }
        self.update_message_count(history.messages_remaining);
    }

    fn history_entry(&self, message: &HistoryMessage) -> TranscriptEntry {
        let at = message
            .timestamp
            .as_deref()
            .and_then(parse_server_timestamp)
            .unwrap_or_else(Utc::now);
        let entry = TranscriptEntry::message(message.role, self.renderer.render(&message.content), at);
        match &message.file_data {
            Some(file) => entry.with_file(FilePreview::from(file)),
            None => entry,
        }
    }

    pub async fn clear_chat(&self) {
        if !self.view.confirm(CLEAR_CONFIRMATION) {
            return;
        }

        match self.api.clear_chat().await {
            Ok(()) => {
                self.view.show_welcome();
                self.view.set_quota(self.quota.get());
            }
            Err(err) => log::error!("could not clear chat: {}", err),
        }
    }

    pub async fn load_model_preference(&self) {
        match self.api.model_preference().await {
            Ok(ModelPreference { model: Some(model) }) if !model.is_empty() => {
                self.view.show_model(&model);
                *self.model.borrow_mut() = model;
            }
            Ok(_) => {}
            Err(err) => log::warn!("could not load model preference: {}", err),
        }
    }

    pub async fn change_model(&self, model: String) {
        *self.model.borrow_mut() = model.clone();
        self.view.show_model(&model);

        let preference = ModelPreference { model: Some(model) };
        if let Err(err) = self.api.save_model_preference(&preference).await {
            log::warn!("could not save model preference: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::controllers::TranscriptView;
    use crate::models::{FileData, HistoryResponse, SearchResponse};
    use crate::state::EntryKind;
    use crate::testing::{app_error, reply, FakeApi, FakeView, Journal};
    use crate::utils::CommonMark;

    fn controller(journal: &Journal) -> (ConversationController<FakeApi, FakeView>, FakeApi, FakeView) {
        let api = FakeApi::with_journal(journal.clone());
        let view = FakeView::with_journal(journal.clone());
        let ctrl = ConversationController::new(
            api.clone(),
            view.clone(),
            Box::new(CommonMark),
            SharedQuota::default(),
            "openai/gpt-3.5-turbo".into(),
        );
        (ctrl, api, view)
    }

    fn message(role: Role, content: &str) -> HistoryMessage {
        HistoryMessage {
            role,
            content: content.into(),
            timestamp: Some("2024-05-01T12:00:00".into()),
            file_data: None,
        }
    }

    #[test]
    fn send_echoes_before_request_and_replies_after() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        api.replies.borrow_mut().push_back(reply("**Hi** there", 7));
        view.type_input("  hello  ");

        block_on(ctrl.send_message());

        let user = journal.position("append:user").unwrap();
        let request = journal.position("request:send_message").unwrap();
        let assistant = journal.position("append:assistant").unwrap();
        assert!(user < request && request < assistant);

        assert_eq!(view.count(Role::User, EntryKind::Message), 1);
        assert_eq!(view.count(Role::Assistant, EntryKind::Message), 1);
        assert_eq!(view.count(Role::Assistant, EntryKind::Error), 0);
        assert!(view.last_body().contains("<strong>Hi</strong>"));

        let sent = api.sent.borrow();
        assert_eq!(sent[0].message, "hello");
        assert_eq!(sent[0].model, "openai/gpt-3.5-turbo");
        assert_eq!(view.quota.get(), Some(QuotaState::Remaining(7)));
        assert!(view.input.borrow().is_empty());
    }

    #[test]
    fn controls_are_restored_on_every_outcome() {
        for outcome in [reply("ok", 3), Err(app_error(500, "boom")), Err(ApiError::Transport("offline".into()))] {
            let journal = Journal::default();
            let (ctrl, api, view) = controller(&journal);
            api.replies.borrow_mut().push_back(outcome);
            view.type_input("hi");

            block_on(ctrl.send_message());

            assert!(!ctrl.is_typing());
            assert!(!view.typing.get());
            assert!(!view.controls_disabled.get());
            assert_eq!(view.focus_count.get(), 1);
            assert_eq!(journal.count_prefix("controls_disabled:true"), 1);
            assert_eq!(journal.count_prefix("typing:true"), 1);
        }
    }

    #[test]
    fn blank_input_sends_nothing() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        view.type_input("   \n\t ");

        block_on(ctrl.send_message());
        block_on(ctrl.perform_search());

        assert!(api.sent.borrow().is_empty());
        assert!(api.searched.borrow().is_empty());
        assert!(view.entries.borrow().is_empty());
    }

    #[test]
    fn second_send_is_rejected_while_first_is_in_flight() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        api.replies.borrow_mut().push_back(reply("first", 9));
        api.replies.borrow_mut().push_back(reply("second", 8));
        view.type_input("one");

        let second = async {
            view.type_input("two");
            ctrl.send_message().await;
            ctrl.perform_search().await;
        };
        block_on(async { futures::join!(ctrl.send_message(), second) });

        assert_eq!(api.sent.borrow().len(), 1);
        assert!(api.searched.borrow().is_empty());
        assert_eq!(view.count(Role::User, EntryKind::Message), 1);
        assert_eq!(view.count(Role::Assistant, EntryKind::Message), 1);
        assert_eq!(*view.input.borrow(), "two");
    }

    #[test]
    fn application_error_shows_message_without_banner() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        api.replies.borrow_mut().push_back(Err(app_error(400, "Message cannot be empty")));
        view.type_input("hi");

        block_on(ctrl.send_message());

        assert_eq!(view.count(Role::Assistant, EntryKind::Error), 1);
        assert_eq!(view.count(Role::Assistant, EntryKind::Message), 0);
        assert!(view.last_body().contains("❌ Error: Message cannot be empty"));
        assert!(view.banners.borrow().is_empty());
        assert_eq!(view.quota.get(), None);
    }

    #[test]
    fn quota_exhaustion_adds_banner() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        api.replies.borrow_mut().push_back(Err(app_error(429, "Daily message limit reached")));
        view.type_input("hi");

        block_on(ctrl.send_message());

        assert_eq!(view.count(Role::Assistant, EntryKind::Error), 1);
        let banners = view.banners.borrow();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0], Banner { id: banners[0].id, ..Banner::quota_exhausted() });
    }

    #[test]
    fn transport_failure_uses_generic_message() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        api.replies.borrow_mut().push_back(Err(ApiError::Transport("connection refused".into())));
        view.type_input("hi");

        block_on(ctrl.send_message());

        assert!(view.last_body().contains("❌ Network error. Please try again."));
        assert!(!view.last_body().contains("connection refused"));
        assert!(view.banners.borrow().is_empty());
    }

    #[test]
    fn error_text_is_escaped() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        api.replies.borrow_mut().push_back(Err(app_error(500, "<img src=x onerror=alert(1)>")));
        view.type_input("hi");

        block_on(ctrl.send_message());

        assert!(!view.last_body().contains("<img"));
    }

    #[test]
    fn search_marks_echo_and_sends_query_only() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        api.search_results.borrow_mut().push_back(Ok(SearchResponse {
            results: "1. rust-lang.org".into(),
            messages_remaining: QuotaState::Remaining(2),
        }));
        view.type_input("rust wasm");

        block_on(ctrl.perform_search());

        assert_eq!(api.searched.borrow()[0].query, "rust wasm");
        let entries = view.entries.borrow();
        assert!(entries[0].body_html.contains("🔍 Search: rust wasm"));
        assert_eq!(entries[1].role, Role::Assistant);
        assert_eq!(view.quota.get(), Some(QuotaState::Remaining(2)));
    }

    #[test]
    fn search_failures_use_search_wording() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        api.search_results.borrow_mut().push_back(Err(app_error(429, "Message limit reached. Please sign in to continue.")));
        view.type_input("q");
        block_on(ctrl.perform_search());
        assert!(view.last_body().contains("❌ Search Error: Message limit reached"));
        assert_eq!(view.banners.borrow().len(), 1);

        view.type_input("q");
        block_on(ctrl.perform_search());
        assert!(view.last_body().contains("❌ Search failed. Please try again."));
        assert_eq!(view.banners.borrow().len(), 1);
    }

    #[test]
    fn empty_history_shows_welcome_once() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        *api.history.borrow_mut() = Some(Ok(HistoryResponse {
            messages: vec![],
            messages_remaining: QuotaState::Remaining(10),
        }));

        block_on(ctrl.load_chat_history());

        assert_eq!(view.welcome_count.get(), 1);
        assert!(view.entries.borrow().is_empty());
        assert_eq!(view.quota.get(), Some(QuotaState::Remaining(10)));
    }

    #[test]
    fn history_replaces_transcript_in_order() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        let mut upload = message(Role::User, "Uploaded file: notes.txt");
        upload.file_data = Some(FileData {
            filename: "notes.txt".into(),
            size: 1536,
            extension: "txt".into(),
            kind: "text".into(),
            preview_url: None,
        });
        *api.history.borrow_mut() = Some(Ok(HistoryResponse {
            messages: vec![message(Role::User, "first"), message(Role::Assistant, "second"), upload],
            messages_remaining: QuotaState::Unlimited,
        }));
        view.append(TranscriptEntry::message(Role::User, "stale".into(), Utc::now()));

        block_on(ctrl.load_chat_history());

        let entries = view.entries.borrow();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].body_html.contains("first"));
        assert!(entries[1].body_html.contains("second"));
        assert_eq!(entries[2].file.as_ref().unwrap().size_label, "1.5 KB");
        assert_eq!(view.welcome_count.get(), 0);
        assert_eq!(view.quota.get(), Some(QuotaState::Unlimited));
    }

    #[test]
    fn history_failure_leaves_view_alone() {
        let journal = Journal::default();
        let (ctrl, _api, view) = controller(&journal);

        block_on(ctrl.load_chat_history());

        assert_eq!(view.welcome_count.get(), 0);
        assert_eq!(view.quota.get(), None);
    }

    #[test]
    fn clear_requires_confirmation() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        view.confirm_answer.set(false);

        block_on(ctrl.clear_chat());

        assert_eq!(api.clears.get(), 0);
        assert_eq!(view.prompts.borrow()[0], CLEAR_CONFIRMATION);
        assert_eq!(view.welcome_count.get(), 0);
    }

    #[test]
    fn confirmed_clear_resets_to_welcome_and_refreshes_quota() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        ctrl.update_message_count(QuotaState::Remaining(4));
        view.append(TranscriptEntry::message(Role::User, "hi".into(), Utc::now()));
        view.confirm_answer.set(true);

        block_on(ctrl.clear_chat());

        assert_eq!(api.clears.get(), 1);
        assert_eq!(view.welcome_count.get(), 1);
        assert!(view.entries.borrow().is_empty());
        assert_eq!(view.quota.get(), Some(QuotaState::Remaining(4)));
        assert_eq!(journal.events().last().map(String::as_str), Some("quota"));
    }

    #[test]
    fn failed_clear_is_a_no_op() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        *api.clear_result.borrow_mut() = Some(Err(app_error(500, "db locked")));
        view.append(TranscriptEntry::message(Role::User, "hi".into(), Utc::now()));
        view.confirm_answer.set(true);

        block_on(ctrl.clear_chat());

        assert_eq!(view.entries.borrow().len(), 1);
        assert_eq!(view.welcome_count.get(), 0);
    }

    #[test]
    fn stored_model_preference_is_applied_and_used() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        *api.preference.borrow_mut() = Some(Ok(ModelPreference { model: Some("anthropic/claude-3-haiku".into()) }));
        api.replies.borrow_mut().push_back(reply("ok", -1));

        block_on(ctrl.load_model_preference());
        view.type_input("hi");
        block_on(ctrl.send_message());

        assert_eq!(view.model.borrow().as_deref(), Some("anthropic/claude-3-haiku"));
        assert_eq!(api.sent.borrow()[0].model, "anthropic/claude-3-haiku");
    }

    #[test]
    fn missing_or_failed_preference_keeps_default() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        block_on(ctrl.load_model_preference());
        assert_eq!(ctrl.selected_model(), "openai/gpt-3.5-turbo");

        *api.preference.borrow_mut() = Some(Err(ApiError::Transport("offline".into())));
        block_on(ctrl.load_model_preference());
        assert_eq!(ctrl.selected_model(), "openai/gpt-3.5-turbo");
        assert!(view.model.borrow().is_none());
        assert!(view.entries.borrow().is_empty());
    }

    #[test]
    fn changing_model_persists_and_survives_save_failure() {
        let journal = Journal::default();
        let (ctrl, api, view) = controller(&journal);
        *api.save_result.borrow_mut() = Some(Err(app_error(500, "nope")));

        block_on(ctrl.change_model("google/gemini-1.5-flash".into()));

        assert_eq!(api.saved.borrow()[0].model.as_deref(), Some("google/gemini-1.5-flash"));
        assert_eq!(ctrl.selected_model(), "google/gemini-1.5-flash");
        assert!(view.entries.borrow().is_empty());
        assert!(view.banners.borrow().is_empty());
    }
}
