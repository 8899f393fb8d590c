//! Browser side of the controller capability traits.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, Blob, DragEvent, EventTarget, File, HtmlElement, HtmlInputElement, HtmlTextAreaElement, Url};
use yew::{NodeRef, UseReducerDispatcher, UseStateSetter};

use crate::controllers::{ComposerView, LocalFile, ThemeSurface, TranscriptView, UploadView};
use crate::models::{QuotaState, Theme, ThemeHint};
use crate::state::{Banner, PageAction, PageState, TranscriptEntry};

/// Runs `f` once after `delay_ms`.
pub fn after(delay_ms: u32, f: impl FnOnce() + 'static) {
    let Some(window) = window() else { return };
    let callback = Closure::once_into_js(f);
    let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
    if let Err(err) =
        window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
    {
        log::warn!("timer not scheduled: {:?}", err);
    }
}

/// Inner size of the window, `(width, height)`.
pub fn viewport() -> (f64, f64) {
    let Some(window) = window() else { return (0.0, 0.0) };
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (width, height)
}

/// Grows a textarea to fit its content.
pub fn fit_to_content(textarea: &HtmlTextAreaElement) {
    let style = textarea.style();
    let _ = style.set_property("height", "auto");
    let _ = style.set_property("height", &format!("{}px", textarea.scroll_height()));
}

/// Page state, the composer and the file picker behind the controller views.
#[derive(Clone)]
pub struct PageView {
    dispatcher: UseReducerDispatcher<PageState>,
    input: NodeRef,
    file_input: NodeRef,
    banner_timeout_ms: u32,
}

impl PageView {
    pub fn new(
        dispatcher: UseReducerDispatcher<PageState>,
        input: NodeRef,
        file_input: NodeRef,
        banner_timeout_ms: u32,
    ) -> Self {
        Self { dispatcher, input, file_input, banner_timeout_ms }
    }
}

impl TranscriptView for PageView {
    fn append(&self, entry: TranscriptEntry) {
        self.dispatcher.dispatch(PageAction::Append(entry));
    }

    fn set_quota(&self, quota: QuotaState) {
        self.dispatcher.dispatch(PageAction::SetQuota(quota));
    }

    fn show_banner(&self, banner: Banner) {
        let id = banner.id;
        self.dispatcher.dispatch(PageAction::ShowBanner(banner));

        let dispatcher = self.dispatcher.clone();
        after(self.banner_timeout_ms, move || dispatcher.dispatch(PageAction::DismissBanner(id)));
    }
}

impl ComposerView for PageView {
    fn input_value(&self) -> String {
        self.input
            .cast::<HtmlTextAreaElement>()
            .map(|textarea| textarea.value())
            .unwrap_or_default()
    }

    fn clear_input(&self) {
        if let Some(textarea) = self.input.cast::<HtmlTextAreaElement>() {
            textarea.set_value("");
            fit_to_content(&textarea);
        }
    }

    // The textarea is still disabled until the next render, so focusing is
    // left to an effect keyed on `focus_request`.
    fn focus_input(&self) {
        self.dispatcher.dispatch(PageAction::RequestFocus);
    }

    fn set_controls_disabled(&self, disabled: bool) {
        self.dispatcher.dispatch(PageAction::SetControlsDisabled(disabled));
    }

    fn set_typing(&self, visible: bool) {
        self.dispatcher.dispatch(PageAction::SetChatPending(visible));
    }

    fn show_welcome(&self) {
        self.dispatcher.dispatch(PageAction::ShowWelcome);
    }

    fn replace_transcript(&self, entries: Vec<TranscriptEntry>) {
        self.dispatcher.dispatch(PageAction::Replace(entries));
    }

    fn confirm(&self, prompt: &str) -> bool {
        window()
            .and_then(|w| w.confirm_with_message(prompt).ok())
            .unwrap_or(false)
    }

    fn show_model(&self, model: &str) {
        self.dispatcher.dispatch(PageAction::SelectModel(model.to_string()));
    }
}

impl UploadView for PageView {
    fn set_upload_busy(&self, busy: bool) {
        self.dispatcher.dispatch(PageAction::SetUploadPending(busy));
    }

    fn reset_file_input(&self) {
        if let Some(input) = self.file_input.cast::<HtmlInputElement>() {
            input.set_value("");
        }
    }

    fn set_drop_overlay(&self, visible: bool) {
        self.dispatcher.dispatch(PageAction::SetDropOverlay(visible));
    }
}

impl LocalFile for File {
    fn name(&self) -> String {
        File::name(self)
    }

    fn size(&self) -> u64 {
        Blob::size(self) as u64
    }

    fn mime_type(&self) -> String {
        self.type_()
    }

    fn preview_url(&self) -> Option<String> {
        if !self.type_().starts_with("image/") {
            return None;
        }
        Url::create_object_url_with_blob(self).ok()
    }
}

/// Sets `data-bs-theme` on the document root and drives the toggle's hint.
pub struct DomThemeSurface {
    hint: UseStateSetter<ThemeHint>,
}

impl DomThemeSurface {
    pub fn new(hint: UseStateSetter<ThemeHint>) -> Self {
        Self { hint }
    }

    fn body() -> Option<HtmlElement> {
        window()?.document()?.body()
    }
}

impl ThemeSurface for DomThemeSurface {
    fn apply(&self, theme: Theme) {
        let Some(root) = window().and_then(|w| w.document()).and_then(|d| d.document_element()) else {
            return;
        };
        if let Err(err) = root.set_attribute("data-bs-theme", theme.as_str()) {
            log::warn!("could not apply theme: {:?}", err);
        }
    }

    fn set_hint(&self, hint: ThemeHint) {
        self.hint.set(hint);
    }

    fn pulse_transition(&self, duration_ms: u32) {
        let Some(body) = Self::body() else { return };
        let transition = format!("all {}ms ease", duration_ms);
        if body.style().set_property("transition", &transition).is_err() {
            return;
        }
        after(duration_ms, move || {
            let _ = body.style().remove_property("transition");
        });
    }
}

/// Document-level drag and drop listeners, detached on drop.
pub struct DragListeners {
    target: EventTarget,
    handlers: Vec<(&'static str, Closure<dyn FnMut(DragEvent)>)>,
}

impl DragListeners {
    pub fn on_document() -> Option<Self> {
        let document = window()?.document()?;
        Some(Self { target: document.into(), handlers: Vec::new() })
    }

    /// Registers `handler` for `event`; the browser's default handling is
    /// always suppressed.
    pub fn on(mut self, event: &'static str, mut handler: impl FnMut(&DragEvent) + 'static) -> Self {
        let closure = Closure::<dyn FnMut(DragEvent)>::new(move |e: DragEvent| {
            e.prevent_default();
            e.stop_propagation();
            handler(&e);
        });
        match self.target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            Ok(()) => self.handlers.push((event, closure)),
            Err(err) => log::warn!("could not listen for {}: {:?}", event, err),
        }
        self
    }
}

impl Drop for DragListeners {
    fn drop(&mut self) {
        for (event, closure) in &self.handlers {
            let _ = self
                .target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }
}

pub fn carries_files(event: &DragEvent) -> bool {
    event
        .data_transfer()
        .map(|transfer| transfer.types().iter().any(|t| t.as_string().as_deref() == Some("Files")))
        .unwrap_or(false)
}

pub fn dropped_files(event: &DragEvent) -> Vec<File> {
    let Some(list) = event.data_transfer().and_then(|transfer| transfer.files()) else {
        return Vec::new();
    };
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}
