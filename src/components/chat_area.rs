use web_sys::{File, HtmlElement, HtmlImageElement, HtmlInputElement, HtmlTextAreaElement, Url};
use yew::prelude::*;

use crate::bridge::fit_to_content;
use crate::controllers::upload::accept_attribute;
use crate::models::Role;
use crate::state::{EntryKind, FilePreview, TranscriptEntry};
use crate::utils::format_time;

#[derive(Properties, PartialEq)]
pub struct ChatAreaProps {
    pub entries: Vec<TranscriptEntry>,
    pub show_welcome: bool,
    pub typing: bool,
    pub controls_disabled: bool,
    pub upload_busy: bool,
    pub focus_request: u64,
    pub input_ref: NodeRef,
    pub file_input_ref: NodeRef,
    pub on_send: Callback<()>,
    pub on_search: Callback<()>,
    pub on_file_chosen: Callback<File>,
}

const CSS: &str = r#"
    .messages-container {
        flex-grow: 1;
        overflow-y: auto;
        padding: 20px;
        display: flex;
        flex-direction: column;
        gap: 15px;
        background-color: var(--bg-app);
        scroll-behavior: smooth;
    }

    .message { display: flex; flex-direction: column; max-width: 85%; }
    .message-user { align-self: flex-end; align-items: flex-end; }
    .message-assistant { align-self: flex-start; align-items: flex-start; }

    .message-content {
        padding: 10px 15px;
        border-radius: 12px;
        font-size: 0.95rem;
        line-height: 1.5;
        box-shadow: 0 1px 2px rgba(0,0,0,0.05);
        min-width: 0;
        overflow-wrap: anywhere;
        word-break: break-word;
        max-width: 100%;
    }
    .message-user .message-content { background-color: var(--bg-user); color: var(--text-user); border-bottom-right-radius: 2px; }
    .message-assistant .message-content { background-color: var(--bg-assistant); color: var(--text-primary); border-bottom-left-radius: 2px; }
    .message-error .message-content { border: 1px solid var(--danger-color); color: var(--danger-color); }
    .message-timestamp { font-size: 0.75rem; color: var(--text-secondary); margin-top: 4px; }

    .file-preview { margin-bottom: 8px; }
    .file-preview img { max-width: 240px; max-height: 240px; border-radius: 8px; display: block; }
    .file-info { font-size: 0.8rem; color: var(--text-secondary); user-select: none; }

    .welcome-message { text-align: center; margin: auto; color: var(--text-secondary); }
    .welcome-message i { font-size: 3rem; color: var(--accent-color); margin-bottom: 10px; }

    .typing-indicator { display: flex; gap: 4px; padding: 0 20px 10px; }
    .typing-indicator span { width: 8px; height: 8px; border-radius: 50%; background: var(--accent-color); animation: typing 1.2s infinite ease-in-out; }
    .typing-indicator span:nth-child(2) { animation-delay: 0.2s; }
    .typing-indicator span:nth-child(3) { animation-delay: 0.4s; }
    @keyframes typing { 0%, 80%, 100% { opacity: 0.3; } 40% { opacity: 1; } }

    .input-wrapper { border-top: 1px solid var(--border-color); padding: 20px; display: flex; justify-content: center; background: var(--bg-app); }
    .input-container { width: 100%; max-width: 900px; display: flex; gap: 8px; align-items: flex-end; }
    .chat-input { flex-grow: 1; padding: 12px; border: 1px solid var(--border-color); border-radius: 8px; resize: none; font-family: inherit; outline: none; max-height: 200px; background: var(--bg-app); color: var(--text-primary); }
    .chat-input:focus { border-color: var(--accent-color); box-shadow: 0 0 0 2px rgba(16, 163, 127, 0.1); }
    .composer-btn { background: var(--accent-color); color: white; border: none; border-radius: 6px; padding: 10px 12px; cursor: pointer; }
    .composer-btn:disabled { background: #888; cursor: default; }
"#;

fn file_block(file: &FilePreview) -> Html {
    let visual = match &file.image_url {
        Some(url) => {
            // Local previews are object URLs; release them once drawn.
            let onload = Callback::from(|e: Event| {
                let img: HtmlImageElement = e.target_unchecked_into();
                let src = img.src();
                if src.starts_with("blob:") {
                    let _ = Url::revoke_object_url(&src);
                }
            });
            html! { <img src={url.clone()} alt={file.filename.clone()} {onload} /> }
        }
        None => html! { <i class={classes!(file.icon.clone(), "fa-2x")}></i> },
    };

    html! {
        <div class="file-preview">
            { visual }
            <div class="file-info">
                <strong>{ &file.filename }</strong>
                <div>{ format!("{} • {}", file.size_label, file.type_label) }</div>
            </div>
        </div>
    }
}

fn entry_view(entry: &TranscriptEntry) -> Html {
    let role_cls = match entry.role {
        Role::User => "message-user",
        Role::Assistant => "message-assistant",
    };
    let error_cls = (entry.kind == EntryKind::Error).then_some("message-error");
    let body = Html::from_html_unchecked(AttrValue::from(entry.body_html.clone()));

    html! {
        <div key={entry.id.to_string()} class={classes!("message", role_cls, error_cls)}>
            <div class="message-content">
                if let Some(file) = &entry.file {
                    { file_block(file) }
                }
                { body }
            </div>
            <div class="message-timestamp">{ format_time(&entry.at) }</div>
        </div>
    }
}

fn welcome() -> Html {
    html! {
        <div class="welcome-message">
            <i class="fas fa-robot"></i>
            <h4>{ "Welcome to CyberChat AI" }</h4>
            <p>{ "Start a conversation, upload files, or search the web!" }</p>
        </div>
    }
}

fn button_icon(busy: bool, idle: &'static str) -> &'static str {
    if busy { "fas fa-spinner fa-spin" } else { idle }
}

#[function_component(ChatArea)]
pub fn chat_area(props: &ChatAreaProps) -> Html {
    let scroll_ref = use_node_ref();

    // Auto-scroll on every transcript change
    {
        let div_ref = scroll_ref.clone();
        let len = props.entries.len();
        use_effect_with((len, props.typing, props.show_welcome), move |_| {
            if let Some(div) = div_ref.cast::<HtmlElement>() {
                div.set_scroll_top(div.scroll_height());
            }
        });
    }

    {
        let input_ref = props.input_ref.clone();
        use_effect_with(props.focus_request, move |request| {
            if *request > 0 {
                if let Some(input) = input_ref.cast::<HtmlElement>() {
                    let _ = input.focus();
                }
            }
        });
    }

    let on_keydown = {
        let on_send = props.on_send.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" && !e.shift_key() {
                e.prevent_default();
                on_send.emit(());
            }
        })
    };

    let on_input = Callback::from(|e: InputEvent| {
        let textarea: HtmlTextAreaElement = e.target_unchecked_into();
        fit_to_content(&textarea);
    });

    let on_pick_file = {
        let file_input = props.file_input_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(input) = file_input.cast::<HtmlInputElement>() {
                input.click();
            }
        })
    };

    let on_file_change = {
        let on_file_chosen = props.on_file_chosen.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                on_file_chosen.emit(file);
            }
        })
    };

    let disabled = props.controls_disabled;

    html! {
        <>
            <style>{ CSS }</style>

            <div class="messages-container" ref={scroll_ref}>
                if props.show_welcome {
                    { welcome() }
                }
                { for props.entries.iter().map(entry_view) }
            </div>

            if props.typing {
                <div class="typing-indicator"><span></span><span></span><span></span></div>
            }

            <div class="input-wrapper">
                <div class="input-container">
                    <button type="button" class="composer-btn" title="Upload file" disabled={props.upload_busy} onclick={on_pick_file}>
                        <i class={button_icon(props.upload_busy, "fas fa-paperclip")}></i>
                    </button>
                    <input
                        type="file"
                        ref={props.file_input_ref.clone()}
                        accept={accept_attribute()}
                        style="display: none;"
                        onchange={on_file_change}
                    />
                    <textarea
                        ref={props.input_ref.clone()}
                        class="chat-input"
                        rows="1"
                        placeholder="Type your message..."
                        oninput={on_input}
                        onkeydown={on_keydown}
                        {disabled}
                    />
                    <button type="button" class="composer-btn" title="Search the web" {disabled} onclick={props.on_search.reform(|_: MouseEvent| ())}>
                        <i class={button_icon(disabled, "fas fa-search")}></i>
                    </button>
                    <button type="button" class="composer-btn" title="Send" {disabled} onclick={props.on_send.reform(|_: MouseEvent| ())}>
                        <i class={button_icon(disabled, "fas fa-paper-plane")}></i>
                    </button>
                </div>
            </div>
        </>
    }
}
