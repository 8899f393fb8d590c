use std::rc::Rc;

use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;
use web_sys::File;
use yew::prelude::*;

use crate::bridge::{carries_files, dropped_files, viewport, DomThemeSurface, DragListeners, PageView};
use crate::components::{
    banners::Banners, chat_area::ChatArea, drop_overlay::DropOverlay, header::Header,
};
use crate::config::AppConfig;
use crate::controllers::{
    conversation::ConversationController, theme::ThemeController, upload::UploadController, SharedQuota,
};
use crate::models::{Theme, ThemeHint};
use crate::services::{api::HttpChatApi, storage::LocalStorage};
use crate::state::{PageAction, PageState};
use crate::utils::CommonMark;

const GLOBAL_STYLES: &str = r#"
    :root, [data-bs-theme="dark"] {
        --bg-app: #0d1117;
        --bg-user: #1f3b57;
        --bg-assistant: #161b22;
        --text-user: #e6f1ff;
        --border-color: #30363d;
        --text-primary: #e6edf3;
        --text-secondary: #8b949e;
        --accent-color: #7df9ff;
        --danger-color: #ff6b8a;
        --warning-color: #ffd700;
    }
    [data-bs-theme="light"] {
        --bg-app: #ffffff;
        --bg-user: #e3f2fd;
        --bg-assistant: #f5f5f5;
        --text-user: #1565c0;
        --border-color: #e5e5e5;
        --text-primary: #333;
        --text-secondary: #666;
        --accent-color: #10a37f;
        --danger-color: #ef4444;
        --warning-color: #b7791f;
    }

    * { box-sizing: border-box; }
    body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; color: var(--text-primary); background: var(--bg-app); }

    .app-container { display: flex; flex-direction: column; height: 100vh; overflow: hidden; }
    .header { padding: 10px 20px; border-bottom: 1px solid var(--border-color); display: flex; justify-content: space-between; align-items: center; height: 60px; }
    .header h2 { font-size: 1rem; margin: 0; font-weight: 600; }
    .header-controls { display: flex; gap: 10px; align-items: center; }
    .model-select { width: auto; margin: 0; }

    .btn { cursor: pointer; border: 1px solid var(--border-color); background: transparent; padding: 8px 12px; border-radius: 6px; font-size: 0.9rem; color: var(--text-primary); }
    .btn-danger { color: var(--danger-color); border-color: var(--danger-color); }
    .btn-icon { border: none; background: transparent; font-size: 1.2rem; padding: 5px; color: var(--text-secondary); cursor: pointer; }
    .btn-icon:hover { color: var(--text-primary); }
    .form-select { padding: 6px 8px; border: 1px solid var(--border-color); border-radius: 6px; background: var(--bg-app); color: var(--text-primary); }

    .text-success { color: #3fb950; }
    .text-muted { color: var(--text-secondary); }
    .text-warning { color: var(--warning-color); }
    .text-danger { color: var(--danger-color); }

    .banner-stack { padding: 10px 20px 0; }
    .alert { position: relative; padding: 10px 40px 10px 15px; border-radius: 10px; border: 1px solid var(--border-color); margin-bottom: 8px; }
    .alert-danger { background: rgba(255, 7, 58, 0.1); border-color: rgba(255, 7, 58, 0.3); color: var(--danger-color); }
    .alert-warning { background: rgba(255, 215, 0, 0.1); border-color: rgba(255, 215, 0, 0.3); color: var(--warning-color); }
    .btn-close { position: absolute; right: 10px; top: 10px; border: none; background: transparent; color: inherit; cursor: pointer; }
    .btn-close::before { content: "\00d7"; font-size: 1.2rem; }

    .drop-overlay { position: fixed; inset: 0; z-index: 1000; display: flex; align-items: center; justify-content: center; background: rgba(13, 17, 23, 0.85); pointer-events: none; }
    .drop-overlay-content { text-align: center; color: var(--accent-color); border: 2px dashed var(--accent-color); border-radius: 16px; padding: 40px 60px; }

    .message-content pre { background: #2d2d2d; color: #fff; padding: 15px; border-radius: 6px; overflow-x: auto; }
    .message-content code { padding: 2px 4px; border-radius: 4px; font-family: monospace; font-size: 0.9em; }
    .message-content p { margin-top: 0; margin-bottom: 0.5em; }
"#;

type Conversation = ConversationController<HttpChatApi, PageView>;
type Uploads = UploadController<HttpChatApi, PageView>;
type Themes = ThemeController<LocalStorage, DomThemeSurface>;

/// The three page controllers, built once per mount.
struct Controllers {
    conversation: Conversation,
    uploads: Uploads,
    theme: Themes,
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| AppConfig::load());
    let page = use_reducer({
        let model = config.default_model.clone();
        move || PageState::new(model)
    });
    let theme_hint = use_state(|| ThemeHint::from(Theme::default()));
    let input_ref = use_node_ref();
    let file_input_ref = use_node_ref();

    let controllers = {
        let view = PageView::new(
            page.dispatcher(),
            input_ref.clone(),
            file_input_ref.clone(),
            config.banner_timeout_ms,
        );
        let hint = theme_hint.setter();
        let config = config.clone();
        use_memo((), move |_| {
            let api = HttpChatApi::new(&config);
            let quota = SharedQuota::default();
            log::info!("chat backend at {}", config.api_base);
            Controllers {
                conversation: ConversationController::new(
                    api.clone(),
                    view.clone(),
                    Box::new(CommonMark),
                    quota.clone(),
                    config.default_model.clone(),
                ),
                uploads: UploadController::new(api, view, Box::new(CommonMark), quota),
                theme: ThemeController::new(
                    LocalStorage,
                    DomThemeSurface::new(hint),
                    config.theme_storage_key.clone(),
                    config.theme_transition_ms,
                ),
            }
        })
    };

    // --- EFFECTS ---

    // History and model preference are independent; fetch both at once.
    {
        let controllers = controllers.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let chat = &controllers.conversation;
                futures_util::join!(chat.load_chat_history(), chat.load_model_preference());
            });
        });
    }

    {
        let controllers = controllers.clone();
        use_effect_with((), move |_| {
            let (enter, over, leave, dropping) =
                (controllers.clone(), controllers.clone(), controllers.clone(), controllers);
            let listeners = DragListeners::on_document().map(|listeners| {
                listeners
                    .on("dragenter", move |e| enter.uploads.drag_entered(carries_files(e)))
                    .on("dragover", move |e| over.uploads.drag_entered(carries_files(e)))
                    .on("dragleave", move |e| leave.uploads.drag_left(e.client_x(), e.client_y(), viewport()))
                    .on("drop", move |e| {
                        let files = dropped_files(e);
                        let controllers = dropping.clone();
                        spawn_local(async move { controllers.uploads.dropped(files).await });
                    })
            });
            move || drop(listeners)
        });
    }

    // --- ACTIONS ---

    let on_send = run(&controllers, |c: Rc<Controllers>, _: ()| async move {
        c.conversation.send_message().await
    });
    let on_search = run(&controllers, |c: Rc<Controllers>, _: ()| async move {
        c.conversation.perform_search().await
    });
    let on_clear = run(&controllers, |c: Rc<Controllers>, _: ()| async move {
        c.conversation.clear_chat().await
    });
    let on_model_change = run(&controllers, |c: Rc<Controllers>, model: String| async move {
        c.conversation.change_model(model).await
    });
    let on_file_chosen = run(&controllers, |c: Rc<Controllers>, file: File| async move {
        c.uploads.upload(file).await
    });

    let on_toggle_theme = {
        let controllers = controllers.clone();
        Callback::from(move |_: ()| {
            controllers.theme.toggle_theme();
        })
    };

    let on_dismiss_banner = {
        let dispatcher = page.dispatcher();
        Callback::from(move |id: Uuid| dispatcher.dispatch(PageAction::DismissBanner(id)))
    };

    html! {
        <>
            <style>{ GLOBAL_STYLES }</style>
            <div class="app-container">
                <Header
                    models={config.models.clone()}
                    selected_model={page.selected_model.clone()}
                    quota={page.quota}
                    theme_hint={(*theme_hint).clone()}
                    {on_model_change}
                    {on_clear}
                    {on_toggle_theme}
                />
                <Banners banners={page.banners.clone()} on_dismiss={on_dismiss_banner} />
                <ChatArea
                    entries={page.entries.clone()}
                    show_welcome={page.show_welcome}
                    typing={page.typing_visible()}
                    controls_disabled={page.controls_disabled}
                    upload_busy={page.upload_pending}
                    focus_request={page.focus_request}
                    input_ref={input_ref.clone()}
                    file_input_ref={file_input_ref.clone()}
                    {on_send}
                    {on_search}
                    {on_file_chosen}
                />
            </div>
            <DropOverlay visible={page.drop_overlay} />
        </>
    }
}

/// Callback that runs an async controller action on the local executor.
fn run<T, F, Fut>(controllers: &Rc<Controllers>, action: F) -> Callback<T>
where
    T: 'static,
    F: Fn(Rc<Controllers>, T) -> Fut + 'static,
    Fut: std::future::Future<Output = ()> + 'static,
{
    let controllers = controllers.clone();
    Callback::from(move |arg: T| spawn_local(action(controllers.clone(), arg)))
}
