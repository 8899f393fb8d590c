use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::components::theme_toggle::ThemeToggle;
use crate::models::{ModelOption, QuotaState, ThemeHint};

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub models: Vec<ModelOption>,
    pub selected_model: String,
    pub quota: QuotaState,
    pub theme_hint: ThemeHint,
    pub on_model_change: Callback<String>,
    pub on_clear: Callback<()>,
    pub on_toggle_theme: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let on_model_change = {
        let on_change = props.on_model_change.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            on_change.emit(select.value());
        })
    };

    // Keep a preference the list does not know about selectable.
    let unknown_selection = !props.models.iter().any(|m| m.id == props.selected_model);

    html! {
        <div class="header">
            <h2><i class="fas fa-robot me-2"></i>{ "CyberChat AI" }</h2>
            <div class="header-controls">
                <span class="quota" title="Messages remaining">
                    <i class="fas fa-comment-dots me-1"></i>
                    <span id="messageCount" class={props.quota.tier().css_class()}>{ props.quota.label() }</span>
                </span>
                <select class="form-select model-select" onchange={on_model_change}>
                    if unknown_selection {
                        <option value={props.selected_model.clone()} selected={true}>{ &props.selected_model }</option>
                    }
                    { for props.models.iter().map(|m| html! {
                        <option value={m.id.clone()} selected={m.id == props.selected_model}>{ &m.label }</option>
                    }) }
                </select>
                <button class="btn btn-danger" type="button" title="Clear chat" onclick={props.on_clear.reform(|_: MouseEvent| ())}>
                    <i class="fas fa-trash"></i>
                </button>
                <ThemeToggle hint={props.theme_hint.clone()} on_toggle={props.on_toggle_theme.clone()} />
            </div>
        </div>
    }
}
