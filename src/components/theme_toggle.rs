use yew::prelude::*;

use crate::models::ThemeHint;

#[derive(Properties, PartialEq)]
pub struct ThemeToggleProps {
    pub hint: ThemeHint,
    pub on_toggle: Callback<()>,
}

#[function_component(ThemeToggle)]
pub fn theme_toggle(props: &ThemeToggleProps) -> Html {
    let onclick = props.on_toggle.reform(|_: MouseEvent| ());

    html! {
        <button class="btn-icon theme-toggle" type="button" title={props.hint.title} {onclick}>
            <i class={props.hint.icon}></i>
        </button>
    }
}
