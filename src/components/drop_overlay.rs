use yew::prelude::*;

use crate::controllers::upload::supported_files_hint;

#[derive(Properties, PartialEq)]
pub struct DropOverlayProps {
    pub visible: bool,
}

#[function_component(DropOverlay)]
pub fn drop_overlay(props: &DropOverlayProps) -> Html {
    if !props.visible {
        return html! {};
    }

    html! {
        <div class="drop-overlay">
            <div class="drop-overlay-content">
                <i class="fas fa-cloud-upload-alt fa-3x"></i>
                <h4>{ "Drop your file here" }</h4>
                <p>{ supported_files_hint() }</p>
            </div>
        </div>
    }
}
