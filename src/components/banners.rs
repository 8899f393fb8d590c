use uuid::Uuid;
use yew::prelude::*;

use crate::state::{Banner, BannerLevel};

#[derive(Properties, PartialEq)]
pub struct BannersProps {
    pub banners: Vec<Banner>,
    pub on_dismiss: Callback<Uuid>,
}

/// Stack of dismissible alerts above the transcript.
#[function_component(Banners)]
pub fn banners(props: &BannersProps) -> Html {
    if props.banners.is_empty() {
        return html! {};
    }

    html! {
        <div class="banner-stack">
            { for props.banners.iter().map(|banner| {
                let id = banner.id;
                let on_close = props.on_dismiss.reform(move |_: MouseEvent| id);
                let icon = match banner.level {
                    BannerLevel::Warning => "fas fa-exclamation-circle",
                    BannerLevel::Danger => "fas fa-exclamation-triangle",
                };

                html! {
                    <div key={id.to_string()} class={classes!(banner.level.css_class(), "alert-dismissible")} role="alert">
                        <i class={classes!(icon, "me-2")}></i>
                        if let Some(title) = &banner.title {
                            <strong>{ title }</strong>{ " " }
                        }
                        { &banner.text }
                        <button type="button" class="btn-close" aria-label="Close" onclick={on_close}></button>
                    </div>
                }
            }) }
        </div>
    }
}
