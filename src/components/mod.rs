pub mod banners;
pub mod chat_area;
pub mod drop_overlay;
pub mod header;
pub mod theme_toggle;
