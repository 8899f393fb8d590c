use std::cell::Cell;

use crate::controllers::ThemeSurface;
use crate::models::{Theme, ThemeHint};
use crate::services::storage::KeyValueStore;

/// Dark/light switch, remembered across visits.
pub struct ThemeController<S, T> {
    store: S,
    surface: T,
    storage_key: String,
    transition_ms: u32,
    current: Cell<Theme>,
}

impl<S, T> ThemeController<S, T>
where
    S: KeyValueStore,
    T: ThemeSurface,
{
    /// Applies the saved theme immediately; unknown or unreadable values
    /// fall back to dark.
    pub fn new(store: S, surface: T, storage_key: impl Into<String>, transition_ms: u32) -> Self {
        let storage_key = storage_key.into();
        let saved = store.get(&storage_key);
        let current = saved.as_deref().and_then(Theme::parse).unwrap_or_default();
        log::debug!("initial theme {} (stored: {:?})", current.as_str(), saved);

        surface.apply(current);
        surface.set_hint(ThemeHint::from(current));

        Self { store, surface, storage_key, transition_ms, current: Cell::new(current) }
    }

    pub fn current(&self) -> Theme {
        self.current.get()
    }

    pub fn toggle_theme(&self) -> Theme {
        let next = self.current.get().toggled();
        self.current.set(next);

        self.surface.apply(next);
        if let Err(err) = self.store.set(&self.storage_key, next.as_str()) {
            log::debug!("theme not persisted: {}", err);
        }
        self.surface.set_hint(ThemeHint::from(next));
        self.surface.pulse_transition(self.transition_ms);
        next
    }
}
