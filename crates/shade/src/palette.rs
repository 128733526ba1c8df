//! Light/dark style palettes that follow the resolved appearance.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use console::Style;
use once_cell::sync::Lazy;

use crate::appearance::Appearance;
use crate::sink::AppearanceSink;

/// A named collection of terminal styles.
///
/// # Example
///
/// ```rust
/// use shade::Palette;
/// use console::Style;
///
/// let palette = Palette::new()
///     .add("muted", Style::new().dim())
///     .add("accent", Style::new().cyan().bold());
/// assert!(palette.has("accent"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Palette {
    styles: HashMap<String, Style>,
}

impl Palette {
    /// Creates an empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named style, returning the palette for chaining.
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles.insert(name.to_string(), style);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

static DEFAULT_LIGHT: Lazy<Palette> = Lazy::new(|| {
    Palette::new()
        .add("title", Style::new().bold().black())
        .add("accent", Style::new().blue())
        .add("muted", Style::new().dim())
        .add("light", Style::new().yellow().bold())
        .add("dark", Style::new().blue().bold())
});

static DEFAULT_DARK: Lazy<Palette> = Lazy::new(|| {
    Palette::new()
        .add("title", Style::new().bold().white())
        .add("accent", Style::new().cyan())
        .add("muted", Style::new().dim())
        .add("light", Style::new().yellow().bold())
        .add("dark", Style::new().magenta().bold())
});

struct Variants {
    light: Palette,
    dark: Palette,
}

/// A light/dark pair of palettes that switches with the resolved appearance.
///
/// As an [`AppearanceSink`] it selects the matching palette; clones share
/// the selection, so one clone can drive a controller while another styles
/// output.
///
/// # Example
///
/// ```rust
/// use shade::{AdaptivePalette, Appearance, AppearanceSink, Palette};
/// use console::Style;
///
/// let light = Palette::new().add("tone", Style::new().green());
/// let dark = Palette::new().add("tone", Style::new().yellow());
/// let palette = AdaptivePalette::new(light, dark);
///
/// palette.apply(Appearance::Dark);
/// assert_eq!(palette.appearance(), Appearance::Dark);
/// let _ = palette.paint("tone", "hello");
/// ```
#[derive(Clone)]
pub struct AdaptivePalette {
    variants: Arc<Variants>,
    dark: Arc<AtomicBool>,
}

impl AdaptivePalette {
    /// Creates an adaptive palette, starting in light mode.
    pub fn new(light: Palette, dark: Palette) -> Self {
        Self {
            variants: Arc::new(Variants { light, dark }),
            dark: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The appearance last applied.
    pub fn appearance(&self) -> Appearance {
        Appearance::from_signal(self.dark.load(Ordering::SeqCst))
    }

    /// The palette for the current appearance.
    pub fn active(&self) -> &Palette {
        match self.appearance() {
            Appearance::Light => &self.variants.light,
            Appearance::Dark => &self.variants.dark,
        }
    }

    /// Style for `name` in the active palette; unstyled when missing.
    pub fn style(&self, name: &str) -> Style {
        self.active().get(name).cloned().unwrap_or_default()
    }

    /// Renders `text` with the active style for `name`.
    pub fn paint(&self, name: &str, text: &str) -> String {
        self.style(name).apply_to(text).to_string()
    }
}

impl Default for AdaptivePalette {
    fn default() -> Self {
        Self::new(DEFAULT_LIGHT.clone(), DEFAULT_DARK.clone())
    }
}

impl AppearanceSink for AdaptivePalette {
    fn apply(&self, appearance: Appearance) {
        self.dark.store(appearance.is_dark(), Ordering::SeqCst);
    }
}

impl std::fmt::Debug for AdaptivePalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptivePalette")
            .field("appearance", &self.appearance())
            .finish()
    }
}
