use crate::widget::Widget;
use mosaic_renderer::Color;
use rustc_hash::FxHashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    pub background: Option<Color>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }
}

/// Default styles keyed by widget type name.
///
/// Styles are shared: the registry and any number of widgets may hold the
/// same `Rc<Style>`, and replacing an entry never affects widgets that were
/// given the old style explicitly.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    styles: FxHashMap<String, Rc<Style>>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; the replaced style is handed back.
    pub fn set(&mut self, widget_type: impl Into<String>, style: Rc<Style>) -> Option<Rc<Style>> {
        self.styles.insert(widget_type.into(), style)
    }

    pub fn get(&self, widget_type: &str) -> Option<Rc<Style>> {
        self.styles.get(widget_type).cloned()
    }

    pub fn remove(&mut self, widget_type: &str) -> Option<Rc<Style>> {
        self.styles.remove(widget_type)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// The widget's own style, falling back to the default for its type.
    pub fn resolve<'a>(&'a self, widget: &'a Widget) -> Option<&'a Style> {
        widget
            .style()
            .or_else(|| self.styles.get(widget.type_name()).map(|s| s.as_ref()))
    }
}
