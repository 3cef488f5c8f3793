use crate::stack::StackLayout;
use crate::style::Style;
use mosaic_renderer::{Graphics, Point, Rect, Size};
use slotmap::{Key, new_key_type};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

new_key_type! {
    pub struct WidgetId;
}

impl WidgetId {
    /// Stable numeric form of the id, for logs and snapshots.
    pub fn as_u64(self) -> u64 {
        self.data().as_ffi()
    }
}

/// Observer of a widget's geometry and focus.
pub trait WidgetListener {
    fn bounds_changed(&mut self, widget: WidgetId, bounds: Rect);

    fn focus_changed(&mut self, _widget: WidgetId, _focused: bool) {}
}

/// A non-owning reference to whoever wants to hear about a widget.
///
/// Widgets in the same tree are referenced by id and resolved through the
/// arena at dispatch time; anything else is held weakly. Either way a
/// destroyed listener is simply skipped.
#[derive(Clone)]
pub enum Listener {
    Widget(WidgetId),
    External(Weak<RefCell<dyn WidgetListener>>),
}

impl Listener {
    pub fn external<L: WidgetListener + 'static>(listener: &Rc<RefCell<L>>) -> Self {
        let listener: Rc<RefCell<dyn WidgetListener>> = listener.clone();
        Listener::External(Rc::downgrade(&listener))
    }

    pub fn same_as(&self, other: &Listener) -> bool {
        match (self, other) {
            (Listener::Widget(a), Listener::Widget(b)) => a == b,
            (Listener::External(a), Listener::External(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub(crate) fn is_external_dead(&self) -> bool {
        matches!(self, Listener::External(w) if w.strong_count() == 0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Widget(id) => f.debug_tuple("Widget").field(id).finish(),
            Listener::External(w) => f
                .debug_tuple("External")
                .field(&(w.strong_count() > 0))
                .finish(),
        }
    }
}

/// Drawing behavior for widgets that are neither plain boxes nor layouts.
pub trait WidgetPainter {
    /// Key used to look up the default style.
    fn type_name(&self) -> &'static str;

    /// Paint content in local coordinates; the origin is the widget's top
    /// left corner and the clip is the widget's extent.
    fn paint(&mut self, gfx: &mut dyn Graphics, size: Size);

    /// Pre-draw hook, run once per repaint before anything is drawn.
    fn update(&mut self) {}
}

pub enum WidgetKind {
    Plain,
    Stack(StackLayout),
    Custom(Box<dyn WidgetPainter>),
}

impl WidgetKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            WidgetKind::Plain => "Widget",
            WidgetKind::Stack(_) => "StackLayout",
            WidgetKind::Custom(p) => p.type_name(),
        }
    }
}

impl fmt::Debug for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetKind::Plain => f.write_str("Plain"),
            WidgetKind::Stack(layout) => f.debug_tuple("Stack").field(layout).finish(),
            WidgetKind::Custom(p) => f.debug_tuple("Custom").field(&p.type_name()).finish(),
        }
    }
}

/// A node of the retained tree.
///
/// Widgets are built detached and handed to [`crate::WidgetTree::insert`];
/// after that every mutation goes through the tree so listeners and dirty
/// flags stay consistent.
#[derive(Debug)]
pub struct Widget {
    pub(crate) bounds: Rect,
    pub(crate) visible: bool,
    pub(crate) transparent: bool,
    pub(crate) focused: bool,
    pub(crate) dirty: bool,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: SmallVec<[WidgetId; 4]>,
    pub(crate) style: Option<Rc<Style>>,
    pub(crate) listeners: SmallVec<[Listener; 2]>,
    pub(crate) kind: WidgetKind,
}

impl Widget {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::with_kind(WidgetKind::Plain, Rect::new(x, y, width, height))
    }

    pub fn stack(layout: StackLayout) -> Self {
        Self::with_kind(WidgetKind::Stack(layout), Rect::default())
    }

    pub fn custom(painter: impl WidgetPainter + 'static) -> Self {
        Self::with_kind(WidgetKind::Custom(Box::new(painter)), Rect::default())
    }

    pub fn with_kind(kind: WidgetKind, bounds: Rect) -> Self {
        Self {
            bounds,
            visible: true,
            transparent: false,
            focused: false,
            dirty: true,
            parent: None,
            children: SmallVec::new(),
            style: None,
            listeners: SmallVec::new(),
            kind,
        }
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.bounds.width = width;
        self.bounds.height = height;
        self
    }

    pub fn with_style(mut self, style: Rc<Style>) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn position(&self) -> Point {
        self.bounds.origin()
    }

    pub fn size(&self) -> Size {
        self.bounds.size()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_deref()
    }

    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn stack_layout(&self) -> Option<&StackLayout> {
        match &self.kind {
            WidgetKind::Stack(layout) => Some(layout),
            _ => None,
        }
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Explicitly transparent widgets never paint a background; others paint
    /// one only when `style` provides a background color.
    pub(crate) fn is_transparent_with(&self, style: Option<&Style>) -> bool {
        self.transparent || style.and_then(|s| s.background).is_none()
    }
}
