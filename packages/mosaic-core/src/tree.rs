use crate::error::TreeError;
use crate::stack::{self, Alignment, Orientation, StackLayout};
use crate::style::{Style, StyleRegistry};
use crate::widget::{Listener, Widget, WidgetId, WidgetKind, WidgetPainter};
use mosaic_renderer::{Graphics, Point, Rect, Size};
use mosaic_scheduler::{Environment, IdleListener};
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Where repaint requests go: the environment plus the idle listener that
/// performs the repaint. Cloning is cheap.
#[derive(Clone)]
pub struct UiHandle {
    env: Rc<dyn Environment>,
    listener: Weak<RefCell<dyn IdleListener>>,
}

impl UiHandle {
    pub fn new(env: Rc<dyn Environment>, listener: Weak<RefCell<dyn IdleListener>>) -> Self {
        Self { env, listener }
    }

    pub fn request_ui_update(&self) {
        self.env.add_idle_listener(self.listener.clone());
    }
}

/// Arena owning every widget.
///
/// Parent/child links are ids. A widget with no parent is a root; the tree
/// can hold any number of them (the engine's main widget and overlay are
/// both roots). Destroying a widget destroys its subtree.
#[derive(Default)]
pub struct WidgetTree {
    nodes: SlotMap<WidgetId, Widget>,
    ui: Option<UiHandle>,
    /// Stack layouts currently positioning their children. Bounds changes
    /// they cause must not re-enter them.
    rebuilding: SmallVec<[WidgetId; 4]>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ui(ui: UiHandle) -> Self {
        Self {
            ui: Some(ui),
            ..Self::default()
        }
    }

    pub fn set_ui_handle(&mut self, ui: Option<UiHandle>) {
        self.ui = ui;
    }

    pub fn request_ui_update(&self) {
        if let Some(ui) = &self.ui {
            ui.request_ui_update();
        }
    }

    pub fn insert(&mut self, widget: Widget) -> WidgetId {
        let id = self.nodes.insert(widget);
        tracing::trace!(?id, "widget inserted");
        id
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WidgetId, &Widget)> {
        self.nodes.iter()
    }

    pub fn bounds(&self, id: WidgetId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.bounds)
    }

    pub fn position(&self, id: WidgetId) -> Option<Point> {
        self.bounds(id).map(|b| b.origin())
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child_count(&self, id: WidgetId) -> usize {
        self.children(id).len()
    }

    pub fn is_dirty(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.dirty)
    }

    pub fn stack_layout(&self, id: WidgetId) -> Option<&StackLayout> {
        self.nodes.get(id).and_then(|n| n.stack_layout())
    }

    pub fn painter_mut(&mut self, id: WidgetId) -> Option<&mut (dyn WidgetPainter + 'static)> {
        match &mut self.nodes.get_mut(id)?.kind {
            WidgetKind::Custom(painter) => Some(painter.as_mut()),
            _ => None,
        }
    }

    /// Position in root coordinates.
    pub fn absolute_position(&self, id: WidgetId) -> Option<Point> {
        let mut node = self.nodes.get(id)?;
        let mut pos = node.bounds.origin();
        while let Some(parent) = node.parent {
            node = self.nodes.get(parent)?;
            pos = pos.offset(node.bounds.x, node.bounds.y);
        }
        Some(pos)
    }

    pub fn is_ancestor(&self, ancestor: WidgetId, of: WidgetId) -> bool {
        let mut current = self.parent(of);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn is_stack(&self, id: WidgetId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| matches!(n.kind, WidgetKind::Stack(_)))
    }

    // --- structure ---

    /// Appends `child` to `parent`. Stack layouts start listening to the
    /// child and re-layout immediately.
    pub fn add(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(parent) {
            return Err(TreeError::MissingWidget(parent));
        }
        let child_node = self
            .nodes
            .get(child)
            .ok_or(TreeError::MissingWidget(child))?;
        if let Some(existing) = child_node.parent {
            return Err(TreeError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }

        if self.is_stack(parent) {
            self.add_listener(child, Listener::Widget(parent));
            self.rebuild(parent);
        }
        self.mark_dirty(child);
        self.request_repaint(parent);
        Ok(())
    }

    /// Detaches `child` without destroying it; it becomes a root again and
    /// the caller decides what happens to it.
    pub fn remove(&mut self, parent: WidgetId, child: WidgetId) -> Result<WidgetId, TreeError> {
        let node = self
            .nodes
            .get_mut(parent)
            .ok_or(TreeError::MissingWidget(parent))?;
        let index = node
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(TreeError::NotAChild { parent, child })?;
        node.children.remove(index);

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        self.remove_listener(child, &Listener::Widget(parent));
        self.rebuild(parent);
        self.request_repaint(parent);
        Ok(child)
    }

    /// Destroys every child of `parent`. Returns how many direct children
    /// were removed.
    pub fn clear(&mut self, parent: WidgetId) -> Result<usize, TreeError> {
        let node = self
            .nodes
            .get_mut(parent)
            .ok_or(TreeError::MissingWidget(parent))?;
        let children = std::mem::take(&mut node.children);
        for &child in &children {
            self.destroy_subtree(child);
        }
        self.rebuild(parent);
        self.request_repaint(parent);
        Ok(children.len())
    }

    pub fn destroy(&mut self, id: WidgetId) -> Result<(), TreeError> {
        let parent = self
            .nodes
            .get(id)
            .ok_or(TreeError::MissingWidget(id))?
            .parent;
        if let Some(parent) = parent {
            self.remove(parent, id)?;
        }
        let removed = self.destroy_subtree(id);
        tracing::debug!(?id, removed, "widget destroyed");
        Ok(())
    }

    fn destroy_subtree(&mut self, id: WidgetId) -> usize {
        let mut pending = vec![id];
        let mut removed = 0;
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                pending.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    // --- geometry ---

    pub fn set_position(&mut self, id: WidgetId, x: i32, y: i32) {
        match self.bounds(id) {
            Some(b) => self.set_bounds(id, Rect::new(x, y, b.width, b.height)),
            None => tracing::warn!(?id, "set_position on missing widget"),
        }
    }

    pub fn set_width(&mut self, id: WidgetId, width: i32) {
        match self.bounds(id) {
            Some(b) => self.set_bounds(id, Rect::new(b.x, b.y, width, b.height)),
            None => tracing::warn!(?id, "set_width on missing widget"),
        }
    }

    pub fn set_height(&mut self, id: WidgetId, height: i32) {
        match self.bounds(id) {
            Some(b) => self.set_bounds(id, Rect::new(b.x, b.y, b.width, height)),
            None => tracing::warn!(?id, "set_height on missing widget"),
        }
    }

    pub fn set_size(&mut self, id: WidgetId, size: Size) {
        match self.bounds(id) {
            Some(b) => self.set_bounds(id, Rect::from_origin_size(b.origin(), size)),
            None => tracing::warn!(?id, "set_size on missing widget"),
        }
    }

    /// Changes the widget's bounds. Listeners hear about it and a repaint
    /// is requested only when something actually changed. A resized stack
    /// layout re-lays out its children first.
    pub fn set_bounds(&mut self, id: WidgetId, bounds: Rect) {
        let Some(node) = self.nodes.get_mut(id) else {
            tracing::warn!(?id, "set_bounds on missing widget");
            return;
        };
        if node.bounds == bounds {
            return;
        }
        let resized = node.bounds.size() != bounds.size();
        node.bounds = bounds;

        if resized && matches!(node.kind, WidgetKind::Stack(_)) {
            self.rebuild(id);
        }
        self.notify_bounds_changed(id);
        self.request_repaint(id);
    }

    // --- flags and style ---

    pub fn set_focused(&mut self, id: WidgetId, focused: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            tracing::warn!(?id, "set_focused on missing widget");
            return;
        };
        if node.focused == focused {
            return;
        }
        node.focused = focused;
        self.notify_focus_changed(id, focused);
        self.request_repaint(id);
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.visible != visible {
                node.visible = visible;
                self.request_repaint(id);
            }
        }
    }

    pub fn set_transparent(&mut self, id: WidgetId, transparent: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.transparent != transparent {
                node.transparent = transparent;
                self.request_repaint(id);
            }
        }
    }

    pub fn set_style(&mut self, id: WidgetId, style: Option<Rc<Style>>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.style = style;
            self.request_repaint(id);
        }
    }

    // --- stack layout ---

    pub fn set_orientation(&mut self, id: WidgetId, orientation: Orientation) {
        self.update_stack(id, |layout| layout.orientation = orientation);
    }

    pub fn set_alignment(&mut self, id: WidgetId, alignment: Alignment) {
        self.update_stack(id, |layout| layout.alignment = alignment);
    }

    pub fn set_margin_x(&mut self, id: WidgetId, margin: i32) {
        self.update_stack(id, |layout| layout.margin_x = margin);
    }

    pub fn set_margin_y(&mut self, id: WidgetId, margin: i32) {
        self.update_stack(id, |layout| layout.margin_y = margin);
    }

    fn update_stack(&mut self, id: WidgetId, f: impl FnOnce(&mut StackLayout)) {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(WidgetKind::Stack(layout)) => f(layout),
            _ => {
                tracing::warn!(?id, "not a stack layout");
                return;
            }
        }
        self.rebuild(id);
        self.request_repaint(id);
    }

    /// Re-positions the children of a stack layout and, under `AutoSize`,
    /// resizes the layout to fit them. Does nothing for other widgets.
    pub fn rebuild(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let WidgetKind::Stack(layout) = node.kind else {
            return;
        };
        let own = node.bounds.size();
        let (ids, sizes): (Vec<WidgetId>, Vec<Size>) = node
            .children
            .iter()
            .filter_map(|&c| self.nodes.get(c).map(|n| (c, n.bounds.size())))
            .unzip();

        let placement = stack::arrange(&layout, own, &sizes);

        self.rebuilding.push(id);
        for (&child, pos) in ids.iter().zip(&placement.positions) {
            self.set_position(child, pos.x, pos.y);
        }
        self.rebuilding.pop();

        if let Some(size) = placement.size {
            let resized = match self.nodes.get_mut(id) {
                Some(node) if node.bounds.size() != size => {
                    node.bounds.width = size.width;
                    node.bounds.height = size.height;
                    true
                }
                _ => false,
            };
            if resized {
                self.notify_bounds_changed(id);
                self.request_repaint(id);
            }
        }

        tracing::debug!(
            ?id,
            children = ids.len(),
            extent = placement.extent,
            "stack rebuilt"
        );
    }

    // --- listeners ---

    /// Returns false if the listener was already registered.
    pub fn add_listener(&mut self, id: WidgetId, listener: Listener) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            tracing::warn!(?id, "add_listener on missing widget");
            return false;
        };
        if node.listeners.iter().any(|l| l.same_as(&listener)) {
            return false;
        }
        node.listeners.push(listener);
        true
    }

    pub fn remove_listener(&mut self, id: WidgetId, listener: &Listener) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let before = node.listeners.len();
        node.listeners.retain(|l| !l.same_as(listener));
        node.listeners.len() != before
    }

    fn notify_bounds_changed(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let bounds = node.bounds;
        let listeners = node.listeners.clone();

        for listener in &listeners {
            match listener {
                Listener::Widget(owner) => self.child_changed(*owner, id),
                Listener::External(weak) => {
                    if let Some(listener) = weak.upgrade() {
                        match listener.try_borrow_mut() {
                            Ok(mut l) => l.bounds_changed(id, bounds),
                            Err(_) => tracing::warn!(?id, "bounds listener busy"),
                        }
                    }
                }
            }
        }
        self.prune_listeners(id);
    }

    fn notify_focus_changed(&mut self, id: WidgetId, focused: bool) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let listeners = node.listeners.clone();

        for listener in &listeners {
            match listener {
                Listener::Widget(owner) => self.child_changed(*owner, id),
                Listener::External(weak) => {
                    if let Some(listener) = weak.upgrade() {
                        match listener.try_borrow_mut() {
                            Ok(mut l) => l.focus_changed(id, focused),
                            Err(_) => tracing::warn!(?id, "focus listener busy"),
                        }
                    }
                }
            }
        }
        self.prune_listeners(id);
    }

    fn child_changed(&mut self, owner: WidgetId, child: WidgetId) {
        if self.rebuilding.contains(&owner) || !self.nodes.contains_key(owner) {
            return;
        }
        tracing::trace!(?owner, ?child, "child changed");
        self.rebuild(owner);
        self.request_repaint(owner);
    }

    fn prune_listeners(&mut self, id: WidgetId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.listeners.retain(|l| !l.is_external_dead());
        }
    }

    // --- invalidation and drawing ---

    /// Marks the widget and all of its ancestors dirty.
    pub fn mark_dirty(&mut self, id: WidgetId) {
        let mut current = Some(id);
        while let Some(next) = current {
            let Some(node) = self.nodes.get_mut(next) else {
                break;
            };
            node.dirty = true;
            current = node.parent;
        }
    }

    pub fn request_repaint(&mut self, id: WidgetId) {
        self.mark_dirty(id);
        self.request_ui_update();
    }

    /// Pre-draw pass over the visible part of the subtree, parents first.
    pub fn update(&mut self, id: WidgetId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(node) = self.nodes.get_mut(next) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            if let WidgetKind::Custom(painter) = &mut node.kind {
                painter.update();
            }
            pending.extend(node.children.iter().rev().copied());
        }
    }

    /// Draws the subtree at `id` if it is dirty or `force` is set.
    ///
    /// A widget that paints forces its children to paint as well, since its
    /// background has just covered them. Every painted widget is clean
    /// afterwards.
    pub fn draw(
        &mut self,
        id: WidgetId,
        gfx: &mut dyn Graphics,
        styles: &StyleRegistry,
        force: bool,
    ) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.visible || !(force || node.dirty) {
            return;
        }
        node.dirty = false;
        let bounds = node.bounds;
        let local = Rect::new(0, 0, bounds.width, bounds.height);

        gfx.push_matrix();
        gfx.translate(bounds.x, bounds.y);
        if gfx.push_clip_rect(local) {
            if let Some(node) = self.nodes.get(id) {
                let style = styles.resolve(node);
                if !node.is_transparent_with(style) {
                    if let Some(background) = style.and_then(|s| s.background) {
                        gfx.set_color(background);
                        gfx.fill_rect(local);
                    }
                }
            }

            if let Some(Widget {
                kind: WidgetKind::Custom(painter),
                ..
            }) = self.nodes.get_mut(id)
            {
                painter.paint(gfx, bounds.size());
            }

            let children: SmallVec<[WidgetId; 8]> = self.children(id).iter().copied().collect();
            for child in children {
                self.draw(child, gfx, styles, true);
            }
        }
        gfx.pop_clip_rect();
        gfx.pop_matrix();
    }
}
