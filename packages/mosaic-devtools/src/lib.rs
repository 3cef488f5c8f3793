//! Inspection hooks for a running engine.
//!
//! Install a [`DevToolsConsole`] on the engine and turn the display console
//! on; every repaint then lands here as a [`DevToolsSnapshot`] instead of on
//! the screen, and can be exported as JSON or pushed to a [`DevBridge`].

use mosaic_core::{DebugConsole, WidgetId, WidgetTree};
use mosaic_renderer::Rect;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetNode {
    pub id: u64,
    pub type_name: String,
    pub bounds: Rect,
    pub parent: Option<u64>,
    pub children: Vec<u64>,
    pub visible: bool,
    pub focused: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevToolsSnapshot {
    pub widgets: BTreeMap<u64, WidgetNode>,
    pub main: Option<u64>,
    pub overlay: Option<u64>,
    pub frame_count: u64,
}

impl DevToolsSnapshot {
    /// Captures every widget in `tree`; `frame_count` is left at zero.
    pub fn capture(tree: &WidgetTree, main: Option<WidgetId>, overlay: Option<WidgetId>) -> Self {
        let widgets = tree
            .iter()
            .map(|(id, w)| {
                let node = WidgetNode {
                    id: id.as_u64(),
                    type_name: w.type_name().to_string(),
                    bounds: w.bounds(),
                    parent: w.parent().map(WidgetId::as_u64),
                    children: w.children().iter().map(|c| c.as_u64()).collect(),
                    visible: w.is_visible(),
                    focused: w.is_focused(),
                    dirty: w.is_dirty(),
                };
                (node.id, node)
            })
            .collect();

        Self {
            widgets,
            main: main.map(WidgetId::as_u64),
            overlay: overlay.map(WidgetId::as_u64),
            frame_count: 0,
        }
    }

    pub fn widget(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.widgets.get(&id.as_u64())
    }
}

/// Receives a snapshot after every recorded frame.
pub trait DevBridge {
    fn send_snapshot(&self, snapshot: &DevToolsSnapshot);
}

#[derive(Default)]
pub struct DevToolsContext {
    snapshot: RefCell<DevToolsSnapshot>,
    bridge: RefCell<Option<Box<dyn DevBridge>>>,
}

impl DevToolsContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bridge(&self, bridge: Box<dyn DevBridge>) {
        *self.bridge.borrow_mut() = Some(bridge);
    }

    pub fn record_frame(
        &self,
        tree: &WidgetTree,
        main: Option<WidgetId>,
        overlay: Option<WidgetId>,
    ) {
        let mut snapshot = self.snapshot.borrow_mut();
        let frame_count = snapshot.frame_count + 1;
        *snapshot = DevToolsSnapshot {
            frame_count,
            ..DevToolsSnapshot::capture(tree, main, overlay)
        };
        tracing::debug!(
            frame_count,
            widgets = snapshot.widgets.len(),
            "frame recorded"
        );

        if let Some(bridge) = self.bridge.borrow().as_ref() {
            bridge.send_snapshot(&snapshot);
        }
    }

    pub fn snapshot(&self) -> DevToolsSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn frame_count(&self) -> u64 {
        self.snapshot.borrow().frame_count
    }

    pub fn export_state(&self) -> String {
        let snapshot = self.snapshot.borrow();
        serde_json::to_string(&*snapshot).unwrap_or_default()
    }
}

/// Debug console that records frames into a shared [`DevToolsContext`].
#[derive(Clone)]
pub struct DevToolsConsole {
    context: Rc<DevToolsContext>,
}

impl DevToolsConsole {
    pub fn new(context: Rc<DevToolsContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Rc<DevToolsContext> {
        &self.context
    }
}

impl DebugConsole for DevToolsConsole {
    fn display(&mut self, tree: &WidgetTree, main: Option<WidgetId>, overlay: Option<WidgetId>) {
        self.context.record_frame(tree, main, overlay);
    }
}
