use crate::error::TreeError;
use crate::style::{Style, StyleRegistry};
use crate::tree::{UiHandle, WidgetTree};
use crate::widget::WidgetId;
use mosaic_renderer::{Color, Graphics, Point, Rect};
use mosaic_scheduler::{Environment, FocusListener, IdleListener};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Where frames go instead of the screen when the debug console is on.
pub trait DebugConsole {
    fn display(&mut self, tree: &WidgetTree, main: Option<WidgetId>, overlay: Option<WidgetId>);
}

/// Console that dumps the widget tree through `tracing`.
#[derive(Debug, Default)]
pub struct LogConsole;

impl DebugConsole for LogConsole {
    fn display(&mut self, tree: &WidgetTree, main: Option<WidgetId>, overlay: Option<WidgetId>) {
        for root in main.into_iter().chain(overlay) {
            let mut pending = vec![(root, 0usize)];
            while let Some((id, depth)) = pending.pop() {
                let Some(widget) = tree.get(id) else {
                    continue;
                };
                tracing::info!(
                    depth,
                    dirty = widget.is_dirty(),
                    "{} {:?} {:?}",
                    widget.type_name(),
                    id,
                    widget.bounds()
                );
                pending.extend(widget.children().iter().rev().map(|&c| (c, depth + 1)));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Color the screen is cleared to before the main widget draws.
    pub background: Color,
    pub display_console: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            display_console: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_display_console(mut self, display_console: bool) -> Self {
        self.display_console = display_console;
        self
    }
}

/// Owns the widget tree and turns invalidations into frames.
///
/// The engine is shared as `Rc<RefCell<Engine<G>>>` because the host
/// environment calls back into it: once per idle slot after a repaint
/// request, and on focus changes. Repaint requests made in one turn of the
/// event loop coalesce into a single `repaint`.
pub struct Engine<G: Graphics> {
    tree: WidgetTree,
    gfx: G,
    env: Rc<dyn Environment>,
    main: Option<WidgetId>,
    overlay: Option<WidgetId>,
    overlay_position: Point,
    styles: StyleRegistry,
    config: EngineConfig,
    console: Box<dyn DebugConsole>,
    idle_self: Weak<RefCell<dyn IdleListener>>,
    focus_self: Weak<RefCell<dyn FocusListener>>,
    repaints: u64,
}

impl<G: Graphics + 'static> Engine<G> {
    pub fn new(env: Rc<dyn Environment>, gfx: G, config: EngineConfig) -> Rc<RefCell<Self>> {
        let screen = gfx.screen_size();
        let engine = Rc::new_cyclic(|this: &Weak<RefCell<Self>>| {
            let idle: Weak<RefCell<dyn IdleListener>> = this.clone();
            let focus: Weak<RefCell<dyn FocusListener>> = this.clone();
            RefCell::new(Self {
                tree: WidgetTree::with_ui(UiHandle::new(env.clone(), idle.clone())),
                gfx,
                env: env.clone(),
                main: None,
                overlay: None,
                overlay_position: Point::ZERO,
                styles: StyleRegistry::new(),
                config,
                console: Box::new(LogConsole),
                idle_self: idle,
                focus_self: focus,
                repaints: 0,
            })
        });

        env.add_focus_listener(engine.borrow().focus_self.clone());

        tracing::info!(
            width = screen.width,
            height = screen.height,
            "engine created"
        );
        engine
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn graphics(&self) -> &G {
        &self.gfx
    }

    pub fn graphics_mut(&mut self) -> &mut G {
        &mut self.gfx
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The main widget, unless it has since been destroyed.
    pub fn main(&self) -> Option<WidgetId> {
        self.main.filter(|&id| self.tree.contains(id))
    }

    pub fn repaint_count(&self) -> u64 {
        self.repaints
    }

    /// Makes `main` the root of the UI. It must be a root in the tree.
    ///
    /// A previously set main widget is not destroyed; its id is returned so
    /// the caller can keep it around for later or destroy it.
    pub fn set_main(&mut self, main: WidgetId) -> Result<Option<WidgetId>, TreeError> {
        let widget = self.tree.get(main).ok_or(TreeError::MissingWidget(main))?;
        if let Some(parent) = widget.parent() {
            return Err(TreeError::AlreadyParented {
                child: main,
                parent,
            });
        }
        self.tree.rebuild(main);

        let previous = self.main().filter(|&p| p != main);
        self.main = Some(main);
        self.tree.request_repaint(main);
        tracing::info!(?main, ?previous, "main widget set");
        Ok(previous)
    }

    pub fn request_ui_update(&self) {
        self.tree.request_ui_update();
    }

    /// Paints a full frame: the main widget, then the overlay on top.
    /// Does nothing while there is no live main widget.
    ///
    /// The background fill covers the whole screen, so main is always drawn
    /// in full no matter what triggered the repaint.
    pub fn repaint(&mut self) {
        let Some(main) = self.main() else {
            tracing::debug!("repaint skipped, no main widget");
            return;
        };
        let screen = self.gfx.screen_size();
        let full = Rect::new(0, 0, screen.width, screen.height);

        self.gfx.clear_clip_rect();
        self.gfx.clear_matrix();
        self.gfx.set_color(self.config.background);
        self.gfx.fill_rect(full);

        self.gfx.push_clip_rect(full);
        self.tree.update(main);
        self.tree.draw(main, &mut self.gfx, &self.styles, true);
        self.gfx.pop_clip_rect();

        let overlay = self.overlay();
        if let Some(overlay) = overlay {
            self.gfx.clear_clip_rect();
            self.gfx.clear_matrix();
            self.gfx.push_clip_rect(full);

            let Point { x, y } = self.overlay_position;
            self.gfx.translate(x, y);
            self.tree.update(overlay);
            self.tree.draw(overlay, &mut self.gfx, &self.styles, true);
            self.gfx.pop_clip_rect();
        }

        self.repaints += 1;
        tracing::debug!(
            repaint = self.repaints,
            overlay = overlay.is_some(),
            "repaint"
        );

        if self.config.display_console {
            self.console.display(&self.tree, Some(main), overlay);
        } else {
            self.gfx.update_screen();
        }
    }

    pub fn is_overlay_shown(&self) -> bool {
        self.overlay().is_some()
    }

    /// The shown overlay, unless it has since been destroyed.
    pub fn overlay(&self) -> Option<WidgetId> {
        self.overlay.filter(|&id| self.tree.contains(id))
    }

    pub fn overlay_position(&self) -> Point {
        self.overlay_position
    }

    /// Shows `overlay` with its top left corner at (x, y), replacing any
    /// overlay already shown. The overlay stays owned by the tree as a root.
    pub fn show_overlay(&mut self, x: i32, y: i32, overlay: WidgetId) -> Result<(), TreeError> {
        let widget = self
            .tree
            .get(overlay)
            .ok_or(TreeError::MissingWidget(overlay))?;
        if let Some(parent) = widget.parent() {
            return Err(TreeError::AlreadyParented {
                child: overlay,
                parent,
            });
        }

        self.overlay_position = Point::new(x, y);
        self.overlay = Some(overlay);
        self.tree.request_repaint(overlay);
        if let Some(main) = self.main() {
            self.tree.request_repaint(main);
        }
        tracing::info!(?overlay, x, y, "overlay shown");
        Ok(())
    }

    /// Hides the overlay and hands its id back. The main widget repaints to
    /// uncover what the overlay hid.
    pub fn hide_overlay(&mut self) -> Option<WidgetId> {
        let hidden = self.overlay();
        self.overlay = None;
        match self.main() {
            Some(main) => self.tree.request_repaint(main),
            None => self.tree.request_ui_update(),
        }
        tracing::info!(?hidden, "overlay hidden");
        hidden
    }

    /// Last write wins; the replaced style is returned, not dropped from
    /// widgets that hold it.
    pub fn set_default_style(
        &mut self,
        widget_type: impl Into<String>,
        style: Rc<Style>,
    ) -> Option<Rc<Style>> {
        self.styles.set(widget_type, style)
    }

    pub fn get_default_style(&self, widget_type: &str) -> Option<Rc<Style>> {
        self.styles.get(widget_type)
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn set_display_console(&mut self, display_console: bool) {
        self.config.display_console = display_console;
    }

    pub fn set_console(&mut self, console: Box<dyn DebugConsole>) {
        self.console = console;
    }
}

impl<G: Graphics + 'static> IdleListener for Engine<G> {
    fn idle(&mut self) {
        self.repaint();
        self.env.remove_idle_listener(&self.idle_self);
    }
}

impl<G: Graphics + 'static> FocusListener for Engine<G> {
    fn focus_lost(&mut self) {
        tracing::debug!("focus lost");
    }

    // Some hosts drop the back buffer while the app is in the background.
    fn focus_gained(&mut self) {
        if let Some(main) = self.main() {
            self.tree.request_repaint(main);
        }
        if let Some(overlay) = self.overlay() {
            self.tree.request_repaint(overlay);
        }
    }
}

impl<G: Graphics> Drop for Engine<G> {
    fn drop(&mut self) {
        self.env.remove_idle_listener(&self.idle_self);
        self.env.remove_focus_listener(&self.focus_self);
        tracing::debug!(widgets = self.tree.len(), "engine dropped");
    }
}
