use crate::geometry::{Color, Rect, Size};
use crate::graphics::Graphics;
use glam::IVec2;

/// Software clip and transform state, the part of the graphics API every
/// backend has to track regardless of where the pixels end up.
///
/// Clip rectangles are stored in device space so nested pushes intersect
/// correctly after translations.
#[derive(Debug, Clone)]
pub struct Canvas {
    screen: Size,
    clip_stack: Vec<Rect>,
    matrix_stack: Vec<IVec2>,
    translation: IVec2,
    color: Color,
}

impl Canvas {
    pub fn new(screen: Size) -> Self {
        Self {
            screen,
            clip_stack: Vec::new(),
            matrix_stack: Vec::new(),
            translation: IVec2::ZERO,
            color: Color::BLACK,
        }
    }

    pub fn screen_rect(&self) -> Rect {
        Rect::new(0, 0, self.screen.width, self.screen.height)
    }

    /// The innermost clip, or the full screen when nothing is pushed.
    pub fn current_clip(&self) -> Rect {
        self.clip_stack
            .last()
            .copied()
            .unwrap_or_else(|| self.screen_rect())
    }

    pub fn clip_depth(&self) -> usize {
        self.clip_stack.len()
    }

    pub fn matrix_depth(&self) -> usize {
        self.matrix_stack.len()
    }

    pub fn translation(&self) -> IVec2 {
        self.translation
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn to_device(&self, rect: Rect) -> Rect {
        rect.translate(self.translation.x, self.translation.y)
    }

    /// Device-space area a fill of `rect` would touch, if any.
    pub fn clipped(&self, rect: Rect) -> Option<Rect> {
        let device = self.to_device(rect).intersect(&self.current_clip());
        (!device.is_empty()).then_some(device)
    }
}

impl Graphics for Canvas {
    fn screen_size(&self) -> Size {
        self.screen
    }

    fn clear_clip_rect(&mut self) {
        self.clip_stack.clear();
    }

    fn push_clip_rect(&mut self, rect: Rect) -> bool {
        let clip = self.to_device(rect).intersect(&self.current_clip());
        self.clip_stack.push(clip);
        !clip.is_empty()
    }

    fn pop_clip_rect(&mut self) {
        if self.clip_stack.pop().is_none() {
            tracing::warn!("pop_clip_rect called with an empty clip stack");
        }
    }

    fn clear_matrix(&mut self) {
        self.translation = IVec2::ZERO;
        self.matrix_stack.clear();
    }

    fn push_matrix(&mut self) {
        self.matrix_stack.push(self.translation);
    }

    fn pop_matrix(&mut self) {
        match self.matrix_stack.pop() {
            Some(t) => self.translation = t,
            None => tracing::warn!("pop_matrix called with an empty matrix stack"),
        }
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.translation += IVec2::new(dx, dy);
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn fill_rect(&mut self, rect: Rect) {
        if let Some(area) = self.clipped(rect) {
            tracing::trace!(?area, color = self.color.0, "fill");
        }
    }

    fn update_screen(&mut self) {}
}
