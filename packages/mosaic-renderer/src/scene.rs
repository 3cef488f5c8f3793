use crate::canvas::Canvas;
use crate::geometry::{Color, Rect, Size};
use crate::graphics::Graphics;

/// A drawing operation as it reached the screen: device coordinates,
/// already clipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    Fill { rect: Rect, color: Color },
    Present,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn fills(&self) -> impl Iterator<Item = (Rect, Color)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Fill { rect, color } => Some((*rect, *color)),
            DrawCommand::Present => None,
        })
    }

    pub fn fill_count(&self) -> usize {
        self.fills().count()
    }
}

/// Headless graphics backend that records what would have been drawn.
///
/// Commands accumulate until `update_screen`, which closes the current
/// frame. Fully clipped fills are not recorded.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    canvas: Canvas,
    pending: Vec<DrawCommand>,
    frames: Vec<Frame>,
}

impl RecordingCanvas {
    pub fn new(screen: Size) -> Self {
        Self {
            canvas: Canvas::new(screen),
            pending: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Commands drawn since the last present.
    pub fn pending(&self) -> &[DrawCommand] {
        &self.pending
    }

    pub fn take_frames(&mut self) -> Vec<Frame> {
        std::mem::take(&mut self.frames)
    }
}

impl Graphics for RecordingCanvas {
    fn screen_size(&self) -> Size {
        self.canvas.screen_size()
    }

    fn clear_clip_rect(&mut self) {
        self.canvas.clear_clip_rect();
    }

    fn push_clip_rect(&mut self, rect: Rect) -> bool {
        self.canvas.push_clip_rect(rect)
    }

    fn pop_clip_rect(&mut self) {
        self.canvas.pop_clip_rect();
    }

    fn clear_matrix(&mut self) {
        self.canvas.clear_matrix();
    }

    fn push_matrix(&mut self) {
        self.canvas.push_matrix();
    }

    fn pop_matrix(&mut self) {
        self.canvas.pop_matrix();
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.canvas.translate(dx, dy);
    }

    fn set_color(&mut self, color: Color) {
        self.canvas.set_color(color);
    }

    fn fill_rect(&mut self, rect: Rect) {
        if let Some(rect) = self.canvas.clipped(rect) {
            self.pending.push(DrawCommand::Fill {
                rect,
                color: self.canvas.color(),
            });
        }
    }

    fn update_screen(&mut self) {
        self.pending.push(DrawCommand::Present);
        let commands = std::mem::take(&mut self.pending);
        self.frames.push(Frame { commands });
    }
}
