use crate::geometry::{Color, Rect, Size};

/// The host's low-level 2D drawing API.
///
/// Calls are fire-and-forget: the host never reports failures. Rectangles
/// passed to `push_clip_rect` and `fill_rect` are in local coordinates and
/// are mapped through the current translation by the implementation.
pub trait Graphics {
    /// Size of the display in pixels.
    fn screen_size(&self) -> Size;

    /// Drops every clip rectangle, leaving the whole screen drawable.
    fn clear_clip_rect(&mut self);

    /// Intersects `rect` with the current clip and pushes the result.
    /// Returns false when the new clip is empty.
    fn push_clip_rect(&mut self, rect: Rect) -> bool;

    fn pop_clip_rect(&mut self);

    /// Resets the translation and drops every saved matrix.
    fn clear_matrix(&mut self);

    fn push_matrix(&mut self);

    fn pop_matrix(&mut self);

    fn translate(&mut self, dx: i32, dy: i32);

    fn set_color(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect);

    /// Presents the back buffer.
    fn update_screen(&mut self);
}
