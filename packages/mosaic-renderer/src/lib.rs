pub mod canvas;
pub mod geometry;
pub mod graphics;
pub mod scene;

pub use canvas::Canvas;
pub use geometry::{Color, Point, Rect, Size};
pub use graphics::Graphics;
pub use scene::{DrawCommand, Frame, RecordingCanvas};
