pub mod engine;
pub mod error;
pub mod stack;
pub mod style;
pub mod tree;
pub mod widget;

pub use engine::{DebugConsole, Engine, EngineConfig, LogConsole};
pub use error::TreeError;
pub use stack::{Alignment, Orientation, Placement, StackLayout};
pub use style::{Style, StyleRegistry};
pub use tree::{UiHandle, WidgetTree};
pub use widget::{Listener, Widget, WidgetId, WidgetKind, WidgetListener, WidgetPainter};
