use crate::widget::WidgetId;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("widget {0:?} does not exist")]
    MissingWidget(WidgetId),

    #[error("widget {child:?} already has parent {parent:?}")]
    AlreadyParented { child: WidgetId, parent: WidgetId },

    #[error("widget {child:?} is not a child of {parent:?}")]
    NotAChild { parent: WidgetId, child: WidgetId },

    #[error("adding {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: WidgetId, child: WidgetId },
}
