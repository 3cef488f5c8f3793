//! Single-axis stacking of child widgets.
//!
//! The arithmetic lives in [`arrange`], a pure function over sizes; the tree
//! applies its result in [`crate::WidgetTree::rebuild`].

use mosaic_renderer::{Point, Size};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Cross-axis placement of children.
///
/// `TopLeft` means top for a horizontal stack and left for a vertical one,
/// `BottomRight` likewise. `AutoSize` pins children to the start and resizes
/// the layout itself to fit them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    TopLeft,
    Center,
    BottomRight,
    #[default]
    AutoSize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct StackLayout {
    pub orientation: Orientation,
    pub alignment: Alignment,
    pub margin_x: i32,
    pub margin_y: i32,
}

impl StackLayout {
    pub fn new(orientation: Orientation, alignment: Alignment) -> Self {
        Self {
            orientation,
            alignment,
            margin_x: 0,
            margin_y: 0,
        }
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical, Alignment::AutoSize)
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal, Alignment::AutoSize)
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_margins(mut self, margin_x: i32, margin_y: i32) -> Self {
        self.margin_x = margin_x;
        self.margin_y = margin_y;
        self
    }

    /// Gap inserted between consecutive children along the stack axis.
    pub fn spacing(&self) -> i32 {
        match self.orientation {
            Orientation::Vertical => self.margin_y,
            Orientation::Horizontal => self.margin_x,
        }
    }
}

/// Outcome of a layout pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// One position per child, in child order, relative to the layout.
    pub positions: Vec<Point>,
    /// Extent along the stack axis: child extents plus the gaps between them.
    pub extent: i32,
    /// New size of the layout itself; only set under `AutoSize`.
    pub size: Option<Size>,
}

pub fn arrange(layout: &StackLayout, own: Size, children: &[Size]) -> Placement {
    let spacing = layout.spacing();
    let mut positions = Vec::with_capacity(children.len());
    let mut offset = 0;
    let mut cross_max = 0;

    for child in children {
        let (main, cross) = match layout.orientation {
            Orientation::Vertical => (child.height, child.width),
            Orientation::Horizontal => (child.width, child.height),
        };
        let room = match layout.orientation {
            Orientation::Vertical => own.width,
            Orientation::Horizontal => own.height,
        };
        let cross_pos = match layout.alignment {
            Alignment::TopLeft | Alignment::AutoSize => 0,
            Alignment::Center => (room - cross) / 2,
            Alignment::BottomRight => room - cross,
        };

        positions.push(match layout.orientation {
            Orientation::Vertical => Point::new(cross_pos, offset),
            Orientation::Horizontal => Point::new(offset, cross_pos),
        });

        offset += main + spacing;
        cross_max = cross_max.max(cross);
    }

    let extent = if children.is_empty() {
        0
    } else {
        offset - spacing
    };

    let size = (layout.alignment == Alignment::AutoSize).then(|| match layout.orientation {
        Orientation::Vertical => Size::new(cross_max, extent),
        Orientation::Horizontal => Size::new(extent, cross_max),
    });

    Placement {
        positions,
        extent,
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heights(hs: &[i32]) -> Vec<Size> {
        hs.iter().map(|&h| Size::new(10, h)).collect()
    }

    #[test]
    fn vertical_offsets_accumulate() {
        let layout = StackLayout::vertical();
        let placement = arrange(&layout, Size::default(), &heights(&[10, 20, 5]));

        let ys: Vec<i32> = placement.positions.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0, 10, 30]);
        assert_eq!(placement.extent, 35);
        assert_eq!(placement.size, Some(Size::new(10, 35)));
    }

    #[test]
    fn margin_goes_between_children() {
        let layout = StackLayout::vertical().with_margins(0, 4);
        let placement = arrange(&layout, Size::default(), &heights(&[10, 20, 5]));

        let ys: Vec<i32> = placement.positions.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0, 14, 38]);
        assert_eq!(placement.extent, 43);
    }

    #[test]
    fn empty_auto_size_collapses() {
        let layout = StackLayout::horizontal().with_margins(7, 7);
        let placement = arrange(&layout, Size::new(50, 50), &[]);
        assert!(placement.positions.is_empty());
        assert_eq!(placement.size, Some(Size::new(0, 0)));
    }

    #[test]
    fn cross_axis_alignment() {
        let children = [Size::new(20, 10), Size::new(40, 10)];
        let own = Size::new(100, 0);

        let center = StackLayout::vertical().with_alignment(Alignment::Center);
        let xs: Vec<i32> = arrange(&center, own, &children)
            .positions
            .iter()
            .map(|p| p.x)
            .collect();
        assert_eq!(xs, vec![40, 30]);

        let end = StackLayout::vertical().with_alignment(Alignment::BottomRight);
        let placement = arrange(&end, own, &children);
        let xs: Vec<i32> = placement.positions.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![80, 60]);
        assert_eq!(placement.size, None);
    }

    #[test]
    fn horizontal_uses_x_margin_and_heights_for_cross() {
        let layout = StackLayout::horizontal().with_margins(2, 100);
        let children = [Size::new(5, 3), Size::new(6, 9)];
        let placement = arrange(&layout, Size::default(), &children);

        assert_eq!(
            placement.positions,
            vec![Point::new(0, 0), Point::new(7, 0)]
        );
        assert_eq!(placement.size, Some(Size::new(13, 9)));
    }
}
