use mosaic_renderer::{Color, DrawCommand, Graphics, RecordingCanvas, Rect, Size};

#[test]
fn test_fills_are_recorded_in_device_space() {
    let mut gfx = RecordingCanvas::new(Size::new(100, 100));

    gfx.translate(10, 20);
    gfx.set_color(Color::WHITE);
    gfx.fill_rect(Rect::new(0, 0, 5, 5));
    gfx.update_screen();

    let frame = gfx.last_frame().expect("one frame");
    assert_eq!(
        frame.commands,
        vec![
            DrawCommand::Fill {
                rect: Rect::new(10, 20, 5, 5),
                color: Color::WHITE,
            },
            DrawCommand::Present,
        ]
    );
}

#[test]
fn test_fills_are_clipped() {
    let mut gfx = RecordingCanvas::new(Size::new(100, 100));

    gfx.push_clip_rect(Rect::new(0, 0, 50, 50));
    gfx.fill_rect(Rect::new(40, 40, 20, 20));
    gfx.fill_rect(Rect::new(60, 60, 10, 10));
    gfx.pop_clip_rect();

    let fills: Vec<_> = gfx
        .pending()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Fill { rect, .. } => Some(*rect),
            DrawCommand::Present => None,
        })
        .collect();
    assert_eq!(fills, vec![Rect::new(40, 40, 10, 10)]);
}

#[test]
fn test_present_closes_frame() {
    let mut gfx = RecordingCanvas::new(Size::new(10, 10));
    gfx.fill_rect(Rect::new(0, 0, 1, 1));
    gfx.update_screen();
    gfx.update_screen();

    assert_eq!(gfx.frame_count(), 2);
    assert_eq!(gfx.frames()[0].fill_count(), 1);
    assert_eq!(gfx.frames()[1].fill_count(), 0);
    assert!(gfx.pending().is_empty());

    let taken = gfx.take_frames();
    assert_eq!(taken.len(), 2);
    assert_eq!(gfx.frame_count(), 0);
}
