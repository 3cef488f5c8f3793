use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mosaic_core::{StackLayout, StyleRegistry, Widget, WidgetTree};
use mosaic_renderer::{RecordingCanvas, Size};

fn build_stack(tree: &mut WidgetTree, children: usize) -> mosaic_core::WidgetId {
    let stack = tree.insert(Widget::stack(StackLayout::vertical().with_margins(0, 2)));
    for i in 0..children {
        let child = tree.insert(Widget::new(0, 0, 20, 1 + (i % 7) as i32));
        tree.add(stack, child).unwrap();
    }
    stack
}

fn benchmark_stack_build(c: &mut Criterion) {
    c.bench_function("stack add 200 children", |b| {
        b.iter(|| {
            let mut tree = WidgetTree::new();
            black_box(build_stack(&mut tree, 200));
        })
    });
}

fn benchmark_child_resize(c: &mut Criterion) {
    let mut tree = WidgetTree::new();
    let stack = build_stack(&mut tree, 200);
    let first = tree.children(stack)[0];
    let mut height = 1;

    c.bench_function("resize first of 200 children", |b| {
        b.iter(|| {
            height = height % 10 + 1;
            tree.set_height(first, height);
        })
    });
}

fn benchmark_draw(c: &mut Criterion) {
    let mut tree = WidgetTree::new();
    let stack = build_stack(&mut tree, 200);
    let styles = StyleRegistry::new();
    let mut gfx = RecordingCanvas::new(Size::new(320, 240));

    c.bench_function("draw 200 children", |b| {
        b.iter(|| {
            tree.draw(stack, &mut gfx, &styles, true);
        })
    });
}

criterion_group!(
    benches,
    benchmark_stack_build,
    benchmark_child_resize,
    benchmark_draw
);
criterion_main!(benches);
