use mosaic_core::{Engine, EngineConfig, StackLayout, Widget};
use mosaic_devtools::{DevBridge, DevToolsConsole, DevToolsContext, DevToolsSnapshot};
use mosaic_renderer::{RecordingCanvas, Rect, Size};
use mosaic_scheduler::LocalEventLoop;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct MockBridge {
    sent: Rc<RefCell<Vec<u64>>>,
}

impl DevBridge for MockBridge {
    fn send_snapshot(&self, snapshot: &DevToolsSnapshot) {
        self.sent.borrow_mut().push(snapshot.frame_count);
    }
}

#[test]
fn test_console_records_each_repaint() {
    let env = Rc::new(LocalEventLoop::new());
    let engine = Engine::new(
        env.clone(),
        RecordingCanvas::new(Size::new(64, 64)),
        EngineConfig::new().with_display_console(true),
    );
    let context = Rc::new(DevToolsContext::new());
    let bridge = MockBridge::default();
    context.set_bridge(Box::new(bridge.clone()));
    engine
        .borrow_mut()
        .set_console(Box::new(DevToolsConsole::new(context.clone())));

    let (stack, child) = {
        let mut engine = engine.borrow_mut();
        let tree = engine.tree_mut();
        let stack = tree.insert(Widget::stack(StackLayout::vertical()));
        let child = tree.insert(Widget::new(0, 0, 12, 7));
        tree.add(stack, child).unwrap();
        engine.set_main(stack).unwrap();
        (stack, child)
    };
    env.tick();

    let snapshot = context.snapshot();
    assert_eq!(snapshot.frame_count, 1);
    assert_eq!(snapshot.main, Some(stack.as_u64()));
    assert_eq!(snapshot.overlay, None);
    let node = snapshot.widget(stack).unwrap();
    assert_eq!(node.type_name, "StackLayout");
    assert_eq!(node.bounds, Rect::new(0, 0, 12, 7));
    assert_eq!(node.children, vec![child.as_u64()]);
    assert!(!node.dirty);
    assert_eq!(snapshot.widget(child).unwrap().parent, Some(stack.as_u64()));

    engine.borrow_mut().tree_mut().set_height(child, 9);
    env.tick();

    assert_eq!(context.frame_count(), 2);
    assert_eq!(*bridge.sent.borrow(), vec![1, 2]);
    assert_eq!(engine.borrow().graphics().frame_count(), 0);
}

#[test]
fn test_export_state_is_json() {
    let env = Rc::new(LocalEventLoop::new());
    let engine = Engine::new(
        env.clone(),
        RecordingCanvas::new(Size::new(10, 10)),
        EngineConfig::new().with_display_console(true),
    );
    let context = Rc::new(DevToolsContext::new());
    engine
        .borrow_mut()
        .set_console(Box::new(DevToolsConsole::new(context.clone())));
    let main = engine
        .borrow_mut()
        .tree_mut()
        .insert(Widget::new(1, 2, 3, 4));
    engine.borrow_mut().set_main(main).unwrap();
    env.tick();

    let json = context.export_state();
    let parsed: DevToolsSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, context.snapshot());
    assert_eq!(parsed.widget(main).unwrap().type_name, "Widget");
}
