use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use miniscreen::canvas::{Canvas, Rect};
use miniscreen::component::{Component, RenderCtx, UpdateCtx};
use miniscreen::error::{ConfigurationError, RenderError};
use miniscreen::input::{Button, ButtonEvent};
use miniscreen::props::{Descriptor, Props};
use miniscreen::registry::ComponentRegistry;
use miniscreen::resources::Resources;
use miniscreen::scheduler::Scheduler;
use miniscreen::tree::Node;
use miniscreen::widgets::{navigator, transition, Transition};
use miniscreen::{AppConfig, Runtime};

type Log = Rc<RefCell<Vec<String>>>;
type Desired = Rc<RefCell<Vec<Descriptor>>>;

/// Root whose children are whatever the test puts in `desired`
struct Host {
    desired: Desired,
}

impl Component for Host {
    fn children(&self) -> Vec<Descriptor> {
        self.desired.borrow().clone()
    }
}

/// A row that ticks every 100ms and logs its lifecycle
struct Row {
    name: String,
    log: Log,
}

impl Component for Row {
    fn interval(&self) -> Option<Duration> {
        Some(Duration::from_millis(100))
    }

    fn on_interval(&mut self, _ctx: &mut UpdateCtx<'_>) {
        self.log.borrow_mut().push(format!("tick {}", self.name));
    }

    fn on_mount(&mut self, _ctx: &mut UpdateCtx<'_>) -> Result<(), ConfigurationError> {
        self.log.borrow_mut().push(format!("mount {}", self.name));
        Ok(())
    }

    fn on_unmount(&mut self) {
        self.log.borrow_mut().push(format!("unmount {}", self.name));
    }
}

/// Fills the rect given by its props
struct Block {
    rect: Rect,
}

impl Block {
    fn from_props(props: &Props) -> Result<Self, ConfigurationError> {
        Ok(Self {
            rect: Rect::new(
                props.i32_or("block", "x", 0)?,
                props.i32_or("block", "y", 0)?,
                props.u32_or("block", "w", 1)?,
                props.u32_or("block", "h", 1)?,
            ),
        })
    }
}

impl Component for Block {
    fn render(&self, canvas: &mut Canvas, _ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        canvas.invert_rect(self.rect);
        Ok(())
    }
}

struct Harness {
    runtime: Runtime,
    desired: Desired,
    log: Log,
}

impl Harness {
    fn new(initial: Vec<Descriptor>) -> Self {
        let desired: Desired = Rc::new(RefCell::new(initial));
        let log: Log = Rc::default();

        let mut registry = ComponentRegistry::new();
        let host_desired = desired.clone();
        registry.register("host", move |_: &Props| {
            Ok(Host {
                desired: host_desired.clone(),
            })
        });
        for name in ["rowA", "rowB", "rowC"] {
            let log = log.clone();
            registry.register(name, move |_: &Props| {
                Ok(Row {
                    name: name.to_string(),
                    log: log.clone(),
                })
            });
        }
        registry.register("block", Block::from_props);

        let mut runtime = Runtime::new(
            AppConfig::default(),
            registry,
            Resources::default(),
            Descriptor::new("host"),
        )
        .unwrap();
        runtime.start().unwrap();
        log.borrow_mut().clear();

        Self {
            runtime,
            desired,
            log,
        }
    }

    fn set_desired(&mut self, desired: Vec<Descriptor>) {
        *self.desired.borrow_mut() = desired;
        self.runtime.update().unwrap();
    }

    fn take_log(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

fn rows(kinds: &[&str]) -> Vec<Descriptor> {
    kinds.iter().map(|kind| Descriptor::new(*kind)).collect()
}

/// Inactive nodes own no interval and have no active children.
fn assert_activation_invariant(node: &Node, scheduler: &Scheduler) {
    if !node.is_active() {
        assert_eq!(scheduler.registrations_for(node.id()), 0, "{} still ticks", node.kind());
        assert!(node.children().iter().all(|child| !child.is_active()));
    }
    assert!(scheduler.registrations_for(node.id()) <= 1);
    for child in node.children() {
        assert_activation_invariant(child, scheduler);
    }
}

#[test]
fn activation_gives_each_row_one_interval() {
    let harness = Harness::new(rows(&["rowA", "rowB"]));
    let root = harness.runtime.root();

    assert_eq!(root.children().len(), 2);
    for child in root.children() {
        assert!(child.is_active());
        assert_eq!(harness.runtime.scheduler().registrations_for(child.id()), 1);
    }
    assert_activation_invariant(root, harness.runtime.scheduler());
}

#[test]
fn deactivating_the_root_silences_its_rows() {
    let mut harness = Harness::new(rows(&["rowA", "rowB"]));
    harness.runtime.advance(Duration::from_millis(100)).unwrap();
    assert_eq!(harness.take_log(), vec!["tick rowA", "tick rowB"]);

    harness.runtime.stop();
    let root = harness.runtime.root();
    assert!(root.children().iter().all(|child| !child.is_active()));
    assert_eq!(harness.runtime.scheduler().live_count(), 0);
    assert_activation_invariant(root, harness.runtime.scheduler());

    harness.runtime.advance(Duration::from_millis(1000)).unwrap();
    assert_eq!(harness.take_log(), vec!["unmount rowA", "unmount rowB"]);
}

#[test]
fn reconcile_keeps_matching_row_and_replaces_the_other() {
    let mut harness = Harness::new(rows(&["rowA", "rowB"]));
    let before: Vec<_> = harness.runtime.root().children().iter().map(Node::id).collect();

    harness.set_desired(rows(&["rowA", "rowC"]));

    let after = harness.runtime.root().children();
    assert_eq!(after[0].id(), before[0]);
    assert_ne!(after[1].id(), before[1]);
    assert_eq!(after[1].kind(), "rowC");
    assert!(after[1].is_active());
    assert_eq!(harness.runtime.scheduler().registrations_for(before[1]), 0);
    assert!(harness.runtime.root().find(before[1]).is_none());
    assert_eq!(harness.take_log(), vec!["unmount rowB", "mount rowC"]);
    assert_activation_invariant(harness.runtime.root(), harness.runtime.scheduler());
}

#[test]
fn repeated_updates_do_not_churn() {
    let mut harness = Harness::new(rows(&["rowA", "rowB"]));
    harness.set_desired(rows(&["rowA", "rowC"]));
    let first: Vec<_> = harness.runtime.root().children().iter().map(Node::id).collect();
    harness.take_log();

    harness.set_desired(rows(&["rowA", "rowC"]));
    harness.runtime.update().unwrap();

    let second: Vec<_> = harness.runtime.root().children().iter().map(Node::id).collect();
    assert_eq!(first, second);
    assert!(harness.take_log().is_empty());
}

#[test]
fn removed_rows_never_tick_again() {
    let mut harness = Harness::new(rows(&["rowA", "rowB"]));
    harness.runtime.advance(Duration::from_millis(50)).unwrap();
    harness.set_desired(rows(&["rowA"]));
    harness.take_log();

    harness.runtime.advance(Duration::from_millis(500)).unwrap();
    let log = harness.take_log();
    assert_eq!(log.len(), 5);
    assert!(log.iter().all(|entry| entry == "tick rowA"));
}

#[test]
fn unknown_kind_keeps_the_mounted_rows() {
    let mut harness = Harness::new(rows(&["rowA", "rowB"]));
    let before: Vec<_> = harness.runtime.root().children().iter().map(Node::id).collect();

    *harness.desired.borrow_mut() = rows(&["rowC", "nope"]);
    let err = harness.runtime.update().unwrap_err();

    assert!(matches!(err, ConfigurationError::UnknownComponent(kind) if kind == "nope"));
    let after: Vec<_> = harness.runtime.root().children().iter().map(Node::id).collect();
    assert_eq!(before, after);
    assert!(harness.take_log().is_empty());
}

#[test]
fn parent_render_composites_children_in_order() {
    let leaf1 = Descriptor::new("block").prop("w", 100).prop("h", 40);
    let leaf2 = Descriptor::new("block")
        .prop("x", 50)
        .prop("y", 20)
        .prop("w", 78)
        .prop("h", 44);
    let harness = Harness::new(vec![leaf1, leaf2]);

    let composed = harness.runtime.render(Canvas::new(128, 64)).unwrap();

    // Overlap shows both draws happened, the second on top of the first
    let mut expected = Canvas::new(128, 64);
    expected.invert_rect(Rect::new(0, 0, 100, 40));
    expected.invert_rect(Rect::new(50, 20, 78, 44));
    assert_eq!(composed, expected);
    assert!(!composed.pixel(60, 30));
    assert!(composed.pixel(10, 10));
    assert!(composed.pixel(110, 50));
}

/// A page marking its own 10px column
struct Page {
    marker: u32,
}

impl Component for Page {
    fn render(&self, canvas: &mut Canvas, _ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        canvas.fill_rect(Rect::new(self.marker as i32 * 10, 0, 10, 10), true);
        Ok(())
    }
}

fn page_registry() -> ComponentRegistry {
    ComponentRegistry::with_builtins()
        .with("P1", |_: &Props| Ok(Page { marker: 1 }))
        .with("P2", |_: &Props| Ok(Page { marker: 2 }))
}

#[test]
fn select_moves_from_p1_to_p2() {
    let p1 = Descriptor::new("P1");
    let p2 = Descriptor::new("P2");
    let root = navigator(p1).prop(
        "transitions",
        vec![transition("P1", Button::Select, Transition::Goto(p2.clone()))],
    );
    let mut runtime = Runtime::new(AppConfig::default(), page_registry(), Resources::default(), root).unwrap();
    runtime.start().unwrap();

    runtime.handle_button(ButtonEvent::press(Button::Select)).unwrap();
    runtime.handle_button(ButtonEvent::release(Button::Select)).unwrap();

    assert_eq!(runtime.root().desired_children(), vec![p2.clone()]);
    assert_eq!(runtime.root().children().len(), 1);
    assert_eq!(runtime.root().children()[0].kind(), "P2");

    let mut standalone = Runtime::new(AppConfig::default(), page_registry(), Resources::default(), p2).unwrap();
    standalone.start().unwrap();
    assert_eq!(
        runtime.render(Canvas::new(128, 64)).unwrap(),
        standalone.render(Canvas::new(128, 64)).unwrap()
    );
}

#[test]
fn reactivation_registers_exactly_once() {
    let mut harness = Harness::new(rows(&["rowA"]));
    for _ in 0..3 {
        harness.runtime.stop();
        harness.runtime.start().unwrap();
    }
    let row = &harness.runtime.root().children()[0];
    assert_eq!(harness.runtime.scheduler().registrations_for(row.id()), 1);

    harness.take_log();
    harness.runtime.advance(Duration::from_millis(100)).unwrap();
    assert_eq!(harness.take_log(), vec!["tick rowA"]);
}
