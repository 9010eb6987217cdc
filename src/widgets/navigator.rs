//! Page navigation.
//!
//! A [`Navigator`] keeps a stack of page descriptors. The top page is the
//! only active one; pages underneath stay mounted and inactive so their
//! state (a list selection, say) is still there after going back.
//!
//! Pages move the stack in two ways:
//!
//! - by emitting [`Action::Push`] or [`Action::Back`], which bubble up to
//!   the nearest navigator;
//! - through a [`TransitionTable`] keyed by the top page's kind and the
//!   released button, consulted only when the page itself ignored the
//!   button.
//!
//! Cancel goes back when the table says nothing else. The stack never drops
//! below its root page.

use std::collections::HashMap;
use std::time::Duration;

use crate::animation::{TimingFunction, Tween};
use crate::canvas::{Canvas, Rect};
use crate::component::{Action, Component, RenderCtx, UpdateCtx};
use crate::error::{ConfigurationError, RenderError};
use crate::input::{Button, ButtonEvent, EventResponse};
use crate::props::{Descriptor, Props};
use crate::resources::Resources;

pub const KIND: &str = "navigator";

/// Tick period while a slide is running
const SLIDE_FRAME: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Replace the top page
    Goto(Descriptor),
    /// Open a page on top of the current one
    Push(Descriptor),
    /// Return to the page underneath
    Back,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    entries: HashMap<(String, Button), Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, page_kind: impl Into<String>, button: Button, transition: Transition) {
        self.entries.insert((page_kind.into(), button), transition);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn on(mut self, page_kind: impl Into<String>, button: Button, transition: Transition) -> Self {
        self.insert(page_kind, button, transition);
        self
    }

    pub fn get(&self, page_kind: &str, button: Button) -> Option<&Transition> {
        self.entries.get(&(page_kind.to_string(), button))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the `transitions` prop: a list of entries as built by
    /// [`transition`].
    pub fn from_props(props: &Props) -> Result<Self, ConfigurationError> {
        let invalid = |prop: &str, expected: &'static str| ConfigurationError::InvalidProp {
            kind: KIND.to_string(),
            prop: prop.to_string(),
            expected,
        };

        let mut table = TransitionTable::new();
        for entry in props.children(KIND, "transitions")? {
            let from = entry.props.text(KIND, "from")?;
            let button = Button::from_name(entry.props.text(KIND, "button")?)
                .ok_or_else(|| invalid("button", "one of up, down, select, cancel"))?;
            let transition = if let Some(page) = entry.props.child(KIND, "goto")? {
                Transition::Goto(page.clone())
            } else if let Some(page) = entry.props.child(KIND, "push")? {
                Transition::Push(page.clone())
            } else if entry.props.bool_or(KIND, "back", false)? {
                Transition::Back
            } else {
                return Err(invalid("transitions", "each entry to name goto, push or back"));
            };
            table.insert(from, button, transition);
        }
        Ok(table)
    }
}

/// One entry of a navigator's `transitions` prop.
pub fn transition(page_kind: &str, button: Button, transition: Transition) -> Descriptor {
    let entry = Descriptor::new("transition")
        .prop("from", page_kind)
        .prop("button", button.name());
    match transition {
        Transition::Goto(page) => entry.prop("goto", page),
        Transition::Push(page) => entry.prop("push", page),
        Transition::Back => entry.prop("back", true),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone)]
struct Slide {
    tween: Tween,
    direction: Direction,
    /// Page sliding out, when it is still mounted
    outgoing: Option<usize>,
    progress: f32,
}

pub struct Navigator {
    stack: Vec<Descriptor>,
    table: TransitionTable,
    slide_duration: Duration,
    timing: TimingFunction,
    slide: Option<Slide>,
}

impl Navigator {
    pub fn new(root: Descriptor) -> Self {
        Self {
            stack: vec![root],
            table: TransitionTable::new(),
            slide_duration: Duration::ZERO,
            timing: TimingFunction::EaseOut,
            slide: None,
        }
    }

    pub fn table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    /// Animate page changes with a horizontal slide.
    pub fn slide(mut self, duration: Duration, timing: TimingFunction) -> Self {
        self.slide_duration = duration;
        self.timing = timing;
        self
    }

    pub fn from_props(props: &Props) -> Result<Self, ConfigurationError> {
        let root = props
            .child(KIND, "root")?
            .ok_or_else(|| ConfigurationError::MissingProp {
                kind: KIND.to_string(),
                prop: "root".to_string(),
            })?
            .clone();
        let easing = props.text_or(KIND, "easing", "ease-out")?;
        let timing = TimingFunction::from_name(easing).ok_or_else(|| ConfigurationError::InvalidProp {
            kind: KIND.to_string(),
            prop: "easing".to_string(),
            expected: "one of linear, ease-in, ease-out, ease-in-out",
        })?;
        let duration = Duration::from_millis(u64::from(props.u32_or(KIND, "transition_ms", 0)?));

        Ok(Navigator::new(root)
            .table(TransitionTable::from_props(props)?)
            .slide(duration, timing))
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current(&self) -> &Descriptor {
        &self.stack[self.top()]
    }

    fn top(&self) -> usize {
        self.stack.len() - 1
    }

    /// Apply `transition`; returns false when it changes nothing.
    fn navigate(&mut self, transition: Transition, ctx: &mut UpdateCtx<'_>) -> bool {
        let (direction, outgoing) = match transition {
            Transition::Goto(page) => {
                log::debug!("navigator: {} -> {}", self.current().kind, page.kind);
                let top = self.top();
                self.stack[top] = page;
                (Direction::Forward, None)
            }
            Transition::Push(page) => {
                log::debug!("navigator: push {} over {}", page.kind, self.current().kind);
                self.stack.push(page);
                (Direction::Forward, Some(self.top() - 1))
            }
            Transition::Back => {
                if self.stack.len() < 2 {
                    return false;
                }
                let popped = self.stack.pop();
                log::debug!(
                    "navigator: back from {}",
                    popped.map(|page| page.kind).unwrap_or_default()
                );
                (Direction::Backward, None)
            }
        };

        self.slide = (!self.slide_duration.is_zero()).then(|| Slide {
            tween: Tween::start(self.slide_duration, self.timing, ctx.now()),
            direction,
            outgoing,
            progress: 0.0,
        });
        ctx.request_render();
        true
    }

    fn respond(&mut self, transition: Transition, ctx: &mut UpdateCtx<'_>) -> EventResponse {
        if self.navigate(transition, ctx) {
            EventResponse::Handled
        } else {
            EventResponse::Ignored
        }
    }
}

impl Component for Navigator {
    fn set_props(&mut self, props: &Props, _: &Resources) -> Result<(), ConfigurationError> {
        let next = Navigator::from_props(props)?;
        if next.stack[0] != self.stack[0] {
            self.stack = next.stack;
            self.slide = None;
        }
        self.table = next.table;
        self.slide_duration = next.slide_duration;
        self.timing = next.timing;
        Ok(())
    }

    fn children(&self) -> Vec<Descriptor> {
        self.stack.clone()
    }

    fn child_active(&self, index: usize) -> bool {
        index == self.top() || self.slide.as_ref().is_some_and(|s| s.outgoing == Some(index))
    }

    fn focused_child(&self) -> Option<usize> {
        Some(self.top())
    }

    fn interval(&self) -> Option<Duration> {
        (!self.slide_duration.is_zero()).then_some(SLIDE_FRAME)
    }

    fn on_interval(&mut self, ctx: &mut UpdateCtx<'_>) {
        let Some(slide) = self.slide.as_mut() else {
            return;
        };
        if slide.tween.is_finished(ctx.now()) {
            self.slide = None;
        } else {
            slide.progress = slide.tween.progress(ctx.now());
        }
        ctx.request_render();
    }

    fn on_button(&mut self, event: ButtonEvent, ctx: &mut UpdateCtx<'_>) -> EventResponse {
        let Some(button) = event.released() else {
            return EventResponse::Ignored;
        };
        match self.table.get(&self.current().kind, button).cloned() {
            Some(transition) => self.respond(transition, ctx),
            None if button == Button::Cancel => self.respond(Transition::Back, ctx),
            None => EventResponse::Ignored,
        }
    }

    fn on_action(&mut self, action: &Action, ctx: &mut UpdateCtx<'_>) -> EventResponse {
        match action {
            Action::Push(page) => self.respond(Transition::Push(page.clone()), ctx),
            Action::Back => self.respond(Transition::Back, ctx),
            Action::Custom(_) => EventResponse::Ignored,
        }
    }

    fn render(&self, canvas: &mut Canvas, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        let top = self.top();
        let Some(slide) = &self.slide else {
            return ctx.render_child(top, canvas);
        };

        let (width, height) = (canvas.width(), canvas.height());
        let offset = ((1.0 - slide.progress) * width as f32).round() as i32;
        let incoming_x = match slide.direction {
            Direction::Forward => offset,
            Direction::Backward => -offset,
        };
        if let Some(outgoing) = slide.outgoing {
            let area = Rect::new(offset - width as i32, 0, width, height);
            canvas.with_region(area, |canvas| ctx.render_child(outgoing, canvas))?;
        }
        let area = Rect::new(incoming_x, 0, width, height);
        canvas.with_region(area, |canvas| ctx.render_child(top, canvas))
    }
}

/// Descriptor for a [`Navigator`] starting at `root`.
pub fn navigator(root: Descriptor) -> Descriptor {
    Descriptor::new(KIND).prop("root", root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{harness, list, text};
    use crate::Runtime;

    fn release(runtime: &mut Runtime, button: Button) -> EventResponse {
        runtime.handle_button(ButtonEvent::release(button)).unwrap()
    }

    fn page_kinds(runtime: &Runtime) -> Vec<String> {
        runtime
            .root()
            .children()
            .iter()
            .map(|page| page.descriptor().props.text("test", "text").unwrap_or("?").to_string())
            .collect()
    }

    #[test]
    fn test_table_round_trips_through_props() {
        let nav = navigator(text("home")).prop(
            "transitions",
            vec![
                transition("text", Button::Select, Transition::Push(text("next"))),
                transition("text", Button::Up, Transition::Back),
            ],
        );
        let table = TransitionTable::from_props(&nav.props).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("text", Button::Select),
            Some(&Transition::Push(text("next")))
        );
        assert_eq!(table.get("text", Button::Up), Some(&Transition::Back));
        assert_eq!(table.get("text", Button::Down), None);
    }

    #[test]
    fn test_root_is_required() {
        assert!(matches!(
            Navigator::from_props(&Props::new()),
            Err(ConfigurationError::MissingProp { .. })
        ));
    }

    #[test]
    fn test_only_top_page_is_active() {
        let nav = navigator(text("home")).prop(
            "transitions",
            vec![transition("text", Button::Select, Transition::Push(text("next")))],
        );
        let mut runtime = harness(nav, 128, 64);

        assert!(release(&mut runtime, Button::Select).is_handled());
        assert_eq!(page_kinds(&runtime), ["home", "next"]);
        let pages = runtime.root().children();
        assert!(!pages[0].is_active());
        assert!(pages[1].is_active());
    }

    #[test]
    fn test_cancel_goes_back_but_not_past_root() {
        let mut runtime = harness(navigator(text("home")), 128, 64);
        assert_eq!(release(&mut runtime, Button::Cancel), EventResponse::Ignored);
        assert_eq!(page_kinds(&runtime), ["home"]);
    }

    #[test]
    fn test_back_keeps_lower_page_state() {
        let rows = vec![
            text("a"),
            text("b"),
            text("c").prop("page", text("details")),
        ];
        let mut runtime = harness(navigator(list(rows)), 128, 64);
        let list_id = runtime.root().children()[0].id();

        release(&mut runtime, Button::Down);
        release(&mut runtime, Button::Down);
        let before = runtime.render(Canvas::new(128, 64)).unwrap();

        release(&mut runtime, Button::Select);
        assert_eq!(runtime.root().children().len(), 2);
        release(&mut runtime, Button::Cancel);

        assert_eq!(runtime.root().children().len(), 1);
        assert_eq!(runtime.root().children()[0].id(), list_id);
        assert_eq!(runtime.render(Canvas::new(128, 64)).unwrap(), before);
    }

    #[test]
    fn test_goto_replaces_the_top_page() {
        let nav = navigator(text("home").prop("size", 10)).prop(
            "transitions",
            vec![transition(
                "text",
                Button::Down,
                Transition::Goto(Descriptor::new("carousel")),
            )],
        );
        let mut runtime = harness(nav, 128, 64);
        release(&mut runtime, Button::Down);

        let pages = runtime.root().children();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].kind(), "carousel");
    }

    #[test]
    fn test_slide_ends_on_the_new_page() {
        let nav = navigator(text("home"))
            .prop("transition_ms", 100)
            .prop("easing", "linear")
            .prop(
                "transitions",
                vec![transition("text", Button::Select, Transition::Push(text("next")))],
            );
        let mut runtime = harness(nav, 64, 16);
        let home = runtime.render(Canvas::new(64, 16)).unwrap();
        let next = harness(text("next"), 64, 16)
            .render(Canvas::new(64, 16))
            .unwrap();

        release(&mut runtime, Button::Select);
        // Both pages are live while the slide runs
        assert!(runtime.root().children().iter().all(|page| page.is_active()));

        runtime.advance(Duration::from_millis(40)).unwrap();
        let midway = runtime.render(Canvas::new(64, 16)).unwrap();
        assert_ne!(midway, home);
        assert_ne!(midway, next);

        runtime.advance(Duration::from_millis(80)).unwrap();
        assert_eq!(runtime.render(Canvas::new(64, 16)).unwrap(), next);
        assert!(!runtime.root().children()[0].is_active());
    }
}
