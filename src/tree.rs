//! The mounted component tree and its reconciler.
//!
//! A [`Node`] owns one component instance, its activation state, its
//! interval registration and its mounted children. All lifecycle rules live
//! here:
//!
//! - **Activation**: `on_mount`, then one interval registration, then an
//!   initial reconciliation of the children.
//! - **Deactivation**: the interval is cancelled first, children are
//!   deactivated recursively (but stay mounted), then `on_unmount`.
//! - **Reconciliation**: children are matched by position and kind. A match
//!   is reused and gets new props in place; anything else is built fresh.
//!   Every new instance is built before the child list is touched, so an
//!   unknown kind leaves the mounted children as they were.
//! - **Rendering**: inactive nodes leave the canvas untouched.
//!
//! Children never point at their parent. Anything a child wants its
//! ancestors to know travels up as an [`Action`] through the return path of
//! the call that produced it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

use crate::canvas::Canvas;
use crate::component::{Action, Component, RenderCtx, UpdateCtx};
use crate::error::{ConfigurationError, RenderError};
use crate::input::{ButtonEvent, EventResponse};
use crate::props::{Descriptor, Props};
use crate::registry::ComponentRegistry;
use crate::resources::Resources;
use crate::scheduler::{IntervalHandle, Scheduler, MIN_PERIOD};

bitflags! {
    /// What changed on a node since the last presented frame
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ChangeFlags: u8 {
        /// Appearance changed, the frame must be redrawn
        const NEEDS_RENDER     = 0b01;
        /// Children were mounted or unmounted
        const CHILDREN_CHANGED = 0b10;
    }
}

/// Outcome of one interval tick
#[derive(Debug, PartialEq)]
pub(crate) struct Fired {
    /// Actions no node on the way up handled
    pub escaped: Vec<Action>,
    /// The ticking node emitted actions, so ancestors may have changed
    pub emitted: bool,
}

/// Unique identity of a mounted component instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ComponentId(u64);

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

impl ComponentId {
    pub fn next() -> Self {
        ComponentId(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything lifecycle operations need besides the node itself.
pub(crate) struct Env<'a> {
    pub registry: &'a ComponentRegistry,
    pub scheduler: &'a mut Scheduler,
    pub resources: &'a Resources,
}

impl Env<'_> {
    fn ctx(&self) -> UpdateCtx<'_> {
        UpdateCtx::new(self.resources, self.scheduler.now())
    }
}

pub struct Node {
    id: ComponentId,
    descriptor: Descriptor,
    component: Box<dyn Component>,
    active: bool,
    children: Vec<Node>,
    interval: Option<IntervalHandle>,
    flags: ChangeFlags,
}

impl Node {
    /// Build an inactive node for `descriptor`.
    pub(crate) fn build(
        descriptor: &Descriptor,
        registry: &ComponentRegistry,
    ) -> Result<Node, ConfigurationError> {
        let component = registry.build(descriptor)?;
        Ok(Node {
            id: ComponentId::next(),
            descriptor: descriptor.clone(),
            component,
            active: false,
            children: Vec::new(),
            interval: None,
            flags: ChangeFlags::NEEDS_RENDER,
        })
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.descriptor.kind
    }

    pub fn props(&self) -> &Props {
        &self.descriptor.props
    }

    /// The descriptor this node was last reconciled against.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn interval_handle(&self) -> Option<IntervalHandle> {
        self.interval
    }

    pub fn flags(&self) -> ChangeFlags {
        self.flags
    }

    /// Descriptors the component currently asks for.
    pub fn desired_children(&self) -> Vec<Descriptor> {
        self.component.children()
    }

    /// Depth-first search for a node by id.
    pub fn find(&self, id: ComponentId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Whether this node or any descendant changed appearance.
    pub fn needs_render(&self) -> bool {
        self.flags.contains(ChangeFlags::NEEDS_RENDER)
            || self.children.iter().any(Node::needs_render)
    }

    pub(crate) fn clear_flags(&mut self) {
        self.flags = ChangeFlags::empty();
        for child in &mut self.children {
            child.clear_flags();
        }
    }

    pub(crate) fn activate(&mut self, env: &mut Env<'_>) -> Result<(), ConfigurationError> {
        if self.active {
            return Ok(());
        }

        let mut ctx = env.ctx();
        self.component.on_mount(&mut ctx)?;
        let (emitted, _) = ctx.finish();
        if !emitted.is_empty() {
            log::warn!(
                "{} {} emitted {} action(s) while mounting, dropped",
                self.kind(),
                self.id,
                emitted.len()
            );
        }

        self.active = true;
        if let Some(period) = self.component.interval() {
            self.interval = Some(env.scheduler.register(self.id, period));
        }
        self.flags |= ChangeFlags::NEEDS_RENDER;
        log::debug!("mounted {} {}", self.kind(), self.id);

        let desired = self.component.children();
        self.reconcile(desired, env)
    }

    pub(crate) fn deactivate(&mut self, scheduler: &mut Scheduler) {
        if !self.active {
            return;
        }

        if let Some(handle) = self.interval.take() {
            scheduler.cancel(handle);
        }
        for child in &mut self.children {
            child.deactivate(scheduler);
        }
        self.component.on_unmount();
        self.active = false;
        self.flags |= ChangeFlags::NEEDS_RENDER;
        log::debug!("unmounted {} {}", self.kind(), self.id);
    }

    /// Re-register the interval if the component now wants a different
    /// period than the live registration. A no-op on inactive nodes.
    fn sync_interval(&mut self, scheduler: &mut Scheduler) {
        if !self.active {
            return;
        }
        let wanted = self.component.interval().map(|period| period.max(MIN_PERIOD));
        let current = self.interval.and_then(|handle| scheduler.period(handle));
        if wanted == current {
            return;
        }

        if let Some(handle) = self.interval.take() {
            scheduler.cancel(handle);
        }
        if let Some(period) = wanted {
            self.interval = Some(scheduler.register(self.id, period));
        }
        log::debug!("{} {} interval now {:?}", self.kind(), self.id, wanted);
    }

    /// Bring the mounted children in line with `desired`.
    ///
    /// A no-op on inactive nodes. When a reused child rejects its new props,
    /// or a new child fails to activate, the remaining children are still
    /// processed and the first error is returned.
    pub(crate) fn reconcile(
        &mut self,
        desired: Vec<Descriptor>,
        env: &mut Env<'_>,
    ) -> Result<(), ConfigurationError> {
        if !self.active {
            return Ok(());
        }

        // Build every new instance up front.
        let mut fresh = Vec::with_capacity(desired.len());
        for (index, descriptor) in desired.iter().enumerate() {
            let reusable = self
                .children
                .get(index)
                .is_some_and(|child| child.descriptor.kind == descriptor.kind);
            fresh.push(if reusable {
                None
            } else {
                Some(Node::build(descriptor, env.registry)?)
            });
        }

        let mut first_error = None;
        let mut structure_changed = false;
        let mut old = std::mem::take(&mut self.children).into_iter();

        for (descriptor, new_node) in desired.into_iter().zip(fresh) {
            let previous = old.next();
            match (previous, new_node) {
                (previous, Some(node)) => {
                    if let Some(mut stale) = previous {
                        stale.deactivate(env.scheduler);
                    }
                    self.children.push(node);
                    structure_changed = true;
                }
                // Nothing is built only where a same-kind child exists.
                (None, None) => {}
                (Some(mut child), None) => {
                    if child.descriptor.props != descriptor.props {
                        match child.component.set_props(&descriptor.props, env.resources) {
                            Ok(()) => {
                                child.descriptor = descriptor;
                                child.flags |= ChangeFlags::NEEDS_RENDER;
                                child.sync_interval(env.scheduler);
                            }
                            Err(err) => {
                                first_error.get_or_insert(err);
                            }
                        }
                    }
                    self.children.push(child);
                }
            }
        }

        for mut stale in old {
            stale.deactivate(env.scheduler);
            structure_changed = true;
        }

        let mut visibility_changed = false;
        for (index, child) in self.children.iter_mut().enumerate() {
            let wanted = self.component.child_active(index);
            if wanted && !child.active {
                if let Err(err) = child.activate(env) {
                    log::warn!("failed to activate {} {}: {}", child.kind(), child.id, err);
                    first_error.get_or_insert(err);
                }
                visibility_changed = true;
            } else if !wanted && child.active {
                child.deactivate(env.scheduler);
                visibility_changed = true;
            }
        }

        if structure_changed {
            self.flags |= ChangeFlags::NEEDS_RENDER | ChangeFlags::CHILDREN_CHANGED;
        } else if visibility_changed {
            self.flags |= ChangeFlags::NEEDS_RENDER;
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// One update pass: reconcile this node, then every active child.
    pub(crate) fn update(&mut self, env: &mut Env<'_>) -> Result<(), ConfigurationError> {
        if !self.active {
            return Ok(());
        }
        let desired = self.component.children();
        self.reconcile(desired, env)?;
        for child in &mut self.children {
            child.update(env)?;
        }
        Ok(())
    }

    /// Draw this subtree. Inactive nodes leave the canvas unchanged.
    pub fn render(&self, canvas: &mut Canvas, resources: &Resources) -> Result<(), RenderError> {
        if !self.active {
            return Ok(());
        }
        let ctx = RenderCtx::new(&self.children, resources);
        self.component.render(canvas, &ctx)
    }

    /// Offer child actions to this component; returns those it did not
    /// handle plus anything it emitted while handling.
    fn bubble(&mut self, incoming: Vec<Action>, env: &Env<'_>) -> Vec<Action> {
        let mut outgoing = Vec::new();
        for action in incoming {
            let mut ctx = env.ctx();
            let response = self.component.on_action(&action, &mut ctx);
            let (emitted, render) = ctx.finish();
            if render || response.is_handled() {
                self.flags |= ChangeFlags::NEEDS_RENDER;
            }
            if !response.is_handled() {
                outgoing.push(action);
            }
            outgoing.extend(emitted);
        }
        outgoing
    }

    /// Route a button event down the focus path and back up.
    ///
    /// The deepest focused node sees the event first; each ancestor gets it
    /// only if everything below ignored it.
    pub(crate) fn dispatch_button(
        &mut self,
        event: ButtonEvent,
        env: &mut Env<'_>,
    ) -> (EventResponse, Vec<Action>) {
        if !self.active {
            return (EventResponse::Ignored, Vec::new());
        }

        let focused = self.component.focused_child();
        let (mut response, from_child) = match focused.and_then(|i| self.children.get_mut(i)) {
            Some(child) => child.dispatch_button(event, env),
            None => (EventResponse::Ignored, Vec::new()),
        };
        let mut outgoing = self.bubble(from_child, env);

        if !response.is_handled() {
            let mut ctx = env.ctx();
            response = self.component.on_button(event, &mut ctx);
            let (emitted, render) = ctx.finish();
            if render || response.is_handled() {
                self.flags |= ChangeFlags::NEEDS_RENDER;
            }
            outgoing.extend(emitted);
        }
        (response, outgoing)
    }

    /// Fire the interval of the node with `id`, if it is in this subtree and
    /// active.
    pub(crate) fn fire_interval(&mut self, id: ComponentId, env: &mut Env<'_>) -> Option<Fired> {
        if !self.active {
            return None;
        }

        if self.id == id {
            let mut ctx = env.ctx();
            self.component.on_interval(&mut ctx);
            let (emitted, render) = ctx.finish();
            if render {
                self.flags |= ChangeFlags::NEEDS_RENDER;
            }
            return Some(Fired {
                emitted: !emitted.is_empty(),
                escaped: emitted,
            });
        }

        for index in 0..self.children.len() {
            if let Some(fired) = self.children[index].fire_interval(id, env) {
                return Some(Fired {
                    escaped: self.bubble(fired.escaped, env),
                    ..fired
                });
            }
        }
        None
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.descriptor.kind)
            .field("active", &self.active)
            .field("children", &self.children)
            .finish()
    }
}
