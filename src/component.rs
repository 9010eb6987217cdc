//! The component contract.
//!
//! A [`Component`] is one node's behaviour: what children it wants, how it
//! reacts to time and buttons, and how it draws. The lifecycle around it
//! (activation, interval registration, reconciliation) is driven by
//! [`Node`](crate::tree::Node); components only describe and react.

use std::time::Duration;

use crate::canvas::Canvas;
use crate::error::{ConfigurationError, RenderError};
use crate::input::{ButtonEvent, EventResponse};
use crate::props::{Descriptor, Props};
use crate::resources::{FontProvider, Resources};
use crate::tree::Node;

/// Message sent from a component to its ancestors.
///
/// Actions bubble up the tree until some ancestor's
/// [`Component::on_action`] handles them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Open a new page on top of the current one
    Push(Descriptor),
    /// Return to the previous page
    Back,
    /// Application-defined message
    Custom(String),
}

/// Context for callbacks that may change component state.
pub struct UpdateCtx<'a> {
    resources: &'a Resources,
    now: Duration,
    actions: Vec<Action>,
    render_requested: bool,
}

impl<'a> UpdateCtx<'a> {
    pub(crate) fn new(resources: &'a Resources, now: Duration) -> Self {
        Self {
            resources,
            now,
            actions: Vec::new(),
            render_requested: false,
        }
    }

    pub fn resources(&self) -> &Resources {
        self.resources
    }

    /// Virtual time of the current step.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Send an action to the ancestors of this component.
    pub fn emit(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Mark the component's appearance as changed.
    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    pub(crate) fn finish(self) -> (Vec<Action>, bool) {
        (self.actions, self.render_requested)
    }
}

/// Context handed to [`Component::render`].
pub struct RenderCtx<'a> {
    children: &'a [Node],
    resources: &'a Resources,
}

impl<'a> RenderCtx<'a> {
    pub(crate) fn new(children: &'a [Node], resources: &'a Resources) -> Self {
        Self {
            children,
            resources,
        }
    }

    pub fn resources(&self) -> &Resources {
        self.resources
    }

    pub fn fonts(&self) -> &dyn FontProvider {
        self.resources.fonts.as_ref()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Render one mounted child into the current canvas region.
    ///
    /// Inactive children and out of range indices leave the canvas as is.
    pub fn render_child(&self, index: usize, canvas: &mut Canvas) -> Result<(), RenderError> {
        match self.children.get(index) {
            Some(child) => child.render(canvas, self.resources),
            None => Ok(()),
        }
    }

    /// Render all mounted children in order, each on top of the previous.
    pub fn render_children(&self, canvas: &mut Canvas) -> Result<(), RenderError> {
        for child in self.children {
            child.render(canvas, self.resources)?;
        }
        Ok(())
    }
}

pub trait Component {
    /// Apply new props to an instance that is being reused in place.
    ///
    /// Only called when the props differ from the ones the instance has.
    /// On error the instance keeps its previous props.
    fn set_props(&mut self, props: &Props, resources: &Resources) -> Result<(), ConfigurationError> {
        let _ = (props, resources);
        Ok(())
    }

    /// The children this component wants mounted right now, in order.
    fn children(&self) -> Vec<Descriptor> {
        Vec::new()
    }

    /// Whether the mounted child at `index` should be active.
    ///
    /// Inactive children stay mounted and keep their state but do not tick
    /// or render.
    fn child_active(&self, index: usize) -> bool {
        let _ = index;
        true
    }

    /// Child that receives button events before this component does.
    fn focused_child(&self) -> Option<usize> {
        None
    }

    /// Period of this component's interval, if it wants one.
    ///
    /// Read on activation and again after every successful `set_props`; a
    /// changed period replaces the registration.
    fn interval(&self) -> Option<Duration> {
        None
    }

    /// Called on each interval tick while active. Must only touch this
    /// component's own state.
    fn on_interval(&mut self, ctx: &mut UpdateCtx<'_>) {
        let _ = ctx;
    }

    /// Called when the component becomes active, before its interval is
    /// registered and its children are reconciled.
    fn on_mount(&mut self, ctx: &mut UpdateCtx<'_>) -> Result<(), ConfigurationError> {
        let _ = ctx;
        Ok(())
    }

    /// Called when the component becomes inactive, after its interval is
    /// cancelled and its children are deactivated.
    fn on_unmount(&mut self) {}

    fn on_button(&mut self, event: ButtonEvent, ctx: &mut UpdateCtx<'_>) -> EventResponse {
        let _ = (event, ctx);
        EventResponse::Ignored
    }

    /// Offered every action a descendant emits.
    fn on_action(&mut self, action: &Action, ctx: &mut UpdateCtx<'_>) -> EventResponse {
        let _ = (action, ctx);
        EventResponse::Ignored
    }

    /// Draw into `canvas`. The default composites the children in order.
    fn render(&self, canvas: &mut Canvas, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        ctx.render_children(canvas)
    }
}
