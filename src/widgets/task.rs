//! A page that reports on an external task.
//!
//! The engine never starts or supervises processes itself. Whatever does
//! hands a [`TaskMonitor`] to the page; the page polls it on its interval,
//! shows the state, and emits [`Action::Back`] once the task is over so the
//! surrounding navigator returns to the previous page.

use std::time::Duration;

use crate::canvas::Canvas;
use crate::component::{Action, Component, RenderCtx, UpdateCtx};
use crate::error::{ConfigurationError, RenderError};
use crate::props::Props;
use crate::resources::{FontStyle, Resources};

use super::text::{draw_text, resolve_font};

pub const KIND: &str = "task";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Exited(i32),
    Failed(String),
}

impl TaskStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, TaskStatus::Running)
    }

    fn label(&self) -> String {
        match self {
            TaskStatus::Running => "Running...".to_string(),
            TaskStatus::Exited(code) => format!("Exited ({code})"),
            TaskStatus::Failed(reason) => format!("Failed: {reason}"),
        }
    }
}

pub trait TaskMonitor {
    fn poll(&mut self) -> TaskStatus;
}

impl<F> TaskMonitor for F
where
    F: FnMut() -> TaskStatus,
{
    fn poll(&mut self) -> TaskStatus {
        self()
    }
}

pub struct TaskPage {
    title: String,
    monitor: Box<dyn TaskMonitor>,
    status: TaskStatus,
    period: Duration,
    reported: bool,
}

impl TaskPage {
    pub fn new(title: impl Into<String>, monitor: impl TaskMonitor + 'static) -> Self {
        Self {
            title: title.into(),
            monitor: Box::new(monitor),
            status: TaskStatus::Running,
            period: Duration::from_millis(500),
            reported: false,
        }
    }

    pub fn poll_every(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Build from `title` and `poll_ms` props around an existing monitor.
    ///
    /// ```ignore
    /// registry.register("update", move |props: &Props| {
    ///     TaskPage::from_props(props, spawn_updater())
    /// });
    /// ```
    pub fn from_props(
        props: &Props,
        monitor: impl TaskMonitor + 'static,
    ) -> Result<Self, ConfigurationError> {
        Ok(TaskPage::new(props.text_or(KIND, "title", "Working")?, monitor).poll_every(
            Duration::from_millis(u64::from(props.u32_or(KIND, "poll_ms", 500)?)),
        ))
    }

    pub fn status(&self) -> &TaskStatus {
        &self.status
    }
}

impl Component for TaskPage {
    fn set_props(&mut self, props: &Props, _: &Resources) -> Result<(), ConfigurationError> {
        self.title = props.text_or(KIND, "title", "Working")?.to_string();
        self.period = Duration::from_millis(u64::from(props.u32_or(KIND, "poll_ms", 500)?));
        Ok(())
    }

    fn interval(&self) -> Option<Duration> {
        Some(self.period)
    }

    fn on_interval(&mut self, ctx: &mut UpdateCtx<'_>) {
        let status = self.monitor.poll();
        if status != self.status {
            log::info!("task {:?}: {}", self.title, status.label());
            self.status = status;
            ctx.request_render();
        }
        if !self.status.is_running() && !self.reported {
            self.reported = true;
            ctx.emit(Action::Back);
        }
    }

    fn render(&self, canvas: &mut Canvas, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        let title = resolve_font(ctx.fonts(), FontStyle::bold(14))?;
        let body = resolve_font(ctx.fonts(), FontStyle::regular(10))?;
        draw_text(canvas, title, &self.title, 0, 0);
        let y = title.character_size.height as i32 + 4;
        draw_text(canvas, body, &self.status.label(), 0, y);
        Ok(())
    }
}
