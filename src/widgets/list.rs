//! A vertical menu of rows with one selected row.
//!
//! Every row stays mounted; only the rows inside the visible window are
//! active, so scrolling a long list pauses the rows that move out of view.
//! Up and Down move the selection and Select pushes the selected row's
//! `page` prop (when it has one) as a new page.

use crate::canvas::{Canvas, Rect};
use crate::component::{Action, Component, RenderCtx, UpdateCtx};
use crate::error::{ConfigurationError, RenderError};
use crate::input::{Button, ButtonEvent, EventResponse};
use crate::props::{Descriptor, Props};
use crate::resources::Resources;

pub const KIND: &str = "list";

pub struct SelectableList {
    rows: Vec<Descriptor>,
    row_height: u32,
    visible_rows: usize,
    selected: usize,
    top: usize,
}

impl SelectableList {
    pub fn from_props(props: &Props) -> Result<Self, ConfigurationError> {
        let mut list = Self {
            rows: props.children(KIND, "rows")?,
            row_height: props.u32_or(KIND, "row_height", 16)?.max(1),
            visible_rows: props.u32_or(KIND, "visible_rows", 4)?.max(1) as usize,
            selected: props.u32_or(KIND, "selected", 0)? as usize,
            top: 0,
        };
        list.clamp();
        Ok(list)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn clamp(&mut self) {
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
        if self.selected < self.top {
            self.top = self.selected;
        } else if self.selected >= self.top + self.visible_rows {
            self.top = self.selected + 1 - self.visible_rows;
        }
    }

    fn select(&mut self, index: usize) -> bool {
        let previous = self.selected;
        self.selected = index;
        self.clamp();
        self.selected != previous
    }
}

impl Component for SelectableList {
    fn set_props(&mut self, props: &Props, _: &Resources) -> Result<(), ConfigurationError> {
        let next = SelectableList::from_props(props)?;
        self.rows = next.rows;
        self.row_height = next.row_height;
        self.visible_rows = next.visible_rows;
        // Keep the user's selection across prop updates
        self.clamp();
        Ok(())
    }

    fn children(&self) -> Vec<Descriptor> {
        self.rows.clone()
    }

    fn child_active(&self, index: usize) -> bool {
        index >= self.top && index < self.top + self.visible_rows
    }

    fn focused_child(&self) -> Option<usize> {
        (!self.rows.is_empty()).then_some(self.selected)
    }

    fn on_button(&mut self, event: ButtonEvent, ctx: &mut UpdateCtx<'_>) -> EventResponse {
        let Some(button) = event.released() else {
            return EventResponse::Ignored;
        };
        match button {
            Button::Up => {
                if self.select(self.selected.saturating_sub(1)) {
                    ctx.request_render();
                }
                EventResponse::Handled
            }
            Button::Down => {
                if self.select(self.selected + 1) {
                    ctx.request_render();
                }
                EventResponse::Handled
            }
            Button::Select => {
                let page = self
                    .rows
                    .get(self.selected)
                    .and_then(|row| row.props.child(&row.kind, "page").ok().flatten());
                match page {
                    Some(page) => {
                        ctx.emit(Action::Push(page.clone()));
                        EventResponse::Handled
                    }
                    None => EventResponse::Ignored,
                }
            }
            Button::Cancel => EventResponse::Ignored,
        }
    }

    fn render(&self, canvas: &mut Canvas, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        let width = canvas.width();
        for index in self.top..(self.top + self.visible_rows).min(self.rows.len()) {
            let y = ((index - self.top) as u32 * self.row_height) as i32;
            let area = Rect::new(0, y, width, self.row_height);
            canvas.with_region(area, |canvas| ctx.render_child(index, canvas))?;
            if index == self.selected {
                canvas.invert_rect(area);
            }
        }
        Ok(())
    }
}

/// Descriptor for a [`SelectableList`] of `rows`.
pub fn list(rows: Vec<Descriptor>) -> Descriptor {
    Descriptor::new(KIND).prop("rows", rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{harness, text};

    fn rows(count: usize) -> Vec<Descriptor> {
        (0..count).map(|i| text(format!("row {i}"))).collect()
    }

    fn release(runtime: &mut crate::Runtime, button: Button) {
        runtime.handle_button(ButtonEvent::press(button)).unwrap();
        runtime.handle_button(ButtonEvent::release(button)).unwrap();
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut list = SelectableList::from_props(&list(rows(3)).prop("selected", 7).props).unwrap();
        assert_eq!(list.selected(), 2);
        assert!(!list.select(5));
        assert!(list.select(0));
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn test_only_visible_rows_are_active() {
        let mut runtime = harness(list(rows(6)), 128, 64);
        let active = |runtime: &crate::Runtime| -> Vec<bool> {
            runtime.root().children().iter().map(|c| c.is_active()).collect()
        };
        assert_eq!(active(&runtime), [true, true, true, true, false, false]);

        for _ in 0..5 {
            release(&mut runtime, Button::Down);
        }
        assert_eq!(active(&runtime), [false, false, true, true, true, true]);
        assert_eq!(runtime.root().children().len(), 6);
    }

    #[test]
    fn test_selected_row_is_inverted() {
        let runtime = harness(list(rows(2)).prop("visible_rows", 2), 32, 32);
        let canvas = runtime.render(Canvas::new(32, 32)).unwrap();
        // Background of the selected row is lit, the other row's is not
        assert!(canvas.pixel(31, 15));
        assert!(!canvas.pixel(31, 31));
    }

    #[test]
    fn test_select_pushes_row_page() {
        let page = text("details");
        let mut runtime = harness(
            crate::widgets::navigator(list(vec![text("plain"), text("more").prop("page", page.clone())])),
            128,
            64,
        );
        release(&mut runtime, Button::Select);
        assert_eq!(runtime.root().children().len(), 1);

        release(&mut runtime, Button::Down);
        release(&mut runtime, Button::Select);
        let pages: Vec<_> = runtime.root().children().iter().map(|c| c.descriptor().clone()).collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], page);
    }
}
