use crate::canvas::{Canvas, Rect};
use crate::component::{Component, RenderCtx};
use crate::error::{ConfigurationError, RenderError};
use crate::props::{Descriptor, Props};
use crate::resources::Resources;

pub const KIND: &str = "row";

/// Lays its children out side by side, each in its own clipped column.
///
/// Column widths come from the `widths` prop; children without an explicit
/// width share whatever is left equally.
pub struct Row {
    children: Vec<Descriptor>,
    widths: Vec<u32>,
}

impl Row {
    pub fn from_props(props: &Props) -> Result<Self, ConfigurationError> {
        Ok(Self {
            children: props.children(KIND, "children")?,
            widths: props.u32_list(KIND, "widths")?,
        })
    }

    /// Column rects for a region `total` pixels wide.
    ///
    /// Columns never extend past `total`; those starting at the right edge
    /// get no width at all.
    fn columns(&self, total: u32, height: u32) -> Vec<Rect> {
        let count = self.children.len();
        let fixed = self
            .widths
            .iter()
            .take(count)
            .fold(0u32, |sum, width| sum.saturating_add(*width));
        let flexible = count.saturating_sub(self.widths.len()) as u32;
        let share = if flexible == 0 {
            0
        } else {
            total.saturating_sub(fixed) / flexible
        };

        let mut x = 0u32;
        (0..count)
            .map(|i| {
                let width = self.widths.get(i).copied().unwrap_or(share).min(total - x);
                let rect = Rect::new(x as i32, 0, width, height);
                x += width;
                rect
            })
            .collect()
    }
}

impl Component for Row {
    fn set_props(&mut self, props: &Props, _: &Resources) -> Result<(), ConfigurationError> {
        *self = Row::from_props(props)?;
        Ok(())
    }

    fn children(&self) -> Vec<Descriptor> {
        self.children.clone()
    }

    fn render(&self, canvas: &mut Canvas, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        for (index, column) in self
            .columns(canvas.width(), canvas.height())
            .into_iter()
            .enumerate()
        {
            canvas.with_region(column, |canvas| ctx.render_child(index, canvas))?;
        }
        Ok(())
    }
}

/// Descriptor for a [`Row`] of `children`.
pub fn row(children: Vec<Descriptor>) -> Descriptor {
    Descriptor::new(KIND).prop("children", children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{harness, text};

    #[test]
    fn test_equal_split() {
        let row = Row::from_props(&row(vec![text("a"), text("b")]).props).unwrap();
        assert_eq!(
            row.columns(128, 64),
            vec![Rect::new(0, 0, 64, 64), Rect::new(64, 0, 64, 64)]
        );
    }

    #[test]
    fn test_fixed_widths_leave_rest_to_others() {
        let row = Row::from_props(
            &row(vec![text("a"), text("b"), text("c")])
                .prop("widths", vec![28i64])
                .props,
        )
        .unwrap();
        assert_eq!(
            row.columns(128, 16),
            vec![
                Rect::new(0, 0, 28, 16),
                Rect::new(28, 0, 50, 16),
                Rect::new(78, 0, 50, 16),
            ]
        );
    }

    #[test]
    fn test_oversized_widths_are_clamped_to_the_region() {
        let row = Row::from_props(
            &row(vec![text("a"), text("b"), text("c")])
                .prop("widths", vec![i64::from(u32::MAX), i64::from(u32::MAX)])
                .props,
        )
        .unwrap();
        assert_eq!(
            row.columns(128, 16),
            vec![
                Rect::new(0, 0, 128, 16),
                Rect::new(128, 0, 0, 16),
                Rect::new(128, 0, 0, 16),
            ]
        );
    }

    #[test]
    fn test_children_are_clipped_to_their_column() {
        let long = "WWWWWWWWWWWWWWWWWWWW";
        let runtime = harness(
            row(vec![text(long).prop("size", 10), text("")]),
            64,
            10,
        );
        let canvas = runtime.render(Canvas::new(64, 10)).unwrap();
        assert!((0..10).any(|y| (0..32).any(|x| canvas.pixel(x, y))));
        assert!((0..10).all(|y| (32..64).all(|x| !canvas.pixel(x, y))));
    }
}
