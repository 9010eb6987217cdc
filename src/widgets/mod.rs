//! Built-in components.
//!
//! Each widget lives under a kind name and can be built from props through
//! the registry, or constructed directly and registered by the application
//! under its own kind. The lowercase helpers (`text`, `row`, ...) build the
//! matching [`Descriptor`](crate::props::Descriptor).

pub mod carousel;
pub mod image;
pub mod list;
pub mod marquee;
pub mod navigator;
pub mod row;
pub mod task;
pub mod text;

pub use carousel::{carousel, Carousel};
pub use self::image::{image, Frame, Image};
pub use list::{list, SelectableList};
pub use marquee::{marquee_text, MarqueeText};
pub use navigator::{navigator, transition, Navigator, Transition, TransitionTable};
pub use row::{row, Row};
pub use task::{TaskMonitor, TaskPage, TaskStatus};
pub use text::{text, Align, Text};

use crate::registry::ComponentRegistry;

/// Register every widget that can be built from props alone.
///
/// [`TaskPage`] needs a monitor and is registered by the application.
pub fn register_builtins(registry: &mut ComponentRegistry) {
    registry.register(text::KIND, Text::from_props);
    registry.register(marquee::KIND, MarqueeText::from_props);
    registry.register(image::KIND, Image::from_props);
    registry.register(row::KIND, Row::from_props);
    registry.register(list::KIND, SelectableList::from_props);
    registry.register(carousel::KIND, Carousel::from_props);
    registry.register(navigator::KIND, Navigator::from_props);
}

#[cfg(test)]
pub(crate) fn try_harness(
    resources: crate::resources::Resources,
    root: crate::props::Descriptor,
    width: u32,
    height: u32,
) -> crate::Result<crate::Runtime> {
    let config = crate::AppConfig::default().size(width, height);
    let mut runtime = crate::Runtime::new(config, ComponentRegistry::with_builtins(), resources, root)?;
    runtime.start()?;
    Ok(runtime)
}

#[cfg(test)]
pub(crate) fn harness_with(
    resources: crate::resources::Resources,
    root: crate::props::Descriptor,
    width: u32,
    height: u32,
) -> crate::Runtime {
    try_harness(resources, root, width, height).unwrap()
}

/// A started runtime with the built-in widgets and default resources.
#[cfg(test)]
pub(crate) fn harness(root: crate::props::Descriptor, width: u32, height: u32) -> crate::Runtime {
    harness_with(crate::resources::Resources::default(), root, width, height)
}
