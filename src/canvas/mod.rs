mod scene;

pub use scene::{PlacedWidget, Scene, SceneCanvas, ViewportSize};

use crate::{
    entities::{Coordinates, Viewport, Widget, WidgetId},
    error::Error,
};

pub const TIME_ELEMENT_ID: &str = "time";
pub const DISTANCE_ELEMENT_ID: &str = "dist";

/// Drawing surface of the map widget.
pub trait MapCanvas {
    fn add_widget(&mut self, widget: Widget) -> Result<WidgetId, Error>;

    fn remove_widget(&mut self, id: WidgetId) -> Result<(), Error>;

    fn set_center(&mut self, center: Coordinates);

    /// Returns the zoom actually applied, which may be clamped.
    fn set_zoom(&mut self, zoom: f64) -> f64;

    /// Center and zoom that fit every coordinate on screen.
    fn adjust_zoom(&self, coordinates: &[Coordinates]) -> Result<Viewport, Error>;
}

/// Text elements addressed by a stable identifier.
pub trait TextDisplay {
    /// Fails with `MISSING_DISPLAY_SINK` when no element has that id.
    fn set_text(&mut self, element_id: &str, text: &str) -> Result<(), Error>;
}
