use geo_types::Rect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::{MapCanvas, TextDisplay, DISTANCE_ELEMENT_ID, TIME_ELEMENT_ID};
use crate::{
    entities::{compute_bounds, Coordinates, Viewport, Widget, WidgetId},
    error::{config_error, invalid_input_error, missing_display_sink_error, Error},
};

const TILE_SIZE: f64 = 256.0;

pub const DEFAULT_ZOOM: f64 = 13.0;
pub const MIN_ZOOM: f64 = 4.5;
pub const MAX_ZOOM: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Parses `"<width>x<height>"` in pixels.
impl FromStr for ViewportSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once('x')
            .ok_or_else(|| config_error(format!("viewport {:?} is not WIDTHxHEIGHT", s)))?;

        let parse = |value: &str| -> Result<f64, Error> {
            match value.trim().parse::<f64>() {
                Ok(px) if px.is_finite() && px > 0.0 => Ok(px),
                _ => Err(config_error(format!("viewport dimension {:?}", value))),
            }
        };

        Ok(Self {
            width: parse(width)?,
            height: parse(height)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedWidget {
    pub id: WidgetId,
    #[serde(flatten)]
    pub widget: Widget,
}

/// Everything currently drawn, as a browser front end would render it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub center: Coordinates,
    pub zoom: f64,
    pub widgets: Vec<PlacedWidget>,
    pub texts: BTreeMap<String, String>,
}

/// In-memory map canvas. Clones share the same scene.
#[derive(Clone, Debug)]
pub struct SceneCanvas {
    scene: Arc<Mutex<Scene>>,
    size: ViewportSize,
    min_zoom: f64,
    max_zoom: f64,
}

impl Default for SceneCanvas {
    fn default() -> Self {
        Self::with_elements(&[TIME_ELEMENT_ID, DISTANCE_ELEMENT_ID])
    }
}

impl SceneCanvas {
    pub fn new(center: Coordinates, size: ViewportSize) -> Self {
        let mut canvas = Self::default();
        canvas.size = size;
        canvas.lock().center = center;
        canvas
    }

    /// Canvas whose page only has the given text elements.
    pub fn with_elements(element_ids: &[&str]) -> Self {
        let texts = element_ids
            .iter()
            .map(|id| (id.to_string(), String::new()))
            .collect();

        Self {
            scene: Arc::new(Mutex::new(Scene {
                center: Coordinates::new(0.0, 0.0),
                zoom: DEFAULT_ZOOM,
                widgets: vec![],
                texts,
            })),
            size: ViewportSize::default(),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn scene(&self) -> Scene {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Scene> {
        self.scene.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn project(point: &Coordinates) -> (f64, f64) {
    let x = (point.lng + 180.0) / 360.0;
    let lat = point.lat.clamp(-85.051_128_78, 85.051_128_78).to_radians();
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn unproject(x: f64, y: f64) -> Coordinates {
    let lng = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    Coordinates::new(lat, lng)
}

impl MapCanvas for SceneCanvas {
    fn add_widget(&mut self, widget: Widget) -> Result<WidgetId, Error> {
        let id = Uuid::new_v4();
        self.lock().widgets.push(PlacedWidget { id, widget });
        Ok(id)
    }

    fn remove_widget(&mut self, id: WidgetId) -> Result<(), Error> {
        let mut scene = self.lock();
        let before = scene.widgets.len();
        scene.widgets.retain(|placed| placed.id != id);

        if scene.widgets.len() == before {
            return Err(invalid_input_error(format!("no widget {}", id)));
        }

        Ok(())
    }

    fn set_center(&mut self, center: Coordinates) {
        self.lock().center = center;
    }

    fn set_zoom(&mut self, zoom: f64) -> f64 {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.lock().zoom = zoom;
        zoom
    }

    fn adjust_zoom(&self, coordinates: &[Coordinates]) -> Result<Viewport, Error> {
        let rect: Rect<f64> = compute_bounds(coordinates)?.into();

        let (west, north) = project(&Coordinates::new(rect.max().y, rect.min().x));
        let (east, south) = project(&Coordinates::new(rect.min().y, rect.max().x));
        let span_x = (east - west).abs();
        let span_y = (south - north).abs();

        let fit = |pixels: f64, span: f64| {
            if span > 0.0 {
                (pixels / (TILE_SIZE * span)).log2()
            } else {
                f64::INFINITY
            }
        };

        let zoom = fit(self.size.width, span_x)
            .min(fit(self.size.height, span_y))
            .clamp(self.min_zoom, self.max_zoom);

        Ok(Viewport {
            center: unproject((west + east) / 2.0, (north + south) / 2.0),
            zoom,
        })
    }
}

impl TextDisplay for SceneCanvas {
    fn set_text(&mut self, element_id: &str, text: &str) -> Result<(), Error> {
        let mut scene = self.lock();

        match scene.texts.get_mut(element_id) {
            Some(content) => {
                *content = text.to_string();
                Ok(())
            }
            None => Err(missing_display_sink_error(element_id)),
        }
    }
}

#[test]
fn parses_viewport_size() {
    let size: ViewportSize = "1024x768".parse().unwrap();
    assert_eq!(size.width, 1024.0);
    assert_eq!(size.height, 768.0);

    assert!("1024".parse::<ViewportSize>().is_err());
    assert!("0x768".parse::<ViewportSize>().is_err());
}

#[test]
fn projection_round_trips_near_tokyo() {
    let kagurazaka = Coordinates::new(35.7039, 139.7344);
    let (x, y) = project(&kagurazaka);
    let back = unproject(x, y);

    assert!((back.lat - kagurazaka.lat).abs() < 1e-9);
    assert!((back.lng - kagurazaka.lng).abs() < 1e-9);
}

#[test]
fn fit_centers_on_route_and_zooms_in_for_short_routes() {
    let canvas = SceneCanvas::default();
    let short = [
        Coordinates::new(35.7039, 139.7344),
        Coordinates::new(35.7005, 139.7424),
    ];

    let viewport = canvas.adjust_zoom(&short).unwrap();

    assert!((viewport.center.lng - 139.7384).abs() < 1e-6);
    assert!(viewport.center.lat < 35.7039 && viewport.center.lat > 35.7005);
    assert!(viewport.zoom > 16.5 && viewport.zoom < 17.5);
}

#[test]
fn fit_is_clamped() {
    let canvas = SceneCanvas::default();

    let point = [Coordinates::new(35.7, 139.7)];
    assert_eq!(canvas.adjust_zoom(&point).unwrap().zoom, MAX_ZOOM);

    let world = [Coordinates::new(-60.0, -170.0), Coordinates::new(70.0, 170.0)];
    assert_eq!(canvas.adjust_zoom(&world).unwrap().zoom, MIN_ZOOM);
}

#[test]
fn fit_of_nothing_is_empty_input() {
    use crate::error::EMPTY_INPUT;

    let canvas = SceneCanvas::default();
    assert_eq!(canvas.adjust_zoom(&[]).unwrap_err().code, EMPTY_INPUT);
}

#[test]
fn widgets_are_added_and_removed() {
    use crate::entities::{Marker, Polyline};

    let mut canvas = SceneCanvas::default();
    let marker = canvas
        .add_widget(Widget::Marker(Marker::numbered(Coordinates::new(35.7, 139.7), 1)))
        .unwrap();
    let line = canvas
        .add_widget(Widget::Polyline(Polyline::new(vec![])))
        .unwrap();

    canvas.remove_widget(line).unwrap();

    let scene = canvas.scene();
    assert_eq!(scene.widgets.len(), 1);
    assert_eq!(scene.widgets[0].id, marker);
    assert!(canvas.remove_widget(line).is_err());
}

#[test]
fn clones_share_the_scene() {
    let mut canvas = SceneCanvas::default();
    let observer = canvas.clone();

    canvas.set_center(Coordinates::new(35.7, 139.7));
    assert_eq!(canvas.set_zoom(1.0), MIN_ZOOM);

    let scene = observer.scene();
    assert_eq!(scene.center, Coordinates::new(35.7, 139.7));
    assert_eq!(scene.zoom, MIN_ZOOM);
}
