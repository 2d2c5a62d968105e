use crate::{
    canvas::{MapCanvas, TextDisplay},
    entities::{
        compute_bounds, Coordinates, Marker, Polyline, RouteResult, Viewport, Widget, WidgetId,
    },
    error::Error,
    format::{show_route_info, Locale},
};

pub struct Drawn {
    pub viewport: Option<Viewport>,
    pub display_error: Option<Error>,
}

/// Canvas plus the widgets the current route put on it.
pub struct View<S> {
    pub canvas: S,
    polyline: Option<WidgetId>,
    markers: Vec<WidgetId>,
}

impl<S> View<S>
where
    S: MapCanvas + TextDisplay,
{
    pub fn new(canvas: S) -> Self {
        Self {
            canvas,
            polyline: None,
            markers: vec![],
        }
    }

    pub fn clear_polyline(&mut self) {
        if let Some(id) = self.polyline.take() {
            if let Err(err) = self.canvas.remove_widget(id) {
                tracing::warn!("failed to remove previous polyline: {}", err);
            }
        }
    }

    fn clear_markers(&mut self) {
        for id in self.markers.drain(..) {
            if let Err(err) = self.canvas.remove_widget(id) {
                tracing::warn!("failed to remove previous marker: {}", err);
            }
        }
    }

    fn fit(&mut self, polyline: &[Coordinates], zoom_margin: f64) -> Option<Viewport> {
        if compute_bounds(polyline).is_err() {
            return None;
        }

        match self.canvas.adjust_zoom(polyline) {
            Ok(fitted) => {
                self.canvas.set_center(fitted.center);
                let zoom = self.canvas.set_zoom(fitted.zoom - zoom_margin);
                Some(Viewport {
                    center: fitted.center,
                    zoom,
                })
            }
            Err(err) => {
                tracing::warn!("could not fit viewport to route: {}", err);
                None
            }
        }
    }

    /// Only origin and destination get markers; intermediate stops are not drawn.
    fn place_markers(&mut self, waypoints: &[Coordinates]) -> Result<(), Error> {
        self.clear_markers();

        for (index, position) in waypoints.iter().enumerate() {
            let id = self
                .canvas
                .add_widget(Widget::Marker(Marker::numbered(*position, index + 1)))?;
            self.markers.push(id);
        }

        Ok(())
    }

    /// Fits the viewport, draws markers, texts and the polyline.
    pub fn render(
        &mut self,
        waypoints: &[Coordinates],
        route: &RouteResult,
        locale: Locale,
        zoom_margin: f64,
    ) -> Result<Drawn, Error> {
        let viewport = self.fit(&route.polyline, zoom_margin);

        self.place_markers(waypoints)?;

        let display_error = show_route_info(
            &mut self.canvas,
            route.duration_minutes,
            route.distance_meters,
            locale,
        )
        .err();

        let id = self
            .canvas
            .add_widget(Widget::Polyline(Polyline::new(route.polyline.clone())))?;
        self.polyline = Some(id);

        Ok(Drawn {
            viewport,
            display_error,
        })
    }
}

#[test]
fn reported_zoom_is_the_applied_one() {
    use crate::canvas::SceneCanvas;

    let origin = Coordinates::new(-60.0, -170.0);
    let destination = Coordinates::new(70.0, 170.0);
    let route = RouteResult::new(600.0, 20_000_000.0, vec![origin, destination]);

    let canvas = SceneCanvas::default();
    let mut view = View::new(canvas.clone());
    let drawn = view
        .render(&[origin, destination], &route, Locale::En, 0.5)
        .unwrap();

    let viewport = drawn.viewport.unwrap();
    assert_eq!(viewport.zoom, 4.5);
    assert_eq!(viewport.zoom, canvas.scene().zoom);
}
