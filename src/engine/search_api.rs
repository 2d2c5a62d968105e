use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::Ordering;

use crate::{
    api::{RenderedRoute, RouteAPI, SearchAPI, SearchOutcome},
    canvas::{MapCanvas, TextDisplay},
    entities::Coordinates,
    error::Error,
    format::{format_distance, format_duration},
};

#[async_trait]
impl<R, S> SearchAPI for Engine<R, S>
where
    R: RouteAPI + Send + Sync,
    S: MapCanvas + TextDisplay + Send,
{
    #[tracing::instrument(skip(self))]
    async fn set_departure_time(&self, value: String) -> Result<(), Error> {
        self.session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .set_departure_time(value.clone())?;

        tracing::info!("departure time set to {}", value);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn search(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<SearchOutcome, Error> {
        let generation = {
            let mut view = self.view.lock().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            view.clear_polyline();
            generation
        };

        let departure_time = self
            .session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .departure_time(Utc::now());

        let route = self
            .routes
            .request_route(origin, destination, &departure_time)
            .await
            .map_err(|err| {
                tracing::error!(generation, "route search failed: {}", err);
                err
            })?;

        let mut view = self.view.lock().await;

        let latest = self.generation.load(Ordering::SeqCst);
        if latest != generation {
            tracing::info!(generation, latest, "dropping superseded route response");
            return Ok(SearchOutcome::Superseded { generation });
        }

        let drawn = view.render(&[origin, destination], &route, self.locale, self.zoom_margin)?;

        Ok(SearchOutcome::Rendered(RenderedRoute {
            generation,
            departure_time,
            duration: format_duration(route.duration_minutes, self.locale),
            distance: format_distance(route.distance_meters),
            viewport: drawn.viewport,
            display_error: drawn.display_error,
            route,
        }))
    }
}

#[cfg(test)]
const ORIGIN: Coordinates = Coordinates {
    lat: 35.7039,
    lng: 139.7344,
};

#[cfg(test)]
const DESTINATION: Coordinates = Coordinates {
    lat: 35.7005,
    lng: 139.7424,
};

#[cfg(test)]
fn short_route() -> crate::entities::RouteResult {
    crate::entities::RouteResult::new(65.0, 1500.0, vec![ORIGIN, DESTINATION])
}

#[cfg(test)]
fn engine_with(
    routes: crate::testing::StubRoutes,
    canvas: crate::testing::RecordingCanvas,
) -> Engine<crate::testing::StubRoutes, crate::testing::RecordingCanvas> {
    Engine::new(routes, canvas, crate::format::Locale::En, 0.5)
}

#[test]
fn renders_route_end_to_end() {
    use crate::entities::Marker;
    use crate::testing::{CanvasOp, RecordingCanvas, StubRoutes, FITTED_ZOOM};
    use tokio_test::block_on;

    let canvas = RecordingCanvas::default();
    let engine = engine_with(StubRoutes::default().answer(Ok(short_route())), canvas.clone());

    let outcome = block_on(engine.search(ORIGIN, DESTINATION)).unwrap();

    let rendered = match outcome {
        SearchOutcome::Rendered(rendered) => rendered,
        other => panic!("expected a rendered route, got {:?}", other),
    };
    assert_eq!(rendered.generation, 1);
    assert_eq!(rendered.duration, "1 hour 5 minutes");
    assert_eq!(rendered.distance, "1.5 km");
    assert_eq!(rendered.display_error, None);
    assert_eq!(rendered.viewport.unwrap().zoom, FITTED_ZOOM - 0.5);

    assert_eq!(canvas.texts("time"), vec!["1 hour 5 minutes"]);
    assert_eq!(canvas.texts("dist"), vec!["1.5 km"]);
    assert_eq!(
        canvas.markers(),
        vec![Marker::numbered(ORIGIN, 1), Marker::numbered(DESTINATION, 2)]
    );

    let polylines = canvas.polylines();
    assert_eq!(polylines.len(), 1);
    assert_eq!(polylines[0].1.path, vec![ORIGIN, DESTINATION]);

    assert!(canvas.ops().contains(&CanvasOp::SetZoom(FITTED_ZOOM - 0.5)));
    assert!(!canvas.ops().iter().any(|op| matches!(op, CanvasOp::Remove(_))));
}

#[test]
fn second_search_replaces_previous_route() {
    use crate::testing::{CanvasOp, RecordingCanvas, StubRoutes};
    use tokio_test::block_on;

    let canvas = RecordingCanvas::default();
    let engine = engine_with(
        StubRoutes::default()
            .answer(Ok(short_route()))
            .answer(Ok(short_route())),
        canvas.clone(),
    );

    block_on(engine.search(ORIGIN, DESTINATION)).unwrap();
    let first_ops = canvas.ops().len();
    let (first_polyline, _) = canvas.polylines()[0].clone();

    block_on(engine.search(ORIGIN, DESTINATION)).unwrap();

    let ops = canvas.ops();
    assert_eq!(ops[first_ops], CanvasOp::Remove(first_polyline));
    assert_eq!(canvas.polylines().len(), 2);
    assert_eq!(canvas.markers().len(), 4);

    let removed = ops
        .iter()
        .filter(|op| matches!(op, CanvasOp::Remove(_)))
        .count();
    assert_eq!(removed, 3);
}

#[test]
fn failed_search_leaves_no_stale_route() {
    use crate::error::{request_failure_error, REQUEST_FAILURE};
    use crate::testing::{CanvasOp, RecordingCanvas, StubRoutes};
    use tokio_test::block_on;

    let canvas = RecordingCanvas::default();
    let engine = engine_with(
        StubRoutes::default()
            .answer(Ok(short_route()))
            .answer(Err(request_failure_error("status NG"))),
        canvas.clone(),
    );

    block_on(engine.search(ORIGIN, DESTINATION)).unwrap();
    let (first_polyline, _) = canvas.polylines()[0].clone();
    let before = canvas.ops().len();

    let err = block_on(engine.search(ORIGIN, DESTINATION)).unwrap_err();
    assert_eq!(err.code, REQUEST_FAILURE);

    assert_eq!(canvas.ops()[before..], [CanvasOp::Remove(first_polyline)]);
}

#[test]
fn departure_time_is_snapshotted_per_search() {
    use crate::testing::{RecordingCanvas, StubRoutes};
    use tokio_test::block_on;

    let routes = StubRoutes::default()
        .answer(Ok(short_route()))
        .answer(Ok(short_route()));
    let engine = engine_with(routes.clone(), RecordingCanvas::default());

    block_on(engine.set_departure_time("2024040108300".into())).unwrap();
    block_on(engine.search(ORIGIN, DESTINATION)).unwrap();

    block_on(engine.set_departure_time("20240401174512".into())).unwrap();
    block_on(engine.search(ORIGIN, DESTINATION)).unwrap();

    let departures: Vec<String> = routes
        .departures()
        .iter()
        .map(|d| d.as_str().to_string())
        .collect();
    assert_eq!(departures, vec!["20240401083000", "20240401174512"]);
}

#[test]
fn missing_display_is_reported_but_route_is_drawn() {
    use crate::error::MISSING_DISPLAY_SINK;
    use crate::testing::{RecordingCanvas, StubRoutes};
    use tokio_test::block_on;

    let canvas = RecordingCanvas::with_elements(&["time"]);
    let engine = engine_with(StubRoutes::default().answer(Ok(short_route())), canvas.clone());

    let outcome = block_on(engine.search(ORIGIN, DESTINATION)).unwrap();

    match outcome {
        SearchOutcome::Rendered(rendered) => {
            assert_eq!(rendered.display_error.unwrap().code, MISSING_DISPLAY_SINK);
        }
        other => panic!("expected a rendered route, got {:?}", other),
    }
    assert_eq!(canvas.polylines().len(), 1);
}

#[test]
fn empty_route_skips_viewport() {
    use crate::entities::RouteResult;
    use crate::testing::{CanvasOp, RecordingCanvas, StubRoutes};
    use tokio_test::block_on;

    let canvas = RecordingCanvas::default();
    let engine = engine_with(
        StubRoutes::default().answer(Ok(RouteResult::new(0.0, 0.0, vec![]))),
        canvas.clone(),
    );

    let outcome = block_on(engine.search(ORIGIN, DESTINATION)).unwrap();

    match outcome {
        SearchOutcome::Rendered(rendered) => {
            assert_eq!(rendered.viewport, None);
            assert_eq!(rendered.duration, "arrives immediately");
        }
        other => panic!("expected a rendered route, got {:?}", other),
    }
    assert!(!canvas
        .ops()
        .iter()
        .any(|op| matches!(op, CanvasOp::SetZoom(_) | CanvasOp::SetCenter(_))));
}

#[test]
fn superseded_response_is_dropped() {
    use crate::testing::{RecordingCanvas, StubRoutes};
    use std::sync::Arc;
    use tokio::sync::Notify;
    use tokio_test::block_on;

    let gate = Arc::new(Notify::new());
    let slow = crate::entities::RouteResult::new(90.0, 4000.0, vec![ORIGIN]);

    let canvas = RecordingCanvas::default();
    let engine = engine_with(
        StubRoutes::default()
            .answer_after(gate.clone(), Ok(slow))
            .answer(Ok(short_route())),
        canvas.clone(),
    );

    let (first, second) = block_on(async {
        futures::join!(engine.search(ORIGIN, DESTINATION), async {
            let outcome = engine.search(ORIGIN, DESTINATION).await;
            gate.notify_one();
            outcome
        })
    });

    assert_eq!(first.unwrap(), SearchOutcome::Superseded { generation: 1 });
    match second.unwrap() {
        SearchOutcome::Rendered(rendered) => assert_eq!(rendered.generation, 2),
        other => panic!("expected a rendered route, got {:?}", other),
    }

    assert_eq!(canvas.polylines().len(), 1);
    assert_eq!(canvas.texts("time"), vec!["1 hour 5 minutes"]);
}

#[test]
fn generation_is_claimed_under_the_view_lock() {
    use crate::testing::{RecordingCanvas, StubRoutes};
    use tokio_test::block_on;

    let engine = engine_with(
        StubRoutes::default().answer(Ok(short_route())),
        RecordingCanvas::default(),
    );

    block_on(async {
        let guard = engine.view.lock().await;

        let mut search = Box::pin(engine.search(ORIGIN, DESTINATION));
        assert!(futures::poll!(search.as_mut()).is_pending());
        assert_eq!(engine.generation.load(Ordering::SeqCst), 0);

        drop(guard);

        match search.await.unwrap() {
            SearchOutcome::Rendered(rendered) => assert_eq!(rendered.generation, 1),
            other => panic!("expected a rendered route, got {:?}", other),
        }
    });
}

#[test]
fn missing_time_display_still_shows_distance() {
    use crate::error::MISSING_DISPLAY_SINK;
    use crate::testing::{RecordingCanvas, StubRoutes};
    use tokio_test::block_on;

    let canvas = RecordingCanvas::with_elements(&["dist"]);
    let engine = engine_with(StubRoutes::default().answer(Ok(short_route())), canvas.clone());

    match block_on(engine.search(ORIGIN, DESTINATION)).unwrap() {
        SearchOutcome::Rendered(rendered) => {
            assert_eq!(rendered.display_error.unwrap().code, MISSING_DISPLAY_SINK);
        }
        other => panic!("expected a rendered route, got {:?}", other),
    }
    assert_eq!(canvas.texts("dist"), vec!["1.5 km"]);
    assert_eq!(canvas.polylines().len(), 1);
}
