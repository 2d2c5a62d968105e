use super::Engine;

use async_trait::async_trait;

use crate::{
    api::{PlanAPI, RouteAPI},
    canvas::{MapCanvas, TextDisplay},
    entities::{plan_waypoints, Coordinates},
    error::Error,
};

#[async_trait]
impl<R, S> PlanAPI for Engine<R, S>
where
    R: RouteAPI + Send + Sync,
    S: MapCanvas + TextDisplay + Send,
{
    #[tracing::instrument(skip(self))]
    async fn plan_waypoints(
        &self,
        waypoints: String,
        origin: Coordinates,
        destination: Coordinates,
        order: String,
    ) -> Result<Vec<Coordinates>, Error> {
        let planned = plan_waypoints(&waypoints, origin, destination, &order)?;

        tracing::info!(stops = planned.len(), "planned waypoint order");

        Ok(planned)
    }
}

#[test]
fn plans_through_the_engine() {
    use crate::format::Locale;
    use crate::testing::{RecordingCanvas, StubRoutes};
    use tokio_test::block_on;

    let engine = Engine::new(
        StubRoutes::default(),
        RecordingCanvas::default(),
        Locale::En,
        0.5,
    );
    let origin = Coordinates::new(35.7039, 139.7344);
    let destination = Coordinates::new(35.7005, 139.7424);

    let planned = block_on(engine.plan_waypoints(
        "139.7360,35.7010,139.7380,35.7020".into(),
        origin,
        destination,
        "2,1".into(),
    ))
    .unwrap();

    assert_eq!(planned.first(), Some(&origin));
    assert_eq!(planned.last(), Some(&destination));
    assert_eq!(planned[1], Coordinates::new(35.7020, 139.7380));
}
