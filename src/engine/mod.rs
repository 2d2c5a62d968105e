mod plan_api;
mod render;
mod scene_api;
mod search_api;
mod session;

use std::sync::atomic::AtomicU64;
use std::sync::RwLock;
use tokio::sync::Mutex;

use crate::{
    api::{RouteAPI, API},
    canvas::{MapCanvas, SceneCanvas, TextDisplay},
    format::Locale,
};

use render::View;
use session::Session;

/// Runs route searches and draws their results onto a canvas.
///
/// Each search claims a new generation; a response that comes back after a
/// newer search has started is dropped without touching the canvas.
pub struct Engine<R, S> {
    routes: R,
    view: Mutex<View<S>>,
    session: RwLock<Session>,
    generation: AtomicU64,
    locale: Locale,
    zoom_margin: f64,
}

impl<R, S> Engine<R, S>
where
    R: RouteAPI + Send + Sync,
    S: MapCanvas + TextDisplay + Send,
{
    pub fn new(routes: R, canvas: S, locale: Locale, zoom_margin: f64) -> Self {
        Self {
            routes,
            view: Mutex::new(View::new(canvas)),
            session: RwLock::new(Session::default()),
            generation: AtomicU64::new(0),
            locale,
            zoom_margin,
        }
    }
}

impl<R> API for Engine<R, SceneCanvas> where R: RouteAPI + Send + Sync {}
