use super::Engine;

use async_trait::async_trait;

use crate::{
    api::{RouteAPI, SceneAPI},
    canvas::{Scene, SceneCanvas},
};

#[async_trait]
impl<R> SceneAPI for Engine<R, SceneCanvas>
where
    R: RouteAPI + Send + Sync,
{
    async fn scene(&self) -> Scene {
        self.view.lock().await.canvas.scene()
    }
}
