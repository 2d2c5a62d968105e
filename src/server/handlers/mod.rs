pub mod departure;
pub mod scene;
pub mod search;
pub mod waypoints;
