mod bounds;
mod departure;
mod location;
mod route;
mod waypoint;
mod widget;

pub use bounds::{compute_bounds, BoundingBox};
pub use departure::{DepartureTime, DEPARTURE_TIME_FORMAT};
pub use location::Coordinates;
pub use route::RouteResult;
pub use waypoint::{optimize, parse_order, parse_waypoints, plan_waypoints};
pub use widget::{LinePattern, LineStyle, Marker, Polyline, Viewport, Widget, WidgetId};
