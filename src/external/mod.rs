pub mod route_mbn;

pub use route_mbn::RouteMbnClient;
