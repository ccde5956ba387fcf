mod handler;
mod model;

pub use handler::lookup_route;
