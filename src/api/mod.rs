//! HTTP API module: route table, proxy dispatcher and health endpoint.

pub mod handlers;
pub mod route;
pub mod routes;

pub use handlers::AppState;
pub use route::Route;
pub use routes::create_router;
