mod health;
mod routes;

pub use health::health_check;
pub use routes::resource_router;
