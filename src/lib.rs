//! Travelstay Library
//!
//! This library provides the listings/bookings/reviews data model,
//! its PostgreSQL schema, and the HTTP surface of the service.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod schema;
