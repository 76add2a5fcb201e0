// Keenetic RCI surface: session auth, interfaces, static routes, system.

pub mod auth;
pub mod client;
pub mod interfaces;
pub mod models;
pub mod routes;
pub mod system;
