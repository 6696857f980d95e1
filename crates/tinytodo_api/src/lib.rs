//! Request-level facade for TinyTodo clients.

pub mod api;

pub use api::{ApiResponse, TodoApi};
