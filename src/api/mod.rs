//! Request boundary: typed endpoint handlers and the C ABI over them.

pub mod ffi;
pub mod handlers;

pub use handlers::{ApiResponse, Engine};
