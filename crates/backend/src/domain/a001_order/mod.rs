pub mod error;
pub mod memory;
pub mod repository;
pub mod service;

pub use error::OrderError;
pub use repository::{OrderFilter, OrderRepository};
