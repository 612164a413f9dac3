pub mod aggregate;
pub mod items;
