pub mod dom;
pub mod platform;
