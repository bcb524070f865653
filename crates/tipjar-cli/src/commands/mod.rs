pub mod config;
pub mod demo;
pub mod handle;
pub mod image;
pub mod price;
