pub mod config;
pub mod effect;
pub mod input;
pub mod session;
pub mod transport;
