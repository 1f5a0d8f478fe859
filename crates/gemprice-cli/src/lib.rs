pub mod input;
pub mod server;
pub mod train;
