pub mod business;
pub mod server;
pub mod session;
pub mod token;
