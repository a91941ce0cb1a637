//! The connection capability consumed by the session.

mod connection;
mod listener;

pub use connection::Connection;
pub use listener::CredentialsListener;
