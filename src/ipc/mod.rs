//! IPC module for status queries and gesture notifications

mod protocol;
mod server;

pub use server::Server;
