//! # rui-client: remote render UI client
//!
//! Connects to a render server, publishes control changes on named
//! channels, shows the values the server pushes back and saves the
//! streamed HDR frame to disk on request.

pub mod config;
pub mod console;
pub mod menu;
pub mod session;
