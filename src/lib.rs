#[macro_use]
extern crate log;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod poller;
pub mod session;
