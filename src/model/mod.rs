//! Election data as the client sees it. Everything here is synchronous and
//! free of I/O, apart from the export sink.

pub mod answers;
pub mod ballot;
pub mod configuration;
pub mod election;
pub mod results;
