use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::LevelFilter;

use crate::error::{Error, Result};

/// Name of the dynamic filter guarding the HTTP client's own log output.
pub const HTTP_FILTER: &str = "http";

/// A unique identifier for a particular outgoing request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID. This wraps around back to zero if you somehow exceed a usize.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Set up log4rs from the given file, with the dynamic filters available.
pub fn init_logging(config_file: &Path) -> Result<()> {
    log4rs::init_file(config_file, log4rs_dynamic_filters::default_deserializers())
        .map_err(|e| Error::Logging(format!("{}: {e}", config_file.display())))?;
    info!("Initialised logging");
    Ok(())
}

/// Change how chatty the HTTP client libraries are allowed to be.
pub fn set_http_log_level(level: LevelFilter) {
    log4rs_dynamic_filters::DynamicLevelFilter::set(HTTP_FILTER, level);
}
