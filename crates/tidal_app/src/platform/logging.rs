//! Platform logging initialization for tidal_app.

use log::LevelFilter;
use tidal_logging::LogDestination;

/// Maps the `-v` count to a level: warn, info, debug, then trace.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn initialize(destination: &LogDestination, verbosity: u8) {
    if !tidal_logging::initialize(destination, level_for(verbosity)) {
        eprintln!("Warning: logging is not available for {:?}", destination);
    }
}
