//! Route markers and a flight curve that draws itself in, then fades.
//!
//! Pass a TOML file to fly a different route:
//!
//! ```toml
//! [route]
//! from = { lat = 51.5072, lon = -0.1276 }
//! to = { lat = 40.7128, lon = -74.006 }
//! ```

use std::path::Path;

use geoglow::{Demo, GeoglowConfig, LoggingConfig};

fn main() -> geoglow::Result<()> {
    geoglow::init_logging(LoggingConfig::default());

    let config = match std::env::args().nth(1) {
        Some(path) => geoglow::load_from_path(Path::new(&path))?,
        None => GeoglowConfig::default(),
    };
    geoglow::run(Demo::Flight, config)
}
