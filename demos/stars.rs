//! The globe plus a starfield that spins on its own.

use geoglow::{Demo, GeoglowConfig, LoggingConfig};

fn main() -> geoglow::Result<()> {
    geoglow::init_logging(LoggingConfig::default());
    geoglow::run(Demo::Stars, GeoglowConfig::default())
}
