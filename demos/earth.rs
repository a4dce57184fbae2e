//! A lit, textured globe inside an additive atmosphere shell.

use geoglow::{Demo, GeoglowConfig, LoggingConfig};

fn main() -> geoglow::Result<()> {
    geoglow::init_logging(LoggingConfig::default());
    geoglow::run(Demo::Earth, GeoglowConfig::default())
}
