//! A 300x300 window, two hand-compiled shader stages and a single draw.

use geoglow::{Demo, GeoglowConfig, LoggingConfig};

fn main() -> geoglow::Result<()> {
    geoglow::init_logging(LoggingConfig::default());
    geoglow::run(Demo::RawShader, GeoglowConfig::default())
}
