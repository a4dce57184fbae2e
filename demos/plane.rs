//! A green unit plane under orbit controls.

use geoglow::{Demo, GeoglowConfig, LoggingConfig};

fn main() -> geoglow::Result<()> {
    geoglow::init_logging(LoggingConfig::default());
    geoglow::run(Demo::Plane, GeoglowConfig::default())
}
