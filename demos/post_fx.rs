//! The flight scene through film grain, bloom, FXAA, gamma and color grade.
//!
//! `=`/`-` change brightness, arrow keys move the color offset, `P` toggles the chain.

use geoglow::{Demo, GeoglowConfig, LoggingConfig};

fn main() -> geoglow::Result<()> {
    geoglow::init_logging(LoggingConfig::default());
    geoglow::run(Demo::PostFx, GeoglowConfig::default())
}
