use std::fs::File;
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Env, Target};

/// Initialise the global logger.
///
/// `RUST_LOG` picks the filter, defaulting to `info`. With a log file the
/// output goes there instead of stderr.
pub fn setup_logging(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        let file = File::create(path)?;
        builder
            .target(Target::Pipe(Box::new(file)))
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()));
    }

    builder.try_init()?;
    Ok(())
}
