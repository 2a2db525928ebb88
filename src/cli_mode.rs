use std::time::Duration;

use log::info;
use tokio::runtime::Runtime as TokioRuntime;

use conference_seats::config::Config;
use conference_seats::lifecycle::AppEvent;
use conference_seats::livekit_backend::LiveKitLoader;
use conference_seats::logging::setup_logging;
use conference_seats::render::TableRenderer;
use conference_seats::repl;
use conference_seats::runtime::Runtime;

// stdin reads sit on a blocking thread that would otherwise hold up shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub fn entry_main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env_variables()?;
    setup_logging(config.log_file.as_deref())?;

    #[cfg(feature = "cli-mode")]
    console_subscriber::init();

    let rt = TokioRuntime::new()?;
    info!("Tokio runtime created.");

    let result = rt.block_on(async {
        let runtime = Runtime::new(
            LiveKitLoader::new(config.clone()),
            TableRenderer::new(),
            config.startup.clone(),
            config.join_timeout,
        );

        let ctrlc_handle = runtime.handle();
        ctrlc::set_handler(move || {
            info!("Received Ctrl-C signal. Shutting down...");
            let _ = ctrlc_handle.send(AppEvent::Quit);
        })?;

        tokio::spawn(repl::start_repl(runtime.handle()));

        let app = runtime.run().await;
        info!("Client stopped in phase {:?}", app.phase());

        Ok::<(), Box<dyn std::error::Error>>(())
    });

    rt.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
