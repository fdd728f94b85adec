use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::AppConfig;

pub fn run() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = AppConfig::load();

    let default_filter = config
        .as_ref()
        .map(|config| config.log_filter.clone())
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let host = config.host.clone();
    let port = config.port;

    let state = match crate::infrastructure::bootstrap::setup(config) {
        Ok(state) => state,
        Err(err) => {
            error!(error = %err, "Startup aborted");
            return ExitCode::FAILURE;
        }
    };

    let served = actix_web::rt::System::new().block_on(async move {
        let server = crate::interfaces::http::start_server(state, &host, port)?;
        info!(host = %host, port, "HTTP server listening");
        server.await
    });

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "HTTP server stopped with an error");
            ExitCode::FAILURE
        }
    }
}
