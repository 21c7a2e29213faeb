use std::process::ExitCode;

use wardwatch_lib::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    wardwatch_lib::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match wardwatch_lib::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Wardwatch stopped with an error");
            ExitCode::FAILURE
        }
    }
}
