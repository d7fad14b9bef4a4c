//! Binary entry point: read the config, open the diagnostic log, bring up the
//! tokio runtime for backend calls and drive the Ratatui event loop until the
//! user exits.
use anyhow::Context;
use student_marks_manager::{config, init_logging, run_app, App, Config, RosterClient};

fn main() -> anyhow::Result<()> {
    let data_dir = config::data_dir()?;
    let config = Config::load(&data_dir)?;
    let log_path = config.log_path(&data_dir);
    init_logging(&config.logging, &log_path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let client = RosterClient::new(&config.api)?;
    tracing::info!(backend = %client.base_url(), log = %log_path.display(), "starting roster view");

    let mut app = App::new(client, runtime.handle().clone());
    let result = run_app(&mut app);
    drop(app);
    runtime.shutdown_timeout(std::time::Duration::from_secs(1));
    result
}
