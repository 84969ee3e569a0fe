mod bootstrap;

use cr_app::ClipEngine;
use cr_core::events::CoreEvent;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (dirs, paths) = bootstrap::wiring::resolve_paths()?;
    bootstrap::tracing::init_tracing_subscriber(&paths.logs_dir)?;
    info!(app_data_root = %dirs.app_data_root.display(), "Starting ClipRecall");

    let deps = bootstrap::wiring::wire_dependencies(&paths)?;
    let engine = ClipEngine::bootstrap(deps).await;

    let mut events = engine.subscribe();
    let reporter = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(CoreEvent::ManualPasteRequired { title }) => {
                    warn!(title = %title, "Paste could not be delivered, paste manually")
                }
                Ok(event) => info!(?event, "Engine event"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event receiver lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    engine.start_monitoring_default().await?;
    info!("Monitoring clipboard, press Ctrl-C to exit");

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for Ctrl-C");
    }

    engine.stop_monitoring().await?;
    drop(engine);
    reporter.abort();
    info!("ClipRecall stopped");
    Ok(())
}
