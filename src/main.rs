use std::sync::Arc;

use tracing::{info, warn};

use bookdesk::auth::StaticToken;
use bookdesk::backend::HttpBackend;
use bookdesk::config::Config;
use bookdesk::engine::Engine;
use bookdesk::notify::{NoticeHub, NoticeLevel};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    bookdesk::observability::init(config.metrics_port)?;

    let backend = HttpBackend::new(
        &config.api_url,
        config.routes,
        config.fetch_limit,
        config.timeout,
    )?;
    let session = StaticToken::new(config.token.clone());
    let notify = Arc::new(NoticeHub::new());
    let engine = Arc::new(Engine::new(Arc::new(backend), Arc::new(session), notify.clone()));

    info!("bookdesk starting");
    info!("  api: {}", config.api_url);
    info!("  routes: {:?}", config.routes);
    info!(
        "  refresh: {}",
        config.refresh.map_or("disabled".to_string(), |d| format!("every {}s", d.as_secs()))
    );

    // Surface notices in the log, the way the dashboard shows toasts.
    let mut notices = notify.subscribe();
    tokio::spawn(async move {
        while let Ok(n) = notices.recv().await {
            match n.level {
                NoticeLevel::Success => info!("{}: {}", n.title, n.description),
                NoticeLevel::Error => warn!("{}: {}", n.title, n.description),
            }
        }
    });

    engine.load().await?;
    let result = engine.query(&config.query)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    let Some(every) = config.refresh else {
        return Ok(());
    };

    let refresher = tokio::spawn(bookdesk::refresh::run_refresher(
        engine.clone(),
        every,
        config.query.clone(),
    ));

    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(e) => {
                    warn!("SIGTERM handler unavailable: {e}");
                    ctrl_c.await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };
    shutdown.await;

    info!("shutdown signal received, stopping refresh");
    refresher.abort();
    info!("bookdesk stopped");
    Ok(())
}
