use crate::config::Config;
use crate::hackernews::HackerNewsApi;
use crate::state::AppState;
use crate::stories::StoryService;
use crate::utils::fmt_duration;
use crate::web::create_router;
use anyhow::Context;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// How often expired cache entries are dropped.
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
}

impl App {
    /// Wire the Hacker News client, story service and shared state from `config`.
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let api = HackerNewsApi::new(config.hacker_news_base_url.clone(), config.request_timeout)
            .context("Failed to create HackerNewsApi")?;

        info!(
            base_url = %api.base_url(),
            story_ttl = fmt_duration(config.story_ttl),
            story_list_ttl = fmt_duration(config.story_list_ttl),
            fanout_concurrency = ?config.fanout_concurrency,
            request_timeout = fmt_duration(config.request_timeout),
            "story service configured"
        );

        let stories = StoryService::new(Arc::new(api), config.story_settings());
        Ok(App {
            app_state: AppState::new(stories),
            config,
        })
    }

    /// Serve until a shutdown signal arrives, then drain for up to `shutdown_timeout`.
    pub async fn run(self) -> ExitCode {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(address = %addr, error = ?e, "Failed to bind web server");
                return ExitCode::FAILURE;
            }
        };
        info!(address = %addr, "web server listening");

        let purge = self.app_state.spawn_cache_purge(CACHE_PURGE_INTERVAL);
        let router = create_router(self.app_state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let exit = tokio::select! {
            result = &mut server => {
                error!(result = ?result, "web server stopped unexpectedly");
                ExitCode::FAILURE
            }
            _ = shutdown_signal() => {
                info!(
                    timeout = fmt_duration(self.config.shutdown_timeout),
                    "shutdown signal received, draining requests"
                );
                let _ = shutdown_tx.send(());
                match tokio::time::timeout(self.config.shutdown_timeout, &mut server).await {
                    Ok(Ok(Ok(()))) => {
                        info!("graceful shutdown complete");
                        ExitCode::SUCCESS
                    }
                    Ok(Ok(Err(e))) => {
                        error!(error = ?e, "web server failed while shutting down");
                        ExitCode::FAILURE
                    }
                    Ok(Err(e)) => {
                        error!(error = ?e, "web server task panicked");
                        ExitCode::FAILURE
                    }
                    Err(_) => {
                        warn!("graceful shutdown timed out, aborting open connections");
                        server.abort();
                        ExitCode::FAILURE
                    }
                }
            }
        };

        purge.abort();
        exit
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = ?e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = ?e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
