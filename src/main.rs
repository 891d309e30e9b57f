use std::fs;

use log::{error, info};
use tokio::net::TcpListener;
use tokio::signal;

use wikilet::logger::Logger;
use wikilet::{build_router, AppState, Config, PageService, Renderer, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("failed to install logger: {}", e);
    }

    let config = Config::from_env();
    info!("Starting with {:?}", config);

    fs::create_dir_all(&config.data_dir).map_err(|e| {
        error!("Cannot create data directory {:?}: {}", config.data_dir, e);
        WikiError::Io(e)
    })?;

    let renderer = Renderer::from_dir(&config.template_dir)?;
    let pages = PageService::new(config.data_dir.clone());
    let state = AppState::new(pages, renderer, &config.front_page)?;
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr.as_str()).await?;
    info!("Wiki listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(WikiError::from)?;
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
