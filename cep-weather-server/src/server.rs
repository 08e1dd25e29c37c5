use std::time::Instant;

use actix_web::{App, HttpServer, dev::Service, web};
use anyhow::Context;
use cep_weather_core::{Config, WeatherService};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::handler::{self, AppState};

/// Run the HTTP server until Ctrl-C.
///
/// Ctrl-C cancels the shutdown token first, so lookups still in flight are
/// aborted instead of holding the graceful stop open.
pub async fn serve(config: &Config, service: WeatherService) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let state = web::Data::new(AppState::new(service, shutdown.clone()));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap_fn(|req, srv| {
                let started = Instant::now();
                let method = req.method().clone();
                let path = req.path().to_owned();
                let fut = srv.call(req);

                async move {
                    let res = fut.await?;
                    info!(
                        %method,
                        %path,
                        status = res.status().as_u16(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "request"
                    );
                    Ok::<_, actix_web::Error>(res)
                }
            })
            .configure(handler::configure)
    })
    .disable_signals()
    .bind((config.bind_address.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.bind_address, config.port))?
    .run();

    info!("listening on {}:{}", config.bind_address, config.port);

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutting down");
            shutdown.cancel();
            handle.stop(true).await;
        }
    });

    server.await.context("HTTP server error")
}
