//! HTTP surface of the aggregator.
//!
//! `POST /analyze` runs [`Insights::analyze`] and renders its result; `GET /`
//! serves the static page that calls it and `GET /health` answers probes.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    analyze::{AnalysisFailure, AnalysisRequest, Insights},
    error::{self, Error},
};

const INDEX_PAGE: &str = include_str!("../static/index.html");

/// Builds the application router around a shared aggregator.
pub fn router(insights: Insights,) -> Router
{
    Router::new()
        .route("/", get(index,),)
        .route("/health", get(health,),)
        .route("/analyze", post(analyze,),)
        .layer(TraceLayer::new_for_http(),)
        .with_state(Arc::new(insights,),)
}

/// Binds `addr` and serves until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns [`Error::Io`] when the listener cannot be bound or the server
/// fails while running.
pub async fn serve(insights: Insights, addr: SocketAddr,) -> Result<(), Error,>
{
    let listener =
        TcpListener::bind(addr,).await.map_err(|source| error::io_error(addr, source,),)?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, router(insights,),)
        .with_graceful_shutdown(shutdown_signal(),)
        .await
        .map_err(|source| error::io_error(addr, source,),)?;

    info!("Server shutdown complete");
    Ok((),)
}

async fn index() -> Html<&'static str,>
{
    Html(INDEX_PAGE,)
}

async fn health() -> Json<serde_json::Value,>
{
    Json(json!({ "status": "ok" }),)
}

async fn analyze(State(insights,): State<Arc<Insights,>,>, body: Bytes,) -> Response
{
    let request = match AnalysisRequest::from_json(&body,) {
        Ok(request,) => request,
        Err(failure,) => return failure_response(&failure,),
    };

    match insights.analyze(&request,).await {
        Ok(report,) => (StatusCode::OK, Json(report,),).into_response(),
        Err(failure,) => failure_response(&failure,),
    }
}

fn failure_response(failure: &AnalysisFailure,) -> Response
{
    let status = StatusCode::from_u16(failure.status_code(),)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR,);
    (status, Json(json!({ "error": failure.to_string() }),),).into_response()
}

async fn shutdown_signal()
{
    let ctrl_c = async {
        if let Err(e,) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate(),) {
            Ok(mut stream,) => {
                stream.recv().await;
            }
            Err(e,) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<(),>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
