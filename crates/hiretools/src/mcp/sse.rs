use super::ServerContext;
use crate::prelude::{eprintln, *};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub async fn run_sse(options: super::cli::SseOptions, context: Arc<ServerContext>) -> Result<()> {
    let verbose = context.global.verbose;

    if verbose {
        eprintln!(
            "Starting MCP server with SSE transport on {}:{}...",
            options.host, options.port
        );
    }

    let addr = format!("{}:{}", options.host, options.port);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app_router = Router::new()
        .route("/sse", get(sse_handler))
        .route("/message", post(message_handler))
        .layer(cors)
        .with_state(context);

    if verbose {
        eprintln!("MCP server listening on http://{}", addr);
        eprintln!("SSE endpoint: http://{}/sse", addr);
        eprintln!("Message endpoint: http://{}/message", addr);
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    axum::serve(listener, app_router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

async fn sse_handler(
    State(_context): State<Arc<ServerContext>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = stream::once(async { Ok(Event::default().data("MCP SSE endpoint ready")) });
    Sse::new(stream)
}

async fn message_handler(
    State(context): State<Arc<ServerContext>>,
    Json(request): Json<serde_json::Value>,
) -> Response {
    let request_str = request.to_string();
    match super::handle_request(&request_str, &context).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
