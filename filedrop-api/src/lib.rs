//! # FileDrop API Server
//!
//! REST API exposing the FileDrop service to a chat transport.
//!
//! ## Endpoints
//!
//! - `POST /api/v1/files` - Register a file and get the chats to announce it to
//! - `GET /api/v1/files/lookup` - First file matching a pattern
//! - `GET /api/v1/files/search` - Sorted file names matching a pattern
//! - `GET /api/v1/inline` - One page of inline-query results
//! - `GET|PUT|DELETE /api/v1/subscriptions/:chat_id` - Announcement filters
//! - `GET /api/v1/stats` - Registry statistics
//!
//! ## Example
//!
//! ```rust,ignore
//! use filedrop_api::{ApiServer, ApiConfig};
//!
//! let server = ApiServer::from_config(ApiConfig::from_env()?).await?;
//! server.run(([127, 0, 0, 1], 3001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use filedrop_core::error::Result;
use filedrop_search::FileDrop;

/// API server for FileDrop.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server around an existing service.
    pub fn new(service: FileDrop) -> Self {
        Self {
            state: Arc::new(AppState::new(service)),
        }
    }

    /// Opens the registries named in `config` and creates a server.
    pub async fn from_config(config: ApiConfig) -> Result<Self> {
        Ok(Self {
            state: Arc::new(AppState::open(&config).await?),
        })
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("FileDrop API server listening on {}", addr);

        axum::serve(listener, self.router()).await
    }
}
