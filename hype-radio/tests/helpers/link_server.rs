//! Local HTTP server standing in for the download-link obfuscation endpoint

#![allow(dead_code)]

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;

pub const SONG_REDIRECT: &str = "https://cdn.example.com/song.mp3?utm=1";
pub const ALT_LINK: &str = "<https://cdn.example.com/alt.mp3>; rel=\"alternate\"";

async fn redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, SONG_REDIRECT)])
}

async fn link_header() -> impl IntoResponse {
    (StatusCode::OK, [(header::LINK, ALT_LINK)])
}

async fn relative_redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/files/song.mp3")])
}

async fn plain() -> &'static str {
    "no download here"
}

/// Running link server
pub struct LinkServer {
    addr: SocketAddr,
}

impl LinkServer {
    /// Start on an ephemeral local port
    ///
    /// Routes: `/redirect` (302 + Location), `/link` (200 + Link header),
    /// `/relative` (302 + relative Location), `/plain` (200, no headers).
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/redirect", get(redirect))
            .route("/link", get(link_header))
            .route("/relative", get(relative_redirect))
            .route("/plain", get(plain));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// An address nothing listens on
pub fn unreachable_url() -> String {
    "http://127.0.0.1:9/download".to_string()
}
