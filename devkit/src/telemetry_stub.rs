/*!
Stub HTTP de l'endpoint télémétrie pour développement sans scanner

Sert un snapshot canné sur le chemin cgijson réel, avec modes d'échec
pour simuler un scanner en panne. Compte les requêtes reçues pour les
assertions de tests.
*/

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubMode {
    /// Répond 200 avec le snapshot courant
    Ok,
    /// Répond 500 (scanner en panne)
    ServerError,
    /// Répond 200 avec un corps qui n'est pas du JSON
    Garbage,
}

struct StubInner {
    snapshot: Mutex<Value>,
    mode: Mutex<StubMode>,
    latency: Mutex<Option<Duration>>,
    hits: AtomicUsize,
}

/// Stub télémétrie écoutant sur un port éphémère de loopback.
pub struct TelemetryStub {
    addr: SocketAddr,
    inner: Arc<StubInner>,
}

impl TelemetryStub {
    pub async fn start(initial_snapshot: Value) -> Result<Self> {
        let inner = Arc::new(StubInner {
            snapshot: Mutex::new(initial_snapshot),
            mode: Mutex::new(StubMode::Ok),
            latency: Mutex::new(None),
            hits: AtomicUsize::new(0),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = Router::new()
            .route("/cgi-bin/cgijson.cgi", get(serve_snapshot))
            .with_state(inner.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        log::info!("📡 [STUB] telemetry stub listening on {}", addr);
        Ok(Self { addr, inner })
    }

    /// URL complète de l'endpoint, même chemin que le scanner réel.
    pub fn url(&self) -> String {
        format!("http://{}/cgi-bin/cgijson.cgi", self.addr)
    }

    pub fn set_snapshot(&self, snapshot: Value) {
        *self.inner.snapshot.lock().unwrap() = snapshot;
    }

    pub fn set_mode(&self, mode: StubMode) {
        *self.inner.mode.lock().unwrap() = mode;
    }

    /// Latence artificielle avant chaque réponse (simule un réseau lent).
    pub fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock().unwrap() = Some(latency);
    }

    /// Nombre de requêtes reçues (pour assertions de tests).
    pub fn hits(&self) -> usize {
        self.inner.hits.load(Ordering::SeqCst)
    }
}

async fn serve_snapshot(State(inner): State<Arc<StubInner>>) -> Response {
    inner.hits.fetch_add(1, Ordering::SeqCst);

    let latency = *inner.latency.lock().unwrap();
    if let Some(d) = latency {
        tokio::time::sleep(d).await;
    }

    let mode = *inner.mode.lock().unwrap();
    match mode {
        StubMode::Ok => Json(inner.snapshot.lock().unwrap().clone()).into_response(),
        StubMode::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, "scanner indisponible").into_response()
        }
        StubMode::Garbage => "ceci n'est pas du json".into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot_builders::SnapshotBuilder;

    #[tokio::test]
    async fn test_stub_serves_snapshot_and_counts_hits() {
        let snapshot = SnapshotBuilder::new().group("G1", 2.0).build();
        let stub = TelemetryStub::start(snapshot).await.unwrap();

        let body: Value = reqwest::get(stub.url()).await.unwrap().json().await.unwrap();
        assert_eq!(body["groups"][0]["name"], "G1");
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_stub_failure_modes() {
        let stub = TelemetryStub::start(SnapshotBuilder::new().build())
            .await
            .unwrap();

        stub.set_mode(StubMode::ServerError);
        let resp = reqwest::get(stub.url()).await.unwrap();
        assert_eq!(resp.status().as_u16(), 500);

        stub.set_mode(StubMode::Garbage);
        let resp = reqwest::get(stub.url()).await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert!(resp.json::<Value>().await.is_err());
    }

    #[tokio::test]
    async fn test_stub_snapshot_can_be_replaced() {
        let stub = TelemetryStub::start(SnapshotBuilder::new().build())
            .await
            .unwrap();
        stub.set_snapshot(SnapshotBuilder::new().room("Den", "G1", 1.5).build());

        let body: Value = reqwest::get(stub.url()).await.unwrap().json().await.unwrap();
        assert_eq!(body["rooms"][0]["name"], "Den");
    }
}
