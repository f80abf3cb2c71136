/**
 * VITRINE KERNEL - Point d'entrée du démon signage
 *
 * RÔLE : Orchestration des modules : config, boucle de rafraîchissement,
 * moteur de dérivation, API REST de rendu.
 *
 * ARCHITECTURE : Un timer unique pilote fetch + dérivation ; l'état du
 * panneau est possédé par le moteur et publié en lecture seule via Axum.
 * UTILITÉ : Tête de pont entre le scanner d'actifs sur le LAN et les
 * écrans d'affichage.
 */

mod config;
mod engine;
mod fetch;
mod http;
mod models;
mod poller;
mod state;

use crate::engine::DashboardState;
use crate::state::new_state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().init();

    let cfg = config::load_config().await;
    info!(
        "télémétrie: {} (tick {} ms)",
        cfg.telemetry.url, cfg.telemetry.poll_interval_ms
    );

    // état unique du panneau, vide au démarrage
    let dashboard = new_state(DashboardState::default());

    // la boucle de rafraîchissement remplit l'état
    let poller = poller::spawn_refresh_loop(dashboard.clone(), cfg);

    // HTTP en lecture seule pour le rendu
    let app = http::build_router(http::AppState { dashboard });

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    info!("vitrine à l'écoute sur http://{addr}");
    let listener = TcpListener::bind(addr).await.context("bind HTTP")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serveur HTTP")?;

    // démontage : plus aucun tick, un fetch en vol sera jeté
    poller.stop().await.ok();
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
