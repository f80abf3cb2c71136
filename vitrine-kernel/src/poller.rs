/**
 * BOUCLE DE RAFRAÎCHISSEMENT - Cadencement des cycles fetch/dérivation
 *
 * RÔLE : Un timer unique pilote tous les cycles. À chaque tick : fetch du
 * snapshot puis recalcul de l'état dérivé. Un échec laisse l'état précédent
 * intact (le tick suivant est la seule relance).
 *
 * CONCURRENCE : Un seul refresh en vol à la fois (tick ignoré sinon).
 * L'arrêt consomme le handle : plus aucun tick ensuite, y compris un tick
 * déjà programmé. Un fetch en vol n'est pas avorté mais son résultat est
 * jeté s'il aboutit après l'arrêt.
 */

use crate::config::SignConfig;
use crate::engine::{self, DashboardState};
use crate::fetch::SnapshotFetcher;
use crate::state::{RefreshGuard, Shared};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Arrête la boucle. Consomme le handle : un seul arrêt possible.
    /// Le JoinHandle rendu permet d'attendre la fin de la boucle.
    pub fn stop(self) -> JoinHandle<()> {
        let _ = self.shutdown.send(true);
        self.task
    }
}

pub fn spawn_refresh_loop(state: Shared<DashboardState>, cfg: SignConfig) -> PollerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let cfg = Arc::new(cfg);
    let guard = RefreshGuard::new();

    let task = tokio::spawn(async move {
        let fetcher = SnapshotFetcher::new(&cfg.telemetry.url);
        let mut interval =
            tokio::time::interval(Duration::from_millis(cfg.telemetry.poll_interval_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(
            url = %cfg.telemetry.url,
            interval_ms = cfg.telemetry.poll_interval_ms,
            "boucle de rafraîchissement démarrée"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if !guard.begin() {
                        debug!("refresh déjà en vol, tick ignoré");
                        continue;
                    }
                    let state = state.clone();
                    let cfg = cfg.clone();
                    let fetcher = fetcher.clone();
                    let guard = guard.clone();
                    let shutdown = shutdown_rx.clone();
                    tokio::spawn(async move {
                        match fetcher.fetch().await {
                            Ok(snapshot) => {
                                if *shutdown.borrow() {
                                    // le panneau est démonté, résultat tardif jeté
                                    debug!("snapshot reçu après arrêt, ignoré");
                                } else {
                                    let mut st = state.lock();
                                    engine::apply_snapshot(&mut st, snapshot, &cfg);
                                    debug!(
                                        rooms = st.rooms.len(),
                                        groups = st.groups.len(),
                                        assets = st.assets.len(),
                                        "état rafraîchi"
                                    );
                                }
                            }
                            Err(e) => {
                                // état précédent conservé, prochain tick = seule relance
                                warn!("cycle abandonné: {e}");
                            }
                        }
                        guard.end();
                    });
                }
                _ = shutdown_rx.changed() => {
                    info!("boucle de rafraîchissement arrêtée");
                    break;
                }
            }
        }
    });

    PollerHandle {
        shutdown: shutdown_tx,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TelemetryConf;
    use crate::engine::{STRIP_VACANT, STRIP_YELLOW};
    use crate::state::new_state;
    use vitrine_devkit::{SnapshotBuilder, StubMode, TelemetryStub};

    fn test_config(url: String) -> SignConfig {
        SignConfig {
            telemetry: TelemetryConf {
                url,
                poll_interval_ms: 25,
            },
            ..SignConfig::default()
        }
    }

    fn scenario_snapshot() -> serde_json::Value {
        SnapshotBuilder::new()
            .group("G1", 6.0)
            .room("Kitchen", "G1", 0.4)
            .room("Den", "G1", 2.7)
            .asset("A1", "Den", "now")
            .build()
    }

    #[tokio::test]
    async fn test_refresh_cycle_populates_state() {
        let stub = TelemetryStub::start(scenario_snapshot()).await.unwrap();
        let state = new_state(DashboardState::default());
        let poller = spawn_refresh_loop(state.clone(), test_config(stub.url()));

        tokio::time::sleep(Duration::from_millis(150)).await;

        {
            let st = state.lock();
            assert_eq!(st.rooms.len(), 2);
            assert_eq!(st.rooms[0].name, "Den"); // "G1_Den" < "G1_Kitchen"
            assert_eq!(
                st.derived.occupancy_strip,
                [
                    STRIP_YELLOW,
                    STRIP_YELLOW,
                    STRIP_YELLOW,
                    STRIP_VACANT,
                    STRIP_VACANT,
                    STRIP_VACANT
                ]
            );
            assert!(st.last_refresh.is_some());
        }
        poller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_state() {
        let stub = TelemetryStub::start(scenario_snapshot()).await.unwrap();
        let state = new_state(DashboardState::default());
        let poller = spawn_refresh_loop(state.clone(), test_config(stub.url()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!state.lock().rooms.is_empty());

        // endpoint en erreur : les ticks suivants ne touchent à rien
        stub.set_mode(StubMode::ServerError);
        // laisse aboutir un éventuel fetch parti avant le changement de mode
        tokio::time::sleep(Duration::from_millis(50)).await;
        let populated = state.lock().clone();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*state.lock(), populated);

        // corps non-JSON : même politique
        stub.set_mode(StubMode::Garbage);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*state.lock(), populated);

        // l'endpoint revient : auto-guérison au tick suivant
        stub.set_mode(StubMode::Ok);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(state.lock().last_refresh > populated.last_refresh);

        poller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_leaves_state_untouched() {
        let state = new_state(DashboardState::default());
        let poller = spawn_refresh_loop(
            state.clone(),
            test_config("http://127.0.0.1:9/cgi-bin/cgijson.cgi".into()),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*state.lock(), DashboardState::default());

        poller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_slow_fetch_does_not_stack_requests() {
        let stub = TelemetryStub::start(scenario_snapshot()).await.unwrap();
        stub.set_latency(Duration::from_millis(150));
        let state = new_state(DashboardState::default());
        let poller = spawn_refresh_loop(state.clone(), test_config(stub.url()));

        // 4 ticks se présentent pendant le premier fetch, un seul GET part
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(stub.hits(), 1);

        poller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_discards_inflight_result() {
        let stub = TelemetryStub::start(scenario_snapshot()).await.unwrap();
        stub.set_latency(Duration::from_millis(200));
        let state = new_state(DashboardState::default());
        let poller = spawn_refresh_loop(state.clone(), test_config(stub.url()));

        // premier tick immédiat : fetch en vol, puis démontage
        tokio::time::sleep(Duration::from_millis(40)).await;
        poller.stop().await.unwrap();

        // le fetch aboutit après l'arrêt : son résultat doit être jeté
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*state.lock(), DashboardState::default());
    }
}
