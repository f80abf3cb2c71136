use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Verrou de cycle : un seul rafraîchissement en vol à la fois.
/// Un tick qui arrive pendant un fetch en cours est simplement ignoré.
#[derive(Clone, Default)]
pub struct RefreshGuard {
    in_flight: Arc<AtomicBool>,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tente de passer Idle -> Refreshing. `false` si déjà en vol.
    pub fn begin(&self) -> bool {
        !self.in_flight.swap(true, Ordering::SeqCst)
    }

    /// Retour à Idle, que le cycle ait abouti ou non.
    pub fn end(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}
