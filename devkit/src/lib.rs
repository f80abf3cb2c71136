/*!
# Vitrine DevKit - Stubs et Utilitaires pour Développement

Bibliothèque facilitant le développement du kernel signage avec:
- Stub HTTP de l'endpoint télémétrie (cgijson) sans scanner réel
- Générateurs de snapshots pour les tests
- Modes d'échec (statut 500, corps non-JSON, latence) pour exercer
  la politique d'abandon de cycle
*/

pub mod snapshot_builders;
pub mod telemetry_stub;

pub use snapshot_builders::SnapshotBuilder;
pub use telemetry_stub::{StubMode, TelemetryStub};
