/**
 * API REST VITRINE - Surface de rendu du panneau
 *
 * RÔLE :
 * Ce module publie l'état du panneau en lecture seule pour les couches de
 * rendu (sign SVG, carte, debug). Aucune écriture possible par ce chemin :
 * seul le moteur de dérivation mute l'état.
 *
 * FONCTIONNEMENT :
 * - Serveur Axum sur port 8080
 * - Routes : /health, /dashboard, /rooms, /groups, /assets
 * - Les vues embarquent la politique de présentation (compteurs arrondis,
 *   répétitions d'icônes, drapeaux alerte, bande de surbrillance) pour que
 *   le rendu reste sans logique
 *
 * UTILITÉ DANS VITRINE :
 * 🎯 Rendu signage : le sign SVG consomme /dashboard tel quel
 * 🎯 Debug/administration : inspection de l'état dérivé en temps réel
 * 🎯 Intégration : écrans secondaires, scripts de contrôle
 */

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::engine::{self, DashboardState, DerivedVisualState};
use crate::models::{Asset, Group, Room};
use crate::state::Shared;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Shared<DashboardState>,
}

/// Carte pièce : compteur arrondi par catégorie, absent si la valeur brute
/// n'est pas strictement positive (l'icône est alors omise du rendu).
#[derive(Serialize)]
struct RoomView {
    name: String,
    group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phones: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    watches: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wearables: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    computers: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    beacons: Option<i64>,
    alert: bool,
    highlight: &'static str, // bande de couleur de la pièce
}

/// Carte groupe : nombre de répétitions d'icône par catégorie (troncature).
#[derive(Serialize)]
struct GroupView {
    name: String,
    phones: usize,
    watches: usize,
    wearables: usize,
    computers: usize,
    beacons: usize,
    alert: bool,
}

#[derive(Serialize)]
struct AssetView {
    name: String,
    room: Option<String>,
    ago: String,
    alert: bool,
}

#[derive(Serialize)]
struct DashboardView {
    rooms: Vec<RoomView>,
    groups: Vec<GroupView>,
    assets: Vec<AssetView>,
    derived: DerivedVisualState,
    last_refresh: Option<String>, // RFC3339, null avant le premier cycle réussi
}

fn room_view(r: &Room) -> RoomView {
    RoomView {
        name: r.name.clone(),
        group: r.group.clone(),
        phones: engine::displayed_count(r.counts.phones),
        watches: engine::displayed_count(r.counts.watches),
        wearables: engine::displayed_count(r.counts.wearables),
        computers: engine::displayed_count(r.counts.computers),
        beacons: engine::displayed_count(r.counts.beacons),
        alert: engine::phones_alert(r.counts.phones),
        highlight: engine::highlight_band(r.counts.phones.unwrap_or(0.0)),
    }
}

fn group_view(g: &Group) -> GroupView {
    GroupView {
        name: g.name.clone(),
        phones: engine::icon_repeats(g.counts.phones),
        watches: engine::icon_repeats(g.counts.watches),
        wearables: engine::icon_repeats(g.counts.wearables),
        computers: engine::icon_repeats(g.counts.computers),
        beacons: engine::icon_repeats(g.counts.beacons),
        alert: engine::phones_alert(g.counts.phones),
    }
}

fn asset_view(a: &Asset) -> AssetView {
    AssetView {
        name: a.name.clone(),
        room: a.room.clone(),
        ago: a.ago.clone(),
        alert: engine::asset_alert(&a.ago),
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/dashboard", get(get_dashboard))
        .route("/rooms", get(get_rooms))
        .route("/rooms/{name}", get(get_room))
        .route("/groups", get(get_groups))
        .route("/assets", get(get_assets))
        .with_state(app_state)
}

// GET /dashboard (vue complète pour le sign)
async fn get_dashboard(State(app): State<AppState>) -> Json<DashboardView> {
    let st = app.dashboard.lock();
    Json(DashboardView {
        rooms: st.rooms.iter().map(room_view).collect(),
        groups: st.groups.iter().map(group_view).collect(),
        assets: st.assets.iter().map(asset_view).collect(),
        derived: st.derived.clone(),
        last_refresh: st
            .last_refresh
            .and_then(|t| t.format(&Rfc3339).ok()),
    })
}

// GET /rooms (liste triée groupe puis nom)
async fn get_rooms(State(app): State<AppState>) -> Json<Vec<RoomView>> {
    let st = app.dashboard.lock();
    Json(st.rooms.iter().map(room_view).collect())
}

// GET /rooms/{name} (détail)
async fn get_room(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RoomView>, StatusCode> {
    let st = app.dashboard.lock();
    let Some(r) = st.rooms.iter().find(|r| r.name == name) else {
        return Err(StatusCode::NOT_FOUND);
    };
    Ok(Json(room_view(r)))
}

// GET /groups (liste)
async fn get_groups(State(app): State<AppState>) -> Json<Vec<GroupView>> {
    let st = app.dashboard.lock();
    Json(st.groups.iter().map(group_view).collect())
}

// GET /assets (liste, ordre source conservé)
async fn get_assets(State(app): State<AppState>) -> Json<Vec<AssetView>> {
    let st = app.dashboard.lock();
    Json(st.assets.iter().map(asset_view).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_view_hides_non_positive_counts() {
        let room: Room = serde_json::from_value(json!({
            "name": "Den", "group": "G1", "phones": 2.7, "watches": 0.0
        }))
        .unwrap();
        let view = room_view(&room);
        assert_eq!(view.phones, Some(3)); // arrondi demi vers le haut
        assert_eq!(view.watches, None);   // 0 -> omis
        assert_eq!(view.beacons, None);   // absent -> omis
        assert!(view.alert); // 2.7 >= 2.5

        let body = serde_json::to_value(&view).unwrap();
        assert!(body.get("watches").is_none());
        assert!(body.get("beacons").is_none());
    }

    #[test]
    fn test_group_view_repeats_icons_by_truncation() {
        let group: Group = serde_json::from_value(json!({
            "name": "G1", "phones": 2.7, "computers": 1.0
        }))
        .unwrap();
        let view = group_view(&group);
        assert_eq!(view.phones, 2);
        assert_eq!(view.computers, 1);
        assert_eq!(view.watches, 0);
    }

    #[test]
    fn test_asset_view_alert_unless_now() {
        let asset: Asset = serde_json::from_value(json!({
            "name": "Keys", "room": "Hall", "ago": "now"
        }))
        .unwrap();
        assert!(!asset_view(&asset).alert);

        let stale: Asset = serde_json::from_value(json!({
            "name": "Bag", "ago": "2.1 hours ago"
        }))
        .unwrap();
        assert!(asset_view(&stale).alert);
    }
}
