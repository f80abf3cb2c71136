/**
 * MOTEUR DE DÉRIVATION - État visuel du panneau à partir d'un snapshot brut
 *
 * RÔLE : Normaliser le snapshot télémétrie (tri des pièces) et recalculer
 * l'intégralité de l'état visuel dérivé : bandeau d'occupation 6 cases,
 * teinte des régions du plan, politiques d'affichage des cartes.
 *
 * FONCTIONNEMENT : Pur calcul synchrone, rejoué en entier à chaque cycle
 * réussi. Seul le scale_factor persiste d'un cycle à l'autre quand le
 * snapshot ne le fournit pas.
 */

use crate::config::SignConfig;
use crate::models::{Asset, Group, Room, Snapshot};
use serde::Serialize;
use std::collections::HashMap;
use time::OffsetDateTime;

/// Multiplicateur par défaut appliqué au groupe le plus chargé
/// pour le ramener dans le domaine 0..6 du bandeau.
pub const DEFAULT_SCALE_FACTOR: f64 = 0.5;

/// Le bandeau d'occupation fait toujours 6 cases, quel que soit l'input.
pub const STRIP_LEN: usize = 6;

// Palette du bandeau d'occupation
pub const STRIP_GREEN: &str = "#4caf50";
pub const STRIP_YELLOW: &str = "#ffc107";
pub const STRIP_RED: &str = "#f44336";
pub const STRIP_VACANT: &str = "#9e9e9e";

/// Bandes de surbrillance des pièces, de la plus calme à la plus chargée
/// (phones < 1, < 2, < 3, >= 3).
pub const BAND_COLORS: [&str; 4] = ["#dcedc8", "#aed581", "#ffb300", "#e53935"];

/// Seuil "alerte" sur le compteur de téléphones d'une carte pièce/groupe.
pub const PHONE_ALERT_THRESHOLD: f64 = 2.5;

/// État visuel dérivé, reconstruit en entier à chaque refresh réussi.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DerivedVisualState {
    pub scale_factor: f64,
    pub occupancy_strip: [&'static str; STRIP_LEN],
    /// région du plan -> couleur de remplissage (pilotée par la table highlights)
    pub region_fills: HashMap<String, &'static str>,
}

impl Default for DerivedVisualState {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            occupancy_strip: [STRIP_VACANT; STRIP_LEN],
            region_fills: HashMap::new(),
        }
    }
}

/// État vivant du panneau : listes normalisées + état dérivé.
/// Possédé par le moteur, remplacé en bloc à chaque cycle réussi ;
/// la couche de rendu n'y accède qu'en lecture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub rooms: Vec<Room>,
    pub groups: Vec<Group>,
    pub assets: Vec<Asset>,
    pub derived: DerivedVisualState,
    pub last_refresh: Option<OffsetDateTime>,
}

fn room_sort_key(room: &Room) -> String {
    format!("{}_{}", room.group, room.name)
}

/// Tri des pièces par groupe parent puis nom (ordre total, idempotent).
pub fn sort_rooms(rooms: &mut [Room]) {
    rooms.sort_by(|a, b| room_sort_key(a).cmp(&room_sort_key(b)));
}

/// Nombre de répétitions d'icône pour une carte groupe : troncature du
/// compte fractionnaire (la répétition s'arrête avant l'unité incomplète).
/// Absent, nul ou négatif (hors contrat) = 0, sans panique.
pub fn icon_repeats(count: Option<f64>) -> usize {
    match count {
        Some(c) if c > 0.0 => c.floor() as usize,
        _ => 0,
    }
}

/// Compteur affiché sur une carte pièce : arrondi standard (demi vers le
/// haut), visible uniquement si la valeur brute est strictement positive.
pub fn displayed_count(count: Option<f64>) -> Option<i64> {
    match count {
        Some(c) if c > 0.0 => Some(c.round() as i64),
        _ => None,
    }
}

/// En-tête de carte pièce/groupe en alerte ? (phones présent et >= 2.5)
pub fn phones_alert(phones: Option<f64>) -> bool {
    matches!(phones, Some(p) if p >= PHONE_ALERT_THRESHOLD)
}

/// Carte actif en alerte sauf présence fraîche (ago exactement "now").
pub fn asset_alert(ago: &str) -> bool {
    ago != "now"
}

/// Couleur de surbrillance d'une pièce selon son compteur de téléphones.
pub fn highlight_band(phones: f64) -> &'static str {
    if phones < 1.0 {
        BAND_COLORS[0]
    } else if phones < 2.0 {
        BAND_COLORS[1]
    } else if phones < 3.0 {
        BAND_COLORS[2]
    } else {
        BAND_COLORS[3]
    }
}

/// Bandeau d'occupation : la case i est occupée si i < scaled_max.
/// Le seuil de couleur s'applique sur scaled_max lui-même, donc uniformément
/// à toutes les cases occupées du cycle (pas de dégradé par case).
pub fn occupancy_strip(scaled_max: f64) -> [&'static str; STRIP_LEN] {
    let occupied = if scaled_max < 3.0 {
        STRIP_GREEN
    } else if scaled_max < 5.0 {
        STRIP_YELLOW
    } else {
        STRIP_RED
    };

    let mut strip = [STRIP_VACANT; STRIP_LEN];
    for (i, cell) in strip.iter_mut().enumerate() {
        if (i as f64) < scaled_max {
            *cell = occupied;
        }
    }
    strip
}

fn max_group_phones(groups: &[Group]) -> f64 {
    groups
        .iter()
        .filter_map(|g| g.counts.phones)
        .fold(0.0, f64::max)
}

/// Applique un snapshot réussi : normalise les listes et recalcule tout
/// l'état dérivé. Aucune fusion incrémentale hormis la persistance du
/// scale_factor quand le snapshot ne fournit pas d'override.
pub fn apply_snapshot(state: &mut DashboardState, mut snapshot: Snapshot, cfg: &SignConfig) {
    sort_rooms(&mut snapshot.rooms);

    if let Some(sf) = snapshot.signage.as_ref().and_then(|s| s.scale_factor) {
        state.derived.scale_factor = sf;
    }

    let scaled_max = max_group_phones(&snapshot.groups) * state.derived.scale_factor;
    state.derived.occupancy_strip = occupancy_strip(scaled_max);

    state.derived.region_fills.clear();
    for room in &snapshot.rooms {
        if let Some(region) = cfg.highlights.get(&room.name) {
            let fill = highlight_band(room.counts.phones.unwrap_or(0.0));
            state.derived.region_fills.insert(region.clone(), fill);
        }
    }

    state.rooms = snapshot.rooms;
    state.groups = snapshot.groups;
    state.assets = snapshot.assets;
    state.last_refresh = Some(OffsetDateTime::now_utc());
}
