use serde::{Deserialize, Serialize};

/// Comptage par catégorie d'appareil. Valeurs fractionnaires possibles
/// (moyennes de probabilité côté scanner), champ absent = zéro/inconnu.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct CategoryCounts {
    pub phones: Option<f64>,
    pub watches: Option<f64>,
    pub wearables: Option<f64>,
    pub computers: Option<f64>,
    pub beacons: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Room {
    pub name: String,
    #[serde(default)]
    pub group: String,          // groupe logique parent, sert de clé de tri
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Group {
    pub name: String,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Asset {
    pub name: String,
    pub room: Option<String>,
    #[serde(default)]
    pub ago: String,            // "now" = présent, sinon dernière observation ("3 min ago", "---")
    // Champs annexes émis par le scanner, exposés tels quels
    pub group: Option<String>,
    pub t: Option<i64>,         // epoch dernière observation
    pub d: Option<f64>,         // âge en minutes
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SignMeta {
    pub scale_factor: Option<f64>,
}

/// Payload télémétrie complet. Toute liste absente est tolérée (= vide).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Snapshot {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub signage: Option<SignMeta>,
}
