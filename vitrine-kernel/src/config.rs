use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};
use tokio::fs;
use tracing::warn;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SignConfig {
    pub telemetry: TelemetryConf,
    /// Table nom de pièce -> région du plan à teinter.
    /// Seules les pièces listées ici pilotent une région du SVG.
    #[serde(default = "default_highlights")]
    pub highlights: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TelemetryConf {
    pub url: String,
    pub poll_interval_ms: u64,
}

fn default_highlights() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("Kitchen".to_string(), "region-kitchen".to_string());
    map.insert("LivingRoom".to_string(), "region-livingroom".to_string());
    map
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            telemetry: TelemetryConf {
                // endpoint cgijson du scanner sur le LAN
                url: "http://192.168.0.154/cgi-bin/cgijson.cgi".into(),
                poll_interval_ms: 1000,
            },
            highlights: default_highlights(),
        }
    }
}

pub async fn load_config() -> SignConfig {
    let path = std::env::var("VITRINE_CONFIG").unwrap_or_else(|_| "vitrine.yaml".into());
    if Path::new(&path).exists() {
        let txt = fs::read_to_string(&path).await.unwrap_or_default();
        if txt.trim().is_empty() {
            return SignConfig::default();
        }
        serde_yaml::from_str(&txt).unwrap_or_else(|e| {
            warn!("config invalide: {e}");
            SignConfig::default()
        })
    } else {
        warn!("pas de vitrine.yaml, usage config par défaut");
        SignConfig::default()
    }
}
