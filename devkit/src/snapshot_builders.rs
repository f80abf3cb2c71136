/*!
Générateurs de snapshots télémétrie au format wire du scanner

Produit des payloads `{rooms, groups, assets, signage}` identiques à ce
qu'émet l'endpoint cgijson, pour les tests et le stub.
*/

use serde_json::{json, Value};

/// Constructeur chaînable de snapshot télémétrie.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    rooms: Vec<Value>,
    groups: Vec<Value>,
    assets: Vec<Value>,
    scale_factor: Option<f64>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pièce avec son seul compteur de téléphones.
    pub fn room<S: Into<String>>(mut self, name: S, group: S, phones: f64) -> Self {
        self.rooms.push(json!({
            "name": name.into(),
            "group": group.into(),
            "phones": phones,
        }));
        self
    }

    /// Pièce avec un objet de comptage arbitraire (fusionné tel quel).
    pub fn room_with<S: Into<String>>(mut self, name: S, group: S, counts: Value) -> Self {
        let mut item = json!({
            "name": name.into(),
            "group": group.into(),
        });
        merge(&mut item, counts);
        self.rooms.push(item);
        self
    }

    pub fn group<S: Into<String>>(mut self, name: S, phones: f64) -> Self {
        self.groups.push(json!({
            "name": name.into(),
            "phones": phones,
        }));
        self
    }

    pub fn group_with<S: Into<String>>(mut self, name: S, counts: Value) -> Self {
        let mut item = json!({ "name": name.into() });
        merge(&mut item, counts);
        self.groups.push(item);
        self
    }

    pub fn asset<S: Into<String>>(mut self, name: S, room: S, ago: S) -> Self {
        self.assets.push(json!({
            "name": name.into(),
            "room": room.into(),
            "ago": ago.into(),
        }));
        self
    }

    pub fn scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = Some(scale_factor);
        self
    }

    pub fn build(self) -> Value {
        let mut snapshot = json!({
            "rooms": self.rooms,
            "groups": self.groups,
            "assets": self.assets,
        });
        if let Some(sf) = self.scale_factor {
            snapshot["signage"] = json!({ "scale_factor": sf });
        }
        snapshot
    }
}

fn merge(target: &mut Value, extra: Value) {
    if let (Some(obj), Some(extra_obj)) = (target.as_object_mut(), extra.as_object()) {
        for (k, v) in extra_obj {
            obj.insert(k.clone(), v.clone());
        }
    }
}
