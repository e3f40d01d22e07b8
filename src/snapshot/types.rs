use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Index of one of the three positional choices. Only 0, 1 and 2 exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ActionIndex(u8);

impl ActionIndex {
    pub const ALL: [ActionIndex; 3] = [ActionIndex(0), ActionIndex(1), ActionIndex(2)];

    pub fn new(index: usize) -> Option<Self> {
        (index < Self::ALL.len()).then(|| ActionIndex(index as u8))
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Full game state as served by `GET /getState`.
///
/// Two generations of the server are accepted: the current one sends
/// `scene_info`, the older one a bare `scene` class name together with
/// `monster`, `door_events`, `shop_items` and `active_items`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub round: u32,
    #[serde(default)]
    pub player: Player,
    #[serde(default)]
    pub scene_info: Option<SceneInfo>,
    #[serde(default)]
    pub scene: Option<SceneType>,
    #[serde(default)]
    pub monster: Option<MonsterInfo>,
    #[serde(default)]
    pub door_events: Option<Vec<DoorEvent>>,
    #[serde(default)]
    pub shop_items: Option<Vec<ShopItem>>,
    #[serde(default)]
    pub active_items: Option<Vec<Item>>,
    #[serde(default)]
    pub event_info: Option<EventInfo>,
    #[serde(default)]
    pub button_texts: Option<Vec<String>>,
    #[serde(default)]
    pub last_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub hp: i64,
    #[serde(default)]
    pub max_hp: Option<i64>,
    #[serde(default)]
    pub atk: i64,
    #[serde(default)]
    pub gold: i64,
    #[serde(default = "default_status_desc")]
    pub status_desc: String,
    #[serde(default)]
    pub inventory: Option<Inventory>,
}

fn default_status_desc() -> String {
    "无".to_string()
}

impl Default for Player {
    fn default() -> Self {
        Player {
            hp: 0,
            max_hp: None,
            atk: 0,
            gold: 0,
            status_desc: default_status_desc(),
            inventory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneInfo {
    #[serde(rename = "type")]
    pub kind: SceneType,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub monster_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum SceneType {
    Door,
    Battle,
    Shop,
    Event,
    UseItem,
    GameOver,
    Unknown,
}

impl From<String> for SceneType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "DOOR" | "DoorScene" => SceneType::Door,
            "BATTLE" | "BattleScene" => SceneType::Battle,
            "SHOP" | "ShopScene" => SceneType::Shop,
            "EVENT" | "EventScene" => SceneType::Event,
            "USE_ITEM" | "UseItemScene" => SceneType::UseItem,
            "GAME_OVER" | "GameOver" => SceneType::GameOver,
            _ => SceneType::Unknown,
        }
    }
}

impl SceneType {
    pub fn as_str(self) -> &'static str {
        match self {
            SceneType::Door => "DOOR",
            SceneType::Battle => "BATTLE",
            SceneType::Shop => "SHOP",
            SceneType::Event => "EVENT",
            SceneType::UseItem => "USE_ITEM",
            SceneType::GameOver => "GAME_OVER",
            SceneType::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonsterInfo {
    pub name: String,
    #[serde(default)]
    pub hp: Option<i64>,
    #[serde(default)]
    pub atk: Option<i64>,
    #[serde(default)]
    pub tier: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DoorEvent {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShopItem {
    pub name: String,
    #[serde(default)]
    pub cost: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub name: String,
}

/// Player inventory in either of the shapes the server has used.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Inventory {
    Flat(Vec<Item>),
    /// Category name to item list, kept in document order.
    Categorized(Map<String, Value>),
}

impl Inventory {
    /// Flattens the inventory into one display sequence. Categories keep
    /// their document order and items keep their order inside a category.
    pub fn item_names(&self) -> Vec<String> {
        match self {
            Inventory::Flat(items) => items.iter().map(|item| item.name.clone()).collect(),
            Inventory::Categorized(categories) => categories
                .iter()
                .flat_map(|(category, value)| match Vec::<Item>::deserialize(value) {
                    Ok(items) => items,
                    Err(e) => {
                        tracing::debug!(%category, error = %e, "skipping inventory category");
                        Vec::new()
                    }
                })
                .map(|item| item.name)
                .collect(),
        }
    }
}

/// Response body of the action endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ActionReply {
    pub fn message(&self) -> Option<&str> {
        self.log
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.msg.as_deref().filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_index_rejects_out_of_range() {
        assert_eq!(ActionIndex::new(2).map(ActionIndex::get), Some(2));
        assert!(ActionIndex::new(3).is_none());
        assert_eq!(serde_json::to_string(&ActionIndex::ALL[1]).unwrap(), "1");
    }

    #[test]
    fn categorized_inventory_flattens_in_document_order() {
        let inventory: Inventory = serde_json::from_str(
            r#"{
                "potion": [{"name": "普通治疗药水"}, {"name": "高级治疗药水"}],
                "active": [{"name": "飞锤", "cost": 20}],
                "scroll": [{"name": "复活卷轴"}]
            }"#,
        )
        .unwrap();
        assert_eq!(
            inventory.item_names(),
            vec!["普通治疗药水", "高级治疗药水", "飞锤", "复活卷轴"]
        );
    }

    #[test]
    fn flat_inventory_is_unchanged() {
        let inventory: Inventory = serde_json::from_str(
            r#"[{"name": "结界", "type": "结界", "active": true}, {"name": "飞锤"}]"#,
        )
        .unwrap();
        assert!(matches!(inventory, Inventory::Flat(_)));
        assert_eq!(inventory.item_names(), vec!["结界", "飞锤"]);
    }

    #[test]
    fn malformed_category_is_skipped() {
        let inventory: Inventory =
            serde_json::from_str(r#"{"junk": 3, "gear": [{"name": "稀有装备"}]}"#).unwrap();
        assert_eq!(inventory.item_names(), vec!["稀有装备"]);
    }

    #[test]
    fn legacy_snapshot_parses_with_nulls() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{
                "scene": "BattleScene",
                "round": 4,
                "player": {"hp": 12, "atk": 5, "gold": 3, "status_desc": "中毒(2回合)", "inventory": []},
                "door_events": [],
                "monster": {"name": "哥布林", "hp": 20, "atk": 5, "tier": 1},
                "shop_items": null
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.scene, Some(SceneType::Battle));
        assert_eq!(snapshot.monster.as_ref().map(|m| m.name.as_str()), Some("哥布林"));
        assert!(snapshot.shop_items.is_none());
        assert_eq!(snapshot.player.max_hp, None);
    }

    #[test]
    fn unknown_scene_names_do_not_fail() {
        let info: SceneInfo = serde_json::from_str(r#"{"type": "CASINO"}"#).unwrap();
        assert_eq!(info.kind, SceneType::Unknown);
        assert!(info.choices.is_empty());
    }

    #[test]
    fn reply_prefers_log_over_msg() {
        let reply: ActionReply = serde_json::from_str(r#"{"log": "", "msg": "bye"}"#).unwrap();
        assert_eq!(reply.message(), Some("bye"));
        let reply: ActionReply = serde_json::from_str(r#"{"log": "游戏已重置"}"#).unwrap();
        assert_eq!(reply.message(), Some("游戏已重置"));
        assert_eq!(ActionReply::default().message(), None);
    }
}
