use super::model::{Button, Card, CardFace, Controls, HpBar, View};
use crate::snapshot::{rule_for, ActionIndex, ChoiceSource, SceneType, Snapshot};

/// Maps snapshots onto the view. It remembers the key of the last rendered
/// scene, so narration is not repeated for the same scene, and the highest HP
/// seen, which stands in for `max_hp` when the server omits it.
#[derive(Debug, Default)]
pub struct Renderer {
    last_scene_key: Option<String>,
    peak_hp: i64,
}

impl Renderer {
    pub fn render(&mut self, view: &mut View, snapshot: &Snapshot) {
        let player = &snapshot.player;
        view.status = format!(
            "回合: {} | HP: {}, ATK: {}, Gold: {}, 状态: {}",
            snapshot.round, player.hp, player.atk, player.gold, player.status_desc
        );
        self.peak_hp = self.peak_hp.max(player.hp);
        view.hp = HpBar {
            current: player.hp,
            max: player.max_hp.unwrap_or(self.peak_hp.max(1)),
        };
        view.inventory = inventory_text(snapshot);

        let kind = snapshot.scene_kind();
        view.glyph = snapshot.glyph();
        view.description = snapshot.description();
        view.monster_line = monster_line(snapshot);
        view.controls = match rule_for(kind).choices {
            ChoiceSource::Cards => door_cards(snapshot),
            ChoiceSource::Buttons => choice_buttons(snapshot),
        };
        view.controls_enabled = true;
        if view.focus >= view.controls.len() {
            view.focus = 0;
        }

        if let Some(message) = &snapshot.last_message {
            view.log.append(message);
        }
        let key = snapshot.scene_key();
        if self.last_scene_key.as_deref() != Some(key.as_str()) {
            tracing::debug!(%key, "scene changed");
            view.log.append(&view.description);
        }
        self.last_scene_key = Some(key);
    }
}

fn inventory_text(snapshot: &Snapshot) -> String {
    let names = snapshot
        .player
        .inventory
        .as_ref()
        .map(|inventory| inventory.item_names())
        .unwrap_or_default();
    if names.is_empty() {
        "库存：暂无道具".to_string()
    } else {
        format!("库存：{}", names.join(", "))
    }
}

fn monster_line(snapshot: &Snapshot) -> Option<String> {
    if snapshot.scene_kind() != SceneType::Battle {
        return None;
    }
    let monster = snapshot.monster.as_ref()?;
    let mut line = monster.name.clone();
    if let Some(hp) = monster.hp {
        line.push_str(&format!("  HP {hp}"));
    }
    if let Some(atk) = monster.atk {
        line.push_str(&format!("  ATK {atk}"));
    }
    Some(line)
}

// Doors always come in threes, whatever the choices say.
fn door_cards(snapshot: &Snapshot) -> Controls {
    let choices = snapshot.choices();
    let cards = ActionIndex::ALL
        .iter()
        .map(|&index| {
            let hint = snapshot
                .door_hint(index.get())
                .map(str::to_string)
                .or_else(|| choices.get(index.get()).filter(|c| !c.is_empty()).cloned());
            Card {
                index,
                hint,
                face: CardFace::Closed,
            }
        })
        .collect();
    Controls::Cards(cards)
}

fn choice_buttons(snapshot: &Snapshot) -> Controls {
    let buttons = snapshot
        .choices()
        .into_iter()
        .enumerate()
        .filter(|(_, label)| !label.trim().is_empty())
        .filter_map(|(slot, label)| ActionIndex::new(slot).map(|index| Button { index, label }))
        .collect();
    Controls::Buttons(buttons)
}
