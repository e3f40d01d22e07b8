use super::types::{SceneType, Snapshot};

/// Monster name fragments, first match wins.
pub const MONSTER_GLYPHS: &[(&str, &str)] = &[
    ("史莱姆", "💧"),
    ("哥布林", "👺"),
    ("狼", "🐺"),
    ("小恶魔", "😈"),
    ("牛头人", "🐂"),
    ("巨龙", "🐉"),
    ("龙", "🐲"),
    ("暗黑骑士", "🗡️"),
    ("骑士", "🛡️"),
    ("末日领主", "👹"),
];

/// Event title fragments, first match wins.
pub const EVENT_GLYPHS: &[(&str, &str)] = &[
    ("Injured Stranger", "🤕"),
    ("Smuggler", "🕵️"),
    ("Ancient Shrine", "⛩️"),
    ("Gambler", "🎲"),
    ("Lost Child", "🧒"),
    ("Cursed Chest", "🧰"),
    ("Wise Sage", "🧙"),
    ("商人", "💰"),
    ("宝箱", "🧰"),
];

const UNKNOWN_MONSTER_GLYPH: &str = "👾";
const UNKNOWN_EVENT_GLYPH: &str = "✨";
const UNKNOWN_MONSTER_NAME: &str = "未知怪物";

pub enum GlyphRule {
    Fixed(&'static str),
    Monster,
    Event,
}

pub enum DescriptionRule {
    Fixed(&'static str),
    Encounter,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceSource {
    Cards,
    Buttons,
}

/// How one scene type is presented.
pub struct SceneRule {
    pub kind: SceneType,
    pub glyph: GlyphRule,
    pub description: DescriptionRule,
    pub choices: ChoiceSource,
}

pub const SCENE_TABLE: &[SceneRule] = &[
    SceneRule {
        kind: SceneType::Door,
        glyph: GlyphRule::Fixed("🚪"),
        description: DescriptionRule::Fixed("面前出现了三扇门，选择一扇推开吧"),
        choices: ChoiceSource::Cards,
    },
    SceneRule {
        kind: SceneType::Battle,
        glyph: GlyphRule::Monster,
        description: DescriptionRule::Encounter,
        choices: ChoiceSource::Buttons,
    },
    SceneRule {
        kind: SceneType::Shop,
        glyph: GlyphRule::Fixed("🏪"),
        description: DescriptionRule::Fixed("你来到了神秘商店"),
        choices: ChoiceSource::Buttons,
    },
    SceneRule {
        kind: SceneType::Event,
        glyph: GlyphRule::Event,
        description: DescriptionRule::Event,
        choices: ChoiceSource::Buttons,
    },
    SceneRule {
        kind: SceneType::UseItem,
        glyph: GlyphRule::Fixed("🎒"),
        description: DescriptionRule::Fixed("选择要使用的道具"),
        choices: ChoiceSource::Buttons,
    },
    SceneRule {
        kind: SceneType::GameOver,
        glyph: GlyphRule::Fixed("💀"),
        description: DescriptionRule::Fixed("你倒下了……游戏结束"),
        choices: ChoiceSource::Buttons,
    },
];

static FALLBACK_RULE: SceneRule = SceneRule {
    kind: SceneType::Unknown,
    glyph: GlyphRule::Fixed("❔"),
    description: DescriptionRule::Fixed("四周一片寂静"),
    choices: ChoiceSource::Buttons,
};

pub fn rule_for(kind: SceneType) -> &'static SceneRule {
    SCENE_TABLE
        .iter()
        .find(|rule| rule.kind == kind)
        .unwrap_or(&FALLBACK_RULE)
}

pub fn lookup_glyph(table: &[(&str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(fragment, _)| name.contains(fragment))
        .map(|(_, glyph)| *glyph)
}

impl Snapshot {
    /// The scene the server reports, whichever shape it used.
    pub fn scene_kind(&self) -> SceneType {
        if let Some(info) = &self.scene_info {
            return info.kind;
        }
        self.scene.unwrap_or(SceneType::Unknown)
    }

    pub fn monster_name(&self) -> Option<&str> {
        self.scene_info
            .as_ref()
            .and_then(|info| info.monster_name.as_deref())
            .or_else(|| self.monster.as_ref().map(|m| m.name.as_str()))
            .filter(|name| !name.is_empty())
    }

    /// `type + "_" + monster_name`, used to suppress repeated narration.
    pub fn scene_key(&self) -> String {
        format!(
            "{}_{}",
            self.scene_kind().as_str(),
            self.monster_name().unwrap_or_default()
        )
    }

    /// Up to three labels, positionally bound to action indices. An empty
    /// label means nothing is offered at that slot. Default labels are only
    /// derived for the bare `scene` shape; a `scene_info` block is taken as
    /// the full list of what the server offers.
    pub fn choices(&self) -> Vec<String> {
        let mut choices = match (&self.scene_info, &self.button_texts) {
            (Some(info), _) if !info.choices.is_empty() => info.choices.clone(),
            (_, Some(texts)) if !texts.is_empty() => texts.clone(),
            (Some(_), _) => Vec::new(),
            (None, _) => self.legacy_choices(),
        };
        choices.truncate(3);
        choices
    }

    fn legacy_choices(&self) -> Vec<String> {
        let fixed =
            |labels: [&str; 3]| -> Vec<String> { labels.iter().map(|s| s.to_string()).collect() };
        match self.scene_kind() {
            SceneType::Battle => fixed(["攻击", "使用道具", "逃跑"]),
            SceneType::GameOver => fixed(["重启游戏", "使用复活卷轴", "退出游戏"]),
            SceneType::Shop => self
                .shop_items
                .iter()
                .flatten()
                .map(|item| match item.cost {
                    Some(cost) => format!("{} ({}G)", item.name, cost),
                    None => item.name.clone(),
                })
                .collect(),
            SceneType::UseItem => self
                .active_items
                .iter()
                .flatten()
                .map(|item| item.name.clone())
                .collect(),
            SceneType::Door | SceneType::Event | SceneType::Unknown => Vec::new(),
        }
    }

    /// Door hint for card `slot`, if the server sent one.
    pub fn door_hint(&self, slot: usize) -> Option<&str> {
        self.door_events
            .as_ref()
            .and_then(|events| events.get(slot))
            .and_then(|event| event.hint.as_deref())
            .filter(|hint| !hint.trim().is_empty())
    }

    pub fn glyph(&self) -> &'static str {
        match rule_for(self.scene_kind()).glyph {
            GlyphRule::Fixed(glyph) => glyph,
            GlyphRule::Monster => self
                .monster_name()
                .and_then(|name| lookup_glyph(MONSTER_GLYPHS, name))
                .unwrap_or(UNKNOWN_MONSTER_GLYPH),
            GlyphRule::Event => self
                .event_info
                .as_ref()
                .and_then(|event| lookup_glyph(EVENT_GLYPHS, &event.title))
                .unwrap_or(UNKNOWN_EVENT_GLYPH),
        }
    }

    pub fn description(&self) -> String {
        match rule_for(self.scene_kind()).description {
            DescriptionRule::Fixed(text) => text.to_string(),
            DescriptionRule::Encounter => format!(
                "遭遇 {} ！",
                self.monster_name().unwrap_or(UNKNOWN_MONSTER_NAME)
            ),
            DescriptionRule::Event => match &self.event_info {
                Some(event) if !event.description.is_empty() => {
                    format!("{}：{}", event.title, event.description)
                }
                Some(event) => event.title.clone(),
                None => "发生了奇怪的事件".to_string(),
            },
        }
    }
}
