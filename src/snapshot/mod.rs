pub mod scene;
pub mod types;

pub use scene::{lookup_glyph, rule_for, ChoiceSource, SceneRule, EVENT_GLYPHS, MONSTER_GLYPHS};
pub use types::{ActionIndex, ActionReply, Inventory, SceneType, Snapshot};
