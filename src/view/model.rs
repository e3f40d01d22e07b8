use super::log::LogPane;
use crate::snapshot::ActionIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    Pending,
    Connected,
    Disconnected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HpBar {
    pub current: i64,
    pub max: i64,
}

impl HpBar {
    pub fn ratio(&self) -> f64 {
        if self.max <= 0 {
            return 0.0;
        }
        (self.current as f64 / self.max as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardFace {
    Closed,
    /// Flipping over to show what was behind the door.
    Revealed(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub index: ActionIndex,
    pub hint: Option<String>,
    pub face: CardFace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub index: ActionIndex,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Controls {
    Buttons(Vec<Button>),
    Cards(Vec<Card>),
}

impl Default for Controls {
    fn default() -> Self {
        Controls::Buttons(Vec::new())
    }
}

impl Controls {
    pub fn len(&self) -> usize {
        match self {
            Controls::Buttons(buttons) => buttons.len(),
            Controls::Cards(cards) => cards.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Action index of the control at display position `position`.
    pub fn index_at(&self, position: usize) -> Option<ActionIndex> {
        match self {
            Controls::Buttons(buttons) => buttons.get(position).map(|b| b.index),
            Controls::Cards(cards) => cards.get(position).map(|c| c.index),
        }
    }

    pub fn offers(&self, index: ActionIndex) -> bool {
        (0..self.len()).any(|position| self.index_at(position) == Some(index))
    }
}

/// Everything the terminal shows. Rebuilt from each snapshot except for the
/// log, the focus and the connection flag.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub status: String,
    pub hp: HpBar,
    pub inventory: String,
    pub glyph: &'static str,
    pub description: String,
    pub monster_line: Option<String>,
    pub controls: Controls,
    pub controls_enabled: bool,
    pub focus: usize,
    pub log: LogPane,
    pub connection: Connection,
    pub closed: bool,
}

impl Default for View {
    fn default() -> Self {
        View {
            status: String::new(),
            hp: HpBar::default(),
            inventory: String::new(),
            glyph: "⌛",
            description: "正在连接服务器…".to_string(),
            monster_line: None,
            controls: Controls::default(),
            controls_enabled: false,
            focus: 0,
            log: LogPane::default(),
            connection: Connection::Pending,
            closed: false,
        }
    }
}

impl View {
    pub fn focus_next(&mut self) {
        if !self.controls.is_empty() {
            self.focus = (self.focus + 1) % self.controls.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.controls.is_empty() {
            self.focus = (self.focus + self.controls.len() - 1) % self.controls.len();
        }
    }

    pub fn focused_index(&self) -> Option<ActionIndex> {
        self.controls.index_at(self.focus)
    }

    /// Text of every labelled control, in display order.
    pub fn control_labels(&self) -> Vec<String> {
        match &self.controls {
            Controls::Buttons(buttons) => buttons.iter().map(|b| b.label.clone()).collect(),
            Controls::Cards(cards) => cards
                .iter()
                .map(|c| c.hint.clone().unwrap_or_default())
                .collect(),
        }
    }
}
