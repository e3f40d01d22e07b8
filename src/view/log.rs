use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

/// Oldest entries are dropped past this many.
pub const LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Plain,
    Round,
    Damage,
    Heal,
    Gold,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSpan {
    pub text: String,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub spans: Vec<LogSpan>,
}

impl LogEntry {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// A highlight rule fires on lines containing any of its triggers and marks
/// every match of its pattern inside still-plain text.
struct HighlightRule {
    highlight: Highlight,
    triggers: &'static [&'static str],
    pattern: Regex,
}

static HIGHLIGHT_RULES: LazyLock<Vec<HighlightRule>> = LazyLock::new(|| {
    let rule = |highlight: Highlight, triggers: &'static [&'static str], pattern: &str| {
        HighlightRule {
            highlight,
            triggers,
            pattern: Regex::new(pattern).expect("highlight pattern"),
        }
    };
    vec![
        rule(Highlight::Round, &["回合"], r"第\s*\d+\s*回合"),
        rule(Highlight::Damage, &["伤害", "损失"], r"\d+\s*点?伤害|损失\s*\d+\s*HP"),
        rule(Highlight::Heal, &["恢复"], r"恢复\s*\d+\s*(?:点生命|HP)?"),
        rule(Highlight::Gold, &["金币"], r"\d+\s*金币"),
        rule(
            Highlight::Item,
            &["获得", "购买了"],
            r"(?:获得|购买了)\s*[^\s\d,，.!！。()（）]+",
        ),
    ]
});

impl HighlightRule {
    fn applies_to(&self, line: &str) -> bool {
        self.triggers.iter().any(|trigger| line.contains(trigger))
    }

    fn rewrite(&self, spans: Vec<LogSpan>) -> Vec<LogSpan> {
        let mut out = Vec::with_capacity(spans.len());
        for span in spans {
            if span.highlight != Highlight::Plain {
                out.push(span);
                continue;
            }
            let mut last = 0;
            for m in self.pattern.find_iter(&span.text) {
                if m.start() > last {
                    out.push(plain(&span.text[last..m.start()]));
                }
                out.push(LogSpan {
                    text: m.as_str().to_string(),
                    highlight: self.highlight,
                });
                last = m.end();
            }
            if last < span.text.len() {
                out.push(plain(&span.text[last..]));
            }
        }
        out
    }
}

fn plain(text: &str) -> LogSpan {
    LogSpan {
        text: text.to_string(),
        highlight: Highlight::Plain,
    }
}

pub fn highlight_line(line: &str) -> LogEntry {
    let spans = HIGHLIGHT_RULES
        .iter()
        .filter(|rule| rule.applies_to(line))
        .fold(vec![plain(line)], |spans, rule| rule.rewrite(spans));
    LogEntry { spans }
}

/// Scrolling event log holding at most [`LOG_CAPACITY`] entries.
/// `scroll_back` counts lines above the newest entry; zero means the pane
/// follows new entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPane {
    entries: VecDeque<LogEntry>,
    scroll_back: usize,
}

impl LogPane {
    pub fn append(&mut self, message: &str) {
        let mut appended = false;
        for segment in message.lines().map(str::trim_end) {
            if segment.trim().is_empty() {
                continue;
            }
            if self.entries.len() == LOG_CAPACITY {
                self.entries.pop_front();
            }
            self.entries.push_back(highlight_line(segment));
            appended = true;
        }
        if appended {
            self.scroll_back = 0;
        }
    }

    pub fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self
            .scroll_back
            .saturating_add(lines)
            .min(self.entries.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(entry: &LogEntry) -> Vec<(Highlight, &str)> {
        entry
            .spans
            .iter()
            .filter(|span| span.highlight != Highlight::Plain)
            .map(|span| (span.highlight, span.text.as_str()))
            .collect()
    }

    #[test]
    fn round_and_damage_apply_to_the_same_line() {
        let entry = highlight_line("第3回合：你攻击 史莱姆 造成 5 点伤害.");
        assert_eq!(
            marked(&entry),
            vec![(Highlight::Round, "第3回合"), (Highlight::Damage, "5 点伤害")]
        );
        assert_eq!(entry.text(), "第3回合：你攻击 史莱姆 造成 5 点伤害.");
    }

    #[test]
    fn gold_wins_over_item_for_coin_gains() {
        let entry = highlight_line("怪物掉落金币, 你获得 12 金币!");
        assert_eq!(marked(&entry), vec![(Highlight::Gold, "12 金币")]);
    }

    #[test]
    fn purchases_mark_gold_and_item() {
        let entry = highlight_line("你花费 18 金币, 购买了 飞锤（已存入道具栏）!");
        assert_eq!(
            marked(&entry),
            vec![(Highlight::Gold, "18 金币"), (Highlight::Item, "购买了 飞锤")]
        );
    }

    #[test]
    fn heal_needs_a_number() {
        let entry = highlight_line("恢复卷轴生效，恢复 4 点生命！");
        assert_eq!(marked(&entry), vec![(Highlight::Heal, "恢复 4 点生命")]);

        let gained = highlight_line("获得复活卷轴");
        assert_eq!(marked(&gained), vec![(Highlight::Item, "获得复活卷轴")]);
    }

    #[test]
    fn trap_loss_is_damage() {
        let entry = highlight_line("你踩到陷阱，损失3HP!");
        assert_eq!(marked(&entry), vec![(Highlight::Damage, "损失3HP")]);
    }

    #[test]
    fn lines_without_triggers_stay_plain() {
        let entry = highlight_line("你来到了神秘商店");
        assert_eq!(entry.spans.len(), 1);
        assert_eq!(entry.spans[0].highlight, Highlight::Plain);
    }

    #[test]
    fn append_splits_lines_and_drops_blank_segments() {
        let mut log = LogPane::default();
        log.append("你花费 10 金币\n\n   \n离开商店, 回到门场景");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[1].text(), "离开商店, 回到门场景");

        log.append("  ");
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn append_follows_the_newest_entry() {
        let mut log = LogPane::default();
        for i in 0..10 {
            log.append(&format!("line {i}"));
        }
        log.scroll_up(4);
        assert_eq!(log.scroll_back(), 4);
        log.scroll_up(100);
        assert_eq!(log.scroll_back(), 9);

        log.append("newest");
        assert_eq!(log.scroll_back(), 0);
    }

    #[test]
    fn oldest_entries_are_dropped_at_capacity() {
        let mut log = LogPane::default();
        for i in 0..LOG_CAPACITY + 20 {
            log.append(&format!("line {i}"));
        }
        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(log.entries()[0].text(), "line 20");
        assert_eq!(
            log.entries().back().map(LogEntry::text).as_deref(),
            Some(format!("line {}", LOG_CAPACITY + 19).as_str())
        );

        log.scroll_up(usize::MAX / 2);
        assert_eq!(log.scroll_back(), LOG_CAPACITY - 1);
    }
}
