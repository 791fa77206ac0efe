/// Display data derived from stored rules
use std::fmt;

use crate::constants::UNNAMED_RULE;
use crate::models::{Mode, Rule, RuleId, Table};
use crate::utils::repeats::repeats_summary;
use crate::utils::schedule_utils::format_time_hhmm;

/// What a list row shows for one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSummary {
    pub id: RuleId,
    pub table: Table,
    pub title: String,
    pub time: String,
    pub repeats: String,
    pub mode: Option<Mode>,
    pub active: bool,
}

impl From<&Rule> for RuleSummary {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id,
            table: rule.table,
            title: display_name(&rule.name).to_string(),
            time: format_time_hhmm(rule.hour, rule.minutes),
            repeats: repeats_summary(&rule.days),
            // Only turn-off rules show their mode
            mode: match rule.table {
                Table::Off => rule.mode,
                Table::On => None,
            },
            active: rule.active,
        }
    }
}

impl fmt::Display for RuleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:>4}  {}  {}  {}",
            if self.active { "x" } else { " " },
            self.id,
            self.time,
            self.title,
            self.repeats
        )?;
        if let Some(mode) = self.mode {
            write!(f, "  Mode: {}", mode)?;
        }
        Ok(())
    }
}

/// Name shown for a rule, falling back for empty names
pub fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        UNNAMED_RULE
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeekDays;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(""), "Unnamed rule");
        assert_eq!(display_name("   "), "Unnamed rule");
        assert_eq!(display_name("Work"), "Work");
    }

    #[test]
    fn test_summary_from_off_rule() {
        let mut rule = Rule::new(Table::Off, "", 23, 5, WeekDays::ALL).with_mode(Mode::Disk);
        rule.id = 4;
        let summary = RuleSummary::from(&rule);

        assert_eq!(summary.title, "Unnamed rule");
        assert_eq!(summary.time, "23:05");
        assert_eq!(summary.repeats, "Every day");
        assert_eq!(summary.mode, Some(Mode::Disk));
        assert_eq!(summary.to_string(), "[x]    4  23:05  Unnamed rule  Every day  Mode: disk");
    }

    #[test]
    fn test_summary_hides_mode_for_on_rule() {
        let mut rule = Rule::new(Table::On, "Wake", 7, 0, WeekDays::NONE);
        rule.active = false;
        rule.mode = Some(Mode::Mem);
        let summary = RuleSummary::from(&rule);

        assert_eq!(summary.mode, None);
        assert_eq!(summary.to_string(), "[ ]    0  07:00  Wake  Any day");
    }
}
