use crate::classify::{ClassifiedRow, TopicKey};
use crate::summary::{GlobalStats, TopicSummary};

/// Maximum member rows exposed by a selection detail view.
pub const SAMPLE_LIMIT: usize = 5;

/// One run's outputs plus the current-selection slot.
///
/// Created by the pipeline entry point and replaced wholesale on the next
/// run; the summaries and stats are read-only to the caller. Selection is a
/// single slot: selecting a new topic replaces any prior selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    summaries: Vec<TopicSummary>,
    stats: GlobalStats,
    selected: Option<usize>,
}

/// Drill-down view over one selected topic.
#[derive(Debug, Clone, Copy)]
pub struct SelectionDetail<'a> {
    pub summary: &'a TopicSummary,
    /// At most [`SAMPLE_LIMIT`] member rows, in input order.
    pub sample: &'a [ClassifiedRow],
    /// Full member-row count, for a "showing N of M" indicator.
    pub member_total: usize,
}

impl Session {
    pub fn new(summaries: Vec<TopicSummary>, stats: GlobalStats) -> Self {
        Session {
            summaries,
            stats,
            selected: None,
        }
    }

    /// Ranked summaries, ascending by average sentiment.
    pub fn summaries(&self) -> &[TopicSummary] {
        &self.summaries
    }

    pub fn stats(&self) -> &GlobalStats {
        &self.stats
    }

    /// Select a topic by key. An unknown key clears the slot and yields no
    /// selection; that is a normal state, not an error.
    pub fn select(&mut self, key: &TopicKey) -> Option<SelectionDetail<'_>> {
        self.selected = self.summaries.iter().position(|s| &s.key == key);
        self.selection()
    }

    /// Select by the raw key text as typed by a user.
    pub fn select_raw(&mut self, raw: &str) -> Option<SelectionDetail<'_>> {
        self.select(&TopicKey::Id(raw.to_string()))
    }

    /// The current selection, if any.
    pub fn selection(&self) -> Option<SelectionDetail<'_>> {
        let summary = self.selected.and_then(|i| self.summaries.get(i))?;
        let cap = summary.member_rows.len().min(SAMPLE_LIMIT);
        Some(SelectionDetail {
            summary,
            sample: &summary.member_rows[..cap],
            member_total: summary.member_rows.len(),
        })
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
