use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::classify::{ClassifiedRow, Language, RawRecord, TopicKey};

/// Running state for one topic during the aggregation pass.
///
/// Owned exclusively by the [`TopicAggregator`]; converted into an immutable
/// summary once the pass ends.
#[derive(Debug, Clone)]
pub struct TopicAccumulator {
    pub key: TopicKey,
    pub total: u64,
    pub count_german: u64,
    pub count_spanish: u64,
    pub sentiment_sum: f64,
    pub sentiment_count: u64,
    /// Keyword string captured from the first row seen for this key,
    /// already cleaned. Never overwritten.
    pub keywords: String,
    /// Representative text from the first row seen for this key.
    pub representative: String,
    /// Rows with non-empty text, in input order. Textless rows are counted
    /// in `total` but never sampled.
    pub member_rows: Vec<ClassifiedRow>,
}

impl TopicAccumulator {
    fn new(key: TopicKey, record: &RawRecord) -> Self {
        TopicAccumulator {
            key,
            total: 0,
            count_german: 0,
            count_spanish: 0,
            sentiment_sum: 0.0,
            sentiment_count: 0,
            keywords: record
                .keywords
                .as_deref()
                .map(clean_keywords)
                .unwrap_or_default(),
            representative: record.representative.clone().unwrap_or_default(),
            member_rows: Vec::new(),
        }
    }
}

/// Global tallies tracked alongside the per-topic fold, independent of
/// topic grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningTotals {
    pub total_rows: u64,
    pub email_count: u64,
    pub tweet_count: u64,
    pub german_total: u64,
    pub spanish_total: u64,
}

/// Single-pass fold from classified rows to per-topic accumulators.
///
/// Keys are kept in an explicit first-seen order list next to the map; that
/// order is the tie-break basis for ranking and must not depend on the map's
/// iteration order.
#[derive(Debug, Default)]
pub struct TopicAggregator {
    order: Vec<TopicKey>,
    topics: HashMap<TopicKey, TopicAccumulator>,
    totals: RunningTotals,
}

impl TopicAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one row into the running state. The raw record is consulted only
    /// when this row is the first for its key (keyword/representative
    /// capture).
    pub fn observe(&mut self, row: ClassifiedRow, record: &RawRecord) {
        self.totals.total_rows += 1;
        if row.is_email {
            self.totals.email_count += 1;
        } else {
            self.totals.tweet_count += 1;
        }
        match row.language {
            Language::German => self.totals.german_total += 1,
            Language::Spanish => self.totals.spanish_total += 1,
            Language::Unknown => {}
        }

        let acc = match self.topics.entry(row.key.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.order.push(row.key.clone());
                entry.insert(TopicAccumulator::new(row.key.clone(), record))
            }
        };

        acc.total += 1;
        match row.language {
            Language::German => acc.count_german += 1,
            Language::Spanish => acc.count_spanish += 1,
            Language::Unknown => {}
        }
        if let Some(score) = row.sentiment {
            acc.sentiment_sum += score;
            acc.sentiment_count += 1;
        }
        if row.has_text() {
            acc.member_rows.push(row);
        }
    }

    pub fn topic_count(&self) -> usize {
        self.order.len()
    }

    /// End the pass: accumulators in first-seen order plus the global tallies.
    pub fn finish(mut self) -> (Vec<TopicAccumulator>, RunningTotals) {
        let accumulators = self
            .order
            .iter()
            .filter_map(|key| self.topics.remove(key))
            .collect();
        (accumulators, self.totals)
    }
}

/// Strip bracket/quote noise from the source's keyword-list string,
/// e.g. `"['casa', 'hogar']"` becomes `"casa, hogar"`.
pub fn clean_keywords(raw: &str) -> String {
    raw.replace(['[', ']', '\'', '"'], "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{RawRecord, classify};

    fn record(topic: &str, lang: &str, sentiment: &str) -> RawRecord {
        RawRecord {
            language: Some(lang.into()),
            topic: Some(topic.into()),
            sentiment: Some(sentiment.into()),
            text_primary: Some(format!("text {topic}")),
            ..RawRecord::default()
        }
    }

    fn observe(agg: &mut TopicAggregator, raw: &RawRecord) {
        agg.observe(classify(raw), raw);
    }

    #[test]
    fn keys_keep_first_seen_order() {
        let mut agg = TopicAggregator::new();
        for topic in ["9", "2", "7", "2", "9"] {
            observe(&mut agg, &record(topic, "A", "0.1"));
        }
        let (accs, totals) = agg.finish();
        let keys: Vec<_> = accs.iter().filter_map(|a| a.key.raw()).collect();
        assert_eq!(keys, vec!["9", "2", "7"]);
        assert_eq!(totals.total_rows, 5);
    }

    #[test]
    fn first_row_wins_keywords_and_representative() {
        let mut agg = TopicAggregator::new();
        let first = RawRecord {
            keywords: Some("['uno', 'dos']".into()),
            representative: Some("rep one".into()),
            ..record("1", "A", "0.5")
        };
        let second = RawRecord {
            keywords: Some("['otro']".into()),
            representative: Some("rep two".into()),
            ..record("1", "E", "0.5")
        };
        observe(&mut agg, &first);
        observe(&mut agg, &second);

        let (accs, _) = agg.finish();
        assert_eq!(accs.len(), 1);
        assert_eq!(accs[0].keywords, "uno, dos");
        assert_eq!(accs[0].representative, "rep one");
    }

    #[test]
    fn unknown_language_counts_toward_total_only() {
        let mut agg = TopicAggregator::new();
        observe(&mut agg, &record("1", "A", "0.5"));
        observe(&mut agg, &record("1", "X", "0.5"));
        let (accs, totals) = agg.finish();
        assert_eq!(accs[0].total, 2);
        assert_eq!(accs[0].count_german, 1);
        assert_eq!(accs[0].count_spanish, 0);
        assert_eq!(totals.german_total, 1);
        assert_eq!(totals.spanish_total, 0);
    }

    #[test]
    fn unparseable_sentiment_is_excluded_from_the_sum() {
        let mut agg = TopicAggregator::new();
        observe(&mut agg, &record("1", "A", "0.5"));
        observe(&mut agg, &record("1", "A", "n/a"));
        let (accs, _) = agg.finish();
        assert_eq!(accs[0].total, 2);
        assert_eq!(accs[0].sentiment_count, 1);
        assert_eq!(accs[0].sentiment_sum, 0.5);
    }

    #[test]
    fn textless_rows_are_counted_but_not_sampled() {
        let mut agg = TopicAggregator::new();
        let mut textless = record("1", "A", "0.5");
        textless.text_primary = None;
        observe(&mut agg, &textless);
        observe(&mut agg, &record("1", "A", "0.5"));
        let (accs, _) = agg.finish();
        assert_eq!(accs[0].total, 2);
        assert_eq!(accs[0].member_rows.len(), 1);
    }

    #[test]
    fn clean_keywords_strips_brackets_and_quotes() {
        assert_eq!(clean_keywords("['casa', 'hogar']"), "casa, hogar");
        assert_eq!(clean_keywords(" \"plain\" "), "plain");
        assert_eq!(clean_keywords(""), "");
    }
}
