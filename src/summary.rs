use serde::Serialize;

use crate::aggregate::{RunningTotals, TopicAccumulator};
use crate::classify::{ClassifiedRow, TopicKey};
use crate::labels::Labels;

/// Which tracked language dominates a topic. Exact ties, including 0-0,
/// are `Balanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dominance {
    German,
    Spanish,
    Balanced,
}

/// Immutable per-topic summary point produced by the finalize pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
    pub key: TopicKey,
    pub display_label: String,
    /// 1-based display position assigned by [`rank`]; 0 until then.
    pub rank: usize,
    pub total: u64,
    pub count_german: u64,
    pub count_spanish: u64,
    /// Mean of the parseable sentiment scores, or 0 when there are none
    /// (defined fallback, not an error).
    pub avg_sentiment: f64,
    /// German rows as a percentage of the topic total, in [0, 100].
    pub german_share: f64,
    pub dominant_language: Dominance,
    pub keywords: Vec<String>,
    pub representative: String,
    #[serde(skip)]
    pub member_rows: Vec<ClassifiedRow>,
}

impl TopicSummary {
    /// Spanish complement of [`german_share`](Self::german_share).
    pub fn spanish_share(&self) -> f64 {
        if self.total > 0 {
            self.count_spanish as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Whole-run counts, independent of topic grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalStats {
    pub topic_count: usize,
    pub total_rows: u64,
    pub email_count: u64,
    pub tweet_count: u64,
    pub german_total: u64,
    pub spanish_total: u64,
}

/// Convert accumulators (in first-seen order) into summary points plus the
/// global stats. Pure; one pass.
pub fn finalize(
    accumulators: Vec<TopicAccumulator>,
    totals: RunningTotals,
    labels: &Labels,
) -> (Vec<TopicSummary>, GlobalStats) {
    let stats = GlobalStats {
        topic_count: accumulators.len(),
        total_rows: totals.total_rows,
        email_count: totals.email_count,
        tweet_count: totals.tweet_count,
        german_total: totals.german_total,
        spanish_total: totals.spanish_total,
    };

    let summaries = accumulators
        .into_iter()
        .map(|acc| {
            let avg_sentiment = if acc.sentiment_count > 0 {
                acc.sentiment_sum / acc.sentiment_count as f64
            } else {
                0.0
            };
            let german_share = if acc.total > 0 {
                acc.count_german as f64 / acc.total as f64 * 100.0
            } else {
                0.0
            };
            let dominant_language = if acc.count_german > acc.count_spanish {
                Dominance::German
            } else if acc.count_spanish > acc.count_german {
                Dominance::Spanish
            } else {
                Dominance::Balanced
            };
            TopicSummary {
                display_label: labels.topic_label(&acc.key),
                key: acc.key,
                rank: 0,
                total: acc.total,
                count_german: acc.count_german,
                count_spanish: acc.count_spanish,
                avg_sentiment,
                german_share,
                dominant_language,
                keywords: split_keywords(&acc.keywords),
                representative: acc.representative,
                member_rows: acc.member_rows,
            }
        })
        .collect();

    (summaries, stats)
}

/// Sort summaries by average sentiment ascending and assign 1-based display
/// positions. The sort is stable, so equal averages keep their first-seen
/// relative order.
pub fn rank(summaries: &mut [TopicSummary]) {
    summaries.sort_by(|a, b| a.avg_sentiment.total_cmp(&b.avg_sentiment));
    for (index, summary) in summaries.iter_mut().enumerate() {
        summary.rank = index + 1;
    }
}

fn split_keywords(cleaned: &str) -> Vec<String> {
    cleaned
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::TopicAggregator;
    use crate::classify::{RawRecord, classify};

    fn run(rows: &[RawRecord]) -> (Vec<TopicSummary>, GlobalStats) {
        let mut agg = TopicAggregator::new();
        for raw in rows {
            agg.observe(classify(raw), raw);
        }
        let (accs, totals) = agg.finish();
        finalize(accs, totals, &Labels::spanish())
    }

    fn record(topic: &str, lang: &str, sentiment: &str) -> RawRecord {
        RawRecord {
            language: Some(lang.into()),
            topic: Some(topic.into()),
            sentiment: Some(sentiment.into()),
            text_primary: Some("t".into()),
            ..RawRecord::default()
        }
    }

    #[test]
    fn average_falls_back_to_zero_without_parseable_sentiment() {
        let (summaries, _) = run(&[record("1", "A", "n/a"), record("1", "A", "")]);
        assert_eq!(summaries[0].avg_sentiment, 0.0);
        assert_eq!(summaries[0].total, 2);
    }

    #[test]
    fn shares_and_dominance() {
        let (summaries, _) = run(&[
            record("1", "A", "0.5"),
            record("1", "A", "0.5"),
            record("1", "E", "0.5"),
            record("1", "X", "0.5"),
        ]);
        let s = &summaries[0];
        assert_eq!(s.german_share, 50.0);
        assert_eq!(s.spanish_share(), 25.0);
        assert_eq!(s.dominant_language, Dominance::German);
    }

    #[test]
    fn exact_tie_is_balanced_including_zero_zero() {
        let (summaries, _) = run(&[
            record("1", "A", "0.1"),
            record("1", "E", "0.1"),
            record("2", "X", "0.1"),
        ]);
        assert_eq!(summaries[0].dominant_language, Dominance::Balanced);
        assert_eq!(summaries[1].dominant_language, Dominance::Balanced);
    }

    #[test]
    fn rank_sorts_ascending_and_keeps_ties_in_first_seen_order() {
        let (mut summaries, _) = run(&[
            record("hi", "A", "0.9"),
            record("tie-a", "A", "0.2"),
            record("tie-b", "A", "0.2"),
            record("lo", "A", "-0.4"),
        ]);
        rank(&mut summaries);
        let keys: Vec<_> = summaries.iter().filter_map(|s| s.key.raw()).collect();
        assert_eq!(keys, vec!["lo", "tie-a", "tie-b", "hi"]);
        let ranks: Vec<_> = summaries.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn totals_are_conserved_across_topics() {
        let rows = [
            record("1", "A", "0.5"),
            record("2", "E", "0.5"),
            record("2", "X", "bad"),
            RawRecord::default(),
        ];
        let (summaries, stats) = run(&rows);
        let per_topic: u64 = summaries.iter().map(|s| s.total).sum();
        assert_eq!(per_topic, stats.total_rows);
        assert_eq!(stats.email_count + stats.tweet_count, stats.total_rows);
        for s in &summaries {
            assert!(s.count_german + s.count_spanish <= s.total);
        }
    }

    #[test]
    fn keywords_split_on_commas() {
        let mut raw = record("1", "A", "0.5");
        raw.keywords = Some("['casa', 'hogar', '']".into());
        let (summaries, _) = run(std::slice::from_ref(&raw));
        assert_eq!(summaries[0].keywords, vec!["casa", "hogar"]);
    }

    #[test]
    fn labels_flow_through_the_table() {
        let (summaries, _) = run(&[record("3", "A", "0.5"), RawRecord::default()]);
        assert_eq!(summaries[0].display_label, "Tema 3");
        assert_eq!(summaries[1].display_label, "Sin tema");
    }
}
