#![forbid(unsafe_code)]
//! # topic_pulse
//!
//! Aggregation engine for social-media/email records tagged with a source
//! channel, a language code, a pre-computed topic cluster id and a
//! pre-computed sentiment score. One pass over the input produces a ranked
//! summary point per topic plus global counts; a session object then serves
//! drill-down selections for the presentation layer.
//!
//! Topic clustering, keyword extraction and sentiment scoring all happen
//! upstream; this crate only aggregates what arrives in the table.
//!
//! ```no_run
//! use topic_pulse::{Labels, analyze_csv, ingest::read_source};
//!
//! let text = read_source("dataset.csv")?;
//! let mut session = analyze_csv(&text, &Labels::spanish());
//! for topic in session.summaries() {
//!     println!("{} avg={:.3}", topic.display_label, topic.avg_sentiment);
//! }
//! if let Some(detail) = session.select_raw("3") {
//!     println!("showing {} of {}", detail.sample.len(), detail.member_total);
//! }
//! # Ok::<(), topic_pulse::ingest::IngestError>(())
//! ```

pub mod aggregate;
pub mod classify;
pub mod export;
pub mod ingest;
pub mod labels;
pub mod session;
pub mod summary;

use log::{debug, warn};

pub use classify::{ClassifiedRow, Language, RawRecord, TopicKey, classify};
pub use export::{ExportFormat, export_summaries, render_report, render_selection};
pub use ingest::{IngestError, read_source};
pub use labels::Labels;
pub use session::{SAMPLE_LIMIT, SelectionDetail, Session};
pub use summary::{Dominance, GlobalStats, TopicSummary};

use aggregate::TopicAggregator;
use classify::Columns;

/// Run the full pipeline over one comma-delimited text blob.
pub fn analyze_csv(text: &str, labels: &Labels) -> Session {
    analyze_csv_with(text, labels, b',')
}

/// Run the full pipeline with an explicit field delimiter.
///
/// Classification is total, so this cannot fail: missing columns, short
/// rows and unparseable cells all resolve through the per-field defaults.
/// The rare record the csv reader cannot decode at all is logged and
/// skipped, never fatal.
pub fn analyze_csv_with(text: &str, labels: &Labels, delimiter: u8) -> Session {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = match reader.headers() {
        Ok(headers) => Columns::from_headers(headers),
        Err(e) => {
            warn!("Could not read header row, treating all columns as absent: {e}");
            Columns::default()
        }
    };

    let mut aggregator = TopicAggregator::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let raw = columns.raw_record(&record);
                aggregator.observe(classify(&raw), &raw);
            }
            Err(e) => warn!("Skipping unreadable record: {e}"),
        }
    }

    debug!(
        "Aggregation pass complete - topics={}",
        aggregator.topic_count()
    );

    let (accumulators, totals) = aggregator.finish();
    let (mut summaries, stats) = summary::finalize(accumulators, totals, labels);
    summary::rank(&mut summaries);
    Session::new(summaries, stats)
}
