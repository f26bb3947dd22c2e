use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use clap::ValueEnum;
use serde::Serialize;

use crate::classify::Language;
use crate::session::{SelectionDetail, Session};
use crate::summary::Dominance;

/// Output format for export (txt, csv, tsv, json).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }
}

fn dominance_label(d: Dominance) -> &'static str {
    match d {
        Dominance::German => "german",
        Dominance::Spanish => "spanish",
        Dominance::Balanced => "balanced",
    }
}

fn language_label(l: Language) -> &'static str {
    match l {
        Language::German => "german",
        Language::Spanish => "spanish",
        Language::Unknown => "unknown",
    }
}

/// Human-readable run report: global stats plus the ranked topic table.
pub fn render_report(session: &Session) -> String {
    let stats = session.stats();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Topics: {} | Rows: {} | Emails: {} | Tweets: {} | German: {} | Spanish: {}",
        stats.topic_count,
        stats.total_rows,
        stats.email_count,
        stats.tweet_count,
        stats.german_total,
        stats.spanish_total
    );
    out.push('\n');

    let label_width = session
        .summaries()
        .iter()
        .map(|s| s.display_label.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let _ = writeln!(
        out,
        "{:<5} {:<label_width$} {:>6} {:>7} {:>8} {:>10} {:>9}  {:<9} keywords",
        "rank", "topic", "total", "german", "spanish", "avg_sent", "de_share", "dominant"
    );
    for s in session.summaries() {
        let _ = writeln!(
            out,
            "{:<5} {:<label_width$} {:>6} {:>7} {:>8} {:>10.3} {:>8.1}%  {:<9} {}",
            s.rank,
            s.display_label,
            s.total,
            s.count_german,
            s.count_spanish,
            s.avg_sentiment,
            s.german_share,
            dominance_label(s.dominant_language),
            s.keywords.join(", ")
        );
    }
    out
}

/// Drill-down view for one selected topic, including the capped
/// "showing N of M" sample block.
pub fn render_selection(detail: &SelectionDetail<'_>) -> String {
    let s = detail.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{}", s.display_label);
    let _ = writeln!(out, "  total: {}", s.total);
    let _ = writeln!(out, "  german: {} ({:.1}%)", s.count_german, s.german_share);
    let _ = writeln!(
        out,
        "  spanish: {} ({:.1}%)",
        s.count_spanish,
        s.spanish_share()
    );
    let _ = writeln!(out, "  avg sentiment: {:.3}", s.avg_sentiment);
    if !s.keywords.is_empty() {
        let _ = writeln!(out, "  keywords: {}", s.keywords.join(", "));
    }
    if !s.representative.is_empty() {
        let _ = writeln!(out, "  representative: \"{}\"", s.representative);
    }
    let _ = writeln!(
        out,
        "  sample (showing {} of {}):",
        detail.sample.len(),
        detail.member_total
    );
    for row in detail.sample {
        let sentiment = match row.sentiment {
            Some(v) => format!("{v:.3}"),
            None => "n/a".to_string(),
        };
        let channel = if row.is_email { "email" } else { "tweet" };
        let _ = writeln!(
            out,
            "    [{} | {} | {}] {}",
            sentiment,
            language_label(row.language),
            channel,
            row.text
        );
    }
    out
}

/// Guard a cell against spreadsheet formula interpretation by prefixing a
/// quote when it starts with a formula trigger character.
pub fn csv_safe_cell(cell: &str) -> String {
    match cell.chars().next() {
        Some('=') | Some('+') | Some('-') | Some('@') => format!("'{cell}"),
        _ => cell.to_string(),
    }
}

#[derive(Serialize)]
struct ExportDoc<'a> {
    stats: &'a crate::summary::GlobalStats,
    topics: &'a [crate::summary::TopicSummary],
}

/// Write the run's summaries to `dir` under a timestamped filename.
/// Returns the path written.
pub fn export_summaries(
    session: &Session,
    format: ExportFormat,
    dir: &Path,
) -> std::io::Result<PathBuf> {
    let local: DateTime<Local> = Local::now();
    let filename = local
        .format(&format!(
            "%Y_%m_%d_%H_%M_%S_topic_pulse.{}",
            format.extension()
        ))
        .to_string();
    let path = dir.join(filename);

    let bytes = match format {
        ExportFormat::Txt => render_report(session).into_bytes(),
        ExportFormat::Json => {
            let doc = ExportDoc {
                stats: session.stats(),
                topics: session.summaries(),
            };
            serde_json::to_vec_pretty(&doc).map_err(std::io::Error::other)?
        }
        ExportFormat::Csv => delimited(session, b',')?,
        ExportFormat::Tsv => delimited(session, b'\t')?,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;
    file.write_all(&bytes)?;
    Ok(path)
}

fn delimited(session: &Session, delimiter: u8) -> std::io::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer
        .write_record([
            "rank",
            "topic",
            "key",
            "total",
            "german",
            "spanish",
            "avg_sentiment",
            "german_share",
            "dominant_language",
            "keywords",
            "representative",
        ])
        .map_err(std::io::Error::other)?;
    for s in session.summaries() {
        writer
            .write_record([
                s.rank.to_string(),
                csv_safe_cell(&s.display_label),
                csv_safe_cell(s.key.raw().unwrap_or("")),
                s.total.to_string(),
                s.count_german.to_string(),
                s.count_spanish.to_string(),
                format!("{:.6}", s.avg_sentiment),
                format!("{:.2}", s.german_share),
                dominance_label(s.dominant_language).to_string(),
                csv_safe_cell(&s.keywords.join(", ")),
                csv_safe_cell(&s.representative),
            ])
            .map_err(std::io::Error::other)?;
    }
    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Labels, analyze_csv};

    const CSV: &str = "\
Fuente,Lang,BERTopic_Topic,SentimentScore,Tweet_limpio
C,A,1,0.5,hola
,E,1,-0.5,que tal
c,A,2,1.0,guten tag
";

    #[test]
    fn report_contains_stats_and_ranked_rows() {
        let session = analyze_csv(CSV, &Labels::spanish());
        let report = render_report(&session);
        assert!(report.contains("Topics: 2 | Rows: 3 | Emails: 2 | Tweets: 1"));
        let tema1 = report.find("Tema 1").unwrap();
        let tema2 = report.find("Tema 2").unwrap();
        assert!(tema1 < tema2, "avg 0.0 must rank before avg 1.0");
    }

    #[test]
    fn selection_report_shows_sample_counts() {
        let mut session = analyze_csv(CSV, &Labels::spanish());
        let detail = session.select_raw("1").unwrap();
        let text = render_selection(&detail);
        assert!(text.contains("sample (showing 2 of 2)"));
        assert!(text.contains("hola"));
        assert!(text.contains("email"));
    }

    #[test]
    fn csv_safe_cell_guards_formula_prefixes() {
        assert_eq!(csv_safe_cell("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_safe_cell("-0.3"), "'-0.3");
        assert_eq!(csv_safe_cell("plain"), "plain");
    }

    #[test]
    fn json_export_round_trips_topic_count() {
        let session = analyze_csv(CSV, &Labels::english());
        let dir = tempfile::tempdir().unwrap();
        let path = export_summaries(&session, ExportFormat::Json, dir.path()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["stats"]["topic_count"], 2);
        assert_eq!(doc["topics"].as_array().unwrap().len(), 2);
        assert_eq!(doc["topics"][0]["display_label"], "Topic 1");
    }
}
