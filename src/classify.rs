use csv::StringRecord;
use serde::Serialize;

/// One row of the source table, fields of interest only, untyped.
///
/// Every field is optional: a missing column, a short row, or an empty cell
/// all land as `None`. Construction never fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub channel: Option<String>,
    pub language: Option<String>,
    pub topic: Option<String>,
    pub sentiment: Option<String>,
    pub text_primary: Option<String>,
    pub text_fallback: Option<String>,
    pub keywords: Option<String>,
    pub representative: Option<String>,
}

/// Tracked row languages. Anything other than the two indicator codes is
/// `Unknown`; such rows still count toward topic totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Language {
    German,
    Spanish,
    Unknown,
}

/// Topic identifier exactly as supplied by the source table.
///
/// Equality is byte-wise on the raw cell text: no trimming, no numeric
/// normalization, so `"0"` and `"0.0"` are distinct topics. Rows with no
/// topic cell share the `Unassigned` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TopicKey {
    Id(String),
    Unassigned,
}

impl TopicKey {
    pub fn raw(&self) -> Option<&str> {
        match self {
            TopicKey::Id(s) => Some(s),
            TopicKey::Unassigned => None,
        }
    }
}

/// Typed view of one record, derived once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRow {
    pub is_email: bool,
    pub language: Language,
    /// Parsed sentiment, or `None` when the cell is absent or not numeric.
    pub sentiment: Option<f64>,
    pub text: String,
    #[serde(skip)]
    pub key: TopicKey,
}

impl ClassifiedRow {
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Column positions resolved from the header row by exact name.
///
/// A name that never appears simply leaves every row's field absent; the
/// defaulting rules in [`classify`] take it from there.
#[derive(Debug, Default)]
pub struct Columns {
    channel: Option<usize>,
    language: Option<usize>,
    topic: Option<usize>,
    sentiment: Option<usize>,
    text_primary: Option<usize>,
    text_fallback: Option<usize>,
    keywords: Option<usize>,
    representative: Option<usize>,
}

impl Columns {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Columns {
            channel: find("Fuente"),
            language: find("Lang"),
            topic: find("BERTopic_Topic"),
            sentiment: find("SentimentScore"),
            text_primary: find("Tweet_limpio"),
            text_fallback: find("Procesado"),
            keywords: find("BERTopic_Translated_Keywords"),
            representative: find("BERTopic_Representative_Tweet_En"),
        }
    }

    /// Pull the fields of interest out of one data row. Short rows and empty
    /// cells yield `None`.
    pub fn raw_record(&self, record: &StringRecord) -> RawRecord {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        RawRecord {
            channel: cell(self.channel),
            language: cell(self.language),
            topic: cell(self.topic),
            sentiment: cell(self.sentiment),
            text_primary: cell(self.text_primary),
            text_fallback: cell(self.text_fallback),
            keywords: cell(self.keywords),
            representative: cell(self.representative),
        }
    }
}

/// Normalize one raw record into a typed row. Total: every record yields
/// exactly one row, bad cells fall back per field.
///
/// - channel `"C"` (trimmed, case-insensitive) is email, anything else a tweet
/// - language `"A"` is German, `"E"` Spanish, anything else Unknown
/// - sentiment must parse to a finite number, otherwise it is missing
/// - text prefers the primary field, then the fallback, then empty
pub fn classify(raw: &RawRecord) -> ClassifiedRow {
    let is_email = raw
        .channel
        .as_deref()
        .map(|s| s.trim().to_uppercase() == "C")
        .unwrap_or(false);

    let language = match raw.language.as_deref().map(|s| s.trim().to_uppercase()) {
        Some(code) if code == "A" => Language::German,
        Some(code) if code == "E" => Language::Spanish,
        _ => Language::Unknown,
    };

    let sentiment = raw
        .sentiment
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite());

    let text = raw
        .text_primary
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(raw.text_fallback.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or("")
        .to_string();

    let key = match raw.topic.as_deref().filter(|s| !s.is_empty()) {
        Some(id) => TopicKey::Id(id.to_string()),
        None => TopicKey::Unassigned,
    };

    ClassifiedRow {
        is_email,
        language,
        sentiment,
        text,
        key,
    }
}
