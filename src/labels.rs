use crate::classify::TopicKey;

/// Display-label table supplied by the presentation layer.
///
/// One aggregation engine serves every display language; only this table
/// changes. The Spanish strings are the source system's originals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// Prefix for labelled topics, e.g. `Tema` -> "Tema 3".
    pub topic_prefix: String,
    /// Label for the no-topic sentinel.
    pub no_topic: String,
}

impl Labels {
    pub fn spanish() -> Self {
        Labels {
            topic_prefix: "Tema".to_string(),
            no_topic: "Sin tema".to_string(),
        }
    }

    pub fn english() -> Self {
        Labels {
            topic_prefix: "Topic".to_string(),
            no_topic: "No topic".to_string(),
        }
    }

    pub fn topic_label(&self, key: &TopicKey) -> String {
        match key.raw() {
            Some(id) => format!("{} {}", self.topic_prefix, id),
            None => self.no_topic.clone(),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Labels::spanish()
    }
}
