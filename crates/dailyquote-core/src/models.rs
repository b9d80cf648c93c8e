use serde::{Deserialize, Deserializer, Serialize};

/// A single quote, as rendered and as cached
///
/// Field names on the wire follow the hitokoto API, which is also the shape
/// the script-injection provider answers with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    #[serde(rename = "hitokoto")]
    pub text: String,
    #[serde(
        rename = "from",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<String>,
    #[serde(
        rename = "from_who",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<String>,
}

impl QuoteRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
            author: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// What sits in the storage slot between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: QuoteRecord,
    /// Epoch millis of the provider response this entry came from
    pub timestamp: i64,
}

// Providers send null or numbers for missing attribution; treat those as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_uses_wire_names() {
        let record = QuoteRecord::new("A").with_source("B").with_author("C");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"hitokoto": "A", "from": "B", "from_who": "C"}));
    }

    #[test]
    fn test_record_tolerates_null_attribution() {
        let record: QuoteRecord =
            serde_json::from_value(json!({"hitokoto": "X", "from": null, "from_who": 7})).unwrap();
        assert_eq!(record, QuoteRecord::new("X"));
    }

    #[test]
    fn test_record_requires_text() {
        assert!(serde_json::from_value::<QuoteRecord>(json!({"from": "B"})).is_err());
    }
}
