use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata record is not a JSON object")]
    NotAnObject,
    #[error("metadata record is missing string field `{0}`")]
    MissingField(&'static str),
    #[error("metadata is not valid JSON: {0}")]
    Json(String),
}

/// One exported article's metadata record.
///
/// Field order is preserved exactly as read so that the front matter lists
/// fields in the same order as the export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct ArticleMetadata {
    fields: Map<String, Value>,
}

impl ArticleMetadata {
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, MetadataError> {
        for key in ["slug", "url"] {
            if !matches!(fields.get(key), Some(Value::String(_))) {
                return Err(MetadataError::MissingField(key));
            }
        }
        Ok(Self { fields })
    }

    pub fn slug(&self) -> &str {
        self.string_field("slug").unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.string_field("url").unwrap_or_default()
    }

    /// Remote or local thumbnail reference; empty strings count as absent.
    pub fn thumbnail(&self) -> Option<&str> {
        self.string_field("thumbnail")
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn set_thumbnail(&mut self, value: impl Into<String>) {
        self.fields
            .insert("thumbnail".to_string(), Value::String(value.into()));
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    fn string_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

impl TryFrom<Value> for ArticleMetadata {
    type Error = MetadataError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Self::from_fields(fields),
            _ => Err(MetadataError::NotAnObject),
        }
    }
}

/// Parses a JSON array of metadata records.
pub fn parse_metadata_list(json: &str) -> Result<Vec<ArticleMetadata>, MetadataError> {
    let values: Vec<Value> =
        serde_json::from_str(json).map_err(|err| MetadataError::Json(err.to_string()))?;
    values.into_iter().map(ArticleMetadata::try_from).collect()
}
