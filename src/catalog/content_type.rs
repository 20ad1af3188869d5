/// Content type for `.json` artifacts and registry listings.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Content type for `.yaml` / `.yml` artifacts.
pub const YAML_CONTENT_TYPE: &str = "text/yaml; charset=utf-8";

/// Content type used when no rule matches.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Ordered suffix rules used when the blob store has no content type.
///
/// Rules are checked in insertion order and matched case-insensitively
/// against the end of the file name; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeTable {
    rules: Vec<(String, String)>,
    fallback: String,
}

impl ContentTypeTable {
    /// An empty table that maps everything to `fallback`.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            fallback: fallback.into(),
        }
    }

    /// Append a rule mapping a file suffix (e.g. `.json`) to a content type.
    pub fn with_rule(mut self, suffix: impl Into<String>, content_type: impl Into<String>) -> Self {
        self.rules
            .push((suffix.into().to_ascii_lowercase(), content_type.into()));
        self
    }

    /// Content type for `file`.
    pub fn lookup(&self, file: &str) -> &str {
        let file = file.to_ascii_lowercase();
        self.rules
            .iter()
            .find(|(suffix, _)| file.ends_with(suffix.as_str()))
            .map(|(_, content_type)| content_type.as_str())
            .unwrap_or(&self.fallback)
    }

    /// Pick the stored content type if present, otherwise fall back to the table.
    pub fn resolve<'a>(&'a self, stored: Option<&'a str>, file: &str) -> &'a str {
        match stored {
            Some(content_type) if !content_type.trim().is_empty() => content_type,
            _ => self.lookup(file),
        }
    }
}

impl Default for ContentTypeTable {
    fn default() -> Self {
        Self::new(OCTET_STREAM)
            .with_rule(".json", JSON_CONTENT_TYPE)
            .with_rule(".yaml", YAML_CONTENT_TYPE)
            .with_rule(".yml", YAML_CONTENT_TYPE)
    }
}
