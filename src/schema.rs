//! Field mapping tables: `(source name, source type, target name, target type)` tuples
//! declared once per pipeline configuration.

use crate::error::PipelineError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Declared type of a mapped column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetType {
    String,
    Int,
    Decimal,
    Bool,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetType::String => "string",
            TargetType::Int => "int",
            TargetType::Decimal => "decimal",
            TargetType::Bool => "bool",
        };
        f.write_str(s)
    }
}

impl FromStr for TargetType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(TargetType::String),
            "int" | "integer" | "long" | "bigint" => Ok(TargetType::Int),
            "decimal" | "double" | "float" => Ok(TargetType::Decimal),
            "bool" | "boolean" => Ok(TargetType::Bool),
            other => Err(format!("unknown target type `{other}`")),
        }
    }
}

/// One mapping tuple. `required` fields reject uncastable values instead of
/// falling back to the zero value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub source: String,
    pub source_type: TargetType,
    pub target: String,
    pub target_type: TargetType,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(
        source: impl Into<String>,
        source_type: TargetType,
        target: impl Into<String>,
        target_type: TargetType,
    ) -> Self {
        Self {
            source: source.into(),
            source_type,
            target: target.into(),
            target_type,
            required: false,
        }
    }

    /// Same-name string passthrough.
    pub fn passthrough(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), TargetType::String, name, TargetType::String)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Ordered list of field specs with unique target names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMapping {
    specs: Vec<FieldSpec>,
}

impl FieldMapping {
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self, PipelineError> {
        let mut seen = HashSet::with_capacity(specs.len());
        for spec in &specs {
            if !seen.insert(spec.target.as_str()) {
                return Err(PipelineError::DuplicateTarget(spec.target.clone()));
            }
        }
        Ok(Self { specs })
    }

    /// String passthrough for every column of an arbitrary header row.
    pub fn passthrough<I, S>(columns: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns.into_iter().map(FieldSpec::passthrough).collect())
    }

    /// View used to read files this mapping has already produced: each target
    /// column maps onto itself with its declared target type.
    pub fn staged(&self) -> Self {
        let specs = self
            .specs
            .iter()
            .map(|s| FieldSpec {
                source: s.target.clone(),
                source_type: TargetType::String,
                target: s.target.clone(),
                target_type: s.target_type,
                required: s.required,
            })
            .collect();
        Self { specs }
    }

    /// Staged view restricted to an actual header row, in header order. Columns this
    /// mapping does not declare pass through as strings.
    pub fn staged_for_header(&self, headers: &[String]) -> Result<Self, PipelineError> {
        let staged = self.staged();
        let specs = headers
            .iter()
            .map(|h| {
                staged
                    .specs
                    .iter()
                    .find(|s| &s.target == h)
                    .cloned()
                    .unwrap_or_else(|| FieldSpec::passthrough(h.clone()))
            })
            .collect();
        Self::new(specs)
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn target_names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.target.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Staging mapping for subreddit submissions.
    pub fn reddit_default() -> Self {
        use TargetType::{Decimal, Int, String as Text};
        let specs = vec![
            FieldSpec::new("subreddit", Text, "subreddit", Text),
            FieldSpec::new("selftext", Text, "selftext", Text),
            FieldSpec::new("title", Text, "title", Text),
            FieldSpec::new("score", Text, "score", Int).required(),
            FieldSpec::new("num_comments", Text, "num_comments", Int).required(),
            FieldSpec::new("upvote_ratio", Text, "upvote_ratio", Decimal).required(),
            FieldSpec::new("link_flair_text", Text, "link_flair_text", Text),
            FieldSpec::new("total_awards_received", Text, "total_awards_received", Int).required(),
            FieldSpec::new("is_original_content", Text, "is_original_content", Text),
            FieldSpec::new("link_flair_type", Text, "link_flair_type", Text),
            FieldSpec::new("is_self", Text, "is_self", Text),
            FieldSpec::new("ups", Text, "ups", Int).required(),
            FieldSpec::new("downs", Text, "downs", Int).required(),
        ];
        Self { specs }
    }
}

/// Columns removed before the mapping is applied.
pub fn reddit_drop_fields() -> Vec<String> {
    [
        "author_fullname",
        "thumbnail",
        "domain",
        "link_flair_richtext",
        "allow_live_comments",
        "thumbnail_height",
        "thumbnail_width",
        "created_utc",
        "author",
        "url",
        "permalink",
        "subreddit_subscribers",
        "is_video",
        "pwls",
        "gilded",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
