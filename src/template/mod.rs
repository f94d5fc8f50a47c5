//! Single-pass template rendering.
//!
//! Templates substitute `{{.Field}}` actions (optionally dotted,
//! `{{.A.B}}`) with values from a serializable context. There are no
//! conditionals, loops or nested templates. Files whose name ends in
//! [`TEMPLATE_SUFFIX`] are rendered; anything else passes through untouched.

pub mod tree;

pub use tree::{file_meta, DataDir, FileMeta};

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Name suffix marking a file as a template.
pub const TEMPLATE_SUFFIX: &str = ".template";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\.([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)\s*$")
        .expect("action pattern is valid")
});

/// Error parsing or executing a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template `{name}` line {line}: unclosed action")]
    Unclosed { name: String, line: usize },

    #[error("template `{name}` line {line}: unsupported action `{action}`")]
    BadAction {
        name: String,
        line: usize,
        action: String,
    },

    #[error("template `{name}`: `.{field}` is not a field of the template data")]
    UnknownField { name: String, field: String },

    #[error("template `{name}`: `.{field}` is not a printable value")]
    NotPrintable { name: String, field: String },

    #[error("template `{name}` is not valid UTF-8")]
    Encoding { name: String },

    #[error("template data must serialize to a map of named fields")]
    Context(#[source] serde_json::Error),

    #[error("template data must serialize to a map of named fields, got {0}")]
    ContextShape(&'static str),
}

/// Named fields available to templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    fields: Map<String, Value>,
}

impl TemplateContext {
    /// Build a context from any struct that serializes to a map.
    pub fn from_serialize<T: Serialize>(data: &T) -> Result<Self, TemplateError> {
        match serde_json::to_value(data).map_err(TemplateError::Context)? {
            Value::Object(fields) => Ok(TemplateContext { fields }),
            Value::Null => Err(TemplateError::ContextShape("null")),
            Value::Array(_) => Err(TemplateError::ContextShape("a list")),
            _ => Err(TemplateError::ContextShape("a scalar")),
        }
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut value = self.fields.get(parts.next()?)?;
        for part in parts {
            value = value.as_object()?.get(part)?;
        }
        Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(String),
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template text.
    pub fn parse(name: &str, text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = text;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let line = line_of(text, offset + start);
            let body = &rest[start + 2..];
            let end = body.find("}}").ok_or_else(|| TemplateError::Unclosed {
                name: name.to_string(),
                line,
            })?;

            let action = &body[..end];
            let field = ACTION_RE
                .captures(action)
                .and_then(|c| c.get(1))
                .ok_or_else(|| TemplateError::BadAction {
                    name: name.to_string(),
                    line,
                    action: action.trim().to_string(),
                })?;
            segments.push(Segment::Field(field.as_str().to_string()));

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Template {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Substitute every action from `context`.
    pub fn execute(&self, context: &TemplateContext) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(field) => {
                    let value = context.lookup(field).ok_or_else(|| TemplateError::UnknownField {
                        name: self.name.clone(),
                        field: field.clone(),
                    })?;
                    match value {
                        Value::String(s) => out.push_str(s),
                        Value::Number(n) => out.push_str(&n.to_string()),
                        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
                        _ => {
                            return Err(TemplateError::NotPrintable {
                                name: self.name.clone(),
                                field: field.clone(),
                            })
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/// Render one file.
///
/// A name ending in [`TEMPLATE_SUFFIX`] loses the suffix and its contents
/// are rendered against `context`; any other file is returned unchanged.
pub fn render(
    name: &str,
    data: Vec<u8>,
    context: &TemplateContext,
) -> Result<(String, Vec<u8>), TemplateError> {
    let Some(stripped) = name.strip_suffix(TEMPLATE_SUFFIX) else {
        return Ok((name.to_string(), data));
    };

    let text = String::from_utf8(data).map_err(|_| TemplateError::Encoding {
        name: stripped.to_string(),
    })?;
    let rendered = Template::parse(stripped, &text)?.execute(context)?;
    Ok((stripped.to_string(), rendered.into_bytes()))
}
