//! Front matter parsing for content files.
//!
//! Front matter is flattened to an ordered list of string fields so that it
//! can be fed straight into a rendering context.

use std::path::Path;

use tracing::warn;

use crate::error::{CoreError, Result};

/// Front matter metadata of a content file, as ordered string fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: Vec<(String, String)>,
}

impl Frontmatter {
    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// All fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Whether no field was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the front matter, yielding its fields.
    pub fn into_fields(self) -> Vec<(String, String)> {
        self.fields
    }

    fn push(&mut self, key: String, value: String) {
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| *name == key) {
            slot.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }
}

/// Delimiter types for front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML front matter delimited by `---`.
    Yaml,
    /// TOML front matter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split content into front matter and body.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.trim_start();

    let format = if content.starts_with("---") {
        FrontmatterFormat::Yaml
    } else if content.starts_with("+++") {
        FrontmatterFormat::Toml
    } else {
        return None;
    };

    let delimiter = format.delimiter();

    // The closing delimiter must start a line.
    let after_first = &content[delimiter.len()..];
    let closing_pos = after_first.find(&format!("\n{delimiter}"))?;

    let frontmatter = after_first[..closing_pos].trim();
    let body = after_first[closing_pos + 1 + delimiter.len()..].trim_start();

    Some((format, frontmatter, body))
}

/// Parse front matter from a string, returning the fields and the body.
pub fn parse_frontmatter(content: &str, path: &Path) -> Result<(Frontmatter, String)> {
    let Some((format, fm_str, body)) = split_frontmatter(content) else {
        return Ok((Frontmatter::default(), content.to_string()));
    };

    let frontmatter = match format {
        FrontmatterFormat::Yaml => parse_yaml(fm_str, path)?,
        FrontmatterFormat::Toml => parse_toml(fm_str, path)?,
    };

    Ok((frontmatter, body.to_string()))
}

fn parse_yaml(source: &str, path: &Path) -> Result<Frontmatter> {
    let mut frontmatter = Frontmatter::default();
    if source.is_empty() {
        return Ok(frontmatter);
    }

    let mapping: serde_yaml::Mapping =
        serde_yaml::from_str(source).map_err(|e| CoreError::frontmatter(path, e.to_string()))?;

    for (key, value) in mapping {
        let Some(key) = yaml_scalar(&key) else {
            return Err(CoreError::frontmatter(path, "field names must be scalars"));
        };
        check_field_name(&key, path)?;
        match yaml_value(&value) {
            Some(value) => frontmatter.push(key, value),
            None => warn!(path = %path.display(), field = %key, "skipping nested front matter field"),
        }
    }

    Ok(frontmatter)
}

fn check_field_name(key: &str, path: &Path) -> Result<()> {
    if key.trim().is_empty() {
        return Err(CoreError::frontmatter(path, "field names must not be empty"));
    }
    Ok(())
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}

fn yaml_value(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Sequence(items) => {
            let items: Option<Vec<_>> = items.iter().map(yaml_scalar).collect();
            items.map(|items| items.join(", "))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_value(&tagged.value),
        other => yaml_scalar(other),
    }
}

fn parse_toml(source: &str, path: &Path) -> Result<Frontmatter> {
    let table: toml::Table =
        toml::from_str(source).map_err(|e| CoreError::frontmatter(path, e.to_string()))?;

    let mut frontmatter = Frontmatter::default();
    for (key, value) in table {
        check_field_name(&key, path)?;
        match toml_value(&value) {
            Some(value) => frontmatter.push(key, value),
            None => warn!(path = %path.display(), field = %key, "skipping nested front matter field"),
        }
    }

    Ok(frontmatter)
}

fn toml_value(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(dt) => Some(dt.to_string()),
        toml::Value::Array(items) => {
            let items: Option<Vec<_>> = items
                .iter()
                .map(|item| match item {
                    toml::Value::Array(_) | toml::Value::Table(_) => None,
                    scalar => toml_value(scalar),
                })
                .collect();
            items.map(|items| items.join(", "))
        }
        toml::Value::Table(_) => None,
    }
}
