//! Context manipulations.
//!
//! A [`ContextManipulation`] is a pure `Context -> Context` transform. They
//! compose with [`ContextManipulation::then`]; order matters, since later
//! manipulations see the fields written by earlier ones.
//!
//! Manipulations never fail. A missing field either leaves the context
//! untouched or is replaced by a documented fallback, and deferred fields are
//! transformed lazily.

use std::{fmt, fmt::Write as _, path::Path, sync::Arc};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

use crate::context::{Context, FieldValue};

type Transform = dyn Fn(Context) -> Context + Send + Sync;

/// A composable transform over a [`Context`].
#[derive(Clone)]
pub struct ContextManipulation {
    transform: Arc<Transform>,
}

impl ContextManipulation {
    /// Wrap a transform.
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(Context) -> Context + Send + Sync + 'static,
    {
        Self {
            transform: Arc::new(transform),
        }
    }

    /// The manipulation that returns its input unchanged.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(|context| context)
    }

    /// Apply the manipulation.
    pub fn apply(&self, context: Context) -> Context {
        (self.transform)(context)
    }

    /// Run `self`, then `next`.
    #[must_use]
    pub fn then(&self, next: &ContextManipulation) -> Self {
        let first = self.clone();
        let next = next.clone();
        Self::new(move |context| next.apply(first.apply(context)))
    }

    /// Chain manipulations in order, starting from the identity.
    pub fn compose<I>(manipulations: I) -> Self
    where
        I: IntoIterator<Item = ContextManipulation>,
    {
        manipulations
            .into_iter()
            .fold(Self::identity(), |acc, next| acc.then(&next))
    }
}

impl Default for ContextManipulation {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for ContextManipulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContextManipulation")
    }
}

/// Set `dst` to `f(src)` when `src` exists.
pub fn render_value<F>(src: impl Into<String>, dst: impl Into<String>, f: F) -> ContextManipulation
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    let src = src.into();
    let dst = dst.into();
    let f = Arc::new(f);
    ContextManipulation::new(move |mut context| {
        if let Some(value) = context.get(&src) {
            let f = Arc::clone(&f);
            let derived = value.map(move |s| f(s));
            context.insert(dst.clone(), derived);
        }
        context
    })
}

/// Replace the value of `key` with `f(value)` when it exists.
pub fn change_value<F>(key: impl Into<String>, f: F) -> ContextManipulation
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    let key = key.into();
    render_value(key.clone(), key, f)
}

/// Copy `src` to `dst` when `src` exists.
pub fn copy_value(src: impl Into<String>, dst: impl Into<String>) -> ContextManipulation {
    render_value(src, dst, str::to_string)
}

/// Remove `key` from the context.
pub fn ignore(key: impl Into<String>) -> ContextManipulation {
    let key = key.into();
    ContextManipulation::new(move |mut context| {
        context.remove(&key);
        context
    })
}

/// Set `key` to `default` unless it is already present.
pub fn default_value(key: impl Into<String>, default: impl Into<String>) -> ContextManipulation {
    let key = key.into();
    let default = default.into();
    ContextManipulation::new(move |mut context| {
        if !context.contains(&key) {
            context.insert(key.clone(), default.clone());
        }
        context
    })
}

/// Reformat the date stored in `key` with `format`.
///
/// A value that is not a recognised date becomes `default`. An absent field
/// stays absent.
pub fn format_date(
    key: impl Into<String>,
    format: impl Into<String>,
    default: impl Into<String>,
) -> ContextManipulation {
    let key = key.into();
    let format: Arc<str> = Arc::from(format.into());
    let default: Arc<str> = Arc::from(default.into());
    change_value(key, move |raw| {
        reformat_date(raw, &format).unwrap_or_else(|| default.to_string())
    })
}

/// Reformat the date stored in `key` with `format`, using `default` when the
/// field is absent or not a date.
pub fn render_date(
    key: impl Into<String>,
    format: impl Into<String>,
    default: impl Into<String>,
) -> ContextManipulation {
    let key = key.into();
    let default = default.into();
    format_date(key.clone(), format, default.clone()).then(&default_value(key, default))
}

/// Derive a date from the `YYYY-MM-DD` prefix of the file name in `path` and
/// store it formatted in `key`, or `default` when there is none.
pub fn render_date_from_path(
    key: impl Into<String>,
    format: impl Into<String>,
    default: impl Into<String>,
) -> ContextManipulation {
    let key = key.into();
    let format: Arc<str> = Arc::from(format.into());
    let default: Arc<str> = Arc::from(default.into());
    ContextManipulation::new(move |mut context| {
        let value = match context.get("path") {
            Some(path) => {
                let format = Arc::clone(&format);
                let default = Arc::clone(&default);
                path.map(move |path| {
                    date_from_file_name(path)
                        .and_then(|date| format_utc(&date, &format))
                        .unwrap_or_else(|| default.to_string())
                })
            }
            None => FieldValue::literal(default.to_string()),
        };
        context.insert(key.clone(), value);
        context
    })
}

/// Replace the extension of the `url` field.
pub fn change_extension(extension: impl Into<String>) -> ContextManipulation {
    let extension = extension.into();
    change_value("url", move |url| replace_extension(url, &extension))
}

/// Strip leading slashes from the `url` field, making it relative to the
/// site root.
pub fn relative_url() -> ContextManipulation {
    change_value("url", |url| url.trim_start_matches('/').to_string())
}

fn replace_extension(url: &str, extension: &str) -> String {
    let file_start = url.rfind('/').map_or(0, |i| i + 1);
    let stem = match url[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &url[..file_start + dot],
        _ => url,
    };
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

fn reformat_date(raw: &str, format: &str) -> Option<String> {
    let date = parse_date(raw);
    if date.is_none() {
        warn!(value = raw, "unrecognised date");
    }
    format_utc(&date?, format)
}

/// Parse the date formats accepted in content fields.
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn date_from_file_name(path: &str) -> Option<DateTime<Utc>> {
    let name = Path::new(path).file_name()?.to_str()?;
    let prefix = name.get(..10)?;
    let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

// An invalid strftime string makes `Display` fail instead of panicking here.
fn format_utc(date: &DateTime<Utc>, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}
