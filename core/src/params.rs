//! Parameter encoding: typed values to query pairs and path segments.
//!
//! Query keys and values, and path segments, are percent-encoded with HTML
//! form rules except that a space becomes `%20` rather than `+`. List values
//! follow the `CollectionFormat` declared for the field; the media server is
//! not consistent about this, so the format is chosen per field and never
//! normalized.

use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use uuid::Uuid;

use crate::error::TemplateError;

/// Everything except ASCII alphanumerics and `-._*` is escaped.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'*');

/// An encoded query pair, ready to be joined into a query string.
pub type QueryPair = (String, String);

pub fn url_encode(value: &str) -> String {
    utf8_percent_encode(value, FORM_VALUE).to_string()
}

/// A value that can be sent as a query parameter or path segment.
pub trait ParamValue {
    /// The unencoded wire form of the value.
    fn to_param(&self) -> String;
}

impl ParamValue for str {
    fn to_param(&self) -> String {
        self.to_string()
    }
}

impl ParamValue for String {
    fn to_param(&self) -> String {
        self.clone()
    }
}

impl ParamValue for Uuid {
    fn to_param(&self) -> String {
        self.hyphenated().to_string()
    }
}

impl ParamValue for DateTime<Utc> {
    fn to_param(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

macro_rules! display_param {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ParamValue for $ty {
                fn to_param(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

display_param!(bool, i32, i64, u32, u64, f32, f64);

impl<T: ParamValue + ?Sized> ParamValue for &T {
    fn to_param(&self) -> String {
        (**self).to_param()
    }
}

/// How a list parameter is laid out in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionFormat {
    /// `key=a&key=b`
    Multi,
    /// `key=a,b`
    Csv,
    /// `key=a b`
    Ssv,
    /// `key=a\tb`
    Tsv,
    /// `key=a|b`
    Pipes,
}

impl CollectionFormat {
    fn delimiter(self) -> Option<&'static str> {
        match self {
            CollectionFormat::Multi => None,
            CollectionFormat::Csv => Some(","),
            CollectionFormat::Ssv => Some(" "),
            CollectionFormat::Tsv => Some("\t"),
            CollectionFormat::Pipes => Some("|"),
        }
    }
}

/// Encode an optional scalar. `None` contributes no pair.
pub fn scalar_pairs<T: ParamValue + ?Sized>(name: &str, value: Option<&T>) -> Vec<QueryPair> {
    match value {
        Some(value) => vec![(url_encode(name), url_encode(&value.to_param()))],
        None => Vec::new(),
    }
}

/// Encode a list. An empty list contributes no pair.
pub fn collection_pairs<T: ParamValue>(
    name: &str,
    values: &[T],
    format: CollectionFormat,
) -> Vec<QueryPair> {
    if values.is_empty() {
        return Vec::new();
    }
    let key = url_encode(name);
    match format.delimiter() {
        None => values
            .iter()
            .map(|value| (key.clone(), url_encode(&value.to_param())))
            .collect(),
        Some(delimiter) => {
            let joined = values
                .iter()
                .map(ParamValue::to_param)
                .collect::<Vec<_>>()
                .join(delimiter);
            vec![(key, url_encode(&joined))]
        }
    }
}

pub fn join_query(pairs: &[QueryPair]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Substitute `{name}` placeholders in `template` with encoded values.
///
/// Fails if a parameter has no placeholder or a placeholder is left over.
pub fn expand_path(template: &str, params: &[(&str, String)]) -> Result<String, TemplateError> {
    let mut path = template.to_string();
    for (name, value) in params {
        let placeholder = format!("{{{name}}}");
        if !path.contains(&placeholder) {
            return Err(TemplateError::UnknownParameter(name.to_string()));
        }
        path = path.replace(&placeholder, &url_encode(value));
    }
    if let Some(start) = path.find('{') {
        let rest = &path[start + 1..];
        let name = rest.split('}').next().unwrap_or(rest);
        return Err(TemplateError::Unresolved(name.to_string()));
    }
    Ok(path)
}
