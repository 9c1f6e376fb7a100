//! Parsed metadata documents.
//!
//! A fetched YAML file is first classified into a [`MetadataDocument`]. A
//! plain string document is what GitLab returns for a symlinked file (the
//! link target), so it is kept apart from real content. Empty documents are
//! treated like missing files.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Shape of a parsed metadata file.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataDocument {
    /// Null or empty document.
    Empty,
    /// String document, most likely a symlink; carries the link target.
    Symlink(String),
    /// Mapping document (`meta/main.yml`, collection-style `requirements.yml`).
    Mapping(Value),
    /// Sequence document (classic `requirements.yml`).
    List(Vec<Value>),
    /// Bare number or boolean.
    Scalar(Value),
}

impl MetadataDocument {
    /// Classify a parsed YAML value.
    #[must_use]
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::String(s) if s.trim().is_empty() => Self::Empty,
            Value::String(s) => Self::Symlink(s.trim().to_string()),
            Value::Mapping(m) if m.is_empty() => Self::Empty,
            Value::Mapping(m) => Self::Mapping(Value::Mapping(m)),
            Value::Sequence(items) if items.is_empty() => Self::Empty,
            Value::Sequence(items) => Self::List(items),
            Value::Tagged(tagged) => Self::classify(tagged.value),
            scalar => Self::Scalar(scalar),
        }
    }

    /// Role entries of a play's `requirements.yml`.
    ///
    /// Classic files are a bare list; collection-era files are a mapping with
    /// a `roles` list (its `collections` list is not linked).
    #[must_use]
    pub fn requirement_entries(&self) -> Vec<Value> {
        match self {
            Self::List(items) => items.clone(),
            Self::Mapping(map) => match map.get("roles") {
                Some(Value::Sequence(items)) => items.clone(),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

/// Contents of a role's `meta/main.yml` that the inventory reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoleMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub galaxy_info: GalaxyInfo,
    /// Raw dependency entries, interpreted by [`DependencyRef`](super::DependencyRef).
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<Value>,
}

impl RoleMeta {
    /// Read role metadata from a mapping document.
    pub fn from_value(value: Value) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_value(value)
    }
}

/// The `galaxy_info` block; every field is optional.
///
/// A field of the wrong shape falls back to its default and is listed in
/// `ignored`. A scalar where a list is expected counts as a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawGalaxyInfo")]
pub struct GalaxyInfo {
    pub description: String,
    pub platforms: Vec<Platform>,
    pub galaxy_tags: Vec<String>,
    /// Fields dropped because of their shape.
    pub ignored: Vec<&'static str>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawGalaxyInfo {
    description: Option<Value>,
    platforms: Option<Value>,
    galaxy_tags: Option<Value>,
}

impl From<RawGalaxyInfo> for GalaxyInfo {
    fn from(raw: RawGalaxyInfo) -> Self {
        let mut ignored = Vec::new();

        let description = match raw.description {
            None | Some(Value::Null) => String::new(),
            Some(value) => scalar_to_string(&value).unwrap_or_else(|| {
                ignored.push("description");
                String::new()
            }),
        };
        let platforms = match raw.platforms {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(entries)) => entries.iter().filter_map(platform).collect(),
            Some(Value::Mapping(_) | Value::Tagged(_)) => {
                ignored.push("platforms");
                Vec::new()
            }
            Some(single) => platform(&single).into_iter().collect(),
        };
        let galaxy_tags = match raw.galaxy_tags {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(tags)) => tags.iter().filter_map(scalar_to_string).collect(),
            Some(value) => scalar_to_string(&value).map_or_else(
                || {
                    ignored.push("galaxy_tags");
                    Vec::new()
                },
                |tag| vec![tag],
            ),
        };

        Self {
            description,
            platforms,
            galaxy_tags,
            ignored,
        }
    }
}

/// Supported platform with its versions.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Platform {
    pub name: String,
    pub versions: Vec<String>,
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A `platforms` entry: `{name, versions?}` or a bare platform name.
fn platform(entry: &Value) -> Option<Platform> {
    match entry {
        Value::Mapping(_) => {
            let name = entry.get("name").and_then(scalar_to_string)?;
            let versions = match entry.get("versions") {
                Some(Value::Sequence(versions)) => {
                    versions.iter().filter_map(scalar_to_string).collect()
                }
                Some(single) => scalar_to_string(single).into_iter().collect(),
                None => Vec::new(),
            };
            Some(Platform { name, versions })
        }
        other => scalar_to_string(other).map(|name| Platform {
            name,
            versions: Vec::new(),
        }),
    }
}
