//! Dependency references declared in `meta/main.yml` and `roles/requirements.yml`.
//!
//! Accepted entry shapes:
//!
//! ```yaml
//! - src: git@gitlab.example.com:infra/webserver.git   # internal source
//!   name: webserver
//! - name: community.general                           # registry role, no source
//! - role: legacy_name                                 # old-style alias of name
//! - legacy_bare_name                                  # bare string
//! - include: ./plays/roles/requirements.yml           # not followed
//! ```

use serde_yaml::Value;
use std::fmt;

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRef {
    /// `{include: <path>}`: a file inclusion, which aborts linking of the list.
    Include {
        /// Included file
        path: String,
    },
    /// `{src: <url>, name?: <name>}`: a source URL that may point at an internal project.
    Source {
        /// Repository URL as declared
        src: String,
        /// Optional role name
        name: Option<String>,
    },
    /// A reference without source, e.g. a Galaxy role: treated as external.
    Named {
        /// Role name
        name: String,
    },
}

impl DependencyRef {
    /// Interpret a YAML list entry.
    ///
    /// Fails with a description when the entry has none of `include`, `src`,
    /// `name` or `role`, or when those keys are not strings.
    pub fn from_yaml(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(name) => Ok(Self::Named { name: name.clone() }),
            Value::Mapping(_) => {
                if let Some(include) = value.get("include") {
                    return Ok(Self::Include {
                        path: string_field("include", include)?,
                    });
                }

                let name = match value.get("name").or_else(|| value.get("role")) {
                    Some(name) => Some(string_field("name", name)?),
                    None => None,
                };

                match (value.get("src"), name) {
                    (Some(src), name) => Ok(Self::Source {
                        src: string_field("src", src)?,
                        name,
                    }),
                    (None, Some(name)) => Ok(Self::Named { name }),
                    (None, None) => {
                        Err("dependency entry has neither 'src' nor 'name'".to_string())
                    }
                }
            }
            other => Err(format!("unsupported dependency entry: {other:?}")),
        }
    }

    /// Parse a dependency list in declaration order.
    ///
    /// Parsing ends after the first include directive: entries behind it are
    /// never linked, so they are not validated either.
    pub fn parse_list(values: &[Value]) -> Result<Vec<Self>, String> {
        let mut deps = Vec::with_capacity(values.len());
        for value in values {
            let dep = Self::from_yaml(value)?;
            let is_include = matches!(dep, Self::Include { .. });
            deps.push(dep);
            if is_include {
                break;
            }
        }
        Ok(deps)
    }

    /// Name used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Include { path } => path,
            Self::Source { name: Some(name), .. } => name,
            Self::Source { src, name: None } => src,
            Self::Named { name } => name,
        }
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include { path } => write!(f, "include {path}"),
            Self::Source { src, .. } => write!(f, "{src}"),
            Self::Named { name } => write!(f, "{name}"),
        }
    }
}

fn string_field(key: &str, value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("'{key}' must be a string, found {other:?}")),
    }
}
