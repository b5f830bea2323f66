//! Expression trees described as YAML documents.
//!
//! A node is either a connective, a single-key mapping `and:` / `or:` holding
//! exactly two child nodes, or a constraint mapping with `selector`,
//! `comparison` and `argument` keys:
//!
//! ```yaml
//! and:
//!   - { selector: age, comparison: gt, argument: { int: 5 } }
//!   - or:
//!       - { selector: city, comparison: "==", argument: NYC }
//!       - { selector: city, comparison: "==", argument: LA }
//! ```
//!
//! Plain scalars pick the natural kind (`true` is a boolean, `5` an int, `5.0`
//! a double, anything else text). A single-key mapping such as `{ long: 5 }`
//! or `{ calendar: "2013-01-04T10:00:00+01:00" }` selects the kind explicitly.

use crate::query::{Argument, Comparison, Node};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid tree at {path}: {message}")]
    Invalid { path: String, message: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstraintDoc {
    selector: String,
    comparison: String,
    argument: Value,
}

pub fn load_tree(path: &Path) -> Result<Node, TreeError> {
    let content = fs::read_to_string(path).map_err(|source| TreeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "read tree document");
    parse_tree(&content)
}

pub fn parse_tree(content: &str) -> Result<Node, TreeError> {
    let doc: Value = serde_yaml::from_str(content)?;
    node_from_yaml(&doc, "root")
}

fn node_from_yaml(value: &Value, path: &str) -> Result<Node, TreeError> {
    let Some(mapping) = value.as_mapping() else {
        return Err(invalid(path, "expected a mapping"));
    };

    for key in ["and", "or"] {
        let Some(children) = mapping.get(key) else {
            continue;
        };
        if mapping.len() != 1 {
            return Err(invalid(path, format!("'{key}' must be the only key of its node")));
        }
        let (left, right) = children_from_yaml(children, &format!("{path}.{key}"))?;
        return Ok(match key {
            "and" => Node::and(left, right),
            _ => Node::or(left, right),
        });
    }

    let doc: ConstraintDoc =
        serde_yaml::from_value(value.clone()).map_err(|e| invalid(path, e.to_string()))?;
    if doc.selector.is_empty() {
        return Err(invalid(path, "selector must not be empty"));
    }
    let comparison: Comparison = doc
        .comparison
        .parse()
        .map_err(|e| invalid(path, format!("{e}")))?;
    let argument = argument_from_yaml(&doc.argument, &format!("{path}.argument"))?;

    Ok(Node::Constraint {
        selector: doc.selector,
        comparison,
        argument,
    })
}

fn children_from_yaml(value: &Value, path: &str) -> Result<(Node, Node), TreeError> {
    match value.as_sequence().map(Vec::as_slice) {
        Some([left, right]) => Ok((
            node_from_yaml(left, &format!("{path}[0]"))?,
            node_from_yaml(right, &format!("{path}[1]"))?,
        )),
        _ => Err(invalid(path, "expected a sequence of exactly two nodes")),
    }
}

fn argument_from_yaml(value: &Value, path: &str) -> Result<Argument, TreeError> {
    match value {
        Value::Bool(b) => Ok(Argument::Bool(*b)),
        Value::Number(n) if n.is_f64() => Ok(Argument::Double(n.as_f64().unwrap_or_default())),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i32::try_from(i).map_or(Argument::Long(i), Argument::Int)),
            None => Err(invalid(path, format!("{n} does not fit a 64-bit integer"))),
        },
        Value::String(s) => Ok(Argument::Text(s.clone())),
        Value::Mapping(m) if m.len() == 1 => {
            let Some((kind, inner)) = m.iter().next() else {
                return Err(invalid(path, "empty argument mapping"));
            };
            let Some(kind) = kind.as_str() else {
                return Err(invalid(path, "argument kind must be a string"));
            };
            typed_argument(kind, inner, &format!("{path}.{kind}"))
        }
        _ => Err(invalid(
            path,
            "expected a scalar or a single-key mapping naming the argument kind",
        )),
    }
}

fn typed_argument(kind: &str, value: &Value, path: &str) -> Result<Argument, TreeError> {
    match kind {
        "bool" => value
            .as_bool()
            .map(Argument::Bool)
            .ok_or_else(|| invalid(path, "expected true or false")),
        "byte" => integer(value, path).map(Argument::Byte),
        "short" => integer(value, path).map(Argument::Short),
        "int" => integer(value, path).map(Argument::Int),
        "long" => integer(value, path).map(Argument::Long),
        "float" => decimal(value, path).map(|f| Argument::Float(f as f32)),
        "double" => decimal(value, path).map(Argument::Double),
        "date" => {
            let s = text(value, path)?;
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Argument::LocalDate)
                .map_err(|e| invalid(path, format!("'{s}' is not a YYYY-MM-DD date: {e}")))
        }
        "calendar" | "instant" => {
            let s = text(value, path)?;
            let dt = DateTime::parse_from_rfc3339(s)
                .map_err(|e| invalid(path, format!("'{s}' is not an RFC 3339 date-time: {e}")))?;
            Ok(if kind == "calendar" {
                Argument::Calendar(dt)
            } else {
                Argument::Instant(dt)
            })
        }
        "enum" => text(value, path).map(Argument::enumeration),
        "string" => text(value, path).map(Argument::from),
        other => Err(invalid(path, format!("unknown argument kind '{other}'"))),
    }
}

fn integer<T: TryFrom<i64>>(value: &Value, path: &str) -> Result<T, TreeError> {
    value
        .as_i64()
        .and_then(|i| T::try_from(i).ok())
        .ok_or_else(|| invalid(path, "expected an integer in range"))
}

fn decimal(value: &Value, path: &str) -> Result<f64, TreeError> {
    value
        .as_f64()
        .ok_or_else(|| invalid(path, "expected a number"))
}

fn text<'a>(value: &'a Value, path: &str) -> Result<&'a str, TreeError> {
    value
        .as_str()
        .ok_or_else(|| invalid(path, "expected a string"))
}

fn invalid(path: &str, message: impl Into<String>) -> TreeError {
    TreeError::Invalid {
        path: path.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::render;
    use std::io::Write;

    #[test]
    fn test_nested_tree() {
        let content = r#"
and:
  - { selector: age, comparison: gt, argument: { int: 5 } }
  - or:
      - { selector: city, comparison: "==", argument: NYC }
      - { selector: city, comparison: "==", argument: LA }
"#;
        let tree = parse_tree(content).unwrap();
        assert_eq!(render(&tree), "age=gt=5,(city=='NYC';city=='LA')");
    }

    #[test]
    fn test_plain_scalars() {
        let tree = parse_tree("or: [{selector: a, comparison: eq, argument: 3000000000}, {selector: b, comparison: ne, argument: 2.5}]").unwrap();
        assert_eq!(render(&tree), "a==3000000000l;b!=2.5d");

        let tree = parse_tree("{selector: done, comparison: eq, argument: false}").unwrap();
        assert_eq!(render(&tree), "done==false");
    }

    #[test]
    fn test_typed_arguments() {
        let cases = [
            ("{ long: 5 }", "5l"),
            ("{ float: 5 }", "5.0"),
            ("{ byte: -1 }", "-1"),
            ("{ enum: ACTIVE }", "'ACTIVE'"),
            ("{ string: '42' }", "'42'"),
            ("{ date: 2013-01-04 }", "2013-01-04"),
            ("{ calendar: '2013-01-04T00:00:00+02:00' }", "2013-01-04"),
            ("{ calendar: '2013-01-04T10:15:00+02:00' }", "2013-01-04T10:15:00.000+02:00"),
            ("{ instant: '2013-01-04T00:00:00Z' }", "2013-01-04T00:00:00.000Z"),
        ];
        for (argument, expected) in cases {
            let content = format!("{{selector: x, comparison: '==', argument: {argument}}}");
            let tree = parse_tree(&content).unwrap();
            assert_eq!(render(&tree), format!("x=={expected}"), "argument {argument}");
        }
    }

    #[test]
    fn test_error_path() {
        let content = r#"
and:
  - { selector: a, comparison: eq, argument: 1 }
  - or:
      - { selector: b, comparison: eq, argument: { byte: 300 } }
      - { selector: c, comparison: eq, argument: 1 }
"#;
        let err = parse_tree(content).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Invalid { ref path, .. } if path == "root.and[1].or[0].argument.byte"
        ));
    }

    #[test]
    fn test_rejects_malformed_nodes() {
        assert!(matches!(
            parse_tree("and: [{selector: a, comparison: eq, argument: 1}]"),
            Err(TreeError::Invalid { .. })
        ));
        assert!(matches!(
            parse_tree("{selector: a, comparison: '~=', argument: 1}"),
            Err(TreeError::Invalid { .. })
        ));
        assert!(matches!(
            parse_tree("{selector: a, comparison: eq, argument: 1, extra: 2}"),
            Err(TreeError::Invalid { .. })
        ));
        assert!(matches!(parse_tree("- 1\n- ["), Err(TreeError::Yaml(_))));
    }

    #[test]
    fn test_load_tree_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{selector: name, comparison: eq, argument: Bob}}").unwrap();
        let tree = load_tree(file.path()).unwrap();
        assert_eq!(render(&tree), "name=='Bob'");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_tree(Path::new("/nonexistent/tree.yaml")).unwrap_err();
        assert!(matches!(err, TreeError::Io { .. }));
    }
}
