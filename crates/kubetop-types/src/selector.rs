//! Label selectors
//!
//! Parses the Kubernetes label-selector string syntax (`app=web,tier!=db`,
//! `env in (prod,staging)`, `!canary`) into a predicate that can be evaluated
//! locally or rendered back for the `labelSelector` query parameter.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty requirement in selector '{0}'")]
    EmptyRequirement(String),

    #[error("invalid label key '{0}'")]
    InvalidKey(String),

    #[error("invalid label value '{0}'")]
    InvalidValue(String),

    #[error("malformed set expression '{0}'")]
    MalformedSet(String),
}

/// A single label requirement
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    Equals(String, String),
    NotEquals(String, String),
    In(String, Vec<String>),
    NotIn(String, Vec<String>),
    Exists(String),
    DoesNotExist(String),
}

impl Requirement {
    pub fn key(&self) -> &str {
        match self {
            Self::Equals(k, _)
            | Self::NotEquals(k, _)
            | Self::In(k, _)
            | Self::NotIn(k, _)
            | Self::Exists(k)
            | Self::DoesNotExist(k) => k,
        }
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(self.key());
        match self {
            Self::Equals(_, v) => value == Some(v),
            Self::NotEquals(_, v) => value != Some(v),
            Self::In(_, vs) => value.is_some_and(|x| vs.contains(x)),
            Self::NotIn(_, vs) => value.is_none_or(|x| !vs.contains(x)),
            Self::Exists(_) => value.is_some(),
            Self::DoesNotExist(_) => value.is_none(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(k, v) => write!(f, "{}={}", k, v),
            Self::NotEquals(k, v) => write!(f, "{}!={}", k, v),
            Self::In(k, vs) => write!(f, "{} in ({})", k, vs.join(",")),
            Self::NotIn(k, vs) => write!(f, "{} notin ({})", k, vs.join(",")),
            Self::Exists(k) => f.write_str(k),
            Self::DoesNotExist(k) => write!(f, "!{}", k),
        }
    }
}

/// A conjunction of label requirements. Empty matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    requirements: Vec<Requirement>,
}

impl Selector {
    /// Selector that matches every object
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn new(requirements: Vec<Requirement>) -> Self {
        Self { requirements }
    }

    pub fn is_everything(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Check whether a label set satisfies every requirement
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.requirements.iter().map(|r| r.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::everything());
        }

        split_requirements(s)
            .into_iter()
            .map(|part| parse_requirement(part, s))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

/// Split on commas that are not inside a `( ... )` value set
fn split_requirements(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_requirement(part: &str, whole: &str) -> Result<Requirement, SelectorError> {
    let part = part.trim();
    if part.is_empty() {
        return Err(SelectorError::EmptyRequirement(whole.to_string()));
    }

    if let Some(key) = part.strip_prefix('!') {
        return Ok(Requirement::DoesNotExist(validate_key(key.trim())?));
    }

    if let Some((key, value)) = part.split_once("!=") {
        return Ok(Requirement::NotEquals(
            validate_key(key.trim())?,
            validate_value(value.trim())?,
        ));
    }

    if let Some((key, value)) = part.split_once("==").or_else(|| part.split_once('=')) {
        return Ok(Requirement::Equals(
            validate_key(key.trim())?,
            validate_value(value.trim())?,
        ));
    }

    if let Some((key, rest)) = part.split_once(char::is_whitespace) {
        let rest = rest.trim_start();
        let (negated, set) = if let Some(set) = rest.strip_prefix("notin") {
            (true, set)
        } else if let Some(set) = rest.strip_prefix("in") {
            (false, set)
        } else {
            return Err(SelectorError::MalformedSet(part.to_string()));
        };
        let key = validate_key(key.trim())?;
        let values = parse_value_set(set.trim(), part)?;
        return Ok(if negated {
            Requirement::NotIn(key, values)
        } else {
            Requirement::In(key, values)
        });
    }

    Ok(Requirement::Exists(validate_key(part)?))
}

fn parse_value_set(set: &str, part: &str) -> Result<Vec<String>, SelectorError> {
    let inner = set
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| SelectorError::MalformedSet(part.to_string()))?;

    let values = inner
        .split(',')
        .map(|v| validate_value(v.trim()))
        .collect::<Result<Vec<_>, _>>()?;

    if values.iter().all(|v| v.is_empty()) {
        return Err(SelectorError::MalformedSet(part.to_string()));
    }
    Ok(values)
}

/// Keys are an optional DNS-subdomain prefix plus a name of at most 63 characters
fn validate_key(key: &str) -> Result<String, SelectorError> {
    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            let prefix_ok = !prefix.is_empty()
                && prefix.len() <= 253
                && prefix
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
            if !prefix_ok {
                return Err(SelectorError::InvalidKey(key.to_string()));
            }
            name
        }
        None => key,
    };

    if name.is_empty() || !is_label_name(name) {
        return Err(SelectorError::InvalidKey(key.to_string()));
    }
    Ok(key.to_string())
}

fn validate_value(value: &str) -> Result<String, SelectorError> {
    if value.is_empty() || is_label_name(value) {
        Ok(value.to_string())
    } else {
        Err(SelectorError::InvalidValue(value.to_string()))
    }
}

fn is_label_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    s.len() <= 63
        && bytes.first().is_some_and(|b| b.is_ascii_alphanumeric())
        && bytes.last().is_some_and(|b| b.is_ascii_alphanumeric())
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_matches_everything() {
        let selector: Selector = "".parse().unwrap();
        assert!(selector.is_everything());
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("app", "web")])));
        assert_eq!(selector.to_string(), "");
    }

    #[test]
    fn test_equality() {
        let selector: Selector = "app=web,tier!=db".parse().unwrap();
        assert_eq!(
            selector.requirements(),
            &[
                Requirement::Equals("app".to_string(), "web".to_string()),
                Requirement::NotEquals("tier".to_string(), "db".to_string()),
            ]
        );
        assert!(selector.matches(&labels(&[("app", "web"), ("tier", "frontend")])));
        assert!(selector.matches(&labels(&[("app", "web")])));
        assert!(!selector.matches(&labels(&[("app", "web"), ("tier", "db")])));
        assert!(!selector.matches(&labels(&[("app", "api")])));
    }

    #[test]
    fn test_double_equals() {
        let selector: Selector = "app==web".parse().unwrap();
        assert_eq!(selector.to_string(), "app=web");
    }

    #[test]
    fn test_set_based() {
        let selector: Selector = "env in (prod, staging),track notin (canary)".parse().unwrap();
        assert_eq!(selector.requirements().len(), 2);
        assert!(selector.matches(&labels(&[("env", "prod")])));
        assert!(selector.matches(&labels(&[("env", "staging"), ("track", "stable")])));
        assert!(!selector.matches(&labels(&[("env", "dev")])));
        assert!(!selector.matches(&labels(&[("env", "prod"), ("track", "canary")])));
        assert_eq!(
            selector.to_string(),
            "env in (prod,staging),track notin (canary)"
        );
    }

    #[test]
    fn test_existence() {
        let selector: Selector = "app,!canary".parse().unwrap();
        assert!(selector.matches(&labels(&[("app", "x")])));
        assert!(!selector.matches(&labels(&[("app", "x"), ("canary", "true")])));
        assert!(!selector.matches(&labels(&[])));
        assert_eq!(selector.to_string(), "app,!canary");
    }

    #[test]
    fn test_prefixed_key() {
        let selector: Selector = "app.kubernetes.io/name=nginx".parse().unwrap();
        assert!(selector.matches(&labels(&[("app.kubernetes.io/name", "nginx")])));
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(matches!(
            "app=web,".parse::<Selector>(),
            Err(SelectorError::EmptyRequirement(_))
        ));
        assert!(matches!(
            "-app=web".parse::<Selector>(),
            Err(SelectorError::InvalidKey(_))
        ));
        assert!(matches!(
            "app=we b".parse::<Selector>(),
            Err(SelectorError::InvalidValue(_))
        ));
        assert!(matches!(
            "env in prod".parse::<Selector>(),
            Err(SelectorError::MalformedSet(_))
        ));
        assert!(matches!(
            "env within (a)".parse::<Selector>(),
            Err(SelectorError::MalformedSet(_))
        ));
    }
}
