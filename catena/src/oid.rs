//! Object identifier (OID) paths.
//!
//! An OID is a `/`-separated path. The first segment names a top-level
//! parameter; every following segment names a struct field. A segment made
//! only of digits is an array index and is always paired with the field-name
//! segment that follows it:
//!
//! ```text
//! audio/gain            root "audio", field "gain"
//! /list/2/name          root "list", element 2, field "name"
//! ```

use std::fmt;

use crate::error::{ParamError, Result};

/// One step below the root: a field name, optionally inside an array element.
///
/// Ordering puts plain fields first and compares element indices numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OidStep {
    pub index: Option<usize>,
    pub name: String,
}

impl OidStep {
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            index: None,
            name: name.into(),
        }
    }

    pub fn element(index: usize, name: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            name: name.into(),
        }
    }

    /// Key under which the step is stored in its parent's children map.
    pub fn key(&self) -> String {
        match self.index {
            Some(index) => format!("{}/{}", index, self.name),
            None => self.name.clone(),
        }
    }
}

/// A parsed, validated OID. Parents order before their descendants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OidPath {
    root: String,
    steps: Vec<OidStep>,
}

impl OidPath {
    pub fn parse(oid: &str) -> Result<Self> {
        let trimmed = normalize(oid)?;
        let mut segments = trimmed.split('/');
        let root = match segments.next() {
            Some(root) if !root.is_empty() => root.to_string(),
            _ => return Err(ParamError::MalformedOid(oid.to_string())),
        };

        let mut steps = Vec::new();
        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                return Err(ParamError::MalformedOid(oid.to_string()));
            }
            if is_index(segment) {
                let index = segment
                    .parse::<usize>()
                    .map_err(|_| ParamError::MalformedOid(oid.to_string()))?;
                // an index is only meaningful together with the field it selects
                match segments.next() {
                    Some(name) if !name.is_empty() && !is_index(name) => {
                        steps.push(OidStep::element(index, name));
                    }
                    _ => return Err(ParamError::MalformedOid(oid.to_string())),
                }
            } else {
                steps.push(OidStep::field(segment));
            }
        }

        Ok(Self { root, steps })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn steps(&self) -> &[OidStep] {
        &self.steps
    }

    pub fn is_top_level(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&OidStep> {
        self.steps.last()
    }

    /// The path one step up, or `None` for a top-level OID.
    pub fn parent(&self) -> Option<OidPath> {
        let (_, rest) = self.steps.split_last()?;
        Some(Self {
            root: self.root.clone(),
            steps: rest.to_vec(),
        })
    }

    /// Fold an RPC element index into the path.
    ///
    /// The index selects an element of the top-level struct-array, so it
    /// lands on the first step. Top-level OIDs and paths that already carry
    /// an index there are returned unchanged.
    pub fn with_element_index(mut self, index: usize) -> Self {
        if let Some(first) = self.steps.first_mut()
            && first.index.is_none()
        {
            first.index = Some(index);
        }
        self
    }
}

impl fmt::Display for OidPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for step in &self.steps {
            write!(f, "/{}", step.key())?;
        }
        Ok(())
    }
}

/// Strip the optional leading `/` and reject empty OIDs.
pub fn normalize(oid: &str) -> Result<&str> {
    let trimmed = oid.strip_prefix('/').unwrap_or(oid);
    if trimmed.is_empty() {
        return Err(ParamError::MalformedOid(oid.to_string()));
    }
    Ok(trimmed)
}

/// True when the OID has no `/` after its first character.
pub fn is_top_level(oid: &str) -> bool {
    oid.rfind('/').is_none_or(|pos| pos == 0)
}

/// Validate an OID that must name a top-level parameter.
pub fn validate_top_level(oid: &str) -> Result<&str> {
    let trimmed = normalize(oid)?;
    if trimmed.contains('/') {
        return Err(ParamError::MalformedOid(oid.to_string()));
    }
    Ok(trimmed)
}

pub fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let path = OidPath::parse("/audio/eq/gain").unwrap();
        assert_eq!(path.root(), "audio");
        assert_eq!(
            path.steps(),
            &[OidStep::field("eq"), OidStep::field("gain")]
        );
        assert_eq!(path.to_string(), "audio/eq/gain");
    }

    #[test]
    fn test_parse_indexed_pairs() {
        let path = OidPath::parse("list/2/name").unwrap();
        assert_eq!(path.steps(), &[OidStep::element(2, "name")]);
        assert_eq!(path.last().unwrap().key(), "2/name");
    }

    #[test]
    fn test_malformed() {
        assert!(OidPath::parse("").is_err());
        assert!(OidPath::parse("/").is_err());
        assert!(OidPath::parse("a//b").is_err());
        assert!(OidPath::parse("a/b/").is_err());
        // index without a field
        assert!(OidPath::parse("list/2").is_err());
        assert!(OidPath::parse("list/2/3").is_err());
    }

    #[test]
    fn test_top_level() {
        assert!(is_top_level("gain"));
        assert!(is_top_level("/gain"));
        assert!(!is_top_level("audio/gain"));
        assert!(validate_top_level("/gain").is_ok());
        assert!(matches!(
            validate_top_level("audio/gain"),
            Err(ParamError::MalformedOid(_))
        ));
    }

    #[test]
    fn test_parent_and_element_index() {
        let path = OidPath::parse("list/name").unwrap().with_element_index(3);
        assert_eq!(path.to_string(), "list/3/name");
        assert_eq!(path.parent().unwrap().to_string(), "list");
        assert!(path.parent().unwrap().parent().is_none());

        // already indexed paths keep their index
        let path = OidPath::parse("list/1/name").unwrap().with_element_index(3);
        assert_eq!(path.to_string(), "list/1/name");

        let top = OidPath::parse("gain").unwrap().with_element_index(3);
        assert_eq!(top.to_string(), "gain");
    }

    #[test]
    fn test_ordering() {
        let mut paths: Vec<_> = ["list/10/name", "list/2/name", "list", "list/name"]
            .iter()
            .map(|oid| OidPath::parse(oid).unwrap())
            .collect();
        paths.sort();
        let sorted: Vec<_> = paths.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, vec!["list", "list/name", "list/2/name", "list/10/name"]);
    }
}
