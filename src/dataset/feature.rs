//! Feature name and feature type metadata.

use crate::core::constants::{DEFAULT_FEATURE_PREFIX, RESERVED_FEATURE_SYMBOLS};
use crate::core::error::{DatasetError, Result};
use crate::core::types::FeatureType;
use std::collections::HashSet;

/// Positional names `f0 .. f{n-1}`.
pub fn default_feature_names(num_features: usize) -> Vec<String> {
    (0..num_features)
        .map(|i| format!("{}{}", DEFAULT_FEATURE_PREFIX, i))
        .collect()
}

/// Check cardinality, uniqueness and reserved symbols, in that order.
pub fn validate_feature_names(names: &[String], num_features: usize) -> Result<()> {
    if names.len() != num_features {
        return Err(DatasetError::FeatureNameCount {
            expected: num_features,
            actual: names.len(),
        }
        .into());
    }

    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(DatasetError::DuplicateFeatureName { name: name.clone() }.into());
        }
    }

    if let Some(name) = names
        .iter()
        .find(|name| name.contains(&RESERVED_FEATURE_SYMBOLS[..]))
    {
        return Err(DatasetError::InvalidFeatureName { name: name.clone() }.into());
    }

    Ok(())
}

/// Feature type assignment: one tag for every column, or one tag per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureTypeSpec {
    /// Broadcast a single tag to every column
    Uniform(String),
    /// One tag per column
    PerColumn(Vec<String>),
}

impl FeatureTypeSpec {
    /// Expand to one parsed type per column.
    pub fn resolve(&self, num_features: usize) -> Result<Vec<FeatureType>> {
        let tags: Vec<&str> = match self {
            FeatureTypeSpec::Uniform(tag) => vec![tag.as_str(); num_features],
            FeatureTypeSpec::PerColumn(tags) => tags.iter().map(String::as_str).collect(),
        };

        if tags.len() != num_features {
            return Err(DatasetError::FeatureTypeCount {
                expected: num_features,
                actual: tags.len(),
            }
            .into());
        }

        tags.into_iter().map(str::parse).collect()
    }
}

impl From<&str> for FeatureTypeSpec {
    fn from(tag: &str) -> Self {
        FeatureTypeSpec::Uniform(tag.to_string())
    }
}

impl From<String> for FeatureTypeSpec {
    fn from(tag: String) -> Self {
        FeatureTypeSpec::Uniform(tag)
    }
}

impl From<Vec<String>> for FeatureTypeSpec {
    fn from(tags: Vec<String>) -> Self {
        FeatureTypeSpec::PerColumn(tags)
    }
}

impl From<Vec<&str>> for FeatureTypeSpec {
    fn from(tags: Vec<&str>) -> Self {
        FeatureTypeSpec::PerColumn(tags.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for FeatureTypeSpec {
    fn from(tags: &[&str]) -> Self {
        FeatureTypeSpec::PerColumn(tags.iter().map(|t| t.to_string()).collect())
    }
}

impl From<&[FeatureType]> for FeatureTypeSpec {
    fn from(types: &[FeatureType]) -> Self {
        FeatureTypeSpec::PerColumn(types.iter().map(|t| t.as_str().to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_names() {
        assert_eq!(default_feature_names(3), names(&["f0", "f1", "f2"]));
        assert!(default_feature_names(0).is_empty());
    }

    #[test]
    fn test_name_validation_order() {
        let err = validate_feature_names(&names(&["a", "a", "b"]), 2).unwrap_err();
        assert!(matches!(
            err.dataset_error(),
            Some(DatasetError::FeatureNameCount { expected: 2, actual: 3 })
        ));

        let err = validate_feature_names(&names(&["a", "b", "a"]), 3).unwrap_err();
        assert!(matches!(
            err.dataset_error(),
            Some(DatasetError::DuplicateFeatureName { .. })
        ));

        for bad in ["a<1", "x[0]", "]"] {
            let err = validate_feature_names(&names(&["ok", bad]), 2).unwrap_err();
            assert!(matches!(
                err.dataset_error(),
                Some(DatasetError::InvalidFeatureName { .. })
            ));
        }

        assert!(validate_feature_names(&names(&["a>b", "c=d"]), 2).is_ok());
    }

    #[test]
    fn test_feature_type_spec() {
        let types = FeatureTypeSpec::from("q").resolve(3).unwrap();
        assert_eq!(types, vec![FeatureType::Quantitative; 3]);

        let types = FeatureTypeSpec::from(vec!["q", "i", "int"]).resolve(3).unwrap();
        assert_eq!(
            types,
            vec![FeatureType::Quantitative, FeatureType::Indicator, FeatureType::Integer]
        );

        let err = FeatureTypeSpec::from(vec!["q", "i"]).resolve(3).unwrap_err();
        assert!(matches!(
            err.dataset_error(),
            Some(DatasetError::FeatureTypeCount { .. })
        ));

        let err = FeatureTypeSpec::from("a").resolve(2).unwrap_err();
        assert!(matches!(
            err.dataset_error(),
            Some(DatasetError::InvalidFeatureType { .. })
        ));
    }
}
