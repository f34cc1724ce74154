// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Classifier label metadata.
//!
//! Class labels for the statistical sign classifier come from one of two
//! places: the `names` entry of the ONNX model's custom metadata (written by
//! the export script as a Python dict or a YAML block), or a JSON labels file
//! shipped next to the model.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::error::{GestureError, Result};

/// Label metadata attached to a sign classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierMetadata {
    /// Model description, if the export recorded one.
    pub description: String,
    /// Exporter version string.
    pub version: String,
    /// Class index to label mapping.
    pub names: BTreeMap<usize, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelsFile {
    List(Vec<String>),
    IndexToClass {
        index_to_class: HashMap<String, String>,
    },
    Classes {
        classes: Vec<String>,
    },
}

impl ClassifierMetadata {
    /// Build metadata from ONNX custom metadata properties.
    ///
    /// # Arguments
    ///
    /// * `metadata_map` - Key/value pairs read from the model.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::ModelLoadError`] if no `names` entry exists.
    pub fn from_onnx_metadata(metadata_map: &HashMap<String, String>) -> Result<Self> {
        let names_str = metadata_map.get("names").ok_or_else(|| {
            GestureError::ModelLoadError(
                "No class names in classifier metadata; pass a labels file".to_string(),
            )
        })?;

        let text = format!("names: {names_str}");
        Ok(Self {
            description: metadata_map.get("description").cloned().unwrap_or_default(),
            version: metadata_map.get("version").cloned().unwrap_or_default(),
            names: Self::parse_names_block(&text),
        })
    }

    /// Parse labels from a JSON labels file.
    ///
    /// Accepted shapes: a plain array `["A", "B"]`, an object
    /// `{"index_to_class": {"0": "A"}}`, or an object `{"classes": ["A"]}`.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::ConfigError`] if the JSON matches none of the
    /// accepted shapes or an index key is not an integer.
    pub fn from_labels_json(json: &str) -> Result<Self> {
        let file: LabelsFile = serde_json::from_str(json)
            .map_err(|e| GestureError::ConfigError(format!("Invalid labels file: {e}")))?;

        let names = match file {
            LabelsFile::List(labels) | LabelsFile::Classes { classes: labels } => {
                labels.into_iter().enumerate().collect()
            }
            LabelsFile::IndexToClass { index_to_class } => index_to_class
                .into_iter()
                .map(|(idx, label)| {
                    idx.trim().parse::<usize>().map(|i| (i, label)).map_err(|_| {
                        GestureError::ConfigError(format!("Invalid class index '{idx}'"))
                    })
                })
                .collect::<Result<BTreeMap<_, _>>>()?,
        };

        Ok(Self {
            names,
            ..Self::default()
        })
    }

    /// Read a JSON labels file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Io`] if the file cannot be read, or the errors
    /// of [`ClassifierMetadata::from_labels_json`].
    pub fn from_labels_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_labels_json(&text)
    }

    /// Parse the names block from YAML or Python dict format.
    fn parse_names_block(yaml_str: &str) -> BTreeMap<usize, String> {
        if let Some(start) = yaml_str.find("names:") {
            let trimmed = yaml_str[start + 6..].trim();
            if let Some(dict) = trimmed.strip_prefix('{') {
                if let Some(end) = dict.find('}') {
                    return Self::parse_python_dict(&dict[..end]);
                }
            }
        }

        let mut names = BTreeMap::new();
        let mut in_names_block = false;
        for line in yaml_str.lines() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix("names:") {
                in_names_block = true;
                if rest.trim().is_empty() {
                    continue;
                }
            }
            if !in_names_block {
                continue;
            }
            let entry = trimmed.strip_prefix("names:").unwrap_or(trimmed);
            if let Some((key, value)) = entry.split_once(':') {
                if let Ok(class_id) = key.trim().parse::<usize>() {
                    names.insert(class_id, Self::unquote(value).to_string());
                }
            }
        }
        names
    }

    /// Parse a Python dict body like `0: 'A', 1: 'B'`.
    fn parse_python_dict(dict_str: &str) -> BTreeMap<usize, String> {
        dict_str
            .split(',')
            .filter_map(|entry| {
                let (key, value) = entry.split_once(':')?;
                let class_id = key.trim().trim_matches('\'').trim_matches('"').parse().ok()?;
                Some((class_id, Self::unquote(value).to_string()))
            })
            .collect()
    }

    fn unquote(value: &str) -> &str {
        value.trim().trim_matches('\'').trim_matches('"')
    }

    /// Number of classes.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.names.len()
    }

    /// Label for a class index.
    #[must_use]
    pub fn class_name(&self, class_id: usize) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    /// Labels in class-index order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.names.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_dict_names() {
        let mut map = HashMap::new();
        map.insert("names".to_string(), "{0: 'A', 1: 'B', 2: 'L'}".to_string());
        map.insert("version".to_string(), "1.2".to_string());
        let metadata = ClassifierMetadata::from_onnx_metadata(&map).unwrap();
        assert_eq!(metadata.num_classes(), 3);
        assert_eq!(metadata.class_name(2), Some("L"));
        assert_eq!(metadata.version, "1.2");
    }

    #[test]
    fn test_yaml_block_names() {
        let mut map = HashMap::new();
        map.insert("names".to_string(), "\n  0: A\n  1: \"B\"\n".to_string());
        let metadata = ClassifierMetadata::from_onnx_metadata(&map).unwrap();
        assert_eq!(metadata.labels(), ["A", "B"]);
    }

    #[test]
    fn test_missing_names() {
        let result = ClassifierMetadata::from_onnx_metadata(&HashMap::new());
        assert!(matches!(result, Err(GestureError::ModelLoadError(_))));
    }

    #[test]
    fn test_labels_json_shapes() {
        let list = ClassifierMetadata::from_labels_json(r#"["A", "B", "C"]"#).unwrap();
        assert_eq!(list.class_name(1), Some("B"));

        let mapped =
            ClassifierMetadata::from_labels_json(r#"{"index_to_class": {"1": "Y", "0": "L"}}"#)
                .unwrap();
        assert_eq!(mapped.labels(), ["L", "Y"]);

        let classes = ClassifierMetadata::from_labels_json(r#"{"classes": ["V"]}"#).unwrap();
        assert_eq!(classes.num_classes(), 1);

        assert!(matches!(
            ClassifierMetadata::from_labels_json(r#"{"index_to_class": {"x": "A"}}"#),
            Err(GestureError::ConfigError(_))
        ));
        assert!(ClassifierMetadata::from_labels_json("42").is_err());
    }
}
