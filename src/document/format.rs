//! Document file I/O with atomic writes
//!
//! Reads and writes configuration documents as YAML or JSON, picked by file
//! extension. Writes go to a sibling temp file that is synced and renamed
//! into place, so a document is either fully rewritten or left untouched.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::node::Node;
use crate::error::{BridgeError, BridgeResult};

/// Serialization format of a document file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Pick the format from a path's extension; anything but `.json` is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Parse document text
    pub fn parse(self, text: &str) -> BridgeResult<Node> {
        Ok(match self {
            Self::Yaml => serde_yaml::from_str(text)?,
            Self::Json => serde_json::from_str(text)?,
        })
    }

    /// Render a document to text
    pub fn render(self, node: &Node) -> BridgeResult<String> {
        Ok(match self {
            Self::Yaml => serde_yaml::to_string(node)?,
            Self::Json => {
                let mut text = serde_json::to_string_pretty(node)?;
                text.push('\n');
                text
            }
        })
    }
}

/// Load a configuration document; its root must be a mapping
pub fn load_document<P: AsRef<Path>>(path: P) -> BridgeResult<Node> {
    let path = path.as_ref();

    let text = fs::read_to_string(path).map_err(|e| BridgeError::config_load(path, e))?;
    if text.trim().is_empty() {
        return Ok(Node::default());
    }
    let node = DocumentFormat::from_path(path)
        .parse(&text)
        .map_err(|e| BridgeError::config_load(path, e))?;

    match node {
        Node::Mapping(_) => Ok(node),
        other => Err(BridgeError::config_load(
            path,
            format!("document root must be a mapping, found a {}", other.kind()),
        )),
    }
}

/// Write a document atomically (write to temp, then rename)
pub fn write_document_atomic<P: AsRef<Path>>(path: P, node: &Node) -> BridgeResult<()> {
    let path = path.as_ref();
    let text = DocumentFormat::from_path(path).render(node)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            BridgeError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let result = (|| -> std::io::Result<()> {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&temp_path, path)
    })();

    result.map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        BridgeError::Io(format!("Failed to write {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a.JSON")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("config")), DocumentFormat::Yaml);
    }

    #[test]
    fn test_write_and_load_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");

        let mut node = Node::default();
        node.set(&["ledger", "tokenApi"], Node::from("12345"));
        write_document_atomic(&path, &node).unwrap();

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded, node);
    }

    #[test]
    fn test_write_and_load_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let mut node = Node::default();
        node.set(&["schedule"], Node::from("true"));
        write_document_atomic(&path, &node).unwrap();

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded.get("schedule"), Some(&Node::from("true")));
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");

        write_document_atomic(&path, &Node::default()).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("config.yaml.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");

        write_document_atomic(&path, &Node::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.yaml");
        assert!(matches!(
            load_document(&path),
            Err(BridgeError::ConfigLoad { .. })
        ));
    }

    #[test]
    fn test_load_unparsable_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_document(&path),
            Err(BridgeError::ConfigLoad { .. })
        ));
    }

    #[test]
    fn test_load_rejects_non_mapping_root() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("list.yaml");
        fs::write(&path, "- a\n- b\n").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn test_load_empty_yaml_is_empty_mapping() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.yaml");
        fs::write(&path, "").unwrap();
        assert_eq!(load_document(&path).unwrap(), Node::default());
    }
}
