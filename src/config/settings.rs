//! Runtime settings for bankbridge
//!
//! Defaults, required-key validation, and the typed view of a resolved
//! configuration that is handed to the scraping and ledger-sync code.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::crypto::SecureString;
use crate::document::{Node, NodePath};
use crate::error::{BridgeError, BridgeResult};

/// Schedule used when neither the file nor `SCHEDULE` sets one
pub const DEFAULT_SCHEDULE: &str = "0 */6 * * *";

/// How many days of history to scrape by default
pub const DEFAULT_DAYS_BACK: u32 = 30;

/// Top-level keys every configuration must provide
const REQUIRED_KEYS: &[&str] = &["ledger", "banks"];

/// Nested keys that must be present once the top level checks out
const REQUIRED_LEDGER_KEYS: &[&str] = &["url", "tokenApi"];

/// Credential fields of a bank or sub-account, by field name
pub type Credentials = BTreeMap<String, SecureString>;

/// Connection settings for the ledger API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSettings {
    /// Base URL of the ledger server
    pub url: String,
    /// API token used to authenticate against the ledger
    pub token_api: SecureString,
}

/// A sub-account (e.g. a card) scraped under a bank login
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAccountSettings {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub credentials: Credentials,
}

/// A bank login to scrape
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankSettings {
    pub name: String,
    /// Scraper company identifier, when it differs from the name
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub accounts: Vec<SubAccountSettings>,
}

/// Typed view of a resolved configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub ledger: LedgerSettings,
    pub schedule: String,
    pub days_back: u32,
    pub banks: Vec<BankSettings>,
}

impl RuntimeConfig {
    /// Build the typed view from a fully decrypted document
    ///
    /// Shape errors name the offending path and node kind only. The serde
    /// error text is never surfaced, since it quotes the rejected value.
    pub fn from_document(doc: &Node) -> BridgeResult<Self> {
        check_shape(doc)?;

        let config: RuntimeConfig = serde_json::to_value(doc)
            .and_then(serde_json::from_value)
            .map_err(|_| {
                BridgeError::InvalidConfig("configuration does not match the expected shape".into())
            })?;

        if config.schedule.trim().is_empty() {
            return Err(BridgeError::InvalidConfig(
                "schedule must not be empty".to_string(),
            ));
        }

        Ok(config)
    }

    /// Scraper company identifier for a bank, falling back to its name
    pub fn company_id<'a>(&self, bank: &'a BankSettings) -> &'a str {
        bank.company_id.as_deref().unwrap_or(&bank.name)
    }
}

/// The defaults document every configuration is merged over
pub fn defaults() -> Node {
    let mut doc = Node::default();
    doc.set(&["schedule"], Node::from(DEFAULT_SCHEDULE));
    doc.set(&["daysBack"], Node::Integer(i64::from(DEFAULT_DAYS_BACK)));
    doc
}

/// Node kinds the typed view accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Text,
    Count,
    Secret,
    Mapping,
    Sequence,
}

impl Shape {
    fn accepts(self, node: &Node) -> bool {
        match self {
            Shape::Text => matches!(node, Node::String(_)),
            Shape::Count => matches!(node, Node::Integer(n) if u32::try_from(*n).is_ok()),
            Shape::Secret => matches!(node, Node::String(_) | Node::Integer(_)),
            Shape::Mapping => matches!(node, Node::Mapping(_)),
            Shape::Sequence => matches!(node, Node::Sequence(_)),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Shape::Text => "a string",
            Shape::Count => "a non-negative integer",
            Shape::Secret => "a string or integer",
            Shape::Mapping => "a mapping",
            Shape::Sequence => "a sequence",
        }
    }
}

/// Whether a key may be absent or null
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    /// May be absent, but not null
    Optional,
    /// May be absent or null
    Nullable,
}

fn field<'a>(
    parent: &'a Node,
    parent_path: &NodePath,
    key: &str,
    shape: Shape,
    presence: Presence,
) -> BridgeResult<Option<&'a Node>> {
    let path = parent_path.key(key);
    match parent.get(key) {
        None if presence != Presence::Required => Ok(None),
        None => Err(BridgeError::InvalidConfig(format!("{} is missing", path))),
        Some(Node::Null) if presence == Presence::Nullable => Ok(None),
        Some(node) => check_node(node, &path, shape).map(|()| Some(node)),
    }
}

fn check_node(node: &Node, path: &NodePath, shape: Shape) -> BridgeResult<()> {
    if shape.accepts(node) {
        return Ok(());
    }
    Err(BridgeError::InvalidConfig(format!(
        "{} must be {}, found a {}",
        path,
        shape.expected(),
        node.kind()
    )))
}

fn check_credentials(entry: &Node, entry_path: &NodePath) -> BridgeResult<()> {
    let credentials = field(
        entry,
        entry_path,
        "credentials",
        Shape::Mapping,
        Presence::Optional,
    )?;
    let Some(credentials) = credentials else {
        return Ok(());
    };
    let path = entry_path.key("credentials");
    for (key, value) in credentials.as_mapping().into_iter().flatten() {
        check_node(value, &path.key(key), Shape::Secret)?;
    }
    Ok(())
}

/// Check node kinds against the typed view before deserializing
fn check_shape(doc: &Node) -> BridgeResult<()> {
    let root = NodePath::root();

    if let Some(ledger) = field(doc, &root, "ledger", Shape::Mapping, Presence::Required)? {
        let ledger_path = root.key("ledger");
        field(ledger, &ledger_path, "url", Shape::Text, Presence::Required)?;
        field(ledger, &ledger_path, "tokenApi", Shape::Secret, Presence::Required)?;
    }
    field(doc, &root, "schedule", Shape::Text, Presence::Required)?;
    field(doc, &root, "daysBack", Shape::Count, Presence::Required)?;

    let banks_path = root.key("banks");
    let banks = field(doc, &root, "banks", Shape::Sequence, Presence::Required)?
        .and_then(Node::as_sequence)
        .unwrap_or_default();
    for (i, bank) in banks.iter().enumerate() {
        let bank_path = banks_path.index(i);
        check_node(bank, &bank_path, Shape::Mapping)?;
        field(bank, &bank_path, "name", Shape::Text, Presence::Required)?;
        field(bank, &bank_path, "companyId", Shape::Text, Presence::Nullable)?;
        check_credentials(bank, &bank_path)?;

        let accounts_path = bank_path.key("accounts");
        let accounts = field(bank, &bank_path, "accounts", Shape::Sequence, Presence::Optional)?
            .and_then(Node::as_sequence)
            .unwrap_or_default();
        for (j, account) in accounts.iter().enumerate() {
            let account_path = accounts_path.index(j);
            check_node(account, &account_path, Shape::Mapping)?;
            field(account, &account_path, "name", Shape::Text, Presence::Nullable)?;
            check_credentials(account, &account_path)?;
        }
    }

    Ok(())
}

/// Check that the required keys are present and not null
pub fn validate_required(doc: &Node) -> BridgeResult<()> {
    for key in REQUIRED_KEYS {
        if doc.get(key).map_or(true, Node::is_null) {
            return Err(BridgeError::MissingRequiredConfig((*key).to_string()));
        }
    }

    for key in REQUIRED_LEDGER_KEYS {
        let present = doc
            .lookup(&["ledger", key])
            .is_some_and(|node| !node.is_null() && node.as_str() != Some(""));
        if !present {
            return Err(BridgeError::MissingRequiredConfig(format!("ledger.{}", key)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Node {
        serde_yaml::from_str(text).unwrap()
    }

    const COMPLETE: &str = r#"
ledger:
  url: http://localhost:5006
  tokenApi: abc123
schedule: "0 6 * * *"
daysBack: 7
banks:
  - name: leumi
    credentials:
      username: u
      id: 123456789
    accounts:
      - name: card
        credentials:
          card6Digits: "123456"
  - name: max
    companyId: max-it
"#;

    #[test]
    fn test_defaults() {
        let doc = defaults();
        assert_eq!(doc.get("schedule"), Some(&Node::from(DEFAULT_SCHEDULE)));
        assert_eq!(doc.get("daysBack"), Some(&Node::Integer(30)));
    }

    #[test]
    fn test_validate_required_passes() {
        assert!(validate_required(&parse(COMPLETE)).is_ok());
    }

    #[test]
    fn test_validate_required_names_missing_key() {
        let err = validate_required(&parse("ledger:\n  url: x\n  tokenApi: y\n")).unwrap_err();
        assert!(matches!(err, BridgeError::MissingRequiredConfig(ref key) if key == "banks"));

        let err = validate_required(&parse("banks: []\nledger:\n  url: x\n")).unwrap_err();
        assert!(
            matches!(err, BridgeError::MissingRequiredConfig(ref key) if key == "ledger.tokenApi")
        );

        let err = validate_required(&parse("banks: []\nledger: ~\n")).unwrap_err();
        assert!(matches!(err, BridgeError::MissingRequiredConfig(ref key) if key == "ledger"));
    }

    #[test]
    fn test_runtime_config_from_document() {
        let config = RuntimeConfig::from_document(&parse(COMPLETE)).unwrap();

        assert_eq!(config.ledger.url, "http://localhost:5006");
        assert_eq!(config.ledger.token_api.as_str(), "abc123");
        assert_eq!(config.schedule, "0 6 * * *");
        assert_eq!(config.days_back, 7);
        assert_eq!(config.banks.len(), 2);

        let leumi = &config.banks[0];
        assert_eq!(leumi.credentials["username"].as_str(), "u");
        assert_eq!(leumi.credentials["id"].as_str(), "123456789");
        assert_eq!(leumi.accounts[0].credentials["card6Digits"].as_str(), "123456");
        assert_eq!(config.company_id(leumi), "leumi");
        assert_eq!(config.company_id(&config.banks[1]), "max-it");
        assert!(config.banks[1].credentials.is_empty());
    }

    #[test]
    fn test_runtime_config_rejects_bad_shapes() {
        let doc = parse(COMPLETE).merge(parse("daysBack: lots\n"));
        assert!(matches!(
            RuntimeConfig::from_document(&doc),
            Err(BridgeError::InvalidConfig(_))
        ));

        let doc = parse(COMPLETE).merge(parse("schedule: \"\"\n"));
        assert!(matches!(
            RuntimeConfig::from_document(&doc),
            Err(BridgeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_shape_errors_name_path_but_not_value() {
        let doc = parse(COMPLETE).merge(parse(
            "banks:\n  - name: leumi\n    credentials: hunter2-supersecret\n",
        ));
        let err = RuntimeConfig::from_document(&doc).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));
        assert!(message.contains("banks[0].credentials"));
        assert!(!message.contains("hunter2-supersecret"));

        let doc = parse(COMPLETE).merge(parse(
            "ledger:\n  url: http://x\n  tokenApi:\n    nested: hunter2-supersecret\n",
        ));
        let message = RuntimeConfig::from_document(&doc).unwrap_err().to_string();
        assert!(message.contains("ledger.tokenApi"));
        assert!(!message.contains("hunter2-supersecret"));

        let doc = parse(COMPLETE).merge(parse(
            "banks:\n  - name: leumi\n    accounts:\n      - credentials:\n          pin: [hunter2-supersecret]\n",
        ));
        let message = RuntimeConfig::from_document(&doc).unwrap_err().to_string();
        assert!(message.contains("banks[0].accounts[0].credentials.pin"));
        assert!(!message.contains("hunter2-supersecret"));
    }

    #[test]
    fn test_debug_does_not_leak_credentials() {
        let config = RuntimeConfig::from_document(&parse(COMPLETE)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("abc123"));
        assert!(!debug.contains("123456789"));
    }
}
