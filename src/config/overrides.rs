//! Environment-variable overrides
//!
//! Two kinds of overrides are applied on top of the loaded document:
//!
//! - a fixed allow-list of connection and scheduling settings
//!   (`LEDGER_URL`, `LEDGER_TOKEN`, `SCHEDULE`, `DAYS_BACK`)
//! - positional credentials: `ACCOUNT_<i>_<FIELD>` for `banks[i]` and
//!   `ACCOUNT_<i>_SUB_<j>_<FIELD>` for `banks[i].accounts[j]`
//!
//! A variable only counts when it is set and not blank. Override values are
//! plaintext and never go through the cipher engine.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::env::EnvSource;
use crate::document::{Node, NodePath};
use crate::error::{BridgeError, BridgeResult};

/// How an allow-listed variable's text becomes a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Count,
}

/// An allow-listed setting override
#[derive(Debug)]
struct SettingOverride {
    var: &'static str,
    keys: &'static [&'static str],
    kind: ValueKind,
}

const SETTING_OVERRIDES: &[SettingOverride] = &[
    SettingOverride {
        var: "LEDGER_URL",
        keys: &["ledger", "url"],
        kind: ValueKind::Text,
    },
    SettingOverride {
        var: "LEDGER_TOKEN",
        keys: &["ledger", "tokenApi"],
        kind: ValueKind::Text,
    },
    SettingOverride {
        var: "SCHEDULE",
        keys: &["schedule"],
        kind: ValueKind::Text,
    },
    SettingOverride {
        var: "DAYS_BACK",
        keys: &["daysBack"],
        kind: ValueKind::Count,
    },
];

/// Credential fields checked for every account even when the file omits them
const DEFAULT_CREDENTIAL_FIELDS: &[&str] = &["username", "password"];

/// Apply the allow-listed setting overrides
///
/// Returns the paths that were overridden.
pub fn apply_setting_overrides(
    doc: &mut Node,
    env: &impl EnvSource,
) -> BridgeResult<BTreeSet<NodePath>> {
    let mut applied = BTreeSet::new();

    for setting in SETTING_OVERRIDES {
        let Some(raw) = env.non_blank(setting.var) else {
            continue;
        };

        let value = match setting.kind {
            ValueKind::Text => Node::String(raw),
            ValueKind::Count => raw
                .trim()
                .parse::<u32>()
                .map(|n| Node::Integer(i64::from(n)))
                .map_err(|_| {
                    BridgeError::InvalidConfig(format!(
                        "{} must be a non-negative integer",
                        setting.var
                    ))
                })?,
        };

        doc.set(setting.keys, value);
        let path = setting
            .keys
            .iter()
            .fold(NodePath::root(), |path, key| path.key(key));
        debug!(var = setting.var, path = %path, "applied environment override");
        applied.insert(path);
    }

    Ok(applied)
}

/// Apply positional credential overrides to every bank and sub-account
///
/// Returns the paths that were overridden.
pub fn apply_credential_overrides(doc: &mut Node, env: &impl EnvSource) -> BTreeSet<NodePath> {
    let mut applied = BTreeSet::new();
    let banks_path = NodePath::root().key("banks");

    let Some(banks) = doc.get_mut("banks").and_then(Node::as_sequence_mut) else {
        return applied;
    };

    for (i, bank) in banks.iter_mut().enumerate() {
        let bank_path = banks_path.index(i);
        override_credentials(bank, &bank_path, &format!("ACCOUNT_{}", i), env, &mut applied);

        let accounts_path = bank_path.key("accounts");
        let Some(accounts) = bank.get_mut("accounts").and_then(Node::as_sequence_mut) else {
            continue;
        };
        for (j, account) in accounts.iter_mut().enumerate() {
            override_credentials(
                account,
                &accounts_path.index(j),
                &format!("ACCOUNT_{}_SUB_{}", i, j),
                env,
                &mut applied,
            );
        }
    }

    applied
}

fn override_credentials(
    entry: &mut Node,
    entry_path: &NodePath,
    prefix: &str,
    env: &impl EnvSource,
    applied: &mut BTreeSet<NodePath>,
) {
    let mut fields: BTreeSet<String> = DEFAULT_CREDENTIAL_FIELDS
        .iter()
        .map(|field| (*field).to_string())
        .collect();
    if let Some(existing) = entry.get("credentials").and_then(Node::as_mapping) {
        fields.extend(existing.keys().cloned());
    }

    // a non-mapping entry or credentials node (e.g. one whole envelope) is
    // never replaced, or every other credential in it would be lost
    let writable = match entry {
        Node::Mapping(map) => matches!(
            map.get("credentials"),
            None | Some(Node::Null) | Some(Node::Mapping(_))
        ),
        _ => false,
    };

    for field in fields {
        let var = format!("{}_{}", prefix, screaming_snake(&field));
        let Some(value) = env.non_blank(&var) else {
            continue;
        };

        if !writable {
            warn!(
                var = %var,
                path = %entry_path,
                "ignoring credential override; entry or its credentials is not a mapping"
            );
            continue;
        }

        entry.set(&["credentials", field.as_str()], Node::String(value));
        let path = entry_path.key("credentials").key(&field);
        debug!(var = %var, path = %path, "applied credential override");
        applied.insert(path);
    }
}

/// Convert a camelCase key to SCREAMING_SNAKE_CASE (`userCode` -> `USER_CODE`)
pub fn screaming_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for c in key.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        if c == '-' || c == ' ' {
            out.push('_');
        } else {
            out.push(c.to_ascii_uppercase());
        }
        prev = Some(c);
    }
    out
}
