//! Rule-file loading.
//!
//! The rule file is a JSON array of [`Rule`] records. Filters may reference
//! auxiliary content files (device lists) by a path relative to the rule
//! file; that content is loaded here, once, at startup. Any unreadable or
//! unparsable file aborts startup.

use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::rule::{DeviceList, FilterSpec, Rule};

/// Load and fully resolve the rule file at `path`.
///
/// Resolution loads the content of every `device-in-list` filter from its
/// sibling path, so the returned rules need no further I/O to evaluate.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<Rule>, ConfigError> {
    let path = path.as_ref();

    let data = std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rules: Vec<Rule> =
        serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    // Auxiliary content paths are relative to the rule file's directory.
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    for rule in &mut rules {
        for filter in &mut rule.filters {
            if let FilterSpec::DeviceInList { path, content } = filter {
                *content = Some(load_device_list(&base.join(path.as_str()))?);
            }
        }
        tracing::debug!(
            rule = %rule.id,
            filters = rule.filters.len(),
            decorators = rule.decorators.len(),
            "Loaded rule"
        );
    }

    Ok(rules)
}

/// Load one device-list content file.
fn load_device_list(path: &Path) -> Result<DeviceList, ConfigError> {
    let data = std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a device-alias option string of the form `"from=to,old=new"`.
///
/// Entries without a `=` or with an empty side are ignored.
pub fn parse_device_aliases(spec: &str) -> HashMap<String, String> {
    spec.split(',')
        .filter_map(|pair| {
            let (from, to) = pair.split_once('=')?;
            let (from, to) = (from.trim(), to.trim());
            if from.is_empty() || to.is_empty() {
                return None;
            }
            Some((from.to_string(), to.to_string()))
        })
        .collect()
}
