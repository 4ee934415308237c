//! Environment overrides for keys present in the YAML document.
//!
//! A key path such as `fhir.pseudonymizer.retry.max-wait` is overridden by
//! `FHIR_PSEUDONYMIZER_RETRY_MAX_WAIT`.
//!
//! Map-valued keys are filled from indexed variables: each
//! `GPAS_DOMAINS_CONFIG[0]=patient:pat` adds the entry `patient: pat` to
//! `gpas.domains.config`, creating the mapping if the document lacks it.

use std::collections::HashMap;

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

/// Environment variable name for a key path
pub fn env_key(path: &[&str]) -> String {
    path.join("_")
        .chars()
        .map(|c| match c {
            '-' | '.' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

/// Replace every leaf whose env key is set in `vars`
pub fn apply_env_overrides<I>(document: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: HashMap<String, String> = vars.into_iter().collect();
    if vars.is_empty() {
        return;
    }

    let mut path = Vec::new();
    override_node(document, &mut path, &vars);
    apply_indexed_entries(document, &vars);
}

/// Split `NAME[n]` into `NAME`
fn indexed_name(var: &str) -> Option<&str> {
    let (name, index) = var.strip_suffix(']')?.rsplit_once('[')?;
    let valid = !name.is_empty() && !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit());
    valid.then_some(name)
}

fn apply_indexed_entries(document: &mut Value, vars: &HashMap<String, String>) {
    let mut indexed: Vec<(&str, &str)> = vars
        .iter()
        .filter_map(|(var, value)| indexed_name(var).map(|name| (var.as_str(), value.as_str())))
        .collect();
    // Stable application order when two variables set the same key
    indexed.sort_unstable();

    for (var, raw) in indexed {
        let Some(name) = indexed_name(var) else {
            continue;
        };
        let Some((key, value)) = raw.split_once(':') else {
            warn!(var, "Ignoring map entry without a 'key:value' pair");
            continue;
        };

        let path = resolve_path(document, name);
        match mapping_at(document, &path) {
            Some(mapping) => {
                debug!(key = %path.join("."), entry = key, "Adding config map entry from environment");
                mapping.insert(Value::String(key.to_string()), Value::String(value.to_string()));
            }
            None => warn!(var, key = %path.join("."), "Ignoring map entry for a non-mapping config key"),
        }
    }
}

/// Key path for an env name, preferring keys already in the document
///
/// Segments not found in the document are taken from the name, lowercased
/// and split on `_`.
fn resolve_path(document: &Value, name: &str) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = Some(document);
    let mut rest = name;

    while !rest.is_empty() {
        let existing = current
            .and_then(Value::as_mapping)
            .into_iter()
            .flat_map(|mapping| mapping.keys().filter_map(Value::as_str))
            .filter(|key| {
                let env = env_key(&[*key]);
                rest == env || rest.starts_with(&format!("{}_", env))
            })
            .max_by_key(|key| key.len());

        let segment = match existing {
            Some(key) => key.to_string(),
            None => rest.split('_').next().unwrap_or(rest).to_ascii_lowercase(),
        };

        rest = rest.get(segment.len()..).unwrap_or("");
        rest = rest.strip_prefix('_').unwrap_or(rest);
        current = current.and_then(|node| node.get(segment.as_str()));
        path.push(segment);
    }

    path
}

/// Mapping at `path`, creating missing (or null) nodes along the way
fn mapping_at<'a>(document: &'a mut Value, path: &[String]) -> Option<&'a mut Mapping> {
    let mut current = document;
    for segment in path {
        if current.is_null() {
            *current = Value::Mapping(Mapping::new());
        }
        current = match current {
            Value::Mapping(mapping) => mapping
                .entry(Value::String(segment.clone()))
                .or_insert(Value::Null),
            _ => return None,
        };
    }

    if current.is_null() {
        *current = Value::Mapping(Mapping::new());
    }
    current.as_mapping_mut()
}

fn override_node<'a>(node: &'a mut Value, path: &mut Vec<&'a str>, vars: &HashMap<String, String>) {
    let Value::Mapping(mapping) = node else {
        return;
    };

    for (key, value) in mapping.iter_mut() {
        let Some(key) = key.as_str() else {
            continue;
        };

        path.push(key);
        if value.is_mapping() {
            override_node(value, path, vars);
        } else if let Some(raw) = vars.get(&env_key(path)) {
            debug!(key = %path.join("."), "Overriding config value from environment");
            *value = parse_override(value, raw);
        }
        path.pop();
    }
}

/// String leaves stay strings; anything else is parsed as a YAML scalar
fn parse_override(current: &Value, raw: &str) -> Value {
    if current.is_string() {
        return Value::String(raw.to_string());
    }

    match serde_yaml::from_str::<Value>(raw) {
        Ok(parsed @ (Value::Bool(_) | Value::Number(_))) => parsed,
        _ => Value::String(raw.to_string()),
    }
}
