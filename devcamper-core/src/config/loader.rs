//! YAML sources for [`DevConfig`](super::DevConfig), flattened to dotted keys.

use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

pub(crate) type Entries = HashMap<String, ConfigValue>;

/// Merge `path` into `entries`, later keys winning. A missing file adds nothing.
pub(crate) fn merge_file(path: &Path, entries: &mut Entries) -> Result<(), ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ConfigError::Load(format!("{}: {e}", path.display()))),
    };
    merge_str(&text, entries).map_err(|e| match e {
        ConfigError::Load(msg) => ConfigError::Load(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Merge a YAML document into `entries`.
pub(crate) fn merge_str(text: &str, entries: &mut Entries) -> Result<(), ConfigError> {
    let root: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))?;

    // (dotted prefix, node) pairs still to visit.
    let mut pending = vec![(String::new(), &root)];
    while let Some((prefix, node)) = pending.pop() {
        let serde_yaml::Value::Mapping(map) = node else {
            if !prefix.is_empty() {
                entries.insert(prefix, ConfigValue::from_yaml(node));
            }
            continue;
        };
        for (key, child) in map {
            let segment = key
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{key:?}"));
            let dotted = if prefix.is_empty() {
                segment
            } else {
                format!("{prefix}.{segment}")
            };
            pending.push((dotted, child));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Entries {
        let mut entries = Entries::new();
        merge_str(text, &mut entries).unwrap();
        entries
    }

    #[test]
    fn sections_become_dotted_keys() {
        let entries = parse("jwt:\n  secret: abc\n  expire: 30\nstore:\n  backend: sqlite\n");
        assert_eq!(entries.get("jwt.secret"), Some(&ConfigValue::Text("abc".into())));
        assert_eq!(entries.get("jwt.expire"), Some(&ConfigValue::Integer(30)));
        assert_eq!(entries.get("store.backend"), Some(&ConfigValue::Text("sqlite".into())));
        assert!(!entries.contains_key("jwt"));
    }

    #[test]
    fn later_sources_override_earlier_ones() {
        let mut entries = parse("logging:\n  http: true\nserver:\n  port: 5000\n");
        merge_str("logging:\n  http: false\n", &mut entries).unwrap();
        assert_eq!(entries.get("logging.http"), Some(&ConfigValue::Bool(false)));
        assert_eq!(entries.get("server.port"), Some(&ConfigValue::Integer(5000)));
    }

    #[test]
    fn sequences_stay_lists() {
        let entries = parse("cors:\n  origins: [a, b]\n");
        assert!(matches!(entries.get("cors.origins"), Some(ConfigValue::List(items)) if items.len() == 2));
    }

    #[test]
    fn broken_yaml_is_a_load_error() {
        let err = merge_str("jwt: [unterminated", &mut Entries::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn missing_files_are_skipped() {
        let mut entries = Entries::new();
        merge_file(Path::new("does-not-exist/application.yaml"), &mut entries).unwrap();
        assert!(entries.is_empty());
    }
}
