use super::ConfigError;

/// One flattened configuration entry.
///
/// Environment overrides always arrive as `Text`; YAML scalars keep their
/// native type. Conversions accept either spelling.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
    List(Vec<ConfigValue>),
}

impl ConfigValue {
    pub(crate) fn from_yaml(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Null => ConfigValue::Null,
            Yaml::Bool(b) => ConfigValue::Bool(*b),
            Yaml::Number(n) => n
                .as_i64()
                .map(ConfigValue::Integer)
                .or_else(|| n.as_f64().map(ConfigValue::Float))
                .unwrap_or_else(|| ConfigValue::Text(n.to_string())),
            Yaml::String(s) => ConfigValue::Text(s.clone()),
            Yaml::Sequence(items) => ConfigValue::List(items.iter().map(Self::from_yaml).collect()),
            Yaml::Mapping(_) | Yaml::Tagged(_) => ConfigValue::Text(format!("{value:?}")),
        }
    }

    /// Scalar rendered as text; `None` for nulls and lists.
    fn as_text(&self) -> Option<String> {
        match self {
            ConfigValue::Text(s) => Some(s.clone()),
            ConfigValue::Integer(i) => Some(i.to_string()),
            ConfigValue::Float(f) => Some(f.to_string()),
            ConfigValue::Bool(b) => Some(b.to_string()),
            ConfigValue::Null | ConfigValue::List(_) => None,
        }
    }
}

/// Conversion from a raw entry to the type a settings struct asks for.
pub trait FromConfigValue: Sized {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError>;
}

fn expected(key: &str, type_name: &'static str) -> ConfigError {
    ConfigError::TypeMismatch {
        key: key.to_string(),
        expected: type_name,
    }
}

/// Switch-like words accepted for booleans: `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl FromConfigValue for String {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        value.as_text().ok_or_else(|| expected(key, "string"))
    }
}

impl FromConfigValue for bool {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Bool(b) => Ok(*b),
            ConfigValue::Text(s) => parse_flag(s).ok_or_else(|| expected(key, "bool")),
            _ => Err(expected(key, "bool")),
        }
    }
}

impl FromConfigValue for i64 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Integer(i) => Ok(*i),
            ConfigValue::Text(s) => s.trim().parse().map_err(|_| expected(key, "integer")),
            _ => Err(expected(key, "integer")),
        }
    }
}

impl<T: FromConfigValue> FromConfigValue for Option<T> {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Null => Ok(None),
            ConfigValue::Text(s) if s.is_empty() => Ok(None),
            other => T::from_config_value(other, key).map(Some),
        }
    }
}

/// Narrower integers are read as `i64` and range-checked.
macro_rules! narrow_integer {
    ($($ty:ty),+) => {
        $(
            impl FromConfigValue for $ty {
                fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
                    let wide = i64::from_config_value(value, key)?;
                    <$ty>::try_from(wide).map_err(|_| expected(key, stringify!($ty)))
                }
            }
        )+
    };
}

narrow_integer!(u16, u32, u64, i32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_text_converts_to_scalars() {
        let port = ConfigValue::Text(" 5000 ".into());
        assert_eq!(u16::from_config_value(&port, "server.port").unwrap(), 5000);
        assert!(bool::from_config_value(&ConfigValue::Text("On".into()), "logging.http").unwrap());
        assert_eq!(
            String::from_config_value(&ConfigValue::Integer(30), "jwt.expire").unwrap(),
            "30"
        );
    }

    #[test]
    fn out_of_range_ports_are_rejected() {
        let err = u16::from_config_value(&ConfigValue::Integer(70_000), "server.port").unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { expected: "u16", .. }));
    }

    #[test]
    fn null_and_empty_text_are_absent_options() {
        let none: Option<String> = Option::from_config_value(&ConfigValue::Null, "app.reseturl").unwrap();
        assert!(none.is_none());
        let empty: Option<String> =
            Option::from_config_value(&ConfigValue::Text(String::new()), "app.reseturl").unwrap();
        assert!(empty.is_none());
    }
}
