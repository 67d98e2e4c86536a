use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use toml_edit::{value, DocumentMut};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config file: {0}")]
    Io(#[from] io::Error),
    #[error("config file is not valid TOML: {0}")]
    Document(#[from] toml_edit::TomlError),
    #[error("invalid config value: {0}")]
    Value(#[from] toml::de::Error),
}

trait ConfigSerializeDefault {
    fn fix_config(self, name: &str, doc: &mut DocumentMut);
}

macro_rules! impl_simple_default {
    ( $( $type:ty ),* ) => {
        $(
            impl ConfigSerializeDefault for $type {
                fn fix_config(self, name: &str, doc: &mut DocumentMut) {
                    doc.entry(name).or_insert_with(|| value(self));
                }
            }
        )*
    }
}

impl_simple_default!(bool);

impl ConfigSerializeDefault for usize {
    fn fix_config(self, name: &str, doc: &mut DocumentMut) {
        let default = i64::try_from(self).unwrap_or(i64::MAX);
        doc.entry(name).or_insert_with(|| value(default));
    }
}

macro_rules! gen_config {
    (
        $( $(#[$doc:meta])* $name:ident: $type:ty = $default:expr),*
    ) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct EngineConfig {
            $(
                $(#[$doc])*
                pub $name: $type,
            )*
        }

        impl Default for EngineConfig {
            fn default() -> Self {
                Self {
                    $( $name: $default, )*
                }
            }
        }

        impl EngineConfig {
            /// Reads `config_file`, adding any missing key with its default and
            /// writing the file back if that changed it. A missing file is
            /// created.
            pub fn load(config_file: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
                let config_file = config_file.as_ref();
                let str = match fs::read_to_string(config_file) {
                    Ok(str) => str,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
                    Err(err) => return Err(err.into()),
                };
                let mut doc = str.parse::<DocumentMut>()?;

                $(
                    <$type as ConfigSerializeDefault>::fix_config($default, stringify!($name), &mut doc);
                )*

                let patched = doc.to_string();
                if str != patched {
                    fs::write(config_file, &patched)?;
                }

                Ok(toml::from_str(&patched)?)
            }
        }
    };
}

gen_config! {
    /// Most candidates a single parser offers during completion.
    completion_limit: usize = 20,
    /// Surface validation failures that have no error handler as
    /// `Dispatch::Unhandled` instead of only logging them.
    report_unhandled_errors: bool = false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config, EngineConfig::default());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("completion_limit = 20"));
        assert!(written.contains("report_unhandled_errors = false"));
    }

    #[test]
    fn existing_values_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(&path, "# tuned\ncompletion_limit = 5\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.completion_limit, 5);
        assert!(!config.report_unhandled_errors);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# tuned\ncompletion_limit = 5\n"));
    }

    #[test]
    fn bad_values_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");

        fs::write(&path, "completion_limit = \"many\"\n").unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(ConfigError::Value(_))));

        fs::write(&path, "completion_limit = \n").unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(ConfigError::Document(_))));
    }
}
