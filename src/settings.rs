use crate::error::StoreError;
use crate::node::Node;
use crate::storage;
use crate::value::{ScalarType, ScalarValue};
use anyhow::{Context, Result, anyhow};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_PATH_KEY: &str = "data-path";
pub const WINDOWS_DATA_PATH_KEY: &str = "windows-data-path";

#[derive(Debug, Clone, Default)]
pub struct Settings {
    defaults: BTreeMap<String, Node>,
    user: BTreeMap<String, Node>,
    user_path: Option<PathBuf>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(defaults: Node, user: Node) -> Result<Self, StoreError> {
        Ok(Self {
            defaults: into_entries(defaults, "defaults")?,
            user: into_entries(user, "user settings")?,
            user_path: None,
        })
    }

    pub fn load(defaults_path: impl AsRef<Path>, user_path: impl AsRef<Path>) -> Result<Self> {
        let defaults_path = defaults_path.as_ref();
        let user_path = user_path.as_ref();

        let defaults = storage::read_node(defaults_path).with_context(|| {
            format!("Failed to read default settings: {}", defaults_path.display())
        })?;

        if !user_path.is_file() {
            if let Some(parent) = user_path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory: {}", parent.display())
                })?;
            }
            storage::write_node(user_path, &Node::empty_object()).with_context(|| {
                format!("Failed to create user settings: {}", user_path.display())
            })?;
            log::info!("created empty user settings at {}", user_path.display());
        }
        let user = storage::read_node(user_path)
            .with_context(|| format!("Failed to read user settings: {}", user_path.display()))?;

        let mut settings = Self::from_nodes(defaults, user)?;
        settings.user_path = Some(user_path.to_path_buf());
        Ok(settings)
    }

    pub fn get<T: ScalarType>(&self, key: &str) -> Option<T> {
        lookup(&self.user, key).or_else(|| lookup(&self.defaults, key))
    }

    pub fn set_user<T: ScalarType>(&mut self, key: &str, value: T) -> Result<(), StoreError> {
        let value = value.into_scalar();
        if !value.is_finite() {
            return Err(StoreError::NonFiniteFloat(key.to_string()));
        }
        self.user
            .insert(key.to_string(), Node::Scalar(value.to_literal()));
        Ok(())
    }

    pub fn reset_user(&mut self, key: &str) -> bool {
        self.user.remove(key).is_some()
    }

    pub fn save_user(&self) -> Result<()> {
        let path = self
            .user_path
            .as_ref()
            .ok_or_else(|| anyhow!("settings were not loaded from a user file"))?;
        storage::write_node(path, &Node::Object(self.user.clone()))
            .with_context(|| format!("Failed to write user settings: {}", path.display()))?;
        log::info!("settings saved");
        Ok(())
    }

    pub fn data_dir(&self) -> Option<PathBuf> {
        let platform = if cfg!(windows) {
            self.get::<String>(WINDOWS_DATA_PATH_KEY)
        } else {
            None
        };
        let raw = platform.or_else(|| self.get::<String>(DATA_PATH_KEY))?;
        Some(PathBuf::from(expand_env(&raw)))
    }
}

fn into_entries(node: Node, what: &str) -> Result<BTreeMap<String, Node>, StoreError> {
    match node {
        Node::Object(entries) => Ok(entries),
        other => Err(StoreError::decode(format!(
            "{} must be an object, found {}",
            what,
            other.shape().describe()
        ))),
    }
}

fn lookup<T: ScalarType>(entries: &BTreeMap<String, Node>, key: &str) -> Option<T> {
    let lit = entries.get(key)?.as_literal()?;
    let value = ScalarValue::from_literal(lit, T::KIND).ok()?;
    T::from_scalar(&value)
}

/// Expands `%VAR%`, `${VAR}` and `$VAR`. Unset variables are left as
/// written.
pub fn expand_env(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(['%', '$']) {
        out.push_str(&rest[..pos]);
        let marker = if rest[pos..].starts_with('%') { '%' } else { '$' };
        let after = &rest[pos + 1..];

        let (name, consumed) = if marker == '%' {
            match after.find('%') {
                Some(end) => (&after[..end], end + 1),
                None => ("", 0),
            }
        } else if let Some(inner) = after.strip_prefix('{') {
            match inner.find('}') {
                Some(end) => (&inner[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        let value = if name.is_empty() {
            None
        } else {
            std::env::var(name).ok()
        };
        match value {
            Some(value) => {
                out.push_str(&value);
                rest = &after[consumed..];
            }
            None => {
                out.push(marker);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
