use std::{collections::BTreeMap, fs, path::Path};

use anyhow::Context;
use client_core::{ClientConfig, HeaderName, HeaderValue};
use serde::Deserialize;
use shared::domain::DEFAULT_IDENTIFIER_FIELD;
use state_store::{MergeStrategy, OrderingPolicy};

pub const DEFAULT_SETTINGS_FILE: &str = "rest-sync.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: Option<String>,
    pub identifier_field: String,
    pub merge_strategy: MergeStrategy,
    pub ordering: OrderingPolicy,
    pub log_level: String,
    pub headers: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            identifier_field: DEFAULT_IDENTIFIER_FIELD.into(),
            merge_strategy: MergeStrategy::default(),
            ordering: OrderingPolicy::default(),
            log_level: "warn".into(),
            headers: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    base_url: Option<String>,
    identifier_field: Option<String>,
    merge_strategy: Option<MergeStrategy>,
    ordering: Option<OrderingPolicy>,
    log_level: Option<String>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

/// Defaults, then the settings file if it exists and parses, then the
/// environment. A file with an unknown value is ignored as a whole; an
/// environment value that does not parse leaves the previous layer in place.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<FileSettings>(raw) else {
        return;
    };

    if let Some(v) = file_cfg.base_url {
        settings.base_url = Some(v);
    }
    if let Some(v) = file_cfg.identifier_field {
        settings.identifier_field = v;
    }
    if let Some(v) = file_cfg.merge_strategy {
        settings.merge_strategy = v;
    }
    if let Some(v) = file_cfg.ordering {
        settings.ordering = v;
    }
    if let Some(v) = file_cfg.log_level {
        settings.log_level = v;
    }
    settings.headers.extend(file_cfg.headers);
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("REST_SYNC_BASE_URL") {
        settings.base_url = Some(v);
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = Some(v);
    }

    if let Some(v) = lookup("APP__IDENTIFIER_FIELD") {
        settings.identifier_field = v;
    }

    if let Some(Ok(v)) = lookup("APP__MERGE_STRATEGY").map(|v| v.parse::<MergeStrategy>()) {
        settings.merge_strategy = v;
    }

    if let Some(Ok(v)) = lookup("APP__ORDERING").map(|v| v.parse::<OrderingPolicy>()) {
        settings.ordering = v;
    }

    if let Some(v) = lookup("APP__LOG_LEVEL") {
        settings.log_level = v;
    }
}

impl Settings {
    /// Builds the client configuration; `base_url` and `headers` come from
    /// the command line and win over the settings file.
    pub fn client_config(
        &self,
        base_url: Option<&str>,
        headers: &[(HeaderName, HeaderValue)],
    ) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::new()
            .with_identifier_field(self.identifier_field.clone())
            .with_merge_strategy(self.merge_strategy)
            .with_ordering(self.ordering);

        if let Some(url) = base_url.or(self.base_url.as_deref()) {
            config = config
                .with_base_url(url)
                .with_context(|| format!("invalid base url '{url}'"))?;
        }

        for (name, value) in &self.headers {
            config = config
                .with_header(name, value)
                .with_context(|| format!("invalid header '{name}' in settings"))?;
        }
        for (name, value) in headers {
            config = config.with_header_value(name.clone(), value.clone());
        }

        Ok(config)
    }
}
