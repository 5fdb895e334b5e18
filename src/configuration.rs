use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_json::{Map, Value};

use crate::errors::ConfigurationError;

pub const DEFAULT_SETTINGS_FILE: &str = "sparkpost.ini";
const DEFAULT_HOST: &str = "api.sparkpost.com";
const DEFAULT_BATCH_SIZE: usize = 10000;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    #[serde(alias = "SparkPost")]
    pub sparkpost: SparkPostSettings,
}

/// The `[SparkPost]` section of the settings file.
///
/// Keys keep the spelling operators know from the file (`Return-Path`,
/// `BatchSize`) and are also accepted lowercased.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct SparkPostSettings {
    #[serde(default, alias = "Authorization")]
    pub authorization: Option<Secret<String>>,
    #[serde(default = "default_host", alias = "Host")]
    pub host: String,
    #[serde(default, alias = "Binding")]
    pub binding: Option<String>,
    #[serde(default, rename = "return-path", alias = "Return-Path")]
    pub return_path: Option<String>,
    #[serde(default, alias = "Campaign")]
    pub campaign: Option<String>,
    #[serde(default, rename = "globalsub", alias = "GlobalSub")]
    pub global_sub: Option<String>,
    #[serde(
        default = "default_batch_size",
        rename = "batchsize",
        alias = "BatchSize",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub batch_size: usize,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Settings checked and decoded, ready to drive a run.
#[derive(Clone, Debug)]
pub struct ValidatedSettings {
    pub authorization: Secret<String>,
    pub base_url: String,
    pub binding: Option<String>,
    pub return_path: Option<String>,
    pub campaign: Option<String>,
    pub global_substitution_data: Option<Map<String, Value>>,
    pub batch_size: usize,
}

impl SparkPostSettings {
    /// `https://` is prepended unless the host already names a scheme.
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            self.host.clone()
        } else {
            format!("https://{}", self.host)
        }
    }

    pub fn validate(self, source: &str) -> Result<ValidatedSettings, ConfigurationError> {
        let authorization = self
            .authorization
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .cloned()
            .ok_or_else(|| ConfigurationError::MissingAuthorization(source.to_string()))?;

        let base_url = self.base_url();

        if self.batch_size == 0 {
            return Err(ConfigurationError::ZeroBatchSize);
        }

        let global_substitution_data = non_empty(self.global_sub.clone())
            .map(|raw| serde_json::from_str::<Map<String, Value>>(&raw))
            .transpose()
            .map_err(ConfigurationError::InvalidGlobalSub)?;

        Ok(ValidatedSettings {
            authorization,
            base_url,
            binding: non_empty(self.binding),
            return_path: non_empty(self.return_path),
            campaign: non_empty(self.campaign),
            global_substitution_data,
            batch_size: self.batch_size,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reads the INI settings file, then lets `APP_SPARKPOST__<KEY>` environment
/// variables override individual keys.
pub fn get_configuration(path: &str) -> Result<Settings, ConfigurationError> {
    let mut settings = config::Config::default();

    settings.merge(config::File::new(path, config::FileFormat::Ini))?;
    settings.merge(config::Environment::with_prefix("app").separator("__"))?;

    Ok(settings.try_into()?)
}

/// Same as [`get_configuration`] but from INI text already in memory.
pub fn configuration_from_str(ini: &str) -> Result<Settings, ConfigurationError> {
    let mut settings = config::Config::default();
    settings.merge(config::File::from_str(ini, config::FileFormat::Ini))?;
    Ok(settings.try_into()?)
}
