use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FormKind, fields};

/// Configuration for the aggregation passes.
///
/// This holds the parts of the form conventions that vary between
/// deployments: how many leading section instances precede the item
/// sections, which fields count as additional charges, and which fields are
/// left out of item descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Leading section instances skipped before item sections, per form.
    pub leading_sections: LeadingSections,

    /// Quotation fields whose values are additional charges.
    additional_charge_fields: Vec<String>,

    /// Order fields left out of the canvass item description.
    excluded_description_fields: Vec<String>,
}

/// Number of leading section instances that carry no items, per form kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadingSections {
    /// Order to Purchase.
    #[serde(default = "default_order_leading")]
    pub order_to_purchase: usize,
    /// Quotation.
    #[serde(default = "default_quotation_leading")]
    pub quotation: usize,
    /// Receiving Inspecting Report.
    #[serde(default = "default_receiving_leading")]
    pub receiving_inspecting_report: usize,
}

impl Default for LeadingSections {
    fn default() -> Self {
        Self {
            order_to_purchase: default_order_leading(),
            quotation: default_quotation_leading(),
            receiving_inspecting_report: default_receiving_leading(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leading_sections: LeadingSections::default(),
            additional_charge_fields: default_additional_charge_fields(),
            excluded_description_fields: default_excluded_description_fields(),
        }
    }
}

/// Errors raised while reading or writing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid configuration TOML.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Leading section instances to skip for the given form kind.
    #[must_use]
    pub const fn leading_sections(&self, kind: FormKind) -> usize {
        match kind {
            FormKind::OrderToPurchase => self.leading_sections.order_to_purchase,
            FormKind::Quotation => self.leading_sections.quotation,
            FormKind::ReceivingInspectingReport => {
                self.leading_sections.receiving_inspecting_report
            }
        }
    }

    /// Field names counted as additional charges on quotations.
    #[must_use]
    pub fn additional_charge_fields(&self) -> &[String] {
        &self.additional_charge_fields
    }

    /// Whether the named field is an additional charge.
    #[must_use]
    pub fn is_additional_charge(&self, field_name: &str) -> bool {
        self.additional_charge_fields.iter().any(|f| f == field_name)
    }

    /// Whether the named field is left out of item descriptions.
    #[must_use]
    pub fn is_excluded_from_description(&self, field_name: &str) -> bool {
        self.excluded_description_fields
            .iter()
            .any(|f| f == field_name)
    }

    /// Adds an additional-charge field.
    ///
    /// Returns `true` if the field was added, `false` if it already existed.
    pub fn add_additional_charge(&mut self, field_name: String) -> bool {
        if self.is_additional_charge(&field_name) {
            false
        } else {
            self.additional_charge_fields.push(field_name);
            true
        }
    }
}

const fn default_order_leading() -> usize {
    2
}

const fn default_quotation_leading() -> usize {
    3
}

const fn default_receiving_leading() -> usize {
    2
}

fn default_additional_charge_fields() -> Vec<String> {
    [
        "Delivery Fee",
        "Bank Charge",
        "Mobilization Charge",
        "Demobilization Charge",
        "Freight Charge",
        "Hauling Charge",
        "Handling Charge",
        "Packing Charge",
    ]
    .map(String::from)
    .to_vec()
}

fn default_excluded_description_fields() -> Vec<String> {
    vec![fields::COST_CODE.to_string(), fields::GL_ACCOUNT.to_string()]
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_additional_charge_fields")]
        additional_charge_fields: Vec<String>,

        #[serde(default = "default_excluded_description_fields")]
        excluded_description_fields: Vec<String>,

        // tables serialize after plain values
        #[serde(default)]
        leading_sections: LeadingSections,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                leading_sections,
                additional_charge_fields,
                excluded_description_fields,
            } => Self {
                leading_sections,
                additional_charge_fields,
                excluded_description_fields,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            leading_sections: config.leading_sections,
            additional_charge_fields: config.additional_charge_fields,
            excluded_description_fields: config.excluded_description_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nadditional_charge_fields = [\"Crating Charge\"]\n\n\
              [leading_sections]\nquotation = 4\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.leading_sections(FormKind::Quotation), 4);
        assert_eq!(config.leading_sections(FormKind::OrderToPurchase), 2);
        assert!(config.is_additional_charge("Crating Charge"));
        assert!(!config.is_additional_charge("Delivery Fee"));
        assert!(config.is_excluded_from_description("GL Account"));
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Io(_)));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\n[leading_sections]\nquotation = \"three\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        config.leading_sections.receiving_inspecting_report = 1;
        assert!(config.add_additional_charge("Crating Charge".to_string()));
        assert!(!config.add_additional_charge("Delivery Fee".to_string()));

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
