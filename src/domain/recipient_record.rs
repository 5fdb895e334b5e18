use std::str::FromStr;

use serde_json::{Map, Value};

use crate::domain::recipient_email::RecipientEmail;

/// Columns a structured recipient list may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientColumn {
    Email,
    Name,
    ReturnPath,
    Metadata,
    SubstitutionData,
    Tags,
}

impl RecipientColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientColumn::Email => "email",
            RecipientColumn::Name => "name",
            RecipientColumn::ReturnPath => "return_path",
            RecipientColumn::Metadata => "metadata",
            RecipientColumn::SubstitutionData => "substitution_data",
            RecipientColumn::Tags => "tags",
        }
    }
}

impl FromStr for RecipientColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(RecipientColumn::Email),
            "name" => Ok(RecipientColumn::Name),
            "return_path" => Ok(RecipientColumn::ReturnPath),
            "metadata" => Ok(RecipientColumn::Metadata),
            "substitution_data" => Ok(RecipientColumn::SubstitutionData),
            "tags" => Ok(RecipientColumn::Tags),
            other => Err(other.to_string()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RecipientFieldError {
    #[error("missing email field")]
    MissingEmail,
    #[error("{0}")]
    InvalidEmail(String),
    #[error("`{column}` is not valid JSON")]
    InvalidJson {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RecipientAddress {
    pub email: RecipientEmail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One addressee of a transmission.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RecipientRecord {
    address: RecipientAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    substitution_data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
}

/// Raw, non-empty cell values of one input row, keyed by column.
#[derive(Debug, Default)]
pub struct RecipientFields {
    pub email: Option<String>,
    pub name: Option<String>,
    pub return_path: Option<String>,
    pub metadata: Option<String>,
    pub substitution_data: Option<String>,
    pub tags: Option<String>,
}

impl RecipientFields {
    pub fn set(&mut self, column: RecipientColumn, value: String) {
        let slot = match column {
            RecipientColumn::Email => &mut self.email,
            RecipientColumn::Name => &mut self.name,
            RecipientColumn::ReturnPath => &mut self.return_path,
            RecipientColumn::Metadata => &mut self.metadata,
            RecipientColumn::SubstitutionData => &mut self.substitution_data,
            RecipientColumn::Tags => &mut self.tags,
        };
        *slot = Some(value);
    }
}

impl RecipientRecord {
    /// A record carrying only an address, as produced by plain lists.
    pub fn from_email(email: RecipientEmail) -> Self {
        Self {
            address: RecipientAddress { email, name: None },
            return_path: None,
            metadata: None,
            substitution_data: None,
            tags: None,
        }
    }

    pub fn parse(fields: RecipientFields) -> Result<Self, RecipientFieldError> {
        let email = fields.email.ok_or(RecipientFieldError::MissingEmail)?;
        let email = RecipientEmail::parse(email).map_err(RecipientFieldError::InvalidEmail)?;

        Ok(Self {
            address: RecipientAddress {
                email,
                name: fields.name,
            },
            return_path: fields.return_path,
            metadata: decode_json(RecipientColumn::Metadata, fields.metadata)?,
            substitution_data: decode_json(RecipientColumn::SubstitutionData, fields.substitution_data)?,
            tags: decode_json(RecipientColumn::Tags, fields.tags)?,
        })
    }

    pub fn address(&self) -> &RecipientAddress {
        &self.address
    }

    pub fn return_path(&self) -> Option<&str> {
        self.return_path.as_deref()
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }

    pub fn substitution_data(&self) -> Option<&Map<String, Value>> {
        self.substitution_data.as_ref()
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(
    column: RecipientColumn,
    raw: Option<String>,
) -> Result<Option<T>, RecipientFieldError> {
    raw.map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(|source| RecipientFieldError::InvalidJson {
            column: column.as_str(),
            source,
        })
}
