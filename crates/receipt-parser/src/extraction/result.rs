//! Result payload of a document-analysis job.
//!
//! Mirrors the `analyzeResult` object returned by the receipt model. Every
//! field is optional: the service omits whatever it could not recognize.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default)]
    pub documents: Vec<AnalyzedDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub fields: HashMap<String, DocumentField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A recognized field. Which `value*` member is set depends on the field type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentField {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_currency: Option<CurrencyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_array: Option<Vec<DocumentField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_object: Option<HashMap<String, DocumentField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyValue {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

impl DocumentField {
    pub fn string(value: &str) -> Self {
        Self {
            field_type: Some("string".to_string()),
            value_string: Some(value.to_string()),
            ..Self::default()
        }
    }

    pub fn number(value: f64) -> Self {
        Self {
            field_type: Some("number".to_string()),
            value_number: Some(value),
            ..Self::default()
        }
    }

    pub fn date(value: &str) -> Self {
        Self {
            field_type: Some("date".to_string()),
            value_date: Some(value.to_string()),
            ..Self::default()
        }
    }

    pub fn object(fields: impl IntoIterator<Item = (&'static str, DocumentField)>) -> Self {
        Self {
            field_type: Some("object".to_string()),
            value_object: Some(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn array(items: Vec<DocumentField>) -> Self {
        Self {
            field_type: Some("array".to_string()),
            value_array: Some(items),
            ..Self::default()
        }
    }

    /// Numeric value, accepting both plain numbers and currency amounts.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value_number
            .or_else(|| self.value_currency.as_ref().and_then(|c| c.amount))
    }
}
