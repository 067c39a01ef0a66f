use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aai::{segment, AaiClient};
use crate::error::{OnapError, ValidationError};
use crate::http_client::HttpMethod;

const COMPLEXES_PATH: &str = "cloud-infrastructure/complexes";

/// Physical location hosting cloud regions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Complex {
    pub physical_location_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complex_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_location_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_center_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplexList {
    #[serde(default)]
    pub complex: Vec<Complex>,
}

impl Complex {
    pub fn new(physical_location_id: impl Into<String>) -> Self {
        Self {
            physical_location_id: physical_location_id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.complex_name = Some(name.into());
        self
    }

    pub(crate) fn path(physical_location_id: &str) -> String {
        format!("{COMPLEXES_PATH}/complex/{}", segment(physical_location_id))
    }
}

impl AaiClient {
    pub async fn complexes(&self) -> Result<Vec<Complex>, OnapError> {
        let list: Option<ComplexList> = self
            .api()
            .get_json_optional("complex.list", COMPLEXES_PATH)
            .await?;
        Ok(list.map(|list| list.complex).unwrap_or_default())
    }

    pub async fn complex(&self, physical_location_id: &str) -> Result<Complex, OnapError> {
        self.api()
            .get_json_optional("complex.get", &Complex::path(physical_location_id))
            .await?
            .ok_or_else(|| OnapError::NotFound {
                resource: "complex",
                name: physical_location_id.to_owned(),
            })
    }

    /// Create (or replace) `complex` and return it as stored.
    pub async fn create_complex(&self, complex: &Complex) -> Result<Complex, OnapError> {
        if complex.physical_location_id.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "physical-location-id",
            }
            .into());
        }
        let path = Complex::path(&complex.physical_location_id);
        self.api()
            .send_json("complex.create", HttpMethod::Put, &path, complex)
            .await?;
        info!(physical_location_id = %complex.physical_location_id, "complex created");
        self.complex(&complex.physical_location_id).await
    }

    pub async fn delete_complex(&self, complex: &Complex) -> Result<(), OnapError> {
        let resource_version = complex
            .resource_version
            .as_deref()
            .ok_or(ValidationError::EmptyField {
                field: "resource-version",
            })?;
        let path = format!(
            "{}?resource-version={}",
            Complex::path(&complex.physical_location_id),
            segment(resource_version)
        );
        let request = self.api().request(HttpMethod::Delete, &path);
        self.api().send("complex.delete", request).await?;
        info!(physical_location_id = %complex.physical_location_id, "complex deleted");
        Ok(())
    }
}
