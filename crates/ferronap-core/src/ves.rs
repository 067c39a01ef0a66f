//! # Event Collection (VES)
//!
//! Builds VES 7.x events and posts them to the collector at
//! `{VES_URL}/eventListener/{VES_API_VERSION}`.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::info;

use crate::api::ApiClient;
use crate::config::Settings;
use crate::error::{OnapError, ValidationError};
use crate::http_client::{HttpAuth, HttpClient, HttpMethod};

pub const VES_EVENT_VERSION: &str = "4.1";
pub const VES_LISTENER_VERSION: &str = "7.2.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VesDomain {
    Fault,
    Heartbeat,
    Measurement,
    Notification,
    Other,
    PnfRegistration,
    StateChange,
    Syslog,
}

impl VesDomain {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fault => "fault",
            Self::Heartbeat => "heartbeat",
            Self::Measurement => "measurement",
            Self::Notification => "notification",
            Self::Other => "other",
            Self::PnfRegistration => "pnfRegistration",
            Self::StateChange => "stateChange",
            Self::Syslog => "syslog",
        }
    }

    /// Key of the domain-specific block next to the header.
    pub const fn fields_key(self) -> &'static str {
        match self {
            Self::Fault => "faultFields",
            Self::Heartbeat => "heartbeatFields",
            Self::Measurement => "measurementFields",
            Self::Notification => "notificationFields",
            Self::Other => "otherFields",
            Self::PnfRegistration => "pnfRegistrationFields",
            Self::StateChange => "stateChangeFields",
            Self::Syslog => "syslogFields",
        }
    }
}

impl Display for VesDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum VesPriority {
    High,
    Medium,
    #[default]
    Normal,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonEventHeader {
    pub domain: VesDomain,
    pub event_id: String,
    pub event_name: String,
    pub source_name: String,
    pub reporting_entity_name: String,
    pub priority: VesPriority,
    pub sequence: u64,
    pub start_epoch_microsec: i64,
    pub last_epoch_microsec: i64,
    pub version: String,
    pub ves_event_listener_version: String,
}

/// One event: common header plus a domain-specific JSON block.
#[derive(Debug, Clone, PartialEq)]
pub struct VesEvent {
    header: CommonEventHeader,
    fields: Value,
}

impl VesEvent {
    /// Event stamped now, with a fresh event id and an empty field block.
    pub fn new(
        domain: VesDomain,
        event_name: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        let source_name = source_name.into();
        let now = epoch_microseconds(OffsetDateTime::now_utc());
        Self {
            header: CommonEventHeader {
                domain,
                event_id: uuid::Uuid::new_v4().to_string(),
                event_name: event_name.into(),
                reporting_entity_name: source_name.clone(),
                source_name,
                priority: VesPriority::default(),
                sequence: 0,
                start_epoch_microsec: now,
                last_epoch_microsec: now,
                version: String::from(VES_EVENT_VERSION),
                ves_event_listener_version: String::from(VES_LISTENER_VERSION),
            },
            fields: json!({}),
        }
    }

    pub fn with_priority(mut self, priority: VesPriority) -> Self {
        self.header.priority = priority;
        self
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.header.sequence = sequence;
        self
    }

    pub fn with_reporting_entity(mut self, name: impl Into<String>) -> Self {
        self.header.reporting_entity_name = name.into();
        self
    }

    pub fn with_fields(mut self, fields: Value) -> Self {
        self.fields = fields;
        self
    }

    pub fn header(&self) -> &CommonEventHeader {
        &self.header
    }

    pub fn fields(&self) -> &Value {
        &self.fields
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.header.event_name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "eventName" });
        }
        if self.header.source_name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "sourceName" });
        }
        Ok(())
    }
}

impl Serialize for VesEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("commonEventHeader", &self.header)?;
        map.serialize_entry(self.header.domain.fields_key(), &self.fields)?;
        map.end()
    }
}

fn epoch_microseconds(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000) as i64
}

/// VES collector client.
#[derive(Debug, Clone)]
pub struct VesClient {
    api: ApiClient,
}

impl VesClient {
    pub fn new(http: Arc<dyn HttpClient>, settings: &Settings) -> Self {
        let base_url = format!(
            "{}/eventListener/{}",
            settings.ves_url.trim_end_matches('/'),
            settings.ves_api_version
        );
        let api = ApiClient::new(http, base_url)
            .with_auth(HttpAuth::basic(&settings.ves_username, &settings.ves_password))
            .with_timeout_ms(settings.default_timeout_ms);
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn send_event(&self, event: &VesEvent) -> Result<(), OnapError> {
        event.validate()?;
        self.api
            .send_json("ves.send_event", HttpMethod::Post, "", &json!({ "event": event }))
            .await?;
        info!(
            domain = %event.header.domain,
            event_id = %event.header.event_id,
            "event sent"
        );
        Ok(())
    }

    pub async fn send_batch(&self, events: &[VesEvent]) -> Result<(), OnapError> {
        if events.is_empty() {
            return Err(ValidationError::EmptyField { field: "eventList" }.into());
        }
        for event in events {
            event.validate()?;
        }
        self.api
            .send_json(
                "ves.send_batch",
                HttpMethod::Post,
                "eventBatch",
                &json!({ "eventList": events }),
            )
            .await?;
        info!(count = events.len(), "event batch sent");
        Ok(())
    }
}
