//! One handle over every subsystem client, sharing a single transport.

use std::sync::Arc;
use std::time::Duration;

use crate::aai::AaiClient;
use crate::config::Settings;
use crate::dmaap::DmaapClient;
use crate::error::OnapError;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::retry::{RetryConfig, RetryingHttpClient};
use crate::sdc::SdcClient;
use crate::ves::VesClient;

#[derive(Debug, Clone)]
pub struct Onap {
    settings: Settings,
    sdc: SdcClient,
    aai: AaiClient,
    dmaap: DmaapClient,
    ves: VesClient,
}

impl Onap {
    /// Validate `settings` and build every client over reqwest with the
    /// configured retry count.
    pub fn connect(settings: Settings) -> Result<Self, OnapError> {
        settings.validate()?;
        let transport: Arc<dyn HttpClient> =
            Arc::new(ReqwestHttpClient::with_tls_verification(settings.verify_tls));
        let retry = RetryConfig {
            max_retries: settings.default_retries,
            ..RetryConfig::default()
        };
        let http = Arc::new(RetryingHttpClient::new(transport, retry));
        Ok(Self::with_http(settings, http))
    }

    /// Build every client over `http` as is.
    pub fn with_http(settings: Settings, http: Arc<dyn HttpClient>) -> Self {
        Self {
            sdc: SdcClient::new(http.clone(), &settings),
            aai: AaiClient::new(http.clone(), &settings),
            dmaap: DmaapClient::new(http.clone(), &settings),
            ves: VesClient::new(http, &settings),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sdc(&self) -> &SdcClient {
        &self.sdc
    }

    pub fn aai(&self) -> &AaiClient {
        &self.aai
    }

    pub fn dmaap(&self) -> &DmaapClient {
        &self.dmaap
    }

    pub fn ves(&self) -> &VesClient {
        &self.ves
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.default_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OnapErrorKind;
    use crate::http_client::NoopHttpClient;

    #[test]
    fn connect_rejects_invalid_urls() {
        let settings = Settings {
            aai_url: String::from("not a url"),
            ..Settings::default()
        };

        let error = Onap::connect(settings).expect_err("invalid url");
        assert_eq!(error.kind(), OnapErrorKind::Configuration);
    }

    #[test]
    fn clients_share_settings() {
        let onap = Onap::with_http(Settings::default(), Arc::new(NoopHttpClient));

        assert!(onap.aai().api().base_url().ends_with("/aai/v16"));
        assert!(onap.ves().api().base_url().ends_with("/eventListener/v7"));
        assert_eq!(onap.default_timeout(), Duration::from_secs(30));
    }
}
