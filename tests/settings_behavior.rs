//! Behaviour tests for settings loading.

use std::io::Write;

use ferronap_core::{Onap, SettingsError, SETTINGS_ENV_VAR};
use ferronap_tests::*;

fn settings_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write settings");
    file
}

#[test]
fn when_file_names_some_keys_only_those_change() {
    // Given: A file overriding the inventory URL and version
    let file = settings_file(r#"{"AAI_URL":"https://aai.lab:8443","AAI_API_VERSION":"v19"}"#);

    // When: It is loaded
    let settings = Settings::from_file(file.path()).expect("valid settings");

    // Then: Named keys change and the rest keep their defaults
    let defaults = Settings::default();
    assert_eq!(settings.aai_url, "https://aai.lab:8443");
    assert_eq!(settings.aai_api_version, "v19");
    assert_eq!(settings.sdc_be_url, defaults.sdc_be_url);
    assert_eq!(settings.default_retries, defaults.default_retries);
}

#[test]
fn when_file_is_malformed_a_configuration_error_is_returned() {
    // Given: A file that is not JSON
    let file = settings_file("AAI_URL = nope");

    // When: It is loaded through the client facade
    let error = Settings::from_file(file.path()).expect_err("malformed");

    // Then: The parse failure names the file
    assert!(matches!(error, SettingsError::Parse { .. }));
    assert!(error.to_string().contains(&file.path().display().to_string()));
    assert_eq!(OnapError::from(error).kind(), OnapErrorKind::Configuration);
}

#[test]
fn when_url_is_invalid_the_key_is_reported() {
    // Given: A file with an unparseable DMaaP URL
    let file = settings_file(r#"{"DMAAP_URL":"dmaap without scheme"}"#);

    // When: It is loaded
    let error = Settings::from_file(file.path()).expect_err("invalid url");

    // Then: The offending key is named
    assert!(matches!(error, SettingsError::InvalidUrl { key: "DMAAP_URL", .. }));
}

#[test]
fn when_env_var_points_to_a_file_it_is_used() {
    // Given: The settings variable naming a file
    let file = settings_file(r#"{"INSTANCE_ID":"lab-7"}"#);
    std::env::set_var(SETTINGS_ENV_VAR, file.path());

    // When: Settings are read from the environment
    let settings = Settings::from_env();
    std::env::remove_var(SETTINGS_ENV_VAR);

    // Then: The file's value is applied and clients pick it up
    let settings = settings.expect("valid settings");
    assert_eq!(settings.instance_id, "lab-7");
    let onap = Onap::connect(settings).expect("connect");
    let request = onap
        .aai()
        .api()
        .request(HttpMethod::Get, "cloud-infrastructure/complexes");
    assert_eq!(
        request.headers.get("x-fromappid").map(String::as_str),
        Some("lab-7")
    );
}
