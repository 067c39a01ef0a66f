use ferronap_core::Settings;
use serde_json::Value;

use crate::error::CliError;

pub fn run(settings: &Settings) -> Result<Value, CliError> {
    settings.validate()?;
    Ok(serde_json::to_value(settings.redacted())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_redacted_keys() {
        let value = run(&Settings::default()).expect("default settings");

        assert_eq!(value["AAI_PASSWORD"], "***");
        assert_eq!(value["SDC_USER_ID"], "cs0008");
    }
}
