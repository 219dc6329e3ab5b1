//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "appstore-publisher.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "appstore-publisher.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".appstore-publisher.toml",
        ".appstore-publisher.yaml",
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# appstore-publisher configuration
#
# Relative paths are resolved against the directory of this file.

# Login with Amazon security profile (JSON with client_id / client_secret)
security_profile = "amazon-security-profile.json"

# Appstore application id (amzn1.devportal.mobileapp...)
application_id = ""

# APKs to publish. Position i replaces the i-th APK already on the edit.
apks = ["app/build/outputs/apk/release/app-release.apk"]

# Delete the active edit and publish to a fresh one
replace_edit = false

# true: replace APK content in place (ids and targeting kept by the store)
# false: upload new APKs, copy the old device targeting, delete the old APKs
replace_apks = false

[api]
base_url = "https://developer.amazon.com/api/appstore/"
version = "v1"
token_url = "https://api.amazon.com/auth/o2/token"
read_timeout_secs = 30
write_timeout_secs = 60
large_upload_threshold_bytes = 314572800
attach_delay_secs = 60
"#;
