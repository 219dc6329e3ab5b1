//! HTTP implementation of [`AppstoreApi`]

use reqwest::header::{CONTENT_TYPE, ETAG, IF_MATCH};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, info};
use url::Url;

use super::auth::{fetch_token, AccessToken, SecurityProfile};
use crate::error::{Result, StoreError};
use crate::traits::AppstoreApi;
use crate::types::*;

const APK_CONTENT_TYPE: &str = "application/vnd.android.package-archive";

/// Amazon Appstore REST client bound to one application
#[derive(Debug)]
pub struct AppstoreClient {
    /// HTTP client
    client: Client,

    /// API root, always ending in '/'
    base_url: Url,

    /// API version segment
    version: String,

    /// Appstore application id
    application_id: String,

    /// Bearer token
    token: AccessToken,
}

/// Build the HTTP client from the API configuration
///
/// `reqwest` has no separate write timeout; the write budget bounds connection
/// setup, the read timeout applies to every read of a response.
pub fn build_http_client(config: &ApiConfig) -> Result<Client> {
    let client = Client::builder()
        .read_timeout(config.read_timeout())
        .connect_timeout(config.write_timeout())
        .user_agent(concat!("appstore-publisher/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

impl AppstoreClient {
    /// Create a client from an existing token
    pub fn new(
        config: &ApiConfig,
        application_id: impl Into<String>,
        token: AccessToken,
    ) -> Result<Self> {
        Self::with_client(build_http_client(config)?, config, application_id, token)
    }

    fn with_client(
        client: Client,
        config: &ApiConfig,
        application_id: impl Into<String>,
        token: AccessToken,
    ) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| {
            StoreError::ConfigurationError(format!("Invalid API base URL '{}': {}", base, e))
        })?;

        Ok(Self {
            client,
            base_url,
            version: config.version.clone(),
            application_id: application_id.into(),
            token,
        })
    }

    /// Fetch a token for the security profile and create a client with it
    pub async fn authenticate(
        config: &ApiConfig,
        application_id: impl Into<String>,
        profile: &SecurityProfile,
    ) -> Result<Self> {
        let client = build_http_client(config)?;
        let token = fetch_token(&client, &config.token_url, profile).await?;
        Self::with_client(client, config, application_id, token)
    }

    /// Resolve a path below `{version}/applications/{appId}/`
    fn url(&self, path: &str) -> Result<Url> {
        let relative = format!("{}/applications/{}/{}", self.version, self.application_id, path);
        self.base_url.join(&relative).map_err(|e| {
            StoreError::ConfigurationError(format!("Invalid API path '{}': {}", relative, e))
        })
    }

    /// Start an authenticated request
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        debug!("Making {} request to {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .header("Authorization", self.token.bearer()))
    }

    /// Send a request, turning non-success statuses into [`StoreError::ApiError`]
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response)
    }

    /// Decode an APK body and attach the response ETag
    async fn apk_from_response(response: Response) -> Result<Apk> {
        let etag = etag_of(&response).unwrap_or_default();
        let mut apk: Apk = response.json().await?;
        apk.etag = etag;
        Ok(apk)
    }
}

/// ETag header of a response
fn etag_of(response: &Response) -> Option<String> {
    response
        .headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Parse the active-edit body; empty bodies and blank ids mean no edit
fn parse_active_edit(body: &str, etag: Option<String>) -> Result<Option<Edit>> {
    let body = body.trim();
    if body.is_empty() || body == "{}" {
        return Ok(None);
    }

    let mut edit: Edit = serde_json::from_str(body)?;
    if edit.id.trim().is_empty() {
        return Ok(None);
    }
    edit.etag = etag.unwrap_or_default();
    Ok(Some(edit))
}

#[async_trait::async_trait]
impl AppstoreApi for AppstoreClient {
    async fn get_active_edit(&self) -> Result<Option<Edit>> {
        let response = self.request(Method::GET, "edits")?.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let etag = etag_of(&response);
        let body = response.text().await?;
        parse_active_edit(&body, etag)
    }

    async fn create_edit(&self) -> Result<Edit> {
        let response = self.send(self.request(Method::POST, "edits")?).await?;
        let etag = etag_of(&response).unwrap_or_default();
        let mut edit: Edit = response.json().await?;
        edit.etag = etag;
        info!(edit_id = %edit.id, "Created edit");
        Ok(edit)
    }

    async fn delete_edit(&self, edit_id: &str, etag: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, &format!("edits/{}", edit_id))?
            .header(IF_MATCH, etag);
        self.send(request).await?;
        Ok(())
    }

    async fn list_apks(&self, edit_id: &str) -> Result<Vec<Apk>> {
        let request = self.request(Method::GET, &format!("edits/{}/apks", edit_id))?;
        let response = self.send(request).await?;
        let apks: Vec<Apk> = response.json().await?;
        Ok(apks)
    }

    async fn get_apk(&self, edit_id: &str, apk_id: &str) -> Result<Apk> {
        let request = self.request(Method::GET, &format!("edits/{}/apks/{}", edit_id, apk_id))?;
        let response = self.send(request).await?;
        Self::apk_from_response(response).await
    }

    async fn upload_apk(&self, edit_id: &str, payload: ApkPayload) -> Result<Apk> {
        let request = self
            .request(Method::POST, &format!("edits/{}/apks/upload", edit_id))?
            .header(CONTENT_TYPE, APK_CONTENT_TYPE)
            .header("filename", payload.filename.as_str())
            .body(payload.bytes);

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::UploadFailed(format!(
                "{} - {}",
                status.as_u16(),
                error_text
            )));
        }

        Self::apk_from_response(response).await
    }

    async fn upload_large_apk(
        &self,
        edit_id: &str,
        payload: ApkPayload,
    ) -> Result<LargeUploadReference> {
        let request = self
            .request(Method::POST, &format!("edits/{}/apks/large/upload", edit_id))?
            .header(CONTENT_TYPE, APK_CONTENT_TYPE)
            .header("fileName", payload.filename.as_str())
            .body(payload.bytes);

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::UploadFailed(format!(
                "{} - {}",
                status.as_u16(),
                error_text
            )));
        }

        Ok(LargeUploadReference(response.text().await?))
    }

    async fn attach_apk(&self, edit_id: &str, reference: &LargeUploadReference) -> Result<Apk> {
        let request = self
            .request(Method::POST, &format!("edits/{}/apks/attach", edit_id))?
            .header(CONTENT_TYPE, "application/json")
            .body(reference.as_str().to_string());

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::AttachFailed(format!(
                "{} - {}",
                status.as_u16(),
                error_text
            )));
        }

        Self::apk_from_response(response).await
    }

    async fn replace_apk(
        &self,
        edit_id: &str,
        apk_id: &str,
        etag: &str,
        payload: ApkPayload,
    ) -> Result<()> {
        let request = self
            .request(
                Method::PUT,
                &format!("edits/{}/apks/{}/replace", edit_id, apk_id),
            )?
            .header(CONTENT_TYPE, APK_CONTENT_TYPE)
            .header(IF_MATCH, etag)
            .header("filename", payload.filename.as_str())
            .body(payload.bytes);

        self.send(request).await?;
        Ok(())
    }

    async fn delete_apk(&self, edit_id: &str, apk_id: &str, etag: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, &format!("edits/{}/apks/{}", edit_id, apk_id))?
            .header(IF_MATCH, etag);

        self.send(request).await?;
        Ok(())
    }

    async fn get_targeting(&self, edit_id: &str, apk_id: &str) -> Result<ApkTargeting> {
        let request = self.request(
            Method::GET,
            &format!("edits/{}/apks/{}/targeting", edit_id, apk_id),
        )?;
        let response = self.send(request).await?;

        let etag = etag_of(&response)
            .ok_or_else(|| StoreError::MissingEtag(format!("targeting of APK {}", apk_id)))?;
        let targeting: ApkTargeting = response.json().await?;
        Ok(targeting.with_etag(etag))
    }

    async fn set_targeting(
        &self,
        edit_id: &str,
        apk_id: &str,
        targeting: &ApkTargeting,
    ) -> Result<()> {
        let request = self
            .request(
                Method::PUT,
                &format!("edits/{}/apks/{}/targeting", edit_id, apk_id),
            )?
            .header(IF_MATCH, targeting.etag.as_str())
            .json(targeting);

        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const APP: &str = "amzn1.devportal.mobileapp.abc";

    fn client(base_url: &str) -> AppstoreClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        AppstoreClient::new(&config, APP, AccessToken::new("t")).unwrap()
    }

    #[test]
    fn test_url_layout() {
        let client = client("https://developer.amazon.com/api/appstore/");
        let url = client.url("edits/E1/apks/A1/targeting").unwrap();
        assert_eq!(
            url.as_str(),
            "https://developer.amazon.com/api/appstore/v1/applications/amzn1.devportal.mobileapp.abc/edits/E1/apks/A1/targeting"
        );
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let client = client("https://example.test/api/appstore");
        let url = client.url("edits").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.test/api/appstore/v1/applications/amzn1.devportal.mobileapp.abc/edits"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        let result = AppstoreClient::new(&config, "app", AccessToken::new("t"));
        assert!(matches!(result, Err(StoreError::ConfigurationError(_))));
    }

    #[test]
    fn test_parse_active_edit() {
        assert!(parse_active_edit("", None).unwrap().is_none());
        assert!(parse_active_edit("{}", None).unwrap().is_none());
        assert!(parse_active_edit(r#"{"id": ""}"#, None).unwrap().is_none());

        let edit = parse_active_edit(
            r#"{"id": "E1", "status": "IN_PROGRESS"}"#,
            Some("\"etag-1\"".to_string()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(edit.id, "E1");
        assert_eq!(edit.status.as_deref(), Some("IN_PROGRESS"));
        assert_eq!(edit.etag, "\"etag-1\"");
    }

    fn api_path(path: &str) -> String {
        format!("/v1/applications/{}/{}", APP, path)
    }

    fn payload() -> ApkPayload {
        ApkPayload::new("app-release.apk", b"apk-bytes".to_vec())
    }

    #[tokio::test]
    async fn test_active_edit_absent_on_404_and_204() {
        for status in [404, 204] {
            let server = MockServer::start_async().await;
            let mock = server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(api_path("edits"))
                        .header("authorization", "Bearer t");
                    then.status(status);
                })
                .await;

            let edit = client(&server.base_url()).get_active_edit().await.unwrap();
            assert!(edit.is_none(), "status {}", status);
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_active_edit_carries_etag() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(api_path("edits"));
                then.status(200)
                    .header("etag", "\"edit-etag\"")
                    .json_body(json!({"id": "E1", "status": "IN_PROGRESS"}));
            })
            .await;

        let edit = client(&server.base_url())
            .get_active_edit()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edit.id, "E1");
        assert_eq!(edit.etag, "\"edit-etag\"");
    }

    #[tokio::test]
    async fn test_mutations_send_if_match() {
        let server = MockServer::start_async().await;
        let delete_edit = server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path(api_path("edits/E1"))
                    .header("if-match", "\"e-edit\"");
                then.status(204);
            })
            .await;
        let replace = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path(api_path("edits/E1/apks/A1/replace"))
                    .header("if-match", "\"e-apk\"")
                    .header("content-type", APK_CONTENT_TYPE)
                    .header("filename", "app-release.apk")
                    .body("apk-bytes");
                then.status(200);
            })
            .await;
        let delete_apk = server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path(api_path("edits/E1/apks/A1"))
                    .header("if-match", "\"e-apk\"");
                then.status(204);
            })
            .await;
        let set_targeting = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path(api_path("edits/E1/apks/A1/targeting"))
                    .header("if-match", "\"e-targeting\"")
                    .body_contains("\"otherAndroidDevices\":\"NOT_TARGETING\"");
                then.status(200);
            })
            .await;

        let client = client(&server.base_url());
        client.delete_edit("E1", "\"e-edit\"").await.unwrap();
        client
            .replace_apk("E1", "A1", "\"e-apk\"", payload())
            .await
            .unwrap();
        client.delete_apk("E1", "A1", "\"e-apk\"").await.unwrap();
        let targeting = ApkTargeting {
            other_android_devices: Some(NOT_TARGETING.to_string()),
            ..Default::default()
        }
        .with_etag("\"e-targeting\"");
        client.set_targeting("E1", "A1", &targeting).await.unwrap();

        delete_edit.assert_async().await;
        replace.assert_async().await;
        delete_apk.assert_async().await;
        set_targeting.assert_async().await;
    }

    #[tokio::test]
    async fn test_stale_etag_is_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path(api_path("edits/E1/apks/A1"));
                then.status(412).body("Precondition Failed");
            })
            .await;

        let err = client(&server.base_url())
            .delete_apk("E1", "A1", "\"old\"")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ApiError { status: 412, .. }));
    }

    #[tokio::test]
    async fn test_get_targeting_reads_etag_header() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(api_path("edits/E1/apks/A1/targeting"));
                then.status(200)
                    .header("etag", "\"t-1\"")
                    .json_body(json!({
                        "amazonDevices": [
                            {"id": "d1", "name": "Fire TV", "status": "TARGETING"}
                        ],
                        "nonAmazonDevices": [],
                        "otherAndroidDevices": "ALL"
                    }));
            })
            .await;

        let targeting = client(&server.base_url())
            .get_targeting("E1", "A1")
            .await
            .unwrap();
        assert_eq!(targeting.etag, "\"t-1\"");
        assert_eq!(targeting.amazon_devices[0].status, TargetingStatus::Targeting);
        assert_eq!(targeting.other_android_devices.as_deref(), Some("ALL"));
    }

    #[tokio::test]
    async fn test_get_targeting_without_etag_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(api_path("edits/E1/apks/A1/targeting"));
                then.status(200)
                    .json_body(json!({"amazonDevices": [], "nonAmazonDevices": []}));
            })
            .await;

        let err = client(&server.base_url())
            .get_targeting("E1", "A1")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingEtag(_)));
    }

    #[tokio::test]
    async fn test_direct_upload_headers() {
        let server = MockServer::start_async().await;
        let upload = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(api_path("edits/E1/apks/upload"))
                    .header("content-type", APK_CONTENT_TYPE)
                    .header("filename", "app-release.apk")
                    .body("apk-bytes");
                then.status(200)
                    .header("etag", "\"a-1\"")
                    .json_body(json!({"versionCode": 42, "id": "A2", "name": "app-release.apk"}));
            })
            .await;

        let apk = client(&server.base_url())
            .upload_apk("E1", payload())
            .await
            .unwrap();
        assert_eq!(apk.id, "A2");
        assert_eq!(apk.version_code, 42);
        assert_eq!(apk.etag, "\"a-1\"");
        upload.assert_async().await;
    }

    #[tokio::test]
    async fn test_large_upload_then_attach_reference_unchanged() {
        let server = MockServer::start_async().await;
        let large = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(api_path("edits/E1/apks/large/upload"))
                    .header("content-type", APK_CONTENT_TYPE)
                    .header("filename", "app-release.apk");
                then.status(200).body("\"upload-ref-1\"");
            })
            .await;
        let attach = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(api_path("edits/E1/apks/attach"))
                    .header("content-type", "application/json")
                    .body("\"upload-ref-1\"");
                then.status(200)
                    .json_body(json!({"versionCode": 7, "id": "A3", "name": "app-release.apk"}));
            })
            .await;

        let client = client(&server.base_url());
        let reference = client.upload_large_apk("E1", payload()).await.unwrap();
        assert_eq!(reference.as_str(), "\"upload-ref-1\"");

        let apk = client.attach_apk("E1", &reference).await.unwrap();
        assert_eq!(apk.id, "A3");
        large.assert_async().await;
        attach.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_errors_are_classified() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(api_path("edits/E1/apks/upload"));
                then.status(500).body("boom");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(api_path("edits/E1/apks/large/upload"));
                then.status(413);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(api_path("edits/E1/apks/attach"));
                then.status(400).body("unknown reference");
            })
            .await;

        let client = client(&server.base_url());

        let err = client.upload_apk("E1", payload()).await.unwrap_err();
        assert!(matches!(err, StoreError::UploadFailed(ref m) if m.contains("500")));

        let err = client.upload_large_apk("E1", payload()).await.unwrap_err();
        assert!(matches!(err, StoreError::UploadFailed(_)));

        let reference = LargeUploadReference("\"ref\"".to_string());
        let err = client.attach_apk("E1", &reference).await.unwrap_err();
        assert!(matches!(err, StoreError::AttachFailed(ref m) if m.contains("unknown reference")));
    }

    #[tokio::test]
    async fn test_fetch_token_and_authenticate() {
        let server = MockServer::start_async().await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/o2/token")
                    .body_contains("grant_type=client_credentials")
                    .body_contains("client_id=id");
                then.status(200)
                    .json_body(json!({"access_token": "fresh", "expires_in": 3600}));
            })
            .await;
        let edits = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(api_path("edits"))
                    .header("authorization", "Bearer fresh");
                then.status(204);
            })
            .await;

        let config = ApiConfig {
            base_url: server.base_url(),
            token_url: server.url("/auth/o2/token"),
            ..Default::default()
        };
        let profile =
            SecurityProfile::from_json(r#"{"client_id": "id", "client_secret": "secret"}"#)
                .unwrap();

        let client = AppstoreClient::authenticate(&config, APP, &profile)
            .await
            .unwrap();
        assert!(client.get_active_edit().await.unwrap().is_none());
        token.assert_async().await;
        edits.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/o2/token");
                then.status(401).body("invalid_client");
            })
            .await;

        let config = ApiConfig {
            base_url: server.base_url(),
            token_url: server.url("/auth/o2/token"),
            ..Default::default()
        };
        let profile =
            SecurityProfile::from_json(r#"{"client_id": "id", "client_secret": "bad"}"#).unwrap();

        let err = AppstoreClient::authenticate(&config, APP, &profile)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AuthenticationFailed(ref m) if m.contains("401")));
    }
}
