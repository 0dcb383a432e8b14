use engine_logging::{migrator_debug, migrator_warn};
use migrator_core::{ConfigDraft, EntityKind, ListingOptions, StatusPayload};
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Url};
use serde_json::Value;

use crate::{ApiError, ClientSettings, GroupKeyField};

/// Backend operations the console depends on.
#[async_trait::async_trait]
pub trait MigrationApi: Send + Sync {
    /// Identifiers currently staged on the backend for `kind`.
    async fn fetch_staged(&self, kind: EntityKind) -> Result<Vec<String>, ApiError>;

    async fn post_stage(&self, kind: EntityKind, body: &str) -> Result<String, ApiError>;

    async fn trigger_migration(&self) -> Result<String, ApiError>;

    async fn trigger_listing(&self, options: &ListingOptions) -> Result<String, ApiError>;

    /// Plain-text snapshot of the running log.
    async fn fetch_log(&self) -> Result<String, ApiError>;

    async fn update_config(&self, draft: &ConfigDraft) -> Result<String, ApiError>;

    async fn fetch_settings(&self) -> Result<ConfigDraft, ApiError>;

    /// Job name to count for jobs in `status` (e.g. `STARTED`).
    async fn fetch_job_counts(&self, status: &str) -> Result<StatusPayload, ApiError>;
}

pub fn staged_path(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Project => "data/stage",
        EntityKind::Group => "data/staged_groups",
        EntityKind::User => "data/staged_users",
    }
}

pub fn stage_path(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Project => "stage",
        EntityKind::Group => "append_groups",
        EntityKind::User => "append_users",
    }
}

pub fn identifier_field(kind: EntityKind, group_key: GroupKeyField) -> &'static str {
    match kind {
        EntityKind::Project => "id",
        EntityKind::Group => group_key.as_str(),
        EntityKind::User => "username",
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    base: Url,
    group_key: GroupKeyField,
}

impl ReqwestApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let mut base = settings.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;

        Ok(Self {
            client,
            base,
            group_key: settings.staged_group_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            migrator_warn!("backend answered {} ({} bytes)", status, body.len());
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let url = self.endpoint(path)?;
        migrator_debug!("GET {}", url);
        self.send(self.client.get(url)).await
    }

    async fn post_text(
        &self,
        path: &str,
        body: String,
        content_type: &'static str,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(path)?;
        migrator_debug!("POST {} body_len={}", url, body.len());
        self.send(
            self.client
                .post(url)
                .header(CONTENT_TYPE, content_type)
                .body(body),
        )
        .await
    }

    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let text = self.get_text(path).await?;
        serde_json::from_str(&text).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait::async_trait]
impl MigrationApi for ReqwestApi {
    async fn fetch_staged(&self, kind: EntityKind) -> Result<Vec<String>, ApiError> {
        let value = self.get_json(staged_path(kind)).await?;
        parse_staged_rows(kind, identifier_field(kind, self.group_key), &value)
    }

    async fn post_stage(&self, kind: EntityKind, body: &str) -> Result<String, ApiError> {
        self.post_text(stage_path(kind), body.to_string(), "text/plain")
            .await
    }

    async fn trigger_migration(&self) -> Result<String, ApiError> {
        self.get_text("migrate").await
    }

    async fn trigger_listing(&self, options: &ListingOptions) -> Result<String, ApiError> {
        let body =
            serde_json::to_string(options).map_err(|err| ApiError::Decode(err.to_string()))?;
        self.post_text("list", body, "application/json").await
    }

    async fn fetch_log(&self) -> Result<String, ApiError> {
        self.get_text("log").await
    }

    async fn update_config(&self, draft: &ConfigDraft) -> Result<String, ApiError> {
        let body =
            serde_json::to_string(draft).map_err(|err| ApiError::Decode(err.to_string()))?;
        self.post_text("update_config", body, "application/json")
            .await
    }

    async fn fetch_settings(&self) -> Result<ConfigDraft, ApiError> {
        match self.get_json("settings").await? {
            Value::Object(map) => Ok(ConfigDraft::from_pairs(
                map.into_iter().map(|(key, value)| (key, scalar_text(&value))),
            )),
            other => Err(ApiError::Decode(format!(
                "settings: expected an object, got {other}"
            ))),
        }
    }

    async fn fetch_job_counts(&self, status: &str) -> Result<StatusPayload, ApiError> {
        let path = format!("jobs/status/{status}/count");
        match self.get_json(&path).await? {
            Value::Object(map) => Ok(map),
            other => Err(ApiError::Decode(format!(
                "job counts: expected an object, got {other}"
            ))),
        }
    }
}

/// Extracts the identifier `field` of every row of a staged-entity listing.
///
/// A row without the field is a contract violation for the whole kind.
pub(crate) fn parse_staged_rows(
    kind: EntityKind,
    field: &'static str,
    value: &Value,
) -> Result<Vec<String>, ApiError> {
    let rows = value.as_array().ok_or_else(|| {
        ApiError::Decode(format!("staged {}: expected an array", kind.plural()))
    })?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| match row.get(field) {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            Some(Value::Null) | None => Err(ApiError::MissingField { kind, field, index }),
            Some(other) => Err(ApiError::Decode(format!(
                "staged {} row {index}: `{field}` is not a scalar: {other}",
                kind.plural()
            ))),
        })
        .collect()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(err.to_string());
    }
    ApiError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_and_string_ids_are_accepted() {
        let rows = json!([{"id": 10}, {"id": "20", "name": "x"}]);
        assert_eq!(
            parse_staged_rows(EntityKind::Project, "id", &rows),
            Ok(vec!["10".to_string(), "20".to_string()])
        );
    }

    #[test]
    fn missing_field_fails_the_kind() {
        let rows = json!([{"path": "acme"}, {"id": 2}]);
        assert_eq!(
            parse_staged_rows(EntityKind::Group, "id", &rows),
            Err(ApiError::MissingField {
                kind: EntityKind::Group,
                field: "id",
                index: 0,
            })
        );
    }

    #[test]
    fn group_rows_can_be_keyed_by_path() {
        let rows = json!([{"path": "acme/platform", "id": 5}]);
        let field = identifier_field(EntityKind::Group, GroupKeyField::Path);
        assert_eq!(
            parse_staged_rows(EntityKind::Group, field, &rows),
            Ok(vec!["acme/platform".to_string()])
        );
    }

    #[test]
    fn non_array_listing_is_decode_error() {
        let result = parse_staged_rows(EntityKind::User, "username", &json!({"username": "a"}));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn base_url_without_trailing_slash_keeps_prefix() {
        let settings = ClientSettings {
            base_url: "http://example.test/console".to_string(),
            ..ClientSettings::default()
        };
        let api = ReqwestApi::new(&settings).unwrap();
        assert_eq!(
            api.endpoint("data/stage").unwrap().as_str(),
            "http://example.test/console/data/stage"
        );
    }
}
