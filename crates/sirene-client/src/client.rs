//! Registry fetch protocol: single-record and bulk/paginated retrieval.
//!
//! Each call moves through one pass of build-query → dispatch → classify.
//! Build failures never touch the network; every terminal outcome is final
//! for that call and the client performs no internal retries. Pagination
//! is cursor-driven and explicitly the caller's loop: one call, one page.

use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use sirene_core::{
    QueryError, QueryParams, QuerySchema, Settings, StatusClass, UnknownStatus,
    build_query_string, classify,
};

use crate::transport::{ReqwestTransport, Transport, TransportError};

/// The registry object kind being queried: company-level (`siren`) or
/// establishment-level (`siret`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Siren,
    Siret,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Siren => "siren",
            EntityType::Siret => "siret",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown entity type: {0:?} (expected \"siren\" or \"siret\")")]
pub struct ParseEntityError(String);

impl FromStr for EntityType {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "siren" => Ok(EntityType::Siren),
            "siret" => Ok(EntityType::Siret),
            other => Err(ParseEntityError(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("id code must not be empty")]
    EmptyIdCode,

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A 4xx or 5xx from the registry, surfaced with the body. Never
    /// retried here; 429 is recognizable via [`ClientError::is_rate_limited`].
    #[error("registry returned {status} {label}: {body}")]
    Api {
        status: u16,
        label: &'static str,
        body: String,
    },

    /// The transport follows redirects for GETs, so receiving one here
    /// indicates misconfiguration.
    #[error("unexpected redirect {status} from registry")]
    UnexpectedRedirect { status: u16 },

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// True when the registry answered 429, so a caller can back off
    /// before re-issuing the page.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClientError::Api { status: 429, .. })
    }
}

/// Client for the registry's record endpoints.
///
/// Owns the transport for the duration of each request/response cycle;
/// holds no other mutable state, so sequential paging calls are
/// independent of one another.
pub struct RegistryClient<T = ReqwestTransport> {
    transport: T,
    base_url: String,
    api_token: Option<String>,
    bulk_schema: QuerySchema,
    by_id_schema: QuerySchema,
}

impl RegistryClient<ReqwestTransport> {
    pub fn new(settings: &Settings) -> Self {
        Self::with_transport(settings, ReqwestTransport::new())
    }
}

impl<T: Transport> RegistryClient<T> {
    /// Build a client over a caller-supplied transport. Used by tests to
    /// substitute a stub for the network.
    pub fn with_transport(settings: &Settings, transport: T) -> Self {
        Self {
            transport,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_token: settings.api_token.clone(),
            bulk_schema: QuerySchema::bulk(),
            by_id_schema: QuerySchema::by_id(),
        }
    }

    /// Fetch one record by identifier.
    ///
    /// `filters` is validated against the by-id allow-list (`date`,
    /// `champs`, `masquerValeursNulles`). Returns the parsed JSON body on
    /// success.
    pub async fn fetch_by_id(
        &self,
        entity: EntityType,
        id_code: &str,
        filters: &QueryParams,
    ) -> Result<Value, ClientError> {
        if id_code.is_empty() {
            return Err(ClientError::EmptyIdCode);
        }
        let query = build_query_string(filters, &self.by_id_schema)?;
        let url = self.endpoint_url(&format!("{}/{id_code}", entity.as_str()), &query);

        info!(url = %url, "fetching record by identifier");
        self.dispatch(&url).await
    }

    /// Fetch one page of a bulk listing.
    ///
    /// `filters` is validated against the bulk allow-list (`q`, `date`,
    /// `curseur`, `debut`, `nombre`, `tri`, `champs`, `facette`,
    /// `masquerValeursNulles`). To continue a listing, re-supply the
    /// payload's next cursor (see [`next_cursor`]) as `curseur` on the
    /// following call; this client never auto-paginates.
    pub async fn fetch_bulk(
        &self,
        entity: EntityType,
        filters: &QueryParams,
    ) -> Result<Value, ClientError> {
        let query = build_query_string(filters, &self.bulk_schema)?;
        let url = self.endpoint_url(entity.as_str(), &query);

        info!(url = %url, "fetching bulk page");
        self.dispatch(&url).await
    }

    fn endpoint_url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/{}", self.base_url, path)
        } else {
            format!("{}/{}?{}", self.base_url, path, query)
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(token) = &self.api_token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }

    async fn dispatch(&self, url: &str) -> Result<Value, ClientError> {
        let resp = self.transport.get(url, &self.headers()).await?;
        let outcome = classify(resp.status)?;

        match outcome.class {
            StatusClass::Success => Ok(serde_json::from_str(&resp.body)?),
            StatusClass::Redirect => Err(ClientError::UnexpectedRedirect {
                status: outcome.code,
            }),
            StatusClass::ClientError | StatusClass::ServerError => Err(ClientError::Api {
                status: outcome.code,
                label: outcome.label,
                body: resp.body,
            }),
        }
    }
}

/// Next-page cursor from a bulk payload, if the listing continues.
///
/// The registry signals the end of a listing by repeating the current
/// cursor as `header.curseurSuivant`; this returns `None` in that case and
/// when either field is absent or empty.
pub fn next_cursor(payload: &Value) -> Option<String> {
    let header = payload.get("header")?;
    let next = header.get("curseurSuivant")?.as_str()?;
    if next.is_empty() {
        return None;
    }
    match header.get("curseur").and_then(Value::as_str) {
        Some(current) if current == next => None,
        _ => Some(next.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::transport::HttpResponse;

    /// Transport stub: answers every GET with a fixed status and body,
    /// recording the URLs and headers it was asked for.
    struct StubTransport {
        status: u16,
        body: String,
        seen: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl StubTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<HttpResponse, TransportError> {
            self.seen
                .lock()
                .unwrap()
                .push((url.to_string(), headers.to_vec()));
            Ok(HttpResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn settings() -> Settings {
        Settings::new("https://registry.test/v3", "data")
    }

    fn client(status: u16, body: &str) -> RegistryClient<StubTransport> {
        RegistryClient::with_transport(&settings(), StubTransport::new(status, body))
    }

    #[tokio::test]
    async fn fetch_by_id_returns_parsed_body() {
        let body = r#"{"uniteLegale":{"siren":"732829320"}}"#;
        let client = client(200, body);

        let mut filters = QueryParams::new();
        filters.push("champs", vec!["denominationUniteLegale".to_string()]);
        let record = client
            .fetch_by_id(EntityType::Siren, "732829320", &filters)
            .await
            .unwrap();

        assert_eq!(record, json!({"uniteLegale": {"siren": "732829320"}}));
        let seen = client.transport.seen.lock().unwrap();
        assert_eq!(
            seen[0].0,
            "https://registry.test/v3/siren/732829320?champs=denominationUniteLegale"
        );
    }

    #[tokio::test]
    async fn fetch_by_id_not_found_surfaces_api_error() {
        let client = client(404, r#"{"header":{"message":"no such unit"}}"#);

        let err = client
            .fetch_by_id(EntityType::Siren, "732829320", &QueryParams::new())
            .await
            .unwrap_err();

        match err {
            ClientError::Api {
                status,
                label,
                body,
            } => {
                assert_eq!(status, 404);
                assert_eq!(label, "NOT_FOUND");
                assert!(body.contains("no such unit"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_id_code_fails_without_network_call() {
        let client = client(200, "{}");

        let err = client
            .fetch_by_id(EntityType::Siret, "", &QueryParams::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::EmptyIdCode));
        assert!(client.transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_filter_fails_without_network_call() {
        let client = client(200, "{}");

        // `q` belongs to the bulk endpoint only.
        let mut filters = QueryParams::new();
        filters.push("q", "boulangerie");
        let err = client
            .fetch_by_id(EntityType::Siren, "732829320", &filters)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::Query(QueryError::UnknownParameter { .. })
        ));
        assert!(client.transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_bulk_builds_query_in_order() {
        let client = client(200, r#"{"header":{"total":0},"unitesLegales":[]}"#);

        let mut filters = QueryParams::new();
        filters.push("q", "boulangerie");
        filters.push("nombre", 20i64);
        filters.push("curseur", "*");
        client.fetch_bulk(EntityType::Siren, &filters).await.unwrap();

        let seen = client.transport.seen.lock().unwrap();
        assert_eq!(
            seen[0].0,
            "https://registry.test/v3/siren?q=boulangerie&nombre=20&curseur=*"
        );
    }

    #[tokio::test]
    async fn no_filters_means_no_question_mark() {
        let client = client(200, "{}");
        client
            .fetch_bulk(EntityType::Siret, &QueryParams::new())
            .await
            .unwrap();

        let seen = client.transport.seen.lock().unwrap();
        assert_eq!(seen[0].0, "https://registry.test/v3/siret");
    }

    #[tokio::test]
    async fn redirect_is_a_configuration_error() {
        let client = client(301, "");

        let err = client
            .fetch_bulk(EntityType::Siren, &QueryParams::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::UnexpectedRedirect { status: 301 }
        ));
    }

    #[tokio::test]
    async fn unknown_status_is_surfaced_distinctly() {
        let client = client(999, "");

        let err = client
            .fetch_bulk(EntityType::Siren, &QueryParams::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::UnknownStatus(UnknownStatus { code: 999 })
        ));
    }

    #[tokio::test]
    async fn rate_limit_is_recognizable() {
        let client = client(429, "slow down");

        let err = client
            .fetch_bulk(EntityType::Siren, &QueryParams::new())
            .await
            .unwrap_err();

        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn bearer_token_sent_when_configured() {
        let settings = settings().with_token("tok-123");
        let client = RegistryClient::with_transport(&settings, StubTransport::new(200, "{}"));
        client
            .fetch_bulk(EntityType::Siren, &QueryParams::new())
            .await
            .unwrap();

        let seen = client.transport.seen.lock().unwrap();
        let headers = &seen[0].1;
        assert!(
            headers
                .iter()
                .any(|(name, value)| name == "Authorization" && value == "Bearer tok-123")
        );
    }

    #[test]
    fn entity_type_parses() {
        assert_eq!("siren".parse::<EntityType>().unwrap(), EntityType::Siren);
        assert_eq!("siret".parse::<EntityType>().unwrap(), EntityType::Siret);
        assert!("sirene".parse::<EntityType>().is_err());
    }

    #[test]
    fn next_cursor_advances_until_repeat() {
        let page = json!({"header": {"curseur": "*", "curseurSuivant": "abc123"}});
        assert_eq!(next_cursor(&page), Some("abc123".to_string()));

        let last = json!({"header": {"curseur": "abc123", "curseurSuivant": "abc123"}});
        assert_eq!(next_cursor(&last), None);
    }

    #[test]
    fn next_cursor_absent_or_empty_ends_listing() {
        assert_eq!(next_cursor(&json!({"header": {}})), None);
        assert_eq!(next_cursor(&json!({})), None);
        assert_eq!(
            next_cursor(&json!({"header": {"curseurSuivant": ""}})),
            None
        );
    }
}
