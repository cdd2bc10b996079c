use crate::{
    config::Config,
    error::Error,
    types::{DesignDocBody, DesignDocsResponse, ErrorPolicy, SelectableOption},
};
use parking_lot::RwLock;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    StatusCode,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use url::Url;

/// Client for one configured CouchDB instance.
///
/// Covers the three discovery reads feeding the host's select controls, the
/// connectivity probe behind the "test connection" action, and query
/// execution (see the executor module).
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    /// Field names seen by the most recent execution, per target `ref_id`.
    pub(crate) last_fields: RwLock<HashMap<String, Vec<SelectableOption>>>,
}

impl Client {
    pub fn new(config: Config) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(credential) = config.basic_auth.as_deref().filter(|v| !v.is_empty()) {
            let value =
                HeaderValue::from_str(credential).map_err(|err| Error::InvalidArgument {
                    arg: "basic_auth".to_string(),
                    error: err.to_string(),
                })?;
            headers.insert(AUTHORIZATION, value);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            base_url: config.url,
            http,
            last_fields: RwLock::new(HashMap::new()),
        })
    }

    /// Resolves `path` against the base URL. The path may carry a raw query
    /// string; it is kept as-is rather than re-encoded.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let mut raw = self.base_url.as_str().trim_end_matches('/').to_string();
        if !path.is_empty() {
            raw.push('/');
            raw.push_str(path.trim_start_matches('/'));
        }
        Ok(Url::parse(&raw)?)
    }

    pub(crate) async fn get(&self, path: &str) -> Result<reqwest::Response, Error> {
        let url = self.endpoint_url(path)?;
        Ok(self.http.get(url).send().await?)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let response = self.get(path).await?;
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status_code => Err(Error::UnexpectedStatusCode {
                status_code,
                msg: response.text().await?,
            }),
        }
    }
}

/// Discovery reads: each one GET mapped into select options.
impl Client {
    /// `GET /_all_dbs` - database names.
    pub async fn list_databases(
        &self,
        policy: ErrorPolicy,
    ) -> Result<Vec<SelectableOption>, Error> {
        let result = self.get_json::<Vec<String>>("_all_dbs").await.map(|names| {
            names.into_iter().map(SelectableOption::new).collect()
        });
        apply_policy("listing databases", policy, result)
    }

    /// `GET /{db}/_design_docs` - design document ids.
    pub async fn list_design_docs(
        &self,
        database: &str,
        policy: ErrorPolicy,
    ) -> Result<Vec<SelectableOption>, Error> {
        let result = self
            .get_json::<DesignDocsResponse>(&format!("{database}/_design_docs"))
            .await
            .map(|response| {
                response
                    .rows
                    .into_iter()
                    .map(|row| SelectableOption::new(row.id))
                    .collect()
            });
        apply_policy("listing design documents", policy, result)
    }

    /// `GET /{db}/{ddoc}` - names of the views defined by a design document.
    pub async fn list_views(
        &self,
        database: &str,
        design_doc: &str,
        policy: ErrorPolicy,
    ) -> Result<Vec<SelectableOption>, Error> {
        let result = self
            .get_json::<DesignDocBody>(&format!("{database}/{design_doc}"))
            .await
            .map(|body| body.views.into_keys().map(SelectableOption::new).collect());
        apply_policy("listing views", policy, result)
    }
}

/// Outcome of the "test connection" action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    /// The server answered with a non-200 status; carries the server message.
    Failure { message: String },
    /// The request did not reach the server at all.
    Unreachable { message: String },
}

impl Client {
    /// Single unauthenticated-path GET to the base URL.
    ///
    /// Transport-level failures follow `policy`: suppressed ones are logged
    /// and reported as `Unreachable` instead of erroring.
    pub async fn test_connection(&self, policy: ErrorPolicy) -> Result<ProbeOutcome, Error> {
        let response = match self.get("").await {
            Ok(response) => response,
            Err(err) => {
                return match policy {
                    ErrorPolicy::Propagate => Err(err),
                    ErrorPolicy::Suppress => {
                        tracing::error!("connection test failed: {err}");
                        Ok(ProbeOutcome::Unreachable {
                            message: err.to_string(),
                        })
                    }
                }
            }
        };
        match response.status() {
            StatusCode::OK => Ok(ProbeOutcome::Success),
            status => Ok(ProbeOutcome::Failure {
                message: format!(
                    "data source is not working: {status} - {}",
                    response.text().await.unwrap_or_default()
                ),
            }),
        }
    }
}

fn apply_policy<T: Default>(
    operation: &str,
    policy: ErrorPolicy,
    result: Result<T, Error>,
) -> Result<T, Error> {
    match (policy, result) {
        (_, Ok(value)) => Ok(value),
        (ErrorPolicy::Propagate, Err(err)) => Err(err),
        (ErrorPolicy::Suppress, Err(err)) => {
            tracing::warn!("{operation} failed: {err}");
            Ok(T::default())
        }
    }
}
