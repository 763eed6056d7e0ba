use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::api::JobBoardApi;
use super::error::RemoteError;
use super::types::{
    Application, ApplicationStatus, Company, Job, JobFilter, JobId, NewCompany, NewJob,
    SaveJobRequest, SavedJob, StatusUpdate,
};

const LOGO_BUCKET: &str = "company-logo";
const JOB_SELECT: &str = "*,saved:saved_jobs(id),company:companies(id,name,logo_url)";
const RETURN_ROWS: &str = "return=representation";

/// HTTP adapter for a PostgREST-style store (`/rest/v1/<table>`) with object
/// storage for company logos.
pub struct RestClient {
    api_key: String,
    access_token: Option<String>,
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct CompanyRow<'a> {
    name: &'a str,
    logo_url: &'a str,
}

#[derive(Debug, Serialize)]
struct SavedJobRow<'a> {
    user_id: &'a str,
    job_id: JobId,
}

#[derive(Debug, Serialize)]
struct StatusPatch {
    status: ApplicationStatus,
}

impl RestClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            api_key,
            access_token: None,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Session token of the signed-in user; row-level policies scope saved
    /// jobs and applications to it. Falls back to the anon key.
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    fn table(&self, name: &str) -> String {
        format!("{}/rest/v1/{name}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        builder
            .header("apikey", &self.api_key)
            .header("authorization", format!("Bearer {bearer}"))
            .header("x-request-id", Uuid::new_v4().to_string())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = self.authed(builder).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return Err(RemoteError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), url = %response.url(), "remote call succeeded");
        Ok(response)
    }

    async fn rows<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Vec<T>, RemoteError> {
        let response = self.send(builder).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    /// `/storage/v1/object/<segments..>/<file_name>`, with `file_name`
    /// percent-encoded as a single path segment.
    fn object_url(&self, segments: &[&str], file_name: &str) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.base_url).map_err(|err| RemoteError::Rejected {
            message: format!("invalid base url {}: {err}", self.base_url),
        })?;
        url.path_segments_mut()
            .map_err(|()| RemoteError::Rejected {
                message: format!("base url {} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["storage", "v1", "object"])
            .extend(segments)
            .push(file_name);
        Ok(url)
    }

    async fn upload_logo(&self, company: &NewCompany) -> Result<String, RemoteError> {
        let file_name = format!("logo-{}-{}", Uuid::new_v4().simple(), company.name);
        let url = self.object_url(&[LOGO_BUCKET], &file_name)?;
        let public_url = self.object_url(&["public", LOGO_BUCKET], &file_name)?;
        let upload = self
            .client
            .post(url)
            .header("content-type", &company.logo.content_type)
            .body(company.logo.bytes.clone());
        self.send(upload).await.map_err(|err| match err {
            RemoteError::Api { status, .. } => RemoteError::Api {
                status,
                message: "Error uploading Company Logo".to_string(),
            },
            other => other,
        })?;
        Ok(public_url.into())
    }
}

impl JobBoardApi for RestClient {
    /// `viewer` is not sent: the bearer token already scopes the embedded
    /// `saved` rows to the signed-in user.
    async fn get_jobs(&self, _viewer: Option<&str>, filter: &JobFilter) -> Result<Vec<Job>, RemoteError> {
        let mut query: Vec<(&str, String)> = vec![("select", JOB_SELECT.to_string())];
        if let Some(location) = &filter.location {
            query.push(("location", format!("eq.{location}")));
        }
        if let Some(company_id) = filter.company_id {
            query.push(("company_id", format!("eq.{company_id}")));
        }
        if let Some(search) = &filter.search_query {
            query.push(("title", format!("ilike.*{search}*")));
        }
        self.rows(self.client.get(self.table("jobs")).query(&query)).await
    }

    async fn get_companies(&self) -> Result<Vec<Company>, RemoteError> {
        self.rows(self.client.get(self.table("companies")).query(&[("select", "*")]))
            .await
    }

    async fn add_new_company(&self, company: &NewCompany) -> Result<Vec<Company>, RemoteError> {
        let logo_url = self.upload_logo(company).await?;
        let row = CompanyRow {
            name: &company.name,
            logo_url: &logo_url,
        };
        self.rows(
            self.client
                .post(self.table("companies"))
                .header("prefer", RETURN_ROWS)
                .json(&[row]),
        )
        .await
    }

    async fn add_new_job(&self, job: &NewJob) -> Result<Vec<Job>, RemoteError> {
        self.rows(
            self.client
                .post(self.table("jobs"))
                .header("prefer", RETURN_ROWS)
                .json(&[job]),
        )
        .await
    }

    async fn delete_job(&self, job_id: JobId) -> Result<Vec<Job>, RemoteError> {
        self.rows(
            self.client
                .delete(self.table("jobs"))
                .header("prefer", RETURN_ROWS)
                .query(&[("id", format!("eq.{job_id}"))]),
        )
        .await
    }

    async fn save_job(&self, request: &SaveJobRequest) -> Result<Vec<SavedJob>, RemoteError> {
        if request.already_saved {
            let builder = self
                .client
                .delete(self.table("saved_jobs"))
                .header("prefer", "return=minimal")
                .query(&[
                    ("job_id", format!("eq.{}", request.job_id)),
                    ("user_id", format!("eq.{}", request.user_id)),
                ]);
            self.send(builder).await?;
            return Ok(Vec::new());
        }

        // Upsert so a duplicate save answers with the existing row.
        let row = SavedJobRow {
            user_id: &request.user_id,
            job_id: request.job_id,
        };
        self.rows(
            self.client
                .post(self.table("saved_jobs"))
                .header("prefer", "resolution=merge-duplicates,return=representation")
                .query(&[("on_conflict", "user_id,job_id")])
                .json(&[row]),
        )
        .await
    }

    async fn update_application_status(
        &self,
        update: &StatusUpdate,
    ) -> Result<Vec<Application>, RemoteError> {
        self.rows(
            self.client
                .patch(self.table("applications"))
                .header("prefer", RETURN_ROWS)
                .query(&[("id", format!("eq.{}", update.application_id))])
                .json(&StatusPatch {
                    status: update.status,
                }),
        )
        .await
    }

    async fn get_applications(&self, job_id: JobId) -> Result<Vec<Application>, RemoteError> {
        self.rows(
            self.client
                .get(self.table("applications"))
                .query(&[("select", "*".to_string()), ("job_id", format!("eq.{job_id}"))]),
        )
        .await
    }
}
