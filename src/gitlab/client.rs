//! GitLab REST client (API v4)

use crate::config::GitLabConfig;
use crate::error::{decode_error, AppError, AppResult};
use crate::gitlab::models::{MergeRequest, MergeRequestChanges};
use crate::gitlab::ChangeProposalSource;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("ffs-update/", env!("CARGO_PKG_VERSION"));
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Client for one GitLab project
#[derive(Clone)]
pub struct GitLabClient {
    http: reqwest::Client,
    api_base: String,
    project_id: String,
    token: Option<String>,
    per_page: u32,
}

impl GitLabClient {
    pub fn new(config: &GitLabConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: format!("{}/api/v4", config.base_url.trim_end_matches('/')),
            project_id: config.project_id.clone(),
            token: config.token.clone(),
            per_page: config.per_page,
        })
    }

    fn project_url(&self, path: &str) -> String {
        format!("{}/projects/{}{}", self.api_base, self.project_id, path)
    }

    /// GET a JSON resource, returning the decoded body and the next page
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> AppResult<(T, Option<u32>)> {
        let mut request = self.http.get(url).query(query);
        if let Some(token) = &self.token {
            request = request.header("PRIVATE-TOKEN", token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GitLabApi {
                status,
                endpoint: url.to_string(),
                body,
            });
        }

        let next_page = response
            .headers()
            .get(NEXT_PAGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());

        let body = response.text().await?;
        let value = serde_json::from_str(&body)
            .map_err(|e| decode_error(format!("{}: {}", url, e)))?;
        Ok((value, next_page))
    }
}

#[async_trait]
impl ChangeProposalSource for GitLabClient {
    async fn list_open_proposals(&self) -> AppResult<Vec<MergeRequest>> {
        let url = self.project_url("/merge_requests");
        let mut merge_requests = Vec::new();
        let mut page = 1u32;

        loop {
            let query = [
                ("state", "opened".to_string()),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ];
            let (batch, next_page): (Vec<MergeRequest>, _) = self.get_json(&url, &query).await?;
            debug!("Page {} returned {} merge requests", page, batch.len());
            merge_requests.extend(batch);

            match next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(merge_requests)
    }

    async fn list_new_files(&self, iid: u64) -> AppResult<Vec<String>> {
        let url = self.project_url(&format!("/merge_requests/{}/changes", iid));
        let (changes, _): (MergeRequestChanges, _) = self.get_json(&url, &[]).await?;
        Ok(changes.new_files())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> GitLabConfig {
        GitLabConfig {
            base_url: server.uri(),
            project_id: "42".to_string(),
            token: Some("glpat-test".to_string()),
            timeout_secs: 5,
            per_page: 2,
        }
    }

    fn mr_json(id: u64, iid: u64) -> serde_json::Value {
        json!({
            "id": id,
            "iid": iid,
            "title": format!("Proposal {iid}"),
            "web_url": format!("https://gitlab.com/ffs/proposals/-/merge_requests/{iid}"),
            "author": {"username": "bob"},
            "created_at": "2024-01-02T03:04:05Z"
        })
    }

    #[tokio::test]
    async fn test_lists_open_merge_requests_across_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/merge_requests"))
            .and(query_param("state", "opened"))
            .and(query_param("page", "1"))
            .and(header("PRIVATE-TOKEN", "glpat-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Next-Page", "2")
                    .set_body_json(json!([mr_json(901, 1), mr_json(902, 2)])),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/merge_requests"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Next-Page", "")
                    .set_body_json(json!([mr_json(903, 3)])),
            )
            .mount(&server)
            .await;

        let client = GitLabClient::new(&config_for(&server)).unwrap();
        let merge_requests = client.list_open_proposals().await.unwrap();

        let ids: Vec<u64> = merge_requests.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![901, 902, 903]);
    }

    #[tokio::test]
    async fn test_list_new_files_filters_added_paths() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/merge_requests/7/changes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "iid": 7,
                "changes": [
                    {"old_path": "index.md", "new_path": "index.md", "new_file": false},
                    {"old_path": "my-idea.md", "new_path": "my-idea.md", "new_file": true}
                ]
            })))
            .mount(&server)
            .await;

        let client = GitLabClient::new(&config_for(&server)).unwrap();
        let files = client.list_new_files(7).await.unwrap();

        assert_eq!(files, vec!["my-idea.md".to_string()]);
    }

    #[tokio::test]
    async fn test_error_status_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/merge_requests"))
            .respond_with(ResponseTemplate::new(401).set_body_string("401 Unauthorized"))
            .mount(&server)
            .await;

        let client = GitLabClient::new(&config_for(&server)).unwrap();
        let err = client.list_open_proposals().await.unwrap_err();

        match err {
            AppError::GitLabApi { status, body, .. } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "401 Unauthorized");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/merge_requests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "nope"}])))
            .mount(&server)
            .await;

        let client = GitLabClient::new(&config_for(&server)).unwrap();
        let err = client.list_open_proposals().await.unwrap_err();

        assert!(matches!(err, AppError::Decode(_)));
    }
}
