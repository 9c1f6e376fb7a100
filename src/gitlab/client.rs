//! GitLab REST v4 client built on reqwest.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::models::{Blob, Project, ProjectSummary, Tag, TreeEntry};
use super::ProjectHost;
use crate::constants::API_PAGE_SIZE;
use crate::core::RolegraphError;

/// Header carrying a personal access token.
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Pagination header naming the next page; empty on the last page.
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Client for one GitLab instance.
///
/// The token is passed through unchanged as `PRIVATE-TOKEN`; no other
/// authentication scheme is supported.
#[derive(Debug, Clone)]
pub struct GitlabClient {
    http: reqwest::Client,
    base_url: String,
    api_root: String,
    token: Option<String>,
}

impl GitlabClient {
    /// Create a client for the instance at `base_url` (e.g. `https://gitlab.example.com`).
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, RolegraphError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .user_agent(concat!("rolegraph/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RolegraphError::Other {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_root: format!("{base_url}/api/v4"),
            base_url,
            token,
        })
    }

    /// Base URL of the instance without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, RolegraphError> {
        let url = format!("{}{}", self.api_root, path);
        trace!(url = %url, ?query, "GET");

        let mut request = self.http.get(&url).query(query);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await.map_err(|e| RolegraphError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(RolegraphError::AuthenticationFailed {
                    url: self.base_url.clone(),
                })
            }
            StatusCode::NOT_FOUND => Err(RolegraphError::NotFound {
                url,
            }),
            status => Err(RolegraphError::Api {
                url,
                status: status.as_u16(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RolegraphError> {
        let response = self.get(path, query).await?;
        let url = response.url().to_string();
        response.json::<T>().await.map_err(|e| RolegraphError::Transport {
            url,
            message: format!("invalid response body: {e}"),
        })
    }

    /// Collect every page of a list endpoint, following `X-Next-Page`.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, RolegraphError> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let mut paged: Vec<(&str, String)> = query.to_vec();
            paged.push(("per_page", API_PAGE_SIZE.to_string()));
            paged.push(("page", page.to_string()));

            let response = self.get(path, &paged).await?;
            let next = response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok());
            let url = response.url().to_string();
            let batch: Vec<T> =
                response.json().await.map_err(|e| RolegraphError::Transport {
                    url,
                    message: format!("invalid response body: {e}"),
                })?;

            let exhausted = batch.is_empty();
            items.extend(batch);

            match next {
                Some(next_page) if !exhausted && next_page > page => page = next_page,
                _ => break,
            }
        }

        debug!(path, count = items.len(), "Fetched paginated listing");
        Ok(items)
    }
}

impl ProjectHost for GitlabClient {
    async fn authenticate(&self) -> Result<(), RolegraphError> {
        if self.token.is_none() {
            return Err(RolegraphError::AuthenticationFailed {
                url: self.base_url.clone(),
            });
        }
        match self.get("/user", &[]).await {
            Ok(_) => Ok(()),
            Err(RolegraphError::NotFound { .. }) => Err(RolegraphError::AuthenticationFailed {
                url: self.base_url.clone(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn list_projects(&self, visibility: &str) -> Result<Vec<ProjectSummary>, RolegraphError> {
        self.get_paginated("/projects", &[("visibility", visibility.to_string())]).await
    }

    async fn get_project(&self, id: u64) -> Result<Project, RolegraphError> {
        self.get_json(&format!("/projects/{id}"), &[]).await
    }

    async fn list_tree(
        &self,
        project_id: u64,
        path: &str,
        reference: &str,
    ) -> Result<Option<Vec<TreeEntry>>, RolegraphError> {
        let query = [("path", path.to_string()), ("ref", reference.to_string())];
        match self.get_paginated(&format!("/projects/{project_id}/repository/tree"), &query).await
        {
            Ok(entries) => Ok(Some(entries)),
            Err(RolegraphError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_blob(&self, project_id: u64, sha: &str) -> Result<Blob, RolegraphError> {
        self.get_json(&format!("/projects/{project_id}/repository/blobs/{sha}"), &[]).await
    }

    async fn list_tags(&self, project_id: u64) -> Result<Vec<Tag>, RolegraphError> {
        self.get_paginated(&format!("/projects/{project_id}/repository/tags"), &[]).await
    }
}
