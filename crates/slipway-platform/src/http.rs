use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{PlatformError, Result};
use crate::traits::PlatformApi;
use crate::types::{
    ApplicationUpdate, BuildConfig, CreatedProject, DeployKeyProvider, DockerProvider,
    DomainSpec, GithubAppProvider, PublicGitProvider, RemoteApplication, RemoteDomain,
    RemoteProject,
};

/// HTTP implementation of [`PlatformApi`] against the control plane's REST
/// API, authenticated with a bearer token.
pub struct HttpPlatformClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpPlatformClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        url::Url::parse(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.api_url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(PlatformError::api(status.as_u16(), error_message(&body)));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_unit(&self, req: reqwest::RequestBuilder) -> Result<()> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlatformError::api(status.as_u16(), error_message(&body)));
        }
        Ok(())
    }
}

/// Pulls the `message` field out of a structured error body, falling back
/// to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl PlatformApi for HttpPlatformClient {
    async fn ping(&self) -> Result<()> {
        self.send_unit(self.request(reqwest::Method::GET, "projects"))
            .await
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<RemoteProject>> {
        let projects: Vec<RemoteProject> = self
            .send_json(
                self.request(reqwest::Method::GET, "projects")
                    .query(&[("name", name)]),
            )
            .await?;
        Ok(projects.into_iter().find(|p| p.name == name))
    }

    async fn get_project(&self, id: &str) -> Result<RemoteProject> {
        self.send_json(self.request(reqwest::Method::GET, &format!("projects/{id}")))
            .await
    }

    async fn create_project(&self, name: &str) -> Result<CreatedProject> {
        self.send_json(
            self.request(reqwest::Method::POST, "projects")
                .json(&json!({ "name": name })),
        )
        .await
    }

    async fn list_applications(
        &self,
        project_id: &str,
        environment_id: &str,
    ) -> Result<Vec<RemoteApplication>> {
        self.send_json(self.request(
            reqwest::Method::GET,
            &format!("projects/{project_id}/environments/{environment_id}/applications"),
        ))
        .await
    }

    async fn get_application(&self, id: &str) -> Result<RemoteApplication> {
        self.send_json(self.request(reqwest::Method::GET, &format!("applications/{id}")))
            .await
    }

    async fn create_application(
        &self,
        project_id: &str,
        environment_id: &str,
        name: &str,
    ) -> Result<RemoteApplication> {
        self.send_json(
            self.request(
                reqwest::Method::POST,
                &format!("projects/{project_id}/environments/{environment_id}/applications"),
            )
            .json(&json!({ "name": name })),
        )
        .await
    }

    async fn update_application(&self, id: &str, update: &ApplicationUpdate) -> Result<()> {
        self.send_unit(
            self.request(reqwest::Method::PATCH, &format!("applications/{id}"))
                .json(update),
        )
        .await
    }

    async fn delete_application(&self, id: &str) -> Result<()> {
        self.send_unit(self.request(reqwest::Method::DELETE, &format!("applications/{id}")))
            .await
    }

    async fn save_github_app_source(&self, id: &str, source: &GithubAppProvider) -> Result<()> {
        self.send_unit(
            self.request(
                reqwest::Method::POST,
                &format!("applications/{id}/source/github-app"),
            )
            .json(source),
        )
        .await
    }

    async fn save_deploy_key_source(&self, id: &str, source: &DeployKeyProvider) -> Result<()> {
        self.send_unit(
            self.request(
                reqwest::Method::POST,
                &format!("applications/{id}/source/deploy-key"),
            )
            .json(source),
        )
        .await
    }

    async fn save_public_git_source(&self, id: &str, source: &PublicGitProvider) -> Result<()> {
        self.send_unit(
            self.request(
                reqwest::Method::POST,
                &format!("applications/{id}/source/public-git"),
            )
            .json(source),
        )
        .await
    }

    async fn save_docker_source(&self, id: &str, source: &DockerProvider) -> Result<()> {
        self.send_unit(
            self.request(
                reqwest::Method::POST,
                &format!("applications/{id}/source/docker"),
            )
            .json(source),
        )
        .await
    }

    async fn save_build_config(&self, id: &str, build: &BuildConfig) -> Result<()> {
        self.send_unit(
            self.request(reqwest::Method::POST, &format!("applications/{id}/build"))
                .json(build),
        )
        .await
    }

    async fn save_environment(&self, id: &str, blob: &str) -> Result<()> {
        self.send_unit(
            self.request(
                reqwest::Method::PUT,
                &format!("applications/{id}/environment"),
            )
            .json(&json!({ "env": blob })),
        )
        .await
    }

    async fn create_domain(&self, app_id: &str, domain: &DomainSpec) -> Result<RemoteDomain> {
        self.send_json(
            self.request(
                reqwest::Method::POST,
                &format!("applications/{app_id}/domains"),
            )
            .json(domain),
        )
        .await
    }

    async fn list_domains(&self, app_id: &str) -> Result<Vec<RemoteDomain>> {
        self.send_json(self.request(
            reqwest::Method::GET,
            &format!("applications/{app_id}/domains"),
        ))
        .await
    }

    async fn update_domain(&self, domain_id: &str, domain: &DomainSpec) -> Result<()> {
        self.send_unit(
            self.request(reqwest::Method::PATCH, &format!("domains/{domain_id}"))
                .json(domain),
        )
        .await
    }

    async fn deploy(&self, app_id: &str, title: &str) -> Result<()> {
        self.send_unit(
            self.request(
                reqwest::Method::POST,
                &format!("applications/{app_id}/deployments"),
            )
            .json(&json!({ "title": title })),
        )
        .await
    }

    async fn redeploy(&self, app_id: &str) -> Result<()> {
        self.send_unit(self.request(
            reqwest::Method::POST,
            &format!("applications/{app_id}/deployments/redeploy"),
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> HttpPlatformClient {
        HttpPlatformClient::new(&server.uri(), "test-token").unwrap()
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            HttpPlatformClient::new("not a url", "t"),
            Err(PlatformError::BaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_find_project_filters_exact_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/projects"))
            .and(query_param("name", "shared"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "p-2", "name": "shared-staging", "environments": [] },
                { "id": "p-1", "name": "shared", "environments": [] },
            ])))
            .mount(&server)
            .await;

        let found = client(&server)
            .await
            .find_project_by_name("shared")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, "p-1");
    }

    #[tokio::test]
    async fn test_find_project_returns_none_without_exact_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "p-2", "name": "shared-staging", "environments": [] },
            ])))
            .mount(&server)
            .await;

        let found = client(&server)
            .await
            .find_project_by_name("shared")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_api_error_surfaces_structured_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/projects"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(serde_json::json!({ "message": "name already taken" })),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .create_project("shared")
            .await
            .unwrap_err();
        match err {
            PlatformError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "name already taken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_get_application_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/applications/app-x"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .get_application("app-x")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_environment_sends_blob() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/applications/app-1/environment"))
            .and(wiremock::matchers::body_json(
                serde_json::json!({ "env": "A=1\nB=2" }),
            ))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client(&server)
            .await
            .save_environment("app-1", "A=1\nB=2")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deploy_and_redeploy_hit_distinct_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/applications/app-1/deployments"))
            .and(wiremock::matchers::body_json(
                serde_json::json!({ "title": "Initial deployment via Slipway" }),
            ))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/applications/app-1/deployments/redeploy"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        client
            .deploy("app-1", "Initial deployment via Slipway")
            .await
            .unwrap();
        client.redeploy("app-1").await.unwrap();
    }
}
