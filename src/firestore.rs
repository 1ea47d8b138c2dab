use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::{RequestBuilder, StatusCode};
use url::Url;

use crate::auth::AuthMode;
use crate::codec::{Document, ListDocumentsResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for the document store. One instance per run; requests are
/// sequential unless a caller fans them out, and nothing is retried.
#[derive(Clone)]
pub struct Client {
    http_client: reqwest::Client,
    base_url: Url,
    project_id: String,
    auth: AuthMode,
}

impl Client {
    pub fn new(project_id: &str, auth: AuthMode) -> anyhow::Result<Self> {
        static APP_USER_AGENT: &str =
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
        let http_client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("could not build http client")?;
        let base_url = Url::parse(&format!(
            "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents/"
        ))
        .context("could not build document store base url")?;
        Ok(Client {
            http_client,
            base_url,
            project_id: project_id.to_owned(),
            auth,
        })
    }

    fn document_url(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid document path {path}"))
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            AuthMode::ApiKey(key) => request.query(&[("key", key.as_str())]),
            AuthMode::Bearer(token) => request.bearer_auth(token),
        }
    }

    pub async fn list_documents(&self, collection: &str) -> anyhow::Result<Vec<Document>> {
        let url = self.document_url(collection)?;
        let response = self
            .apply_auth(self.http_client.get(url))
            .send()
            .await
            .with_context(|| format!("could not list {collection}"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("listing {collection} failed with {status}: {body}");
        }
        let listing: ListDocumentsResponse = response
            .json()
            .await
            .context("could not deserialise document listing")?;
        Ok(listing.documents.unwrap_or_default())
    }

    /// A missing document is `None`; any other non-success status is an error.
    pub async fn get_document(&self, path: &str) -> anyhow::Result<Option<Document>> {
        let url = self.document_url(path)?;
        let response = self
            .apply_auth(self.http_client.get(url))
            .send()
            .await
            .with_context(|| format!("could not fetch {path}"))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("fetching {path} failed with {status}: {body}");
        }
        let document = response
            .json()
            .await
            .with_context(|| format!("could not deserialise document {path}"))?;
        Ok(Some(document))
    }

    /// Upsert: creates the document at `path` or fully replaces it.
    pub async fn patch_document(&self, path: &str, document: &Document) -> anyhow::Result<Document> {
        let url = self.document_url(path)?;
        let response = self
            .apply_auth(self.http_client.patch(url))
            .json(document)
            .send()
            .await
            .with_context(|| format!("could not reach the document store for {path}"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("upsert of {path} failed with {status}: {body}");
        }
        response
            .json()
            .await
            .with_context(|| format!("could not deserialise upsert response for {path}"))
    }
}

// Collection and document paths used by the admin flows.
impl Client {
    pub async fn list_users(&self) -> anyhow::Result<Vec<Document>> {
        self.list_documents(&format!("artifacts/{}/users", self.project_id))
            .await
    }

    pub async fn get_best_score(
        &self,
        user_id: &str,
        month: &str,
    ) -> anyhow::Result<Option<Document>> {
        self.get_document(&format!(
            "artifacts/{}/users/{user_id}/bestScores/{month}",
            self.project_id
        ))
        .await
    }

    pub async fn put_monthly_winners(
        &self,
        month: &str,
        document: &Document,
    ) -> anyhow::Result<Document> {
        self.patch_document(
            &format!(
                "artifacts/{}/public/data/monthlyWinners/{month}",
                self.project_id
            ),
            document,
        )
        .await
    }

    pub async fn put_challenge(
        &self,
        challenge_id: &str,
        document: &Document,
    ) -> anyhow::Result<Document> {
        self.patch_document(
            &format!(
                "artifacts/{}/public/data/challenges/{challenge_id}",
                self.project_id
            ),
            document,
        )
        .await
    }
}
