//! Google Drive v3 REST document store.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{DocumentStore, SourceDocument, StoreError};
use crate::config::DriveSourceConfig;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType)";
const PAGE_SIZE: &str = "1000";
const MAX_ERROR_BODY_LENGTH: usize = 200;

pub struct DriveStore {
    client: Client,
    api_base: String,
    access_token: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
}

impl From<DriveFile> for SourceDocument {
    fn from(file: DriveFile) -> Self {
        SourceDocument::new(file.id, file.name, file.mime_type)
    }
}

impl DriveStore {
    pub fn new(api_base: &str, access_token: SecretString) -> Result<Self, StoreError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    pub fn from_config(config: &DriveSourceConfig) -> Result<Self, StoreError> {
        let token = config.access_token.resolve("source.accessToken")?;
        Self::new(&config.api_base, token)
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.api_base)
    }

    fn file_url(&self, id: &str) -> String {
        format!("{}/drive/v3/files/{}", self.api_base, id)
    }

    fn download_request(&self, document: &SourceDocument) -> RequestBuilder {
        self.client
            .get(self.file_url(&document.id))
            .query(&[("alt", "media")])
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.access_token.expose_secret())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        self.authorized(request)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))
    }

    async fn list_page(
        &self,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<FileList, StoreError> {
        let query = folder_query(folder_id);
        let mut params = vec![
            ("q", query.as_str()),
            ("fields", LIST_FIELDS),
            ("pageSize", PAGE_SIZE),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .send(self.client.get(self.files_url()).query(&params))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::FolderNotFound(folder_id.to_string())),
            status if status.is_success() => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| StoreError::Transport(e.to_string()))?;
                serde_json::from_str(&body)
                    .map_err(|e| StoreError::MalformedResponse(e.to_string()))
            }
            status => Err(status_error(status, response).await),
        }
    }
}

#[async_trait]
impl DocumentStore for DriveStore {
    async fn list(&self, folder_id: &str) -> Result<Vec<SourceDocument>, StoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(folder_id, page_token.as_deref()).await?;
            documents.extend(page.files.into_iter().map(SourceDocument::from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Listed {} documents from Drive", documents.len());
        Ok(documents)
    }

    async fn download(&self, document: &SourceDocument) -> Result<Vec<u8>, StoreError> {
        let response = self.send(self.download_request(document)).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::DocumentNotFound(document.name.clone())),
            status if status.is_success() => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| StoreError::Transport(e.to_string())),
            status => Err(status_error(status, response).await),
        }
    }

    fn name(&self) -> &str {
        "google-drive"
    }
}

/// Drive search expression for the non-trashed children of a folder.
fn folder_query(folder_id: &str) -> String {
    let escaped = folder_id.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}' in parents and trashed = false", escaped)
}

async fn status_error(status: StatusCode, response: Response) -> StoreError {
    let body = response.text().await.unwrap_or_default();
    let body = if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        format!(
            "{}... (truncated)",
            body.chars().take(MAX_ERROR_BODY_LENGTH).collect::<String>()
        )
    } else {
        body
    };
    StoreError::Status {
        status: status.as_u16(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GOOGLE_SPREADSHEET_MIME;

    #[test]
    fn test_folder_query() {
        assert_eq!(
            folder_query("1AbC"),
            "'1AbC' in parents and trashed = false"
        );
        assert_eq!(
            folder_query("it's"),
            "'it\\'s' in parents and trashed = false"
        );
    }

    #[test]
    fn test_urls() {
        let store =
            DriveStore::new("https://www.googleapis.com/", SecretString::from("token")).unwrap();
        assert_eq!(store.files_url(), "https://www.googleapis.com/drive/v3/files");
        assert_eq!(
            store.file_url("abc"),
            "https://www.googleapis.com/drive/v3/files/abc"
        );
    }

    #[test]
    fn test_download_fetches_media_for_any_content_type() {
        let store =
            DriveStore::new("https://www.googleapis.com", SecretString::from("token")).unwrap();

        for content_type in ["application/pdf", "image/jpeg", GOOGLE_SPREADSHEET_MIME] {
            let document = SourceDocument::new("abc", "Acme_01", content_type);
            let request = store.download_request(&document).build().unwrap();
            assert_eq!(
                request.url().as_str(),
                "https://www.googleapis.com/drive/v3/files/abc?alt=media"
            );
        }
    }

    #[test]
    fn test_parse_file_list() {
        let body = r#"{
            "nextPageToken": "page-2",
            "files": [
                {"id": "1", "name": "Acme_01.pdf", "mimeType": "application/pdf"},
                {"id": "2", "name": "Budget", "mimeType": "application/vnd.google-apps.spreadsheet"}
            ]
        }"#;

        let list: FileList = serde_json::from_str(body).unwrap();
        assert_eq!(list.next_page_token.as_deref(), Some("page-2"));

        let documents: Vec<SourceDocument> =
            list.files.into_iter().map(SourceDocument::from).collect();
        assert_eq!(
            documents[0],
            SourceDocument::new("1", "Acme_01.pdf", "application/pdf")
        );
        assert_eq!(documents[1].content_type, GOOGLE_SPREADSHEET_MIME);
    }

    #[test]
    fn test_parse_empty_file_list() {
        let list: FileList = serde_json::from_str("{}").unwrap();
        assert!(list.files.is_empty());
        assert!(list.next_page_token.is_none());
    }

    #[test]
    fn test_from_config_missing_token() {
        let config: DriveSourceConfig = serde_json::from_str(r#"{"folderId": "f"}"#).unwrap();
        let err = DriveStore::from_config(&config).err().unwrap();
        assert!(matches!(err, StoreError::Credentials(_)));
    }
}
