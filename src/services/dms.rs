use crate::error::ClientResult;
use crate::models::{
    Category, ConfidentialityLevel, CreateFolderRequest, Document, DocumentQuery, DocumentSummary, DownloadedFile, FolderQuery, Folder,
    GrantPermissionRequest, MoveFolderRequest, Permission, PermissionLevel, UpdateDocumentRequest,
    UpdateFolderRequest, UploadRequest,
};
use crate::services::api_client::{segment, ApiClient};
use futures::stream;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Body, Method};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use validator::Validate;

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Callback receiving upload progress as a percentage.
pub type UploadProgress = Arc<dyn Fn(f32) + Send + Sync>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocumentsResponse {
    documents: Vec<Document>,
}

/// Which kind of DMS object a permission call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionTarget {
    Document,
    Folder,
}

impl PermissionTarget {
    fn collection(&self) -> &'static str {
        match self {
            PermissionTarget::Document => "documents",
            PermissionTarget::Folder => "folders",
        }
    }
}

/// Client for the document-management endpoints.
#[derive(Debug, Clone)]
pub struct DmsClient {
    api: ApiClient,
}

impl DmsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn summary(&self) -> ClientResult<DocumentSummary> {
        self.api.get_json("fetch DMS summary", "/dms/summary").await
    }

    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.api.get_json("fetch categories", "/dms/categories").await
    }

    pub async fn folders(&self, query: &FolderQuery) -> ClientResult<Vec<Folder>> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(parent_id) = query.parent_id.as_deref() {
            params.push(("parent_id", parent_id));
        }
        if let Some(department) = query.department.as_deref() {
            params.push(("department", department));
        }
        if let Some(search) = query.search.as_deref() {
            params.push(("search", search));
        }

        let request = self.api.request(Method::GET, "/dms/folders")?.query(&params);
        let folders: Vec<Folder> = self.api.send_json("fetch folders", request).await?;
        tracing::debug!("Fetched {} top-level folders", folders.len());
        Ok(folders)
    }

    pub async fn folder(&self, folder_id: &str) -> ClientResult<Folder> {
        let path = format!("/dms/folders/{}", segment(folder_id));
        self.api.get_json(&format!("fetch folder {}", folder_id), &path).await
    }

    pub async fn create_folder(&self, request: &CreateFolderRequest) -> ClientResult<Folder> {
        request.validate()?;
        let builder = self.api.request(Method::POST, "/dms/folders")?.json(request);
        let folder: Folder = self.api.send_json("create folder", builder).await?;
        tracing::info!("Created folder {} ({})", folder.name, folder.id);
        Ok(folder)
    }

    pub async fn update_folder(&self, folder_id: &str, request: &UpdateFolderRequest) -> ClientResult<Folder> {
        request.validate()?;
        let path = format!("/dms/folders/{}", segment(folder_id));
        let builder = self.api.request(Method::PATCH, &path)?.json(request);
        self.api.send_json("update folder", builder).await
    }

    pub async fn delete_folder(&self, folder_id: &str) -> ClientResult<()> {
        let path = format!("/dms/folders/{}", segment(folder_id));
        let builder = self.api.request(Method::DELETE, &path)?;
        self.api.send_empty("delete folder", builder).await
    }

    /// Move a folder under `parent_id`, or to the root when `None`.
    pub async fn move_folder(&self, folder_id: &str, parent_id: Option<&str>) -> ClientResult<Folder> {
        let path = format!("/dms/folders/{}/move", segment(folder_id));
        let body = MoveFolderRequest { parent_id: parent_id.map(str::to_string) };
        let builder = self.api.request(Method::POST, &path)?.json(&body);
        self.api.send_json("move folder", builder).await
    }

    pub async fn documents(&self, query: &DocumentQuery) -> ClientResult<Vec<Document>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(folder_id) = &query.folder_id {
            params.push(("folder_id", folder_id.clone()));
        }
        if let Some(category_id) = &query.category_id {
            params.push(("category_id", category_id.clone()));
        }
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }
        for tag in &query.tags {
            params.push(("tags", tag.clone()));
        }

        let request = self.api.request(Method::GET, "/dms/documents")?.query(&params);
        let data: DocumentsResponse = self.api.send_json("fetch documents", request).await?;
        tracing::debug!("Fetched {} documents", data.documents.len());
        Ok(data.documents)
    }

    pub async fn document(&self, document_id: &str) -> ClientResult<Document> {
        let path = format!("/dms/documents/{}", segment(document_id));
        self.api.get_json(&format!("fetch document {}", document_id), &path).await
    }

    /// Upload a file as multipart form data. `progress` is called with the
    /// percentage of the file body handed to the connection so far.
    pub async fn upload(&self, upload: UploadRequest, progress: Option<UploadProgress>) -> ClientResult<Document> {
        let total = upload.content.len() as u64;
        let mime = mime_guess::from_path(&upload.file_name).first_or_octet_stream();

        let chunks: Vec<Vec<u8>> = upload.content.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
        let mut sent = 0u64;
        let body_stream = stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(report) = &progress {
                report(sent as f32 / total.max(1) as f32 * 100.0);
            }
            Ok::<_, std::io::Error>(chunk)
        }));

        let file_part = Part::stream_with_length(Body::wrap_stream(body_stream), total)
            .file_name(upload.file_name.clone())
            .mime_str(mime.essence_str())?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("folder_id", upload.folder_id.clone())
            .text("confidentiality_level", upload.confidentiality_level.as_str());
        if !upload.tags.is_empty() {
            form = form.text("tags", upload.tags.join(","));
        }
        if let Some(category_id) = upload.category_id.clone() {
            form = form.text("category_id", category_id);
        }

        let builder = self.api.request(Method::POST, "/dms/file-upload")?.multipart(form);
        let document: Document = self.api.send_json("upload file", builder).await?;
        tracing::info!("Uploaded {} ({} bytes) as document {}", upload.file_name, total, document.id);
        Ok(document)
    }

    /// Read a file from disk and upload it.
    pub async fn upload_path(
        &self,
        path: &Path,
        folder_id: &str,
        tags: Vec<String>,
        confidentiality_level: ConfidentialityLevel,
        category_id: Option<String>,
        progress: Option<UploadProgress>,
    ) -> ClientResult<Document> {
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        let request = UploadRequest {
            file_name,
            content,
            folder_id: folder_id.to_string(),
            tags,
            confidentiality_level,
            category_id,
        };
        self.upload(request, progress).await
    }

    pub async fn update_document(&self, document_id: &str, request: &UpdateDocumentRequest) -> ClientResult<Document> {
        request.validate()?;
        let path = format!("/dms/documents/{}", segment(document_id));
        let builder = self.api.request(Method::PATCH, &path)?.json(request);
        self.api.send_json("update document", builder).await
    }

    pub async fn delete_document(&self, document_id: &str) -> ClientResult<()> {
        let path = format!("/dms/documents/{}", segment(document_id));
        let builder = self.api.request(Method::DELETE, &path)?;
        self.api.send_empty("delete document", builder).await
    }

    /// Fetch the stored bytes of a document.
    pub async fn download(&self, document_id: &str, file_name: &str) -> ClientResult<DownloadedFile> {
        let path = format!("/dms/documents/{}/download", segment(document_id));
        let builder = self.api.request(Method::GET, &path)?;
        let response = self.api.send("download document", builder).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(DownloadedFile { file_name: file_name.to_string(), content_type, bytes })
    }

    /// Download a document straight to `destination`. Returns the byte count.
    pub async fn download_to(&self, document_id: &str, destination: &Path) -> ClientResult<u64> {
        let file_name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = self.download(document_id, &file_name).await?;
        tokio::fs::write(destination, &file.bytes).await?;
        tracing::info!("Saved document {} to {}", document_id, destination.display());
        Ok(file.bytes.len() as u64)
    }

    pub async fn document_versions(&self, document_id: &str) -> ClientResult<Vec<Document>> {
        let path = format!("/dms/documents/{}/versions", segment(document_id));
        self.api.get_json("fetch document versions", &path).await
    }

    pub async fn permissions(&self, target: PermissionTarget, id: &str) -> ClientResult<Vec<Permission>> {
        let path = format!("/dms/{}/{}/permissions", target.collection(), segment(id));
        let operation = match target {
            PermissionTarget::Document => "fetch document permissions",
            PermissionTarget::Folder => "fetch folder permissions",
        };
        self.api.get_json(operation, &path).await
    }

    pub async fn grant_permission(
        &self,
        target: PermissionTarget,
        id: &str,
        user_id: &str,
        permission_level: PermissionLevel,
    ) -> ClientResult<Permission> {
        let path = format!("/dms/{}/{}/permissions", target.collection(), segment(id));
        let body = GrantPermissionRequest { user_id: user_id.to_string(), permission_level };
        let builder = self.api.request(Method::POST, &path)?.json(&body);
        self.api.send_json("grant permission", builder).await
    }

    pub async fn revoke_permission(&self, target: PermissionTarget, id: &str, permission_id: &str) -> ClientResult<()> {
        let path = format!(
            "/dms/{}/{}/permissions/{}",
            target.collection(),
            segment(id),
            segment(permission_id)
        );
        let builder = self.api.request(Method::DELETE, &path)?;
        self.api.send_empty("revoke permission", builder).await
    }
}
