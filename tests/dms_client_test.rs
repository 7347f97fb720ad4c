use ceigall_iq::config::ApiConfig;
use ceigall_iq::models::{
    ConfidentialityLevel, CreateFolderRequest, DocumentQuery, DocumentStatus, FolderQuery, PermissionLevel,
    UploadRequest,
};
use ceigall_iq::services::{ApiClient, DmsClient, FolderTree, PermissionTarget, UploadProgress};
use ceigall_iq::ClientError;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn client(server: &MockServer) -> DmsClient {
    let config = ApiConfig { base_url: server.base_url(), token: Some("dms-token".to_string()), ..Default::default() };
    DmsClient::new(ApiClient::new(&config))
}

#[tokio::test]
async fn test_summary_and_categories() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/dms/summary").header("authorization", "Bearer dms-token");
            then.status(200).json_body(json!({
                "total_documents": 120, "recent_uploads": 4, "storage_used": null, "shared_documents": 9
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/dms/categories");
            then.status(200).json_body(json!([{ "id": "c1", "name": "Contracts", "color": "#ff0000" }]));
        })
        .await;

    let dms = client(&server);
    let summary = dms.summary().await.expect("summary");
    assert_eq!(summary.total_documents, 120);
    assert_eq!(summary.storage_used, "");

    let categories = dms.categories().await.expect("categories");
    assert_eq!(categories[0].name, "Contracts");
    assert!(categories[0].icon.is_none());

    println!("✅ DMS summary test passed!");
}

#[tokio::test]
async fn test_folders_build_a_tree() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/dms/folders").query_param("department", "Projects");
            then.status(200).json_body(json!([
                {
                    "id": "p", "name": "Projects", "parent_folder_id": null, "path": "/Projects",
                    "document_count": 3, "updated_at": "2024-05-01T00:00:00Z",
                    "subfolders": [
                        { "id": "h", "name": "Highways", "parent_folder_id": "p", "path": "/Projects/Highways",
                          "document_count": 5, "subfolders": null }
                    ]
                }
            ]));
        })
        .await;

    let query = FolderQuery { department: Some("Projects".to_string()), ..Default::default() };
    let folders = client(&server).folders(&query).await.expect("folders");
    mock.assert_async().await;

    assert_eq!(folders[0].last_modified(), "2024-05-01T00:00:00Z");
    assert_eq!(folders[0].subfolders[0].parent(), Some("p"));

    let tree = FolderTree::from_nested(folders).expect("valid tree");
    assert_eq!(tree.total_document_count("p"), 8);
    assert_eq!(tree.breadcrumbs(Some("h")).len(), 3);

    println!("✅ DMS folder tree test passed!");
}

#[tokio::test]
async fn test_create_folder_validates_before_sending() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/dms/folders").json_body(json!({ "name": "Tenders", "parent_id": "p" }));
            then.status(201).json_body(json!({ "id": "t", "name": "Tenders", "parent_id": "p", "path": "/Projects/Tenders" }));
        })
        .await;

    let dms = client(&server);
    let invalid = CreateFolderRequest { name: String::new(), ..Default::default() };
    assert!(matches!(dms.create_folder(&invalid).await, Err(ClientError::Validation(_))));

    let request = CreateFolderRequest { name: "Tenders".to_string(), parent_id: Some("p".to_string()), department: None };
    let created = dms.create_folder(&request).await.expect("created folder");
    mock.assert_async().await;
    assert_eq!(created.id, "t");
}

#[tokio::test]
async fn test_documents_query_parameters() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/dms/documents")
                .query_param("folder_id", "f1")
                .query_param("status", "active")
                .query_param("tags", "bridge");
            then.status(200).json_body(json!({
                "documents": [
                    { "id": "d1", "name": "scan.pdf", "original_filename": "Bridge GAD.pdf",
                      "mime_type": "application/pdf", "size_bytes": 2048, "folder_id": "f1",
                      "status": "active", "confidentiality_level": "confidential", "tags": null }
                ]
            }));
        })
        .await;

    let query = DocumentQuery {
        folder_id: Some("f1".to_string()),
        status: Some(DocumentStatus::Active),
        tags: vec!["bridge".to_string()],
        ..Default::default()
    };
    let documents = client(&server).documents(&query).await.expect("documents");
    mock.assert_async().await;

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].display_name(), "Bridge GAD.pdf");
    assert_eq!(documents[0].file_size(), 2048);
    assert_eq!(documents[0].confidentiality_level, ConfidentialityLevel::Confidential);
    assert!(documents[0].tags.is_empty());

    println!("✅ DMS documents query test passed!");
}

#[tokio::test]
async fn test_upload_sends_multipart_and_reports_progress() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/dms/file-upload")
                .header_exists("content-type")
                .body_includes("filename=\"boq.xlsx\"")
                .body_includes("f-42")
                .body_includes("civil,boq");
            then.status(200).json_body(json!({ "id": "d9", "name": "boq.xlsx", "folder_id": "f-42" }));
        })
        .await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let progress: UploadProgress = Arc::new(move |pct| recorder.lock().unwrap().push(pct));

    let upload = UploadRequest {
        file_name: "boq.xlsx".to_string(),
        content: vec![7u8; 150 * 1024],
        folder_id: "f-42".to_string(),
        tags: vec!["civil".to_string(), "boq".to_string()],
        confidentiality_level: ConfidentialityLevel::Internal,
        category_id: None,
    };
    let document = client(&server).upload(upload, Some(progress)).await.expect("upload");
    mock.assert_async().await;
    assert_eq!(document.id, "d9");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(seen.last().copied(), Some(100.0));

    println!("✅ DMS upload test passed!");
}

#[tokio::test]
async fn test_upload_path_reads_file_from_disk() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/dms/file-upload").body_includes("filename=\"notes.txt\"").body_includes("site visit");
            then.status(200).json_body(json!({ "id": "d10", "name": "notes.txt" }));
        })
        .await;

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "site visit on monday").expect("write file");

    let document = client(&server)
        .upload_path(&path, "f1", Vec::new(), ConfidentialityLevel::Public, None, None)
        .await
        .expect("upload");
    mock.assert_async().await;
    assert_eq!(document.name, "notes.txt");
}

#[tokio::test]
async fn test_download_to_writes_bytes() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/dms/documents/d1/download");
            then.status(200).header("content-type", "application/pdf").body("%PDF-1.4 test");
        })
        .await;

    let dms = client(&server);
    let file = dms.download("d1", "drawing.pdf").await.expect("download");
    assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(file.bytes, b"%PDF-1.4 test".to_vec());

    let dir = tempfile::tempdir().expect("temp dir");
    let destination = dir.path().join("drawing.pdf");
    let written = dms.download_to("d1", &destination).await.expect("download to file");
    assert_eq!(written, 13);
    assert_eq!(std::fs::read(&destination).expect("read back"), b"%PDF-1.4 test".to_vec());

    println!("✅ DMS download test passed!");
}

#[tokio::test]
async fn test_permissions_and_errors() {
    let server = MockServer::start_async().await;
    let grant = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/dms/folders/f1/permissions")
                .json_body(json!({ "user_id": "u7", "permission_level": "write" }));
            then.status(200).json_body(json!({ "id": "perm-1", "user_id": "u7", "permission_level": "write" }));
        })
        .await;
    let revoke = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/dms/folders/f1/permissions/perm-1");
            then.status(403).body("Forbidden");
        })
        .await;

    let dms = client(&server);
    let permission = dms
        .grant_permission(PermissionTarget::Folder, "f1", "u7", PermissionLevel::Write)
        .await
        .expect("grant");
    assert_eq!(permission.permission_level, PermissionLevel::Write);

    let err = dms.revoke_permission(PermissionTarget::Folder, "f1", "perm-1").await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.to_string(), "Failed to revoke permission: 403 Forbidden");

    grant.assert_async().await;
    revoke.assert_async().await;

    println!("✅ DMS permissions test passed!");
}

#[tokio::test]
async fn test_documents_with_duplicate_field_names_still_load() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/dms/documents");
            then.status(200).json_body(json!({
                "documents": [
                    { "id": "d1", "name": "a.pdf", "size": 10, "size_bytes": 10,
                      "modified_at": "2024-01-02T00:00:00Z", "updated_at": "2024-01-02T00:00:00Z" },
                    { "id": "d2", "name": "b.pdf", "size_bytes": 20, "updated_at": "2024-01-03T00:00:00Z" }
                ]
            }));
        })
        .await;

    let documents = client(&server).documents(&DocumentQuery::default()).await.expect("documents");
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].file_size(), 10);
    assert_eq!(documents[1].file_size(), 20);
    assert_eq!(documents[1].last_modified(), "2024-01-03T00:00:00Z");

    println!("✅ DMS duplicate field names test passed!");
}
