mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use common::{multipart, png, FilePart, TestEnv};

fn upload(uri: &str, fields: &[(&str, &str)], files: Vec<FilePart<'_>>) -> test::TestRequest {
    let (content_type, body) = multipart(fields, files);
    test::TestRequest::post()
        .uri(uri)
        .insert_header(("content-type", content_type))
        .set_payload(body)
}

#[actix_web::test]
async fn gallery_image_is_stored_under_its_folder() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    let req = upload("/api/gallery/upload", &[("folder", "annual-picnic")], vec![png("file")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stored: Value = test::read_body_json(resp).await;
    let path = stored["path"].as_str().unwrap();
    assert!(path.starts_with("annual-picnic/"));
    assert!(path.ends_with(".png"));
    assert_eq!(
        stored["url"].as_str().unwrap(),
        format!("http://localhost:8080/media/gallery/{}", path)
    );
    assert!(env.media_file("gallery", path).exists());
}

#[actix_web::test]
async fn membership_documents_accept_pdf_without_admin_access() {
    let env = TestEnv::new("10.9.9.9");
    let app = test::init_service(env.app()).await;

    let pdf = FilePart {
        field: "file",
        filename: "deed.pdf",
        content_type: "application/pdf",
        bytes: b"%PDF-1.4\n%%EOF".to_vec(),
    };
    let req = upload("/api/membership/upload-image", &[], vec![pdf]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stored: Value = test::read_body_json(resp).await;
    assert!(stored["path"].as_str().unwrap().ends_with(".pdf"));

    let req = upload("/api/news/upload", &[], vec![png("file")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn oversized_and_unsupported_files_are_rejected() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    let huge = FilePart {
        field: "file",
        filename: "huge.png",
        content_type: "image/png",
        bytes: vec![0u8; 6 * 1024 * 1024],
    };
    let req = upload("/api/events/upload", &[], vec![huge]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("5MB"));

    let text = FilePart {
        field: "file",
        filename: "notes.txt",
        content_type: "text/plain",
        bytes: b"hello".to_vec(),
    };
    let req = upload("/api/members/upload-image", &[], vec![text]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Unsupported file type"));

    let req = upload("/api/gallery/upload", &[("folder", "../escape")], vec![png("file")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn missing_file_part_is_rejected() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    let req = upload("/api/news/upload", &[("folder", "2026")], Vec::new()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No file was uploaded.");
}

#[actix_web::test]
async fn only_the_expected_file_part_is_kept() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    let stray = FilePart {
        field: "attachment",
        filename: "big.bin",
        content_type: "application/octet-stream",
        bytes: vec![0u8; 2 * 1024 * 1024],
    };
    let second = FilePart {
        field: "file",
        filename: "second.txt",
        content_type: "text/plain",
        bytes: b"ignored".to_vec(),
    };
    let req = upload("/api/news/upload", &[], vec![stray, png("file"), second]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stored: Value = test::read_body_json(resp).await;
    assert!(stored["path"].as_str().unwrap().ends_with(".png"));

    let stored_files = std::fs::read_dir(env.media.root().join("news")).unwrap().count();
    assert_eq!(stored_files, 1);
}

#[actix_web::test]
async fn forms_with_too_many_fields_are_rejected() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    let names: Vec<String> = (0..100).map(|i| format!("extra{}", i)).collect();
    let fields: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "x")).collect();
    let req = upload("/api/gallery/upload", &fields, vec![png("file")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "The form has too many fields.");
}

#[actix_web::test]
async fn deleting_a_record_removes_its_own_image() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    let req = upload("/api/events/upload", &[], vec![png("file")]).to_request();
    let stored: Value = test::call_and_read_body_json(&app, req).await;
    let path = stored["path"].as_str().unwrap().to_string();
    assert!(env.media_file("events", &path).exists());

    let req = test::TestRequest::post()
        .uri("/api/events")
        .set_json(serde_json::json!({
            "title": "Spring cleanup",
            "event_date": "2026-11-15",
            "image_url": stored["url"]
        }))
        .to_request();
    let event: Value = test::call_and_read_body_json(&app, req).await;
    let id = event["data"]["id"].as_str().unwrap();

    let req = test::TestRequest::delete().uri(&format!("/api/events/{}", id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert!(!env.media_file("events", &path).exists());
}
