mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use common::{multipart, png, FilePart, TestEnv};

const REQUIRED: &[(&str, &str)] = &[
    ("name", "Mahmudul Hasan"),
    ("membershipType", "Life"),
    ("declaration", "true"),
];

#[actix_web::test]
async fn submitted_application_is_pending_and_fetchable() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    let mut fields = REQUIRED.to_vec();
    fields.extend([("email", ""), ("mobile", "01712345678"), ("gender", "Male")]);
    let (content_type, body) = multipart(&fields, Vec::new());
    let req = test::TestRequest::post()
        .uri("/api/membership")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let created: Value = test::read_body_json(resp).await;
    assert!(created["error"].is_null());
    assert_eq!(created["data"]["status"], "pending");
    assert_eq!(created["data"]["membership_type"], "life");
    assert_eq!(created["data"]["gender"], "M");
    assert!(created["data"]["email"].is_null());

    let id = created["data"]["id"].as_str().unwrap();
    let req = test::TestRequest::get().uri(&format!("/api/membership/{}", id)).to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["data"], created["data"]);
}

#[actix_web::test]
async fn missing_required_inputs_are_rejected_without_a_row() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    for missing in ["name", "membershipType", "declaration"] {
        let fields: Vec<(&str, &str)> = REQUIRED.iter().copied().filter(|(k, _)| *k != missing).collect();
        let (content_type, body) = multipart(&fields, Vec::new());
        let req = test::TestRequest::post()
            .uri("/api/membership")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "without {}", missing);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["data"].is_null());
        assert!(body["error"].is_string());
    }

    let req = test::TestRequest::get().uri("/api/membership").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn image_photo_is_stored_and_other_files_are_skipped() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    let (content_type, body) = multipart(REQUIRED, vec![png("photo")]);
    let req = test::TestRequest::post()
        .uri("/api/membership")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let with_photo: Value = test::call_and_read_body_json(&app, req).await;
    let url = with_photo["data"]["photo_url"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:8080/media/member-photos/applications/"));
    let file_name = url.rsplit('/').next().unwrap();
    assert!(env.media_file("member-photos", &format!("applications/{}", file_name)).exists());

    let text = FilePart {
        field: "photo",
        filename: "notes.txt",
        content_type: "text/plain",
        bytes: b"not a photo".to_vec(),
    };
    let (content_type, body) = multipart(REQUIRED, vec![text]);
    let req = test::TestRequest::post()
        .uri("/api/membership")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let without_photo: Value = test::read_body_json(resp).await;
    assert!(without_photo["data"]["photo_url"].is_null());
}

fn submission() -> test::TestRequest {
    let (content_type, body) = multipart(REQUIRED, Vec::new());
    test::TestRequest::post()
        .uri("/api/membership")
        .insert_header(("content-type", content_type))
        .set_payload(body)
}

#[actix_web::test]
async fn approving_stamps_the_date_and_creates_the_member() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;
    let created: Value = test::call_and_read_body_json(&app, submission().to_request()).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let before = Utc::now();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/membership/{}", id))
        .set_json(json!({ "status": "under_review" }))
        .to_request();
    let reviewed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(reviewed["data"]["status"], "under_review");
    assert!(reviewed["data"]["approved_date"].is_null());

    let req = test::TestRequest::patch()
        .uri(&format!("/api/membership/{}", id))
        .set_json(json!({ "status": "approved", "membership_number": "L-1021", "zone": "B" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let approved: Value = test::read_body_json(resp).await;
    assert_eq!(approved["data"]["status"], "approved");
    let stamped: DateTime<Utc> = approved["data"]["approved_date"].as_str().unwrap().parse().unwrap();
    assert!(stamped >= before - chrono::Duration::seconds(1));

    let req = test::TestRequest::get().uri("/api/members/list?zone=B").to_request();
    let members: Value = test::call_and_read_body_json(&app, req).await;
    let members = members["data"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["membership_number"], "L-1021");
    assert_eq!(members[0]["name"], "Mahmudul Hasan");
    assert_eq!(members[0]["status"], "active");
    assert_eq!(members[0]["application_id"], id.as_str());
}

#[actix_web::test]
async fn failed_member_creation_still_reports_the_approval() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    let req = test::TestRequest::post()
        .uri("/api/members/admin-create")
        .set_json(json!({ "membership_number": "L-9", "membership_type": "life", "name": "Existing" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let created: Value = test::call_and_read_body_json(&app, submission().to_request()).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let req = test::TestRequest::patch()
        .uri(&format!("/api/membership/{}", id))
        .set_json(json!({ "status": "approved", "membership_number": "L-9", "zone": "A" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/members/list").to_request();
    let members: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(members["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn review_rejects_unknown_zone_and_missing_application() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;
    let created: Value = test::call_and_read_body_json(&app, submission().to_request()).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/membership/{}", id))
        .set_json(json!({ "zone": "Z" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri("/api/membership/does-not-exist")
        .set_json(json!({ "status": "rejected" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Membership application not found.");
}

#[actix_web::test]
async fn rejecting_after_approval_clears_the_date() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;
    let created: Value = test::call_and_read_body_json(&app, submission().to_request()).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/membership/{}", id))
        .set_json(json!({ "status": "approved" }))
        .to_request();
    let approved: Value = test::call_and_read_body_json(&app, req).await;
    assert!(approved["data"]["approved_date"].is_string());

    let req = test::TestRequest::patch()
        .uri(&format!("/api/membership/{}", id))
        .set_json(json!({ "status": "rejected" }))
        .to_request();
    let rejected: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(rejected["data"]["status"], "rejected");
    assert!(rejected["data"]["approved_date"].is_null());
}

#[actix_web::test]
async fn deleting_a_member_keeps_the_application_photo() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    let (content_type, body) = multipart(REQUIRED, vec![png("photo")]);
    let req = test::TestRequest::post()
        .uri("/api/membership")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let photo_url = created["data"]["photo_url"].as_str().unwrap().to_string();
    let file_name = photo_url.rsplit('/').next().unwrap().to_string();
    let stored = env.media_file("member-photos", &format!("applications/{}", file_name));

    let req = test::TestRequest::patch()
        .uri(&format!("/api/membership/{}", id))
        .set_json(json!({ "status": "approved", "membership_number": "P-1", "zone": "A" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/members/list").to_request();
    let members: Value = test::call_and_read_body_json(&app, req).await;
    let member_id = members["data"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(members["data"][0]["photo_url"], photo_url.as_str());

    let req = test::TestRequest::delete().uri(&format!("/api/members/{}", member_id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri(&format!("/api/membership/{}", id)).to_request();
    let application: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(application["data"]["photo_url"], photo_url.as_str());
    assert!(stored.exists());
}
