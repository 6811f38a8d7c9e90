mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use common::{multipart, TestEnv};

async fn page(env: &TestEnv, uri: &str) -> (StatusCode, String) {
    let app = test::init_service(env.app()).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[actix_web::test]
async fn public_pages_use_the_site_header() {
    let env = TestEnv::open();
    for uri in ["/", "/about", "/services"] {
        let (status, body) = page(&env, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert!(body.contains("site-header"), "{}", uri);
        assert!(!body.contains("admin-sidebar"), "{}", uri);
    }
}

#[actix_web::test]
async fn admin_pages_use_the_sidebar() {
    let env = TestEnv::open();
    for uri in ["/admin", "/admin/members", "/admin/messages"] {
        let (status, body) = page(&env, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert!(body.contains("admin-sidebar"), "{}", uri);
        assert!(!body.contains("site-header"), "{}", uri);
    }
}

#[actix_web::test]
async fn application_list_searches_submissions() {
    let env = TestEnv::open();
    let app = test::init_service(env.app()).await;

    for name in ["Shirin Akhter", "Kamal Uddin"] {
        let (content_type, body) = multipart(
            &[("name", name), ("membershipType", "affiliate"), ("declaration", "on")],
            Vec::new(),
        );
        let req = test::TestRequest::post()
            .uri("/api/membership")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/admin/applications?q=shirin&sort=name").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Shirin Akhter"));
    assert!(!body.contains("Kamal Uddin"));
    assert!(body.contains("Showing 1 of 2"));
}

#[actix_web::test]
async fn back_office_pages_are_gated() {
    let env = TestEnv::new("");
    let (status, _) = page(&env, "/admin").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = page(&env, "/about").await;
    assert_eq!(status, StatusCode::OK);
}
