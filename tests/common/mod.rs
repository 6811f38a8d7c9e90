#![allow(dead_code)]

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use society_backend::config::{Config, WebConfig};
use society_backend::helper::page_helpers;
use society_backend::helper::upload_helpers::MediaStore;
use society_backend::setup::db_setup;
use society_backend::{routes, DbPool};
use tempfile::TempDir;

pub const BASE_URL: &str = "http://localhost:8080";
/// The only peer whose `X-Forwarded-For` header is believed.
pub const TRUSTED_PROXY: &str = "127.0.0.1";
pub const BOUNDARY: &str = "----society-test-boundary";

/// A database and media root in a temporary directory, removed on drop.
pub struct TestEnv {
    pub dir: TempDir,
    pub pool: DbPool,
    pub media: MediaStore,
    pub config: Config,
}

impl TestEnv {
    /// `admin_accept_ip` as it would appear in the .env file.
    pub fn new(admin_accept_ip: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let media_root = dir.path().join("media");
        std::fs::create_dir_all(&media_root).unwrap();

        let manager = SqliteConnectionManager::file(dir.path().join("society.db"))
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder().max_size(4).build(manager).unwrap();
        {
            let mut conn = pool.get().unwrap();
            db_setup::setup_society_db(&mut conn).unwrap();
        }

        let config = Config {
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database_path: dir.path().display().to_string(),
            media_path: media_root.display().to_string(),
            public_base_url: BASE_URL.to_string(),
            allowed_origins: "*".to_string(),
            log_level: "info".to_string(),
            admin_accept_ip: admin_accept_ip.to_string(),
            trusted_proxies: TRUSTED_PROXY.to_string(),
        };

        TestEnv {
            media: MediaStore::new(&media_root, BASE_URL),
            dir,
            pool,
            config,
        }
    }

    /// Everyone is an admin.
    pub fn open() -> Self {
        Self::new("*")
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<BoxBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(page_helpers::load_templates().unwrap()))
            .app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::new(self.media.clone()))
            .configure(routes::config_api)
            .configure(routes::pages::config_pages)
    }

    pub fn media_file(&self, bucket_dir: &str, path: &str) -> std::path::PathBuf {
        self.media.root().join(bucket_dir).join(path)
    }
}

pub struct FilePart<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub bytes: Vec<u8>,
}

/// Builds a `multipart/form-data` body and its content type.
pub fn multipart(fields: &[(&str, &str)], files: Vec<FilePart<'_>>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for file in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                file.field, file.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes());
        body.extend_from_slice(&file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// A few bytes labelled as a PNG; the store checks declared types, not contents.
pub fn png(field: &str) -> FilePart<'_> {
    FilePart {
        field,
        filename: "photo.png",
        content_type: "image/png",
        bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
    }
}
