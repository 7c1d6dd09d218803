//! Catalog loading from local files and over HTTP, including the failure
//! paths that leave the app running on an empty catalog.

use pretty_assertions::assert_eq;
use studyplanner::aggregate::Dashboard;
use studyplanner::app::{App, CatalogStatus};
use studyplanner::catalog::{build_client, load_catalog, CatalogSource};
use studyplanner::error::CatalogError;
use studyplanner::model::Subject;
use studyplanner::notify::NotifySettings;
use studyplanner::progress::Progress;
use studyplanner::storage::MemoryStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

const SUBJECTS_JSON: &str = r#"{
    "Physics": {"Electrostatics": ["Charges", "Coulomb's Law", "Field Lines"]},
    "Chemistry": {"Solutions": ["Concentration", "Raoult's Law"]},
    "Maths": {"Matrices": ["Types", "Operations"]},
    "Biology": {"Reproduction": ["Flowering Plants"]}
}"#;

#[tokio::test]
async fn loads_catalog_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subjects.json");
    std::fs::write(&path, SUBJECTS_JSON).unwrap();

    let client = build_client().unwrap();
    let catalog = load_catalog(&client, &CatalogSource::File(path))
        .await
        .unwrap();

    assert_eq!(catalog.topic_count(Subject::Physics), 3);
    assert_eq!(
        catalog.topics(Subject::Chemistry, "Solutions").unwrap(),
        &["Concentration".to_string(), "Raoult's Law".to_string()]
    );
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = build_client().unwrap();
    let err = load_catalog(
        &client,
        &CatalogSource::File(dir.path().join("subjects.json")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }));
    assert!(err.to_string().contains("subjects.json"));
}

#[tokio::test]
async fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subjects.json");
    std::fs::write(&path, "{\"Physics\": {\"Optics\": ").unwrap();

    let client = build_client().unwrap();
    let err = load_catalog(&client, &CatalogSource::File(path))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Json(_)));
}

// Loopback requests must not be routed through a proxy from the environment
fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Answers a single request with the given status line and body.
async fn serve_once(status: &'static str, body: &'static str) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 2048];
        let _ = socket.read(&mut request).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    Url::parse(&format!("http://{addr}/subjects.json")).unwrap()
}

#[tokio::test]
async fn loads_catalog_over_http() {
    let url = serve_once("200 OK", SUBJECTS_JSON).await;
    let source = CatalogSource::parse(url.as_str());
    assert_eq!(source, CatalogSource::Remote(url));

    let client = local_client();
    let catalog = load_catalog(&client, &source).await.unwrap();
    assert_eq!(catalog.topic_count(Subject::Physics), 3);
    assert_eq!(catalog.topic_count(Subject::Biology), 1);
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let url = serve_once("404 Not Found", "{}").await;
    let client = local_client();
    let err = load_catalog(&client, &CatalogSource::Remote(url))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Status(status) if status == reqwest::StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn http_body_that_is_not_json_is_a_parse_error() {
    let url = serve_once("200 OK", "<html>maintenance</html>").await;
    let client = local_client();
    let err = load_catalog(&client, &CatalogSource::Remote(url))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Json(_)));
}

#[tokio::test]
async fn unreachable_host_is_an_http_error() {
    // Bind then drop so the port is closed when the client connects
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = local_client();
    let url = Url::parse(&format!("http://{addr}/subjects.json")).unwrap();
    let err = load_catalog(&client, &CatalogSource::Remote(url))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Http(_)));
}

#[tokio::test]
async fn failed_load_leaves_app_usable() {
    let client = build_client().unwrap();
    let result = load_catalog(
        &client,
        &CatalogSource::File("/definitely/not/here.json".into()),
    )
    .await;

    let mut app = App::new(
        Progress::load(MemoryStore::default()),
        NotifySettings::default(),
    );
    match result {
        Ok(catalog) => app.set_catalog(catalog),
        Err(e) => app.catalog_failed(e.to_string()),
    }

    assert!(matches!(app.catalog_status, CatalogStatus::Failed(_)));
    assert!(app.catalog.is_empty());
    assert_eq!(app.dashboard, Dashboard::default());
    assert_eq!(app.dashboard.overall_text(), "0%");
}
