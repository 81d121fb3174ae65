// tests/serve_routes.rs

use std::error::Error;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tower::ServiceExt;

use assetpipe::dag::Registry;
use assetpipe::errors::AssetpipeError;
use assetpipe::serve::{DeployServer, LIVERELOAD_PATH, ReloadChannel, deploy_router, dev_router};
use assetpipe_test_utils::{ProjectFixture, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const PAGE: &str = "<html><head></head><body><h1>hi</h1></body></html>";

fn site() -> ProjectFixture {
    ProjectFixture::new()
        .file("index.html", PAGE)
        .file("docs/index.html", "<p>no body tag</p>")
        .file("my page.html", PAGE)
        .file("static/css/site.min.css", "body{margin:0}")
}

async fn get(router: axum::Router, uri: &str) -> Result<Response, Box<dyn Error>> {
    let req = Request::builder().uri(uri).body(Body::empty())?;
    Ok(router.oneshot(req).await?)
}

async fn body_text(res: Response) -> Result<String, Box<dyn Error>> {
    let bytes = to_bytes(res.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn dev_server_injects_client_before_body_close() -> TestResult {
    let project = site();
    let router = dev_router(project.root().to_path_buf(), ReloadChannel::new());

    let res = get(router, "/").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await?;

    let script = html.find(LIVERELOAD_PATH).expect("client script injected");
    let body_close = html.rfind("</body>").expect("body close kept");
    assert!(script < body_close);
    assert!(html.contains("<h1>hi</h1>"));
    Ok(())
}

#[tokio::test]
async fn dev_server_appends_client_without_body_tag() -> TestResult {
    let project = site();
    let router = dev_router(project.root().to_path_buf(), ReloadChannel::new());

    let html = body_text(get(router, "/docs/").await?).await?;
    assert!(html.starts_with("<p>no body tag</p>"));
    assert!(html.contains(LIVERELOAD_PATH));
    Ok(())
}

#[tokio::test]
async fn dev_server_injects_into_percent_encoded_paths() -> TestResult {
    let project = site();
    let router = dev_router(project.root().to_path_buf(), ReloadChannel::new());

    let res = get(router, "/my%20page.html").await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await?.contains(LIVERELOAD_PATH));
    Ok(())
}

#[tokio::test]
async fn dev_server_redirects_directory_without_slash() -> TestResult {
    let project = site();
    let router = dev_router(project.root().to_path_buf(), ReloadChannel::new());

    let res = get(router, "/docs").await?;
    assert!(res.status().is_redirection(), "got {}", res.status());
    let location = res
        .headers()
        .get(axum::http::header::LOCATION)
        .and_then(|v| v.to_str().ok());
    assert_eq!(location, Some("/docs/"));
    Ok(())
}

#[tokio::test]
async fn dev_server_serves_assets_untouched() -> TestResult {
    let project = site();
    let router = dev_router(project.root().to_path_buf(), ReloadChannel::new());

    let res = get(router, "/static/css/site.min.css").await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res).await?, "body{margin:0}");
    Ok(())
}

#[tokio::test]
async fn dev_server_refuses_parent_paths() -> TestResult {
    let project = site();
    let router = dev_router(project.root().join("static"), ReloadChannel::new());

    let res = get(router.clone(), "/../index.html").await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = get(router, "/css/../../index.html").await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn dev_server_missing_file_is_404() -> TestResult {
    let project = site();
    let router = dev_router(project.root().to_path_buf(), ReloadChannel::new());

    let res = get(router, "/static/js/nope.js").await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deploy_server_serves_plain_files() -> TestResult {
    let project = site();
    let router = deploy_router(project.root().to_path_buf());

    let res = get(router.clone(), "/").await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res).await?, PAGE);

    let res = get(router, LIVERELOAD_PATH).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn start_server_rejects_invalid_port_variable() -> TestResult {
    let project = site();
    let mut registry = Registry::new();
    registry.register_task(
        "start-server",
        DeployServer::with_env(|key| (key == "PORT").then(|| "not-a-port".to_string())),
    );

    match with_timeout(project.runner_with(registry).run("start-server")).await {
        Err(AssetpipeError::ConfigError(msg)) => assert!(msg.contains("PORT"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}
