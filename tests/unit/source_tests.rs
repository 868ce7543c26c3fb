/*!
 * Tests for the documentation sources
 */

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yadtwai::source::{DocumentSource, GitHubSource, LocalSource};
use crate::common;

#[tokio::test]
async fn test_githubListFiles_shouldWalkDirectoriesAndKeepMarkdown() {
    let mock_server = MockServer::start().await;
    let raw_base = format!("{}/raw", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/repos/acme/handbook/contents/docs"))
        .and(header("authorization", "Bearer gh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"path": "docs/intro.md", "sha": "s1", "type": "file", "download_url": format!("{}/docs/intro.md", raw_base)},
            {"path": "docs/guide", "sha": "d1", "type": "dir", "download_url": null},
            {"path": "docs/logo.png", "sha": "p1", "type": "file", "download_url": format!("{}/docs/logo.png", raw_base)}
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/handbook/contents/docs/guide"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"path": "docs/guide/setup.mdx", "sha": "s2", "type": "file", "download_url": format!("{}/docs/guide/setup.mdx", raw_base)}
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/docs/intro.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Intro\n"))
        .mount(&mock_server)
        .await;

    let source = GitHubSource::new("acme", "handbook", "/docs/", Some("gh-token"), Some(&mock_server.uri())).unwrap();
    let files = source.list_files().await.unwrap();

    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["docs/guide/setup.mdx", "docs/intro.md"]);
    assert_eq!(files[1].sha, "s1");
    assert_eq!(source.fetch_raw(&files[1]).await.unwrap(), "# Intro\n");
}

#[tokio::test]
async fn test_githubListFiles_withMissingDirectory_shouldFail() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/handbook/contents/docs"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&mock_server)
        .await;

    let source = GitHubSource::new("acme", "handbook", "docs", Some("gh-token"), Some(&mock_server.uri())).unwrap();
    let error = source.list_files().await.unwrap_err();

    assert!(error.to_string().contains("404"));
}

#[tokio::test]
async fn test_localListFiles_shouldUseRelativePathsAndContentHash() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "guide/setup.md", "# Setup\n").unwrap();
    common::create_test_file(temp_dir.path(), "intro.md", "# Intro\n").unwrap();
    common::create_test_file(temp_dir.path(), "notes.txt", "ignored").unwrap();

    let source = LocalSource::new(temp_dir.path());
    let files = source.list_files().await.unwrap();

    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["guide/setup.md", "intro.md"]);
    assert_eq!(files[1].sha, LocalSource::content_hash("# Intro\n"));
    assert_eq!(source.fetch_raw(&files[0]).await.unwrap(), "# Setup\n");
}

#[tokio::test]
async fn test_localListFiles_withMissingRoot_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let source = LocalSource::new(temp_dir.path().join("absent"));
    assert!(source.list_files().await.is_err());
}
