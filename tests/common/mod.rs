//! Shared fixtures for tests against a mocked ShareFile server.

#![allow(dead_code)]

use mockito::{Mock, ServerGuard};
use serde_json::{json, Value};
use sharefile::{ClientConfig, Credentials, ShareFileClient};

pub const TOKEN_PATH: &str = "/oauth/token";
pub const TOKEN: &str = "tok-1";
pub const FOLDER_TYPE: &str = "ShareFile.Api.Models.Folder";
pub const FILE_TYPE: &str = "ShareFile.Api.Models.File";

pub fn credentials() -> Credentials {
    Credentials::new("acme", "cid", "secret", "user@acme.com", "pw")
}

pub fn config_for(server: &ServerGuard) -> ClientConfig {
    ClientConfig::new()
        .with_api_base_url(format!("{}/sf/v3", server.url()))
        .with_token_url(format!("{}{}", server.url(), TOKEN_PATH))
}

pub fn client_for(server: &ServerGuard) -> ShareFileClient {
    ShareFileClient::with_config(credentials(), config_for(server)).unwrap()
}

pub fn token_body(expires_in: u64) -> String {
    json!({
        "access_token": TOKEN,
        "expires_in": expires_in,
        "subdomain": "acme",
        "apicp": "sf-api.com",
        "appcp": "sharefile.com",
        "state": "",
        "h": "digest"
    })
    .to_string()
}

/// Token endpoint expected to be hit exactly `hits` times.
pub async fn mock_token(server: &mut ServerGuard, expires_in: u64, hits: usize) -> Mock {
    server
        .mock("POST", TOKEN_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_body(expires_in))
        .expect(hits)
        .create_async()
        .await
}

pub fn item_url(server: &ServerGuard, id: &str) -> String {
    format!("{}/sf/v3/Items({})", server.url(), id)
}

pub fn folder_json(server: &ServerGuard, id: &str, name: &str) -> Value {
    json!({
        "Id": id,
        "url": item_url(server, id),
        "odata.metadata": format!("{}/sf/v3/$metadata#Items/ShareFile.Api.Models.Folder@Element", server.url()),
        "odata.type": FOLDER_TYPE,
        "Name": name,
        "FileName": name,
        "FileCount": 3,
        "Parent": {"Id": "top", "url": item_url(server, "top")}
    })
}

pub fn file_json(server: &ServerGuard, id: &str, name: &str, size: u64) -> Value {
    json!({
        "Id": id,
        "url": item_url(server, id),
        "odata.type": FILE_TYPE,
        "Name": name,
        "FileName": name,
        "FileSizeBytes": size,
        "StreamID": format!("st-{}", id),
        "Hash": "5eb63bbbe01eeed093cb22bb8f5acdc3",
        "Parent": {"Id": "fo1", "url": item_url(server, "fo1")}
    })
}

pub async fn mock_json(
    server: &mut ServerGuard,
    method: &str,
    path: &str,
    body: &Value,
) -> Mock {
    server
        .mock(method, path)
        .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}
