//! Tests for ShareFileClient with mocked HTTP responses.

mod common;

use std::io::Write;
use std::time::{Duration, SystemTime};

use common::*;
use mockito::{Matcher, Server};
use serde_json::json;
use sharefile::{Credentials, ShareFileClient, ShareFileError, SpecialFolder};
use tempfile::NamedTempFile;

mod construction {
    use super::*;

    #[test]
    fn test_missing_credentials_fail() {
        let result = ShareFileClient::new(Credentials {
            subdomain: "x".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(ShareFileError::MissingCredential(_))));
    }

    #[test]
    fn test_all_credentials_succeed() {
        assert!(ShareFileClient::new(credentials()).is_ok());
    }

    #[test]
    fn test_credentials_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let creds_json = json!({
            "subdomain": "acme",
            "clientId": "cid",
            "clientSecret": "secret",
            "username": "user@acme.com",
            "password": "pw"
        });
        temp_file.write_all(creds_json.to_string().as_bytes()).unwrap();

        let creds = Credentials::from_file(temp_file.path()).unwrap();
        assert_eq!(creds.subdomain, "acme");
        assert_eq!(creds.client_id, "cid");
    }

    #[test]
    fn test_credentials_file_missing_field() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(json!({"subdomain": "acme", "username": "u"}).to_string().as_bytes())
            .unwrap();

        match Credentials::from_file(temp_file.path()) {
            Err(ShareFileError::MissingCredential(field)) => assert_eq!(field, "password"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_credentials_from_invalid_file() {
        assert!(Credentials::from_file("/nonexistent/path/sharefile.json").is_err());

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"not valid json").unwrap();
        assert!(matches!(
            Credentials::from_file(temp_file.path()),
            Err(ShareFileError::CredentialsParseError(_))
        ));
    }
}

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_authenticate_stores_token() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", TOKEN_PATH)
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("grant_type=password".to_string()),
                Matcher::Regex("client_id=cid".to_string()),
                Matcher::Regex("client_secret=secret".to_string()),
                Matcher::Regex("password=pw".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(token_body(28800))
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(client.is_token_expired().await);

        let access_token = client.authenticate().await.unwrap();
        assert_eq!(access_token, TOKEN);
        assert!(!client.is_token_expired().await);

        let expires_at = client.token_expires_at().await.unwrap();
        assert!(expires_at > SystemTime::now());
        assert!(expires_at > SystemTime::now() + Duration::from_secs(28000));

        let login = client.login_info().await.unwrap();
        assert_eq!(login.subdomain.as_deref(), Some("acme"));
        assert_eq!(login.apicp.as_deref(), Some("sf-api.com"));

        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_oversized_lifetime_is_clamped() {
        let mut server = Server::new_async().await;
        let token = mock_token(&mut server, u64::MAX, 1).await;

        let client = client_for(&server);
        assert_eq!(client.authenticate().await.unwrap(), TOKEN);
        assert!(!client.is_token_expired().await);
        assert!(client.token_expires_at().await.unwrap() > SystemTime::now());

        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_bad_credentials_propagate_http_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", TOKEN_PATH)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_grant","error_description":"invalid username or password"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        match client.authenticate().await {
            Err(ShareFileError::ApiError { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("invalid_grant"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(client.is_token_expired().await);
    }

    #[tokio::test]
    async fn test_context_reuses_live_token() {
        let mut server = Server::new_async().await;
        let token = mock_token(&mut server, 3600, 1).await;

        let client = client_for(&server);
        let first = client.authorization_context().await.unwrap();
        let second = client.authorization_context().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.header_value(), format!("Bearer {}", TOKEN));
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_refreshes_after_expiry() {
        let mut server = Server::new_async().await;
        let token = mock_token(&mut server, 1, 2).await;

        let client = client_for(&server);
        client.authorization_context().await.unwrap();
        assert!(!client.is_token_expired().await);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(client.is_token_expired().await);

        client.authorization_context().await.unwrap();
        assert!(!client.is_token_expired().await);

        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_login() {
        let mut server = Server::new_async().await;
        let token = mock_token(&mut server, 3600, 1).await;

        let client = client_for(&server);
        let (a, b) = tokio::join!(client.authorization_context(), client.authorization_context());

        assert_eq!(a.unwrap(), b.unwrap());
        token.assert_async().await;
    }
}

mod items {
    use super::*;

    const ITEM_ID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

    #[tokio::test]
    async fn test_items_by_id() {
        let mut server = Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;
        let body = folder_json(&server, ITEM_ID, "Reports");
        let item_mock = mock_json(&mut server, "GET", &format!("/sf/v3/Items({})", ITEM_ID), &body).await;

        let client = client_for(&server);
        let folder = client.items(ITEM_ID).await.unwrap();

        assert_eq!(folder.id(), Some(ITEM_ID));
        assert_eq!(folder.odata_type(), Some(FOLDER_TYPE));
        assert!(folder.is_folder());
        item_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_items_by_path() {
        let mut server = Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;
        let body = folder_json(&server, "fo1", "Reports");
        let item_mock = server
            .mock("GET", "/sf/v3/Items/ByPath")
            .match_query(Matcher::UrlEncoded("path".to_string(), "/Reports".to_string()))
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let folder = client.items("/Reports").await.unwrap();

        assert_eq!(folder.name(), Some("Reports"));
        item_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_root_slash_is_a_path() {
        let mut server = Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;
        let body = folder_json(&server, "fohome", "Home");
        let item_mock = server
            .mock("GET", "/sf/v3/Items/ByPath")
            .match_query(Matcher::UrlEncoded("path".to_string(), "/".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let home = client.items("/").await.unwrap();

        assert!(home.is_folder());
        item_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_special_item() {
        let mut server = Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;
        let body = folder_json(&server, "fohome", "Home");
        let item_mock = mock_json(&mut server, "GET", "/sf/v3/Items(home)", &body).await;

        let client = client_for(&server);
        let home = client.special_item(SpecialFolder::Home).await.unwrap();

        assert_eq!(home.name(), Some("Home"));
        item_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_is_api_error() {
        let mut server = Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;
        server
            .mock("GET", "/sf/v3/Items/ByPath")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":"NotFound","message":{"lang":"en-US","value":"Item not found"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        match client.items("/$_NOT_REAL_DATA_$").await {
            Err(ShareFileError::ApiError { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Item not found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_item_without_url_rejected() {
        let mut server = Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;
        mock_json(
            &mut server,
            "GET",
            &format!("/sf/v3/Items({})", ITEM_ID),
            &json!({"Id": ITEM_ID, "Name": "orphan"}),
        )
        .await;

        let client = client_for(&server);
        assert!(matches!(
            client.items(ITEM_ID).await,
            Err(ShareFileError::MissingField { field: "url", .. })
        ));
    }
}

mod folder_templates {
    use super::*;

    #[tokio::test]
    async fn test_list_folder_templates() {
        let mut server = Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;
        let body = json!({
            "odata.count": 2,
            "value": [
                {"Id": "ft1", "Name": "Client", "Description": "Client folders"},
                {"Id": "ft2", "Name": "Project", "Description": "Project folders"}
            ]
        });
        let list = mock_json(&mut server, "GET", "/sf/v3/FolderTemplates", &body).await;

        let client = client_for(&server);
        let templates = client.list_folder_templates().await.unwrap();

        assert_eq!(templates.len(), 2);
        assert_eq!(templates[1].name.as_deref(), Some("Project"));
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_folder_template() {
        let mut server = Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;
        let body = json!({"Id": "ft1", "Name": "Client", "Description": "Client folders"});
        let get = mock_json(&mut server, "GET", "/sf/v3/FolderTemplates(ft1)", &body).await;

        let client = client_for(&server);
        let template = client.get_folder_template("ft1").await.unwrap();

        assert_eq!(template.id.as_deref(), Some("ft1"));
        assert_eq!(template.description.as_deref(), Some("Client folders"));
        get.assert_async().await;
    }
}
