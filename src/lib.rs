//! sharefile - A typed client for the ShareFile REST API.
//!
//! This library provides:
//! - OAuth2 password-grant login with automatic re-authentication
//! - Item lookup by path or id, and folder navigation
//! - Rename, move and verified partial updates
//! - Standard uploads and direct or two-phase downloads
//!
//! # Example
//!
//! ```no_run
//! use sharefile::{Credentials, ShareFileClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = Credentials::from_file("sharefile.json")?;
//!     let client = ShareFileClient::new(credentials)?;
//!
//!     let folder = client.items("/Shared Folders/Reports").await?;
//!     for child in folder.children(false).await? {
//!         println!("{}", child);
//!     }
//!
//!     let result = folder.upload("hello", "hello.txt").await?;
//!     println!("uploaded {:?}", result.id);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod item;
pub mod item_id;
pub mod models;
pub mod sniff;
pub mod upload;

// Re-exports for convenience
pub use auth::{AuthorizationContext, Authenticator};
pub use client::{ShareFileClient, SpecialFolder};
pub use config::{ClientConfig, Credentials};
pub use download::DownloadSpecification;
pub use error::{Result, ShareFileError};
pub use item::{Item, ItemPatch};
pub use item_id::is_item_id;
pub use models::{FolderTemplate, ItemModel, ItemRef, UploadResult};
pub use upload::UploadSpecification;
