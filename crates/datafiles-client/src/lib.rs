//! # Data Files Client SDK
//!
//! A client SDK for the data files API: the staging area where datasets are
//! uploaded, fetched or pasted before being imported into a table.
//!
//! ## Features
//!
//! - **Three ways in**: create a data file from a URL, pasted text or a
//!   multipart upload
//! - **Cancellable**: every call returns a [`CancellableRequest`] that can be
//!   aborted from anywhere through its [`CancelHandle`]
//! - **Upload progress**: optional callback as the upload body is sent
//! - **Pluggable transport**: swap the HTTP layer through [`Transport`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use datafiles_client::{Config, DataFilesApi, DataFileUpdate, UploadForm};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = DataFilesApi::new(
//!         Config::new("http://localhost:8000")
//!             .with_session("session-id")
//!             .with_csrf_token("csrf-token"),
//!     )?;
//!
//!     // Create from a remote CSV
//!     let created = api.add_via_url_to_file("https://example.com/people.csv").await?;
//!
//!     // Upload a local file, cancelling on demand
//!     let form = UploadForm::from_path("people.csv").await?;
//!     let upload = api.add_via_upload(form, None);
//!     let cancel = upload.cancel_handle();
//!     let uploaded = upload.await?;
//!
//!     // Read and update
//!     let file = api.get(created.id).await?;
//!     api.update(file.id, DataFileUpdate { header: !file.header }).await?;
//!
//!     Ok(())
//! }
//! ```

mod cancellable;
mod config;
mod data_files;
mod error;
mod request;
mod types;
mod upload;

pub use cancellable::{CancelHandle, CancellableRequest};
pub use config::Config;
pub use data_files::{detail_path, DataFilesApi, ENDPOINT};
pub use error::{ApiErrorDetail, ClientError, Result};
pub use request::{
    get_api, get_api_with_query, patch_api, post_api, upload_file, HttpTransport, Transport,
};
pub use types::*;
pub use upload::{ProgressCallback, UploadFile, UploadForm, UploadProgress, FILE_FIELD};
