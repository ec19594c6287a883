//! Data files resource client

use crate::{
    request::{get_api, get_api_with_query, patch_api, post_api, upload_file, HttpTransport, Transport},
    types::*,
    upload::{ProgressCallback, UploadForm},
    CancellableRequest, Config, Result,
};
use serde_json::Value;
use tracing::instrument;

/// Collection endpoint for data files
pub const ENDPOINT: &str = "/api/db/v0/data_files/";

/// Path of a single data file
pub fn detail_path(id: DataFileId) -> String {
    format!("{}{}/", ENDPOINT, id)
}

/// Client for the data files collection.
///
/// Each call builds one request and hands it to the transport; errors come
/// back exactly as the transport reports them.
#[derive(Clone, Debug)]
pub struct DataFilesApi<T = HttpTransport> {
    transport: T,
}

impl DataFilesApi<HttpTransport> {
    /// Create a client talking HTTP with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }

    /// Create with base URL
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::new(Config::new(base_url))
    }
}

impl<T: Transport> DataFilesApi<T> {
    /// Create a client on top of an existing transport
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn post_to_endpoint(&self, body: CreateSource) -> CancellableRequest<CreatedDataFile> {
        post_api(&self.transport, ENDPOINT, &body)
    }

    /// Create a data file fetched by the server from `url`
    #[instrument(skip(self), level = "debug")]
    pub fn add_via_url_to_file(&self, url: &str) -> CancellableRequest<CreatedDataFile> {
        self.post_to_endpoint(CreateSource::Url(url.to_string()))
    }

    /// Create a data file from pasted text
    #[instrument(skip(self, paste), fields(len = paste.len()), level = "debug")]
    pub fn add_via_text(&self, paste: &str) -> CancellableRequest<CreatedDataFile> {
        self.post_to_endpoint(CreateSource::Paste(paste.to_string()))
    }

    /// Create a data file from a multipart upload
    #[instrument(skip(self, form, progress), fields(bytes = form.total_bytes()), level = "debug")]
    pub fn add_via_upload(
        &self,
        form: UploadForm,
        progress: Option<ProgressCallback>,
    ) -> CancellableRequest<CreatedDataFile> {
        upload_file(&self.transport, ENDPOINT, form, progress)
    }

    /// Read a data file
    #[instrument(skip(self), level = "debug")]
    pub fn get(&self, id: DataFileId) -> CancellableRequest<DataFile> {
        get_api(&self.transport, &detail_path(id))
    }

    /// Update a data file's header flag. Resolves to the server's updated
    /// representation.
    #[instrument(skip(self), level = "debug")]
    pub fn update(&self, id: DataFileId, properties: DataFileUpdate) -> CancellableRequest<Value> {
        patch_api(&self.transport, &detail_path(id), &properties)
    }

    /// List data files one page at a time
    #[instrument(skip(self), level = "debug")]
    pub fn list(&self, options: ListOptions) -> CancellableRequest<Page<DataFile>> {
        get_api_with_query(&self.transport, ENDPOINT, &options.to_query())
    }
}
