//! Command execution

use crate::cli::{Cli, Command};
use anyhow::Context;
use datafiles_client::{
    DataFileUpdate, DataFilesApi, ListOptions, ProgressCallback, Transport, UploadForm,
    UploadProgress,
};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

/// Run a parsed command line, printing the result as JSON
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let api = DataFilesApi::new(cli.config()).context("Failed to create client")?;
    let output = execute(&api, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Execute one command against the API
pub async fn execute<T: Transport>(api: &DataFilesApi<T>, command: Command) -> anyhow::Result<Value> {
    match command {
        Command::AddUrl { url } => {
            let created = api
                .add_via_url_to_file(&url)
                .await
                .with_context(|| format!("Failed to create data file from {}", url))?;
            info!(id = created.id, "Created data file from URL");
            to_json(created)
        }
        Command::AddText { text, file } => {
            let paste = read_paste(text, file).await?;
            let created = api
                .add_via_text(&paste)
                .await
                .context("Failed to create data file from text")?;
            info!(id = created.id, "Created data file from text");
            to_json(created)
        }
        Command::Upload { path, quiet } => {
            let form = UploadForm::from_path(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let progress = if quiet { None } else { Some(progress_printer()) };

            let request = api.add_via_upload(form, progress);
            let cancel = request.cancel_handle();
            let watcher = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling upload");
                    cancel.cancel();
                }
            });
            let result = request.await;
            watcher.abort();

            let created = result.with_context(|| format!("Failed to upload {}", path.display()))?;
            info!(id = created.id, "Uploaded data file");
            to_json(created)
        }
        Command::Get { id } => {
            let file = api
                .get(id)
                .await
                .with_context(|| format!("Failed to get data file {}", id))?;
            to_json(file)
        }
        Command::SetHeader { id, header } => api
            .update(id, DataFileUpdate { header })
            .await
            .with_context(|| format!("Failed to update data file {}", id)),
        Command::List { limit, offset } => {
            let page = api
                .list(ListOptions { limit, offset })
                .await
                .context("Failed to list data files")?;
            to_json(page)
        }
    }
}

async fn read_paste(text: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut paste = String::new();
    tokio::io::stdin()
        .read_to_string(&mut paste)
        .await
        .context("Failed to read stdin")?;
    Ok(paste)
}

fn progress_printer() -> ProgressCallback {
    Box::new(|p: UploadProgress| {
        let mut stderr = std::io::stderr();
        let _ = write!(
            stderr,
            "\rUploading: {:>5.1}% ({}/{} bytes)",
            p.percent_completed, p.loaded, p.total
        );
        if p.is_complete() {
            let _ = writeln!(stderr);
        }
    })
}

fn to_json<S: Serialize>(value: S) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> DataFilesApi {
        DataFilesApi::with_base_url(&server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_add_text_from_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/db/v0/data_files/"))
            .and(body_json(json!({"paste": "a,b\n1,2\n"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 8})))
            .expect(1)
            .mount(&server)
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();

        let api = api_for(&server);
        let output = execute(
            &api,
            Command::AddText {
                text: None,
                file: Some(file.path().to_path_buf()),
            },
        )
        .await
        .unwrap();
        assert_eq!(output, json!({"id": 8}));
    }

    #[tokio::test]
    async fn test_upload_quiet() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/db/v0/data_files/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 12})))
            .expect(1)
            .mount(&server)
            .await;

        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        file.write_all(b"a\tb\n").unwrap();

        let api = api_for(&server);
        let output = execute(
            &api,
            Command::Upload {
                path: file.path().to_path_buf(),
                quiet: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(output, json!({"id": 12}));
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let server = MockServer::start().await;
        let api = api_for(&server);
        let err = execute(
            &api,
            Command::Upload {
                path: "/no/such/file.csv".into(),
                quiet: true,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read /no/such/file.csv"));
    }

    #[tokio::test]
    async fn test_set_header_returns_server_representation() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/db/v0/data_files/4/"))
            .and(body_json(json!({"header": true})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 4, "header": true, "quotechar": "\""})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server);
        let output = execute(&api, Command::SetHeader { id: 4, header: true })
            .await
            .unwrap();
        assert_eq!(output["quotechar"], json!("\""));
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/db/v0/data_files/"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "results": [{"id": 1, "header": true}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/db/v0/data_files/1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "header": true})))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let page = execute(&api, Command::List { limit: Some(50), offset: None })
            .await
            .unwrap();
        assert_eq!(page["count"], json!(1));

        let file = execute(&api, Command::Get { id: 1 }).await.unwrap();
        assert_eq!(file, json!({"id": 1, "header": true}));
    }

    #[tokio::test]
    async fn test_error_has_context() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/db/v0/data_files/9/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let err = execute(&api, Command::Get { id: 9 }).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to get data file 9");
        let client_err = err.downcast_ref::<datafiles_client::ClientError>().unwrap();
        assert!(client_err.is_not_found());
    }
}
