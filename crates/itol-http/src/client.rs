//! Blocking single-attempt HTTP transport.
//!
//! [`HttpClient::send`] performs one exchange: learned redirect rewrite,
//! request body upload, status and headers, redirect learning, optional
//! gzip decoding, then the body as text or as a kept temp file. Transport
//! failures are captured in the returned [`HttpResponse`]; only
//! cancellation (and a dead async worker) come back as `Err`.
//!
//! No retries are performed.

use crate::config::ClientConfig;
use crate::error::{HttpError, TransferError};
use crate::progress::ProgressReporter;
use crate::redirect::RedirectCache;
use crate::request::{Body, HttpRequest, split_header};
use crate::response::HttpResponse;
use crate::transfer::{self, ProgressReader};
use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cheap to clone; clones share the connection pool and redirect cache.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    redirects: Arc<RedirectCache>,
    config: ClientConfig,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl HttpClient {
    /// Client using the process-wide redirect cache.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_redirect_cache(config, RedirectCache::shared())
    }

    /// Client learning into its own cache.
    #[must_use]
    pub fn with_redirect_cache(config: ClientConfig, redirects: Arc<RedirectCache>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(config.connect_timeout_secs))
            .redirects(config.max_redirects)
            .user_agent(&config.user_agent)
            .build();
        Self {
            agent,
            redirects,
            config,
        }
    }

    #[must_use]
    pub fn redirect_cache(&self) -> &Arc<RedirectCache> {
        &self.redirects
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Perform one request.
    ///
    /// Without a reporter a private one is used. Phases are reported
    /// through `upload`, `receive` and `download` children.
    ///
    /// # Errors
    ///
    /// [`HttpError::Cancelled`] if the reporter was cancelled while data
    /// was moving. Every other failure is returned inside the response.
    pub fn send(
        &self,
        request: HttpRequest,
        progress: Option<&ProgressReporter>,
    ) -> Result<HttpResponse, HttpError> {
        let fallback;
        let progress = if let Some(progress) = progress {
            progress
        } else {
            fallback = ProgressReporter::default();
            &fallback
        };

        let started = Instant::now();
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let url = self.redirects.rewrite(&url);
        tracing::debug!(request = %format!("{method} {url}"), "opening connection");

        let mut call = self
            .agent
            .request(&method, &url)
            .set("Accept-Encoding", "gzip");
        let mut header_length = None;
        for line in &headers {
            let (name, value) = split_header(line);
            tracing::debug!(header = %line, "request header");
            if name.eq_ignore_ascii_case("content-length") {
                header_length = value.parse::<u64>().ok();
            }
            call = call.set(name, value);
        }

        let result = match body {
            None => {
                tracing::info!(%method, %url, "sending request");
                call.call()
            }
            Some(body) => {
                let (reader, known_length) = match body.open() {
                    Ok(opened) => opened,
                    Err(err) => return Ok(connection_failure(&url, &err)),
                };
                let length = header_length.or(known_length);
                if let (None, Some(length)) = (header_length, length) {
                    call = call.set("Content-Length", &length.to_string());
                }
                tracing::info!(%method, %url, length = ?length, "sending request");

                let upload = progress.create_child("upload");
                upload.set_total(length);
                let _upload_done = upload.finish_on_drop();
                call.send(ProgressReader::new(reader, upload.clone()))
            }
        };

        let receive = progress.create_child("receive");
        let (response, status_failure) = match result {
            Ok(response) => (response, None),
            Err(ureq::Error::Status(code, response)) => {
                (response, Some(format!("{url}: status code {code}")))
            }
            Err(ureq::Error::Transport(err)) => {
                receive.set_finished();
                if progress.is_cancelled() {
                    tracing::debug!(%url, "request cancelled during upload");
                    return Err(HttpError::Cancelled { url });
                }
                return Ok(connection_failure(&url, &err));
            }
        };

        let status = response.status();
        let mut names = response.headers_names();
        let mut seen = HashSet::new();
        names.retain(|name| seen.insert(name.clone()));
        let response_headers: Vec<String> = names
            .into_iter()
            .filter_map(|name| {
                response
                    .header(&name)
                    .map(|value| format!("{name}: {value}"))
            })
            .collect();
        let content_length = response
            .header("content-length")
            .and_then(|value| value.trim().parse::<u64>().ok());
        let disposition = response.header("content-disposition").map(str::to_string);
        let content_type = response
            .header("content-type")
            .unwrap_or_default()
            .to_ascii_lowercase();
        let gzip = response
            .header("content-encoding")
            .is_some_and(|value| value.to_ascii_lowercase().contains("gzip"));
        receive.set_finished();

        self.redirects.learn(&url, response.get_url());

        let download = progress.create_child("download");
        download.set_total(content_length);
        if let Some(disposition) = disposition {
            download.set_params(disposition);
        }
        let _download_done = download.finish_on_drop();

        let mut reader = decoder(response.into_reader(), gzip);
        let mut out = HttpResponse {
            status: Some(status),
            headers: response_headers,
            ..HttpResponse::default()
        };

        if let Some(message) = status_failure {
            tracing::warn!(%url, status, "request failed");
            match transfer::read_text(&mut reader, &download) {
                Ok(text) => out.content = Some(text),
                Err(TransferError::Cancelled) => return Err(HttpError::Cancelled { url }),
                Err(TransferError::Io(err)) => {
                    tracing::debug!(%url, error = %err, "error body unreadable");
                }
            }
            out.error_message = Some(message);
        } else {
            let read = if is_textual(&content_type) {
                transfer::read_text(&mut reader, &download).map(|text| out.content = Some(text))
            } else {
                transfer::read_file(&mut reader, &download, &self.config.temp_file_prefix)
                    .map(|path| out.file = Some(path))
            };
            match read {
                Ok(()) => {}
                Err(TransferError::Cancelled) => return Err(HttpError::Cancelled { url }),
                Err(TransferError::Io(err)) => {
                    tracing::warn!(%url, status, error = %err, "failed to read response body");
                    out.error_message = Some(err.to_string());
                }
            }
        }

        tracing::info!(
            %method,
            %url,
            status,
            bytes = download.progress(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "request completed"
        );
        Ok(out)
    }

    /// # Errors
    ///
    /// See [`HttpClient::send`].
    pub fn get(
        &self,
        url: &str,
        headers: &[&str],
        progress: Option<&ProgressReporter>,
    ) -> Result<HttpResponse, HttpError> {
        self.send(HttpRequest::get(url).headers(headers.iter().copied()), progress)
    }

    /// # Errors
    ///
    /// See [`HttpClient::send`].
    pub fn post(
        &self,
        url: &str,
        headers: &[&str],
        content: impl Into<Body>,
        progress: Option<&ProgressReporter>,
    ) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::post(url, content).headers(headers.iter().copied());
        self.send(request, progress)
    }

    /// POST a local file as the request body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::send`].
    pub fn upload(
        &self,
        url: &str,
        headers: &[&str],
        file: impl Into<PathBuf>,
        progress: Option<&ProgressReporter>,
    ) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::upload(url, file).headers(headers.iter().copied());
        self.send(request, progress)
    }

    /// Run [`HttpClient::send`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// As for `send`, plus [`HttpError::Worker`] if the worker panicked.
    pub async fn send_async(
        &self,
        request: HttpRequest,
        progress: Option<ProgressReporter>,
    ) -> Result<HttpResponse, HttpError> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.send(request, progress.as_ref()))
            .await
            .map_err(|err| HttpError::Worker(err.to_string()))?
    }

    /// # Errors
    ///
    /// See [`HttpClient::send_async`].
    pub async fn get_async(
        &self,
        url: &str,
        headers: &[&str],
        progress: Option<ProgressReporter>,
    ) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::get(url).headers(headers.iter().copied());
        self.send_async(request, progress).await
    }

    /// # Errors
    ///
    /// See [`HttpClient::send_async`].
    pub async fn post_async(
        &self,
        url: &str,
        headers: &[&str],
        content: impl Into<Body>,
        progress: Option<ProgressReporter>,
    ) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::post(url, content).headers(headers.iter().copied());
        self.send_async(request, progress).await
    }

    /// # Errors
    ///
    /// See [`HttpClient::send_async`].
    pub async fn upload_async(
        &self,
        url: &str,
        headers: &[&str],
        file: impl Into<PathBuf>,
        progress: Option<ProgressReporter>,
    ) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::upload(url, file).headers(headers.iter().copied());
        self.send_async(request, progress).await
    }
}

fn decoder(reader: Box<dyn Read + Send + Sync>, gzip: bool) -> Box<dyn Read + Send> {
    if gzip {
        Box::new(GzDecoder::new(reader))
    } else {
        reader
    }
}

/// JSON and HTML bodies are returned as text; everything else goes to a file.
#[must_use]
pub fn is_textual(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("json") || content_type.contains("text/html")
}

fn connection_failure(url: &str, err: &dyn std::fmt::Display) -> HttpResponse {
    let message = format!("HTTP request to URL={url} failed. {err}");
    tracing::warn!(%url, error = %err, "request failed");
    HttpResponse {
        error_message: Some(message),
        ..HttpResponse::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn textual_content_types() {
        assert!(is_textual("application/json; charset=utf-8"));
        assert!(is_textual("Text/HTML"));
        assert!(is_textual("application/vnd.api+json"));
        assert!(!is_textual("text/plain"));
        assert!(!is_textual("application/octet-stream"));
        assert!(!is_textual(""));
    }

    #[test]
    fn gzip_decoder_is_transparent() -> std::io::Result<()> {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"ok":true}"#)?;
        let packed = encoder.finish()?;

        let mut text = String::new();
        decoder(Box::new(Cursor::new(packed)), true).read_to_string(&mut text)?;
        assert_eq!(text, r#"{"ok":true}"#);

        let mut plain = String::new();
        decoder(Box::new(Cursor::new(b"raw".to_vec())), false).read_to_string(&mut plain)?;
        assert_eq!(plain, "raw");
        Ok(())
    }

    #[test]
    fn connection_failure_has_no_status() {
        let resp = connection_failure("http://x/", &"refused");
        assert_eq!(resp.status, None);
        assert_eq!(
            resp.error_message.as_deref(),
            Some("HTTP request to URL=http://x/ failed. refused")
        );
    }

    #[test]
    fn unreadable_file_body_is_captured() -> Result<(), HttpError> {
        let client = HttpClient::with_redirect_cache(
            ClientConfig::default(),
            Arc::new(RedirectCache::new()),
        );
        let resp = client.upload("http://127.0.0.1:9/att", &[], "/no/such/file.bin", None)?;
        assert_eq!(resp.status, None);
        assert!(resp.error_message.is_some());
        Ok(())
    }
}
