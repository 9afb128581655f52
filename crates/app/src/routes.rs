use crate::pages;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::{DefaultBodyLimit, Form, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use summarize_core::{
    input_for_upload, render_pdf, RenderError, Style, SubmissionInput, SummarizeError,
    SummaryOrchestrator, SummaryResult,
};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Room for multipart framing and the other form fields on top of the
/// largest accepted input.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

pub type AppState = Arc<SummaryOrchestrator>;

pub fn router(orchestrator: AppState) -> Router {
    let body_limit = orchestrator
        .config()
        .max_input_bytes
        .saturating_add(BODY_LIMIT_SLACK);

    Router::new()
        .route("/", get(landing))
        .route("/app", get(form))
        .route("/summarize", post(summarize))
        .route("/download", post(download))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(orchestrator)
}

async fn landing() -> Html<String> {
    Html(pages::landing())
}

async fn form() -> Html<String> {
    Html(pages::form(None, "", Style::default()))
}

async fn healthz() -> &'static str {
    "ok"
}

/// Fields of the summarize form as submitted.
#[derive(Debug, Default)]
struct SummarizeForm {
    text: String,
    file: Option<(String, Vec<u8>)>,
    format: Option<String>,
    mode: Option<String>,
}

impl SummarizeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "text" => form.text = field.text().await?,
                "format" => form.format = Some(field.text().await?),
                "mode" => form.mode = Some(field.text().await?),
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    // browsers send an empty part when no file was chosen
                    if !file_name.is_empty() || !bytes.is_empty() {
                        form.file = Some((file_name, bytes.to_vec()));
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    /// An uploaded file wins over pasted text.
    fn input(&mut self) -> Result<SubmissionInput, SummarizeError> {
        match self.file.take() {
            Some((file_name, bytes)) => input_for_upload(&file_name, bytes),
            None => Ok(SubmissionInput::Text(self.text.clone())),
        }
    }
}

async fn summarize(State(orchestrator): State<AppState>, multipart: Multipart) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("summarize", %request_id);

    async move {
        let mut form = match SummarizeForm::read(multipart).await {
            Ok(form) => form,
            Err(error) => {
                warn!(%error, "could not read multipart form");
                let status = error.status();
                return rejected(status, &error.body_text(), "", Style::default());
            }
        };

        let style_field = form.format.clone().unwrap_or_else(|| Style::default().to_string());
        let shown_style = style_field.parse::<Style>().unwrap_or_default();

        match run_pipeline(&orchestrator, &mut form, &style_field).await {
            Ok(result) => {
                info!(
                    style = %result.style,
                    used = %result.mode_used,
                    fell_back = result.fell_back(),
                    words = result.word_count,
                    "summary served"
                );
                match pages::result(&result) {
                    Ok(page) => Html(page).into_response(),
                    Err(error) => {
                        error!(%error, "could not serialize summary");
                        internal_error()
                    }
                }
            }
            Err(PipelineError::Rejected(error)) if error.is_user_error() => {
                warn!(%error, "submission rejected");
                rejected(status_for(&error), &error.to_string(), &form.text, shown_style)
            }
            Err(PipelineError::Rejected(error)) => {
                error!(%error, "summarization failed");
                internal_error()
            }
            Err(PipelineError::Worker(error)) => {
                error!(%error, "extraction task failed");
                internal_error()
            }
        }
    }
    .instrument(span)
    .await
}

enum PipelineError {
    Rejected(SummarizeError),
    Worker(tokio::task::JoinError),
}

impl From<SummarizeError> for PipelineError {
    fn from(error: SummarizeError) -> Self {
        Self::Rejected(error)
    }
}

async fn run_pipeline(
    orchestrator: &AppState,
    form: &mut SummarizeForm,
    style: &str,
) -> Result<SummaryResult, PipelineError> {
    let (style, mode) = orchestrator.resolve(style, form.mode.as_deref())?;
    let input = form.input()?;

    let worker = Arc::clone(orchestrator);
    let text = tokio::task::spawn_blocking(move || worker.prepare(&input))
        .await
        .map_err(PipelineError::Worker)??;

    Ok(orchestrator.select(mode, style, text).await?)
}

fn status_for(error: &SummarizeError) -> StatusCode {
    match error {
        SummarizeError::InputTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        SummarizeError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        error if error.is_user_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn rejected(status: StatusCode, message: &str, text: &str, style: Style) -> Response {
    (status, Html(pages::form(Some(message), text, style))).into_response()
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::server_error())).into_response()
}

#[derive(Debug, Deserialize)]
struct DownloadForm {
    summary: String,
}

async fn download(Form(form): Form<DownloadForm>) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("download", %request_id);

    async move {
        // parsing and layout are CPU bound on large summaries
        let export = tokio::task::spawn_blocking(move || export_pdf(&form.summary)).await;
        match export {
            Ok(Ok(bytes)) => {
                info!(bytes = bytes.len(), "pdf export served");
                (
                    [
                        (header::CONTENT_TYPE, "application/pdf"),
                        (
                            header::CONTENT_DISPOSITION,
                            "attachment; filename=\"summary.pdf\"",
                        ),
                    ],
                    bytes,
                )
                    .into_response()
            }
            Ok(Err(ExportError::Payload(error))) => {
                warn!(%error, "download request carried an invalid summary");
                (StatusCode::BAD_REQUEST, "invalid summary payload").into_response()
            }
            Ok(Err(ExportError::Render(error))) => {
                error!(%error, "pdf export failed");
                internal_error()
            }
            Err(error) => {
                error!(%error, "pdf export task failed");
                internal_error()
            }
        }
    }
    .instrument(span)
    .await
}

enum ExportError {
    Payload(serde_json::Error),
    Render(RenderError),
}

fn export_pdf(summary: &str) -> Result<Vec<u8>, ExportError> {
    let result: SummaryResult = serde_json::from_str(summary).map_err(ExportError::Payload)?;
    render_pdf(&result).map_err(ExportError::Render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::multipart::{Form as MultipartForm, Part};
    use std::net::SocketAddr;
    use summarize_core::{Mode, SummarizerConfig};

    const ARTICLE: &str = "Rust is a systems programming language focused on safety. \
        The borrow checker enforces ownership rules at compile time. \
        Ownership prevents data races in concurrent code. \
        Cargo is the package manager and build tool for Rust. \
        Crates are published to a central registry. \
        Many teams adopt Rust for network services.";

    async fn spawn_app(max_input_bytes: usize) -> SocketAddr {
        let config = SummarizerConfig {
            max_input_bytes,
            ..SummarizerConfig::default()
        };
        let orchestrator = SummaryOrchestrator::new(config, None).expect("orchestrator builds");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(Arc::new(orchestrator)))
                .await
                .expect("axum serve");
        });
        addr
    }

    async fn submit(addr: SocketAddr, form: MultipartForm) -> (StatusCode, String) {
        let response = reqwest::Client::new()
            .post(format!("http://{addr}/summarize"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.text().await.unwrap())
    }

    #[tokio::test]
    async fn health_and_pages_respond() {
        let addr = spawn_app(1024 * 1024).await;
        let client = reqwest::Client::new();

        let health = client.get(format!("http://{addr}/healthz")).send().await.unwrap();
        assert_eq!(health.text().await.unwrap(), "ok");

        let form = client.get(format!("http://{addr}/app")).send().await.unwrap();
        assert!(form.status().is_success());
        assert!(form.text().await.unwrap().contains("char-count"));
    }

    #[tokio::test]
    async fn pasted_text_is_summarized() {
        let addr = spawn_app(1024 * 1024).await;
        let (status, body) = submit(
            addr,
            MultipartForm::new()
                .text("text", ARTICLE)
                .text("format", "bullets"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("summary-bullets"));
        assert!(body.contains("Word count:"));
        assert!(body.contains("name=\"summary\""));
    }

    #[tokio::test]
    async fn remote_mode_without_client_shows_fallback_notice() {
        let addr = spawn_app(1024 * 1024).await;
        let (status, body) = submit(
            addr,
            MultipartForm::new()
                .text("text", ARTICLE)
                .text("format", "study-notes")
                .text("mode", "remote"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("class=\"notice\""));
        assert!(body.contains("<h3>Recall Questions</h3>"));
    }

    #[tokio::test]
    async fn bad_submissions_get_client_errors() {
        let addr = spawn_app(1024).await;

        let (status, body) = submit(
            addr,
            MultipartForm::new().text("text", ARTICLE).text("format", "haiku"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("invalid summary style"));

        let (status, _) = submit(addr, MultipartForm::new().text("text", "   ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let slides = Part::bytes(b"not a pdf".to_vec()).file_name("deck.pptx");
        let (status, _) = submit(addr, MultipartForm::new().part("file", slides)).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let big = Part::bytes(vec![b'a'; 4096]).file_name("big.pdf");
        let (status, _) = submit(addr, MultipartForm::new().part("file", big)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let broken = Part::bytes(b"%PDF-1.4 broken".to_vec()).file_name("broken.pdf");
        let (status, body) = submit(addr, MultipartForm::new().part("file", broken)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("unreadable pdf"));
    }

    #[tokio::test]
    async fn download_returns_a_pdf_attachment() {
        let addr = spawn_app(1024 * 1024).await;
        let summary = SummaryResult::new(
            Style::Abstract,
            summarize_core::SummaryBody::Abstract {
                paragraph: "Rust is fast and safe.".to_string(),
            },
            Mode::Local,
            22,
        );
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{addr}/download"))
            .form(&[("summary", serde_json::to_string(&summary).unwrap())])
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "application/pdf"
        );
        assert_eq!(
            response.headers()["content-disposition"].to_str().unwrap(),
            "attachment; filename=\"summary.pdf\""
        );
        assert!(response.bytes().await.unwrap().starts_with(b"%PDF"));

        let invalid = client
            .post(format!("http://{addr}/download"))
            .form(&[("summary", "{not json")])
            .send()
            .await
            .unwrap();
        assert_eq!(invalid.status().as_u16(), 400);
    }

    #[test]
    fn export_separates_bad_payloads_from_render_output() {
        assert!(matches!(export_pdf("[1, 2]"), Err(ExportError::Payload(_))));

        let summary = SummaryResult::new(
            Style::Bullets,
            summarize_core::SummaryBody::Bullets {
                items: vec!["Exports run off the async workers.".to_string()],
            },
            Mode::Local,
            34,
        );
        let json = serde_json::to_string(&summary).unwrap();
        let bytes = match export_pdf(&json) {
            Ok(bytes) => bytes,
            Err(_) => panic!("a valid summary exports"),
        };
        assert!(bytes.starts_with(b"%PDF"));
    }
}
