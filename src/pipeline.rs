//! Document → JSONL pipeline.
//!
//! `process_document` runs the whole linear flow for one file. For interactive
//! front-ends `GenerationWorker` runs the same flow on a background thread and
//! refuses a second submission while one is in flight.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use miette::Diagnostic;
use thiserror::Error;

use crate::error::FailureKind;
use crate::extract::{self, ExtractError, ExtractedText};
use crate::llm::{LlmError, OllamaClient};

/// Errors from the pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error("failed to write output: {path}")]
    #[diagnostic(
        code(sft::pipeline::write),
        help("Check that the output directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("a generation request is already in flight")]
    #[diagnostic(
        code(sft::pipeline::busy),
        help("Wait for the current request to finish before starting another.")
    )]
    Busy,

    #[error("generation worker panicked")]
    #[diagnostic(code(sft::pipeline::worker_panicked))]
    WorkerPanicked,
}

impl PipelineError {
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Extract(e) => Some(e.kind()),
            Self::Llm(e) => Some(e.kind()),
            Self::Write { .. } | Self::Busy | Self::WorkerPanicked => None,
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// `<input dir>/<input stem>.jsonl`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    input.with_file_name(format!("{stem}.jsonl"))
}

/// Append `.jsonl` unless the file name already ends with it.
pub fn ensure_jsonl_extension(path: &Path) -> PathBuf {
    let ends_with_jsonl = path
        .file_name()
        .map(|n| n.to_string_lossy().ends_with(".jsonl"))
        .unwrap_or(false);
    if ends_with_jsonl {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".jsonl");
        PathBuf::from(name)
    }
}

/// Where a run writes its output: the requested path with `.jsonl` ensured,
/// or [`default_output_path`] when none was given.
pub fn resolve_output_path(input: &Path, requested: Option<&Path>) -> PathBuf {
    match requested {
        Some(path) => ensure_jsonl_extension(path),
        None => default_output_path(input),
    }
}

/// Line-level view of generated output. Blank lines are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonlReport {
    pub lines: usize,
    pub objects: usize,
    /// 1-based line numbers that are not a JSON object.
    pub invalid_lines: Vec<usize>,
}

impl JsonlReport {
    pub fn is_clean(&self) -> bool {
        self.invalid_lines.is_empty()
    }
}

/// Count how many non-blank lines of `text` parse as JSON objects.
pub fn inspect_jsonl(text: &str) -> JsonlReport {
    let mut report = JsonlReport::default();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        report.lines += 1;
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(v) if v.is_object() => report.objects += 1,
            _ => report.invalid_lines.push(idx + 1),
        }
    }
    report
}

/// Extract `input` and convert it with `model`, returning the generated text.
pub fn generate_jsonl(
    client: &OllamaClient,
    input: &Path,
    model: &str,
    text_limit: usize,
) -> PipelineResult<(ExtractedText, String)> {
    let doc = extract::extract_text(input, text_limit)?;
    let jsonl = client.generate(&doc.text, model)?;
    Ok((doc, jsonl))
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub output: PathBuf,
    pub extracted_chars: usize,
    pub truncated: bool,
    pub bytes_written: usize,
    pub report: JsonlReport,
}

/// Extract `input`, generate JSONL with `model` and write it verbatim to `output`.
pub fn process_document(
    client: &OllamaClient,
    input: &Path,
    output: &Path,
    model: &str,
    text_limit: usize,
) -> PipelineResult<GenerationOutcome> {
    let doc = extract::extract_text(input, text_limit)?;
    convert_extracted(client, &doc, output, model)
}

/// Generate JSONL from already extracted text and write it verbatim to `output`.
pub fn convert_extracted(
    client: &OllamaClient,
    doc: &ExtractedText,
    output: &Path,
    model: &str,
) -> PipelineResult<GenerationOutcome> {
    let jsonl = client.generate(&doc.text, model)?;

    std::fs::write(output, &jsonl).map_err(|e| PipelineError::Write {
        path: output.display().to_string(),
        source: e,
    })?;
    tracing::info!(output = %output.display(), bytes = jsonl.len(), "wrote JSONL");

    Ok(GenerationOutcome {
        output: output.to_path_buf(),
        extracted_chars: doc.char_count(),
        truncated: doc.truncated,
        bytes_written: jsonl.len(),
        report: inspect_jsonl(&jsonl),
    })
}

/// Runs generations on a background thread, one at a time.
#[derive(Debug, Clone)]
pub struct GenerationWorker {
    client: Arc<OllamaClient>,
    text_limit: usize,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the job ends, even by panic.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl GenerationWorker {
    pub fn new(client: Arc<OllamaClient>, text_limit: usize) -> Self {
        Self {
            client,
            text_limit,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a submitted job has not finished yet.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Start generating JSONL for `input` in the background.
    ///
    /// Fails with [`PipelineError::Busy`] if a previous job is still running.
    pub fn submit(&self, input: PathBuf, model: String) -> PipelineResult<GenerationHandle> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(input = %input.display(), "rejecting overlapping request");
            return Err(PipelineError::Busy);
        }

        let guard = InFlight(Arc::clone(&self.in_flight));
        let client = Arc::clone(&self.client);
        let text_limit = self.text_limit;

        let join = std::thread::spawn(move || {
            let _guard = guard;
            generate_jsonl(&client, &input, &model, text_limit).map(|(_, jsonl)| jsonl)
        });

        Ok(GenerationHandle { join })
    }
}

/// A running background generation.
pub struct GenerationHandle {
    join: JoinHandle<PipelineResult<String>>,
}

impl GenerationHandle {
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Block until the job finishes.
    pub fn wait(self) -> PipelineResult<String> {
        self.join.join().map_err(|_| PipelineError::WorkerPanicked)?
    }
}
