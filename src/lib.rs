// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # sft-pro
//!
//! Turns PDF and DOCX documents into JSONL supervised-fine-tuning datasets
//! by handing their text to a model served by a local Ollama instance.
//!
//! ## Architecture
//!
//! - **Text extraction** (`extract`): extension-dispatched PDF/DOCX parsers with a hard character cap
//! - **Model discovery** (`models`): installed `family:tag` pairs read from Ollama's manifest tree
//! - **Inference** (`llm`): fixed SFT prompt posted to `/api/generate`
//! - **Pipeline** (`pipeline`): extract → generate → write, plus a single-flight background worker
//!
//! ## Library usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! use sft_pro::extract::{extract_text, DEFAULT_TEXT_LIMIT};
//! use sft_pro::llm::{OllamaClient, OllamaConfig};
//!
//! let client = OllamaClient::new(OllamaConfig::default());
//! let doc = extract_text(Path::new("report.pdf"), DEFAULT_TEXT_LIMIT).unwrap();
//! let jsonl = client.generate(&doc.text, "llama3:latest").unwrap();
//! std::fs::write("report.jsonl", jsonl).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod models;
pub mod paths;
pub mod pipeline;

pub use error::{FailureKind, SftError, SftResult};
