//! Shared fixtures: document builders and a one-shot fake Ollama server.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use docx_rs::{Docx, Paragraph, Run};

/// Write a DOCX with one paragraph per entry.
pub fn write_docx(path: &Path, paragraphs: &[&str]) {
    let mut doc = Docx::new();
    for p in paragraphs {
        doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*p)));
    }
    let file = std::fs::File::create(path).unwrap();
    doc.build().pack(file).unwrap();
}

/// Write a PDF with one Helvetica text line per page.
pub fn write_pdf(path: &Path, pages: &[&str]) {
    std::fs::write(path, pdf_bytes(pages)).unwrap();
}

/// Assemble a minimal PDF with a correct xref table.
///
/// Object layout: 1 catalog, 2 page tree, 3 font, then a (page, contents)
/// pair per page.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + i * 2).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".into());
    objects.push(format!(
        "<< /Type /Pages /Kids [{kids}] /Count {} >>",
        pages.len()
    ));
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .into(),
    );
    for (i, text) in pages.iter().enumerate() {
        let contents_id = page_ids[i] + 1;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {contents_id} 0 R >>"
        ));
        let stream = format!("BT /F1 24 Tf 72 700 Td ({text}) Tj ET");
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}\nendstream",
            stream.len()
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
    }
    let xref_at = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for off in offsets {
        out.push_str(&format!("{off:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    ));
    out.into_bytes()
}

/// What the fake server received.
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// A server that answers exactly one request with a canned response.
pub struct FakeOllama {
    pub url: String,
    requests: mpsc::Receiver<CapturedRequest>,
    release: Option<mpsc::Sender<()>>,
}

impl FakeOllama {
    /// Respond immediately.
    pub fn respond(status: u16, body: &str) -> Self {
        Self::start(status, body.as_bytes().to_vec(), false)
    }

    /// Respond immediately with a raw, possibly non-UTF-8, body.
    pub fn respond_bytes(status: u16, body: &[u8]) -> Self {
        Self::start(status, body.to_vec(), false)
    }

    /// Hold the response until [`release`](Self::release) is called.
    pub fn gated(status: u16, body: &str) -> Self {
        Self::start(status, body.as_bytes().to_vec(), true)
    }

    fn start(status: u16, body: Vec<u8>, gated: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (req_tx, req_rx) = mpsc::channel();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();

        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut content_length = 0usize;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut raw = vec![0u8; content_length];
            reader.read_exact(&mut raw).unwrap();
            req_tx
                .send(CapturedRequest {
                    request_line: request_line.trim_end().to_string(),
                    body: String::from_utf8(raw).unwrap(),
                })
                .unwrap();

            if gated {
                let _ = gate_rx.recv();
            }

            let mut stream = stream;
            let head = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n",
                reason(status),
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
        });

        Self {
            url,
            requests: req_rx,
            release: Some(gate_tx),
        }
    }

    /// Let a gated server send its response.
    pub fn release(&mut self) {
        if let Some(tx) = self.release.take() {
            let _ = tx.send(());
        }
    }

    /// The request the server received, waiting for it if needed.
    pub fn received(&self) -> CapturedRequest {
        self.requests
            .recv_timeout(std::time::Duration::from_secs(10))
            .unwrap()
    }
}

impl Drop for FakeOllama {
    fn drop(&mut self) {
        self.release();
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

/// A fresh scratch directory and a path inside it.
pub fn scratch(name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}
