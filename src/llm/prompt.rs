//! The fixed SFT conversion prompt.

/// Instructions placed before the document text.
pub const PREAMBLE: &str = "\
You are an expert in preparing data for Supervised Fine-Tuning (SFT).
Your task is to convert the following document text into a JSONL format.
Each line in the output must be a valid JSON object.
Extract the most important information from the document and represent it as key-value pairs in the JSON objects.
The goal is to create a dataset that could be used to fine-tune a model to understand and extract information from similar documents.

Here is the document text:";

/// Delimits the document text on both sides.
pub const TEXT_MARKER: &str = "---";

/// Instruction placed after the document text.
pub const CLOSING: &str = "Produce the JSONL output now.";

/// Wrap raw document text in the SFT conversion prompt.
///
/// The text is embedded verbatim between two `---` lines.
pub fn build_prompt(text: &str) -> String {
    format!("{PREAMBLE}\n{TEXT_MARKER}\n{text}\n{TEXT_MARKER}\n\n{CLOSING}")
}

/// Recover the document text from a prompt built by [`build_prompt`].
pub fn embedded_text(prompt: &str) -> Option<&str> {
    let body = prompt.strip_prefix(PREAMBLE)?.strip_prefix('\n')?;
    let body = body.strip_prefix(TEXT_MARKER)?.strip_prefix('\n')?;
    body.strip_suffix(CLOSING)?
        .strip_suffix("\n\n")?
        .strip_suffix(TEXT_MARKER)?
        .strip_suffix('\n')
}
