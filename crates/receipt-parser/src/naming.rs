//! File-name rules shared by the writer, the orchestrator's skip filter,
//! merge and cleanup.
//!
//! The output directory doubles as the completion log: a receipt named
//! `Acme_01.pdf` is done once `Acme_01_parsed.xlsx` exists.

/// Marks a file as pipeline output. Source documents containing it are skipped.
pub const PROCESSED_MARKER: &str = "_parsed";

pub const OUTPUT_EXTENSION: &str = "xlsx";

/// Suffix of every per-document output table.
pub const OUTPUT_SUFFIX: &str = "_parsed.xlsx";

/// Returns the document name without its final extension.
///
/// `"Acme_01.pdf"` -> `"Acme_01"`, `"a.b.pdf"` -> `"a.b"`, `".env"` -> `".env"`.
pub fn document_stem(document_name: &str) -> &str {
    match document_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => document_name,
    }
}

/// Output table file name for a source document.
///
/// Path separators in the document name are replaced so the table always
/// lands directly inside the output directory.
pub fn output_file_name(document_name: &str) -> String {
    let stem: String = document_stem(document_name)
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}{}", stem, OUTPUT_SUFFIX)
}

/// Project label: the stem up to the first underscore (whole stem if none).
pub fn project_name(document_name: &str) -> String {
    let stem = document_stem(document_name);
    stem.split('_').next().unwrap_or(stem).to_string()
}

pub fn is_output_table_name(name: &str) -> bool {
    name.ends_with(OUTPUT_SUFFIX)
}
