//! Decides which listed documents the pipeline should leave alone.

use std::fmt;

use serde::Serialize;

use crate::naming::{OUTPUT_EXTENSION, PROCESSED_MARKER};
use crate::store::{SourceDocument, GOOGLE_SPREADSHEET_MIME, XLSX_MIME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// Name has the output table extension.
    SpreadsheetName,
    /// Name carries the processed marker.
    ProcessedMarker,
    /// Content type is a spreadsheet.
    SpreadsheetType,
    /// An output table with the derived name already exists.
    AlreadyParsed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::SpreadsheetName => "spreadsheet file name",
            SkipReason::ProcessedMarker => "already processed",
            SkipReason::SpreadsheetType => "spreadsheet content type",
            SkipReason::AlreadyParsed => "output table exists",
        };
        f.write_str(text)
    }
}

/// Returns why `document` must not be processed, or `None` if it should be.
pub fn skip_reason(document: &SourceDocument) -> Option<SkipReason> {
    let name = document.name.to_ascii_lowercase();

    if name.ends_with(&format!(".{}", OUTPUT_EXTENSION)) {
        return Some(SkipReason::SpreadsheetName);
    }
    if document.name.contains(PROCESSED_MARKER) {
        return Some(SkipReason::ProcessedMarker);
    }

    let content_type = document.content_type.to_ascii_lowercase();
    let essence = content_type.split(';').next().unwrap_or("").trim();
    if essence == GOOGLE_SPREADSHEET_MIME || essence == XLSX_MIME {
        return Some(SkipReason::SpreadsheetType);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, content_type: &str) -> SourceDocument {
        SourceDocument::new(name, name, content_type)
    }

    #[test]
    fn test_receipts_are_processed() {
        assert_eq!(skip_reason(&doc("Acme_01.pdf", "application/pdf")), None);
        assert_eq!(skip_reason(&doc("IMG_2231.JPG", "image/jpeg")), None);
    }

    #[test]
    fn test_output_tables_skipped() {
        assert_eq!(
            skip_reason(&doc("Acme_01_parsed.xlsx", XLSX_MIME)),
            Some(SkipReason::SpreadsheetName)
        );
        assert_eq!(
            skip_reason(&doc("Budget.XLSX", "application/octet-stream")),
            Some(SkipReason::SpreadsheetName)
        );
    }

    #[test]
    fn test_processed_marker_skipped() {
        assert_eq!(
            skip_reason(&doc("Acme_01_parsed.pdf", "application/pdf")),
            Some(SkipReason::ProcessedMarker)
        );
    }

    #[test]
    fn test_spreadsheet_types_skipped() {
        assert_eq!(
            skip_reason(&doc("Budget", GOOGLE_SPREADSHEET_MIME)),
            Some(SkipReason::SpreadsheetType)
        );
        assert_eq!(
            skip_reason(&doc("export", XLSX_MIME)),
            Some(SkipReason::SpreadsheetType)
        );
    }

    #[test]
    fn test_combined_table_skipped() {
        assert_eq!(
            skip_reason(&doc("All_Receipts_Combined.xlsx", XLSX_MIME)),
            Some(SkipReason::SpreadsheetName)
        );
    }
}
