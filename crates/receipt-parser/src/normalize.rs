//! Flattens an analysis result into receipt line items.

use serde::Serialize;

use crate::extraction::result::{AnalyzeResult, DocumentField};
use crate::naming;
use crate::table::{Cell, Table};

pub const ITEMS_FIELD: &str = "Items";
pub const DESCRIPTION_FIELD: &str = "Description";
pub const QUANTITY_FIELD: &str = "Quantity";
pub const TOTAL_PRICE_FIELD: &str = "TotalPrice";
pub const TRANSACTION_DATE_FIELD: &str = "TransactionDate";

/// Output table columns, in order.
pub const COLUMNS: [&str; 5] = ["Description", "Quantity", "Total", "Project", "Date"];

const DEFAULT_QUANTITY: f64 = 1.0;
const DEFAULT_TOTAL: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub total: f64,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: DEFAULT_QUANTITY,
            total: DEFAULT_TOTAL,
        }
    }
}

/// All line items of one receipt. Project and date apply to every item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptRecord {
    pub project: String,
    pub date: String,
    pub items: Vec<LineItem>,
}

impl ReceiptRecord {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One row per item with Project and Date repeated on each.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(COLUMNS);
        for item in &self.items {
            table.push_row(vec![
                Cell::text(item.description.as_str()),
                Cell::Number(item.quantity),
                Cell::Number(item.total),
                Cell::text(self.project.as_str()),
                Cell::text(self.date.as_str()),
            ]);
        }
        table
    }
}

/// Maps the first recognized document into a record.
///
/// Returns `None` when the service recognized no document or the document
/// carries no line items; callers treat that as "nothing to save".
pub fn normalize(result: &AnalyzeResult, document_name: &str) -> Option<ReceiptRecord> {
    let document = result.documents.first()?;

    let items: Vec<LineItem> = document
        .fields
        .get(ITEMS_FIELD)
        .and_then(|f| f.value_array.as_ref())
        .map(|array| array.iter().map(line_item).collect())
        .unwrap_or_default();

    if items.is_empty() {
        return None;
    }

    let date = document
        .fields
        .get(TRANSACTION_DATE_FIELD)
        .and_then(|f| f.value_date.clone())
        .unwrap_or_default();

    Some(ReceiptRecord {
        project: naming::project_name(document_name),
        date,
        items,
    })
}

fn line_item(field: &DocumentField) -> LineItem {
    let Some(object) = field.value_object.as_ref() else {
        return LineItem::default();
    };

    LineItem {
        description: object
            .get(DESCRIPTION_FIELD)
            .and_then(|f| f.value_string.clone())
            .unwrap_or_default(),
        quantity: object
            .get(QUANTITY_FIELD)
            .and_then(|f| f.value_number)
            .unwrap_or(DEFAULT_QUANTITY),
        total: object
            .get(TOTAL_PRICE_FIELD)
            .and_then(DocumentField::numeric_value)
            .unwrap_or(DEFAULT_TOTAL),
    }
}
