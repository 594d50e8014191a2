//! Counters and bounded failure diagnostics for imports and exports.

use serde::Serialize;

/// At most this many failures keep their details. The counters always hold
/// the true totals.
pub const MAX_FAILURE_DETAILS: usize = 10;

/// One failed row or file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureDetail {
    /// 1-based row within the archive entry, or 0 for files.
    pub row: usize,
    pub error: String,
    /// What was being processed, e.g. a book title or cover file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn push_capped(list: &mut Vec<FailureDetail>, detail: FailureDetail) {
    if list.len() < MAX_FAILURE_DETAILS {
        list.push(detail);
    }
}

fn extend_capped(list: &mut Vec<FailureDetail>, other: &[FailureDetail]) {
    let room = MAX_FAILURE_DETAILS.saturating_sub(list.len());
    list.extend(other.iter().take(room).cloned());
}

// ── Import ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResults {
    pub books_processed: usize,
    pub books_created: usize,
    pub books_updated: usize,
    pub books_skipped: usize,
    pub books_failed: usize,

    pub covers_processed: usize,
    pub covers_created: usize,
    pub covers_updated: usize,
    pub covers_skipped: usize,
    pub covers_failed: usize,

    pub preferences: usize,
    pub styles: usize,

    pub failures: Vec<FailureDetail>,
}

impl ImportResults {
    /// Record a failed book row. The count always goes up; details are kept
    /// only for the first [`MAX_FAILURE_DETAILS`] failures.
    pub fn record_failure(&mut self, row: usize, error: impl ToString, context: Option<&str>) {
        self.books_failed += 1;
        push_capped(
            &mut self.failures,
            FailureDetail {
                row,
                error: error.to_string(),
                context: context.map(str::to_string),
            },
        );
    }

    /// Record a cover file that could not be restored.
    pub fn record_cover_failure(&mut self, file_name: &str, error: impl ToString) {
        self.covers_failed += 1;
        push_capped(
            &mut self.failures,
            FailureDetail {
                row: 0,
                error: error.to_string(),
                context: Some(file_name.to_string()),
            },
        );
    }

    /// Add `other`'s counters to this one and append its failure details,
    /// keeping the list within the cap.
    pub fn merge(&mut self, other: &ImportResults) {
        self.books_processed += other.books_processed;
        self.books_created += other.books_created;
        self.books_updated += other.books_updated;
        self.books_skipped += other.books_skipped;
        self.books_failed += other.books_failed;
        self.covers_processed += other.covers_processed;
        self.covers_created += other.covers_created;
        self.covers_updated += other.covers_updated;
        self.covers_skipped += other.covers_skipped;
        self.covers_failed += other.covers_failed;
        self.preferences += other.preferences;
        self.styles += other.styles;
        extend_capped(&mut self.failures, &other.failures);
    }

    pub fn total_failed(&self) -> usize {
        self.books_failed + self.covers_failed
    }
}

// ── Export ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportResults {
    /// Local row ids of the exported books.
    pub books: Vec<i64>,
    /// Archive names of the exported cover files.
    pub covers: Vec<String>,
    pub preferences: usize,
    pub styles: usize,
    pub failed: usize,
    pub failures: Vec<FailureDetail>,
}

impl ExportResults {
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn cover_count(&self) -> usize {
        self.covers.len()
    }

    /// Whether anything at all was written.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.covers.is_empty() && self.preferences == 0 && self.styles == 0
    }

    pub fn record_failure(&mut self, row: usize, error: impl ToString, context: Option<&str>) {
        self.failed += 1;
        push_capped(
            &mut self.failures,
            FailureDetail {
                row,
                error: error.to_string(),
                context: context.map(str::to_string),
            },
        );
    }

    pub fn merge(&mut self, other: &ExportResults) {
        self.books.extend_from_slice(&other.books);
        self.covers.extend(other.covers.iter().cloned());
        self.preferences += other.preferences;
        self.styles += other.styles;
        self.failed += other.failed;
        extend_capped(&mut self.failures, &other.failures);
    }
}

#[cfg(test)]
#[path = "tests/results_tests.rs"]
mod tests;
