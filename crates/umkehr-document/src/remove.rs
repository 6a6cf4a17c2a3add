// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page removal by selection expression.

use tracing::{debug, info, instrument};
use umkehr_core::error::Result;

use crate::pdf::PageDocument;
use crate::selection::PageSelection;

/// Counts reported after a removal pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalSummary {
    pub removed: usize,
    /// Selected indices that were past the end of the document.
    pub skipped: usize,
    pub remaining: usize,
}

/// Deletes selected pages from a document.
pub struct PageRemover;

impl PageRemover {
    /// Delete the pages named by `expression` (1-based, e.g. `"2,5-7"`).
    ///
    /// The expression is resolved without a page count, so `all` is
    /// rejected. Only indices that exist in the document are materialised.
    #[instrument(skip(document))]
    pub fn remove_pages<D: PageDocument>(
        document: &mut D,
        expression: &str,
    ) -> Result<RemovalSummary> {
        let selection = PageSelection::resolve(expression, None)?;
        let present: Vec<usize> = selection.within(document.page_count()).collect();

        let mut summary = Self::remove_indices(document, &present)?;
        summary.skipped += selection.len() - present.len();
        Ok(summary)
    }

    /// Delete pages by 0-based index.
    ///
    /// Deletion runs from the highest index down so earlier deletions never
    /// shift a page that is still to be deleted.
    pub fn remove_indices<D: PageDocument>(
        document: &mut D,
        indices: &[usize],
    ) -> Result<RemovalSummary> {
        let mut ordered = indices.to_vec();
        ordered.sort_unstable_by(|a, b| b.cmp(a));
        ordered.dedup();

        let mut removed = 0;
        let mut skipped = 0;
        for index in ordered {
            if index < document.page_count() {
                document.delete_page(index)?;
                removed += 1;
            } else {
                debug!(index, "Index past last page, not removed");
                skipped += 1;
            }
        }

        let remaining = document.page_count();
        info!(removed, skipped, remaining, "Pages removed");
        Ok(RemovalSummary {
            removed,
            skipped,
            remaining,
        })
    }
}
