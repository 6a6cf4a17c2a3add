// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page selection expressions: "all", "3", "2-5", "1-3,7,9-12".
//
// Expressions are written with 1-based page numbers and resolve to sorted,
// deduplicated 0-based indices. Bounds against a live document are checked by
// the consumer, not here: an index past the end is carried through and
// skipped at the point of use.
//
// Ranges are kept as merged, inclusive spans and only expanded lazily, so the
// cost of a selection never depends on how far a range reaches.

use std::ops::RangeInclusive;

use umkehr_core::error::{Result, UmkehrError};

/// Token selecting every page of the document.
pub const ALL_PAGES: &str = "all";

/// A resolved set of 0-based page indices, ascending and duplicate-free.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelection {
    /// Disjoint, non-adjacent spans in ascending order.
    spans: Vec<RangeInclusive<usize>>,
}

impl PageSelection {
    /// Resolve a selection expression into 0-based page indices.
    ///
    /// `"all"` (any case, surrounding whitespace ignored) needs `total_pages`
    /// and yields `0..total_pages`; without it a `Configuration` error is
    /// returned. Otherwise the expression is a comma-separated list of 1-based
    /// pages and inclusive ranges. Empty segments are ignored.
    pub fn resolve(expression: &str, total_pages: Option<usize>) -> Result<Self> {
        let normalised = expression.trim().to_lowercase();

        if normalised == ALL_PAGES {
            let total = total_pages.ok_or_else(|| {
                UmkehrError::Configuration(
                    "\"all\" was requested but the page count is not known".to_string(),
                )
            })?;
            let spans = if total == 0 { Vec::new() } else { vec![0..=total - 1] };
            return Ok(Self { spans });
        }

        let mut spans = Vec::new();
        for segment in normalised.split(',').map(str::trim) {
            if segment.is_empty() {
                continue;
            }

            match segment.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page_number(start, segment)?;
                    let end = parse_page_number(end, segment)?;
                    if start > end {
                        return Err(UmkehrError::Parse(format!(
                            "range '{segment}' starts after it ends"
                        )));
                    }
                    spans.push(start - 1..=end - 1);
                }
                None => {
                    let page = parse_page_number(segment, segment)? - 1;
                    spans.push(page..=page);
                }
            }
        }

        Ok(Self {
            spans: merge(spans),
        })
    }

    /// All indices, in ascending order. Out-of-range indices included.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.spans.iter().flat_map(|span| span.clone())
    }

    /// Indices that exist in a document of `page_count` pages.
    pub fn within(&self, page_count: usize) -> impl Iterator<Item = usize> + '_ {
        self.iter().take_while(move |&index| index < page_count)
    }

    /// Number of selected indices, including any past the end of a document.
    pub fn len(&self) -> usize {
        self.spans
            .iter()
            .map(|span| span.end() - span.start() + 1)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Sort spans and fold overlapping or touching ones together.
fn merge(mut spans: Vec<RangeInclusive<usize>>) -> Vec<RangeInclusive<usize>> {
    spans.sort_unstable_by_key(|span| *span.start());

    let mut merged: Vec<RangeInclusive<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if *span.start() <= last.end().saturating_add(1) => {
                if span.end() > last.end() {
                    *last = *last.start()..=*span.end();
                }
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Parse one 1-based page number. Zero is rejected since it would map to a
/// negative index.
fn parse_page_number(raw: &str, segment: &str) -> Result<usize> {
    let raw = raw.trim();
    let page = raw.parse::<usize>().map_err(|_| {
        UmkehrError::Parse(format!("'{raw}' in segment '{segment}' is not a page number"))
    })?;
    if page == 0 {
        return Err(UmkehrError::Parse(format!(
            "page numbers start at 1 (segment '{segment}')"
        )));
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn resolve(expression: &str, total_pages: Option<usize>) -> Result<Vec<usize>> {
        PageSelection::resolve(expression, total_pages).map(|selection| selection.iter().collect())
    }

    #[test]
    fn ranges_and_singles_combine() {
        assert_eq!(resolve("1-3,5", None).unwrap(), vec![0, 1, 2, 4]);
    }

    #[test]
    fn overlapping_segments_are_deduplicated_and_sorted() {
        assert_eq!(resolve("9, 2-4 ,3,1-2", None).unwrap(), vec![0, 1, 2, 3, 8]);
        assert_eq!(resolve("4-6,1-3", None).unwrap(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn legacy_default_selection_resolves() {
        let selection =
            PageSelection::resolve("1-12,14-20,22-32,56,66-78,82-97", None).unwrap();
        let pages: Vec<usize> = selection.iter().collect();
        assert_eq!(selection.len(), 12 + 7 + 11 + 1 + 13 + 16);
        assert_eq!(pages.len(), selection.len());
        assert_eq!(pages.first(), Some(&0));
        assert_eq!(pages.last(), Some(&96));
        assert!(!pages.contains(&12));
    }

    #[test]
    fn all_uses_total_page_count() {
        assert_eq!(
            resolve(" ALL ", Some(10)).unwrap(),
            (0..10).collect::<Vec<_>>()
        );
        assert!(PageSelection::resolve("all", Some(0)).unwrap().is_empty());
    }

    #[test]
    fn all_without_page_count_is_a_configuration_error() {
        assert!(matches!(
            resolve("all", None),
            Err(UmkehrError::Configuration(_))
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(resolve("3-1", None), Err(UmkehrError::Parse(_))));
    }

    #[test]
    fn non_numeric_segment_is_rejected() {
        assert!(matches!(resolve("x", None), Err(UmkehrError::Parse(_))));
        assert!(matches!(resolve("1-b", None), Err(UmkehrError::Parse(_))));
        assert!(matches!(resolve("1-2-3", None), Err(UmkehrError::Parse(_))));
    }

    #[test]
    fn page_zero_is_rejected() {
        assert!(matches!(resolve("0", None), Err(UmkehrError::Parse(_))));
        assert!(matches!(resolve("0-4", None), Err(UmkehrError::Parse(_))));
    }

    #[test]
    fn empty_segments_are_tolerated() {
        assert_eq!(resolve(",2,,4,", None).unwrap(), vec![1, 3]);
        assert!(resolve("   ", None).unwrap().is_empty());
    }

    #[test]
    fn out_of_bounds_indices_are_kept_for_the_consumer() {
        let selection = PageSelection::resolve("2,50", Some(10)).unwrap();
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![1, 49]);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.within(10).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn huge_range_resolves_without_expanding() {
        let started = Instant::now();

        let selection = PageSelection::resolve("1-4000000000", Some(10)).unwrap();
        assert_eq!(selection.len(), 4_000_000_000);
        assert_eq!(selection.within(10).collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());

        let unbounded = PageSelection::resolve("3, 1-4000000000", None).unwrap();
        assert_eq!(unbounded.len(), 4_000_000_000);
        assert_eq!(unbounded.within(3).count(), 3);

        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
