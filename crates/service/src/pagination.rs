//! Pagination math for the catalog table.
//!
//! Page sizes come from a fixed breakpoint menu (30/50/100/"all"); each
//! allowed size is mapped eagerly to its list of page slices so switching
//! size never recomputes mid-session. `PaginationState` layers a two-mode
//! state machine (browsing / searching) on top: the slice tables are rebuilt
//! only on a mode transition or a scope change, never per keystroke.

use std::collections::HashMap;

use crate::errors::ServiceError;

/// Fixed page-size breakpoints offered by the table controls.
const BREAKPOINTS: [usize; 3] = [30, 50, 100];

/// Half-open index range `[start, end)` representing one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSlice {
    pub start: usize,
    pub end: usize,
}

impl PageSlice {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Page-size menu for a scope of `total_len` items: the breakpoints up to the
/// first one covering the scope, with the exact total appended past 100 so
/// "show all" is always available.
pub fn page_size_choices(total_len: usize) -> Vec<usize> {
    let mut choices = Vec::with_capacity(BREAKPOINTS.len() + 1);
    for bp in BREAKPOINTS {
        choices.push(bp);
        if total_len <= bp {
            return choices;
        }
    }
    choices.push(total_len);
    choices
}

/// Partition `[0, scope_len)` into contiguous slices of `page_size`, the last
/// possibly shorter. An empty scope yields the single empty slice `[0, 0)` so
/// the paging controls stay stable instead of erroring.
pub fn slices_for(page_size: usize, scope_len: usize) -> Vec<PageSlice> {
    debug_assert!(page_size > 0, "page_size must be positive");
    if scope_len == 0 {
        return vec![PageSlice { start: 0, end: 0 }];
    }
    let times = scope_len / page_size;
    let mut slices = Vec::with_capacity(times + 1);
    for i in 0..times {
        slices.push(PageSlice { start: i * page_size, end: (i + 1) * page_size });
    }
    if times * page_size < scope_len {
        slices.push(PageSlice { start: times * page_size, end: scope_len });
    }
    slices
}

/// Slice lists precomputed for every allowed page size of one scope length.
#[derive(Clone, Debug)]
pub struct SliceTable {
    scope_len: usize,
    by_size: HashMap<usize, Vec<PageSlice>>,
}

impl SliceTable {
    pub fn build(scope_len: usize) -> Self {
        let mut by_size = HashMap::new();
        for size in page_size_choices(scope_len) {
            by_size.insert(size, slices_for(size, scope_len));
        }
        Self { scope_len, by_size }
    }

    pub fn scope_len(&self) -> usize {
        self.scope_len
    }

    /// Slices for `page_size`, computing on demand for sizes outside the menu.
    pub fn slices(&mut self, page_size: usize) -> &[PageSlice] {
        self.by_size
            .entry(page_size)
            .or_insert_with(|| slices_for(page_size, self.scope_len))
    }
}

/// Whether the table is showing the full catalog or a search-filtered subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageMode {
    Browsing,
    Searching { result_len: usize },
}

/// Paging state for the catalog table.
///
/// Callers own page clamping: `start`/`end` report `PageOutOfRange` (a
/// programming error, not a user condition) when the page index exceeds the
/// slice count; call `clamp_page` after any scope or size change.
#[derive(Clone, Debug)]
pub struct PaginationState {
    total_len: usize,
    page_size: usize,
    page_index: usize,
    mode: PageMode,
    table: SliceTable,
}

impl PaginationState {
    pub fn new(total_len: usize, page_size: usize) -> Self {
        Self {
            total_len,
            page_size,
            page_index: 0,
            mode: PageMode::Browsing,
            table: SliceTable::build(total_len),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    /// Length of the list currently in scope: the search-result length while
    /// searching, the full catalog length otherwise.
    pub fn effective_len(&self) -> usize {
        match self.mode {
            PageMode::Browsing => self.total_len,
            PageMode::Searching { result_len } => result_len,
        }
    }

    /// Enter search mode; the slice table is rebuilt against the filtered
    /// length once, on this transition.
    pub fn enter_search(&mut self, result_len: usize) {
        self.mode = PageMode::Searching { result_len };
        self.table = SliceTable::build(result_len);
    }

    /// Narrow or widen an active search without rebuilding the slice table;
    /// only the effective length used by `page_count` changes.
    pub fn update_search_len(&mut self, result_len: usize) {
        if let PageMode::Searching { result_len: len } = &mut self.mode {
            *len = result_len;
        }
    }

    /// Leave search mode and restore the full-catalog slice table.
    pub fn leave_search(&mut self) {
        self.mode = PageMode::Browsing;
        self.table = SliceTable::build(self.total_len);
    }

    /// The catalog length changed (rows added or removed); rebuild the table
    /// for the current scope.
    pub fn set_total_len(&mut self, total_len: usize, filtered_len: usize) {
        self.total_len = total_len;
        match self.mode {
            PageMode::Browsing => self.table = SliceTable::build(total_len),
            PageMode::Searching { .. } => {
                self.mode = PageMode::Searching { result_len: filtered_len };
                self.table = SliceTable::build(filtered_len);
            }
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size > 0 {
            self.page_size = page_size;
        }
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    /// Clamp the page index into `[0, available slices)` for the current size.
    pub fn clamp_page(&mut self) {
        let pages = self.table.slices(self.page_size).len();
        if self.page_index >= pages {
            self.page_index = pages.saturating_sub(1);
        }
    }

    fn current_slice(&mut self) -> Result<PageSlice, ServiceError> {
        let page = self.page_index;
        let slices = self.table.slices(self.page_size);
        slices
            .get(page)
            .copied()
            .ok_or(ServiceError::PageOutOfRange { page, pages: slices.len() })
    }

    pub fn start(&mut self) -> Result<usize, ServiceError> {
        Ok(self.current_slice()?.start)
    }

    pub fn end(&mut self) -> Result<usize, ServiceError> {
        Ok(self.current_slice()?.end)
    }

    /// Number of pages reported to the paging controls.
    ///
    /// Over-counts by one whenever the effective length is an exact multiple
    /// of the page size (60 items at size 30 report 3 pages, not 2). Kept for
    /// compatibility with the legacy frontend, whose controls clamp
    /// navigation to non-empty slices.
    pub fn page_count(&mut self) -> usize {
        match self.mode {
            // the single-slice short-circuit only holds while browsing: a
            // searching slice table is frozen at enter_search time and may
            // lag behind the live result length
            PageMode::Browsing => {
                if self.table.slices(self.page_size).len() == 1 {
                    1
                } else {
                    self.total_len / self.page_size + 1
                }
            }
            PageMode::Searching { result_len } => {
                if result_len <= self.page_size {
                    1
                } else {
                    result_len / self.page_size + 1
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_follow_breakpoints() {
        assert_eq!(page_size_choices(0), vec![30]);
        assert_eq!(page_size_choices(1), vec![30]);
        assert_eq!(page_size_choices(29), vec![30]);
        assert_eq!(page_size_choices(30), vec![30]);
        assert_eq!(page_size_choices(31), vec![30, 50]);
        assert_eq!(page_size_choices(50), vec![30, 50]);
        assert_eq!(page_size_choices(51), vec![30, 50, 100]);
        assert_eq!(page_size_choices(100), vec![30, 50, 100]);
        assert_eq!(page_size_choices(101), vec![30, 50, 100, 101]);
        assert_eq!(page_size_choices(500), vec![30, 50, 100, 500]);
    }

    #[test]
    fn choices_are_strictly_increasing() {
        for len in [0, 29, 30, 31, 50, 51, 99, 100, 101, 500, 10_000] {
            let c = page_size_choices(len);
            assert!(c.windows(2).all(|w| w[0] < w[1]), "len {len}: {c:?}");
        }
    }

    #[test]
    fn slices_partition_the_scope() {
        for scope_len in [0usize, 1, 29, 30, 31, 59, 60, 61, 65, 100, 101, 250] {
            for page_size in [1usize, 7, 30, 50, 100] {
                let slices = slices_for(page_size, scope_len);
                let covered: usize = slices.iter().map(PageSlice::len).sum();
                assert_eq!(covered, scope_len, "size {page_size} len {scope_len}");
                assert_eq!(slices[0].start, 0);
                for w in slices.windows(2) {
                    assert_eq!(w[0].end, w[1].start, "slices must be contiguous");
                }
                for s in &slices[..slices.len().saturating_sub(1)] {
                    assert_eq!(s.len(), page_size, "only the last slice may be short");
                }
            }
        }
    }

    #[test]
    fn empty_scope_has_single_empty_slice() {
        assert_eq!(slices_for(30, 0), vec![PageSlice { start: 0, end: 0 }]);
    }

    #[test]
    fn slices_for_65_items_at_30() {
        assert_eq!(
            slices_for(30, 65),
            vec![
                PageSlice { start: 0, end: 30 },
                PageSlice { start: 30, end: 60 },
                PageSlice { start: 60, end: 65 },
            ]
        );
    }

    #[test]
    fn slice_table_covers_every_choice() {
        let mut table = SliceTable::build(120);
        for size in page_size_choices(120) {
            let slices = table.slices(size);
            assert_eq!(slices.iter().map(PageSlice::len).sum::<usize>(), 120);
        }
        // sizes outside the menu are computed on demand
        assert_eq!(table.slices(7).len(), 18);
    }

    #[test]
    fn browsing_page_offsets() {
        let mut p = PaginationState::new(65, 30);
        assert_eq!(p.start().expect("page 0"), 0);
        assert_eq!(p.end().expect("page 0"), 30);
        p.set_page(2);
        assert_eq!(p.start().expect("page 2"), 60);
        assert_eq!(p.end().expect("page 2"), 65);
        assert_eq!(p.page_count(), 3);
    }

    #[test]
    fn page_out_of_range_is_an_error() {
        let mut p = PaginationState::new(65, 30);
        p.set_page(3);
        assert!(matches!(
            p.start(),
            Err(ServiceError::PageOutOfRange { page: 3, pages: 3 })
        ));
        p.clamp_page();
        assert_eq!(p.page_index(), 2);
        assert!(p.start().is_ok());
    }

    #[test]
    fn page_count_exact_multiple_overcounts() {
        // inherited behavior: 60 items at size 30 report 3 pages
        let mut p = PaginationState::new(60, 30);
        assert_eq!(p.page_count(), 3);
    }

    #[test]
    fn single_page_scope_counts_one() {
        let mut p = PaginationState::new(12, 30);
        assert_eq!(p.page_count(), 1);
        let mut empty = PaginationState::new(0, 30);
        assert_eq!(empty.page_count(), 1);
        assert_eq!(empty.start().expect("empty page"), 0);
        assert_eq!(empty.end().expect("empty page"), 0);
    }

    #[test]
    fn search_transitions_rebuild_once() {
        let mut p = PaginationState::new(200, 30);
        assert_eq!(p.page_count(), 7); // 200/30 + 1

        p.enter_search(45);
        assert_eq!(p.effective_len(), 45);
        assert_eq!(p.page_count(), 2); // 45/30 + 1
        p.set_page(1);
        assert_eq!(p.start().expect("page 1"), 30);
        assert_eq!(p.end().expect("page 1"), 45);

        // narrowing the search updates the effective length without touching slices
        p.update_search_len(12);
        assert_eq!(p.effective_len(), 12);
        assert_eq!(p.page_count(), 1);

        p.leave_search();
        assert_eq!(p.effective_len(), 200);
        assert_eq!(p.page_count(), 7);
    }

    #[test]
    fn widened_search_page_count_tracks_result_len() {
        // query shortened after entering search: the slice table still dates
        // from the narrow result, but the page count must follow the live
        // effective length
        let mut p = PaginationState::new(200, 30);
        p.enter_search(10);
        assert_eq!(p.page_count(), 1);
        p.update_search_len(45);
        assert_eq!(p.page_count(), 2, "45 results at size 30 must report 2 pages");
        p.update_search_len(12);
        assert_eq!(p.page_count(), 1);
    }

    #[test]
    fn searching_small_result_is_one_page() {
        let mut p = PaginationState::new(200, 30);
        p.enter_search(30);
        assert_eq!(p.page_count(), 1);
        p.enter_search(31);
        assert_eq!(p.page_count(), 2);
    }
}
