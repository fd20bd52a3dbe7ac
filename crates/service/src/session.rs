//! Bulk-edit session over a catalog snapshot.
//!
//! Holds the snapshot fetched from the Web API and the working copy being
//! edited. Row selection and "staged new" markers live in sets keyed by name,
//! parallel to the working list; the domain entity itself carries only
//! catalog fields. Search text drives the browsing/searching transitions of
//! the pagination state; the visible page is always derived, never stored.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use models::{validate_name, CatalogWriteEntry, ServiceTypeEntry};
use tracing::info;

use crate::errors::ServiceError;
use crate::pagination::{page_size_choices, PageMode, PaginationState};
use crate::reconcile::{reconcile, ReconciliationResult};

const DEFAULT_PAGE_SIZE: usize = 30;

pub struct BulkEditSession {
    original: Vec<ServiceTypeEntry>,
    working: Vec<ServiceTypeEntry>,
    selected: HashSet<String>,
    staged_new: HashSet<String>,
    search: Option<String>,
    pages: PaginationState,
    started_at: DateTime<Utc>,
}

fn matches_search(entry: &ServiceTypeEntry, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    entry.name.to_lowercase().contains(&needle)
        || entry
            .title
            .as_deref()
            .map(|t| t.to_lowercase().contains(&needle))
            .unwrap_or(false)
        || entry.description.to_lowercase().contains(&needle)
}

impl BulkEditSession {
    /// Open a session over a freshly fetched catalog snapshot.
    pub fn new(catalog: Vec<ServiceTypeEntry>) -> Self {
        let pages = PaginationState::new(catalog.len(), DEFAULT_PAGE_SIZE);
        Self {
            original: catalog.clone(),
            working: catalog,
            selected: HashSet::new(),
            staged_new: HashSet::new(),
            search: None,
            pages,
            started_at: Utc::now(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn working(&self) -> &[ServiceTypeEntry] {
        &self.working
    }

    pub fn is_staged_new(&self, name: &str) -> bool {
        self.staged_new.contains(name)
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    fn filtered_len(&self) -> usize {
        match &self.search {
            None => self.working.len(),
            Some(q) => self.working.iter().filter(|e| matches_search(e, q)).count(),
        }
    }

    /// Entries in scope for the current search filter, in working-list order.
    pub fn filtered(&self) -> Vec<&ServiceTypeEntry> {
        match &self.search {
            None => self.working.iter().collect(),
            Some(q) => self.working.iter().filter(|e| matches_search(e, q)).collect(),
        }
    }

    /// The slice of filtered entries visible on the current page.
    pub fn visible_page(&mut self) -> Result<Vec<ServiceTypeEntry>, ServiceError> {
        self.pages.clamp_page();
        let start = self.pages.start()?;
        let end = self.pages.end()?;
        let filtered = self.filtered();
        // the slice table can predate the latest keystroke; clip to what exists
        let end = end.min(filtered.len());
        let start = start.min(end);
        Ok(filtered[start..end].iter().map(|e| (*e).clone()).collect())
    }

    /// Apply or clear the search filter, driving the pagination mode machine.
    /// Entering and leaving search rebuild the slice table once; edits to an
    /// active search only update the effective length.
    pub fn set_search(&mut self, query: Option<&str>) {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let was_searching = self.search.is_some();
        match (was_searching, query) {
            (false, Some(q)) => {
                self.search = Some(q.to_string());
                let len = self.filtered_len();
                self.pages.enter_search(len);
            }
            (true, Some(q)) => {
                self.search = Some(q.to_string());
                let len = self.filtered_len();
                self.pages.update_search_len(len);
            }
            (true, None) => {
                self.search = None;
                self.pages.leave_search();
            }
            (false, None) => {}
        }
        self.pages.clamp_page();
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn set_page(&mut self, page: usize) {
        self.pages.set_page(page);
        self.pages.clamp_page();
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.pages.set_page_size(size);
        self.pages.clamp_page();
    }

    pub fn page_index(&self) -> usize {
        self.pages.page_index()
    }

    pub fn page_count(&mut self) -> usize {
        self.pages.page_count()
    }

    pub fn page_size_choices(&self) -> Vec<usize> {
        page_size_choices(self.pages.effective_len())
    }

    pub fn mode(&self) -> PageMode {
        self.pages.mode()
    }

    fn sync_len(&mut self) {
        self.pages.set_total_len(self.working.len(), self.filtered_len());
        self.pages.clamp_page();
    }

    /// Stage a new entry. Collisions against the fetched catalog report
    /// "already exists"; collisions against rows staged in this session
    /// report "already added".
    pub fn add(
        &mut self,
        name: &str,
        title: Option<&str>,
        description: &str,
    ) -> Result<(), ServiceError> {
        validate_name(name)?;
        if self.working.iter().any(|e| e.name == name) {
            if self.staged_new.contains(name) {
                return Err(ServiceError::AlreadyAdded(name.to_string()));
            }
            return Err(ServiceError::AlreadyExists(name.to_string()));
        }
        self.working.push(ServiceTypeEntry::local(name, title, description));
        self.staged_new.insert(name.to_string());
        self.sync_len();
        Ok(())
    }

    pub fn update_description(&mut self, name: &str, description: &str) -> Result<(), ServiceError> {
        let entry = self
            .working
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| ServiceError::not_found(name))?;
        entry.description = description.to_string();
        Ok(())
    }

    pub fn update_title(&mut self, name: &str, title: Option<&str>) -> Result<(), ServiceError> {
        let entry = self
            .working
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| ServiceError::not_found(name))?;
        entry.title = title.map(str::to_string);
        Ok(())
    }

    /// Flip a row's selection mark; returns the new state.
    pub fn toggle_selected(&mut self, name: &str) -> Result<bool, ServiceError> {
        if !self.working.iter().any(|e| e.name == name) {
            return Err(ServiceError::not_found(name));
        }
        if self.selected.remove(name) {
            Ok(false)
        } else {
            self.selected.insert(name.to_string());
            Ok(true)
        }
    }

    /// Drop all selected rows from the working list.
    pub fn remove_selected(&mut self) -> usize {
        let before = self.working.len();
        let selected = std::mem::take(&mut self.selected);
        self.working.retain(|e| !selected.contains(&e.name));
        for name in &selected {
            self.staged_new.remove(name);
        }
        self.sync_len();
        before - self.working.len()
    }

    pub fn remove(&mut self, name: &str) -> Result<(), ServiceError> {
        let pos = self
            .working
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| ServiceError::not_found(name))?;
        self.working.remove(pos);
        self.selected.remove(name);
        self.staged_new.remove(name);
        self.sync_len();
        Ok(())
    }

    /// Replace the working list with imported entries (collection-replace
    /// model); names absent from the snapshot count as staged-new.
    pub fn import(&mut self, entries: Vec<ServiceTypeEntry>) {
        self.staged_new = entries
            .iter()
            .filter(|e| !self.original.iter().any(|o| o.name == e.name))
            .map(|e| e.name.clone())
            .collect();
        self.selected.clear();
        self.working = entries;
        self.sync_len();
        info!(count = self.working.len(), staged_new = self.staged_new.len(), "imported catalog rows");
    }

    /// Three-way diff of the working list against the snapshot.
    pub fn changes(&self) -> ReconciliationResult {
        reconcile(&self.original, &self.working)
    }

    /// Full replacement payload for the Web API, sorted by name, tags
    /// stripped. The in-memory lists are untouched: on submit failure the
    /// session stays editable and retryable.
    pub fn replacement_payload(&self) -> Vec<CatalogWriteEntry> {
        let mut payload: Vec<CatalogWriteEntry> =
            self.working.iter().map(CatalogWriteEntry::from).collect();
        payload.sort_by(|a, b| a.name.cmp(&b.name));
        payload
    }

    /// Re-base the snapshot after the Web API accepted the replacement.
    pub fn committed(&mut self) {
        self.original = self.working.clone();
        self.staged_new.clear();
        self.selected.clear();
    }
}
