use crate::models::{Domain, FilterSet, PageRequest, SearchResult, SortDirection};
use crate::search::{CandidateDomain, OpeningDomain, SearchClient, SearchDomain};

/// Identifies one issued search. Results are applied only while their
/// ticket is still the latest for the domain, so a slow response can never
/// clobber the state of a newer search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    epoch: u64,
}

/// Live search state for one domain: current filters, pagination, the last
/// good result page and the last error. Editing filters and running
/// searches are deliberately separate steps.
pub struct DomainSession<D: SearchDomain> {
    pub filters: D::Filters,
    pub page: PageRequest,
    pub results: Option<SearchResult<D::Row>>,
    pub error: Option<String>,
    searching: bool,
    epoch: u64,
}

impl<D: SearchDomain> Default for DomainSession<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: SearchDomain> DomainSession<D> {
    pub fn new() -> Self {
        Self {
            filters: D::Filters::default(),
            page: PageRequest::default(),
            results: None,
            error: None,
            searching: false,
            epoch: 0,
        }
    }

    /// Mutate filter fields in place. Any filter change moves the session
    /// back to page 0; only explicit pagination moves it elsewhere.
    pub fn update_filters(&mut self, apply: impl FnOnce(&mut D::Filters)) {
        apply(&mut self.filters);
        self.page.page = 0;
    }

    /// Replace the whole filter set (used when loading a saved search).
    pub fn replace_filters(&mut self, filters: D::Filters) {
        self.filters = filters;
        self.page.page = 0;
    }

    /// Back to the domain defaults: empty filters, first page, no results.
    pub fn reset(&mut self) {
        self.filters = D::Filters::default();
        self.page = PageRequest::default();
        self.results = None;
        self.error = None;
        self.searching = false;
    }

    /// Move to page `n`, clamped against the last known page count when a
    /// result exists. Returns the page actually selected.
    pub fn change_page(&mut self, n: u32) -> u32 {
        let target = match &self.results {
            Some(results) => n.min(results.total_pages.saturating_sub(1)),
            None => n,
        };
        self.page.page = target;
        target
    }

    pub fn change_sort(&mut self, field: &str, direction: SortDirection) {
        self.page.sort_by = field.to_string();
        self.page.sort_direction = direction;
        self.page.page = 0;
    }

    /// Enter the Searching state. A ticket issued later always supersedes
    /// earlier ones, whether or not they have resolved yet.
    pub fn begin_search(&mut self) -> SearchTicket {
        self.epoch += 1;
        self.searching = true;
        self.error = None;
        SearchTicket { epoch: self.epoch }
    }

    /// Apply a successful result if the ticket is still current. Stale
    /// results are dropped without touching any state.
    pub fn apply_success(&mut self, ticket: SearchTicket, results: SearchResult<D::Row>) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        self.searching = false;
        self.error = None;
        self.results = Some(results);
        true
    }

    /// Record a failure for the current ticket. The previous results stay
    /// visible; only the error message changes.
    pub fn apply_failure(&mut self, ticket: SearchTicket, message: impl Into<String>) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        self.searching = false;
        self.error = Some(message.into());
        true
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn active_filter_count(&self) -> usize {
        self.filters.active_count()
    }

    pub fn total_elements(&self) -> u64 {
        self.results.as_ref().map_or(0, |r| r.total_elements)
    }
}

/// The two independent search domains behind one surface. Switching the
/// active tab never disturbs the other domain's state.
pub struct SearchSession {
    pub candidates: DomainSession<CandidateDomain>,
    pub openings: DomainSession<OpeningDomain>,
    pub active: Domain,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            candidates: DomainSession::new(),
            openings: DomainSession::new(),
            active: Domain::Candidates,
        }
    }

    pub fn switch_to(&mut self, domain: Domain) {
        self.active = domain;
    }

    pub fn toggle_domain(&mut self) {
        self.active = match self.active {
            Domain::Candidates => Domain::Openings,
            Domain::Openings => Domain::Candidates,
        };
    }

    pub fn active_filter_count(&self) -> usize {
        match self.active {
            Domain::Candidates => self.candidates.active_filter_count(),
            Domain::Openings => self.openings.active_filter_count(),
        }
    }

    pub fn active_error(&self) -> Option<&str> {
        match self.active {
            Domain::Candidates => self.candidates.error.as_deref(),
            Domain::Openings => self.openings.error.as_deref(),
        }
    }

    pub fn reset_active(&mut self) {
        match self.active {
            Domain::Candidates => self.candidates.reset(),
            Domain::Openings => self.openings.reset(),
        }
    }
}

/// Issue one blocking search for the session, routing the outcome through
/// the ticket guard. Returns whether the outcome was applied.
pub fn run_search<D: SearchDomain>(client: &SearchClient, session: &mut DomainSession<D>) -> bool {
    let ticket = session.begin_search();
    match client.execute::<D>(&session.filters, &session.page) {
        Ok(results) => session.apply_success(ticket, results),
        Err(err) => session.apply_failure(ticket, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, CandidateFilters, Opening};

    fn result_page(rows: usize, page: u32, total_pages: u32) -> SearchResult<Candidate> {
        let total = (total_pages as u64) * 20;
        SearchResult {
            content: vec![Candidate::default(); rows],
            page,
            size: 20,
            total_elements: total,
            total_pages,
            first: page == 0,
            last: page + 1 >= total_pages,
            empty: rows == 0,
            search_time_ms: 5,
        }
    }

    #[test]
    fn test_change_page_unbounded_before_first_result() {
        let mut session = DomainSession::<CandidateDomain>::new();
        assert_eq!(session.change_page(7), 7);
        assert_eq!(session.page.page, 7);
    }

    #[test]
    fn test_change_page_clamps_against_known_total() {
        let mut session = DomainSession::<CandidateDomain>::new();
        let ticket = session.begin_search();
        session.apply_success(ticket, result_page(20, 0, 3));

        assert_eq!(session.change_page(2), 2);
        assert_eq!(session.change_page(99), 2);
        assert_eq!(session.page.page, 2);
    }

    #[test]
    fn test_change_page_clamps_to_zero_for_empty_results() {
        let mut session = DomainSession::<CandidateDomain>::new();
        let ticket = session.begin_search();
        session.apply_success(ticket, result_page(0, 0, 0));

        assert_eq!(session.change_page(4), 0);
    }

    #[test]
    fn test_filter_mutation_resets_page() {
        let mut session = DomainSession::<CandidateDomain>::new();
        session.page.page = 3;
        session.update_filters(|f| f.locations.push("Remote".to_string()));
        assert_eq!(session.page.page, 0);
        assert_eq!(session.filters.locations, ["Remote"]);
    }

    #[test]
    fn test_sort_change_resets_page() {
        let mut session = DomainSession::<CandidateDomain>::new();
        session.page.page = 2;
        session.change_sort("experience", SortDirection::Asc);
        assert_eq!(session.page.page, 0);
        assert_eq!(session.page.sort_by, "experience");
        assert_eq!(session.page.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut session = DomainSession::<CandidateDomain>::new();
        let first = session.begin_search();
        let second = session.begin_search();

        // The superseded search resolves late; nothing may change.
        assert!(!session.apply_success(first, result_page(20, 0, 5)));
        assert!(session.results.is_none());
        assert!(session.is_searching());

        assert!(session.apply_success(second, result_page(3, 0, 1)));
        assert!(!session.is_searching());
        assert_eq!(session.results.as_ref().unwrap().total_pages, 1);
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let mut session = DomainSession::<CandidateDomain>::new();
        let first = session.begin_search();
        let second = session.begin_search();

        assert!(!session.apply_failure(first, "timed out"));
        assert!(session.error.is_none());

        assert!(session.apply_success(second, result_page(1, 0, 1)));
        assert!(session.error.is_none());
    }

    #[test]
    fn test_failure_keeps_previous_results_visible() {
        let mut session = DomainSession::<CandidateDomain>::new();
        let ticket = session.begin_search();
        session.apply_success(ticket, result_page(20, 0, 2));

        let ticket = session.begin_search();
        session.apply_failure(ticket, "backend unreachable");

        assert_eq!(session.error.as_deref(), Some("backend unreachable"));
        let stale = session.results.as_ref().unwrap();
        assert_eq!(stale.content.len(), 20);
    }

    #[test]
    fn test_begin_search_clears_prior_error() {
        let mut session = DomainSession::<CandidateDomain>::new();
        let ticket = session.begin_search();
        session.apply_failure(ticket, "boom");
        session.begin_search();
        assert!(session.error.is_none());
        assert!(session.is_searching());
    }

    #[test]
    fn test_reset_restores_defaults_and_clears_results() {
        let mut session = DomainSession::<CandidateDomain>::new();
        session.update_filters(|f| f.text_query = "java".to_string());
        session.change_page(0);
        let ticket = session.begin_search();
        session.apply_success(ticket, result_page(20, 0, 2));

        session.reset();
        assert_eq!(session.filters, CandidateFilters::default());
        assert_eq!(session.page, PageRequest::default());
        assert!(session.results.is_none());
        assert!(session.error.is_none());
    }

    #[test]
    fn test_domains_keep_independent_state() {
        let mut session = SearchSession::new();
        session
            .candidates
            .update_filters(|f| f.primary_skills.push("Java".to_string()));
        session
            .openings
            .update_filters(|f| f.departments.push("Design".to_string()));
        session.openings.page.page = 4;

        session.toggle_domain();
        assert_eq!(session.active, Domain::Openings);
        assert_eq!(session.candidates.filters.primary_skills, ["Java"]);
        assert_eq!(session.openings.filters.departments, ["Design"]);
        assert_eq!(session.openings.page.page, 4);

        session.toggle_domain();
        assert_eq!(session.active, Domain::Candidates);
        assert_eq!(session.candidates.filters.primary_skills, ["Java"]);
    }

    #[test]
    fn test_active_filter_count_follows_active_tab() {
        let mut session = SearchSession::new();
        session
            .candidates
            .update_filters(|f| f.primary_skills.push("Java".to_string()));
        assert_eq!(session.active_filter_count(), 1);

        session.switch_to(Domain::Openings);
        assert_eq!(session.active_filter_count(), 0);
    }

    #[test]
    fn test_reset_active_leaves_other_domain_alone() {
        let mut session = SearchSession::new();
        session
            .candidates
            .update_filters(|f| f.text_query = "java".to_string());
        session
            .openings
            .update_filters(|f| f.text_query = "design".to_string());

        session.switch_to(Domain::Openings);
        session.reset_active();

        assert!(session.openings.filters.text_query.is_empty());
        assert_eq!(session.candidates.filters.text_query, "java");
    }

    #[test]
    fn test_opening_session_works_through_same_machinery() {
        let mut session = DomainSession::<OpeningDomain>::new();
        let ticket = session.begin_search();
        let results = SearchResult::<Opening> {
            content: vec![Opening::default(); 2],
            page: 0,
            size: 20,
            total_elements: 2,
            total_pages: 1,
            first: true,
            last: true,
            empty: false,
            search_time_ms: 9,
        };
        assert!(session.apply_success(ticket, results));
        assert_eq!(session.total_elements(), 2);
    }
}
