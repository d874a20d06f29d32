//! Uptime report state machine.
//!
//! Filters, page number and per-group expand flags live here. Every
//! transition that needs fresh data returns a [`ReportRequest`]; the caller
//! runs it and feeds the outcome back with the same sequence number.
//! Only the most recently issued request may change the view, so a slow
//! response can never overwrite a newer one.

use crate::error::CliError;
use crate::models::{AnalyzeFilter, AnalyzeResponse, REPORT_PAGE_SIZE, ServiceUptimeGroup};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilters {
    pub service_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// A fetch the caller should perform.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub seq: u64,
    pub filter: AnalyzeFilter,
}

/// Entry for the service selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug)]
pub struct ReportView {
    filters: ReportFilters,
    page_number: u32,
    total_pages: u32,
    data: Vec<ServiceUptimeGroup>,
    expanded: BTreeMap<String, bool>,
    loading: bool,
    next_seq: u64,
    latest_seq: Option<u64>,
    refetch: Option<ReportRequest>,
    service_options: Vec<ServiceOption>,
}

impl Default for ReportView {
    fn default() -> Self {
        Self {
            filters: ReportFilters::default(),
            page_number: 1,
            total_pages: 1,
            data: Vec::new(),
            expanded: BTreeMap::new(),
            loading: false,
            next_seq: 1,
            latest_seq: None,
            refetch: None,
            service_options: Vec::new(),
        }
    }
}

impl ReportView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with pre-set filters (command-line flags) and a starting page.
    ///
    /// The page is only a hint; it is clamped once the page count is known.
    pub fn with_filters(filters: ReportFilters, page_number: u32) -> Self {
        Self {
            filters,
            page_number: page_number.max(1),
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn filters(&self) -> &ReportFilters {
        &self.filters
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn data(&self) -> &[ServiceUptimeGroup] {
        &self.data
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_expanded(&self, service_id: &str) -> bool {
        self.expanded.get(service_id).copied().unwrap_or(false)
    }

    pub fn can_prev(&self) -> bool {
        self.page_number > 1
    }

    pub fn can_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn service_options(&self) -> &[ServiceOption] {
        &self.service_options
    }

    pub fn set_service_options(&mut self, options: Vec<ServiceOption>) {
        self.service_options = options;
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// First fetch when the view is shown.
    pub fn mount(&mut self) -> ReportRequest {
        self.issue()
    }

    pub fn set_service(&mut self, service_id: Option<String>) -> Option<ReportRequest> {
        if self.filters.service_id == service_id {
            return None;
        }
        self.filters.service_id = service_id;
        Some(self.filters_changed())
    }

    pub fn set_from(&mut self, from: Option<DateTime<Utc>>) -> Option<ReportRequest> {
        if self.filters.from == from {
            return None;
        }
        self.filters.from = from;
        Some(self.filters_changed())
    }

    pub fn set_to(&mut self, to: Option<DateTime<Utc>>) -> Option<ReportRequest> {
        if self.filters.to == to {
            return None;
        }
        self.filters.to = to;
        Some(self.filters_changed())
    }

    pub fn prev_page(&mut self) -> Option<ReportRequest> {
        if !self.can_prev() {
            return None;
        }
        self.page_number = self.page_number.saturating_sub(1).max(1);
        Some(self.issue())
    }

    pub fn next_page(&mut self) -> Option<ReportRequest> {
        if !self.can_next() {
            return None;
        }
        self.page_number = (self.page_number + 1).min(self.total_pages);
        Some(self.issue())
    }

    /// Refetch with the current filters and page.
    pub fn analyze(&mut self) -> ReportRequest {
        self.issue()
    }

    /// Apply a response. Returns false when it was stale and discarded.
    ///
    /// When the page count shrank below the requested page, the page is
    /// clamped and a fetch for the clamped page is queued; see
    /// [`ReportView::take_refetch`].
    pub fn fetch_succeeded(&mut self, seq: u64, response: AnalyzeResponse) -> bool {
        if !self.is_latest(seq) {
            tracing::debug!(seq, latest = ?self.latest_seq, "discarding stale report response");
            return false;
        }

        self.total_pages = total_pages(response.total_count, REPORT_PAGE_SIZE);
        let requested = self.page_number;
        self.page_number = requested.clamp(1, self.total_pages);
        self.expanded = response
            .items
            .iter()
            .map(|g| (g.monitored_service_id.clone(), false))
            .collect();
        self.data = response.items;
        self.loading = false;

        if self.page_number != requested {
            tracing::debug!(requested, page = self.page_number, "page out of range, refetching");
            let request = self.issue();
            self.refetch = Some(request);
        }
        true
    }

    /// Record a failed fetch. Data and page count stay as they were; the
    /// page is pulled back into range.
    pub fn fetch_failed(&mut self, seq: u64, err: &CliError) -> bool {
        if !self.is_latest(seq) {
            tracing::debug!(seq, error = %err, "ignoring stale report failure");
            return false;
        }
        tracing::error!(error = %err, "Failed to fetch report");
        self.page_number = self.page_number.clamp(1, self.total_pages);
        self.loading = false;
        true
    }

    /// The follow-up fetch queued by a clamping response, if still current.
    pub fn take_refetch(&mut self) -> Option<ReportRequest> {
        self.refetch
            .take()
            .filter(|request| self.is_latest(request.seq))
    }

    pub fn toggle_group(&mut self, service_id: &str) {
        let flag = self.expanded.entry(service_id.to_string()).or_insert(false);
        *flag = !*flag;
    }

    /// Expand every group currently displayed.
    pub fn expand_all(&mut self) {
        for flag in self.expanded.values_mut() {
            *flag = true;
        }
    }

    fn filters_changed(&mut self) -> ReportRequest {
        self.page_number = 1;
        self.issue()
    }

    fn issue(&mut self) -> ReportRequest {
        self.refetch = None;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_seq = Some(seq);
        self.loading = true;

        ReportRequest {
            seq,
            filter: AnalyzeFilter {
                monitored_service_id: self.filters.service_id.clone(),
                from: self.filters.from,
                to: self.filters.to,
                page_number: self.page_number,
                page_size: REPORT_PAGE_SIZE,
            },
        }
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.latest_seq == Some(seq)
    }
}

/// `ceil(total / page_size)`, never below 1. Without a total there is one page.
pub fn total_pages(total_count: Option<u64>, page_size: u32) -> u32 {
    match total_count {
        Some(total) if page_size > 0 => {
            let pages = total.div_ceil(u64::from(page_size));
            u32::try_from(pages).unwrap_or(u32::MAX).max(1)
        }
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    fn group(id: &str) -> ServiceUptimeGroup {
        ServiceUptimeGroup {
            monitored_service_id: id.to_string(),
            monitored_service_name: format!("service {}", id),
            items: vec![],
            items_count: 10,
            is_under_sla_items_count: 9,
            is_upper_than_sla_items_count: 1,
            uptime_percentage: 90.0,
        }
    }

    fn response(ids: &[&str], total: Option<u64>) -> AnalyzeResponse {
        AnalyzeResponse {
            items: ids.iter().map(|id| group(id)).collect(),
            total_count: total,
        }
    }

    /// A view that has already received a result with `total` checks.
    fn loaded(total: u64) -> ReportView {
        let mut view = ReportView::new();
        let req = view.mount();
        assert!(view.fetch_succeeded(req.seq, response(&["a", "b"], Some(total))));
        view
    }

    #[test]
    fn test_initial_state() {
        let view = ReportView::new();

        assert_eq!(view.page_number(), 1);
        assert_eq!(view.total_pages(), 1);
        assert!(view.data().is_empty());
        assert!(!view.is_loading());
        assert!(!view.can_prev());
        assert!(!view.can_next());
    }

    #[test]
    fn test_mount_requests_first_page() {
        let mut view = ReportView::new();

        let req = view.mount();

        assert!(view.is_loading());
        assert_eq!(req.filter, AnalyzeFilter::default());
    }

    #[test]
    fn test_total_pages_formula() {
        assert_eq!(total_pages(Some(0), 1000), 1);
        assert_eq!(total_pages(Some(1), 1000), 1);
        assert_eq!(total_pages(Some(1000), 1000), 1);
        assert_eq!(total_pages(Some(1001), 1000), 2);
        assert_eq!(total_pages(Some(2500), 1000), 3);
        assert_eq!(total_pages(None, 1000), 1);
    }

    #[test]
    fn test_next_three_times_over_three_pages() {
        let mut view = loaded(2500);
        assert_eq!(view.total_pages(), 3);
        assert!(!view.can_prev());
        assert!(view.can_next());

        let first = view.next_page().unwrap();
        assert_eq!(first.filter.page_number, 2);
        view.fetch_succeeded(first.seq, response(&["a"], Some(2500)));

        let second = view.next_page().unwrap();
        assert_eq!(second.filter.page_number, 3);
        view.fetch_succeeded(second.seq, response(&["a"], Some(2500)));

        assert!(!view.can_next());
        assert!(view.next_page().is_none());
        assert_eq!(view.page_number(), 3);
    }

    #[test]
    fn test_prev_disabled_on_first_page() {
        let mut view = loaded(2500);
        assert!(view.prev_page().is_none());
        assert_eq!(view.page_number(), 1);

        let next = view.next_page().unwrap();
        view.fetch_succeeded(next.seq, response(&[], Some(2500)));

        let prev = view.prev_page().unwrap();
        assert_eq!(prev.filter.page_number, 1);
    }

    #[test]
    fn test_every_filter_change_resets_page() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let mut view = loaded(5000);
        let next = view.next_page().unwrap();
        view.fetch_succeeded(next.seq, response(&[], Some(5000)));
        assert_eq!(view.page_number(), 2);

        let req = view.set_service(Some("svc-1".to_string())).unwrap();
        assert_eq!(req.filter.page_number, 1);
        assert_eq!(req.filter.monitored_service_id.as_deref(), Some("svc-1"));
        view.fetch_succeeded(req.seq, response(&[], Some(5000)));

        view.next_page().unwrap();
        let req = view.set_from(Some(from)).unwrap();
        assert_eq!(req.filter.page_number, 1);
        assert_eq!(req.filter.from, Some(from));

        view.fetch_succeeded(req.seq, response(&[], Some(5000)));
        view.next_page().unwrap();
        let req = view.set_to(Some(to)).unwrap();
        assert_eq!(req.filter.page_number, 1);
        assert_eq!(req.filter.to, Some(to));
    }

    #[test]
    fn test_unchanged_filter_issues_nothing() {
        let mut view = loaded(10);

        assert!(view.set_service(None).is_none());
        assert!(view.set_from(None).is_none());
        assert!(view.set_to(None).is_none());
        assert!(!view.is_loading());
    }

    #[test]
    fn test_success_collapses_all_groups() {
        let mut view = loaded(10);
        view.toggle_group("a");
        assert!(view.is_expanded("a"));

        let req = view.analyze();
        view.fetch_succeeded(req.seq, response(&["a", "c"], Some(10)));

        assert!(!view.is_expanded("a"));
        assert!(!view.is_expanded("c"));
    }

    #[test]
    fn test_toggle_leaves_data_and_pagination_alone() {
        let mut view = loaded(2500);
        let data_before = view.data().to_vec();

        view.toggle_group("b");
        assert!(view.is_expanded("b"));
        assert!(!view.is_expanded("a"));
        view.toggle_group("b");
        assert!(!view.is_expanded("b"));

        assert_eq!(view.data(), data_before.as_slice());
        assert_eq!(view.page_number(), 1);
        assert_eq!(view.total_pages(), 3);
        assert!(!view.is_loading());
    }

    #[test]
    fn test_failure_keeps_previous_data() {
        let mut view = loaded(2500);

        let req = view.analyze();
        let err = CliError::http(StatusCode::BAD_GATEWAY, "upstream");
        assert!(view.fetch_failed(req.seq, &err));

        assert!(!view.is_loading());
        assert_eq!(view.data().len(), 2);
        assert_eq!(view.total_pages(), 3);
    }

    #[test]
    fn test_missing_total_count_means_single_page() {
        let mut view = loaded(2500);

        let req = view.analyze();
        view.fetch_succeeded(req.seq, response(&["a"], None));

        assert_eq!(view.total_pages(), 1);
        assert!(!view.can_next());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut view = ReportView::new();
        let old = view.mount();
        let new = view.set_service(Some("svc-2".to_string())).unwrap();

        assert!(view.fetch_succeeded(new.seq, response(&["svc-2"], Some(1))));
        assert!(!view.fetch_succeeded(old.seq, response(&["x", "y", "z"], Some(9000))));

        assert_eq!(view.data().len(), 1);
        assert_eq!(view.data()[0].monitored_service_id, "svc-2");
        assert_eq!(view.total_pages(), 1);
    }

    #[test]
    fn test_stale_completion_does_not_clear_loading() {
        let mut view = ReportView::new();
        let old = view.mount();
        let _new = view.analyze();

        view.fetch_succeeded(old.seq, response(&[], Some(0)));
        assert!(view.is_loading());

        let err = CliError::Other("late".to_string());
        assert!(!view.fetch_failed(old.seq, &err));
        assert!(view.is_loading());
    }

    #[test]
    fn test_page_clamped_when_total_shrinks() {
        let mut view = ReportView::with_filters(ReportFilters::default(), 5);
        let req = view.mount();
        assert_eq!(req.filter.page_number, 5);

        view.fetch_succeeded(req.seq, response(&[], Some(1500)));

        assert_eq!(view.page_number(), 2);
        assert!(!view.can_next());
        assert!(view.is_loading());

        let refetch = view.take_refetch().unwrap();
        assert_eq!(refetch.filter.page_number, 2);
        assert!(refetch.seq > req.seq);
        assert!(view.take_refetch().is_none());

        assert!(view.fetch_succeeded(refetch.seq, response(&["a"], Some(1500))));
        assert_eq!(view.page_number(), 2);
        assert_eq!(view.data().len(), 1);
        assert!(!view.is_loading());
        assert!(view.take_refetch().is_none());
    }

    #[test]
    fn test_in_range_page_queues_no_refetch() {
        let mut view = ReportView::with_filters(ReportFilters::default(), 2);
        let req = view.mount();

        view.fetch_succeeded(req.seq, response(&["a"], Some(2500)));

        assert_eq!(view.page_number(), 2);
        assert!(view.take_refetch().is_none());
    }

    #[test]
    fn test_newer_request_supersedes_queued_refetch() {
        let mut view = ReportView::with_filters(ReportFilters::default(), 5);
        let req = view.mount();
        view.fetch_succeeded(req.seq, response(&[], Some(1500)));

        let newer = view.set_service(Some("svc-1".to_string())).unwrap();

        assert!(view.take_refetch().is_none());
        assert_eq!(newer.filter.page_number, 1);
    }

    #[test]
    fn test_page_hint_clamped_when_first_fetch_fails() {
        let mut view = ReportView::with_filters(ReportFilters::default(), 5);
        let req = view.mount();
        assert_eq!(req.filter.page_number, 5);

        let err = CliError::http(StatusCode::SERVICE_UNAVAILABLE, "down");
        assert!(view.fetch_failed(req.seq, &err));

        assert_eq!(view.page_number(), 1);
        assert_eq!(view.total_pages(), 1);
        assert!(!view.can_prev());
        assert!(!view.can_next());
        assert!(view.next_page().is_none());
        assert!(view.prev_page().is_none());
    }

    #[test]
    fn test_expand_all() {
        let mut view = loaded(10);
        view.expand_all();
        assert!(view.is_expanded("a"));
        assert!(view.is_expanded("b"));
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut view = ReportView::new();
        let a = view.mount();
        let b = view.analyze();
        let c = view.set_service(Some("x".to_string())).unwrap();
        assert!(a.seq < b.seq && b.seq < c.seq);
    }
}
