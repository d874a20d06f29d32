//! Text rendering for services and uptime reports.
//!
//! Rendering returns strings; only [`loading_spinner`] draws to the terminal.

use crate::models::{MonitoredService, ServiceUptimeGroup, UptimeCheck};
use crate::output::{
    OutputConfig, format_api_timestamp, format_relative_time, format_timestamp, parse_api_timestamp,
};
use crate::views::report::ReportView;
use chrono::Utc;
use console::{StyledObject, style};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;
use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const CARD_WIDTH: usize = 72;

// ============================================================================
// Services
// ============================================================================

/// Status badge driven by the last check result.
pub fn service_badge(last_check_succeeded: bool, plain: bool) -> &'static str {
    match (last_check_succeeded, plain) {
        (true, false) => "✅ Up",
        (false, false) => "❌ Down",
        (true, true) => "[UP]",
        (false, true) => "[DOWN]",
    }
}

fn paint<'a>(
    text: &'a str,
    config: &OutputConfig,
    f: impl FnOnce(StyledObject<&'a str>) -> StyledObject<&'a str>,
) -> String {
    if config.no_color {
        text.to_string()
    } else {
        f(style(text)).to_string()
    }
}

pub fn render_service_card(service: &MonitoredService, config: &OutputConfig) -> String {
    let mut out = String::new();
    let badge = service_badge(service.last_check_succeeded, config.plain);
    let badge = if service.last_check_succeeded {
        paint(badge, config, |s| s.green())
    } else {
        paint(badge, config, |s| s.red())
    };

    let _ = writeln!(
        out,
        "{}  {}",
        paint(&service.name, config, |s| s.bold().cyan()),
        badge
    );
    let _ = writeln!(out, "{}", service.url);

    if let Some(description) = service.description.as_deref().filter(|d| !d.is_empty()) {
        for line in textwrap::wrap(description, CARD_WIDTH) {
            let _ = writeln!(out, "{}", paint(&line, config, |s| s.italic().dim()));
        }
    }

    let mut meta = Vec::new();
    if let Some(team) = service.owner_team.as_deref().filter(|t| !t.is_empty()) {
        meta.push(labelled(config.plain, "👥", "Team:", team));
    }
    if let Some(ms) = service.last_response_time_ms {
        meta.push(labelled(config.plain, "⚡", "Response:", &format!("{} ms", ms)));
    }
    if let Some(at) = service.last_checked_at.as_deref() {
        let shown = match parse_api_timestamp(at) {
            Some(dt) => format!(
                "{} ({})",
                format_timestamp(dt, config.tz),
                format_relative_time(dt, Utc::now())
            ),
            None => at.to_string(),
        };
        meta.push(labelled(config.plain, "🕒", "Last Checked:", &shown));
    }
    if !service.tags().is_empty() {
        meta.push(labelled(config.plain, "🏷️", "Tags:", &service.tags().join(", ")));
    }
    if !meta.is_empty() {
        let _ = writeln!(out, "{}", meta.join("  "));
    }

    let id_line = format!("id: {}", service.id);
    let _ = write!(out, "{}", paint(&id_line, config, |s| s.dim()));
    out
}

fn labelled(plain: bool, icon: &str, label: &str, value: &str) -> String {
    if plain {
        format!("{} {}", label, value)
    } else {
        format!("{} {}", icon, value)
    }
}

#[derive(Debug, Tabled)]
pub struct ServiceRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "STATUS")]
    pub status: String,
    #[tabled(rename = "URL")]
    pub url: String,
    #[tabled(rename = "OWNER")]
    pub owner: String,
    #[tabled(rename = "RESPONSE")]
    pub response: String,
    #[tabled(rename = "LAST CHECKED")]
    pub last_checked: String,
    #[tabled(rename = "TAGS")]
    pub tags: String,
}

impl ServiceRow {
    pub fn new(service: &MonitoredService, config: &OutputConfig) -> Self {
        Self {
            id: service.id.clone(),
            name: service.name.clone(),
            status: service_badge(service.last_check_succeeded, config.plain).to_string(),
            url: service.url.clone(),
            owner: service.owner_team.clone().unwrap_or_else(|| "-".to_string()),
            response: service
                .last_response_time_ms
                .map(|ms| format!("{} ms", ms))
                .unwrap_or_else(|| "-".to_string()),
            last_checked: service
                .last_checked_at
                .as_deref()
                .map(|at| format_api_timestamp(at, config.tz))
                .unwrap_or_else(|| "never".to_string()),
            tags: service.tags().join(", "),
        }
    }
}

// ============================================================================
// Uptime report
// ============================================================================

#[derive(Debug, Tabled)]
pub struct CheckRow {
    #[tabled(rename = "TIME")]
    pub time: String,
    #[tabled(rename = "HEALTH")]
    pub health: String,
    #[tabled(rename = "SLA")]
    pub sla: String,
    #[tabled(rename = "HTTP")]
    pub http_status: String,
    #[tabled(rename = "RESPONSE")]
    pub response: String,
    #[tabled(rename = "ERROR")]
    pub error: String,
}

impl CheckRow {
    pub fn new(check: &UptimeCheck, config: &OutputConfig) -> Self {
        let health = match (check.is_healthy, config.plain) {
            (true, false) => "🟢 Healthy",
            (false, false) => "🔴 Down",
            (true, true) => "healthy",
            (false, true) => "down",
        };
        let sla = match (check.is_under_sla, config.plain) {
            (true, false) => "✔️ OK",
            (false, false) => "⚠️ Over Limit",
            (true, true) => "ok",
            (false, true) => "over limit",
        };
        Self {
            time: format_api_timestamp(&check.at, config.tz),
            health: health.to_string(),
            sla: sla.to_string(),
            http_status: check
                .http_status_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "-".to_string()),
            response: format!("{} ms", check.response_time_ms),
            error: check.error_message.clone().unwrap_or_default(),
        }
    }
}

/// One service block: name, counters, and the checks when expanded.
pub fn render_group(group: &ServiceUptimeGroup, expanded: bool, config: &OutputConfig) -> String {
    let mut out = String::new();
    let title = if config.plain {
        group.monitored_service_name.clone()
    } else {
        format!("🧪 {}", group.monitored_service_name)
    };
    let toggle = if expanded { "Hide Details" } else { "Show Details" };
    let toggle_label = format!("[{}]", toggle);

    let _ = writeln!(
        out,
        "{}  {}",
        paint(&title, config, |s| s.bold()),
        paint(&toggle_label, config, |s| s.dim())
    );
    let _ = writeln!(
        out,
        "  Total Checks: {}   SLA Passed: {}   Over SLA Time: {}   Uptime: {}%",
        group.items_count,
        group.is_under_sla_items_count,
        group.is_upper_than_sla_items_count,
        group.uptime_percentage
    );

    if expanded {
        if group.items.is_empty() {
            let _ = writeln!(out, "  (no checks in this window)");
        } else {
            let rows: Vec<CheckRow> = group
                .items
                .iter()
                .map(|c| CheckRow::new(c, config))
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            let _ = writeln!(out, "{}", table);
        }
    }
    out
}

/// Footer with Prev/Next, disabled buttons shown in brackets-with-dashes.
pub fn render_pagination(view: &ReportView) -> String {
    let prev = if view.can_prev() { "[Prev]" } else { "[----]" };
    let next = if view.can_next() { "[Next]" } else { "[----]" };
    format!(
        "{}  Page {} of {}  {}",
        prev,
        view.page_number(),
        view.total_pages(),
        next
    )
}

pub fn render_report(view: &ReportView, config: &OutputConfig) -> String {
    let mut out = String::new();
    if view.data().is_empty() {
        let _ = writeln!(out, "{}", paint("No data to display.", config, |s| s.dim()));
    }
    for group in view.data() {
        let _ = writeln!(
            out,
            "{}",
            render_group(group, view.is_expanded(&group.monitored_service_id), config)
        );
    }
    let _ = write!(out, "{}", render_pagination(view));
    out
}

// ============================================================================
// Loading indicator
// ============================================================================

/// Spinner shown while a request is in flight.
pub fn loading_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayTz;
    use crate::models::AnalyzeResponse;

    fn plain_config() -> OutputConfig {
        OutputConfig {
            no_color: true,
            tz: DisplayTz::Utc,
            ..OutputConfig::default()
        }
    }

    fn service() -> MonitoredService {
        serde_json::from_value(serde_json::json!({
            "id": "svc-1",
            "name": "Payments API",
            "url": "https://pay.example.com"
        }))
        .unwrap()
    }

    #[test]
    fn test_card_shows_down_badge_when_never_checked() {
        let card = render_service_card(&service(), &plain_config());

        let first_line = card.lines().next().unwrap();
        assert!(first_line.starts_with("Payments API"));
        assert!(first_line.contains("❌ Down"));
        assert!(card.contains("https://pay.example.com"));
    }

    #[test]
    fn test_card_meta_line() {
        let mut svc = service();
        svc.last_check_succeeded = true;
        svc.owner_team = Some("Payments".to_string());
        svc.last_response_time_ms = Some(87.0);
        svc.last_checked_at = Some("2024-01-15T08:00:00Z".to_string());
        svc.tags = Some(vec!["prod".to_string(), "pci".to_string()]);

        let card = render_service_card(&svc, &plain_config());

        assert!(card.contains("✅ Up"));
        assert!(card.contains("👥 Payments"));
        assert!(card.contains("⚡ 87 ms"));
        assert!(card.contains("2024-01-15 08:00:00 UTC"));
        assert!(card.contains("prod, pci"));
    }

    #[test]
    fn test_check_row_without_status_code() {
        let check: UptimeCheck = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "isHealthy": false,
            "responseTimeMs": 12.5,
            "isUnderSla": true,
            "httpStatusCode": null,
            "at": "2024-01-15T08:00:00Z"
        }))
        .unwrap();

        let row = CheckRow::new(&check, &plain_config());

        assert_eq!(row.http_status, "-");
        assert_eq!(row.response, "12.5 ms");
        assert_eq!(row.health, "🔴 Down");
    }

    #[test]
    fn test_plain_badges() {
        assert_eq!(service_badge(true, true), "[UP]");
        assert_eq!(service_badge(false, true), "[DOWN]");
    }

    #[test]
    fn test_group_hides_checks_until_expanded() {
        let group: ServiceUptimeGroup = serde_json::from_value(serde_json::json!({
            "monitoredServiceId": "svc-1",
            "monitoredServiceName": "Payments API",
            "items": [{
                "id": "c1",
                "isHealthy": false,
                "responseTimeMs": 5000,
                "isUnderSla": false,
                "httpStatusCode": 503,
                "errorMessage": "upstream timeout",
                "at": "2024-01-15T08:00:00Z"
            }],
            "itemsCount": 1,
            "isUnderSlaItemsCount": 0,
            "isUpperThanSlaItemsCount": 1,
            "uptimePercentage": 0.0
        }))
        .unwrap();
        let config = plain_config();

        let collapsed = render_group(&group, false, &config);
        assert!(collapsed.contains("Show Details"));
        assert!(collapsed.contains("Total Checks: 1"));
        assert!(!collapsed.contains("upstream timeout"));

        let expanded = render_group(&group, true, &config);
        assert!(expanded.contains("Hide Details"));
        assert!(expanded.contains("upstream timeout"));
        assert!(expanded.contains("503"));
    }

    #[test]
    fn test_pagination_footer() {
        let mut view = ReportView::new();
        let req = view.mount();
        view.fetch_succeeded(
            req.seq,
            AnalyzeResponse {
                items: vec![],
                total_count: Some(2500),
            },
        );

        assert_eq!(render_pagination(&view), "[----]  Page 1 of 3  [Next]");

        let report = render_report(&view, &plain_config());
        assert!(report.starts_with("No data to display."));
    }
}
