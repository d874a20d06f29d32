//! `uptimex report`: uptime and SLA analysis.

use crate::cli::ReportArgs;
use crate::client::ApiClient;
use crate::config::Context;
use crate::error::CliError;
use crate::models::{AnalyzeResponse, ServiceUptimeGroup};
use crate::output::{OutputConfig, print_rendered};
use crate::render::{loading_spinner, render_report};
use crate::views::report::{ReportFilters, ReportRequest, ReportView, ServiceOption};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::{Input, Select};
use serde::Serialize;
use tokio::task::JoinSet;

use super::require_tty;

type FetchResult = (u64, Result<AnalyzeResponse, CliError>);

/// Drives a [`ReportView`] against the API.
///
/// Fetches run as tasks so several may be in flight at once; the view keeps
/// only the newest. Dropping the session aborts whatever is still running.
pub struct ReportSession {
    client: ApiClient,
    view: ReportView,
    in_flight: JoinSet<FetchResult>,
}

impl ReportSession {
    pub fn new(client: ApiClient, view: ReportView) -> Self {
        Self {
            client,
            view,
            in_flight: JoinSet::new(),
        }
    }

    pub fn view(&self) -> &ReportView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ReportView {
        &mut self.view
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start the fetch for `request` without waiting for it.
    pub fn dispatch(&mut self, request: ReportRequest) {
        let client = self.client.clone();
        tracing::debug!(seq = request.seq, page = request.filter.page_number, "dispatching report fetch");
        self.in_flight.spawn(async move {
            let result = client.analyze_uptime(&request.filter).await;
            (request.seq, result)
        });
    }

    /// Wait for every outstanding fetch and feed the results to the view.
    ///
    /// A response that pushed the page out of range is followed up with a
    /// fetch for the clamped page before this returns. Returns the error of
    /// the newest request if that one failed. Failures of superseded
    /// requests are dropped.
    pub async fn settle(&mut self) -> Result<(), CliError> {
        let mut latest_error = None;
        loop {
            while let Some(joined) = self.in_flight.join_next().await {
                match joined {
                    Ok((seq, Ok(response))) => {
                        if self.view.fetch_succeeded(seq, response) {
                            latest_error = None;
                        }
                    }
                    Ok((seq, Err(e))) => {
                        if self.view.fetch_failed(seq, &e) {
                            latest_error = Some(e);
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "report fetch task failed"),
                }
            }
            match self.view.take_refetch() {
                Some(request) => self.dispatch(request),
                None => break,
            }
        }
        latest_error.map_or(Ok(()), Err)
    }

    /// Fill the service selector. A failure leaves it empty.
    pub async fn load_service_options(&mut self) {
        match self.client.list_services().await {
            Ok(services) => self.view.set_service_options(
                services
                    .into_iter()
                    .map(|s| ServiceOption {
                        id: s.id,
                        name: s.name,
                    })
                    .collect(),
            ),
            Err(e) => tracing::warn!(error = %e, "failed to load services for the selector"),
        }
    }
}

/// Machine-readable report for `--format json|yaml`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportOutput<'a> {
    page_number: u32,
    total_pages: u32,
    items: &'a [ServiceUptimeGroup],
}

impl<'a> From<&'a ReportView> for ReportOutput<'a> {
    fn from(view: &'a ReportView) -> Self {
        Self {
            page_number: view.page_number(),
            total_pages: view.total_pages(),
            items: view.data(),
        }
    }
}

/// Handle the report command
pub async fn handle(ctx: &Context, args: ReportArgs) -> Result<()> {
    let client = ApiClient::new(ctx)?;
    let config = OutputConfig::from_context(ctx);

    let filters = ReportFilters {
        service_id: args.service.clone().filter(|s| !s.is_empty()),
        from: args.from.as_deref().map(parse_date).transpose()?,
        to: args.to.as_deref().map(parse_date).transpose()?,
    };
    let mut session = ReportSession::new(client, ReportView::with_filters(filters, args.page));

    if args.interactive {
        return interactive(&mut session, &config).await;
    }

    let request = session.view_mut().mount();
    session.dispatch(request);
    with_spinner(&mut session).await?;

    if args.expand_all {
        session.view_mut().expand_all();
    } else {
        for id in &args.expand {
            session.view_mut().toggle_group(id);
        }
    }

    let view = session.view();
    print_rendered(&config, &render_report(view, &config), &ReportOutput::from(view))
}

async fn with_spinner(session: &mut ReportSession) -> Result<(), CliError> {
    let spinner = atty::is(atty::Stream::Stderr).then(|| loading_spinner("Loading uptime data..."));
    let result = session.settle().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result
}

async fn interactive(session: &mut ReportSession, config: &OutputConfig) -> Result<()> {
    require_tty("report --interactive")?;

    session.load_service_options().await;
    let request = session.view_mut().mount();
    session.dispatch(request);
    // Failures are already logged by the view; keep the previous page.
    let _ = with_spinner(session).await;

    loop {
        println!();
        print_filters(session.view());
        println!("{}", render_report(session.view(), config));

        let mut actions: Vec<(&str, Action)> = Vec::new();
        if session.view().can_prev() {
            actions.push(("Prev", Action::Prev));
        }
        if session.view().can_next() {
            actions.push(("Next", Action::Next));
        }
        actions.push(("Analyze", Action::Analyze));
        actions.push(("Service...", Action::Service));
        actions.push(("From date...", Action::From));
        actions.push(("To date...", Action::To));
        if !session.view().data().is_empty() {
            actions.push(("Show/Hide details...", Action::Toggle));
        }
        actions.push(("Quit", Action::Quit));

        let labels: Vec<&str> = actions.iter().map(|(label, _)| *label).collect();
        let Some(choice) = Select::new()
            .with_prompt("Uptime Report")
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };

        let request = match actions[choice].1 {
            Action::Prev => session.view_mut().prev_page(),
            Action::Next => session.view_mut().next_page(),
            Action::Analyze => Some(session.view_mut().analyze()),
            Action::Service => {
                let selected = pick_service(session.view())?;
                match selected {
                    Some(service_id) => session.view_mut().set_service(service_id),
                    None => None,
                }
            }
            Action::From => {
                let current = session.view().filters().from;
                let date = prompt_date("From (YYYY-MM-DD, blank to clear)", current)?;
                session.view_mut().set_from(date)
            }
            Action::To => {
                let current = session.view().filters().to;
                let date = prompt_date("To (YYYY-MM-DD, blank to clear)", current)?;
                session.view_mut().set_to(date)
            }
            Action::Toggle => {
                if let Some(id) = pick_group(session.view())? {
                    session.view_mut().toggle_group(&id);
                }
                None
            }
            Action::Quit => return Ok(()),
        };

        if let Some(request) = request {
            session.dispatch(request);
            let _ = with_spinner(session).await;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Prev,
    Next,
    Analyze,
    Service,
    From,
    To,
    Toggle,
    Quit,
}

fn print_filters(view: &ReportView) {
    let filters = view.filters();
    let service = filters
        .service_id
        .as_deref()
        .map(|id| {
            view.service_options()
                .iter()
                .find(|o| o.id == id)
                .map_or(id, |o| o.name.as_str())
        })
        .unwrap_or("All Services");
    let date = |d: Option<DateTime<Utc>>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    println!(
        "Service: {}   From: {}   To: {}",
        service,
        date(filters.from),
        date(filters.to)
    );
}

/// Outer `None` means the prompt was dismissed; inner `None` is "All Services".
fn pick_service(view: &ReportView) -> Result<Option<Option<String>>> {
    let mut labels = vec!["All Services".to_string()];
    labels.extend(view.service_options().iter().map(|o| o.name.clone()));

    let current = view
        .filters()
        .service_id
        .as_deref()
        .and_then(|id| view.service_options().iter().position(|o| o.id == id))
        .map_or(0, |i| i + 1);

    let choice = Select::new()
        .with_prompt("Service")
        .items(&labels)
        .default(current)
        .interact_opt()?;

    Ok(choice.map(|i| match i {
        0 => None,
        n => Some(view.service_options()[n - 1].id.clone()),
    }))
}

fn pick_group(view: &ReportView) -> Result<Option<String>> {
    let labels: Vec<&str> = view
        .data()
        .iter()
        .map(|g| g.monitored_service_name.as_str())
        .collect();
    let choice = Select::new()
        .with_prompt("Toggle details for")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(choice.map(|i| view.data()[i].monitored_service_id.clone()))
}

fn prompt_date(prompt: &str, current: Option<DateTime<Utc>>) -> Result<Option<DateTime<Utc>>> {
    let initial = current
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let value: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() {
                return Ok(());
            }
            parse_date(input.trim()).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let value = value.trim();
    if value.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parse_date(value)?))
    }
}

/// Parse `YYYY-MM-DD` (start of that day, UTC) or a full RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, CliError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CliError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_plain_date_is_utc_midnight() {
        let dt = parse_date("2024-01-15").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_date("2024-01-15T10:30:00+01:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_invalid_date() {
        let err = parse_date("15/01/2024").unwrap_err();
        assert!(matches!(err, CliError::InvalidDate(ref v) if v == "15/01/2024"));
    }

    #[test]
    fn test_report_output_is_camel_case() {
        let view = ReportView::new();
        let json = serde_json::to_value(ReportOutput::from(&view)).unwrap();

        assert_eq!(json["pageNumber"], 1);
        assert_eq!(json["totalPages"], 1);
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
