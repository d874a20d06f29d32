//! `uptimex services ...`: the service catalog.

use crate::cli::{ServiceCommands, ServiceFields};
use crate::client::ApiClient;
use crate::config::Context;
use crate::error::CliError;
use crate::models::MonitoredService;
use crate::output::{
    OutputConfig, print_error, print_info, print_output, print_rendered, print_success,
    print_warning,
};
use crate::render::{ServiceRow, loading_spinner, render_service_card};
use crate::views::catalog::{CatalogView, FormMode};
use crate::views::form::{Field, ServiceDraft};
use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use std::time::Instant;

use super::require_tty;

/// Handle services subcommands
pub async fn handle(ctx: &Context, command: ServiceCommands) -> Result<()> {
    let client = ApiClient::new(ctx)?;
    let config = OutputConfig::from_context(ctx);
    tracing::debug!(api_url = client.base_url(), "services command");

    match command {
        ServiceCommands::List => list(&client, &config).await,
        ServiceCommands::Cards => cards(&client, &config).await,
        ServiceCommands::Show { id } => show(&client, &config, &id).await,
        ServiceCommands::Create {
            fields,
            interactive,
        } => create(&client, &config, &fields, interactive).await,
        ServiceCommands::Edit {
            id,
            fields,
            interactive,
        } => edit(&client, &config, &id, &fields, interactive).await,
        ServiceCommands::Delete { id, yes } => delete(&client, &config, &id, yes).await,
        ServiceCommands::Browse => browse(&client, &config).await,
    }
}

// ============================================================================
// One-shot commands
// ============================================================================

async fn fetch_all(client: &ApiClient) -> Result<Vec<MonitoredService>, CliError> {
    let spinner = atty::is(atty::Stream::Stderr).then(|| loading_spinner("Loading UptimeX..."));
    let result = client.list_services().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result
}

async fn list(client: &ApiClient, config: &OutputConfig) -> Result<()> {
    let services = fetch_all(client).await?;
    let rows: Vec<ServiceRow> = services
        .iter()
        .map(|s| ServiceRow::new(s, config))
        .collect();
    print_output(config, rows, &services)
}

async fn cards(client: &ApiClient, config: &OutputConfig) -> Result<()> {
    let services = fetch_all(client).await?;
    print_rendered(config, &render_cards(&services, config), &services)
}

async fn show(client: &ApiClient, config: &OutputConfig, id: &str) -> Result<()> {
    let service = client.get_service(id).await?;
    print_rendered(config, &render_service_card(&service, config), &service)
}

async fn create(
    client: &ApiClient,
    config: &OutputConfig,
    fields: &ServiceFields,
    interactive: bool,
) -> Result<()> {
    let mut view = CatalogView::new();
    view.open_create();

    let missing_required = fields.name.is_none() || fields.url.is_none();
    let prompt = interactive || (missing_required && atty::is(atty::Stream::Stdin));
    if let Some(form) = view.form_mut() {
        apply_fields(&mut form.draft, fields);
        if prompt {
            prompt_draft(&mut form.draft)?;
        }
    }

    let service = submit_once(client, &mut view).await?;
    print_flash(&view, config);
    print_rendered(config, &render_service_card(&service, config), &service)
}

async fn edit(
    client: &ApiClient,
    config: &OutputConfig,
    id: &str,
    fields: &ServiceFields,
    interactive: bool,
) -> Result<()> {
    let current = client.get_service(id).await?;

    let mut view = CatalogView::new();
    view.open_edit(&current);
    if let Some(form) = view.form_mut() {
        apply_fields(&mut form.draft, fields);
        if interactive {
            prompt_draft(&mut form.draft)?;
        }
    }

    let service = submit_once(client, &mut view).await?;
    print_flash(&view, config);
    print_rendered(config, &render_service_card(&service, config), &service)
}

async fn delete(client: &ApiClient, config: &OutputConfig, id: &str, yes: bool) -> Result<()> {
    let service = client.get_service(id).await?;

    if !yes && !confirm_delete(&service)? {
        print_warning("Cancelled", config);
        return Ok(());
    }

    client.delete_service(id).await?;
    print_success(&format!("Deleted service: {}", service.name), config);
    Ok(())
}

/// Validate and send the open form once; errors propagate to the caller.
async fn submit_once(client: &ApiClient, view: &mut CatalogView) -> Result<MonitoredService> {
    let Some(submission) = view.submit() else {
        let errors = view
            .form()
            .map(|f| f.errors.clone())
            .unwrap_or_default();
        return Err(CliError::Validation(errors).into());
    };

    let result = match &submission.mode {
        FormMode::Create => client.create_service(&submission.input).await,
        FormMode::Edit { id } => client.update_service(id, &submission.input).await,
    };

    match result {
        Ok(service) => {
            view.submit_succeeded(&submission.mode, Instant::now());
            Ok(service)
        }
        Err(e) => {
            view.submit_failed(&e);
            Err(e.into())
        }
    }
}

// ============================================================================
// Interactive catalog
// ============================================================================

async fn browse(client: &ApiClient, config: &OutputConfig) -> Result<()> {
    require_tty("services browse")?;

    let mut view = CatalogView::new();
    reload(client, &mut view).await;

    loop {
        println!();
        print_flash(&view, config);
        if view.services().is_empty() {
            print_info("No services yet", config);
        } else {
            println!("{}", render_cards(view.services(), config));
        }

        let actions = ["Reload", "Add Service", "Edit", "Delete", "Quit"];
        let choice = Select::new()
            .with_prompt("Monitored Services")
            .items(&actions)
            .default(0)
            .interact()?;

        match choice {
            0 => reload(client, &mut view).await,
            1 => {
                view.open_create();
                if run_form(client, &mut view, config).await? {
                    reload(client, &mut view).await;
                }
            }
            2 => {
                let Some(id) = pick_service(&view, "Edit which service?")? else {
                    continue;
                };
                match client.get_service(&id).await {
                    Ok(service) => {
                        view.open_edit(&service);
                        if run_form(client, &mut view, config).await? {
                            reload(client, &mut view).await;
                        }
                    }
                    Err(e) => view.edit_fetch_failed(&id, &e),
                }
            }
            3 => {
                let Some(id) = pick_service(&view, "Delete which service?")? else {
                    continue;
                };
                let Some(service) = view.find(&id).cloned() else {
                    continue;
                };
                if confirm_delete(&service)? {
                    match client.delete_service(&id).await {
                        Ok(()) => view.delete_succeeded(&id),
                        Err(e) => view.delete_failed(&id, &e),
                    }
                }
            }
            _ => return Ok(()),
        }
    }
}

async fn reload(client: &ApiClient, view: &mut CatalogView) {
    view.begin_load();
    match fetch_all(client).await {
        Ok(services) => view.load_succeeded(services),
        Err(e) => view.load_failed(&e),
    }
}

/// Prompt until the form validates and is sent, or the user gives up.
///
/// Returns true when the server accepted the submission.
async fn run_form(client: &ApiClient, view: &mut CatalogView, config: &OutputConfig) -> Result<bool> {
    loop {
        let Some(form) = view.form_mut() else {
            return Ok(false);
        };
        let title = match form.mode {
            FormMode::Create => "New Service",
            FormMode::Edit { .. } => "Edit Service",
        };
        println!("\n{}", title);
        prompt_draft(&mut form.draft)?;

        match view.submit() {
            Some(submission) => {
                let result = match &submission.mode {
                    FormMode::Create => client.create_service(&submission.input).await,
                    FormMode::Edit { id } => client.update_service(id, &submission.input).await,
                };
                match result {
                    Ok(_) => {
                        view.submit_succeeded(&submission.mode, Instant::now());
                        return Ok(true);
                    }
                    Err(e) => view.submit_failed(&e),
                }
            }
            None => {
                if let Some(form) = view.form() {
                    for field in [Field::Name, Field::Url] {
                        if let Some(message) = form.errors.get(field) {
                            print_error(message, config);
                        }
                    }
                }
            }
        }

        let retry = Confirm::new()
            .with_prompt("Try again?")
            .default(true)
            .interact()?;
        if !retry {
            view.cancel_form();
            return Ok(false);
        }
    }
}

fn pick_service(view: &CatalogView, prompt: &str) -> Result<Option<String>> {
    if view.services().is_empty() {
        return Ok(None);
    }
    let labels: Vec<String> = view
        .services()
        .iter()
        .map(|s| format!("{} ({})", s.name, s.url))
        .collect();
    let choice = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(choice.map(|i| view.services()[i].id.clone()))
}

fn confirm_delete(service: &MonitoredService) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Are you sure you want to delete \"{}\"?",
            service.name
        ))
        .default(false)
        .interact()?;
    Ok(confirmed)
}

// ============================================================================
// Helpers
// ============================================================================

fn print_flash(view: &CatalogView, config: &OutputConfig) {
    if let Some(message) = view.flash(Instant::now()) {
        print_success(message, config);
    }
}

pub fn render_cards(services: &[MonitoredService], config: &OutputConfig) -> String {
    services
        .iter()
        .map(|s| render_service_card(s, config))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Overwrite draft fields with the ones given on the command line.
pub fn apply_fields(draft: &mut ServiceDraft, fields: &ServiceFields) {
    let text_fields = [
        (&mut draft.name, &fields.name),
        (&mut draft.url, &fields.url),
        (&mut draft.description, &fields.description),
        (&mut draft.service_type, &fields.service_type),
        (&mut draft.environment, &fields.environment),
        (&mut draft.owner_team, &fields.owner_team),
        (&mut draft.contact_email, &fields.contact_email),
        (&mut draft.project_name, &fields.project_name),
        (
            &mut draft.max_allowed_downtime_per_month,
            &fields.max_allowed_downtime_per_month,
        ),
        (&mut draft.check_interval, &fields.check_interval),
        (&mut draft.tags, &fields.tags),
    ];
    for (slot, value) in text_fields {
        if let Some(value) = value {
            slot.clone_from(value);
        }
    }
    if let Some(ms) = fields.expected_response_time_ms {
        draft.expected_response_time_ms = Some(ms);
    }
}

/// Ask for every field, starting from the current draft values.
fn prompt_draft(draft: &mut ServiceDraft) -> Result<()> {
    draft.name = prompt_text("Name", &draft.name)?;
    draft.url = prompt_text("URL", &draft.url)?;
    draft.description = prompt_text("Description (optional)", &draft.description)?;
    draft.service_type = prompt_text("Type (optional)", &draft.service_type)?;
    draft.environment = prompt_text("Environment (optional)", &draft.environment)?;

    let current = draft
        .expected_response_time_ms
        .map(|ms| ms.to_string())
        .unwrap_or_default();
    let response_time: String = Input::new()
        .with_prompt("Expected Response Time (ms)")
        .with_initial_text(current)
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), &'static str> {
            if input.trim().is_empty() || input.trim().parse::<u32>().is_ok() {
                Ok(())
            } else {
                Err("Enter a whole number of milliseconds")
            }
        })
        .interact_text()?;
    draft.expected_response_time_ms = response_time.trim().parse().ok();

    draft.owner_team = prompt_text("Owner Team (optional)", &draft.owner_team)?;
    draft.contact_email = prompt_text("Contact Email (optional)", &draft.contact_email)?;
    draft.project_name = prompt_text("Project Name (optional)", &draft.project_name)?;
    draft.max_allowed_downtime_per_month = prompt_text(
        "Max Allowed Downtime Per Month (optional)",
        &draft.max_allowed_downtime_per_month,
    )?;
    draft.check_interval = prompt_text("Check Interval (optional)", &draft.check_interval)?;
    draft.tags = prompt_text("Tags (comma separated)", &draft.tags)?;
    Ok(())
}

fn prompt_text(prompt: &str, initial: &str) -> Result<String> {
    let value = Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_fields_overrides_only_given() {
        let mut draft = ServiceDraft {
            name: "Old".to_string(),
            description: "keep me".to_string(),
            ..ServiceDraft::default()
        };
        let fields = ServiceFields {
            name: Some("New".to_string()),
            url: Some("https://new.example.com".to_string()),
            tags: Some("a, b".to_string()),
            expected_response_time_ms: Some(250),
            ..ServiceFields::default()
        };

        apply_fields(&mut draft, &fields);

        assert_eq!(draft.name, "New");
        assert_eq!(draft.url, "https://new.example.com");
        assert_eq!(draft.description, "keep me");
        assert_eq!(draft.tags, "a, b");
        assert_eq!(draft.expected_response_time_ms, Some(250));
    }

    #[test]
    fn test_apply_empty_string_clears_field() {
        let mut draft = ServiceDraft {
            name: "n".to_string(),
            url: "u".to_string(),
            owner_team: "SRE".to_string(),
            ..ServiceDraft::default()
        };
        let fields = ServiceFields {
            owner_team: Some(String::new()),
            ..ServiceFields::default()
        };

        apply_fields(&mut draft, &fields);

        assert_eq!(draft.validate().unwrap().owner_team, None);
    }

    #[test]
    fn test_render_cards_separates_services() {
        let services: Vec<MonitoredService> = serde_json::from_value(serde_json::json!([
            { "id": "1", "name": "A", "url": "https://a" },
            { "id": "2", "name": "B", "url": "https://b" }
        ]))
        .unwrap();
        let config = OutputConfig {
            no_color: true,
            ..OutputConfig::default()
        };

        let text = render_cards(&services, &config);

        assert_eq!(text.matches("❌ Down").count(), 2);
        assert!(text.contains("\n\n"));
    }
}
