/*
[INPUT]:  Parsed subcommand arguments, TaskQueueApi, console config
[OUTPUT]: One-shot backend queries and submissions printed to stdout
[POS]:    CLI command layer - non-interactive mode
[UPDATE]: When adding subcommands or changing their output
*/

use std::io::{self, Write};

use anyhow::{Context, Result, bail};

use taskq_adapter::{Priority, TaskQueueApi};
use taskq_console::detail::{fetch_detail, lookup_error_message};
use taskq_console::registry::schema_table;
use taskq_console::task_query::{EMPTY_MESSAGE, FilterState, build_query, rows};
use taskq_console::{
    ConsoleConfig, FieldKind, MetricsDisplay, StatusFilter, SubmissionClient, SubmissionForm,
    SubmissionOutcome, fetch_registry,
};

pub async fn show_metrics(api: &dyn TaskQueueApi, json: bool) -> Result<()> {
    let snapshot = api.get_metrics().await.context("fetch metrics")?;
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
        return Ok(());
    }

    let display = MetricsDisplay::from_snapshot(&snapshot);
    writeln!(out, "Total tasks:         {}", display.total_tasks)?;
    writeln!(out, "Completed:           {}", display.completed_tasks)?;
    writeln!(out, "Failed:              {}", display.failed_tasks)?;
    writeln!(out, "Pending:             {}", display.pending_tasks)?;
    writeln!(out, "Processing:          {}", display.processing_tasks)?;
    writeln!(out, "Avg processing time: {}", display.avg_processing_time)?;
    writeln!(out, "Success rate:        {}", display.success_rate)?;
    writeln!(out, "Queue sizes:")?;
    for point in &display.queue {
        writeln!(out, "  {:<7} {}", point.name, point.tasks)?;
    }
    Ok(())
}

pub async fn list_tasks(
    api: &dyn TaskQueueApi,
    config: &ConsoleConfig,
    filter: StatusFilter,
    page: u32,
    size: Option<u32>,
    json: bool,
) -> Result<()> {
    let state = FilterState {
        filter,
        page,
        page_size: size.unwrap_or(config.task_list.page_size),
    };
    let result = api
        .list_tasks(&build_query(&state))
        .await
        .context("list tasks")?;
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        return Ok(());
    }

    if result.is_empty() {
        writeln!(out, "{EMPTY_MESSAGE}")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<20} {:<18} {:<8} {:<11} {:<7} CREATED",
        "TASK ID", "TYPE", "PRIORITY", "STATUS", "RETRIES"
    )?;
    for row in rows(&result, config.task_list.id_prefix_len) {
        writeln!(
            out,
            "{:<20} {:<18} {:<8} {:<11} {:<7} {}",
            row.short_id,
            row.task_type,
            row.priority.as_str(),
            row.status.as_str(),
            row.retries,
            row.created_at
        )?;
    }
    if let Some(pages) = result.total_pages {
        writeln!(out, "page {}/{} (filter {})", page + 1, pages.max(1), filter)?;
    }
    Ok(())
}

pub async fn show_task(api: &dyn TaskQueueApi, task_id: &str, json: bool) -> Result<()> {
    let detail = match fetch_detail(api, task_id, None).await {
        Ok(detail) => detail,
        Err(err) => bail!("{}", lookup_error_message(task_id, &err)),
    };
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&detail.response)?)?;
        return Ok(());
    }
    let fields = detail.fields();
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in fields {
        writeln!(out, "{label:<width$} : {value}")?;
    }
    Ok(())
}

pub async fn list_types(api: &dyn TaskQueueApi, config: &ConsoleConfig) -> Result<()> {
    let registry = fetch_registry(api, &schema_table(&config.task_types))
        .await
        .context("fetch task types")?;
    let mut out = io::stdout().lock();
    for type_id in registry.list_types() {
        writeln!(out, "{type_id}")?;
        let schema = registry.schema_for(type_id)?;
        for field in &schema.fields {
            let kind = match &field.kind {
                FieldKind::Text => "text".to_string(),
                FieldKind::MultilineText => "multiline".to_string(),
                FieldKind::SingleSelect { options } => format!("one of {}", options.join("|")),
            };
            let required = if field.required { "required" } else { "optional" };
            write!(out, "  {:<12} {kind}, {required}", field.name)?;
            if !field.default_value.is_empty() {
                write!(out, ", default {}", field.default_value)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Fields left unset take their schema default, like the form.
pub async fn submit(
    api: std::sync::Arc<dyn TaskQueueApi>,
    config: &ConsoleConfig,
    task_type: &str,
    priority: Option<Priority>,
    fields: &[(String, String)],
    max_retries: Option<u32>,
) -> Result<()> {
    let registry = fetch_registry(api.as_ref(), &schema_table(&config.task_types))
        .await
        .context("fetch task types")?;

    let mut form = SubmissionForm::new(
        priority.unwrap_or(config.submission.default_priority),
        max_retries.unwrap_or(config.submission.max_retries),
    );
    form.apply_registry(registry);
    form.select_type(task_type)?;
    for (name, value) in fields {
        if !form.set_field(name, value.clone()) {
            bail!("{task_type} has no field '{name}'");
        }
    }

    let Some(draft) = form.begin_submit() else {
        bail!("no task type selected");
    };
    let client = SubmissionClient::new(api);
    let outcome = SubmissionOutcome::from_result(client.submit(form.registry(), &draft).await);

    if let SubmissionOutcome::Failed(message) = &outcome {
        bail!("submission failed: {message}");
    }
    let mut out = io::stdout().lock();
    writeln!(out, "{}", outcome.message())?;
    for line in outcome.details() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// `key=value` for `--field`.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty field name in '{raw}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}
