//! Command handlers shared by the subcommands and interactive mode.

use std::sync::Arc;
use std::time::{Duration, Instant};

use panic_report_admin::{Dashboard, Level};
use panic_report_cache::CacheError;
use panic_report_cli_utils::{CountdownBar, MultiProgress};
use panic_report_client::SubmissionError;
use panic_report_device::window::ScheduledWindow;
use panic_report_models::{Report, ReportForm};
use panic_report_store::form::submit_form;
use panic_report_store::StoreError;
use panic_report_store::panic::{PanicAction, PanicOutcome};

use crate::app::App;

const TICK: Duration = Duration::from_millis(250);

/// Text shown to the user when a command fails. A server rejection shows
/// the server's own message.
#[must_use]
pub fn alert_message(err: &(dyn std::error::Error + 'static)) -> String {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::Submission(SubmissionError::ServerRejected { message, .. })) => {
            format!("Erro: {message}")
        }
        _ => format!("Erro: {err}"),
    }
}

/// Validates and submits a form.
///
/// # Errors
///
/// Returns an error if the form is invalid or the store rejects it.
pub async fn submit(app: &mut App, form: &ReportForm) -> Result<(), Box<dyn std::error::Error>> {
    let report = submit_form(&mut app.store, &app.geolocation, form).await?;
    println!("Denúncia enviada ({})", report.id());
    Ok(())
}

/// Runs the panic action with a countdown. Ctrl-C cancels the recording.
///
/// # Errors
///
/// Returns an error if the store rejects the panic report.
pub async fn panic(
    app: &mut App,
    multi: &MultiProgress,
    window_secs: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let duration = window_secs.map_or_else(|| app.config.panic.record_window(), Duration::from_secs);
    let (window, cancel) = ScheduledWindow::start(duration);

    let bar = Arc::new(CountdownBar::new(multi, "Gravando", duration));
    let ticker = {
        let bar = bar.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let mut interval = tokio::time::interval(TICK);
            loop {
                interval.tick().await;
                bar.update(started.elapsed());
            }
        })
    };
    let canceller = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let outcome = PanicAction::new(&app.geolocation, &mut app.audio, &app.config.panic)
        .trigger(&mut app.store, window)
        .await;

    ticker.abort();
    canceller.abort();

    match outcome? {
        PanicOutcome::Submitted(report) => {
            bar.finish("enviado");
            println!("Alerta enviado ({})", report.id());
        }
        PanicOutcome::Cancelled => {
            bar.abandon("cancelado");
            println!("Alerta cancelado");
        }
    }
    Ok(())
}

/// Loads the store and prints every report.
pub async fn list(app: &mut App) {
    app.store.load().await;
    print_reports(app.store.reports());
}

/// Fetches records and prints the dashboard at `level`.
///
/// # Errors
///
/// Returns an error if the fetch fails or a record cannot be classified.
pub async fn dashboard(app: &App, level: Level) -> Result<(), Box<dyn std::error::Error>> {
    let records = app.client.fetch_records().await?;
    let dashboard = Dashboard::from_records(&records, app.client.base_url())?;

    let counts = dashboard.counts();
    let summary: Vec<String> = counts
        .iter()
        .map(|(level, count)| format!("{level}: {count}"))
        .collect();
    println!("{}", summary.join("  |  "));
    println!();

    println!(
        "{:<8} {:<8} {:<20} {:<16} {:<22} {:<20} DESCRIPTION",
        "ID", "LEVEL", "STATUS", "TYPE", "TIME", "POSITION"
    );
    println!("{}", "-".repeat(120));
    for incident in dashboard.filter(level) {
        let time = incident
            .timestamp
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
        let position = format!("{:.4},{:.4}", incident.latitude, incident.longitude);
        println!(
            "{:<8} {:<8} {:<20} {:<16} {:<22} {:<20} {}",
            incident.id,
            incident.level,
            incident.status,
            incident.report_type.label(),
            time,
            position,
            incident.description
        );
        for asset in &incident.assets {
            println!("{:>10} {}", "↳", asset.uri);
        }
    }
    Ok(())
}

/// Prints the snapshot location and what it holds.
///
/// # Errors
///
/// Returns an error if the directory grant is refused or the snapshot is
/// unreadable.
pub async fn cache(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let cache = app.cache();
    let path = cache.snapshot_path().await?;
    println!("Snapshot: {}", path.display());

    match cache.try_load().await {
        Ok(reports) => print_reports(&reports),
        Err(CacheError::NotFound(_)) => println!("No reports cached yet."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn print_reports(reports: &[Report]) {
    if reports.is_empty() {
        println!("No reports found.");
        return;
    }

    println!(
        "{:<38} {:<16} {:<8} {:<20} {:<20} DESCRIPTION",
        "ID", "TYPE", "URGENCY", "STATUS", "TIME"
    );
    println!("{}", "-".repeat(120));
    for report in reports {
        let description = if report.description().chars().count() > 40 {
            format!("{}...", report.description().chars().take(37).collect::<String>())
        } else {
            report.description().to_string()
        };
        println!(
            "{:<38} {:<16} {:<8} {:<20} {:<20} {}",
            report.id(),
            report.report_type().label(),
            report.urgency().label(),
            report.status(),
            report.report_time().format("%Y-%m-%d %H:%M:%S"),
            description
        );
    }
    println!("\n{} report(s)", reports.len());
}
