//! Interactive mode.
//!
//! Starts as a bare calculator prompt. Typing [`UNLOCK_START`] followed by
//! [`UNLOCK_COMPLETE`] within the unlock window opens the hidden report
//! menu.

use std::time::Instant;

use dialoguer::{Input, Select};
use panic_report_cli_utils::MultiProgress;
use panic_report_models::{ReportForm, ReportType, Urgency};
use panic_report_store::sequence::SequenceGate;

use crate::app::App;
use crate::commands;

/// First half of the hidden unlock sequence.
pub const UNLOCK_START: &str = "190";
/// Second half of the hidden unlock sequence.
pub const UNLOCK_COMPLETE: &str = "=";

/// Actions in the hidden menu.
enum HiddenAction {
    Report,
    Panic,
    List,
    Back,
}

impl HiddenAction {
    const ALL: &[Self] = &[Self::Report, Self::Panic, Self::List, Self::Back];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Report => "Fazer denúncia",
            Self::Panic => "Botão de pânico",
            Self::List => "Minhas denúncias",
            Self::Back => "Voltar",
        }
    }
}

/// Loads the store, then runs the calculator prompt until the user enters
/// `q`. A failed command is reported and the prompt continues.
///
/// # Errors
///
/// Returns an error if reading from the terminal fails.
pub async fn run(app: &mut App, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    app.store.load().await;
    let mut gate = SequenceGate::new(app.config.panic.unlock_timeout());

    loop {
        let line: String = Input::new()
            .with_prompt("calc")
            .allow_empty(true)
            .interact_text()?;

        match line.trim() {
            "q" | "quit" => return Ok(()),
            UNLOCK_START => gate.start(Instant::now()),
            UNLOCK_COMPLETE if gate.complete(Instant::now()) => hidden_menu(app, multi).await?,
            other => {
                gate.clear();
                println!("{other}");
            }
        }
    }
}

async fn hidden_menu(app: &mut App, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = HiddenAction::ALL.iter().map(HiddenAction::label).collect();

    let idx = Select::new()
        .with_prompt("Menu")
        .items(&labels)
        .default(0)
        .interact()?;

    let result = match HiddenAction::ALL[idx] {
        HiddenAction::Report => {
            let form = prompt_form(None, None, None)?;
            commands::submit(app, &form).await
        }
        HiddenAction::Panic => commands::panic(app, multi, None).await,
        HiddenAction::List => {
            commands::list(app).await;
            Ok(())
        }
        HiddenAction::Back => Ok(()),
    };

    // Command failures are shown and the calculator keeps running; only
    // prompt I/O errors end the session.
    if let Err(e) = result {
        log::error!("{} failed: {e}", HiddenAction::ALL[idx].label());
        println!("{}", commands::alert_message(e.as_ref()));
    }

    Ok(())
}

/// Fills in any form field not already given by asking for it.
///
/// # Errors
///
/// Returns an error if a prompt fails.
pub fn prompt_form(
    report_type: Option<String>,
    description: Option<String>,
    urgency: Option<String>,
) -> Result<ReportForm, Box<dyn std::error::Error>> {
    let report_type = match report_type {
        Some(value) => value,
        None => {
            let choices = ReportType::form_choices();
            let labels: Vec<&str> = choices.iter().map(|t| t.label()).collect();
            let idx = Select::new()
                .with_prompt("Tipo de abuso")
                .items(&labels)
                .default(0)
                .interact()?;
            choices[idx].to_string()
        }
    };

    let description = match description {
        Some(value) => value,
        None => Input::new()
            .with_prompt("Descrição")
            .allow_empty(true)
            .interact_text()?,
    };

    let urgency = match urgency {
        Some(value) => value,
        None => {
            let choices = Urgency::all();
            let labels: Vec<&str> = choices.iter().map(|u| u.label()).collect();
            let idx = Select::new()
                .with_prompt("Urgência")
                .items(&labels)
                .default(0)
                .interact()?;
            choices[idx].to_string()
        }
    };

    Ok(ReportForm {
        report_type,
        description,
        urgency,
    })
}
