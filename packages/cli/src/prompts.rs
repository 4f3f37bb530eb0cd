//! Terminal implementations of the device and storage permission prompts.

use std::path::PathBuf;

use async_trait::async_trait;
use dialoguer::Confirm;
use panic_report_cache::directory::DirectoryAccess;
use panic_report_device::Capability;
use panic_report_device::permission::{PermissionPrompt, PermissionStatus};

/// Asks for device permissions with a yes/no question.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPermissionPrompt;

#[async_trait]
impl PermissionPrompt for TerminalPermissionPrompt {
    async fn request(&self, capability: Capability) -> PermissionStatus {
        let question = format!("Allow access to {capability}?");
        if confirm(question).await {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }
}

/// Offers a fixed directory for report storage and asks the user to allow it.
#[derive(Debug, Clone)]
pub struct TerminalDirectoryAccess {
    directory: PathBuf,
}

impl TerminalDirectoryAccess {
    pub const fn new(directory: PathBuf) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl DirectoryAccess for TerminalDirectoryAccess {
    async fn request_directory(&self) -> Option<PathBuf> {
        let question = format!("Store reports in {}?", self.directory.display());
        confirm(question).await.then(|| self.directory.clone())
    }
}

/// Runs a blocking confirmation off the async worker. Any terminal error
/// counts as a refusal.
async fn confirm(question: String) -> bool {
    let answer = tokio::task::spawn_blocking(move || {
        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
    })
    .await;

    match answer {
        Ok(Ok(granted)) => granted,
        Ok(Err(e)) => {
            log::warn!("Prompt failed, treating as refusal: {e}");
            false
        }
        Err(e) => {
            log::warn!("Prompt task failed, treating as refusal: {e}");
            false
        }
    }
}
