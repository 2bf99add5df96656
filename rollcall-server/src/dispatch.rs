//! Report delivery
//!
//! The final ledger file is handed to a [`ReportDispatcher`] at shutdown.
//! Delivery is best-effort: a failed dispatch is the caller's to log and
//! swallow, never a reason to abort finalization.

use async_trait::async_trait;
use rollcall_common::{Error, Result};
use std::path::Path;
use tracing::info;

/// External notification channel for the finalized ledger
#[async_trait]
pub trait ReportDispatcher: Send + Sync {
    async fn send(&self, report: &Path) -> Result<()>;
}

/// Delivers the ledger as a document to a Telegram chat
pub struct TelegramDispatcher {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramDispatcher {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait]
impl ReportDispatcher for TelegramDispatcher {
    async fn send(&self, report: &Path) -> Result<()> {
        if !report.exists() {
            info!("Attendance file not found; nothing to send");
            return Ok(());
        }

        let bytes = tokio::fs::read(report).await?;
        let file_name = report
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Attendance.csv".to_string());

        let document = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")
            .map_err(|e| Error::Dispatch(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", "Here is the final attendance report.")
            .part("document", document);

        let url = format!("https://api.telegram.org/bot{}/sendDocument", self.bot_token);
        info!("Sending report to Telegram...");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Dispatch(format!(
                "Telegram returned {}: {}",
                status, body
            )));
        }

        info!("Telegram report sent successfully");
        Ok(())
    }
}

/// Dispatcher used when no notification channel is configured
pub struct NullDispatcher;

#[async_trait]
impl ReportDispatcher for NullDispatcher {
    async fn send(&self, report: &Path) -> Result<()> {
        info!(
            "Report delivery not configured; final ledger kept at {}",
            report.display()
        );
        Ok(())
    }
}
