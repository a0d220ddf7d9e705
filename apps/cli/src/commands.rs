//! Command handlers. Everything user-facing goes to stdout; logs go to stderr.

use std::sync::Arc;

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Local, TimeZone};
use recallcheck_client::{normalize, OcrImage, RecordStatus, ResolutionClient, ResolutionResult};
use recallcheck_history::{
    ClearNotifier, FileSlotStorage, HistoryEntry, HistoryStore, SettingsStore,
};
use serde_json::Value;

use crate::cli::{Command, OcrArgs, SettingsCommand};
use crate::config::Config;

/// Everything a command needs.
pub struct App {
    pub client: ResolutionClient,
    pub history: HistoryStore,
    pub settings: SettingsStore,
}

/// Prints a confirmation once the history is gone.
struct ConsoleNotifier;

impl ClearNotifier for ConsoleNotifier {
    fn history_cleared(&self) {
        println!("History cleared");
    }
}

impl App {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = ResolutionClient::from_config(&config.client)
            .context("Invalid client configuration")?;
        let storage = Arc::new(FileSlotStorage::new(&config.data_dir));
        tracing::debug!("Using data directory {}", config.data_dir.display());

        Ok(Self {
            client,
            history: HistoryStore::new(storage.clone()).with_notifier(Arc::new(ConsoleNotifier)),
            settings: SettingsStore::new(storage),
        })
    }

    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Query {
                code,
                no_save,
                json,
            } => self.query(&code, !no_save, json).await,
            Command::Ocr(args) => self.ocr(args).await,
            Command::History { filter, json } => self.history(&filter, json),
            Command::ClearHistory => {
                if !self.history.clear() {
                    anyhow::bail!("Failed to clear history");
                }
                Ok(())
            }
            Command::Stats => print_json(&self.client.stats().await?),
            Command::Health => print_json(&self.client.health().await?),
            Command::Settings(cmd) => self.settings(cmd),
        }
    }

    async fn query(&self, raw: &str, save: bool, json: bool) -> anyhow::Result<()> {
        let result = self.client.resolve(raw).await?;

        if save {
            let code = normalize(Some(raw))?;
            if !self.history.save(history_entry(&code, &result)) {
                tracing::warn!("Lookup for '{}' was not recorded in history", code);
            }
        }

        if json {
            return print_json(&serde_json::to_value(&result)?);
        }

        let Some(first) = result.records().first() else {
            println!("No recall found ({} candidate(s) checked)", result.total());
            return Ok(());
        };
        println!(
            "{}: {} matching record(s)",
            first.status.as_str().to_uppercase(),
            result.records().len()
        );
        for record in result.records() {
            println!(
                "  {} | {} | {} | codes: {}",
                record.product_name.as_deref().unwrap_or("-"),
                record.brand.as_deref().unwrap_or("-"),
                record.status,
                record.batch_codes
            );
            if let Some(reason) = &record.recall_reason {
                println!("    reason: {}", reason);
            }
            if let Some(url) = &record.source_url {
                println!("    source: {}", url);
            }
        }
        Ok(())
    }

    async fn ocr(&self, args: OcrArgs) -> anyhow::Result<()> {
        let image = match (args.url, args.file) {
            (Some(url), _) => OcrImage::Url(url),
            (None, Some(path)) => {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("Failed to read image {}", path.display()))?;
                OcrImage::Base64(BASE64.encode(bytes))
            }
            (None, None) => anyhow::bail!("Either --url or --file is required"),
        };

        let result = self.client.ocr(&image).await?;
        println!(
            "{} (confidence {:.2})",
            result.batch_code, result.confidence
        );
        Ok(())
    }

    fn history(&self, filter: &str, json: bool) -> anyhow::Result<()> {
        let entries = self.history.get_all(filter);
        if json {
            return print_json(&serde_json::to_value(&entries)?);
        }
        if entries.is_empty() {
            println!("No history");
            return Ok(());
        }
        for entry in entries {
            let when = entry
                .query_time
                .and_then(|ms| Local.timestamp_millis_opt(ms).single())
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{}  {:<14} {:<12} {}",
                when,
                entry.batch_code,
                entry.status,
                entry.product_name.as_deref().unwrap_or("")
            );
        }
        Ok(())
    }

    fn settings(&self, command: SettingsCommand) -> anyhow::Result<()> {
        match command {
            SettingsCommand::Get { key } => print_json(&self.settings.get(&key, Value::Null)),
            SettingsCommand::Set { key, value } => {
                let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
                if !self.settings.set(&key, value) {
                    anyhow::bail!("Failed to save setting '{}'", key);
                }
                Ok(())
            }
            SettingsCommand::List => print_json(&Value::Object(self.settings.all())),
        }
    }
}

/// History entry for a finished lookup.
pub fn history_entry(code: &str, result: &ResolutionResult) -> HistoryEntry {
    let first = result.records().first();
    let status = first.map_or(RecordStatus::NotRecalled, |r| r.status);

    let mut entry = HistoryEntry::new(code, status.as_str())
        .with_product_name(first.and_then(|r| r.product_name.clone()))
        .with_field("backend", result.backend().as_str());
    if let Some(brand) = first.and_then(|r| r.brand.clone()) {
        entry = entry.with_field("brand", brand);
    }
    entry
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
