//! Output formatters for tabs, values and change notifications

use anyhow::Result;
use cellwatch::{Change, Notifier, WatchTarget, link};
use cellwatch_core::SheetTab;
use colored::*;
use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
}

#[derive(Serialize)]
struct TabEntry<'a> {
    ordinal: usize,
    name: &'a str,
    id: &'a str,
}

#[derive(Serialize)]
struct ValueEntry<'a> {
    target: &'a WatchTarget,
    url: String,
    value: &'a str,
}

/// Print the tabs of a document as an ordinal-numbered list
pub fn print_tabs(tabs: &[SheetTab], format: Format) -> Result<()> {
    match format {
        Format::Human => {
            for (i, tab) in tabs.iter().enumerate() {
                let name = if tab.name.is_empty() {
                    "(only tab)".dimmed().to_string()
                } else {
                    tab.name.bold().to_string()
                };
                println!("{}. {} {}", i + 1, name, format!("gid={}", tab.internal_id).dimmed());
            }
        }
        Format::Json => {
            let entries: Vec<TabEntry> = tabs
                .iter()
                .enumerate()
                .map(|(i, tab)| TabEntry {
                    ordinal: i + 1,
                    name: &tab.name,
                    id: &tab.internal_id,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

/// Print the current value of a target
pub fn print_value(target: &WatchTarget, value: &str, format: Format) -> Result<()> {
    match format {
        Format::Human => println!("{}", value),
        Format::Json => {
            let entry = ValueEntry {
                target,
                url: link::edit_url(target),
                value,
            };
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
    }
    Ok(())
}

/// Notifier writing each change to stdout
pub struct ConsoleNotifier {
    pub format: Format,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, change: &Change) -> Result<()> {
        match self.format {
            Format::Human => println!("{} {}", "●".yellow().bold(), change.message()),
            Format::Json => println!("{}", serde_json::to_string(change)?),
        }
        Ok(())
    }
}
