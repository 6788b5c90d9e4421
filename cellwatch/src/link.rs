//! Parsing of shared spreadsheet links into watch targets

use anyhow::{Context, Result};
use cellwatch_core::{CellReference, RangeReference};
use regex::Regex;
use std::sync::OnceLock;

use crate::subscription::WatchTarget;

/// Default location of published spreadsheets
pub const DEFAULT_BASE_URL: &str = "https://docs.google.com/spreadsheets";

const PUBLISHED_SUFFIX: &str = "/pubhtml";

/// A parsed spreadsheet link; tab and range are optional in a pasted link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLink {
    pub document_id: String,
    pub tab_id: Option<String>,
    pub range: Option<RangeReference>,
}

impl SheetLink {
    /// Parse an edit, htmlview or pubhtml link, with optional `#gid=..&range=..` fragment.
    ///
    /// Published (`pubhtml`) documents keep the suffix in their id, since they
    /// are fetched from a different path.
    pub fn parse(url: &str) -> Result<Self> {
        static LINK_PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = LINK_PATTERN.get_or_init(|| {
            Regex::new(
                r"^https?://docs\.google\.com/spreadsheets/(.+?)/(?:edit|htmlview|(pubhtml))(?:\?[^#]*)?#?(?:gid=(\d*)(?:&range=([A-Za-z]+)(\d+)(?::([A-Za-z]+)(\d+))?)?)?$",
            )
            .unwrap()
        });

        let url = url.trim();
        let caps = re
            .captures(url)
            .with_context(|| format!("Not a spreadsheet link: {}", url))?;

        let mut document_id = caps[1].to_string();
        if caps.get(2).is_some() {
            document_id.push_str(PUBLISHED_SUFFIX);
        }

        let tab_id = caps
            .get(3)
            .map(|m| m.as_str())
            .filter(|gid| !gid.is_empty())
            .map(str::to_string);

        let range = match (caps.get(4), caps.get(5)) {
            (Some(col), Some(row)) => {
                let start = CellReference::new(col.as_str(), row.as_str())?;
                let end = match (caps.get(6), caps.get(7)) {
                    (Some(col), Some(row)) => CellReference::new(col.as_str(), row.as_str())?,
                    _ => start.clone(),
                };
                Some(RangeReference::new(start, end))
            }
            _ => None,
        };

        Ok(Self {
            document_id,
            tab_id,
            range,
        })
    }

    /// Turn the link into a watch target, `range` overriding the link's own range
    pub fn into_target(self, range: Option<RangeReference>) -> Result<WatchTarget> {
        let range = range
            .or(self.range)
            .with_context(|| format!("No cell range given for document {}", self.document_id))?;
        Ok(WatchTarget {
            document_id: self.document_id,
            tab_id: self.tab_id,
            range,
        })
    }
}

/// Whether a document id refers to a published (`pubhtml`) page
pub fn is_published(document_id: &str) -> bool {
    document_id.ends_with(PUBLISHED_SUFFIX)
}

/// URL the snapshot of a document is fetched from
pub fn document_url(base_url: &str, document_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if is_published(document_id) {
        format!("{}/{}", base, document_id)
    } else {
        format!("{}/{}/htmlview", base, document_id)
    }
}

/// Human-facing link back to a watched range
pub fn edit_url(target: &WatchTarget) -> String {
    let range = format!("{}:{}", target.range.start, target.range.end);
    if is_published(&target.document_id) {
        let gid = target
            .tab_id
            .as_deref()
            .map(|gid| format!(" gid={}", gid))
            .unwrap_or_default();
        return format!(
            "{}/{}{} range={}",
            DEFAULT_BASE_URL, target.document_id, gid, range
        );
    }
    let gid = target
        .tab_id
        .as_deref()
        .map(|gid| format!("gid={}&", gid))
        .unwrap_or_default();
    format!(
        "{}/{}/edit#{}range={}",
        DEFAULT_BASE_URL, target.document_id, gid, range
    )
}
