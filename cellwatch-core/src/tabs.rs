//! Tab (sheet) discovery in a published snapshot

use crate::document::{self, Document};
use crate::error::{Result, SheetError};
use log::{debug, warn};
use markup5ever_rcdom::Handle;
use std::fmt;

/// Id of the list holding one button per tab
pub const TAB_MENU_ID: &str = "sheet-menu";
/// Id prefix of a tab button; the remainder is the tab's internal id
pub const TAB_BUTTON_PREFIX: &str = "sheet-button-";

/// One sheet of a document, tied to the parsed tree it came from
#[derive(Clone)]
pub struct SheetTab {
    pub name: String,
    pub internal_id: String,
    pub grid_root: Handle,
}

impl fmt::Debug for SheetTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetTab")
            .field("name", &self.name)
            .field("internal_id", &self.internal_id)
            .finish_non_exhaustive()
    }
}

/// List the tabs of a document in on-screen order.
///
/// A document without a tab menu has exactly one tab; it is returned with
/// an empty name and the id of the sole grid container.
pub fn list_tabs(doc: &Document) -> Result<Vec<SheetTab>> {
    let viewport = doc.viewport();
    let menu = document::find_descendant(doc.root(), &|node| {
        document::attr(node, "id") == TAB_MENU_ID
    });

    let Some(menu) = menu else {
        let grid_root = document::child_elements(viewport)
            .into_iter()
            .find(|child| !document::attr(child, "id").is_empty())
            .ok_or_else(|| {
                SheetError::InvalidDocumentStructure("tab container has no grids".to_string())
            })?;
        let internal_id = document::attr(&grid_root, "id");
        debug!("Single-tab document, grid id {}", internal_id);
        return Ok(vec![SheetTab {
            name: String::new(),
            internal_id,
            grid_root,
        }]);
    };

    let mut tabs = Vec::new();
    for item in document::child_elements(&menu) {
        if !document::is_element(&item, "li") {
            continue;
        }
        let id = document::attr(&item, "id");
        let Some(internal_id) = id.strip_prefix(TAB_BUTTON_PREFIX) else {
            continue;
        };
        let name = document::text_content(&item).trim().to_string();
        match grid_container(viewport, internal_id) {
            Some(grid_root) => tabs.push(SheetTab {
                name,
                internal_id: internal_id.to_string(),
                grid_root,
            }),
            None => warn!("Tab '{}' ({}) has no grid container", name, internal_id),
        }
    }

    if tabs.is_empty() {
        return Err(SheetError::InvalidDocumentStructure(
            "tab menu lists no tabs".to_string(),
        ));
    }
    Ok(tabs)
}

fn grid_container(viewport: &Handle, internal_id: &str) -> Option<Handle> {
    document::child_elements(viewport)
        .into_iter()
        .find(|child| document::attr(child, "id") == internal_id)
}

/// Find a tab by internal id
pub fn lookup<'a>(tabs: &'a [SheetTab], internal_id: &str) -> Result<&'a SheetTab> {
    tabs.iter()
        .find(|t| t.internal_id == internal_id)
        .ok_or_else(|| SheetError::TabNotFound(internal_id.to_string()))
}

/// Pick the tab for a reference: by id when given, otherwise the only tab.
///
/// Several tabs and no id means the user has to choose.
pub fn select<'a>(tabs: &'a [SheetTab], internal_id: Option<&str>) -> Result<&'a SheetTab> {
    match (internal_id, tabs) {
        (Some(id), _) => lookup(tabs, id),
        (None, [only]) => Ok(only),
        (None, []) => Err(SheetError::InvalidDocumentStructure(
            "document has no tabs".to_string(),
        )),
        (None, _) => Err(SheetError::TabSelectionRequired {
            tabs: tabs.iter().map(|t| t.name.clone()).collect(),
        }),
    }
}

/// Ordinal-numbered list of tab names, one per line
pub fn format_tab_list(tabs: &[SheetTab]) -> String {
    let names: Vec<String> = tabs.iter().map(|t| t.name.clone()).collect();
    format_names(&names)
}

pub(crate) fn format_names(names: &[String]) -> String {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name))
        .collect::<Vec<_>>()
        .join("\n")
}
