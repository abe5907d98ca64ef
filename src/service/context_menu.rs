//! Context-menu entries and click events.

use serde::{Deserialize, Serialize};

/// Menu id for "download this link".
pub const MENU_DOWNLOAD_LINK: &str = "flamingo-download-link";
/// Menu id for "download this page".
pub const MENU_DOWNLOAD_PAGE: &str = "flamingo-download-page";

/// A context-menu entry to register with the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: &'static str,
    pub title: &'static str,
    pub contexts: &'static [&'static str],
}

/// Entries registered on install.
pub const MENU_ITEMS: [MenuItem; 2] = [
    MenuItem {
        id: MENU_DOWNLOAD_LINK,
        title: "Download with Flamingo",
        contexts: &["link"],
    },
    MenuItem {
        id: MENU_DOWNLOAD_PAGE,
        title: "Download page with Flamingo",
        contexts: &["page"],
    },
];

/// A click on one of our menu entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuClick {
    pub menu_item_id: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
}

impl ContextMenuClick {
    /// The URL this click asks to download, if the id is ours and the
    /// matching URL is present.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        let url = match self.menu_item_id.as_str() {
            MENU_DOWNLOAD_LINK => self.link_url.as_deref(),
            MENU_DOWNLOAD_PAGE => self.page_url.as_deref(),
            _ => None,
        }?;
        let url = url.trim();
        (!url.is_empty()).then_some(url)
    }
}
