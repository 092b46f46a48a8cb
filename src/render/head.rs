//! Head sections of an app document.
//!
//! Everything in `<app>` that is not UI: metadata attributes, `<config>`,
//! `<state>`, `<timer>`, `<script>`, `<style>` and the `<ui default>` page.
//! Parsing fills the variable store and the stylesheet directly and returns
//! the rest as [`HeadData`].

use tracing::{debug, warn};

use crate::css::Stylesheet;
use crate::markup::ParsedElement;
use crate::reactive::{Store, VarType};

/// Attributes of the `<app>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMeta {
    pub version: String,
    /// Minimum OS version the app asks for.
    pub os: String,
    pub readonly: bool,
    /// Icon path; `system:name` is already resolved.
    pub icon: String,
}

impl Default for AppMeta {
    fn default() -> Self {
        Self {
            version: "0.0".into(),
            os: String::new(),
            readonly: false,
            icon: String::new(),
        }
    }
}

/// Draw buffer size requested by `<display buffer>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayBuffer {
    Micro,
    Small,
    #[default]
    Optimal,
    Max,
}

impl DisplayBuffer {
    pub fn from_keyword(s: &str) -> Self {
        match s {
            "micro" | "min" => DisplayBuffer::Micro,
            "small" => DisplayBuffer::Small,
            "max" => DisplayBuffer::Max,
            _ => DisplayBuffer::Optimal,
        }
    }
}

/// Hardware hints from `<config>`. The engine only records them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigHints {
    /// `None` when no `<display>` tag was given.
    pub display_buffer: Option<DisplayBuffer>,
    /// `Some(mode)` when `<network>` is present; mode may be empty.
    pub network: Option<String>,
}

/// A periodic host call declared with `<timer interval call>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    pub interval_ms: i32,
    pub callback: String,
}

/// Source of the app script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Lowercased `language` attribute.
    pub language: String,
    pub code: String,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            language: "lua".into(),
            code: String::new(),
        }
    }
}

/// Everything the head sections declare besides state and styles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadData {
    pub meta: AppMeta,
    pub config: ConfigHints,
    pub timers: Vec<Timer>,
    pub script: Script,
    /// Initial navigation target without its leading `/`.
    pub default_page: String,
}

/// Parse the head sections of `app` (the `<app>` element, or the document
/// root when there is none).
///
/// `<state>` variables are defined in `store` and `<style>` text is appended
/// to `stylesheet`.
pub fn parse_head(
    app: &ParsedElement,
    store: &mut Store,
    stylesheet: &mut Stylesheet,
    system_icon_dir: &str,
) -> HeadData {
    let mut head = HeadData::default();

    if app.tag == "app" {
        if app.has_attr("version") && !app.attr("version").is_empty() {
            head.meta.version = app.attr("version").to_string();
        }
        head.meta.os = app.attr("os").to_string();
        head.meta.readonly = matches!(app.attr("readonly"), "true" | "1");
        head.meta.icon = resolve_icon(app.attr("icon"), system_icon_dir);
    }

    if let Some(state) = app.find("state") {
        parse_state(state, store);
    }

    for timer in app.find_all("timer") {
        let interval_ms = timer.attr_int("interval", 0);
        let callback = timer.attr("call");
        if interval_ms > 0 && !callback.is_empty() {
            debug!(interval_ms, callback, "timer");
            head.timers.push(Timer {
                interval_ms,
                callback: callback.to_string(),
            });
        }
    }

    match app.find("script") {
        Some(script) => {
            head.script = Script {
                language: script.attr_or("language", "lua").to_lowercase(),
                code: script.text.trim_start().to_string(),
            };
            debug!(language = %head.script.language, bytes = head.script.code.len(), "script");
        }
        None => warn!("no <script> section"),
    }

    if let Some(style) = app.find("style") {
        if !style.text.is_empty() {
            stylesheet.parse(&style.text);
            debug!(rules = stylesheet.len(), "style");
        }
    }

    if let Some(config) = app.find("config") {
        head.config = parse_config(config);
    }

    if let Some(ui) = app.find("ui") {
        let default = ui.attr("default");
        head.default_page = default.strip_prefix('/').unwrap_or(default).to_string();
    }

    head
}

fn parse_state(state: &ParsedElement, store: &mut Store) {
    for var in &state.children {
        let name = var.attr("name");
        if name.is_empty() || !VarType::is_known(&var.tag) {
            continue;
        }
        let var_type = VarType::from_name(&var.tag);
        store.define_str(name, var_type, var.attr("default"));
        debug!(name, %var_type, "state");
    }
}

fn parse_config(config: &ParsedElement) -> ConfigHints {
    ConfigHints {
        display_buffer: config
            .find("display")
            .map(|d| DisplayBuffer::from_keyword(d.attr("buffer"))),
        network: config.find("network").map(|n| n.attr("mode").to_string()),
    }
}

/// `system:name` → `<dir>/name.png`; anything else verbatim.
pub fn resolve_icon(icon: &str, system_icon_dir: &str) -> String {
    match icon.strip_prefix("system:") {
        Some(name) => format!("{}/{name}.png", system_icon_dir.trim_end_matches('/')),
        None => icon.to_string(),
    }
}
