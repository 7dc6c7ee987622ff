//! Layout component wrapping all pages with Pico CSS and common elements.

use dioxus::prelude::*;

use super::nav::Nav;
use super::theme::{ThemeSwitcher, THEME_FUNCTIONS, THEME_SCRIPT};

/// Shared JavaScript utilities (XSS-safe escaping, JSON POST helper).
const SHARED_JS: &str = r#"
function esc(s) { return String(s || '').replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'})[c]); }
function escAttr(s) { return esc(s); }
async function postJson(url, body) {
    return fetch(url, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body)
    });
}
"#;

/// CSS styles for the application (extends Pico CSS).
const CUSTOM_STYLES: &str = r#"
:root { --pico-font-size: 15px; --cell-px: 100px; --gap-px: 16px; --cols: 8; }
.status-ok { color: var(--pico-ins-color); }
.status-err { color: var(--pico-del-color); }
small { color: var(--pico-muted-color); }
.controls { display: flex; gap: 0.5rem; margin-top: 0.5rem; }
.controls button { margin: 0; padding: 0.5rem 1rem; }
/* Board grid */
.board-toolbar { display: flex; gap: 0.5rem; align-items: center; margin-bottom: 1rem; flex-wrap: wrap; }
.board-toolbar button { margin: 0; padding: 0.25rem 0.75rem; font-size: 0.85rem; }
.board-toolbar button.active { background: var(--pico-primary-background); color: var(--pico-primary-inverse); }
.board-grid {
    display: grid;
    grid-template-columns: repeat(var(--cols), var(--cell-px));
    grid-auto-rows: var(--cell-px);
    gap: var(--gap-px);
    justify-content: center;
}
.cell {
    position: relative;
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    gap: 0.15rem;
    border: 1px solid var(--pico-muted-border-color);
    border-radius: 10px;
    background: var(--pico-card-background-color);
    cursor: grab;
    user-select: none;
    -webkit-user-select: none;
    touch-action: manipulation;
    overflow: hidden;
    text-align: center;
    padding: 0.25rem;
}
.cell strong { font-size: 0.8rem; line-height: 1.2; }
.cell small { font-size: 0.7rem; }
.cell.drag-source { opacity: 0.35; }
.cell.drop-hover { outline: 2px solid var(--pico-primary); outline-offset: 2px; }
.cell.group-hover { outline: 3px solid var(--pico-ins-color); outline-offset: 2px; }
.cell.placeholder { border-style: dashed; opacity: 0.6; cursor: default; }
.cell .actions { position: absolute; top: 2px; right: 2px; display: flex; gap: 2px; z-index: 2; }
.cell .actions button { margin: 0; padding: 0 0.35rem; font-size: 0.75rem; line-height: 1.4; }
.drag-ghost {
    position: fixed;
    pointer-events: none;
    z-index: 1000;
    opacity: 0.85;
    margin: 0;
}
body.drag-lock { overflow: hidden; touch-action: none; }
/* Group panel. The backdrop stays click-through so items can still be
   dragged from the board onto the open panel. */
.group-panel { position: fixed; inset: 0; z-index: 900; display: flex; align-items: center; justify-content: center; pointer-events: none; }
.group-panel article { margin: 0; max-width: 90vw; pointer-events: auto; box-shadow: 0 0 2rem rgba(0,0,0,.5); }
.group-panel header { display: flex; justify-content: space-between; align-items: center; gap: 1rem; margin-bottom: 0.5rem; }
.group-panel header button { margin: 0; padding: 0.1rem 0.5rem; }
.member-grid { display: grid; grid-template-columns: repeat(3, 90px); grid-auto-rows: 90px; gap: 0.75rem; }
.eject-banner { border: 1px dashed var(--pico-del-color); border-radius: 8px; padding: 0.4rem 0.75rem; margin-bottom: 0.5rem; font-size: 0.8rem; color: var(--pico-del-color); }
/* Save alert */
.save-alert { position: fixed; bottom: 1rem; right: 1rem; z-index: 1100; max-width: 24rem; margin: 0; }
/* Black theme (OLED) - extends dark theme */
[data-theme="dark"][data-variant="black"] {
    --pico-background-color: #000;
    --pico-card-background-color: #0a0a0a;
    --pico-card-sectioning-background-color: #0a0a0a;
    --pico-modal-overlay-background-color: rgba(0,0,0,.9);
    --pico-primary-background: #1a1a1a;
    --pico-secondary-background: #111;
    --pico-contrast-background: #0a0a0a;
    --pico-muted-border-color: #1a1a1a;
    --pico-form-element-background-color: #0a0a0a;
    --pico-table-border-color: #1a1a1a;
}
/* Theme switcher */
.theme-switcher { display: flex; gap: 0.25rem; }
.theme-switcher button { padding: 0.25rem 0.5rem; font-size: 0.8rem; margin: 0; }
.theme-switcher button.active { background: var(--pico-primary-background); color: var(--pico-primary-inverse); }
"#;

#[derive(Props, Clone, PartialEq)]
pub struct LayoutProps {
    /// Page title (shown in browser tab)
    pub title: String,
    /// Active navigation item ID
    pub nav_active: String,
    /// Page content
    pub children: Element,
    /// Optional additional scripts to include
    #[props(default)]
    pub scripts: Option<String>,
}

/// Main layout component wrapping all pages.
#[component]
pub fn Layout(props: LayoutProps) -> Element {
    let version = env!("CARGO_PKG_VERSION");

    rsx! {
        head {
            meta { charset: "utf-8" }
            meta { name: "viewport", content: "width=device-width, initial-scale=1" }
            title { "{props.title} - Homegrid" }
            link {
                rel: "stylesheet",
                href: "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css"
            }
            style { {CUSTOM_STYLES} }
            script { dangerous_inner_html: THEME_SCRIPT }
            script { dangerous_inner_html: SHARED_JS }
        }
        body {
            header { class: "container",
                Nav { active: props.nav_active.clone() }
            }
            main { class: "container",
                {props.children}
            }
            footer {
                class: "container",
                style: "display:flex;justify-content:space-between;align-items:center;",
                small { "Homegrid v{version}" }
                ThemeSwitcher {}
            }
            script { dangerous_inner_html: THEME_FUNCTIONS }
            if let Some(scripts) = props.scripts {
                script { dangerous_inner_html: "{scripts}" }
            }
        }
    }
}
