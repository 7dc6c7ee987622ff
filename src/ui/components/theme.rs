//! Theme switcher component for light/dark/black modes.

use dioxus::prelude::*;

/// Theme switcher with light, dark, and black (OLED) options. The black
/// variant exists for wall-mounted always-on tablets.
/// Note: buttons carry raw HTML onclick attributes; SSR emits no event
/// listeners of its own, so the page scripts do the wiring.
#[component]
pub fn ThemeSwitcher() -> Element {
    rsx! {
        div {
            class: "theme-switcher",
            // dangerous_inner_html because Dioxus SSR doesn't support
            // string event handlers directly
            dangerous_inner_html: r#"
                <button data-theme="light" onclick="setTheme('light')">Light</button>
                <button data-theme="dark" onclick="setTheme('dark')">Dark</button>
                <button data-theme="black" onclick="setTheme('black')">Black</button>
            "#
        }
    }
}

/// Runs from the document head so the stored theme lands before first
/// paint. Black rides on Pico's dark theme plus a data-variant attribute.
pub const THEME_SCRIPT: &str = r#"
function applyTheme(t) {
    document.documentElement.setAttribute('data-theme', t === 'black' ? 'dark' : t);
    if (t === 'black') {
        document.documentElement.setAttribute('data-variant', 'black');
    } else {
        document.documentElement.removeAttribute('data-variant');
    }
}
applyTheme(localStorage.getItem('homegrid-theme') || 'dark');
"#;

/// Runs from the body once the switcher buttons exist.
pub const THEME_FUNCTIONS: &str = r#"
function setTheme(t) {
    applyTheme(t);
    localStorage.setItem('homegrid-theme', t);
    markActiveTheme();
}
function markActiveTheme() {
    const active = document.documentElement.getAttribute('data-variant') === 'black'
        ? 'black'
        : (document.documentElement.getAttribute('data-theme') || 'dark');
    for (const btn of document.querySelectorAll('.theme-switcher button')) {
        btn.classList.toggle('active', btn.dataset.theme === active);
    }
}
markActiveTheme();
"#;
