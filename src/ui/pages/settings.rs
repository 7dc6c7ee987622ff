//! Settings page component.
//!
//! Shows a service status overview and a raw JSON editor for the whole
//! board, which is how items are added and edited. The editor posts the
//! full layout and surfaces validation errors from the server.

use dioxus::prelude::*;

use crate::ui::components::Layout;

/// Client-side JavaScript for the Settings page.
const SETTINGS_SCRIPT: &str = r#"

// Service status
async function loadStatus() {
    const tbody = document.getElementById('status-table');
    try {
        const s = await fetch('/status').then(r => r.json());
        tbody.innerHTML = `
            <tr><td>Version</td><td>${esc(s.version)} (${esc(s.git_sha)})</td></tr>
            <tr><td>Board</td><td><code>${esc(s.board_sha)}</code></td></tr>
            <tr><td>Items</td><td>${s.desktop_items} desktop / ${s.mobile_items} mobile</td></tr>
            <tr><td>Drag session</td><td class="${s.drag_active ? 'status-ok' : ''}">${s.drag_active ? 'active' : 'idle'}</td></tr>
            <tr><td>Event subscribers</td><td>${s.bus_subscribers}</td></tr>
        `;
    } catch (e) {
        tbody.innerHTML = `<tr><td colspan="2" class="status-err">Error: ${esc(e.message)}</td></tr>`;
    }
}

// Board editor
async function loadEditor() {
    const ta = document.getElementById('board-json');
    try {
        const data = await fetch('/api/board').then(r => r.json());
        ta.value = JSON.stringify(data.board, null, 2);
        document.getElementById('editor-sha').textContent = data.board_sha;
    } catch (e) {
        setResult('Failed to load board: ' + e.message, false);
    }
}

async function saveBoard() {
    const ta = document.getElementById('board-json');
    let board = null;
    try { board = JSON.parse(ta.value); } catch (e) { setResult('Invalid JSON: ' + e.message, false); return; }
    try {
        const res = await fetch('/api/board', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify(board)
        });
        const out = await res.json();
        if (res.ok) {
            setResult('Saved as ' + out.board_sha + (out.saved ? '' : ' (disk write failed)'), true);
            document.getElementById('editor-sha').textContent = out.board_sha;
            loadStatus();
        } else {
            setResult(out.error || 'Rejected', false);
        }
    } catch (e) {
        setResult('Save failed: ' + e.message, false);
    }
}

function setResult(msg, ok) {
    const el = document.getElementById('save-result');
    el.textContent = msg;
    el.className = ok ? 'status-ok' : 'status-err';
}

document.getElementById('board-save').addEventListener('click', saveBoard);
document.getElementById('board-reload').addEventListener('click', loadEditor);

loadStatus();
loadEditor();

// SSE for real-time updates (no polling jitter)
const es = new EventSource('/events');
es.onmessage = (e) => {
    try {
        const event = JSON.parse(e.data);
        if (['BoardSaved', 'BoardReplaced', 'BoardSaveFailed'].includes(event.type)) {
            loadStatus();
        }
    } catch (err) { console.error('SSE parse error:', err); }
};
es.onerror = () => {
    console.warn('SSE disconnected, falling back to polling');
    es.close();
    setInterval(loadStatus, 10000);
};
"#;

/// Settings page component.
#[component]
pub fn SettingsPage() -> Element {
    rsx! {
        Layout {
            title: "Settings".to_string(),
            nav_active: "settings".to_string(),
            scripts: Some(SETTINGS_SCRIPT.to_string()),

            h1 { "Settings" }

            // Service status section
            section { id: "service-status",
                hgroup {
                    h2 { "Service" }
                    p { "Runtime status of the board server" }
                }
                article {
                    table {
                        tbody { id: "status-table",
                            tr {
                                td { colspan: "2", "Loading..." }
                            }
                        }
                    }
                }
            }

            // Board editor section
            section { id: "board-editor",
                hgroup {
                    h2 { "Board Layout" }
                    p { "Edit the raw board JSON to add, remove, or configure items" }
                }
                article {
                    textarea {
                        id: "board-json",
                        rows: "20",
                        spellcheck: "false",
                        style: "font-family:monospace;font-size:0.8rem;",
                        aria_label: "Board JSON"
                    }
                    div { class: "controls",
                        button { id: "board-save", "Save" }
                        button { id: "board-reload", class: "secondary", "Reload" }
                    }
                    p {
                        style: "margin-top:0.5rem;",
                        small {
                            "Stored as "
                            code { id: "editor-sha", "-" }
                            " "
                        }
                        span { id: "save-result" }
                    }
                    p {
                        small { "Duplicate ids and malformed items are rejected with the reason; the previous layout stays in effect." }
                    }
                }
            }
        }
    }
}
