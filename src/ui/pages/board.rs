//! Board page: the item grid with drag and drop editing.
//!
//! The page renders an empty shell; the script below loads the board and
//! grid metrics, draws the cells, and drives the server-side drag session
//! over HTTP. On every throttled pointer move it measures the live cell
//! rects with getBoundingClientRect and posts them together with the
//! dragged rect, then applies the hover verdict (target ring, eject
//! banner, placeholder cell) that comes back.

use dioxus::prelude::*;

use crate::ui::components::Layout;

/// Client-side JavaScript for the board page.
const BOARD_SCRIPT: &str = r#"
let config = null;
let data = null;
let viewport = window.matchMedia('(max-width: 768px)').matches ? 'mobile' : 'desktop';
let editMode = false;
let openGroup = null;
let pending = null;
let drag = null;
let ghost = null;
let suppressClick = false;
let es = null;
let pollTimer = null;

const grid = document.getElementById('grid');
const panel = document.getElementById('group-panel');
const alertBox = document.getElementById('save-alert');

function items() { return (data && data.board[viewport]) || []; }

// ============================================================
// Rendering
// ============================================================

function applyGridMetrics() {
    const cols = viewport === 'mobile' ? config.grid.mobile_columns : config.grid.desktop_columns;
    grid.style.setProperty('--cols', cols);
    grid.style.setProperty('--cell-px', config.grid.cell_px + 'px');
    grid.style.setProperty('--gap-px', config.grid.gap_px + 'px');
}

function actionButtons(kind) {
    if (!editMode) return '';
    if (kind === 'member') {
        return '<span class="actions"><button data-act="delete-member" title="Remove">&#10005;</button></span>';
    }
    return '<span class="actions">' +
        '<button data-act="duplicate" title="Duplicate">&#10697;</button>' +
        '<button data-act="delete" title="Delete">&#10005;</button></span>';
}

function cellHtml(item) {
    const t = item.config.type;
    if (t === 'group') {
        const g = item.config.options;
        const full = g.items.length >= g.max_items;
        return `<div class="cell group" data-id="${escAttr(item.id)}">${actionButtons('item')}` +
            `<strong>${esc(item.label)}</strong>` +
            `<small>${g.items.length}/${g.max_items}${full ? ' full' : ''}</small></div>`;
    }
    if (t === 'widget') {
        return `<div class="cell widget" data-id="${escAttr(item.id)}">${actionButtons('item')}` +
            `<strong>${esc(item.label)}</strong><small>${esc(item.config.options.widget)}</small></div>`;
    }
    const label = item.show_label ? `<strong>${esc(item.label)}</strong>` : '';
    return `<div class="cell shortcut" data-id="${escAttr(item.id)}" data-url="${escAttr(item.url || '')}">` +
        `${actionButtons('item')}${label}</div>`;
}

function renderBoard() {
    const list = items();
    grid.innerHTML = list.length
        ? list.map(cellHtml).join('')
        : '<article style="grid-column: 1 / -1;">Empty board. Paste a layout in Settings.</article>';
    grid.removeAttribute('aria-busy');
    renderGroupPanel();
    updateToolbar();
}

function renderGroupPanel() {
    if (!openGroup) { panel.style.display = 'none'; panel.innerHTML = ''; return; }
    const item = items().find(i => i.id === openGroup && i.config.type === 'group');
    if (!item) { openGroup = null; panel.style.display = 'none'; panel.innerHTML = ''; return; }
    const g = item.config.options;
    const members = g.items.map(m =>
        `<div class="cell member" data-member-id="${escAttr(m.id)}" data-group-id="${escAttr(item.id)}"` +
        ` data-url="${escAttr(m.url || '')}">${actionButtons('member')}` +
        `<strong>${esc(m.name)}</strong></div>`).join('');
    panel.innerHTML = '<article>' +
        `<header><strong>${esc(item.label)}</strong><button data-act="close-panel">&#10005;</button></header>` +
        `<div class="eject-banner" id="eject-banner" style="display:none">Release on the board to move out of ${esc(item.label)}</div>` +
        `<div class="member-grid">${members || '<small>Empty group</small>'}</div>` +
        `<footer><small>${g.items.length}/${g.max_items}</small></footer></article>`;
    panel.style.display = 'flex';
}

function updateToolbar() {
    document.getElementById('vp-desktop').classList.toggle('active', viewport === 'desktop');
    document.getElementById('vp-mobile').classList.toggle('active', viewport === 'mobile');
    document.getElementById('edit-toggle').classList.toggle('active', editMode);
}

async function loadConfig() {
    config = await fetch('/api/config').then(r => r.json());
    applyGridMetrics();
}

async function loadBoard() {
    try {
        data = await fetch('/api/board').then(r => r.json());
        renderBoard();
    } catch (e) {
        grid.innerHTML = '<article class="status-err">Failed to load board</article>';
        grid.removeAttribute('aria-busy');
    }
}

// ============================================================
// Clicks: navigation, group panel, edit actions
// ============================================================

document.addEventListener('click', async (e) => {
    const btn = e.target.closest('button[data-act]');
    if (btn) {
        e.preventDefault();
        const act = btn.dataset.act;
        if (act === 'close-panel') { openGroup = null; renderGroupPanel(); return; }
        if (act === 'dismiss-alert') { alertBox.innerHTML = ''; return; }
        const cell = btn.closest('[data-id],[data-member-id]');
        if (!cell) return;
        let body = null;
        if (act === 'delete') {
            body = { viewport, action: 'delete-top-level', item_id: cell.dataset.id };
        } else if (act === 'duplicate') {
            body = { viewport, action: 'duplicate', item_id: cell.dataset.id };
        } else if (act === 'delete-member') {
            body = { viewport, action: 'delete-group-item', group_id: cell.dataset.groupId, member_id: cell.dataset.memberId };
        }
        if (body) { await postJson('/api/board/action', body); await loadBoard(); }
        return;
    }
    if (drag || suppressClick) return;
    const member = e.target.closest('[data-member-id]');
    if (member) {
        if (!editMode && member.dataset.url) window.open(member.dataset.url, '_blank');
        return;
    }
    const cell = e.target.closest('.cell[data-id]');
    if (!cell) return;
    const item = items().find(i => i.id === cell.dataset.id);
    if (!item) return;
    if (item.config.type === 'group') { openGroup = item.id; renderGroupPanel(); return; }
    if (!editMode && item.url) window.open(item.url, '_blank');
});

document.getElementById('vp-desktop').addEventListener('click', () => setViewport('desktop'));
document.getElementById('vp-mobile').addEventListener('click', () => setViewport('mobile'));
document.getElementById('edit-toggle').addEventListener('click', () => { editMode = !editMode; renderBoard(); });

function setViewport(v) {
    if (viewport === v) return;
    viewport = v;
    openGroup = null;
    applyGridMetrics();
    renderBoard();
}

// ============================================================
// Drag session
// ============================================================

function pageRect(el) {
    const r = el.getBoundingClientRect();
    return { x: r.left + window.scrollX, y: r.top + window.scrollY, width: r.width, height: r.height };
}

function measureCells() {
    const cells = [];
    document.querySelectorAll('.board-grid .cell[data-id], .group-panel .cell[data-member-id]').forEach(el => {
        cells.push({ id: el.dataset.id || el.dataset.memberId, rect: pageRect(el) });
    });
    return cells;
}

document.addEventListener('pointerdown', (e) => {
    if (drag || pending || !config) return;
    if (e.pointerType === 'mouse' && e.button !== 0) return;
    if (e.target.closest('button')) return;
    const el = e.target.closest('.group-panel .cell[data-member-id], .board-grid .cell[data-id]');
    if (!el || el.classList.contains('placeholder')) return;
    const delay = e.pointerType === 'touch' ? config.activation.touch_delay_ms : config.activation.pointer_delay_ms;
    pending = { el, pointerId: e.pointerId, x: e.clientX, y: e.clientY, armed: delay === 0, timer: null };
    if (delay > 0) {
        pending.timer = setTimeout(() => { if (pending) pending.armed = true; }, delay);
    }
});

document.addEventListener('pointermove', (e) => {
    if (pending && e.pointerId === pending.pointerId) {
        const dist = Math.hypot(e.clientX - pending.x, e.clientY - pending.y);
        if (!pending.armed) {
            // Movement during the hold window is a scroll, not a drag
            if (dist > 8) cancelPending();
            return;
        }
        if (dist > 5) {
            const p = pending;
            pending = null;
            beginDrag(p, e);
        }
        return;
    }
    if (drag && e.pointerId === drag.pointerId) onDragMove(e);
});

document.addEventListener('pointerup', (e) => {
    if (pending && e.pointerId === pending.pointerId) cancelPending();
    else if (drag && e.pointerId === drag.pointerId) onDragEnd(e);
});

document.addEventListener('pointercancel', (e) => {
    if (pending && e.pointerId === pending.pointerId) cancelPending();
    else if (drag && e.pointerId === drag.pointerId) cancelDrag();
});

document.addEventListener('keydown', (e) => {
    if (e.key !== 'Escape') return;
    if (drag) { cancelDrag(); return; }
    if (openGroup) { openGroup = null; renderGroupPanel(); }
});

function cancelPending() {
    if (!pending) return;
    if (pending.timer) clearTimeout(pending.timer);
    pending = null;
}

async function beginDrag(p, e) {
    const el = p.el;
    const isMember = !!el.dataset.memberId;
    const body = isMember
        ? { viewport, item_id: el.dataset.memberId, origin_group: el.dataset.groupId }
        : { viewport, item_id: el.dataset.id };
    const res = await postJson('/api/session/start', body);
    if (!res.ok) return;
    const info = await res.json();
    const r = el.getBoundingClientRect();
    drag = {
        pointerId: p.pointerId,
        id: isMember ? el.dataset.memberId : el.dataset.id,
        originGroup: isMember ? el.dataset.groupId : null,
        kind: info.drag_kind,
        el,
        dx: p.x - r.left,
        dy: p.y - r.top,
        lastHover: 0,
        inFlight: false,
        ejected: false,
    };
    ghost = el.cloneNode(true);
    ghost.classList.remove('drag-source');
    ghost.classList.add('drag-ghost');
    ghost.style.width = r.width + 'px';
    ghost.style.height = r.height + 'px';
    document.body.appendChild(ghost);
    moveGhost(e.clientX, e.clientY);
    el.classList.add('drag-source');
    document.body.classList.add('drag-lock');
}

function moveGhost(cx, cy) {
    ghost.style.left = (cx - drag.dx) + 'px';
    ghost.style.top = (cy - drag.dy) + 'px';
}

function onDragMove(e) {
    e.preventDefault();
    moveGhost(e.clientX, e.clientY);
    const now = performance.now();
    if (drag.inFlight || now - drag.lastHover < 40) return;
    drag.lastHover = now;
    sendHover();
}

async function sendHover() {
    if (!drag) return;
    drag.inFlight = true;
    try {
        const body = { viewport, dragged: pageRect(ghost), cells: measureCells(), slot: currentSlot() };
        const res = await postJson('/api/session/hover', body);
        if (res.ok && drag) applyHover(await res.json());
    } finally {
        if (drag) drag.inFlight = false;
    }
}

function currentSlot() {
    if (!drag || !drag.originGroup || !drag.ejected) return null;
    const origin = document.querySelector(`.board-grid .cell[data-id="${drag.originGroup}"]`);
    if (!origin || !ghost) return null;
    const o = origin.getBoundingClientRect();
    const g = ghost.getBoundingClientRect();
    return (g.left + g.width / 2) < (o.left + o.width / 2) ? 'before' : 'next';
}

function applyHover(resp) {
    if (!drag) return;
    document.querySelectorAll('.drop-hover, .group-hover').forEach(el => el.classList.remove('drop-hover', 'group-hover'));
    if (resp.target_id && resp.target_id !== drag.id) {
        const el = document.querySelector(
            `.cell[data-id="${resp.target_id}"], .cell[data-member-id="${resp.target_id}"]`);
        if (el) el.classList.add(resp.target_is_group ? 'group-hover' : 'drop-hover');
    }
    if (drag.originGroup) {
        const banner = document.getElementById('eject-banner');
        if (banner) banner.style.display = resp.ejected ? '' : 'none';
        if (resp.ejected && !drag.ejected) window.scrollTo({ top: 0, behavior: 'smooth' });
        drag.ejected = resp.ejected;
        renderPlaceholder(resp.placeholder_index);
    }
}

function renderPlaceholder(index) {
    const existing = grid.querySelector('.cell.placeholder');
    if (existing) existing.remove();
    if (index === null || index === undefined) return;
    const ph = document.createElement('div');
    ph.className = 'cell placeholder';
    ph.dataset.id = '__placeholder__';
    ph.innerHTML = '<small>Move here</small>';
    grid.insertBefore(ph, grid.children[index] || null);
}

function panelHit(cx, cy) {
    if (panel.style.display === 'none') return false;
    const card = panel.querySelector('article');
    if (!card) return false;
    const r = card.getBoundingClientRect();
    return cx >= r.left && cx <= r.right && cy >= r.top && cy <= r.bottom;
}

function finishDragVisuals() {
    if (ghost) { ghost.remove(); ghost = null; }
    if (drag && drag.el) drag.el.classList.remove('drag-source');
    document.body.classList.remove('drag-lock');
    document.querySelectorAll('.drop-hover, .group-hover').forEach(el => el.classList.remove('drop-hover', 'group-hover'));
    const ph = grid.querySelector('.cell.placeholder');
    if (ph) ph.remove();
    const banner = document.getElementById('eject-banner');
    if (banner) banner.style.display = 'none';
    drag = null;
}

async function onDragEnd(e) {
    const d = drag;
    const inPanel = openGroup && d.kind === 'app-shortcut' && panelHit(e.clientX, e.clientY);
    finishDragVisuals();
    suppressClick = true;
    setTimeout(() => { suppressClick = false; }, 0);
    try {
        if (inPanel) await postJson('/api/group/drop', { viewport, group_id: openGroup });
        else await postJson('/api/session/end', { viewport });
    } finally {
        await loadBoard();
    }
}

async function cancelDrag() {
    if (!drag) return;
    finishDragVisuals();
    await postJson('/api/session/cancel');
    await loadBoard();
}

// ============================================================
// Live updates
// ============================================================

function handleEvent(ev) {
    if (!ev || !ev.type) return;
    if (ev.type === 'BoardSaved' || ev.type === 'BoardReplaced') {
        if (!drag && (!data || ev.payload.board_sha !== data.board_sha)) loadBoard();
    } else if (ev.type === 'BoardSaveFailed') {
        alertBox.innerHTML = '<article class="save-alert status-err">' +
            esc('Board save failed: ' + ev.payload.error) +
            ' <button data-act="dismiss-alert">Dismiss</button></article>';
    } else if (ev.type === 'ForceInactive') {
        if (drag) finishDragVisuals();
    }
}

function connectEvents() {
    try {
        es = new EventSource('/events');
        es.onopen = () => {
            if (pollTimer) { clearInterval(pollTimer); pollTimer = null; }
        };
        es.onmessage = (e) => {
            let ev = null;
            try { ev = JSON.parse(e.data); } catch (_) { return; }
            handleEvent(ev);
        };
        es.onerror = () => {
            es.close();
            es = null;
            if (!pollTimer) pollTimer = setInterval(loadBoard, 5000);
            setTimeout(connectEvents, 5000);
        };
    } catch (_) {
        if (!pollTimer) pollTimer = setInterval(loadBoard, 5000);
    }
}

(async function init() {
    await loadConfig();
    await loadBoard();
    connectEvents();
})();
"#;

/// Board page component.
#[component]
pub fn BoardPage() -> Element {
    rsx! {
        Layout {
            title: "Board".to_string(),
            nav_active: "board".to_string(),
            scripts: Some(BOARD_SCRIPT.to_string()),

            div { class: "board-toolbar",
                button { id: "vp-desktop", "Desktop" }
                button { id: "vp-mobile", "Mobile" }
                button { id: "edit-toggle", "Edit" }
            }
            div { id: "grid", class: "board-grid", aria_busy: "true" }
            div { id: "group-panel", class: "group-panel", style: "display:none" }
            div { id: "save-alert" }
        }
    }
}
