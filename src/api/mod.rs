//! HTTP API handlers
//!
//! Two surfaces share these routes: the board page script, which drives
//! the drag session move-by-move, and anything else on the network that
//! wants to read or replace the board wholesale. Board mutations commit
//! to memory first and persist after; a failed save never rolls the
//! board back, it only raises `BoardSaveFailed` on the bus.

use crate::bus::{BoardEvent, SharedBus};
use crate::collision::TargetKind;
use crate::config::ClientConfig;
use crate::geometry::Rect;
use crate::layout::{find_group, find_item, Board, LayoutAction, LayoutStore, Viewport};
use crate::persist::{board_sha, BoardStore};
use crate::projector::{placeholder_index, PlaceholderSlot};
use crate::session::{targets_for_layout, DragEntity, DragSession};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: BoardStore,
    pub session: Arc<Mutex<DragSession>>,
    pub bus: SharedBus,
    pub client: ClientConfig,
}

impl AppState {
    pub fn new(
        store: BoardStore,
        session: DragSession,
        bus: SharedBus,
        client: ClientConfig,
    ) -> Self {
        Self {
            store,
            session: Arc::new(Mutex::new(session)),
            bus,
            client,
        }
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// General status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub git_sha: &'static str,
    pub board_sha: String,
    pub desktop_items: usize,
    pub mobile_items: usize,
    pub drag_active: bool,
    pub bus_subscribers: usize,
}

/// GET /status - Service health check
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let board = state.store.snapshot().await;
    let drag_active = state.session.lock().await.is_active();

    Json(StatusResponse {
        service: "homegrid",
        version: env!("CARGO_PKG_VERSION"),
        git_sha: env!("HOMEGRID_GIT_SHA"),
        board_sha: board_sha(&board),
        desktop_items: board.desktop.len(),
        mobile_items: board.mobile.len(),
        drag_active,
        bus_subscribers: state.bus.subscriber_count(),
    })
}

// =============================================================================
// Board handlers
// =============================================================================

/// Board snapshot envelope
#[derive(Serialize)]
pub struct BoardResponse {
    pub board: Board,
    pub board_sha: String,
}

/// GET /api/board - Current board with content hash
pub async fn board_handler(State(state): State<AppState>) -> Json<BoardResponse> {
    let board = state.store.snapshot().await;
    let board_sha = board_sha(&board);
    Json(BoardResponse { board, board_sha })
}

/// POST /api/board - Replace the whole board
///
/// The only write path for externally edited boards, so this is where
/// invariants are enforced: duplicate ids or overfull groups are
/// rejected with 400 before anything is swapped in.
pub async fn board_replace_handler(
    State(state): State<AppState>,
    Json(board): Json<Board>,
) -> impl IntoResponse {
    match state.store.replace(board).await {
        Ok(sha) => {
            state.bus.publish(BoardEvent::BoardReplaced {
                board_sha: sha.clone(),
            });
            let saved = save_board(&state).await;
            (
                StatusCode::OK,
                Json(serde_json::json!({"ok": true, "board_sha": sha, "saved": saved})),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// One board edit outside any drag (delete, duplicate, reorder)
#[derive(Deserialize)]
pub struct BoardActionRequest {
    pub viewport: Viewport,
    #[serde(flatten)]
    pub action: LayoutAction,
}

/// POST /api/board/action - Dispatch a single layout action
pub async fn board_action_handler(
    State(state): State<AppState>,
    Json(req): Json<BoardActionRequest>,
) -> impl IntoResponse {
    commit_action(&state, req.viewport, Some(req.action)).await
}

/// GET /api/config - The tuning, grid, and activation block the page
/// scripts run on
pub async fn config_handler(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(state.client.clone())
}

// =============================================================================
// Drag session handlers
// =============================================================================

/// Session start request body
#[derive(Deserialize)]
pub struct SessionStartRequest {
    pub viewport: Viewport,
    pub item_id: String,
    /// Set when a group member is dragged out of its open overlay.
    #[serde(default)]
    pub origin_group: Option<String>,
}

/// POST /api/session/start - Begin a drag for a board item or group member
pub async fn session_start_handler(
    State(state): State<AppState>,
    Json(req): Json<SessionStartRequest>,
) -> impl IntoResponse {
    let board = state.store.snapshot().await;
    let layout = board.layout(req.viewport);

    let entity = match &req.origin_group {
        Some(group_id) => find_group(layout, group_id)
            .and_then(|(_, group)| group.items.iter().find(|m| m.id == req.item_id))
            .map(|member| DragEntity::for_member(group_id.clone(), member)),
        None => find_item(layout, &req.item_id).map(DragEntity::for_item),
    };

    match entity {
        Some(entity) => {
            let kind = entity.kind;
            state.session.lock().await.start(entity);
            (
                StatusCode::OK,
                Json(serde_json::json!({"ok": true, "drag_kind": kind})),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Item not found: {}", req.item_id),
            }),
        )
            .into_response(),
    }
}

/// One cell rect as the page script measured it
#[derive(Deserialize)]
pub struct MeasuredCell {
    pub id: String,
    pub rect: Rect,
}

/// Session hover request body
#[derive(Deserialize)]
pub struct SessionHoverRequest {
    pub viewport: Viewport,
    pub dragged: Rect,
    pub cells: Vec<MeasuredCell>,
    /// Named insertion slot the pointer is over, if any.
    #[serde(default)]
    pub slot: Option<PlaceholderSlot>,
}

/// Session hover response
#[derive(Serialize)]
pub struct SessionHoverResponse {
    pub target_id: Option<String>,
    pub target_is_group: bool,
    pub ejected: bool,
    pub placeholder_index: Option<usize>,
}

/// POST /api/session/hover - Feed one pointer move through the resolver
pub async fn session_hover_handler(
    State(state): State<AppState>,
    Json(req): Json<SessionHoverRequest>,
) -> Json<SessionHoverResponse> {
    let board = state.store.snapshot().await;
    let layout = board.layout(req.viewport);
    let cells: Vec<(String, Rect)> = req.cells.into_iter().map(|c| (c.id, c.rect)).collect();
    let targets = targets_for_layout(layout, &cells);

    let mut session = state.session.lock().await;
    let resolved = session.update_hover(req.dragged, &targets, &state.client.tuning);
    let target_id = resolved.map(|t| t.id.clone());
    let target_is_group =
        resolved.is_some_and(|t| matches!(t.kind, TargetKind::GroupContainer { .. }));
    session.set_placeholder_slot(req.slot);

    let origin = session
        .entity()
        .and_then(|entity| entity.origin_group.clone());
    let placeholder_index = match (origin, session.placeholder_slot()) {
        (Some(origin), Some(slot)) => placeholder_index(layout, &origin, slot),
        _ => None,
    };

    Json(SessionHoverResponse {
        target_id,
        target_is_group,
        ejected: session.ejected_from_origin(),
        placeholder_index,
    })
}

/// Session end request body
#[derive(Deserialize)]
pub struct SessionEndRequest {
    pub viewport: Viewport,
}

/// POST /api/session/end - Drop: classify into one action, apply, persist
pub async fn session_end_handler(
    State(state): State<AppState>,
    Json(req): Json<SessionEndRequest>,
) -> impl IntoResponse {
    // Classify against the board the pointer was released over; the
    // action itself commits against the live board below.
    let mut scratch = LayoutStore::new(state.store.snapshot().await);
    let outcome = state.session.lock().await.end(&mut scratch, req.viewport);
    commit_action(&state, req.viewport, outcome.applied).await
}

/// POST /api/session/cancel - Abort the drag with zero mutation
pub async fn session_cancel_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.session.lock().await.force_inactive();
    Json(serde_json::json!({"ok": true}))
}

/// Explicit group drop request body
#[derive(Deserialize)]
pub struct GroupDropRequest {
    pub viewport: Viewport,
    pub group_id: String,
}

/// POST /api/group/drop - Commit a release straight onto an open group
pub async fn group_drop_handler(
    State(state): State<AppState>,
    Json(req): Json<GroupDropRequest>,
) -> impl IntoResponse {
    let mut scratch = LayoutStore::new(state.store.snapshot().await);
    let outcome =
        state
            .session
            .lock()
            .await
            .explicit_group_drop(&mut scratch, req.viewport, &req.group_id);
    commit_action(&state, req.viewport, outcome.applied).await
}

// =============================================================================
// Commit plumbing
// =============================================================================

/// Apply one action to the live board under the store's write lock and
/// answer for it. Edits racing in from other surfaces are composed
/// with, not overwritten; an action whose ids are gone by commit time
/// degrades to a no-change answer.
async fn commit_action(
    state: &AppState,
    viewport: Viewport,
    action: Option<LayoutAction>,
) -> Response {
    let Some(action) = action else {
        return no_change_response();
    };
    let sha = state
        .store
        .update(|board| {
            let mut layout_store = LayoutStore::new(std::mem::take(board));
            let changed = layout_store.dispatch(viewport, &action);
            *board = layout_store.into_board();
            changed
        })
        .await;
    match sha {
        Some(sha) => {
            let saved = save_board(state).await;
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "ok": true,
                    "changed": true,
                    "applied": action,
                    "board_sha": sha,
                    "saved": saved,
                })),
            )
                .into_response()
        }
        None => no_change_response(),
    }
}

fn no_change_response() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({"ok": true, "changed": false, "applied": null})),
    )
        .into_response()
}

/// Push the committed board through the gateway, reporting the outcome
/// on the bus. Returns whether the save landed.
async fn save_board(state: &AppState) -> bool {
    match state.store.persist().await {
        Ok(()) => {
            state.bus.publish(BoardEvent::BoardSaved {
                board_sha: state.store.sha().await,
            });
            true
        }
        Err(e) => {
            tracing::warn!("Board save failed: {e:#}");
            state.bus.publish(BoardEvent::BoardSaveFailed {
                error: e.to_string(),
            });
            false
        }
    }
}

// =============================================================================
// SSE Events
// =============================================================================

/// GET /events - Server-Sent Events stream
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.bus.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(_) => None,
        },
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
