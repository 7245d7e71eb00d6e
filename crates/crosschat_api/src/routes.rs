use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use crosschat_crossword::{ClueId, Puzzle, SolveState};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, Result};
use crate::events::Event;
use crate::sources::{self, PuzzleSource};
use crate::{AppState, repo, sse};

/// Answer bodies larger than this are refused with 413
const MAX_ANSWER_BODY: usize = 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/crossword", get(list_channels))
        .route("/crossword/:channel", put(select_puzzle))
        .route("/crossword/:channel/setting/:name", put(update_setting))
        .route("/crossword/:channel/status", put(toggle_status))
        .route(
            "/crossword/:channel/answer/:clue",
            put(apply_answer).layer(DefaultBodyLimit::max(MAX_ANSWER_BODY)),
        )
        .route("/crossword/:channel/show/:clue", get(show_clue))
        .route("/crossword/:channel/events", get(sse::channel_events))
        .route("/channels", get(sse::active_channels))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_channels(State(app): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(repo::active_channels(app.store.as_ref())?))
}

/// Body of `PUT /crossword/{channel}`: exactly one source must be named
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SelectPuzzle {
    new_york_times_date: Option<NaiveDate>,
    wall_street_journal_date: Option<NaiveDate>,
    puz_file_bytes: Option<String>,
}

async fn select_puzzle(
    State(app): State<AppState>,
    Path(channel): Path<String>,
    body: String,
) -> Result<StatusCode> {
    let request: SelectPuzzle = serde_json::from_str(&body)
        .map_err(|err| ApiError::BadRequest(format!("cannot parse request: {err}")))?;

    let puzzle = match (
        request.new_york_times_date,
        request.wall_street_journal_date,
        request.puz_file_bytes,
    ) {
        (Some(date), None, None) => {
            fetch_dated(app.sources.new_york_times.as_deref(), "New York Times", date).await?
        }
        (None, Some(date), None) => {
            fetch_dated(
                app.sources.wall_street_journal.as_deref(),
                "Wall Street Journal",
                date,
            )
            .await?
        }
        (None, None, Some(encoded)) => sources::puzzle_from_bytes(&encoded)?,
        _ => {
            return Err(ApiError::BadRequest(
                "exactly one puzzle source must be given".to_string(),
            ));
        }
    };

    tracing::info!(%channel, title = %puzzle.title, "puzzle selected");

    let state = SolveState::new(puzzle);
    repo::save_state(app.store.as_ref(), &channel, &state)?;
    app.registry.publish(&channel, &Event::state(&state)?);

    Ok(StatusCode::OK)
}

async fn fetch_dated(
    source: Option<&dyn PuzzleSource>,
    name: &str,
    date: NaiveDate,
) -> Result<Puzzle> {
    let source =
        source.ok_or_else(|| ApiError::BadRequest(format!("no {name} source is configured")))?;

    Ok(source.fetch(date).await?)
}

async fn update_setting(
    State(app): State<AppState>,
    Path((channel, name)): Path<(String, String)>,
    body: String,
) -> Result<StatusCode> {
    let value: serde_json::Value = serde_json::from_str(&body)
        .map_err(|err| ApiError::BadRequest(format!("cannot parse setting value: {err}")))?;

    let store = app.store.as_ref();

    let mut settings = repo::load_settings(store, &channel)?;
    settings.apply(&name, value.clone())?;
    repo::save_settings(store, &channel, &settings)?;

    app.registry.publish(&channel, &Event::settings(&settings)?);

    // Turning only-correct on retroactively scrubs wrong letters
    if name == "only_allow_correct_answers" && value == serde_json::Value::Bool(true) {
        if let Some(mut state) = repo::load_state(store, &channel)? {
            state.clear_incorrect_cells();
            repo::save_state(store, &channel, &state)?;
            app.registry.publish(&channel, &Event::state(&state)?);
        }
    }

    Ok(StatusCode::OK)
}

async fn toggle_status(
    State(app): State<AppState>,
    Path(channel): Path<String>,
) -> Result<StatusCode> {
    let store = app.store.as_ref();

    let mut state = repo::load_state(store, &channel)?.ok_or(ApiError::NoState)?;
    let status = state.toggle_status()?;
    repo::save_state(store, &channel, &state)?;

    tracing::info!(%channel, %status, "status toggled");
    app.registry.publish(&channel, &Event::state(&state)?);

    Ok(StatusCode::OK)
}

async fn apply_answer(
    State(app): State<AppState>,
    Path((channel, clue)): Path<(String, String)>,
    body: String,
) -> Result<StatusCode> {
    let answer: String = serde_json::from_str(&body)
        .map_err(|err| ApiError::BadRequest(format!("the answer must be a JSON string: {err}")))?;

    let store = app.store.as_ref();

    let settings = repo::load_settings(store, &channel)?;
    let mut state = repo::load_state(store, &channel)?.ok_or(ApiError::NoState)?;

    state.apply_answer(&clue, &answer, settings.only_allow_correct_answers)?;
    repo::save_state(store, &channel, &state)?;

    app.registry.publish(&channel, &Event::state(&state)?);

    Ok(StatusCode::OK)
}

async fn show_clue(
    State(app): State<AppState>,
    Path((channel, clue)): Path<(String, String)>,
) -> Result<StatusCode> {
    let id: ClueId = clue.parse().map_err(ApiError::Solve)?;

    app.registry.publish(&channel, &Event::show_clue(&id.to_string()));

    Ok(StatusCode::OK)
}
