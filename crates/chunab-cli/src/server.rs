//! HTTP surface: current snapshot, live snapshot stream, roster, and seats.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{Json, Router};
use chunab_core::{ConstituencyKey, KeyError, PartyKey, SymbolFile, tally_key};
use chunab_roster::{CandidateIndex, CandidateRecord, RosterSummary, Seat};
use chunab_store::{LiveHub, Snapshot, SubscriberId};
use futures::Stream;
use serde::Serialize;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error};

const KEEP_ALIVE: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<LiveHub>,
    pub roster: Arc<CandidateIndex>,
    pub parties: Arc<Vec<PartyInfo>>,
    pub polling: bool,
}

impl AppState {
    pub fn new(hub: Arc<LiveHub>, roster: CandidateIndex, symbols: &SymbolFile, polling: bool) -> Self {
        Self {
            hub,
            roster: Arc::new(roster),
            parties: Arc::new(party_table(symbols)),
            polling,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PartyInfo {
    pub key: PartyKey,
    pub name: &'static str,
    pub symbol: Option<String>,
}

fn party_table(symbols: &SymbolFile) -> Vec<PartyInfo> {
    PartyKey::ALL
        .into_iter()
        .map(|party| PartyInfo {
            key: party,
            name: party.display_name(),
            symbol: symbols.symbol_for(party).map(str::to_string),
        })
        .collect()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/snapshot", get(snapshot))
        .route("/api/stream", get(stream))
        .route("/api/candidates", get(candidates))
        .route("/api/seats/:constituency", get(seat))
        .route("/api/parties", get(parties))
        .route("/api/health", get(health))
        .with_state(state)
}

// ── Handlers ──

async fn snapshot(State(state): State<AppState>) -> Json<Arc<Snapshot>> {
    Json(state.hub.current())
}

/// Removes the subscriber when the response stream is dropped, which is how
/// a client disconnect surfaces.
struct Subscription {
    hub: Arc<LiveHub>,
    id: SubscriberId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.hub.unsubscribe(self.id) {
            debug!(subscriber = ?self.id, "stream closed");
        }
    }
}

async fn stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)> {
    let (id, rx) = state
        .hub
        .subscribe_latest()
        .map_err(|e| {
            error!(error = %e, "failed to open snapshot stream");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    let subscription = Subscription {
        hub: Arc::clone(&state.hub),
        id,
    };

    // Yields the current snapshot first, then the newest one after each
    // publish; a slow client skips straight to the latest.
    let events = WatchStream::new(rx).map(move |frame| {
        let _held = &subscription;
        Ok(Event::default().data(&*frame))
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE).text("ping")))
}

#[derive(Serialize)]
struct CandidatesResponse<'a> {
    summary: RosterSummary,
    districts: Vec<DistrictEntry<'a>>,
}

#[derive(Serialize)]
struct DistrictEntry<'a> {
    district: &'a str,
    /// `None` for districts outside the canonical table.
    province: Option<&'static str>,
    seats: &'a [Seat],
}

async fn candidates(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let roster = &state.roster;
    let body = CandidatesResponse {
        summary: roster.summary(),
        districts: roster
            .districts()
            .iter()
            .map(|(district, seats)| DistrictEntry {
                district: district.as_str(),
                province: district.province(),
                seats,
            })
            .collect(),
    };
    // Borrows the shared index, so encode before `state` is dropped.
    serde_json::to_value(&body)
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[derive(Serialize)]
struct SeatResponse<'a> {
    constituency: String,
    label: &'a str,
    province: &'a str,
    records: Vec<CandidateRecord<'a>>,
    votes: Vec<(PartyKey, u64)>,
}

/// One seat by `District-N` key with its nominees and current live votes.
async fn seat(
    State(state): State<AppState>,
    Path(constituency): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let key: ConstituencyKey = constituency
        .parse()
        .map_err(|e: KeyError| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let seat = state
        .roster
        .seat(&key)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no seat {key}")))?;
    let records = PartyKey::ALL
        .into_iter()
        .filter_map(|party| state.roster.record(&key, party))
        .collect();

    let current = state.hub.current();
    let votes = PartyKey::ALL
        .into_iter()
        .filter_map(|party| {
            current
                .votes
                .get(&tally_key(&key, party))
                .map(|v| (party, v))
        })
        .collect();
    let body = SeatResponse {
        constituency: key.to_string(),
        label: &seat.label,
        province: &seat.province,
        records,
        votes,
    };
    serde_json::to_value(&body)
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn parties(State(state): State<AppState>) -> Json<Arc<Vec<PartyInfo>>> {
    Json(Arc::clone(&state.parties))
}

#[derive(Serialize)]
struct Health {
    version: &'static str,
    polling: bool,
    subscribers: usize,
    fetched_at: String,
    tally_keys: usize,
    roster: RosterSummary,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let current = state.hub.current();
    Json(Health {
        version: env!("CARGO_PKG_VERSION"),
        polling: state.polling,
        subscribers: state.hub.subscriber_count(),
        fetched_at: current.fetched_at.to_rfc3339(),
        tally_keys: current.votes.len(),
        roster: state.roster.summary(),
    })
}
