//! Single binary web server: JSON API over one tournament session.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Configure with env: HOST, PORT, SNAPSHOT_PATH,
//! GROUPS_CSV, SCHEDULE_CSV, KNOCKOUT_CSV, PAIRING_TABLE, EXPORT_DIR.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use cup_tracker::import;
use cup_tracker::logic::{matchday_results, BEST_THIRDS};
use cup_tracker::{
    all_standings, champion, export, group_standings, pending_matches, select_qualifiers,
    Config, MatchId, PairingPolicy, SlotTable, SnapshotStore, Stage, TournamentError,
    TournamentSession,
};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// One session, one writer at a time.
type AppState = Data<RwLock<TournamentSession>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddTeamBody {
    group: String,
    country: String,
}

/// Goals as typed by the operator; validated server-side.
#[derive(Deserialize)]
struct ScoreBody {
    home: String,
    away: String,
}

#[derive(Deserialize)]
struct AdvanceBody {
    #[serde(default, rename = "override")]
    force: bool,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct TeamPath {
    id: String,
}

#[derive(Deserialize)]
struct GroupPath {
    group: String,
}

#[derive(Deserialize)]
struct StagePath {
    stage: String,
}

#[derive(Deserialize)]
struct MatchdayPath {
    matchday: u32,
}

fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::Incomplete { unplayed, .. } => HttpResponse::Conflict().json(serde_json::json!({
            "error": body["error"],
            "unplayed": unplayed,
            "hint": "advance again with override=true and a reason to proceed anyway",
        })),
        TournamentError::MatchNotFound(_) | TournamentError::TeamNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        TournamentError::Persistence(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn parse_stage(raw: &str) -> Result<Stage, HttpResponse> {
    raw.parse::<Stage>()
        .map_err(|e| HttpResponse::BadRequest().json(serde_json::json!({ "error": e })))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "cup-tracker",
    })
}

/// Full snapshot of the tournament.
#[get("/api/tournament")]
async fn api_get_tournament(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.tournament())
}

/// Problems found in the setup files. Check these before entering results.
#[get("/api/warnings")]
async fn api_import_warnings(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let warnings = &g.tournament().import_warnings;
    HttpResponse::Ok().json(serde_json::json!({ "clean": warnings.is_empty(), "warnings": warnings }))
}

#[get("/api/standings")]
async fn api_all_standings(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(all_standings(g.tournament()))
}

#[get("/api/groups/{group}/standings")]
async fn api_group_standings(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let t = g.tournament();
    if !t.groups().contains(&path.group) {
        return HttpResponse::NotFound().json(serde_json::json!({ "error": "No such group" }));
    }
    HttpResponse::Ok().json(group_standings(t, &path.group))
}

/// Group winners, runners-up and best thirds (flags a short thirds pool).
#[get("/api/qualifiers")]
async fn api_qualifiers(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let q = select_qualifiers(g.tournament());
    let short = q.best_thirds.len() < BEST_THIRDS;
    HttpResponse::Ok().json(serde_json::json!({ "qualifiers": q, "short_thirds_pool": short }))
}

#[get("/api/matches/pending")]
async fn api_pending_matches(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let t = g.tournament();
    let pending: Vec<_> = Stage::ALL
        .into_iter()
        .flat_map(|s| pending_matches(t, s))
        .collect();
    HttpResponse::Ok().json(pending)
}

#[get("/api/matchdays/{matchday}")]
async fn api_matchday(state: AppState, path: Path<MatchdayPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(matchday_results(g.tournament(), path.matchday))
}

#[get("/api/champion")]
async fn api_champion(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match champion(g.tournament()) {
        Some(team) => HttpResponse::Ok().json(team),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "Tournament not completed" })),
    }
}

/// Add a team to a group (before lock).
#[post("/api/teams")]
async fn api_add_team(state: AppState, body: Json<AddTeamBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.add_team(&body.group, &body.country) {
        Ok(_) => HttpResponse::Ok().json(g.tournament()),
        Err(e) => error_response(e),
    }
}

/// Remove a team (before lock, only while it has no matches).
#[delete("/api/teams/{id}")]
async fn api_remove_team(state: AppState, path: Path<TeamPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.remove_team(&path.id) {
        Ok(()) => HttpResponse::Ok().json(g.tournament()),
        Err(e) => error_response(e),
    }
}

/// Freeze teams and groups; schedules round-robin matches for groups without any.
#[post("/api/lock")]
async fn api_lock(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let result = g.schedule_round_robin().and_then(|_| g.lock());
    match result {
        Ok(()) => HttpResponse::Ok().json(g.tournament()),
        Err(e) => error_response(e),
    }
}

#[put("/api/matches/{id}/score")]
async fn api_record_score(state: AppState, path: Path<MatchPath>, body: Json<ScoreBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.record_score_text(path.id, &body.home, &body.away) {
        Ok(()) => HttpResponse::Ok().json(g.tournament().get_match(path.id)),
        Err(e) => error_response(e),
    }
}

/// Move to the next stage. Refused with 409 while results are missing, unless
/// `override` is set together with a reason.
#[post("/api/advance")]
async fn api_advance(state: AppState, body: Option<Json<AdvanceBody>>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let result = match body.as_deref() {
        Some(AdvanceBody { force: true, reason }) => {
            let reason = reason.as_deref().map(str::trim).unwrap_or_default();
            if reason.is_empty() {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": "An override needs a reason" }));
            }
            g.advance_with_override(reason)
        }
        _ => g.advance(),
    };
    match result {
        Ok(next) => HttpResponse::Ok().json(serde_json::json!({ "state": next, "tournament": g.tournament() })),
        Err(e) => error_response(e),
    }
}

/// Results of one stage as CSV.
#[get("/api/export/{stage}")]
async fn api_export_stage(state: AppState, path: Path<StagePath>) -> HttpResponse {
    let stage = match parse_stage(&path.stage) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match export::stage_results_csv(g.tournament(), stage) {
        Ok(csv) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(csv),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Archive the results of one stage under EXPORT_DIR.
#[post("/api/export/{stage}")]
async fn api_archive_stage(state: AppState, config: Data<Config>, path: Path<StagePath>) -> HttpResponse {
    let stage = match parse_stage(&path.stage) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match export::export_stage_results(g.tournament(), stage, &config.export_dir) {
        Ok(p) => HttpResponse::Ok().json(serde_json::json!({ "path": p })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

fn pairing_policy(config: &Config) -> Box<dyn PairingPolicy + Send + Sync> {
    let Some(path) = &config.pairing_table else {
        log::warn!("No PAIRING_TABLE set; using the placeholder six-group table");
        return Box::new(SlotTable::six_groups());
    };
    match SlotTable::load(path) {
        Ok(table) => Box::new(table),
        Err(e) => {
            log::warn!("Cannot load pairing table {}: {}; using placeholder", path.display(), e);
            Box::new(SlotTable::six_groups())
        }
    }
}

/// Resume from the snapshot, or build a new tournament from the CSV imports.
fn open_session(config: &Config) -> Result<TournamentSession, TournamentError> {
    let store = SnapshotStore::new(&config.snapshot_path);
    if let Some(session) = TournamentSession::resume(store.clone(), pairing_policy(config))? {
        return Ok(session);
    }

    let tournament = import::load_setup(&config.groups_csv, &config.schedule_csv, &config.knockout_csv);
    if tournament.teams.is_empty() {
        log::warn!("No teams imported; add teams through the API before locking");
    }
    log::info!(
        "New tournament {} with {} teams and {} scheduled matches",
        tournament.id,
        tournament.teams.len(),
        tournament.matches.len()
    );
    TournamentSession::create(tournament, store, pairing_policy(config))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let session = open_session(&config).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    log::info!("Snapshot: {}", session.store().path().display());
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(session));
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_get_tournament)
            .service(api_import_warnings)
            .service(api_all_standings)
            .service(api_group_standings)
            .service(api_qualifiers)
            .service(api_pending_matches)
            .service(api_matchday)
            .service(api_champion)
            .service(api_add_team)
            .service(api_remove_team)
            .service(api_lock)
            .service(api_record_score)
            .service(api_advance)
            .service(api_export_stage)
            .service(api_archive_stage)
    })
    .bind(bind)?
    .run()
    .await
}
