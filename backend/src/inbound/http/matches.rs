//! Fixture HTTP handlers.
//!
//! ```text
//! GET    /api/matches
//! GET    /api/matches/live
//! GET    /api/matches/{id}
//! POST   /api/matches
//! PUT    /api/matches/{id}
//! PATCH  /api/matches/{id}/score
//! PATCH  /api/matches/{id}/status
//! POST   /api/matches/{id}/events
//! DELETE /api/matches/{id}/events/{eventId}
//! PUT    /api/matches/{id}/lineups
//! PUT    /api/matches/{id}/stats
//! DELETE /api/matches/{id}
//! ```
//!
//! Reads are public; writes need a staff token and publish a match update
//! through the domain service.

use actix_web::{HttpResponse, Scope, delete, get, patch, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::matches::MINUTE_MAX;
use crate::domain::{
    Error, EventType, Lineups, Match, MatchDetails, MatchDetailsPatch, MatchEventId, MatchFilter,
    MatchId, MatchStats, MatchStatus, NewMatchEvent, Side,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedAdmin;
use crate::inbound::http::schemas::MatchPage;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    bounded_u32, missing_field_error, non_blank, page_request, parse_id, parse_rfc3339_timestamp,
    parse_variant,
};

/// Highest score accepted by the score endpoint.
const SCORE_MAX: u32 = 99;

/// Filters for the fixture list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchListQuery {
    /// One of `scheduled`, `live`, `half_time`, `full_time`, `postponed`, `cancelled`.
    pub status: Option<String>,
    pub competition: Option<String>,
    /// Nigerian state of the venue.
    pub state: Option<String>,
    /// Substring of either team name.
    pub team: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl MatchListQuery {
    fn into_filter(self) -> Result<MatchFilter, Error> {
        let status = non_blank(self.status)
            .map(|raw| MatchStatus::parse(&raw))
            .transpose()?;
        Ok(MatchFilter {
            status,
            competition: non_blank(self.competition),
            state: non_blank(self.state),
            team: non_blank(self.team),
            in_play_only: false,
        })
    }
}

/// New fixture body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    #[serde(default)]
    #[schema(example = "Enyimba")]
    pub home_team: String,
    #[serde(default)]
    #[schema(example = "Rangers International")]
    pub away_team: String,
    /// Defaults to `NPFL`.
    pub competition: Option<String>,
    #[serde(default)]
    #[schema(example = "Aba Township Stadium")]
    pub venue: String,
    #[serde(default)]
    #[schema(example = "Abia")]
    pub state: String,
    /// RFC 3339 kick-off time.
    #[schema(example = "2025-03-01T16:00:00Z")]
    pub kickoff: Option<String>,
}

/// Partial fixture details body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatchRequest {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub competition: Option<String>,
    pub venue: Option<String>,
    pub state: Option<String>,
    /// RFC 3339 kick-off time.
    pub kickoff: Option<String>,
}

/// Score override body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
}

/// Status change body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct StatusRequest {
    #[serde(default)]
    #[schema(example = "live")]
    pub status: String,
    /// Match clock, `0..=130`.
    pub minute: Option<i64>,
}

/// Match event body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchEventRequest {
    /// Event kind, e.g. `goal`, `own_goal`, `yellow_card`, `substitution`.
    #[serde(rename = "type", default)]
    #[schema(example = "goal")]
    pub event_type: String,
    /// `home` or `away`.
    #[serde(default)]
    #[schema(example = "home")]
    pub team: String,
    #[serde(default)]
    pub player: String,
    pub minute: Option<i64>,
    /// Goals only.
    pub assist: Option<String>,
    /// Substitutions only.
    pub player_out: Option<String>,
}

impl MatchEventRequest {
    fn into_event(self) -> Result<NewMatchEvent, Error> {
        let event_type: EventType = parse_variant(&self.event_type, "type")?;
        let team: Side = parse_variant(&self.team, "team")?;
        let minute = self.minute.ok_or_else(|| missing_field_error("minute"))?;
        let minute = match_minute(minute)?;
        Ok(NewMatchEvent::try_new(
            event_type,
            team,
            &self.player,
            minute,
            self.assist.as_deref(),
            self.player_out.as_deref(),
        )?)
    }
}

fn match_minute(raw: i64) -> Result<u16, Error> {
    let minute = bounded_u32(raw, "minute", u32::from(MINUTE_MAX))?;
    u16::try_from(minute).map_err(|_| Error::invalid_field("minute", "minute is out of range"))
}

fn match_id(raw: &str) -> Result<MatchId, Error> {
    parse_id(raw, "id", MatchId::parse)
}

/// Fixtures ordered by kick-off.
#[utoipa::path(
    get,
    path = "/api/matches",
    params(MatchListQuery),
    responses(
        (status = 200, description = "Fixtures", body = MatchPage),
        (status = 400, description = "Invalid filter or paging", body = Error)
    ),
    tags = ["matches"],
    operation_id = "listMatches",
    security([])
)]
#[get("")]
pub async fn list_matches(
    state: web::Data<HttpState>,
    query: web::Query<MatchListQuery>,
) -> ApiResult<web::Json<Page<Match>>> {
    let query = query.into_inner();
    let page = page_request(query.page, query.limit)?;
    let filter = query.into_filter()?;
    Ok(web::Json(state.matches_query.list(filter, page).await?))
}

/// Fixtures currently live or at half time.
#[utoipa::path(
    get,
    path = "/api/matches/live",
    responses((status = 200, description = "Live fixtures", body = [Match])),
    tags = ["matches"],
    operation_id = "liveMatches",
    security([])
)]
#[get("/live")]
pub async fn live_matches(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Match>>> {
    Ok(web::Json(state.matches_query.live().await?))
}

/// One fixture.
#[utoipa::path(
    get,
    path = "/api/matches/{id}",
    params(("id" = String, Path, description = "Fixture id")),
    responses(
        (status = 200, description = "Fixture", body = Match),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["matches"],
    operation_id = "getMatch",
    security([])
)]
#[get("/{id}")]
pub async fn get_match(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Match>> {
    let id = match_id(&path.into_inner())?;
    Ok(web::Json(state.matches_query.find(id).await?))
}

/// Schedule a fixture.
#[utoipa::path(
    post,
    path = "/api/matches",
    request_body = CreateMatchRequest,
    responses(
        (status = 201, description = "Fixture created", body = Match),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Staff only", body = Error)
    ),
    tags = ["matches"],
    operation_id = "createMatch"
)]
#[post("")]
pub async fn create_match(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    payload: web::Json<CreateMatchRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let kickoff = body
        .kickoff
        .as_deref()
        .ok_or_else(|| missing_field_error("kickoff"))
        .and_then(|raw| parse_rfc3339_timestamp(raw, "kickoff"))?;
    let details = MatchDetails::try_new(
        &body.home_team,
        &body.away_team,
        body.competition.as_deref(),
        &body.venue,
        &body.state,
        kickoff,
    )?;
    let fixture = state.matches.create(details).await?;
    Ok(HttpResponse::Created().json(fixture))
}

/// Update teams, competition, venue, state or kick-off.
#[utoipa::path(
    put,
    path = "/api/matches/{id}",
    params(("id" = String, Path, description = "Fixture id")),
    request_body = UpdateMatchRequest,
    responses(
        (status = 200, description = "Fixture updated", body = Match),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["matches"],
    operation_id = "updateMatch"
)]
#[put("/{id}")]
pub async fn update_match(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
    payload: web::Json<UpdateMatchRequest>,
) -> ApiResult<web::Json<Match>> {
    let id = match_id(&path.into_inner())?;
    let body = payload.into_inner();
    let kickoff = body
        .kickoff
        .as_deref()
        .map(|raw| parse_rfc3339_timestamp(raw, "kickoff"))
        .transpose()?;
    let patch = MatchDetailsPatch {
        home_team: body.home_team,
        away_team: body.away_team,
        competition: body.competition,
        venue: body.venue,
        state: body.state,
        kickoff,
    };
    Ok(web::Json(state.matches.update_details(id, patch).await?))
}

/// Set both scores.
#[utoipa::path(
    patch,
    path = "/api/matches/{id}/score",
    params(("id" = String, Path, description = "Fixture id")),
    request_body = ScoreRequest,
    responses(
        (status = 200, description = "Score updated", body = Match),
        (status = 400, description = "Invalid score or fixture not in play", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["matches"],
    operation_id = "updateMatchScore"
)]
#[patch("/{id}/score")]
pub async fn update_score(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
    payload: web::Json<ScoreRequest>,
) -> ApiResult<web::Json<Match>> {
    let id = match_id(&path.into_inner())?;
    let body = payload.into_inner();
    let home = body
        .home_score
        .ok_or_else(|| missing_field_error("homeScore"))
        .and_then(|v| bounded_u32(v, "homeScore", SCORE_MAX))?;
    let away = body
        .away_score
        .ok_or_else(|| missing_field_error("awayScore"))
        .and_then(|v| bounded_u32(v, "awayScore", SCORE_MAX))?;
    Ok(web::Json(state.matches.set_score(id, home, away).await?))
}

/// Move the fixture through its lifecycle.
#[utoipa::path(
    patch,
    path = "/api/matches/{id}/status",
    params(("id" = String, Path, description = "Fixture id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Match),
        (status = 400, description = "Invalid status, minute or transition", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["matches"],
    operation_id = "updateMatchStatus"
)]
#[patch("/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<web::Json<Match>> {
    let id = match_id(&path.into_inner())?;
    let body = payload.into_inner();
    let status = MatchStatus::parse(&body.status)?;
    let minute = body.minute.map(match_minute).transpose()?;
    Ok(web::Json(
        state.matches.change_status(id, status, minute).await?,
    ))
}

/// Record a goal, card or substitution.
#[utoipa::path(
    post,
    path = "/api/matches/{id}/events",
    params(("id" = String, Path, description = "Fixture id")),
    request_body = MatchEventRequest,
    responses(
        (status = 201, description = "Event recorded", body = Match),
        (status = 400, description = "Invalid event or fixture not in play", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["matches"],
    operation_id = "addMatchEvent"
)]
#[post("/{id}/events")]
pub async fn add_event(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
    payload: web::Json<MatchEventRequest>,
) -> ApiResult<HttpResponse> {
    let id = match_id(&path.into_inner())?;
    let event = payload.into_inner().into_event()?;
    let fixture = state.matches.add_event(id, event).await?;
    Ok(HttpResponse::Created().json(fixture))
}

/// Remove an event and reverse its score effect.
#[utoipa::path(
    delete,
    path = "/api/matches/{id}/events/{eventId}",
    params(
        ("id" = String, Path, description = "Fixture id"),
        ("eventId" = String, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Event removed", body = Match),
        (status = 404, description = "Fixture or event not found", body = Error)
    ),
    tags = ["matches"],
    operation_id = "removeMatchEvent"
)]
#[delete("/{id}/events/{event_id}")]
pub async fn remove_event(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Match>> {
    let (raw_id, raw_event) = path.into_inner();
    let id = match_id(&raw_id)?;
    let event_id = parse_id(&raw_event, "eventId", MatchEventId::parse)?;
    Ok(web::Json(state.matches.remove_event(id, event_id).await?))
}

/// Replace both team sheets.
#[utoipa::path(
    put,
    path = "/api/matches/{id}/lineups",
    params(("id" = String, Path, description = "Fixture id")),
    request_body = Lineups,
    responses(
        (status = 200, description = "Line-ups stored", body = Match),
        (status = 400, description = "Invalid line-up", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["matches"],
    operation_id = "updateMatchLineups"
)]
#[put("/{id}/lineups")]
pub async fn update_lineups(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
    payload: web::Json<Lineups>,
) -> ApiResult<web::Json<Match>> {
    let id = match_id(&path.into_inner())?;
    let lineups = payload.into_inner().validated()?;
    Ok(web::Json(state.matches.set_lineups(id, lineups).await?))
}

/// Replace match statistics.
#[utoipa::path(
    put,
    path = "/api/matches/{id}/stats",
    params(("id" = String, Path, description = "Fixture id")),
    request_body = MatchStats,
    responses(
        (status = 200, description = "Statistics stored", body = Match),
        (status = 400, description = "Invalid statistics", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["matches"],
    operation_id = "updateMatchStats"
)]
#[put("/{id}/stats")]
pub async fn update_stats(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
    payload: web::Json<MatchStats>,
) -> ApiResult<web::Json<Match>> {
    let id = match_id(&path.into_inner())?;
    let stats = payload.into_inner().validated()?;
    Ok(web::Json(state.matches.set_stats(id, stats).await?))
}

/// Delete a fixture.
#[utoipa::path(
    delete,
    path = "/api/matches/{id}",
    params(("id" = String, Path, description = "Fixture id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["matches"],
    operation_id = "deleteMatch"
)]
#[delete("/{id}")]
pub async fn delete_match(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = match_id(&path.into_inner())?;
    state.matches.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Routes under `/api/matches`.
///
/// `/live` is registered before `/{id}` so it is not captured as an id.
pub fn scope() -> Scope {
    web::scope("/api/matches")
        .service(list_matches)
        .service(create_match)
        .service(live_matches)
        .service(get_match)
        .service(update_match)
        .service(delete_match)
        .service(update_score)
        .service(update_status)
        .service(add_event)
        .service(remove_event)
        .service(update_lineups)
        .service(update_stats)
}

#[cfg(test)]
#[path = "matches_tests.rs"]
mod tests;
