//! Tests for the fixture service.

use chrono::{DateTime, TimeDelta, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockMatchRepository, MockMatchUpdatePublisher};
use crate::domain::{ErrorCode, EventType, Side};
use crate::test_support::MutableClock;

#[fixture]
fn scheduled() -> Match {
    let details = MatchDetails::try_new(
        "Enyimba",
        "Kano Pillars",
        None,
        "Enyimba International Stadium",
        "Abia",
        DateTime::<Utc>::UNIX_EPOCH,
    )
    .expect("valid details");
    Match::new(MatchId::random(), details, DateTime::<Utc>::UNIX_EPOCH)
}

fn live(mut fixture: Match) -> Match {
    fixture.status = MatchStatus::Live;
    fixture.minute = Some(10);
    fixture
}

fn repo_holding(fixture: Match) -> MockMatchRepository {
    let mut repo = MockMatchRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(fixture)));
    repo
}

fn publisher_expecting(kind: MatchUpdateKind) -> MockMatchUpdatePublisher {
    let mut publisher = MockMatchUpdatePublisher::new();
    publisher
        .expect_publish()
        .withf(move |update| update.kind == kind)
        .times(1)
        .return_const(1_usize);
    publisher
}

fn silent_publisher() -> MockMatchUpdatePublisher {
    let mut publisher = MockMatchUpdatePublisher::new();
    publisher.expect_publish().never();
    publisher
}

fn service(
    repo: MockMatchRepository,
    publisher: MockMatchUpdatePublisher,
) -> MatchService<MockMatchRepository> {
    MatchService::new(
        Arc::new(repo),
        Arc::new(publisher),
        Arc::new(MutableClock::at_epoch()),
    )
}

fn goal(side: Side, event_type: EventType) -> NewMatchEvent {
    NewMatchEvent::try_new(event_type, side, "Chukwuemeka Obi", 23, None, None)
        .expect("valid event")
}

#[rstest]
#[tokio::test]
async fn create_persists_and_announces(scheduled: Match) {
    let mut repo = MockMatchRepository::new();
    repo.expect_insert().times(1).return_once(|_| Ok(()));
    let details = MatchDetails::try_new(
        &scheduled.home_team,
        &scheduled.away_team,
        Some("Federation Cup"),
        &scheduled.venue,
        "lagos",
        scheduled.kickoff,
    )
    .expect("valid");

    let created = service(repo, publisher_expecting(MatchUpdateKind::Created))
        .create(details)
        .await
        .expect("created");
    assert_eq!(created.status, MatchStatus::Scheduled);
    assert_eq!((created.home_score, created.away_score), (0, 0));
    assert_eq!(created.state, "Lagos");
}

#[rstest]
#[case::goal(EventType::Goal, Side::Home, (1, 0))]
#[case::penalty(EventType::Penalty, Side::Away, (0, 1))]
#[case::own_goal(EventType::OwnGoal, Side::Home, (0, 1))]
#[case::booking(EventType::YellowCard, Side::Home, (0, 0))]
#[tokio::test]
async fn events_adjust_the_score(
    scheduled: Match,
    #[case] event_type: EventType,
    #[case] side: Side,
    #[case] expected: (u32, u32),
) {
    let mut repo = repo_holding(live(scheduled));
    repo.expect_update().times(1).return_once(|_, _| Ok(true));

    let updated = service(repo, publisher_expecting(MatchUpdateKind::EventAdded))
        .add_event(MatchId::random(), goal(side, event_type))
        .await
        .expect("event added");
    assert_eq!((updated.home_score, updated.away_score), expected);
    assert_eq!(updated.events.len(), 1);
}

#[rstest]
#[tokio::test]
async fn events_before_kickoff_are_rejected_without_publishing(scheduled: Match) {
    let mut repo = repo_holding(scheduled);
    repo.expect_update().never();

    let err = service(repo, silent_publisher())
        .add_event(MatchId::random(), goal(Side::Home, EventType::Goal))
        .await
        .expect_err("not live");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("status")).and_then(|s| s.as_str()),
        Some("scheduled")
    );
}

#[rstest]
#[tokio::test]
async fn removing_an_own_goal_reverses_it(scheduled: Match) {
    let mut fixture = live(scheduled);
    let event = goal(Side::Away, EventType::OwnGoal)
        .into_event(MatchEventId::random(), DateTime::<Utc>::UNIX_EPOCH);
    let event_id = event.id;
    fixture
        .add_event(event, DateTime::<Utc>::UNIX_EPOCH)
        .expect("added");
    assert_eq!(fixture.home_score, 1);
    let mut repo = repo_holding(fixture);
    repo.expect_update().return_once(|_, _| Ok(true));

    let updated = service(repo, publisher_expecting(MatchUpdateKind::EventRemoved))
        .remove_event(MatchId::random(), event_id)
        .await
        .expect("removed");
    assert_eq!((updated.home_score, updated.away_score), (0, 0));
    assert!(updated.events.is_empty());
}

#[rstest]
#[tokio::test]
async fn removing_unknown_event_is_not_found(scheduled: Match) {
    let repo = repo_holding(live(scheduled));
    let err = service(repo, silent_publisher())
        .remove_event(MatchId::random(), MatchEventId::random())
        .await
        .expect_err("unknown");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn invalid_transition_reports_both_states(scheduled: Match) {
    let repo = repo_holding(scheduled);
    let err = service(repo, silent_publisher())
        .change_status(MatchId::random(), MatchStatus::FullTime, None)
        .await
        .expect_err("scheduled cannot finish");
    let details = err.details().expect("details");
    assert_eq!(details["from"], "scheduled");
    assert_eq!(details["to"], "full_time");
}

#[rstest]
#[tokio::test]
async fn kick_off_sets_minute_and_announces(scheduled: Match) {
    let mut repo = repo_holding(scheduled);
    repo.expect_update()
        .withf(|fixture, read_at| {
            fixture.status == MatchStatus::Live
                && fixture.minute == Some(1)
                && *read_at == DateTime::<Utc>::UNIX_EPOCH
                && fixture.updated_at > *read_at
        })
        .return_once(|_, _| Ok(true));

    service(repo, publisher_expecting(MatchUpdateKind::StatusChanged))
        .change_status(MatchId::random(), MatchStatus::Live, Some(1))
        .await
        .expect("kicked off");
}

#[rstest]
#[tokio::test]
async fn score_requires_match_in_progress(scheduled: Match) {
    let repo = repo_holding(scheduled);
    let err = service(repo, silent_publisher())
        .set_score(MatchId::random(), 2, 1)
        .await
        .expect_err("not started");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn details_patch_rechecks_distinct_teams(scheduled: Match) {
    let repo = repo_holding(scheduled);
    let patch = MatchDetailsPatch {
        away_team: Some("ENYIMBA".into()),
        ..MatchDetailsPatch::default()
    };
    let err = service(repo, silent_publisher())
        .update_details(MatchId::random(), patch)
        .await
        .expect_err("same teams");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn missing_match_is_not_found() {
    let mut repo = MockMatchRepository::new();
    repo.expect_find_by_id().return_once(|_| Ok(None));
    let err = service(repo, silent_publisher())
        .find(MatchId::random())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_announces_last_snapshot(scheduled: Match) {
    let id = scheduled.id;
    let mut repo = repo_holding(scheduled);
    repo.expect_delete().return_once(|_| Ok(true));
    let mut publisher = MockMatchUpdatePublisher::new();
    publisher
        .expect_publish()
        .withf(move |update| update.kind == MatchUpdateKind::Deleted && update.match_id == id)
        .times(1)
        .return_const(0_usize);

    service(repo, publisher)
        .delete(id)
        .await
        .expect("deleted");
}

#[rstest]
#[tokio::test]
async fn live_lists_in_play_fixtures_only() {
    let mut repo = MockMatchRepository::new();
    repo.expect_list()
        .withf(|filter, page| filter.in_play_only && page.limit() == MAX_LIMIT)
        .return_once(|_, page| Ok(Page::new(Vec::new(), page, 0)));
    let fixtures = service(repo, silent_publisher())
        .live()
        .await
        .expect("listed");
    assert!(fixtures.is_empty());
}

#[rstest]
#[tokio::test]
async fn repository_outage_is_unavailable() {
    let mut repo = MockMatchRepository::new();
    repo.expect_list()
        .return_once(|_, _| Err(MatchPersistenceError::connection("refused")));
    let err = service(repo, silent_publisher())
        .list(MatchFilter::default(), PageRequest::default())
        .await
        .expect_err("outage");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn goal_lost_to_a_concurrent_write_is_replayed(scheduled: Match) {
    let first_read = live(scheduled);
    let rival_at = first_read.updated_at + TimeDelta::seconds(1);
    let mut after_rival_goal = first_read.clone();
    after_rival_goal
        .add_event(
            goal(Side::Away, EventType::Goal).into_event(MatchEventId::random(), rival_at),
            rival_at,
        )
        .expect("rival goal");
    let stamps = [first_read.updated_at, after_rival_goal.updated_at];

    let mut reads = vec![first_read, after_rival_goal].into_iter();
    let mut outcomes = vec![Err(MatchPersistenceError::stale("m")), Ok(true)].into_iter();
    let mut repo = MockMatchRepository::new();
    repo.expect_find_by_id()
        .times(2)
        .returning(move |_| Ok(reads.next()));
    repo.expect_update()
        .times(2)
        .withf(move |_, read_at| stamps.contains(read_at))
        .returning(move |_, _| outcomes.next().unwrap_or(Ok(false)));

    let updated = service(repo, publisher_expecting(MatchUpdateKind::EventAdded))
        .add_event(MatchId::random(), goal(Side::Home, EventType::Goal))
        .await
        .expect("goal recorded");
    assert_eq!((updated.home_score, updated.away_score), (1, 1));
    assert_eq!(updated.events.len(), 2);
}

#[rstest]
#[tokio::test]
async fn persistent_contention_is_a_conflict(scheduled: Match) {
    let fixture = live(scheduled);
    let mut repo = MockMatchRepository::new();
    repo.expect_find_by_id()
        .times(WRITE_ATTEMPTS as usize)
        .returning(move |_| Ok(Some(fixture.clone())));
    repo.expect_update()
        .times(WRITE_ATTEMPTS as usize)
        .returning(|_, _| Err(MatchPersistenceError::stale("m")));

    let err = service(repo, silent_publisher())
        .set_score(MatchId::random(), 2, 0)
        .await
        .expect_err("contended");
    assert_eq!(err.code(), ErrorCode::Conflict);
}
