use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use brain_core::i18n::{EnglishCatalog, LanguageCode};
use brain_core::model::{
    ChallengeKind, ChallengeSettings, EndReason, Outcome, SessionStatus, SessionSummary,
};
use brain_core::time::fixed_now;
use services::{
    ActiveChallenge, ChallengeScreen, Clock, PlayableSession, ScreenProps, SessionEvent,
    SessionLoopService, build_session,
};
use storage::repository::{InMemoryRepository, SessionSummaryRepository, Storage};

fn service(repo: &InMemoryRepository) -> SessionLoopService {
    SessionLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
}

/// Tap 1..=25 in order with `pause_ms` between taps.
fn play_number_tap(session: &mut Box<dyn PlayableSession>, pause_ms: u64) -> SessionSummary {
    session.start().unwrap();
    for n in 1..=25 {
        session.tick(pause_ms).unwrap();
        let result = session.submit_text(&n.to_string()).unwrap().unwrap();
        assert_eq!(result.points, 1);
    }
    assert_eq!(session.status(), SessionStatus::Ended);
    session.summary().cloned().unwrap()
}

async fn drain(rx: &mut tokio::sync::mpsc::Receiver<SessionEvent>) -> (Vec<SessionEvent>, Option<SessionSummary>) {
    let mut seen = Vec::new();
    while let Some(event) = rx.recv().await {
        if let SessionEvent::Ended(summary) = event {
            return (seen, Some(summary));
        }
        seen.push(event);
    }
    (seen, None)
}

#[tokio::test]
async fn fastest_tap_run_is_kept_as_the_record() {
    let repo = InMemoryRepository::new();
    let loop_svc = service(&repo);
    let settings = ChallengeSettings::default();

    let mut session = loop_svc
        .prepare(ChallengeKind::NumberTap, &settings, Some(5))
        .await
        .unwrap();
    assert_eq!(session.best_record().value(), None);
    let summary = play_number_tap(&mut session, 120);
    assert_eq!(summary.reason(), EndReason::Finished);
    assert_eq!(summary.outcome(), Outcome::NewRecord);
    assert_eq!(summary.elapsed_ms(), 3_000);
    loop_svc
        .complete(&summary, &session.best_record())
        .await
        .unwrap();

    let mut slower = loop_svc
        .prepare(ChallengeKind::NumberTap, &settings, Some(6))
        .await
        .unwrap();
    assert_eq!(slower.best_record().value(), Some(3_000));
    let summary = play_number_tap(&mut slower, 200);
    assert_eq!(summary.outcome(), Outcome::Completed);
    assert_eq!(summary.previous_best(), Some(3_000));
    loop_svc
        .complete(&summary, &slower.best_record())
        .await
        .unwrap();

    let records = loop_svc.records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value(), Some(3_000));

    let history = loop_svc.recent(Some(ChallengeKind::NumberTap), 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].record_value, 5_000);
    assert_eq!(history[1].outcome, Outcome::NewRecord);
}

#[tokio::test]
async fn storage_bundle_feeds_the_loop_service() {
    let storage = Storage::in_memory();
    let loop_svc = SessionLoopService::from_storage(Clock::fixed(fixed_now()), &storage);
    let mut session = loop_svc
        .prepare(ChallengeKind::MathSprint, &ChallengeSettings::default(), Some(2))
        .await
        .unwrap();
    session.start().unwrap();
    session.stop().unwrap();
    let summary = session.summary().cloned().unwrap();
    assert_eq!(summary.outcome(), Outcome::Abandoned);

    let id = loop_svc
        .complete(&summary, &session.best_record())
        .await
        .unwrap();
    assert_eq!(storage.summaries.get_summary(id).await.unwrap(), summary);
    assert!(loop_svc.records().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn countdown_runs_out_on_the_tokio_clock() {
    let session = build_session(ChallengeKind::MathSprint, &ChallengeSettings::default(), Some(1));
    let (active, mut rx) = ActiveChallenge::spawn(session).unwrap();
    assert!(active.prompt().await.is_some());

    let (seen, summary) = drain(&mut rx).await;
    let summary = summary.expect("session should end");
    assert_eq!(summary.reason(), EndReason::TimeUp);
    assert_eq!(summary.elapsed_ms(), 60_000);
    assert!(seen.iter().all(|event| matches!(event, SessionEvent::Tick(_))));
    assert!(rx.recv().await.is_none());
    assert!(active.prompt().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn stream_timeouts_cost_lives() {
    let session = build_session(ChallengeKind::MathStream, &ChallengeSettings::default(), Some(4));
    let (_active, mut rx) = ActiveChallenge::spawn(session).unwrap();

    let (seen, summary) = drain(&mut rx).await;
    let timeouts = seen
        .iter()
        .filter(|event| matches!(event, SessionEvent::RoundTimedOut(_)))
        .count();
    assert_eq!(timeouts, 3);
    assert_eq!(summary.unwrap().reason(), EndReason::OutOfLives);
}

#[tokio::test(start_paused = true)]
async fn stop_is_reported_as_abandoned() {
    let session = build_session(ChallengeKind::PrimeHunter, &ChallengeSettings::default(), Some(9));
    let (active, mut rx) = ActiveChallenge::spawn(session).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2_500)).await;
    active.stop().await.unwrap();

    let (_, summary) = drain(&mut rx).await;
    let summary = summary.unwrap();
    assert_eq!(summary.outcome(), Outcome::Abandoned);
    assert_eq!(summary.reason(), EndReason::Stopped);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_ticks() {
    let session = build_session(ChallengeKind::InfiniteMathZen, &ChallengeSettings::default(), Some(3));
    let (active, mut rx) = ActiveChallenge::spawn(session).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    drop(active);

    while let Some(event) = rx.recv().await {
        assert!(matches!(event, SessionEvent::Tick(_)));
    }
}

#[tokio::test(start_paused = true)]
async fn leaving_the_screen_calls_back_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut screen = ChallengeScreen::new(ScreenProps {
        language: LanguageCode::Fr,
        on_back: Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    });
    assert_eq!(screen.language(), LanguageCode::Fr);

    let session = build_session(ChallengeKind::ReflexRush, &ChallengeSettings::default(), Some(8));
    let (active, mut rx) = ActiveChallenge::spawn(session).unwrap();
    screen.attach(active);
    assert!(screen.active().is_some());
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    screen.leave().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let (_, summary) = drain(&mut rx).await;
    assert!(summary.is_none());
}

#[test]
fn summary_dialog_uses_screen_language() {
    let screen = ChallengeScreen::new(ScreenProps {
        language: LanguageCode::En,
        on_back: Box::new(|| {}),
    });
    let mut session = build_session(ChallengeKind::MathSprint, &ChallengeSettings::default(), Some(1));
    session.start().unwrap();
    for _ in 0..60 {
        session.tick(1_000).unwrap();
    }
    let summary = session.summary().cloned().unwrap();
    let message = screen.summary_message(&summary, &EnglishCatalog);
    assert_eq!(message.title, "Time's Up!");
    assert_eq!(message.lines, vec!["Score: 0"]);
}
