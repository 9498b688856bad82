//! Player panel lifecycle against a fake chat platform.

mod common;

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::time::Duration;

use common::fixtures::{GUILD, TEXT_CHANNEL, VOICE_CHANNEL, requester, track};
use common::mocks::PanelCall;
use common::{Harness, REFRESH_INTERVAL, RETIRE_DELAY};
use rusty_dj::music::engine::EngineEvent;
use rusty_dj::music::session::Session;

#[fixture]
fn harness() -> Harness {
    Harness::default()
}

async fn playing(harness: &Harness, titles: &[&str]) -> Arc<Session> {
    let session = harness.registry.get_or_create_session(GUILD, TEXT_CHANNEL).await;
    session.join(VOICE_CHANNEL).await.unwrap();
    for title in titles {
        session.enqueue_or_play(track(title), requester()).await.unwrap();
    }
    session
}

async fn end_current(session: &Arc<Session>) {
    let key = session.now_playing().await.unwrap().key();
    session
        .handle_engine_event(EngineEvent::TrackEnded {
            guild_id: GUILD,
            key,
        })
        .await;
}

#[rstest]
#[tokio::test]
async fn repeated_updates_keep_one_live_panel(harness: Harness) {
    let session = playing(&harness, &["A"]).await;

    harness.registry.create_or_refresh_panel(&session).await.unwrap();
    harness.registry.create_or_refresh_panel(&session).await.unwrap();

    assert_eq!(harness.transport.sends(), 1);
    assert_eq!(harness.transport.live_messages(), 1);
    assert!(harness.panels.has_refresh_loop(GUILD).await);
}

#[rstest]
#[tokio::test]
async fn deleted_panel_is_reposted(harness: Harness) {
    let session = playing(&harness, &["A"]).await;
    harness.registry.create_or_refresh_panel(&session).await.unwrap();
    let first = harness.panels.record(GUILD).await.unwrap();

    harness.transport.delete_externally(first.message_id);
    harness.registry.create_or_refresh_panel(&session).await.unwrap();

    let second = harness.panels.record(GUILD).await.unwrap();
    assert_ne!(first.message_id, second.message_id);
    assert!(second.generation > first.generation);
    assert_eq!(harness.transport.live_messages(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn moving_the_panel_retires_the_old_message(harness: Harness) {
    let session = playing(&harness, &["A"]).await;
    harness.registry.create_or_refresh_panel(&session).await.unwrap();
    let old = harness.panels.record(GUILD).await.unwrap();

    harness.registry.refresh_panel_position(&session).await.unwrap();
    let new = harness.panels.record(GUILD).await.unwrap();
    assert_ne!(old.message_id, new.message_id);

    tokio::time::sleep(RETIRE_DELAY + Duration::from_millis(100)).await;

    assert!(harness.transport.calls().contains(&PanelCall::Delete {
        message_id: old.message_id
    }));
    assert_eq!(harness.transport.live_messages(), 1);
}

#[rstest]
#[tokio::test]
async fn refresh_position_without_playback_posts_nothing(harness: Harness) {
    let session = playing(&harness, &[]).await;

    harness.registry.refresh_panel_position(&session).await.unwrap();

    assert_eq!(harness.transport.sends(), 0);
    assert!(harness.panels.record(GUILD).await.is_none());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn refresh_loop_keeps_editing_while_playing(harness: Harness) {
    let session = playing(&harness, &["A"]).await;
    harness.registry.create_or_refresh_panel(&session).await.unwrap();

    tokio::time::sleep(REFRESH_INTERVAL * 3 + Duration::from_secs(1)).await;

    let edits = harness
        .transport
        .calls()
        .iter()
        .filter(|call| matches!(call, PanelCall::Edit { .. }))
        .count();
    assert!(edits >= 3, "expected periodic edits, got {}", edits);
    assert_eq!(harness.transport.sends(), 1);
}

#[rstest]
#[tokio::test]
async fn track_changes_edit_the_existing_panel(harness: Harness) {
    let session = playing(&harness, &["A", "B"]).await;
    harness.registry.create_or_refresh_panel(&session).await.unwrap();
    let record = harness.panels.record(GUILD).await.unwrap();

    end_current(&session).await;

    assert_eq!(
        harness.transport.calls().last(),
        Some(&PanelCall::Edit {
            message_id: record.message_id,
            title: "🎵 Now Playing".to_string(),
        })
    );
    assert_eq!(harness.transport.sends(), 1);
}

#[rstest]
#[tokio::test]
async fn engine_transitions_never_create_a_panel(harness: Harness) {
    let session = playing(&harness, &["A", "B"]).await;

    end_current(&session).await;

    assert!(harness.transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn finished_queue_leaves_a_finished_panel(harness: Harness) {
    let session = playing(&harness, &["A"]).await;
    harness.registry.create_or_refresh_panel(&session).await.unwrap();
    let record = harness.panels.record(GUILD).await.unwrap();

    end_current(&session).await;

    assert_eq!(
        harness.transport.calls().last(),
        Some(&PanelCall::Edit {
            message_id: record.message_id,
            title: "🏁 Playback Finished".to_string(),
        })
    );
    assert!(harness.panels.record(GUILD).await.is_none());
    assert!(!harness.panels.has_refresh_loop(GUILD).await);
    assert_eq!(harness.transport.live_messages(), 1);
}

#[rstest]
#[tokio::test]
async fn leaving_deletes_the_panel(harness: Harness) {
    let session = playing(&harness, &["A"]).await;
    harness.registry.create_or_refresh_panel(&session).await.unwrap();
    let record = harness.panels.record(GUILD).await.unwrap();

    assert!(harness.registry.disconnect(GUILD).await);

    assert_eq!(
        harness.transport.calls().last(),
        Some(&PanelCall::Delete {
            message_id: record.message_id
        })
    );
    assert_eq!(harness.transport.live_messages(), 0);
    assert!(harness.panels.record(GUILD).await.is_none());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn moved_panel_is_the_only_one_refreshed(harness: Harness) {
    let session = playing(&harness, &["A"]).await;
    harness.registry.create_or_refresh_panel(&session).await.unwrap();
    let old = harness.panels.record(GUILD).await.unwrap();

    harness.registry.refresh_panel_position(&session).await.unwrap();
    let new = harness.panels.record(GUILD).await.unwrap();

    tokio::time::sleep(REFRESH_INTERVAL * 3 + Duration::from_secs(1)).await;

    assert_eq!(harness.transport.edits_of(old.message_id), 0);
    assert_eq!(harness.transport.edits_of(new.message_id), 3);
    assert!(harness.panels.has_refresh_loop(GUILD).await);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn replacement_session_keeps_its_panel_during_slow_teardown(harness: Harness) {
    harness.transport.slow_deletes(Duration::from_millis(300));
    let session = playing(&harness, &["A"]).await;
    harness.registry.create_or_refresh_panel(&session).await.unwrap();
    let old = harness.panels.record(GUILD).await.unwrap();

    let leave = harness.registry.disconnect(GUILD);
    let replay = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let replacement = playing(&harness, &["B"]).await;
        harness.registry.create_or_refresh_panel(&replacement).await.unwrap();
        replacement
    };
    let (left, replacement) = tokio::join!(leave, replay);

    assert!(left);
    assert!(!Arc::ptr_eq(&session, &replacement));
    let new = harness.panels.record(GUILD).await.unwrap();
    assert_ne!(old.message_id, new.message_id);
    assert_eq!(
        harness.transport.calls().last(),
        Some(&PanelCall::Send {
            message_id: new.message_id,
            title: "🎵 Now Playing".to_string(),
        })
    );
    assert_eq!(harness.transport.live_messages(), 1);
}
