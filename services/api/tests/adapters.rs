use api_lib::adapters::narration::wav_duration;
use api_lib::adapters::{FrameTicks, JsonFileStore, NarrationTrack};
use futures::StreamExt;
use portfolio_core::conversation::SESSION_KEY;
use portfolio_core::ports::{KeyValueStore, MediaHandle, PortError, TickSource};
use portfolio_core::{
    submit_user_input, ConversationManager, FixedTypingDelay, Locale, MatchConfig,
    PlaybackEngine, QaEngine, UserInput,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Writes a silent mono 16-bit WAV of `seconds` length.
fn write_wav(path: &Path, seconds: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..spec.sample_rate * seconds {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[tokio::test]
async fn file_store_round_trips_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = Uuid::new_v4();

    let store = JsonFileStore::session(dir.path(), id).await.unwrap();
    assert_eq!(store.get_item("missing").unwrap(), None);
    store.set_item("greeting", "hello").unwrap();
    store.set_item("other", "1").unwrap();
    store.remove_item("other").unwrap();
    assert!(store.path().starts_with(dir.path().join("sessions")));
    store.flush().await.unwrap();

    let reopened = JsonFileStore::session(dir.path(), id).await.unwrap();
    assert_eq!(reopened.get_item("greeting").unwrap().as_deref(), Some("hello"));
    assert_eq!(reopened.get_item("other").unwrap(), None);
}

#[tokio::test]
async fn scopes_do_not_share_items() {
    let dir = tempfile::tempdir().unwrap();
    let id = Uuid::new_v4();
    let session = JsonFileStore::session(dir.path(), id).await.unwrap();
    session.set_item("preferred-locale", "de").unwrap();
    session.flush().await.unwrap();

    let visitor = JsonFileStore::visitor(dir.path(), id).await.unwrap();
    assert_eq!(visitor.get_item("preferred-locale").unwrap(), None);
}

#[test]
fn malformed_store_file_is_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, b"{ this is not json").unwrap();

    // Outside a runtime, writes happen on the calling thread.
    let store = JsonFileStore::open(&path);
    assert_eq!(store.get_item("anything").unwrap(), None);
    store.set_item("fresh", "start").unwrap();
    assert_eq!(
        JsonFileStore::open(&path).get_item("fresh").unwrap().as_deref(),
        Some("start")
    );
}

#[tokio::test]
async fn background_writes_keep_the_latest_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.json");

    let store = JsonFileStore::load(&path).await.unwrap();
    for n in 0..50 {
        store.set_item("count", &n.to_string()).unwrap();
    }
    store.flush().await.unwrap();

    let reopened = JsonFileStore::load(&path).await.unwrap();
    assert_eq!(reopened.get_item("count").unwrap().as_deref(), Some("49"));
}

#[test]
fn concurrent_writers_to_one_file_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.json");

    let writers: Vec<_> = (0..4)
        .map(|writer| {
            let path = path.clone();
            std::thread::spawn(move || {
                let store = JsonFileStore::open(&path);
                for n in 0..25 {
                    store
                        .set_item("last", &format!("{writer}-{n}"))
                        .expect("every write should land");
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let last = JsonFileStore::open(&path).get_item("last").unwrap().unwrap();
    assert!(last.ends_with("-24"), "unexpected final value {last}");
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1, "temp files must not be left behind");
}

#[tokio::test]
async fn conversation_persists_through_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let id = Uuid::new_v4();
    let engine = Arc::new(QaEngine::builtin(MatchConfig::default()));
    let delay = FixedTypingDelay(Duration::ZERO);

    {
        let store = Arc::new(JsonFileStore::session(dir.path(), id).await.unwrap());
        let chat = Mutex::new(ConversationManager::mount(
            engine.clone(),
            store.clone(),
            Locale::En,
        ));
        chat.lock().await.open_session();
        submit_user_input(&chat, &delay, UserInput::typed("Do you speak German?")).await;
        store.flush().await.unwrap();
    }

    let store = Arc::new(JsonFileStore::session(dir.path(), id).await.unwrap());
    assert!(store.get_item(SESSION_KEY).unwrap().is_some());
    let restored = ConversationManager::mount(engine, store, Locale::En).snapshot();
    assert_eq!(restored.messages.len(), 3);
    assert_eq!(restored.asked_question_ids, vec!["german-level"]);
}

#[test]
fn wav_duration_comes_from_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intro.wav");
    write_wav(&path, 3);
    assert_eq!(wav_duration(&path).unwrap(), 3.0);
}

#[tokio::test]
async fn missing_narration_cannot_play() {
    let track = NarrationTrack::new("/definitely/not/here.wav");
    assert!(matches!(
        track.load().await,
        Err(PortError::MediaUnavailable(_))
    ));
    assert!(matches!(track.play(), Err(PortError::PlaybackRejected(_))));

    let engine = PlaybackEngine::initialize(Arc::new(track), true).await;
    assert!(!engine.snapshot().is_loaded);
}

#[tokio::test(start_paused = true)]
async fn narration_clock_follows_play_pause_and_seek() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intro.wav");
    write_wav(&path, 2);

    let track = NarrationTrack::new(&path);
    assert_eq!(track.load().await.unwrap(), 2.0);
    track.play().unwrap();
    tokio::time::advance(Duration::from_millis(500)).await;
    assert!((track.position() - 0.5).abs() < 1e-6);

    track.pause();
    tokio::time::advance(Duration::from_secs(1)).await;
    assert!((track.position() - 0.5).abs() < 1e-6);

    track.set_position(1.75);
    track.play().unwrap();
    assert!(!track.has_ended());
    tokio::time::advance(Duration::from_millis(300)).await;
    assert!(track.has_ended());
    assert_eq!(track.position(), 2.0);
}

#[tokio::test(start_paused = true)]
async fn playback_runs_to_the_end_and_resets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intro.wav");
    write_wav(&path, 1);

    let engine = PlaybackEngine::initialize(Arc::new(NarrationTrack::new(&path)), true).await;
    assert!(engine.snapshot().is_playing);

    let ticks = FrameTicks::new(Duration::from_millis(16));
    tokio::time::timeout(Duration::from_secs(5), engine.run_sampling(&ticks))
        .await
        .expect("sampling should stop at the end of the narration");

    let clock = engine.snapshot();
    assert!(!clock.is_playing);
    assert_eq!(clock.current_time, 0.0);
}

#[tokio::test(start_paused = true)]
async fn frame_ticks_follow_the_interval() {
    let ticks = FrameTicks::new(Duration::from_millis(16));
    let start = tokio::time::Instant::now();
    let count = ticks.ticks().take(4).count().await;
    assert_eq!(count, 4);
    // The first tick fires immediately.
    assert_eq!(start.elapsed(), Duration::from_millis(48));
}
