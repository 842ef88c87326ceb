//! # Concurrency Tests
//!
//! Producer, execution stream and presenter running at the same time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use tandem_core::QueueConfig;
use tandem_rendering::{
    render_queue, BackendEvent, DrawLayer, EngineConfig, EventLog, Geometry, QueuedDrawLayer, RecordingBackend,
    RenderState, RenderStateUpdater, ResourceManager, Screen, UpdaterParams,
};

fn threaded_updater(
    name: &str,
    backend: RecordingBackend,
    state: &Arc<RenderState>,
) -> RenderStateUpdater<QueuedDrawLayer> {
    let queue = Arc::new(render_queue(&QueueConfig::threaded(name), backend).unwrap());
    let layer = QueuedDrawLayer::new(queue, Arc::new(ResourceManager::new()));
    let params = UpdaterParams {
        render_state: Some(Arc::clone(state)),
        ..UpdaterParams::default()
    };
    RenderStateUpdater::new(layer, params)
}

#[test]
fn producer_is_not_blocked_by_slow_finish() {
    const FRAMES: u32 = 5;
    const FINISH_DELAY: Duration = Duration::from_millis(50);

    let log = EventLog::new();
    let backend = RecordingBackend::new(log.clone()).with_finish_delay(FINISH_DELAY);
    let config = EngineConfig::from_toml_str(
        r#"
        back_buffer_count = 2

        [queue]
        mode = "threaded"
        thread_name = "slow-gpu"
        "#,
    )
    .unwrap();

    let state = config.build_render_state().unwrap();
    let queue = Arc::new(render_queue(&config.queue, backend).unwrap());
    let layer = QueuedDrawLayer::new(Arc::clone(&queue), Arc::new(ResourceManager::new()));
    let mut updater = RenderStateUpdater::new(layer, config.updater_params(Some(Arc::clone(&state))).unwrap());

    let started = Instant::now();
    for _ in 0..FRAMES {
        updater.begin_frame();
        updater.draw_geometry(Geometry::with_indices(300));
        updater.end_frame();
    }
    let producer_time = started.elapsed();

    assert!(
        producer_time < FINISH_DELAY * FRAMES,
        "producer waited on the execution stream: {:?}",
        producer_time
    );

    queue.wait_idle();
    assert_eq!(log.count(|e| *e == BackendEvent::Finish), FRAMES as usize);
    assert_eq!(state.generation(), u64::from(FRAMES));
}

#[test]
fn presenter_reads_consistent_snapshots_while_swapping() {
    let config = EngineConfig::from_toml_str(
        r#"
        surface_width = 48
        surface_height = 32
        back_buffer_count = 2

        [updater]
        enable_periodic_update = true
        update_interval_seconds = 0.0

        [queue]
        mode = "threaded"
        "#,
    )
    .unwrap();

    let log = EventLog::new();
    let state = config.build_render_state().unwrap();
    let queue = Arc::new(render_queue(&config.queue, RecordingBackend::new(log.clone())).unwrap());
    let layer = QueuedDrawLayer::new(Arc::clone(&queue), Arc::new(ResourceManager::new()));
    let mut updater = RenderStateUpdater::new(layer, config.updater_params(Some(Arc::clone(&state))).unwrap());

    let mut known = vec![state.actual_target()];
    known.extend(state.lock_slots().back_buffer_layers.iter().cloned());

    let done = Arc::new(AtomicBool::new(false));
    let presenter = {
        let state = Arc::clone(&state);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut last_generation = 0;
            let mut reads = 0u64;
            while !done.load(Ordering::Acquire) {
                let snapshot = state.snapshot();
                assert!(snapshot.generation >= last_generation);
                assert_eq!(snapshot.actual_target.size(), (48, 32));
                assert!(known.iter().any(|t| Arc::ptr_eq(t, &snapshot.actual_target)));
                last_generation = snapshot.generation;
                reads += 1;
            }
            reads
        })
    };

    for frame in 0..50 {
        updater.begin_frame();
        for _ in 0..=(frame % 3) {
            updater.draw_geometry(Geometry::with_indices(12_000));
            let drawing = updater.layer().render_target().unwrap();
            assert!(!Arc::ptr_eq(drawing, &state.actual_target()));
        }
        updater.end_frame();
    }

    queue.wait_idle();
    done.store(true, Ordering::Release);
    let reads = presenter.join().unwrap();

    assert!(reads > 0);
    assert_eq!(state.back_buffer_count(), 2);
    assert_eq!(state.generation(), updater.stats().total());
    assert_eq!(updater.stats().frame_flushes, 50);
}

#[test]
fn listeners_reading_state_do_not_stall_flushes() {
    let state = Arc::new(RenderState::with_surface(16, 16, 1, Screen::default()).unwrap());
    let observer = Arc::clone(&state);
    state.add_invalidate_fn(Box::new(move |_| {
        thread::sleep(Duration::from_millis(2));
        let _ = observer.snapshot();
        let _ = observer.actual_target();
    }));

    let (done_tx, done_rx) = bounded(1);
    let producer = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            let mut updater = threaded_updater("listener", RecordingBackend::new(EventLog::new()), &state);
            for _ in 0..200 {
                updater.begin_frame();
                updater.end_frame();
            }
            updater.layer().queue().wait_idle();
            let _ = done_tx.send(updater.stats().frame_flushes);
        })
    };

    let flushes = done_rx
        .recv_timeout(Duration::from_secs(30))
        .expect("producer and worker deadlocked");
    producer.join().unwrap();

    assert_eq!(flushes, 200);
    assert_eq!(state.generation(), 200);
}

#[test]
fn snapshot_never_pairs_new_target_with_old_screen() {
    let state = Arc::new(RenderState::with_surface(16, 16, 1, Screen::default()).unwrap());
    let backend = RecordingBackend::new(EventLog::new()).with_finish_delay(Duration::from_millis(200));
    let mut updater = threaded_updater("torn", backend, &state);

    let old = state.snapshot();
    let drawing = Arc::clone(updater.layer().render_target().unwrap());
    let moved = old.actual_screen.translated(40.0, 0.0);
    state.set_current_screen(moved);

    updater.begin_frame();
    updater.draw_geometry(Geometry::with_indices(6));
    updater.end_frame();

    // The worker is still inside Finish; the swap has already happened.
    assert!(Arc::ptr_eq(&state.actual_target(), &drawing));
    let during = state.snapshot();
    let still_old = Arc::ptr_eq(&during.actual_target, &old.actual_target) && during.actual_screen == old.actual_screen;
    let already_new = Arc::ptr_eq(&during.actual_target, &drawing) && during.actual_screen == moved;
    assert!(still_old || already_new, "torn snapshot: {:?}", during);

    updater.layer().queue().wait_idle();
    let after = state.snapshot();
    assert!(Arc::ptr_eq(&after.actual_target, &drawing));
    assert_eq!(after.actual_screen, moved);
}
