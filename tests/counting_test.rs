use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use footfall_rs::{
    CentroidTracker, Counter, CounterConfig, CountingPipeline, CrossingEvaluator, Detection,
    DetectionSource, Direction, DirectionMapping, Error, Event, FrameDetections, FrameSize,
    FrameUpdate, LineOrientation, Presenter, ReplaySource, RoiLine, SummaryPresenter, Tally,
    Track, TrackerConfig,
};

const DOWN: [f32; 10] = [
    50.0, 80.0, 110.0, 140.0, 170.0, 230.0, 270.0, 310.0, 350.0, 400.0,
];

fn person(cx: f32, cy: f32) -> Detection {
    Detection::new(cx - 20.0, cy - 40.0, cx + 20.0, cy + 40.0, 0.9)
}

fn config() -> CounterConfig {
    CounterConfig {
        roi_position: 0.5,
        max_match_distance: 100.0,
        max_missed_frames: 5,
        direction_mapping: DirectionMapping::BelowIsEntry,
        ..CounterConfig::default()
    }
}

fn run(frames: Vec<Vec<Detection>>) -> (Tally, Vec<Event>) {
    let source = ReplaySource::from_sequence(640, 400, frames);
    let mut pipeline = CountingPipeline::new(source, config()).unwrap();
    let mut summary = SummaryPresenter::new(Vec::new(), "out.mp4");
    let tally = pipeline.run(&mut summary, &AtomicBool::new(false)).unwrap();
    (tally, pipeline.events().to_vec())
}

#[test]
fn test_single_person_walking_down_enters_once() {
    let frames = DOWN.iter().map(|&y| vec![person(320.0, y)]).collect();
    let (tally, events) = run(frames);

    assert_eq!(
        events,
        vec![Event {
            track_id: 1,
            direction: Direction::Entry,
            frame_index: 6,
        }]
    );
    assert_eq!(tally, Tally { entries: 1, exits: 0 });
}

#[test]
fn test_opposite_walkers_cancel_out() {
    let frames = DOWN
        .iter()
        .zip(DOWN.iter().rev())
        .map(|(&down, &up)| vec![person(100.0, down), person(500.0, up)])
        .collect();
    let (tally, events) = run(frames);

    assert_eq!(tally, Tally { entries: 1, exits: 1 });
    assert_eq!(tally.net(), 0);
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| e.track_id == 1 && e.direction == Direction::Entry));
    assert!(events.iter().any(|e| e.track_id == 2 && e.direction == Direction::Exit));
}

#[test]
fn test_spawned_past_line_never_counts() {
    let frames = [300.0, 320.0, 350.0, 380.0, 390.0]
        .iter()
        .map(|&y| vec![person(320.0, y)])
        .collect();
    let (tally, events) = run(frames);
    assert!(events.is_empty());
    assert_eq!(tally, Tally::default());
}

#[test]
fn test_round_trip_counted_once() {
    let ys = [150.0, 180.0, 230.0, 260.0, 220.0, 170.0, 140.0];

    let evaluator = CrossingEvaluator::new(
        RoiLine::from_pixel(200.0, LineOrientation::Horizontal),
        DirectionMapping::BelowIsEntry,
    );
    let mut track = Track::new(1, &person(320.0, ys[0]), 1, 30);
    let mut emitted = Vec::new();
    emitted.extend(evaluator.evaluate(&mut track));
    for (i, &y) in ys.iter().enumerate().skip(1) {
        track.update(&person(320.0, y), i as u64 + 1);
        emitted.extend(evaluator.evaluate(&mut track));
    }
    let directions: Vec<Direction> = emitted.iter().map(|e| e.direction).collect();
    assert_eq!(directions, vec![Direction::Entry, Direction::Exit]);

    // The counter keeps only the first crossing of a track.
    let frames = ys.iter().map(|&y| vec![person(320.0, y)]).collect();
    let (tally, events) = run(frames);
    assert_eq!(tally, Tally { entries: 1, exits: 0 });
    assert_eq!(events.len(), 1);
}

#[test]
fn test_record_is_idempotent_per_track() {
    let mut counter = Counter::new();
    let mut track = Track::new(9, &person(0.0, 0.0), 1, 30);
    let entry = Event {
        track_id: 9,
        direction: Direction::Entry,
        frame_index: 4,
    };
    let exit = Event {
        direction: Direction::Exit,
        frame_index: 8,
        ..entry
    };
    counter.record(&entry, &mut track);
    let tally = counter.record(&exit, &mut track);
    assert_eq!(tally.total(), 1);
}

#[test]
fn test_runs_are_deterministic() {
    let frames: Vec<Vec<Detection>> = (0..20)
        .map(|i| {
            let t = i as f32;
            vec![
                person(100.0 + t * 3.0, 40.0 + t * 20.0),
                person(400.0, 380.0 - t * 18.0),
                person(250.0 + t * 2.0, 200.0),
            ]
        })
        .collect();

    let ids_per_frame = |frames: &[Vec<Detection>]| {
        let mut tracker = CentroidTracker::new(TrackerConfig {
            max_match_distance: 60.0,
            max_missed_frames: 3,
            history_len: 30,
        });
        frames
            .iter()
            .enumerate()
            .map(|(i, dets)| {
                tracker
                    .update(dets, i as u64 + 1)
                    .iter()
                    .map(|t| (t.track_id, t.last_seen_frame))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(ids_per_frame(&frames[..]), ids_per_frame(&frames[..]));
    assert_eq!(run(frames.clone()), run(frames));
}

#[test]
fn test_eviction_after_missed_window() {
    let mut tracker = CentroidTracker::new(TrackerConfig {
        max_match_distance: 50.0,
        max_missed_frames: 3,
        history_len: 30,
    });
    tracker.update(&[person(100.0, 100.0)], 1);
    for frame in 2..=4 {
        assert_eq!(tracker.update(&[], frame).len(), 1, "frame {frame}");
    }
    assert!(tracker.update(&[], 5).is_empty());

    // A reappearance gets a fresh identity.
    let tracks = tracker.update(&[person(100.0, 100.0)], 6);
    assert_eq!(tracks[0].track_id, 2);
}

#[test]
fn test_long_gap_starts_new_identity_without_counting() {
    let frames = vec![
        FrameDetections::new(1, vec![person(320.0, 170.0)]),
        FrameDetections::new(100, vec![person(320.0, 240.0)]),
    ];
    let source = ReplaySource::new(640, 400, frames);
    let mut pipeline = CountingPipeline::new(source, config()).unwrap();
    let tally = pipeline
        .run(&mut SummaryPresenter::new(Vec::new(), "out.mp4"), &AtomicBool::new(false))
        .unwrap();

    assert_eq!(tally, Tally::default());
    assert!(pipeline.events().is_empty());
    let ids: Vec<u64> = pipeline.tracker().tracks().map(|t| t.track_id).collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn test_brief_dropout_keeps_identity_and_counts() {
    let mut frames: Vec<Vec<Detection>> = DOWN.iter().map(|&y| vec![person(320.0, y)]).collect();
    frames[5].clear();
    let (tally, events) = run(frames);
    assert_eq!(tally.entries, 1);
    assert_eq!(events[0].track_id, 1);
    assert_eq!(events[0].frame_index, 7);
}

#[test]
fn test_malformed_and_weak_detections_are_dropped() {
    let frames = DOWN
        .iter()
        .map(|&y| {
            vec![
                person(320.0, y),
                Detection::new(50.0, 300.0, 10.0, 200.0, 0.9),
                Detection::new(560.0, 400.0 - y, 600.0, 480.0 - y, 0.2),
            ]
        })
        .collect();
    let (tally, events) = run(frames);
    assert_eq!(tally, Tally { entries: 1, exits: 0 });
    assert_eq!(events[0].track_id, 1);
}

#[test]
fn test_vertical_line_with_flipped_mapping() {
    let frames = [160.0, 240.0, 300.0, 380.0, 460.0]
        .iter()
        .map(|&x| vec![person(x, 200.0)])
        .collect::<Vec<_>>();
    let source = ReplaySource::from_sequence(640, 400, frames);
    let config = CounterConfig {
        orientation: LineOrientation::Vertical,
        direction_mapping: DirectionMapping::AboveIsEntry,
        ..config()
    };
    let mut pipeline = CountingPipeline::new(source, config).unwrap();
    assert_eq!(pipeline.line().pixel(), 320.0);
    let tally = pipeline
        .run(&mut SummaryPresenter::new(Vec::new(), "out.mp4"), &AtomicBool::new(false))
        .unwrap();
    assert_eq!(tally, Tally { entries: 0, exits: 1 });
}

struct StopAfter<'a> {
    frame_index: u64,
    stop: &'a AtomicBool,
    finished: Option<Tally>,
}

impl Presenter for StopAfter<'_> {
    fn on_frame(&mut self, update: &FrameUpdate<'_>) -> footfall_rs::Result<()> {
        if update.frame_index == self.frame_index {
            self.stop.store(true, Ordering::Relaxed);
        }
        Ok(())
    }

    fn finish(&mut self, tally: &Tally, _events: &[Event]) -> footfall_rs::Result<()> {
        self.finished = Some(*tally);
        Ok(())
    }
}

#[test]
fn test_stop_signal_flushes_tally() {
    let frames: Vec<_> = DOWN.iter().map(|&y| vec![person(320.0, y)]).collect();
    let source = ReplaySource::from_sequence(640, 400, frames);
    let mut pipeline = CountingPipeline::new(source, config()).unwrap();

    let stop = AtomicBool::new(false);
    let mut presenter = StopAfter {
        frame_index: 7,
        stop: &stop,
        finished: None,
    };
    let tally = pipeline.run(&mut presenter, &stop).unwrap();

    assert_eq!(pipeline.frames_processed(), 7);
    assert_eq!(tally.entries, 1);
    assert_eq!(presenter.finished, Some(tally));
}

#[derive(Debug)]
struct CameraUnplugged;

impl fmt::Display for CameraUnplugged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("camera unplugged")
    }
}

impl std::error::Error for CameraUnplugged {}

struct FlakySource {
    frames: std::vec::IntoIter<FrameDetections>,
}

impl DetectionSource for FlakySource {
    type Error = CameraUnplugged;

    fn frame_size(&self) -> FrameSize {
        FrameSize::new(640, 400)
    }

    fn next_frame(&mut self) -> Result<Option<FrameDetections>, Self::Error> {
        self.frames.next().map(Some).ok_or(CameraUnplugged)
    }
}

#[test]
fn test_source_failure_still_writes_summary() {
    let frames: Vec<FrameDetections> = DOWN[..7]
        .iter()
        .enumerate()
        .map(|(i, &y)| FrameDetections::new(i as u64 + 1, vec![person(320.0, y)]))
        .collect();
    let source = FlakySource {
        frames: frames.into_iter(),
    };
    let mut pipeline = CountingPipeline::new(source, config()).unwrap();
    let mut summary = SummaryPresenter::new(Vec::new(), "out.mp4");

    let result = pipeline.run(&mut summary, &AtomicBool::new(false));
    assert!(matches!(result, Err(Error::Source(_))));
    assert_eq!(pipeline.tally().entries, 1);

    let text = String::from_utf8(summary.into_inner()).unwrap();
    assert_eq!(text, "Entries: 1\nExits: 0\nNet: 1\nOutput: out.mp4\n");
}
