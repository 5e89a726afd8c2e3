use anteater_core::{
    Command, Direction, EntityId, EntitySnapshot, EntityView, Event, GridCoord, HaltReason, Point,
    PolygonKind, TongueState, POINTS_PER_CAPTURE,
};
use anteater_tongue::{self as tongue, Config, TickOutcome, TickStep, Tongue};
use std::{
    io,
    sync::{Arc, Mutex},
};

fn fast_config() -> Config {
    Config {
        move_cooldown: 1,
        ..Config::default()
    }
}

fn fast_tongue() -> Tongue {
    Tongue::new(fast_config()).expect("valid config")
}

fn ant(id: u32, x: f64, y: f64) -> EntitySnapshot {
    EntitySnapshot {
        id: EntityId::new(id),
        position: Point::new(x, y),
        half_extent: 5.0,
    }
}

fn run(tongue: &mut Tongue, view: &EntityView, ticks: usize) -> Vec<TickOutcome> {
    (0..ticks).map(|_| tongue.advance_tick(view)).collect()
}

fn turn_and_run(
    tongue: &mut Tongue,
    view: &EntityView,
    direction: Direction,
    ticks: usize,
) -> Vec<TickOutcome> {
    assert!(
        tongue.set_next_direction(direction),
        "turn to {direction:?} should be accepted"
    );
    run(tongue, view, ticks)
}

#[test]
fn scenario_a_rectangle_closes_on_the_anchor() {
    let mut tongue = Tongue::new(Config {
        move_cooldown: 1,
        capture_delay: 3,
        ..Config::default()
    })
    .expect("valid config");
    let inside = ant(1, 350.0, 210.0);
    let outside = ant(2, 100.0, 100.0);
    let view = EntityView::from_snapshots(vec![inside, outside]);

    assert!(tongue.begin_extend());
    let _ = run(&mut tongue, &view, 10);
    let _ = turn_and_run(&mut tongue, &view, Direction::West, 5);
    let _ = turn_and_run(&mut tongue, &view, Direction::North, 10);
    let approach = turn_and_run(&mut tongue, &view, Direction::East, 4);
    assert!(approach
        .iter()
        .all(|outcome| matches!(outcome.step, TickStep::Advanced { .. })));
    assert_eq!(tongue.occupied_cells().len(), 30);

    let closing = tongue.advance_tick(&view);
    assert_eq!(closing.state, TongueState::LoopActive);
    assert_eq!(
        closing.step,
        TickStep::LoopFormed {
            at_index: 29,
            cell_count: 30,
            trapped: vec![EntityId::new(1)],
        }
    );

    let result = tongue.loop_result().expect("loop is active");
    assert_eq!(result.loop_path().first(), Some(&GridCoord::new(19, 5)));
    assert_eq!(result.loop_path().last(), Some(&GridCoord::new(20, 5)));
    for cell in result.loop_cells() {
        let on_ring = cell.column() == 15
            || cell.column() == 20
            || cell.row() == 5
            || cell.row() == 15;
        assert!(on_ring, "{cell:?} is not on the 6x11 ring");
    }

    let region = tongue.capture_region().expect("region is active");
    assert_eq!(region.polygon().kind(), PolygonKind::Traced);
    assert_eq!(
        tongue.test_capture(&[Point::new(350.0, 210.0), Point::new(100.0, 100.0)]),
        vec![true, false]
    );
    assert_eq!(tongue.trapped(), &[EntityId::new(1)]);
}

#[test]
fn capture_fires_when_countdown_reaches_zero() {
    let mut tongue = Tongue::new(Config {
        move_cooldown: 1,
        capture_delay: 3,
        ..Config::default()
    })
    .expect("valid config");
    let view = EntityView::from_snapshots(vec![ant(4, 420.0, 120.0)]);

    assert!(tongue.begin_extend());
    let _ = run(&mut tongue, &view, 1);
    let _ = turn_and_run(&mut tongue, &view, Direction::East, 1);
    let _ = turn_and_run(&mut tongue, &view, Direction::North, 1);
    let closing = turn_and_run(&mut tongue, &view, Direction::West, 1);
    assert_eq!(closing[0].state, TongueState::LoopActive);
    let frozen = tongue.occupied_cells();

    let countdown = run(&mut tongue, &view, 2);
    assert_eq!(countdown[0].step, TickStep::Countdown { remaining: 2 });
    assert_eq!(countdown[1].step, TickStep::Countdown { remaining: 1 });
    assert!(countdown.iter().all(|outcome| outcome.capture.is_none()));
    assert_eq!(tongue.occupied_cells(), frozen, "path is frozen while looping");

    let finish = tongue.advance_tick(&view);
    assert_eq!(finish.state, TongueState::Idle);
    assert_eq!(finish.step, TickStep::Captured);
    let capture = finish.capture.expect("capture event on the final tick");
    assert_eq!(capture.captured, vec![EntityId::new(4)]);
    assert_eq!(capture.polygon.len(), 8, "2x2 block perimeter corners");
    assert_eq!(capture.score(POINTS_PER_CAPTURE), 10);

    assert_eq!(tongue.occupied_cells(), vec![GridCoord::new(20, 5)]);
    assert_eq!(tongue.direction(), Direction::South);
    assert!(tongue.loop_result().is_none());
}

#[test]
fn capture_reports_entities_inside_on_the_capture_tick() {
    let mut tongue = Tongue::new(Config {
        move_cooldown: 1,
        capture_delay: 1,
        ..Config::default()
    })
    .expect("valid config");
    let before = EntityView::from_snapshots(vec![ant(1, 420.0, 120.0)]);

    assert!(tongue.begin_extend());
    let _ = run(&mut tongue, &before, 1);
    let _ = turn_and_run(&mut tongue, &before, Direction::East, 1);
    let _ = turn_and_run(&mut tongue, &before, Direction::North, 1);
    let _ = turn_and_run(&mut tongue, &before, Direction::West, 1);
    assert_eq!(tongue.trapped(), &[EntityId::new(1)]);

    let after = EntityView::from_snapshots(vec![ant(1, 600.0, 400.0)]);
    let finish = tongue.advance_tick(&after);
    let capture = finish.capture.expect("capture fires after one tick");
    assert!(capture.captured.is_empty());
}

#[test]
fn extensions_grow_path_in_reverse_chronological_order() {
    let mut tongue = fast_tongue();
    let view = EntityView::default();
    assert!(tongue.begin_extend());

    let mut visited = vec![GridCoord::new(20, 5)];
    for outcome in run(&mut tongue, &view, 3) {
        let TickStep::Advanced { to, .. } = outcome.step else {
            panic!("expected the head to advance, got {:?}", outcome.step);
        };
        visited.push(to);
    }
    for outcome in turn_and_run(&mut tongue, &view, Direction::East, 4) {
        let TickStep::Advanced { to, .. } = outcome.step else {
            panic!("expected the head to advance, got {:?}", outcome.step);
        };
        visited.push(to);
    }

    visited.reverse();
    assert_eq!(tongue.occupied_cells().len(), 8);
    assert_eq!(tongue.occupied_cells(), visited);
}

#[test]
fn reversal_requests_are_ignored() {
    let mut tongue = fast_tongue();
    let view = EntityView::default();
    assert!(!tongue.set_next_direction(Direction::North));
    assert_eq!(tongue.next_direction(), Direction::South);

    assert!(tongue.begin_extend());
    let _ = turn_and_run(&mut tongue, &view, Direction::East, 1);
    assert!(!tongue.set_next_direction(Direction::West));
    let outcome = tongue.advance_tick(&view);
    assert_eq!(
        outcome.step,
        TickStep::Advanced {
            from: GridCoord::new(21, 5),
            to: GridCoord::new(22, 5),
        }
    );
}

#[test]
fn leaving_the_grid_retracts_back_to_idle() {
    let mut tongue = Tongue::new(Config {
        columns: 6,
        rows: 6,
        anchor: GridCoord::new(2, 2),
        move_cooldown: 1,
        ..Config::default()
    })
    .expect("valid config");
    let view = EntityView::default();
    assert!(tongue.begin_extend());

    let _ = run(&mut tongue, &view, 3);
    assert_eq!(tongue.path().head(), GridCoord::new(2, 5));
    let halted = tongue.advance_tick(&view);
    assert_eq!(
        halted.step,
        TickStep::Halted {
            reason: HaltReason::OutOfBounds
        }
    );
    assert_eq!(halted.state, TongueState::Retracting);
    assert_eq!(tongue.occupied_cells().len(), 4);

    let retracting = run(&mut tongue, &view, 3);
    assert!(retracting
        .iter()
        .all(|outcome| matches!(outcome.step, TickStep::Retracted { .. })));
    let last = tongue.advance_tick(&view);
    assert_eq!(last.step, TickStep::FullyRetracted);
    assert_eq!(last.state, TongueState::Idle);
    assert_eq!(tongue.occupied_cells(), vec![GridCoord::new(2, 2)]);
    assert_eq!(tongue.direction(), Direction::South);
}

#[test]
fn max_length_forces_retraction() {
    let mut tongue = Tongue::new(Config {
        move_cooldown: 1,
        max_segments: 4,
        ..Config::default()
    })
    .expect("valid config");
    let view = EntityView::default();
    assert!(tongue.begin_extend());

    let outcomes = run(&mut tongue, &view, 4);
    assert_eq!(
        outcomes[3].step,
        TickStep::Halted {
            reason: HaltReason::MaxLengthReached
        }
    );
    assert_eq!(tongue.state(), TongueState::Retracting);
    assert_eq!(tongue.occupied_cells().len(), 4);
}

#[test]
fn releasing_extend_retracts_and_pressing_again_resumes() {
    let mut tongue = fast_tongue();
    let view = EntityView::default();
    assert!(tongue.begin_extend());
    let _ = run(&mut tongue, &view, 3);

    assert!(tongue.end_extend());
    assert!(!tongue.end_extend());
    let outcome = tongue.advance_tick(&view);
    assert_eq!(
        outcome.step,
        TickStep::Retracted {
            removed: GridCoord::new(20, 8)
        }
    );

    assert!(tongue.begin_extend());
    assert_eq!(tongue.state(), TongueState::Extending);
    let outcome = tongue.advance_tick(&view);
    assert_eq!(
        outcome.step,
        TickStep::Advanced {
            from: GridCoord::new(20, 7),
            to: GridCoord::new(20, 8),
        }
    );
}

#[test]
fn reset_is_idempotent_and_discards_loops() {
    let mut tongue = fast_tongue();
    let view = EntityView::default();
    assert!(tongue.begin_extend());
    let _ = run(&mut tongue, &view, 1);
    let _ = turn_and_run(&mut tongue, &view, Direction::East, 1);
    let _ = turn_and_run(&mut tongue, &view, Direction::North, 1);
    let _ = turn_and_run(&mut tongue, &view, Direction::West, 1);
    assert_eq!(tongue.state(), TongueState::LoopActive);
    assert!(!tongue.begin_extend(), "extend is ignored while looping");

    tongue.reset();
    let once = (
        tongue.state(),
        tongue.occupied_cells(),
        tongue.direction(),
        tongue.next_direction(),
        tongue.capture_countdown(),
    );
    tongue.reset();
    let twice = (
        tongue.state(),
        tongue.occupied_cells(),
        tongue.direction(),
        tongue.next_direction(),
        tongue.capture_countdown(),
    );

    assert_eq!(once, twice);
    assert_eq!(once.0, TongueState::Idle);
    assert_eq!(once.1, vec![GridCoord::new(20, 5)]);
    assert!(tongue.loop_result().is_none());
}

#[test]
fn scenario_d_test_capture_without_loop_is_all_false() {
    let mut tongue = fast_tongue();
    let points = [
        Point::new(410.0, 110.0),
        Point::new(0.0, 0.0),
        Point::new(799.0, 599.0),
    ];

    assert_eq!(tongue.test_capture(&points), vec![false; 3]);
    assert!(tongue.test_capture(&[]).is_empty());

    assert!(tongue.begin_extend());
    let before = tongue.occupied_cells();
    assert_eq!(tongue.test_capture(&points), vec![false; 3]);
    assert_eq!(tongue.occupied_cells(), before);
    assert_eq!(tongue.state(), TongueState::Extending);
}

#[test]
fn empty_loops_are_released_when_configured() {
    let mut tongue = Tongue::new(Config {
        move_cooldown: 1,
        release_empty_loops: true,
        ..Config::default()
    })
    .expect("valid config");
    let view = EntityView::from_snapshots(vec![ant(1, 700.0, 500.0)]);
    assert!(tongue.begin_extend());
    let _ = run(&mut tongue, &view, 1);
    let _ = turn_and_run(&mut tongue, &view, Direction::East, 1);
    let _ = turn_and_run(&mut tongue, &view, Direction::North, 1);
    let closing = turn_and_run(&mut tongue, &view, Direction::West, 1);

    assert_eq!(
        closing[0].step,
        TickStep::LoopReleased {
            at_index: 3,
            cell_count: 4,
        }
    );
    assert_eq!(closing[0].state, TongueState::Retracting);
    assert!(tongue.loop_result().is_none());
}

#[test]
fn tongue_contact_covers_every_occupied_cell() {
    let mut tongue = fast_tongue();
    let view = EntityView::from_snapshots(vec![ant(1, 410.0, 150.0), ant(2, 410.0, 250.0)]);
    assert!(tongue.begin_extend());
    let _ = run(&mut tongue, &view, 2);

    assert_eq!(tongue.touching(&view), vec![EntityId::new(1)]);
}

#[test]
fn commands_report_events_in_order() {
    let mut tongue = Tongue::new(Config {
        move_cooldown: 1,
        capture_delay: 1,
        ..Config::default()
    })
    .expect("valid config");
    let view = EntityView::from_snapshots(vec![ant(3, 420.0, 120.0)]);
    let mut events = Vec::new();

    let script = [
        Command::BeginExtend,
        Command::Tick,
        Command::SetNextDirection {
            direction: Direction::East,
        },
        Command::Tick,
        Command::SetNextDirection {
            direction: Direction::West,
        },
        Command::SetNextDirection {
            direction: Direction::North,
        },
        Command::Tick,
        Command::SetNextDirection {
            direction: Direction::West,
        },
        Command::Tick,
        Command::Tick,
        Command::Reset,
    ];
    for command in script {
        tongue::apply(&mut tongue, command, &view, &mut events);
    }

    assert_eq!(events.len(), 8, "unexpected events: {events:?}");
    assert_eq!(events[0], Event::ExtendStarted);
    assert_eq!(
        events[1],
        Event::HeadAdvanced {
            from: GridCoord::new(20, 5),
            to: GridCoord::new(20, 6),
        }
    );
    assert_eq!(
        events[3],
        Event::DirectionRejected {
            requested: Direction::West
        }
    );
    assert_eq!(
        events[5],
        Event::LoopFormed {
            at_index: 3,
            cell_count: 4,
            trapped: vec![EntityId::new(3)],
        }
    );
    let Event::Captured(capture) = &events[6] else {
        panic!("expected a capture, got {:?}", events[6]);
    };
    assert_eq!(capture.captured, vec![EntityId::new(3)]);
    assert_eq!(events[7], Event::ResetPerformed);
}

#[test]
fn invalid_configuration_is_rejected() {
    let error = Tongue::new(Config {
        anchor: GridCoord::new(-1, 3),
        ..Config::default()
    })
    .expect_err("anchor outside the grid");
    assert_eq!(
        error.to_string(),
        "anchor (-1, 3) lies outside the grid"
    );
}

#[test]
fn zero_capture_delay_captures_on_the_next_tick() {
    let mut tongue = Tongue::new(Config {
        move_cooldown: 1,
        capture_delay: 0,
        ..Config::default()
    })
    .expect("valid config");
    let view = EntityView::from_snapshots(vec![ant(6, 420.0, 120.0)]);
    assert!(tongue.begin_extend());
    let _ = run(&mut tongue, &view, 1);
    let _ = turn_and_run(&mut tongue, &view, Direction::East, 1);
    let _ = turn_and_run(&mut tongue, &view, Direction::North, 1);
    let closing = turn_and_run(&mut tongue, &view, Direction::West, 1);
    assert_eq!(closing[0].state, TongueState::LoopActive);
    assert_eq!(tongue.capture_countdown(), Some(0));

    let finish = tongue.advance_tick(&view);
    assert_eq!(finish.step, TickStep::Captured);
    assert_eq!(finish.state, TongueState::Idle);
    let capture = finish.capture.expect("capture fires one tick after the loop");
    assert_eq!(capture.captured, vec![EntityId::new(6)]);
}

#[test]
fn huge_max_segments_is_accepted_without_preallocating() {
    let config: Config =
        toml::from_str("max_segments = 9223372036854775807\nmove_cooldown = 1")
            .expect("config parses");
    assert_eq!(config.validate(), Ok(()));

    let mut tongue = Tongue::new(config).expect("valid config");
    assert_eq!(tongue.config().max_segments, 9_223_372_036_854_775_807);
    assert!(tongue.begin_extend());
    let outcome = tongue.advance_tick(&EntityView::default());
    assert_eq!(
        outcome.step,
        TickStep::Advanced {
            from: GridCoord::new(20, 5),
            to: GridCoord::new(20, 6),
        }
    );
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer lock")
            .extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn direct_reset_is_logged() {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut tongue = fast_tongue();
        assert!(tongue.begin_extend());
        tongue.reset();
    });

    let bytes = buffer.0.lock().expect("log buffer lock").clone();
    let logs = String::from_utf8(bytes).expect("logs are utf-8");
    assert!(
        logs.contains("tongue reset"),
        "reset() should log on its own, got {logs:?}"
    );
}
