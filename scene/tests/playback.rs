use std::time::Duration;

use rescue_replay_core::{
    AgentId, AgentState, AnimationCue, BoardConfig, BoardDefect, Command, DoorState, DoorStatus,
    EntityKind, Event, Facing, FirePhase, FireState, Frame, GridCoord, PoiKind, PoiState,
    ReplayError, SceneClass, ScoreField, ScoreStats, SlotKey, VisualHandle, VisualSink,
    WorldPosition,
};
use rescue_replay_scene::{apply, query, PlaybackStatus, Scene};

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Spawn {
        class: SceneClass,
        key: SlotKey,
        handle: VisualHandle,
    },
    Relocate {
        handle: VisualHandle,
    },
    Destroy {
        handle: VisualHandle,
    },
    Animate {
        handle: VisualHandle,
        cue: AnimationCue,
    },
    SetText {
        field: ScoreField,
        value: String,
    },
}

#[derive(Debug, Default)]
struct RecordingSink {
    next: u64,
    calls: Vec<Call>,
}

impl RecordingSink {
    fn handle_for(&self, wanted: SlotKey) -> Option<VisualHandle> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::Spawn { key, handle, .. } if *key == wanted => Some(*handle),
            _ => None,
        })
    }

    fn spawns_of(&self, wanted: SceneClass) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Spawn { class, .. } if *class == wanted))
            .count()
    }

    fn relocates_of(&self, wanted: VisualHandle) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Relocate { handle } if *handle == wanted))
            .count()
    }

    fn destroys_of(&self, wanted: VisualHandle) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Destroy { handle } if *handle == wanted))
            .count()
    }

    fn destroy_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Destroy { .. }))
            .count()
    }

    fn spawn_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Spawn { .. }))
            .count()
    }
}

impl VisualSink for RecordingSink {
    fn spawn(
        &mut self,
        class: SceneClass,
        key: SlotKey,
        _position: WorldPosition,
        _facing: Facing,
    ) -> VisualHandle {
        self.next += 1;
        let handle = VisualHandle::new(self.next);
        self.calls.push(Call::Spawn { class, key, handle });
        handle
    }

    fn relocate(&mut self, handle: VisualHandle, _position: WorldPosition) {
        self.calls.push(Call::Relocate { handle });
    }

    fn destroy(&mut self, handle: VisualHandle) {
        self.calls.push(Call::Destroy { handle });
    }

    fn trigger_animation(&mut self, handle: VisualHandle, cue: AnimationCue) {
        self.calls.push(Call::Animate { handle, cue });
    }

    fn set_text(&mut self, field: ScoreField, value: &str) {
        self.calls.push(Call::SetText {
            field,
            value: value.to_owned(),
        });
    }
}

fn clear_walls() -> Vec<String> {
    vec!["0000".repeat(8); 6]
}

fn agent(id: u32, row: u32, col: u32) -> AgentState {
    AgentState {
        id: AgentId::new(id),
        row,
        col,
        carrying: false,
        role: rescue_replay_core::AgentRole::Base,
    }
}

fn frame(step: u32, agents: Vec<AgentState>) -> Frame {
    Frame {
        step,
        agents,
        walls: clear_walls(),
        ..Frame::default()
    }
}

fn step_duration() -> Duration {
    BoardConfig::default().time_per_step()
}

fn start(scene: &mut Scene, frames: Vec<Frame>, sink: &mut RecordingSink) -> Vec<Event> {
    let mut events = Vec::new();
    apply(scene, Command::Start { frames }, sink, &mut events);
    events
}

fn tick(scene: &mut Scene, dt: Duration, sink: &mut RecordingSink) -> Vec<Event> {
    let mut events = Vec::new();
    apply(scene, Command::Tick { dt }, sink, &mut events);
    events
}

#[test]
fn single_frame_sequence_is_done_with_zero_ticks() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let events = start(&mut scene, vec![frame(0, vec![agent(1, 2, 2)])], &mut sink);

    assert_eq!(query::playback(&scene), PlaybackStatus::Done);
    assert!(events.contains(&Event::FrameAdvanced { index: 0 }));
    assert!(events.contains(&Event::SequenceDone));
    assert_eq!(sink.spawns_of(SceneClass::Agent), 1);
    assert!(sink
        .calls
        .iter()
        .all(|call| !matches!(call, Call::Relocate { .. })));
}

#[test]
fn empty_sequence_faults_without_touching_the_sink() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let events = start(&mut scene, Vec::new(), &mut sink);

    assert_eq!(
        query::playback(&scene),
        PlaybackStatus::Failed(ReplayError::EmptySequence)
    );
    assert_eq!(
        events,
        vec![Event::Fault {
            index: None,
            error: ReplayError::EmptySequence,
        }]
    );
    assert!(sink.calls.is_empty());
}

#[test]
fn moving_agent_is_relocated_once_and_never_recreated() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let frames = vec![
        frame(0, vec![agent(5, 1, 1)]),
        frame(1, vec![agent(5, 1, 4)]),
    ];
    let _ = start(&mut scene, frames, &mut sink);
    let handle = sink
        .handle_for(SlotKey::Agent(AgentId::new(5)))
        .expect("agent spawned");

    let events = tick(&mut scene, step_duration(), &mut sink);

    assert_eq!(query::playback(&scene), PlaybackStatus::Done);
    assert_eq!(sink.relocates_of(handle), 1, "exactly one move call");
    assert_eq!(sink.spawns_of(SceneClass::Agent), 1, "never respawned");
    assert_eq!(sink.destroys_of(handle), 0, "never destroyed");
    assert!(events.contains(&Event::AgentMoved {
        id: AgentId::new(5),
        from: GridCoord::new(1, 1),
        to: GridCoord::new(1, 4),
    }));
}

#[test]
fn partial_ticks_interpolate_and_the_last_tick_snaps_exactly() {
    let config = BoardConfig::default();
    let mut scene = Scene::new(config.clone());
    let mut sink = RecordingSink::default();

    let frames = vec![
        frame(0, vec![agent(1, 6, 1)]),
        frame(1, vec![agent(1, 6, 3)]),
    ];
    let _ = start(&mut scene, frames, &mut sink);

    let _ = tick(&mut scene, step_duration() / 2, &mut sink);
    let halfway = query::agent_view(&scene)
        .into_vec()
        .first()
        .map(|snapshot| snapshot.position)
        .expect("agent present");
    assert!((halfway.x - config.cell_size()).abs() < 1e-4, "midway in x");

    let _ = tick(&mut scene, step_duration(), &mut sink);
    let landed = query::agent_view(&scene)
        .into_vec()
        .first()
        .map(|snapshot| snapshot.position)
        .expect("agent present");
    assert_eq!(landed.x, 2.0 * config.cell_size(), "snapped, no overshoot");
    assert_eq!(landed.z, 0.0);
}

#[test]
fn door_open_transition_fires_its_animation_exactly_once() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let door = |status| DoorState {
        p1: GridCoord::new(2, 3),
        p2: GridCoord::new(2, 4),
        status,
    };
    let with_door = |step, status| Frame {
        doors: vec![door(status)],
        ..frame(step, Vec::new())
    };

    let frames = vec![
        with_door(0, DoorStatus::Closed),
        with_door(1, DoorStatus::Open),
        with_door(2, DoorStatus::Open),
    ];
    let mut events = start(&mut scene, frames, &mut sink);
    events.extend(tick(&mut scene, step_duration(), &mut sink));
    events.extend(tick(&mut scene, step_duration(), &mut sink));

    assert_eq!(query::playback(&scene), PlaybackStatus::Done);
    let opened = events
        .iter()
        .filter(|event| matches!(event, Event::DoorOpened { .. }))
        .count();
    assert_eq!(opened, 1);
    let cues = sink
        .calls
        .iter()
        .filter(|call| matches!(call, Call::Animate { cue: AnimationCue::OpenLateral, .. }))
        .count();
    assert_eq!(cues, 1, "re-triggering an already-open door is a no-op");
}

#[test]
fn reset_twice_issues_no_duplicate_destroys() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let mut full = frame(0, vec![agent(1, 1, 1)]);
    full.fires = vec![FireState {
        row: 2,
        col: 2,
        intensity: FirePhase::Fire,
    }];
    full.pois = vec![PoiState {
        row: 3,
        col: 3,
        kind: PoiKind::Victim,
        revealed: false,
    }];
    full.doors = vec![DoorState {
        p1: GridCoord::new(2, 3),
        p2: GridCoord::new(2, 4),
        status: DoorStatus::Closed,
    }];
    full.walls[0] = format!("1000{}", "0000".repeat(7));

    let _ = start(&mut scene, vec![full], &mut sink);
    let spawned = sink.spawn_count();
    assert!(spawned >= 5, "agent, fire, poi, door, frames and wall");

    let mut events = Vec::new();
    apply(&mut scene, Command::Reset, &mut sink, &mut events);
    assert_eq!(sink.destroy_count(), spawned);
    assert_eq!(query::playback(&scene), PlaybackStatus::Idle);

    apply(&mut scene, Command::Reset, &mut sink, &mut events);
    assert_eq!(sink.destroy_count(), spawned, "second reset destroys nothing");
}

#[test]
fn malformed_walls_keep_the_previous_geometry_standing() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let mut first = frame(0, vec![agent(1, 1, 1)]);
    first.walls[0] = format!("1000{}", "0000".repeat(7));
    let mut second = frame(1, vec![agent(1, 1, 2)]);
    second.walls = vec!["1000".to_owned()];

    let _ = start(&mut scene, vec![first, second], &mut sink);
    let walls_after_first = sink.spawns_of(SceneClass::Wall);
    assert_eq!(walls_after_first, 1);

    let events = tick(&mut scene, step_duration(), &mut sink);

    assert!(events.contains(&Event::Fault {
        index: Some(1),
        error: ReplayError::MalformedBoard(BoardDefect::RowCount {
            expected: 6,
            found: 1,
        }),
    }));
    assert_eq!(
        sink.spawns_of(SceneClass::Wall),
        walls_after_first,
        "no rebuild from the malformed payload"
    );
    let wall_handle = sink
        .calls
        .iter()
        .find_map(|call| match call {
            Call::Spawn {
                class: SceneClass::Wall,
                handle,
                ..
            } => Some(*handle),
            _ => None,
        })
        .expect("wall spawned");
    assert_eq!(sink.destroys_of(wall_handle), 0, "old wall left in place");
    assert_eq!(query::playback(&scene), PlaybackStatus::Done);
}

#[test]
fn unknown_agent_reference_is_faulted_and_skipped() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let frames = vec![
        frame(0, vec![agent(1, 1, 1)]),
        frame(1, vec![agent(1, 1, 2), agent(9, 3, 3)]),
    ];
    let events = start(&mut scene, frames, &mut sink);

    assert!(events.contains(&Event::Fault {
        index: Some(1),
        error: ReplayError::UnknownAgent {
            id: AgentId::new(9)
        },
    }));
    assert!(sink.handle_for(SlotKey::Agent(AgentId::new(9))).is_none());

    let _ = tick(&mut scene, step_duration(), &mut sink);
    assert_eq!(sink.spawns_of(SceneClass::Agent), 1);
}

#[test]
fn agent_missing_from_the_next_frame_stays_put() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let frames = vec![
        frame(0, vec![agent(1, 1, 1), agent(2, 4, 4)]),
        frame(1, vec![agent(1, 1, 2)]),
    ];
    let events = start(&mut scene, frames, &mut sink);
    assert!(events.contains(&Event::AgentAbsent {
        id: AgentId::new(2),
        index: 1,
    }));

    let straggler = sink
        .handle_for(SlotKey::Agent(AgentId::new(2)))
        .expect("agent 2 spawned");
    let _ = tick(&mut scene, step_duration(), &mut sink);

    assert_eq!(sink.relocates_of(straggler), 0);
    assert_eq!(sink.destroys_of(straggler), 0);
    let cells: Vec<GridCoord> = query::agent_view(&scene)
        .into_vec()
        .into_iter()
        .map(|snapshot| snapshot.cell)
        .collect();
    assert_eq!(cells, vec![GridCoord::new(1, 2), GridCoord::new(4, 4)]);
}

#[test]
fn one_large_tick_completes_several_transitions_in_order() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let frames = (0..4)
        .map(|step| frame(step, vec![agent(1, 1, step + 1)]))
        .collect();
    let _ = start(&mut scene, frames, &mut sink);

    let events = tick(&mut scene, step_duration() * 3, &mut sink);

    assert_eq!(query::playback(&scene), PlaybackStatus::Done);
    let advanced: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            Event::FrameAdvanced { index } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(advanced, vec![1, 2, 3]);
    assert!(events.contains(&Event::SequenceDone));
    let moved = events
        .iter()
        .filter(|event| matches!(event, Event::AgentMoved { .. }))
        .count();
    assert_eq!(moved, 3);
}

#[test]
fn restart_resets_the_previous_sequence_before_seeding() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let first = vec![
        frame(0, vec![agent(1, 1, 1)]),
        frame(1, vec![agent(1, 1, 2)]),
    ];
    let _ = start(&mut scene, first, &mut sink);
    let old_agent = sink
        .handle_for(SlotKey::Agent(AgentId::new(1)))
        .expect("first sequence agent");
    let _ = tick(&mut scene, step_duration() / 2, &mut sink);

    let second = vec![frame(0, vec![agent(7, 2, 2)])];
    let _ = start(&mut scene, second, &mut sink);

    assert_eq!(sink.destroys_of(old_agent), 1, "old handle torn down");
    assert!(sink.handle_for(SlotKey::Agent(AgentId::new(7))).is_some());
    assert_eq!(query::playback(&scene), PlaybackStatus::Done);
    let ids: Vec<AgentId> = query::agent_view(&scene)
        .into_vec()
        .into_iter()
        .map(|snapshot| snapshot.id)
        .collect();
    assert_eq!(ids, vec![AgentId::new(7)]);
}

#[test]
fn score_text_is_overwritten_every_frame() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let mut first = frame(0, Vec::new());
    first.stats = ScoreStats {
        saved: 0,
        lost: 0,
        damage: 1,
    };
    let mut second = frame(1, Vec::new());
    second.stats = ScoreStats {
        saved: 2,
        lost: 1,
        damage: 5,
    };

    let _ = start(&mut scene, vec![first, second], &mut sink);
    let _ = tick(&mut scene, step_duration(), &mut sink);

    let saved: Vec<&str> = sink
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::SetText {
                field: ScoreField::Saved,
                value,
            } => Some(value.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(saved, vec!["0", "2"]);
    assert_eq!(
        query::score(&scene),
        ScoreStats {
            saved: 2,
            lost: 1,
            damage: 5,
        }
    );
}

#[test]
fn fire_markers_beyond_capacity_fault_and_skip() {
    let config = BoardConfig::default().with_fire_capacity(1);
    let mut scene = Scene::new(config);
    let mut sink = RecordingSink::default();

    let mut single = frame(0, Vec::new());
    single.fires = vec![
        FireState {
            row: 1,
            col: 1,
            intensity: FirePhase::Fire,
        },
        FireState {
            row: 1,
            col: 2,
            intensity: FirePhase::Smoke,
        },
    ];

    let events = start(&mut scene, vec![single], &mut sink);

    assert_eq!(sink.spawns_of(SceneClass::Fire), 1);
    assert_eq!(sink.spawns_of(SceneClass::Smoke), 0);
    assert!(events.contains(&Event::Fault {
        index: Some(0),
        error: ReplayError::CapacityExceeded {
            kind: EntityKind::FireMarker,
            max: 1,
        },
    }));
}

#[test]
fn poi_reveal_fires_its_cue_once_and_false_alarms_vanish() {
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();

    let poi = |revealed, kind| PoiState {
        row: 2,
        col: 2,
        kind,
        revealed,
    };
    let with_poi = |step, revealed, kind| Frame {
        pois: vec![poi(revealed, kind)],
        ..frame(step, Vec::new())
    };

    let frames = vec![
        with_poi(0, false, PoiKind::Victim),
        with_poi(1, true, PoiKind::Victim),
        with_poi(2, true, PoiKind::Victim),
    ];
    let mut events = start(&mut scene, frames, &mut sink);
    events.extend(tick(&mut scene, step_duration(), &mut sink));
    events.extend(tick(&mut scene, step_duration(), &mut sink));

    assert_eq!(sink.spawns_of(SceneClass::HiddenPoi), 1);
    assert_eq!(sink.spawns_of(SceneClass::RevealedPoi), 2);
    let reveals = sink
        .calls
        .iter()
        .filter(|call| matches!(call, Call::Animate { cue: AnimationCue::Reveal, .. }))
        .count();
    assert_eq!(reveals, 1, "reveal cue fires once per cell");
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::PoiRevealed { .. }))
            .count(),
        1
    );

    // A discovered false alarm leaves no token behind.
    let mut scene = Scene::new(BoardConfig::default());
    let mut sink = RecordingSink::default();
    let frames = vec![
        with_poi(0, false, PoiKind::FalseAlarm),
        with_poi(1, true, PoiKind::FalseAlarm),
    ];
    let _ = start(&mut scene, frames, &mut sink);
    let _ = tick(&mut scene, step_duration(), &mut sink);
    assert_eq!(sink.spawns_of(SceneClass::HiddenPoi), 1);
    assert_eq!(sink.spawns_of(SceneClass::RevealedPoi), 0);
}
