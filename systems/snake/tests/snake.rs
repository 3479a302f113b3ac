use std::{collections::HashSet, time::Duration};

use grid_arcade_core::{
    CellCoord, Collectible, Direction, GridSize, RejectionReason, RewardClass, SnakeCommand,
    SnakeEvent, SnakePhase,
};
use grid_arcade_system_scheduling::VirtualClock;
use grid_arcade_system_snake::{Config, RewardTable, Snake, SnakeError, DEFAULT_TICK_INTERVAL};
use proptest::prelude::*;

fn regular(column: i32, row: i32) -> Collectible {
    Collectible {
        cell: CellCoord::new(column, row),
        class: RewardClass::Regular,
        reward: 10,
    }
}

fn started(config: Config, seed: u64, clock: &mut VirtualClock) -> Snake {
    let mut snake = Snake::from_seed(config, seed).expect("valid board");
    let mut events = Vec::new();
    snake.apply(SnakeCommand::Start, clock, &mut events);
    snake
}

fn tick(snake: &mut Snake, clock: &mut VirtualClock, events: &mut Vec<SnakeEvent>) {
    clock.advance(DEFAULT_TICK_INTERVAL);
    while let Some(timer) = clock.poll() {
        snake.apply(SnakeCommand::TimerFired { timer }, clock, events);
    }
}

fn is_contiguous(body: &[CellCoord]) -> bool {
    body.windows(2).all(|pair| pair[0].is_adjacent(pair[1]))
}

#[test]
fn eating_grows_the_snake_and_scores_the_reward() {
    let mut clock = VirtualClock::new();
    let mut snake = started(Config::default(), 3, &mut clock);
    snake
        .arrange(
            vec![CellCoord::new(10, 10)],
            Some(Direction::Right),
            Some(regular(11, 10)),
        )
        .expect("valid arrangement");

    let mut events = Vec::new();
    tick(&mut snake, &mut clock, &mut events);

    let snapshot = snake.snapshot();
    assert_eq!(
        snapshot.body,
        vec![CellCoord::new(11, 10), CellCoord::new(10, 10)]
    );
    assert_eq!(snapshot.score, 10);
    assert!(events.contains(&SnakeEvent::CollectibleConsumed {
        collectible: regular(11, 10),
        score: 10,
        length: 2,
    }));

    let replacement = snapshot.collectible.expect("board has room");
    assert!(!snapshot.body.contains(&replacement.cell));
    assert!(events.contains(&SnakeEvent::CollectibleSpawned {
        collectible: replacement
    }));
}

#[test]
fn leaving_the_grid_ends_the_game_with_the_body_unchanged() {
    let mut clock = VirtualClock::new();
    let mut snake = started(Config::default(), 3, &mut clock);
    let body = vec![CellCoord::new(0, 10), CellCoord::new(1, 10)];
    snake
        .arrange(body.clone(), Some(Direction::Left), Some(regular(5, 5)))
        .expect("valid arrangement");

    let mut events = Vec::new();
    tick(&mut snake, &mut clock, &mut events);

    assert_eq!(snake.phase(), SnakePhase::GameOver);
    assert_eq!(snake.snapshot().body, body);
    assert_eq!(
        events,
        vec![SnakeEvent::GameOver {
            final_score: 0,
            body,
        }]
    );
    assert_eq!(clock.pending(), 0, "game over cancels the interval");
}

#[test]
fn running_into_the_body_ends_the_game() {
    let mut clock = VirtualClock::new();
    let mut snake = started(Config::default(), 3, &mut clock);
    let body = vec![
        CellCoord::new(5, 5),
        CellCoord::new(6, 5),
        CellCoord::new(6, 6),
        CellCoord::new(5, 6),
        CellCoord::new(4, 6),
    ];
    snake
        .arrange(body.clone(), Some(Direction::Down), Some(regular(0, 0)))
        .expect("valid arrangement");

    let mut events = Vec::new();
    tick(&mut snake, &mut clock, &mut events);

    assert_eq!(snake.phase(), SnakePhase::GameOver);
    assert_eq!(snake.snapshot().body, body);
}

#[test]
fn chasing_the_tail_is_allowed() {
    let mut clock = VirtualClock::new();
    let mut snake = started(Config::default(), 3, &mut clock);
    snake
        .arrange(
            vec![
                CellCoord::new(5, 5),
                CellCoord::new(6, 5),
                CellCoord::new(6, 6),
                CellCoord::new(5, 6),
            ],
            Some(Direction::Down),
            Some(regular(0, 0)),
        )
        .expect("valid arrangement");

    let mut events = Vec::new();
    tick(&mut snake, &mut clock, &mut events);

    assert_eq!(snake.phase(), SnakePhase::Running);
    assert_eq!(
        snake.snapshot().body,
        vec![
            CellCoord::new(5, 6),
            CellCoord::new(5, 5),
            CellCoord::new(6, 5),
            CellCoord::new(6, 6),
        ]
    );
    assert_eq!(
        events,
        vec![SnakeEvent::Advanced {
            head: CellCoord::new(5, 6)
        }]
    );
}

#[test]
fn reversing_into_the_neck_is_rejected() {
    let mut clock = VirtualClock::new();
    let mut snake = started(Config::default(), 3, &mut clock);
    snake
        .arrange(
            vec![CellCoord::new(5, 5), CellCoord::new(4, 5)],
            Some(Direction::Right),
            Some(regular(0, 0)),
        )
        .expect("valid arrangement");

    let mut events = Vec::new();
    snake.apply(
        SnakeCommand::SetDirection {
            direction: Direction::Left,
        },
        &mut clock,
        &mut events,
    );

    assert_eq!(
        events,
        vec![SnakeEvent::InputRejected {
            reason: RejectionReason::Reversal
        }]
    );
    assert_eq!(snake.heading(), Some(Direction::Right));
}

#[test]
fn reversal_follows_actual_travel_not_the_last_request() {
    let mut clock = VirtualClock::new();
    let mut snake = started(Config::default(), 3, &mut clock);
    snake
        .arrange(
            vec![CellCoord::new(5, 5), CellCoord::new(4, 5)],
            Some(Direction::Right),
            Some(regular(0, 0)),
        )
        .expect("valid arrangement");

    let mut events = Vec::new();
    snake.set_direction(Direction::Up, &mut events);
    snake.set_direction(Direction::Left, &mut events);

    assert_eq!(snake.heading(), Some(Direction::Up));
    assert_eq!(
        events.last(),
        Some(&SnakeEvent::InputRejected {
            reason: RejectionReason::Reversal
        })
    );
}

#[test]
fn single_cell_snake_may_turn_any_way() {
    let mut snake = Snake::from_seed(Config::default(), 9).expect("valid board");
    let mut events = Vec::new();
    for direction in [Direction::Right, Direction::Left, Direction::Up, Direction::Down] {
        snake.set_direction(direction, &mut events);
        assert_eq!(snake.heading(), Some(direction));
    }
}

#[test]
fn game_over_freezes_input_until_reset() {
    let mut clock = VirtualClock::new();
    let mut snake = started(Config::default(), 3, &mut clock);
    snake
        .arrange(vec![CellCoord::new(0, 0)], Some(Direction::Up), None)
        .expect("valid arrangement");
    let mut events = Vec::new();
    tick(&mut snake, &mut clock, &mut events);
    assert_eq!(snake.phase(), SnakePhase::GameOver);

    events.clear();
    snake.apply(
        SnakeCommand::SetDirection {
            direction: Direction::Down,
        },
        &mut clock,
        &mut events,
    );
    snake.apply(SnakeCommand::Start, &mut clock, &mut events);
    assert_eq!(
        events,
        vec![
            SnakeEvent::InputRejected {
                reason: RejectionReason::GameOver
            };
            2
        ]
    );

    events.clear();
    snake.apply(SnakeCommand::Reset, &mut clock, &mut events);
    let snapshot = snake.snapshot();
    assert_eq!(snapshot.phase, SnakePhase::Running);
    assert_eq!(snapshot.body, vec![CellCoord::new(10, 10)]);
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.heading, None);
    assert_eq!(snapshot.level, 1);
    assert_eq!(events.first(), Some(&SnakeEvent::Reset));
    assert!(snake.is_ticking());
    assert_eq!(clock.pending(), 1);
}

#[test]
fn reset_mid_game_discards_the_previous_interval() {
    let mut clock = VirtualClock::new();
    let mut snake = started(Config::default(), 3, &mut clock);
    let mut events = Vec::new();
    snake.set_direction(Direction::Up, &mut events);
    tick(&mut snake, &mut clock, &mut events);

    snake.reset(&mut clock, &mut events);
    assert_eq!(clock.pending(), 1);

    events.clear();
    tick(&mut snake, &mut clock, &mut events);
    assert!(events.is_empty(), "fresh snake has no heading yet");
    assert_eq!(snake.snapshot().body, vec![CellCoord::new(10, 10)]);
}

#[test]
fn level_rises_with_apples_eaten() {
    let config = Config::new(
        GridSize::new(20, 20),
        DEFAULT_TICK_INTERVAL,
        RewardTable::default(),
        2,
    );
    let mut clock = VirtualClock::new();
    let mut snake = started(config, 3, &mut clock);
    snake
        .arrange(vec![CellCoord::new(0, 0)], Some(Direction::Right), None)
        .expect("valid arrangement");

    let mut events = Vec::new();
    for eaten in 1..=5u32 {
        let body = snake.snapshot().body;
        let ahead = body[0].step(Direction::Right);
        snake
            .arrange(
                body,
                Some(Direction::Right),
                Some(regular(ahead.column(), ahead.row())),
            )
            .expect("valid arrangement");
        tick(&mut snake, &mut clock, &mut events);
        assert_eq!(snake.len(), eaten as usize + 1);
        assert_eq!(snake.level(), 1 + eaten / 2);
    }
    assert_eq!(snake.score(), 50);
}

#[test]
fn arranged_heading_cannot_fold_back_onto_the_neck() {
    let mut clock = VirtualClock::new();
    let mut snake = started(Config::default(), 3, &mut clock);
    let body = vec![CellCoord::new(5, 5), CellCoord::new(4, 5)];

    assert_eq!(
        snake.arrange(body.clone(), Some(Direction::Left), Some(regular(0, 0))),
        Err(SnakeError::Reversal {
            heading: Direction::Left
        })
    );
    snake
        .arrange(body, Some(Direction::Right), Some(regular(0, 0)))
        .expect("valid arrangement");

    let mut events = Vec::new();
    tick(&mut snake, &mut clock, &mut events);

    assert_eq!(snake.phase(), SnakePhase::Running);
    assert_eq!(
        snake.snapshot().body,
        vec![CellCoord::new(6, 5), CellCoord::new(5, 5)]
    );
}

#[test]
fn long_snake_on_a_large_board_respawns_off_the_body() {
    let config = Config::new(
        GridSize::new(64, 64),
        DEFAULT_TICK_INTERVAL,
        RewardTable::default(),
        5,
    );
    let mut clock = VirtualClock::new();
    let mut snake = started(config, 11, &mut clock);

    let mut body: Vec<CellCoord> = (0..16)
        .flat_map(|row| {
            let columns: Vec<i32> = if row % 2 == 0 {
                (0..64).collect()
            } else {
                (0..64).rev().collect()
            };
            columns.into_iter().map(move |column| CellCoord::new(column, row))
        })
        .collect();
    body.reverse();
    assert_eq!(body[0], CellCoord::new(0, 15));
    snake
        .arrange(body, Some(Direction::Down), Some(regular(0, 16)))
        .expect("valid arrangement");

    let mut events = Vec::new();
    tick(&mut snake, &mut clock, &mut events);

    let snapshot = snake.snapshot();
    assert_eq!(snapshot.body.len(), 64 * 16 + 1);
    let replacement = snapshot.collectible.expect("board has room");
    assert!(snake.world().in_bounds(replacement.cell));
    assert!(!snapshot.body.contains(&replacement.cell));
}

#[test]
fn full_board_leaves_no_collectible() {
    let config = Config::new(
        GridSize::new(2, 1),
        Duration::from_millis(100),
        RewardTable::default(),
        5,
    );
    let mut snake = Snake::from_seed(config, 1).expect("valid board");
    let mut clock = VirtualClock::new();
    let mut events = Vec::new();
    snake.start(&mut clock, &mut events);
    snake
        .arrange(
            vec![CellCoord::new(1, 0)],
            Some(Direction::Left),
            Some(regular(0, 0)),
        )
        .expect("valid arrangement");

    clock.advance(Duration::from_millis(100));
    while let Some(timer) = clock.poll() {
        snake.handle_timer(timer, &mut clock, &mut events);
    }

    assert_eq!(snake.len(), 2);
    assert_eq!(snake.collectible(), None);
    assert_eq!(snake.phase(), SnakePhase::Running);
}

#[test]
fn identical_seeds_replay_identically() {
    let script = [
        SnakeCommand::SetDirection {
            direction: Direction::Up,
        },
        SnakeCommand::SetDirection {
            direction: Direction::Left,
        },
        SnakeCommand::SetDirection {
            direction: Direction::Down,
        },
    ];

    let replay = || {
        let mut clock = VirtualClock::new();
        let mut snake = started(Config::default(), 21, &mut clock);
        let mut events = Vec::new();
        for command in script.iter().cloned() {
            snake.apply(command, &mut clock, &mut events);
            for _ in 0..4 {
                tick(&mut snake, &mut clock, &mut events);
            }
        }
        (events, snake.snapshot())
    };

    assert_eq!(replay(), replay());
}

#[derive(Clone, Debug)]
enum Input {
    Turn(Direction),
    Tick,
    FeedAhead,
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        1 => prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
        .prop_map(Input::Turn),
        3 => Just(Input::Tick),
        1 => Just(Input::FeedAhead),
    ]
}

proptest! {
    #[test]
    fn ticks_keep_the_body_well_formed(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input_strategy(), 1..80),
    ) {
        let config = Config::new(
            GridSize::new(6, 6),
            DEFAULT_TICK_INTERVAL,
            RewardTable::default(),
            3,
        );
        let mut clock = VirtualClock::new();
        let mut snake = started(config, seed, &mut clock);
        let mut events = Vec::new();

        for input in inputs {
            match input {
                Input::Turn(direction) => snake.set_direction(direction, &mut events),
                Input::FeedAhead => {
                    let body = snake.snapshot().body;
                    if let Some(heading) = snake.heading() {
                        let ahead = body[0].step(heading);
                        let free = snake.world().in_bounds(ahead) && !body.contains(&ahead);
                        if free {
                            snake
                                .arrange(body, Some(heading), Some(regular(ahead.column(), ahead.row())))
                                .expect("free cell ahead");
                        }
                    }
                }
                Input::Tick => {
                    let before = snake.len();
                    events.clear();
                    tick(&mut snake, &mut clock, &mut events);
                    let ate = events
                        .iter()
                        .any(|event| matches!(event, SnakeEvent::CollectibleConsumed { .. }));
                    let expected = if ate { before + 1 } else { before };
                    prop_assert_eq!(snake.len(), expected);
                }
            }

            let body = snake.snapshot().body;
            let unique: HashSet<_> = body.iter().copied().collect();
            prop_assert_eq!(unique.len(), body.len());
            prop_assert!(is_contiguous(&body));
            prop_assert!(body.iter().all(|cell| snake.world().in_bounds(*cell)));
            if let Some(collectible) = snake.collectible() {
                prop_assert!(!body.contains(&collectible.cell));
            }
            if snake.phase() == SnakePhase::GameOver {
                break;
            }
        }
    }
}
