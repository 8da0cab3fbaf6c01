use forager_core::solver::{SolveConfig, solve};
use forager_core::world::{Simulator, World, load_world_from_string};
use forager_core::{Action, Direction, Movement, Position};

fn four_way(capacity: usize, max_actions: usize, cost_per_step: f64) -> SolveConfig {
    SolveConfig {
        movement: Movement::FourWay,
        capacity,
        cost_per_step,
        max_actions,
    }
}

fn replay(world: &World, depot: Position, config: &SolveConfig, actions: &[Action]) -> Simulator {
    assert!(
        actions.len() <= config.max_actions,
        "emitted {} actions over a budget of {}",
        actions.len(),
        config.max_actions
    );
    let mut sim = Simulator::new(world, depot, config.capacity);
    sim.run(actions).expect("emitted sequence must replay cleanly");
    sim
}

#[test]
fn single_resource_round_trip() {
    // 5x5 open grid, depot (2,2), resource one step to the right.
    let mut world = World::new(5, 5);
    world.add_resource(Position::new(3, 2)).unwrap();
    let depot = Position::new(2, 2);
    let config = four_way(1, 10, 0.0);

    let actions = solve(&world, depot, &config);
    assert_eq!(
        actions,
        vec![
            Action::Move(Direction::Right),
            Action::Take,
            Action::Move(Direction::Left),
            Action::Drop,
        ]
    );

    let sim = replay(&world, depot, &config, &actions);
    assert_eq!(sim.delivered(), 1);
    assert_eq!(sim.position(), depot);
}

#[test]
fn too_small_a_budget_leaves_the_resource() {
    let mut world = World::new(5, 5);
    world.add_resource(Position::new(3, 2)).unwrap();
    let depot = Position::new(2, 2);
    let config = four_way(1, 2, 0.0);

    let actions = solve(&world, depot, &config);
    assert!(!actions.contains(&Action::Take));
    replay(&world, depot, &config, &actions);
}

#[test]
fn walled_in_resource_is_never_selected() {
    let mut world = World::new(5, 5);
    world.add_resource(Position::new(1, 1)).unwrap();
    for &(x, y) in &[(0, 1), (2, 1), (1, 0), (1, 2)] {
        world.add_wall(Position::new(x, y)).unwrap();
    }
    let depot = Position::new(3, 3);
    let config = four_way(1, 100, 0.0);

    let actions = solve(&world, depot, &config);
    assert!(actions.is_empty());
}

#[test]
fn two_nearby_resources_make_one_trip() {
    // Capacity 2, resources one step from the depot in opposite directions:
    // both are picked up before the single depot DROP.
    let mut world = World::new(5, 5);
    world.add_resource(Position::new(1, 2)).unwrap();
    world.add_resource(Position::new(3, 2)).unwrap();
    let depot = Position::new(2, 2);
    let config = four_way(2, 12, 0.0);

    let actions = solve(&world, depot, &config);
    assert_eq!(
        actions,
        vec![
            Action::Move(Direction::Left),
            Action::Take,
            Action::Move(Direction::Right),
            Action::Move(Direction::Right),
            Action::Take,
            Action::Move(Direction::Left),
            Action::Drop,
        ]
    );

    let sim = replay(&world, depot, &config, &actions);
    assert_eq!(sim.delivered(), 2);
}

#[test]
fn eight_way_movement_cuts_across_diagonals() {
    let mut world = World::new(5, 5);
    world.add_resource(Position::new(4, 4)).unwrap();
    let depot = Position::new(2, 2);
    let config = SolveConfig {
        movement: Movement::EightWay,
        capacity: 1,
        cost_per_step: 0.0,
        max_actions: 10,
    };

    let actions = solve(&world, depot, &config);
    assert_eq!(
        actions,
        vec![
            Action::Move(Direction::DownRight),
            Action::Move(Direction::DownRight),
            Action::Take,
            Action::Move(Direction::UpLeft),
            Action::Move(Direction::UpLeft),
            Action::Drop,
        ]
    );
    replay(&world, depot, &config, &actions);
}

#[test]
fn positive_step_cost_can_make_every_trip_unprofitable() {
    let mut world = World::new(7, 7);
    world.add_resource(Position::new(5, 3)).unwrap();
    let depot = Position::new(2, 3);

    // Any round trip takes 6 moves; at 0.2 per step it nets below zero.
    let actions = solve(&world, depot, &four_way(1, 100, 0.2));
    assert!(actions.is_empty());

    // At 0.1 per step the trip is worth making.
    let actions = solve(&world, depot, &four_way(1, 100, 0.1));
    assert!(actions.contains(&Action::Take));
}

#[test]
fn resource_on_the_start_cell_is_banked_first() {
    let mut world = World::new(5, 5);
    world.add_resource(Position::new(2, 2)).unwrap();
    world.add_resource(Position::new(4, 2)).unwrap();
    let depot = Position::new(2, 2);
    let config = four_way(1, 20, 0.0);

    let actions = solve(&world, depot, &config);
    assert_eq!(actions[0], Action::Take);
    assert_eq!(actions[1], Action::Drop);

    let sim = replay(&world, depot, &config, &actions);
    assert_eq!(sim.delivered(), 2);
}

#[test]
fn unaffordable_second_resource_is_left_behind() {
    // The far resource's round trip no longer fits the remaining budget, so
    // the solve ends at the depot with only the near one banked.
    let mut world = World::new(9, 1);
    world.add_resource(Position::new(8, 0)).unwrap();
    world.add_resource(Position::new(1, 0)).unwrap();
    let depot = Position::new(0, 0);
    let config = four_way(1, 12, 0.0);

    let actions = solve(&world, depot, &config);
    let sim = replay(&world, depot, &config, &actions);
    assert_eq!(sim.delivered(), 1);
    assert_eq!(sim.position(), depot);
    assert_eq!(actions.len(), 4);
}

#[test]
fn loaded_map_solves_end_to_end() {
    let (world, start) = load_world_from_string(
        "BL BL BL BL BL
         BL WL WL WL RS
         BL WL ST BL BL
         RS WL BL WL BL
         BL BL BL BL RS",
    )
    .unwrap();
    assert_eq!(start, Position::new(2, 2));

    let config = four_way(2, 200, 0.0);
    let actions = solve(&world, start, &config);
    let sim = replay(&world, start, &config, &actions);
    assert_eq!(sim.delivered(), 3);
    assert_eq!(sim.position(), start);
}

#[test]
fn random_worlds_solve_deterministically_and_replay_cleanly() {
    for seed in 0..8 {
        let (world, start) = World::random(11, 9, 0.18, 7, seed).unwrap();
        let config = four_way(3, 150, 0.0);

        let first = solve(&world, start, &config);
        let second = solve(&world, start, &config);
        assert_eq!(first, second, "seed {seed} must solve deterministically");

        replay(&world, start, &config, &first);
    }
}
