use anyhow::{Context, Result};
use clap::Parser;
use forager_core::solver::{SolveConfig, solve};
use forager_core::world::{Simulator, World, load_world_from_string};
use forager_core::Movement;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Map file to load
    #[arg(short, long, value_name = "MAP_FILE")]
    map: Option<PathBuf>,

    /// Generate a random world instead of loading a map, e.g. `--random 16x12`
    #[arg(long, value_name = "WxH", conflicts_with = "map")]
    random: Option<String>,

    /// Wall density for random worlds (0.0..=1.0)
    #[arg(long, default_value_t = 0.15)]
    walls: f64,

    /// Resource count for random worlds
    #[arg(long, default_value_t = 8)]
    resources: usize,

    /// Seed for random worlds
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Carry capacity
    #[arg(short, long, default_value_t = 3)]
    capacity: usize,

    /// Hard budget on the total number of actions
    #[arg(short, long, default_value_t = 200)]
    budget: usize,

    /// Per-move cost used for trip profitability scoring
    #[arg(long, default_value_t = 0.0)]
    cost_per_step: f64,

    /// Allow diagonal movement
    #[arg(long)]
    eight_way: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let (world, start) = if let Some(dimensions) = &args.random {
        let (width, height) = parse_dimensions(dimensions)?;
        World::random(width, height, args.walls, args.resources, args.seed)
            .context("generating random world")?
    } else {
        // If no map file is provided, use the default map
        let map_file = args.map.clone().unwrap_or(PathBuf::from("maps/map01.txt"));
        // Ensure the map file exists
        if !map_file.exists() {
            return Err(anyhow::anyhow!(
                "Map file does not exist: {}",
                map_file.display()
            ));
        }
        let map_string = std::fs::read_to_string(&map_file)
            .with_context(|| format!("reading {}", map_file.display()))?;
        load_world_from_string(&map_string)
            .with_context(|| format!("loading {}", map_file.display()))?
    };

    let config = SolveConfig {
        movement: if args.eight_way {
            Movement::EightWay
        } else {
            Movement::FourWay
        },
        capacity: args.capacity,
        cost_per_step: args.cost_per_step,
        max_actions: args.budget,
    };

    let actions = solve(&world, start, &config);
    for action in &actions {
        println!("{action}");
    }

    // Replay the emitted sequence to double-check it before summarizing.
    let mut sim = Simulator::new(&world, start, config.capacity);
    sim.run(&actions)
        .context("emitted sequence failed replay")?;

    eprintln!(
        "delivered {} of {} resource(s) in {} action(s), depot {}, budget {}",
        sim.delivered(),
        world.resources().len(),
        actions.len(),
        start,
        config.max_actions,
    );

    Ok(())
}

fn parse_dimensions(dimensions: &str) -> Result<(usize, usize)> {
    let (width, height) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH, got `{dimensions}`"))?;
    Ok((
        width.trim().parse().context("bad width")?,
        height.trim().parse().context("bad height")?,
    ))
}
