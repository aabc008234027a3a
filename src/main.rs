//! Cave Roller entry point
//!
//! Headless native driver: builds a cave, drops a ball, walks the player
//! around on a scripted input loop and prints the resulting map.
//!
//! Usage: `cave-roller [seed] [ticks] [tunables.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cave Roller (native) starting...");

    if let Err(e) = native::run(std::env::args().skip(1).collect()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web; nothing to run here
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use cave_roller::consts::*;
    use cave_roller::sim::{Contact, HeightGrid, TickInput, World, tick};
    use cave_roller::{Result, Tunables};

    const DEFAULT_TICKS: u32 = 600;

    pub fn run(args: Vec<String>) -> Result<()> {
        let seed = args
            .first()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(clock_seed);
        let ticks = args
            .get(1)
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_TICKS);
        let tunables = match args.get(2) {
            Some(path) => load_tunables(path)?,
            None => Tunables::default(),
        };

        let mut world = World::with_seed(seed, &tunables)?;
        let report = world.regenerate(&tunables.pcg)?;
        log::info!(
            "Cave ready: {} floor cells, {} collectibles",
            report.floor_cells,
            report.collectibles_placed
        );
        world.spawn_ball(tunables.physics.spawn_mass)?;

        let mut floor_hits = 0u32;
        let mut wall_hits = 0u32;
        for i in 0..ticks {
            let input = scripted_input(i);
            let frame = tick(&mut world, &input, &tunables, SIM_DT);
            match frame.contact {
                Contact::Floor => floor_hits += 1,
                Contact::Wall(_) => wall_hits += 1,
                Contact::Airborne => {}
            }
        }

        let ball = world.ball();
        log::info!(
            "After {} ticks: ball at {:?} (v = {:?}), {} floor / {} wall contacts",
            world.time_ticks,
            ball.position,
            ball.velocity,
            floor_hits,
            wall_hits
        );
        println!("seed {}  collected {}/{}", world.seed, world.collected, COLLECTIBLE_COUNT);
        print!("{}", ascii_map(&world));
        Ok(())
    }

    fn load_tunables(path: &str) -> Result<Tunables> {
        match std::fs::read_to_string(path) {
            Ok(json) => Tunables::from_json(&json),
            Err(e) => {
                log::warn!("Could not read {}: {}, using defaults", path, e);
                Ok(Tunables::default())
            }
        }
    }

    fn clock_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// Walk in a slow spiral, kicking now and then
    fn scripted_input(i: u32) -> TickInput {
        TickInput {
            forward: i % 4 != 0,
            turn_left: i % 90 < 15,
            kick: i % 120 == 60,
            ..Default::default()
        }
    }

    /// `#` wall, `.` floor, `*` collectible, `@` player, `o` ball
    fn ascii_map(world: &World) -> String {
        let grid: &HeightGrid = world.grid();
        let mut rows: Vec<Vec<char>> = (0..grid.height())
            .map(|row| {
                (0..grid.width())
                    .map(|col| if grid.is_wall(col, row) { '#' } else { '.' })
                    .collect()
            })
            .collect();

        let mut mark = |pos: glam::Vec3, c: char| {
            if let Some((col, row)) = grid.cell_coords_of(pos) {
                rows[row][col] = c;
            }
        };
        for collectible in grid.active_collectibles() {
            mark(collectible.pos, '*');
        }
        mark(world.ball().position, 'o');
        mark(world.player.position, '@');

        let mut out = String::with_capacity(grid.len() + grid.height());
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}
