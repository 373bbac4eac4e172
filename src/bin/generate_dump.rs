use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Write a synthetic LAMMPS dump file of jittering particles.
#[derive(Parser)]
#[command(name = "generate-dump", version)]
struct Args {
    /// Output file
    #[arg(default_value = "sample.dump")]
    output: PathBuf,

    /// Particles per timestep
    #[arg(short, long, default_value_t = 200)]
    particles: usize,

    /// Number of timesteps
    #[arg(short, long, default_value_t = 5)]
    timesteps: usize,

    /// Timestep increment between snapshots
    #[arg(long, default_value_t = 1000)]
    every: i64,

    /// Edge length of the cubic box
    #[arg(long, default_value_t = 10.0)]
    box_size: f64,

    /// Emit `id x y z diameter connectivity` rows for the conn-diam loader
    #[arg(long)]
    conn_diam: bool,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

struct Particle {
    id: usize,
    kind: u8,
    pos: [f64; 3],
    vel: [f64; 3],
    diameter: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let l = args.box_size;

    let mut particles: Vec<Particle> = (1..=args.particles)
        .map(|id| Particle {
            id,
            kind: 1 + (rng.next_u64() % 2) as u8,
            pos: [rng.uniform(0.0, l), rng.uniform(0.0, l), rng.uniform(0.0, l)],
            vel: [
                rng.uniform(-0.1, 0.1),
                rng.uniform(-0.1, 0.1),
                rng.uniform(-0.1, 0.1),
            ],
            diameter: rng.uniform(0.8, 1.2),
        })
        .collect();

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut out = BufWriter::new(file);

    for step in 0..args.timesteps {
        let timestep = step as i64 * args.every;
        writeln!(out, "ITEM: TIMESTEP\n{timestep}")?;
        writeln!(out, "ITEM: NUMBER OF ATOMS\n{}", particles.len())?;
        writeln!(out, "ITEM: BOX BOUNDS pp pp pp")?;
        for _ in 0..3 {
            writeln!(out, "0 {l}")?;
        }

        if args.conn_diam {
            writeln!(out, "ITEM: ATOMS id x y z diameter connectivity")?;
        } else {
            writeln!(out, "ITEM: ATOMS id type x y z vx vy vz diameter")?;
        }

        // LAMMPS does not keep ids ordered across processors; neither do we.
        let offset = step * 7 % particles.len().max(1);
        for p in particles.iter().cycle().skip(offset).take(particles.len()) {
            let [x, y, z] = p.pos;
            if args.conn_diam {
                let connectivity = rng.next_u64() % 7;
                writeln!(out, "{} {x} {y} {z} {} {connectivity}", p.id, p.diameter)?;
            } else {
                let [vx, vy, vz] = p.vel;
                writeln!(
                    out,
                    "{} {} {x} {y} {z} {vx} {vy} {vz} {}",
                    p.id, p.kind, p.diameter
                )?;
            }
        }

        for p in &mut particles {
            for axis in 0..3 {
                p.pos[axis] = (p.pos[axis] + p.vel[axis] * args.every as f64 * 0.01).rem_euclid(l);
            }
        }
    }
    out.flush()?;

    println!(
        "Wrote {} timesteps of {} particles to {}",
        args.timesteps,
        args.particles,
        args.output.display()
    );
    Ok(())
}
