//! Halfacet CLI - build sample meshes, inspect their topology and subdivide them.
//!
//! Usage: halfacet <COMMAND> [OPTIONS]
//!
//! Run `halfacet --help` for available commands. Set `RUST_LOG=debug` to see
//! topology and subdivision diagnostics.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::Point3;

use halfacet::algo::{subdivide, Progress};
use halfacet::mesh::{build_from_polygons, HalfFacetMesh};

#[derive(Parser)]
#[command(name = "halfacet")]
#[command(author, version, about = "Half-facet mesh topology CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display topology statistics of a sample mesh
    Info {
        /// Sample mesh to build
        #[arg(short, long, value_enum, default_value = "grid")]
        shape: Shape,

        /// Resolution of the sample mesh
        #[arg(short = 'n', long, default_value = "4")]
        size: usize,
    },

    /// Subdivide a sample mesh
    Subdivide {
        /// Sample mesh to build
        #[arg(short, long, value_enum, default_value = "cube")]
        shape: Shape,

        /// Resolution of the sample mesh
        #[arg(short = 'n', long, default_value = "4")]
        size: usize,

        /// Number of subdivision iterations
        #[arg(short, long, default_value = "1")]
        iterations: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// Flat `size` x `size` grid of quads (open)
    Grid,
    /// Unit cube made of six quads (closed)
    Cube,
    /// Fan of `size` triangles around a center vertex (open)
    Fan,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { shape, size } => {
            cmd_info(shape, size)?;
        }

        Commands::Subdivide {
            shape,
            size,
            iterations,
        } => {
            cmd_subdivide(shape, size, iterations)?;
        }
    }

    Ok(())
}

fn build_shape(shape: Shape, size: usize) -> Result<HalfFacetMesh, Box<dyn std::error::Error>> {
    if size == 0 && shape != Shape::Cube {
        return Err("size must be at least 1".into());
    }

    let mesh = match shape {
        Shape::Grid => {
            let n = size;
            let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
            let mut faces = Vec::with_capacity(n * n);
            for j in 0..=n {
                for i in 0..=n {
                    vertices.push(Point3::new(i as f64, j as f64, 0.0));
                }
            }
            for j in 0..n {
                for i in 0..n {
                    let v00 = j * (n + 1) + i;
                    let v01 = v00 + (n + 1);
                    faces.push([v00, v00 + 1, v01 + 1, v01]);
                }
            }
            build_from_polygons(&vertices, &faces)?
        }
        Shape::Cube => {
            let vertices: Vec<_> = [
                (0.0, 0.0, 0.0),
                (1.0, 0.0, 0.0),
                (1.0, 1.0, 0.0),
                (0.0, 1.0, 0.0),
                (0.0, 0.0, 1.0),
                (1.0, 0.0, 1.0),
                (1.0, 1.0, 1.0),
                (0.0, 1.0, 1.0),
            ]
            .into_iter()
            .map(|(x, y, z)| Point3::new(x, y, z))
            .collect();
            let faces = [
                [0, 3, 2, 1],
                [4, 5, 6, 7],
                [0, 1, 5, 4],
                [2, 3, 7, 6],
                [0, 4, 7, 3],
                [1, 2, 6, 5],
            ];
            build_from_polygons(&vertices, &faces)?
        }
        Shape::Fan => {
            // Spokes spread over a half circle
            let mut vertices = vec![Point3::origin()];
            for k in 0..=size {
                let angle = std::f64::consts::PI * k as f64 / size as f64;
                vertices.push(Point3::new(angle.cos(), angle.sin(), 0.0));
            }
            let faces: Vec<[usize; 3]> = (0..size).map(|k| [0, k + 1, k + 2]).collect();
            build_from_polygons(&vertices, &faces)?
        }
    };

    Ok(mesh)
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let percent = if current >= total {
            100
        } else {
            (current * 100) / total
        };

        // Only redraw when the bar moves forward
        let previous = max_percent.fetch_max(percent, Ordering::Relaxed);
        if percent <= previous && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn print_stats(mesh: &HalfFacetMesh) -> Result<(), Box<dyn std::error::Error>> {
    let topology = mesh.topology()?;

    println!("Vertices: {}", mesh.num_vertices());
    println!("Elements: {}", mesh.num_elements());
    println!("Half-facets: {}", mesh.num_half_facets());
    println!("Edges: {}", topology.num_edges());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    if mesh.is_quad_mesh() {
        println!("Mesh type: Quad mesh");
    } else if mesh.is_polygon_mesh() {
        println!("Mesh type: Mixed polygon mesh");
    } else {
        println!("Mesh type: Mixed-dimension mesh");
    }

    let naked_vertices = topology.naked_vertices();
    let naked_edges = topology.naked_edges();
    if naked_edges.is_empty() && naked_vertices.is_empty() {
        println!("Topology: Closed (no naked half-facets)");
    } else {
        println!(
            "Topology: Open ({} naked vertices, {} naked edges)",
            naked_vertices.len(),
            naked_edges.len()
        );
    }

    let euler = mesh.num_vertices() as i64 - topology.num_edges() as i64 + mesh.num_elements() as i64;
    println!("Euler characteristic: {}", euler);

    Ok(())
}

fn cmd_info(shape: Shape, size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = build_shape(shape, size)?;
    print_stats(&mesh)
}

fn cmd_subdivide(shape: Shape, size: usize, iterations: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = build_shape(shape, size)?;

    println!("Built: {} vertices, {} elements", mesh.num_vertices(), mesh.num_elements());

    let options = subdivide::SubdivideOptions::new(iterations);
    let progress = create_progress();

    println!("Applying Catmull-Clark subdivision ({} iterations)...", iterations);
    let start = Instant::now();
    let refined = subdivide::catmull_clark_subdivide_with_progress(&mesh, &options, &progress)?;
    let elapsed = start.elapsed();

    println!("Finished in {:.2?}", elapsed);
    print_stats(&refined)
}
