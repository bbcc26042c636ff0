use anyhow::Context;
use clap::{Parser, Subcommand};
use facade_environment::{EnvironmentMap, EnvironmentPreset};
use facade_render::{DebugTextRenderer, OrbitCamera, Renderer, ViewerSettings};
use facade_scene::build_facade;
use glam::Vec3;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "facade-cli", about = "Inspect the façade scene headlessly")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, scene summary and viewer settings
    Info,
    /// Describe every primitive and light in the scene
    Describe {
        /// Emit the scene as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate the environment map and report its mip chain
    Environment {
        /// Sample radiance at this direction, e.g. "0,1,0"
        #[arg(long, value_parser = parse_direction)]
        sample: Option<Vec3>,
    },
}

fn parse_direction(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(str::trim)
        .map(|p| p.parse::<f32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got {} values", parts.len())),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let scene = build_facade();
    let settings = ViewerSettings::default();

    match cli.command {
        Commands::Info => {
            println!("facade-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", facade_render::crate_info());
            println!("{}", scene.summary());
            if let Some(bounds) = scene.bounds() {
                println!("bounds: min={} max={}", bounds.min, bounds.max);
            }
            println!(
                "settings: {}",
                serde_json::to_string_pretty(&settings).context("serialize settings")?
            );
        }
        Commands::Describe { json } => {
            tracing::debug!(json, "describing scene");
            if json {
                let out = serde_json::to_string_pretty(&scene).context("serialize scene")?;
                println!("{out}");
            } else {
                let camera = OrbitCamera::from_settings(&settings.camera);
                let text = DebugTextRenderer::new().render(&scene, &camera.render_view());
                print!("{text}");
            }
        }
        Commands::Environment { sample } => {
            let preset = settings.environment.unwrap_or(EnvironmentPreset::City);
            let map = EnvironmentMap::generate(preset).context("generate environment")?;
            println!("preset: {}", map.preset);
            for (i, level) in map.levels().iter().enumerate() {
                println!("  mip {i}: {}x{}", level.width, level.height);
            }
            if let Some(dir) = sample {
                let dir = dir
                    .try_normalize()
                    .context("sample direction must be non-zero")?;
                for level in [0, map.mip_count() as usize - 1] {
                    let c = map.sample(dir, level);
                    println!(
                        "  radiance@mip{level} = ({:.3}, {:.3}, {:.3})",
                        c.x, c.y, c.z
                    );
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_three_components() {
        assert_eq!(parse_direction("0, 1,0").unwrap(), Vec3::Y);
        assert!(parse_direction("1,2").is_err());
        assert!(parse_direction("a,b,c").is_err());
    }

    #[test]
    fn cli_accepts_json_flag() {
        let cli = Cli::try_parse_from(["facade-cli", "describe", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Describe { json: true }));
    }

    #[test]
    fn cli_parses_sample_direction() {
        let cli = Cli::try_parse_from(["facade-cli", "environment", "--sample", "0,-1,0"]).unwrap();
        match cli.command {
            Commands::Environment { sample } => assert_eq!(sample, Some(Vec3::NEG_Y)),
            _ => panic!("wrong subcommand"),
        }
    }
}
