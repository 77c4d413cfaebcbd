use anyhow::{Context, ensure};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stereoview_assets::{CubemapFaces, ModelData};
use stereoview_common::{EyeSide, ProjectionConfig, StereoConfig};
use stereoview_render::{
    DebugTextRenderer, FlyCamera, Frustum, ProjectionParams, Renderer, SplitLayout, StereoFrame,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stereoview-cli", about = "CLI tool for stereoview")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print both eyes' off-axis frustum bounds
    Frustum {
        /// Vertical field of view in degrees
        #[arg(long, default_value = "45")]
        fov: f32,
        /// Width over height of one eye's viewport
        #[arg(long, default_value_t = 4.0 / 3.0)]
        aspect: f32,
        #[arg(long, default_value = "0.5")]
        near: f32,
        #[arg(long, default_value = "100")]
        far: f32,
        /// Half the distance between the eyes
        #[arg(long, default_value = "0.0325")]
        separation: f32,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Dump the frame plan for the initial camera state
    Frame {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Seconds since start
        #[arg(long, default_value = "0")]
        time: f32,
    },
    /// Load the configured model and skybox and report what was found
    CheckAssets {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the model path
        #[arg(long)]
        model: Option<PathBuf>,
        /// Override the skybox directory
        #[arg(long)]
        skybox: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StereoConfig> {
    match path {
        Some(path) => StereoConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(StereoConfig::default()),
    }
}

fn eye_frusta(
    fov: f32,
    aspect: f32,
    projection: &ProjectionConfig,
) -> anyhow::Result<[Frustum; 2]> {
    ensure!(fov > 0.0 && fov < 180.0, "fov must lie in (0, 180), got {fov}");
    ensure!(aspect > 0.0, "aspect must be positive, got {aspect}");
    ensure!(projection.near > 0.0, "near must be positive");
    ensure!(projection.far > projection.near, "far must exceed near");
    ensure!(projection.half_separation >= 0.0, "separation must be non-negative");

    let params = ProjectionParams::new(fov, aspect, projection);
    Ok(EyeSide::ALL.map(|side| Frustum::off_axis(side, &params)))
}

fn check_assets(config: &StereoConfig) -> anyhow::Result<()> {
    let faces = config.scene.skybox_faces();
    let cubemap = CubemapFaces::load(&faces);
    println!("Skybox: {}", config.scene.skybox_dir.display());
    for (path, face) in faces.iter().zip(&cubemap.faces) {
        let status = match face {
            Some(image) => format!("ok ({}x{})", image.width, image.height),
            None => "MISSING".to_string(),
        };
        println!("  {:<40} {status}", path.display());
    }
    println!("  {}/6 faces loaded", cubemap.loaded_count());

    let model = ModelData::load_obj(&config.scene.model)
        .with_context(|| format!("model {} failed to load", config.scene.model.display()))?;
    println!("Model: {}", config.scene.model.display());
    println!(
        "  meshes={}, triangles={}, textures={}",
        model.meshes.len(),
        model.triangle_count(),
        model.textures.len()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = StereoConfig::default();
            let (width, height) = config.window.window_size();
            println!("stereoview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", stereoview_render::crate_info());
            println!("assets: {}", stereoview_assets::crate_info());
            println!("tools: {}", stereoview_tools::crate_info());
            println!(
                "defaults: window={width}x{height}, near={}, far={}, half_separation={}",
                config.projection.near, config.projection.far, config.projection.half_separation
            );
        }
        Commands::Frustum {
            fov,
            aspect,
            near,
            far,
            separation,
            json,
        } => {
            let projection = ProjectionConfig {
                near,
                far,
                half_separation: separation,
            };
            let [left, right] = eye_frusta(fov, aspect, &projection)?;
            if json {
                let doc = serde_json::json!({ "left": left, "right": right });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                for (side, f) in EyeSide::ALL.iter().zip([left, right]) {
                    println!(
                        "{:<5} l={:.6} r={:.6} b={:.6} t={:.6} n={} f={}",
                        side.label(),
                        f.left,
                        f.right,
                        f.bottom,
                        f.top,
                        f.near,
                        f.far
                    );
                }
            }
        }
        Commands::Frame { config, time } => {
            let config = load_config(config.as_deref())?;
            let (width, height) = config.window.window_size();
            let frame = StereoFrame::build(
                &FlyCamera::from_config(&config.camera),
                &config.projection,
                SplitLayout::new(width, height).eye_aspect(),
                time,
                &config.scene.placements,
                &config.light,
            );
            print!("{}", DebugTextRenderer::new().render(&frame));
        }
        Commands::CheckAssets {
            config,
            model,
            skybox,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(model) = model {
                config.scene.model = model;
            }
            if let Some(skybox) = skybox {
                config.scene.skybox_dir = skybox;
            }
            check_assets(&config)?;
        }
    }

    Ok(())
}
