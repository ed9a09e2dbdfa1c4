/// SR3D terminal renderer.
///
/// Usage:
///   cargo run -p sr3d-terminal -- [--config sr3d.json] [--mesh model.obj] [--camera nudge|physics]
///
/// Without `--mesh` a textured cube is shown. Log output goes to `sr3d.log`
/// in the working directory since the terminal is taken over by the
/// renderer; set `RUST_LOG` to change the level.
///
/// Controls:
///   W/A/S/D    move
///   Space      jump (physics camera)
///   Q/E        down/up (nudge camera)
///   Arrows     look
///   Mouse      look
///   Esc        quit

use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use sr3d_core::{CameraModel, MouseLook, Renderer, RendererConfig, Texture};
use sr3d_terminal::TerminalApp;
use tracing::info;

const LOG_FILE: &str = "sr3d.log";

/// Terminal cells are coarse, so the pointer turns the camera faster than
/// on a pixel display.
const CELL_SENSITIVITY: f32 = 0.03;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    mesh: Option<PathBuf>,
    camera: Option<String>,
}

fn parse_args() -> Args {
    let mut parsed = Args::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                parsed.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--mesh" if i + 1 < args.len() => {
                parsed.mesh = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--camera" if i + 1 < args.len() => {
                parsed.camera = Some(args[i + 1].clone());
                i += 2;
            }
            _ => i += 1,
        }
    }
    parsed
}

fn load_config(args: &Args) -> anyhow::Result<RendererConfig> {
    let mut config = match &args.config {
        Some(path) => RendererConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RendererConfig::default(),
    };
    if let Some(mesh) = &args.mesh {
        config.mesh_path = Some(mesh.clone());
    }
    if let Some(camera) = &args.camera {
        config.camera_model = camera.parse::<CameraModel>().context("--camera")?;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let log = File::create(LOG_FILE).with_context(|| format!("creating {}", LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let args = parse_args();
    let config = load_config(&args)?;
    info!(
        mesh = ?config.mesh_path,
        camera = ?config.camera_model,
        lighting = ?config.lighting,
        "Starting terminal renderer"
    );

    let texture = Texture::checkerboard(1, 16, 16, 4, 90, 255);
    let look = MouseLook {
        sensitivity: CELL_SENSITIVITY,
        ..MouseLook::default()
    };
    let mouse_look = config.mouse_look.then_some(look);
    let mut renderer = Renderer::new(config)
        .with_texture(texture.clone())
        .with_mouse_look(mouse_look);

    let mut host = TerminalApp::new()
        .context("terminal size")?
        .with_texture(texture);
    if !host.run(&mut renderer).context("terminal host")? {
        anyhow::bail!("renderer refused to start, see {}", LOG_FILE);
    }

    let stats = renderer.stats();
    println!(
        "SR3D: last frame drew {} of {} triangles",
        stats.emitted, stats.input
    );
    Ok(())
}
