//! BVAT command-line front end.
//!
//! Opens a project directory headlessly: inspect it, replay recorded input
//! events through the editor, or render an image with its boxes to PNG.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use bvat::config::AppConfig;
use bvat::coords::ClientRect;
use bvat::event::InputEvent;
use bvat::image_loader::ThreadedImageProvider;
use bvat::persistence::{BackgroundSink, JsonDirBackend};
use bvat::project::ProjectData;
use bvat::render::PixmapSurface;
use bvat::Editor;

type CliEditor = Editor<ThreadedImageProvider, BackgroundSink>;

#[derive(Debug, Parser)]
#[command(
    name = "bvat",
    version,
    about = "Bounding-box annotation engine for object-detection datasets"
)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the images of a project and their box counts.
    Info { project: PathBuf },
    /// Feed recorded input events through the editor and save the result.
    Replay {
        project: PathBuf,
        /// JSON array of input events
        #[arg(long)]
        events: PathBuf,
        /// Image to open before replaying
        #[arg(long, default_value_t = 0)]
        image: usize,
        /// Write the final frame to this PNG
        #[arg(long)]
        render: Option<PathBuf>,
        /// Display size of the canvas the events were recorded on, as WxH
        #[arg(long, value_parser = parse_canvas)]
        canvas: Option<(f32, f32)>,
    },
    /// Render one image with its stored boxes to PNG.
    Render {
        project: PathBuf,
        #[arg(long)]
        image: usize,
        #[arg(long)]
        out: PathBuf,
    },
}

fn parse_canvas(value: &str) -> Result<(f32, f32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{value}'"))?;
    let w: f32 = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h: f32 = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    if w <= 0.0 || h <= 0.0 {
        return Err("canvas size must be positive".to_string());
    }
    Ok((w, h))
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, String> {
    match path {
        Some(path) => AppConfig::load_from_path(path).map_err(|e| e.to_string()),
        None => Ok(AppConfig::load_from_default_path().unwrap_or_default()),
    }
}

fn init_logging(config: &AppConfig) {
    let mut builder = if std::env::var_os("RUST_LOG").is_some() {
        env_logger::Builder::from_default_env()
    } else {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.preferences.log_level.to_level_filter());
        builder
    };
    builder.init();
    log::debug!(
        "Configured log level: {}",
        config.preferences.log_level.name()
    );
}

fn open_editor(root: &Path, config: &AppConfig) -> Result<CliEditor, String> {
    let project = ProjectData::load_dir(root, &config.classes).map_err(|e| e.to_string())?;
    log::info!("{}", project);
    let provider = ThreadedImageProvider::spawn(root).map_err(|e| e.to_string())?;
    let sink = BackgroundSink::spawn(JsonDirBackend::new(root)).map_err(|e| e.to_string())?;
    Ok(Editor::new(project, provider, sink).with_config(config))
}

/// Block until the active image has finished decoding.
fn wait_for_image(editor: &mut CliEditor) {
    while editor.is_loading() {
        match editor.provider_mut().wait() {
            Some((ticket, result)) => {
                editor.accept_load(ticket, result);
            }
            None => break,
        }
    }
}

fn open_image(editor: &mut CliEditor, index: usize) -> Result<(), String> {
    if !editor.select_image(index) {
        return Err(format!(
            "image index {} out of range ({} images)",
            index,
            editor.workspace().images().len()
        ));
    }
    wait_for_image(editor);
    if !editor.is_ready() {
        return Err(format!("failed to decode image {index}"));
    }
    Ok(())
}

fn render_to_png(editor: &CliEditor, out: &Path) -> Result<(), String> {
    let bitmap = editor.bitmap().ok_or("image is not loaded")?;
    let mut surface = PixmapSurface::new(bitmap.width(), bitmap.height())
        .ok_or("cannot render an empty image")?;
    editor.render(&mut surface);
    surface.save_png(out).map_err(|e| e.to_string())?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn run(cli: Cli, config: &AppConfig) -> Result<(), String> {
    match cli.command {
        Commands::Info { project } => {
            let data = ProjectData::load_dir(&project, &config.classes)
                .map_err(|e| e.to_string())?;
            println!("{}", data);
            for image in &data.images {
                println!(
                    "{} ({} objects) {}x{}",
                    image.name,
                    image.boxes.len(),
                    image.width,
                    image.height
                );
            }
        }
        Commands::Replay {
            project,
            events,
            image,
            render,
            canvas,
        } => {
            let text = std::fs::read_to_string(&events).map_err(|e| e.to_string())?;
            let events: Vec<InputEvent> =
                serde_json::from_str(&text).map_err(|e| e.to_string())?;

            let mut editor = open_editor(&project, config)?;
            if let Some((width, height)) = canvas {
                editor.set_display_bounds(ClientRect::new(0.0, 0.0, width, height));
            }
            open_image(&mut editor, image)?;

            for event in &events {
                editor.handle_event(event);
                wait_for_image(&mut editor);
            }
            log::info!("Replayed {} events", events.len());

            if let Some(out) = render {
                render_to_png(&editor, &out)?;
            }
            editor.sink().flush();
            editor.refresh_status();
            if let Some(message) = editor.status_message() {
                eprintln!("{}", message);
            }
            println!("{}", editor.status_text());
        }
        Commands::Render {
            project,
            image,
            out,
        } => {
            let mut editor = open_editor(&project, config)?;
            open_image(&mut editor, image)?;
            render_to_png(&editor, &out)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canvas() {
        assert_eq!(parse_canvas("800x600"), Ok((800.0, 600.0)));
        assert_eq!(parse_canvas("1.5X2"), Ok((1.5, 2.0)));
        assert!(parse_canvas("800").is_err());
        assert!(parse_canvas("0x10").is_err());
    }

    #[test]
    fn test_cli_parses_replay() {
        let cli = Cli::try_parse_from([
            "bvat", "replay", "proj", "--events", "e.json", "--canvas", "400x300",
        ])
        .expect("parse");
        match cli.command {
            Commands::Replay { image, canvas, .. } => {
                assert_eq!(image, 0);
                assert_eq!(canvas, Some((400.0, 300.0)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
