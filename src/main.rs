use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use moco::scene_graph::{import_gltf, ImportOptions};
use moco::{ExportConfig, ExportReport, ExportRequest, Exporter, SceneHost, WriteMode};

#[derive(Parser, Debug)]
#[command(author, version, about = "Export camera motion to MRMC Flair Carts files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample a camera and a target over the frame range and write a Carts file
    Export {
        /// glTF scene (.gltf or .glb)
        #[arg(value_name = "SCENE")]
        scene: PathBuf,

        /// Name of the camera object
        #[arg(long)]
        camera: String,

        /// Name of the target object
        #[arg(long)]
        target: String,

        /// Output file; `//` prefix is relative to the scene file
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Playback rate
        #[arg(long, default_value_t = 24)]
        fps: u32,

        /// First frame, shown at animation time zero
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        frame_start: i32,

        /// Last frame; defaults to the end of the longest animation
        #[arg(long, allow_negative_numbers = true)]
        frame_end: Option<i32>,

        /// Application named in the file header
        #[arg(long, default_value = "Blender")]
        host_app: String,

        /// Write the destination in place instead of renaming a finished temp file
        #[arg(long)]
        direct: bool,
    },
    /// List object names in a scene
    Objects {
        #[arg(value_name = "SCENE")]
        scene: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Export {
            scene,
            camera,
            target,
            output,
            fps,
            frame_start,
            frame_end,
            host_app,
            direct,
        } => {
            let options = ImportOptions { fps, frame_start };
            let mut scene = import_gltf(&scene, &options)?;
            if let Some(frame_end) = frame_end {
                let (frame_start, _) = scene.frame_range();
                scene.set_frame_range(frame_start, frame_end);
            }

            let config = ExportConfig {
                host_app,
                write_mode: if direct {
                    WriteMode::Direct
                } else {
                    WriteMode::Atomic
                },
            };
            let request = ExportRequest::new(camera, target, output.unwrap_or_default());

            let result = Exporter::new(config).export(&mut scene, &request);
            if let Err(error) = &result {
                log::debug!("Export failed: {:?}", error);
            }

            let report = ExportReport::from(result);
            report.log();
            println!("{}: {}", report.severity, report.message);

            Ok(if report.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Objects { scene } => {
            let scene = import_gltf(&scene, &ImportOptions::default())?;
            for name in scene.object_names() {
                println!("{}", name);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
