use chrono::{Local, NaiveDateTime};
use std::fs::{self, File, Permissions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::Builder;

use crate::config::{ExportConfig, WriteMode};
use crate::export::carts::{CartsHeader, CartsWriter, Sample};
use crate::export::conversion::ConversionMatrix;
use crate::export::error::{ExportError, ObjectRole};
use crate::export::report::ExportSummary;
use crate::host::{FrameGuard, SceneHost};

/// Prefix marking a path relative to the scene file's directory.
const SCENE_RELATIVE_PREFIX: &str = "//";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub camera: String,
    pub target: String,
    pub output_path: PathBuf,
}

impl ExportRequest {
    pub fn new(
        camera: impl Into<String>,
        target: impl Into<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            camera: camera.into(),
            target: target.into(),
            output_path: output_path.into(),
        }
    }
}

/// Resolves `path` to an absolute path. `//`-prefixed paths are relative to
/// the scene file's directory, other relative paths to the working directory.
/// An empty path stays empty.
pub fn resolve_output_path(path: &Path, scene_file: Option<&Path>) -> io::Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Ok(PathBuf::new());
    }

    let raw = path.to_string_lossy();
    let path = match raw.strip_prefix(SCENE_RELATIVE_PREFIX) {
        Some(rest) => {
            let base = scene_file
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            base.join(rest)
        }
        None => path.to_path_buf(),
    };

    if path.as_os_str().is_empty() {
        return Ok(path);
    }
    std::path::absolute(path)
}

#[derive(Debug, Default)]
pub struct Exporter {
    config: ExportConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Checks `flag` between frames and stops with [`ExportError::Cancelled`]
    /// once it is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn export<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        request: &ExportRequest,
    ) -> Result<ExportSummary, ExportError> {
        self.export_at(host, request, Local::now().naive_local())
    }

    /// Same as [`Exporter::export`] with a fixed header timestamp.
    pub fn export_at<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        request: &ExportRequest,
        exported_at: NaiveDateTime,
    ) -> Result<ExportSummary, ExportError> {
        let camera = host
            .find_object(&request.camera)
            .ok_or(ExportError::MissingObject(ObjectRole::Camera))?;
        let target = host
            .find_object(&request.target)
            .ok_or(ExportError::MissingObject(ObjectRole::Target))?;

        let output_path = resolve_output_path(&request.output_path, host.file_path())
            .map_err(|error| ExportError::io(&request.output_path, error))?;
        if output_path.as_os_str().is_empty() {
            return Err(ExportError::NoOutputPath);
        }

        let (frame_start, frame_end) = host.frame_range();
        let frame_count = i64::from(frame_end) - i64::from(frame_start) + 1;
        let samples = self.sample_frames(host, camera, target)?;

        let header = CartsHeader {
            host_app: &self.config.host_app,
            exported_at,
            scene_path: host.file_path(),
            camera: &request.camera,
            target: &request.target,
            points: frame_count,
            fps: host.fps(),
        };
        self.write_file(&output_path, &header, &samples)?;

        let output_file_name = output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!(
            "Wrote {} frames ({} rows) of '{}' -> '{}' to {}",
            frame_count,
            samples.len(),
            request.camera,
            request.target,
            output_path.display()
        );

        Ok(ExportSummary {
            frames_written: frame_count,
            output_file_name,
        })
    }

    /// Seeks through the scene's frame range and converts both positions at
    /// every frame. The playhead is restored before returning.
    pub fn sample_frames<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        camera: H::Object,
        target: H::Object,
    ) -> Result<Vec<Sample>, ExportError> {
        let (frame_start, frame_end) = host.frame_range();
        let frame_count = i64::from(frame_end) - i64::from(frame_start) + 1;
        if frame_count <= 0 {
            log::warn!(
                "Frame range {}..={} is empty, only the header will be written",
                frame_start,
                frame_end
            );
        }

        let conversion = ConversionMatrix::mrmc();
        let mut scene = FrameGuard::new(host);
        let mut samples = Vec::with_capacity(usize::try_from(frame_count).unwrap_or(0));

        for frame in frame_start..=frame_end {
            if self.is_cancelled() {
                log::warn!("Export cancelled at frame {}", frame);
                return Err(ExportError::Cancelled);
            }

            scene.set_frame(frame);
            samples.push(Sample {
                frame,
                camera: conversion.apply(scene.world_position(camera)),
                target: conversion.apply(scene.world_position(target)),
                roll: 0.0,
            });
        }

        log::debug!(
            "Sampled {} frames, playhead returns to {}",
            samples.len(),
            scene.saved_frame()
        );
        Ok(samples)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn write_file(
        &self,
        path: &Path,
        header: &CartsHeader,
        samples: &[Sample],
    ) -> Result<(), ExportError> {
        match self.config.write_mode {
            WriteMode::Direct => {
                let file = File::create(path).map_err(|error| ExportError::io(path, error))?;
                write_carts(BufWriter::new(file), header, samples)
                    .map_err(|error| ExportError::io(path, error))?;
            }
            WriteMode::Atomic => {
                let destination = follow_symlink(path);
                let dir = match destination.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent,
                    _ => Path::new("."),
                };
                let existing = fs::metadata(&destination)
                    .ok()
                    .filter(|metadata| metadata.is_file())
                    .map(|metadata| metadata.permissions());

                let mut builder = Builder::new();
                builder.prefix(".moco");
                if let Some(permissions) = new_file_permissions(existing.as_ref()) {
                    builder.permissions(permissions);
                }
                let mut temp = builder
                    .tempfile_in(dir)
                    .map_err(|error| ExportError::io(path, error))?;
                if let Some(permissions) = existing {
                    temp.as_file()
                        .set_permissions(permissions)
                        .map_err(|error| ExportError::io(path, error))?;
                }

                write_carts(BufWriter::new(temp.as_file_mut()), header, samples)
                    .map_err(|error| ExportError::io(path, error))?;
                temp.persist(&destination)
                    .map_err(|error| ExportError::io(path, error.error))?;
            }
        }
        Ok(())
    }
}

/// Resolves a symlinked destination to the file it points at, so replacing
/// the file keeps the link.
fn follow_symlink(path: &Path) -> PathBuf {
    let is_symlink = fs::symlink_metadata(path)
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false);
    if is_symlink {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    }
}

/// Mode for the temporary file: the destination's own, or `0o666` (filtered by
/// the umask at creation) for a new file, as a plain `open` would create it.
#[cfg(unix)]
fn new_file_permissions(existing: Option<&Permissions>) -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(
        existing
            .cloned()
            .unwrap_or_else(|| Permissions::from_mode(0o666)),
    )
}

#[cfg(not(unix))]
fn new_file_permissions(existing: Option<&Permissions>) -> Option<Permissions> {
    existing.cloned()
}

fn write_carts<W: Write>(out: W, header: &CartsHeader, samples: &[Sample]) -> io::Result<()> {
    let mut writer = CartsWriter::new(out, header)?;
    for sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finish()?;
    Ok(())
}

/// Exports with the default configuration.
pub fn export<H: SceneHost + ?Sized>(
    host: &mut H,
    request: &ExportRequest,
) -> Result<ExportSummary, ExportError> {
    Exporter::default().export(host, request)
}
