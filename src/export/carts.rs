//! Writer for the MRMC Flair "Carts" text format.
//!
//! Six header lines followed by one fixed-width row per frame. Rows are
//! separated by `\n` and the last row has no line terminator.

use chrono::NaiveDateTime;
use glam::Vec3;
use std::io::{self, Write};
use std::path::Path;

pub const DATA_TYPE_LINE: &str = "DATA_TYPE  CARTS_RAW  MRMC_COORDS  IN_CENTIMETRES";
pub const COLUMNS_LINE: &str =
    "FRAME     XV         YV         ZV         XT         YT         ZT         ROLL";

pub const FRAME_WIDTH: usize = 4;
pub const VALUE_WIDTH: usize = 11;
pub const VALUE_PRECISION: usize = 5;

/// One exported frame, positions already in rig space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub frame: i32,
    pub camera: Vec3,
    pub target: Vec3,
    pub roll: f32,
}

#[derive(Debug, Clone)]
pub struct CartsHeader<'a> {
    pub host_app: &'a str,
    pub exported_at: NaiveDateTime,
    pub scene_path: Option<&'a Path>,
    pub camera: &'a str,
    pub target: &'a str,
    /// `end - start + 1`; zero or negative for an empty range.
    pub points: i64,
    pub fps: u32,
}

impl CartsHeader<'_> {
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "# CGI Export from {}/Moco on {}",
            self.host_app,
            self.exported_at.format("%Y-%m-%d %H:%M")
        )?;
        writeln!(
            out,
            "# Exported from: {}",
            self.scene_path
                .map(|path| path.display().to_string())
                .unwrap_or_default()
        )?;
        writeln!(out, "# Exported objects: {}, {}", self.camera, self.target)?;
        writeln!(out, "{DATA_TYPE_LINE}")?;
        writeln!(out, "POINTS {}  SPEED {}", self.points, self.fps)?;
        write!(out, "{COLUMNS_LINE}")
    }
}

/// Formats a value right-aligned in 11 columns with 5 decimals. Zero of either
/// sign prints as `0.00000`.
pub fn format_value(value: f32) -> String {
    let value = if value == 0.0 { 0.0 } else { f64::from(value) };
    format!(
        "{value:>width$.precision$}",
        width = VALUE_WIDTH,
        precision = VALUE_PRECISION
    )
}

pub fn format_row(sample: &Sample) -> String {
    let mut row = format!("{:>width$}", sample.frame, width = FRAME_WIDTH);
    for value in [
        sample.camera.x,
        sample.camera.y,
        sample.camera.z,
        sample.target.x,
        sample.target.y,
        sample.target.z,
        sample.roll,
    ] {
        row.push_str(&format_value(value));
    }
    row
}

/// Streams a Carts file: the header on creation, then rows as they come.
pub struct CartsWriter<W: Write> {
    out: W,
    rows: usize,
}

impl<W: Write> CartsWriter<W> {
    pub fn new(mut out: W, header: &CartsHeader) -> io::Result<Self> {
        header.write_to(&mut out)?;
        Ok(Self { out, rows: 0 })
    }

    pub fn write_sample(&mut self, sample: &Sample) -> io::Result<()> {
        write!(self.out, "\n{}", format_row(sample))?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn header<'a>(points: i64) -> CartsHeader<'a> {
        CartsHeader {
            host_app: "Blender",
            exported_at: NaiveDate::from_ymd_opt(2016, 3, 4)
                .unwrap()
                .and_hms_opt(9, 5, 59)
                .unwrap(),
            scene_path: Some(Path::new("/shots/sh010.blend")),
            camera: "Camera",
            target: "Target",
            points,
            fps: 25,
        }
    }

    #[test]
    fn formats_zero_and_negative_values() {
        assert_eq!(format_value(0.0), "    0.00000");
        assert_eq!(format_value(-0.0), "    0.00000");
        assert_eq!(format_value(-123.4567), " -123.45670");
        assert_eq!(format_value(-123.4567).len(), VALUE_WIDTH);
        assert_eq!(format_value(12.5), "   12.50000");
    }

    #[test]
    fn row_is_fixed_width_concatenation() {
        let row = format_row(&Sample {
            frame: 7,
            camera: Vec3::new(1.0, -2.5, 100.0),
            target: Vec3::new(0.0, 0.25, -0.125),
            roll: 0.0,
        });

        assert_eq!(
            row,
            "   7    1.00000   -2.50000  100.00000    0.00000    0.25000   -0.12500    0.00000"
        );
        assert_eq!(row.len(), FRAME_WIDTH + 7 * VALUE_WIDTH);
    }

    #[test]
    fn wide_frame_numbers_are_not_truncated() {
        let row = format_row(&Sample {
            frame: 12345,
            camera: Vec3::ZERO,
            target: Vec3::ZERO,
            roll: 0.0,
        });
        assert!(row.starts_with("12345    0.00000"));
    }

    #[test]
    fn writes_header_and_rows_without_trailing_newline() {
        let mut writer = CartsWriter::new(Vec::new(), &header(2)).unwrap();
        for frame in 1..=2 {
            writer
                .write_sample(&Sample {
                    frame,
                    camera: Vec3::ZERO,
                    target: Vec3::ZERO,
                    roll: 0.0,
                })
                .unwrap();
        }
        assert_eq!(writer.rows(), 2);
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();

        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "# CGI Export from Blender/Moco on 2016-03-04 09:05");
        assert_eq!(lines[1], "# Exported from: /shots/sh010.blend");
        assert_eq!(lines[2], "# Exported objects: Camera, Target");
        assert_eq!(lines[3], DATA_TYPE_LINE);
        assert_eq!(lines[4], "POINTS 2  SPEED 25");
        assert_eq!(lines[5], COLUMNS_LINE);
        assert!(lines[6].starts_with("   1"));
        assert!(lines[7].starts_with("   2"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn unsaved_scene_leaves_path_blank() {
        let mut header = header(0);
        header.scene_path = None;

        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("# Exported from: \n"));
        assert!(text.contains("POINTS 0  SPEED 25\n"));
        assert!(text.ends_with(COLUMNS_LINE));
    }
}
