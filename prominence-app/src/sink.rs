/*
This code is part of the prominence-tools terrain analysis toolkit.
License: MIT
*/
use crate::transform::PixelTransform;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufWriter;

/// Streams finalized peaks to a CSV file. The header row is written once at
/// creation and matches the presence of the coordinate transform:
/// `x,y,prominence,elevation` without one,
/// `x,y,prominence,longitude,latitude,elevation` with one.
///
/// An unwritable output path is not fatal: a diagnostic goes to standard
/// error, the run continues, and the open is not retried.
pub struct CsvSink {
    path: String,
    writer: Option<BufWriter<File>>,
    transform: Option<PixelTransform>,
}

impl CsvSink {
    pub fn new(path: &str, transform: Option<PixelTransform>) -> CsvSink {
        let writer = match File::create(path) {
            Ok(f) => {
                let mut w = BufWriter::new(f);
                let header = if transform.is_some() {
                    "x,y,prominence,longitude,latitude,elevation\n"
                } else {
                    "x,y,prominence,elevation\n"
                };
                match w.write_all(header.as_bytes()) {
                    Ok(_) => Some(w),
                    Err(e) => {
                        eprintln!("Error writing the header row to {}: {}", path, e);
                        Some(w)
                    }
                }
            }
            Err(e) => {
                eprintln!("Error: unable to open {} for output: {}", path, e);
                None
            }
        };
        CsvSink {
            path: path.to_string(),
            writer: writer,
            transform: transform,
        }
    }

    pub fn append(&mut self, x: isize, y: isize, prominence: f64, elevation: f64) {
        if let Some(w) = self.writer.as_mut() {
            let row = match &self.transform {
                Some(t) => {
                    let (longitude, latitude) = t.to_lon_lat(x, y);
                    format!(
                        "{},{},{},{},{},{}\n",
                        x, y, prominence, longitude, latitude, elevation
                    )
                }
                None => format!("{},{},{},{}\n", x, y, prominence, elevation),
            };
            if let Err(e) = w.write_all(row.as_bytes()) {
                eprintln!("Error appending to {}: {}", self.path, e);
            }
        }
    }

    pub fn flush(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            if let Err(e) = w.flush() {
                eprintln!("Error flushing {}: {}", self.path, e);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::CsvSink;
    use crate::transform::PixelTransform;
    use std::fs;
    use std::path::PathBuf;

    fn temp_file(name: &str) -> String {
        let mut p: PathBuf = std::env::temp_dir();
        p.push(format!("prominence_sink_{}_{}", std::process::id(), name));
        p.to_string_lossy().to_string()
    }

    #[test]
    fn test_rows_without_transform() {
        let path = temp_file("plain.csv");
        {
            let mut sink = CsvSink::new(&path, None);
            sink.append(1, 1, 5.0, 5.0);
            sink.append(4, 2, 2.5, 130.5);
            sink.flush();
        }
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "x,y,prominence,elevation");
        assert_eq!(lines[1], "1,1,5,5");
        assert_eq!(lines[2], "4,2,2.5,130.5");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_rows_with_transform() {
        let path = temp_file("geo.csv");
        let transform = PixelTransform::Geographic {
            west: -22.0,
            north: 65.0,
            resolution_x: 0.1,
            resolution_y: 0.1,
        };
        {
            let mut sink = CsvSink::new(&path, Some(transform));
            sink.append(0, 0, 9.0, 9.0);
            sink.flush();
        }
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "x,y,prominence,longitude,latitude,elevation");
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0], "0");
        assert_eq!(fields[1], "0");
        assert!((fields[3].parse::<f64>().unwrap() - -21.95).abs() < 1e-9);
        assert!((fields[4].parse::<f64>().unwrap() - 64.95).abs() < 1e-9);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unwritable_path_is_not_fatal() {
        let mut sink = CsvSink::new("/no/such/directory/out.csv", None);
        // appends must be harmless no-ops
        sink.append(0, 0, 1.0, 1.0);
        sink.flush();
    }

    #[test]
    fn test_header_only_for_empty_run() {
        let path = temp_file("empty.csv");
        {
            let mut sink = CsvSink::new(&path, None);
            sink.flush();
        }
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "x,y,prominence,elevation\n");
        let _ = fs::remove_file(&path);
    }
}
