/*
This code is part of the prominence-tools terrain analysis toolkit.
License: MIT
*/

mod arcascii_raster;
mod esri_bil;
mod grass_raster;
mod whitebox_raster;

use self::arcascii_raster::*;
use self::esri_bil::*;
use self::grass_raster::*;
use self::whitebox_raster::*;
use prominence_common::structures::Array2D;
use prominence_common::utils::Endianness;
use std::default::Default;
use std::f64;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::io::{Error, ErrorKind};
use std::ops::{Index, IndexMut};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

/// Raster is a common data structure that abstracts over several single-band
/// raster data formats, including ESRI ASCII grids, GRASS ASCII rasters,
/// ESRI BIL rasters, and Whitebox rasters. The full grid is held in memory
/// as `f64` values regardless of the on-disk data type.
///
/// Examples:
///
/// ```ignore
/// // Read an existing raster file
/// let input = Raster::new(&input_file, "r")?;
///
/// // Create a new raster with the dimensions and location
/// // described by a RasterConfigs.
/// let mut output = Raster::initialize_using_config(&output_file, &configs);
/// ```
#[derive(Default, Clone)]
pub struct Raster {
    pub file_name: String,
    pub file_mode: String,
    pub raster_type: RasterType,
    pub configs: RasterConfigs,
    pub(crate) data: Vec<f64>,
}

impl Index<(isize, isize)> for Raster {
    type Output = f64;

    fn index<'a>(&'a self, index: (isize, isize)) -> &'a f64 {
        let row = index.0;
        let column = index.1;

        if column < 0 {
            return &self.configs.nodata;
        }
        if row < 0 {
            return &self.configs.nodata;
        }

        let c: usize = column as usize;
        let r: usize = row as usize;

        if c >= self.configs.columns {
            return &self.configs.nodata;
        }
        if r >= self.configs.rows {
            return &self.configs.nodata;
        }
        let idx: usize = r * self.configs.columns + c;
        &self.data[idx]
    }
}

impl IndexMut<(isize, isize)> for Raster {
    fn index_mut<'a>(&'a mut self, index: (isize, isize)) -> &'a mut f64 {
        let row = index.0;
        let column = index.1;
        if column < 0 {
            return &mut self.configs.nodata;
        }
        if row < 0 {
            return &mut self.configs.nodata;
        }
        let c: usize = column as usize;
        let r: usize = row as usize;
        if c >= self.configs.columns {
            return &mut self.configs.nodata;
        }
        if r >= self.configs.rows {
            return &mut self.configs.nodata;
        }
        let idx = r * self.configs.columns + c;
        &mut self.data[idx]
    }
}

impl Raster {
    /// Creates an in-memory `Raster` object. The data are either read from
    /// an existing file (`file_name`; `file_mode` is 'r') or prepared for
    /// new file creation (`file_mode` is 'w'). The raster format is
    /// determined by the file extension of the `file_name` string.
    pub fn new<'a>(file_name: &'a str, file_mode: &'a str) -> Result<Raster, Error> {
        let fm: String = file_mode.to_lowercase();
        let mut r = Raster {
            file_name: file_name.to_string(),
            file_mode: fm.clone(),
            raster_type: get_raster_type_from_file(file_name.to_string(), fm.clone()),
            ..Default::default()
        };
        if r.file_mode.contains("r") {
            match r.raster_type {
                RasterType::ArcAscii => {
                    read_arcascii(&r.file_name, &mut r.configs, &mut r.data)?;
                }
                RasterType::EsriBil => {
                    read_esri_bil(&r.file_name, &mut r.configs, &mut r.data)?;
                }
                RasterType::GrassAscii => {
                    read_grass_raster(&r.file_name, &mut r.configs, &mut r.data)?;
                }
                RasterType::Whitebox => {
                    read_whitebox(&r.file_name, &mut r.configs, &mut r.data)?;
                }
                RasterType::Unknown => {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!(
                            "Unrecognized raster type for file {}. Supported formats are ESRI ASCII (.asc/.txt), GRASS ASCII (.asc/.txt), ESRI BIL (.bil), and Whitebox (.dep/.tas); convert other formats (e.g. GeoTIFF) to one of these first.",
                            file_name
                        ),
                    ));
                }
            }
            if r.data.len() != r.configs.rows * r.configs.columns {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!(
                        "The number of cells read from {} ({}) does not match the {} x {} grid declared in its header.",
                        file_name,
                        r.data.len(),
                        r.configs.rows,
                        r.configs.columns
                    ),
                ));
            }
            r.update_min_max();
            return Ok(r);
        }
        // write mode; the grid is populated by the caller
        Ok(r)
    }

    /// Creates a new in-memory `Raster` with grid extent and location based
    /// on the specified configurations.
    pub fn initialize_using_config<'a>(file_name: &'a str, configs: &'a RasterConfigs) -> Raster {
        let mut output = Raster {
            file_name: file_name.to_string(),
            ..Default::default()
        };
        output.file_mode = "w".to_string();
        output.raster_type = get_raster_type_from_file(file_name.to_string(), "w".to_string());

        output.configs.rows = configs.rows;
        output.configs.columns = configs.columns;
        output.configs.north = configs.north;
        output.configs.south = configs.south;
        output.configs.east = configs.east;
        output.configs.west = configs.west;
        output.configs.resolution_x = configs.resolution_x;
        output.configs.resolution_y = configs.resolution_y;
        output.configs.nodata = configs.nodata;
        output.configs.data_type = configs.data_type;
        output.configs.photometric_interp = configs.photometric_interp;
        output.configs.palette = configs.palette.clone();
        output.configs.projection = configs.projection.clone();
        output.configs.xy_units = configs.xy_units.clone();
        output.configs.z_units = configs.z_units.clone();
        output.configs.endian = configs.endian;
        output.configs.epsg_code = configs.epsg_code;

        output.data = vec![output.configs.nodata; output.configs.rows * output.configs.columns];

        output
    }

    /// Returns the file name of the `Raster`, without the directory and the
    /// file extension.
    pub fn get_short_filename(&self) -> String {
        let path = Path::new(&self.file_name);
        match path.file_stem() {
            Some(stem) => stem.to_string_lossy().to_string(),
            None => self.file_name.clone(),
        }
    }

    /// Returns the value contained within a grid cell specified by `row`
    /// and `column`. Cells beyond the grid extent return the nodata value.
    pub fn get_value(&self, row: isize, column: isize) -> f64 {
        if column >= 0
            && row >= 0
            && column < self.configs.columns as isize
            && row < self.configs.rows as isize
        {
            let c: usize = column as usize;
            let r: usize = row as usize;
            let idx: usize = r * self.configs.columns + c;
            return self.data[idx];
        }
        self.configs.nodata
    }

    pub fn set_value(&mut self, row: isize, column: isize, value: f64) {
        if column >= 0 && row >= 0 {
            let c: usize = column as usize;
            let r: usize = row as usize;
            if c < self.configs.columns && r < self.configs.rows {
                let idx = r * self.configs.columns + c;
                self.data[idx] = value;
            }
        }
    }

    pub fn set_row_data(&mut self, row: isize, values: Vec<f64>) {
        for column in 0..values.len() {
            if row >= 0 {
                let c: usize = column;
                let r: usize = row as usize;
                if c < self.configs.columns && r < self.configs.rows {
                    let idx = r * self.configs.columns + c;
                    self.data[idx] = values[c];
                }
            }
        }
    }

    pub fn get_row_data(&self, row: isize) -> Vec<f64> {
        let mut values: Vec<f64> = vec![self.configs.nodata; self.configs.columns];
        if row >= 0 && row < self.configs.rows as isize {
            for column in 0..values.len() {
                values[column] = self.data[row as usize * self.configs.columns + column];
            }
        }
        values
    }

    pub fn num_cells(&self) -> usize {
        self.configs.rows * self.configs.columns
    }

    /// Copies the grid into an `Array2D<f64>` that shares the raster's
    /// nodata sentinel.
    pub fn get_data_as_array2d(&self) -> Array2D<f64> {
        let mut data: Array2D<f64> = Array2D::new(
            self.configs.rows as isize,
            self.configs.columns as isize,
            self.configs.nodata,
            self.configs.nodata,
        )
        .expect("Error creating Array2D from raster data.");
        for row in 0..self.configs.rows as isize {
            data.set_row_data(row, self.get_row_data(row));
        }
        data
    }

    /// Recomputes the grid minimum and maximum, ignoring nodata cells. The
    /// scan is split across the available processors.
    pub fn update_min_max(&mut self) {
        self.configs.minimum = f64::INFINITY;
        self.configs.maximum = f64::NEG_INFINITY;
        let num_procs = num_cpus::get();
        let nodata = self.configs.nodata;
        let values = Arc::new(self.data.clone());
        let (tx, rx) = mpsc::channel();
        for tid in 0..num_procs {
            let values = values.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                let mut min_val = f64::INFINITY;
                let mut max_val = f64::NEG_INFINITY;
                let mut value: f64;
                for i in (0..values.len()).filter(|v| v % num_procs == tid) {
                    value = values[i];
                    if value != nodata {
                        if value < min_val {
                            min_val = value;
                        }
                        if value > max_val {
                            max_val = value;
                        }
                    }
                }
                tx.send((min_val, max_val)).unwrap();
            });
        }

        for _ in 0..num_procs {
            let (min_val, max_val) = rx.recv().expect("Error receiving data from thread.");
            if min_val < self.configs.minimum {
                self.configs.minimum = min_val;
            }
            if max_val > self.configs.maximum {
                self.configs.maximum = max_val;
            }
        }

        if self.configs.display_min == f64::INFINITY {
            self.configs.display_min = self.configs.minimum;
        }
        if self.configs.display_max == f64::NEG_INFINITY {
            self.configs.display_max = self.configs.maximum;
        }
    }

    pub fn get_x_from_column(&self, column: isize) -> f64 {
        self.configs.west
            + self.configs.resolution_x / 2f64
            + column as f64 * self.configs.resolution_x
    }

    pub fn get_y_from_row(&self, row: isize) -> f64 {
        self.configs.north
            - self.configs.resolution_y / 2f64
            - row as f64 * self.configs.resolution_y
    }

    /// Heuristic test of whether the raster's horizontal coordinates are
    /// geographic (degrees) rather than projected.
    pub fn is_in_geographic_coordinates(&self) -> bool {
        if self.configs.west < -180f64
            || self.configs.east > 180f64
            || self.configs.north > 90f64
            || self.configs.south < -90f64
        {
            return false;
        }
        if self.configs.epsg_code == 4322
            || self.configs.epsg_code == 4326
            || self.configs.epsg_code == 4629
            || self.configs.epsg_code == 4277
        {
            return true;
        }
        let wkt = self.configs.projection.to_lowercase();
        if wkt.contains("geogcs[") && !wkt.contains("projcs[") {
            return true;
        }
        if self.configs.xy_units.to_lowercase().contains("deg") {
            return true;
        }
        false
    }

    pub fn write(&mut self) -> Result<(), Error> {
        if !self.file_mode.contains("w") {
            return Err(Error::new(
                ErrorKind::Other,
                "Cannot write a raster that was not created in write mode ('w').",
            ));
        }
        match self.raster_type {
            RasterType::ArcAscii => write_arcascii(self)?,
            RasterType::EsriBil => write_esri_bil(self)?,
            RasterType::GrassAscii => write_grass_raster(self)?,
            RasterType::Whitebox => write_whitebox(self)?,
            RasterType::Unknown => {
                return Err(Error::new(ErrorKind::Other, "Unrecognized raster type"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RasterConfigs {
    pub rows: usize,
    pub columns: usize,
    pub bands: u8,
    pub nodata: f64,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub resolution_x: f64,
    pub resolution_y: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub display_min: f64,
    pub display_max: f64,
    pub palette: String,
    pub projection: String,
    pub endian: Endianness,
    pub photometric_interp: PhotometricInterpretation,
    pub data_type: DataType,
    pub z_units: String,
    pub xy_units: String,
    pub epsg_code: u16,
    pub metadata: Vec<String>,
}

impl Default for RasterConfigs {
    fn default() -> RasterConfigs {
        RasterConfigs {
            bands: 1,
            rows: 0,
            columns: 0,
            nodata: -32768.0,
            north: f64::NEG_INFINITY,
            south: f64::INFINITY,
            east: f64::NEG_INFINITY,
            west: f64::INFINITY,
            resolution_x: f64::NEG_INFINITY,
            resolution_y: f64::NEG_INFINITY,
            minimum: f64::INFINITY,
            maximum: f64::NEG_INFINITY,
            display_min: f64::INFINITY,
            display_max: f64::NEG_INFINITY,
            palette: "not specified".to_string(),
            projection: "not specified".to_string(),
            endian: Endianness::LittleEndian,
            photometric_interp: PhotometricInterpretation::Unknown,
            data_type: DataType::Unknown,
            z_units: "not specified".to_string(),
            xy_units: "not specified".to_string(),
            epsg_code: 0u16,
            metadata: vec![],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum RasterType {
    #[default]
    Unknown,
    ArcAscii,
    EsriBil,
    GrassAscii,
    Whitebox,
}

fn get_raster_type_from_file(file_name: String, file_mode: String) -> RasterType {
    // get the file extension
    let extension: String = match Path::new(&file_name).extension() {
        Some(ext) => ext.to_string_lossy().to_lowercase(),
        None => String::new(),
    };

    if extension == "tas" || extension == "dep" {
        return RasterType::Whitebox;
    } else if extension == "bil" {
        return RasterType::EsriBil;
    } else if extension == "asc" || extension == "txt" {
        // what mode is this raster in?
        if file_mode == "r" {
            // It could be an ArcAscii or a GrassAscii.
            if let Ok(f) = File::open(&file_name) {
                let file = BufReader::new(&f);
                let mut line_count = 0;
                for line in file.lines() {
                    let l = line.unwrap_or_default().to_lowercase();
                    if l.contains("north")
                        || l.contains("south")
                        || l.contains("east")
                        || l.contains("west")
                    {
                        return RasterType::GrassAscii;
                    }
                    if l.contains("xllcorner")
                        || l.contains("yllcorner")
                        || l.contains("xllcenter")
                        || l.contains("yllcenter")
                    {
                        return RasterType::ArcAscii;
                    }
                    if line_count > 7 {
                        break;
                    }
                    line_count += 1;
                }
            }
        }
        // For file_mode "w" there is no way of knowing if it is an Arc or
        // GRASS ASCII raster. Default to ArcAscii.
        return RasterType::ArcAscii;
    }

    RasterType::Unknown
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum DataType {
    F64,
    F32,
    I32,
    I16,
    I8,
    U32,
    U16,
    U8,
    #[default]
    Unknown,
}

impl DataType {
    pub fn get_data_size(&self) -> usize {
        match *self {
            DataType::F64 => 8usize,
            DataType::F32 => 4usize,
            DataType::I32 => 4usize,
            DataType::I16 => 2usize,
            DataType::I8 => 1usize,
            DataType::U32 => 4usize,
            DataType::U16 => 2usize,
            DataType::U8 => 1usize,
            DataType::Unknown => 0usize,
        }
    }

    pub fn is_float(&self) -> bool {
        match *self {
            DataType::F64 => true,
            DataType::F32 => true,
            _ => false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum PhotometricInterpretation {
    Continuous,
    Categorical,
    Boolean,
    #[default]
    Unknown,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_file(name: &str) -> String {
        let mut p: PathBuf = std::env::temp_dir();
        p.push(format!("prominence_raster_{}_{}", std::process::id(), name));
        p.to_string_lossy().to_string()
    }

    fn demo_configs() -> RasterConfigs {
        RasterConfigs {
            rows: 3,
            columns: 4,
            nodata: -9999.0,
            north: 1003.0,
            south: 1000.0,
            east: 504.0,
            west: 500.0,
            resolution_x: 1.0,
            resolution_y: 1.0,
            data_type: DataType::F32,
            ..Default::default()
        }
    }

    #[test]
    fn test_arcascii_round_trip() {
        let file = temp_file("round.asc");
        let mut out = Raster::initialize_using_config(&file, &demo_configs());
        for row in 0..3 {
            for col in 0..4 {
                out.set_value(row, col, (row * 10 + col) as f64);
            }
        }
        out.set_value(2, 3, -9999.0);
        out.write().unwrap();

        let input = Raster::new(&file, "r").unwrap();
        assert_eq!(input.raster_type, RasterType::ArcAscii);
        assert_eq!(input.configs.rows, 3);
        assert_eq!(input.configs.columns, 4);
        assert_eq!(input.configs.nodata, -9999.0);
        assert_eq!(input.get_value(1, 2), 12.0);
        assert_eq!(input.get_value(2, 3), -9999.0);
        assert_eq!(input.configs.minimum, 0.0);
        assert_eq!(input.configs.maximum, 22.0);
        let _ = fs::remove_file(&file);
    }

    #[test]
    fn test_whitebox_round_trip() {
        let file = temp_file("round.dep");
        let mut configs = demo_configs();
        configs.data_type = DataType::F64;
        let mut out = Raster::initialize_using_config(&file, &configs);
        for row in 0..3 {
            for col in 0..4 {
                out.set_value(row, col, 100.0 + (row * 4 + col) as f64 / 2.0);
            }
        }
        out.write().unwrap();

        let input = Raster::new(&file, "r").unwrap();
        assert_eq!(input.raster_type, RasterType::Whitebox);
        assert_eq!(input.configs.rows, 3);
        assert_eq!(input.configs.columns, 4);
        assert_eq!(input.get_value(0, 0), 100.0);
        assert_eq!(input.get_value(2, 3), 105.5);
        let _ = fs::remove_file(&file);
        let _ = fs::remove_file(&file.replace(".dep", ".tas"));
    }

    #[test]
    fn test_grass_round_trip() {
        let file = temp_file("round_grass.txt");
        {
            let mut f = fs::File::create(&file).unwrap();
            writeln!(f, "north: 1003.0").unwrap();
            writeln!(f, "south: 1000.0").unwrap();
            writeln!(f, "east: 504.0").unwrap();
            writeln!(f, "west: 500.0").unwrap();
            writeln!(f, "rows: 2").unwrap();
            writeln!(f, "cols: 3").unwrap();
            writeln!(f, "null: -99").unwrap();
            writeln!(f, "1 2 3").unwrap();
            writeln!(f, "4 -99 6").unwrap();
        }
        let input = Raster::new(&file, "r").unwrap();
        assert_eq!(input.raster_type, RasterType::GrassAscii);
        assert_eq!(input.configs.rows, 2);
        assert_eq!(input.configs.columns, 3);
        assert_eq!(input.get_value(1, 0), 4.0);
        assert_eq!(input.get_value(1, 1), -99.0);
        assert_eq!(input.configs.maximum, 6.0);
        let _ = fs::remove_file(&file);
    }

    #[test]
    fn test_esri_bil_round_trip() {
        let file = temp_file("round.bil");
        let mut configs = demo_configs();
        configs.data_type = DataType::F32;
        let mut out = Raster::initialize_using_config(&file, &configs);
        for row in 0..3 {
            for col in 0..4 {
                out.set_value(row, col, (row * 4 + col) as f64 * 0.25);
            }
        }
        out.write().unwrap();

        let input = Raster::new(&file, "r").unwrap();
        assert_eq!(input.raster_type, RasterType::EsriBil);
        assert_eq!(input.configs.rows, 3);
        assert_eq!(input.configs.columns, 4);
        assert_eq!(input.get_value(1, 1), 1.25);
        let _ = fs::remove_file(&file);
        let _ = fs::remove_file(&file.replace(".bil", ".hdr"));
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let res = Raster::new("/no/such/file.tif", "r");
        assert!(res.is_err());
    }

    #[test]
    fn test_pixel_centre_coordinates() {
        let file = temp_file("centre.asc");
        let r = Raster::initialize_using_config(&file, &demo_configs());
        assert_eq!(r.get_x_from_column(0), 500.5);
        assert_eq!(r.get_y_from_row(0), 1002.5);
        assert_eq!(r.get_x_from_column(3), 503.5);
        assert_eq!(r.get_y_from_row(2), 1000.5);
    }

    #[test]
    fn test_geographic_detection() {
        let file = temp_file("geog.asc");
        let mut configs = demo_configs();
        configs.north = 65.0;
        configs.south = 63.0;
        configs.east = -18.0;
        configs.west = -22.0;
        configs.xy_units = "degrees".to_string();
        let r = Raster::initialize_using_config(&file, &configs);
        assert!(r.is_in_geographic_coordinates());

        let r2 = Raster::initialize_using_config(&file, &demo_configs());
        assert!(!r2.is_in_geographic_coordinates());
    }

    #[test]
    fn test_get_data_as_array2d() {
        let file = temp_file("arr.asc");
        let mut r = Raster::initialize_using_config(&file, &demo_configs());
        r.set_value(0, 0, 5.0);
        let a = r.get_data_as_array2d();
        assert_eq!(a.rows(), 3);
        assert_eq!(a.columns(), 4);
        assert_eq!(a.get_value(0, 0), 5.0);
        assert_eq!(a.get_value(-1, 0), -9999.0);
    }
}
