use super::*;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Error;

pub fn read_grass_raster(
    file_name: &String,
    configs: &mut RasterConfigs,
    data: &mut Vec<f64>,
) -> Result<(), Error> {
    // read the file
    let f = File::open(file_name)?;
    let f = BufReader::new(f);

    configs.nodata = -9999f64; // default if the header does not declare one

    for line in f.lines() {
        let line_unwrapped = line?;
        if line_unwrapped.contains(":") {
            let line_split = line_unwrapped.split(":");
            let vec = line_split.collect::<Vec<&str>>();
            let key = vec[0].to_lowercase();
            if key.contains("rows") {
                configs.rows = vec[1].trim().parse::<f32>().unwrap() as usize;
                if configs.columns > 0 {
                    data.reserve(configs.rows * configs.columns);
                }
            } else if key.contains("cols") {
                configs.columns = vec[1].trim().parse::<f32>().unwrap() as usize;
                if configs.rows > 0 {
                    data.reserve(configs.rows * configs.columns);
                }
            } else if key.contains("north") {
                configs.north = vec[1].trim().parse::<f64>().unwrap();
            } else if key.contains("south") {
                configs.south = vec[1].trim().parse::<f64>().unwrap();
            } else if key.contains("east") {
                configs.east = vec[1].trim().parse::<f64>().unwrap();
            } else if key.contains("west") {
                configs.west = vec[1].trim().parse::<f64>().unwrap();
            } else if key.contains("null") {
                if vec[1].contains(".") {
                    configs.data_type = DataType::F32;
                } else {
                    configs.data_type = DataType::I32;
                }
                configs.nodata = vec[1].trim().parse::<f64>().unwrap();
            } else if key.contains("type") {
                if vec[1].contains("float") {
                    configs.data_type = DataType::F32;
                } else if vec[1].contains("double") {
                    configs.data_type = DataType::F64;
                } else if vec[1].contains("int") {
                    configs.data_type = DataType::I32;
                }
            }
        } else {
            // it's a data line
            for val in line_unwrapped.split_whitespace() {
                if val == "*" {
                    // GRASS marks null cells with an asterisk
                    data.push(configs.nodata);
                } else {
                    data.push(val.trim().parse::<f64>().unwrap());
                }
            }
        }
    }

    configs.resolution_x = (configs.east - configs.west) / configs.columns as f64;
    configs.resolution_y = (configs.north - configs.south) / configs.rows as f64;
    configs.photometric_interp = PhotometricInterpretation::Continuous;

    Ok(())
}

pub fn write_grass_raster<'a>(r: &'a mut Raster) -> Result<(), Error> {
    // Save the file
    let f = File::create(&(r.file_name))?;
    let mut writer = BufWriter::new(f);

    let s = format!("north: {}\n", r.configs.north);
    writer.write_all(s.as_bytes())?;

    let s = format!("south: {}\n", r.configs.south);
    writer.write_all(s.as_bytes())?;

    let s = format!("east: {}\n", r.configs.east);
    writer.write_all(s.as_bytes())?;

    let s = format!("west: {}\n", r.configs.west);
    writer.write_all(s.as_bytes())?;

    let s = format!("rows: {}\n", r.configs.rows);
    writer.write_all(s.as_bytes())?;

    let s = format!("cols: {}\n", r.configs.columns);
    writer.write_all(s.as_bytes())?;

    let s = format!("null: {}\n", r.configs.nodata);
    writer.write_all(s.as_bytes())?;

    // write the data
    let mut s2 = String::new();
    let num_cells: usize = r.configs.rows * r.configs.columns;
    let mut col = 0;
    for i in 0..num_cells {
        if col < r.configs.columns - 1 {
            s2 += &format!("{:.*} ", 2, r.data[i]);
        } else {
            s2 += &format!("{:.*}\n", 2, r.data[i]);
        }
        col += 1;
        if col == r.configs.columns {
            writer.write_all(s2.as_bytes())?;
            s2 = String::new();
            col = 0;
        }
    }

    let _ = writer.flush();

    Ok(())
}
