use super::*;
use prominence_common::utils::{ByteOrderReader, ByteOrderWriter};
use std::f64;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Error;

pub fn read_whitebox(
    file_name: &String,
    configs: &mut RasterConfigs,
    data: &mut Vec<f64>,
) -> Result<(), Error> {
    // read the header file
    let header_file = file_name.replace(".tas", ".dep");
    let f = File::open(header_file)?;
    let f = BufReader::new(f);

    for line in f.lines() {
        let line_unwrapped = line?;
        let line_split = line_unwrapped.split(":");
        let vec = line_split.collect::<Vec<&str>>();
        if vec.len() < 2 {
            continue;
        }
        let key = vec[0].to_lowercase();
        if key.contains("rows") {
            configs.rows = vec[1].trim().parse::<usize>().unwrap();
        } else if key.contains("col") {
            configs.columns = vec[1].trim().parse::<usize>().unwrap();
        } else if key.contains("stacks") {
            configs.bands = vec[1].trim().parse::<u8>().unwrap();
        } else if key.contains("north") {
            configs.north = vec[1].trim().parse::<f64>().unwrap();
        } else if key.contains("south") {
            configs.south = vec[1].trim().parse::<f64>().unwrap();
        } else if key.contains("east") {
            configs.east = vec[1].trim().parse::<f64>().unwrap();
        } else if key.contains("west") {
            configs.west = vec[1].trim().parse::<f64>().unwrap();
        } else if key.contains("display min") {
            configs.display_min = vec[1].trim().parse::<f64>().unwrap();
        } else if key.contains("display max") {
            configs.display_max = vec[1].trim().parse::<f64>().unwrap();
        } else if key.contains("min") && !key.contains("display") {
            configs.minimum = vec[1].trim().parse::<f64>().unwrap();
        } else if key.contains("max") && !key.contains("display") {
            configs.maximum = vec[1].trim().parse::<f64>().unwrap();
        } else if key.contains("data type") {
            let value = vec[1].trim().to_lowercase();
            if value.contains("double") {
                configs.data_type = DataType::F64;
            } else if value.contains("float") {
                configs.data_type = DataType::F32;
            } else if value.contains("integer") {
                configs.data_type = DataType::I16;
            } else if value.contains("byte") {
                configs.data_type = DataType::U8;
            }
        } else if key.contains("data scale") {
            let value = vec[1].trim().to_lowercase();
            if value.contains("continuous") {
                configs.photometric_interp = PhotometricInterpretation::Continuous;
            } else if value.contains("categorical") {
                configs.photometric_interp = PhotometricInterpretation::Categorical;
            } else if value.contains("bool") {
                configs.photometric_interp = PhotometricInterpretation::Boolean;
            }
        } else if key.contains("z units") {
            configs.z_units = vec[1].trim().to_string();
        } else if key.contains("xy units") {
            configs.xy_units = vec[1].trim().to_string();
        } else if key.contains("projection") {
            configs.projection = vec[1].trim().to_string();
        } else if key.contains("nodata") {
            configs.nodata = vec[1].trim().parse::<f64>().unwrap();
        } else if key.contains("preferred palette") {
            configs.palette = vec[1].trim().to_string();
        } else if key.contains("byte order") {
            configs.endian = Endianness::from_str(vec[1].trim());
        } else if key.contains("epsg") {
            configs.epsg_code = vec[1].trim().parse::<u16>().unwrap_or(0);
        } else if key.contains("metadata") {
            configs.metadata.push(vec[1].trim().to_string());
        }
    }

    configs.resolution_x = (configs.east - configs.west) / configs.columns as f64;
    configs.resolution_y = (configs.north - configs.south) / configs.rows as f64;

    // read the data file
    let data_file = file_name.replace(".dep", ".tas");
    let f = File::open(data_file)?;
    let mut reader = ByteOrderReader::new(BufReader::new(f), configs.endian);

    let num_cells = configs.rows * configs.columns;
    data.reserve(num_cells);
    match configs.data_type {
        DataType::F64 => {
            for _ in 0..num_cells {
                data.push(reader.read_f64()?);
            }
        }
        DataType::F32 => {
            for _ in 0..num_cells {
                data.push(reader.read_f32()? as f64);
            }
        }
        DataType::I16 => {
            for _ in 0..num_cells {
                data.push(reader.read_i16()? as f64);
            }
        }
        DataType::U8 => {
            for _ in 0..num_cells {
                data.push(reader.read_u8()? as f64);
            }
        }
        _ => {
            return Err(Error::new(
                std::io::ErrorKind::InvalidData,
                "The Whitebox raster header declares an unsupported data type.",
            ));
        }
    }

    Ok(())
}

pub fn write_whitebox<'a>(r: &'a mut Raster) -> Result<(), Error> {
    // figure out the minimum and maximum values
    for val in &r.data {
        let v = *val;
        if v != r.configs.nodata {
            if v < r.configs.minimum {
                r.configs.minimum = v;
            }
            if v > r.configs.maximum {
                r.configs.maximum = v;
            }
        }
    }

    if r.configs.display_min == f64::INFINITY {
        r.configs.display_min = r.configs.minimum;
    }
    if r.configs.display_max == f64::NEG_INFINITY {
        r.configs.display_max = r.configs.maximum;
    }

    // save the header file
    let header_file = r.file_name.replace(".tas", ".dep");
    let f = File::create(header_file)?;
    let mut writer = BufWriter::new(f);

    writer.write_all(format!("Min:\t{}\n", r.configs.minimum).as_bytes())?;
    writer.write_all(format!("Max:\t{}\n", r.configs.maximum).as_bytes())?;
    writer.write_all(format!("North:\t{}\n", r.configs.north).as_bytes())?;
    writer.write_all(format!("South:\t{}\n", r.configs.south).as_bytes())?;
    writer.write_all(format!("East:\t{}\n", r.configs.east).as_bytes())?;
    writer.write_all(format!("West:\t{}\n", r.configs.west).as_bytes())?;
    writer.write_all(format!("Cols:\t{}\n", r.configs.columns).as_bytes())?;
    writer.write_all(format!("Rows:\t{}\n", r.configs.rows).as_bytes())?;
    writer.write_all(format!("Stacks:\t{}\n", r.configs.bands).as_bytes())?;

    let data_type = match r.configs.data_type {
        DataType::F64 => "DOUBLE",
        DataType::I16 => "INTEGER",
        DataType::U8 => "BYTE",
        _ => "FLOAT",
    };
    writer.write_all(format!("Data Type:\t{}\n", data_type).as_bytes())?;

    writer.write_all(format!("Z Units:\t{}\n", r.configs.z_units).as_bytes())?;
    writer.write_all(format!("XY Units:\t{}\n", r.configs.xy_units).as_bytes())?;
    writer.write_all(format!("Projection:\t{}\n", r.configs.projection).as_bytes())?;

    let data_scale = match r.configs.photometric_interp {
        PhotometricInterpretation::Categorical => "categorical",
        PhotometricInterpretation::Boolean => "boolean",
        _ => "continuous",
    };
    writer.write_all(format!("Data Scale:\t{}\n", data_scale).as_bytes())?;

    writer.write_all(format!("Display Min:\t{}\n", r.configs.display_min).as_bytes())?;
    writer.write_all(format!("Display Max:\t{}\n", r.configs.display_max).as_bytes())?;
    writer.write_all(format!("Preferred Palette:\t{}\n", r.configs.palette).as_bytes())?;
    writer.write_all(format!("NoData:\t{}\n", r.configs.nodata).as_bytes())?;

    if r.configs.endian == Endianness::LittleEndian {
        writer.write_all("Byte Order:\tLITTLE_ENDIAN\n".as_bytes())?;
    } else {
        writer.write_all("Byte Order:\tBIG_ENDIAN\n".as_bytes())?;
    }

    if r.configs.epsg_code != 0 {
        writer.write_all(format!("EPSG:\t{}\n", r.configs.epsg_code).as_bytes())?;
    }

    for entry in &r.configs.metadata {
        writer.write_all(format!("Metadata Entry:\t{}\n", entry.replace(":", ";")).as_bytes())?;
    }

    let _ = writer.flush();

    // save the data file
    let data_file = r.file_name.replace(".dep", ".tas");
    let f = File::create(data_file)?;
    let mut writer = ByteOrderWriter::new(BufWriter::new(f), r.configs.endian);

    match r.configs.data_type {
        DataType::F64 => {
            for i in 0..r.data.len() {
                writer.write_f64(r.data[i])?;
            }
        }
        DataType::I16 => {
            for i in 0..r.data.len() {
                writer.write_i16(r.data[i] as i16)?;
            }
        }
        DataType::U8 => {
            for i in 0..r.data.len() {
                writer.write_u8(r.data[i] as u8)?;
            }
        }
        _ => {
            // FLOAT is the default on-disk representation
            for i in 0..r.data.len() {
                writer.write_f32(r.data[i] as f32)?;
            }
        }
    }

    writer.flush()?;

    Ok(())
}
