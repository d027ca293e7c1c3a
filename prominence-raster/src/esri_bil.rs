use super::*;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter, Error, ErrorKind, SeekFrom};

pub fn read_esri_bil(
    file_name: &String,
    configs: &mut RasterConfigs,
    data: &mut Vec<f64>,
) -> Result<(), Error> {
    // read the header file
    let header_file = Path::new(&file_name)
        .with_extension("hdr")
        .into_os_string()
        .into_string()
        .expect("Error creating header file name string for BIL file.");
    let f = File::open(header_file)?;
    let f = BufReader::new(f);

    let mut band_row_bytes = 0usize;
    let mut total_row_bytes = 0u64;
    let mut pixel_type = String::new();
    let mut nbits = 0usize;
    let mut ulxmap = 0f64;
    let mut ulymap = 0f64;
    configs.nodata = -32768f64; // default in the event that it is not in the header file

    for line in f.lines() {
        let line_unwrapped = line?;
        let vec = line_unwrapped.split_whitespace().collect::<Vec<&str>>();
        if vec.len() < 2 {
            continue;
        }
        let key = vec[0].to_lowercase();
        let value = vec[1].to_lowercase();

        if key.contains("byteorder") {
            if value.contains("i") {
                configs.endian = Endianness::LittleEndian;
            } else {
                configs.endian = Endianness::BigEndian;
            }
        } else if key.contains("layout") {
            if !value.contains("bil") {
                println!("Warning: only the BIL layout is supported. BSQ and BIP layouts are currently unsupported.");
            }
        } else if key.contains("nrows") {
            configs.rows = value.trim().parse::<f32>().unwrap() as usize;
        } else if key.contains("ncols") {
            configs.columns = value.trim().parse::<f32>().unwrap() as usize;
        } else if key.contains("nbands") {
            let nbands = value.trim().parse::<f32>().unwrap() as usize;
            if nbands > 1 {
                println!("Warning: the BIL reader only supports single-band rasters. Only the first band will be read.");
            }
        } else if key.contains("nbits") {
            nbits = value.trim().parse::<f32>().unwrap() as usize;
        } else if key.contains("bandrowbytes") {
            band_row_bytes = value.trim().parse::<f64>().unwrap() as usize;
        } else if key.contains("totalrowbytes") {
            total_row_bytes = value.trim().parse::<f64>().unwrap() as u64;
        } else if key.contains("pixeltype") {
            pixel_type = value;
        } else if key.contains("ulxmap") {
            ulxmap = value.trim().parse::<f64>().unwrap();
        } else if key.contains("ulymap") {
            ulymap = value.trim().parse::<f64>().unwrap();
        } else if key.contains("xdim") {
            configs.resolution_x = value.trim().parse::<f64>().unwrap();
        } else if key.contains("ydim") {
            configs.resolution_y = value.trim().parse::<f64>().unwrap();
        } else if key.contains("nodata") {
            configs.nodata = value.trim().parse::<f64>().unwrap();
        }
    }

    configs.photometric_interp = PhotometricInterpretation::Continuous;

    configs.data_type = if pixel_type == "unsignedint" {
        match nbits {
            8 => DataType::U8,
            16 => DataType::U16,
            32 => DataType::U32,
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    "Unrecognized BIL data type.",
                ))
            }
        }
    } else if pixel_type == "signedint" {
        match nbits {
            8 => DataType::I8,
            16 => DataType::I16,
            32 => DataType::I32,
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    "Unrecognized BIL data type.",
                ))
            }
        }
    } else {
        // float
        match nbits {
            32 => DataType::F32,
            64 => DataType::F64,
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    "Unrecognized BIL data type.",
                ))
            }
        }
    };

    let data_size = configs.data_type.get_data_size();
    if band_row_bytes == 0 {
        band_row_bytes = data_size * configs.columns;
    }
    if total_row_bytes == 0 {
        total_row_bytes = band_row_bytes as u64;
    }

    configs.north = ulymap + configs.resolution_y / 2.0f64;
    configs.west = ulxmap - configs.resolution_x / 2.0f64;
    configs.south = configs.north - configs.resolution_y * configs.rows as f64;
    configs.east = configs.west + configs.resolution_x * configs.columns as f64;

    // read the projection file, if there is one
    let prj_file = Path::new(&file_name)
        .with_extension("prj")
        .into_os_string()
        .into_string()
        .expect("Error creating projection file name for BIL file.");

    if std::path::Path::new(&prj_file).exists() {
        let f = File::open(prj_file)?;
        let f = BufReader::new(f);
        configs.projection = String::new();
        for line in f.lines() {
            let line_unwrapped = line?;
            if !line_unwrapped.is_empty() {
                configs.projection = format!("{}{}\n", configs.projection, line_unwrapped);
            }
        }
    }

    // read the data file
    data.reserve(configs.rows * configs.columns);

    let data_file = Path::new(&file_name)
        .with_extension("bil")
        .into_os_string()
        .into_string()
        .expect("Error creating file name string for BIL file.");
    let mut f = File::open(data_file)?;

    let is_le = configs.endian == Endianness::LittleEndian;
    let data_type = configs.data_type;
    for row in 0..configs.rows as u64 {
        let mut buffer = vec![0; band_row_bytes];
        f.seek(SeekFrom::Start(row * total_row_bytes))?;
        f.read(&mut buffer)?;
        for col in 0..configs.columns {
            let offset = col * data_size;
            data.push(decode_cell(&buffer[offset..offset + data_size], data_type, is_le));
        }
    }

    Ok(())
}

fn decode_cell(buf: &[u8], data_type: DataType, is_le: bool) -> f64 {
    match data_type {
        DataType::U8 => buf[0] as f64,
        DataType::U16 => {
            let b = [buf[0], buf[1]];
            if is_le {
                u16::from_le_bytes(b) as f64
            } else {
                u16::from_be_bytes(b) as f64
            }
        }
        DataType::U32 => {
            let b = [buf[0], buf[1], buf[2], buf[3]];
            if is_le {
                u32::from_le_bytes(b) as f64
            } else {
                u32::from_be_bytes(b) as f64
            }
        }
        DataType::I8 => (buf[0] as i8) as f64,
        DataType::I16 => {
            let b = [buf[0], buf[1]];
            if is_le {
                i16::from_le_bytes(b) as f64
            } else {
                i16::from_be_bytes(b) as f64
            }
        }
        DataType::I32 => {
            let b = [buf[0], buf[1], buf[2], buf[3]];
            if is_le {
                i32::from_le_bytes(b) as f64
            } else {
                i32::from_be_bytes(b) as f64
            }
        }
        DataType::F32 => {
            let b = [buf[0], buf[1], buf[2], buf[3]];
            if is_le {
                f32::from_le_bytes(b) as f64
            } else {
                f32::from_be_bytes(b) as f64
            }
        }
        DataType::F64 => {
            let b = [
                buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
            ];
            if is_le {
                f64::from_le_bytes(b)
            } else {
                f64::from_be_bytes(b)
            }
        }
        DataType::Unknown => panic!("Unsupported BIL data type."),
    }
}

pub fn write_esri_bil<'a>(r: &'a mut Raster) -> Result<(), Error> {
    /*
        Save the header file.

        The following is an example of the header file (HDR):

        BYTEORDER      I
        LAYOUT         BIL
        NROWS          5016
        NCOLS          8500
        NBANDS         1
        NBITS          32
        BANDROWBYTES   34000
        TOTALROWBYTES  34000
        PIXELTYPE      FLOAT
        ULXMAP         492088.919783702
        ULYMAP         4737707.84705645
        XDIM           0.499959505373639
        YDIM           0.499912454789739
        NODATA         -3.4028231e+38
    */
    let mut data_type = r.configs.data_type;
    if data_type == DataType::Unknown {
        data_type = DataType::F32;
    }
    let nbits = data_type.get_data_size() * 8;
    let pixel_type = if data_type.is_float() {
        "FLOAT"
    } else {
        match data_type {
            DataType::U8 | DataType::U16 | DataType::U32 => "UNSIGNEDINT",
            _ => "SIGNEDINT",
        }
    };

    let header_file = Path::new(&r.file_name)
        .with_extension("hdr")
        .into_os_string()
        .into_string()
        .expect("Error when trying to create BIL header (HDR) file.");

    let f = File::create(header_file)?;
    let mut writer = BufWriter::new(f);

    writer.write_all("BYTEORDER      I\n".as_bytes())?;
    writer.write_all("LAYOUT         BIL\n".as_bytes())?;
    writer.write_all(format!("NROWS          {}\n", r.configs.rows).as_bytes())?;
    writer.write_all(format!("NCOLS          {}\n", r.configs.columns).as_bytes())?;
    writer.write_all("NBANDS         1\n".as_bytes())?;
    writer.write_all(format!("NBITS          {}\n", nbits).as_bytes())?;
    writer.write_all(
        format!("BANDROWBYTES   {}\n", nbits / 8 * r.configs.columns).as_bytes(),
    )?;
    writer.write_all(
        format!("TOTALROWBYTES  {}\n", nbits / 8 * r.configs.columns).as_bytes(),
    )?;
    writer.write_all(format!("PIXELTYPE      {}\n", pixel_type).as_bytes())?;
    writer.write_all(
        format!(
            "ULXMAP         {}\n",
            r.configs.west + r.configs.resolution_x / 2.0
        )
        .as_bytes(),
    )?;
    writer.write_all(
        format!(
            "ULYMAP         {}\n",
            r.configs.north - r.configs.resolution_y / 2.0
        )
        .as_bytes(),
    )?;
    writer.write_all(format!("XDIM           {}\n", r.configs.resolution_x).as_bytes())?;
    writer.write_all(format!("YDIM           {}\n", r.configs.resolution_y).as_bytes())?;
    writer.write_all(format!("NODATA         {}\n", r.configs.nodata).as_bytes())?;

    let _ = writer.flush();

    // output the projection file
    if r.configs.projection != "not specified" && !r.configs.projection.is_empty() {
        let prj_file = Path::new(&r.file_name)
            .with_extension("prj")
            .into_os_string()
            .into_string()
            .expect("Error when trying to create BIL projection (PRJ) file.");
        let f = File::create(&prj_file)?;
        let mut writer = BufWriter::new(f);
        writer.write_all(r.configs.projection.as_bytes())?;
        let _ = writer.flush();
    }

    // write the data file
    let data_file = Path::new(&r.file_name)
        .with_extension("bil")
        .into_os_string()
        .into_string()
        .expect("Error when trying to create BIL file.");
    let f = File::create(&data_file)?;
    let mut writer = BufWriter::new(f);

    for i in 0..r.data.len() {
        match data_type {
            DataType::U8 => writer.write_all(&[r.data[i] as u8])?,
            DataType::U16 => writer.write_all(&(r.data[i] as u16).to_le_bytes())?,
            DataType::U32 => writer.write_all(&(r.data[i] as u32).to_le_bytes())?,
            DataType::I8 => writer.write_all(&(r.data[i] as i8).to_le_bytes())?,
            DataType::I16 => writer.write_all(&(r.data[i] as i16).to_le_bytes())?,
            DataType::I32 => writer.write_all(&(r.data[i] as i32).to_le_bytes())?,
            DataType::F32 => writer.write_all(&(r.data[i] as f32).to_le_bytes())?,
            DataType::F64 => writer.write_all(&r.data[i].to_le_bytes())?,
            DataType::Unknown => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    "The raster is of a data type that is not supported by the BIL raster format.",
                ))
            }
        }
    }

    let _ = writer.flush();

    Ok(())
}
