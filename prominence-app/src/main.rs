/*
This code is part of the prominence-tools terrain analysis toolkit.
License: MIT
*/

/*!
prominence_tools computes the topographic prominence of every peak in a
digital elevation model (DEM): the vertical drop from each peak down to the
lowest contour that encloses it and no higher peak. Peaks are found with a
parallel scan for strict local maxima; prominence is then assigned by
simulating a water level that falls from the highest elevation to the
lowest, growing an island around each peak and fixing the lower peak's
prominence whenever two islands first touch at a key col.

Usage:

```text
>> prominence_tools dem.asc -o peaks.csv -threshold 100 -verbose
```
*/

mod flood;
mod island;
mod overview;
mod peaks;
mod sink;
mod transform;

use crate::sink::CsvSink;
use crate::transform::PixelTransform;
use prominence_common::configs;
use prominence_common::utils::get_formatted_elapsed_time;
use prominence_raster::Raster;
use std::env;
use std::io::{Error, ErrorKind};
use std::path;
use std::sync::Arc;
use std::time::Instant;

fn main() {
    match run() {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<(), Error> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "A DEM file path is required.",
        ));
    }

    let mut dem_file = String::new();
    let mut output_file = String::new();
    let mut threshold = 0f64;
    let mut verbose = false;
    let mut visualize = false;

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].replace("\"", "").replace("\'", "");
        if arg.starts_with("-") {
            let cmd = arg.split("="); // in case an equals sign was used
            let vec = cmd.collect::<Vec<&str>>();
            let keyval = vec.len() > 1;
            let flag = vec[0].to_lowercase().replace("--", "-");
            if flag == "-h" || flag == "-help" {
                help();
                return Ok(());
            } else if flag == "-version" {
                version();
                return Ok(());
            } else if flag == "-o" || flag == "-output" {
                if keyval {
                    output_file = vec[1].to_string();
                } else {
                    if i + 1 >= args.len() {
                        usage();
                        return Err(Error::new(
                            ErrorKind::InvalidInput,
                            "The -o flag requires a file path.",
                        ));
                    }
                    output_file = args[i + 1].replace("\"", "").replace("\'", "");
                    i += 1;
                }
            } else if flag == "-threshold" {
                let val = if keyval {
                    vec[1].to_string()
                } else {
                    if i + 1 >= args.len() {
                        usage();
                        return Err(Error::new(
                            ErrorKind::InvalidInput,
                            "The -threshold flag requires an integer value.",
                        ));
                    }
                    i += 1;
                    args[i].clone()
                };
                threshold = match val.trim().parse::<f64>() {
                    Ok(v) => v,
                    Err(_) => {
                        usage();
                        return Err(Error::new(
                            ErrorKind::InvalidInput,
                            format!("Error parsing the -threshold value {}.", val),
                        ));
                    }
                };
            } else if flag == "-v" || flag == "-verbose" {
                verbose = true;
            } else if flag == "-visualize" {
                visualize = true;
            } else {
                usage();
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("Unrecognized flag {}.", arg),
                ));
            }
        } else if dem_file.is_empty() {
            dem_file = arg;
        } else {
            usage();
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unexpected argument {}.", arg),
            ));
        }
        i += 1;
    }

    if dem_file.is_empty() {
        usage();
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "A DEM file path is required.",
        ));
    }
    if visualize && !output_file.is_empty() {
        usage();
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "-visualize and -o are mutually exclusive.",
        ));
    }

    let settings = configs::get_configs()?;
    if settings.verbose_mode {
        verbose = true;
    }

    // resolve bare file names against the configured working directory
    let sep: String = path::MAIN_SEPARATOR.to_string();
    if !settings.working_directory.is_empty() {
        if !dem_file.contains(&sep) && !dem_file.contains("/") {
            dem_file = format!("{}{}", settings.working_directory, dem_file);
        }
        if !output_file.is_empty() && !output_file.contains(&sep) && !output_file.contains("/") {
            output_file = format!("{}{}", settings.working_directory, output_file);
        }
    }

    if visualize {
        return overview::run(&dem_file, verbose);
    }

    if verbose {
        println!("********************************");
        println!("* Welcome to prominence_tools  *");
        println!("* Water-level peak prominence  *");
        println!("********************************");
        println!("Reading data...");
    }

    let input = Arc::new(Raster::new(&dem_file, "r")?);

    let start = Instant::now();

    let mut num_procs = num_cpus::get() as isize;
    if settings.max_procs > 0 && settings.max_procs < num_procs {
        num_procs = settings.max_procs;
    }

    let peak_list = peaks::find_peaks(&input, num_procs, verbose);
    if verbose {
        println!("Found {} peaks.", peak_list.len());
    }

    let transform = PixelTransform::from_raster(&input);
    if verbose && !output_file.is_empty() && transform.is_none() {
        println!("No usable projection; the output omits longitude/latitude columns.");
    }

    // hand the grid to the flood and release the source raster
    let elevations = input.get_data_as_array2d();
    let nodata = input.configs.nodata;
    let min_elevation = input.configs.minimum;
    let max_elevation = input.configs.maximum;
    drop(input);

    let mut sink = if !output_file.is_empty() {
        Some(CsvSink::new(&output_file, transform))
    } else {
        None
    };

    let emitted = flood::calculate_prominence(
        elevations,
        nodata,
        min_elevation,
        max_elevation,
        peak_list,
        threshold,
        sink.as_mut(),
        verbose,
    )?;

    if let Some(s) = sink.as_mut() {
        s.flush();
    }

    if verbose {
        println!(
            "{} peaks above the prominence threshold.",
            emitted.len()
        );
        if let Some(top) = emitted
            .iter()
            .max_by(|a, b| {
                a.prominence
                    .partial_cmp(&b.prominence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        {
            println!(
                "Most prominent: ({}, {}) elevation {} prominence {}",
                top.x, top.y, top.elevation, top.prominence
            );
        }
        println!(
            "{}",
            &format!("Elapsed Time (excluding I/O): {}", get_formatted_elapsed_time(start))
        );
    }

    Ok(())
}

fn usage() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }
    eprintln!(
        "Usage: prominence_tools{} <DEM_PATH> [-o OUT.csv] [-threshold N] [-verbose] [-visualize]",
        ext
    );
    eprintln!("Run with -h for details.");
}

fn help() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }
    let exe_name = &format!("prominence_tools{}", ext);
    let s = "prominence_tools Help

Computes the topographic prominence of every peak in a DEM and writes the
result as CSV. Supported input formats are ESRI ASCII grids (.asc/.txt),
GRASS ASCII rasters (.asc/.txt), ESRI BIL rasters (.bil), and Whitebox
rasters (.dep/.tas); convert GeoTIFF input to one of these first.

The following arguments are recognized:
<DEM_PATH>        Path to the input DEM raster (required, positional).
-o OUT.csv        Write emitted peaks to OUT.csv. Without it no output
                  file is produced. Columns are x,y,prominence,elevation,
                  plus longitude/latitude when the DEM's projection allows
                  a WGS-84 transform.
-threshold N      Minimum prominence (integer, default 0). Peaks with
                  prominence <= N are dropped.
-verbose, -v      Print water-level progress and active-island counts.
-visualize        Write an HTML overview report of the DEM and open it in
                  the browser instead of running the prominence engine.
-h, --help        Print this help.
--version         Print version information.

Example Usage:
>> .EXE_NAME iceland_dem.asc -o peaks.csv -threshold 100 -verbose
"
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "prominence_tools v{}

A water-level prominence engine for gridded digital elevation models.",
        VERSION.unwrap_or("unknown")
    );
}
