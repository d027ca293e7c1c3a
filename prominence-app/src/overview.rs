/*
This code is part of the prominence-tools terrain analysis toolkit.
License: MIT
*/
use prominence_common::rendering::{get_css, Histogram};
use prominence_raster::Raster;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufWriter;
use std::io::Error;
use std::path::Path;
use std::process::Command;

/// Writes an HTML overview of the DEM (metadata table plus an elevation
/// histogram) next to the input file and opens it with the platform's
/// browser. This stands in for an interactive 3-D view; the browser is the
/// external viewer.
pub fn run(dem_file: &str, verbose: bool) -> Result<(), Error> {
    if verbose {
        println!("Reading data...");
    }
    let input = Raster::new(dem_file, "r")?;

    let rows = input.configs.rows as isize;
    let columns = input.configs.columns as isize;
    let nodata = input.configs.nodata;
    let min = input.configs.minimum;
    let max = input.configs.maximum;

    // bin the elevation distribution
    let num_bins = 50usize;
    let range = max - min;
    let mut freq_data = vec![0usize; num_bins];
    let mut num_valid = 0usize;
    if range > 0f64 {
        let mut z: f64;
        let mut bin: usize;
        for row in 0..rows {
            for col in 0..columns {
                z = input.get_value(row, col);
                if z != nodata {
                    bin = ((num_bins - 1) as f64 * (z - min) / range).floor() as usize;
                    freq_data[bin] += 1;
                    num_valid += 1;
                }
            }
        }
    }

    let histogram = Histogram {
        width: 700f64,
        height: 450f64,
        freq_data: freq_data,
        min_bin_val: min,
        bin_width: range / num_bins as f64,
        x_axis_label: "Elevation".to_string(),
        y_axis_label: "Frequency".to_string(),
    };

    let output_file = Path::new(dem_file)
        .with_extension("")
        .to_string_lossy()
        .to_string()
        + "_overview.html";

    let f = File::create(&output_file)?;
    let mut writer = BufWriter::new(f);

    writer.write_all(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta content=\"text/html; charset=UTF-8\" http-equiv=\"content-type\">\n<title>DEM Overview</title>"
            .as_bytes(),
    )?;
    writer.write_all(get_css().as_bytes())?;
    writer.write_all("</head>\n<body>\n<h1>DEM Overview</h1>\n".as_bytes())?;

    writer.write_all(
        format!(
            "<p><strong>Input DEM</strong>: {}</p>\n",
            input.get_short_filename()
        )
        .as_bytes(),
    )?;

    writer.write_all("<table align=\"center\">\n".as_bytes())?;
    let mut table_row = |name: &str, value: String| -> Result<(), Error> {
        writer.write_all(
            format!(
                "<tr><td class=\"header\">{}</td><td class=\"numberCell\">{}</td></tr>\n",
                name, value
            )
            .as_bytes(),
        )
    };
    table_row("Columns", format!("{}", columns))?;
    table_row("Rows", format!("{}", rows))?;
    table_row("Valid cells", format!("{}", num_valid))?;
    table_row("Resolution (x)", format!("{}", input.configs.resolution_x))?;
    table_row("Resolution (y)", format!("{}", input.configs.resolution_y))?;
    table_row("North", format!("{}", input.configs.north))?;
    table_row("South", format!("{}", input.configs.south))?;
    table_row("East", format!("{}", input.configs.east))?;
    table_row("West", format!("{}", input.configs.west))?;
    table_row("Nodata value", format!("{}", nodata))?;
    table_row("Min elevation", format!("{}", min))?;
    table_row("Max elevation", format!("{}", max))?;
    table_row("Projection", input.configs.projection.clone())?;
    writer.write_all("</table>\n".as_bytes())?;

    writer.write_all("<h2>Elevation distribution</h2>\n<div align=\"center\">\n".as_bytes())?;
    writer.write_all(histogram.get_svg().as_bytes())?;
    writer.write_all("</div>\n</body>\n</html>\n".as_bytes())?;
    writer.flush()?;

    println!("Overview report written to {}", output_file);

    // open the report in the default browser
    let open_result = if cfg!(target_os = "macos") || cfg!(target_os = "ios") {
        Command::new("open").arg(output_file.clone()).output()
    } else if cfg!(target_os = "windows") {
        Command::new("explorer.exe").arg(output_file.clone()).output()
    } else {
        Command::new("xdg-open").arg(output_file.clone()).output()
    };
    if let Err(e) = open_result {
        eprintln!(
            "The report could not be opened automatically ({}); open it manually in a browser.",
            e
        );
    }

    Ok(())
}
