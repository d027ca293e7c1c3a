/*
This code is part of the prominence-tools terrain analysis toolkit.
License: MIT
*/
use crate::island::{Coords, Island};
use prominence_raster::Raster;
use std::cmp::Ordering::Equal;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

/// Finds every strict local maximum of the raster under the 8-neighbour
/// adjacency, excluding nodata cells. The grid is split into contiguous
/// horizontal row bands, one per worker; each worker fills a private buffer
/// and the buffers are reassembled in band order, so the result is
/// deterministic for a given grid regardless of thread scheduling.
///
/// The returned islands are sorted ascending by elevation (stable, so
/// equal-elevation peaks keep scan order), carry ids 1, 2, 3, ... assigned
/// in scan order, and the highest island's prominence is set to its own
/// elevation.
pub fn find_peaks(input: &Arc<Raster>, num_procs: isize, verbose: bool) -> Vec<Island> {
    let rows = input.configs.rows as isize;
    let columns = input.configs.columns as isize;
    let nodata = input.configs.nodata;

    let num_procs = num_procs.max(1);
    let band_size = rows / num_procs;
    let (tx, rx) = mpsc::channel();
    let mut handles = Vec::with_capacity(num_procs as usize);
    for tid in 0..num_procs {
        let input = input.clone();
        let tx = tx.clone();
        handles.push(thread::spawn(move || {
            let dx = [1, 1, 1, 0, -1, -1, -1, 0];
            let dy = [-1, 0, 1, 1, 1, 0, -1, -1];
            let start_row = tid * band_size;
            let end_row = if tid == num_procs - 1 {
                rows
            } else {
                (tid + 1) * band_size
            };
            let mut band_peaks: Vec<(Coords, f64)> = vec![];
            let (mut z, mut z_n): (f64, f64);
            for row in start_row..end_row {
                for col in 0..columns {
                    z = input.get_value(row, col);
                    if z == nodata {
                        continue;
                    }
                    let mut is_peak = true;
                    for n in 0..8 {
                        z_n = input.get_value(row + dy[n], col + dx[n]);
                        // out-of-grid and nodata neighbours read as nodata
                        // and never disqualify a cell
                        if z_n != nodata && z_n >= z {
                            is_peak = false;
                            break;
                        }
                    }
                    if is_peak {
                        band_peaks.push((Coords::new(col, row), z));
                    }
                }
            }
            tx.send((tid, band_peaks)).unwrap();
        }));
    }

    let mut band_results: Vec<Vec<(Coords, f64)>> = vec![vec![]; num_procs as usize];
    let mut progress: usize;
    let mut old_progress: usize = 1;
    for i in 0..num_procs {
        let (tid, band_peaks) = rx.recv().expect("Error receiving data from thread.");
        band_results[tid as usize] = band_peaks;
        if verbose {
            progress = (100.0_f64 * (i + 1) as f64 / num_procs as f64) as usize;
            if progress != old_progress {
                println!("Scanning for peaks: {}%", progress);
                old_progress = progress;
            }
        }
    }
    for handle in handles {
        handle.join().expect("Error joining peak-scan thread.");
    }

    let mut islands: Vec<Island> = vec![];
    let mut id = 1u32;
    for band_peaks in band_results {
        for (coords, elevation) in band_peaks {
            let mut island = Island::new(coords, elevation);
            island.id = id;
            id += 1;
            islands.push(island);
        }
    }

    // sort ascending by elevation; sort_by is stable so ties keep scan order
    islands.sort_by(|a, b| a.elevation.partial_cmp(&b.elevation).unwrap_or(Equal));

    // by definition, the highest peak in the dataset has a prominence equal
    // to its elevation
    if let Some(highest) = islands.last_mut() {
        highest.prominence = Some(highest.elevation);
    }

    islands
}

#[cfg(test)]
mod test {
    use super::find_peaks;
    use crate::island::Coords;
    use prominence_raster::{Raster, RasterConfigs};
    use std::sync::Arc;

    fn raster_from_rows(values: &[Vec<f64>], nodata: f64) -> Raster {
        let rows = values.len();
        let columns = values[0].len();
        let configs = RasterConfigs {
            rows: rows,
            columns: columns,
            nodata: nodata,
            north: rows as f64,
            south: 0f64,
            east: columns as f64,
            west: 0f64,
            resolution_x: 1f64,
            resolution_y: 1f64,
            ..Default::default()
        };
        let mut r = Raster::initialize_using_config("in_memory.asc", &configs);
        for row in 0..rows {
            for col in 0..columns {
                r.set_value(row as isize, col as isize, values[row][col]);
            }
        }
        r.update_min_max();
        r
    }

    #[test]
    fn test_single_central_peak() {
        let grid = vec![
            vec![1.0, 2.0, 1.0],
            vec![2.0, 5.0, 2.0],
            vec![1.0, 2.0, 1.0],
        ];
        let r = Arc::new(raster_from_rows(&grid, -9999.0));
        let peaks = find_peaks(&r, 2, false);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].peak, Coords::new(1, 1));
        assert_eq!(peaks[0].elevation, 5.0);
        assert_eq!(peaks[0].id, 1);
        assert_eq!(peaks[0].prominence, Some(5.0));
    }

    #[test]
    fn test_plateau_has_no_peak() {
        let grid = vec![
            vec![5.0, 5.0, 5.0],
            vec![5.0, 5.0, 5.0],
            vec![5.0, 5.0, 5.0],
        ];
        let r = Arc::new(raster_from_rows(&grid, -9999.0));
        let peaks = find_peaks(&r, 2, false);
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_border_cells_are_eligible() {
        let grid = vec![vec![3.0, 1.0, 2.0]];
        let r = Arc::new(raster_from_rows(&grid, -9999.0));
        let peaks = find_peaks(&r, 4, false);
        assert_eq!(peaks.len(), 2);
        // ascending by elevation
        assert_eq!(peaks[0].peak, Coords::new(2, 0));
        assert_eq!(peaks[0].elevation, 2.0);
        assert_eq!(peaks[1].peak, Coords::new(0, 0));
        assert_eq!(peaks[1].elevation, 3.0);
        assert_eq!(peaks[1].prominence, Some(3.0));
        // ids reflect scan order, not rank
        assert_eq!(peaks[1].id, 1);
        assert_eq!(peaks[0].id, 2);
    }

    #[test]
    fn test_nodata_cells_are_excluded_and_ignored() {
        let nd = -9999.0;
        // the nodata cell carries the most negative value yet must not be a
        // peak, and it must not disqualify its neighbour either
        let grid = vec![
            vec![nd, 1.0, 1.0],
            vec![1.0, 4.0, 1.0],
            vec![1.0, 1.0, nd],
        ];
        let r = Arc::new(raster_from_rows(&grid, nd));
        let peaks = find_peaks(&r, 2, false);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].peak, Coords::new(1, 1));
    }

    #[test]
    fn test_all_nodata_raster_yields_no_peaks() {
        let nd = -9999.0;
        let grid = vec![vec![nd, nd], vec![nd, nd]];
        let r = Arc::new(raster_from_rows(&grid, nd));
        let peaks = find_peaks(&r, 2, false);
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_equal_elevation_peaks_keep_scan_order() {
        let grid = vec![vec![5.0, 3.0, 5.0]];
        let r = Arc::new(raster_from_rows(&grid, -9999.0));
        let peaks = find_peaks(&r, 2, false);
        assert_eq!(peaks.len(), 2);
        // stable sort: the x=0 peak (scanned first, id 1) stays first
        assert_eq!(peaks[0].peak, Coords::new(0, 0));
        assert_eq!(peaks[0].id, 1);
        assert_eq!(peaks[1].peak, Coords::new(2, 0));
        assert_eq!(peaks[1].id, 2);
        // the tie means the detector marks the later of the two as highest
        assert_eq!(peaks[1].prominence, Some(5.0));
        assert_eq!(peaks[0].prominence, None);
    }

    #[test]
    fn test_more_workers_than_rows() {
        let grid = vec![
            vec![1.0, 1.0, 1.0],
            vec![1.0, 9.0, 1.0],
            vec![1.0, 1.0, 1.0],
        ];
        let r = Arc::new(raster_from_rows(&grid, -9999.0));
        let peaks = find_peaks(&r, 16, false);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].peak, Coords::new(1, 1));
    }
}
