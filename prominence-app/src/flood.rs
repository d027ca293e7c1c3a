/*
This code is part of the prominence-tools terrain analysis toolkit.
License: MIT
*/
use crate::island::{Coords, Island};
use crate::sink::CsvSink;
use prominence_common::structures::Array2D;
use std::collections::BTreeSet;
use std::io::Error;
use std::mem;

/// A finalized peak, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub struct EmittedPeak {
    pub x: isize,
    pub y: isize,
    pub elevation: f64,
    pub prominence: f64,
}

/// A candidate key col observed during one frontier pass.
struct KeyCol {
    other_id: u32,
    col_elevation: f64,
    col_coords: Coords,
}

/// Runs the water-level flood over the elevation grid and returns the peaks
/// in the order they were finalized. Absorbed peaks are emitted as soon as
/// their deletion flag is swept; islands that survive the full drain are
/// appended last. Peaks with `prominence <= threshold` are dropped. When a
/// sink is supplied every emitted peak is also streamed to it.
///
/// `peaks` must be the detector's output: sorted ascending by elevation,
/// ids 1..=n assigned, the highest peak's prominence preset.
pub fn calculate_prominence(
    elevations: Array2D<f64>,
    nodata: f64,
    min_elevation: f64,
    max_elevation: f64,
    peaks: Vec<Island>,
    threshold: f64,
    mut sink: Option<&mut CsvSink>,
    verbose: bool,
) -> Result<Vec<EmittedPeak>, Error> {
    let mut emitted: Vec<EmittedPeak> = vec![];
    if peaks.is_empty() {
        return Ok(emitted);
    }

    let rows = elevations.rows();
    let columns = elevations.columns();
    let num_islands = peaks.len();
    let mut state = FloodState {
        island_ids: Array2D::new(rows, columns, 0u32, 0u32)?,
        elevations: elevations,
        arena: vec![None; num_islands],
        nodata: nodata,
        water_level: max_elevation.floor() as isize,
        rows: rows,
        columns: columns,
    };

    // consumed from the high end
    let mut peak_queue: Vec<Island> = peaks;
    let mut active: Vec<u32> = vec![];

    if verbose {
        println!(
            "Starting the water-level flood for {} peaks...",
            peak_queue.len()
        );
    }

    while state.water_level as f64 >= min_elevation {
        // seed every peak the water level has just reached
        while peak_queue
            .last()
            .map_or(false, |p| p.elevation >= state.water_level as f64)
        {
            let island = peak_queue.pop().expect("Error popping the peak queue.");
            let id = island.id;
            state.island_ids.set_value(island.peak.y, island.peak.x, id);
            state.arena[(id - 1) as usize] = Some(island);
            active.push(id);
        }

        if verbose {
            println!(
                "Water level: {}  Active islands: {}",
                state.water_level,
                active.len()
            );
        }

        // grow each active island; sweep out islands absorbed earlier
        let mut i = 0;
        while i < active.len() {
            let id = active[i];
            if state.island(id).flagged_for_deletion {
                let island = state.arena[(id - 1) as usize]
                    .take()
                    .expect("Error taking a flagged island from the arena.");
                emit_island(&island, min_elevation, threshold, &mut emitted, &mut sink);
                active.remove(i);
            } else {
                state.grow_island(id);
                i += 1;
            }
        }

        state.water_level -= 1;
    }

    // islands that survived the drain, in insertion order
    for id in active {
        let island = state.arena[(id - 1) as usize]
            .take()
            .expect("Error taking a surviving island from the arena.");
        emit_island(&island, min_elevation, threshold, &mut emitted, &mut sink);
    }

    // peaks whose elevation sits between the final integer water level and
    // the grid minimum never seed; they are finalized as survivors too
    for island in peak_queue {
        emit_island(&island, min_elevation, threshold, &mut emitted, &mut sink);
    }

    Ok(emitted)
}

fn emit_island(
    island: &Island,
    min_elevation: f64,
    threshold: f64,
    emitted: &mut Vec<EmittedPeak>,
    sink: &mut Option<&mut CsvSink>,
) {
    let prominence = match island.prominence {
        Some(p) => p,
        // never absorbed and not the global maximum
        None => island.elevation - min_elevation,
    };
    if prominence > threshold {
        if let Some(s) = sink.as_deref_mut() {
            s.append(island.peak.x, island.peak.y, prominence, island.elevation);
        }
        emitted.push(EmittedPeak {
            x: island.peak.x,
            y: island.peak.y,
            elevation: island.elevation,
            prominence: prominence,
        });
    }
}

struct FloodState {
    elevations: Array2D<f64>,
    island_ids: Array2D<u32>,
    arena: Vec<Option<Island>>,
    nodata: f64,
    water_level: isize,
    rows: isize,
    columns: isize,
}

impl FloodState {
    fn island(&self, id: u32) -> &Island {
        match self.arena[(id - 1) as usize].as_ref() {
            Some(island) => island,
            None => panic!("Invariant violation: island id {} is not in the index.", id),
        }
    }

    fn island_mut(&mut self, id: u32) -> &mut Island {
        match self.arena[(id - 1) as usize].as_mut() {
            Some(island) => island,
            None => panic!("Invariant violation: island id {} is not in the index.", id),
        }
    }

    /// One growth step: expands the island's frontier to fixpoint at the
    /// current water level, handling at most one key col per pass.
    fn grow_island(&mut self, id: u32) {
        let dx = [1, 1, 1, 0, -1, -1, -1, 0];
        let dy = [-1, 0, 1, 1, 1, 0, -1, -1];
        let water = self.water_level as f64;
        loop {
            let mut frontier_expanded = false;
            let mut key_col: Option<KeyCol> = None;
            let mut new_frontier: BTreeSet<Coords> = BTreeSet::new();
            let frontier = mem::take(&mut self.island_mut(id).frontier);

            for &c in &frontier {
                let cell_elevation = self.elevations.get_value(c.y, c.x);
                let mut next_to_water = false;
                let mut has_updated = false;

                for n in 0..8 {
                    let nx = c.x + dx[n];
                    let ny = c.y + dy[n];
                    if nx < 0 || nx >= self.columns || ny < 0 || ny >= self.rows {
                        continue;
                    }
                    let n_elevation = self.elevations.get_value(ny, nx);
                    // nodata cells never rise above the water
                    if n_elevation == self.nodata || n_elevation < water {
                        next_to_water = true;
                        continue;
                    }
                    let n_id = self.island_ids.get_value(ny, nx);
                    if n_id == id {
                        continue;
                    }
                    if n_id == 0 {
                        self.island_ids.set_value(ny, nx, id);
                        new_frontier.insert(Coords::new(nx, ny));
                        has_updated = true;
                        frontier_expanded = true;
                    } else if key_col.is_none() && !self.island(id).dominated.contains(&n_id) {
                        match self.arena[(n_id - 1) as usize].as_ref() {
                            None => panic!(
                                "Invariant violation: island id {} referenced at cell ({}, {}) is not in the index.",
                                n_id, nx, ny
                            ),
                            Some(other) if other.flagged_for_deletion => {
                                // already absorbed; its survivor's cells
                                // will be met instead
                            }
                            Some(_) => {
                                key_col = Some(KeyCol {
                                    other_id: n_id,
                                    col_elevation: n_elevation.min(cell_elevation),
                                    col_coords: c,
                                });
                            }
                        }
                    }
                }

                // a cell stays on the frontier only while it still touches
                // water and claimed nothing this pass
                if !has_updated && next_to_water {
                    new_frontier.insert(c);
                }
            }

            self.island_mut(id).frontier = new_frontier;

            let mut absorbed_caller = false;
            if let Some(kc) = key_col {
                absorbed_caller = self.process_key_col(id, kc);
            }
            if absorbed_caller {
                // the caller was the lower side; its frontier now belongs
                // to the survivor
                break;
            }
            if !frontier_expanded {
                break;
            }
        }
    }

    /// Absorbs the lower of the two islands meeting at a key col. On an
    /// elevation tie the caller is the lower side. Returns true when the
    /// caller was absorbed.
    fn process_key_col(&mut self, caller_id: u32, key_col: KeyCol) -> bool {
        let other_id = key_col.other_id;
        let other_elevation = match self.arena[(other_id - 1) as usize].as_ref() {
            Some(island) => island.elevation,
            None => panic!(
                "Invariant violation: island id {} met at cell ({}, {}) is not in the index.",
                other_id, key_col.col_coords.x, key_col.col_coords.y
            ),
        };
        let caller_elevation = self.island(caller_id).elevation;

        let (lower_id, higher_id) = if caller_elevation <= other_elevation {
            (caller_id, other_id)
        } else {
            (other_id, caller_id)
        };

        let (frontier, dominated) = {
            let lower = self.island_mut(lower_id);
            lower.prominence = Some(lower.elevation - key_col.col_elevation);
            lower.flagged_for_deletion = true;
            (mem::take(&mut lower.frontier), mem::take(&mut lower.dominated))
        };

        // transfer ownership of the lower island's frontier cells
        for c in &frontier {
            self.island_ids.set_value(c.y, c.x, higher_id);
        }

        let higher = self.island_mut(higher_id);
        higher.frontier.extend(frontier);
        higher.dominated.insert(lower_id);
        higher.dominated.extend(dominated);

        lower_id == caller_id
    }
}

#[cfg(test)]
mod test {
    use super::{calculate_prominence, EmittedPeak};
    use crate::peaks::find_peaks;
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

    fn run_flood(values: &[Vec<f64>], threshold: f64) -> Vec<EmittedPeak> {
        run_flood_nodata(values, -9999.0, threshold)
    }

    fn run_flood_nodata(values: &[Vec<f64>], nodata: f64, threshold: f64) -> Vec<EmittedPeak> {
        let raster = Arc::new(raster_from_rows(values, nodata));
        let peaks = find_peaks(&raster, 2, false);
        let elevations = raster.get_data_as_array2d();
        calculate_prominence(
            elevations,
            raster.configs.nodata,
            raster.configs.minimum,
            raster.configs.maximum,
            peaks,
            threshold,
            None,
            false,
        )
        .unwrap()
    }

    fn peak_at(emitted: &[EmittedPeak], x: isize, y: isize) -> &EmittedPeak {
        emitted
            .iter()
            .find(|p| p.x == x && p.y == y)
            .expect("expected peak missing from output")
    }

    #[test]
    fn test_single_peak() {
        let grid = vec![
            vec![1.0, 2.0, 1.0],
            vec![2.0, 5.0, 2.0],
            vec![1.0, 2.0, 1.0],
        ];
        let emitted = run_flood(&grid, 0.0);
        assert_eq!(emitted.len(), 1);
        assert_eq!(
            emitted[0],
            EmittedPeak {
                x: 1,
                y: 1,
                elevation: 5.0,
                prominence: 5.0
            }
        );
    }

    #[test]
    fn test_two_peaks_one_col() {
        // the x=3 cell is also a strict maximum under the 8-neighbour rule
        let grid = vec![vec![1.0, 4.0, 2.0, 3.0, 2.0, 5.0, 1.0]];
        let emitted = run_flood(&grid, 0.0);
        assert_eq!(emitted.len(), 3);
        assert_eq!(peak_at(&emitted, 5, 0).prominence, 5.0);
        assert_eq!(peak_at(&emitted, 1, 0).prominence, 2.0); // col at elevation 2
        assert_eq!(peak_at(&emitted, 3, 0).prominence, 1.0); // col at elevation 2
    }

    #[test]
    fn test_three_peak_cascade() {
        let grid = vec![vec![1.0, 6.0, 2.0, 4.0, 3.0, 5.0, 2.0, 7.0, 1.0]];
        let emitted = run_flood(&grid, 0.0);
        assert_eq!(emitted.len(), 4);
        assert_eq!(peak_at(&emitted, 7, 0).prominence, 7.0);
        assert_eq!(peak_at(&emitted, 1, 0).prominence, 4.0); // 6 - 2
        assert_eq!(peak_at(&emitted, 5, 0).prominence, 3.0); // 5 - 2
        assert_eq!(peak_at(&emitted, 3, 0).prominence, 1.0); // 4 - 3
    }

    #[test]
    fn test_cascade_emission_order_is_absorption_order() {
        let grid = vec![vec![1.0, 6.0, 2.0, 4.0, 3.0, 5.0, 2.0, 7.0, 1.0]];
        let emitted = run_flood(&grid, 0.0);
        let xs: Vec<isize> = emitted.iter().map(|p| p.x).collect();
        // 4 falls first, then 5, then 6; the global maximum survives the
        // drain and is appended last
        assert_eq!(xs, vec![3, 5, 1, 7]);
    }

    #[test]
    fn test_nodata_moat() {
        let nd = -9999.0;
        let grid = vec![
            vec![nd, nd, nd, nd, nd],
            vec![nd, 1.0, 1.0, 1.0, nd],
            vec![nd, 1.0, 9.0, 1.0, nd],
            vec![nd, 1.0, 1.0, 1.0, nd],
            vec![nd, nd, nd, nd, nd],
        ];
        let emitted = run_flood_nodata(&grid, nd, 0.0);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].x, 2);
        assert_eq!(emitted[0].y, 2);
        assert_eq!(emitted[0].elevation, 9.0);
        // the sole peak is the global maximum, so its prominence is its
        // elevation
        assert_eq!(emitted[0].prominence, 9.0);
    }

    #[test]
    fn test_tie_broken_col() {
        let grid = vec![vec![5.0, 3.0, 5.0]];
        let emitted = run_flood(&grid, 0.0);
        assert_eq!(emitted.len(), 2);
        // the first-emerged island (x=2, popped from the top of the sorted
        // queue) is the growth-step caller and loses the tie
        assert_eq!(emitted[0].x, 2);
        assert_eq!(emitted[0].prominence, 2.0); // 5 - 3
        // the survivor is emitted with elevation - min_elevation
        assert_eq!(emitted[1].x, 0);
        assert_eq!(emitted[1].prominence, 2.0); // 5 - 3
    }

    #[test]
    fn test_threshold_filters_low_prominence_peaks() {
        let grid = vec![vec![1.0, 6.0, 2.0, 4.0, 3.0, 5.0, 2.0, 7.0, 1.0]];
        let emitted = run_flood(&grid, 2.0);
        // prominences are 1, 3, 4, 7; only values strictly above 2 pass
        assert_eq!(emitted.len(), 3);
        assert!(emitted.iter().all(|p| p.prominence > 2.0));
    }

    #[test]
    fn test_four_peaks_drain_to_common_floor() {
        let grid = vec![
            vec![1.0, 1.0, 1.0, 1.0, 1.0],
            vec![1.0, 7.0, 1.0, 6.0, 1.0],
            vec![1.0, 1.0, 1.0, 1.0, 1.0],
            vec![1.0, 5.0, 1.0, 8.0, 1.0],
            vec![1.0, 1.0, 1.0, 1.0, 1.0],
        ];
        let emitted = run_flood(&grid, 0.0);
        // conservation: one emission per detected maximum
        assert_eq!(emitted.len(), 4);
        assert_eq!(peak_at(&emitted, 3, 3).prominence, 8.0);
        assert_eq!(peak_at(&emitted, 1, 1).prominence, 6.0);
        assert_eq!(peak_at(&emitted, 3, 1).prominence, 5.0);
        assert_eq!(peak_at(&emitted, 1, 3).prominence, 4.0);
        // at-most-once emission
        let mut seen = std::collections::BTreeSet::new();
        for p in &emitted {
            assert!(seen.insert((p.x, p.y)));
        }
        // exactly one peak carries prominence equal to its elevation
        let globals = emitted
            .iter()
            .filter(|p| p.prominence == p.elevation)
            .count();
        assert_eq!(globals, 1);
    }

    #[test]
    fn test_scaling_elevations_scales_prominence() {
        let base = vec![vec![1.0, 6.0, 2.0, 4.0, 3.0, 5.0, 2.0, 7.0, 1.0]];
        let scaled = vec![base[0].iter().map(|z| z * 3.0).collect::<Vec<f64>>()];
        let emitted_base = run_flood(&base, 0.0);
        let emitted_scaled = run_flood(&scaled, 0.0);
        assert_eq!(emitted_base.len(), emitted_scaled.len());
        for p in &emitted_base {
            let q = peak_at(&emitted_scaled, p.x, p.y);
            assert!((q.prominence - 3.0 * p.prominence).abs() < 1e-9);
        }
    }

    #[test]
    fn test_translating_elevations_preserves_prominence() {
        let base = vec![vec![1.0, 6.0, 2.0, 4.0, 3.0, 5.0, 2.0, 7.0, 1.0]];
        let shifted = vec![base[0].iter().map(|z| z + 100.0).collect::<Vec<f64>>()];
        let emitted_base = run_flood(&base, 0.0);
        let emitted_shifted = run_flood(&shifted, 0.0);
        assert_eq!(emitted_base.len(), emitted_shifted.len());
        for p in &emitted_base {
            let q = peak_at(&emitted_shifted, p.x, p.y);
            assert!((q.prominence - p.prominence).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fractional_elevations_use_integer_drain() {
        let grid = vec![vec![1.0, 2.5, 1.2, 3.7, 1.0]];
        let emitted = run_flood(&grid, 0.0);
        assert_eq!(emitted.len(), 2);
        assert_eq!(peak_at(&emitted, 3, 0).prominence, 3.7);
        // the col is the 1.2 cell
        assert!((peak_at(&emitted, 1, 0).prominence - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_peak_below_first_integer_level_still_emitted() {
        // floor(max) = 2 is already below min_elevation = 2.7, so the flood
        // loop never runs; the peak must still be finalized
        let grid = vec![vec![2.7, 2.9, 2.7]];
        let emitted = run_flood(&grid, 0.0);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].x, 1);
        assert_eq!(emitted[0].prominence, 2.9);
    }

    #[test]
    fn test_empty_peak_list_is_a_no_op() {
        let grid = vec![vec![4.0, 4.0], vec![4.0, 4.0]];
        let emitted = run_flood(&grid, 0.0);
        assert!(emitted.is_empty());
    }
}
