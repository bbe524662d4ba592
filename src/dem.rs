/*
This code is part of the StreamNet vector hydrography analysis library.
Authors: Dr. John Lindsay
Created: 14/06/2021
Last Modified: 22/02/2023
License: MIT
*/
use crate::reporter::Reporter;
use crate::structures::Array2D;
use serde::{Deserialize, Serialize};
use std::f64;
use std::io::{Error, ErrorKind};

/// Georeferencing and sampling metadata for an in-memory DEM grid.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DemConfigs {
    pub rows: usize,
    pub columns: usize,
    pub nodata: f64,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub resolution_x: f64,
    pub resolution_y: f64,
    pub xy_units: String,
    pub epsg_code: u16,
    pub coordinate_ref_system_wkt: String,
}

impl Default for DemConfigs {
    fn default() -> DemConfigs {
        DemConfigs {
            rows: 0,
            columns: 0,
            nodata: -32768.0,
            north: f64::NEG_INFINITY,
            south: f64::INFINITY,
            east: f64::NEG_INFINITY,
            west: f64::INFINITY,
            resolution_x: f64::NEG_INFINITY,
            resolution_y: f64::NEG_INFINITY,
            xy_units: "not specified".to_string(),
            epsg_code: 0u16,
            coordinate_ref_system_wkt: "not specified".to_string(),
        }
    }
}

/// An in-memory digital elevation model. The grid holds one f64 value per
/// cell in row-major order; reads outside of the grid return nodata.
pub struct DemGrid {
    pub configs: DemConfigs,
    data: Vec<f64>,
}

impl DemGrid {
    /// Creates a DEM grid filled with the nodata value.
    pub fn new(configs: DemConfigs) -> Result<DemGrid, Error> {
        let num_cells = configs.rows * configs.columns;
        let mut data: Vec<f64> = Vec::new();
        if data.try_reserve_exact(num_cells).is_err() {
            return Err(Error::new(
                ErrorKind::OutOfMemory,
                "Insufficient memory to allocate the DEM grid.",
            ));
        }
        data.resize(num_cells, configs.nodata);
        Ok(DemGrid {
            configs: configs,
            data: data,
        })
    }

    /// Creates a DEM grid from row-major cell values.
    pub fn from_data(configs: DemConfigs, data: Vec<f64>) -> Result<DemGrid, Error> {
        if data.len() != configs.rows * configs.columns {
            return Err(Error::new(
                ErrorKind::InvalidData,
                "The DEM data length does not match the grid dimensions.",
            ));
        }
        Ok(DemGrid {
            configs: configs,
            data: data,
        })
    }

    pub fn get_value(&self, row: isize, column: isize) -> f64 {
        if row < 0 || column < 0 {
            return self.configs.nodata;
        }
        if row as usize >= self.configs.rows || column as usize >= self.configs.columns {
            return self.configs.nodata;
        }
        self.data[row as usize * self.configs.columns + column as usize]
    }

    pub fn set_value(&mut self, row: isize, column: isize, value: f64) {
        if row >= 0 && column >= 0 {
            if (row as usize) < self.configs.rows && (column as usize) < self.configs.columns {
                self.data[row as usize * self.configs.columns + column as usize] = value;
            }
        }
    }

    pub fn get_row_from_y(&self, y: f64) -> isize {
        ((self.configs.north - y) / self.configs.resolution_y).floor() as isize
    }

    pub fn get_column_from_x(&self, x: f64) -> isize {
        ((x - self.configs.west) / self.configs.resolution_x).floor() as isize
    }

    /// An edge cell holds valid data while at least one cell in its Moore
    /// neighbourhood is nodata or lies beyond the grid.
    pub fn is_edge_cell(&self, row: isize, column: isize) -> bool {
        let nodata = self.configs.nodata;
        if self.get_value(row, column) == nodata {
            return false;
        }
        let dx = [1, 1, 1, 0, -1, -1, -1, 0];
        let dy = [-1, 0, 1, 1, 1, 0, -1, -1];
        for n in 0..8 {
            if self.get_value(row + dy[n], column + dx[n]) == nodata {
                return true;
            }
        }
        false
    }

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
        let wkt = self.configs.coordinate_ref_system_wkt.to_lowercase();
        if !wkt.contains("projcs[") && !wkt.contains("not specified") {
            return true;
        }
        if self.configs.xy_units.to_lowercase().contains("deg") {
            return true;
        }
        false
    }

    /// Returns the factor that converts grid xy distances into metres. For
    /// projected data the factor is 1. For geographic data the factor is the
    /// mean of the lengths of a degree of longitude and latitude at the grid's
    /// mid-latitude, from the WGS-84 ellipsoid.
    pub fn metric_conversion_factor(&self) -> f64 {
        if !self.is_in_geographic_coordinates() {
            return 1f64;
        }
        let mut mid_lat = (self.configs.north - self.configs.south) / 2.0;
        if mid_lat <= 90.0 && mid_lat >= -90.0 {
            mid_lat = mid_lat.to_radians();
            let a = 6378137.0f64;
            let b = 6356752.314f64;
            let e2 = (a * a - b * b) / (a * a);
            let num = f64::consts::PI * a * mid_lat.cos();
            let denum = 180f64 * (1f64 - e2 * mid_lat.sin() * mid_lat.sin()).sqrt();
            let long_deg_dist = num / denum;
            let lat_deg_dist = 111132.954f64 - 559.822f64 * (2f64 * mid_lat).cos()
                + 1.175f64 * (4f64 * mid_lat).cos();
            return (long_deg_dist + lat_deg_dist) / 2f64;
        }
        1f64
    }
}

/// Scans the DEM and flags its edge cells (value 1) in an Array2D.
pub fn find_edge_cells(dem: &DemGrid, reporter: &mut dyn Reporter) -> Result<Array2D<i8>, Error> {
    let rows = dem.configs.rows as isize;
    let columns = dem.configs.columns as isize;
    let mut is_edge_cell: Array2D<i8> = Array2D::new(rows, columns, 0, -1)?;
    let mut progress: usize;
    let mut old_progress: usize = 1;
    for row in 0..rows {
        for col in 0..columns {
            if dem.is_edge_cell(row, col) {
                is_edge_cell.set_value(row, col, 1);
            }
        }
        progress = (100.0_f64 * row as f64 / (rows - 1) as f64) as usize;
        if progress != old_progress {
            reporter.progress("Finding DEM edge cells:", progress);
            old_progress = progress;
            if reporter.cancel_requested() {
                return Err(Error::new(
                    ErrorKind::Interrupted,
                    "The operation was cancelled.",
                ));
            }
        }
    }
    Ok(is_edge_cell)
}

#[cfg(test)]
mod test {
    use super::{find_edge_cells, DemConfigs, DemGrid};
    use crate::reporter::RecordCollector;

    fn small_grid() -> DemGrid {
        // 4 x 4 grid, 1 m cells; the top-left cell is nodata.
        let configs = DemConfigs {
            rows: 4,
            columns: 4,
            nodata: -32768.0,
            north: 4.0,
            south: 0.0,
            east: 4.0,
            west: 0.0,
            resolution_x: 1.0,
            resolution_y: 1.0,
            xy_units: "metres".to_string(),
            ..Default::default()
        };
        let mut data = vec![10.0; 16];
        data[0] = -32768.0;
        DemGrid::from_data(configs, data).unwrap()
    }

    #[test]
    fn test_row_col_mapping() {
        let dem = small_grid();
        assert_eq!(dem.get_row_from_y(3.5), 0);
        assert_eq!(dem.get_row_from_y(0.5), 3);
        assert_eq!(dem.get_column_from_x(0.5), 0);
        assert_eq!(dem.get_column_from_x(3.5), 3);
        assert_eq!(dem.get_value(-1, 0), dem.configs.nodata);
        assert_eq!(dem.get_value(0, 4), dem.configs.nodata);
    }

    #[test]
    fn test_edge_cells() {
        let dem = small_grid();
        // nodata cells are never edge cells
        assert!(!dem.is_edge_cell(0, 0));
        // neighbours of the nodata cell are
        assert!(dem.is_edge_cell(0, 1));
        assert!(dem.is_edge_cell(1, 1));
        // all boundary cells neighbour off-grid space
        assert!(dem.is_edge_cell(3, 2));
        let mut reporter = RecordCollector::new();
        let flags = find_edge_cells(&dem, &mut reporter).unwrap();
        assert_eq!(flags.get_value(0, 1), 1);
        assert_eq!(flags.get_value(0, 0), 0);
    }

    #[test]
    fn test_metric_conversion_factor() {
        let dem = small_grid();
        assert_eq!(dem.metric_conversion_factor(), 1f64);

        let configs = DemConfigs {
            rows: 2,
            columns: 2,
            nodata: -32768.0,
            north: 1.0,
            south: 0.0,
            east: 1.0,
            west: 0.0,
            resolution_x: 0.5,
            resolution_y: 0.5,
            xy_units: "degrees".to_string(),
            ..Default::default()
        };
        let dem = DemGrid::from_data(configs, vec![1.0; 4]).unwrap();
        assert!(dem.is_in_geographic_coordinates());
        let factor = dem.metric_conversion_factor();
        // near the equator a degree spans roughly 111 km in both axes
        assert!(factor > 110_000.0 && factor < 112_000.0);
    }
}
