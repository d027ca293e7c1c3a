/*
This code is part of the prominence-tools terrain analysis toolkit.
License: MIT
*/
use prominence_common::utils::utm_to_deg;
use prominence_raster::Raster;

/// Converts peak pixel indices to WGS-84 longitude/latitude. Only the two
/// cases the raster metadata can express are supported: grids already in
/// geographic coordinates, and grids in a WGS-84 UTM zone. Anything else
/// yields no transform and the caller falls back to pixel coordinates only.
pub enum PixelTransform {
    Geographic {
        west: f64,
        north: f64,
        resolution_x: f64,
        resolution_y: f64,
    },
    Utm {
        zone: isize,
        // any letter above 'M' reads as the northern hemisphere
        hemisphere: char,
        west: f64,
        north: f64,
        resolution_x: f64,
        resolution_y: f64,
    },
}

impl PixelTransform {
    pub fn from_raster(input: &Raster) -> Option<PixelTransform> {
        let configs = &input.configs;
        if input.is_in_geographic_coordinates() {
            return Some(PixelTransform::Geographic {
                west: configs.west,
                north: configs.north,
                resolution_x: configs.resolution_x,
                resolution_y: configs.resolution_y,
            });
        }

        let zone_and_hemisphere = if configs.epsg_code >= 32601 && configs.epsg_code <= 32660 {
            Some(((configs.epsg_code - 32600) as isize, 'N'))
        } else if configs.epsg_code >= 32701 && configs.epsg_code <= 32760 {
            Some(((configs.epsg_code - 32700) as isize, 'C'))
        } else {
            parse_utm_zone(&configs.projection)
        };

        match zone_and_hemisphere {
            Some((zone, hemisphere)) => Some(PixelTransform::Utm {
                zone: zone,
                hemisphere: hemisphere,
                west: configs.west,
                north: configs.north,
                resolution_x: configs.resolution_x,
                resolution_y: configs.resolution_y,
            }),
            None => None,
        }
    }

    /// Returns `(longitude, latitude)` for the centre of pixel `(x, y)`.
    pub fn to_lon_lat(&self, x: isize, y: isize) -> (f64, f64) {
        match self {
            PixelTransform::Geographic {
                west,
                north,
                resolution_x,
                resolution_y,
            } => {
                let lon = west + resolution_x / 2f64 + x as f64 * resolution_x;
                let lat = north - resolution_y / 2f64 - y as f64 * resolution_y;
                (lon, lat)
            }
            PixelTransform::Utm {
                zone,
                hemisphere,
                west,
                north,
                resolution_x,
                resolution_y,
            } => {
                let easting = west + resolution_x / 2f64 + x as f64 * resolution_x;
                let northing = north - resolution_y / 2f64 - y as f64 * resolution_y;
                let (lat, lon) = utm_to_deg(*zone, *hemisphere, easting, northing);
                (lon, lat)
            }
        }
    }
}

/// Pulls a `UTM zone <number><N|S>` fragment out of a projection string or
/// WKT, e.g. `PROJCS["WGS 84 / UTM zone 27N", ...]` or `UTM Zone 27 N`.
fn parse_utm_zone(projection: &str) -> Option<(isize, char)> {
    let lower = projection.to_lowercase();
    let idx = lower.find("utm zone")?;
    let rest = &lower[idx + "utm zone".len()..];
    let mut zone = 0isize;
    let mut found_digit = false;
    let mut hemisphere = None;
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            zone = zone * 10 + ch.to_digit(10).unwrap() as isize;
            found_digit = true;
        } else if found_digit {
            if ch == 'n' {
                hemisphere = Some('N');
                break;
            } else if ch == 's' {
                hemisphere = Some('C');
                break;
            } else if ch != ' ' {
                break;
            }
        } else if ch != ' ' {
            break;
        }
    }
    if !found_digit || zone < 1 || zone > 60 {
        return None;
    }
    // an unmarked zone reads as northern
    Some((zone, hemisphere.unwrap_or('N')))
}
