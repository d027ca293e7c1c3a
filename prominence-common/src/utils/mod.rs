// private sub-modules defined in other files
mod byte_order_reader;
mod byte_order_writer;

// exports identifiers from private sub-modules in the current module namespace
pub use self::byte_order_reader::ByteOrderReader;
pub use self::byte_order_reader::Endianness;
pub use self::byte_order_writer::ByteOrderWriter;

use std::time::Instant;

/// Returns a formatted string of elapsed time, e.g.
/// `1min 34.852s`
pub fn get_formatted_elapsed_time(instant: Instant) -> String {
    let dur = instant.elapsed();
    let minutes = dur.as_secs() / 60;
    let sub_sec = dur.as_secs() % 60;
    let sub_milli = dur.subsec_millis();
    if minutes > 0 {
        return format!("{}min {}.{}s", minutes, sub_sec, sub_milli);
    }
    format!("{}.{}s", sub_sec, sub_milli)
}

// Closed-form conversions between WGS-84 geographic coordinates and UTM
// grid coordinates. Accuracy is within centimetres of reference
// transformation libraries over the normal extent of a UTM zone.

/// Converts a WGS-84 latitude/longitude (decimal degrees) to UTM easting,
/// northing, zone number, and latitude-band letter.
pub fn deg_to_utm(latitude: f64, longitude: f64) -> (f64, f64, isize, char) {
    let zone = (longitude / 6.0 + 31.0).floor();
    let letter = latitude_band(latitude);

    let lat = latitude.to_radians();
    let lon = longitude.to_radians();
    let central_meridian = (6.0 * zone - 183.0).to_radians();
    let sin_dlon = (lon - central_meridian).sin();
    let cos_lat = lat.cos();
    let sin_2lat = (2.0 * lat).sin();

    let conformal = 0.5 * ((1.0 + cos_lat * sin_dlon) / (1.0 - cos_lat * sin_dlon)).ln();
    let easting = conformal * 0.9996 * 6399593.62
        / (1.0 + 0.0820944379 * 0.0820944379 * cos_lat * cos_lat).sqrt()
        * (1.0
            + 0.0820944379 * 0.0820944379 / 2.0 * conformal.powi(2) * cos_lat * cos_lat / 3.0)
        + 500000.0;

    let j2 = lat + sin_2lat / 2.0;
    let j4 = (3.0 * j2 + sin_2lat * cos_lat * cos_lat) / 4.0;
    let j6 = (5.0 * j4 + sin_2lat * cos_lat * cos_lat * cos_lat * cos_lat) / 3.0;
    let mut northing = ((lat.tan() / (lon - central_meridian).cos()).atan() - lat) * 0.9996
        * 6399593.625
        / (1.0 + 0.006739496742 * cos_lat * cos_lat).sqrt()
        * (1.0 + 0.006739496742 / 2.0 * conformal.powi(2) * cos_lat * cos_lat)
        + 0.9996
            * 6399593.625
            * (lat - 0.005054622556 * j2 + 4.258201531e-05 * j4 - 1.674057895e-07 * j6);

    if letter < 'M' {
        northing += 10000000.0;
    }

    (easting, northing, zone as isize, letter)
}

/// Converts UTM grid coordinates back to WGS-84 latitude/longitude in
/// decimal degrees. The band `letter` is only inspected for the hemisphere
/// ('N' and above is the northern hemisphere).
pub fn utm_to_deg(zone: isize, letter: char, easting: f64, northing: f64) -> (f64, f64) {
    let hem = if letter > 'M' { 'N' } else { 'S' };

    let north = if hem == 'S' {
        northing - 10000000.0
    } else {
        northing
    };

    // second eccentricity squared and polar radius of curvature of WGS-84
    let e2 = 0.006739496742;
    let c = 6399593.625;

    let phi = north / 6366197.724 / 0.9996;
    let cos2_phi = phi.cos() * phi.cos();
    let v = c * 0.9996 / (1.0 + e2 * cos2_phi).sqrt();
    let a = (easting - 500000.0) / v;

    let sin_2phi = (2.0 * phi).sin();
    let j2 = phi + sin_2phi / 2.0;
    let j4 = (3.0 * j2 + sin_2phi * cos2_phi) / 4.0;
    let j6 = (5.0 * j4 + sin_2phi * cos2_phi * cos2_phi) / 3.0;
    let alpha = 3.0 / 4.0 * e2;
    let beta = 5.0 / 3.0 * alpha * alpha;
    let gamma = 35.0 / 27.0 * alpha * alpha * alpha;
    let b_m = 0.9996 * c * (phi - alpha * j2 + beta * j4 - gamma * j6);
    let b = (north - b_m) / v;

    let zeta = e2 * a * a / 2.0 * cos2_phi;
    let xi = a * (1.0 - zeta / 3.0);
    let eta = b * (1.0 - zeta) + phi;
    let sinh_xi = (xi.exp() - (-xi).exp()) / 2.0;
    let delta_lon = (sinh_xi / eta.cos()).atan();
    let tau = (delta_lon.cos() * eta.tan()).atan();

    let longitude = delta_lon.to_degrees() + (6.0 * zone as f64 - 183.0);
    let latitude = (phi
        + (1.0 + e2 * cos2_phi - 3.0 / 2.0 * e2 * phi.sin() * phi.cos() * (tau - phi))
            * (tau - phi))
        .to_degrees();

    (latitude, longitude)
}

fn latitude_band(latitude: f64) -> char {
    let bands = [
        (-72.0, 'C'),
        (-64.0, 'D'),
        (-56.0, 'E'),
        (-48.0, 'F'),
        (-40.0, 'G'),
        (-32.0, 'H'),
        (-24.0, 'J'),
        (-16.0, 'K'),
        (-8.0, 'L'),
        (0.0, 'M'),
        (8.0, 'N'),
        (16.0, 'P'),
        (24.0, 'Q'),
        (32.0, 'R'),
        (40.0, 'S'),
        (48.0, 'T'),
        (56.0, 'U'),
        (64.0, 'V'),
        (72.0, 'W'),
    ];
    for &(limit, letter) in &bands {
        if latitude < limit {
            return letter;
        }
    }
    'X'
}

#[cfg(test)]
mod test {
    use super::{deg_to_utm, get_formatted_elapsed_time, utm_to_deg};
    use std::time::Instant;

    #[test]
    fn test_elapsed_time_format() {
        let s = get_formatted_elapsed_time(Instant::now());
        assert!(s.ends_with('s'));
        assert!(!s.contains("min"));
    }

    #[test]
    fn test_deg_to_utm_zone_and_band() {
        // south-west Iceland
        let (easting, northing, zone, letter) = deg_to_utm(64.1466, -21.9426);
        assert_eq!(zone, 27);
        assert_eq!(letter, 'W');
        assert!(easting > 100000.0 && easting < 900000.0);
        assert!(northing > 7000000.0 && northing < 7200000.0);
    }

    #[test]
    fn test_utm_round_trip_northern() {
        let (lat0, lon0) = (63.985, -19.047);
        let (easting, northing, zone, letter) = deg_to_utm(lat0, lon0);
        let (lat, lon) = utm_to_deg(zone, letter, easting, northing);
        assert!((lat - lat0).abs() < 1e-3, "lat {} vs {}", lat, lat0);
        assert!((lon - lon0).abs() < 1e-3, "lon {} vs {}", lon, lon0);
    }

    #[test]
    fn test_utm_round_trip_southern() {
        let (lat0, lon0) = (-33.856, 151.215);
        let (easting, northing, zone, letter) = deg_to_utm(lat0, lon0);
        assert!(letter < 'N');
        let (lat, lon) = utm_to_deg(zone, letter, easting, northing);
        assert!((lat - lat0).abs() < 1e-3, "lat {} vs {}", lat, lat0);
        assert!((lon - lon0).abs() < 1e-3, "lon {} vs {}", lon, lon0);
    }
}
