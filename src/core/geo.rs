use serde::Serialize;

pub const VIEWBOX_WIDTH: f64 = 100.0;
pub const VIEWBOX_HEIGHT: f64 = 70.0;

const MIN_LAT: f64 = 33.0;
const MAX_LAT: f64 = 71.5;
const MIN_LNG: f64 = -25.0;
const MAX_LNG: f64 = 55.0;

/// Capital-city coordinates (lat, lng) for every country the site plots.
const COORDINATES: &[(&str, f64, f64)] = &[
    ("ALB", 41.3275, 19.8187),
    ("AND", 42.5078, 1.5211),
    ("ARM", 40.1792, 44.4991),
    ("AUT", 48.2082, 16.3738),
    ("AZE", 40.4093, 49.8671),
    ("BEL", 50.8503, 4.3517),
    ("BGR", 42.6977, 23.3219),
    ("BIH", 43.8563, 18.4131),
    ("BLR", 53.9045, 27.5615),
    ("CHE", 46.948, 7.4474),
    ("CYP", 35.1856, 33.3823),
    ("CZE", 50.0755, 14.4378),
    ("DEU", 52.52, 13.405),
    ("DNK", 55.6761, 12.5683),
    ("ESP", 40.4168, -3.7038),
    ("EST", 59.437, 24.7536),
    ("FIN", 60.1699, 24.9384),
    ("FRA", 48.8566, 2.3522),
    ("GBR", 51.5072, -0.1276),
    ("GEO", 41.7151, 44.8271),
    ("GRC", 37.9838, 23.7275),
    ("HRV", 45.815, 15.9819),
    ("HUN", 47.4979, 19.0402),
    ("IRL", 53.3498, -6.2603),
    ("ISL", 64.1466, -21.9426),
    ("ITA", 41.9028, 12.4964),
    ("LIE", 47.141, 9.5209),
    ("LTU", 54.6872, 25.2797),
    ("LUX", 49.6116, 6.1319),
    ("LVA", 56.9496, 24.1052),
    ("MCO", 43.7384, 7.4246),
    ("MDA", 47.0105, 28.8638),
    ("MKD", 41.9981, 21.4254),
    ("MLT", 35.9375, 14.3754),
    ("MNE", 42.4304, 19.2594),
    ("NLD", 52.3676, 4.9041),
    ("NOR", 59.9139, 10.7522),
    ("POL", 52.2297, 21.0122),
    ("PRT", 38.7223, -9.1393),
    ("ROU", 44.4268, 26.1025),
    ("RUS", 55.7558, 37.6173),
    ("SMR", 43.9424, 12.4578),
    ("SRB", 44.7866, 20.4489),
    ("SVK", 48.1486, 17.1077),
    ("SVN", 46.0569, 14.5058),
    ("SWE", 59.3293, 18.0686),
    ("TUR", 39.9334, 32.8597),
    ("UKR", 50.4501, 30.5234),
    ("XKX", 42.6629, 21.1655),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBoxPoint {
    pub x: f64,
    pub y: f64,
}

impl ViewBoxPoint {
    pub fn distance_to(&self, other: &ViewBoxPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

fn coordinate(code: &str) -> Option<(f64, f64)> {
    let code = code.trim();
    COORDINATES
        .iter()
        .find(|(key, _, _)| key.eq_ignore_ascii_case(code))
        .map(|(_, lat, lng)| (*lat, *lng))
}

pub fn has_coordinate(code: &str) -> bool {
    coordinate(code).is_some()
}

/// Projects a country onto the 100x70 map viewport, north up.
///
/// `None` means the country cannot be plotted; callers must not substitute
/// the origin.
pub fn to_view_box_position(code: &str) -> Option<ViewBoxPoint> {
    let (lat, lng) = coordinate(code)?;

    let lat = lat.clamp(MIN_LAT, MAX_LAT);
    let lng = lng.clamp(MIN_LNG, MAX_LNG);

    let x_ratio = (lng - MIN_LNG) / (MAX_LNG - MIN_LNG);
    let y_ratio = (MAX_LAT - lat) / (MAX_LAT - MIN_LAT);

    let x = (x_ratio * VIEWBOX_WIDTH).clamp(0.0, VIEWBOX_WIDTH);
    let y = (y_ratio * VIEWBOX_HEIGHT).clamp(0.0, VIEWBOX_HEIGHT);

    Some(ViewBoxPoint {
        x: round_one_decimal(x),
        y: round_one_decimal(y),
    })
}

fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
