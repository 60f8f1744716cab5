//! Geofence area parsing and point containment.
//!
//! # Area encodings
//!
//! The server stores geofence areas as strings in one of two shapes:
//!
//! | Encoding       | Example                                          |
//! |----------------|--------------------------------------------------|
//! | Circle         | `CIRCLE (40.4168 -3.7038, 120)`                  |
//! | WKT polygon    | `POLYGON ((-3.70 40.41, -3.69 40.41, …))`        |
//! | WKT multipoly  | `MULTIPOLYGON (((…)), ((…)))`                    |
//!
//! Circle centers are written `<lat> <lon>`; WKT coordinates are
//! `<lon> <lat>`.  Rings keep the WKT `[lon, lat]` order internally: the
//! first ring of a polygon is the outer boundary, subsequent rings are
//! holes.
//!
//! Parsing is total: malformed, empty, or unrecognized input yields `None`,
//! which downstream containment treats as "contains nothing".

use fleet_core::GeoPoint;

/// An ordered list of `[lon, lat]` vertices.  WKT rings arrive closed
/// (first vertex repeated last); the parity test works either way.
pub type Ring = Vec<[f64; 2]>;

/// A parsed geofence area.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Circle { center: GeoPoint, radius_m: f64 },
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// Parse an area string.  Returns `None` for anything malformed.
    pub fn parse(area: &str) -> Option<Geometry> {
        let trimmed = area.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with("CIRCLE") {
            parse_circle(trimmed)
        } else if let Some(body) = strip_keyword(trimmed, "MULTIPOLYGON") {
            parse_multipolygon(body)
        } else if let Some(body) = strip_keyword(trimmed, "POLYGON") {
            parse_rings(body).map(Geometry::Polygon)
        } else {
            None
        }
    }

    /// `true` if `point` falls inside this geometry.
    ///
    /// Circles compare geodesic distance against the radius; polygons use a
    /// ray-casting parity test on the outer ring and are "inside" only when
    /// the point is also outside every hole.  Degenerate geometry and
    /// non-finite points are never contained.
    pub fn contains(&self, point: GeoPoint) -> bool {
        match self {
            Geometry::Circle { center, radius_m } => {
                point.distance_m(*center) <= *radius_m
            }
            Geometry::Polygon(rings) => polygon_contains(point, rings),
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().any(|rings| polygon_contains(point, rings))
            }
        }
    }
}

// ── Circle parsing ────────────────────────────────────────────────────────────

/// `CIRCLE (<lat> <lon>, <radius-in-meters>)`, whitespace-tolerant.
fn parse_circle(area: &str) -> Option<Geometry> {
    let cleaned = area.replacen("CIRCLE", " ", 1);
    let values = cleaned
        .split(['(', ')', ','])
        .flat_map(str::split_whitespace)
        .map(str::parse::<f64>)
        .collect::<Result<Vec<f64>, _>>()
        .ok()?;
    if values.len() < 3 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Geometry::Circle {
        center: GeoPoint::new(values[0], values[1]),
        radius_m: values[2],
    })
}

// ── WKT polygon parsing ───────────────────────────────────────────────────────

/// Strip a leading WKT keyword and its outer parentheses, returning the
/// body between them.
fn strip_keyword<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(keyword)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner)
}

/// Split `s` on commas at parenthesis depth zero.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Parse a polygon body: `(ring), (ring), …`.
fn parse_rings(body: &str) -> Option<Vec<Ring>> {
    let rings = split_top_level(body)
        .into_iter()
        .map(|group| {
            let inner = group.trim().strip_prefix('(')?.strip_suffix(')')?;
            parse_ring(inner)
        })
        .collect::<Option<Vec<Ring>>>()?;
    if rings.is_empty() { None } else { Some(rings) }
}

/// Parse one ring: `lon lat, lon lat, …`.  At least three vertices.
fn parse_ring(s: &str) -> Option<Ring> {
    let vertices = s
        .split(',')
        .map(|pair| {
            let mut nums = pair.split_whitespace();
            let lon: f64 = nums.next()?.parse().ok()?;
            let lat: f64 = nums.next()?.parse().ok()?;
            (lon.is_finite() && lat.is_finite()).then_some([lon, lat])
        })
        .collect::<Option<Ring>>()?;
    if vertices.len() < 3 { None } else { Some(vertices) }
}

/// Parse a multipolygon body: `((ring), …), ((ring), …)`.
fn parse_multipolygon(body: &str) -> Option<Geometry> {
    let polygons = split_top_level(body)
        .into_iter()
        .map(|group| {
            let inner = group.trim().strip_prefix('(')?.strip_suffix(')')?;
            parse_rings(inner)
        })
        .collect::<Option<Vec<Vec<Ring>>>>()?;
    if polygons.is_empty() {
        None
    } else {
        Some(Geometry::MultiPolygon(polygons))
    }
}

// ── Containment ───────────────────────────────────────────────────────────────

fn polygon_contains(point: GeoPoint, rings: &[Ring]) -> bool {
    let Some(outer) = rings.first() else {
        return false;
    };
    let p = [point.lon, point.lat];
    if !ring_contains(p, outer) {
        return false;
    }
    // Holes are evaluated independently: inside any hole means outside.
    !rings[1..].iter().any(|hole| ring_contains(p, hole))
}

/// Ray-casting parity test in `[lon, lat]` space.
fn ring_contains(p: [f64; 2], ring: &Ring) -> bool {
    let [x, y] = p;
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for (i, &[xi, yi]) in ring.iter().enumerate() {
        let [xj, yj] = ring[j];
        let dy = yj - yi;
        // Guard horizontal edges against division by zero.
        let dy = if dy == 0.0 { 1e-12 } else { dy };
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / dy + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
