//! Loading the path to visualize.
//!
//! Two JSON layouts are accepted:
//! a bare array of `[lon, lat]` pairs,
//! or a GeoJSON `LineString` geometry containing such an array.

use std::path::Path;

use crate::GeoPoint;

/// Error in loading a path dataset.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The file couldn't be read.
    #[error("Failed to read dataset file")]
    Io(#[from] std::io::Error),
    /// The contents aren't a path in a supported format.
    #[error("Invalid dataset: expected an array of [lon, lat] pairs or a LineString")]
    Json(#[from] serde_json::Error),
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum PathDocument {
    Coordinates(Vec<GeoPoint>),
    LineString(LineString),
}

#[derive(serde::Deserialize)]
#[serde(tag = "type")]
enum LineString {
    LineString { coordinates: Vec<GeoPoint> },
}

/// Parse a path from a JSON string.
pub fn parse_path(json: &str) -> Result<Vec<GeoPoint>, DatasetError> {
    let points = match serde_json::from_str(json)? {
        PathDocument::Coordinates(points) => points,
        PathDocument::LineString(LineString::LineString { coordinates }) => coordinates,
    };
    log::info!("loaded path with {} points", points.len());
    Ok(points)
}

/// Read and parse a path from a JSON file.
pub fn load_path(path: impl AsRef<Path>) -> Result<Vec<GeoPoint>, DatasetError> {
    let json = std::fs::read_to_string(path)?;
    parse_path(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pair_array() {
        let points = parse_path("[[0, 0], [1, 0], [1.5, -2.25]]").unwrap();
        assert_eq!(
            points,
            vec![
                GeoPoint::new(0., 0.),
                GeoPoint::new(1., 0.),
                GeoPoint::new(1.5, -2.25)
            ]
        );
    }

    #[test]
    fn parse_line_string() {
        let json = r#"{
            "type": "LineString",
            "coordinates": [[116.39, 39.9], [116.41, 39.92]]
        }"#;
        let points = parse_path(json).unwrap();
        assert_eq!(
            points,
            vec![GeoPoint::new(116.39, 39.9), GeoPoint::new(116.41, 39.92)]
        );
    }

    #[test]
    fn reject_malformed() {
        for json in [
            "",
            "[[0, 0], [1]]",
            r#"{"type": "Point", "coordinates": [0, 0]}"#,
            r#"{"coordinates": [[0, 0]]}"#,
        ] {
            assert!(
                matches!(parse_path(json), Err(DatasetError::Json(_))),
                "accepted {json:?}"
            );
        }
    }

    #[test]
    fn load_bundled_route() {
        let file = concat!(env!("CARGO_MANIFEST_DIR"), "/visuals/data/route.json");
        let points = load_path(file).unwrap();
        assert_eq!(points.len(), 120);
        assert_eq!(
            points,
            parse_path(&std::fs::read_to_string(file).unwrap()).unwrap()
        );
    }

    #[test]
    fn missing_file() {
        let res = load_path("this/file/does/not/exist.json");
        assert!(matches!(res, Err(DatasetError::Io(_))));
    }
}
