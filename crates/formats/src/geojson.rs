use foundation::bounds::LonLat;
use serde_json::{Map, Value};
use thiserror::Error;

/// Geometry kinds a boundary file may carry. Only areas become regions.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Vec<Vec<LonLat>>),
    MultiPolygon(Vec<Vec<Vec<LonLat>>>),
    /// Points and lines parse but carry no area.
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
}

impl FeatureCollection {
    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value.as_object().ok_or(GeoJsonError::NotAFeatureCollection)?;
        if obj.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(GeoJsonError::NotAFeatureCollection);
        }
        let raw = obj
            .get("features")
            .and_then(Value::as_array)
            .ok_or(GeoJsonError::NotAFeatureCollection)?;

        let features = raw
            .iter()
            .enumerate()
            .map(|(index, v)| {
                parse_feature(v).map_err(|reason| GeoJsonError::InvalidFeature { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { features })
    }
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    let obj = value.as_object().ok_or("feature must be an object")?;
    match obj.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        Some(other) => return Err(format!("unexpected feature type: {other}")),
        None => return Err("feature missing type".to_string()),
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let geometry = match obj.get("geometry") {
        None | Some(Value::Null) => None,
        Some(g) => Some(parse_geometry(g)?),
    };

    Ok(Feature {
        id,
        properties,
        geometry,
    })
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value.as_object().ok_or("geometry must be an object")?;
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry missing type")?;
    let coords = || obj.get("coordinates").ok_or("geometry missing coordinates");

    match ty {
        "Polygon" => Ok(Geometry::Polygon(parse_polygon(coords()?)?)),
        "MultiPolygon" => {
            let polys = coords()?
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons")?;
            Ok(Geometry::MultiPolygon(
                polys.iter().map(parse_polygon).collect::<Result<_, _>>()?,
            ))
        }
        "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "GeometryCollection" => {
            Ok(Geometry::Other(ty.to_string()))
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_polygon(coords: &Value) -> Result<Vec<Vec<LonLat>>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings")?;
    rings.iter().map(parse_ring).collect()
}

fn parse_ring(coords: &Value) -> Result<Vec<LonLat>, String> {
    let points = coords.as_array().ok_or("ring must be an array of positions")?;
    points.iter().map(parse_position).collect()
}

fn parse_position(coords: &Value) -> Result<LonLat, String> {
    let arr = coords.as_array().ok_or("position must be an array")?;
    match (arr.first().and_then(Value::as_f64), arr.get(1).and_then(Value::as_f64)) {
        (Some(lon), Some(lat)) => Ok(LonLat::new(lon, lat)),
        _ => Err("position must have numeric [lon, lat]".to_string()),
    }
}
