//! GeoJSON street and trace sources.

use crate::corridor::{to_line_string, StreetCorridor};
use anyhow::{anyhow, bail, Result};
use geo::{BoundingRect, Rect};
use geojson::{Feature, GeoJson, Geometry, Value};
use incline::{
    Coord3, Corridor, GpsTraceFragment, InclineError, Polyline, StreetSegment, StreetSource,
    TraceSource,
};
use log::{debug, info};
use std::{collections::HashMap, fs::File, io::BufReader, path::Path, vec};

/// Streets read from a GeoJSON feature collection of line strings.
///
/// Each feature needs an integer `id` property and may carry a `tags`
/// object of string values.
pub struct GeoJsonStreets {
    streets: vec::IntoIter<Result<StreetSegment, InclineError>>,
    total: usize,
}

impl GeoJsonStreets {
    pub fn open(path: &Path) -> Result<Self> {
        let features = read_features(path)?;
        let mut streets = features
            .iter()
            .enumerate()
            .map(|(n, feature)| {
                let id = feature
                    .property("id")
                    .and_then(serde_json::Value::as_i64)
                    .ok_or_else(|| anyhow!("{path:?}: feature {n} has no integer id"))?;
                Ok((id, street(id, feature)))
            })
            .collect::<Result<Vec<_>>>()?;
        streets.sort_by_key(|(id, _)| *id);
        info!("read {} streets from {path:?}", streets.len());

        let total = streets.len();
        let streets: Vec<_> = streets.into_iter().map(|(_, street)| street).collect();
        Ok(Self {
            streets: streets.into_iter(),
            total,
        })
    }
}

impl Iterator for GeoJsonStreets {
    type Item = Result<StreetSegment, InclineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.streets.next()
    }
}

impl StreetSource for GeoJsonStreets {
    fn total(&self) -> usize {
        self.total
    }
}

fn street(id: i64, feature: &Feature) -> Result<StreetSegment, InclineError> {
    let geometry_error = |reason: String| InclineError::Geometry { id, reason };

    let tags = match feature.property("tags") {
        None | Some(serde_json::Value::Null) => HashMap::new(),
        Some(serde_json::Value::Object(tags)) => tags
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect(),
        Some(other) => return Err(geometry_error(format!("tags is not an object: {other}"))),
    };

    let line = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::LineString(positions)) => polyline(positions).map_err(geometry_error)?,
        Some(other) => {
            return Err(geometry_error(format!(
                "expected a LineString, not a {}",
                type_name(other)
            )))
        }
        None => return Err(geometry_error("missing geometry".into())),
    };
    if line.coords().len() < 2 {
        return Err(geometry_error("fewer than two vertices".into()));
    }

    Ok(StreetSegment::new(id, tags, line))
}

/// A GPS trace part, not yet clipped to any street.
struct Trace {
    trace_id: i64,
    track_id: i64,
    part_id: i64,
    raw: Vec<Polyline>,
    smoothed: Option<Vec<Polyline>>,
    bounds: Option<Rect<f64>>,
}

/// GPS traces read from a GeoJSON feature collection of (multi) line
/// strings with elevations.
///
/// Each feature needs integer `trace_id`, `track_id` and `part_id`
/// properties, and may carry a smoothed copy of its geometry as a
/// GeoJSON geometry object in its `smoothed` property.
pub struct GeoJsonTraces {
    traces: Vec<Trace>,
}

impl GeoJsonTraces {
    pub fn open(path: &Path) -> Result<Self> {
        let traces = read_features(path)?
            .iter()
            .enumerate()
            .map(|(n, feature)| trace(feature).map_err(|e| anyhow!("{path:?}: feature {n}: {e}")))
            .collect::<Result<Vec<Trace>>>()?;
        info!("read {} traces from {path:?}", traces.len());
        Ok(Self { traces })
    }
}

impl TraceSource for GeoJsonTraces {
    fn fetch_near(
        &mut self,
        street: &StreetSegment,
        corridor: &Corridor,
    ) -> Result<Vec<GpsTraceFragment>, InclineError> {
        let corridor = StreetCorridor::new(street.geometry(), *corridor);
        let fragments: Vec<GpsTraceFragment> = self
            .traces
            .iter()
            .filter(|trace| {
                trace
                    .bounds
                    .as_ref()
                    .map_or(false, |bounds| corridor.may_intersect(bounds))
            })
            .filter_map(|trace| {
                let raw = corridor.clip_all(&trace.raw)?;
                let smoothed = trace
                    .smoothed
                    .as_deref()
                    .and_then(|lines| corridor.clip_all(lines));
                Some(GpsTraceFragment {
                    trace_id: trace.trace_id,
                    track_id: trace.track_id,
                    part_id: trace.part_id,
                    raw: Some(raw),
                    smoothed,
                })
            })
            .collect();
        debug!("street {}: {} traces in corridor", street.id(), fragments.len());
        Ok(fragments)
    }
}

fn trace(feature: &Feature) -> Result<Trace> {
    let id = |key: &str| {
        feature
            .property(key)
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| anyhow!("missing integer {key}"))
    };
    let raw = match &feature.geometry {
        Some(geometry) => polylines(geometry)?,
        None => bail!("missing geometry"),
    };
    let smoothed = match feature.property("smoothed") {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => Some(polylines(&serde_json::from_value::<Geometry>(value.clone())?)?),
    };
    let bounds = raw
        .iter()
        .filter_map(|line| to_line_string(line).bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
            )
        });
    Ok(Trace {
        trace_id: id("trace_id")?,
        track_id: id("track_id")?,
        part_id: id("part_id")?,
        raw,
        smoothed,
        bounds,
    })
}

fn read_features(path: &Path) -> Result<Vec<Feature>> {
    let reader = BufReader::new(File::open(path)?);
    match GeoJson::from_reader(reader)? {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        GeoJson::Feature(feature) => Ok(vec![feature]),
        GeoJson::Geometry(_) => bail!("{path:?}: expected features, found a bare geometry"),
    }
}

fn polylines(geometry: &Geometry) -> Result<Vec<Polyline>> {
    match &geometry.value {
        Value::LineString(positions) => Ok(vec![polyline(positions).map_err(|e| anyhow!(e))?]),
        Value::MultiLineString(lines) => lines
            .iter()
            .map(|positions| polyline(positions).map_err(|e| anyhow!(e)))
            .collect(),
        other => bail!("expected a (Multi)LineString, not a {}", type_name(other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn polyline(positions: &[Vec<f64>]) -> Result<Polyline, String> {
    positions
        .iter()
        .map(|position| match position[..] {
            [x, y] => Ok(Coord3::new(x, y, 0.0)),
            [x, y, z, ..] => Ok(Coord3::new(x, y, z)),
            _ => Err(format!("invalid position {position:?}")),
        })
        .collect::<Result<Vec<Coord3>, String>>()
        .map(Polyline::new)
}

#[cfg(test)]
mod tests {
    use super::{GeoJsonStreets, GeoJsonTraces};
    use incline::{CapStyle, Corridor, InclineError, StreetSource, TraceSource};
    use std::{fs, path::PathBuf};

    fn write(name: &str, json: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("inclinecalc-{}-{name}.geojson", std::process::id()));
        fs::write(&path, json).unwrap();
        path
    }

    const STREETS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"id": 7, "tags": {"incline_landuse": "forest", "lanes": 2}},
     "geometry": {"type": "LineString", "coordinates": [[8.0, 50.0], [8.0, 50.001]]}},
    {"type": "Feature", "properties": {"id": 3},
     "geometry": {"type": "Point", "coordinates": [8.0, 50.0]}},
    {"type": "Feature", "properties": {"id": 5, "tags": null},
     "geometry": {"type": "LineString", "coordinates": [[8.001, 50.0, 12.0], [8.001, 50.001, 14.0]]}}
  ]
}"#;

    #[test]
    fn test_streets_in_id_order() {
        let streets = GeoJsonStreets::open(&write("streets", STREETS)).unwrap();
        assert_eq!(streets.total(), 3);
        let streets: Vec<_> = streets.collect();
        assert!(matches!(streets[0], Err(InclineError::Geometry { id: 3, .. })));
        let five = streets[1].as_ref().unwrap();
        assert_eq!(five.id(), 5);
        assert_eq!(five.geometry().coords()[1].z, 14.0);
        let seven = streets[2].as_ref().unwrap();
        assert_eq!(seven.landuse(), incline::Landuse::Forested);
        assert!(!seven.tags().contains_key("lanes"));
    }

    #[test]
    fn test_streets_need_ids() {
        let json = STREETS.replace(r#""id": 3"#, r#""name": "x""#);
        assert!(GeoJsonStreets::open(&write("no-id", &json)).is_err());
    }

    const TRACES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"trace_id": 1, "track_id": 0, "part_id": 0,
       "smoothed": {"type": "LineString", "coordinates": [[8.0, 50.0002, 1.0], [8.0, 50.0008, 4.0]]}},
     "geometry": {"type": "LineString",
       "coordinates": [[8.0, 50.0001, 1.0], [8.0, 50.0005, 2.0], [8.0, 50.0009, 4.0], [8.01, 50.0009, 4.0]]}},
    {"type": "Feature", "properties": {"trace_id": 2, "track_id": 0, "part_id": 1},
     "geometry": {"type": "MultiLineString", "coordinates": [
       [[8.1, 50.0, 0.0], [8.1, 50.001, 1.0]],
       [[8.00005, 50.0003, 2.0], [8.00005, 50.0006, 3.0]]]}},
    {"type": "Feature", "properties": {"trace_id": 3, "track_id": 1, "part_id": 0},
     "geometry": {"type": "LineString", "coordinates": [[9.0, 51.0, 0.0], [9.0, 51.001, 1.0]]}}
  ]
}"#;

    #[test]
    fn test_fetch_near() {
        let mut streets = GeoJsonStreets::open(&write("near-streets", STREETS)).unwrap();
        let seven = streets.nth(2).unwrap().unwrap();
        let mut traces = GeoJsonTraces::open(&write("traces", TRACES)).unwrap();
        let corridor = Corridor {
            distance: 10.0,
            cap: CapStyle::Flat,
        };
        let fragments = traces.fetch_near(&seven, &corridor).unwrap();
        assert_eq!(fragments.len(), 2);

        let first = &fragments[0];
        assert_eq!(first.trace_id, 1);
        // The eastward leg is cut 10 m from the street.
        let raw = &first.raw.as_ref().unwrap().0[0];
        assert_eq!(raw.coords().len(), 4);
        assert!(raw.coords()[3].x > 8.0001 && raw.coords()[3].x < 8.0002);
        assert_eq!(first.smoothed.as_ref().unwrap().0.len(), 1);

        let second = &fragments[1];
        assert_eq!((second.trace_id, second.part_id), (2, 1));
        assert_eq!(second.raw.as_ref().unwrap().0.len(), 1);
        assert!(second.smoothed.is_none());
    }

    #[test]
    fn test_traces_need_ids() {
        let json = TRACES.replace(r#""trace_id": 3, "#, "");
        assert!(GeoJsonTraces::open(&write("traces-no-id", &json)).is_err());
    }
}
