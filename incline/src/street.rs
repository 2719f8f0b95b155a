use crate::geometry::Polyline;
use std::collections::HashMap;

/// Tag holding a street's land use classification.
pub const LANDUSE_TAG: &str = "incline_landuse";

/// Land use classification of the area a street runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landuse {
    Rural,
    Urban,
    Forested,
    NoLanduse,
}

impl Landuse {
    pub fn from_tags(tags: &HashMap<String, String>) -> Self {
        match tags.get(LANDUSE_TAG).map(String::as_str) {
            Some("forest") => Self::Forested,
            Some("commercial" | "residential" | "industrial") => Self::Urban,
            Some("farm" | "farmland" | "allotments" | "grass") => Self::Rural,
            _ => Self::NoLanduse,
        }
    }
}

/// A street and its derived attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetSegment {
    id: i64,
    tags: HashMap<String, String>,
    geometry: Polyline,
    length: f64,
    landuse: Landuse,
}

impl StreetSegment {
    pub fn new(id: i64, tags: HashMap<String, String>, geometry: Polyline) -> Self {
        let length = geometry.length();
        let landuse = Landuse::from_tags(&tags);
        Self {
            id,
            tags,
            geometry,
            length,
            landuse,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    pub fn geometry(&self) -> &Polyline {
        &self.geometry
    }

    /// Orthometric length in meters.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn landuse(&self) -> Landuse {
        self.landuse
    }

    /// Reference bearing traces are matched against.
    pub fn bearing(&self) -> f64 {
        self.geometry.mean_bearing()
    }
}
