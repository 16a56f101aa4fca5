use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("polyline has no points")]
    EmptyPolyline,

    #[error("polyline has zero length")]
    DegeneratePolyline,

    #[error("invalid offset profile: {0}")]
    InvalidProfile(&'static str),
}
