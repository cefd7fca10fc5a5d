//! Request extractors that reject with `ApiError` bodies.

mod json;
mod path_id;

pub use json::ApiJson;
pub use path_id::RoadmapPath;
