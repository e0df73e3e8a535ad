//! Small utilities shared across the engine

mod make_id;
mod string_id;

pub use make_id::MakeId;
pub use string_id::{StringId, AssetId, MaterialPropertyId, CompositorPassTypeId};
