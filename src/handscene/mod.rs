pub mod mesh;
pub mod pipeline;

pub use mesh::{HandMesh, SubMesh, OCCLUDER_SHIFT};
pub use pipeline::{HandScenePipeline, PipelineState, SceneGraph};
