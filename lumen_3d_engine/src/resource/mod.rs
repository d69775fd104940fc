/// Resource module - meshes, skeletons and materials referenced by draw commands

pub mod mesh;
pub mod skeleton;
pub mod material;

pub use mesh::{Mesh, MeshData, MeshId, Vertex, VertexSkin, VERTEX_LAYOUT, SKIN_LAYOUT, SKIN_FIRST_LOCATION};
pub use skeleton::{Joint, Skeleton, MAX_JOINTS};
pub use material::{Material, MaterialParameters, MaterialSlot, MATERIAL_BLOCK_BINDING, MATERIAL_BLOCK_NAME};
