/// Scene data model: mesh, instances, camera, material and textures

pub mod camera;
pub mod instance;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod texture_table;

pub use camera::{Camera, ViewProjection};
pub use instance::{initial_instances, initial_velocities, InstanceData};
pub use material::{ImageData, ImageFormat, Material, MaterialConstants};
pub use mesh::{MeshData, Vertex};
pub use scene::{Scene, DEFAULT_TEXTURE_NAME};
pub use texture_table::{TextureHandle, TextureTable};
