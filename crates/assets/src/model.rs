use crate::error::AssetError;
use crate::texture::ImageData;
use glam::Vec3;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// One indexed triangle mesh with optional material maps.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Index into [`ModelData::textures`].
    pub diffuse: Option<usize>,
    /// Index into [`ModelData::textures`].
    pub specular: Option<usize>,
}

/// A loaded model: meshes plus the textures they reference.
///
/// Textures are deduplicated by path, so meshes sharing a material share
/// one decoded image.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    pub textures: Vec<ImageData>,
}

impl ModelData {
    /// Parse an OBJ file and its MTL materials. Texture paths are resolved
    /// relative to the OBJ file's directory.
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let (models, materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| AssetError::Obj {
                path: path.to_path_buf(),
                source,
            })?;

        if models.is_empty() {
            return Err(AssetError::EmptyModel(path.to_path_buf()));
        }

        let materials = materials.unwrap_or_else(|e| {
            tracing::warn!("no materials for {}: {e}", path.display());
            Vec::new()
        });
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut data = ModelData::default();
        let mut loaded: HashMap<PathBuf, Option<usize>> = HashMap::new();

        for model in models {
            let material = model.mesh.material_id.and_then(|id| materials.get(id));
            let diffuse = material
                .and_then(|m| m.diffuse_texture.as_deref())
                .and_then(|file| data.texture(&mut loaded, base_dir.join(file)));
            let specular = material
                .and_then(|m| m.specular_texture.as_deref())
                .and_then(|file| data.texture(&mut loaded, base_dir.join(file)));

            let mesh = convert_mesh(model.name, &model.mesh, diffuse, specular);
            tracing::debug!(
                name = %mesh.name,
                vertices = mesh.vertices.len(),
                indices = mesh.indices.len(),
                "loaded mesh"
            );
            data.meshes.push(mesh);
        }

        tracing::info!(
            path = %path.display(),
            meshes = data.meshes.len(),
            textures = data.textures.len(),
            "loaded model"
        );
        Ok(data)
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }

    fn texture(
        &mut self,
        loaded: &mut HashMap<PathBuf, Option<usize>>,
        path: PathBuf,
    ) -> Option<usize> {
        if let Some(index) = loaded.get(&path) {
            return *index;
        }
        let index = match ImageData::load(&path) {
            Ok(image) => {
                self.textures.push(image);
                Some(self.textures.len() - 1)
            }
            Err(e) => {
                tracing::warn!("material texture skipped: {e}");
                None
            }
        };
        loaded.insert(path, index);
        index
    }
}

fn convert_mesh(
    name: String,
    mesh: &tobj::Mesh,
    diffuse: Option<usize>,
    specular: Option<usize>,
) -> MeshData {
    let vertex_count = mesh.positions.len() / 3;
    let normals = if mesh.normals.len() == mesh.positions.len() {
        mesh.normals.clone()
    } else {
        smooth_normals(&mesh.positions, &mesh.indices)
    };

    let vertices = (0..vertex_count)
        .map(|i| {
            // OBJ puts v = 0 at the bottom; textures are uploaded top row first.
            let uv = match mesh.texcoords.get(i * 2..i * 2 + 2) {
                Some(&[u, v]) => [u, 1.0 - v],
                _ => [0.0, 0.0],
            };
            ModelVertex {
                position: [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ],
                normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                uv,
            }
        })
        .collect();

    MeshData {
        name,
        vertices,
        indices: mesh.indices.clone(),
        diffuse,
        specular,
    }
}

/// Area-weighted vertex normals for meshes exported without them.
fn smooth_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let point = |i: u32| Vec3::from_slice(&positions[i as usize * 3..i as usize * 3 + 3]);
    let mut acc = vec![Vec3::ZERO; positions.len() / 3];

    for tri in indices.chunks_exact(3) {
        let face = (point(tri[1]) - point(tri[0])).cross(point(tri[2]) - point(tri[0]));
        for &i in tri {
            acc[i as usize] += face;
        }
    }

    acc.into_iter()
        .flat_map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
o quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
usemtl skin
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const QUAD_MTL: &str = "\
newmtl skin
Kd 1.0 1.0 1.0
map_Kd skin.png
map_Ks missing_spec.png
";

    #[test]
    fn loads_quad_with_texture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quad.obj"), QUAD_OBJ).unwrap();
        std::fs::write(dir.path().join("quad.mtl"), QUAD_MTL).unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]))
            .save(dir.path().join("skin.png"))
            .unwrap();

        let model = ModelData::load_obj(dir.path().join("quad.obj")).unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 2);
        assert_eq!(model.textures.len(), 1);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.diffuse, Some(0));
        assert_eq!(mesh.specular, None);
        assert_eq!(mesh.vertices.len(), 4);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));

        let bottom_left = mesh
            .vertices
            .iter()
            .find(|v| v.position == [-1.0, -1.0, 0.0])
            .unwrap();
        assert_eq!(bottom_left.uv, [0.0, 1.0]);
    }

    #[test]
    fn missing_normals_are_generated() {
        let dir = tempfile::tempdir().unwrap();
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        std::fs::write(dir.path().join("tri.obj"), obj).unwrap();

        let model = ModelData::load_obj(dir.path().join("tri.obj")).unwrap();
        let mesh = &model.meshes[0];
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert!(mesh.vertices.iter().all(|v| v.uv == [0.0, 0.0]));
        assert_eq!(mesh.diffuse, None);
    }

    #[test]
    fn missing_model_is_an_error() {
        let err = ModelData::load_obj("/no/such/fish.obj").unwrap_err();
        assert!(matches!(err, AssetError::Obj { .. }));
    }

    #[test]
    fn smooth_normals_fall_back_for_degenerate_triangles() {
        let positions = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let normals = smooth_normals(&positions, &[0, 1, 2]);
        assert_eq!(&normals[..3], &[0.0, 1.0, 0.0]);
    }
}
