use bytemuck::{Pod, Zeroable};
use stereoview_assets::{ImageData, ModelData, ModelVertex};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct GpuVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

impl From<&ModelVertex> for GpuVertex {
    fn from(v: &ModelVertex) -> Self {
        Self {
            position: v.position,
            normal: v.normal,
            uv: v.uv,
        }
    }
}

pub(crate) struct GpuMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
    pub(crate) material: wgpu::BindGroup,
}

/// A model's meshes and material textures resident on the GPU.
///
/// Meshes without a diffuse map sample plain white; meshes without a
/// specular map get no highlight.
pub struct GpuModel {
    pub(crate) meshes: Vec<GpuMesh>,
}

impl GpuModel {
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        model: &ModelData,
    ) -> Self {
        let views: Vec<wgpu::TextureView> = model
            .textures
            .iter()
            .enumerate()
            .map(|(i, image)| upload_texture(device, queue, image, &format!("model_texture_{i}")))
            .collect();
        let white = upload_texture(device, queue, &ImageData::solid([255; 4]), "fallback_diffuse");
        let black = upload_texture(
            device,
            queue,
            &ImageData::solid([0, 0, 0, 255]),
            "fallback_specular",
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let meshes = model
            .meshes
            .iter()
            .filter(|mesh| !mesh.indices.is_empty())
            .map(|mesh| {
                let diffuse = mesh.diffuse.and_then(|i| views.get(i)).unwrap_or(&white);
                let specular = mesh.specular.and_then(|i| views.get(i)).unwrap_or(&black);
                let material = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("{}_material", mesh.name)),
                    layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(diffuse),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(specular),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                });

                let vertices: Vec<GpuVertex> = mesh.vertices.iter().map(GpuVertex::from).collect();
                GpuMesh {
                    vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{}_vertices", mesh.name)),
                        contents: bytemuck::cast_slice(&vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{}_indices", mesh.name)),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                    index_count: mesh.indices.len() as u32,
                    material,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            meshes = meshes.len(),
            textures = views.len(),
            "uploaded model"
        );
        Self { meshes }
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &ImageData,
    label: &str,
) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
