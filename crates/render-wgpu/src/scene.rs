use crate::model::{GpuModel, GpuVertex};
use crate::shaders;
use crate::skybox::GpuSkybox;
use crate::target::{EYE_COLOR_FORMAT, EYE_DEPTH_FORMAT, RenderTarget};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use stereoview_common::EyeSide;
use stereoview_render::{EyeFrame, StereoFrame};
use wgpu::util::DeviceExt;

/// CPU mirror of the WGSL `EyeUniforms` block.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct EyeUniforms {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    skybox_view: [[f32; 4]; 4],
    eye_position: [f32; 4],
    light_position: [f32; 4],
    light_ambient: [f32; 4],
    light_diffuse: [f32; 4],
    light_specular: [f32; 4],
    params: [f32; 4],
}

fn vec4(v: Vec3) -> [f32; 4] {
    v.extend(1.0).to_array()
}

impl EyeUniforms {
    pub(crate) fn new(eye: &EyeFrame, frame: &StereoFrame) -> Self {
        let light = &frame.light;
        Self {
            view: eye.view.to_cols_array_2d(),
            projection: eye.projection.to_cols_array_2d(),
            skybox_view: eye.skybox_view.to_cols_array_2d(),
            eye_position: vec4(eye.eye_position),
            light_position: vec4(light.position),
            light_ambient: vec4(light.ambient),
            light_diffuse: vec4(light.diffuse),
            light_specular: vec4(light.specular),
            params: [frame.time, light.shininess, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
}

const INITIAL_INSTANCES: usize = 16;

/// Draws the 3D scene (skybox, then model instances) into one eye's target.
///
/// Each eye has its own uniform buffer: both eyes' writes land before the
/// encoded passes execute, so a shared buffer would leave both eyes with
/// the right eye's matrices.
pub struct ScenePass {
    sky_pipeline: wgpu::RenderPipeline,
    model_pipeline: wgpu::RenderPipeline,
    eye_buffers: [wgpu::Buffer; 2],
    eye_bind_groups: [wgpu::BindGroup; 2],
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,
    skybox_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
}

impl ScenePass {
    pub fn new(device: &wgpu::Device) -> Self {
        let eye_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("eye_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let eye_buffers = EyeSide::ALL.map(|side| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{}_eye_uniforms", side.label())),
                contents: bytemuck::bytes_of(&EyeUniforms::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        });
        let eye_bind_groups = [0, 1].map(|i| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("eye_bind_group"),
                layout: &eye_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: eye_buffers[i].as_entire_binding(),
                }],
            })
        });

        let skybox_layout = GpuSkybox::bind_group_layout(device);
        let material_layout = GpuModel::bind_group_layout(device);

        let sky_pipeline = {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("sky_pipeline_layout"),
                bind_group_layouts: &[&eye_layout, &skybox_layout],
                push_constant_ranges: &[],
            });
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("sky_shader"),
                source: wgpu::ShaderSource::Wgsl(shaders::skybox_source().into()),
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("sky_pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_sky"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_sky"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: EYE_COLOR_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                // Depth is pinned to the far plane and never written, so later
                // geometry always draws over the sky.
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: EYE_DEPTH_FORMAT,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        let model_pipeline = {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("model_pipeline_layout"),
                bind_group_layouts: &[&eye_layout, &material_layout],
                push_constant_ranges: &[],
            });
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("model_shader"),
                source: wgpu::ShaderSource::Wgsl(shaders::model_source().into()),
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("model_pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_model"),
                    compilation_options: Default::default(),
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<GpuVertex>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![
                                0 => Float32x3,
                                1 => Float32x3,
                                2 => Float32x2,
                            ],
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<InstanceData>() as u64,
                            step_mode: wgpu::VertexStepMode::Instance,
                            attributes: &wgpu::vertex_attr_array![
                                3 => Float32x4,
                                4 => Float32x4,
                                5 => Float32x4,
                                6 => Float32x4,
                            ],
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_model"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: EYE_COLOR_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: EYE_DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        Self {
            sky_pipeline,
            model_pipeline,
            eye_buffers,
            eye_bind_groups,
            instance_buffer: Self::create_instance_buffer(device, INITIAL_INSTANCES),
            instance_capacity: INITIAL_INSTANCES,
            instance_count: 0,
            skybox_layout,
            material_layout,
        }
    }

    pub fn skybox_layout(&self) -> &wgpu::BindGroupLayout {
        &self.skybox_layout
    }

    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    /// Upload both eyes' uniforms and the shared instance transforms.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &StereoFrame) {
        for (buffer, eye) in self.eye_buffers.iter().zip(&frame.eyes) {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&EyeUniforms::new(eye, frame)));
        }

        let instances: Vec<InstanceData> = frame
            .model_matrices
            .iter()
            .map(|m| {
                let cols = m.to_cols_array_2d();
                InstanceData {
                    model_0: cols[0],
                    model_1: cols[1],
                    model_2: cols[2],
                    model_3: cols[3],
                }
            })
            .collect();

        if instances.len() > self.instance_capacity {
            let capacity = instances.len().next_power_of_two();
            tracing::debug!(capacity, "growing instance buffer");
            self.instance_buffer = Self::create_instance_buffer(device, capacity);
            self.instance_capacity = capacity;
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.instance_count = instances.len() as u32;
    }

    /// Record one eye's scene pass into `target`. A missing model or skybox
    /// is simply not drawn.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget,
        side: EyeSide,
        skybox: Option<&GpuSkybox>,
        model: Option<&GpuModel>,
    ) {
        let label = format!("{}_scene_pass", side.label());
        let mut pass = target.begin_pass(encoder, &label, wgpu::Color::BLACK);
        pass.set_bind_group(0, &self.eye_bind_groups[side.index()], &[]);

        if let Some(skybox) = skybox {
            pass.set_pipeline(&self.sky_pipeline);
            pass.set_bind_group(1, &skybox.bind_group, &[]);
            pass.set_vertex_buffer(0, skybox.vertex_buffer.slice(..));
            pass.draw(0..skybox.vertex_count(), 0..1);
        }

        if let Some(model) = model.filter(|_| self.instance_count > 0) {
            pass.set_pipeline(&self.model_pipeline);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for mesh in &model.meshes {
                pass.set_bind_group(1, &mesh.material, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..self.instance_count);
            }
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (capacity * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}
