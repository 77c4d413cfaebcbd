use crate::compositor::Compositor;
use crate::model::GpuModel;
use crate::scene::ScenePass;
use crate::skybox::GpuSkybox;
use crate::target::RenderTarget;
use stereoview_assets::{CubemapFaces, ModelData};
use stereoview_common::EyeSide;
use stereoview_render::{SplitLayout, StereoFrame};

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("readback failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),
    #[error("readback callback dropped before completing")]
    ReadbackChannel,
}

/// Pick an adapter (compatible with `surface` when given) and open a device.
pub fn request_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), GpuError> {
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: surface,
        force_fallback_adapter: false,
    }))
    .ok_or(GpuError::NoAdapter)?;

    let info = adapter.get_info();
    tracing::info!(
        name = %info.name,
        backend = ?info.backend,
        "selected adapter"
    );

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("stereoview_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
        },
        None,
    ))?;
    Ok((adapter, device, queue))
}

/// Stereo renderer: two offscreen eye targets, a scene pass per eye, and a
/// compositor that places them side by side on the output.
///
/// Rendering reads only the [`StereoFrame`]; camera and input state never
/// reach this type.
pub struct StereoRenderer {
    scene: ScenePass,
    compositor: Compositor,
    targets: [RenderTarget; 2],
    layout: SplitLayout,
    skybox: Option<GpuSkybox>,
    model: Option<GpuModel>,
    reallocate_on_resize: bool,
}

impl StereoRenderer {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        layout: SplitLayout,
        reallocate_on_resize: bool,
    ) -> Self {
        let targets = Self::create_targets(device, layout);
        Self {
            scene: ScenePass::new(device),
            compositor: Compositor::new(device, output_format, &targets),
            targets,
            layout,
            skybox: None,
            model: None,
            reallocate_on_resize,
        }
    }

    pub fn set_skybox(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &CubemapFaces,
    ) {
        let skybox = GpuSkybox::upload(device, queue, self.scene.skybox_layout(), faces);
        tracing::info!(faces = skybox.loaded_faces(), "skybox uploaded");
        self.skybox = Some(skybox);
    }

    pub fn set_model(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, model: &ModelData) {
        let model = GpuModel::upload(device, queue, self.scene.material_layout(), model);
        tracing::info!(meshes = model.mesh_count(), "model uploaded");
        self.model = Some(model);
    }

    pub fn layout(&self) -> SplitLayout {
        self.layout
    }

    /// Aspect ratio of the eye targets as currently allocated. Frusta must be
    /// built with this, not the window's aspect.
    pub fn eye_aspect(&self) -> f32 {
        self.targets[0].aspect()
    }

    pub fn target(&self, side: EyeSide) -> &RenderTarget {
        &self.targets[side.index()]
    }

    /// Track a new window size. Returns `true` when the eye targets were
    /// re-allocated.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let layout = SplitLayout::new(width, height);
        if layout == self.layout {
            return false;
        }
        self.layout = layout;

        if !self.reallocate_on_resize || layout.eye_size() == self.targets[0].size() {
            tracing::debug!(width, height, "window resized, eye targets kept");
            return false;
        }

        self.targets = Self::create_targets(device, layout);
        self.compositor.rebind(device, &self.targets);
        let (eye_width, eye_height) = layout.eye_size();
        tracing::info!(eye_width, eye_height, "re-allocated eye targets");
        true
    }

    /// Render both eyes and composite them into `output`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        output: &wgpu::TextureView,
        frame: &StereoFrame,
    ) {
        let mut encoder = self.encode_eyes(device, queue, frame);
        self.compositor.encode(&mut encoder, output);
        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Render both eyes into their targets without compositing.
    pub fn render_offscreen(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &StereoFrame,
    ) {
        let encoder = self.encode_eyes(device, queue, frame);
        queue.submit(std::iter::once(encoder.finish()));
    }

    fn encode_eyes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &StereoFrame,
    ) -> wgpu::CommandEncoder {
        self.scene.prepare(device, queue, frame);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("stereo_encoder"),
        });
        for side in EyeSide::ALL {
            self.scene.encode(
                &mut encoder,
                &self.targets[side.index()],
                side,
                self.skybox.as_ref(),
                self.model.as_ref(),
            );
        }
        encoder
    }

    fn create_targets(device: &wgpu::Device, layout: SplitLayout) -> [RenderTarget; 2] {
        let (width, height) = layout.eye_size();
        EyeSide::ALL.map(|side| RenderTarget::new(device, width, height, side.label()))
    }
}
