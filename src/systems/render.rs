//! GPU rendering system
//!
//! Manages GPU rendering including:
//! - Render context and surface
//! - One instance batch per backdrop group and per viewer mesh
//! - Frame rendering (backdrop pass, then the viewer over it)

use std::collections::HashMap;
use std::sync::Arc;

use winit::window::Window;
use gearfolio_core::{Backdrop, InstanceRaw, Mesh, ModelAsset};
use gearfolio_render::{
    ContextError, GpuMesh, InstanceBatch, MeshPipeline, OrbitCamera, RenderContext, RenderError,
    SceneUniforms, UniformBinding,
};

use crate::config::RenderingConfig;

/// Manages GPU rendering
pub struct RenderSystem {
    context: RenderContext,
    pipeline: MeshPipeline,
    backdrop_binding: UniformBinding,
    viewer_binding: UniformBinding,
    /// Indexed by source, then group
    backdrop_batches: Vec<Vec<Option<InstanceBatch>>>,
    viewer_batches: Vec<InstanceBatch>,
    render_config: RenderingConfig,
}

impl RenderSystem {
    /// Create render system from window and config
    pub fn new(
        window: Arc<Window>,
        render_config: RenderingConfig,
        vsync: bool,
    ) -> Result<Self, ContextError> {
        let context = pollster::block_on(RenderContext::with_vsync(window, vsync))?;

        let mut pipeline = MeshPipeline::new(&context.device, context.config.format);
        pipeline.ensure_depth_texture(&context.device, context.size.width, context.size.height);

        let backdrop_binding = pipeline.create_binding(&context.device, "Backdrop Uniforms");
        let viewer_binding = pipeline.create_binding(&context.device, "Viewer Uniforms");

        Ok(Self {
            context,
            pipeline,
            backdrop_binding,
            viewer_binding,
            backdrop_batches: Vec::new(),
            viewer_batches: Vec::new(),
            render_config,
        })
    }

    /// Handle window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(winit::dpi::PhysicalSize::new(width, height));
        self.pipeline.ensure_depth_texture(&self.context.device, width, height);
    }

    /// Create one batch per backdrop group
    ///
    /// Groups sharing a mesh share its GPU buffers.
    pub fn upload_backdrop(&mut self, backdrop: &Backdrop) -> Result<(), RenderError> {
        let mut uploaded: HashMap<*const Mesh, Arc<GpuMesh>> = HashMap::new();
        let mut batches = Vec::with_capacity(backdrop.sources().len());

        for source in backdrop.sources() {
            let mut groups = Vec::with_capacity(source.group_count());
            for group in 0..source.group_count() {
                let Some(mesh) = source.group_mesh(group) else {
                    groups.push(None);
                    continue;
                };
                let gpu_mesh = match uploaded.get(&Arc::as_ptr(&mesh)) {
                    Some(gpu_mesh) => Arc::clone(gpu_mesh),
                    None => {
                        let label = format!("{}/{}", source.label(), group);
                        let gpu_mesh = Arc::new(GpuMesh::upload(&self.context.device, &mesh, &label)?);
                        uploaded.insert(Arc::as_ptr(&mesh), Arc::clone(&gpu_mesh));
                        gpu_mesh
                    }
                };
                groups.push(Some(InstanceBatch::new(
                    &self.context.device,
                    gpu_mesh,
                    source.group_capacity(group),
                )));
            }
            batches.push(groups);
        }

        log::info!(
            "Uploaded {} backdrop meshes for {} groups",
            uploaded.len(),
            backdrop.group_count()
        );
        self.backdrop_batches = batches;
        Ok(())
    }

    /// Upload every dirty backdrop group
    pub fn sync_backdrop(&mut self, backdrop: &mut Backdrop) -> Result<(), RenderError> {
        let queue = &self.context.queue;
        let batches = &mut self.backdrop_batches;
        let mut result = Ok(());
        backdrop.drain_dirty(|source, group, instances| {
            let batch = batches
                .get_mut(source)
                .and_then(|groups| groups.get_mut(group))
                .and_then(Option::as_mut);
            if let Some(batch) = batch {
                if let Err(e) = batch.write_instances(queue, instances) {
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
            }
        });
        result
    }

    /// Replace the viewer batches with the meshes of `model` (or none)
    pub fn set_viewer_model(&mut self, model: Option<&ModelAsset>) -> Result<(), RenderError> {
        self.viewer_batches.clear();
        let Some(model) = model else {
            return Ok(());
        };
        for (index, part) in model.meshes.iter().enumerate() {
            let label = part.name.clone().unwrap_or_else(|| format!("model/{}", index));
            match InstanceBatch::from_mesh(&self.context.device, &part.mesh, &label, 1) {
                Ok(batch) => self.viewer_batches.push(batch),
                Err(RenderError::EmptyMesh(label)) => log::debug!("Skipping empty model mesh '{}'", label),
                Err(e) => return Err(e),
            }
        }
        log::info!("Uploaded model: {} meshes, {} triangles", model.mesh_count(), model.triangle_count());
        Ok(())
    }

    /// Upload the viewer instances (one per uploaded mesh, in order)
    ///
    /// Empty model meshes are never uploaded, so instances are matched
    /// against the meshes that were.
    pub fn write_viewer_instances(&mut self, model: &ModelAsset, instances: &[InstanceRaw]) -> Result<(), RenderError> {
        let mut batches = self.viewer_batches.iter_mut();
        for (part, instance) in model.meshes.iter().zip(instances) {
            if part.mesh.is_empty() {
                continue;
            }
            if let Some(batch) = batches.next() {
                batch.write_instances(&self.context.queue, std::slice::from_ref(instance))?;
            }
        }
        Ok(())
    }

    fn uniforms(&self, camera: &OrbitCamera) -> SceneUniforms {
        let config = &self.render_config;
        let bg = config.background_color;
        SceneUniforms {
            ambient_strength: config.ambient_strength,
            diffuse_strength: config.diffuse_strength,
            fog_color: [bg[0], bg[1], bg[2]],
            fog_density: config.fog_density,
            ..SceneUniforms::default()
        }
        .with_camera(camera.view_projection(self.context.aspect_ratio()), camera.eye())
        .with_light_dir(config.light_dir)
    }

    /// Render a single frame
    ///
    /// The viewer layer is drawn over the backdrop when `viewer_camera` is set.
    pub fn render_frame(
        &mut self,
        backdrop_camera: &OrbitCamera,
        viewer_camera: Option<&OrbitCamera>,
    ) -> Result<(), RenderError> {
        self.backdrop_binding.update(&self.context.queue, &self.uniforms(backdrop_camera));
        if let Some(camera) = viewer_camera {
            let mut uniforms = self.uniforms(camera);
            uniforms.fog_density = 0.0;
            self.viewer_binding.update(&self.context.queue, &uniforms);
        }

        let output = self.context.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let bg = &self.render_config.background_color;
        let backdrop: Vec<&InstanceBatch> = self.backdrop_batches.iter().flatten().flatten().collect();
        self.pipeline.render(
            &mut encoder,
            &view,
            &self.backdrop_binding,
            &backdrop,
            Some(wgpu::Color {
                r: bg[0] as f64,
                g: bg[1] as f64,
                b: bg[2] as f64,
                a: bg[3] as f64,
            }),
        )?;

        if viewer_camera.is_some() && !self.viewer_batches.is_empty() {
            let viewer: Vec<&InstanceBatch> = self.viewer_batches.iter().collect();
            self.pipeline.render(&mut encoder, &view, &self.viewer_binding, &viewer, None)?;
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Recover from a lost surface
    pub fn reconfigure(&self) {
        self.context.reconfigure();
    }

    /// Get current surface size
    pub fn size(&self) -> (u32, u32) {
        (self.context.size.width, self.context.size.height)
    }
}
