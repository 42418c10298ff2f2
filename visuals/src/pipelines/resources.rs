use nalgebra as na;

use crate::{
    camera::Camera,
    render_window::{ActiveRenderWindow, RenderContext},
};

/// GPU resources (buffers, bind groups)
/// that are shared between multiple render pipelines.
pub(crate) struct SharedResources {
    pub camera_uniform_buf: wgpu::Buffer,
    /// Bind group for things that are constant for a frame (the camera).
    pub frame_bind_group: wgpu::BindGroup,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
}

/// Uniform buffer for the camera.
#[derive(Clone, Copy, Debug, encase::ShaderType)]
struct CameraUniforms {
    view_proj: na::Matrix4<f32>,
}

impl SharedResources {
    pub fn new(window: &ActiveRenderWindow) -> Self {
        let camera_uniform_buf_size = <CameraUniforms as encase::ShaderType>::min_size();
        let camera_uniform_buf = window.device.create_buffer(&wgpu::BufferDescriptor {
            size: camera_uniform_buf_size.get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            label: Some("camera"),
            mapped_at_creation: false,
        });

        let frame_bind_group_layout =
            window
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(camera_uniform_buf_size),
                        },
                        count: None,
                    }],
                    label: Some("frame"),
                });
        let frame_bind_group = window.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_uniform_buf.as_entire_binding(),
            }],
            label: Some("frame"),
        });

        Self {
            camera_uniform_buf,
            frame_bind_group_layout,
            frame_bind_group,
        }
    }

    pub fn upload_frame_uniforms(&self, camera: &Camera, ctx: &mut RenderContext) {
        let uniforms = CameraUniforms {
            view_proj: camera.view_projection_matrix(),
        };
        let mut uniform_bytes = encase::UniformBuffer::new(Vec::new());
        uniform_bytes.write(&uniforms).unwrap();
        ctx.queue
            .write_buffer(&self.camera_uniform_buf, 0, &uniform_bytes.into_inner());
    }
}
