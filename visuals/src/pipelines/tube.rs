use std::mem::size_of;

use geotube::{HighlightMaterial, TubeMesh, TubeVertex};
use nalgebra as na;
use wgpu::util::DeviceExt;

use super::SharedResources;
use crate::render_window::{ActiveRenderWindow, RenderContext};

/// Tube vertex in the layout the highlight shader reads.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

impl From<&TubeVertex> for GpuVertex {
    fn from(v: &TubeVertex) -> Self {
        Self {
            position: [v.position.x as f32, v.position.y as f32, v.position.z as f32],
            normal: [v.normal.x as f32, v.normal.y as f32, v.normal.z as f32],
            uv: [v.uv.x as f32, v.uv.y as f32],
        }
    }
}

impl GpuVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Uniform buffer for the highlight effect.
#[derive(Clone, Copy, Debug, encase::ShaderType)]
struct TubeUniforms {
    time: f32,
    half_width: f32,
    displacement: f32,
    base_color: na::Vector3<f32>,
    highlight_color: na::Vector3<f32>,
}

impl TubeUniforms {
    fn new(material: &HighlightMaterial, time: f64) -> Self {
        let u = material.uniforms(time);
        let to_vec = |c: palette::LinSrgb| na::Vector3::new(c.red, c.green, c.blue);
        Self {
            time: u.time as f32,
            half_width: u.half_width as f32,
            displacement: u.displacement as f32,
            base_color: to_vec(u.base_color),
            highlight_color: to_vec(u.highlight_color),
        }
    }

    fn to_bytes(self) -> Vec<u8> {
        let mut bytes = encase::UniformBuffer::new(Vec::new());
        bytes.write(&self).unwrap();
        bytes.into_inner()
    }
}

/// Pipeline drawing the tube mesh with the highlight shader.
///
/// The mesh is uploaded once on creation;
/// animating the highlight only rewrites the small uniform buffer.
pub(crate) struct TubePipeline {
    pipeline: wgpu::RenderPipeline,
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
    index_count: u32,
    material: HighlightMaterial,
    uniform_buf: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl TubePipeline {
    pub fn new(
        window: &ActiveRenderWindow,
        res: &SharedResources,
        mesh: &TubeMesh,
        material: HighlightMaterial,
    ) -> Self {
        let label = Some("tube");

        let shader = window
            .device
            .create_shader_module(wgpu::include_wgsl!("../shaders/highlight.wgsl"));

        let uniform_buf = window
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("highlight"),
                contents: &TubeUniforms::new(&material, 0.).to_bytes(),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let uniform_size = <TubeUniforms as encase::ShaderType>::min_size();

        let bind_group_layout =
            window
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("highlight"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(uniform_size),
                        },
                        count: None,
                    }],
                });
        let bind_group = window.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("highlight"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            }],
        });

        let pipeline_layout =
            window
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label,
                    bind_group_layouts: &[&res.frame_bind_group_layout, &bind_group_layout],
                    push_constant_ranges: &[],
                });
        let pipeline = window
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label,
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[GpuVertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(window.swapchain_format().into())],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    // the tube is thin enough that the camera can end up inside it
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(window.depth_stencil_state()),
                multisample: window.multisample_state(),
                multiview: None,
                cache: None,
            });

        // upload vertices and indices

        let vertices: Vec<GpuVertex> = mesh.vertices.iter().map(GpuVertex::from).collect();
        let vertex_buf = window
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("tube vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buf = window
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("tube indices"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            pipeline,
            vertex_buf,
            index_buf,
            index_count: 3 * mesh.indices.len() as u32,
            material,
            uniform_buf,
            bind_group,
        }
    }

    /// Move the highlight to a new position along the tube.
    pub fn set_time(&self, queue: &wgpu::Queue, time: f64) {
        let uniforms = TubeUniforms::new(&self.material, time);
        queue.write_buffer(&self.uniform_buf, 0, &uniforms.to_bytes());
    }

    pub fn draw(&self, res: &SharedResources, ctx: &mut RenderContext) {
        let mut pass = ctx.pass("tube");

        pass.set_pipeline(&self.pipeline);

        pass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        pass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);

        pass.set_bind_group(0, &res.frame_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);

        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotube::{Vec2, Vec3};

    #[test]
    fn vertex_layout_is_packed() {
        assert_eq!(size_of::<GpuVertex>(), 32);
        let layout = GpuVertex::layout();
        assert_eq!(layout.array_stride, 32);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 12, 24]);
    }

    #[test]
    fn vertex_conversion() {
        let v = TubeVertex {
            position: Vec3::new(1., -2., 0.5),
            normal: Vec3::z(),
            uv: Vec2::new(0.25, 0.75),
        };
        let gpu = GpuVertex::from(&v);
        assert_eq!(gpu.position, [1., -2., 0.5]);
        assert_eq!(gpu.normal, [0., 0., 1.]);
        assert_eq!(gpu.uv, [0.25, 0.75]);
    }

    #[test]
    fn uniform_layout_matches_shader() {
        // three f32s, then two vec3s aligned to 16 bytes
        assert_eq!(<TubeUniforms as encase::ShaderType>::min_size().get(), 48);

        let material = HighlightMaterial::default();
        let bytes = TubeUniforms::new(&material, 0.5).to_bytes();
        assert_eq!(bytes.len(), 48);
        let floats: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(floats[0], 0.5);
        assert_eq!(floats[1], 0.05);
        assert_eq!(floats[2], 0.001);
        assert_eq!(&floats[4..7], &[1., 1., 1.]);
        let hl = material.highlight_color;
        assert_eq!(&floats[8..11], &[hl.red, hl.green, hl.blue]);
    }
}
