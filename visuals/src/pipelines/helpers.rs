//! Reference lines drawn around the tube: a ground grid and coordinate axes.

use std::mem::size_of;

use geotube::highlight::srgb_hex;
use palette::LinSrgb;
use wgpu::util::DeviceExt;

use super::SharedResources;
use crate::render_window::{ActiveRenderWindow, RenderContext};

/// Parameters to configure the ground grid.
#[derive(Clone, Copy, Debug)]
pub struct GridParams {
    /// Side length of the square grid. Default: 2.
    pub size: f32,
    /// Number of cells along each side. Default: 40.
    pub divisions: u32,
    /// Color of the lines through the origin. Default: `#808080`.
    pub center_color: LinSrgb,
    /// Color of the other lines. Default: `#808080`.
    pub color: LinSrgb,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            size: 2.,
            divisions: 40,
            center_color: srgb_hex(0x808080),
            color: srgb_hex(0x808080),
        }
    }
}

/// Parameters to configure the coordinate axes.
///
/// The X, Y and Z axes start out red, green and blue respectively
/// and fade towards orange, lime and sky blue at their far ends.
#[derive(Clone, Copy, Debug)]
pub struct AxesParams {
    /// Length of each axis line. Default: 5.
    pub size: f32,
}

impl Default for AxesParams {
    fn default() -> Self {
        Self { size: 5. }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn new(position: [f32; 3], color: LinSrgb) -> Self {
        Self {
            position,
            color: [color.red, color.green, color.blue],
        }
    }
}

/// Line list for a grid on the XZ plane centered at the origin.
pub(crate) fn grid_lines(params: &GridParams) -> Vec<LineVertex> {
    let half = params.size / 2.;
    let step = params.size / params.divisions as f32;
    let center = params.divisions / 2;

    (0..=params.divisions)
        .flat_map(|i| {
            let k = -half + i as f32 * step;
            let color = if i == center {
                params.center_color
            } else {
                params.color
            };
            [
                LineVertex::new([-half, 0., k], color),
                LineVertex::new([half, 0., k], color),
                LineVertex::new([k, 0., -half], color),
                LineVertex::new([k, 0., half], color),
            ]
        })
        .collect()
}

/// Line list for the positive coordinate axes.
pub(crate) fn axes_lines(params: &AxesParams) -> Vec<LineVertex> {
    let s = params.size;
    vec![
        LineVertex::new([0., 0., 0.], LinSrgb::new(1., 0., 0.)),
        LineVertex::new([s, 0., 0.], LinSrgb::new(1., 0.6, 0.)),
        LineVertex::new([0., 0., 0.], LinSrgb::new(0., 1., 0.)),
        LineVertex::new([0., s, 0.], LinSrgb::new(0.6, 1., 0.)),
        LineVertex::new([0., 0., 0.], LinSrgb::new(0., 0., 1.)),
        LineVertex::new([0., 0., s], LinSrgb::new(0., 0.6, 1.)),
    ]
}

/// Pipeline drawing static, depth-tested lines.
pub(crate) struct HelperPipeline {
    pipeline: wgpu::RenderPipeline,
    vertex_buf: wgpu::Buffer,
    vertex_count: u32,
}

impl HelperPipeline {
    pub fn new(window: &ActiveRenderWindow, res: &SharedResources, lines: &[LineVertex]) -> Self {
        let label = Some("helpers");

        let shader = window
            .device
            .create_shader_module(wgpu::include_wgsl!("../shaders/helpers.wgsl"));

        let pipeline_layout =
            window
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label,
                    bind_group_layouts: &[&res.frame_bind_group_layout],
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
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: size_of::<LineVertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &LineVertex::ATTRIBUTES,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(window.swapchain_format().into())],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::LineList,
                    ..Default::default()
                },
                depth_stencil: Some(window.depth_stencil_state()),
                multisample: window.multisample_state(),
                multiview: None,
                cache: None,
            });

        let vertex_buf = window
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("helper lines"),
                contents: bytemuck::cast_slice(lines),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            pipeline,
            vertex_buf,
            vertex_count: lines.len() as u32,
        }
    }

    pub fn draw(&self, res: &SharedResources, ctx: &mut RenderContext) {
        let mut pass = ctx.pass("helpers");
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        pass.set_bind_group(0, &res.frame_bind_group, &[]);
        pass.draw(0..self.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_square() {
        let params = GridParams::default();
        let lines = grid_lines(&params);
        assert_eq!(lines.len(), 4 * 41);

        for v in &lines {
            assert_eq!(v.position[1], 0.);
            assert!(v.position[0].abs() <= 1. + 1e-6);
            assert!(v.position[2].abs() <= 1. + 1e-6);
        }
        // first line runs along x at the far edge
        assert_eq!(lines[0].position, [-1., 0., -1.]);
        assert_eq!(lines[1].position, [1., 0., -1.]);
    }

    #[test]
    fn grid_center_lines_colored() {
        let params = GridParams {
            center_color: LinSrgb::new(1., 0., 0.),
            color: LinSrgb::new(0., 0., 1.),
            ..Default::default()
        };
        let lines = grid_lines(&params);
        let (center, rest): (Vec<_>, Vec<_>) = lines
            .iter()
            .enumerate()
            .partition(|(i, _)| i / 4 == 20);
        assert_eq!(center.len(), 4);
        for (_, v) in center {
            assert_eq!(v.color, [1., 0., 0.]);
            // one line along each axis through the origin
            assert!(v.position[0].abs() < 1e-6 || v.position[2].abs() < 1e-6);
        }
        assert!(rest.iter().all(|(_, v)| v.color == [0., 0., 1.]));
    }

    #[test]
    fn axes_point_along_positive_directions() {
        let lines = axes_lines(&AxesParams { size: 2. });
        assert_eq!(lines.len(), 6);
        let ends: Vec<[f32; 3]> = lines.iter().skip(1).step_by(2).map(|v| v.position).collect();
        assert_eq!(ends, [[2., 0., 0.], [0., 2., 0.], [0., 0., 2.]]);
        assert!(lines.iter().step_by(2).all(|v| v.position == [0.; 3]));
    }

    #[test]
    fn axes_fade_from_primary_colors() {
        let lines = axes_lines(&AxesParams::default());
        let starts: Vec<[f32; 3]> = lines.iter().step_by(2).map(|v| v.color).collect();
        assert_eq!(starts, [[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]]);
        let ends: Vec<[f32; 3]> = lines.iter().skip(1).step_by(2).map(|v| v.color).collect();
        assert_eq!(ends, [[1., 0.6, 0.], [0.6, 1., 0.], [0., 0.6, 1.]]);
    }

    #[test]
    fn default_grid_is_uniform_grey() {
        let params = GridParams::default();
        assert_eq!(params.center_color, srgb_hex(0x808080));
        assert_eq!(params.color, srgb_hex(0x808080));
        let lines = grid_lines(&params);
        assert!(lines.iter().all(|v| v.color == lines[0].color));
    }
}
