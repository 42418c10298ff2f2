mod resources;
use resources::SharedResources;

pub(crate) mod helpers;
use helpers::{axes_lines, grid_lines, HelperPipeline};

mod tube;
use tube::TubePipeline;

//

use geotube::TubeMesh;

use crate::render_window::{ActiveRenderWindow, RenderContext};

pub(crate) struct Renderer {
    tube_pl: TubePipeline,
    // not created at all if neither grid nor axes are enabled
    helper_pl: Option<HelperPipeline>,
    // some GPU resources are shared between different pipelines
    pub resources: SharedResources,
}

impl Renderer {
    pub fn new(
        window: &ActiveRenderWindow,
        mesh: &TubeMesh,
        params: &crate::AnimationParams,
    ) -> Self {
        let resources = SharedResources::new(window);

        let mut lines = Vec::new();
        if let Some(grid) = &params.grid {
            lines.extend(grid_lines(grid));
        }
        if let Some(axes) = &params.axes {
            lines.extend(axes_lines(axes));
        }
        let helper_pl =
            (!lines.is_empty()).then(|| HelperPipeline::new(window, &resources, &lines));

        Self {
            tube_pl: TubePipeline::new(window, &resources, mesh, params.material),
            helper_pl,
            resources,
        }
    }

    /// Set the animation time seen by the highlight shader.
    #[inline]
    pub fn set_time(&self, queue: &wgpu::Queue, time: f64) {
        self.tube_pl.set_time(queue, time);
    }

    /// Draw the whole scene.
    ///
    /// Frame uniforms must have been uploaded before this.
    pub fn draw(&self, ctx: &mut RenderContext) {
        if let Some(helper_pl) = &self.helper_pl {
            helper_pl.draw(&self.resources, ctx);
        }
        self.tube_pl.draw(&self.resources, ctx);
    }
}
