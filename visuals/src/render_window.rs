//! Low-level resources for window creation and rendering.

use std::sync::Arc;

use geotube::AnimationState;
use nalgebra as na;
use winit::{
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    platform::run_on_demand::EventLoopExtRunOnDemand,
    window::Window,
};

use super::{
    camera::{Camera, DragMode, OrbitControls},
    pipelines as pl,
};

//
// user-facing API
//

/// Error in creating a window or its rendering context.
#[derive(thiserror::Error, Debug)]
pub enum WindowInitError {
    /// Failed to create or run the [`winit`] event loop.
    #[error("Failed to run winit event loop")]
    EventLoopError(#[from] winit::error::EventLoopError),
    /// Failed to create the [`winit`] window.
    #[error("Failed to create winit window")]
    WindowOsError(#[from] winit::error::OsError),
    /// Failed to create a [`wgpu::Surface`] for the window.
    #[error("Failed to create wgpu surface")]
    CreateSurfaceError(#[from] wgpu::CreateSurfaceError),
    /// Failed to get a [`wgpu::Adapter`].
    #[error("Failed to get wgpu adapter")]
    CreateAdapterError,
    /// Failed to get a [`wgpu::Device`].
    #[error("Failed to get wgpu device")]
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
}

/// Parameters for the creation of a [`RenderWindow`].
#[derive(Clone, Copy, Debug)]
pub struct WindowParams {
    /// Initial width of the window in pixels. Default: 1280.
    pub width: usize,
    /// Initial height of the window in pixels. Default: 720.
    pub height: usize,
    /// Samples used for anti-aliasing. Default: 4.
    pub msaa_samples: u32,
    /// Title of the window. Default: "geotube".
    pub title: &'static str,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            msaa_samples: 4,
            title: "geotube",
        }
    }
}

/// A window for drawing real-time graphics.
///
/// See [`run_animation`][Self::run_animation] and [`Animation`][crate::Animation]
/// for how to draw into the window once created.
pub struct RenderWindow {
    // RenderWindow is just a wrapper around the event loop,
    // all the actual resources are created on application resume
    // and stored in `ActiveRenderWindow`
    params: WindowParams,
    event_loop: EventLoop<()>,
}

impl RenderWindow {
    /// Create a new render window.
    pub fn new(params: WindowParams) -> Result<Self, WindowInitError> {
        Ok(Self {
            params,
            event_loop: EventLoop::new()?,
        })
    }

    /// Play an [`Animation`][crate::Animation] in the window.
    ///
    /// Returns after the animation is aborted by closing the window or pressing Q,
    /// so multiple animations can be run consecutively in one program.
    ///
    /// # Controls
    /// - left mouse drag: rotate the camera around its target
    /// - right mouse drag: pan the camera
    /// - mouse wheel: zoom
    /// - `Q`: end the animation and return from this function
    ///
    /// # Errors
    ///
    /// Window and rendering context creation happen inside the event loop.
    /// If they fail, the event loop is stopped and the error returned here.
    pub fn run_animation(&mut self, anim: crate::Animation) -> Result<(), WindowInitError> {
        self.event_loop.set_control_flow(ControlFlow::Poll);

        let camera = Camera::new(
            &anim.params.camera,
            self.params.width as f32 / self.params.height as f32,
        );
        let mut viewer = Viewer {
            window_params: self.params,
            window: None,
            camera,
            controls: OrbitControls::new(anim.params.orbit),
            state: AnimationState::new(anim.params.step),
            anim,
            init_error: None,
        };

        self.event_loop.run_app_on_demand(&mut viewer)?;

        match viewer.init_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

//
// actual window and wgpu context
//

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// An active window (created after the event loop is started)
// and wgpu rendering context.
#[derive(Debug)]
pub(crate) struct ActiveRenderWindow {
    window: Arc<Window>,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    swapchain_format: wgpu::TextureFormat,
    msaa_samples: u32,
    // msaa texture is only created if multisampling is used
    msaa_tex: Option<wgpu::Texture>,
    depth_tex: wgpu::Texture,
}

impl ActiveRenderWindow {
    fn new(event_loop: &ActiveEventLoop, params: WindowParams) -> Result<Self, WindowInitError> {
        let window_attrs = Window::default_attributes()
            .with_title(params.title)
            .with_inner_size(winit::dpi::LogicalSize {
                width: params.width as f64,
                height: params.height as f64,
            });
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        futures::executor::block_on(Self::create_rest(window, params))
    }

    /// Create the rest of the contexts besides the window.
    async fn create_rest(
        window: Arc<Window>,
        params: WindowParams,
    ) -> Result<Self, WindowInitError> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(WindowInitError::CreateAdapterError)?;
        let adapter_info = adapter.get_info();
        log::info!(
            "using adapter {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        // textures can't be zero-sized,
        // a minimized window is caught when drawing instead
        let window_size = window.inner_size();
        let window_size = winit::dpi::PhysicalSize::new(
            window_size.width.max(1),
            window_size.height.max(1),
        );

        let swapchain_format = wgpu::TextureFormat::Bgra8UnormSrgb;
        let swapchain_capabilities = surface.get_capabilities(&adapter);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: swapchain_format,
            width: window_size.width,
            height: window_size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: swapchain_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "configured surface of {}x{} pixels",
            window_size.width,
            window_size.height
        );

        let msaa_samples = params.msaa_samples;
        let msaa_tex = (msaa_samples > 1).then(|| {
            Self::create_msaa_texture(&device, swapchain_format, msaa_samples, window_size)
        });
        let depth_tex = Self::create_depth_texture(&device, msaa_samples, window_size);

        Ok(Self {
            window,
            device,
            queue,
            surface,
            surface_config,
            swapchain_format,
            msaa_samples,
            msaa_tex,
            depth_tex,
        })
    }

    /// Create a multisampled texture to render to.
    fn create_msaa_texture(
        device: &wgpu::Device,
        swapchain_format: wgpu::TextureFormat,
        msaa_samples: u32,
        window_size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("screen multisample"),
            size: wgpu::Extent3d {
                width: window_size.width,
                height: window_size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: msaa_samples,
            dimension: wgpu::TextureDimension::D2,
            format: swapchain_format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    /// Create a depth texture matching the color target.
    fn create_depth_texture(
        device: &wgpu::Device,
        msaa_samples: u32,
        window_size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size: wgpu::Extent3d {
                width: window_size.width,
                height: window_size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: msaa_samples,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    /// Reconfigure the swapchain and recreate the render targets
    /// when the window size has changed.
    ///
    /// Returns whether anything changed.
    fn resize_swapchain(&mut self, new_size: winit::dpi::PhysicalSize<u32>) -> bool {
        if new_size == self.window_size() {
            return false;
        }
        log::debug!("resizing surface to {}x{}", new_size.width, new_size.height);
        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface.configure(&self.device, &self.surface_config);
        if self.msaa_samples > 1 {
            self.msaa_tex = Some(Self::create_msaa_texture(
                &self.device,
                self.swapchain_format,
                self.msaa_samples,
                new_size,
            ));
        }
        self.depth_tex = Self::create_depth_texture(&self.device, self.msaa_samples, new_size);
        true
    }

    /// Get the format of the swapchain texture being rendered to.
    #[inline]
    pub(crate) fn swapchain_format(&self) -> wgpu::TextureFormat {
        self.swapchain_format
    }

    /// Get the size of the render surface in physical pixels.
    #[inline]
    pub(crate) fn window_size(&self) -> winit::dpi::PhysicalSize<u32> {
        winit::dpi::PhysicalSize::new(self.surface_config.width, self.surface_config.height)
    }

    /// Get the multisample state used by the window.
    #[inline]
    pub(crate) fn multisample_state(&self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.msaa_samples,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }

    /// Get the depth test used by every pipeline drawing into the window.
    #[inline]
    pub(crate) fn depth_stencil_state(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    /// Grab the next swapchain texture and start drawing on it.
    fn begin_frame(
        &mut self,
        clear_color: wgpu::Color,
    ) -> Result<RenderContext<'_>, wgpu::SurfaceError> {
        let surface_tex = self.surface.get_current_texture()?;
        let surface_view = surface_tex
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (target, resolve_target) = if let Some(msaa_tex) = &self.msaa_tex {
            let msaa_view = msaa_tex.create_view(&wgpu::TextureViewDescriptor::default());
            (msaa_view, Some(surface_view))
        } else {
            (surface_view, None)
        };
        let depth_target = self
            .depth_tex
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());

        Ok(RenderContext {
            clear_color: Some(clear_color),
            surface_tex,
            target,
            resolve_target,
            depth_target,
            encoder,
            queue: &self.queue,
        })
    }
}

/// An active surface and other context required to draw a frame.
pub(crate) struct RenderContext<'a> {
    // if this is set, first pass automatically clears the framebuffer
    clear_color: Option<wgpu::Color>,
    surface_tex: wgpu::SurfaceTexture,
    pub target: wgpu::TextureView,
    pub resolve_target: Option<wgpu::TextureView>,
    pub depth_target: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
    pub queue: &'a wgpu::Queue,
}

impl<'a> RenderContext<'a> {
    /// Start a render pass with default parameters.
    pub fn pass(&mut self, label: &str) -> wgpu::RenderPass {
        let clear = self.clear_color.take();
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.target,
                resolve_target: self.resolve_target.as_ref(),
                ops: wgpu::Operations {
                    load: match clear {
                        Some(c) => wgpu::LoadOp::Clear(c),
                        None => wgpu::LoadOp::Load,
                    },
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_target,
                depth_ops: Some(wgpu::Operations {
                    load: match clear {
                        Some(_) => wgpu::LoadOp::Clear(1.),
                        None => wgpu::LoadOp::Load,
                    },
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }
}

//
// animation control
//

/// A `winit` app controlling the playback of an animation.
struct Viewer<'mesh> {
    window_params: WindowParams,
    window: Option<(ActiveRenderWindow, pl::Renderer)>,
    anim: crate::Animation<'mesh>,
    camera: Camera,
    controls: OrbitControls,
    state: AnimationState,
    // winit callbacks can't return errors,
    // so failures in window creation are stashed here for `run_animation`
    init_error: Option<WindowInitError>,
}

impl<'mesh> Viewer<'mesh> {
    /// Render one frame and advance the animation.
    fn step(&mut self, event_loop: &ActiveEventLoop) {
        let Some((window, renderer)) = self.window.as_mut() else {
            return;
        };

        // follow the window size

        let size = window.window.inner_size();
        if size.width == 0 || size.height == 0 {
            // minimized, nothing to draw on
            return;
        }
        if window.resize_swapchain(size) {
            self.camera.set_aspect(size.width, size.height);
        }

        self.controls.update(&mut self.camera);

        // draw

        let bg = self.anim.params.background;
        let clear_color = wgpu::Color {
            r: bg.red as f64,
            g: bg.green as f64,
            b: bg.blue as f64,
            a: 1.,
        };
        let mut ctx = match window.begin_frame(clear_color) {
            Ok(ctx) => ctx,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                window.surface.configure(&window.device, &window.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out waiting for the next frame");
                return;
            }
            Err(err) => {
                log::error!("{err}, stopping");
                event_loop.exit();
                return;
            }
        };
        renderer
            .resources
            .upload_frame_uniforms(&self.camera, &mut ctx);
        renderer.draw(&mut ctx);

        ctx.queue.submit(Some(ctx.encoder.finish()));
        ctx.surface_tex.present();

        // move the highlight for the next frame

        let time = self.state.advance();
        renderer.set_time(&window.queue, time);
    }
}

impl<'mesh> winit::application::ApplicationHandler for Viewer<'mesh> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match ActiveRenderWindow::new(event_loop, self.window_params) {
            Ok(active_win) => {
                let size = active_win.window_size();
                self.camera.set_aspect(size.width, size.height);
                let renderer = pl::Renderer::new(&active_win, self.anim.mesh, &self.anim.params);
                renderer.set_time(&active_win.queue, self.state.time());
                self.window = Some((active_win, renderer));
            }
            Err(err) => {
                log::error!("{err}");
                self.init_error = Some(err);
                event_loop.exit();
            }
        }
    }

    /// step and draw in about_to_wait instead of waiting for RedrawRequested,
    /// with Poll control flow and vsync setting the pace
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.step(event_loop);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some((window, _)) = self.window.as_ref() else {
            return;
        };

        // resizes are picked up when drawing the next frame
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let (ElementState::Pressed, PhysicalKey::Code(KeyCode::KeyQ)) =
                    (event.state, event.physical_key)
                {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let mode = match button {
                    MouseButton::Left => DragMode::Rotate,
                    MouseButton::Right => DragMode::Pan,
                    _ => return,
                };
                match state {
                    ElementState::Pressed => self.controls.begin_drag(mode),
                    ElementState::Released => self.controls.end_drag(mode),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.controls.cursor_moved(
                    na::Vector2::new(position.x as f32, position.y as f32),
                    window.window_size().height as f32,
                    &self.camera,
                );
            }
            WindowEvent::CursorLeft { .. } => {
                self.controls.cursor_left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                self.controls.scroll(amount);
            }
            _ => {}
        }
    }
}
