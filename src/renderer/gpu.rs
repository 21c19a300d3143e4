//! wgpu dispatcher
//!
//! Each viewport is one compute pass writing into a shared `Rgba32Float`
//! storage texture. Passes are recorded into a single encoder; wgpu inserts
//! the storage barrier between them. Every view reads its own uniform slot
//! (dynamic offset), so camera data is never rewritten while a pass can see
//! it. A fullscreen triangle then composites the image onto the surface.

use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::UVec2;
use winit::window::Window;

use super::dispatch::{FramePlan, RayDispatcher, ViewDispatch};
use super::gpu_types::{FrameUniform, PlayersUniform, ViewUniform};
use super::shader::{self, DISPLAY_WGSL, MARCH_WGSL, ProgramSlot};
use crate::consts::{MAX_PLAYERS, WORKGROUP_SIZE};
use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::sim::view::BACKGROUND;

const IMAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Output image plus the bind groups that reference it
struct FrameTarget {
    size: UVec2,
    _texture: wgpu::Texture,
    compute_bind_group: wgpu::BindGroup,
    display_bind_group: wgpu::BindGroup,
}

pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    compute_bind_group_layout: wgpu::BindGroupLayout,
    compute_pipeline_layout: wgpu::PipelineLayout,
    compute: ProgramSlot<wgpu::ComputePipeline>,
    compute_path: PathBuf,

    display_bind_group_layout: wgpu::BindGroupLayout,
    display_pipeline: wgpu::RenderPipeline,

    frame_buffer: wgpu::Buffer,
    players_buffer: wgpu::Buffer,
    view_buffer: wgpu::Buffer,
    view_stride: u64,

    target: Option<FrameTarget>,
    encoder: Option<wgpu::CommandEncoder>,
    next_slot: u64,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>, settings: &Settings) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::Adapter(e.to_string()))?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("split-march-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .map_err(|e| Error::Device(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        log::debug!("Surface formats: {:?}", surface_caps.formats);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or_else(|| Error::Surface("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if settings.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_entry = |binding: u32, size: usize, dynamic: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: NonZeroU64::new(size as u64),
            },
            count: None,
        };
        let compute_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("march_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::StorageTexture {
                            access: wgpu::StorageTextureAccess::WriteOnly,
                            format: IMAGE_FORMAT,
                            view_dimension: wgpu::TextureViewDimension::D2,
                        },
                        count: None,
                    },
                    uniform_entry(1, std::mem::size_of::<FrameUniform>(), false),
                    uniform_entry(2, std::mem::size_of::<PlayersUniform>(), false),
                    uniform_entry(3, std::mem::size_of::<ViewUniform>(), true),
                ],
            });
        let compute_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("march_pipeline_layout"),
                bind_group_layouts: &[&compute_bind_group_layout],
                immediate_size: 0,
            });

        let compute_path = PathBuf::from(&settings.compute_shader);
        let march_source = shader::read_source_or(&compute_path, MARCH_WGSL);
        let pipeline =
            match build_compute(&device, &compute_pipeline_layout, &compute_path, &march_source) {
                Ok(pipeline) => pipeline,
                Err(e) => {
                    log::error!("{e}");
                    log::warn!("falling back to built-in ray-march shader");
                    let built_in = Path::new("<built-in>");
                    build_compute(&device, &compute_pipeline_layout, built_in, MARCH_WGSL)?
                }
            };

        let display_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("display_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                }],
            });
        let display_path = PathBuf::from(&settings.display_shader);
        let display_pipeline = build_display(
            &device,
            &display_bind_group_layout,
            config.format,
            &display_path,
        )?;

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let players_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("players_uniform"),
            size: std::mem::size_of::<PlayersUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let view_stride = wgpu::util::align_to(
            std::mem::size_of::<ViewUniform>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let view_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("view_uniforms"),
            size: view_stride * MAX_PLAYERS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            compute_bind_group_layout,
            compute_pipeline_layout,
            compute: ProgramSlot::new(pipeline),
            compute_path,
            display_bind_group_layout,
            display_pipeline,
            frame_buffer,
            players_buffer,
            view_buffer,
            view_stride,
            target: None,
            encoder: None,
            next_slot: 0,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Path the ray-march program is loaded from (the hot reload target)
    pub fn compute_path(&self) -> &Path {
        &self.compute_path
    }

    /// Rebuild the ray-march program from disk
    ///
    /// On any error the running program stays in place.
    pub fn reload_compute(&mut self) -> bool {
        let build = shader::read_source(&self.compute_path).and_then(|source| {
            build_compute(
                &self.device,
                &self.compute_pipeline_layout,
                &self.compute_path,
                &source,
            )
        });
        let replaced = self.compute.replace(build);
        if replaced {
            log::info!(
                "reloaded {:?} (generation {})",
                self.compute_path,
                self.compute.generation()
            );
        }
        replaced
    }

    fn ensure_target(&mut self, size: UVec2) {
        if self.target.as_ref().is_some_and(|t| t.size == size) {
            return;
        }
        log::debug!("allocating {}x{} output image", size.x, size.y);

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("march_output"),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: IMAGE_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let compute_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("march_bind_group"),
            layout: &self.compute_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.players_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.view_buffer,
                        offset: 0,
                        size: NonZeroU64::new(std::mem::size_of::<ViewUniform>() as u64),
                    }),
                },
            ],
        });
        let display_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("display_bind_group"),
            layout: &self.display_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            }],
        });

        self.target = Some(FrameTarget {
            size,
            _texture: texture,
            compute_bind_group,
            display_bind_group,
        });
    }

    fn present(&mut self, encoder: wgpu::CommandEncoder) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.queue.submit(std::iter::once(encoder.finish()));
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("surface timeout, frame skipped");
                self.queue.submit(std::iter::once(encoder.finish()));
                return Ok(());
            }
            Err(e) => return Err(Error::Frame(e)),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = encoder;
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("display_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: BACKGROUND.x as f64,
                            g: BACKGROUND.y as f64,
                            b: BACKGROUND.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(target) = &self.target {
                render_pass.set_pipeline(&self.display_pipeline);
                render_pass.set_bind_group(0, &target.display_bind_group, &[]);
                render_pass.draw(0..3, 0..1); // Fullscreen triangle
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl RayDispatcher for GpuRenderer {
    fn begin_frame(&mut self, plan: &FramePlan) -> Result<()> {
        self.next_slot = 0;
        if plan.image_size.x == 0 || plan.image_size.y == 0 {
            self.encoder = None;
            return Ok(());
        }
        self.ensure_target(plan.image_size);

        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniform::from(&plan.globals)),
        );
        if let Some(first) = plan.views.first() {
            self.queue.write_buffer(
                &self.players_buffer,
                0,
                bytemuck::bytes_of(&PlayersUniform::from(&first.snapshot.scene)),
            );
        }

        self.encoder = Some(
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame_encoder"),
                }),
        );
        Ok(())
    }

    fn dispatch(&mut self, view: &ViewDispatch) -> Result<()> {
        let (Some(encoder), Some(target), Some(pipeline)) =
            (self.encoder.as_mut(), self.target.as_ref(), self.compute.get())
        else {
            return Ok(());
        };
        if self.next_slot >= MAX_PLAYERS as u64 {
            log::warn!("more views than uniform slots, player {} skipped", view.viewport.player);
            return Ok(());
        }

        let offset = self.next_slot * self.view_stride;
        self.next_slot += 1;
        self.queue.write_buffer(
            &self.view_buffer,
            offset,
            bytemuck::bytes_of(&ViewUniform::from(view)),
        );

        let size = view.viewport.size.as_uvec2();
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("march_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &target.compute_bind_group, &[offset as u32]);
        pass.dispatch_workgroups(
            size.x.div_ceil(WORKGROUP_SIZE),
            size.y.div_ceil(WORKGROUP_SIZE),
            1,
        );
        Ok(())
    }

    fn finish_frame(&mut self) -> Result<()> {
        match self.encoder.take() {
            Some(encoder) => self.present(encoder),
            None => Ok(()),
        }
    }
}

fn build_compute(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    path: &Path,
    source: &str,
) -> Result<wgpu::ComputePipeline> {
    let limits = device.limits();
    shader::validate_wgsl(path, source, naga::ShaderStage::Compute, "main", &limits)?;

    // Layout mismatches only show up inside wgpu
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("march_shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("march_pipeline"),
        layout: Some(layout),
        module: &module,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    });
    scope_result(path, pollster::block_on(scope.pop()))?;
    Ok(pipeline)
}

/// Turn a popped validation scope into a shader error
fn scope_result(path: &Path, error: Option<wgpu::Error>) -> Result<()> {
    match error {
        Some(e) => Err(Error::Shader {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        None => Ok(()),
    }
}

fn build_display(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
    path: &Path,
) -> Result<wgpu::RenderPipeline> {
    let limits = device.limits();
    let mut source = shader::read_source_or(path, DISPLAY_WGSL);
    let stage = naga::ShaderStage::Fragment;
    if let Err(e) = shader::validate_wgsl(path, &source, stage, "fs_main", &limits) {
        log::error!("{e}");
        log::warn!("falling back to built-in display shader");
        source = DISPLAY_WGSL.to_string();
    }

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("display_shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("display_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        immediate_size: 0,
    });

    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("display_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            buffers: &[], // No vertex buffers - fullscreen triangle
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });
    scope_result(path, pollster::block_on(scope.pop()))?;
    Ok(pipeline)
}
