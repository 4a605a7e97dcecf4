//! Rendering system for the atom model

use std::path::Path;

use common::{
    create_depth_texture, create_index_buffer, create_instance_buffer, create_uniform_buffer,
    create_vertex_buffer, Camera3D, CameraUniform, GraphicsContext, DEPTH_FORMAT,
};
use glam::{Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;

use crate::element::TEXTURES_DIR;
use crate::entity::{Electron, Particle};
use crate::geometry::{Mesh, MeshVertex, SPHERE_RADIUS, SPHERE_SECTORS, SPHERE_STACKS};
use crate::scene::{AtomScene, LightsUniform, MAX_ELECTRON_LIGHTS};
use crate::store::ElementSource;
use crate::texture::TextureCache;

/// Instance buffer capacity per entity kind
pub const MAX_INSTANCES: usize = 512;

const LIGHT_CAPACITY_TOKEN: &str = "__MAX_LIGHTS__";

/// WGSL source with the light array sized to match [`LightsUniform`]
pub fn shader_source() -> String {
    include_str!("shaders/atom.wgsl")
        .replace(LIGHT_CAPACITY_TOKEN, &MAX_ELECTRON_LIGHTS.to_string())
}

const CUBE_POSITION: Vec3 = Vec3::new(3.0, -1.5, -2.5);
const CUBE_SCALE: f32 = 1.2;
const CUBE_TILT: f32 = 0.6;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.01,
    b: 0.025,
    a: 1.0,
};

/// Per-instance transform and color for mesh draws
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl MeshInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }
}

impl From<&Particle> for MeshInstance {
    fn from(particle: &Particle) -> Self {
        Self::new(particle.model_matrix(), particle.color())
    }
}

impl From<&Electron> for MeshInstance {
    fn from(electron: &Electron) -> Self {
        Self::new(electron.model_matrix(), electron.color.extend(1.0).to_array())
    }
}

/// Vertex and index buffers for one static mesh
struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Self {
        Self {
            vertices: create_vertex_buffer(device, label, &mesh.vertices),
            indices: create_index_buffer(device, label, &mesh.indices),
            index_count: mesh.index_count(),
        }
    }
}

/// How many instances of each kind this frame draws
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCounts {
    pub particles: u32,
    pub electrons: u32,
}

pub struct AtomRenderer {
    particle_pipeline: wgpu::RenderPipeline,
    light_pipeline: wgpu::RenderPipeline,
    cube_pipeline: wgpu::RenderPipeline,
    sphere: GpuMesh,
    cube: GpuMesh,
    particle_buffer: wgpu::Buffer,
    electron_buffer: wgpu::Buffer,
    cube_instance_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    textures: TextureCache,
    depth_texture: wgpu::TextureView,
    max_instances: usize,
}

impl AtomRenderer {
    pub fn new(ctx: &GraphicsContext, assets_dir: &Path) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Atom Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source().into()),
        });

        let camera_buffer = create_uniform_buffer(
            device,
            "Camera Buffer",
            &CameraUniform::from_camera(&Camera3D::new(ctx.aspect_ratio())),
        );
        let lights_buffer = create_uniform_buffer(device, "Lights Buffer", &LightsUniform::default());

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[uniform_entry(0), uniform_entry(1)],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        let textures = TextureCache::new(device, assets_dir.join(TEXTURES_DIR));

        let sphere_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let cube_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout, textures.layout()],
            push_constant_ranges: &[],
        });

        let format = ctx.config.format;
        let particle_pipeline =
            mesh_pipeline(device, "Particle Pipeline", &sphere_layout, &shader, "fs_particle", format);
        let light_pipeline =
            mesh_pipeline(device, "Light Pipeline", &sphere_layout, &shader, "fs_light", format);
        let cube_pipeline =
            mesh_pipeline(device, "Cube Pipeline", &cube_layout, &shader, "fs_cube", format);

        let sphere = GpuMesh::new(
            device,
            "Sphere Mesh",
            &Mesh::sphere(SPHERE_RADIUS, SPHERE_SECTORS, SPHERE_STACKS),
        );
        let cube = GpuMesh::new(device, "Cube Mesh", &Mesh::cube());

        let particle_buffer =
            create_instance_buffer::<MeshInstance>(device, "Particle Instances", MAX_INSTANCES);
        let electron_buffer =
            create_instance_buffer::<MeshInstance>(device, "Electron Instances", MAX_INSTANCES);

        let cube_model = Mat4::from_scale_rotation_translation(
            Vec3::splat(CUBE_SCALE),
            Quat::from_rotation_y(CUBE_TILT) * Quat::from_rotation_x(CUBE_TILT * 0.5),
            CUBE_POSITION,
        );
        let cube_instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Instance"),
            contents: bytemuck::bytes_of(&MeshInstance::new(cube_model, [1.0; 4])),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let depth_texture = create_depth_texture(device, ctx.size.width, ctx.size.height);

        Self {
            particle_pipeline,
            light_pipeline,
            cube_pipeline,
            sphere,
            cube,
            particle_buffer,
            electron_buffer,
            cube_instance_buffer,
            camera_buffer,
            lights_buffer,
            scene_bind_group,
            textures,
            depth_texture,
            max_instances: MAX_INSTANCES,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = create_depth_texture(device, width, height);
    }

    /// Upload camera, lights and the current element's instances
    pub fn prepare<S: ElementSource>(
        &self,
        queue: &wgpu::Queue,
        camera: &Camera3D,
        scene: &AtomScene<S>,
    ) -> FrameCounts {
        let camera_uniform = CameraUniform::from_camera(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));
        queue.write_buffer(&self.lights_buffer, 0, bytemuck::bytes_of(&scene.lights()));

        let Some(data) = scene.current_data() else {
            return FrameCounts::default();
        };

        let particles = self.upload(queue, &self.particle_buffer, &data.particles);
        let electrons = self.upload(queue, &self.electron_buffer, &data.electrons);
        FrameCounts {
            particles,
            electrons,
        }
    }

    fn upload<'a, T: 'a>(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer, entities: &'a [T]) -> u32
    where
        MeshInstance: From<&'a T>,
    {
        let instances: Vec<MeshInstance> = entities
            .iter()
            .take(self.max_instances)
            .map(MeshInstance::from)
            .collect();
        if !instances.is_empty() {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&instances));
        }
        instances.len() as u32
    }

    pub fn render(
        &mut self,
        ctx: &GraphicsContext,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        counts: FrameCounts,
        cube_texture: &str,
    ) {
        let cube_bind_group = self.textures.get_or_load(&ctx.device, &ctx.queue, cube_texture);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Atom Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

        // Nucleus
        if counts.particles > 0 {
            render_pass.set_pipeline(&self.particle_pipeline);
            render_pass.set_vertex_buffer(0, self.sphere.vertices.slice(..));
            render_pass.set_vertex_buffer(1, self.particle_buffer.slice(..));
            render_pass.set_index_buffer(self.sphere.indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.sphere.index_count, 0, 0..counts.particles);
        }

        // Electrons
        if counts.electrons > 0 {
            render_pass.set_pipeline(&self.light_pipeline);
            render_pass.set_vertex_buffer(0, self.sphere.vertices.slice(..));
            render_pass.set_vertex_buffer(1, self.electron_buffer.slice(..));
            render_pass.set_index_buffer(self.sphere.indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.sphere.index_count, 0, 0..counts.electrons);
        }

        // Decorative cube
        render_pass.set_pipeline(&self.cube_pipeline);
        render_pass.set_bind_group(1, cube_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.cube.vertices.slice(..));
        render_pass.set_vertex_buffer(1, self.cube_instance_buffer.slice(..));
        render_pass.set_index_buffer(self.cube.indices.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.cube.index_count, 0, 0..1);
    }
}

fn mesh_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_mesh",
            buffers: &[MeshVertex::layout(), MeshInstance::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: fragment_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}
