//! Particle sprites: one instance per particle, rewritten every frame.

use super::{shaders, Targets, TextureBinder};
use crate::field::{ParticleField, ParticleVertex};
use crate::textures::PhotoImage;

const SPRITE_SIZE: u32 = 32;

pub(crate) struct ParticlePass {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    sprite: wgpu::BindGroup,
    capacity: usize,
    count: u32,
    staging: Vec<ParticleVertex>,
}

impl ParticlePass {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        targets: &Targets<'_>,
        textures: &TextureBinder,
        capacity: usize,
    ) -> Self {
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
        };

        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline = targets.pipeline(
            device,
            "Particle Pipeline",
            &shaders::particle_shader(),
            instance_layout,
            additive,
            false,
        );

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Buffer"),
            size: (capacity.max(1) * std::mem::size_of::<ParticleVertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sprite = textures.bind(
            device,
            queue,
            &PhotoImage::sprite(SPRITE_SIZE),
            "Particle Sprite",
        );

        Self {
            pipeline,
            instance_buffer,
            sprite,
            capacity,
            count: 0,
            staging: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn upload(&mut self, queue: &wgpu::Queue, field: &ParticleField) {
        field.write_vertices(&mut self.staging);
        self.staging.truncate(self.capacity);
        self.count = self.staging.len() as u32;
        if !self.staging.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.staging));
        }
    }

    pub(crate) fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(1, &self.sprite, &[]);
        render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        render_pass.draw(0..6, 0..self.count);
    }
}
