//! Photo mounts: a white frame quad per mount plus a textured picture quad
//! once the photo has decoded.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use super::{shaders, Targets, TextureBinder};
use crate::mount::{MountId, MountTable, PhotoMount};
use crate::picking::Collider;
use crate::textures::PhotoImage;

/// One quad instance: mount-local model matrix and a color multiplier.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PhotoInstance {
    model: [[f32; 4]; 4],
    tint: [f32; 4],
}

impl PhotoInstance {
    fn new(mount: &PhotoMount, collider: Collider, tint: Vec4) -> Self {
        let model: Mat4 = mount.local_transform() * collider.quad_transform();
        Self {
            model: model.to_cols_array_2d(),
            tint: tint.to_array(),
        }
    }
}

pub(crate) struct PhotoPass {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    /// Plain white texture for frames.
    white: wgpu::BindGroup,
    /// One texture per loaded mount. Ids are never reused, so an entry stays
    /// valid until its mount disappears.
    pictures: HashMap<MountId, wgpu::BindGroup>,
    instances: Vec<PhotoInstance>,
    frame_count: u32,
    picture_order: Vec<MountId>,
}

impl PhotoPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        targets: &Targets<'_>,
        textures: &TextureBinder,
    ) -> Self {
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PhotoInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x4,
                1 => Float32x4,
                2 => Float32x4,
                3 => Float32x4,
                4 => Float32x4,
            ],
        };

        let pipeline = targets.pipeline(
            device,
            "Photo Pipeline",
            &shaders::photo_shader(),
            instance_layout,
            wgpu::BlendState::ALPHA_BLENDING,
            true,
        );

        let capacity = 32;
        let instance_buffer = create_instance_buffer(device, capacity);
        let white = textures.bind(device, queue, &PhotoImage::solid(255, 255, 255, 255), "Frame");

        Self {
            pipeline,
            instance_buffer,
            capacity,
            white,
            pictures: HashMap::new(),
            instances: Vec::with_capacity(capacity),
            frame_count: 0,
            picture_order: Vec::new(),
        }
    }

    pub(crate) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        textures: &TextureBinder,
        mounts: &MountTable,
    ) {
        self.pictures.retain(|id, _| mounts.get(*id).is_some());

        self.instances.clear();
        self.picture_order.clear();
        for mount in mounts.iter() {
            self.instances
                .push(PhotoInstance::new(mount, Collider::frame(mount.id), Vec4::ONE));
        }
        self.frame_count = self.instances.len() as u32;

        for mount in mounts.iter() {
            let Some(image) = mount.image() else {
                continue;
            };
            self.pictures.entry(mount.id).or_insert_with(|| {
                log::debug!(
                    "uploading {}x{} photo for mount {}",
                    image.width,
                    image.height,
                    mount.id.raw()
                );
                textures.bind(device, queue, image, "Photo")
            });
            self.instances
                .push(PhotoInstance::new(mount, Collider::image(mount.id), Vec4::ONE));
            self.picture_order.push(mount.id);
        }

        if self.instances.is_empty() {
            return;
        }
        if self.instances.len() > self.capacity {
            self.capacity = self.instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.capacity);
        }
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
    }

    pub(crate) fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.instances.is_empty() {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));

        render_pass.set_bind_group(1, &self.white, &[]);
        render_pass.draw(0..6, 0..self.frame_count);

        for (i, id) in self.picture_order.iter().enumerate() {
            if let Some(bind_group) = self.pictures.get(id) {
                let instance = self.frame_count + i as u32;
                render_pass.set_bind_group(1, bind_group, &[]);
                render_pass.draw(0..6, instance..instance + 1);
            }
        }
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Photo Instance Buffer"),
        size: (capacity * std::mem::size_of::<PhotoInstance>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
