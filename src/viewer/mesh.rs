use super::vertex::{VertexPos, VertexPosNorm};
use super::{pipeline::create_render_pipeline, shaders};
use crate::handscene::HandMesh;
use itertools::{zip_eq, Itertools};
use std::cell::RefCell;
use std::rc::Rc;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug)]
struct Model {
    model: glm::Mat4,
}

unsafe impl bytemuck::Zeroable for Model {}

unsafe impl bytemuck::Pod for Model {}

impl Model {
    fn from_hand(hand: &HandMesh) -> Self {
        Model {
            model: glm::translation(&hand.position)
                * glm::scaling(&glm::vec3(hand.scale, hand.scale, hand.scale)),
        }
    }

    fn create_bind_group_layout_entry() -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }
}

/// GPU-side state for one hand instance: a position buffer for the visible
/// mesh, an interleaved position/normal buffer for the occluder, the shared
/// index buffer and the per-hand model matrix.
pub struct HandInstanceHandle {
    hand: Rc<RefCell<HandMesh>>,
    vertex_buffer: wgpu::Buffer,
    occluder_vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    num_elements: usize,
}

impl HandInstanceHandle {
    pub fn new(
        device: &wgpu::Device,
        model_bind_group_layout: &wgpu::BindGroupLayout,
        hand: Rc<RefCell<HandMesh>>,
    ) -> Self {
        let (vertex_buffer, occluder_vertex_buffer, index_buffer, model_buffer, num_elements) = {
            let hand = hand.borrow();

            let vertices = hand.mesh.pos.iter().map_into::<VertexPos>().collect_vec();
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("hand_vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices[..]),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });

            let occluder_vertices = zip_eq(&hand.occluder.pos, &hand.occluder.normal)
                .map_into::<VertexPosNorm>()
                .collect_vec();
            let occluder_vertex_buffer =
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("occluder_vertex_buffer"),
                    contents: bytemuck::cast_slice(&occluder_vertices[..]),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });

            // Topology is fixed for the session, so the index buffer is
            // uploaded once and shared by both meshes.
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("hand_index_buffer"),
                contents: bytemuck::cast_slice(&hand.mesh.indices[..]),
                usage: wgpu::BufferUsages::INDEX,
            });

            let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("hand_model_buffer"),
                contents: bytemuck::cast_slice(&[Model::from_hand(&hand)]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

            (
                vertex_buffer,
                occluder_vertex_buffer,
                index_buffer,
                model_buffer,
                hand.mesh.indices.len(),
            )
        };

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
            label: Some("hand_model_bind_group"),
        });

        HandInstanceHandle {
            hand,
            vertex_buffer,
            occluder_vertex_buffer,
            index_buffer,
            model_buffer,
            model_bind_group,
            num_elements,
        }
    }

    /// Re-uploads only the buffers the hand marked dirty, then clears the
    /// flags. The model matrix is cheap and rewritten every frame.
    pub fn upload(&self, queue: &wgpu::Queue) {
        let mut hand = self.hand.borrow_mut();

        if hand.mesh.pos_dirty {
            let vertices = hand.mesh.pos.iter().map_into::<VertexPos>().collect_vec();
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices[..]));
            hand.mesh.pos_dirty = false;
        }

        if hand.occluder.pos_dirty || hand.occluder.normal_dirty {
            let occluder_vertices = zip_eq(&hand.occluder.pos, &hand.occluder.normal)
                .map_into::<VertexPosNorm>()
                .collect_vec();
            queue.write_buffer(
                &self.occluder_vertex_buffer,
                0,
                bytemuck::cast_slice(&occluder_vertices[..]),
            );
            hand.occluder.pos_dirty = false;
            hand.occluder.normal_dirty = false;
        }

        queue.write_buffer(
            &self.model_buffer,
            0,
            bytemuck::cast_slice(&[Model::from_hand(&hand)]),
        );
    }
}

pub struct HandRenderPass {
    mesh_pipeline: wgpu::RenderPipeline,
    occluder_pipeline: wgpu::RenderPipeline,
    model_bind_group_layout: wgpu::BindGroupLayout,
    hands: Vec<HandInstanceHandle>,
}

impl HandRenderPass {
    pub fn new(
        device: &wgpu::Device,
        mut compiler: &mut shaderc::Compiler,
        uniform_bind_group_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> Self {
        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[Model::create_bind_group_layout_entry()],
                label: Some("hand_model_bind_group_layout"),
            });

        let (hand_vs, hand_fs) = shaders::hand::compile_shaders(&mut compiler, &device);
        let mesh_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("hand_mesh_pipeline_layout"),
                bind_group_layouts: &[uniform_bind_group_layout, &model_bind_group_layout],
                push_constant_ranges: &[],
            });
        let mesh_pipeline = create_render_pipeline::<VertexPos>(
            &device,
            mesh_pipeline_layout,
            &hand_vs,
            &hand_fs,
            format,
            true,
            "hand_mesh_pipeline",
        );

        let (occluder_vs, occluder_fs) = shaders::occluder::compile_shaders(&mut compiler, &device);
        let occluder_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("hand_occluder_pipeline_layout"),
                bind_group_layouts: &[uniform_bind_group_layout, &model_bind_group_layout],
                push_constant_ranges: &[],
            });
        let occluder_pipeline = create_render_pipeline::<VertexPosNorm>(
            &device,
            occluder_pipeline_layout,
            &occluder_vs,
            &occluder_fs,
            format,
            false,
            "hand_occluder_pipeline",
        );

        HandRenderPass {
            mesh_pipeline,
            occluder_pipeline,
            model_bind_group_layout,
            hands: vec![],
        }
    }

    pub fn add_hand(&mut self, device: &wgpu::Device, hand: Rc<RefCell<HandMesh>>) {
        self.hands.push(HandInstanceHandle::new(
            device,
            &self.model_bind_group_layout,
            hand,
        ));
    }

    pub fn upload_all(&self, queue: &wgpu::Queue) {
        for hand in &self.hands {
            hand.upload(queue);
        }
    }
}

pub trait DrawHands<'a, 'b>
where
    'b: 'a,
{
    fn draw_all_hands(&mut self, pass: &'b HandRenderPass);
}

impl<'a, 'b> DrawHands<'a, 'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_all_hands(&mut self, pass: &'b HandRenderPass) {
        // Occluder first: it fills the depth buffer so the translucent mesh
        // and the background resolve against it.
        self.set_pipeline(&pass.occluder_pipeline);
        for hand in &pass.hands {
            if !hand.hand.borrow().occluder.visible {
                continue;
            }
            self.set_bind_group(1, &hand.model_bind_group, &[]);
            self.set_vertex_buffer(0, hand.occluder_vertex_buffer.slice(..));
            self.set_index_buffer(hand.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            self.draw_indexed(0..hand.num_elements as u32, 0, 0..1);
        }

        self.set_pipeline(&pass.mesh_pipeline);
        for hand in &pass.hands {
            if !hand.hand.borrow().mesh.visible {
                continue;
            }
            self.set_bind_group(1, &hand.model_bind_group, &[]);
            self.set_vertex_buffer(0, hand.vertex_buffer.slice(..));
            self.set_index_buffer(hand.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            self.draw_indexed(0..hand.num_elements as u32, 0, 0..1);
        }
    }
}
