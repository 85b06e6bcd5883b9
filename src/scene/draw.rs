use log::error;
use rusty_spine::{Attachment, AttachmentType, Skeleton, Slot};

#[derive(Default, Clone, Debug, Copy, bytemuck::Pod, bytemuck::Zeroable, serde::Serialize, serde::Deserialize)]
#[repr(C)]
pub struct SpineVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// CPU-side geometry for one skeleton, rebuilt every frame and handed to the
/// host renderer together with the atlas textures. `meshes` holds the index
/// count of each draw-order entry so the host can split draw calls.
#[derive(Default)]
pub struct DrawBuffer {
    pub vertices: Vec<SpineVertex>,
    pub indices: Vec<u32>,
    pub meshes: Vec<usize>,
}

impl DrawBuffer {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.meshes.clear();
    }
}

pub fn fill_draw_buffer(skeleton: &Skeleton, buffer: &mut DrawBuffer) {
    buffer.clear();
    let mut index_offset = 0;
    for index in 0..skeleton.slots_count() {
        let slot = match skeleton.draw_order_at_index(index) {
            Some(slot) => slot,
            None => continue,
        };
        if !slot.bone().active() {
            continue;
        }
        if let Some(attachment) = slot.attachment() {
            fill_attachment(&slot, &attachment, &mut index_offset, buffer);
        }
    }
}

fn fill_attachment(
    slot: &Slot,
    attachment: &Attachment,
    index_offset: &mut u32,
    buffer: &mut DrawBuffer,
) {
    match attachment.attachment_type() {
        AttachmentType::Region => {
            let region = match attachment.as_region() {
                Some(region) => region,
                None => return,
            };
            let mut world = vec![0.0; 8];
            unsafe {
                region.compute_world_vertices(slot, &mut world, 0, 2);
            }
            let uvs = region.uvs();
            for i in 0..4 {
                buffer.vertices.push(SpineVertex {
                    position: [world[i * 2], world[i * 2 + 1]],
                    uv: [uvs[i * 2], uvs[i * 2 + 1]],
                })
            }
            let indices = [0, 1, 2, 2, 3, 0].map(|index| index + *index_offset);
            buffer.indices.extend_from_slice(&indices);
            buffer.meshes.push(indices.len());
            *index_offset += 4;
        }
        AttachmentType::Mesh => {
            let mesh = match attachment.as_mesh() {
                Some(mesh) => mesh,
                None => return,
            };
            let stride = 2;
            let count = mesh.world_vertices_length() as usize;
            let mut world = vec![0.0; count];
            unsafe {
                mesh.compute_world_vertices(slot, 0, count as i32, &mut world, 0, stride as i32);
            }
            let uvs = unsafe { std::slice::from_raw_parts(mesh.uvs(), count) };
            for i in 0..(count / stride) {
                buffer.vertices.push(SpineVertex {
                    position: [world[i * stride], world[i * stride + 1]],
                    uv: [uvs[i * 2], uvs[i * 2 + 1]],
                })
            }
            let indices_count = mesh.triangles_count() as usize;
            let indices_slice = unsafe { std::slice::from_raw_parts(mesh.triangles(), indices_count) };
            let indices: Vec<u32> = indices_slice
                .iter()
                .map(|index| (*index as u32) + *index_offset)
                .collect();
            buffer.indices.extend_from_slice(&indices);
            buffer.meshes.push(indices.len());
            *index_offset += (count / stride) as u32;
        }
        AttachmentType::Point => {}
        attachment_type => {
            error!("Unknown attachment type {:?}", attachment_type)
        }
    }
}
