/// ResourceRequestQueue — batched GPU resource allocation.
///
/// Subsystems submit buffer/texture allocation requests from any thread;
/// the actual GPU creation step runs on the frame loop and is explicitly
/// single-flight: an atomic guard prevents two `create_resources` passes
/// from mutating the resource table concurrently (the second call simply
/// returns without doing work).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::device::{Buffer, BufferDesc, Device, Texture, TextureDesc};
use crate::error::Result;

/// A pending allocation request.
///
/// Requests carry a group id so related allocations (one mesh's buffers,
/// one terrain tile's textures) are created and reported together.
pub enum ResourceRequest {
    VertexBuffer { group: u32, desc: BufferDesc },
    IndexBuffer { group: u32, desc: BufferDesc },
    ConstantBuffer { group: u32, size: u64 },
    Texture { group: u32, desc: TextureDesc },
}

impl ResourceRequest {
    fn group(&self) -> u32 {
        match self {
            ResourceRequest::VertexBuffer { group, .. } => *group,
            ResourceRequest::IndexBuffer { group, .. } => *group,
            ResourceRequest::ConstantBuffer { group, .. } => *group,
            ResourceRequest::Texture { group, .. } => *group,
        }
    }
}

/// A created GPU resource, retained under its request's group id.
pub enum CreatedResource {
    Buffer(Arc<dyn Buffer>),
    Texture(Arc<dyn Texture>),
}

/// Thread-safe allocation request queue with single-flight creation.
pub struct ResourceRequestQueue {
    /// Pending requests (submitted from any thread)
    pending: Mutex<VecDeque<ResourceRequest>>,
    /// Created resources by group id
    created: Mutex<FxHashMap<u32, Vec<CreatedResource>>>,
    /// Single-flight guard for create_resources
    creating: AtomicBool,
}

impl ResourceRequestQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            created: Mutex::new(FxHashMap::default()),
            creating: AtomicBool::new(false),
        }
    }

    /// Submit an allocation request (any thread)
    pub fn submit(&self, request: ResourceRequest) {
        self.pending.lock().unwrap().push_back(request);
    }

    /// Number of requests waiting for creation
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Create all pending resources on the device.
    ///
    /// Single-flight: if another creation pass is already running, returns
    /// `Ok(0)` without touching the queue. Failures are logged with their
    /// group id and position in the batch, then propagated — the caller
    /// treats this as fatal for the batch; already-created resources of the
    /// batch stay registered.
    pub fn create_resources(&self, device: &mut dyn Device) -> Result<usize> {
        if self.creating.swap(true, Ordering::AcqRel) {
            // Another pass is mutating the resource table
            return Ok(0);
        }

        let result = self.create_locked(device);
        self.creating.store(false, Ordering::Release);
        result
    }

    fn create_locked(&self, device: &mut dyn Device) -> Result<usize> {
        let batch: Vec<ResourceRequest> = {
            let mut pending = self.pending.lock().unwrap();
            pending.drain(..).collect()
        };

        let total = batch.len();
        for (index, request) in batch.into_iter().enumerate() {
            let group = request.group();

            let created = match request {
                ResourceRequest::VertexBuffer { desc, .. } => {
                    device.create_vertex_buffer(desc).map(CreatedResource::Buffer)
                }
                ResourceRequest::IndexBuffer { desc, .. } => {
                    device.create_index_buffer(desc).map(CreatedResource::Buffer)
                }
                ResourceRequest::ConstantBuffer { size, .. } => {
                    device.create_constant_buffer(size).map(CreatedResource::Buffer)
                }
                ResourceRequest::Texture { desc, .. } => {
                    device.create_texture(desc).map(CreatedResource::Texture)
                }
            };

            match created {
                Ok(resource) => {
                    self.created.lock().unwrap().entry(group).or_default().push(resource);
                }
                Err(error) => {
                    crate::engine_error!("nova3d::ResourceRequestQueue",
                        "Resource creation failed (group {}, request {}/{}): {}",
                        group, index + 1, total, error);
                    return Err(error);
                }
            }
        }

        Ok(total)
    }

    /// Resources created under a group id
    pub fn take_group(&self, group: u32) -> Vec<CreatedResource> {
        self.created.lock().unwrap().remove(&group).unwrap_or_default()
    }

    /// Number of groups with created resources awaiting pickup
    pub fn created_group_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

impl Default for ResourceRequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "request_queue_tests.rs"]
mod tests;
