/// PatchStreamer — quadtree-driven visibility and LOD streaming.
///
/// Node visibility, distance sorting and LOD assignment for large-world
/// content (foliage, terrain patches) run on a background worker while the
/// current frame submits GPU work against the *previous* frame's results.
/// The staleness is explicit and bounded: if the background pass is still
/// in flight when `update()` is called, the call is a no-op and the
/// previously published visible set stays untouched.

use std::sync::Arc;
use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::camera::CullVolume;
use crate::error::Result;
use crate::utils::BackgroundWorker;
use super::quad_tree::QuadTree;

/// Level of detail assigned to a visible node by camera distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchLod {
    /// Full geometry
    Near,
    /// Reduced geometry
    Mid,
    /// Impostor / billboard
    Far,
}

/// One visible quadtree leaf with its draw ordering distance and LOD.
#[derive(Debug, Clone, Copy)]
pub struct VisibleNode {
    /// Stable quadtree node id
    pub node_id: usize,
    /// Distance from the camera to the node center
    pub distance: f32,
    /// Assigned level of detail
    pub lod: PatchLod,
}

/// Streamed per-node content (planted foliage, terrain tile, ...).
#[derive(Debug, Clone)]
pub struct Patch {
    /// Quadtree node this patch belongs to
    pub node_id: usize,
    /// LOD the patch was created for
    pub lod: PatchLod,
    /// Number of planted instances
    pub instance_count: u32,
}

/// Creates per-node patches from the node's seed points.
///
/// Implementations are free to allocate GPU resources; a failure removes
/// the node's reservation and is logged, it never aborts the frame.
pub trait PatchFactory: Send + Sync {
    fn create_patch(&self, node_id: usize, lod: PatchLod, seeds: &[Vec3]) -> Result<Patch>;
}

/// Streaming configuration
#[derive(Debug, Clone)]
pub struct StreamerConfig {
    /// Maximum distance at which nodes are streamed in
    pub view_distance: f32,
    /// Nodes closer than this get `PatchLod::Near`
    pub near_distance: f32,
    /// Nodes closer than this (and beyond near) get `PatchLod::Mid`
    pub mid_distance: f32,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            view_distance: 400.0,
            near_distance: 50.0,
            mid_distance: 150.0,
        }
    }
}

/// Quadtree-driven streaming layer with a one-frame staleness contract.
pub struct PatchStreamer {
    tree: Arc<QuadTree>,
    config: StreamerConfig,
    factory: Arc<dyn PatchFactory>,
    /// Visible set consumed by the draw passes (one frame behind)
    published: Vec<VisibleNode>,
    /// Live patches keyed by quadtree node id
    patches: FxHashMap<usize, Patch>,
    /// Nodes with a patch creation in progress
    reservations: FxHashSet<usize>,
    /// In-flight background visibility pass, if any
    worker: Option<BackgroundWorker<Vec<VisibleNode>>>,
    /// Test-only gate: the next spawned worker blocks until it is released
    #[cfg(test)]
    worker_gate: Option<std::sync::mpsc::Receiver<()>>,
}

impl PatchStreamer {
    /// Create a streamer over a quadtree.
    pub fn new(tree: Arc<QuadTree>, factory: Arc<dyn PatchFactory>, config: StreamerConfig) -> Self {
        Self {
            tree,
            config,
            factory,
            published: Vec::new(),
            patches: FxHashMap::default(),
            reservations: FxHashSet::default(),
            worker: None,
            #[cfg(test)]
            worker_gate: None,
        }
    }

    /// Per-frame update: join the previous background pass and launch the
    /// next one.
    ///
    /// If the previous pass is still in flight this is a no-op — the draw
    /// passes keep consuming the previously published (stale) visible set.
    pub fn update(&mut self, camera_position: Vec3) -> Result<()> {
        if let Some(worker) = &mut self.worker {
            if worker.in_flight() {
                // Previous pass still running: reuse stale results
                return Ok(());
            }

            let finished = worker.try_join();
            self.worker = None;
            match finished {
                Some(visible) => self.publish(visible),
                None => {
                    crate::engine_warn!("nova3d::PatchStreamer",
                        "Background visibility pass produced no result");
                }
            }
        }

        self.launch(camera_position);
        Ok(())
    }

    /// Launch the background visibility/sorting/LOD pass.
    fn launch(&mut self, camera_position: Vec3) {
        let tree = Arc::clone(&self.tree);
        let config = self.config.clone();

        #[cfg(test)]
        let gate = self.worker_gate.take();

        self.worker = Some(BackgroundWorker::spawn(move || {
            #[cfg(test)]
            if let Some(gate) = gate {
                let _ = gate.recv();
            }

            Self::compute_visible(&tree, &config, camera_position)
        }));
    }

    /// Visibility computation run on the worker thread.
    fn compute_visible(
        tree: &QuadTree,
        config: &StreamerConfig,
        camera_position: Vec3,
    ) -> Vec<VisibleNode> {
        let volume = CullVolume::sphere(camera_position, config.view_distance);

        let mut visible: Vec<VisibleNode> = tree
            .nodes_in_volume(&volume)
            .into_iter()
            .filter(|&id| tree.node(id).is_leaf())
            .map(|id| {
                let distance = camera_position.distance(tree.node(id).aabb().center());
                let lod = if distance < config.near_distance {
                    PatchLod::Near
                } else if distance < config.mid_distance {
                    PatchLod::Mid
                } else {
                    PatchLod::Far
                };
                VisibleNode { node_id: id, distance, lod }
            })
            .collect();

        visible.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        visible
    }

    /// Transactionally adopt a finished visibility pass.
    ///
    /// Patches for nodes that left the visible set are dropped; nodes that
    /// entered it (or changed LOD) get a patch from the factory. A creation
    /// failure removes its reservation and logs — the node simply stays
    /// patchless until a later pass retries it.
    fn publish(&mut self, visible: Vec<VisibleNode>) {
        let mut retained = FxHashMap::default();
        for node in &visible {
            if let Some(patch) = self.patches.remove(&node.node_id) {
                if patch.lod == node.lod {
                    retained.insert(node.node_id, patch);
                    continue;
                }
                // LOD changed: fall through and recreate
            }

            if !self.reservations.insert(node.node_id) {
                continue;
            }

            let seeds = self.tree.node(node.node_id).points();
            match self.factory.create_patch(node.node_id, node.lod, seeds) {
                Ok(patch) => {
                    self.reservations.remove(&node.node_id);
                    retained.insert(node.node_id, patch);
                }
                Err(error) => {
                    self.reservations.remove(&node.node_id);
                    crate::engine_warn!("nova3d::PatchStreamer",
                        "Patch creation failed for node {}: {}", node.node_id, error);
                }
            }
        }

        self.patches = retained;
        self.published = visible;
    }

    // ===== ACCESSORS =====

    /// The published visible set (one frame behind the camera)
    pub fn visible_nodes(&self) -> &[VisibleNode] {
        &self.published
    }

    /// Whether a background pass is currently running
    pub fn in_flight(&self) -> bool {
        self.worker.as_ref().map(|w| w.in_flight()).unwrap_or(false)
    }

    /// Live patch for a node, if one exists
    pub fn patch(&self, node_id: usize) -> Option<&Patch> {
        self.patches.get(&node_id)
    }

    /// Number of live patches
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Install a gate the next worker blocks on (tests only)
    #[cfg(test)]
    pub(crate) fn set_worker_gate(&mut self, gate: std::sync::mpsc::Receiver<()>) {
        self.worker_gate = Some(gate);
    }

    /// Block until the in-flight pass (if any) finishes, without adopting
    /// its result (tests only — the next `update()` adopts it).
    #[cfg(test)]
    pub(crate) fn wait_for_worker(&self) {
        while self.in_flight() {
            std::thread::yield_now();
        }
    }
}

#[cfg(test)]
#[path = "streamer_tests.rs"]
mod tests;
