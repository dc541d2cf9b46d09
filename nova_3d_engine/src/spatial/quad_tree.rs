/// QuadTree — static spatial partition for culling and streaming.
///
/// Partitions a world-space AABB into a 4-way hierarchy over the X/Z plane
/// (each node keeps the full Y extent of its parent). The tree is complete:
/// all nodes of every level are pre-allocated in a flat array, so node ids
/// (array indices) are stable for the tree's lifetime and dependent
/// subsystems can key per-node data on them.
///
/// Build once, query many: there are no mutation operations after
/// construction.

use glam::Vec3;
use crate::camera::{Containment, CullVolume};
use crate::scene::AABB;

/// The root always sits at slot 0 of the flat node array.
const ROOT: usize = 0;

/// Children smaller than this extent along X or Z are never created.
const MIN_NODE_EXTENT: f32 = 1e-3;

/// A single node in the quadtree.
pub struct QuadTreeNode {
    /// World-space AABB of this node
    aabb: AABB,
    /// Index of the first child in the flat array (0 = leaf)
    first_child: usize,
    /// Seed points assigned to this node (leaves only)
    points: Vec<Vec3>,
}

impl QuadTreeNode {
    /// World-space bounds of this node
    pub fn aabb(&self) -> &AABB {
        &self.aabb
    }

    /// Whether this node is terminal
    pub fn is_leaf(&self) -> bool {
        self.first_child == 0
    }

    /// Seed points contained in this node (empty for internal nodes)
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

/// Static quadtree spatial partition.
pub struct QuadTree {
    /// Flat array of all nodes (pre-allocated, complete tree)
    nodes: Vec<QuadTreeNode>,
    /// Number of node levels (1 = root only)
    levels: u32,
    /// Pre-computed subtree sizes indexed by remaining levels below a node.
    /// subtree_sizes[d] = total node count of a subtree spanning d+1 levels.
    subtree_sizes: Vec<usize>,
}

impl QuadTree {
    /// Number of levels needed so leaves are roughly `node_size` across:
    /// `max(1, log2(extent / node_size))`.
    ///
    /// Degenerate inputs (non-positive extent or node size) yield 1.
    pub fn levels_for(extent: f32, node_size: f32) -> u32 {
        if extent <= 0.0 || node_size <= 0.0 || extent <= node_size {
            return 1;
        }
        ((extent / node_size).log2() as u32).max(1)
    }

    /// Build a quadtree over `bounds` with the given number of levels.
    ///
    /// `points` are distributed into the leaves containing them (X/Z test);
    /// points outside the bounds are assigned to the nearest edge leaf by
    /// clamping. A degenerate (zero-extent) bounds yields a single node
    /// with `levels = 1`.
    pub fn build(bounds: AABB, levels: u32, points: &[Vec3]) -> Self {
        let extent = bounds.extent();

        let mut levels = levels.max(1);
        if extent.x <= MIN_NODE_EXTENT || extent.z <= MIN_NODE_EXTENT {
            levels = 1;
        }

        // Clamp levels so no leaf goes below the minimum extent
        while levels > 1 {
            let divisions = (levels - 1) as i32;
            let leaf_x = extent.x / (1u32 << divisions) as f32;
            let leaf_z = extent.z / (1u32 << divisions) as f32;
            if leaf_x >= MIN_NODE_EXTENT && leaf_z >= MIN_NODE_EXTENT {
                break;
            }
            levels -= 1;
        }

        let total_nodes = Self::total_node_count(levels);
        let mut nodes = Vec::with_capacity(total_nodes);
        Self::build_recursive(&mut nodes, &bounds, 1, levels);
        debug_assert_eq!(nodes.len(), total_nodes);

        let subtree_sizes: Vec<usize> =
            (1..=levels).map(Self::total_node_count).collect();

        let mut tree = Self { nodes, levels, subtree_sizes };
        for &point in points {
            let leaf = tree.leaf_containing(point);
            tree.nodes[leaf].points.push(point);
        }
        tree
    }

    /// Build with leaf size instead of explicit levels.
    ///
    /// Levels are derived from the larger horizontal extent via `levels_for`.
    pub fn with_leaf_size(bounds: AABB, node_size: f32, points: &[Vec3]) -> Self {
        let extent = bounds.extent();
        let levels = Self::levels_for(extent.x.max(extent.z), node_size);
        Self::build(bounds, levels, points)
    }

    /// Total node count of a complete 4-way tree with `levels` levels:
    /// (4^levels - 1) / 3.
    fn total_node_count(levels: u32) -> usize {
        let mut count = 0usize;
        let mut level_count = 1usize;
        for _ in 0..levels {
            count += level_count;
            level_count *= 4;
        }
        count
    }

    /// Recursively build the flat node array (depth-first).
    fn build_recursive(nodes: &mut Vec<QuadTreeNode>, aabb: &AABB, level: u32, levels: u32) {
        let node_index = nodes.len();

        nodes.push(QuadTreeNode {
            aabb: *aabb,
            first_child: 0,
            points: Vec::new(),
        });

        if level >= levels {
            return;
        }

        let center = aabb.center();
        let first_child = nodes.len();
        nodes[node_index].first_child = first_child;

        for quadrant in 0..4u8 {
            let child_aabb = Self::quadrant_aabb(aabb, &center, quadrant);
            Self::build_recursive(nodes, &child_aabb, level + 1, levels);
        }
    }

    /// Compute the AABB of a specific quadrant (0–3).
    ///
    /// Quadrant bit layout: bit0 = X, bit1 = Z (0 = low, 1 = high).
    /// The Y extent is inherited from the parent — children partition the
    /// parent box exactly, without gaps or overlap.
    fn quadrant_aabb(parent: &AABB, center: &Vec3, quadrant: u8) -> AABB {
        AABB {
            min: Vec3::new(
                if quadrant & 1 == 0 { parent.min.x } else { center.x },
                parent.min.y,
                if quadrant & 2 == 0 { parent.min.z } else { center.z },
            ),
            max: Vec3::new(
                if quadrant & 1 == 0 { center.x } else { parent.max.x },
                parent.max.y,
                if quadrant & 2 == 0 { center.z } else { parent.max.z },
            ),
        }
    }

    /// Determine which quadrant a point falls into relative to a center.
    fn point_quadrant(center: &Vec3, point: &Vec3) -> u8 {
        ((point.x >= center.x) as u8) | (((point.z >= center.z) as u8) << 1)
    }

    /// Offset of quadrant `i`'s subtree in the depth-first node layout.
    fn subtree_offset(&self, quadrant: u8, remaining_levels: u32) -> usize {
        quadrant as usize * self.subtree_sizes[remaining_levels as usize - 1]
    }

    /// Index of the leaf whose X/Z footprint contains `point`.
    ///
    /// Points outside the root bounds land in the nearest edge leaf.
    fn leaf_containing(&self, point: Vec3) -> usize {
        let clamped = self.nodes[ROOT].aabb.closest_point(point);

        let mut node_idx = ROOT;
        let mut level = 1;
        while level < self.levels {
            let first_child = self.nodes[node_idx].first_child;
            if first_child == 0 {
                break;
            }
            let center = self.nodes[node_idx].aabb.center();
            let quadrant = Self::point_quadrant(&center, &clamped);
            node_idx = first_child + self.subtree_offset(quadrant, self.levels - level);
            level += 1;
        }
        node_idx
    }

    // ===== ACCESSORS =====

    /// Number of node levels (1 = root only)
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A node by its stable id
    pub fn node(&self, id: usize) -> &QuadTreeNode {
        &self.nodes[id]
    }

    /// World-space bounds of the whole tree
    pub fn bounds(&self) -> &AABB {
        &self.nodes[ROOT].aabb
    }

    // ===== QUERIES =====

    /// Ids of all nodes whose bounding box is not disjoint from `volume`.
    ///
    /// Internal nodes are reported along with their descendants; a node
    /// classified `Contains` short-circuits per-child tests for its whole
    /// subtree.
    pub fn nodes_in_volume(&self, volume: &CullVolume) -> Vec<usize> {
        let mut results = Vec::new();
        let classification = volume.classify_aabb(&self.nodes[ROOT].aabb);
        self.query_recursive(ROOT, volume, classification, &mut results, 1);
        results
    }

    fn query_recursive(
        &self,
        node_idx: usize,
        volume: &CullVolume,
        classification: Containment,
        results: &mut Vec<usize>,
        level: u32,
    ) {
        match classification {
            Containment::Disjoint => {}

            Containment::Contains => {
                // Entire subtree is inside the volume
                self.collect_subtree(node_idx, results, level);
            }

            Containment::Intersects => {
                results.push(node_idx);

                if level < self.levels {
                    let first_child = self.nodes[node_idx].first_child;
                    if first_child != 0 {
                        for quadrant in 0..4u8 {
                            let child_idx = first_child
                                + self.subtree_offset(quadrant, self.levels - level);
                            let child_class =
                                volume.classify_aabb(&self.nodes[child_idx].aabb);
                            self.query_recursive(
                                child_idx, volume, child_class, results, level + 1,
                            );
                        }
                    }
                }
            }
        }
    }

    /// Collect a node and its entire subtree without further volume tests.
    fn collect_subtree(&self, node_idx: usize, results: &mut Vec<usize>, level: u32) {
        results.push(node_idx);

        if level < self.levels {
            let first_child = self.nodes[node_idx].first_child;
            if first_child != 0 {
                for quadrant in 0..4u8 {
                    let child_idx =
                        first_child + self.subtree_offset(quadrant, self.levels - level);
                    self.collect_subtree(child_idx, results, level + 1);
                }
            }
        }
    }

    /// Ids of all terminal nodes.
    ///
    /// Used once at initialization to seed per-node data (foliage patches,
    /// terrain patches).
    pub fn leaf_nodes(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_leaf())
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
#[path = "quad_tree_tests.rs"]
mod tests;
