//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and reference their children by index, either
//! another node or a primitive in a separate primitive arena. Splits are
//! chosen with a surface area heuristic over boxes sorted along the longest
//! axis of the parent's bounds.

use crate::{HitRecord, Hittable, Primitive, Ray};
use thiserror::Error;
use tracer_math::{Aabb, Interval};

/// Errors that can occur while building a BVH.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BvhError {
    #[error("primitive {index} has no bounding box")]
    MissingBoundingBox { index: usize },
}

pub type BvhResult<T> = Result<T, BvhError>;

/// Reference from a node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhChild {
    /// Index into the node arena.
    Node(usize),
    /// Index into the primitive arena. Single primitives are stored
    /// directly instead of being wrapped in their own node.
    Primitive(usize),
}

/// Internal node with two children.
#[derive(Debug, Clone, Copy)]
pub struct BvhNode {
    pub bbox: Aabb,
    pub left: BvhChild,
    pub right: BvhChild,
}

/// Binary BVH over a set of primitives.
pub struct Bvh<P = Primitive> {
    primitives: Vec<P>,
    boxes: Vec<Aabb>,
    nodes: Vec<BvhNode>,
    root: Option<BvhChild>,
}

impl<P: Hittable> Bvh<P> {
    /// Build a BVH from a list of primitives.
    ///
    /// Every primitive must report a bounding box. An empty list gives a BVH
    /// that every ray misses.
    pub fn new(primitives: Vec<P>) -> BvhResult<Self> {
        let boxes = primitives
            .iter()
            .enumerate()
            .map(|(index, p)| {
                p.bounding_box()
                    .ok_or(BvhError::MissingBoundingBox { index })
            })
            .collect::<BvhResult<Vec<_>>>()?;

        let mut nodes = Vec::with_capacity(primitives.len().saturating_sub(1));
        let mut indices: Vec<usize> = (0..primitives.len()).collect();
        let root = (!indices.is_empty()).then(|| build(&mut nodes, &boxes, &mut indices));

        let bvh = Self {
            primitives,
            boxes,
            nodes,
            root,
        };
        log::debug!(
            "Built BVH: {} primitives, {} nodes, depth {}",
            bvh.primitives.len(),
            bvh.nodes.len(),
            bvh.depth()
        );
        Ok(bvh)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> Option<BvhChild> {
        self.root
    }

    pub fn node(&self, index: usize) -> &BvhNode {
        &self.nodes[index]
    }

    pub fn primitives(&self) -> &[P] {
        &self.primitives
    }

    /// Number of levels from the root to the deepest primitive.
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |root| self.child_depth(root))
    }

    fn child_depth(&self, child: BvhChild) -> usize {
        match child {
            BvhChild::Primitive(_) => 1,
            BvhChild::Node(i) => {
                let node = &self.nodes[i];
                1 + self.child_depth(node.left).max(self.child_depth(node.right))
            }
        }
    }

    #[inline]
    fn hit_child<'a>(&'a self, child: BvhChild, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match child {
            BvhChild::Primitive(i) => self.primitives[i].hit(ray, ray_t),
            BvhChild::Node(i) => {
                let node = &self.nodes[i];
                if !node.bbox.hit(ray, ray_t) {
                    return None;
                }

                match self.hit_child(node.left, ray, ray_t) {
                    // Only check right up to the left hit; a right hit is closer
                    Some(left) => self
                        .hit_child(node.right, ray, ray_t.with_max(left.t))
                        .or(Some(left)),
                    None => self.hit_child(node.right, ray, ray_t),
                }
            }
        }
    }
}

impl<P: Hittable> Hittable for Bvh<P> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        self.root.and_then(|root| self.hit_child(root, ray, ray_t))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        match self.root? {
            BvhChild::Node(i) => Some(self.nodes[i].bbox),
            BvhChild::Primitive(i) => Some(self.boxes[i]),
        }
    }
}

/// Recursive BVH construction over a non-empty slice of primitive indices.
///
/// Children are pushed before their parent, so the root ends up last.
fn build(nodes: &mut Vec<BvhNode>, boxes: &[Aabb], indices: &mut [usize]) -> BvhChild {
    if let [only] = indices {
        return BvhChild::Primitive(*only);
    }

    let bounds = indices
        .iter()
        .fold(Aabb::EMPTY, |acc, &i| Aabb::surrounding(&acc, &boxes[i]));

    let axis = bounds.longest_axis();
    indices.sort_by(|&a, &b| boxes[a].axis_min(axis).total_cmp(&boxes[b].axis_min(axis)));

    let split = sah_split(boxes, indices);
    let (left_indices, right_indices) = indices.split_at_mut(split + 1);

    let left = build(nodes, boxes, left_indices);
    let right = build(nodes, boxes, right_indices);

    nodes.push(BvhNode {
        bbox: bounds,
        left,
        right,
    });
    BvhChild::Node(nodes.len() - 1)
}

/// Index of the last primitive in the left partition that minimizes
/// `n_left * area(left) + n_right * area(right)`.
///
/// `indices` must hold at least two entries, already sorted.
fn sah_split(boxes: &[Aabb], indices: &[usize]) -> usize {
    let n = indices.len();
    debug_assert!(n >= 2);

    let mut left_area = Vec::with_capacity(n);
    let mut acc = Aabb::EMPTY;
    for &i in indices {
        acc = Aabb::surrounding(&acc, &boxes[i]);
        left_area.push(acc.area());
    }

    let mut right_area = vec![0.0; n];
    acc = Aabb::EMPTY;
    for (k, &i) in indices.iter().enumerate().rev() {
        acc = Aabb::surrounding(&acc, &boxes[i]);
        right_area[k] = acc.area();
    }

    let mut best = 0;
    let mut best_cost = f32::INFINITY;
    for i in 0..n - 1 {
        let n_left = (i + 1) as f32;
        let n_right = (n - i - 1) as f32;
        let cost = n_left * left_area[i] + n_right * right_area[i + 1];
        if cost < best_cost {
            best_cost = cost;
            best = i;
        }
    }
    best
}
