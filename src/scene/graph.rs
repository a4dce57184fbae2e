//! Arena-backed scene graph.

use std::path::PathBuf;

use glam::{Mat4, Vec3};

use crate::geometry::{Geometry, PointCloud};
use crate::material::{Material, PointsMaterial};
use crate::mesh::Transform;

/// Index of a node in its [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A light source. Directional lights shine from the node's world position
/// toward the origin; point lights emit from the node's world position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient { color: Vec3, intensity: f32 },
    Directional { color: Vec3, intensity: f32 },
    Point { color: Vec3, intensity: f32 },
}

/// Triangle geometry with its material and an optional draw range.
#[derive(Clone, Debug, PartialEq)]
pub struct Renderable {
    pub geometry: Geometry,
    pub material: Material,
    /// Number of indices to draw from the start; `None` draws everything.
    pub draw_range: Option<u32>,
}

impl Renderable {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            draw_range: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointsRenderable {
    pub cloud: PointCloud,
    pub material: PointsMaterial,
}

/// What a node carries besides its transform.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Mesh(Renderable),
    Points(PointsRenderable),
    Light(Light),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub payload: Option<Payload>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// An empty group node.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            payload: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self::group(name).with_payload(Payload::Mesh(Renderable::new(geometry, material)))
    }

    pub fn points(name: impl Into<String>, cloud: PointCloud, material: PointsMaterial) -> Self {
        Self::group(name).with_payload(Payload::Points(PointsRenderable { cloud, material }))
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self::group(name).with_payload(Payload::Light(light))
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn renderable(&self) -> Option<&Renderable> {
        match &self.payload {
            Some(Payload::Mesh(r)) => Some(r),
            _ => None,
        }
    }

    pub fn renderable_mut(&mut self) -> Option<&mut Renderable> {
        match &mut self.payload {
            Some(Payload::Mesh(r)) => Some(r),
            _ => None,
        }
    }
}

/// A tree of nodes rooted at the scene node.
///
/// Nodes are owned by the graph and addressed by [`NodeId`]; a node's
/// parent owns it in the sense that it is drawn, and moved, with it.
/// Nodes are never removed.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    /// Cube faces for the background, +X, -X, +Y, -Y, +Z, -Z.
    pub environment: Option<Vec<PathBuf>>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::group("scene")],
            environment: None,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds `node` as the last child of `parent`.
    pub fn add(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// First node with `name`, in insertion order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// True if following parent links from `id` ends at the root.
    pub fn is_reachable(&self, id: NodeId) -> bool {
        let mut current = id;
        // A chain longer than the arena means a cycle.
        for _ in 0..self.nodes.len() {
            let Some(node) = self.get(current) else {
                return false;
            };
            match node.parent {
                None => return current == self.root(),
                Some(parent) => {
                    if !self.get(parent).is_some_and(|p| p.children.contains(&current)) {
                        return false;
                    }
                    current = parent;
                }
            }
        }
        false
    }

    /// World matrix of `id`: the product of every ancestor's local matrix.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = self.node(id);
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// Depth-first walk of visible nodes with their world matrices.
    ///
    /// Hidden nodes prune their whole subtree. Children are visited in
    /// insertion order, which is also the draw order.
    pub fn traverse_visible(&self, mut visit: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack = vec![(self.root(), Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = self.node(id);
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            visit(id, node, world);
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::plane;

    #[test]
    fn root_is_the_scene() {
        let graph = SceneGraph::new();
        assert_eq!(graph.node(graph.root()).name, "scene");
        assert!(graph.node(graph.root()).parent().is_none());
        assert!(graph.is_reachable(graph.root()));
    }

    #[test]
    fn group_rotation_propagates_to_children() {
        let mut graph = SceneGraph::new();
        let group = graph.add(graph.root(), Node::group("earth"));
        let child = graph.add(
            group,
            Node::group("marker").with_transform(Transform::from_position(Vec3::X)),
        );

        graph.node_mut(group).transform.rotation.y = std::f32::consts::FRAC_PI_2;
        let p = graph.world_matrix(child).transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn traversal_is_depth_first_in_insertion_order_and_skips_hidden() {
        let mut graph = SceneGraph::new();
        let a = graph.add(graph.root(), Node::group("a"));
        graph.add(a, Node::group("a1"));
        let hidden = graph.add(graph.root(), Node::group("hidden"));
        graph.add(hidden, Node::group("hidden child"));
        graph.add(graph.root(), Node::mesh("b", plane(1.0, 1.0), Material::default()));
        graph.node_mut(hidden).visible = false;

        let mut names = Vec::new();
        graph.traverse_visible(|_, node, _| names.push(node.name.clone()));
        assert_eq!(names, ["scene", "a", "a1", "b"]);
    }

    #[test]
    fn dangling_ids_are_unreachable() {
        let graph = SceneGraph::new();
        assert!(!graph.is_reachable(NodeId(42)));
    }
}
