use std::collections::BTreeMap;
use std::fmt;

use super::graph::{NodeId, SceneGraph};

/// Semantic name of an animated object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Handle {
    /// Group holding the globe, its atmosphere, markers and curve.
    Earth,
    /// The starfield.
    Star,
    /// The flight curve whose draw range is revealed.
    Curve,
    /// Surface markers at the route endpoints.
    Marker,
}

impl Handle {
    pub const ALL: [Handle; 4] = [Handle::Earth, Handle::Star, Handle::Curve, Handle::Marker];

    pub fn name(self) -> &'static str {
        match self {
            Handle::Earth => "earth",
            Handle::Star => "star",
            Handle::Curve => "curve",
            Handle::Marker => "marker",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps semantic names to the scene nodes the render loop mutates.
///
/// A name may cover several nodes (both route markers fade together).
/// Demos without a given object simply have no entry for it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimatedHandles {
    map: BTreeMap<Handle, Vec<NodeId>>,
}

impl AnimatedHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: Handle, id: NodeId) {
        self.map.entry(handle).or_default().push(id);
    }

    /// Nodes registered under `handle`, empty if none.
    pub fn get(&self, handle: Handle) -> &[NodeId] {
        self.map.get(&handle).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, handle: Handle) -> Option<NodeId> {
        self.get(handle).first().copied()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        !self.get(handle).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, NodeId)> + '_ {
        self.map
            .iter()
            .flat_map(|(&h, ids)| ids.iter().map(move |&id| (h, id)))
    }

    /// Every registered node, checked for reachability from the root.
    /// Returns the first handle that is not attached to the scene.
    pub fn find_detached(&self, scene: &SceneGraph) -> Option<(Handle, NodeId)> {
        self.iter().find(|&(_, id)| !scene.is_reachable(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::graph::Node;

    #[test]
    fn names_round_trip() {
        for handle in Handle::ALL {
            assert_eq!(Handle::from_name(handle.name()), Some(handle));
        }
        assert_eq!(Handle::from_name("moon"), None);
    }

    #[test]
    fn handles_collect_multiple_nodes() {
        let mut scene = SceneGraph::new();
        let a = scene.add(scene.root(), Node::group("from"));
        let b = scene.add(scene.root(), Node::group("to"));

        let mut handles = AnimatedHandles::new();
        handles.insert(Handle::Marker, a);
        handles.insert(Handle::Marker, b);

        assert_eq!(handles.get(Handle::Marker), &[a, b]);
        assert!(handles.get(Handle::Curve).is_empty());
        assert_eq!(handles.first(Handle::Marker), Some(a));
        assert!(handles.find_detached(&scene).is_none());
    }
}
