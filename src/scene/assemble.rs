//! Builds the scene for each progressive demo.

use glam::Vec3;

use crate::config::GeoglowConfig;
use crate::geo::{flight_curve, lat_lon_to_position};
use crate::geometry::{plane, sphere, star_field, torus, tube};
use crate::material::{hex, Blending, Material, PointsMaterial, Side};
use crate::mesh::Transform;

use super::graph::{Light, Node, NodeId, SceneGraph};
use super::handles::{AnimatedHandles, Handle};

pub const EARTH_RADIUS: f32 = 1.3;
pub const ATMOSPHERE_RADIUS: f32 = 1.5;
pub const STAR_COUNT: u32 = 500;
pub const STAR_SPREAD: f32 = 6.0;
const STAR_SEED: u32 = 0x5eed;
pub const CURVE_TUBULAR_SEGMENTS: u32 = 20;
pub const CURVE_RADIAL_SEGMENTS: u32 = 8;
const CURVE_RADIUS: f32 = 0.003;

/// Which scene a demo shows. Each one adds to the previous.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneKind {
    /// A green unit plane.
    Plane,
    /// A lit, textured globe inside a glowing atmosphere shell.
    Earth,
    /// The globe plus a starfield.
    Stars,
    /// The starfield globe plus route markers and a revealed flight curve.
    Flight,
}

/// A built scene and the nodes the render loop animates.
#[derive(Clone, Debug)]
pub struct Assembly {
    pub scene: SceneGraph,
    pub handles: AnimatedHandles,
}

/// Builds the scene for `kind`.
///
/// Objects that turn together (globe, atmosphere, markers, curve) share the
/// `earth` group; the starfield spins on its own and is a sibling of it.
/// Every handle is attached to the scene before this returns.
pub fn assemble(kind: SceneKind, config: &GeoglowConfig) -> Assembly {
    let mut scene = SceneGraph::new();
    let mut handles = AnimatedHandles::new();
    let root = scene.root();

    if kind == SceneKind::Plane {
        scene.add(
            root,
            Node::mesh(
                "plane",
                plane(1.0, 1.0),
                Material::basic(hex(0x00ff00)),
            ),
        );
        return finish(scene, handles);
    }

    scene.environment = config.assets.environment.clone();
    add_lights(&mut scene);

    let earth = scene.add(root, Node::group("earth"));
    handles.insert(Handle::Earth, earth);

    let mut globe = Material::standard(Vec3::ONE);
    if let Some(path) = &config.assets.earth_texture {
        globe = globe.map(path);
    }
    scene.add(
        earth,
        Node::mesh("globe", sphere(EARTH_RADIUS, 30, 30), globe),
    );
    scene.add(
        earth,
        Node::mesh(
            "atmosphere",
            sphere(ATMOSPHERE_RADIUS, 40, 40),
            Material::basic(hex(0x4b6cb7))
                .opacity(0.25)
                .side(Side::Back)
                .blending(Blending::Additive),
        ),
    );

    if matches!(kind, SceneKind::Stars | SceneKind::Flight) {
        let star = scene.add(
            root,
            Node::points(
                "stars",
                star_field(STAR_COUNT, STAR_SPREAD, STAR_SEED),
                PointsMaterial {
                    size: 0.05,
                    sprite: config.assets.star_sprite.clone(),
                    ..Default::default()
                },
            ),
        );
        handles.insert(Handle::Star, star);
    }

    if kind == SceneKind::Flight {
        add_route(&mut scene, &mut handles, earth, config);
    }

    finish(scene, handles)
}

fn add_lights(scene: &mut SceneGraph) {
    let root = scene.root();
    scene.add(
        root,
        Node::light(
            "ambient",
            Light::Ambient {
                color: Vec3::ONE,
                intensity: 0.25,
            },
        ),
    );
    scene.add(
        root,
        Node::light(
            "sun",
            Light::Directional {
                color: Vec3::ONE,
                intensity: 1.0,
            },
        )
        .with_transform(Transform::from_position(Vec3::new(2.65, 2.13, 1.02))),
    );
    scene.add(
        root,
        Node::light(
            "rim",
            Light::Point {
                color: hex(0x8ab4ff),
                intensity: 0.6,
            },
        )
        .with_transform(Transform::from_position(Vec3::new(-3.0, -1.5, -2.0))),
    );
}

fn add_route(
    scene: &mut SceneGraph,
    handles: &mut AnimatedHandles,
    earth: NodeId,
    config: &GeoglowConfig,
) {
    let from = lat_lon_to_position(config.route.from, EARTH_RADIUS);
    let to = lat_lon_to_position(config.route.to, EARTH_RADIUS);
    let marker_material = Material::basic(hex(0x56fbff))
        .opacity(1.0)
        .side(Side::Double);

    for (name, position) in [("marker from", from), ("marker to", to)] {
        let marker = scene.add(
            earth,
            Node::mesh(name, torus(0.02, 0.002, 20, 20), marker_material.clone())
                .with_transform(Transform::from_position(position).facing(position)),
        );
        handles.insert(Handle::Marker, marker);
    }

    let curve = flight_curve(from, to, EARTH_RADIUS);
    let mut node = Node::mesh(
        "curve",
        tube(
            &curve,
            CURVE_TUBULAR_SEGMENTS,
            CURVE_RADIUS,
            CURVE_RADIAL_SEGMENTS,
        ),
        Material::basic(hex(0x56fbff)).opacity(1.0),
    );
    if let Some(r) = node.renderable_mut() {
        r.draw_range = Some(0);
    }
    let curve = scene.add(earth, node);
    handles.insert(Handle::Curve, curve);
}

fn finish(scene: SceneGraph, handles: AnimatedHandles) -> Assembly {
    if let Some((handle, id)) = handles.find_detached(&scene) {
        // Every handle above is added under the root, so this is a bug.
        log::error!("handle {handle} ({id:?}) is not attached to the scene");
    }
    log::debug!("assembled scene with {} nodes", scene.len());
    Assembly { scene, handles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::graph::Payload;

    const ALL: [SceneKind; 4] = [
        SceneKind::Plane,
        SceneKind::Earth,
        SceneKind::Stars,
        SceneKind::Flight,
    ];

    #[test]
    fn every_handle_is_reachable() {
        for kind in ALL {
            let assembly = assemble(kind, &GeoglowConfig::default());
            for (handle, id) in assembly.handles.iter() {
                assert!(assembly.scene.is_reachable(id), "{kind:?}: {handle}");
            }
        }
    }

    #[test]
    fn plane_demo_has_no_handles() {
        let assembly = assemble(SceneKind::Plane, &GeoglowConfig::default());
        assert_eq!(assembly.handles.iter().count(), 0);
        let plane = assembly.scene.find("plane").unwrap();
        let material = &assembly.scene.node(plane).renderable().unwrap().material;
        assert_eq!(material.color, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(material.side, Side::Front);
    }

    #[test]
    fn markers_and_curve_share_the_earth_group() {
        let assembly = assemble(SceneKind::Flight, &GeoglowConfig::default());
        let scene = &assembly.scene;
        let earth = assembly.handles.first(Handle::Earth).unwrap();

        for &marker in assembly.handles.get(Handle::Marker) {
            assert_eq!(scene.node(marker).parent(), Some(earth));
        }
        let curve = assembly.handles.first(Handle::Curve).unwrap();
        assert_eq!(scene.node(curve).parent(), Some(earth));
        assert_eq!(assembly.handles.get(Handle::Marker).len(), 2);
    }

    #[test]
    fn stars_are_a_sibling_of_the_earth_group() {
        let assembly = assemble(SceneKind::Stars, &GeoglowConfig::default());
        let star = assembly.handles.first(Handle::Star).unwrap();
        assert_eq!(
            assembly.scene.node(star).parent(),
            Some(assembly.scene.root())
        );
        assert!(!assembly.handles.contains(Handle::Curve));
    }

    #[test]
    fn curve_starts_hidden_with_full_index_budget() {
        let assembly = assemble(SceneKind::Flight, &GeoglowConfig::default());
        let curve = assembly.handles.first(Handle::Curve).unwrap();
        let renderable = assembly.scene.node(curve).renderable().unwrap();
        assert_eq!(renderable.draw_range, Some(0));
        assert_eq!(renderable.geometry.index_count(), 960);
    }

    #[test]
    fn markers_sit_on_the_globe() {
        let assembly = assemble(SceneKind::Flight, &GeoglowConfig::default());
        for &marker in assembly.handles.get(Handle::Marker) {
            let p = assembly.scene.node(marker).transform.position;
            assert!((p.length() - EARTH_RADIUS).abs() < 1e-4);
        }
    }

    #[test]
    fn earth_scenes_are_lit() {
        let assembly = assemble(SceneKind::Earth, &GeoglowConfig::default());
        let mut lights = 0;
        assembly.scene.traverse_visible(|_, node, _| {
            if matches!(node.payload, Some(Payload::Light(_))) {
                lights += 1;
            }
        });
        assert_eq!(lights, 3);
    }
}
