use glam::Vec3;
use crate::error::Error;
use crate::octree::octant_aabb;
use super::*;

fn scene_box() -> AABB {
    AABB::new(Vec3::splat(-5.0), Vec3::splat(5.0))
}

fn unit_cube_at(x: f32, y: f32, z: f32) -> AABB {
    AABB::from_center_half_extents(Vec3::new(x, y, z), Vec3::splat(0.5))
}

/// 4×4 grid of unit cubes, spacing 2, row-major (row = z, col = x).
fn grid_cube(index: u32) -> AABB {
    let row = (index / 4) as f32;
    let col = (index % 4) as f32;
    unit_cube_at(-3.0 + 2.0 * col, 0.0, -3.0 + 2.0 * row)
}

fn grid_octree() -> (LooseOctree, Vec<ObjectKey>) {
    let mut octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();
    let keys = (0..16).map(|i| octree.insert(i, grid_cube(i)).unwrap()).collect();
    (octree, keys)
}

fn instance_indices(octree: &LooseOctree, node: NodeIndex) -> Vec<u32> {
    octree
        .node(node)
        .unwrap()
        .objects()
        .iter()
        .map(|&key| octree.object(key).unwrap().instance_index())
        .collect()
}

/// Every object lies inside its own node and every ancestor up to the root.
fn assert_ancestors_contain(octree: &LooseOctree) {
    for (key, object) in octree.objects() {
        let mut node = Some(object.location().unwrap().node);
        let mut levels = 0;
        while let Some(index) = node {
            let current = octree.node(index).unwrap();
            assert!(
                current.bbox().contains(object.world_aabb()),
                "object {:?} escapes node {:?}", key, index
            );
            node = current.parent();
            levels += 1;
        }
        assert_eq!(levels, octree.node(object.location().unwrap().node).unwrap().depth() + 1);
    }
}

fn assert_slots_consistent(octree: &LooseOctree, node: NodeIndex) {
    for (slot, &key) in octree.node(node).unwrap().objects().iter().enumerate() {
        assert_eq!(
            octree.object(key).unwrap().location(),
            Some(ObjectLocation { node, slot })
        );
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_octree_is_single_leaf() {
    let octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();
    assert_eq!(octree.node_count(), 1);
    assert!(octree.root().is_leaf());
    assert!(octree.is_empty());
    assert_eq!(octree.root().parent(), None);
    assert!(octree.validate().is_ok());
}

#[test]
fn test_root_bounds_are_not_loosened() {
    let octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();
    assert_eq!(*octree.root_bounds(), scene_box());
    assert_eq!(*octree.root().octant(), scene_box());
}

#[test]
fn test_new_rejects_inverted_bounds() {
    let bounds = AABB::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 1.0, 1.0));
    let result = LooseOctree::new(bounds, OctreeConfig::default());
    assert!(matches!(result, Err(Error::InvalidBounds(_))));
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = OctreeConfig { loose_factor: 0.5, ..Default::default() };
    let result = LooseOctree::new(scene_box(), config);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

// ============================================================================
// Insert
// ============================================================================

#[test]
fn test_insert_out_of_bounds_rejected() {
    let mut octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();
    let result = octree.insert(0, unit_cube_at(4.8, 0.0, 0.0));
    assert!(matches!(result, Err(Error::OutOfBounds(_))));
    assert!(octree.is_empty());
}

#[test]
fn test_insert_invalid_aabb_rejected() {
    let mut octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();

    let nan = AABB::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ONE);
    assert!(matches!(octree.insert(0, nan), Err(Error::InvalidBounds(_))));

    let inverted = AABB::new(Vec3::ONE, Vec3::ZERO);
    assert!(matches!(octree.insert(1, inverted), Err(Error::InvalidBounds(_))));
    assert!(octree.is_empty());
}

#[test]
fn test_insert_up_to_count_threshold_stays_in_root() {
    let mut octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();
    for i in 0..4 {
        octree.insert(i, grid_cube(i)).unwrap();
    }

    assert_eq!(octree.node_count(), 1);
    assert_eq!(instance_indices(&octree, NodeIndex::ROOT), vec![0, 1, 2, 3]);
    assert_slots_consistent(&octree, NodeIndex::ROOT);
}

#[test]
fn test_insert_records_location() {
    let mut octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();
    let key = octree.insert(7, grid_cube(0)).unwrap();

    let object = octree.object(key).unwrap();
    assert_eq!(object.instance_index(), 7);
    assert_eq!(*object.world_aabb(), grid_cube(0));
    assert_eq!(object.location(), Some(ObjectLocation { node: NodeIndex::ROOT, slot: 0 }));
}

#[test]
fn test_fifth_insert_subdivides_root() {
    let mut octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();
    for i in 0..5 {
        octree.insert(i, grid_cube(i)).unwrap();
    }

    assert_eq!(octree.node_count(), 1 + CHILD_COUNT);
    assert!(!octree.root().is_leaf());
    assert!(octree.root().objects().is_empty());

    let child0 = octree.root().child(0).unwrap();
    let child1 = octree.root().child(1).unwrap();
    assert_eq!(instance_indices(&octree, child0), vec![0, 1, 4]);
    assert_eq!(instance_indices(&octree, child1), vec![2, 3]);
    assert!(octree.validate().is_ok());
}

#[test]
fn test_children_are_loosened_octants() {
    let (octree, _) = grid_octree();
    let root = octree.root();

    for (i, child) in root.children().enumerate() {
        let node = octree.node(child).unwrap();
        assert_eq!(node.parent(), Some(NodeIndex::ROOT));
        assert_eq!(node.depth(), 1);
        assert_eq!(*node.octant(), octant_aabb(&scene_box(), i as u8));
        assert_eq!(*node.bbox(), node.octant().loosened(1.5));
    }

    let child0 = octree.node(root.child(0).unwrap()).unwrap();
    assert_eq!(child0.bbox().min, Vec3::splat(-6.25));
    assert_eq!(child0.bbox().max, Vec3::splat(1.25));
}

#[test]
fn test_loose_factor_one_builds_plain_octree() {
    let config = OctreeConfig { loose_factor: 1.0, ..Default::default() };
    let mut octree = LooseOctree::new(scene_box(), config).unwrap();
    for i in 0..16 {
        octree.insert(i, grid_cube(i)).unwrap();
    }

    for child in octree.root().children() {
        let node = octree.node(child).unwrap();
        assert_eq!(node.bbox(), node.octant());
    }
    // Every cube crosses the y = 0 plane, so none fits a plain octant
    assert_eq!(octree.node_count(), 9);
    assert_eq!(octree.stats().straddler_count, 16);
    assert!(octree.validate().is_ok());
}

#[test]
fn test_grid_scenario_shape() {
    let (octree, _) = grid_octree();
    let root = octree.root();

    assert_eq!(octree.node_count(), 9);
    assert!(root.objects().is_empty());

    // Low-y children win ties over high-y ones (octant order)
    assert_eq!(instance_indices(&octree, root.child(0).unwrap()), vec![0, 1, 4, 5]);
    assert_eq!(instance_indices(&octree, root.child(1).unwrap()), vec![2, 3, 6, 7]);
    assert_eq!(instance_indices(&octree, root.child(4).unwrap()), vec![8, 9, 12, 13]);
    assert_eq!(instance_indices(&octree, root.child(5).unwrap()), vec![10, 11, 14, 15]);
    for i in [2, 3, 6, 7] {
        assert!(instance_indices(&octree, root.child(i).unwrap()).is_empty());
    }

    let stats = octree.stats();
    assert_eq!(stats, OctreeStats {
        node_count: 9,
        leaf_count: 8,
        max_depth: 1,
        object_count: 16,
        straddler_count: 0,
    });
    assert!(octree.validate().is_ok());
}

#[test]
fn test_every_object_contained_by_its_node() {
    let (octree, keys) = grid_octree();
    for key in keys {
        let object = octree.object(key).unwrap();
        let location = object.location().unwrap();
        let node = octree.node(location.node).unwrap();
        assert!(node.bbox().contains(object.world_aabb()));
        assert_eq!(node.objects()[location.slot], key);
    }
}

#[test]
fn test_loose_child_accepts_object_across_octant_border() {
    let (mut octree, _) = grid_octree();
    let key = octree.insert(16, AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5))).unwrap();

    let location = octree.object(key).unwrap().location().unwrap();
    assert_ne!(location.node, NodeIndex::ROOT);
    assert_eq!(octree.stats().straddler_count, 0);
}

#[test]
fn test_straddler_stays_on_internal_node() {
    let (mut octree, _) = grid_octree();
    let key = octree.insert(16, AABB::new(Vec3::splat(-2.0), Vec3::splat(2.0))).unwrap();

    let location = octree.object(key).unwrap().location().unwrap();
    assert_eq!(location.node, NodeIndex::ROOT);
    assert_eq!(octree.stats().straddler_count, 1);
    assert!(octree.validate().is_ok());
}

#[test]
fn test_max_depth_zero_never_subdivides() {
    let config = OctreeConfig { max_depth: 0, ..Default::default() };
    let mut octree = LooseOctree::new(scene_box(), config).unwrap();
    for i in 0..16 {
        octree.insert(i, grid_cube(i)).unwrap();
    }
    assert_eq!(octree.node_count(), 1);
    assert_eq!(octree.root().objects().len(), 16);
}

#[test]
fn test_size_threshold_blocks_subdivision() {
    let config = OctreeConfig { subdivide_size_threshold: 10.0, ..Default::default() };
    let mut octree = LooseOctree::new(scene_box(), config).unwrap();
    for i in 0..16 {
        octree.insert(i, grid_cube(i)).unwrap();
    }
    assert_eq!(octree.node_count(), 1);
}

#[test]
fn test_cascading_subdivision_stops_at_max_depth() {
    let config = OctreeConfig {
        subdivide_size_threshold: 0.0,
        max_depth: 3,
        ..Default::default()
    };
    let mut octree = LooseOctree::new(scene_box(), config).unwrap();
    let corner = AABB::from_center_half_extents(Vec3::splat(-4.9), Vec3::splat(0.005));
    for i in 0..50 {
        octree.insert(i, corner).unwrap();
    }

    let stats = octree.stats();
    assert_eq!(stats.max_depth, 3);
    assert_eq!(stats.node_count, 1 + 3 * CHILD_COUNT);
    assert_eq!(stats.object_count, 50);

    // All objects end up in the deepest first-octant leaf
    let mut node = NodeIndex::ROOT;
    for _ in 0..3 {
        node = octree.node(node).unwrap().child(0).unwrap();
    }
    assert_eq!(octree.node(node).unwrap().objects().len(), 50);
    assert!(octree.validate().is_ok());
    assert_ancestors_contain(&octree);
}

#[test]
fn test_ancestors_contain_objects_in_deep_tree() {
    let config = OctreeConfig { subdivide_size_threshold: 0.5, ..Default::default() };
    let mut octree = LooseOctree::new(scene_box(), config).unwrap();
    for i in 0..200u32 {
        let t = i as f32 * 0.37;
        let center = Vec3::new(4.0 * t.sin(), 4.0 * (t * 1.3).cos(), 4.0 * (t * 0.7).sin());
        octree.insert(i, AABB::from_center_half_extents(center, Vec3::splat(0.25))).unwrap();
    }

    assert!(octree.stats().max_depth >= 2);
    assert_ancestors_contain(&octree);
    assert!(octree.validate().is_ok());
}

// ============================================================================
// Remove
// ============================================================================

#[test]
fn test_remove_returns_instance_index() {
    let (mut octree, keys) = grid_octree();
    assert_eq!(octree.remove(keys[5]).unwrap(), 5);
    assert_eq!(octree.object_count(), 15);
    assert!(!octree.contains_object(keys[5]));
    assert!(octree.validate().is_ok());
}

#[test]
fn test_remove_twice_is_unknown_object() {
    let (mut octree, keys) = grid_octree();
    octree.remove(keys[0]).unwrap();
    assert!(matches!(octree.remove(keys[0]), Err(Error::UnknownObject(_))));
}

#[test]
fn test_remove_keeps_nodes() {
    let (mut octree, keys) = grid_octree();
    for key in keys {
        octree.remove(key).unwrap();
    }
    assert!(octree.is_empty());
    assert_eq!(octree.node_count(), 9);
    assert!(octree.validate().is_ok());
}

#[test]
fn test_remove_moves_last_object_into_freed_slot() {
    let mut octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();
    let keys: Vec<ObjectKey> = (0..3).map(|i| octree.insert(i, grid_cube(i)).unwrap()).collect();

    octree.remove(keys[0]).unwrap();

    assert_eq!(octree.root().objects(), &[keys[2], keys[1]]);
    assert_eq!(
        octree.object(keys[2]).unwrap().location(),
        Some(ObjectLocation { node: NodeIndex::ROOT, slot: 0 })
    );
    assert_slots_consistent(&octree, NodeIndex::ROOT);
}

// ============================================================================
// Attach / Detach
// ============================================================================

#[test]
fn test_detach_clears_location_and_fixes_swapped_slot() {
    let mut octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();
    let keys: Vec<ObjectKey> = (0..4).map(|i| octree.insert(i, grid_cube(i)).unwrap()).collect();

    octree.detach(NodeIndex::ROOT, keys[1]);

    assert_eq!(octree.object(keys[1]).unwrap().location(), None);
    assert_eq!(octree.root().objects(), &[keys[0], keys[3], keys[2]]);
    assert_slots_consistent(&octree, NodeIndex::ROOT);
}

#[test]
fn test_detach_last_object() {
    let mut octree = LooseOctree::new(scene_box(), OctreeConfig::default()).unwrap();
    let keys: Vec<ObjectKey> = (0..3).map(|i| octree.insert(i, grid_cube(i)).unwrap()).collect();

    octree.detach(NodeIndex::ROOT, keys[2]);

    assert_eq!(octree.root().objects(), &[keys[0], keys[1]]);
    assert_slots_consistent(&octree, NodeIndex::ROOT);
}

#[test]
fn test_detach_then_attach_restores_object_set() {
    let (mut octree, keys) = grid_octree();
    let node = octree.object(keys[6]).unwrap().location().unwrap().node;
    let mut before = octree.node(node).unwrap().objects().to_vec();

    octree.detach(node, keys[6]);
    assert_slots_consistent(&octree, node);
    octree.attach(node, keys[6]);
    assert_slots_consistent(&octree, node);

    let mut after = octree.node(node).unwrap().objects().to_vec();
    before.sort();
    after.sort();
    assert_eq!(before, after);
    assert!(octree.validate().is_ok());
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_detects_detached_object() {
    let (mut octree, keys) = grid_octree();
    let node = octree.object(keys[0]).unwrap().location().unwrap().node;
    octree.detach(node, keys[0]);

    assert!(matches!(octree.validate(), Err(Error::InconsistentIndex(_))));
}

#[test]
fn test_validate_detects_broken_back_reference() {
    let (mut octree, keys) = grid_octree();
    octree.objects[keys[0]].location = Some(ObjectLocation { node: NodeIndex::ROOT, slot: 3 });

    assert!(matches!(octree.validate(), Err(Error::InconsistentIndex(_))));
}

#[test]
fn test_validate_detects_uncontained_object() {
    let (mut octree, keys) = grid_octree();
    octree.objects[keys[0]].world_aabb = unit_cube_at(3.0, 0.0, 3.0);

    assert!(matches!(octree.validate(), Err(Error::InconsistentIndex(_))));
}

#[test]
fn test_validate_detects_object_escaping_ancestor() {
    let (mut octree, keys) = grid_octree();
    // Still inside child 0's loose box, but past the root's -x face
    octree.objects[keys[0]].world_aabb = unit_cube_at(-5.7, 0.0, -3.0);
    let node = octree.object(keys[0]).unwrap().location().unwrap().node;
    assert!(octree.node(node).unwrap().bbox().contains(octree.object(keys[0]).unwrap().world_aabb()));

    assert!(matches!(octree.validate(), Err(Error::InconsistentIndex(_))));
}
