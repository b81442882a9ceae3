use glam::Vec3;
use super::*;

fn cube(min: f32, max: f32) -> AABB {
    AABB::new(Vec3::splat(min), Vec3::splat(max))
}

// ============================================================================
// NodeIndex
// ============================================================================

#[test]
fn test_root_index() {
    assert_eq!(NodeIndex::ROOT.index(), 0);
    assert_eq!(NodeIndex(42).index(), 42);
}

// ============================================================================
// OctreeNode
// ============================================================================

#[test]
fn test_new_node_is_empty_leaf() {
    let node = OctreeNode::new(cube(-1.0, 1.0), cube(-1.5, 1.5), None, 0);
    assert!(node.is_leaf());
    assert!(node.objects().is_empty());
    assert_eq!(node.parent(), None);
    assert_eq!(node.depth(), 0);
    assert_eq!(node.child(0), None);
    assert_eq!(node.children().count(), 0);
}

#[test]
fn test_box_size_uses_loose_bbox() {
    let node = OctreeNode::new(cube(-1.0, 1.0), cube(-1.5, 1.5), Some(NodeIndex::ROOT), 1);
    assert_eq!(node.box_size(), 3.0);
    assert_eq!(*node.octant(), cube(-1.0, 1.0));
    assert_eq!(*node.bbox(), cube(-1.5, 1.5));
}

#[test]
fn test_children_are_contiguous() {
    let mut node = OctreeNode::new(cube(-1.0, 1.0), cube(-1.0, 1.0), None, 0);
    node.first_child = Some(NodeIndex(9));

    assert!(!node.is_leaf());
    assert_eq!(node.child(0), Some(NodeIndex(9)));
    assert_eq!(node.child(7), Some(NodeIndex(16)));

    let children: Vec<NodeIndex> = node.children().collect();
    assert_eq!(children.len(), CHILD_COUNT);
    assert_eq!(children[3], NodeIndex(12));
}

// ============================================================================
// Subdivision
// ============================================================================

#[test]
fn test_octant_aabb_bit_layout() {
    let parent = cube(0.0, 2.0);

    assert_eq!(octant_aabb(&parent, 0), cube(0.0, 1.0));
    assert_eq!(octant_aabb(&parent, 7), cube(1.0, 2.0));

    // bit0 = x
    let x_high = octant_aabb(&parent, 1);
    assert_eq!(x_high.min, Vec3::new(1.0, 0.0, 0.0));
    // bit1 = y
    let y_high = octant_aabb(&parent, 2);
    assert_eq!(y_high.min, Vec3::new(0.0, 1.0, 0.0));
    // bit2 = z
    let z_high = octant_aabb(&parent, 4);
    assert_eq!(z_high.min, Vec3::new(0.0, 0.0, 1.0));
}

#[test]
fn test_subdivide_box_x_varies_fastest() {
    let parent = AABB::new(Vec3::ZERO, Vec3::new(4.0, 2.0, 6.0));
    let octants = subdivide_box(&parent);

    let offsets: Vec<Vec3> = octants.iter().map(|o| o.min).collect();
    assert_eq!(offsets, vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(2.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 3.0),
        Vec3::new(2.0, 0.0, 3.0),
        Vec3::new(0.0, 1.0, 3.0),
        Vec3::new(2.0, 1.0, 3.0),
    ]);

    for octant in &octants {
        assert_eq!(octant.size(), Vec3::new(2.0, 1.0, 3.0));
        assert!(parent.contains(octant));
    }
}

#[test]
fn test_subdivide_box_covers_parent_volume() {
    let parent = AABB::new(Vec3::new(-3.0, 1.0, -7.0), Vec3::new(5.0, 2.0, 1.0));
    let total: f32 = subdivide_box(&parent)
        .iter()
        .map(|o| o.size().x * o.size().y * o.size().z)
        .sum();
    let size = parent.size();
    assert!((total - size.x * size.y * size.z).abs() < 1e-4);
}
