use glam::{Mat4, Vec3};

use super::*;
use crate::error::KinematicsError;

crate::enum_keys! {
    enum Node {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
    }
}

crate::enum_keys! {
    enum Part {
        UPPER => "UPPER",
        LOWER => "LOWER",
    }
}

fn offset(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

/// A -> B -> C, plus D hanging off A
fn chain() -> Skeleton<Node, Part> {
    Skeleton::builder()
        .joint(Node::A, None)
        .joint(Node::B, Some(Node::A))
        .joint(Node::C, Some(Node::B))
        .joint(Node::D, Some(Node::A))
        .body(Part::UPPER, Node::B, ["upper.vtp"])
        .body(Part::LOWER, Node::C, ["lower.vtp", "lower_cap.vtp"])
        .build()
        .unwrap()
}

fn chain_pose() -> JointTransforms<Node> {
    let mut pose = JointTransforms::new();
    pose.insert(Node::A, offset(1.0, 0.0, 0.0));
    pose.insert(Node::B, offset(0.0, 2.0, 0.0) * Mat4::from_rotation_z(0.3));
    pose.insert(Node::C, offset(0.0, 0.0, 3.0));
    pose.insert(Node::D, Mat4::from_rotation_x(-0.8));
    pose
}

// ============================================================================
// Building
// ============================================================================

#[test]
fn build_orders_parents_before_children() {
    let skeleton = chain();
    assert_eq!(skeleton.root(), Node::A);
    assert_eq!(skeleton.joint_count(), 4);
    assert_eq!(skeleton.traversal_order(), &[Node::A, Node::B, Node::D, Node::C]);

    let ids: Vec<_> = skeleton.joints().map(|j| j.id()).collect();
    assert_eq!(ids, skeleton.traversal_order());
    assert_eq!(skeleton.joint(Node::C).unwrap().parent(), Some(Node::B));
}

#[test]
fn build_rejects_empty_skeleton() {
    let err = SkeletonBuilder::<Node, Part>::new().build().unwrap_err();
    assert_eq!(err, KinematicsError::EmptySkeleton);
}

#[test]
fn build_rejects_duplicate_joint() {
    let err = Skeleton::<Node, Part>::builder()
        .joint(Node::A, None)
        .joint(Node::B, Some(Node::A))
        .joint(Node::B, Some(Node::A))
        .build()
        .unwrap_err();
    assert_eq!(err, KinematicsError::DuplicateJoint("B"));
}

#[test]
fn build_rejects_unknown_parent() {
    let err = Skeleton::<Node, Part>::builder()
        .joint(Node::A, None)
        .joint(Node::B, Some(Node::C))
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        KinematicsError::UnknownParent {
            joint: "B",
            parent: "C"
        }
    );
}

#[test]
fn build_rejects_forest() {
    let err = Skeleton::<Node, Part>::builder()
        .joint(Node::A, None)
        .joint(Node::B, None)
        .joint(Node::C, Some(Node::A))
        .build()
        .unwrap_err();
    assert_eq!(err, KinematicsError::MultipleRoots(vec!["A", "B"]));
    assert_eq!(
        err.to_string(),
        r#"skeleton has 2 root joints, expected exactly one: ["A", "B"]"#
    );
}

#[test]
fn build_rejects_rootless_cycle() {
    let err = Skeleton::<Node, Part>::builder()
        .joint(Node::A, Some(Node::B))
        .joint(Node::B, Some(Node::A))
        .build()
        .unwrap_err();
    assert_eq!(err, KinematicsError::NoRoot);
}

#[test]
fn build_rejects_cycle_beside_root() {
    let err = Skeleton::<Node, Part>::builder()
        .joint(Node::A, None)
        .joint(Node::B, Some(Node::C))
        .joint(Node::C, Some(Node::B))
        .build()
        .unwrap_err();
    assert_eq!(err, KinematicsError::Cycle("B"));
}

#[test]
fn build_rejects_self_parent() {
    let err = Skeleton::<Node, Part>::builder()
        .joint(Node::A, None)
        .joint(Node::B, Some(Node::B))
        .build()
        .unwrap_err();
    assert_eq!(err, KinematicsError::Cycle("B"));
}

#[test]
fn build_rejects_body_on_unknown_joint() {
    let err = Skeleton::<Node, Part>::builder()
        .joint(Node::A, None)
        .body(Part::UPPER, Node::D, Vec::<&str>::new())
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        KinematicsError::UnknownBodyJoint {
            body: "UPPER",
            joint: "D"
        }
    );
}

#[test]
fn build_rejects_duplicate_body() {
    let err = Skeleton::<Node, Part>::builder()
        .joint(Node::A, None)
        .body(Part::UPPER, Node::A, ["a.vtp"])
        .body(Part::UPPER, Node::A, ["b.vtp"])
        .build()
        .unwrap_err();
    assert_eq!(err, KinematicsError::DuplicateBody("UPPER"));
}

#[test]
fn bodies_keep_their_geometries() {
    let skeleton = chain();
    let lower = skeleton.body(Part::LOWER).unwrap();
    assert_eq!(lower.joint(), Node::C);
    let sources: Vec<_> = lower.geometries().iter().map(|g| g.source()).collect();
    assert_eq!(sources, vec!["lower.vtp", "lower_cap.vtp"]);

    let ids: Vec<_> = skeleton.bodies().iter().map(|b| b.id()).collect();
    assert_eq!(ids, vec![Part::UPPER, Part::LOWER]);
}

// ============================================================================
// World transforms
// ============================================================================

#[test]
fn fresh_skeleton_resolves_to_identity() {
    let mut skeleton = chain();
    for (_, world) in skeleton.joint_world_transforms() {
        assert_eq!(*world, Mat4::IDENTITY);
    }
}

#[test]
fn world_is_parent_world_times_local() {
    let mut skeleton = chain();
    let pose = chain_pose();
    skeleton.set_pose(&pose).unwrap();

    let world = skeleton.joint_world_transforms().clone();
    assert_eq!(world.len(), 4);
    assert_eq!(world[&Node::B], world[&Node::A] * pose[&Node::B]);
    assert_eq!(world[&Node::C], world[&Node::B] * pose[&Node::C]);
    assert_eq!(world[&Node::D], world[&Node::A] * pose[&Node::D]);
}

#[test]
fn root_world_is_exactly_its_local() {
    let mut skeleton = chain();
    let local = Mat4::from_rotation_y(1.234) * offset(0.1, 0.2, 0.3);
    let mut pose = JointTransforms::new();
    pose.insert(Node::A, local);
    skeleton.set_pose(&pose).unwrap();

    let world = skeleton.world_transform(Node::A).unwrap();
    assert_eq!(world.to_cols_array(), local.to_cols_array());
}

#[test]
fn chain_composes_translations() {
    let mut skeleton = chain();
    let mut pose = JointTransforms::new();
    pose.insert(Node::A, offset(1.0, 0.0, 0.0));
    pose.insert(Node::B, offset(0.0, 2.0, 0.0));
    pose.insert(Node::C, offset(0.0, 0.0, 3.0));
    skeleton.set_pose(&pose).unwrap();

    let tip = skeleton.world_transform(Node::C).unwrap();
    let position = tip.transform_point3(Vec3::ZERO);
    assert!(position.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
}

#[test]
fn declaration_order_does_not_change_result() {
    let mut forward = chain();
    let mut reversed = Skeleton::<Node, Part>::builder()
        .joint(Node::D, Some(Node::A))
        .joint(Node::C, Some(Node::B))
        .joint(Node::B, Some(Node::A))
        .joint(Node::A, None)
        .build()
        .unwrap();

    let pose = chain_pose();
    forward.set_pose(&pose).unwrap();
    reversed.set_pose(&pose).unwrap();

    let a = forward.joint_world_transforms().clone();
    let b = reversed.joint_world_transforms().clone();
    for node in Node::ALL {
        assert_eq!(a[node], b[node], "{node}");
    }
}

#[test]
fn partial_pose_keeps_previous_locals() {
    let mut skeleton = chain();
    skeleton.set_pose(&chain_pose()).unwrap();

    let mut update = JointTransforms::new();
    update.insert(Node::C, offset(0.0, 0.0, -1.0));
    skeleton.set_pose(&update).unwrap();

    assert_eq!(
        skeleton.joint(Node::B).unwrap().local_transform(),
        chain_pose()[&Node::B]
    );
    assert_eq!(
        skeleton.joint(Node::C).unwrap().local_transform(),
        offset(0.0, 0.0, -1.0)
    );
}

#[test]
fn set_pose_with_unknown_joint_changes_nothing() {
    let mut skeleton = Skeleton::<Node, Part>::builder()
        .joint(Node::A, None)
        .joint(Node::B, Some(Node::A))
        .build()
        .unwrap();

    let mut pose = JointTransforms::new();
    pose.insert(Node::A, offset(5.0, 0.0, 0.0));
    pose.insert(Node::C, offset(1.0, 1.0, 1.0));

    let err = skeleton.set_pose(&pose).unwrap_err();
    assert_eq!(err, KinematicsError::UnknownJoint("C"));
    assert_eq!(skeleton.joint(Node::A).unwrap().local_transform(), Mat4::IDENTITY);
    assert_eq!(
        skeleton.world_transform(Node::D).unwrap_err(),
        KinematicsError::UnknownJoint("D")
    );
}

#[test]
fn new_pose_invalidates_cached_world() {
    let mut skeleton = chain();
    let before = skeleton.world_transform(Node::C).unwrap();
    assert_eq!(before, Mat4::IDENTITY);

    let mut pose = JointTransforms::new();
    pose.insert(Node::A, offset(0.0, 4.0, 0.0));
    skeleton.set_pose(&pose).unwrap();

    let after = skeleton.world_transform(Node::C).unwrap();
    assert_eq!(after, offset(0.0, 4.0, 0.0));
}

#[test]
fn resolve_leaves_skeleton_untouched() {
    let mut skeleton = chain();
    let pose = chain_pose();

    let resolved = skeleton.resolve(&pose).unwrap();
    assert_eq!(skeleton.joint(Node::B).unwrap().local_transform(), Mat4::IDENTITY);
    assert_eq!(skeleton.world_transform(Node::C).unwrap(), Mat4::IDENTITY);

    skeleton.set_pose(&pose).unwrap();
    assert_eq!(&resolved, skeleton.joint_world_transforms());
}

#[test]
fn resolve_fills_gaps_from_stored_locals() {
    let mut skeleton = chain();
    skeleton.set_pose(&chain_pose()).unwrap();

    let mut overlay = JointTransforms::new();
    overlay.insert(Node::C, Mat4::IDENTITY);
    let resolved = skeleton.resolve(&overlay).unwrap();

    let stored = skeleton.joint_world_transforms().clone();
    assert_eq!(resolved[&Node::B], stored[&Node::B]);
    assert_eq!(resolved[&Node::C], stored[&Node::B]);
}

#[test]
fn resolve_rejects_unknown_joint() {
    let skeleton = Skeleton::<Node, Part>::builder()
        .joint(Node::A, None)
        .build()
        .unwrap();
    let mut pose = JointTransforms::new();
    pose.insert(Node::B, Mat4::IDENTITY);
    assert_eq!(
        skeleton.resolve(&pose).unwrap_err(),
        KinematicsError::UnknownJoint("B")
    );
}

#[test]
fn body_transforms_follow_their_joints() {
    let mut skeleton = chain();
    skeleton.set_pose(&chain_pose()).unwrap();
    let world = skeleton.joint_world_transforms().clone();

    let placed = skeleton.body_transforms();
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0].body, Part::UPPER);
    assert_eq!(placed[0].joint, Node::B);
    assert_eq!(placed[0].world, world[&Node::B]);
    assert_eq!(placed[1].body, Part::LOWER);
    assert_eq!(placed[1].world, world[&Node::C]);
    assert_eq!(placed[1].geometries.len(), 2);
}
