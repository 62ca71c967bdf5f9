use super::*;
use crate::node::{tags, NodeKind, NodeStatus};

fn attached_root() -> (NodeTree, NodeId) {
    let mut tree = NodeTree::new();
    let root = tree.spawn_frame(tags::ROOT);
    tree.attach_to_main_tree(root, true, Some(1));
    (tree, root)
}

fn frame_with_exit_transition(tree: &mut NodeTree, tag: &str) -> NodeId {
    let id = tree.spawn_frame(tag);
    tree.frame_mut(id).unwrap().disappear_transition = true;
    id
}

#[test]
fn add_child_links_parent_depth_and_attachment() {
    let (mut tree, root) = attached_root();
    let column = tree.spawn_frame(tags::COLUMN);
    let text = tree.spawn_frame(tags::TEXT);
    tree.append_child(column, text).unwrap();
    assert_eq!(tree.depth(text), Some(1));
    assert!(!tree.is_on_main_tree(text));

    tree.append_child(root, column).unwrap();
    assert_eq!(tree.parent(column), Some(root));
    assert_eq!(tree.depth(column), Some(1));
    assert_eq!(tree.depth(text), Some(2));
    assert!(tree.is_on_main_tree(text));
    assert_eq!(tree.node(text).unwrap().context(), Some(1));
}

#[test]
fn add_child_honours_slot_and_ignores_duplicates() {
    let (mut tree, root) = attached_root();
    let a = tree.spawn_frame("a");
    let b = tree.spawn_frame("b");
    let c = tree.spawn_frame("c");
    tree.append_child(root, a).unwrap();
    tree.append_child(root, b).unwrap();
    tree.add_child(root, c, Some(0), AddChildOptions::default()).unwrap();
    tree.add_child(root, a, Some(2), AddChildOptions::default()).unwrap();
    assert_eq!(tree.children(root), vec![c, a, b]);

    let d = tree.spawn_frame("d");
    tree.add_child(root, d, Some(99), AddChildOptions::default()).unwrap();
    assert_eq!(tree.child_at(root, 3), Some(d));
}

#[test]
fn add_child_after_and_before_sibling() {
    let (mut tree, root) = attached_root();
    let a = tree.spawn_frame("a");
    let b = tree.spawn_frame("b");
    let c = tree.spawn_frame("c");
    let d = tree.spawn_frame("d");
    tree.append_child(root, a).unwrap();
    tree.append_child(root, b).unwrap();
    tree.add_child_after(root, c, a).unwrap();
    tree.add_child_before(root, d, a).unwrap();
    assert_eq!(tree.children(root), vec![d, a, c, b]);
}

#[test]
fn modal_child_blocks_plain_insertions_until_removed() {
    let (mut tree, root) = attached_root();
    let sheet = tree.spawn_frame(tags::SHEET_PAGE);
    tree.add_modal_child(root, sheet).unwrap();
    let before = tree.children(root);

    let other = tree.spawn_frame(tags::TEXT);
    assert_eq!(
        tree.append_child(root, other),
        Err(RejectReason::ModalExclusive { parent: root })
    );
    assert_eq!(tree.children(root), before);
    assert_eq!(tree.parent(other), None);

    tree.remove_child(root, sheet, false);
    assert!(tree.append_child(root, other).is_ok());
}

#[test]
fn cycles_are_rejected() {
    let (mut tree, root) = attached_root();
    let column = tree.spawn_frame(tags::COLUMN);
    tree.append_child(root, column).unwrap();
    assert_eq!(
        tree.append_child(column, root),
        Err(RejectReason::WouldCycle {
            parent: column,
            child: root
        })
    );
    assert_eq!(
        tree.append_child(column, column),
        Err(RejectReason::WouldCycle {
            parent: column,
            child: column
        })
    );
    assert_eq!(tree.append_child(root, 999), Err(RejectReason::Missing { id: 999 }));
}

#[test]
fn immediate_removal_destroys_unretained_subtree() {
    let (mut tree, root) = attached_root();
    let column = tree.spawn_frame(tags::COLUMN);
    let text = tree.spawn_frame(tags::TEXT);
    tree.append_child(column, text).unwrap();
    tree.append_child(root, column).unwrap();

    assert_eq!(tree.remove_child(root, column, false), Some(0));
    assert!(!tree.contains(column));
    assert!(!tree.contains(text));
    assert_eq!(tree.remove_child(root, column, false), None);
}

#[test]
fn retained_node_survives_removal_and_can_be_reparented() {
    let (mut tree, root) = attached_root();
    let a = tree.spawn_frame("a");
    let b = tree.spawn_frame("b");
    tree.append_child(root, a).unwrap();
    tree.append_child(root, b).unwrap();
    tree.retain(b);
    tree.remove_child(root, b, false);
    assert!(tree.contains(b));
    assert_eq!(tree.parent(b), None);
    assert!(!tree.is_on_main_tree(b));

    tree.append_child(a, b).unwrap();
    assert_eq!(tree.depth(b), Some(2));
    assert!(tree.is_on_main_tree(b));
    tree.release(b);
    assert!(tree.contains(b));
}

#[test]
fn removal_with_exit_transition_parks_child_until_finished() {
    let (mut tree, root) = attached_root();
    let a = tree.spawn_frame("a");
    let column = frame_with_exit_transition(&mut tree, tags::COLUMN);
    let b = tree.spawn_frame("b");
    for child in [a, column, b] {
        tree.append_child(root, child).unwrap();
    }

    assert_eq!(tree.remove_child(root, column, true), Some(1));
    assert_eq!(tree.children(root), vec![a, b]);
    assert_eq!(
        tree.disappearing_children(root),
        vec![DisappearingChild {
            node: column,
            index: 1
        }]
    );
    assert!(tree.is_disappearing(column));
    assert_eq!(tree.parent(column), Some(root));
    assert!(!tree.is_on_main_tree(column));
    assert_eq!(tree.visible_frames_with_transition(root), vec![a, column, b]);

    assert!(tree.transition_out_finished(column));
    assert!(!tree.contains(column));
    assert!(tree.disappearing_children(root).is_empty());
    assert_eq!(tree.visible_frames_with_transition(root), vec![a, b]);
}

#[test]
fn started_exit_transitions_are_reported_once() {
    let (mut tree, root) = attached_root();
    let column = frame_with_exit_transition(&mut tree, tags::COLUMN);
    let plain = tree.spawn_frame("plain");
    tree.append_child(root, column).unwrap();
    tree.append_child(root, plain).unwrap();

    tree.remove_child(root, column, true);
    tree.remove_child(root, plain, true);
    assert_eq!(tree.take_exit_transitions(), vec![column]);
    assert!(tree.take_exit_transitions().is_empty());
}

#[test]
fn removal_without_transition_ignores_exit_effect() {
    let (mut tree, root) = attached_root();
    let column = frame_with_exit_transition(&mut tree, tags::COLUMN);
    tree.append_child(root, column).unwrap();
    tree.remove_child(root, column, false);
    assert!(!tree.contains(column));
    assert!(tree.disappearing_children(root).is_empty());
}

#[test]
fn readding_a_disappearing_child_cancels_its_exit() {
    let (mut tree, root) = attached_root();
    let column = frame_with_exit_transition(&mut tree, tags::COLUMN);
    tree.append_child(root, column).unwrap();
    tree.remove_child(root, column, true);
    assert!(tree.is_disappearing(column));

    tree.append_child(root, column).unwrap();
    assert!(!tree.is_disappearing(column));
    assert!(tree.disappearing_children(root).is_empty());
    assert_eq!(tree.children(root), vec![column]);
    assert!(tree.is_on_main_tree(column));
    assert!(!tree.frame(column).unwrap().render.has_transition_out);
}

#[test]
fn disappearing_entries_are_unique_by_identity() {
    let (mut tree, root) = attached_root();
    let item = tree.spawn_frame("item");
    assert!(!tree.remove_disappearing_child(root, item));

    tree.add_disappearing_child(root, item, 0);
    tree.add_disappearing_child(root, item, 3);
    assert_eq!(
        tree.disappearing_children(root),
        vec![DisappearingChild { node: item, index: 3 }]
    );
    assert!(tree.is_disappearing(item));

    assert!(tree.remove_disappearing_child(root, item));
    assert!(!tree.is_disappearing(item));
    assert!(!tree.remove_disappearing_child(root, item));
}

#[test]
fn break_point_climbs_to_parked_ancestor() {
    let (mut tree, root) = attached_root();
    let column = frame_with_exit_transition(&mut tree, tags::COLUMN);
    let inner = tree.spawn_frame(tags::TEXT);
    tree.append_child(column, inner).unwrap();
    tree.append_child(root, column).unwrap();
    tree.remove_child(root, column, true);
    assert_eq!(tree.get_best_break_point(inner), (Some(root), column));
}

#[test]
fn default_transition_flags_only_first_frame() {
    let (mut tree, root) = attached_root();
    let outer = tree.spawn_frame("outer");
    let inner = tree.spawn_frame("inner");
    tree.append_child(outer, inner).unwrap();
    tree.add_child(root, outer, None, AddChildOptions::with_default_transition())
        .unwrap();
    assert!(tree.frame(outer).unwrap().render.appear_transition_pending);
    assert!(!tree.frame(inner).unwrap().render.appear_transition_pending);
}

#[test]
fn silent_add_does_not_attach() {
    let (mut tree, root) = attached_root();
    let node = tree.spawn_frame(tags::TEXT);
    tree.add_child(root, node, None, AddChildOptions::silently()).unwrap();
    assert_eq!(tree.parent(node), Some(root));
    assert!(!tree.is_on_main_tree(node));
    assert!(!tree.is_attached(node));
}

#[test]
fn clean_detaches_children_and_keeps_if_else_branch_cache() {
    let (mut tree, root) = attached_root();
    let if_else = tree.spawn(tags::IF_ELSE, NodeKind::Syntax);
    let column = tree.spawn_frame(tags::COLUMN);
    let first = tree.spawn_frame("first");
    let second = tree.spawn_frame("second");
    tree.append_child(root, if_else).unwrap();
    tree.append_child(root, column).unwrap();
    tree.append_child(if_else, first).unwrap();
    tree.append_child(column, second).unwrap();

    tree.clean(if_else, false, false);
    assert_eq!(tree.children(if_else), vec![first]);
    assert!(!tree.is_on_main_tree(first));
    assert_eq!(tree.parent(first), Some(if_else));

    tree.clean(column, false, false);
    assert!(tree.children(column).is_empty());
    assert!(!tree.contains(second));
}

#[test]
fn clean_parks_geometry_transition_subtrees() {
    let (mut tree, root) = attached_root();
    let column = tree.spawn_frame(tags::COLUMN);
    let hero = tree.spawn_frame("hero");
    tree.frame_mut(hero).unwrap().geometry_transition = Some("shared".into());
    tree.append_child(root, column).unwrap();
    tree.append_child(column, hero).unwrap();

    tree.clean(column, false, false);
    assert_eq!(tree.pending_remove_nodes(), &[hero]);
    assert!(tree.contains(hero));
    assert!(tree.node(hero).unwrap().is_removing());

    tree.clear_pending_remove_nodes();
    assert!(!tree.contains(hero));
}

#[test]
fn clean_with_transition_moves_animating_children_aside() {
    let (mut tree, root) = attached_root();
    let column = tree.spawn_frame(tags::COLUMN);
    let fading = frame_with_exit_transition(&mut tree, "fading");
    let plain = tree.spawn_frame("plain");
    tree.append_child(root, column).unwrap();
    tree.append_child(column, plain).unwrap();
    tree.append_child(column, fading).unwrap();

    tree.clean(column, true, true);
    assert!(tree.children(column).is_empty());
    assert_eq!(
        tree.disappearing_children(column),
        vec![DisappearingChild {
            node: fading,
            index: 1
        }]
    );
    assert!(!tree.contains(plain));
}

#[test]
fn move_position_reorders_siblings() {
    let (mut tree, root) = attached_root();
    let ids: Vec<NodeId> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|tag| tree.spawn_frame(tag))
        .collect();
    for id in &ids {
        tree.append_child(root, *id).unwrap();
    }
    let [a, b, c, d] = [ids[0], ids[1], ids[2], ids[3]];
    tree.move_position(a, 2);
    assert_eq!(tree.children(root), vec![b, c, a, d]);
    tree.move_position(b, 10);
    assert_eq!(tree.children(root), vec![c, a, d, b]);
    tree.move_position(d, 0);
    assert_eq!(tree.children(root), vec![d, c, a, b]);
}

#[test]
fn replace_child_keeps_slot() {
    let (mut tree, root) = attached_root();
    let a = tree.spawn_frame("a");
    let b = tree.spawn_frame("b");
    let c = tree.spawn_frame("c");
    tree.append_child(root, a).unwrap();
    tree.append_child(root, b).unwrap();
    tree.replace_child(root, a, c).unwrap();
    assert_eq!(tree.children(root), vec![c, b]);
    assert!(!tree.contains(a));
    assert!(tree.is_on_main_tree(c));
    assert_eq!(tree.remove_child_at_index(root, 1), Some(b));
    assert_eq!(tree.children(root), vec![c]);
}

#[test]
fn builder_status_follows_main_tree_membership() {
    let (mut tree, root) = attached_root();
    let builder = tree.spawn_frame("builder");
    tree.set_node_status(builder, NodeStatus::BuilderNodeOffMainTree);
    let leaf = tree.spawn_frame(tags::TEXT);
    tree.append_child(builder, leaf).unwrap();
    assert_eq!(tree.node(leaf).unwrap().status(), NodeStatus::BuilderNodeOffMainTree);

    tree.retain(builder);
    tree.append_child(root, builder).unwrap();
    assert_eq!(tree.node(builder).unwrap().status(), NodeStatus::BuilderNodeOnMainTree);
    assert_eq!(tree.node(leaf).unwrap().status(), NodeStatus::BuilderNodeOnMainTree);

    tree.remove_child(root, builder, false);
    assert_eq!(tree.node(leaf).unwrap().status(), NodeStatus::BuilderNodeOffMainTree);
}

#[test]
fn non_recursive_context_binding_stops_at_first_frame() {
    let mut tree = NodeTree::new();
    let group = tree.spawn("group", NodeKind::Generic);
    let frame = tree.spawn_frame("frame");
    let leaf = tree.spawn_frame("leaf");
    tree.append_child(group, frame).unwrap();
    tree.append_child(frame, leaf).unwrap();

    tree.attach_context(group, 7, false);
    assert_eq!(tree.node(group).unwrap().context(), Some(7));
    assert_eq!(tree.node(frame).unwrap().context(), Some(7));
    assert_eq!(tree.node(leaf).unwrap().context(), None);

    tree.attach_context(group, 8, true);
    assert_eq!(tree.node(leaf).unwrap().context(), Some(8));
    tree.detach_context(group, true);
    assert_eq!(tree.node(leaf).unwrap().context(), None);
}

#[test]
fn build_runs_custom_closures_once() {
    let (mut tree, root) = attached_root();
    let custom = tree.spawn_custom(tags::JS_VIEW, |tree, id| {
        let text = tree.spawn_frame(tags::TEXT);
        tree.append_child(id, text).unwrap();
    });
    tree.append_child(root, custom).unwrap();
    tree.build(root);
    tree.build(root);
    assert_eq!(tree.child_count(custom), 1);
    assert!(matches!(
        tree.node(custom).unwrap().kind(),
        NodeKind::Custom(data) if data.is_built()
    ));
    let text = tree.child_at(custom, 0).unwrap();
    assert!(tree.is_on_main_tree(text));
}

#[test]
fn observed_nodes_report_lifecycle_events() {
    let (mut tree, root) = attached_root();
    let page = tree.spawn_frame(tags::PAGE);
    tree.set_observe_lifecycle(page, true);
    tree.append_child(root, page).unwrap();
    tree.remove_child(root, page, false);
    assert_eq!(
        tree.take_lifecycle_events(),
        vec![
            LifecycleEvent::Attached(page),
            LifecycleEvent::Detached(page),
            LifecycleEvent::Destroyed(page)
        ]
    );
    assert!(tree.take_lifecycle_events().is_empty());
}

#[test]
fn render_sync_marks_nearest_frame() {
    let (mut tree, root) = attached_root();
    let group = tree.spawn(tags::FOR_EACH, NodeKind::Syntax);
    let item = tree.spawn_frame("item");
    tree.append_child(root, group).unwrap();
    tree.flush_render_tree();
    tree.append_child(group, item).unwrap();
    assert!(tree.frame(root).unwrap().needs_sync_render_tree());
    assert_eq!(tree.flush_render_tree(), 1);
    assert_eq!(tree.frame(root).unwrap().render_children(), &[item]);
}

#[test]
fn explicit_ids_are_unique() {
    let mut tree = NodeTree::new();
    assert_eq!(tree.create_node("a", 10, NodeKind::Generic), Ok(10));
    assert_eq!(
        tree.create_node("b", 10, NodeKind::Generic),
        Err(NodeError::Occupied { id: 10 })
    );
    assert!(tree.next_node_id() > 10);
}
