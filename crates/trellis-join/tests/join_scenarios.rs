//! End-to-end join scenarios on an in-memory tree

use trellis_core::{AnyNode, HostTree, MemoryTree, NodeId};
use trellis_join::{Document, Selection};

fn board() -> (Document<MemoryTree>, NodeId) {
    let mut tree = MemoryTree::new();
    let list = tree.add_element(tree.root(), "list").unwrap();
    (Document::new(tree), list)
}

fn cards(doc: &Document<MemoryTree>, list: NodeId) -> Selection<AnyNode, String> {
    doc.select(list)
        .select_children::<AnyNode, _>(doc, Some("card"), None)
        .retype()
}

fn render(doc: &mut Document<MemoryTree>, list: NodeId, data: &[&str]) -> Selection<AnyNode, String> {
    let data: Vec<String> = data.iter().map(|s| s.to_string()).collect();
    cards(doc, list)
        .bind_data(doc, &data)
        .join(doc, |tree, _| Ok(tree.create_element("card")))
        .unwrap()
}

fn bound_children(doc: &Document<MemoryTree>, list: NodeId) -> Vec<String> {
    doc.tree()
        .children(list)
        .into_iter()
        .filter_map(|child| doc.datum_as::<String>(child))
        .collect()
}

#[test]
fn test_initial_population() {
    let (mut doc, list) = board();
    let bound = cards(&doc, list).bind_data(&doc, &["A".to_string(), "B".into(), "C".into()]);

    assert!(bound.is_empty());
    assert!(bound.exit().is_empty());
    assert_eq!(bound.enter().groups()[0].data, vec!["A", "B", "C"]);

    bound
        .join(&mut doc, |tree, _| Ok(tree.create_element("card")))
        .unwrap();
    assert_eq!(doc.tree().children(list).len(), 3);
    assert_eq!(bound_children(&doc, list), vec!["A", "B", "C"]);
}

#[test]
fn test_partial_update() {
    let (mut doc, list) = board();
    render(&mut doc, list, &["A", "B", "C"]);
    let before = doc.tree().children(list);

    let bound = cards(&doc, list).bind_data(&doc, &["A".to_string(), "C".into(), "D".into()]);
    assert_eq!(bound.nodes().collect::<Vec<_>>(), vec![before[0], before[2]]);
    assert_eq!(bound.exit().nodes().collect::<Vec<_>>(), vec![before[1]]);
    assert_eq!(bound.enter().groups()[0].data, vec!["D"]);

    let joined = bound
        .join(&mut doc, |tree, _| Ok(tree.create_element("card")))
        .unwrap();
    assert_eq!(joined.len(), 3);
    assert_eq!(bound_children(&doc, list), vec!["A", "C", "D"]);
    assert_eq!(doc.tree().parent(before[1]), None);
}

#[test]
fn test_join_puts_entered_nodes_first() {
    let (mut doc, list) = board();
    let first = render(&mut doc, list, &["A"]);
    let a = first.nodes().next().unwrap();

    let joined = render(&mut doc, list, &["A", "B"]);
    let nodes: Vec<_> = joined.nodes().collect();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[1], a);
    assert_eq!(doc.datum_as::<String>(nodes[0]), Some("B".to_string()));
}

#[test]
fn test_idempotent_rebinding() {
    let (mut doc, list) = board();
    render(&mut doc, list, &["A", "B", "C"]);
    let before = doc.tree().children(list);

    let data = ["A".to_string(), "B".into(), "C".into()];
    let bound = cards(&doc, list).bind_data(&doc, &data);
    assert!(bound.enter().is_empty());
    assert!(bound.exit().is_empty());

    bound
        .join(&mut doc, |tree, _| Ok(tree.create_element("card")))
        .unwrap();
    assert_eq!(doc.tree().children(list), before);
}

#[test]
fn test_fragile_order_round_trip() {
    let (mut doc, list) = board();
    render(&mut doc, list, &["C", "A", "B"]);

    let order = ["A".to_string(), "B".into(), "C".into()];
    cards(&doc, list).fragile_order_by(&mut doc, &order).unwrap();
    assert_eq!(bound_children(&doc, list), vec!["A", "B", "C"]);
}

#[test]
fn test_robust_order_leaves_other_children() {
    let (mut doc, list) = board();
    render(&mut doc, list, &["A", "B"]);
    let footer = doc.tree_mut().add_element(list, "footer").unwrap();

    cards(&doc, list)
        .robust_order(&mut doc, &["B".to_string(), "A".into()])
        .unwrap();
    let children = doc.tree().children(list);
    assert_eq!(children[0], footer);
    assert_eq!(bound_children(&doc, list), vec!["B", "A"]);
}

#[test]
fn test_nested_join_uses_parent_data() {
    let (mut doc, list) = board();
    let columns = doc
        .select(list)
        .select_children::<AnyNode, _>(&doc, Some("column"), None)
        .bind_data(&doc, &[vec![1i64, 2], vec![3]])
        .join(&mut doc, |tree, _| Ok(tree.create_element("column")))
        .unwrap();

    let cells = columns
        .select_children::<AnyNode, _>(&doc, Some("cell"), None)
        .bind(&doc, |column: Option<Vec<i64>>, _| column.unwrap_or_default())
        .join(&mut doc, |tree, _| Ok(tree.create_element("cell")))
        .unwrap();

    assert_eq!(cells.groups().len(), 2);
    let sizes: Vec<_> = cells.groups().iter().map(|g| g.elements.len()).collect();
    assert_eq!(sizes.iter().sum::<usize>(), 3);
    let data: Vec<i64> = cells.nodes().filter_map(|n| doc.datum_as::<i64>(n)).collect();
    let mut sorted = data.clone();
    sorted.sort();
    assert_eq!(sorted, vec![1, 2, 3]);
}

#[test]
fn test_rebinding_large_unsigned_keeps_nodes() {
    let (mut doc, list) = board();
    let data = [u64::MAX, 0];
    let join = |doc: &mut Document<MemoryTree>| {
        doc.select(list)
            .select_children::<AnyNode, _>(&*doc, None, None)
            .bind_data(&*doc, &data)
            .join(doc, |tree, _| Ok(tree.create_element("slot")))
            .unwrap();
    };
    join(&mut doc);
    let before = doc.tree().children(list);
    assert_eq!(doc.datum_as::<u64>(before[0]), Some(u64::MAX));

    let bound = doc
        .select(list)
        .select_children::<AnyNode, _>(&doc, None, None)
        .bind_data(&doc, &data);
    assert!(bound.enter().is_empty());
    assert!(bound.exit().is_empty());

    join(&mut doc);
    assert_eq!(doc.tree().children(list), before);
}
