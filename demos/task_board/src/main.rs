//! Task Board Demo
//!
//! Renders several snapshots of a task board into an in-memory tree. Each
//! round rebinds the task ids, so cards are kept, added or dropped as needed,
//! and card progress animates between rounds.

mod board;

use board::{find, Board, Task};
use tracing_subscriber::EnvFilter;
use trellis_core::{AnyNode, EngineConfig, HostTree, MemoryTree, NodeId, Result, TextNode};
use trellis_join::{Document, EventRegistry, Selection};
use trellis_motion::{ClassAccessor, DelayBuilder};

#[derive(Debug)]
struct Click;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = EngineConfig::from_ron_str(include_str!("../data/engine.ron"))?;
    let board = Board::from_ron_str(include_str!("../data/board.ron"))?;
    println!("=== Trellis Task Board: {} ===\n", board.title);

    let mut doc = Document::with_config(MemoryTree::new(), config);
    let root = doc.tree().root();
    let column = doc.tree_mut().add_element(root, "column")?;

    let mut cards = Selection::empty();
    for (round, tasks) in board.rounds.iter().enumerate() {
        cards = render(&mut doc, column, tasks)?;

        // Halfway through the animations
        let config = doc.config();
        let halfway = config.default_animation().as_millis() / config.frame_interval().as_millis() / 2;
        for _ in 0..halfway {
            doc.next_frame();
        }
        println!("Round {} (animating):", round + 1);
        print_column(&doc, column);

        let frames = settle(&mut doc, column);
        println!("Round {} (settled after {} more frames):", round + 1, frames);
        print_column(&doc, column);
        println!();
    }

    let mut clicks = EventRegistry::<Click>::new();
    let last = board.rounds.last().cloned().unwrap_or_default();
    cards.on_event(&mut clicks, move |ctx| {
        if let Some(task) = find(&last, ctx.datum) {
            println!("Clicked card {} ({})", ctx.index, task.title);
        }
    });
    if let Some(first) = doc.tree().children(column).first().copied() {
        clicks.dispatch(&doc, first, &Click);
    }
    Ok(())
}

/// Bring the column in line with `tasks`
fn render(
    doc: &mut Document<MemoryTree>,
    column: NodeId,
    tasks: &[Task],
) -> Result<Selection<AnyNode, i64>> {
    let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
    let bound = doc
        .select(column)
        .select_children::<AnyNode, _>(doc, Some("card"), None)
        .bind_data(doc, &ids);

    let leaving: Vec<NodeId> = bound.exit().nodes().collect();
    let cards = bound.join(doc, |tree, _| Ok(tree.create_element("card")))?;
    for card in leaving {
        doc.destroy(card)?;
    }

    let titles = cards.forward_single_data::<TextNode, _, _>(doc, Some("title"), None, |tree, _| {
        Ok(tree.create_text("title", ""))
    })?;
    titles.text(
        doc,
        |_, id, _| find(tasks, id).map(|t| t.title.clone()).unwrap_or_default(),
        None,
    )?;

    let grow = DelayBuilder::<f32>::animated_from_config(doc.config());
    cards.style(
        doc,
        "progress",
        |_, id, _| find(tasks, id).map_or(0.0, |t| t.progress as f32),
        Some(&grow),
    )?;

    let mark = DelayBuilder::<bool>::timed_from_config(doc.config())
        .after_complete(|node, _| tracing::info!(%node, "card marked done"));
    cards.change(
        doc,
        &ClassAccessor::new("done"),
        |_, id, _| find(tasks, id).is_some_and(Task::is_done),
        Some(&mark),
    )?;

    let mut by_progress = tasks.to_vec();
    by_progress.sort_by(|a, b| b.progress.cmp(&a.progress));
    let order: Vec<i64> = by_progress.iter().map(|t| t.id).collect();
    cards.robust_order(doc, &order)
}

/// Advance frames until no card has a change in flight
fn settle(doc: &mut Document<MemoryTree>, column: NodeId) -> u32 {
    let mut frames = 0;
    while frames < 1_000
        && doc
            .tree()
            .children(column)
            .iter()
            .any(|&card| doc.pending_changes(card) > 0)
    {
        doc.next_frame();
        frames += 1;
    }
    frames
}

fn print_column(doc: &Document<MemoryTree>, column: NodeId) {
    let tree = doc.tree();
    for card in tree.children(column) {
        let title = tree
            .children(card)
            .into_iter()
            .find_map(|child| tree.text(child).map(str::to_owned))
            .unwrap_or_default();
        let progress = tree.style(card, "progress").unwrap_or(0.0);
        let done = if tree.has_class(card, "done") { "x" } else { " " };
        println!("  [{}] {:<16} {:>5.1}%", done, title, progress);
    }
}
