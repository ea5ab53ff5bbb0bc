//! Circular dependency detection for formula cells.
//!
//! When a formula is entered, we must verify it doesn't create a cycle
//! (e.g., A1 references B1, B1 references C1, C1 references A1).
//! This module runs a depth-first search over the referenced-cells graph
//! with an explicit stack, so deep reference chains do not grow the
//! call stack.

use std::collections::HashSet;

use super::Position;

/// Detect circular dependencies reachable from `start`.
///
/// `references` yields the positions a cell reads from. Invalid positions
/// are skipped. Returns `Some(cycle)` with the cells on the cycle, first and
/// last entries equal, or `None` if the graph reachable from `start` is
/// acyclic.
pub fn detect_cycle<F, I>(start: Position, mut references: F) -> Option<Vec<Position>>
where
    F: FnMut(Position) -> I,
    I: IntoIterator<Item = Position>,
{
    // Cells fully explored; nothing below them can close a cycle.
    let mut visited: HashSet<Position> = HashSet::new();
    // Cells on the current DFS path.
    let mut in_progress: HashSet<Position> = HashSet::new();
    let mut stack: Vec<(Position, std::vec::IntoIter<Position>)> = Vec::new();

    in_progress.insert(start);
    stack.push((start, collect_refs(&mut references, start)));

    loop {
        let next = match stack.last_mut() {
            Some((_, children)) => children.next(),
            None => return None,
        };

        match next {
            Some(child) => {
                if !child.is_valid() || visited.contains(&child) {
                    continue;
                }
                if in_progress.contains(&child) {
                    return Some(cycle_path(&stack, child));
                }
                in_progress.insert(child);
                stack.push((child, collect_refs(&mut references, child)));
            }
            None => {
                if let Some((done, _)) = stack.pop() {
                    in_progress.remove(&done);
                    visited.insert(done);
                }
            }
        }
    }
}

fn collect_refs<F, I>(references: &mut F, pos: Position) -> std::vec::IntoIter<Position>
where
    F: FnMut(Position) -> I,
    I: IntoIterator<Item = Position>,
{
    references(pos).into_iter().collect::<Vec<_>>().into_iter()
}

fn cycle_path(stack: &[(Position, std::vec::IntoIter<Position>)], closing: Position) -> Vec<Position> {
    let from = stack
        .iter()
        .position(|(pos, _)| *pos == closing)
        .unwrap_or(0);
    let mut path: Vec<Position> = stack[from..].iter().map(|(pos, _)| *pos).collect();
    path.push(closing);
    path
}
