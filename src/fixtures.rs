//! Small hand-compiled game circuits
//!
//! Used by the tests, the benchmark and the demo. Each function builds the
//! circuit a rule compiler would produce for a tiny game.

use crate::circuit::{Circuit, CircuitBuilder, NodeId};
use crate::Result;

fn xor(builder: &mut CircuitBuilder, a: NodeId, b: NodeId) -> NodeId {
    let not_a = builder.add_not(a);
    let not_b = builder.add_not(b);
    let only_a = builder.add_and(vec![a, not_b]);
    let only_b = builder.add_and(vec![not_a, b]);
    builder.add_or(vec![only_a, only_b])
}

/// Single role `robot` with one move to make: `a` scores 100, `b` scores 0
pub fn one_ply() -> Result<Circuit> {
    one_ply_builder().build()
}

fn one_ply_builder() -> CircuitBuilder {
    let mut builder = CircuitBuilder::new();
    let robot = builder.add_role("robot");

    let played_a = builder.add_base("played_a");
    let played_b = builder.add_base("played_b");
    let does_a = builder.add_input(robot, "a");
    let does_b = builder.add_input(robot, "b");
    let next_a = builder.add_or(vec![played_a, does_a]);
    let next_b = builder.add_or(vec![played_b, does_b]);
    builder.set_successor(played_a, next_a);
    builder.set_successor(played_b, next_b);

    let done = builder.add_or(vec![played_a, played_b]);
    let open = builder.add_not(done);
    builder.add_legal(robot, "a", open);
    builder.add_legal(robot, "b", open);

    let missed = builder.add_not(played_a);
    builder.add_goal(robot, 100, played_a);
    builder.add_goal(robot, 0, missed);
    builder.add_terminal(done);
    builder
}

/// `one_ply` with an unrelated lamp the robot may also toggle
///
/// The lamp never influences termination, the score or legality, so pruning
/// removes it. The `toggle` move stays legal.
pub fn one_ply_with_lamp() -> Result<Circuit> {
    let mut builder = one_ply_builder();
    let robot = 0;

    let lamp = builder.add_base("lamp");
    let toggle = builder.add_input(robot, "toggle");
    let next_lamp = xor(&mut builder, lamp, toggle);
    builder.set_successor(lamp, next_lamp);
    let always = builder.add_constant(true);
    builder.add_legal(robot, "toggle", always);
    builder.build()
}

/// Single role `robot` that waits two turns for a fixed score of 50
///
/// Its only move never influences the state, yet it must stay legal.
pub fn waiting_room() -> Result<Circuit> {
    let mut builder = CircuitBuilder::new();
    let robot = builder.add_role("robot");
    let init = builder.add_init();

    let t0 = builder.add_base("t0");
    let t1 = builder.add_base("t1");
    let t2 = builder.add_base("t2");
    builder.set_successor(t0, init);
    builder.set_successor(t1, t0);
    builder.set_successor(t2, t1);
    builder.add_input(robot, "wait");

    let open = builder.add_not(t2);
    builder.add_legal(robot, "wait", open);
    let always = builder.add_constant(true);
    builder.add_goal(robot, 50, always);
    builder.add_terminal(t2);
    builder.build()
}

/// Single role `robot` that has to play `up` twice to score 100
///
/// `down` is declared first, so a one-ply search with a neutral frontier
/// prefers it.
pub fn staircase() -> Result<Circuit> {
    let mut builder = CircuitBuilder::new();
    let robot = builder.add_role("robot");
    let init = builder.add_init();

    let t0 = builder.add_base("t0");
    let t1 = builder.add_base("t1");
    let t2 = builder.add_base("t2");
    builder.set_successor(t0, init);
    builder.set_successor(t1, t0);
    builder.set_successor(t2, t1);

    let ok = builder.add_base("ok");
    builder.add_input(robot, "down");
    let up = builder.add_input(robot, "up");
    let on_track = builder.add_or(vec![t0, ok]);
    let next_ok = builder.add_and(vec![up, on_track]);
    builder.set_successor(ok, next_ok);

    let open = builder.add_not(t2);
    builder.add_legal(robot, "down", open);
    builder.add_legal(robot, "up", open);

    let failed = builder.add_not(ok);
    builder.add_goal(robot, 100, ok);
    builder.add_goal(robot, 0, failed);
    builder.add_terminal(t2);
    builder.build()
}

/// Matching pennies: `row` and `col` show `heads` or `tails` at once
///
/// `row` scores 100 when the coins match, `col` when they differ.
pub fn matching_pennies() -> Result<Circuit> {
    let mut builder = CircuitBuilder::new();
    let row = builder.add_role("row");
    let col = builder.add_role("col");

    let done = builder.add_base("done");
    let row_heads = builder.add_base("row_heads");
    let col_heads = builder.add_base("col_heads");

    let row_h = builder.add_input(row, "heads");
    let row_t = builder.add_input(row, "tails");
    let col_h = builder.add_input(col, "heads");
    builder.add_input(col, "tails");

    let moved = builder.add_or(vec![row_h, row_t]);
    builder.set_successor(done, moved);
    builder.set_successor(row_heads, row_h);
    builder.set_successor(col_heads, col_h);

    let open = builder.add_not(done);
    for role in [row, col] {
        builder.add_legal(role, "heads", open);
        builder.add_legal(role, "tails", open);
    }

    let differ = xor(&mut builder, row_heads, col_heads);
    let same = builder.add_not(differ);
    builder.add_goal(row, 100, same);
    builder.add_goal(row, 0, differ);
    builder.add_goal(col, 100, differ);
    builder.add_goal(col, 0, same);
    builder.add_terminal(done);
    builder.build()
}

/// Four simultaneous turns of `left` and `right` each playing `zero` or
/// `one`
///
/// A parity bit flips for every `one` played. `left` scores 100 if the
/// final parity is odd, `right` if it is even.
pub fn parity_race() -> Result<Circuit> {
    let mut builder = CircuitBuilder::new();
    let left = builder.add_role("left");
    let right = builder.add_role("right");
    let init = builder.add_init();

    let counter: Vec<NodeId> = (0..5)
        .map(|i| builder.add_base(&format!("c{}", i)))
        .collect();
    builder.set_successor(counter[0], init);
    for pair in counter.windows(2) {
        builder.set_successor(pair[1], pair[0]);
    }
    let last = counter[4];

    let odd = builder.add_base("odd");
    builder.add_input(left, "zero");
    let left_one = builder.add_input(left, "one");
    builder.add_input(right, "zero");
    let right_one = builder.add_input(right, "one");
    let flips = xor(&mut builder, left_one, right_one);
    let next_odd = xor(&mut builder, odd, flips);
    builder.set_successor(odd, next_odd);

    let open = builder.add_not(last);
    for role in [left, right] {
        builder.add_legal(role, "zero", open);
        builder.add_legal(role, "one", open);
    }

    let even = builder.add_not(odd);
    builder.add_goal(left, 100, odd);
    builder.add_goal(left, 0, even);
    builder.add_goal(right, 100, even);
    builder.add_goal(right, 0, odd);
    builder.add_terminal(last);
    builder.build()
}
