//! Best-effort circuit simplification
//!
//! Single-role puzzles are often several independent sub-games glued
//! together, only one of which decides termination and score. Pruning
//! everything outside the cone of the terminal, goal and legal propositions
//! drops the state that can never matter while answering every query
//! exactly as before.
//!
//! Callers must treat every error here as "keep the original circuit".

use std::collections::VecDeque;

use log::debug;

use crate::circuit::{Circuit, CircuitBuilder, Gate, NodeId, Tag};
use crate::{GameError, Result};

/// Returns a copy of `circuit` without components that cannot influence
/// termination, any goal or any legal move
pub fn prune_unreachable(circuit: &Circuit) -> Result<Circuit> {
    let keep = relevant_nodes(circuit);

    let mut remap: Vec<Option<NodeId>> = vec![None; circuit.len()];
    let mut next = 0u32;
    for (i, kept) in keep.iter().enumerate() {
        if *kept {
            remap[i] = Some(NodeId(next));
            next += 1;
        }
    }
    let lookup = |id: NodeId| -> Result<NodeId> {
        remap[id.index()].ok_or_else(|| {
            GameError::InvalidCircuit(format!("pruned node {} is still referenced", id))
        })
    };

    let mut builder = CircuitBuilder::new();
    for role in circuit.roles() {
        builder.add_role(role.name());
    }

    for (i, node) in circuit.nodes().iter().enumerate() {
        if !keep[i] {
            continue;
        }
        let gate = match &node.gate {
            Gate::Constant(value) => Gate::Constant(*value),
            Gate::Proposition { name, input } => Gate::Proposition {
                name: name.clone(),
                input: input.map(lookup).transpose()?,
            },
            Gate::And(inputs) => Gate::And(
                inputs.iter().copied().map(lookup).collect::<Result<Vec<_>>>()?,
            ),
            Gate::Or(inputs) => Gate::Or(
                inputs.iter().copied().map(lookup).collect::<Result<Vec<_>>>()?,
            ),
            Gate::Not(input) => Gate::Not(lookup(*input)?),
        };
        builder.push_tagged(gate, node.tag.clone());
    }

    for base in circuit.bases() {
        if keep[base.node.index()] {
            builder.set_successor(lookup(base.node)?, lookup(base.successor)?);
        }
    }

    let pruned = builder.build()?;
    for (index, role) in pruned.roles().iter().enumerate() {
        if pruned.legals(index).is_empty() {
            return Err(GameError::InvalidCircuit(format!(
                "{} has no legal proposition",
                role
            )));
        }
    }

    debug!(
        "pruned circuit from {} to {} nodes ({} to {} bases)",
        circuit.len(),
        pruned.len(),
        circuit.bases().len(),
        pruned.bases().len()
    );
    Ok(pruned)
}

/// Backward closure from the terminal, goal and legal propositions
///
/// Every legal proposition is a root, so legality is preserved exactly and
/// each move that can ever be legal keeps its input. A kept base pulls in
/// its successor.
fn relevant_nodes(circuit: &Circuit) -> Vec<bool> {
    let mut keep = vec![false; circuit.len()];
    let mut queue = VecDeque::new();

    queue.push_back(circuit.terminal());
    for role in 0..circuit.roles().len() {
        queue.extend(circuit.goals(role).iter().map(|(_, id)| *id));
        for (mv, legal) in circuit.legals(role) {
            queue.push_back(*legal);
            if let Some(input) = circuit.input_for(role, mv) {
                queue.push_back(input);
            }
        }
    }
    if let Some(init) = circuit.init() {
        queue.push_back(init);
    }

    while let Some(id) = queue.pop_front() {
        if keep[id.index()] {
            continue;
        }
        keep[id.index()] = true;
        let node = circuit.node(id);
        queue.extend(node.gate.inputs().iter().copied());
        if let Some(Tag::Base(index)) = &node.tag {
            queue.push_back(circuit.bases()[*index].successor);
        }
    }
    keep
}
