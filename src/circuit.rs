//! The compiled game circuit
//!
//! A circuit is a DAG of constants, propositions and AND/OR/NOT gates. Some
//! propositions carry a `Tag` that gives them a meaning in the game: base
//! propositions hold state, input propositions receive the moves being
//! played, and legal, goal, terminal and init propositions answer queries.
//!
//! Circuits are produced once per game by a rules compiler through
//! `CircuitBuilder` and are read-only afterwards.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::game_state::{Move, Role};
use crate::{GameError, Result};

/// Index of a node in a circuit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the id as a vector index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The logical component of a node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Fixed truth value
    Constant(bool),
    /// Named proposition, mirroring its input if it has one
    Proposition {
        name: Arc<str>,
        input: Option<NodeId>,
    },
    /// True iff every input is true
    And(Vec<NodeId>),
    /// True iff any input is true
    Or(Vec<NodeId>),
    /// Inverts its input
    Not(NodeId),
}

impl Gate {
    /// Nodes this gate reads
    pub fn inputs(&self) -> &[NodeId] {
        match self {
            Gate::Constant(_) => &[],
            Gate::Proposition { input: Some(input), .. } => std::slice::from_ref(input),
            Gate::Proposition { input: None, .. } => &[],
            Gate::And(inputs) | Gate::Or(inputs) => inputs,
            Gate::Not(input) => std::slice::from_ref(input),
        }
    }
}

/// Game meaning of a proposition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tag {
    /// State-holding proposition; the value is the index into `Circuit::bases()`
    Base(usize),
    /// Asserted when `role` plays `mv`
    Input { role: usize, mv: Move },
    /// True when `role` may play `mv`
    Legal { role: usize, mv: Move },
    /// True when `role` scores `value`
    Goal { role: usize, value: i32 },
    /// True when the game is over
    Terminal,
    /// Asserted only while computing the initial position
    Init,
}

/// One node of the circuit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub gate: Gate,
    pub tag: Option<Tag>,
}

impl Node {
    /// Returns true if the value of this node comes from the query's
    /// assignment rather than from its inputs
    #[inline]
    pub fn is_source(&self) -> bool {
        matches!(
            self.tag,
            Some(Tag::Base(_)) | Some(Tag::Input { .. }) | Some(Tag::Init)
        )
    }
}

/// A state-holding proposition and the node computing its next value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseProposition {
    pub name: Arc<str>,
    pub node: NodeId,
    pub successor: NodeId,
}

/// A validated, read-only game circuit
#[derive(Clone, Debug)]
pub struct Circuit {
    nodes: Vec<Node>,
    roles: Vec<Role>,
    bases: Vec<BaseProposition>,
    inputs: Vec<Vec<(Move, NodeId)>>,
    input_index: HashMap<(usize, Move), NodeId>,
    legals: Vec<Vec<(Move, NodeId)>>,
    goals: Vec<Vec<(i32, NodeId)>>,
    terminal: NodeId,
    init: Option<NodeId>,
}

impl Circuit {
    /// Roles in their fixed order
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Base propositions; a `Position` refers to them by index
    pub fn bases(&self) -> &[BaseProposition] {
        &self.bases
    }

    /// Input propositions of the role at `role`
    pub fn inputs(&self, role: usize) -> &[(Move, NodeId)] {
        &self.inputs[role]
    }

    /// The input proposition asserted when `role` plays `mv`
    pub fn input_for(&self, role: usize, mv: &Move) -> Option<NodeId> {
        self.input_index.get(&(role, mv.clone())).copied()
    }

    /// Legal propositions of the role at `role`
    pub fn legals(&self, role: usize) -> &[(Move, NodeId)] {
        &self.legals[role]
    }

    /// Goal propositions of the role at `role`
    pub fn goals(&self, role: usize) -> &[(i32, NodeId)] {
        &self.goals[role]
    }

    /// The terminal proposition
    pub fn terminal(&self) -> NodeId {
        self.terminal
    }

    /// The init proposition, if the rules declare one
    pub fn init(&self) -> Option<NodeId> {
        self.init
    }

    /// The node with the given id
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// All nodes, indexed by `NodeId`
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the circuit has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the base proposition with the given name
    pub fn base_index(&self, name: &str) -> Option<usize> {
        self.bases.iter().position(|b| &*b.name == name)
    }
}

/// Incremental constructor for `Circuit`
///
/// Nodes may reference nodes added later; everything is checked in
/// `build()`.
///
/// # Example
///
/// ```
/// use ggp_player::circuit::CircuitBuilder;
///
/// let mut builder = CircuitBuilder::new();
/// let robot = builder.add_role("robot");
/// let done = builder.add_base("done");
/// let push = builder.add_input(robot, "push");
/// let next_done = builder.add_or(vec![done, push]);
/// builder.set_successor(done, next_done);
/// let not_done = builder.add_not(done);
/// builder.add_legal(robot, "push", not_done);
/// builder.add_goal(robot, 100, done);
/// builder.add_goal(robot, 0, not_done);
/// builder.add_terminal(done);
///
/// let circuit = builder.build().unwrap();
/// assert_eq!(circuit.bases().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CircuitBuilder {
    nodes: Vec<Node>,
    roles: Vec<Role>,
    bases: Vec<(Arc<str>, NodeId, Option<NodeId>)>,
    inputs: Vec<(usize, Move, NodeId)>,
    legals: Vec<(usize, Move, NodeId)>,
    goals: Vec<(usize, i32, NodeId)>,
    terminal: Vec<NodeId>,
    init: Vec<NodeId>,
}

impl CircuitBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, gate: Gate, tag: Option<Tag>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { gate, tag });
        id
    }

    fn proposition(name: &str, input: Option<NodeId>) -> Gate {
        Gate::Proposition {
            name: Arc::from(name),
            input,
        }
    }

    /// Declares the next role and returns its index
    pub fn add_role(&mut self, name: &str) -> usize {
        self.roles.push(Role::new(name));
        self.roles.len() - 1
    }

    /// Adds a constant node
    pub fn add_constant(&mut self, value: bool) -> NodeId {
        self.push(Gate::Constant(value), None)
    }

    /// Adds an untagged (view) proposition
    pub fn add_proposition(&mut self, name: &str, input: Option<NodeId>) -> NodeId {
        self.push(Self::proposition(name, input), None)
    }

    /// Adds an AND gate
    pub fn add_and(&mut self, inputs: Vec<NodeId>) -> NodeId {
        self.push(Gate::And(inputs), None)
    }

    /// Adds an OR gate
    pub fn add_or(&mut self, inputs: Vec<NodeId>) -> NodeId {
        self.push(Gate::Or(inputs), None)
    }

    /// Adds a NOT gate
    pub fn add_not(&mut self, input: NodeId) -> NodeId {
        self.push(Gate::Not(input), None)
    }

    /// Adds a base proposition; its successor is set with `set_successor`
    pub fn add_base(&mut self, name: &str) -> NodeId {
        let index = self.bases.len();
        let id = self.push(Self::proposition(name, None), Some(Tag::Base(index)));
        self.bases.push((Arc::from(name), id, None));
        id
    }

    /// Sets the node whose value becomes `base`'s value in the next position
    pub fn set_successor(&mut self, base: NodeId, successor: NodeId) {
        if let Some(entry) = self.bases.iter_mut().find(|(_, node, _)| *node == base) {
            entry.2 = Some(successor);
        }
    }

    /// Adds the input proposition for `role` playing `mv`
    pub fn add_input(&mut self, role: usize, mv: &str) -> NodeId {
        let mv = Move::new(mv);
        let name = format!("does({}, {})", self.role_name(role), mv);
        let id = self.push(
            Self::proposition(&name, None),
            Some(Tag::Input {
                role,
                mv: mv.clone(),
            }),
        );
        self.inputs.push((role, mv, id));
        id
    }

    /// Adds the legal proposition for `role` playing `mv`, computed by `input`
    pub fn add_legal(&mut self, role: usize, mv: &str, input: NodeId) -> NodeId {
        let mv = Move::new(mv);
        let name = format!("legal({}, {})", self.role_name(role), mv);
        let id = self.push(
            Self::proposition(&name, Some(input)),
            Some(Tag::Legal {
                role,
                mv: mv.clone(),
            }),
        );
        self.legals.push((role, mv, id));
        id
    }

    /// Adds the goal proposition for `role` scoring `value`, computed by `input`
    pub fn add_goal(&mut self, role: usize, value: i32, input: NodeId) -> NodeId {
        let name = format!("goal({}, {})", self.role_name(role), value);
        let id = self.push(
            Self::proposition(&name, Some(input)),
            Some(Tag::Goal { role, value }),
        );
        self.goals.push((role, value, id));
        id
    }

    /// Adds the terminal proposition, computed by `input`
    pub fn add_terminal(&mut self, input: NodeId) -> NodeId {
        let id = self.push(Self::proposition("terminal", Some(input)), Some(Tag::Terminal));
        self.terminal.push(id);
        id
    }

    /// Adds the init proposition
    pub fn add_init(&mut self) -> NodeId {
        let id = self.push(Self::proposition("init", None), Some(Tag::Init));
        self.init.push(id);
        id
    }

    /// Adds an already-formed node, registering its tag
    ///
    /// Base indices are reassigned in insertion order; successors still have
    /// to be set with `set_successor`.
    pub(crate) fn push_tagged(&mut self, gate: Gate, tag: Option<Tag>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let tag = match tag {
            Some(Tag::Base(_)) => {
                let name = match &gate {
                    Gate::Proposition { name, .. } => name.clone(),
                    _ => Arc::from(format!("base{}", self.bases.len()).as_str()),
                };
                self.bases.push((name, id, None));
                Some(Tag::Base(self.bases.len() - 1))
            }
            Some(Tag::Input { role, mv }) => {
                self.inputs.push((role, mv.clone(), id));
                Some(Tag::Input { role, mv })
            }
            Some(Tag::Legal { role, mv }) => {
                self.legals.push((role, mv.clone(), id));
                Some(Tag::Legal { role, mv })
            }
            Some(Tag::Goal { role, value }) => {
                self.goals.push((role, value, id));
                Some(Tag::Goal { role, value })
            }
            Some(Tag::Terminal) => {
                self.terminal.push(id);
                Some(Tag::Terminal)
            }
            Some(Tag::Init) => {
                self.init.push(id);
                Some(Tag::Init)
            }
            None => None,
        };
        self.nodes.push(Node { gate, tag });
        id
    }

    fn role_name(&self, role: usize) -> String {
        self.roles
            .get(role)
            .map(|r| r.name().to_string())
            .unwrap_or_else(|| format!("?{}", role))
    }

    /// Validates the graph and freezes it into a `Circuit`
    pub fn build(self) -> Result<Circuit> {
        let invalid = |msg: String| GameError::InvalidCircuit(msg);
        let node_count = self.nodes.len();
        let role_count = self.roles.len();

        if role_count == 0 {
            return Err(invalid("no roles declared".into()));
        }
        let mut role_names = HashSet::new();
        for role in &self.roles {
            if !role_names.insert(role.name()) {
                return Err(invalid(format!("role {} declared twice", role)));
            }
        }

        for (i, node) in self.nodes.iter().enumerate() {
            for input in node.gate.inputs() {
                if input.index() >= node_count {
                    return Err(invalid(format!("node #{} reads missing node {}", i, input)));
                }
            }
            if let Gate::Proposition { input: Some(_), .. } = node.gate {
                if node.is_source() {
                    return Err(invalid(format!("source proposition #{} has an input", i)));
                }
            }
        }

        let terminal = match self.terminal.as_slice() {
            [id] => *id,
            [] => return Err(invalid("no terminal proposition".into())),
            _ => return Err(invalid("more than one terminal proposition".into())),
        };
        let init = match self.init.as_slice() {
            [] => None,
            [id] => Some(*id),
            _ => return Err(invalid("more than one init proposition".into())),
        };

        let mut bases = Vec::with_capacity(self.bases.len());
        for (name, node, successor) in self.bases {
            let successor = successor
                .ok_or_else(|| invalid(format!("base {} has no successor", name)))?;
            if successor.index() >= node_count {
                return Err(invalid(format!("base {} reads missing node {}", name, successor)));
            }
            bases.push(BaseProposition {
                name,
                node,
                successor,
            });
        }

        let mut inputs = vec![Vec::new(); role_count];
        let mut input_index = HashMap::new();
        for (role, mv, id) in self.inputs {
            if role >= role_count {
                return Err(invalid(format!("input {} refers to unknown role {}", mv, role)));
            }
            if input_index.insert((role, mv.clone()), id).is_some() {
                return Err(invalid(format!("duplicate input {} for role {}", mv, role)));
            }
            inputs[role].push((mv, id));
        }

        let mut legals = vec![Vec::new(); role_count];
        let mut seen_legals = HashSet::new();
        for (role, mv, id) in self.legals {
            if role >= role_count {
                return Err(invalid(format!("legal {} refers to unknown role {}", mv, role)));
            }
            if !seen_legals.insert((role, mv.clone())) {
                return Err(invalid(format!("duplicate legal {} for role {}", mv, role)));
            }
            legals[role].push((mv, id));
        }

        let mut goals = vec![Vec::new(); role_count];
        for (role, value, id) in self.goals {
            if role >= role_count {
                return Err(invalid(format!("goal {} refers to unknown role {}", value, role)));
            }
            if value < 0 {
                return Err(invalid(format!("negative goal value {}", value)));
            }
            goals[role].push((value, id));
        }

        check_acyclic(&self.nodes)?;

        Ok(Circuit {
            nodes: self.nodes,
            roles: self.roles,
            bases,
            inputs,
            input_index,
            legals,
            goals,
            terminal,
            init,
        })
    }
}

/// Kahn's algorithm over the combinational edges
///
/// Source propositions ignore their inputs and successor edges are not
/// followed, so the only cycles that can be reported are real feedback
/// loops within one evaluation pass.
fn check_acyclic(nodes: &[Node]) -> Result<()> {
    let mut in_degree = vec![0usize; nodes.len()];
    let mut readers: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        if node.is_source() {
            continue;
        }
        for input in node.gate.inputs() {
            in_degree[i] += 1;
            readers[input.index()].push(i);
        }
    }

    let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut visited = 0;
    while let Some(i) = queue.pop_front() {
        visited += 1;
        for &reader in &readers[i] {
            in_degree[reader] -= 1;
            if in_degree[reader] == 0 {
                queue.push_back(reader);
            }
        }
    }

    if visited != nodes.len() {
        let culprit = in_degree.iter().position(|&d| d > 0).unwrap_or(0);
        return Err(GameError::InvalidCircuit(format!(
            "combinational cycle through node #{}",
            culprit
        )));
    }
    Ok(())
}
