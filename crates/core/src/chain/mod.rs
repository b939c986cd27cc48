use std::f64::consts::PI;

use crate::{step::StepState, surface::DrawingSurface};

/// Number of nodes in every chain.
pub const NODE_COUNT: usize = 5;

/// Traversal direction along the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Result of asking a node for its neighbour in some direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// The neighbour exists; carries its index.
    Moved(usize),
    /// The node sits at the chain boundary and stays where it is.
    TurnedAround(usize),
}

impl Traversal {
    pub fn node(self) -> usize {
        match self {
            Traversal::Moved(index) | Traversal::TurnedAround(index) => index,
        }
    }
}

/// Geometry shared by every node slot, derived from the canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotLayout {
    /// Horizontal distance between slot centres.
    pub gap: f64,
    /// Half-length of the tick mark.
    pub size: f64,
    /// Radius of the two arcs.
    pub radius: f64,
    pub center_y: f64,
}

impl SlotLayout {
    pub fn new(width: u32, height: u32) -> Self {
        let gap = f64::from(width) / (NODE_COUNT as f64 + 1.0);
        let size = gap / 3.0;
        Self {
            gap,
            size,
            radius: size / 3.0,
            center_y: f64::from(height) / 2.0,
        }
    }

    pub fn slot_x(&self, index: usize) -> f64 {
        self.gap * index as f64 + self.gap
    }
}

/// One animated indicator in the chain.
#[derive(Debug, Clone)]
pub struct ChainNode {
    index: usize,
    state: StepState,
    next: Option<usize>,
    prev: Option<usize>,
}

impl ChainNode {
    fn new(index: usize) -> Self {
        Self {
            index,
            state: StepState::new(),
            next: None,
            prev: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> &StepState {
        &self.state
    }

    pub fn next(&self) -> Option<usize> {
        self.next
    }

    pub fn prev(&self) -> Option<usize> {
        self.prev
    }

    pub fn advance_step(&mut self) -> bool {
        self.state.advance_step()
    }

    pub fn begin_step(&mut self) {
        self.state.begin_step();
    }

    /// Neighbour in `direction`, or this node when the chain ends there.
    pub fn step_or_turn(&self, direction: Direction) -> Traversal {
        let neighbour = match direction {
            Direction::Forward => self.next,
            Direction::Backward => self.prev,
        };
        match neighbour {
            Some(index) => Traversal::Moved(index),
            None => Traversal::TurnedAround(self.index),
        }
    }

    /// Draws the tick mark and both arcs of this node only.
    pub fn render<S: DrawingSurface + ?Sized>(&self, surface: &mut S, layout: &SlotLayout) {
        let size = layout.size;

        surface.save();
        surface.translate(layout.slot_x(self.index), layout.center_y);

        surface.save();
        surface.rotate(PI / 12.0);
        surface.begin_path();
        surface.move_to(0.0, -size);
        surface.line_to(0.0, size);
        surface.stroke();
        surface.restore();

        for slot in 0..2 {
            let fraction = arc_fraction(self.state.scale(), slot);
            surface.save();
            surface.rotate(PI * slot as f64);
            surface.translate(size / 4.0, size / 4.0);
            draw_arc(surface, layout.radius, fraction);
            surface.restore();
        }

        surface.restore();
    }
}

/// Portion of a full turn drawn by arc `slot` (0 or 1) at `scale`.
///
/// The first arc fills over `scale ∈ [0, 0.5]`, the second over `[0.5, 1]`.
pub fn arc_fraction(scale: f64, slot: usize) -> f64 {
    (scale - 0.5 * slot as f64).clamp(0.0, 0.5) * 2.0
}

fn draw_arc<S: DrawingSurface + ?Sized>(surface: &mut S, radius: f64, fraction: f64) {
    let degrees = (360.0 * fraction).floor() as usize;
    surface.begin_path();
    for k in 0..=degrees {
        let angle = (k as f64).to_radians();
        let (x, y) = (radius * angle.cos(), radius * angle.sin());
        if k == 0 {
            surface.move_to(x, y);
        } else {
            surface.line_to(x, y);
        }
    }
    surface.stroke();
}

/// The fixed sequence of [`NODE_COUNT`] nodes, stored as an arena.
///
/// Node `i` lives at position `i`; `next`/`prev` are indices into the arena.
#[derive(Debug, Clone)]
pub struct Chain {
    nodes: Vec<ChainNode>,
}

impl Chain {
    pub const HEAD: usize = 0;

    pub fn new() -> Self {
        let mut nodes: Vec<ChainNode> = (0..NODE_COUNT).map(ChainNode::new).collect();
        for index in 1..NODE_COUNT {
            nodes[index - 1].next = Some(index);
            nodes[index].prev = Some(index - 1);
        }
        Self { nodes }
    }

    pub fn head(&self) -> &ChainNode {
        &self.nodes[Self::HEAD]
    }

    pub fn node(&self, index: usize) -> &ChainNode {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut ChainNode {
        &mut self.nodes[index]
    }

    /// Renders every node, head first, following the forward links.
    pub fn render<S: DrawingSurface + ?Sized>(&self, surface: &mut S, layout: &SlotLayout) {
        let mut cursor = Some(Self::HEAD);
        while let Some(index) = cursor {
            let node = &self.nodes[index];
            node.render(surface, layout);
            cursor = node.next;
        }
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}
