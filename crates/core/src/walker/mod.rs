use crate::{
    chain::{Chain, ChainNode, Direction, SlotLayout, Traversal},
    surface::DrawingSurface,
};

/// What happened during one [`ChainWalker::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The current node is still mid-step.
    Continuing,
    /// The step finished and the walker moved on to this node.
    Advanced(usize),
    /// The step finished at a boundary; direction reversed and this node
    /// starts stepping again.
    TurnedAround(usize),
    /// The walker is back at the head heading forward. No step was started.
    CycleComplete,
}

/// Ping-pong traversal over a [`Chain`]: fill nodes head to tail, then empty
/// them tail to head, one node at a time.
#[derive(Debug, Clone)]
pub struct ChainWalker {
    chain: Chain,
    curr: usize,
    direction: Direction,
}

impl ChainWalker {
    pub fn new() -> Self {
        let mut chain = Chain::new();
        chain.node_mut(Chain::HEAD).begin_step();
        Self {
            chain,
            curr: Chain::HEAD,
            direction: Direction::Forward,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn current(&self) -> &ChainNode {
        self.chain.node(self.curr)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn render<S: DrawingSurface + ?Sized>(&self, surface: &mut S, layout: &SlotLayout) {
        self.chain.render(surface, layout);
    }

    /// Advances the current node by one increment and moves along the chain
    /// when its step completes.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.chain.node_mut(self.curr).advance_step() {
            return TickOutcome::Continuing;
        }

        let traversal = self.chain.node(self.curr).step_or_turn(self.direction);
        if let Traversal::TurnedAround(_) = traversal {
            self.direction = self.direction.flipped();
        }
        self.curr = traversal.node();

        if self.direction == Direction::Forward && self.curr == Chain::HEAD {
            tracing::debug!("chain traversal returned to head");
            return TickOutcome::CycleComplete;
        }

        self.chain.node_mut(self.curr).begin_step();
        match traversal {
            Traversal::Moved(index) => TickOutcome::Advanced(index),
            Traversal::TurnedAround(index) => {
                tracing::trace!(index, direction = ?self.direction, "turned around");
                TickOutcome::TurnedAround(index)
            }
        }
    }
}

impl Default for ChainWalker {
    fn default() -> Self {
        Self::new()
    }
}
