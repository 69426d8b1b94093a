//! Snake controller: network output to steering decisions.

use crate::error::Result;
use crate::grid::{Heading, Position};
use crate::neural::NeuralNet;
use rand::Rng;

/// Steering choice relative to the current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Straight,
    TurnRight,
    TurnLeft,
}

impl Action {
    pub const COUNT: usize = 3;
    pub const ALL: [Action; Action::COUNT] = [Action::Straight, Action::TurnRight, Action::TurnLeft];

    /// Arg-max over network outputs; ties go to the lowest index
    pub fn from_outputs(outputs: &[f32]) -> Action {
        let mut max_idx = 0;
        let mut max_val = f32::NEG_INFINITY;

        for (i, &val) in outputs.iter().take(Self::COUNT).enumerate() {
            if val > max_val {
                max_val = val;
                max_idx = i;
            }
        }

        Self::ALL[max_idx]
    }
}

/// `TURN_TABLE[heading][action]`
const TURN_TABLE: [[Heading; Action::COUNT]; 4] = [
    // North
    [Heading::North, Heading::East, Heading::West],
    // East
    [Heading::East, Heading::South, Heading::North],
    // South
    [Heading::South, Heading::West, Heading::East],
    // West
    [Heading::West, Heading::North, Heading::South],
];

/// Heading after applying `action` to `heading`, ignoring body constraints
#[inline]
pub fn turn(heading: Heading, action: Action) -> Heading {
    TURN_TABLE[heading.index()][action as usize]
}

/// Per-controller runtime state. Never part of a genome.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerState {
    /// Previous tick's network output
    pub feedback: Vec<f32>,
    /// A heading change was already honoured this tick
    pub turn_latched: bool,
}

impl ControllerState {
    pub fn fresh(outputs: usize) -> Self {
        Self {
            feedback: vec![0.0; outputs],
            turn_latched: false,
        }
    }
}

/// Pure controller transition: run the network on `sensors` from `state`
/// and pick an action. The latch carries over untouched.
pub fn step(
    net: &NeuralNet,
    state: &ControllerState,
    sensors: &[f32],
) -> Result<(ControllerState, Action)> {
    let outputs = net.forward_with(sensors, &state.feedback)?;
    let action = Action::from_outputs(&outputs);

    let feedback = if net.topology().recurrent {
        outputs
    } else {
        state.feedback.clone()
    };

    Ok((
        ControllerState {
            feedback,
            turn_latched: state.turn_latched,
        },
        action,
    ))
}

/// Owns one network and the state needed to drive a snake with it.
///
/// A brain never holds a reference to its snake: sensors come in as
/// arguments and a heading goes out. Recurrent feedback lives only in the
/// [`ControllerState`]; the network is driven through the pure
/// [`NeuralNet::forward_with`], so its own feedback buffer stays zero.
#[derive(Debug)]
pub struct Brain {
    network: NeuralNet,
    state: ControllerState,
}

impl Brain {
    pub fn new(mut network: NeuralNet) -> Self {
        // Feedback left over from bare feed_forward calls is not carried in
        network.reset();
        let state = ControllerState::fresh(network.topology().outputs);
        Self { network, state }
    }

    #[inline]
    pub fn network(&self) -> &NeuralNet {
        &self.network
    }

    #[inline]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Run one tick of the network and choose an action
    pub fn decide(&mut self, sensors: &[f32]) -> Result<Action> {
        let (next, action) = step(&self.network, &self.state, sensors)?;
        self.state = next;
        Ok(action)
    }

    /// Turn-table lookup with two guards: a turn that would put the head on
    /// `neck` is refused, and only the first heading change of a tick counts.
    pub fn resolve_heading(
        &mut self,
        current: Heading,
        action: Action,
        head: Position,
        neck: Option<Position>,
    ) -> Heading {
        if self.state.turn_latched {
            return current;
        }

        let next = turn(current, action);
        if next == current || neck == Some(head.step(next)) {
            return current;
        }

        self.state.turn_latched = true;
        next
    }

    /// Release the per-tick turn latch
    pub fn end_tick(&mut self) {
        self.state.turn_latched = false;
    }

    /// Forget feedback and latch; used whenever the snake is freshly placed
    pub fn reset(&mut self) {
        self.state = ControllerState::fresh(self.network.topology().outputs);
    }

    /// Independent brain with an identical genome and fresh state
    pub fn copy(&self) -> Self {
        Self::new(self.network.copy())
    }

    /// Child brain from uniform crossover of both genomes
    pub fn crossover<R: Rng>(&self, other: &Brain, rng: &mut R) -> Result<Self> {
        Ok(Self::new(self.network.crossover(&other.network, rng)?))
    }

    /// Replacement-mutate the genome in place
    pub fn mutate<R: Rng>(&mut self, rate: f32, rng: &mut R) -> Result<()> {
        self.network.mutate(rate, rng)
    }
}
