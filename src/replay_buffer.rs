use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{DqnError, Result};

/// One observed `(state, action, reward, next_state, done)` tuple.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

/// Parallel sequences of sampled transitions. Row `i` of every field belongs
/// to the same transition.
#[derive(Clone, Debug)]
pub struct Minibatch {
    pub states: Array2<f32>,
    pub actions: Vec<usize>,
    pub rewards: Array1<f32>,
    pub next_states: Array2<f32>,
    pub dones: Vec<bool>,
}

impl Minibatch {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Fixed-capacity circular experience store.
///
/// Transitions are kept in parallel arrays. Once the buffer is full, each
/// append overwrites the oldest slot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayBuffer {
    states: Array2<f32>,
    actions: Vec<usize>,
    rewards: Array1<f32>,
    next_states: Array2<f32>,
    dones: Vec<bool>,
    len: usize,
    cursor: usize,
}

impl ReplayBuffer {
    pub fn new(state_size: usize, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DqnError::invalid_parameter("capacity", "Buffer capacity must be positive"));
        }
        if state_size == 0 {
            return Err(DqnError::invalid_parameter("state_size", "State size must be positive"));
        }
        Ok(ReplayBuffer {
            states: Array2::zeros((capacity, state_size)),
            actions: vec![0; capacity],
            rewards: Array1::zeros(capacity),
            next_states: Array2::zeros((capacity, state_size)),
            dones: vec![false; capacity],
            len: 0,
            cursor: 0,
        })
    }

    /// Store a transition in the cursor slot and advance the cursor.
    pub fn append(
        &mut self,
        state: ArrayView1<f32>,
        action: usize,
        reward: f32,
        next_state: ArrayView1<f32>,
        done: bool,
    ) -> Result<()> {
        let state_size = self.state_size();
        for (name, len) in [("state", state.len()), ("next_state", next_state.len())] {
            if len != state_size {
                return Err(DqnError::dimension_mismatch(
                    format!("{} of length {}", name, state_size),
                    format!("{} of length {}", name, len),
                ));
            }
        }

        let slot = self.cursor;
        self.states.row_mut(slot).assign(&state);
        self.actions[slot] = action;
        self.rewards[slot] = reward;
        self.next_states.row_mut(slot).assign(&next_state);
        self.dones[slot] = done;

        self.cursor = (self.cursor + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        Ok(())
    }

    /// Draw `batch_size` transitions uniformly at random with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Minibatch> {
        if self.len == 0 {
            return Err(DqnError::EmptyBuffer(
                "cannot sample from a buffer with no transitions".to_string(),
            ));
        }

        let indices: Vec<usize> = (0..batch_size).map(|_| rng.gen_range(0..self.len)).collect();

        Ok(Minibatch {
            states: self.states.select(Axis(0), &indices),
            actions: indices.iter().map(|&i| self.actions[i]).collect(),
            rewards: self.rewards.select(Axis(0), &indices),
            next_states: self.next_states.select(Axis(0), &indices),
            dones: indices.iter().map(|&i| self.dones[i]).collect(),
        })
    }

    /// The transition stored in `slot`, if that slot has been written.
    pub fn get(&self, slot: usize) -> Option<Transition> {
        if slot >= self.len {
            return None;
        }
        Some(Transition {
            state: self.states.row(slot).to_owned(),
            action: self.actions[slot],
            reward: self.rewards[slot],
            next_state: self.next_states.row(slot).to_owned(),
            done: self.dones[slot],
        })
    }

    /// Iterate over every stored transition in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Transition> + '_ {
        (0..self.len).filter_map(move |slot| self.get(slot))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.actions.len()
    }

    pub fn state_size(&self) -> usize {
        self.states.ncols()
    }
}
