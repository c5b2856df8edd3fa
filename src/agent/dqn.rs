use ndarray::{Array1, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::activations::Activation;
use crate::agent::config::{CheckpointSchedule, TrainConfig};
use crate::agent::traits::{BincodeCheckpoint, CheckpointSink, Environment};
use crate::error::{DqnError, Result};
use crate::estimator::ValueEstimator;
use crate::loss::LossKind;
use crate::network::NeuralNetwork;
use crate::optimizer::Optimizer;
use crate::replay_buffer::{Minibatch, ReplayBuffer};
use crate::visualization::text_plots;

/// Episodes averaged in the per-episode progress line.
const PROGRESS_WINDOW: usize = 30;

fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Deep Q-learning agent with experience replay and a target network.
///
/// The agent owns two estimators of identical shape. The *online* estimator
/// is trained after every environment step; the *target* estimator is only
/// used to compute learning targets and is overwritten with a full copy of
/// the online parameters once per finished episode.
///
/// Learning targets use the target network's maximum over next-state action
/// values (the standard DQN target). The online network is not consulted to
/// pick the next action, so this is not the decoupled Double DQN target even
/// though the two-network layout resembles it.
///
/// # Example
///
/// ```rust
/// use deepq::agent::DqnAgent;
/// use ndarray::array;
///
/// // 4 state features, one hidden layer, 2 actions, room for 10 000 transitions
/// let mut agent = DqnAgent::with_seed(&[4, 32, 2], 10_000, 7).unwrap();
/// agent.set_exploration_rate(0.0);
///
/// let action = agent.select_action(array![0.1, -0.2, 0.3, 0.0].view()).unwrap();
/// assert!(action < 2);
/// ```
#[derive(Serialize, Deserialize)]
pub struct DqnAgent<M = NeuralNetwork> {
    online: M,
    target: M,
    memory: ReplayBuffer,
    exploration_rate: f32,
    reward_log: Vec<f32>,
    checkpoint: Option<CheckpointSchedule>,
    #[serde(skip, default = "entropy_rng")]
    rng: StdRng,
    #[serde(skip)]
    interrupt: Option<Arc<AtomicBool>>,
}

impl DqnAgent<NeuralNetwork> {
    /// Agent with the default Q-network (LeakyReLU hidden layers, linear
    /// output, Huber loss) seeded from entropy.
    pub fn new(layer_sizes: &[usize], capacity: usize) -> Result<Self> {
        DqnAgentBuilder::new()
            .layer_sizes(layer_sizes)
            .capacity(capacity)
            .build()
    }

    /// Same as [`DqnAgent::new`] with a fixed seed for weight initialisation,
    /// exploration and sampling.
    pub fn with_seed(layer_sizes: &[usize], capacity: usize, seed: u64) -> Result<Self> {
        DqnAgentBuilder::new()
            .layer_sizes(layer_sizes)
            .capacity(capacity)
            .seed(seed)
            .build()
    }
}

impl<M: ValueEstimator> DqnAgent<M> {
    /// Assemble an agent from two estimators of identical shape. The target
    /// receives a value copy of the online parameters.
    pub fn from_estimators(online: M, mut target: M, capacity: usize, seed: Option<u64>) -> Result<Self> {
        if online.input_size() != target.input_size() || online.output_size() != target.output_size() {
            return Err(DqnError::dimension_mismatch(
                format!("{} -> {}", online.input_size(), online.output_size()),
                format!("{} -> {}", target.input_size(), target.output_size()),
            ));
        }
        if online.output_size() == 0 {
            return Err(DqnError::invalid_parameter("estimator", "Estimator has no actions"));
        }
        target.set_parameters(online.parameters())?;
        let memory = ReplayBuffer::new(online.input_size(), capacity)?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(DqnAgent {
            online,
            target,
            memory,
            exploration_rate: 1.0,
            reward_log: Vec::new(),
            checkpoint: None,
            rng,
            interrupt: None,
        })
    }

    pub fn online(&self) -> &M {
        &self.online
    }

    pub fn target(&self) -> &M {
        &self.target
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn action_count(&self) -> usize {
        self.online.output_size()
    }

    pub fn exploration_rate(&self) -> f32 {
        self.exploration_rate
    }

    pub fn set_exploration_rate(&mut self, rate: f32) {
        self.exploration_rate = rate.clamp(0.0, 1.0);
    }

    /// Total reward of every completed episode, across all `train` calls.
    pub fn reward_log(&self) -> &[f32] {
        &self.reward_log
    }

    /// Save the agent every `every` completed episodes to
    /// `{prefix}_episode{n}.bin`. `every == 0` turns checkpointing off.
    pub fn set_save_freq<S: Into<String>>(&mut self, every: usize, prefix: S) {
        self.checkpoint = if every == 0 {
            None
        } else {
            Some(CheckpointSchedule { every, prefix: prefix.into() })
        };
    }

    pub fn checkpoint_schedule(&self) -> Option<&CheckpointSchedule> {
        self.checkpoint.as_ref()
    }

    /// Install a flag that stops training after the current step once set.
    pub fn set_interrupt(&mut self, flag: Arc<AtomicBool>) {
        self.interrupt = Some(flag);
    }

    fn interrupt_requested(&self) -> bool {
        self.interrupt
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::SeqCst))
    }

    /// Store a transition in the replay memory.
    pub fn remember(
        &mut self,
        state: ArrayView1<f32>,
        action: usize,
        reward: f32,
        next_state: ArrayView1<f32>,
        done: bool,
    ) -> Result<()> {
        self.memory.append(state, action, reward, next_state, done)
    }

    /// Online action values for a single state.
    pub fn predict(&mut self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.online.feed(state.insert_axis(Axis(0)))?;
        Ok(self.online.output()?.row(0).to_owned())
    }

    /// Index of the highest online action value; ties go to the lowest index.
    pub fn greedy_action(&mut self, state: ArrayView1<f32>) -> Result<usize> {
        let values = self.predict(state)?;
        Ok(argmax(values.view()))
    }

    /// Epsilon-greedy action selection.
    pub fn select_action(&mut self, state: ArrayView1<f32>) -> Result<usize> {
        if self.rng.gen::<f32>() <= self.exploration_rate {
            let actions = self.action_count();
            Ok(self.rng.gen_range(0..actions))
        } else {
            self.greedy_action(state)
        }
    }

    /// Learning targets for a sampled minibatch, computed with the target
    /// estimator in one batched pass.
    pub(crate) fn td_targets(&mut self, batch: &Minibatch, discount_factor: f32) -> Result<Array1<f32>> {
        self.target.feed(batch.next_states.view())?;
        let next_values = self.target.output()?;

        let targets = (0..batch.len())
            .map(|i| {
                if batch.dones[i] {
                    batch.rewards[i]
                } else {
                    let best_next = next_values
                        .row(i)
                        .iter()
                        .fold(f32::NEG_INFINITY, |max, &val| max.max(val));
                    batch.rewards[i] + discount_factor * best_next
                }
            })
            .collect();
        Ok(targets)
    }

    /// Sample a minibatch and apply one optimizer step per sampled
    /// transition to the online estimator.
    ///
    /// Returns `Ok(false)` without touching any state while the memory holds
    /// fewer than `batch_size` transitions.
    pub fn learn_minibatch<O: Optimizer + ?Sized>(
        &mut self,
        batch_size: usize,
        optimizer: &mut O,
        discount_factor: f32,
    ) -> Result<bool> {
        if batch_size == 0 {
            return Err(DqnError::invalid_parameter("batch_size", "Must be at least 1"));
        }
        if self.memory.len() < batch_size {
            trace!(stored = self.memory.len(), batch_size, "Warming up replay memory");
            return Ok(false);
        }

        let batch = self.memory.sample(batch_size, &mut self.rng)?;
        let targets = self.td_targets(&batch, discount_factor)?;

        for i in 0..batch.len() {
            self.online.feed(batch.states.row(i).insert_axis(Axis(0)))?;
            let mut supervised = self.online.output()?.row(0).to_owned();
            let action = batch.actions[i];
            if action >= supervised.len() {
                return Err(DqnError::InvalidAction {
                    action,
                    max_actions: supervised.len(),
                });
            }
            supervised[action] = targets[i];

            let gradients = self.online.backpropagate(supervised.view())?;
            let parameters = optimizer.optimize(self.online.parameters(), &gradients)?;
            self.online.set_parameters(parameters)?;
        }

        Ok(true)
    }

    /// Overwrite the target estimator with a copy of the online parameters.
    pub fn sync_target(&mut self) -> Result<()> {
        self.target.set_parameters(self.online.parameters())?;
        debug!(episodes = self.reward_log.len(), "Synchronized target estimator");
        Ok(())
    }

    fn decay_exploration(&mut self, config: &TrainConfig) {
        if self.exploration_rate > config.min_exploration_rate {
            self.exploration_rate =
                (self.exploration_rate * config.exploration_decay).max(config.min_exploration_rate);
        }
    }

    /// Train with a custom checkpoint sink. See [`DqnAgent::train`].
    pub fn train_with_sink<E, O, S>(
        &mut self,
        env: &mut E,
        optimizer: &mut O,
        config: &TrainConfig,
        sink: &mut S,
    ) -> Result<()>
    where
        E: Environment + ?Sized,
        O: Optimizer + ?Sized,
        S: CheckpointSink<M> + ?Sized,
    {
        config.validate()?;
        if let Some(rate) = config.exploration_rate {
            self.exploration_rate = rate;
        }

        let outcome = self.run_episodes(env, optimizer, config, sink);
        let closed = env.close();

        match outcome {
            Ok(()) => closed,
            Err(err) => {
                if let DqnError::Interrupted = err {
                    warn!(episodes = self.reward_log.len(), "Training interrupted, environment closed");
                }
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "Failed to close environment");
                }
                Err(err)
            }
        }
    }

    fn run_episodes<E, O, S>(
        &mut self,
        env: &mut E,
        optimizer: &mut O,
        config: &TrainConfig,
        sink: &mut S,
    ) -> Result<()>
    where
        E: Environment + ?Sized,
        O: Optimizer + ?Sized,
        S: CheckpointSink<M> + ?Sized,
    {
        for run in 1..=config.episodes {
            let (total_reward, steps) = self.run_episode(env, optimizer, config)?;

            self.decay_exploration(config);
            self.sync_target()?;
            self.reward_log.push(total_reward);

            let episode = self.reward_log.len();
            info!(
                episode,
                steps,
                reward = total_reward,
                exploration = self.exploration_rate,
                "Episode finished"
            );
            let recent = &self.reward_log[episode.saturating_sub(PROGRESS_WINDOW)..];
            let avg_reward = recent.iter().sum::<f32>() / recent.len() as f32;
            debug!(
                "{}",
                text_plots::training_progress(run, config.episodes, avg_reward, self.exploration_rate)
            );

            if let Some(schedule) = &self.checkpoint {
                if schedule.is_due(episode) {
                    let path = schedule.path_for(episode);
                    sink.save(self, &path)?;
                    info!(path = %path.display(), episode, "Saved checkpoint");
                }
            }
        }
        Ok(())
    }

    fn run_episode<E, O>(&mut self, env: &mut E, optimizer: &mut O, config: &TrainConfig) -> Result<(f32, usize)>
    where
        E: Environment + ?Sized,
        O: Optimizer + ?Sized,
    {
        let mut state = env.reset()?;
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut done = false;

        while !done {
            let action = self.select_action(state.view())?;
            let (next_state, reward, finished) = env.step(action)?;
            if config.render {
                env.render()?;
            }

            total_reward += reward;
            steps += 1;

            self.memory.append(state.view(), action, reward, next_state.view(), finished)?;
            state = next_state;
            done = finished;

            self.learn_minibatch(config.batch_size, optimizer, config.discount_factor)?;

            if self.interrupt_requested() {
                return Err(DqnError::Interrupted);
            }
        }

        Ok((total_reward, steps))
    }

    /// Running mean of the reward log drawn as an ASCII plot.
    pub fn plot_performance(&self, window: usize, width: usize, height: usize) -> String {
        text_plots::plot_performance(&self.reward_log, window, width, height)
    }
}

impl<M: ValueEstimator + Serialize> DqnAgent<M> {
    /// Run `config.episodes` episodes against `env`, learning after every
    /// step and synchronizing the target estimator after every episode.
    ///
    /// Checkpoints, when configured with [`DqnAgent::set_save_freq`], are
    /// written as bincode files. The environment is closed when training
    /// ends, fails, or is interrupted.
    pub fn train<E, O>(&mut self, env: &mut E, optimizer: &mut O, config: &TrainConfig) -> Result<()>
    where
        E: Environment + ?Sized,
        O: Optimizer + ?Sized,
    {
        self.train_with_sink(env, optimizer, config, &mut BincodeCheckpoint)
    }
}

impl<M: Serialize> DqnAgent<M> {
    /// Save the agent to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }
}

impl<M: DeserializeOwned> DqnAgent<M> {
    /// Load agent from disk. The random generator is re-seeded from entropy.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        let agent: Self = bincode::deserialize(&data)?;
        Ok(agent)
    }
}

fn argmax(values: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = i;
        }
    }
    best
}

/// Builder pattern for a [`DqnAgent`] backed by [`NeuralNetwork`]s.
pub struct DqnAgentBuilder {
    layer_sizes: Vec<usize>,
    capacity: usize,
    hidden_activation: Activation,
    loss: LossKind,
    seed: Option<u64>,
    exploration_rate: f32,
}

impl DqnAgentBuilder {
    pub fn new() -> Self {
        DqnAgentBuilder {
            layer_sizes: vec![],
            capacity: 10_000,
            hidden_activation: Activation::LeakyRelu { alpha: 0.01 },
            loss: LossKind::default(),
            seed: None,
            exploration_rate: 1.0,
        }
    }

    pub fn layer_sizes(mut self, sizes: &[usize]) -> Self {
        self.layer_sizes = sizes.to_vec();
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn hidden_activation(mut self, activation: Activation) -> Self {
        self.hidden_activation = activation;
        self
    }

    pub fn loss(mut self, loss: LossKind) -> Self {
        self.loss = loss;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn exploration_rate(mut self, rate: f32) -> Self {
        self.exploration_rate = rate;
        self
    }

    pub fn build(self) -> Result<DqnAgent<NeuralNetwork>> {
        if self.layer_sizes.len() < 2 {
            return Err(DqnError::invalid_parameter(
                "layer_sizes",
                "Must have at least 2 layers",
            ));
        }

        let mut activations = vec![self.hidden_activation; self.layer_sizes.len() - 2];
        activations.push(Activation::Linear);

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let online = NeuralNetwork::new(&self.layer_sizes, &activations, self.loss, &mut rng)?;
        let target = NeuralNetwork::new(&self.layer_sizes, &activations, self.loss, &mut rng)?;

        let mut agent = DqnAgent::from_estimators(online, target, self.capacity, None)?;
        agent.rng = rng;
        agent.set_exploration_rate(self.exploration_rate);
        Ok(agent)
    }
}

impl Default for DqnAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
