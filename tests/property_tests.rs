#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;
    use deepq::activations::Activation;
    use deepq::estimator::ValueEstimator;
    use deepq::loss::LossKind;
    use deepq::network::NeuralNetwork;
    use deepq::replay_buffer::ReplayBuffer;
    use ndarray::{array, Array1};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // Strategy for generating valid layer sizes
    fn layer_sizes_strategy() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(1usize..=32, 2..=5)
    }

    // Strategy for generating valid input arrays
    fn input_array_strategy(size: usize) -> impl Strategy<Value = Array1<f32>> {
        prop::collection::vec(-100.0f32..100.0, size).prop_map(Array1::from_vec)
    }

    fn filled_buffer(capacity: usize, appends: usize) -> ReplayBuffer {
        let mut buffer = ReplayBuffer::new(1, capacity).unwrap();
        for i in 0..appends {
            let state = array![i as f32];
            buffer.append(state.view(), i, i as f32, state.view(), false).unwrap();
        }
        buffer
    }

    proptest! {
        #[test]
        fn test_wraparound_keeps_newest(capacity in 1usize..64, extra in 0usize..128) {
            let buffer = filled_buffer(capacity, capacity + extra);

            prop_assert_eq!(buffer.len(), capacity);

            let mut stored: Vec<usize> = buffer.iter().map(|t| t.action).collect();
            stored.sort_unstable();
            let expected: Vec<usize> = (extra..capacity + extra).collect();
            prop_assert_eq!(stored, expected);
        }

        #[test]
        fn test_len_never_exceeds_capacity(capacity in 1usize..64, appends in 0usize..200) {
            let buffer = filled_buffer(capacity, appends);
            prop_assert_eq!(buffer.len(), appends.min(capacity));
        }

        #[test]
        fn test_sample_draws_stored_rows(
            capacity in 1usize..64,
            appends in 1usize..128,
            batch_size in 1usize..64,
            seed in any::<u64>(),
        ) {
            let buffer = filled_buffer(capacity, appends);
            let oldest = appends.saturating_sub(capacity);
            let mut rng = StdRng::seed_from_u64(seed);

            let batch = buffer.sample(batch_size, &mut rng).unwrap();

            prop_assert_eq!(batch.len(), batch_size);
            prop_assert_eq!(batch.states.nrows(), batch_size);
            for (i, &action) in batch.actions.iter().enumerate() {
                prop_assert!(action >= oldest && action < appends);
                prop_assert_eq!(batch.states[[i, 0]], action as f32);
                prop_assert_eq!(batch.rewards[i], action as f32);
            }
        }

        #[test]
        fn test_output_shape(layer_sizes in layer_sizes_strategy(), seed in any::<u64>()) {
            let mut activations = vec![Activation::Relu; layer_sizes.len() - 2];
            activations.push(Activation::Linear);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut network = NeuralNetwork::new(&layer_sizes, &activations, LossKind::default(), &mut rng).unwrap();

            let input = Array1::zeros(layer_sizes[0]);
            let output = network.predict(input.view()).unwrap();

            prop_assert_eq!(output.len(), layer_sizes[layer_sizes.len() - 1]);
        }

        #[test]
        fn test_finite_outputs(input in input_array_strategy(10)) {
            let mut rng = StdRng::seed_from_u64(0);
            let mut network = NeuralNetwork::new(
                &[10, 5, 3],
                &[Activation::LeakyRelu { alpha: 0.01 }, Activation::Linear],
                LossKind::default(),
                &mut rng,
            ).unwrap();

            let output = network.predict(input.view()).unwrap();
            for &val in output.iter() {
                prop_assert!(val.is_finite());
            }
        }

        #[test]
        fn test_gradient_matches_parameter_layout(layer_sizes in layer_sizes_strategy()) {
            let mut activations = vec![Activation::Tanh; layer_sizes.len() - 2];
            activations.push(Activation::Linear);
            let mut rng = StdRng::seed_from_u64(1);
            let mut network = NeuralNetwork::new(&layer_sizes, &activations, LossKind::default(), &mut rng).unwrap();

            let input = Array1::<f32>::ones(layer_sizes[0]);
            network.feed(input.view().insert_axis(ndarray::Axis(0))).unwrap();
            let target = Array1::<f32>::zeros(layer_sizes[layer_sizes.len() - 1]);
            let gradients = network.backpropagate(target.view()).unwrap();

            prop_assert!(network.parameters().check_same_shape(&gradients).is_ok());
        }
    }
}
