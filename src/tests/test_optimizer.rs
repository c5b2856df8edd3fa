use ndarray::{array, Array1, Array2};
use crate::estimator::{LayerParameters, Parameters};
use crate::optimizer::{Adam, Momentum, Optimizer, OptimizerWrapper, RMSProp, SGD};

fn single_layer(weights: Array2<f32>, biases: Array1<f32>) -> Parameters {
    Parameters::new(vec![LayerParameters { weights, biases }])
}

fn ones() -> Parameters {
    single_layer(array![[1.0, 1.0], [1.0, 1.0]], array![1.0, 1.0])
}

fn gradients() -> Parameters {
    single_layer(array![[0.1, 0.2], [0.3, 0.4]], array![0.1, 0.2])
}

fn assert_close(actual: &Array2<f32>, expected: &Array2<f32>) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!((a - e).abs() < 1e-5, "{} != {}", a, e);
    }
}

#[test]
fn test_sgd_update() {
    let mut sgd = SGD::new(0.01);
    let updated = sgd.optimize(ones(), &gradients()).unwrap();

    assert_close(&updated.layers[0].weights, &array![[0.999, 0.998], [0.997, 0.996]]);
    assert!((updated.layers[0].biases[0] - 0.999).abs() < 1e-6);
    assert!((updated.layers[0].biases[1] - 0.998).abs() < 1e-6);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    let mut adam = Adam::new(0.01, 0.9, 0.999, 1e-8);
    assert_eq!(adam.t, 0);

    let updated = adam.optimize(ones(), &gradients()).unwrap();

    // Bias correction makes the first step lr * g / |g|
    assert_close(&updated.layers[0].weights, &array![[0.99, 0.99], [0.99, 0.99]]);
    assert_eq!(adam.t, 1);
}

#[test]
fn test_adam_counts_one_step_per_call() {
    let mut adam = Adam::default();
    let mut parameters = ones();
    for _ in 0..3 {
        parameters = adam.optimize(parameters, &gradients()).unwrap();
    }
    assert_eq!(adam.t, 3);
}

#[test]
fn test_rmsprop() {
    let mut rmsprop = RMSProp::new(0.01, 0.9, 1e-8);
    let updated = rmsprop.optimize(ones(), &gradients()).unwrap();

    assert!(updated.layers[0].weights[[0, 0]] < 1.0);
    assert!(updated.layers[0].weights[[0, 1]] < 1.0);
    assert!(updated.layers[0].biases.iter().all(|&b| b < 1.0));
}

#[test]
fn test_momentum_accumulates_velocity() {
    let mut momentum = Momentum::new(0.1, 0.5);
    let grads = single_layer(array![[1.0]], array![0.0]);
    let start = single_layer(array![[0.0]], array![0.0]);

    let first = momentum.optimize(start, &grads).unwrap();
    assert!((first.layers[0].weights[[0, 0]] + 0.1).abs() < 1e-6);

    // v = 0.5 * 1 + 1 = 1.5, w = -0.1 - 0.15
    let second = momentum.optimize(first, &grads).unwrap();
    assert!((second.layers[0].weights[[0, 0]] + 0.25).abs() < 1e-6);
}

#[test]
fn test_shape_mismatch_is_rejected() {
    let wrong = single_layer(array![[0.1, 0.2, 0.3]], array![0.1, 0.2, 0.3]);

    assert!(SGD::default().optimize(ones(), &wrong).is_err());
    assert!(Momentum::default().optimize(ones(), &wrong).is_err());
    assert!(RMSProp::default().optimize(ones(), &wrong).is_err());
    assert!(Adam::default().optimize(ones(), &wrong).is_err());
}

#[test]
fn test_state_follows_new_layout() {
    let mut adam = Adam::default();
    adam.optimize(ones(), &gradients()).unwrap();

    let wider = single_layer(Array2::ones((2, 3)), Array1::ones(3));
    let wider_grads = single_layer(Array2::from_elem((2, 3), 0.1), Array1::from_elem(3, 0.1));
    let updated = adam.optimize(wider, &wider_grads).unwrap();
    assert_eq!(updated.layers[0].weights.dim(), (2, 3));
}

#[test]
fn test_zero_gradients_leave_parameters_finite() {
    let zeros = ones().zeros_like();
    let mut optimizers = vec![
        OptimizerWrapper::SGD(SGD::default()),
        OptimizerWrapper::Momentum(Momentum::default()),
        OptimizerWrapper::RMSProp(RMSProp::default()),
        OptimizerWrapper::Adam(Adam::default()),
    ];

    for optimizer in optimizers.iter_mut() {
        let updated = optimizer.optimize(ones(), &zeros).unwrap();
        assert_eq!(updated, ones());
    }
}

#[test]
fn test_optimizer_wrapper() {
    let mut sgd_wrapper = OptimizerWrapper::SGD(SGD::new(0.01));
    let updated = sgd_wrapper.optimize(ones(), &gradients()).unwrap();
    assert_close(&updated.layers[0].weights, &array![[0.999, 0.998], [0.997, 0.996]]);

    let mut adam_wrapper = OptimizerWrapper::Adam(Adam::new(0.01, 0.9, 0.999, 1e-8));
    let updated = adam_wrapper.optimize(ones(), &gradients()).unwrap();
    assert!(updated.layers[0].weights[[0, 0]] < 1.0);

    let json = serde_json::to_string(&adam_wrapper).unwrap();
    let restored: OptimizerWrapper = serde_json::from_str(&json).unwrap();
    assert!(matches!(restored, OptimizerWrapper::Adam(ref adam) if adam.t == 1));
}
