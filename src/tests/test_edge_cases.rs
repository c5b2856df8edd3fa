use ndarray::{array, Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::activations::Activation;
use crate::estimator::ValueEstimator;
use crate::layers::{DenseLayer, WeightInit};
use crate::loss::{HuberLoss, Loss, LossKind, MSE};
use crate::network::NeuralNetwork;

#[test]
fn test_activation_edge_cases() {
    // Test with extreme values
    let activations = vec![
        Activation::Relu,
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::LeakyRelu { alpha: 0.01 },
    ];

    for activation in activations {
        let mut large_pos = array![1e10, 1e20, f32::MAX / 2.0];
        activation.apply(&mut large_pos);
        for &val in large_pos.iter() {
            assert!(val.is_finite(), "Activation {:?} produced non-finite value", activation);
        }

        let mut large_neg = array![-1e10, -1e20, f32::MIN / 2.0];
        activation.apply(&mut large_neg);
        for &val in large_neg.iter() {
            assert!(val.is_finite(), "Activation {:?} produced non-finite value", activation);
        }

        let mut zeros = array![0.0, -0.0, 0.0];
        activation.apply(&mut zeros);
        for &val in zeros.iter() {
            assert!(val.is_finite());
        }
    }

    // ReLU maps NaN to 0
    let mut nans = array![f32::NAN, 1.0];
    Activation::Relu.apply(&mut nans);
    assert_eq!(nans[0], 0.0);
}

#[test]
fn test_gradient_edge_cases() {
    let activations = vec![
        Activation::Relu,
        Activation::LeakyRelu { alpha: 0.01 },
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::Linear,
    ];

    for activation in activations {
        let pre_activation = array![[0.0, 1.0, -1.0, 1e6, -1e6]];
        let deriv = activation.derivative_batch(pre_activation.view());

        for &g in deriv.iter() {
            assert!(g.is_finite(), "Gradient is not finite for {:?}", activation);
            assert!((0.0..=1.0).contains(&g), "Gradient out of expected range");
        }
    }
}

#[test]
fn test_network_numerical_stability() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut network = NeuralNetwork::new(
        &[2, 1000, 1], // Very wide hidden layer
        &[Activation::Sigmoid, Activation::Sigmoid],
        LossKind::default(),
        &mut rng,
    )
    .unwrap();

    let extreme_inputs = vec![
        array![1e-10, 1e-10],
        array![1e10, -1e10],
        array![0.0, 0.0],
        array![1.0, -1.0],
    ];

    for input in extreme_inputs {
        let output = network.predict(input.view()).unwrap();
        assert!(output[0].is_finite(), "Network produced non-finite output");
        assert!(output[0] >= 0.0 && output[0] <= 1.0, "Sigmoid output out of range");
    }
}

#[test]
fn test_weight_init_bounds() {
    let inits = vec![
        WeightInit::XavierUniform,
        WeightInit::XavierNormal,
        WeightInit::HeUniform,
        WeightInit::HeNormal,
        WeightInit::Uniform { min: -0.1, max: 0.1 },
    ];
    let mut rng = StdRng::seed_from_u64(2);

    for init in inits {
        let layer = DenseLayer::new(100, 200, Activation::Relu, init, &mut rng).unwrap();

        for &w in layer.weights.iter() {
            assert!(w.is_finite(), "Weight initialization {:?} produced non-finite values", init);
        }

        let max_weight = layer.weights.iter().map(|&x| x.abs()).fold(0.0f32, f32::max);
        assert!(max_weight < 10.0, "Weight initialization {:?} produced unreasonably large values", init);
    }
}

#[test]
fn test_loss_functions_edge_cases() {
    let predictions = array![0.5, 0.5, 0.5];
    let targets = array![0.5, 0.5, 0.5];

    let mse = MSE;
    assert_eq!(mse.compute(predictions.view(), targets.view()), 0.0);
    assert_eq!(mse.gradient(predictions.view(), targets.view()), Array1::<f32>::zeros(3));

    // Huber gradient is clipped to delta outside the quadratic zone
    let huber = HuberLoss { delta: 1.0 };
    let far = array![10.0, -10.0, 0.5];
    let zeros = array![0.0, 0.0, 0.0];
    let gradient = huber.gradient(far.view(), zeros.view());
    assert!((gradient[0] - 1.0 / 3.0).abs() < 1e-6);
    assert!((gradient[1] + 1.0 / 3.0).abs() < 1e-6);
    assert!((gradient[2] - 0.5 / 3.0).abs() < 1e-6);

    let at_threshold = array![1.0, -1.0, 0.0];
    let huber_loss = huber.compute(at_threshold.view(), zeros.view());
    assert!((huber_loss - 1.0 / 3.0).abs() < 1e-6);

    let wrapped = LossKind::Huber(huber);
    assert_eq!(
        wrapped.gradient(far.view(), zeros.view()),
        huber.gradient(far.view(), zeros.view())
    );
}

#[test]
fn test_single_output_network() {
    let layer = DenseLayer::from_parameters(Array2::ones((3, 1)), Array1::zeros(1), Activation::Linear).unwrap();
    let mut network = NeuralNetwork::from_layers(vec![layer], LossKind::default()).unwrap();

    network.feed(array![[1.0, 2.0, 3.0]].view()).unwrap();
    assert_eq!(network.output().unwrap()[[0, 0]], 6.0);

    let gradients = network.backpropagate(array![6.0].view()).unwrap();
    assert!(gradients.layers[0].weights.iter().all(|&g| g == 0.0));
}
