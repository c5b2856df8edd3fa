/// A macro to create a new `DenseLayer` with the weight initialization that
/// suits its activation. Evaluates to a `Result<DenseLayer>`.
///
/// # Examples
///
/// ```
/// use deepq::activations::Activation;
/// use deepq::create_layer;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let layer = create_layer!(4, 32, Activation::Relu, &mut rng).unwrap();
/// assert_eq!(layer.output_size(), 32);
/// ```
#[macro_export]
macro_rules! create_layer {
    ($input_size:expr, $output_size:expr, $activation:expr, $rng:expr) => {{
        let activation = $activation;
        $crate::layers::DenseLayer::new(
            $input_size,
            $output_size,
            activation,
            $crate::layers::WeightInit::for_activation(&activation),
            $rng,
        )
    }};
}

/// A macro to create a new `NeuralNetwork` from `(inputs, outputs, activation)`
/// triples. Evaluates to a `Result<NeuralNetwork>`.
///
/// # Examples
///
/// ```
/// use deepq::activations::Activation;
/// use deepq::create_network;
/// use deepq::estimator::ValueEstimator;
/// use deepq::loss::LossKind;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let network = create_network!(LossKind::default(), &mut rng;
///     (4, 32, Activation::Relu),
///     (32, 2, Activation::Linear)
/// ).unwrap();
/// assert_eq!(network.output_size(), 2);
/// ```
///
/// Consecutive layers must agree on their shared width, otherwise the result
/// is a `DimensionMismatch`.
#[macro_export]
macro_rules! create_network {
    ($loss:expr, $rng:expr; $( ($input_size:expr, $output_size:expr, $activation:expr) ),+ $(,)?) => {{
        let rng = $rng;
        vec![$( $crate::create_layer!($input_size, $output_size, $activation, &mut *rng) ),+]
            .into_iter()
            .collect::<$crate::error::Result<Vec<$crate::layers::DenseLayer>>>()
            .and_then(|layers| $crate::network::NeuralNetwork::from_layers(layers, $loss))
    }};
}
