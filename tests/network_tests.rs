use ferrite_cnn::network::{ConvolutionalDesc, InputDesc, PoolingDesc};
use ferrite_cnn::{ActivationFunction, Layer, LayerDesc, LossType, Sequential, SequentialDesc, Shape, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn small_cnn() -> SequentialDesc {
    SequentialDesc::new("small-cnn", LossType::CrossEntropy, 0.05)
        .input(1, 6, 6)
        .convolutional(2, 3, 3, Some(ActivationFunction::ReLU))
        .pooling(2, 2)
        .flatten()
        .fully_connected(3, Some(ActivationFunction::Softmax))
}

fn ramp(shape: Shape, scale: f32) -> Tensor {
    let values: Vec<f32> = (0..shape.size()).map(|i| (i as f32 * scale).sin()).collect();
    Tensor::from_vec(shape.channels, shape.rows, shape.cols, &values)
}

// =============================================================================
// Construction and shape inference
// =============================================================================

#[test]
fn shapes_are_inferred_through_the_chain() {
    let net = Sequential::with_rng(small_cnn(), &mut StdRng::seed_from_u64(1));

    let names: Vec<&str> = net.layers().iter().map(Layer::name).collect();
    assert_eq!(
        names,
        [
            "Convolutional",
            "Activation",
            "MaxPooling",
            "Flatten",
            "FullyConnected",
            "Activation"
        ]
    );

    let shapes: Vec<Shape> = net.layers().iter().map(Layer::output_shape).collect();
    assert_eq!(
        shapes,
        [
            Shape::new(2, 4, 4),
            Shape::new(2, 4, 4),
            Shape::new(2, 2, 2),
            Shape::new(1, 8, 1),
            Shape::new(1, 3, 1),
            Shape::new(1, 3, 1),
        ]
    );
    assert_eq!(net.input_shape(), Shape::new(1, 6, 6));
    assert_eq!(net.output_shape(), Shape::new(1, 3, 1));
    assert_eq!(net.layer_count(), 6);
}

#[test]
fn each_layer_input_matches_previous_output() {
    let desc = SequentialDesc::new("deep", LossType::Mse, 0.01)
        .input(3, 9, 8)
        .convolutional(2, 2, 3, None)
        .pooling(2, 3)
        .convolutional(1, 1, 1, Some(ActivationFunction::Tanh))
        .flatten()
        .fully_connected(4, Some(ActivationFunction::Sigmoid))
        .fully_connected(2, None);
    let net = Sequential::with_rng(desc, &mut StdRng::seed_from_u64(2));

    let mut previous = net.input_shape();
    for layer in net.layers() {
        assert_eq!(layer.input_shape(), previous, "{}", layer.name());
        previous = layer.output_shape();
    }
    // (3, 9, 8) -> conv 3x2 kernels -> (6, 7, 7) -> pool 3x2 tiles -> (6, 2, 3)
    assert_eq!(net.layers()[1].output_shape(), Shape::new(6, 2, 3));
    assert_eq!(net.output_shape(), Shape::new(1, 2, 1));
}

#[test]
fn pooling_tile_height_spans_rows_and_width_spans_columns() {
    // Three columns wide, two rows high.
    let desc = SequentialDesc::new("pool", LossType::Mse, 0.0)
        .input(1, 6, 6)
        .pooling(3, 2);
    let mut net = Sequential::new(desc);
    assert_eq!(net.output_shape(), Shape::new(1, 3, 2));

    let values: Vec<f32> = (0..36).map(|i| i as f32).collect();
    let input = Tensor::from_vec(1, 6, 6, &values);
    // Each tile's maximum is its bottom-right corner.
    assert_eq!(net.feed_forward(&input).as_slice(), &[8.0, 11.0, 20.0, 23.0, 32.0, 35.0]);
}

#[test]
fn activation_free_layers_are_not_expanded() {
    let desc = SequentialDesc::new("linear", LossType::Mse, 0.1)
        .input(1, 4, 1)
        .fully_connected(2, None);
    let net = Sequential::new(desc);
    assert_eq!(net.layer_count(), 1);
    assert_eq!(net.layers()[0].parameter_count(), 2 * 4 + 2);
}

#[test]
fn fresh_biases_are_zero() {
    let net = Sequential::with_rng(small_cnn(), &mut StdRng::seed_from_u64(5));
    let Layer::FullyConnected(fc) = &net.layers()[4] else {
        panic!("expected a fully-connected layer");
    };
    assert!(fc.biases.as_slice().iter().all(|&b| b == 0.0));
    assert!(fc.weights.as_slice().iter().any(|&w| w != 0.0));
}

#[test]
fn same_seed_builds_identical_networks() {
    let a = Sequential::with_rng(small_cnn(), &mut StdRng::seed_from_u64(9));
    let b = Sequential::with_rng(small_cnn(), &mut StdRng::seed_from_u64(9));
    let (Layer::Convolutional(ka), Layer::Convolutional(kb)) = (&a.layers()[0], &b.layers()[0]) else {
        panic!("expected convolutional layers");
    };
    assert_eq!(ka.kernel, kb.kernel);
}

#[test]
#[should_panic(expected = "must start with an Input layer")]
fn missing_input_is_fatal() {
    let desc = SequentialDesc::new("broken", LossType::Mse, 0.1).fully_connected(2, None);
    let _ = Sequential::new(desc);
}

#[test]
#[should_panic(expected = "Input may only appear as the first layer")]
fn repeated_input_is_fatal() {
    let desc = SequentialDesc::new("broken", LossType::Mse, 0.1)
        .input(1, 2, 1)
        .input(1, 2, 1);
    let _ = Sequential::new(desc);
}

#[test]
#[should_panic(expected = "add a Flatten layer first")]
fn dense_after_conv_without_flatten_is_fatal() {
    let desc = SequentialDesc::new("broken", LossType::Mse, 0.1)
        .input(1, 4, 4)
        .convolutional(1, 3, 3, None)
        .fully_connected(2, None);
    let _ = Sequential::new(desc);
}

// =============================================================================
// Forward and backward passes
// =============================================================================

#[test]
fn feed_forward_produces_a_distribution() {
    let mut net = Sequential::with_rng(small_cnn(), &mut StdRng::seed_from_u64(4));
    let input = ramp(net.input_shape(), 0.37);

    let output = net.feed_forward(&input).clone();
    assert_eq!(output.shape(), Shape::new(1, 3, 1));
    assert!((output.sum() - 1.0).abs() < 1e-5);
    assert_eq!(net.output(), &output);
}

#[test]
fn feed_forward_is_deterministic_between_updates() {
    let mut net = Sequential::with_rng(small_cnn(), &mut StdRng::seed_from_u64(4));
    let input = ramp(net.input_shape(), 0.21);
    let first = net.feed_forward(&input).clone();
    let second = net.feed_forward(&input).clone();
    assert_eq!(first, second);
}

#[test]
#[should_panic(expected = "network input must be")]
fn wrong_input_shape_is_fatal() {
    let mut net = Sequential::new(small_cnn());
    let _ = net.feed_forward(&Tensor::new(1, 5, 5));
}

#[test]
fn feed_backward_updates_parameters_and_returns_loss() {
    let desc = SequentialDesc::new("mlp", LossType::Mse, 0.5)
        .input(1, 3, 1)
        .fully_connected(4, Some(ActivationFunction::Tanh))
        .fully_connected(2, Some(ActivationFunction::Sigmoid));
    let mut net = Sequential::with_rng(desc, &mut StdRng::seed_from_u64(8));

    let input = Tensor::from(vec![0.5, -1.0, 0.25]);
    let target = Tensor::from(vec![1.0, 0.0]);

    let before = net.layers()[0].clone();
    let output = net.feed_forward(&input).clone();
    let expected_loss = (&output - &target).sum_with(|d| d * d) / 2.0;
    let loss = net.feed_backward(&target);
    assert!((loss - expected_loss).abs() < 1e-6);

    let (Layer::FullyConnected(old), Layer::FullyConnected(new)) = (&before, &net.layers()[0]) else {
        panic!("expected fully-connected layers");
    };
    assert_ne!(old.weights, new.weights);
    assert_ne!(old.biases, new.biases);
}

#[test]
fn repeated_steps_on_one_example_reduce_its_loss() {
    let desc = SequentialDesc::new("mlp", LossType::Mse, 0.5)
        .input(1, 3, 1)
        .fully_connected(4, Some(ActivationFunction::Tanh))
        .fully_connected(2, Some(ActivationFunction::Sigmoid));
    let mut net = Sequential::with_rng(desc, &mut StdRng::seed_from_u64(8));

    let input = Tensor::from(vec![0.5, -1.0, 0.25]);
    let target = Tensor::from(vec![0.9, 0.1]);

    net.feed_forward(&input);
    let initial = net.loss(&target);
    for _ in 0..200 {
        net.feed_forward(&input);
        net.feed_backward(&target);
    }
    net.feed_forward(&input);
    assert!(net.loss(&target) < initial * 0.5, "{} vs {initial}", net.loss(&target));
}

#[test]
fn convolutional_network_trains_end_to_end() {
    let desc = SequentialDesc::new("cnn-mse", LossType::Mse, 0.5)
        .input(1, 6, 6)
        .convolutional(2, 3, 3, Some(ActivationFunction::ReLU))
        .pooling(2, 2)
        .flatten()
        .fully_connected(3, Some(ActivationFunction::Sigmoid));
    let mut net = Sequential::with_rng(desc, &mut StdRng::seed_from_u64(12));
    let input = ramp(net.input_shape(), 0.53);
    let target = Tensor::from(vec![0.1, 0.9, 0.1]);

    net.feed_forward(&input);
    let initial = net.loss(&target);
    for _ in 0..50 {
        net.feed_forward(&input);
        net.feed_backward(&target);
    }
    net.feed_forward(&input);
    let last = net.loss(&target);
    assert!(last.is_finite());
    assert!(last < initial, "{last} vs {initial}");
}

#[test]
fn softmax_output_blocks_every_update() {
    let mut net = Sequential::with_rng(small_cnn(), &mut StdRng::seed_from_u64(12));
    let input = ramp(net.input_shape(), 0.53);
    let target = Tensor::from(vec![0.0, 1.0, 0.0]);
    let before: Vec<Layer> = net.layers().to_vec();

    net.feed_forward(&input);
    let first = net.feed_backward(&target);
    for _ in 0..5 {
        net.feed_forward(&input);
        net.feed_backward(&target);
    }
    net.feed_forward(&input);
    assert_eq!(net.loss(&target), first);

    for (old, new) in before.iter().zip(net.layers()) {
        match (old, new) {
            (Layer::Convolutional(a), Layer::Convolutional(b)) => assert_eq!(a.kernel, b.kernel),
            (Layer::FullyConnected(a), Layer::FullyConnected(b)) => {
                assert_eq!(a.weights, b.weights);
                assert_eq!(a.biases, b.biases);
            }
            _ => {}
        }
    }
}

// =============================================================================
// Descriptions
// =============================================================================

#[test]
fn desc_is_kept_and_exposes_training_settings() {
    let net = Sequential::new(small_cnn());
    assert_eq!(net.desc(), &small_cnn());
    assert_eq!(net.loss_type(), LossType::CrossEntropy);
    assert_eq!(net.learning_rate(), 0.05);
}

#[test]
fn desc_json_uses_kind_and_description_tags() {
    let json = serde_json::to_value(small_cnn()).unwrap();
    assert_eq!(json["loss"], "cross_entropy");
    assert_eq!(json["layers"][0]["kind"], "Input");
    assert_eq!(json["layers"][0]["description"]["rows"], 6);
    assert_eq!(json["layers"][1]["kind"], "Convolutional");
    assert_eq!(json["layers"][1]["description"]["activation"], "ReLU");
    assert_eq!(json["layers"][2]["description"]["function"], "max");
}

#[test]
fn desc_json_fills_in_defaults() {
    let json = r#"{
        "learning_rate": 0.1,
        "layers": [
            { "kind": "Input", "description": { "channels": 1, "rows": 8, "cols": 8 } },
            { "kind": "Convolutional", "description": {} },
            { "kind": "Pooling", "description": {} },
            { "kind": "Flatten", "description": {} },
            { "kind": "FullyConnected", "description": { "num_outputs": 2 } }
        ]
    }"#;
    let desc: SequentialDesc = serde_json::from_str(json).unwrap();

    assert_eq!(desc.loss, LossType::Mse);
    assert_eq!(desc.name, "");
    assert_eq!(
        desc.layers[0],
        LayerDesc::Input(InputDesc { channels: 1, rows: 8, cols: 8 })
    );
    assert_eq!(desc.layers[1], LayerDesc::Convolutional(ConvolutionalDesc::default()));
    assert_eq!(desc.layers[2], LayerDesc::Pooling(PoolingDesc::default()));

    // (1, 8, 8) -> 8 kernels of 3x3 -> (8, 6, 6) -> pool -> (8, 3, 3) -> 72
    let net = Sequential::new(desc);
    assert_eq!(net.layers()[3].input_shape(), Shape::new(1, 72, 1));
}

#[test]
fn desc_survives_a_file_round_trip() {
    let path = std::env::temp_dir().join(format!("ferrite-cnn-desc-{}.json", std::process::id()));
    let path = path.to_str().unwrap().to_string();

    let desc = small_cnn();
    desc.save_json(&path).unwrap();
    let loaded = SequentialDesc::load_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, desc);
}

#[test]
fn loading_a_missing_file_is_an_error() {
    let missing = std::env::temp_dir().join("ferrite-cnn-does-not-exist.json");
    assert!(SequentialDesc::load_json(missing.to_str().unwrap()).is_err());
}
