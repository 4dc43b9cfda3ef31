use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activations::Activation;
use crate::error::TdqnError;
use crate::layers::WeightInit;
use crate::network::NeuralNetwork;

fn q_network(seed: u64) -> NeuralNetwork {
    let mut rng = StdRng::seed_from_u64(seed);
    NeuralNetwork::q_network(4, &[16, 8], 2, &mut rng).unwrap()
}

#[test]
fn test_network_creation() {
    let network = q_network(0);
    assert_eq!(network.layers.len(), 3);
    assert_eq!(network.input_size(), 4);
    assert_eq!(network.output_size(), 2);
    assert_eq!(network.layers[0].activation, Activation::Relu);
    assert_eq!(network.layers[1].activation, Activation::Relu);
    assert_eq!(network.layers[2].activation, Activation::Linear);
    assert!(network.layers.iter().all(|l| l.biases.iter().all(|&b| b == 0.0)));
}

#[test]
fn test_network_rejects_bad_layout() {
    let mut rng = StdRng::seed_from_u64(0);
    let result = NeuralNetwork::new(&[4], &[], WeightInit::HeUniform, &mut rng);
    assert!(matches!(result, Err(TdqnError::InvalidParameter { .. })));

    let result = NeuralNetwork::new(&[4, 2], &[Activation::Relu, Activation::Linear], WeightInit::HeUniform, &mut rng);
    assert!(matches!(result, Err(TdqnError::InvalidParameter { .. })));
}

#[test]
fn test_network_predict_shapes() {
    let network = q_network(1);
    let batch = Array2::<f64>::zeros((5, 4));
    assert_eq!(network.predict(batch.view()).unwrap().dim(), (5, 2));

    let one = network.predict_one(array![0.1, 0.2, 0.3, 0.4].view()).unwrap();
    assert_eq!(one.len(), 2);

    let wrong = Array2::<f64>::zeros((5, 3));
    assert!(matches!(network.predict(wrong.view()), Err(TdqnError::DimensionMismatch { .. })));
}

#[test]
fn test_network_predict_matches_rows() {
    let network = q_network(2);
    let batch = array![[0.1, -0.2, 0.3, 0.0], [1.0, 0.5, -0.5, 0.25]];
    let all = network.predict(batch.view()).unwrap();
    for (i, row) in batch.rows().into_iter().enumerate() {
        let one = network.predict_one(row).unwrap();
        for j in 0..2 {
            assert_abs_diff_eq!(all[[i, j]], one[j], epsilon = 1e-12);
        }
    }
}

#[test]
fn test_network_training_reduces_loss() {
    let mut network = q_network(3).with_rmsprop(0.95, 0.01);
    let inputs = array![
        [0.1, 0.2, -0.1, 0.0],
        [-0.3, 0.1, 0.2, 0.4],
        [0.5, -0.5, 0.0, 0.1],
        [0.0, 0.3, 0.3, -0.2]
    ];
    let targets = array![[1.0, -1.0], [0.5, 0.0], [-1.0, 1.0], [0.0, 0.5]];

    let first = network.train_minibatch(inputs.view(), targets.view(), 0.001).unwrap();
    let mut last = first;
    for _ in 0..200 {
        last = network.train_minibatch(inputs.view(), targets.view(), 0.001).unwrap();
    }
    assert!(last < first, "loss did not decrease: {} -> {}", first, last);
}

#[test]
fn test_network_train_rejects_bad_targets() {
    let mut network = q_network(4);
    let inputs = Array2::<f64>::zeros((3, 4));
    let targets = Array2::<f64>::zeros((3, 3));
    let result = network.train_minibatch(inputs.view(), targets.view(), 0.01);
    assert!(matches!(result, Err(TdqnError::DimensionMismatch { .. })));

    let empty = Array2::<f64>::zeros((0, 4));
    let result = network.train_minibatch(empty.view(), Array2::<f64>::zeros((0, 2)).view(), 0.01);
    assert!(matches!(result, Err(TdqnError::EmptyBuffer(_))));
}

#[test]
fn test_set_parameters_copies_values() {
    let source = q_network(5);
    let mut target = q_network(6);
    assert_ne!(source.parameters(), target.parameters());

    target.set_parameters(&source.parameters()).unwrap();
    assert_eq!(source.parameters(), target.parameters());

    let other = {
        let mut rng = StdRng::seed_from_u64(7);
        NeuralNetwork::q_network(4, &[8], 2, &mut rng).unwrap()
    };
    assert!(matches!(
        target.set_parameters(&other.parameters()),
        Err(TdqnError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_blend_toward() {
    let online = q_network(8).parameters();
    let mut target = q_network(9).parameters();
    let before = target.clone();

    target.blend_toward(&online, 0.1).unwrap();
    for ((t, b), o) in target.layers.iter().zip(&before.layers).zip(&online.layers) {
        for ((&t, &b), &o) in t.weights.iter().zip(b.weights.iter()).zip(o.weights.iter()) {
            assert_abs_diff_eq!(t, 0.9 * b + 0.1 * o, epsilon = 1e-12);
        }
    }

    let mut copy = before.clone();
    copy.blend_toward(&online, 1.0).unwrap();
    assert_eq!(copy, online);
}

#[test]
fn test_network_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("model.bin");
    let network = q_network(10).with_rmsprop(0.95, 0.01);
    network.save(&path).unwrap();

    let loaded = NeuralNetwork::load(&path).unwrap();
    assert_eq!(loaded.parameters(), network.parameters());

    let state = array![0.01, 0.02, -0.03, 0.04];
    assert_eq!(
        loaded.predict_one(state.view()).unwrap(),
        network.predict_one(state.view()).unwrap()
    );
}

#[test]
fn test_network_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = NeuralNetwork::load(dir.path().join("absent.bin"));
    assert!(matches!(result, Err(TdqnError::IoError(_))));
}
