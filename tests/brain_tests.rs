#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use ndarray::{Array2, array};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use runner_evo::simulation::brain::NeuralNet;
use runner_evo::simulation::error::Error;

#[test]
fn test_forward_applies_tanh_per_layer() {
    let net = NeuralNet::from_weights(
        vec![2, 2, 1],
        vec![array![[1.0, 0.0], [0.0, 1.0]], array![[1.0], [-1.0]]],
        0.0,
    )
    .unwrap();

    let out = net.forward(&[0.5, 0.25]).unwrap();

    let expected = (0.5f64.tanh() - 0.25f64.tanh()).tanh();
    assert_eq!(out.len(), 1);
    assert!((out[0] - expected).abs() < 1e-12);
}

#[test]
fn test_forward_rejects_wrong_input_length() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let net = NeuralNet::new(&[10, 16, 2], 0.05, &mut rng).unwrap();
    assert!(matches!(
        net.forward(&[0.0; 9]),
        Err(Error::InputLength { expected: 10, found: 9 })
    ));
}

#[test]
fn test_from_weights_rejects_bad_shapes() {
    let result = NeuralNet::from_weights(vec![3, 2], vec![Array2::zeros((2, 3))], 0.1);
    assert!(matches!(
        result,
        Err(Error::ShapeMismatch {
            layer: 0,
            expected: (3, 2),
            found: (2, 3)
        })
    ));

    let result = NeuralNet::from_weights(vec![3, 2, 1], vec![Array2::zeros((3, 2))], 0.1);
    assert!(matches!(result, Err(Error::InvalidParams(_))));
}

#[test]
fn test_mutating_clone_leaves_original() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let original = NeuralNet::new(&[10, 16, 2], 1.0, &mut rng).unwrap();
    let snapshot = original.weights().to_vec();

    let mut child = original.clone();
    child.mutate(&mut rng);

    assert_eq!(original.weights(), snapshot.as_slice());
    assert_ne!(child.weights(), original.weights());
}

#[test]
fn test_mutation_rate_controls_share_of_changed_weights() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let original = NeuralNet::new(&[40, 50], 0.1, &mut rng).unwrap();
    let mut child = original.clone();
    child.mutate(&mut rng);

    let changed = original.weights()[0]
        .iter()
        .zip(child.weights()[0].iter())
        .filter(|(a, b)| a != b)
        .count();

    // 2000 weights at rate 0.1
    assert!((120..280).contains(&changed), "changed {changed}");
}

#[test]
fn test_initial_weights_are_standard_normal() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let net = NeuralNet::new(&[100, 100], 0.0, &mut rng).unwrap();
    let w = &net.weights()[0];
    let mean = w.mean().unwrap();
    let var = w.mapv(|x| (x - mean).powi(2)).mean().unwrap();
    assert!(mean.abs() < 0.05);
    assert!((var - 1.0).abs() < 0.1);
}

proptest! {
    #[test]
    fn clone_forwards_identically(seed in any::<u64>(), inputs in prop::collection::vec(-2.0..2.0f64, 10)) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let net = NeuralNet::new(&[10, 16, 2], 0.05, &mut rng).unwrap();
        let copy = net.clone();
        prop_assert_eq!(net.forward(&inputs).unwrap(), copy.forward(&inputs).unwrap());
    }

    #[test]
    fn outputs_stay_in_tanh_range(seed in any::<u64>(), inputs in prop::collection::vec(-10.0..10.0f64, 4)) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let net = NeuralNet::new(&[4, 6, 3], 0.05, &mut rng).unwrap();
        let out = net.forward(&inputs).unwrap();
        prop_assert!(out.iter().all(|v| (-1.0..=1.0).contains(v)));
    }
}
