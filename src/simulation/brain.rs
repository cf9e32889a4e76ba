//! Neural network implementation for agent brains.
//!
//! A fixed-topology multi-layer perceptron with tanh activation and no
//! biases (agents feed a constant bias input instead). Supports the genetic
//! operations used by evolution (clone and gaussian mutation) and export to a
//! serializable [`BrainRecord`].

use std::path::Path;

use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::StandardNormal;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// Standard deviation of the noise added to a mutated weight.
pub const MUTATION_MAGNITUDE: f64 = 0.3;

/// A feed-forward network with one weight matrix per pair of adjacent layers.
///
/// The matrix between layer `l` and `l + 1` has shape
/// `layer_sizes[l] × layer_sizes[l + 1]`. Cloning deep-copies every matrix,
/// so a mutated clone never affects its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralNet {
    layer_sizes: Vec<usize>,
    weights: Vec<Array2<f64>>,
    mutation_rate: f64,
}

fn check_topology(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(Error::EmptyTopology(layer_sizes.len()));
    }
    if let Some(layer) = layer_sizes.iter().position(|&n| n == 0) {
        return Err(Error::ZeroWidthLayer(layer));
    }
    Ok(())
}

fn check_rate(mutation_rate: f64) -> Result<()> {
    if (0.0..=1.0).contains(&mutation_rate) {
        Ok(())
    } else {
        Err(Error::invalid(format!("mutation rate {mutation_rate} is outside [0.0, 1.0]")))
    }
}

impl NeuralNet {
    /// Creates a network with every weight drawn from a standard normal distribution.
    ///
    /// # Arguments
    ///
    /// * `layer_sizes` - Neuron count per layer, input first
    /// * `mutation_rate` - Probability that [`mutate`](Self::mutate) perturbs a given weight
    /// * `rng` - Random source for the initial weights
    pub fn new<R: Rng + ?Sized>(layer_sizes: &[usize], mutation_rate: f64, rng: &mut R) -> Result<Self> {
        check_topology(layer_sizes)?;
        check_rate(mutation_rate)?;

        let weights = layer_sizes
            .windows(2)
            .map(|pair| Array2::random_using((pair[0], pair[1]), StandardNormal, &mut *rng))
            .collect();

        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            weights,
            mutation_rate,
        })
    }

    /// Creates a network from explicit weight matrices.
    ///
    /// Fails if the topology is degenerate, the rate is not a probability, or
    /// any matrix does not connect the layers it sits between.
    pub fn from_weights(layer_sizes: Vec<usize>, weights: Vec<Array2<f64>>, mutation_rate: f64) -> Result<Self> {
        check_topology(&layer_sizes)?;
        check_rate(mutation_rate)?;

        if weights.len() != layer_sizes.len() - 1 {
            return Err(Error::invalid(format!(
                "{} layers need {} weight matrices, got {}",
                layer_sizes.len(),
                layer_sizes.len() - 1,
                weights.len()
            )));
        }

        for (layer, (matrix, pair)) in weights.iter().zip(layer_sizes.windows(2)).enumerate() {
            let expected = (pair[0], pair[1]);
            if matrix.dim() != expected {
                return Err(Error::ShapeMismatch {
                    layer,
                    expected,
                    found: matrix.dim(),
                });
            }
        }

        Ok(Self {
            layer_sizes,
            weights,
            mutation_rate,
        })
    }

    /// Neuron count per layer, input first.
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Weight matrices, input side first.
    pub fn weights(&self) -> &[Array2<f64>] {
        &self.weights
    }

    /// Per-weight mutation probability.
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Number of inputs the network expects.
    pub fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }

    /// Runs a forward pass through all layers.
    ///
    /// Each layer's activation is `tanh(previous · W)`.
    pub fn forward(&self, inputs: &[f64]) -> Result<Array1<f64>> {
        if inputs.len() != self.input_size() {
            return Err(Error::InputLength {
                expected: self.input_size(),
                found: inputs.len(),
            });
        }

        let mut activation = Array1::from(inputs.to_vec());
        for matrix in &self.weights {
            activation = activation.dot(matrix);
            activation.mapv_inplace(f64::tanh);
        }
        Ok(activation)
    }

    /// Perturbs weights in place.
    ///
    /// Every weight, visited layer by layer in row-major order, is hit with
    /// probability `mutation_rate`; a hit adds standard-normal noise scaled
    /// by [`MUTATION_MAGNITUDE`].
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let rate = self.mutation_rate;
        for matrix in &mut self.weights {
            for weight in matrix.iter_mut() {
                if rng.gen_range(0.0..1.0) < rate {
                    let noise: f64 = rng.sample(StandardNormal);
                    *weight += noise * MUTATION_MAGNITUDE;
                }
            }
        }
    }

    /// Exports the topology and weights together with a generation number.
    pub fn to_record(&self, generation: u32) -> BrainRecord {
        BrainRecord {
            layer_sizes: self.layer_sizes.clone(),
            weights: self.weights.clone(),
            generation,
        }
    }

    /// Rebuilds a network from a record, validating its shapes.
    pub fn from_record(record: BrainRecord, mutation_rate: f64) -> Result<(Self, u32)> {
        let generation = record.generation;
        let net = Self::from_weights(record.layer_sizes, record.weights, mutation_rate)?;
        Ok((net, generation))
    }
}

/// Serialized form of a trained network, as exchanged with persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainRecord {
    /// Neuron count per layer, input first.
    pub layer_sizes: Vec<usize>,
    /// Weight matrices, input side first.
    pub weights: Vec<Array2<f64>>,
    /// Generation the network was taken from.
    pub generation: u32,
}

impl BrainRecord {
    /// Saves the record as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        tracing::info!(path = %path.as_ref().display(), generation = self.generation, "brain saved");
        Ok(())
    }

    /// Loads a record from JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let record: Self = serde_json::from_str(&json)?;
        tracing::info!(path = %path.as_ref().display(), generation = record.generation, "brain loaded");
        Ok(record)
    }
}
