use curnn::layer::{FullyConnected, Layer, TypePolicy};
use curnn::{FullyConnectedLayer, RecurrentLayer, Tensor4, TensorError};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_recurrent_init_in_range() {
    let mut layer = RecurrentLayer::<f32, 4, 3, 2>::new();
    layer.initialize_weights(-1.0, 1.0).unwrap();

    for d in 0..2 {
        for i in 0..3 {
            for n in 0..4 {
                let w = layer.weight(n, i, d).unwrap();
                assert!((-1.0..=1.0).contains(&w), "weight {w} at ({n}, {i}, {d})");
            }
        }
    }
    assert!(layer.outputs().iter().all(|&o| o == 0.0));
}

#[test]
fn test_init_leaves_bias_and_activation_rows() {
    let mut layer = RecurrentLayer::<f64, 3, 5, 2>::new();
    layer.set_bias(2, 1, 0.125).unwrap();
    let before: Vec<f64> = (0..2)
        .flat_map(|d| (0..3).map(move |n| (n, d)))
        .flat_map(|(n, d)| [layer.bias(n, d).unwrap(), layer.activation(n, d).unwrap()])
        .collect();

    layer
        .initialize_weights_with(&mut StdRng::seed_from_u64(11), -0.5, 0.5)
        .unwrap();

    let after: Vec<f64> = (0..2)
        .flat_map(|d| (0..3).map(move |n| (n, d)))
        .flat_map(|(n, d)| [layer.bias(n, d).unwrap(), layer.activation(n, d).unwrap()])
        .collect();
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.to_bits(), a.to_bits());
    }
}

#[test]
fn test_seeded_init_is_reproducible() {
    let mut a = FullyConnectedLayer::<f32, 6, 4, 1>::new();
    let mut b = FullyConnectedLayer::<f32, 6, 4, 1>::new();
    a.initialize_weights_with(&mut StdRng::seed_from_u64(5), -2.0, 2.0).unwrap();
    b.initialize_weights_with(&mut StdRng::seed_from_u64(5), -2.0, 2.0).unwrap();
    assert_eq!(a.wba(), b.wba());
}

#[test]
fn test_degenerate_range_is_constant() {
    let mut layer = FullyConnectedLayer::<i32, 2, 2, 2>::new();
    layer.initialize_weights(7, 7).unwrap();
    assert_eq!(layer.weight(1, 1, 1), Ok(7));
    assert_eq!(layer.bias(1, 1), Ok(0));
}

#[test]
fn test_fully_connected_extents() {
    let layer = FullyConnectedLayer::<f32, 8, 3, 2>::new();
    assert_eq!(layer.wba().extents(), [8, 5, 2, 1]);
    assert_eq!(layer.validate_layout(), Ok(()));
}

#[test]
fn test_zero_sized_layer() {
    let mut layer = RecurrentLayer::<f32, 0, 0, 0>::new();
    layer.initialize_weights(-1.0, 1.0).unwrap();
    assert!(layer.outputs().is_empty());
    assert!(layer.wba().as_slice().is_empty());
    assert_eq!(layer.validate_layout(), Ok(()));
}

/// Puts every bias on the first weight row.
struct Clashing(FullyConnected<f32>);

impl<const N: usize, const I: usize, const D: usize> TypePolicy<f32, N, I, D> for Clashing {
    fn allocate() -> Self {
        Self(<FullyConnected<f32> as TypePolicy<f32, N, I, D>>::allocate())
    }

    fn wba(&self) -> &Tensor4<f32> {
        TypePolicy::<f32, N, I, D>::wba(&self.0)
    }

    fn wba_mut(&mut self) -> &mut Tensor4<f32> {
        TypePolicy::<f32, N, I, D>::wba_mut(&mut self.0)
    }

    fn errors(&self) -> &[f32] {
        TypePolicy::<f32, N, I, D>::errors(&self.0)
    }

    fn errors_mut(&mut self) -> &mut [f32] {
        TypePolicy::<f32, N, I, D>::errors_mut(&mut self.0)
    }

    fn bias_coords(node: usize, page: usize) -> [usize; 4] {
        [node, 0, page, 0]
    }

    fn activation_coords(node: usize, page: usize) -> [usize; 4] {
        [node, I + 1, page, 0]
    }
}

#[test]
fn test_overlapping_policy_is_rejected() {
    let layer = Layer::<f32, 2, 2, 1, Clashing>::new();
    assert!(matches!(
        layer.validate_layout(),
        Err(TensorError::LayoutOverlap { .. })
    ));
}
