mod regression_data;

use ferrite_cnn::{ActivationFunction, LossType, Sequential, SequentialDesc, Tensor};
use rand::{rngs::StdRng, Rng, SeedableRng};

use regression_data::REGRESSION_DATA;

fn main() {
    let desc = SequentialDesc::new("regression", LossType::Mse, 0.1)
        .input(1, 1, 1)
        .fully_connected(16, Some(ActivationFunction::Sigmoid))
        .fully_connected(1, Some(ActivationFunction::Sigmoid));

    let mut rng = StdRng::seed_from_u64(42);
    let mut network = Sequential::with_rng(desc, &mut rng);

    let data: Vec<(Tensor, Tensor)> = REGRESSION_DATA
        .iter()
        .map(|&(x, y)| (Tensor::from(vec![x]), Tensor::from(vec![y])))
        .collect();

    let iterations = 10_000;

    for i in 0..iterations {
        let (input, expected) = &data[rng.gen_range(0..data.len())];
        network.feed_forward(input);
        let loss = network.feed_backward(expected);
        if i % 1000 == 0 {
            println!("Iteration {i}: loss = {loss:.6}");
        }
    }

    let points = 50;
    let curve: Vec<String> = (0..=points)
        .map(|i| {
            let x = i as f32 / points as f32;
            let y = network.feed_forward(&Tensor::from(vec![x]))[0];
            format!("({x:.3}, {y:.3})")
        })
        .collect();
    println!("{}", curve.join(","));
}
