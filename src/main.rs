// Prints the layer chain inferred from a JSON architecture description.
// Run the demo with:
//   cargo run --example regression
use ferrite_cnn::{Sequential, SequentialDesc};

fn main() {
    let Some(path) = std::env::args().nth(1) else {
        println!("ferrite-cnn: a from-scratch convolutional network engine in Rust.");
        println!("Usage: ferrite-cnn <architecture.json>");
        println!("Run `cargo run --example regression` to see the regression demo.");
        return;
    };

    let desc = match SequentialDesc::load_json(&path) {
        Ok(desc) => desc,
        Err(e) => {
            eprintln!("failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    let network = Sequential::new(desc);
    let desc = network.desc();
    println!(
        "{} (loss = {:?}, learning rate = {})",
        if desc.name.is_empty() { "<unnamed>" } else { &desc.name },
        network.loss_type(),
        network.learning_rate()
    );
    println!("  input          {}", network.input_shape());
    for layer in network.layers() {
        println!(
            "  {:<14} {} -> {}  ({} parameters)",
            layer.name(),
            layer.input_shape(),
            layer.output_shape(),
            layer.parameter_count()
        );
    }
}
