use calcexpr_rs::{CalculationJob, Calculator};

fn main() {
    pretty_env_logger::init();

    let jobs: Vec<CalculationJob> = (1..=8)
        .map(|i| {
            CalculationJob::new("v * k + max(v, [2, 2, 2])")
                .with_scalar("k", i as f64)
                .with_vector("v", vec![1.0, 2.0, 3.0])
        })
        .chain(std::iter::once(CalculationJob::new("1 / (2 - 2)")))
        .collect();

    let calculator = Calculator::new();
    for (i, result) in calculator.calculate_batch(&jobs).iter().enumerate() {
        match result {
            Ok(value) => match value.as_vector() {
                Some(items) => println!("Result {}: {} (total {})", i, value, items.iter().sum::<f64>()),
                None => println!("Result {}: {}", i, value),
            },
            Err(err) => println!("Result {}: {}", i, err.report()),
        }
    }
}
