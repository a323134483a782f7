use calcexpr_rs::ast::{Evaluator, Parser};
use calcexpr_rs::Bindings;

fn main() {
    pretty_env_logger::init();

    let expression = "price * 1,2 + sum[volumes]";
    let kinds = Bindings::new()
        .with_scalar("price", 0.0)
        .with_vector("volumes", vec![0.0]);
    let ast = Parser::parse_with_bindings(expression, &kinds).expect("Failed to parse");

    let evaluator = Evaluator::new();
    for (price, volumes) in [(100.0, vec![10.0, 20.0]), (80.0, vec![5.0])] {
        let bindings = Bindings::new()
            .with_scalar("price", price)
            .with_vector("volumes", volumes);
        match evaluator.evaluate(&ast, &bindings) {
            Ok(result) => match result.as_scalar() {
                Some(total) => println!("Total: {:.2}", total),
                None => println!("Result: {}", result),
            },
            Err(err) => println!("Error: {}", err.report()),
        }
    }
}
