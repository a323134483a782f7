use calcexpr_rs::functions;
use calcexpr_rs::Calculator;
use std::collections::HashMap;

fn main() {
    pretty_env_logger::init();

    let mut names: Vec<&str> = functions::functions().names().collect();
    names.sort_unstable();
    println!("Functions: {}", names.join(", "));

    let calculator = Calculator::new();
    let expression = "if(mean[prices] > limit, sum[prices] * rate, 0)";
    println!("Variables: {:?}", calculator.variables(expression));

    let values = calculator
        .read_variable_inputs(
            expression,
            [("prices", "[120; 80,5; 101]"), ("limit", "100"), ("rate", "0,5")],
        )
        .expect("Failed to read values");

    match calculator.calculate_values(expression, &values) {
        Ok(result) => println!("Result: {}", result),
        Err(err) => println!("Error: {}", err.report()),
    }

    let broken = "max(a, b) + sqrt(-1)";
    if let Err(err) = calculator.calculate(broken, &HashMap::new(), &HashMap::new()) {
        println!("{}\n{}^", broken, " ".repeat(err.position().saturating_sub(1)));
        println!("{}", err.report());
    }
}
