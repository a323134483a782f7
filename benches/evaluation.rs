use calcexpr_rs::ast::{Evaluator, Parser};
use calcexpr_rs::{Bindings, Calculator};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evalexpr::*;
use std::collections::HashMap;

/// Benchmark simple arithmetic expressions
fn benchmark_simple_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simple arithmetic Expression Evaluation");

    let calculator = Calculator::new();
    let evaluator = Evaluator::new();
    let bindings = Bindings::new();

    let expr = "2 + 3 * 4";
    let parsed = Parser::parse_expression(expr).unwrap();
    let precompiled_evalexpr = build_operator_tree::<DefaultNumericTypes>(expr).unwrap();

    group.bench_function("calculator_arithmetic", |b| {
        b.iter(|| calculator.calculate(black_box(expr), &HashMap::new(), &HashMap::new()))
    });

    group.bench_function("pre_parsed_arithmetic", |b| {
        b.iter(|| evaluator.evaluate(black_box(&parsed), &bindings))
    });

    group.bench_function("native_rust_arithmetic", |b| {
        b.iter(|| black_box(2.0 + 3.0 * 4.0))
    });

    group.bench_function("meval_arithmetic", |b| {
        b.iter(|| meval::eval_str(black_box(expr)).unwrap())
    });

    group.bench_function("evalexpr_arithmetic", |b| {
        b.iter(|| evalexpr::eval(black_box(expr)).unwrap())
    });

    group.bench_function("precompiled_evalexpr_arithmetic", |b| {
        b.iter(|| precompiled_evalexpr.eval().unwrap())
    });
}

/// Benchmark complex arithmetic expressions
fn benchmark_complex_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Complex arithmetic Expression Evaluation");

    let calculator = Calculator::new();
    let evaluator = Evaluator::new();
    let bindings = Bindings::new();

    let expr = "(10 + 20) * 3 / (4 - 1) + 5";
    let parsed = Parser::parse_expression(expr).unwrap();
    let precompiled_evalexpr = build_operator_tree::<DefaultNumericTypes>(expr).unwrap();

    group.bench_function("calculator_complex_arithmetic", |b| {
        b.iter(|| calculator.calculate(black_box(expr), &HashMap::new(), &HashMap::new()))
    });

    group.bench_function("pre_parsed_complex_arithmetic", |b| {
        b.iter(|| evaluator.evaluate(black_box(&parsed), &bindings))
    });

    group.bench_function("native_rust_complex_arithmetic", |b| {
        b.iter(|| black_box((10.0 + 20.0) * 3.0 / (4.0 - 1.0) + 5.0))
    });

    group.bench_function("meval_complex_arithmetic", |b| {
        b.iter(|| meval::eval_str(black_box(expr)).unwrap())
    });

    group.bench_function("evalexpr_complex_arithmetic", |b| {
        b.iter(|| evalexpr::eval(black_box(expr)).unwrap())
    });

    group.bench_function("precompiled_evalexpr_complex_arithmetic", |b| {
        b.iter(|| precompiled_evalexpr.eval().unwrap())
    });
}

/// Benchmark vector expressions with substituted variables
fn benchmark_vector_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("Vector Expression Evaluation");

    let calculator = Calculator::new();
    let scalars = HashMap::from([("k".to_string(), 2.0)]);
    let vectors = HashMap::from([
        ("a".to_string(), (0..32).map(f64::from).collect::<Vec<_>>()),
        ("b".to_string(), (32..64).map(f64::from).collect::<Vec<_>>()),
    ]);

    let expr = "max(a, b) * k + sum[a] - mean[b]";
    group.bench_function("calculator_vector_expression", |b| {
        b.iter(|| calculator.calculate(black_box(expr), &scalars, &vectors))
    });

    let bindings = Bindings::from_maps(&scalars, &vectors);
    let parsed = Parser::parse_with_bindings("a * k + b", &bindings).unwrap();
    let evaluator = Evaluator::new();
    group.bench_function("pre_parsed_vector_expression", |b| {
        b.iter(|| evaluator.evaluate(black_box(&parsed), &bindings))
    });
}

criterion_group!(
    benches,
    benchmark_simple_arithmetic,
    benchmark_complex_arithmetic,
    benchmark_vector_expressions
);
criterion_main!(benches);
