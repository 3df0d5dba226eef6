//! 规则解析与求值性能基准测试

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rule_engine::{ConditionEvaluator, Comparison, EvaluationContext, ast, evaluate, parse_rule};
use serde_json::json;
use std::hint::black_box;

const SIMPLE_RULE: &str = "age > 30";
const NESTED_RULE: &str = "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) AND (salary > 50000 OR experience > 5)";

fn create_context() -> EvaluationContext {
    EvaluationContext::from_value(json!({
        "age": 35,
        "department": "Sales",
        "salary": 60000,
        "experience": 3
    }))
    .unwrap()
}

/// 生成 n 个条件以 AND 连接的规则
fn chained_rule(n: usize) -> String {
    (0..n)
        .map(|i| format!("field{} > {}", i, i))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("simple", |b| b.iter(|| parse_rule(black_box(SIMPLE_RULE))));
    group.bench_function("nested", |b| b.iter(|| parse_rule(black_box(NESTED_RULE))));

    for n in [4, 64, 256] {
        let rule = chained_rule(n);
        group.bench_with_input(BenchmarkId::new("chained", n), &rule, |b, rule| {
            b.iter(|| parse_rule(black_box(rule)))
        });
    }

    group.finish();
}

fn bench_condition(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition");
    let context = create_context();

    for operand in ["age > 30", "salary < 50000", "department = 'Sales'"] {
        let comparison = Comparison::parse(operand).unwrap();
        let field = context.get_field(&comparison.field);
        group.bench_with_input(BenchmarkId::from_parameter(operand), &comparison, |b, cmp| {
            b.iter(|| ConditionEvaluator::evaluate(black_box(cmp), black_box(field)))
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let context = create_context();

    let nested = parse_rule(NESTED_RULE).unwrap();
    group.bench_function("nested", |b| {
        b.iter(|| evaluate(black_box(&nested), black_box(&context)))
    });

    // 含反序列化，对应一次完整的存储读取后求值
    let stored = ast::to_json(&nested).unwrap();
    group.bench_function("nested_from_json", |b| {
        b.iter(|| {
            let tree = ast::from_json(black_box(&stored)).unwrap();
            evaluate(&tree, &context)
        })
    });

    // 长链每个条件都成立，不会短路
    for n in [64, 256, 512] {
        let chain = vec!["age > 30"; n].join(" AND ");
        let stored = ast::to_json(&parse_rule(&chain).unwrap()).unwrap();
        group.bench_with_input(BenchmarkId::new("chained_from_json", n), &stored, |b, stored| {
            b.iter(|| {
                let tree = ast::from_json(black_box(stored)).unwrap();
                evaluate(&tree, &context)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_condition, bench_evaluate);
criterion_main!(benches);
