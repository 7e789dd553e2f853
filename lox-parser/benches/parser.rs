use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use lox_parser::parser::{parse_expression, parse_program};
use lox_parser::scanner::scan;

fn expr(source: &str) {
    let tokens = scan(source);
    let response = parse_expression(&tokens.result);
    assert!(response.errors.is_empty());
}

fn long_expr(c: &mut Criterion) {
    let mut group = c.benchmark_group("long-expr");

    let mut source = "1".to_string();
    for _i in 0..1000 {
        source.push_str(" + 1");
    }
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("long-expr", |b| b.iter(|| expr(&source)));
}

fn stress_precedence(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress-precedence");

    let mut source = "1".to_string();
    for _i in 0..200 {
        source.push_str(" == 2 < 3 + 5 * 5");
    }
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("stress-precedence", |b| b.iter(|| expr(&source)));
}

fn many_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("many-functions");

    let mut source = String::new();
    for i in 0..200 {
        source.push_str(&format!(
            "fun f{i}(a, b) {{ var c = a * b; if (c > {i}) return c; else return -c; }}\n",
            i = i
        ));
    }
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("many-functions", |b| {
        b.iter(|| {
            let tokens = scan(&source);
            let response = parse_program(&tokens.result);
            assert!(response.errors.is_empty());
        })
    });
}

criterion_group!(benches, long_expr, stress_precedence, many_functions);
criterion_main!(benches);
