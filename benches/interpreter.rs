use criterion::{Criterion, black_box, criterion_group, criterion_main};
use puffin::interpreter::Interpreter;
use puffin::{lexer, parser};

/// Builds a program of `routines` conditional routines that accumulate into
/// a scalar and an array, bracketed by begin/end routines.
fn accumulation_workload(routines: usize) -> String {
    let mut source = String::from("begin { total = 0 }\n");
    for i in 1..=routines {
        source.push_str(&format!("{i} {{ total += {i}; seen[{i}] = total }}\n"));
    }
    source.push_str("end { print total }\n");
    source
}

fn bench_pipeline(c: &mut Criterion) {
    for (label, routines) in [("small", 64), ("large", 1024)] {
        let source = accumulation_workload(routines);

        c.bench_function(&format!("tokenize_{label}"), |b| {
            b.iter(|| {
                let out = lexer::tokenize(black_box(&source)).expect("tokenize");
                black_box(out);
            })
        });

        let tokens = lexer::tokenize(&source).expect("tokenize");
        c.bench_function(&format!("parse_{label}"), |b| {
            b.iter(|| {
                let out = parser::parse_tokens(black_box(tokens.clone())).expect("parse");
                black_box(out);
            })
        });

        let program =
            parser::parse_tokens(lexer::tokenize(&source).expect("tokenize")).expect("parse");
        c.bench_function(&format!("run_{label}"), |b| {
            b.iter(|| {
                let mut out: Vec<u8> = Vec::new();
                Interpreter::new(black_box(&program))
                    .run(&mut out)
                    .expect("run");
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
