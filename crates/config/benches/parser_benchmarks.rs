//! Benchmarks for notation parsing, condition parsing and scope start-up.
//!
//! Tests documents of 100/1k keys with sections and references.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use tierconf_config::{ConditionParser, ConfigScope, NotationParser, StaticFacts};

fn generate_document(keys: usize) -> String {
    let mut document = String::from("# generated\nbase: /srv/app\n");
    for i in 0..keys {
        if i % 50 == 0 {
            let section = match i % 150 {
                0 => "os = linux and cpus >= 2",
                50 => "not os = win32",
                _ => "",
            };
            document.push_str(&format!("[{section}]\n"));
        }
        match i % 4 {
            0 => document.push_str(&format!("group{}.key{i}: {i}\n", i % 10)),
            1 => document.push_str(&format!("group{}.path{i}: ${{base}}/data/{i}\n", i % 10)),
            2 => document.push_str(&format!("group{}.list{i}: [1, 2, '{i}']\n", i % 10)),
            _ => document.push_str(&format!("group{}.flag{i}: true // note\n", i % 10)),
        }
    }
    document
}

fn bench_notation_parse(c: &mut Criterion) {
    let facts = StaticFacts::new();
    for keys in [100, 1_000] {
        let document = generate_document(keys);
        c.bench_function(&format!("notation_parse_{keys}"), |b| {
            b.iter(|| {
                let sources = NotationParser::new(&facts)
                    .parse("bench.cfg", black_box(&document), "")
                    .unwrap();
                black_box(sources)
            })
        });
    }
}

fn bench_condition_parse(c: &mut Criterion) {
    let facts = StaticFacts::new().with_env("MODE", "production");
    let expression = "(os = linux or os = darwin) and not arch = ia32 and cpus >= 2 \
                      and (env:MODE ^ prod or hostname $ .example.com)";
    c.bench_function("condition_parse", |b| {
        b.iter(|| {
            let condition = ConditionParser::new(&facts)
                .parse(black_box(expression))
                .unwrap();
            black_box(condition)
        })
    });
}

fn bench_scope_start_1k(c: &mut Criterion) {
    let document = generate_document(1_000);
    c.bench_function("scope_start_1k", |b| {
        b.iter(|| {
            let mut scope = ConfigScope::new("bench").with_facts(Arc::new(StaticFacts::new()));
            scope.init().unwrap();
            scope.add(black_box(document.as_str()), "").unwrap();
            scope.start().unwrap();
            black_box(scope.config().map(|config| config.len()))
        })
    });
}

criterion_group!(
    benches,
    bench_notation_parse,
    bench_condition_parse,
    bench_scope_start_1k
);
criterion_main!(benches);
