//! Performance benchmarks for docnav
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use docnav::document::{Document, load_markdown};
use docnav::outline::{OutlineContainer, build_outline};
use docnav::search::{SearchOptions, context_window, highlight, scan};

/// A long documentation page with `sections` sections
fn create_document(sections: usize) -> Document {
    let mut source = String::from("# Drone Manual\n\n");
    for i in 0..sections {
        source.push_str(&format!(
            r#"## Section {i}

Section {i} explains how to connect the drone via USB cable and keep the
firmware current. Réglez l'hélice {i} avant le vol.

- Check propeller {i}
- Charge battery pack {i}

### Notes {i}

```sh
docnav --section {i}
```

"#
        ));
    }
    load_markdown(&source)
}

fn bench_markdown_loading(c: &mut Criterion) {
    let source: String = (0..500)
        .map(|i| format!("## Heading {i}\n\nParagraph {i} about the drone.\n\n- item {i}\n\n"))
        .collect();

    c.bench_function("load_markdown_500_sections", |b| {
        b.iter(|| load_markdown(black_box(&source)))
    });
}

fn bench_outline(c: &mut Criterion) {
    let doc = create_document(500);

    c.bench_function("build_outline_500_sections", |b| {
        b.iter(|| {
            let mut doc = doc.clone();
            let mut sidebar = OutlineContainer::new();
            build_outline(black_box(&mut doc), Some(&mut sidebar))
        })
    });
}

fn bench_scan(c: &mut Criterion) {
    let options = SearchOptions::default();
    let queries = ["drone", "battery pack 499", "hélice", "missing term"];

    let mut group = c.benchmark_group("scan");
    for sections in [50, 500] {
        let doc = create_document(sections);
        for query in queries {
            group.bench_with_input(
                BenchmarkId::new(query, sections),
                &query,
                |b, &q| b.iter(|| scan(&doc, black_box(q), &options)),
            );
        }
    }
    group.finish();
}

fn bench_context_and_highlight(c: &mut Criterion) {
    let text = "lorem ipsum ".repeat(200) + "connect the drone" + &" dolor sit".repeat(200);

    let mut group = c.benchmark_group("rendering");

    group.bench_function("context_window", |b| {
        b.iter(|| context_window(black_box(&text), "drone", 100))
    });

    group.bench_function("highlight", |b| {
        let context = context_window(&text, "drone", 100);
        b.iter(|| highlight(black_box(&context), "drone"))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_markdown_loading,
    bench_outline,
    bench_scan,
    bench_context_and_highlight,
);

criterion_main!(benches);
