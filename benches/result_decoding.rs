// Result decoding throughput.
//
// Decodes the same generated result set from JSON, XML and CSV bodies and
// drains the cursor, across a few row counts and read chunk sizes.
//
//   cargo bench --bench result_decoding

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use janus_sparql::execution::{FetchMode, Statement};
use std::io::Cursor;

const ROW_COUNTS: &[usize] = &[100, 10_000];
const CHUNK_SIZES: &[usize] = &[4 * 1024, 1_048_576];

fn json_body(rows: usize) -> Vec<u8> {
    let bindings: Vec<String> = (0..rows)
        .map(|i| {
            format!(
                r#"{{"s":{{"type":"uri","value":"http://example.org/s{i}"}},"o":{{"type":"literal","value":"value {i}","xml:lang":"en"}}}}"#
            )
        })
        .collect();
    format!(r#"{{"head":{{"vars":["s","o"]}},"results":{{"bindings":[{}]}}}}"#, bindings.join(","))
        .into_bytes()
}

fn xml_body(rows: usize) -> Vec<u8> {
    let mut body = String::from(
        r#"<?xml version="1.0"?><sparql xmlns="http://www.w3.org/2005/sparql-results#"><head><variable name="s"/><variable name="o"/></head><results>"#,
    );
    for i in 0..rows {
        body.push_str(&format!(
            r#"<result><binding name="s"><uri>http://example.org/s{i}</uri></binding><binding name="o"><literal xml:lang="en">value {i}</literal></binding></result>"#
        ));
    }
    body.push_str("</results></sparql>");
    body.into_bytes()
}

fn csv_body(rows: usize) -> Vec<u8> {
    let mut body = String::from("s,o\r\n");
    for i in 0..rows {
        body.push_str(&format!("http://example.org/s{i},value {i}\r\n"));
    }
    body.into_bytes()
}

fn drain(content_type: &str, body: Vec<u8>, chunk_size: usize) -> usize {
    let mut statement = Statement::with_chunk_size(Some(content_type), Cursor::new(body), chunk_size);
    let mut count = 0;
    while let Ok(Some(row)) = statement.fetch(FetchMode::Object) {
        black_box(row);
        count += 1;
    }
    count
}

fn bench_decoders(c: &mut Criterion) {
    let formats: [(&str, &str, fn(usize) -> Vec<u8>); 3] = [
        ("json", "application/sparql-results+json", json_body),
        ("xml", "application/sparql-results+xml", xml_body),
        ("csv", "text/csv", csv_body),
    ];

    let mut group = c.benchmark_group("result_decoding");
    for &rows in ROW_COUNTS {
        group.throughput(Throughput::Elements(rows as u64));
        for (name, content_type, make_body) in formats {
            let body = make_body(rows);
            for &chunk_size in CHUNK_SIZES {
                let id = BenchmarkId::new(format!("{name}/chunk_{chunk_size}"), rows);
                group.bench_with_input(id, &body, |b, body| {
                    b.iter(|| {
                        let count = drain(content_type, body.clone(), chunk_size);
                        assert_eq!(count, rows);
                    });
                });
            }
        }
    }
    group.finish();
}

criterion_group!(benches, bench_decoders);
criterion_main!(benches);
