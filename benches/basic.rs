// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Benchmarks for ods loading and reshaping.
//!
//! The document is generated in memory: one keyed sheet of 10k rows, with
//! repeated and spanned cells, and one two column settings sheet.
//!
//! ```bash
//! cargo bench --bench basic
//! ```

use criterion::{criterion_group, criterion_main, Criterion};
use odsmap::{group_by, key_values, transform, Document, OdsOptions, RecordsBuilder};
use std::hint::black_box;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const ROWS: usize = 10_000;

fn generate() -> Vec<u8> {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><office:body><office:spreadsheet><table:table table:name="Data"><table:table-row><table:table-cell><text:p>group</text:p></table:table-cell><table:table-cell><text:p>id</text:p></table:table-cell><table:table-cell><text:p>value</text:p></table:table-cell><table:table-cell table:number-columns-repeated="3"><text:p>flag</text:p></table:table-cell><table:table-cell><text:p>label</text:p></table:table-cell></table:table-row>"#,
    );
    for i in 0..ROWS {
        content.push_str(&format!(
            "<table:table-row><table:table-cell><text:p>g{}</text:p></table:table-cell>\
             <table:table-cell><text:p>{i}</text:p></table:table-cell>\
             <table:table-cell><text:p>{}.5</text:p></table:table-cell>\
             <table:table-cell table:number-columns-repeated=\"3\"><text:p>x</text:p></table:table-cell>\
             <table:table-cell table:number-columns-spanned=\"2\"><text:p>row <text:span>{i}</text:span></text:p></table:table-cell>\
             <table:covered-table-cell/><table:table-cell><text:p>#comment</text:p></table:table-cell>\
             <table:table-cell table:number-columns-repeated=\"1016\"/></table:table-row>",
            i % 100,
            i * 3
        ));
    }
    content.push_str(r#"</table:table><table:table table:name="Settings">"#);
    for i in 0..100 {
        content.push_str(&format!(
            "<table:table-row><table:table-cell><text:p>key{i}</text:p></table:table-cell><table:table-cell><text:p>{i}</text:p></table:table-cell></table:table-row>"
        ));
    }
    content.push_str("</table:table></office:spreadsheet></office:body></office:document-content>");

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("mimetype", options).expect("cannot write mimetype");
    zip.write_all(b"application/vnd.oasis.opendocument.spreadsheet")
        .expect("cannot write mimetype");
    zip.start_file("content.xml", options)
        .expect("cannot write content");
    zip.write_all(content.as_bytes()).expect("cannot write content");
    zip.finish().expect("cannot finish zip").into_inner()
}

fn bench_ods(c: &mut Criterion) {
    let data = generate();
    let mut group = c.benchmark_group("ods");
    group.sample_size(20);

    group.bench_function("load", |b| {
        b.iter(|| {
            let doc = Document::from_reader(Cursor::new(&data), &OdsOptions::default())
                .expect("cannot read ods");
            black_box(doc.sheet("Data").expect("no data sheet").height())
        })
    });

    group.bench_function("load_clone_spanned", |b| {
        let options = OdsOptions::new().with_clone_spanned_columns(true);
        b.iter(|| {
            let doc = Document::from_reader(Cursor::new(&data), &options).expect("cannot read ods");
            black_box(doc.sheet("Data").expect("no data sheet").width())
        })
    });

    let doc = Document::from_reader(Cursor::new(&data), &OdsOptions::default())
        .expect("cannot read ods");
    let sheet = doc.sheet("Data").expect("no data sheet");
    let mut builder = RecordsBuilder::new();
    builder
        .transform(1, transform::integer)
        .transform(2, transform::float);

    group.bench_function("records", |b| {
        b.iter(|| black_box(builder.from_rows(sheet).expect("cannot build records").len()))
    });

    let records = builder.from_rows(sheet).expect("cannot build records");
    group.bench_function("group_by_two_keys", |b| {
        b.iter(|| black_box(group_by(&records, &["group", "id"]).expect("cannot group").len()))
    });

    group.bench_function("key_values", |b| {
        let settings = doc.sheet("Settings").expect("no settings sheet");
        b.iter(|| black_box(key_values(settings).expect("cannot build map").len()))
    });

    group.finish();
}

criterion_group!(benches, bench_ods);
criterion_main!(benches);
