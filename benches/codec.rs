//! Message codec benchmarks
//!
//! Measures request/response framing and content-encoding cost.
//!
//! Run with: cargo bench --bench codec

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use greet_http::http::encoding::resolve;
use greet_http::http::{
    decode_request, decode_response, parse_response, FrameParser, HttpRequest, HttpResponse,
    Negotiator, Router,
};

fn greet_request(accept_encoding: &str) -> HttpRequest {
    HttpRequest::builder()
        .uri("/greet/2306217481?name=Budi")
        .host("127.0.0.1:7481")
        .accept("application/json")
        .accept_encoding(accept_encoding)
        .build()
}

fn bench_request_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_codec");
    let request = greet_request("gzip");
    let wire = request.to_wire();

    group.bench_function("encode", |b| {
        b.iter(|| black_box(black_box(&request).to_wire()));
    });

    group.bench_function("decode", |b| {
        b.iter(|| black_box(decode_request(black_box(&wire))));
    });

    group.finish();
}

fn bench_response_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_codec");

    for size in [64usize, 4096, 65536] {
        let body: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        let response = HttpResponse::builder()
            .content_type("application/octet-stream")
            .data(body)
            .build();
        let wire = response.to_wire();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &response, |b, response| {
            b.iter(|| black_box(response.to_wire()));
        });
        group.bench_with_input(BenchmarkId::new("parse", size), &wire, |b, wire| {
            b.iter(|| black_box(parse_response(wire)));
        });
        group.bench_with_input(BenchmarkId::new("frame", size), &wire, |b, wire| {
            b.iter(|| {
                let mut framer = FrameParser::new(usize::MAX);
                let mut frame = None;
                for chunk in wire.chunks(4096) {
                    frame = framer.push(chunk).unwrap();
                }
                black_box(frame)
            });
        });
    }

    group.finish();
}

fn bench_negotiation(c: &mut Criterion) {
    let mut group = c.benchmark_group("negotiation");
    let body = b"<html><body><h1>Halo, dunia! Aku Firaz sedang mengerjakan A03</h1></body></html>"
        .repeat(64);
    group.throughput(Throughput::Bytes(body.len() as u64));

    for accept_encoding in ["gzip", "deflate", "none"] {
        group.bench_function(BenchmarkId::new("apply", accept_encoding), |b| {
            b.iter(|| {
                let mut response = HttpResponse::builder()
                    .content_type("text/html")
                    .data(body.clone())
                    .build();
                Negotiator::default()
                    .apply(accept_encoding, &mut response)
                    .unwrap();
                black_box(response)
            });
        });

        let mut encoded = HttpResponse::builder().data(body.clone()).build();
        Negotiator::default().apply(accept_encoding, &mut encoded).unwrap();
        let tag = encoded.content_encoding().to_string();
        let data = encoded.into_data();
        group.bench_function(BenchmarkId::new("resolve", accept_encoding), |b| {
            b.iter(|| black_box(resolve(&tag, data.clone())));
        });
    }

    group.finish();
}

fn bench_exchange(c: &mut Criterion) {
    let router = Router::default();

    c.bench_function("route_and_roundtrip", |b| {
        b.iter(|| {
            let request = decode_request(&greet_request("gzip").to_wire());
            let response = router.handle(&request).unwrap();
            black_box(decode_response(&response.to_wire()))
        });
    });
}

criterion_group!(
    benches,
    bench_request_codec,
    bench_response_codec,
    bench_negotiation,
    bench_exchange
);
criterion_main!(benches);
