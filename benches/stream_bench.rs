// SPDX-License-Identifier: MIT OR Apache-2.0
//! Benchmarks for streaming re-assembly and request conversion.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::json;

use genbridge_adapter::{StreamTranslator, to_chat_messages};
use genbridge_gemini::{Content, Part};
use genbridge_openai::{ChatCompletionChunk, ChunkToolCall};

// ── Helpers ─────────────────────────────────────────────────────────────

fn text_deltas(count: usize) -> Vec<ChatCompletionChunk> {
    let mut chunks: Vec<_> = (0..count)
        .map(|i| {
            if i % 25 == 24 {
                ChatCompletionChunk::text("end of paragraph.\n\n")
            } else {
                ChatCompletionChunk::text(format!("token{i} "))
            }
        })
        .collect();
    chunks.push(ChatCompletionChunk::finish("stop"));
    chunks
}

fn tool_deltas(calls: u32, fragments: usize) -> Vec<ChatCompletionChunk> {
    let mut chunks = Vec::new();
    for index in 0..calls {
        let id = format!("call_{index}");
        let name = format!("tool_{index}");
        chunks.push(ChatCompletionChunk::tool_calls(vec![ChunkToolCall::fragment(
            index,
            Some(&id),
            Some(&name),
            Some("{\"items\":["),
        )]));
        for f in 0..fragments {
            let piece = if f + 1 == fragments {
                format!("{f}]}}")
            } else {
                format!("{f},")
            };
            chunks.push(ChatCompletionChunk::tool_calls(vec![ChunkToolCall::fragment(
                index,
                None,
                None,
                Some(&piece),
            )]));
        }
    }
    chunks.push(ChatCompletionChunk::finish("tool_calls"));
    chunks
}

fn history(turns: usize) -> Vec<Content> {
    (0..turns)
        .flat_map(|i| {
            [
                Content::user(vec![Part::text(format!("question {i}"))]),
                Content::model(vec![
                    Part::text("checking"),
                    Part::function_call("lookup", json!({"turn": i})),
                ]),
                Content::user(vec![Part::function_response("lookup", json!({"ok": i}))]),
            ]
        })
        .collect()
}

// ── Benchmarks ──────────────────────────────────────────────────────────

fn bench_text_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_text");
    for count in [100usize, 1_000, 10_000] {
        let chunks = text_deltas(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &chunks, |b, chunks| {
            b.iter(|| {
                let mut translator = StreamTranslator::default();
                let mut emitted = 0usize;
                for chunk in chunks {
                    emitted += translator.push(black_box(chunk)).map_or(0, |out| out.len());
                }
                emitted += usize::from(translator.finish().is_some());
                black_box(emitted)
            });
        });
    }
    group.finish();
}

fn bench_tool_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_tool_calls");
    for (calls, fragments) in [(1u32, 10usize), (4, 50), (16, 100)] {
        let chunks = tool_deltas(calls, fragments);
        group.bench_with_input(
            BenchmarkId::new("calls_x_fragments", format!("{calls}x{fragments}")),
            &chunks,
            |b, chunks| {
                b.iter(|| {
                    let mut translator = StreamTranslator::default();
                    let mut out = Vec::new();
                    for chunk in chunks {
                        if let Ok(emitted) = translator.push(black_box(chunk)) {
                            out.extend(emitted);
                        }
                    }
                    black_box(out)
                });
            },
        );
    }
    group.finish();
}

fn bench_request_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_chat_messages");
    for turns in [10usize, 100, 500] {
        let contents = history(turns);
        group.bench_with_input(BenchmarkId::from_parameter(turns), &contents, |b, contents| {
            b.iter(|| black_box(to_chat_messages(black_box(contents), None)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_text_stream,
    bench_tool_stream,
    bench_request_conversion
);
criterion_main!(benches);
