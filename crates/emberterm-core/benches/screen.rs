use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use emberterm_core::Emulator;

struct Corpus {
    id: &'static str,
    bytes: Vec<u8>,
}

fn corpora() -> Vec<Corpus> {
    let plain: Vec<u8> = b"the quick brown fox jumps over the lazy dog\r\n"
        .iter()
        .copied()
        .cycle()
        .take(16 * 1024)
        .collect();

    let mut cursor_heavy = Vec::with_capacity(16 * 1024);
    let mut row = 1u16;
    while cursor_heavy.len() < 16 * 1024 {
        cursor_heavy.extend_from_slice(format!("\x1b[{};{}Hstatus", row % 24 + 1, 1).as_bytes());
        cursor_heavy.extend_from_slice(b"\x1b[K\x1b[2;1H\x1b[1@x\x1b[1P");
        row = row.wrapping_add(7);
    }

    let mut scroll_heavy = Vec::with_capacity(16 * 1024);
    scroll_heavy.extend_from_slice(b"\x1b[5;20r");
    while scroll_heavy.len() < 16 * 1024 {
        scroll_heavy.extend_from_slice(b"line of scrolling region output\r\n\x1b[S\x1b[T");
    }

    vec![
        Corpus {
            id: "plain_text",
            bytes: plain,
        },
        Corpus {
            id: "cursor_heavy",
            bytes: cursor_heavy,
        },
        Corpus {
            id: "scroll_heavy",
            bytes: scroll_heavy,
        },
    ]
}

fn bench_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed");
    for corpus in corpora() {
        group.throughput(Throughput::Bytes(corpus.bytes.len() as u64));
        group.bench_function(corpus.id, |b| {
            b.iter(|| {
                let mut emulator = Emulator::new(24, 80);
                emulator.feed(black_box(&corpus.bytes));
                black_box(emulator.cursor_row())
            });
        });
    }
    group.finish();
}

fn bench_history_scroll(c: &mut Criterion) {
    let mut filled = Emulator::new(24, 80);
    for i in 0..2000u32 {
        filled.feed(format!("history line {i}\r\n").as_bytes());
    }

    c.bench_function("view_scroll_sweep", |b| {
        b.iter(|| {
            for offset in (0..1000).step_by(37) {
                filled.scroll(black_box(offset));
                black_box(filled.row_data(0));
            }
            filled.scroll(0);
        });
    });
}

criterion_group!(benches, bench_feed, bench_history_scroll);
criterion_main!(benches);
