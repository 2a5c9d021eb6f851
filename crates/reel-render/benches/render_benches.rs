use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use reel_core::{FrameBuffer, ReelTiming, REEL_HEIGHT, REEL_WIDTH};
use reel_render::{BlockFont, FrameCompositor};

const QUOTE: &str = "The only way to do great work is to love what you do.";
const CTA: &str = "Follow for daily motivation!";

fn landscape_source() -> FrameBuffer {
    let (w, h) = (1260, 750);
    let mut img = FrameBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            img.set_pixel(x, y, [(x % 256) as u8, (y % 256) as u8, 96, 255]);
        }
    }
    img
}

fn bench_compositor(c: &mut Criterion) {
    let mut group = c.benchmark_group("reel_compositor");
    group.sample_size(10);

    let compositor = FrameCompositor::new(Arc::new(BlockFont::default()));
    let image = landscape_source();

    group.bench_function("single_frame_1080x1920", |b| {
        let mut surface = FrameBuffer::new(REEL_WIDTH, REEL_HEIGHT);
        b.iter(|| compositor.render(&mut surface, &image, QUOTE, CTA, 0.5));
    });

    group.bench_function("full_clip_240_frames", |b| {
        b.iter_custom(|iters| {
            let timing = ReelTiming::default();
            let total = timing.total_frames();
            let mut surface = FrameBuffer::new(REEL_WIDTH, REEL_HEIGHT);
            let mut elapsed = std::time::Duration::ZERO;

            for _ in 0..iters {
                let start = std::time::Instant::now();
                for frame_idx in 0..total {
                    let progress = frame_idx as f64 / total as f64;
                    compositor.render(&mut surface, &image, QUOTE, CTA, progress);
                }
                elapsed += start.elapsed();
            }
            elapsed
        });
    });

    group.finish();
}

criterion_group!(benches, bench_compositor);
criterion_main!(benches);
