use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bookcard::card::build_card;
use bookcard::dom::Document;
use bookcard::export::vertical::apply_vertical_layout;
use bookcard::rasterize::{new_rasterizer, CanvasOptions};
use bookcard::{AppState, CardContent, ConfigSet, Viewport};

fn fixture() -> (Document, usize) {
    let mut doc = Document::new(Viewport { width: 1280, height: 720 });
    let content = CardContent {
        quote: "人生到处知何似，应似飞鸿踏雪泥。泥上偶然留指爪，鸿飞那复计东西。".into(),
        book: "和子由渑池怀旧".into(),
        author: "苏轼".into(),
        seal: "雪泥鸿爪".into(),
    };
    let card = build_card(&mut doc, &content, &AppState::default(), &ConfigSet::defaults());
    (doc, card)
}

fn bench_rasterize(c: &mut Criterion) {
    let (doc, card) = fixture();
    let rasterizer = new_rasterizer();
    c.bench_function("rasterize_default_card", |b| {
        b.iter(|| {
            let options = CanvasOptions { width: 400.0, scale: 2.0, ..Default::default() };
            let surface = rasterizer.rasterize(black_box(&doc), card, &options).unwrap();
            black_box(surface.width())
        })
    });
}

fn bench_vertical_transform(c: &mut Criterion) {
    c.bench_function("vertical_transform", |b| {
        b.iter(|| {
            let (mut doc, card) = fixture();
            apply_vertical_layout(black_box(&mut doc), card);
            black_box(doc.walk(card).len())
        })
    });
}

criterion_group!(benches, bench_rasterize, bench_vertical_transform);
criterion_main!(benches);
