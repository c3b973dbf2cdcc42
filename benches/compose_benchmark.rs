//! Benchmarks for bulletin composition and rendering.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use boletin::api::{Bulletin, Category, Summary, TypeRef};
use boletin::render::{compose_document, to_pdf};
use boletin::speech::{prepare_chunks, ChunkOptions};
use boletin::{BulletinData, PdfConfig};

/// Bulletin with `categories` categories of `per_category` summaries each.
fn sample_data(categories: i64, per_category: i64) -> BulletinData {
    let bulletin = Bulletin {
        id: Some(1),
        numero_edicion: Some(42),
        fecha: Some("2025-03-15".into()),
        tipo_boletin: Some(TypeRef::Name("Ordinario".into())),
        titulo_edicion: None,
    };
    let cats: Vec<Category> = (1..=categories)
        .map(|id| Category {
            id,
            nombre: format!("Categoría {}", id),
            abreviatura: format!("C{}", id),
        })
        .collect();
    let paragraph = "<p style=\"text-align: justify;\">VISTO el expediente administrativo y \
                     <strong>CONSIDERANDO</strong> que corresponde dictar el presente acto.</p>";
    let summaries: Vec<Summary> = (1..=categories)
        .flat_map(|cat| {
            (1..=per_category).map(move |n| Summary {
                id: cat * 1000 + n,
                contenido: Some(format!(
                    "<p><strong>DECRETO N° {:04}</strong></p>{}",
                    n,
                    paragraph.repeat(6)
                )),
                fecha: Some("2025-03-14".into()),
                id_categoria: cat,
                id_boletin: Some(1),
            })
        })
        .collect();
    BulletinData::assemble(bulletin, "Ordinario", cats, &summaries).unwrap()
}

fn bench_compose(c: &mut Criterion) {
    let data = sample_data(5, 20);
    let config = PdfConfig::default();

    c.bench_function("compose_100_summaries", |b| {
        b.iter(|| compose_document(black_box(&data), black_box(&config)))
    });
}

fn bench_pdf(c: &mut Criterion) {
    let data = sample_data(5, 20);
    let doc = compose_document(&data, &PdfConfig::default());

    c.bench_function("to_pdf_100_summaries", |b| {
        b.iter(|| to_pdf(black_box(&doc)).unwrap())
    });
}

fn bench_chunks(c: &mut Criterion) {
    let data = sample_data(3, 10);
    let doc = compose_document(&data, &PdfConfig::default());
    let text = boletin::render::to_text_with_markers(&doc);

    c.bench_function("prepare_chunks", |b| {
        b.iter(|| prepare_chunks(black_box(&text), &ChunkOptions::default()))
    });
}

criterion_group!(benches, bench_compose, bench_pdf, bench_chunks);
criterion_main!(benches);
