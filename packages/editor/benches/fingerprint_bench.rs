use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vitae_editor::{
    visible_sections, Document, ExperienceEntry, Fingerprint, LayoutRules, SkillEntry,
};

fn large_document() -> Document {
    let mut doc = Document::new();
    doc.title = "Senior Platform Engineer".to_string();
    doc.summary = "Builds reliable distributed systems. ".repeat(20);

    for i in 0..40 {
        doc.experience.push(ExperienceEntry {
            company: format!("Company {}", i),
            position: "Engineer".to_string(),
            description: "Owned the storage layer and its on-call rotation. ".repeat(5),
            highlights: vec!["Cut p99 latency in half".to_string(); 4],
            ..Default::default()
        });
    }
    for i in 0..30 {
        doc.skills.push(SkillEntry {
            name: format!("Skill {}", i),
            ..Default::default()
        });
    }

    doc
}

fn fingerprint_empty_document(c: &mut Criterion) {
    let doc = Document::new();

    c.bench_function("fingerprint_empty_document", |b| {
        b.iter(|| Fingerprint::compute(black_box(&doc)))
    });
}

fn fingerprint_large_document(c: &mut Criterion) {
    let doc = large_document();

    c.bench_function("fingerprint_large_document", |b| {
        b.iter(|| Fingerprint::compute(black_box(&doc)))
    });
}

fn visible_sections_large_document(c: &mut Criterion) {
    let doc = large_document();
    let rules = LayoutRules::default();

    c.bench_function("visible_sections_large_document", |b| {
        b.iter(|| visible_sections(black_box(&doc), black_box(&rules)))
    });
}

criterion_group!(
    benches,
    fingerprint_empty_document,
    fingerprint_large_document,
    visible_sections_large_document
);
criterion_main!(benches);
