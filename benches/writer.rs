use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parcel_tlv::{writer, FieldValue, Parcel, Parcelable, Result, TlvBuffer};
use serde::Serialize;

#[derive(Clone, Serialize)]
struct Entry {
    id: i64,
    name: String,
    score: f32,
    tags: Vec<String>,
}

impl Parcelable for Entry {
    fn write_to_parcel(&self, buf: &mut dyn TlvBuffer, flags: u32) -> Result<()> {
        let start = writer::begin_object(buf)?;
        writer::write_scalar(buf, 1, Some(self.id))?;
        writer::write_sized(buf, 2, Some(FieldValue::Str(&self.name)), flags, false)?;
        writer::write_scalar(buf, 3, Some(self.score))?;
        writer::write_sized(buf, 4, Some(FieldValue::from(&self.tags[..])), flags, false)?;
        writer::end_object(buf, start)
    }
}

fn make_entries(count: usize) -> Vec<Entry> {
    (0..count)
        .map(|i| Entry {
            id: i as i64,
            name: format!("entry-{}", i),
            score: i as f32 * 0.5,
            tags: vec!["a".to_string(), format!("t{}", i % 7)],
        })
        .collect()
}

fn bench_object_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_array");
    for &size in &[16usize, 256, 4096] {
        let entries = make_entries(size);
        let bytes = Parcel::marshall(&Batch(&entries), 0).unwrap().len() as u64;
        group.throughput(Throughput::Bytes(bytes));
        group.bench_with_input(BenchmarkId::new("writer", size), &entries, |b, entries| {
            b.iter(|| Parcel::marshall(&Batch(entries), 0).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("serde", size), &entries, |b, entries| {
            b.iter(|| parcel_tlv::to_vec(&SerdeBatch { entries }).unwrap());
        });
    }
    group.finish();
}

fn bench_large_field(c: &mut Criterion) {
    let data = vec![0x5Au8; 1 << 20];
    c.bench_function("escaped_bytes_1MiB", |b| {
        b.iter(|| {
            let mut parcel = Parcel::with_capacity(data.len() + 16);
            writer::write_sized(&mut parcel, 1, Some(FieldValue::Bytes(&data)), 0, false).unwrap();
            parcel
        });
    });
}

struct Batch<'a>(&'a [Entry]);

impl<'a> Parcelable for Batch<'a> {
    fn write_to_parcel(&self, buf: &mut dyn TlvBuffer, flags: u32) -> Result<()> {
        let start = writer::begin_object(buf)?;
        writer::write_sized(buf, 1, Some(FieldValue::objects(self.0)), flags, false)?;
        writer::end_object(buf, start)
    }
}

#[derive(Serialize)]
struct SerdeBatch<'a> {
    entries: &'a [Entry],
}

criterion_group!(benches, bench_object_array, bench_large_field);
criterion_main!(benches);
