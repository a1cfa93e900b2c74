use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use secman_cipher::{KEY_LEN, decrypt, encrypt};

fn bench_encrypt_decrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypt_decrypt");
    let key = [42u8; KEY_LEN];

    let sizes = [("256B", 256usize), ("4KB", 4 * 1024), ("64KB", 64 * 1024)];

    for (label, size) in sizes {
        let data = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("encrypt", label), &data, |b, d| {
            b.iter(|| encrypt(d, &key).unwrap());
        });

        let sealed = encrypt(&data, &key).expect("encrypt failed");

        group.bench_with_input(BenchmarkId::new("decrypt", label), &sealed, |b, s| {
            b.iter(|| decrypt(s, &key).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encrypt_decrypt);
criterion_main!(benches);
