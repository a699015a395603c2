use burn::backend::ndarray::NdArrayDevice;
use burn::module::AutodiffModule;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ffdnet_rust::config::{ColorMode, NetworkConfig, TrainingConfig};
use ffdnet_rust::data::noise_levels_for_batch;
use ffdnet_rust::device::{to_device_batch, to_device_levels};
use ffdnet_rust::training::CheckpointStore;
use ffdnet_rust::{adam, CpuAutodiffBackend, DenoisingNetwork, FfdNet, Trainer};
use ndarray::Array4;

const DEVICE: NdArrayDevice = NdArrayDevice::Cpu;

fn bench_eval_forward(c: &mut Criterion) {
    let config = NetworkConfig::builder(ColorMode::Gray).features(16).depth(5).build();
    let network = FfdNet::<CpuAutodiffBackend>::seeded(&config, Some(0), &DEVICE)
        .expect("Failed to build network for benchmark")
        .valid();

    let mut group = c.benchmark_group("eval_forward");
    for size in [32, 64, 128].iter() {
        let input = Array4::<f32>::from_elem((1, 1, *size, *size), 0.5);
        let levels = noise_levels_for_batch(1, 25.0 / 255.0);
        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| {
                network.forward(
                    to_device_batch(black_box(input), &DEVICE),
                    to_device_levels(&levels, &DEVICE),
                )
            });
        });
    }
    group.finish();
}

fn bench_train_step(c: &mut Criterion) {
    let config = NetworkConfig::builder(ColorMode::Rgb).features(16).depth(5).build();
    let mut network = FfdNet::<CpuAutodiffBackend>::seeded(&config, Some(0), &DEVICE)
        .expect("Failed to build network for benchmark");
    let training = TrainingConfig::builder().seed(0).show_progress(false).build();
    let mut trainer = Trainer::<CpuAutodiffBackend>::new(training, &DEVICE, CheckpointStore::new("unused"))
        .expect("Failed to build trainer for benchmark");
    let mut optimizer = adam();
    let batch = Array4::<f32>::from_elem((4, 3, 32, 32), 0.5);

    c.bench_function("train_step", |b| {
        b.iter(|| {
            trainer
                .train_step(&mut network, &mut optimizer, black_box(&batch), 0.1)
                .expect("train step failed")
        });
    });
}

criterion_group!(benches, bench_eval_forward, bench_train_step);
criterion_main!(benches);
