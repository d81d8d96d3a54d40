use criterion::{Criterion, criterion_group, criterion_main};
use envfile::{EnvLoader, Environment};
use tempfile::TempDir;

fn bench_load(c: &mut Criterion) {
    let dir = TempDir::new().expect("temp dir");
    let env_path = dir.path().join(".env");
    std::fs::write(&env_path, make_env_content(2_000)).expect("failed to write bench file");

    c.bench_function("load_in_memory", |b| {
        b.iter(|| {
            let mut loader = EnvLoader::new()
                .path(&env_path)
                .target(Environment::memory());
            loader.load().expect("load should succeed")
        });
    });
}

fn make_env_content(entries: usize) -> String {
    let mut content = String::with_capacity(entries * 16);
    for idx in 0..entries {
        content.push_str("KEY_");
        content.push_str(&idx.to_string());
        content.push('=');
        content.push_str("value");
        content.push('\n');
    }
    content
}

criterion_group!(benches, bench_load);
criterion_main!(benches);
