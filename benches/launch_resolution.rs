use criterion::{black_box, criterion_group, criterion_main, Criterion};
use herdsman::infrastructure::broadcast::{encode_frame, format_status, parse_status};
use herdsman::services::{
    build_command_line, resolve_cpu_affinity, sanitize_line, CommandLineParams,
};

fn bench_command_line(c: &mut Criterion) {
    let params = CommandLineParams {
        host: "stratum+tcp://pool.example",
        port: 3333,
        username: "alice",
        password: "hunter2",
        extra_args: "-t 4 --scrypt",
    };

    c.bench_function("build_command_line", |b| {
        b.iter(|| {
            build_command_line(
                black_box("-o {combinedhost}:{port} -u {username} -p {password} {args}"),
                black_box(&params),
            )
        });
    });
}

fn bench_affinity(c: &mut Criterion) {
    c.bench_function("resolve_cpu_affinity_list", |b| {
        b.iter(|| resolve_cpu_affinity(black_box("1,2,4,6,8,10,12,14")));
    });
    c.bench_function("resolve_cpu_affinity_range", |b| {
        b.iter(|| resolve_cpu_affinity(black_box("3-48")));
    });
}

fn bench_output_line(c: &mut Criterion) {
    let line = "\u{1b}[32m[2026-10-18 15:04:05] accepted: 1234/1235 (99.92%), 812.5 kH/s yay!!!\u{1b}[0m";

    c.bench_function("sanitize_line", |b| {
        b.iter(|| sanitize_line(black_box(line)));
    });
    c.bench_function("status_frame_round_trip", |b| {
        b.iter(|| {
            let frame = encode_frame(&format_status(black_box("gpu0"), black_box(line)));
            parse_status(&frame.payload)
        });
    });
}

criterion_group!(benches, bench_command_line, bench_affinity, bench_output_line);
criterion_main!(benches);
