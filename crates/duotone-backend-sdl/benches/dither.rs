//! Benchmarks for the full-screen dither pass.

use std::io::Write;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use duotone_backend_sdl::{ShaderProgram, SoftRenderer};
use duotone_types::backend::GraphicsBackend;
use duotone_types::color::Color;
use duotone_types::geometry::Rect;

const DITHER: &str = r#"
program = "ordered-dither"
matrix = 4
pixel_scale = 2

[uniforms]
lightColor = [0.96, 0.75, 0.91, 1.0]
darkColor = [0.1, 0.09, 0.15, 1.0]
"#;

fn bench_shade(c: &mut Criterion) {
    let shader = ShaderProgram::parse(DITHER).expect("valid program");
    let colors = shader.colors();
    c.bench_function("shade_row_1280", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for x in 0..1280 {
                acc += shader.shade(colors, x, 7, Color::gray((x % 256) as u8)).r as u32;
            }
            acc
        });
    });
}

fn bench_surface_blit(c: &mut Criterion) {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(DITHER.as_bytes()).expect("write shader");

    let mut group = c.benchmark_group("dithered_blit");
    for (w, h) in [(640u32, 360u32), (1280, 720)] {
        let mut gfx = SoftRenderer::new(w, h);
        let shader = gfx.load_shader(file.path()).expect("load shader");
        let surface = gfx.create_surface(w, h).expect("surface");
        gfx.begin_surface(surface).expect("begin");
        gfx.fill_rect(Rect::sized(w as f32, h as f32), Color::gray(128))
            .expect("fill");
        gfx.end_surface().expect("end");
        let bounds = Rect::sized(w as f32, h as f32);

        group.bench_with_input(BenchmarkId::from_parameter(format!("{w}x{h}")), &(), |b, _| {
            b.iter(|| {
                gfx.begin_shader(shader).expect("bind");
                gfx.draw_surface(surface, bounds.flipped_y(), bounds, Color::WHITE)
                    .expect("blit");
                gfx.end_shader().expect("unbind");
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_shade, bench_surface_blit);
criterion_main!(benches);
