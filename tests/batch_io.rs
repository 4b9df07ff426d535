//! End-to-end batch runs against real directories: row tables in, PNG
//! files out.

use std::{io::Cursor, sync::Arc};

use imagemix::{
    BatchThreading, CancelFlag, Compositor, DirAssetSource, DirOutputSink, EntryOutcome,
    RenderOptions, template_from_rows,
};

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn write_png(path: &std::path::Path, width: u32, height: u32, rgba: [u8; 4]) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, buf).unwrap();
}

#[test]
fn rows_to_rendered_pngs_on_disk() {
    let assets_dir = tempfile::tempdir().unwrap();
    write_png(&assets_dir.path().join("bg.png"), 1, 1, [0, 0, 64, 255]);
    write_png(&assets_dir.path().join("logo.png"), 4, 4, [255, 0, 0, 255]);

    let template = template_from_rows(
        &[
            row(&["hero.png", "wide", "bg", "logo"]),
            row(&["plain.png", "square", "", "bg", ""]),
            row(&["broken.png", "wide", "missing-layer"]),
        ],
        &[row(&["wide", "32", "16"]), row(&["square", "8", "8"])],
        &[],
        &[
            row(&["bg", "32", "16", "0", "0", "bg.png"]),
            row(&["logo", "4", "4", "2", "2", "logo.png"]),
        ],
    )
    .unwrap();

    let out_dir = tempfile::tempdir().unwrap();
    let engine = Compositor::new(
        &template,
        Arc::new(DirAssetSource::new(assets_dir.path())),
        None,
        RenderOptions::default(),
    )
    .unwrap();
    let sink = DirOutputSink::new(out_dir.path());
    let report = engine
        .render_batch(&sink, &BatchThreading::default(), &CancelFlag::new())
        .unwrap();

    assert_eq!(report.rendered(), 2);
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.entries[2].outcome, EntryOutcome::Failed(_)));

    let hero = image::open(out_dir.path().join("hero.png")).unwrap().to_rgba8();
    assert_eq!(hero.dimensions(), (32, 16));
    // bg is stretched full frame; the logo sits 2px in from the
    // bottom-left corner (lower-left origin).
    assert_eq!(hero.get_pixel(0, 0).0, [0, 0, 64, 255]);
    assert_eq!(hero.get_pixel(3, 11).0, [255, 0, 0, 255]);

    // The square layout reuses the 32x16 bg layer on an 8x8 canvas; the
    // overhang clips. Its row had empty layer slots, which are skipped.
    let plain = image::open(out_dir.path().join("plain.png")).unwrap().to_rgba8();
    assert_eq!(plain.dimensions(), (8, 8));
    assert_eq!(plain.get_pixel(4, 4).0, [0, 0, 64, 255]);

    // The failed entry left no file behind.
    assert!(!out_dir.path().join("broken.png").exists());
}

#[test]
fn batch_reruns_produce_identical_files() {
    let assets_dir = tempfile::tempdir().unwrap();
    write_png(&assets_dir.path().join("bg.png"), 2, 2, [10, 200, 30, 255]);

    let template = template_from_rows(
        &[row(&["out.png", "c", "bg"])],
        &[row(&["c", "9", "7"])],
        &[],
        &[row(&["bg", "9", "7", "-1", "-1", "bg.png"])],
    )
    .unwrap();

    let engine = Compositor::new(
        &template,
        Arc::new(DirAssetSource::new(assets_dir.path())),
        None,
        RenderOptions::default(),
    )
    .unwrap();

    let out_a = tempfile::tempdir().unwrap();
    let out_b = tempfile::tempdir().unwrap();
    engine
        .render_batch(
            &DirOutputSink::new(out_a.path()),
            &BatchThreading::default(),
            &CancelFlag::new(),
        )
        .unwrap();
    engine
        .render_batch(
            &DirOutputSink::new(out_b.path()),
            &BatchThreading::default(),
            &CancelFlag::new(),
        )
        .unwrap();

    let a = std::fs::read(out_a.path().join("out.png")).unwrap();
    let b = std::fs::read(out_b.path().join("out.png")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn template_survives_json_round_trip_through_disk() {
    let template = template_from_rows(
        &[row(&["out.png", "c", "bg"])],
        &[row(&["c", "600", "300"])],
        &[row(&["title", "40", "0", "0", "0", "20", "250", "Sale!"])],
        &[row(&["bg", "600", "300", "0", "0", "bg.png"])],
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&template).unwrap()).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let back: imagemix::Template = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(back, template);
}
