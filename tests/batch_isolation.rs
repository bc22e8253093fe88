use scalematch::{run_batch, Detector, ImageView, ScaleMatchError, ScaleSet, Template};

fn make_texture(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push((((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF) as u8);
        }
    }
    data
}

struct SceneFixture {
    name: &'static str,
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

fn fixtures(template: &Template) -> Vec<SceneFixture> {
    let copy = template
        .scaled(ScaleSet::default().scales()[1])
        .unwrap()
        .unwrap();
    let (width, height) = (100, 80);
    let mut with_instance = vec![255u8; width * height];
    for y in 0..copy.height() {
        let dst = (25 + y) * width + 30;
        with_instance[dst..dst + copy.width()]
            .copy_from_slice(&copy.data()[y * copy.width()..(y + 1) * copy.width()]);
    }

    vec![
        SceneFixture {
            name: "instance.png",
            width,
            height,
            pixels: with_instance,
        },
        SceneFixture {
            name: "truncated.png",
            width,
            height,
            pixels: vec![0u8; 10],
        },
        SceneFixture {
            name: "blank.png",
            width,
            height,
            pixels: vec![255u8; width * height],
        },
    ]
}

#[test]
fn failed_scene_reports_zero_and_does_not_block_others() {
    let template = Template::new("tex", make_texture(24, 20), 24, 20).unwrap();
    let scenes = fixtures(&template);
    let detector = Detector::new(vec![template]);

    let report = run_batch(
        &scenes,
        false,
        |scene| scene.name.to_string(),
        |scene| {
            let view = ImageView::from_slice(&scene.pixels, scene.width, scene.height)?;
            detector.detect(view)
        },
    );

    let counts: Vec<usize> = report.scenes.iter().map(|s| s.count()).collect();
    assert_eq!(counts, vec![1, 0, 0]);
    assert_eq!(report.total_count(), 1);

    let failed: Vec<_> = report.failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, "truncated.png");
    assert_eq!(
        failed[0].error,
        Some(ScaleMatchError::BufferTooSmall {
            needed: 8000,
            got: 10,
        })
    );
    assert!(report.scenes[2].is_ok());
}
