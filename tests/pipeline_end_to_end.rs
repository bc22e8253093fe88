use scalematch::{
    BoundingBox, DetectConfig, Detector, ImageView, OwnedImage, ScaleMatcher, ScaleSet, Template,
};

fn make_texture(width: usize, height: usize, a: usize, b: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * a) ^ (y * b) ^ (x * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    data
}

/// Dark Gaussian blob on a white background, symmetric about the center.
fn make_blob(size: usize, sigma: f32) -> Vec<u8> {
    let c = (size as f32 - 1.0) * 0.5;
    let mut data = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - c;
            let dy = y as f32 - c;
            let g = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            data.push((255.0 - 200.0 * g).round() as u8);
        }
    }
    data
}

fn paste(scene: &mut [u8], scene_width: usize, patch: &OwnedImage, x0: usize, y0: usize) {
    for y in 0..patch.height() {
        let src = &patch.data()[y * patch.width()..(y + 1) * patch.width()];
        let dst = (y0 + y) * scene_width + x0;
        scene[dst..dst + patch.width()].copy_from_slice(src);
    }
}

fn contains(bbox: &BoundingBox, point: (usize, usize)) -> bool {
    (bbox.x1..bbox.x2).contains(&point.0) && (bbox.y1..bbox.y2).contains(&point.1)
}

#[test]
fn exact_copy_at_sampled_scale_is_detected_once() {
    let template = Template::new("tex", make_texture(24, 20, 13, 7), 24, 20).unwrap();
    let scale = ScaleSet::default().scales()[1];
    let copy = template.scaled(scale).unwrap().unwrap();
    assert_eq!((copy.width(), copy.height()), template.scaled_size(scale));

    let (width, height) = (120, 90);
    let (x0, y0) = (40, 30);
    let mut scene = vec![255u8; width * height];
    paste(&mut scene, width, &copy, x0, y0);
    let view = ImageView::from_slice(&scene, width, height).unwrap();

    let peaks = ScaleMatcher::default()
        .match_at_scale(&template, view, scale)
        .unwrap();
    let exact = peaks
        .iter()
        .find(|p| p.x == x0 && p.y == y0)
        .expect("exact placement crosses the threshold");
    assert!(exact.score > 0.999);

    let detections = Detector::new(vec![template]).detect(view).unwrap();
    assert_eq!(detections.count(), 1);
    let center = (x0 + copy.width() / 2, y0 + copy.height() / 2);
    assert!(contains(&detections.boxes[0].bbox, center));
}

#[test]
fn scene_without_instances_yields_nothing() {
    let templates = vec![
        Template::new("blob", make_blob(30, 5.0), 30, 30).unwrap(),
        Template::new("tex", make_texture(24, 20, 13, 7), 24, 20).unwrap(),
    ];
    let blank = vec![255u8; 150 * 100];
    let view = ImageView::from_slice(&blank, 150, 100).unwrap();
    let detections = Detector::new(templates).detect(view).unwrap();
    assert_eq!(detections.count(), 0);
    assert!(detections.boxes.is_empty());

    // A symmetric blob is uncorrelated with a vertical intensity ramp.
    let (width, height) = (150, 100);
    let ramp: Vec<u8> = (0..height)
        .flat_map(|y| std::iter::repeat((y * 255 / (height - 1)) as u8).take(width))
        .collect();
    let view = ImageView::from_slice(&ramp, width, height).unwrap();
    let blob = Template::new("blob", make_blob(30, 5.0), 30, 30).unwrap();
    let detections = Detector::new(vec![blob]).detect(view).unwrap();
    assert_eq!(detections.count(), 0);
}

#[test]
fn instance_scaled_by_one_and_a_half_is_found_once() {
    let template = Template::new("blob", make_blob(40, 6.0), 40, 40).unwrap();
    let instance = template.scaled(1.5).unwrap().unwrap();
    assert_eq!((instance.width(), instance.height()), (60, 60));

    let (width, height) = (220, 180);
    let (x0, y0) = (70, 50);
    let mut scene = vec![255u8; width * height];
    paste(&mut scene, width, &instance, x0, y0);
    let view = ImageView::from_slice(&scene, width, height).unwrap();
    let center = (x0 + 30, y0 + 30);

    // 1.5 falls between two grid points (1.4667 and 1.6).
    let scales = ScaleSet::default();
    let mut nearest: Vec<f64> = scales.scales().to_vec();
    nearest.sort_by(|a, b| (a - 1.5).abs().total_cmp(&(b - 1.5).abs()));
    nearest.truncate(2);
    assert!(nearest.iter().all(|s| (s - 1.5).abs() < 0.11), "{nearest:?}");
    assert!(nearest.iter().any(|&s| s < 1.5) && nearest.iter().any(|&s| s > 1.5));
    let matcher = ScaleMatcher::default();
    let hit = nearest.iter().any(|&scale| {
        matcher
            .candidates_at_scale(&template, 0, view, scale)
            .unwrap()
            .iter()
            .any(|c| contains(&c.bbox, center))
    });
    assert!(hit, "no scale near 1.5 matched the instance");

    let detections = Detector::new(vec![template]).detect(view).unwrap();
    assert_eq!(detections.count(), 1);
    assert!(contains(&detections.boxes[0].bbox, center));
}

fn two_template_scene() -> (Vec<Template>, Vec<u8>, usize, usize, [(usize, usize); 2]) {
    let a = Template::new("a", make_texture(24, 20, 13, 7), 24, 20).unwrap();
    let b = Template::new("b", make_texture(22, 22, 5, 11), 22, 22).unwrap();
    let scales = ScaleSet::default();
    let copy_a = a.scaled(scales.scales()[2]).unwrap().unwrap();
    let copy_b = b.scaled(scales.scales()[4]).unwrap().unwrap();

    let (width, height) = (220, 140);
    let mut scene = vec![255u8; width * height];
    paste(&mut scene, width, &copy_a, 20, 20);
    paste(&mut scene, width, &copy_b, 130, 60);
    let centers = [
        (20 + copy_a.width() / 2, 20 + copy_a.height() / 2),
        (130 + copy_b.width() / 2, 60 + copy_b.height() / 2),
    ];
    (vec![a, b], scene, width, height, centers)
}

#[test]
fn two_templates_are_aggregated_in_either_order() {
    let (templates, scene, width, height, centers) = two_template_scene();
    let view = ImageView::from_slice(&scene, width, height).unwrap();

    let forward = Detector::new(templates.clone()).detect(view).unwrap();
    let mut reversed_templates = templates;
    reversed_templates.reverse();
    let reversed = Detector::new(reversed_templates).detect(view).unwrap();

    for detections in [&forward, &reversed] {
        assert_eq!(detections.count(), 2);
        for center in centers {
            assert!(
                detections.boxes.iter().any(|c| contains(&c.bbox, center)),
                "instance at {center:?} missing"
            );
        }
    }
}

#[test]
fn repeated_runs_are_identical() {
    let (templates, scene, width, height, _) = two_template_scene();
    let view = ImageView::from_slice(&scene, width, height).unwrap();
    let detector = Detector::new(templates);
    let first = detector.detect(view).unwrap();
    let second = detector.detect(view).unwrap();
    assert_eq!(first, second);
}

#[test]
fn annotation_receives_exactly_the_accepted_boxes() {
    let (templates, scene, width, height, _) = two_template_scene();
    let view = ImageView::from_slice(&scene, width, height).unwrap();
    let mut drawn: Vec<BoundingBox> = Vec::new();
    let detections = Detector::new(templates)
        .detect_annotated(view, &mut drawn)
        .unwrap();
    let accepted: Vec<BoundingBox> = detections.boxes.iter().map(|c| c.bbox).collect();
    assert_eq!(drawn, accepted);
}

#[test]
fn dedup_state_persists_across_templates() {
    let (templates, scene, width, height, _) = two_template_scene();
    let view = ImageView::from_slice(&scene, width, height).unwrap();
    let once = Detector::new(vec![templates[0].clone()]).detect(view).unwrap();
    let twice = Detector::new(vec![templates[0].clone(), templates[0].clone()])
        .detect(view)
        .unwrap();
    assert_eq!(once.count(), 1);
    assert_eq!(twice, once);
}

#[test]
fn template_larger_than_scene_contributes_nothing() {
    let big = Template::new("big", make_texture(60, 60, 13, 7), 60, 60).unwrap();
    let scene = make_texture(40, 40, 3, 5);
    let view = ImageView::from_slice(&scene, 40, 40).unwrap();
    let detections = Detector::new(vec![big]).detect(view).unwrap();
    assert_eq!(detections.count(), 0);
}

#[test]
fn flat_template_is_skipped_without_error() {
    let flat = Template::new("flat", vec![128u8; 16 * 16], 16, 16).unwrap();
    let tex = Template::new("tex", make_texture(24, 20, 13, 7), 24, 20).unwrap();
    let scale = ScaleSet::default().scales()[0];
    let copy = tex.scaled(scale).unwrap().unwrap();
    let mut scene = vec![255u8; 80 * 60];
    paste(&mut scene, 80, &copy, 10, 10);
    let view = ImageView::from_slice(&scene, 80, 60).unwrap();

    let detections = Detector::new(vec![flat, tex])
        .with_config(DetectConfig::default())
        .detect(view)
        .unwrap();
    assert_eq!(detections.count(), 1);
    assert_eq!(detections.boxes[0].template_idx, 1);
}
