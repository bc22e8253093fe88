use clap::Parser;
use scalematch::io::{load_scene, load_templates_from_dir, RgbAnnotator};
use scalematch::{
    run_batch, BatchReport, Candidate, DetectConfig, Detections, Detector, ScaleMatchError,
    ScaleSet, SceneOutcome,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Count template instances in scene images (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectConfigJson {
    threshold: f32,
    scale_start: f64,
    scale_end: f64,
    scale_count: usize,
    proximity_radius: f64,
    min_var_i: f32,
    parallel: bool,
}

impl Default for DetectConfigJson {
    fn default() -> Self {
        let cfg = DetectConfig::default();
        Self {
            threshold: cfg.threshold,
            scale_start: 0.8,
            scale_end: 2.0,
            scale_count: cfg.scales.len(),
            proximity_radius: cfg.proximity_radius,
            min_var_i: cfg.min_var_i,
            parallel: true,
        }
    }
}

impl DetectConfigJson {
    fn to_config(&self) -> Result<DetectConfig, ScaleMatchError> {
        let cfg = DetectConfig {
            threshold: self.threshold,
            scales: ScaleSet::linspace(self.scale_start, self.scale_end, self.scale_count)?,
            proximity_radius: self.proximity_radius,
            min_var_i: self.min_var_i,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct AnnotateConfigJson {
    stroke: u32,
    color: [u8; 3],
}

impl Default for AnnotateConfigJson {
    fn default() -> Self {
        Self {
            stroke: 2,
            color: [0, 255, 0],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    scenes: Vec<PathBuf>,
    scene_dir: Option<PathBuf>,
    scene_extension: String,
    template_dir: PathBuf,
    template_extension: String,
    output_dir: Option<PathBuf>,
    report_path: Option<PathBuf>,
    detect: DetectConfigJson,
    annotate: AnnotateConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scenes: Vec::new(),
            scene_dir: None,
            scene_extension: "png".to_string(),
            template_dir: PathBuf::from("templates"),
            template_extension: "png".to_string(),
            output_dir: Some(PathBuf::from("output")),
            report_path: None,
            detect: DetectConfigJson::default(),
            annotate: AnnotateConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BoxRecord {
    x1: usize,
    y1: usize,
    x2: usize,
    y2: usize,
    score: f32,
    template: String,
    scale: f64,
}

impl BoxRecord {
    fn new(candidate: &Candidate, detector: &Detector) -> Self {
        let template = detector
            .templates()
            .get(candidate.template_idx)
            .map(|tpl| tpl.id().to_string())
            .unwrap_or_default();
        Self {
            x1: candidate.bbox.x1,
            y1: candidate.bbox.y1,
            x2: candidate.bbox.x2,
            y2: candidate.bbox.y2,
            score: candidate.score,
            template,
            scale: candidate.scale,
        }
    }
}

#[derive(Debug, Serialize)]
struct SceneRecord {
    scene: String,
    count: usize,
    boxes: Vec<BoxRecord>,
    error: Option<String>,
}

impl SceneRecord {
    fn new(outcome: &SceneOutcome, detector: &Detector) -> Self {
        Self {
            scene: outcome.id.clone(),
            count: outcome.count(),
            boxes: outcome
                .detections
                .boxes
                .iter()
                .map(|cand| BoxRecord::new(cand, detector))
                .collect(),
            error: outcome.error.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    scenes: Vec<SceneRecord>,
    total: usize,
    elapsed_secs: f64,
}

fn list_files(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn process_scene(
    path: &Path,
    detector: &Detector,
    annotate: &AnnotateConfigJson,
    output_dir: Option<&Path>,
) -> Result<Detections, ScaleMatchError> {
    let (mut color, gray) = load_scene(path)?;
    let mut annotator = RgbAnnotator::new(&mut color)
        .with_color(annotate.color)
        .with_stroke(annotate.stroke);
    let detections = detector.detect_annotated(gray.view(), &mut annotator)?;

    if let Some(dir) = output_dir {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scene.png".to_string());
        let out_path = dir.join(format!("output_{name}"));
        color.save(&out_path).map_err(|err| ScaleMatchError::ImageIo {
            reason: format!("{}: {err}", out_path.display()),
        })?;
    }

    println!("Total objects found in {}: {}", path.display(), detections.count());
    Ok(detections)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("scalematch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    let detect_cfg = config.detect.to_config()?;

    let mut scenes = config.scenes.clone();
    if let Some(dir) = &config.scene_dir {
        scenes.extend(list_files(dir, &config.scene_extension)?);
    }
    if scenes.is_empty() {
        return Err("no source images found".into());
    }

    let templates = match load_templates_from_dir(&config.template_dir, &config.template_extension)
    {
        Ok(templates) => templates,
        Err(err) => {
            tracing::warn!("template directory unreadable: {err}");
            Vec::new()
        }
    };
    if templates.is_empty() {
        eprintln!("No templates found in {}", config.template_dir.display());
    }

    if let Some(dir) = &config.output_dir {
        fs::create_dir_all(dir)?;
    }

    println!("Processing {} images...", scenes.len());
    let start = Instant::now();
    let detector = Detector::new(templates).with_config(detect_cfg);
    let report: BatchReport = run_batch(
        &scenes,
        config.detect.parallel,
        |path| path.display().to_string(),
        |path| {
            process_scene(
                path,
                &detector,
                &config.annotate,
                config.output_dir.as_deref(),
            )
        },
    );
    let elapsed = start.elapsed().as_secs_f64();

    for failed in report.failures() {
        if let Some(err) = &failed.error {
            eprintln!("Error processing {}: {err}", failed.id);
        }
    }
    println!(
        "Total objects found across all images: {}",
        report.total_count()
    );
    println!("Total processing time: {elapsed:.2} seconds");

    let output = Output {
        scenes: report
            .scenes
            .iter()
            .map(|outcome| SceneRecord::new(outcome, &detector))
            .collect(),
        total: report.total_count(),
        elapsed_secs: elapsed,
    };
    let json = serde_json::to_string_pretty(&output)?;
    match config.report_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
