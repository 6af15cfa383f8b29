use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use facefx_core::detection::infrastructure::onnx_yolo_model::OnnxYoloModel;
use facefx_core::effects::domain::effect_kind::StrategySet;
use facefx_core::effects::domain::effect_parameters::EffectParameters;
use facefx_core::io::domain::image_reader::ImageReader;
use facefx_core::io::domain::image_writer::ImageWriter;
use facefx_core::io::infrastructure::image_file_reader::ImageFileReader;
use facefx_core::io::infrastructure::image_file_writer::ImageFileWriter;
use facefx_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facefx_core::pipeline::predict_use_case::PredictUseCase;
use facefx_core::pipeline::stream_worker::{StreamWorker, DEFAULT_QUEUE_CAPACITY};
use facefx_core::shared::color::Bgr;
use facefx_core::shared::config::PipelineConfig;
use facefx_core::shared::constants::IMAGE_EXTENSIONS;
use facefx_core::shared::face_gallery::FaceGallery;
use facefx_core::shared::frame::Frame;

/// Detect faces in images, draw boxes and apply face effects.
#[derive(Parser)]
#[command(name = "facefx")]
struct Cli {
    /// Input image files, or directories of images.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Path to the ONNX face detection model.
    #[arg(long)]
    model: PathBuf,

    /// Directory for annotated output images.
    #[arg(long)]
    output_dir: PathBuf,

    /// Comma-separated effects: blur, change-background, recolor, replace,
    /// highlight-edges, pixelate.
    #[arg(long, default_value = "")]
    effects: String,

    /// Background fill color as #RRGGBB.
    #[arg(long)]
    background: Option<Bgr>,

    /// Background image (takes precedence over --background).
    #[arg(long)]
    background_image: Option<PathBuf>,

    /// Recolor target as #RRGGBB.
    #[arg(long)]
    face_color: Option<Bgr>,

    /// Edge color for highlight-edges as #RRGGBB.
    #[arg(long)]
    edge_color: Option<Bgr>,

    /// Image pasted over each face by the replace effect.
    #[arg(long)]
    replacement: Option<PathBuf>,

    /// Save face crops to this directory.
    #[arg(long)]
    faces_dir: Option<PathBuf>,

    /// JSON pipeline configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the display confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f32>,

    /// Treat inputs as one frame sequence processed on a background worker.
    #[arg(long)]
    stream: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let strategies: StrategySet = cli.effects.parse()?;
    let config = load_config(&cli)?;
    let params = build_parameters(&cli)?;
    let inputs = collect_inputs(&cli.inputs)?;
    if inputs.is_empty() {
        return Err("No input images found".into());
    }

    log::info!("Loading model: {}", cli.model.display());
    let model = OnnxYoloModel::load(&cli.model, &config)?;
    let use_case = PredictUseCase::new(
        Box::new(model),
        &config,
        Box::new(StdoutPipelineLogger::new(10)),
    );

    let reader = ImageFileReader::new();
    let writer = ImageFileWriter::new();
    let output = if cli.stream {
        run_stream(&inputs, &cli.output_dir, use_case, strategies, params, &reader, &writer)?
    } else {
        run_images(&inputs, &cli.output_dir, use_case, &strategies, &params, &reader, &writer)?
    };
    if output.skipped > 0 {
        log::warn!("{} of {} input(s) skipped", output.skipped, inputs.len());
    }

    if let Some(faces_dir) = &cli.faces_dir {
        save_faces(&output.gallery, faces_dir)?;
    }
    log::info!(
        "Output written to {} ({} image(s))",
        cli.output_dir.display(),
        output.written
    );
    Ok(())
}

/// What a run produced. Inputs that cannot be read or fail inference are
/// skipped and counted, never fatal.
struct RunOutput {
    gallery: FaceGallery,
    written: usize,
    skipped: usize,
}

fn run_images(
    inputs: &[PathBuf],
    output_dir: &Path,
    mut use_case: PredictUseCase,
    strategies: &StrategySet,
    params: &EffectParameters,
    reader: &dyn ImageReader,
    writer: &dyn ImageWriter,
) -> Result<RunOutput, Box<dyn std::error::Error>> {
    let mut gallery = FaceGallery::new();
    let mut written = 0;
    let mut skipped = 0;
    let total = inputs.len();

    for (i, input) in inputs.iter().enumerate() {
        let image = match reader.read(input) {
            Ok(frame) => Some(frame.with_index(i)),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        };
        let prediction = match use_case.predict(image.as_ref(), &mut gallery, strategies, params) {
            Ok(Some(prediction)) => prediction,
            Ok(None) => {
                skipped += 1;
                continue;
            }
            Err(e) => {
                log::error!("{}: {e}", input.display());
                skipped += 1;
                continue;
            }
        };
        log::info!(
            "{}: {} face(s)",
            input.display(),
            prediction.boxes.len()
        );
        writer.write(&output_path(output_dir, input), &prediction.image)?;
        written += 1;
        use_case.logger_mut().progress(i + 1, total);
    }

    use_case.logger().summary();
    Ok(RunOutput {
        gallery,
        written,
        skipped,
    })
}

fn run_stream(
    inputs: &[PathBuf],
    output_dir: &Path,
    use_case: PredictUseCase,
    strategies: StrategySet,
    params: EffectParameters,
    reader: &dyn ImageReader,
    writer: &dyn ImageWriter,
) -> Result<RunOutput, Box<dyn std::error::Error>> {
    let mut worker = StreamWorker::spawn(use_case, strategies, params, DEFAULT_QUEUE_CAPACITY);
    let mut written = 0;
    let mut skipped = 0;

    for (i, input) in inputs.iter().enumerate() {
        let frame = match reader.read(input) {
            Ok(frame) => frame.with_index(i),
            Err(e) => {
                log::warn!("Skipping frame {i}: {e}");
                skipped += 1;
                continue;
            }
        };
        worker.submit(frame);
        while let Some(done) = worker.try_recv() {
            write_frame(writer, output_dir, &done)?;
            written += 1;
        }
    }

    let output = worker.finish()?;
    for frame in &output.frames {
        write_frame(writer, output_dir, frame)?;
        written += 1;
    }
    log::info!(
        "Stream: {} submitted, {} dropped, {written} written",
        output.submitted,
        output.dropped
    );
    output.use_case.logger().summary();
    Ok(RunOutput {
        gallery: output.gallery,
        written,
        skipped,
    })
}

fn write_frame(
    writer: &dyn ImageWriter,
    output_dir: &Path,
    frame: &Frame,
) -> Result<(), Box<dyn std::error::Error>> {
    writer.write(
        &output_dir.join(format!("frame_{:05}.png", frame.index())),
        frame,
    )
}

fn save_faces(gallery: &FaceGallery, faces_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let writer = ImageFileWriter::new();
    for (i, face) in gallery.faces().iter().enumerate() {
        writer.write(&faces_dir.join(format!("face_{i:04}.png")), face)?;
    }
    log::info!("Saved {} face crops to {}", gallery.len(), faces_dir.display());
    Ok(())
}

fn load_config(cli: &Cli) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(confidence) = cli.confidence {
        config.confidence_threshold = confidence;
    }
    config.validate()?;
    Ok(config)
}

fn build_parameters(cli: &Cli) -> Result<EffectParameters, Box<dyn std::error::Error>> {
    let mut params = EffectParameters::default();
    if let Some(color) = cli.background {
        params = params.with_background_color(color);
    }
    if let Some(path) = &cli.background_image {
        params = params.with_background_image(ImageFileReader::load(path)?);
    }
    if let Some(color) = cli.face_color {
        params = params.with_face_color(color);
    }
    if let Some(color) = cli.edge_color {
        params = params.with_edge_color(color);
    }
    if let Some(path) = &cli.replacement {
        params = params.with_replacement(ImageFileReader::load(path)?);
    }
    Ok(params)
}

/// Expands directories into their image files, sorted by name.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| is_image(path))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    output_dir.join(format!("{stem}_fx.png"))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    for input in &cli.inputs {
        if !input.exists() {
            return Err(format!("Input file not found: {}", input.display()).into());
        }
        if input.is_file() && !is_image(input) {
            return Err(format!("Unsupported image format: {}", input.display()).into());
        }
    }
    if !cli.model.exists() {
        return Err(format!("Model file not found: {}", cli.model.display()).into());
    }
    if let Some(confidence) = cli.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(format!(
                "Confidence must be between 0.0 and 1.0, got {confidence}"
            )
            .into());
        }
    }
    for path in [&cli.background_image, &cli.replacement].into_iter().flatten() {
        if !path.exists() {
            return Err(format!("Image not found: {}", path.display()).into());
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
