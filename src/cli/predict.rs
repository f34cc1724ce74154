// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;
use std::time::Instant;

#[cfg(feature = "annotate")]
use std::fs;

#[cfg(feature = "annotate")]
use crate::annotate::{annotate_hand, find_next_run_dir};

use crate::cli::args::PredictArgs;
use crate::response::{SignResponse, Speed};
use crate::source::{Input, Source, SourceIterator};
use crate::{Recognizer, VERSION};
use crate::{error, verbose, warn};

/// Recognize signs in every item of a source.
#[allow(clippy::too_many_lines, clippy::cast_precision_loss)]
pub fn run_prediction(args: &PredictArgs) {
    crate::cli::logging::set_verbose(args.verbose && !args.json);

    let config = args.model.to_config();
    let source = Source::from(args.source.as_str());

    if source.needs_landmarker() && config.landmarker_path.is_none() {
        error!("Image sources need a hand-landmark model. Pass '--landmarker <MODEL>'.");
        process::exit(1);
    }

    let mut recognizer = match Recognizer::new(config) {
        Ok(r) => r,
        Err(e) => {
            error!("Error loading recognizer: {e}");
            process::exit(1);
        }
    };

    let status = recognizer.status();
    verbose!("SignSpeak {VERSION} 🚀 Rust ONNX strategy={}", status.strategy);
    verbose!(
        "{} catalog: {} gestures, classifier {}",
        status.catalog,
        status.num_gestures,
        if status.model_loaded {
            format!("{} classes", status.num_classes)
        } else {
            "not loaded".to_string()
        }
    );
    verbose!("");

    #[cfg(feature = "annotate")]
    let save_dir = if args.save && source.needs_landmarker() {
        let dir = find_next_run_dir("runs/signs", "predict");
        if let Err(e) = fs::create_dir_all(&dir) {
            error!("Failed to create save directory {}: {e}", dir.display());
            process::exit(1);
        }
        Some(dir)
    } else {
        None
    };

    #[cfg(feature = "annotate")]
    if args.save && !source.needs_landmarker() {
        warn!("--save has no effect for landmark sources.");
    }

    #[cfg(not(feature = "annotate"))]
    if args.save {
        warn!(
            "--save requires the 'annotate' feature. Compile with --features annotate to enable saving."
        );
    }

    let iter = match SourceIterator::new(source) {
        Ok(iter) => iter,
        Err(e) => {
            error!("Error reading source: {e}");
            process::exit(1);
        }
    };
    if iter.is_empty() {
        warn!("Source '{}' contains no inputs.", args.source);
    }

    let mut totals = Speed::new(0.0, 0.0, 0.0);
    let mut num_items = 0usize;
    let mut num_recognized = 0usize;

    for item in iter {
        let (input, meta) = match item {
            Ok(val) => val,
            Err(e) => {
                error!("Error reading source: {e}");
                continue;
            }
        };

        let (kind, response, speed) = match input {
            Input::Landmarks(points) => {
                let start = Instant::now();
                let response = recognizer.recognize_points(&points);
                let elapsed = start.elapsed().as_secs_f64() * 1000.0;
                ("hand", response, Speed { recognize: Some(elapsed), ..Speed::default() })
            }
            Input::Image(img) => {
                let recognition = recognizer.recognize_image(&img);

                #[cfg(feature = "annotate")]
                if let Some(dir) = &save_dir {
                    let annotated = annotate_hand(&img, recognition.landmarks.as_ref(), &recognition.response);
                    let name = std::path::Path::new(&meta.path)
                        .file_name()
                        .map_or_else(|| format!("image{}.jpg", meta.index), |n| n.to_string_lossy().to_string());
                    if let Err(e) = annotated.save(dir.join(&name)) {
                        error!("Failed to save {name}: {e}");
                    }
                }

                ("image", recognition.response, recognition.speed)
            }
        };

        if args.json {
            match serde_json::to_string(&response) {
                Ok(line) => println!("{line}"),
                Err(e) => {
                    error!("Failed to serialize response: {e}");
                }
            }
        }

        verbose!(
            "{kind} {}/{} {}: {}, {:.1}ms",
            meta.index + 1,
            meta.total,
            meta.path,
            format_response_summary(&response),
            speed.total()
        );

        num_items += 1;
        if response.success {
            num_recognized += 1;
        }
        totals.preprocess = Some(totals.preprocess.unwrap_or(0.0) + speed.preprocess.unwrap_or(0.0));
        totals.detect = Some(totals.detect.unwrap_or(0.0) + speed.detect.unwrap_or(0.0));
        totals.recognize = Some(totals.recognize.unwrap_or(0.0) + speed.recognize.unwrap_or(0.0));
    }

    let n = num_items.max(1) as f64;
    verbose!(
        "Speed: {:.1}ms preprocess, {:.1}ms detect, {:.1}ms recognize per input",
        totals.preprocess.unwrap_or(0.0) / n,
        totals.detect.unwrap_or(0.0) / n,
        totals.recognize.unwrap_or(0.0) / n
    );
    verbose!("Recognized {num_recognized}/{num_items} inputs");

    #[cfg(feature = "annotate")]
    if let Some(ref dir) = save_dir {
        verbose!("Results saved to {}", dir.display());
    }
}

/// One-line summary of a response, e.g. `"ASL_A 0.92"` or `"UNKNOWN (No gesture matched)"`.
fn format_response_summary(response: &SignResponse) -> String {
    if response.success {
        return format!("{} {:.2}", response.sign, response.confidence);
    }

    let reason = response.error.as_deref().unwrap_or("failed");
    if response.sign.is_empty() {
        format!("({reason})")
    } else {
        format!("{} ({reason})", response.sign)
    }
}
