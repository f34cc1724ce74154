// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_LANDMARKER_SIZE, DEFAULT_NAMESPACE, DEFAULT_PRESENCE_THRESHOLD, RecognizerConfig};
use crate::strategy::Strategy;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Predict Options:
    --source, -s <SOURCE>          Input source (image, directory, glob, or landmark .json file)
    --landmarker, -m <MODEL>       Hand-landmark ONNX model (required for image sources)
    --classifier <MODEL>           Statistical classifier ONNX model
    --labels <LABELS>              Classifier labels JSON file
    --catalog <CATALOG>            Gesture catalog JSON file [default: built-in ASL]
    --strategy <STRATEGY>          Recognition strategy (rules, classifier)
    --namespace <NAMESPACE>        Sign namespace prefix [default: ASL]
    --save                         Save annotated images to runs/signs/predict
    --json                         Print one JSON response per input
    --verbose                      Show verbose output

Examples:
    signspeak predict --source hand.json
    signspeak predict --landmarker hand_landmark.onnx --source photo.jpg --save
    signspeak predict -m hand_landmark.onnx -s images/ --classifier signs.onnx --labels labels.json
    signspeak predict --source hands.json --catalog demos/thumbs.json --namespace ""
    signspeak catalog --catalog demos/thumbs.json
    signspeak status --classifier signs.onnx"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recognize signs in images or landmark files
    Predict(PredictArgs),
    /// List the gestures of a catalog
    Catalog(CatalogArgs),
    /// Load the configured models and print a health report
    Status(ModelArgs),
}

/// Model and recognition options shared by commands.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Hand-landmark ONNX model
    #[arg(short = 'm', long)]
    pub landmarker: Option<String>,

    /// Statistical classifier ONNX model
    #[arg(long)]
    pub classifier: Option<String>,

    /// Classifier labels JSON file
    #[arg(long)]
    pub labels: Option<String>,

    /// Gesture catalog JSON file
    #[arg(long)]
    pub catalog: Option<String>,

    /// Recognition strategy (rules, classifier)
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Sign namespace prefix
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Landmark model input size
    #[arg(long, default_value_t = DEFAULT_LANDMARKER_SIZE)]
    pub imgsz: u32,

    /// Landmark model takes NCHW input instead of NHWC
    #[arg(long, default_value_t = false)]
    pub nchw: bool,

    /// Hand-presence threshold
    #[arg(long, default_value_t = DEFAULT_PRESENCE_THRESHOLD)]
    pub presence: f32,

    /// ONNX Runtime intra-op threads (0 = default)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

impl ModelArgs {
    /// Recognizer configuration for these options.
    #[must_use]
    pub fn to_config(&self) -> RecognizerConfig {
        let mut config = RecognizerConfig::new()
            .with_namespace(self.namespace.clone())
            .with_landmarker_input(self.imgsz, !self.nchw)
            .with_presence_threshold(self.presence)
            .with_threads(self.threads);

        if let Some(strategy) = self.strategy {
            config = config.with_strategy(strategy);
        }
        if let Some(path) = &self.landmarker {
            config = config.with_landmarker(path);
        }
        if let Some(path) = &self.classifier {
            config = config.with_classifier(path);
        }
        if let Some(path) = &self.labels {
            config = config.with_labels(path);
        }
        if let Some(path) = &self.catalog {
            config = config.with_catalog(path);
        }
        config
    }
}

/// Arguments for the predict command.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Input source (image, directory, glob, or landmark .json file)
    #[arg(short, long)]
    pub source: String,

    #[command(flatten)]
    /// Model options.
    pub model: ModelArgs,

    /// Save annotated images to runs/signs/predict
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Print one JSON response per input
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the catalog command.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Gesture catalog JSON file [default: built-in ASL]
    #[arg(long)]
    pub catalog: Option<String>,

    /// Print the catalog as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
