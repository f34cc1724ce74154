// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use crate::catalog::{GestureCatalog, GestureSpec};
use crate::cli::args::{CatalogArgs, ModelArgs};
use crate::{Recognizer, error, section};

/// Print the gestures of a catalog.
pub fn run_catalog(args: &CatalogArgs) {
    let catalog = match &args.catalog {
        Some(path) => match GestureCatalog::from_path(path) {
            Ok(c) => c,
            Err(e) => {
                error!("Error loading catalog {path}: {e}");
                process::exit(1);
            }
        },
        None => GestureCatalog::builtin_asl(),
    };

    if args.json {
        match serde_json::to_string_pretty(&catalog) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                error!("Failed to serialize catalog: {e}");
                process::exit(1);
            }
        }
        return;
    }

    section!("Catalog '{}': {} gestures", catalog.name(), catalog.len());
    println!("{:<12} {:<20} {:>5}  checks", "id", "name", "min");
    for spec in &catalog {
        println!("{}", format_spec_row(spec));
    }
}

/// Load the configured models and print the health report as JSON.
pub fn run_status(args: &ModelArgs) {
    crate::cli::logging::set_verbose(false);
    let recognizer = match Recognizer::new(args.to_config()) {
        Ok(r) => r,
        Err(e) => {
            error!("Error loading recognizer: {e}");
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&recognizer.status()) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            error!("Failed to serialize status: {e}");
            process::exit(1);
        }
    }
}

fn format_spec_row(spec: &GestureSpec) -> String {
    let checks: Vec<String> = spec
        .checks
        .iter()
        .map(|c| format!("{}:{}x{}", c.kind, c.finger, c.weight))
        .collect();
    format!(
        "{:<12} {:<20} {:>5.2}  {}",
        spec.id,
        spec.display_name,
        spec.min_score,
        checks.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_spec_row() {
        let catalog = GestureCatalog::builtin_asl();
        let row = format_spec_row(catalog.get("C").unwrap());
        assert!(row.starts_with("C "));
        assert!(row.contains("ASL Letter C"));
        assert!(row.contains("0.65"));
        assert!(row.contains("c_shape:thumbx2"));
    }
}
