use std::fs;
use std::path::Path;
use utoipa::OpenApi;

use dish_backend::api::rest::ApiDoc;

fn main() {
    println!("Generating OpenAPI specification...");

    // Generate the OpenAPI spec
    let openapi_spec = ApiDoc::openapi();
    let openapi_json = match serde_json::to_string_pretty(&openapi_spec) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: Failed to serialize OpenAPI spec: {}", e);
            std::process::exit(1);
        }
    };

    // Output path defaults to the crate directory, overridable by the first argument
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("{}/openapi.json", env!("CARGO_MANIFEST_DIR")));

    if let Some(parent) = Path::new(&output_path).parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Error: Could not create {}: {}", parent.display(), e);
            std::process::exit(1);
        }
    }

    if let Err(e) = fs::write(&output_path, &openapi_json) {
        eprintln!("Error: Could not write {}: {}", output_path, e);
        std::process::exit(1);
    }

    println!("✅ Generated {}", output_path);
    println!("📄 {} bytes written", openapi_json.len());
}
