use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Create config template if it doesn't exist
    let out_dir = env::var("OUT_DIR").unwrap_or_else(|_| "./".to_string());
    let template_path = Path::new(&out_dir).join("../../../config.template.toml");

    let template = r#"# hlsmux configuration template
# Copy this file to 'config.toml' and adjust the values

# Path component in front of the stream name
url_prefix = "hls"

# Transport packets between PAT/PMT re-injections
table_interval = 42

# User-Agent substring of clients needing audio aligned to video timestamps
strict_timing_agent = "Apple"
"#;

    let _ = fs::write(template_path, template);
    println!("cargo:rerun-if-changed=build.rs");
}
