//! Build script for the web crate.
//!
//! Fingerprints the stylesheet so templates can reference it with a
//! content-based query string and browsers never keep a stale copy.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    fingerprint_css();
}

/// Hash `static/css/roster.css` and expose the first 8 hex chars as `CSS_HASH`.
fn fingerprint_css() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=CSS_HASH=dev");
        return;
    };
    let css_path = Path::new(&manifest_dir).join("static/css/roster.css");
    println!("cargo:rerun-if-changed={}", css_path.display());

    let hash = match fs::read(&css_path) {
        Ok(content) => {
            let digest = format!("{:x}", Sha256::digest(&content));
            digest.chars().take(8).collect::<String>()
        }
        Err(e) => {
            println!("cargo:warning=Could not read roster.css: {e}");
            "dev".to_owned()
        }
    };

    println!("cargo:rustc-env=CSS_HASH={hash}");
}
