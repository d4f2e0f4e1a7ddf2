use std::process::Command;

/// Reported by `/api/v1/health` as the node's build revision
fn revision() -> String {
    // Release tarballs carry no .git; let the packager stamp it
    if let Ok(hash) = std::env::var("CBDC_BUILD_REVISION") {
        if !hash.trim().is_empty() {
            return hash.trim().to_string();
        }
    }

    let git = |args: &[&str]| Command::new("git").args(args).output().ok();

    match git(&["rev-parse", "--short", "HEAD"]) {
        Some(o) if o.status.success() => {
            let hash = String::from_utf8_lossy(&o.stdout).trim().to_string();
            // Staged and unstaged changes both count as dirty
            let dirty = git(&["diff-index", "--quiet", "HEAD", "--"])
                .map(|o| !o.status.success())
                .unwrap_or(false);
            if dirty { format!("{}-dirty", hash) } else { hash }
        }
        _ => "unknown".to_string(),
    }
}

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", revision());
    println!("cargo:rerun-if-env-changed=CBDC_BUILD_REVISION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-changed=.git/index");
}
