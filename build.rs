/// Build script for newtonian
/// Records version and revision so logged runs can be traced to a build

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");

    if let Ok(version) = std::env::var("CARGO_PKG_VERSION") {
        println!("cargo:rustc-env=NEWTONIAN_VERSION={version}");
    }

    // Absent outside a git checkout; the crate falls back to "unknown".
    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            if let Ok(hash) = String::from_utf8(output.stdout) {
                println!("cargo:rustc-env=NEWTONIAN_GIT_HASH={}", hash.trim());
            }
        }
    }
}
