use std::process::Command;

/// Trimmed stdout of a command, if it ran and succeeded
fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() {
    let git_hash =
        capture("git", &["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".into());
    // `date` keeps chrono out of the build script
    let build_time =
        capture("date", &["+%Y%m%d-%H%M%S"]).unwrap_or_else(|| "unknown".into());
    let tag = capture("git", &["describe", "--exact-match", "--tags", "HEAD"]);

    // Tagged builds report the bare package version
    let suffix = match &tag {
        Some(_) => String::new(),
        None => format!("-dev.{}.{}", build_time, git_hash),
    };

    println!("cargo:rustc-env=STUDYWAT_VERSION_SUFFIX={}", suffix);
    println!("cargo:rustc-env=STUDYWAT_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=STUDYWAT_BUILD_TIME={}", build_time);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
