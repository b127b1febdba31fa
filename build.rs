use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let version = describe_version().unwrap_or_else(|| {
        format!("{}+unknown.{}", env!("CARGO_PKG_VERSION"), build_time())
    });
    println!("cargo:rustc-env=WINGET_BACKUP_VERSION={}", version);
}

/// Version from the nearest git tag, `None` outside a checkout.
fn describe_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    let described = described.strip_prefix('v').unwrap_or(described);

    match described {
        "" => None,
        // Local edits get a build time so two dirty builds never share a version
        dirty if dirty.ends_with("-dirty") => Some(format!("{}.{}", dirty, build_time())),
        clean => Some(clean.to_string()),
    }
}

fn build_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
