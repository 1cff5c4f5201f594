use std::process::Command;

fn git(args: &[&str]) -> String {
    match Command::new("git").args(args).output() {
        Ok(output) if output.status.success() => String::from_utf8(output.stdout)
            .map(|s| s.trim().to_string())
            .unwrap_or("unknown".into()),
        _ => "unknown".into(),
    }
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=config-base.toml");
    let git_hash_short = git(&["rev-parse", "--short", "HEAD"]);
    println!("cargo:rustc-env=GIT_HASH_SHORT={git_hash_short}");
}
