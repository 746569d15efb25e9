use std::{env, fs, process::Command};

fn fear_the_water() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fear-the-water"))
}

#[test]
fn headless_run_prints_a_summary() {
    let output = fear_the_water()
        .args(["--headless", "120", "--seed", "3"])
        .output()
        .expect("failed to run fear-the-water");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("FEAR THE WATER"), "{stdout}");
    assert!(stdout.contains("frames: 120"), "{stdout}");
    assert!(stdout.contains("entities destroyed:"), "{stdout}");
}

#[test]
fn headless_runs_are_reproducible_for_a_seed() {
    let run = || {
        fear_the_water()
            .args(["--headless", "300", "--seed", "11"])
            .output()
            .expect("failed to run fear-the-water")
            .stdout
    };

    assert_eq!(run(), run());
}

#[test]
fn level_files_are_accepted() {
    let path = env::temp_dir().join(format!("fear-the-water-cli-{}.json", std::process::id()));
    fs::write(&path, r#"{"map":[[1,1],[1,1]]}"#).expect("write level");

    let output = fear_the_water()
        .arg("--level")
        .arg(&path)
        .args(["--headless", "1"])
        .output()
        .expect("failed to run fear-the-water");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("frames: 1"), "{stdout}");
}

#[test]
fn invalid_scale_is_rejected() {
    let output = fear_the_water()
        .args(["--scale", "0", "--headless", "1"])
        .output()
        .expect("failed to run fear-the-water");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("scale must be positive"), "{stderr}");
}
