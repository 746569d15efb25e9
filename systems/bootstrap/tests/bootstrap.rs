use std::{env, fs, path::PathBuf, process};

use fear_the_water_core::{GameConfig, WELCOME_BANNER};
use fear_the_water_system_bootstrap::Bootstrap;
use fear_the_water_world::query;
use glam::Vec2;

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("fear-the-water-{}-{name}", process::id()));
    fs::write(&path, contents).expect("write scratch file");
    path
}

#[test]
fn default_bootstrap_builds_embedded_level() {
    let bootstrap = Bootstrap::default();
    assert_eq!(bootstrap.welcome_banner(), WELCOME_BANNER);

    let level = bootstrap.default_level().expect("embedded level builds");
    assert_eq!(query::size(&level), Vec2::new(640.0, 640.0));
    assert!(query::hole(&level).is_some());
}

#[test]
fn toml_overrides_are_applied_to_levels() {
    let bootstrap = Bootstrap::from_toml(
        r#"
            grid_size = 10.0
            rng_seed = 42
        "#,
    )
    .expect("config parses");

    assert_eq!(bootstrap.config().rng_seed, 42);
    let level = bootstrap
        .level_from_json(r#"{"map":[[0,0,8]]}"#)
        .expect("level builds");
    assert_eq!(query::size(&level), Vec2::new(30.0, 10.0));
    assert_eq!(query::player_initial_position(&level), Vec2::new(25.0, 5.0));
}

#[test]
fn invalid_config_is_reported() {
    let error = Bootstrap::from_toml("scale = -1.0").expect_err("negative scale");
    let message = format!("{error:#}");
    assert!(message.contains("scale must be positive"), "{message}");
}

#[test]
fn malformed_level_reports_context() {
    let bootstrap = Bootstrap::new(GameConfig::default());
    let error = bootstrap
        .level_from_json(r#"{"map":[[1,0],[1]]}"#)
        .expect_err("ragged map");
    let message = format!("{error:#}");
    assert!(message.contains("failed to build level"), "{message}");
    assert!(message.contains("expected 2"), "{message}");
}

#[test]
fn files_are_loaded_from_disk() {
    let config = scratch_file("config.toml", "[bubbles]\ncapacity = 5\n");
    let level = scratch_file("level.json", r##"{"background":"#123","map":[[1,2]]}"##);

    let bootstrap = Bootstrap::from_config_path(&config).expect("config file loads");
    assert_eq!(bootstrap.config().bubbles.capacity, 5);
    let level = bootstrap.level_from_path(&level).expect("level file loads");
    assert_eq!(query::bubble_capacity(&level), 5);
    assert!(query::background(&level).is_some());

    let missing = bootstrap
        .level_from_path(&env::temp_dir().join("fear-the-water-missing.json"))
        .expect_err("missing file");
    assert!(format!("{missing:#}").contains("failed to read level"));
}
