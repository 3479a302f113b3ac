use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

fn grid_arcade(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grid-arcade"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch grid-arcade binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("grid-arcade-{}-{name}.toml", std::process::id()));
    fs::write(&path, contents).expect("failed to write temporary config");
    path
}

#[test]
fn auto_solved_puzzle_reports_rounds_and_score() {
    let output = grid_arcade(&["puzzle", "--seed", "12", "--rounds", "2"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.starts_with("Welcome to Grid Arcade.\n"));
    assert!(text.contains("== round 1 =="));
    assert!(text.contains("completed 2 rounds, score 300"));
}

#[test]
fn scripted_puzzle_reports_wall_hit() {
    let output = grid_arcade(&["puzzle", "--seed", "1", "--program", "L"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("round failed (hit a wall) after 0 completed rounds, score 0"));
}

#[test]
fn malformed_program_is_rejected() {
    let output = grid_arcade(&["puzzle", "--program", "RRX"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid --program"));
}

#[test]
fn unknown_difficulty_is_rejected() {
    let output = grid_arcade(&["puzzle", "--difficulty", "extreme"]);
    assert!(!output.status.success());
}

#[test]
fn snake_crashes_into_the_left_wall() {
    let output = grid_arcade(&["snake", "--seed", "4", "--moves", "LLLLLLLLLLLLLLLL"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("game over after 11 ticks"));
}

#[test]
fn config_file_resizes_the_snake_board() {
    let path = temp_config("board", "[snake]\nwidth = 5\nheight = 4\n");
    let output = grid_arcade(&[
        "--config",
        path.to_str().expect("utf-8 temp path"),
        "snake",
        "--seed",
        "2",
        "--moves",
        ".",
    ]);
    let _ = fs::remove_file(&path);
    assert!(output.status.success());

    let text = stdout(&output);
    let rows: Vec<&str> = text
        .lines()
        .skip_while(|line| *line != "== final ==")
        .skip(1)
        .take(4)
        .collect();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row.chars().count() == 5));
}

#[test]
fn inconsistent_reward_table_is_rejected() {
    let path = temp_config("rewards", "[snake.rewards]\nregular = 30\ngolden = 5\n");
    let output = grid_arcade(&[
        "snake",
        "--config",
        path.to_str().expect("utf-8 temp path"),
    ]);
    let _ = fs::remove_file(&path);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid snake.rewards table"));
}
