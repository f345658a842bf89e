use std::process::Command;

const BOARD: &str = r#"(kicad_pcb (version 20171130)
  (layers (0 F.Cu signal) (31 B.Cu signal) (44 Edge.Cuts user))
  (net 0 "")
  (module LED (layer F.Cu) (at 0 0)
    (fp_text reference D1 (at 0 0) (layer F.SilkS))
    (pad 5 smd rect (at 1 0) (size 1 1) (layers F.Cu))))
"#;

fn pixelring() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pixelring"))
}

#[test]
fn missing_path_is_usage_error() {
    let status = pixelring().status().expect("run pixelring");
    assert_eq!(status.code(), Some(1));
}

#[test]
fn unknown_flag_is_usage_error() {
    let status = pixelring()
        .args(["--path", "x.kicad_pcb", "--frobnicate"])
        .status()
        .expect("run pixelring");
    assert_eq!(status.code(), Some(1));
}

#[test]
fn help_exits_zero() {
    let status = pixelring().arg("--help").status().expect("run pixelring");
    assert_eq!(status.code(), Some(0));
}

#[test]
fn missing_board_is_input_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let status = pixelring()
        .args(["-p", dir.path().join("nope.kicad_pcb").to_str().unwrap()])
        .status()
        .expect("run pixelring");
    assert_eq!(status.code(), Some(2));
}

#[test]
fn garbage_board_is_input_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.kicad_pcb");
    std::fs::write(&path, "(kicad_pcb (version 1)").expect("write board");
    let status = pixelring()
        .args(["-p", path.to_str().unwrap()])
        .status()
        .expect("run pixelring");
    assert_eq!(status.code(), Some(2));
}

#[test]
fn invalid_config_is_input_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let board = dir.path().join("ring.kicad_pcb");
    let config = dir.path().join("ring.yaml");
    std::fs::write(&board, BOARD).expect("write board");
    std::fs::write(&config, "spokes:\n  arrow_pixels: 5\n").expect("write config");
    let status = pixelring()
        .args(["-p", board.to_str().unwrap(), "-c", config.to_str().unwrap()])
        .status()
        .expect("run pixelring");
    assert_eq!(status.code(), Some(2));
}

#[test]
fn missing_pad_is_input_error() {
    // D1 and D2 exist but neither has pad 4, which pad 3 routes to
    let board_src = BOARD.replace(
        "(pad 5 smd rect (at 1 0) (size 1 1) (layers F.Cu))))",
        "(pad 3 smd rect (at -1 0) (size 1 1) (layers F.Cu))\n    (pad 5 smd rect (at 1 0) (size 1 1) (layers F.Cu)))\n  (module LED (layer F.Cu) (at 0 0)\n    (fp_text reference D2 (at 0 0) (layer F.SilkS))\n    (pad 3 smd rect (at -1 0) (size 1 1) (layers F.Cu))))",
    );
    let dir = tempfile::tempdir().expect("tempdir");
    let board = dir.path().join("ring.kicad_pcb");
    std::fs::write(&board, &board_src).expect("write board");
    let status = pixelring()
        .args(["-p", board.to_str().unwrap()])
        .status()
        .expect("run pixelring");
    assert_eq!(status.code(), Some(2));
    // nothing was saved
    assert_eq!(std::fs::read_to_string(&board).unwrap(), board_src);
}

#[test]
fn overlapping_spoke_wedges_are_processing_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let board = dir.path().join("ring.kicad_pcb");
    std::fs::write(&board, BOARD).expect("write board");
    let config = dir.path().join("ring.yaml");
    std::fs::write(&config, "spokes:\n  list:\n    - { angle: 1.0 }\n    - { angle: 1.2 }\n")
        .expect("write config");
    let status = pixelring()
        .args(["-p", board.to_str().unwrap(), "-c", config.to_str().unwrap()])
        .status()
        .expect("run pixelring");
    assert_eq!(status.code(), Some(3));
    assert_eq!(std::fs::read_to_string(&board).unwrap(), BOARD);
}

#[test]
fn bulk_flags_with_config_is_usage_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let board = dir.path().join("ring.kicad_pcb");
    std::fs::write(&board, BOARD).expect("write board");
    let status = pixelring()
        .args([
            "-p",
            board.to_str().unwrap(),
            "--delete-all-traces",
            "-c",
            "ring.yaml",
        ])
        .status()
        .expect("run pixelring");
    assert_eq!(status.code(), Some(1));
}
