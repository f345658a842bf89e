use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::Result;
use pixelring_core::Point;
use pixelring_pcb::{BoardDocument, KicadBoard};

/// Three daisy-chained LEDs plus one leftover track.
fn board_source() -> String {
    let mut src = String::from(
        "(kicad_pcb (version 20171130)\n  (layers (0 F.Cu signal) (31 B.Cu signal) (44 Edge.Cuts user))\n  (net 0 \"\")\n",
    );
    for i in 0..=3 {
        src.push_str(&format!("  (net {} \"DATA{i}\")\n", i + 1));
        src.push_str(&format!("  (net {} \"CLK{i}\")\n", i + 11));
    }
    for i in 1..=3 {
        src.push_str(&format!(
            "  (module LED (layer F.Cu) (at 0 0)\n    (fp_text reference D{i} (at 0 -3) (layer F.SilkS))\n    \
             (pad 2 smd rect (at -2.45 0) (size 1 1) (layers F.Cu) (net {dout} \"DATA{i}\"))\n    \
             (pad 3 smd rect (at -2.45 1.6) (size 1 1) (layers F.Cu) (net {cko} \"CLK{i}\"))\n    \
             (pad 4 smd rect (at 2.45 1.6) (size 1 1) (layers F.Cu) (net {cki} \"CLK{p}\"))\n    \
             (pad 5 smd rect (at 2.45 0) (size 1 1) (layers F.Cu) (net {din} \"DATA{p}\")))\n",
            dout = i + 1,
            cko = i + 11,
            cki = i + 10,
            din = i,
            p = i - 1,
        ));
    }
    src.push_str("  (segment (start 50 50) (end 60 60) (width 0.25) (layer F.Cu) (net 0))\n)\n");
    src
}

fn write_board(dir: &Path) -> Result<std::path::PathBuf> {
    let path = dir.join("ring.kicad_pcb");
    fs::write(&path, board_source())?;
    Ok(path)
}

fn pixelring(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pixelring"))
        .args(args)
        .output()
        .expect("run pixelring")
}

#[test]
fn layout_saves_board_and_keeps_a_backup() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let board = write_board(dir.path())?;
    let report = dir.path().join("report.json");

    let out = pixelring(&[
        "-p",
        board.to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Placed 3 components (Exhausted)"), "{stdout}");

    let backup = dir.path().join("ring.kicad_pcb.layoutbak");
    assert_eq!(fs::read_to_string(backup)?, board_source());

    let saved = fs::read_to_string(&board)?;
    assert_eq!(saved.matches("(segment").count(), 5);
    assert_eq!(saved.matches("(gr_arc").count(), 6);
    assert_eq!(saved.matches("(gr_line").count(), 6);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(report)?)?;
    assert_eq!(json["placements"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["placements"][0]["reference"], "D1");
    assert_eq!(json["terminal"], "Exhausted");
    assert_eq!(json["tracks_created"], 4);
    Ok(())
}

#[test]
fn dry_run_leaves_the_file_alone() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let board = write_board(dir.path())?;
    let out = pixelring(&["-p", board.to_str().unwrap(), "--dry-run", "-v"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_to_string(&board)?, board_source());
    assert!(!dir.path().join("ring.kicad_pcb.layoutbak").exists());
    Ok(())
}

#[test]
fn skip_traces_places_without_routing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let board = write_board(dir.path())?;
    let out = pixelring(&["-p", board.to_str().unwrap(), "--skip-traces"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let saved = fs::read_to_string(&board)?;
    // only the unrelated leftover track survives
    assert_eq!(saved.matches("(segment").count(), 1);
    let reloaded = KicadBoard::open(&board)?;
    let d1 = reloaded.get_component_by_reference("D1").unwrap();
    let position = reloaded.component(d1)?.position;
    assert!((position.distance_to(Point::new(90.0, 90.0)) - 20.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn delete_all_traces_runs_instead_of_layout() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let board = write_board(dir.path())?;
    let out = pixelring(&["-p", board.to_str().unwrap(), "--delete-all-traces"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Deleted 1 tracks"));
    let saved = fs::read_to_string(&board)?;
    assert!(!saved.contains("(segment"));
    assert!(!saved.contains("gr_arc"));
    let reloaded = KicadBoard::open(&board)?;
    let d1 = reloaded.get_component_by_reference("D1").unwrap();
    assert_eq!(reloaded.component(d1)?.position, Point::new(0.0, 0.0));
    Ok(())
}

#[test]
fn config_file_changes_the_ring() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let board = write_board(dir.path())?;
    let config = dir.path().join("ring.yaml");
    fs::write(
        &config,
        "variables:\n  r: 10\nboard:\n  center: [0, 0]\n  circle_radius: r\n  pixel_count: 4\n  base_angle: 0\nspokes:\n  list: []\noutline:\n  enabled: false\n",
    )?;
    let out = pixelring(&["-p", board.to_str().unwrap(), "-c", config.to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let saved = fs::read_to_string(&board)?;
    // D1 at theta = pi/2 on a 10 mm circle about the origin
    assert!(saved.contains("(at 0 10 90)"), "{saved}");
    assert!(!saved.contains("gr_arc"));
    Ok(())
}
