use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_cli(args: &[&std::ffi::OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sheetasset"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run sheetasset")
}

fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn cli_writes_xml_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "assets.csv",
        "filename,1 Title\nphoto.jpg,Sunset\n",
    );

    let output = run_cli(&[input.as_os_str()]);
    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let xml = fs::read_to_string(dir.path().join("assets.csv.xml")).unwrap();
    assert!(xml.contains("<field ref=\"1\" title=\"Title\">Sunset</field>"));
}

#[test]
fn cli_converts_several_inputs_into_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let first = write_csv(dir.path(), "a.csv", "filename\na.jpg\n");
    let second = write_csv(dir.path(), "b.csv", "filename\nb.jpg\n");

    let output = run_cli(&[
        first.as_os_str(),
        second.as_os_str(),
        "--output-dir".as_ref(),
        out_dir.as_os_str(),
        "--format".as_ref(),
        "json".as_ref(),
    ]);
    assert!(output.status.success());

    let json = fs::read_to_string(out_dir.join("b.csv.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["assets"][0]["filename"], "b.jpg");
    assert!(out_dir.join("a.csv.json").exists());
}

#[test]
fn cli_missing_input_exits_with_usage_status() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.xlsx");

    let output = run_cli(&[missing.as_os_str()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("File was not uploaded"));
}

#[test]
fn cli_broken_input_exits_with_failure_status() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.xlsx");
    fs::write(&broken, b"PK\x03\x04broken").unwrap();

    let output = run_cli(&[broken.as_os_str()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Could not process uploaded file"));
    assert!(!dir.path().join("broken.xlsx.xml").exists());
}

#[test]
fn cli_rejects_invalid_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "a.csv", "filename\na.jpg\n");

    let output = run_cli(&[input.as_os_str(), "--indent".as_ref(), "99".as_ref()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("a.csv.xml").exists());
}

#[test]
fn cli_rejects_inputs_sharing_an_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    fs::create_dir(dir.path().join("first")).unwrap();
    fs::create_dir(dir.path().join("second")).unwrap();
    let first = write_csv(&dir.path().join("first"), "assets.csv", "filename\na.jpg\n");
    let second = write_csv(&dir.path().join("second"), "assets.csv", "filename\nb.jpg\n");

    let output = run_cli(&[
        first.as_os_str(),
        second.as_os_str(),
        "--output-dir".as_ref(),
        out_dir.as_os_str(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("would both be written to"));
    assert!(!out_dir.join("assets.csv.xml").exists());
}

#[test]
fn cli_same_file_names_without_output_dir_are_kept_apart() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("first")).unwrap();
    fs::create_dir(dir.path().join("second")).unwrap();
    let first = write_csv(&dir.path().join("first"), "assets.csv", "filename\na.jpg\n");
    let second = write_csv(&dir.path().join("second"), "assets.csv", "filename\nb.jpg\n");

    let output = run_cli(&[first.as_os_str(), second.as_os_str()]);
    assert!(output.status.success());

    let xml = fs::read_to_string(dir.path().join("second").join("assets.csv.xml")).unwrap();
    assert!(xml.contains("<filename>b.jpg</filename>"));
}

#[test]
fn cli_reads_tsv_with_tabs_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "assets.tsv", "filename\t1 Title\nphoto.jpg\tSunset\n");

    let output = run_cli(&[input.as_os_str()]);
    assert!(output.status.success());

    let xml = fs::read_to_string(dir.path().join("assets.tsv.xml")).unwrap();
    assert!(xml.contains("<field ref=\"1\" title=\"Title\">Sunset</field>"));
}
