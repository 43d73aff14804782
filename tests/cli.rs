use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use url::Url;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("vega-datasets").unwrap();
    cmd.env_remove("VEGA_DATASETS_REGISTRY")
        .env_remove("VEGA_DATASETS_BASE_URL")
        .env_remove("VEGA_DATASETS_OVERRIDES")
        .env_remove("RUST_LOG");
    cmd
}

/// A small dataset directory shaped like the published `data/` folder.
fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(
        root.join("cars.json"),
        r#"[{"Name":"amc rebel sst","Horsepower":150,"Origin":"USA"},{"Name":"ford torino","Horsepower":140,"Origin":"USA"}]"#,
    )
    .unwrap();
    fs::write(
        root.join("zipcodes.csv"),
        "zip_code,latitude,longitude,city\n02134,42.35,-71.13,Allston\n",
    )
    .unwrap();
    fs::write(root.join("unemployment.tsv"), "id\trate\n1001\t.097\n").unwrap();
    fs::write(root.join(".DS_Store"), "junk").unwrap();
    fs::create_dir(root.join("annual-precip")).unwrap();
    fs::write(
        root.join("annual-precip").join("stations.csv"),
        "station,elevation\nA1,12\n",
    )
    .unwrap();
    dir
}

fn base_url(dir: &Path) -> String {
    Url::from_directory_path(dir).unwrap().to_string()
}

#[test]
fn runs() {
    let mut cmd = cli();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("vega-datasets 0.1.0"));
}

#[test]
fn outputs_tool_name() {
    let mut cmd = cli();
    cmd.arg("-V");
    cmd.assert().success().stdout("vega-datasets 0.1.0\n");
}

// Infer subcommand tests

#[test]
fn infer_reports_kinds() {
    let mut cmd = cli();
    cmd.args(["infer", "42", "02134", "true", "", "2020-01-01", "abc"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"42\"\tnumber\t42"))
        .stdout(predicate::str::contains("\"02134\"\tnumber\t2134"))
        .stdout(predicate::str::contains("\"true\"\tboolean\ttrue"))
        .stdout(predicate::str::contains("\"\"\tnull\tnull"))
        .stdout(predicate::str::contains(
            "\"2020-01-01\"\tdate\t2020-01-01T00:00:00+00:00",
        ))
        .stdout(predicate::str::contains("\"abc\"\tstring\tabc"));
}

#[test]
fn infer_accepts_negative_numbers() {
    let mut cmd = cli();
    cmd.args(["infer", "--", "-1.5e3"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("number\t-1500"));
}

#[test]
fn infer_json_output_format() {
    let mut cmd = cli();
    cmd.args(["infer", "--output", "json", "1.5", "NaN"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"token\": \"1.5\""))
        .stdout(predicate::str::contains("\"value\": 1.5"))
        .stdout(predicate::str::contains("\"type\": \"number\""))
        .stdout(predicate::str::contains("\"value\": null"));
}

#[test]
fn infer_unsupported_output_fails() {
    let mut cmd = cli();
    cmd.args(["infer", "--output", "xml", "1"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"));
}

// Registry lookups

#[test]
fn list_requires_a_registry() {
    let mut cmd = cli();
    cmd.arg("list");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No registry given"));
}

#[test]
fn list_indexes_data_dir() {
    let dir = data_dir();
    let mut cmd = cli();
    cmd.args(["list", "--data-dir"])
        .arg(dir.path())
        .args(["--base-url", "https://example.org/data"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "cars.json\thttps://example.org/data/cars.json",
        ))
        .stdout(predicate::str::contains(
            "annual-precip/stations.csv\thttps://example.org/data/annual-precip/stations.csv",
        ))
        .stdout(predicate::str::contains(".DS_Store").not());
}

#[test]
fn url_prints_registered_url() {
    let dir = data_dir();
    let mut cmd = cli();
    cmd.args(["url", "zipcodes.csv", "--data-dir"]).arg(dir.path());
    cmd.assert()
        .success()
        .stdout("https://cdn.jsdelivr.net/npm/vega-datasets/data/zipcodes.csv\n");
}

#[test]
fn url_unknown_dataset_fails() {
    let dir = data_dir();
    let mut cmd = cli();
    cmd.args(["url", "nope.csv", "--data-dir"]).arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown dataset 'nope.csv'"));
}

#[test]
fn registry_file_round_trips_through_env() {
    let dir = data_dir();
    let out = tempfile::tempdir().unwrap();
    let registry = out.path().join("registry.json");

    let mut build = cli();
    build
        .arg("registry")
        .arg(dir.path())
        .args(["--base-url", "https://example.org/data/", "--out"])
        .arg(&registry);
    build
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 entries"));

    let mut cmd = cli();
    cmd.env("VEGA_DATASETS_REGISTRY", &registry)
        .args(["url", "unemployment.tsv"]);
    cmd.assert()
        .success()
        .stdout("https://example.org/data/unemployment.tsv\n");
}

#[test]
fn registry_prints_json_to_stdout() {
    let dir = data_dir();
    let mut cmd = cli();
    cmd.arg("registry").arg(dir.path());
    cmd.assert().success().stdout(predicate::str::contains(
        "\"zipcodes.csv\": \"https://cdn.jsdelivr.net/npm/vega-datasets/data/zipcodes.csv\"",
    ));
}

// Fetch subcommand tests

#[test]
fn fetch_csv_applies_builtin_overrides() {
    let dir = data_dir();
    let mut cmd = cli();
    cmd.args(["fetch", "zipcodes.csv", "--compact", "--data-dir"])
        .arg(dir.path())
        .args(["--base-url", &base_url(dir.path())]);
    cmd.assert().success().stdout(
        "[{\"zip_code\":\"02134\",\"latitude\":42.35,\"longitude\":-71.13,\"city\":\"Allston\"}]\n",
    );
}

#[test]
fn fetch_with_override_file() {
    let dir = data_dir();
    let overrides = dir.path().join(".overrides.yaml");
    fs::write(&overrides, "zipcodes.csv: [latitude]\n").unwrap();

    let mut cmd = cli();
    cmd.args(["fetch", "zipcodes.csv", "--compact", "--data-dir"])
        .arg(dir.path())
        .args(["--base-url", &base_url(dir.path())])
        .arg("--overrides")
        .arg(&overrides);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"zip_code\":2134.0"))
        .stdout(predicate::str::contains("\"latitude\":\"42.35\""));
}

#[test]
fn fetch_json_is_pretty_printed() {
    let dir = data_dir();
    let mut cmd = cli();
    cmd.args(["fetch", "cars.json", "--data-dir"])
        .arg(dir.path())
        .args(["--base-url", &base_url(dir.path())]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"Horsepower\": 150"));
}

#[test]
fn fetch_other_extensions_print_raw_text() {
    let dir = data_dir();
    let mut cmd = cli();
    cmd.args(["fetch", "unemployment.tsv", "--data-dir"])
        .arg(dir.path())
        .args(["--base-url", &base_url(dir.path())]);
    cmd.assert().success().stdout("id\trate\n1001\t.097\n");
}

#[test]
fn fetch_missing_file_fails() {
    let dir = data_dir();
    let registry = dir.path().join(".registry.json");
    let missing = Url::from_file_path(dir.path().join("gone.csv")).unwrap();
    fs::write(&registry, format!("{{\"gone.csv\": \"{}\"}}", missing)).unwrap();

    let mut cmd = cli();
    cmd.args(["fetch", "gone.csv", "--registry"]).arg(&registry);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch"));
}

// Catalog subcommand tests

fn package_json(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("package.json");
    fs::write(
        &path,
        r#"{
  "name": "vega-datasets",
  "version": "3.2.0",
  "description": "Common repository for example datasets used by Vega related projects.",
  "license": "BSD-3-Clause",
  "repository": {"type": "git", "url": "git+https://github.com/vega/vega-datasets.git"}
}"#,
    )
    .unwrap();
    path
}

#[test]
fn catalog_writes_json_yaml_and_markdown() {
    let data = data_dir();
    let out = tempfile::tempdir().unwrap();
    let package = package_json(out.path());
    let annotations = out.path().join("annotations.yaml");
    fs::write(
        &annotations,
        "cars.json:\n  description: Classic car specs.\n  fields:\n    Origin:\n      description: Region of manufacture.\n",
    )
    .unwrap();
    let markdown = out.path().join("datapackage.md");

    let mut cmd = cli();
    cmd.arg("catalog")
        .arg(data.path())
        .arg("--package")
        .arg(&package)
        .arg("--annotations")
        .arg(&annotations)
        .arg("--out-dir")
        .arg(out.path())
        .arg("--markdown")
        .arg(&markdown);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Catalog has 4 resource(s)"));

    let json = fs::read_to_string(out.path().join("datapackage.json")).unwrap();
    let catalog: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(catalog["name"], "vega-datasets");
    assert_eq!(catalog["homepage"], "https://github.com/vega/vega-datasets");

    let resources = catalog["resources"].as_array().unwrap();
    let cars = resources
        .iter()
        .find(|r| r["path"] == "cars.json")
        .unwrap();
    assert_eq!(cars["type"], "table");
    assert_eq!(cars["description"], "Classic car specs.");

    let tsv = resources
        .iter()
        .find(|r| r["path"] == "unemployment.tsv")
        .unwrap();
    assert_eq!(tsv["dialect"]["delimiter"], "\t");

    assert!(out.path().join("datapackage.yaml").exists());
    let md = fs::read_to_string(&markdown).unwrap();
    assert!(md.contains("## `cars.json`"));
    assert!(md.contains("Region of manufacture."));
}

#[test]
fn catalog_json_only_with_custom_stem() {
    let data = data_dir();
    let out = tempfile::tempdir().unwrap();
    let package = package_json(out.path());

    let mut cmd = cli();
    cmd.arg("catalog")
        .arg(data.path())
        .arg("--package")
        .arg(&package)
        .arg("--out-dir")
        .arg(out.path())
        .args(["--stem", "catalog", "--output", "json"]);
    cmd.assert().success();

    assert!(out.path().join("catalog.json").exists());
    assert!(!out.path().join("catalog.yaml").exists());
}

#[test]
fn catalog_unsupported_output_fails() {
    let data = data_dir();
    let out = tempfile::tempdir().unwrap();
    let package = package_json(out.path());

    let mut cmd = cli();
    cmd.arg("catalog")
        .arg(data.path())
        .arg("--package")
        .arg(&package)
        .arg("--out-dir")
        .arg(out.path())
        .args(["--output", "toml"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"));
}

#[test]
fn catalog_missing_package_fails() {
    let data = data_dir();
    let mut cmd = cli();
    cmd.arg("catalog")
        .arg(data.path())
        .args(["--package", "does-not-exist/package.json"]);
    cmd.assert().failure();
}
