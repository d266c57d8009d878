use anyhow::Result;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

const JS_IMPORT: &str = "var translator = require('translator').translator;\n\n";

#[test]
fn test_wrap_yes_rewrites_file() -> Result<()> {
    let test = CliTest::with_file("src/app.js", "foo('Привет мир');\n")?;

    let output = test.wrap_command().arg("--yes").output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("src/app.js: 1 text"));

    assert_eq!(
        test.read_file("src/app.js")?,
        format!("{}foo(translator.message('Привет мир'));\n", JS_IMPORT)
    );

    Ok(())
}

#[test]
fn test_wrap_dry_run_leaves_files_unchanged() -> Result<()> {
    let test = CliTest::with_file("src/app.js", "foo('Привет мир');\n")?;

    let output = test.wrap_command().args(["--yes", "--dry-run"]).output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Would wrap 1 text"));
    assert_eq!(test.read_file("src/app.js")?, "foo('Привет мир');\n");

    Ok(())
}

#[test]
fn test_wrap_skips_wrapped_and_latin_texts() -> Result<()> {
    let code = "foo(translator.message('Привет'));\nbar('hello');\n";
    let test = CliTest::with_file("src/app.js", code)?;

    let output = test.wrap_command().arg("--yes").output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Wrapped 0 texts"));
    assert_eq!(test.read_file("src/app.js")?, code);

    Ok(())
}

#[test]
fn test_wrap_control_messages_report() -> Result<()> {
    let test = CliTest::with_file("src/a.js", "foo('Привет мир');\n")?;
    test.write_file("src/b.js", "foo('Привет');\n")?;
    test.write_file("controls.txt", "Привет\n\n")?;

    let output = test
        .wrap_command()
        .args([
            "--yes",
            "--control-messages",
            "controls.txt",
            "--report",
            "report.json",
        ])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert_eq!(
        test.read_file("src/b.js")?,
        format!("{}foo(translator.message('Привет'));\n", JS_IMPORT)
    );

    let report: Value = serde_json::from_str(&test.read_file("report.json")?)?;
    assert_eq!(report[0]["message"], "Привет");
    assert_eq!(report[0]["counts"]["candidate"], 2);
    assert_eq!(report[0]["counts"]["wrapped"], 2);

    Ok(())
}

#[test]
fn test_wrap_report_requires_control_messages() -> Result<()> {
    let test = CliTest::with_file("src/a.js", "foo('Привет');\n")?;

    let output = test
        .wrap_command()
        .args(["--yes", "--report", "report.json"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(!test.root().join("report.json").exists());

    Ok(())
}

#[test]
fn test_wrap_leaves_unparsable_file_unchanged() -> Result<()> {
    let test = CliTest::with_file("src/a.js", "foo('Привет');\n")?;
    test.write_file("src/b.js", "foo('Мир';\n")?;

    let output = test.wrap_command().arg("--yes").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("1 file(s) could not be parsed"));
    assert_eq!(test.read_file("src/b.js")?, "foo('Мир';\n");
    assert!(test.read_file("src/a.js")?.contains("translator.message('Привет')"));

    Ok(())
}
