use anyhow::Result;

use crate::{CliTest, stderr, stdout};

fn project_with_sources() -> Result<CliTest> {
    let test = CliTest::with_file(
        "src/a.js",
        "translator.message('Привет');\nvar x = tr.msg('Мир', 'ctx');\n",
    )?;
    test.write_file("src/b.lua", "print(translator.message('Привет'))\n")?;
    Ok(test)
}

#[test]
fn test_collect_writes_template() -> Result<()> {
    let test = project_with_sources()?;

    let output = test.collect_command().arg("--no-merge").output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Collected 2 messages (3 occurrences) from 2 files"));

    let template = test.read_file("i18n/messages.pot")?;
    assert!(template.contains("\"Project-Id-Version: harvest i18n\\n\""));
    assert!(template.contains("#: src/a.js:2\nmsgctxt \"ctx\"\nmsgid \"Мир\"\nmsgstr \"\""));
    assert!(template.contains("#: src/a.js:1\n#: src/b.lua:1\nmsgid \"Привет\"\nmsgstr \"\""));
    assert!(!test.root().join("i18n/en.po").exists());

    Ok(())
}

#[test]
fn test_collect_is_deterministic() -> Result<()> {
    let test = project_with_sources()?;

    test.collect_command().arg("--no-merge").output()?;
    let first = test.read_file("i18n/messages.pot")?;
    test.collect_command().arg("--no-merge").output()?;
    let second = test.read_file("i18n/messages.pot")?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_collect_catalog_dir_override() -> Result<()> {
    let test = project_with_sources()?;

    let output = test
        .collect_command()
        .args(["--no-merge", "--catalog-dir", "locale"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(test.root().join("locale/messages.pot").exists());
    assert!(!test.root().join("i18n").exists());

    Ok(())
}

#[test]
fn test_collect_reports_merge_tool_failure() -> Result<()> {
    let test = project_with_sources()?;
    test.write_file(
        ".harvestrc.json",
        r#"{ "locales": ["ru"], "mergeProgram": "harvest-missing-msgmerge" }"#,
    )?;

    let output = test.collect_command().output()?;
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.contains("Created catalog for ru"));
    assert!(out.contains("merge-tool-failure"));
    assert!(out.contains("i18n/ru.po"));

    // The new catalog exists even though the merge failed.
    let catalog = test.read_file("i18n/ru.po")?;
    assert!(catalog.contains("\"Language: ru\\n\""));

    Ok(())
}

#[test]
fn test_collect_folds_parse_errors_into_warning() -> Result<()> {
    let test = project_with_sources()?;
    test.write_file("src/broken.js", "foo(;")?;

    let output = test.collect_command().arg("--no-merge").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Collected 2 messages (3 occurrences) from 2 files"));
    assert!(stderr(&output).contains("1 file(s) could not be parsed"));
    assert!(!stdout(&output).contains("src/broken.js"));

    let verbose = test.collect_command().args(["--no-merge", "-v"]).output()?;
    assert!(stdout(&verbose).contains("src/broken.js"));
    assert!(!stderr(&verbose).contains("could not be parsed and were left unchanged"));

    Ok(())
}
