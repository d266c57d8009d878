use anyhow::Result;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

const HEADER: &str = "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n";

/// Russian-keyed catalog translated to English.
const RU_EN: &str = "\
msgid \"\"
msgstr \"\"
\"Content-Type: text/plain; charset=UTF-8\\n\"

# CONTEXT: greeting
msgctxt \"приветствие\"
msgid \"Привет\"
msgstr \"Hello\"

msgid \"Мир\"
msgstr \"World\"
";

/// Russian-keyed catalog to be translated to Chinese.
const RU_ZH: &str = "\
msgid \"\"
msgstr \"\"
\"Content-Type: text/plain; charset=UTF-8\\n\"

msgctxt \"приветствие\"
msgid \"Привет\"
msgstr \"\"

msgid \"Мир\"
msgstr \"\"

msgid \"Пока\"
msgstr \"\"
";

#[test]
fn test_annotate_adds_context_label_once() -> Result<()> {
    let test = CliTest::with_file("i18n/ru.po", RU_ZH)?;

    let output = test.command().args(["annotate", "i18n/ru.po"]).output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("i18n/ru.po: 1 item annotated"));

    let annotated = test.read_file("i18n/ru.po")?;
    assert!(annotated.starts_with(HEADER));
    assert!(annotated.contains("# CONTEXT:\nmsgctxt \"приветствие\"\nmsgid \"Привет\""));

    let again = test.command().args(["annotate", "i18n/ru.po"]).output()?;
    assert!(stdout(&again).contains("i18n/ru.po: 0 items annotated"));
    assert_eq!(test.read_file("i18n/ru.po")?, annotated);

    Ok(())
}

#[test]
fn test_transfer_then_restore() -> Result<()> {
    let test = CliTest::with_file("ru-en.po", RU_EN)?;
    test.write_file("ru-zh.po", RU_ZH)?;

    let output = test
        .command()
        .args(["transfer", "ru-en.po", "ru-zh.po", "-o", "en-zh.po"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Transferred 2 items into en-zh.po"));
    assert_eq!(test.read_file("ru-zh.po")?, RU_ZH);

    let transferred = test.read_file("en-zh.po")?;
    assert!(transferred.contains(
        "#. [msgctxt] приветствие\n#. [msgid] Привет\nmsgctxt \"greeting\"\nmsgid \"Hello\"\nmsgstr \"\""
    ));
    assert!(transferred.contains("#. [msgid] Мир\nmsgid \"World\"\nmsgstr \"\""));
    assert!(transferred.contains("msgid \"Пока\"\nmsgstr \"\""));

    // A translator fills in the re-keyed catalog.
    let translated = transferred
        .replace("msgid \"Hello\"\nmsgstr \"\"", "msgid \"Hello\"\nmsgstr \"你好\"");
    test.write_file("en-zh.po", &translated)?;

    let output = test
        .command()
        .args(["restore", "en-zh.po", "ru-zh.po"])
        .output()?;
    let out = stdout(&output);
    assert!(out.contains("Restored 1 item into ru-zh.po"), "stdout: {}", out);

    let restored = test.read_file("ru-zh.po")?;
    assert!(restored.contains("msgctxt \"приветствие\"\nmsgid \"Привет\"\nmsgstr \"你好\""));
    assert!(restored.contains("msgid \"Мир\"\nmsgstr \"\""));

    Ok(())
}

#[test]
fn test_transfer_reports_unmatched_items() -> Result<()> {
    let test = CliTest::with_file(
        "source.po",
        &format!("{}\nmsgid \"Нет такого\"\nmsgstr \"Missing\"\n", HEADER),
    )?;
    test.write_file("dest.po", RU_ZH)?;

    let output = test
        .command()
        .args(["transfer", "source.po", "dest.po"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.contains("Transferred 0 items into dest.po"));
    assert!(out.contains("1 item without a match"));
    assert!(out.contains("unmatched-transfer-item"));
    assert!(out.contains("Нет такого"));

    Ok(())
}

#[test]
fn test_stats_text_and_json() -> Result<()> {
    let test = CliTest::with_file("ru.po", RU_EN)?;

    let output = test.command().args(["stats", "ru.po"]).output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("messages: 2 (2 translated, 0 fuzzy)"));
    assert!(out.contains("contexts: 1"));

    let output = test.command().args(["stats", "--json", "ru.po"]).output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: Value = serde_json::from_str(&stdout(&output))?;
    let stats = &json["ru.po"];
    assert_eq!(stats["messages"]["all"], 2);
    assert_eq!(stats["messages"]["translated"], 2);
    assert_eq!(stats["messages"]["words"], 2);
    assert_eq!(stats["context"]["all"], 1);
    assert_eq!(stats["context"]["chars"], 11);

    Ok(())
}

#[test]
fn test_missing_catalog_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().args(["stats", "missing.po"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("missing.po"));

    Ok(())
}
