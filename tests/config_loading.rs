// tests/config_loading.rs
use std::{env, fs};

use truthlens::config::{EngineConfig, DEFAULT_TIMEOUT_SECS};

const VARS: &[&str] = &[
    "TRUTHLENS_CONFIG_PATH",
    "TRUTHLENS_TIMEOUT_SECS",
    "FACTCHECK_API_KEY",
    "FACTCHECK_ENDPOINT",
    "GENAI_API_KEY",
    "GENAI_MODEL",
    "GENAI_ENDPOINT",
    "TRANSLATE_ENDPOINT",
    "TRANSLATE_KEY",
];

fn clear_env() {
    for v in VARS {
        env::remove_var(v);
    }
}

#[test]
fn toml_file_with_env_sentinels() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("truthlens.toml");
    fs::write(
        &p,
        r#"
timeout_secs = 5

[factcheck]
api_key = "literal-key"

[commentary]
api_key = ""
model = "gpt-4o"

[translate]
endpoint = "http://localhost:5001/translate"
"#,
    )
    .unwrap();

    let cfg = EngineConfig::load_from_file(&p).unwrap();
    assert_eq!(cfg.factcheck.api_key.as_deref(), Some("literal-key"));
    assert!(!cfg.commentary.is_configured());
    assert_eq!(cfg.commentary.model, "gpt-4o");
    assert!(cfg.translate.is_configured());
    assert_eq!(cfg.timeout_secs, 5);
}

#[test]
fn unreadable_or_invalid_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(EngineConfig::load_from_file(&dir.path().join("missing.toml")).is_err());

    let p = dir.path().join("bad.json");
    fs::write(&p, r#"{"timeout_secs": "soon"}"#).unwrap();
    assert!(EngineConfig::load_from_file(&p).is_err());
}

#[serial_test::serial]
#[test]
fn env_sentinel_reads_variable() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("truthlens.json");
    fs::write(
        &p,
        r#"{"factcheck": {"api_key": "ENV"}, "commentary": {"api_key": "env"}}"#,
    )
    .unwrap();

    // sentinel with the variable unset -> absent, not "ENV"
    let cfg = EngineConfig::load_from_file(&p).unwrap();
    assert!(cfg.factcheck.api_key.is_none());
    assert!(cfg.commentary.api_key.is_none());

    env::set_var("FACTCHECK_API_KEY", "fc-from-env");
    env::set_var("GENAI_API_KEY", "genai-from-env");
    let cfg = EngineConfig::load_from_file(&p).unwrap();
    assert_eq!(cfg.factcheck.api_key.as_deref(), Some("fc-from-env"));
    assert_eq!(cfg.commentary.api_key.as_deref(), Some("genai-from-env"));
    clear_env();
}

#[serial_test::serial]
#[test]
fn default_uses_env_path_then_file_then_env() {
    clear_env();
    // Isolate CWD so the repo's own config/ is not read
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    // 1) Nothing at all -> plain env (all unconfigured)
    let cfg = EngineConfig::load_default().unwrap();
    assert!(!cfg.factcheck.is_configured());
    assert!(!cfg.translate.is_configured());
    assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);

    // 2) Plain env vars
    env::set_var("TRANSLATE_ENDPOINT", "http://127.0.0.1:1/t");
    env::set_var("TRUTHLENS_TIMEOUT_SECS", "3");
    let cfg = EngineConfig::load_default().unwrap();
    assert!(cfg.translate.is_configured());
    assert_eq!(cfg.timeout_secs, 3);
    env::remove_var("TRANSLATE_ENDPOINT");
    env::remove_var("TRUTHLENS_TIMEOUT_SECS");

    // 3) Fallback file in ./config/
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/truthlens.toml"),
        "[commentary]\nmodel = \"from-file\"\n",
    )
    .unwrap();
    let cfg = EngineConfig::load_default().unwrap();
    assert_eq!(cfg.commentary.model, "from-file");

    // 4) Explicit path wins; a dangling one is an error
    let p_env = tmp.path().join("other.toml");
    fs::write(&p_env, "[commentary]\nmodel = \"from-env-path\"\n").unwrap();
    env::set_var("TRUTHLENS_CONFIG_PATH", p_env.display().to_string());
    let cfg = EngineConfig::load_default().unwrap();
    assert_eq!(cfg.commentary.model, "from-env-path");

    env::set_var("TRUTHLENS_CONFIG_PATH", tmp.path().join("nope.toml").display().to_string());
    assert!(EngineConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}
