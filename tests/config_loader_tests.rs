use hrsync::config::ConfigLoader;
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    unsafe {
        env::remove_var("HRSYNC_PROFILE");
        env::remove_var("HRSYNC_API_BIND_ADDR");
        env::remove_var("HRSYNC_LOG_LEVEL");
        env::remove_var("HRSYNC_OPERATOR_TOKEN");
        env::remove_var("HRSYNC_OPERATOR_TOKENS");
        env::remove_var("HRSYNC_WORKER_POLL_INTERVAL_SECONDS");
        env::remove_var("HRSYNC_WORKER_BATCH_SIZE");
        env::remove_var("HRSYNC_PROVIDER_BASE_URL");
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("HRSYNC_OPERATOR_TOKEN", "default-test-token");
    }

    let loader = ConfigLoader::with_base_dir(PathBuf::from(TempDir::new().unwrap().path()));
    let cfg = loader.load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.worker.poll_interval_seconds, 5);
    assert_eq!(cfg.worker.batch_size, 5);
    assert_eq!(cfg.worker.job_timeout_seconds, 300);
    assert_eq!(cfg.provider.request_timeout_seconds, 30);
    cfg.bind_addr().expect("default bind addr parses");
    clear_env();
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "HRSYNC_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.test",
        "HRSYNC_API_BIND_ADDR=192.168.0.10:5000\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "HRSYNC_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "HRSYNC_PROFILE=test\nHRSYNC_API_BIND_ADDR=127.0.0.1:4000\nHRSYNC_OPERATOR_TOKEN=test-token-for-layered-test\n",
    );

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    clear_env();
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "HRSYNC_API_BIND_ADDR=127.0.0.1:3000\nHRSYNC_OPERATOR_TOKEN=test-token-for-env-override\n",
    );

    unsafe {
        env::set_var("HRSYNC_API_BIND_ADDR", "0.0.0.0:9090");
    }

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with env override");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:9090");

    clear_env();
}

#[test]
fn operator_tokens_accepts_comma_separated_list() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "HRSYNC_OPERATOR_TOKENS=alpha, beta,gamma\n",
    );

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with token list");
    assert_eq!(cfg.operator_tokens, vec!["alpha", "beta", "gamma"]);

    clear_env();
}

#[test]
fn missing_operator_tokens_returns_error() {
    let _guard = env_guard();
    clear_env();

    let loader = ConfigLoader::with_base_dir(PathBuf::from(TempDir::new().unwrap().path()));
    let err = loader.load().expect_err("missing tokens should fail");
    assert!(format!("{}", err).contains("operator tokens"));

    clear_env();
}

#[test]
fn invalid_bind_addr_returns_error() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("HRSYNC_API_BIND_ADDR", "not-an-addr");
        env::set_var("HRSYNC_OPERATOR_TOKEN", "tok");
    }
    let loader = ConfigLoader::with_base_dir(PathBuf::from(TempDir::new().unwrap().path()));
    let err = loader.load().expect_err("invalid bind addr should fail");
    assert!(format!("{}", err).contains("invalid api bind address"));

    clear_env();
}

#[test]
fn worker_bounds_are_enforced() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "HRSYNC_OPERATOR_TOKEN=tok\nHRSYNC_WORKER_BATCH_SIZE=0\n",
    );

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("zero batch size should fail");
    assert!(format!("{}", err).contains("batch size"));

    clear_env();
}
