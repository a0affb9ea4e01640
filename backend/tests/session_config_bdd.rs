//! Behaviour tests for session configuration toggles.
//!
//! Release builds must refuse missing toggles, ephemeral keys, short keys,
//! and `SameSite=None` without a secure cookie.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use mockable::MockEnv;
use parcel_backend::inbound::http::session_config::{
    ALLOW_EPHEMERAL_ENV, BuildMode, COOKIE_SECURE_ENV, KEY_FILE_ENV, SAMESITE_ENV,
    SessionConfigError, SessionSettings, session_settings_from_env,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use uuid::Uuid;

struct SessionConfigWorld {
    vars: RefCell<HashMap<String, String>>,
    mode: RefCell<BuildMode>,
    outcome: RefCell<Option<Result<SessionSettings, SessionConfigError>>>,
    key_files: RefCell<Vec<TempKeyFile>>,
}

impl SessionConfigWorld {
    fn new() -> Self {
        Self {
            vars: RefCell::new(HashMap::new()),
            mode: RefCell::new(BuildMode::Release),
            outcome: RefCell::new(None),
            key_files: RefCell::new(Vec::new()),
        }
    }

    fn set_env_var(&self, name: &str, value: &str) {
        self.vars
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    fn add_key_file(&self, len: usize) {
        let file = TempKeyFile::new(len).expect("key file creation should succeed");
        self.set_env_var(KEY_FILE_ENV, file.path_str());
        self.key_files.borrow_mut().push(file);
    }

    fn evaluate(&self) {
        let env = mock_env(self.vars.borrow().clone());
        let mode = *self.mode.borrow();
        *self.outcome.borrow_mut() = Some(session_settings_from_env(&env, mode));
    }

    fn with_settings(&self, check: impl FnOnce(&SessionSettings)) {
        let outcome = self.outcome.borrow();
        let settings = outcome
            .as_ref()
            .expect("evaluation result")
            .as_ref()
            .expect("expected settings to succeed");
        check(settings);
    }

    fn with_error(&self, check: impl FnOnce(&SessionConfigError)) {
        let outcome = self.outcome.borrow();
        match outcome.as_ref().expect("evaluation result") {
            Ok(_) => panic!("expected settings to fail"),
            Err(error) => check(error),
        }
    }
}

#[derive(Debug)]
struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    fn new(len: usize) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("parcel-session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len])?;
        Ok(Self { path })
    }

    fn path_str(&self) -> &str {
        self.path
            .to_str()
            .expect("temporary path should be valid UTF-8")
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn mock_env(vars: HashMap<String, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[fixture]
fn world() -> SessionConfigWorld {
    SessionConfigWorld::new()
}

#[given("a release build configuration")]
fn a_release_build_configuration(world: &SessionConfigWorld) {
    *world.mode.borrow_mut() = BuildMode::Release;
}

#[given("a debug build configuration")]
fn a_debug_build_configuration(world: &SessionConfigWorld) {
    *world.mode.borrow_mut() = BuildMode::Debug;
    world.set_env_var(KEY_FILE_ENV, "/nonexistent/parcel-session-key");
}

#[given("SESSION_COOKIE_SECURE is set to {value}")]
fn session_cookie_secure_is_set(world: &SessionConfigWorld, value: String) {
    world.set_env_var(COOKIE_SECURE_ENV, &value);
}

#[given("SESSION_SAMESITE is set to {value}")]
fn session_same_site_is_set(world: &SessionConfigWorld, value: String) {
    world.set_env_var(SAMESITE_ENV, &value);
}

#[given("SESSION_ALLOW_EPHEMERAL is set to {value}")]
fn session_allow_ephemeral_is_set(world: &SessionConfigWorld, value: String) {
    world.set_env_var(ALLOW_EPHEMERAL_ENV, &value);
}

#[given("a session key file with {len} bytes")]
fn a_session_key_file_with_bytes(world: &SessionConfigWorld, len: usize) {
    world.add_key_file(len);
}

#[when("the session configuration is loaded")]
fn the_session_configuration_is_loaded(world: &SessionConfigWorld) {
    world.evaluate();
}

#[then("the configuration load succeeds")]
fn the_configuration_load_succeeds(world: &SessionConfigWorld) {
    world.with_settings(|_| {});
}

#[then("the cookie secure flag is true")]
fn the_cookie_secure_flag_is_true(world: &SessionConfigWorld) {
    world.with_settings(|settings| assert!(settings.cookie_secure));
}

#[then("the SameSite policy is Strict")]
fn the_same_site_policy_is_strict(world: &SessionConfigWorld) {
    world.with_settings(|settings| {
        assert_eq!(settings.same_site, actix_web::cookie::SameSite::Strict);
    });
}

#[then("the SameSite policy is Lax")]
fn the_same_site_policy_is_lax(world: &SessionConfigWorld) {
    world.with_settings(|settings| {
        assert_eq!(settings.same_site, actix_web::cookie::SameSite::Lax);
    });
}

#[then("the configuration load fails due to missing SESSION_COOKIE_SECURE")]
fn configuration_fails_missing_cookie_secure(world: &SessionConfigWorld) {
    world.with_error(|error| {
        assert!(matches!(
            error,
            SessionConfigError::MissingEnv {
                name: COOKIE_SECURE_ENV
            }
        ));
    });
}

#[then("the configuration load fails because ephemeral keys are not allowed")]
fn configuration_fails_ephemeral_not_allowed(world: &SessionConfigWorld) {
    world.with_error(|error| assert!(matches!(error, SessionConfigError::EphemeralNotAllowed)));
}

#[then("the configuration load fails because SameSite=None requires secure cookies")]
fn configuration_fails_insecure_same_site_none(world: &SessionConfigWorld) {
    world.with_error(|error| assert!(matches!(error, SessionConfigError::InsecureSameSiteNone)));
}

#[then("the configuration load fails because the key is too short")]
fn configuration_fails_key_too_short(world: &SessionConfigWorld) {
    world.with_error(|error| assert!(matches!(error, SessionConfigError::KeyTooShort { .. })));
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Release build accepts explicit secure settings"
)]
fn release_build_accepts_explicit_secure_settings(world: SessionConfigWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Release build requires the cookie secure toggle"
)]
fn release_build_requires_the_cookie_secure_toggle(world: SessionConfigWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Release build rejects ephemeral keys"
)]
fn release_build_rejects_ephemeral_keys(world: SessionConfigWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Release build rejects SameSite None without secure cookies"
)]
fn release_build_rejects_same_site_none_without_secure_cookies(world: SessionConfigWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Release build rejects short keys"
)]
fn release_build_rejects_short_keys(world: SessionConfigWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Debug build falls back to lenient defaults"
)]
fn debug_build_falls_back_to_lenient_defaults(world: SessionConfigWorld) {
    drop(world);
}
