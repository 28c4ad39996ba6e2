//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    apps: CheckResult,
    gemini: CheckResult,
    facebook: CheckResult,
    instagram: CheckResult,
    twitter: CheckResult,
    bluesky: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

fn env_is_set(env_name: &str) -> bool {
    std::env::var(env_name).is_ok_and(|v| !v.is_empty())
}

fn check_env_backed(
    enabled: bool,
    what: &str,
    requirements: &[(&str, &str)],
) -> CheckResult {
    if !enabled {
        return CheckResult::warn(format!("{what} is disabled"));
    }

    let missing: Vec<&str> = requirements
        .iter()
        .filter(|(_, env)| !env_is_set(env))
        .map(|(_, env)| *env)
        .collect();

    if missing.is_empty() {
        CheckResult::ok(format!("{what} credentials present"))
    } else {
        CheckResult::error(format!(
            "{what} is enabled but missing: {}",
            missing.join(", ")
        ))
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        apps: CheckResult::error("Not checked"),
        gemini: CheckResult::error("Not checked"),
        facebook: CheckResult::error("Not checked"),
        instagram: CheckResult::error("Not checked"),
        twitter: CheckResult::error("Not checked"),
        bluesky: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.apps = if config.apps.is_empty() {
            CheckResult::warn("No app templates configured under [apps.<id>]")
        } else {
            let ids: Vec<&str> = config.apps.keys().map(String::as_str).collect();
            CheckResult::ok(format!("App templates: {}", ids.join(", ")))
        };

        report.gemini = if env_is_set(&config.gemini.api_key_env) {
            CheckResult::ok(format!(
                "Gemini key present ({})",
                config.gemini.api_key_env
            ))
        } else {
            CheckResult::error(format!(
                "{} is not set; generation will fail",
                config.gemini.api_key_env
            ))
        };

        report.facebook = check_env_backed(
            config.facebook.enabled,
            "Facebook",
            &[("access token", &config.facebook.access_token_env)],
        );

        let mut instagram_requirements =
            vec![("access token", config.instagram.access_token_env.as_str())];
        instagram_requirements.push(("imagekit key", config.imagekit.private_key_env.as_str()));
        report.instagram = check_env_backed(
            config.instagram.enabled,
            "Instagram",
            &instagram_requirements,
        );

        report.twitter = check_env_backed(
            config.twitter.enabled,
            "Twitter",
            &[
                ("api key", &config.twitter.api_key_env),
                ("api key secret", &config.twitter.api_key_secret_env),
                ("access token", &config.twitter.access_token_env),
                (
                    "access token secret",
                    &config.twitter.access_token_secret_env,
                ),
                ("bearer token", &config.twitter.bearer_token_env),
            ],
        );

        report.bluesky = check_env_backed(
            config.bluesky.enabled,
            "Bluesky",
            &[
                ("handle", &config.bluesky.handle_env),
                ("password", &config.bluesky.password_env),
            ],
        );
    }

    let checks = [
        &report.config,
        &report.apps,
        &report.gemini,
        &report.facebook,
        &report.instagram,
        &report.twitter,
        &report.bluesky,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(report: &DoctorReport) {
    println!("ad-poster doctor");
    println!("================");
    print_check("config", &report.config);
    print_check("apps", &report.apps);
    print_check("gemini", &report.gemini);
    print_check("facebook", &report.facebook);
    print_check("instagram", &report.instagram);
    print_check("twitter", &report.twitter);
    print_check("bluesky", &report.bluesky);
    println!();
    println!("Overall: {}", report.overall);
}

fn print_check(name: &str, check: &CheckResult) {
    let marker = match check.status.as_str() {
        "ok" => "ok  ",
        "warn" => "warn",
        _ => "ERR ",
    };
    println!("[{marker}] {name}: {}", check.message);
}
