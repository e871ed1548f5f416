use console::style;

use super::build_engine;
use super::commands::{CheckArgs, TextArgs, ValidateArgs};
use crate::config::parse_config;
use crate::errors::PhishGuardError;
use crate::models::{Subject, Verdict};

pub async fn handle_check(args: CheckArgs) -> Result<(), PhishGuardError> {
    let engine = build_engine(&args.common).await?;
    if !engine.scan_enabled() {
        println!("{}", style("scanning is disabled").yellow());
        return Ok(());
    }
    let verdict = engine.decide(&Subject::url(&args.url)).await;
    print_verdict(&args.url, &verdict);
    Ok(())
}

pub async fn handle_text(args: TextArgs) -> Result<(), PhishGuardError> {
    let content = if args.file == "-" {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)?;
        buffer
    } else {
        tokio::fs::read_to_string(&args.file).await?
    };

    let engine = build_engine(&args.common).await?;
    if !engine.scan_enabled() {
        println!("{}", style("scanning is disabled").yellow());
        return Ok(());
    }
    let subject = Subject::Text { content, source_url: args.source_url.clone() };
    let verdict = engine.decide(&subject).await;
    print_verdict(args.source_url.as_deref().unwrap_or(&args.file), &verdict);
    Ok(())
}

pub async fn handle_validate(args: ValidateArgs) -> Result<(), PhishGuardError> {
    let config = parse_config(std::path::Path::new(&args.config)).await?;
    println!(
        "{} {} (level: {}, reputation: {}, generative: {}, remote_ml: {})",
        style("valid").green().bold(),
        args.config,
        config.detection.level,
        config.signals.reputation.is_some(),
        config.signals.generative.is_some(),
        config.signals.remote_ml.is_some(),
    );
    Ok(())
}

pub fn print_verdict(subject: &str, verdict: &Verdict) {
    let label = if verdict.is_phishing {
        style("PHISHING").red().bold()
    } else {
        style("benign").green()
    };
    println!(
        "{}  {}  confidence {:.2} (threshold {:.2}, source: {})",
        label, subject, verdict.confidence, verdict.threshold_applied, verdict.source
    );
    if let Some(details) = &verdict.details {
        println!("  {}", style(details).dim());
    }
}
