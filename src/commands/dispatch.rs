//! Detection, delivery and interception commands.

use std::process::ExitCode;

use anyhow::Result;
use flamingo_bridge::media;
use flamingo_bridge::{BridgeService, DownloadEvent, InterceptOutcome, Request, Response};

use super::print_json;

pub fn run_detect_command(url: &str, content_type: &str) -> ExitCode {
    match media::detect(url, content_type) {
        Some(reason) => {
            println!("media ({reason})");
            ExitCode::SUCCESS
        }
        None => {
            println!("not media");
            ExitCode::FAILURE
        }
    }
}

pub async fn run_send_command(
    service: &BridgeService,
    url: &str,
    save_dir: Option<&str>,
) -> Result<ExitCode> {
    let response = service
        .handle(Request::SendMediaCandidate {
            url: url.to_string(),
            save_dir: save_dir.map(str::to_string),
        })
        .await;
    report(&response)
}

pub async fn run_ping_command(service: &BridgeService) -> Result<ExitCode> {
    let response = service.handle(Request::PingBridge).await;
    report(&response)
}

pub async fn run_intercept_command(service: &BridgeService, url: &str, id: i64) -> Result<ExitCode> {
    let outcome = service
        .on_download_created(&DownloadEvent::new(id, url))
        .await;
    match &outcome {
        InterceptOutcome::Success { task_id } => match task_id {
            Some(task_id) => println!("intercepted (task {task_id})"),
            None => println!("intercepted"),
        },
        InterceptOutcome::Skipped(reason) => println!("skipped: {reason}"),
        InterceptOutcome::Failed(message) => println!("failed: {message}"),
    }
    Ok(if matches!(outcome, InterceptOutcome::Failed(_)) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn report(response: &Response) -> Result<ExitCode> {
    print_json(response)?;
    Ok(if response.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
