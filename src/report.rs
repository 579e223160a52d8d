//! Console reporting for probe outcomes

use crate::proxy::ProbeOutcome;
use crossterm::style::Stylize;
use tokio::sync::mpsc;

/// Colored per-result line: green for working, red for failed
pub fn result_line(outcome: &ProbeOutcome) -> String {
    let line = outcome.summary();
    if outcome.is_working() {
        line.green().to_string()
    } else {
        line.red().to_string()
    }
}

/// Final report block listing the working proxies with their latency
pub fn final_report(outcomes: &[ProbeOutcome]) -> String {
    let working: Vec<&ProbeOutcome> = outcomes.iter().filter(|o| o.is_working()).collect();

    if working.is_empty() {
        return "No working proxies found.".to_string();
    }

    let mut lines = vec!["Working Proxies:".to_string()];
    for outcome in working {
        if let Some(secs) = outcome.latency_secs() {
            lines.push(format!(
                "{} {} - Ping: {:.2}s",
                outcome.endpoint.proxy_type.label(),
                outcome.endpoint.address(),
                secs
            ));
        }
    }
    lines.join("\n")
}

/// Drain the outcome stream, printing each result as it arrives, then print
/// the final report. Returns the collected batch.
pub async fn run_console(mut rx: mpsc::UnboundedReceiver<ProbeOutcome>) -> Vec<ProbeOutcome> {
    let mut outcomes = Vec::new();

    while let Some(outcome) = rx.recv().await {
        println!("{}", result_line(&outcome));
        outcomes.push(outcome);
    }

    println!();
    println!("{}", final_report(&outcomes));

    outcomes
}
