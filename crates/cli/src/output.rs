//! Human-readable command output (stdout)

use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use thunder_forge_core::application::{FabricnetReport, LocalHostsReport, StopOutcome};
use thunder_forge_core::domain::ClusterStatus;

fn mark(up: bool) -> &'static str {
    if up {
        "✓"
    } else {
        "✗"
    }
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Node")]
    name: String,
    #[tabled(rename = "Mgmt IP")]
    mgmt_ip: String,
    #[tabled(rename = "SSH")]
    mgmt_ssh: &'static str,
    #[tabled(rename = "Ollama")]
    mgmt_ollama: &'static str,
    #[tabled(rename = "Fabric IP")]
    fabric_ip: String,
    #[tabled(rename = "SSH (fabric)")]
    fabric_ssh: &'static str,
    #[tabled(rename = "Ollama (fabric)")]
    fabric_ollama: &'static str,
}

pub fn status_table(status: &ClusterStatus) -> String {
    let rows: Vec<NodeRow> = status
        .nodes
        .iter()
        .map(|n| NodeRow {
            name: n.name.clone(),
            mgmt_ip: n.mgmt_ip.clone(),
            mgmt_ssh: mark(n.mgmt.ssh),
            mgmt_ollama: mark(n.mgmt.ollama),
            fabric_ip: n.fabric_ip.clone().unwrap_or_else(|| "-".to_string()),
            fabric_ssh: mark(n.fabric.ssh),
            fabric_ollama: mark(n.fabric.ollama),
        })
        .collect();

    let up = status.nodes.iter().filter(|n| n.mgmt.is_up()).count();
    let summary = format!("{}/{} nodes fully reachable on mgmt", up, status.nodes.len());
    let summary = if up == status.nodes.len() {
        summary.as_str().green().bold()
    } else {
        summary.as_str().yellow().bold()
    };

    format!(
        "{}\n{}",
        Table::new(rows).with(Style::rounded()),
        summary
    )
}

pub fn fabricnet_report(report: &FabricnetReport) -> String {
    let mut lines = vec![format!(
        "{} Configured fabricnet on {}/{} node(s): {}",
        "✓".green(),
        report.configured.len(),
        report.total,
        report.configured.join(", ")
    )];

    for check in &report.reachability {
        let endpoint = format!("{}:{}", check.address, check.port);
        if check.reachable {
            lines.push(format!("  {} {} reachable at {}", "✓".green(), check.node, endpoint));
        } else {
            lines.push(format!("  {} {} NOT reachable at {}", "✗".red(), check.node, endpoint));
        }
    }

    let unreachable = report.unreachable();
    if !unreachable.is_empty() {
        lines.push(format!(
            "{} Fabric address unreachable from hub for: {}",
            "✗".red().bold(),
            unreachable.join(", ")
        ));
        lines.push("What to check:".to_string());
        lines.push("- Is the Thunderbolt cable connected and the bridge up on both ends?".to_string());
        lines.push("- Does the hub have an address in the same fabric subnet?".to_string());
    }
    lines.join("\n")
}

pub fn stop_outcome(port: u16, outcome: &StopOutcome) -> String {
    match outcome {
        StopOutcome::NothingToStop => format!("Nothing to stop on port {}", port),
        StopOutcome::Stopped {
            signalled,
            force_killed,
        } => {
            let mut text = format!(
                "{} Stopped {} process(es) on port {}: {}",
                "✓".green(),
                signalled.len(),
                port,
                join_pids(signalled)
            );
            if !force_killed.is_empty() {
                text.push_str(&format!("\n  force-killed: {}", join_pids(force_killed)));
            }
            text
        }
    }
}

fn join_pids(pids: &[i32]) -> String {
    pids.iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn local_hosts(report: &LocalHostsReport, hosts_path: &str) -> String {
    let mut text = format!(
        "{} Wrote {} ({} entries)",
        "✓".green(),
        report.artifact.display(),
        report.entries
    );
    if report.hosts_updated {
        text.push_str(&format!("\n{} Updated {}", "✓".green(), hosts_path));
    } else {
        text.push_str(&format!("\n{} already up to date", hosts_path));
    }
    text
}
