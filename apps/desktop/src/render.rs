use client_core::{tools::tools_in, SessionSnapshot, StatsSummary};
use shared::{
    domain::ToolCategory,
    protocol::{BatchItemError, SequenceOutput, ServiceInfo},
};

pub fn print_stats(summary: &StatsSummary) {
    println!("type:       {}", summary.sequence_type);
    println!("length:     {}", summary.length);
    if let Some(gc) = &summary.gc_content {
        println!("gc content: {gc}");
    }
    if let Some(weight) = &summary.molecular_weight {
        println!("mol weight: {weight}");
    }
    if summary.shares.is_empty() {
        return;
    }
    println!("composition:");
    for share in &summary.shares {
        println!("  {:<3} {:>8}  {:>5}%", share.symbol, share.count, share.percentage);
    }
}

pub fn print_output(output: &SequenceOutput) {
    match &output.sequence_id {
        Some(id) => println!(">{id}\n{}", output.result),
        None => println!("{}", output.result),
    }
}

pub fn print_batch_errors(errors: &[BatchItemError]) {
    for item in errors {
        eprintln!("{}: {}", item.sequence_id, item.error);
    }
}

pub fn print_service_info(info: &ServiceInfo) {
    println!("{} (version {})", info.message, info.version);
    if let Some(docs) = &info.docs {
        println!("docs: {docs}");
    }
    if !info.features.is_empty() {
        println!("features: {}", info.features.join(", "));
    }
}

pub fn print_tools() {
    for category in ToolCategory::ALL {
        println!("{}:", category.label());
        for tool in tools_in(category) {
            println!("  {:<20} {}", tool.id.as_str(), tool.description);
        }
    }
}

/// Status lines for whatever differs between two session snapshots.
pub fn change_lines(previous: &SessionSnapshot, current: &SessionSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    if previous.availability != current.availability {
        lines.push(format!("[backend {}]", current.availability));
    }
    if previous.loading != current.loading && current.loading {
        lines.push("[working...]".to_string());
    }
    if previous.failures != current.failures && !current.error.is_empty() {
        lines.push(format!("error: {}", current.error));
    }
    if previous.result != current.result && !current.result.is_empty() {
        lines.push(format!("result: {}", current.result));
    }
    lines
}

pub fn print_changes(previous: &SessionSnapshot, current: &SessionSnapshot) {
    for line in change_lines(previous, current) {
        println!("{line}");
    }
    if previous.stats != current.stats {
        if let Some(stats) = &current.stats {
            print_stats(&StatsSummary::from_stats(stats));
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
