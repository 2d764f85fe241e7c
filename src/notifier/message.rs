//! Alert message rendering.
//!
//! Messages use Slack mrkdwn (`*bold*`, `` `code` ``). [`render_plain`] strips the
//! markup for log lines.

use chrono::{DateTime, Utc};

use crate::alerting::{AlertDetails, AlertIntent};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn format_time(at: &DateTime<Utc>) -> String {
    at.format(TIME_FORMAT).to_string()
}

fn format_duration(since: DateTime<Utc>, until: DateTime<Utc>) -> String {
    let secs = (until - since).num_seconds().max(0);
    let (hours, rem) = (secs / 3600, secs % 3600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Render an alert as a Slack mrkdwn message.
pub fn render(alert: &AlertIntent) -> String {
    let time = format_time(&alert.at);

    match &alert.details {
        AlertDetails::Failover { from, to, release } => {
            let mut message = format!(
                "🔄 *Failover Detected*\nFrom: `{}` → To: `{}`\n",
                from, to
            );
            if let Some(release) = release {
                message.push_str(&format!("Release: `{}`\n", release));
            }
            message.push_str(&format!(
                "Time: {}\nReason: Primary pool stopped serving traffic",
                time
            ));
            message
        }
        AlertDetails::HighErrorRate {
            error_rate_pct,
            threshold_pct,
            error_count,
            sample_count,
            heartbeat,
            active_pool,
        } => {
            let title = if *heartbeat {
                "⚠️ *High Error Rate Ongoing*"
            } else {
                "⚠️ *High Error Rate Alert*"
            };
            format!(
                "{}\nCurrent Rate: `{:.1}%` (Threshold: {}%)\nErrors: {}/{} requests\nActive Pool: `{}`\nTime: {}\nAction: Check upstream logs and consider manual intervention",
                title,
                error_rate_pct,
                threshold_pct,
                error_count,
                sample_count,
                active_pool.as_deref().unwrap_or("unknown"),
                time
            )
        }
        AlertDetails::Recovery {
            error_rate_pct,
            threshold_pct,
            sample_count,
            degraded_since,
        } => {
            let mut message = format!(
                "✅ *Error Rate Recovered*\nCurrent Rate: `{:.1}%` (Threshold: {}%) over {} requests\n",
                error_rate_pct, threshold_pct, sample_count
            );
            if let Some(since) = degraded_since {
                message.push_str(&format!(
                    "Degraded For: {}\n",
                    format_duration(*since, alert.at)
                ));
            }
            message.push_str(&format!("Time: {}", time));
            message
        }
    }
}

/// Render without mrkdwn markup, on a single line.
pub fn render_plain(alert: &AlertIntent) -> String {
    render(alert)
        .replace(['*', '`'], "")
        .replace('\n', " | ")
}
