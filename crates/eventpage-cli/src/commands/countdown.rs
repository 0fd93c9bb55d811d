use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use eventpage_core::countdown::CountdownTicker;
use eventpage_core::error::Result;
use eventpage_core::{compute_breakdown, parse_end_time, Config, Event, TimeBreakdown};
use serde_json::json;

#[derive(Subcommand)]
pub enum CountdownAction {
    /// Print the time left until an end date
    Show {
        /// End date (ISO-8601)
        #[arg(long)]
        end: String,
        /// Evaluate at this instant instead of the current time
        #[arg(long)]
        now: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Tick until the end date is reached
    Watch {
        /// End date (ISO-8601)
        #[arg(long)]
        end: String,
        /// Tick interval; defaults to countdown.tick_interval_ms
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

pub fn render(breakdown: &TimeBreakdown) -> String {
    if breakdown.ended {
        "ended".to_string()
    } else {
        breakdown.display().to_string()
    }
}

pub fn run(action: CountdownAction) -> Result<()> {
    match action {
        CountdownAction::Show { end, now, json } => {
            let end = parse_end_time(&end)?;
            let now: DateTime<Utc> = match now {
                Some(now) => parse_end_time(&now)?,
                None => Utc::now(),
            };
            let breakdown = compute_breakdown(end, now);
            if json {
                let out = json!({
                    "end": end,
                    "now": now,
                    "breakdown": breakdown,
                    "display": breakdown.display(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", render(&breakdown));
            }
        }
        CountdownAction::Watch { end, interval_ms } => {
            let end = parse_end_time(&end)?;
            let interval = match interval_ms {
                Some(ms) => Duration::from_millis(ms.max(1)),
                None => Config::load_or_default().tick_interval(),
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(watch(CountdownTicker::with_interval(end, interval)));
        }
    }
    Ok(())
}

async fn watch(mut ticker: CountdownTicker) {
    tracing::info!(
        end = %ticker.end(),
        interval_ms = ticker.interval().as_millis() as u64,
        "watching countdown"
    );
    if let Some(Event::CountdownStarted { breakdown, .. }) = ticker.start(Utc::now()) {
        println!("{}", render(&breakdown));
        if breakdown.ended {
            ticker.stop(Utc::now());
            return;
        }
    }

    let mut interval = tokio::time::interval(ticker.interval());
    // The first tick of a tokio interval completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        match ticker.tick(Utc::now()) {
            Some(Event::CountdownTick { breakdown, .. }) => println!("{}", render(&breakdown)),
            Some(Event::CountdownEnded { .. }) | None => {
                println!("ended");
                break;
            }
            Some(_) => {}
        }
    }
    ticker.stop(Utc::now());
}
