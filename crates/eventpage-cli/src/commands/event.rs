use clap::Subcommand;
use eventpage_core::error::Result;
use eventpage_core::{
    compute_breakdown_now, ApiError, Config, CoreError, EntryPayload, EventClient, EventResponse,
};
use serde_json::json;

use super::countdown::render;

#[derive(Subcommand)]
pub enum EventAction {
    /// Fetch the current event and show its countdown
    Fetch {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Submit an entry for an event
    Submit {
        #[arg(long)]
        event_id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
        /// Consent to the privacy policy (required)
        #[arg(long)]
        agree_privacy: bool,
    },
}

fn client(config: &Config) -> Result<EventClient, ApiError> {
    let client = EventClient::new(&config.api_base_url(), config.api_timeout())?;
    tracing::debug!(base_url = %client.base_url(), "event backend");
    Ok(client)
}

fn print_event(event: &EventResponse) {
    println!("{}", event.title);
    if !event.description.is_empty() {
        println!("{}", event.description);
    }
    match event.end_time() {
        Ok(end) => println!("Ends {} ({})", end.to_rfc3339(), render(&compute_breakdown_now(end))),
        Err(e) => {
            tracing::warn!(error = %e, "event has an unusable end date");
            println!("Ends {} (countdown unavailable)", event.end_date);
        }
    }
    if !event.rewards.is_empty() {
        println!("Rewards:");
        for reward in &event.rewards {
            println!("  - {} ({})", reward.name, reward.image);
        }
    }
}

pub fn run(action: EventAction) -> Result<()> {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Runtime::new()?;

    match action {
        EventAction::Fetch { json } => {
            let client = client(&config)?;
            let event = runtime.block_on(client.fetch_event())?;
            if json {
                let breakdown = event.end_time().ok().map(compute_breakdown_now);
                let out = json!({ "event": event, "countdown": breakdown });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_event(&event);
            }
        }
        EventAction::Submit {
            event_id,
            name,
            phone,
            email,
            agree_privacy,
        } => {
            if !agree_privacy {
                return Err(CoreError::Custom("entries require --agree-privacy".into()));
            }
            if name.trim().is_empty() || phone.trim().is_empty() {
                return Err(CoreError::Custom("name and phone must not be empty".into()));
            }
            let payload = EntryPayload {
                event_id,
                name,
                phone,
                email,
                agree_privacy,
            };
            let client = client(&config)?;
            let reply = runtime.block_on(client.submit_entry(&payload))?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }
    Ok(())
}
