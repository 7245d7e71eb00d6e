use std::collections::{BTreeMap, HashMap, HashSet};

use clap::Parser;
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use crosschat_bot::client::Client;
use crosschat_bot::monitor::{ChannelMonitor, Handlers, Update};
use crosschat_bot::sse::{EventStream, Record};
use crosschat_crossword::Status;

/// Watches crosschat APIs and follows the channels they host
#[derive(Debug, Parser)]
#[command(name = "crosschat-bot")]
struct Args {
    /// Base URLs of the APIs whose channel feeds to watch
    #[arg(
        long = "api",
        env = "CROSSCHAT_APIS",
        value_delimiter = ',',
        default_value = "http://localhost:5000"
    )]
    apis: Vec<String>,
}

/// The `{"kind": …, "payload": …}` envelope of every stream event
#[derive(Debug, Deserialize)]
struct Envelope {
    kind: String,
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChannelRow {
    name: String,
    status: Status,
}

type ChannelsPayload = BTreeMap<String, Vec<ChannelRow>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let apis: Vec<String> = args
        .apis
        .iter()
        .map(|api| api.trim_end_matches('/').to_string())
        .collect();

    let monitor = ChannelMonitor::new(logging_handlers());
    let http = reqwest::Client::new();

    // One snapshot up front; the live view arrives through the feeds
    for api in &apis {
        let client = Client::new(http.clone(), api.clone());
        match client.active_channels().await {
            Ok(channels) => tracing::info!(%api, ?channels, "initial channel list"),
            Err(err) => tracing::warn!(%api, error = %err, "cannot list channels"),
        }
    }

    let (records_tx, mut records) = mpsc::channel::<(String, Record)>(64);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    for api in &apis {
        let stream = EventStream::new(http.clone(), format!("{api}/channels"));
        let (tx, mut rx) = mpsc::channel(16);
        tokio::spawn(stream.run(tx, shutdown_rx.clone()));

        let records_tx = records_tx.clone();
        let api = api.clone();
        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                if records_tx.send((api.clone(), record)).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(records_tx);

    // Latest snapshot per API; the monitor always sees the whole union
    let mut snapshots: HashMap<String, Vec<Update>> = HashMap::new();
    let mut followers: HashMap<(String, String), watch::Sender<bool>> = HashMap::new();

    loop {
        tokio::select! {
            record = records.recv() => {
                let Some((api, record)) = record else { break };

                match parse_updates(&record) {
                    Ok(Some(updates)) => {
                        follow_changes(&http, &mut followers, &api, &snapshots, &updates);

                        snapshots.insert(api, updates);
                        let merged = snapshots.values().flatten().cloned().collect();
                        monitor.update(merged);
                    }
                    Ok(None) => {}
                    Err(err) => {
                        tracing::warn!(%api, error = %err, "cannot parse channel event");
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                let _ = shutdown_tx.send(true);

                for (_, stop) in followers.drain() {
                    let _ = stop.send(true);
                }

                break;
            }
        }
    }

    Ok(())
}

/// Extract the update rows of a `channels` event; other kinds yield nothing
fn parse_updates(record: &Record) -> Result<Option<Vec<Update>>, serde_json::Error> {
    let envelope: Envelope = serde_json::from_str(&record.data)?;
    if envelope.kind != "channels" {
        return Ok(None);
    }

    let payload: ChannelsPayload = serde_json::from_value(envelope.payload)?;

    let updates = payload
        .into_iter()
        .flat_map(|(application_id, rows)| {
            rows.into_iter().map(move |row| Update {
                application_id: application_id.clone(),
                channel: row.name,
                status: row.status,
            })
        })
        .collect();

    Ok(Some(updates))
}

/// Open an event reader for every channel the API starts hosting and stop
/// the reader of every channel it drops
fn follow_changes(
    http: &reqwest::Client,
    followers: &mut HashMap<(String, String), watch::Sender<bool>>,
    api: &str,
    snapshots: &HashMap<String, Vec<Update>>,
    updates: &[Update],
) {
    let previous: HashSet<String> = snapshots
        .get(api)
        .map(|updates| updates.iter().map(|update| update.channel.clone()).collect())
        .unwrap_or_default();
    let next: HashSet<String> = updates.iter().map(|update| update.channel.clone()).collect();

    for channel in next.difference(&previous) {
        let (stop_tx, stop_rx) = watch::channel(false);
        followers.insert((api.to_string(), channel.clone()), stop_tx);

        let url = format!("{api}/crossword/{channel}/events");
        let (tx, mut rx) = mpsc::channel(16);
        tokio::spawn(EventStream::new(http.clone(), url).run(tx, stop_rx));

        let channel = channel.clone();
        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                match serde_json::from_str::<Envelope>(&record.data) {
                    Ok(envelope) => {
                        tracing::info!(%channel, kind = %envelope.kind, "channel event");
                    }
                    Err(err) => {
                        tracing::warn!(%channel, error = %err, "cannot parse channel event");
                    }
                }
            }
        });
    }

    for channel in previous.difference(&next) {
        if let Some(stop) = followers.remove(&(api.to_string(), channel.clone())) {
            let _ = stop.send(true);
        }
    }
}

fn logging_handlers() -> Handlers {
    Handlers {
        on_channel_added: Some(Box::new(|channel| {
            tracing::info!(channel, "channel added");
        })),
        on_channel_removed: Some(Box::new(|channel| {
            tracing::info!(channel, "channel removed");
        })),
        on_integration_added: Some(Box::new(|application, channel, status| {
            tracing::info!(application, channel, %status, "integration added");
        })),
        on_integration_removed: Some(Box::new(|application, channel| {
            tracing::info!(application, channel, "integration removed");
        })),
        on_integration_updated: Some(Box::new(|application, channel, old, new| {
            tracing::info!(application, channel, %old, %new, "integration updated");
        })),
    }
}
