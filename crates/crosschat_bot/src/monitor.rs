//! Live view of which channels are being solved where
//!
//! The monitor receives full snapshots of `(application, channel, status)`
//! rows and reduces consecutive snapshots to set differences: channels
//! appearing or disappearing across all applications, and per-application
//! rows appearing, disappearing or changing status. Each difference fires
//! its callback; the five phases run in a fixed order, synchronously, under
//! the monitor lock, so handlers must be quick and must not call back in.

use std::collections::{BTreeSet, HashMap, HashSet};

use crosschat_crossword::Status;
use parking_lot::Mutex;

/// One observed row: an application hosting a channel in some status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub application_id: String,
    pub channel: String,
    pub status: Status,
}

impl Update {
    pub fn new(application_id: &str, channel: &str, status: Status) -> Self {
        Self {
            application_id: application_id.to_string(),
            channel: channel.to_string(),
            status,
        }
    }
}

/// The capability record of monitor callbacks; unset slots are skipped
#[derive(Default)]
pub struct Handlers {
    pub on_channel_added: Option<Box<dyn Fn(&str) + Send + Sync>>,
    pub on_channel_removed: Option<Box<dyn Fn(&str) + Send + Sync>>,
    pub on_integration_added: Option<Box<dyn Fn(&str, &str, Status) + Send + Sync>>,
    pub on_integration_removed: Option<Box<dyn Fn(&str, &str) + Send + Sync>>,
    pub on_integration_updated: Option<Box<dyn Fn(&str, &str, Status, Status) + Send + Sync>>,
}

pub struct ChannelMonitor {
    handlers: Handlers,
    current: Mutex<Vec<Update>>,
}

impl ChannelMonitor {
    pub fn new(handlers: Handlers) -> Self {
        Self {
            handlers,
            current: Mutex::new(Vec::new()),
        }
    }

    /// Replace the current snapshot, firing the differences on the way:
    /// channel additions, channel removals, then integration additions,
    /// removals and status updates.
    pub fn update(&self, updates: Vec<Update>) {
        let mut current = self.current.lock();

        let added = added_channels(&current, &updates);
        let removed = added_channels(&updates, &current);
        let changes = changed_integrations(&current, &updates);

        if let Some(on_added) = &self.handlers.on_channel_added {
            for channel in &added {
                on_added(channel);
            }
        }

        if let Some(on_removed) = &self.handlers.on_channel_removed {
            for channel in &removed {
                on_removed(channel);
            }
        }

        if let Some(on_added) = &self.handlers.on_integration_added {
            for update in &changes.added {
                on_added(&update.application_id, &update.channel, update.status);
            }
        }

        if let Some(on_removed) = &self.handlers.on_integration_removed {
            for (application_id, channel) in &changes.removed {
                on_removed(application_id, channel);
            }
        }

        if let Some(on_updated) = &self.handlers.on_integration_updated {
            for (before, after) in &changes.updated {
                on_updated(
                    &after.application_id,
                    &after.channel,
                    before.status,
                    after.status,
                );
            }
        }

        *current = updates;
    }

    /// The union of channel names across every application
    pub fn channels(&self) -> BTreeSet<String> {
        self.current
            .lock()
            .iter()
            .map(|update| update.channel.clone())
            .collect()
    }
}

/// Channels named in `after` that no update of `before` names, regardless
/// of application
fn added_channels(before: &[Update], after: &[Update]) -> Vec<String> {
    let known: HashSet<&str> = before.iter().map(|update| update.channel.as_str()).collect();

    let mut added: Vec<String> = after
        .iter()
        .filter(|update| !known.contains(update.channel.as_str()))
        .map(|update| update.channel.clone())
        .collect();

    added.sort();
    added.dedup();
    added
}

struct IntegrationChanges {
    added: Vec<Update>,
    removed: Vec<(String, String)>,
    updated: Vec<(Update, Update)>,
}

/// Partition `(application, channel)` rows into added, removed and
/// status-changed sets
fn changed_integrations(before: &[Update], after: &[Update]) -> IntegrationChanges {
    let key = |update: &Update| (update.application_id.clone(), update.channel.clone());

    let before_map: HashMap<_, &Update> =
        before.iter().map(|update| (key(update), update)).collect();
    let after_map: HashMap<_, &Update> = after.iter().map(|update| (key(update), update)).collect();

    let mut added: Vec<Update> = after
        .iter()
        .filter(|update| !before_map.contains_key(&key(update)))
        .cloned()
        .collect();
    added.sort_by(|a, b| key(a).cmp(&key(b)));

    let mut removed: Vec<(String, String)> = before
        .iter()
        .filter(|update| !after_map.contains_key(&key(update)))
        .map(|update| key(update))
        .collect();
    removed.sort();

    let mut updated: Vec<(Update, Update)> = before
        .iter()
        .filter_map(|previous| {
            let next = after_map.get(&key(previous))?;
            (previous.status != next.status).then(|| (previous.clone(), (*next).clone()))
        })
        .collect();
    updated.sort_by(|(a, _), (b, _)| key(a).cmp(&key(b)));

    IntegrationChanges {
        added,
        removed,
        updated,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Monitor whose callbacks append readable entries to a shared log
    fn recording_monitor() -> (ChannelMonitor, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));

        let push = |log: &Arc<Mutex<Vec<String>>>| {
            let log = Arc::clone(log);
            move |entry: String| log.lock().push(entry)
        };

        let handlers = Handlers {
            on_channel_added: Some(Box::new({
                let push = push(&log);
                move |channel| push(format!("+channel {channel}"))
            })),
            on_channel_removed: Some(Box::new({
                let push = push(&log);
                move |channel| push(format!("-channel {channel}"))
            })),
            on_integration_added: Some(Box::new({
                let push = push(&log);
                move |app, channel, status| push(format!("+{app}/{channel} {status}"))
            })),
            on_integration_removed: Some(Box::new({
                let push = push(&log);
                move |app, channel| push(format!("-{app}/{channel}"))
            })),
            on_integration_updated: Some(Box::new({
                let push = push(&log);
                move |app, channel, old, new| push(format!("~{app}/{channel} {old}->{new}"))
            })),
        };

        (ChannelMonitor::new(handlers), log)
    }

    fn drain(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        std::mem::take(&mut *log.lock())
    }

    #[test]
    fn first_snapshot_adds_everything() {
        let (monitor, log) = recording_monitor();

        monitor.update(vec![
            Update::new("crossword", "gopher", Status::Created),
            Update::new("spellingbee", "gopher", Status::Solving),
            Update::new("crossword", "ferret", Status::Solving),
        ]);

        assert_eq!(
            drain(&log),
            vec![
                "+channel ferret",
                "+channel gopher",
                "+crossword/ferret solving",
                "+crossword/gopher created",
                "+spellingbee/gopher solving",
            ]
        );

        assert_eq!(
            monitor.channels(),
            BTreeSet::from(["ferret".to_string(), "gopher".to_string()])
        );
    }

    #[test]
    fn channels_are_shared_across_applications() {
        let (monitor, log) = recording_monitor();

        monitor.update(vec![
            Update::new("crossword", "gopher", Status::Solving),
            Update::new("spellingbee", "gopher", Status::Solving),
        ]);
        drain(&log);

        // Dropping one application's row is not a channel removal
        monitor.update(vec![Update::new("crossword", "gopher", Status::Solving)]);

        assert_eq!(drain(&log), vec!["-spellingbee/gopher"]);
    }

    #[test]
    fn status_changes_fire_updates() {
        let (monitor, log) = recording_monitor();

        monitor.update(vec![Update::new("crossword", "gopher", Status::Created)]);
        drain(&log);

        monitor.update(vec![Update::new("crossword", "gopher", Status::Solving)]);

        assert_eq!(drain(&log), vec!["~crossword/gopher created->solving"]);
    }

    #[test]
    fn removals_fire_both_phases_in_order() {
        let (monitor, log) = recording_monitor();

        monitor.update(vec![
            Update::new("crossword", "gopher", Status::Solving),
            Update::new("crossword", "ferret", Status::Solving),
        ]);
        drain(&log);

        monitor.update(vec![Update::new("crossword", "ferret", Status::Solving)]);

        assert_eq!(drain(&log), vec!["-channel gopher", "-crossword/gopher"]);
        assert_eq!(monitor.channels(), BTreeSet::from(["ferret".to_string()]));
    }

    #[test]
    fn unchanged_snapshots_fire_nothing() {
        let (monitor, log) = recording_monitor();

        let snapshot = vec![Update::new("crossword", "gopher", Status::Solving)];
        monitor.update(snapshot.clone());
        drain(&log);

        monitor.update(snapshot);
        assert!(drain(&log).is_empty());
    }

    #[test]
    fn mixed_changes_keep_the_phase_order() {
        let (monitor, log) = recording_monitor();

        monitor.update(vec![
            Update::new("crossword", "old", Status::Solving),
            Update::new("crossword", "kept", Status::Created),
        ]);
        drain(&log);

        monitor.update(vec![
            Update::new("crossword", "kept", Status::Solving),
            Update::new("crossword", "new", Status::Created),
        ]);

        assert_eq!(
            drain(&log),
            vec![
                "+channel new",
                "-channel old",
                "+crossword/new created",
                "-crossword/old",
                "~crossword/kept created->solving",
            ]
        );
    }
}
