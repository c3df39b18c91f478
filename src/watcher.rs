use std::path::Path;
use std::sync::mpsc;

use log::*;
use notify::{Event, RecursiveMode, Watcher};

pub struct SourceChanges {
    #[expect(unused)]
    watcher: notify::RecommendedWatcher,
    receiver: mpsc::Receiver<notify::Result<Event>>,
}

impl SourceChanges {
    /// gathers all shader source edit events since this function was last called
    pub fn events(&mut self) -> anyhow::Result<Vec<notify::Event>> {
        let events: notify::Result<Vec<notify::Event>> = self.receiver.try_iter().collect();
        let mut events = events?;

        events.retain(is_edit);

        Ok(events)
    }

    /// blocks until at least one edit event arrives
    pub fn wait(&mut self) -> anyhow::Result<Vec<notify::Event>> {
        loop {
            let first = self.receiver.recv()??;

            let mut events = self.events()?;
            if is_edit(&first) {
                events.insert(0, first);
            }

            if !events.is_empty() {
                return Ok(events);
            }
        }
    }
}

fn is_edit(event: &notify::Event) -> bool {
    match event.kind {
        notify::EventKind::Create(_) => true,
        notify::EventKind::Modify(_) => true,
        notify::EventKind::Remove(_) => true,

        notify::EventKind::Access(_) => false,
        notify::EventKind::Any => {
            error!("unexpected notify event: {event:?}");
            false
        }
        notify::EventKind::Other => {
            error!("unexpected notify event: {event:?}");
            false
        }
    }
}

/// watches a shader file, or every file below a shader directory
pub fn watch(path: &Path) -> notify::Result<SourceChanges> {
    let (sender, receiver) = mpsc::channel::<notify::Result<Event>>();

    let mut watcher = notify::recommended_watcher(sender)?;
    watcher.watch(path, RecursiveMode::Recursive)?;

    Ok(SourceChanges { watcher, receiver })
}

