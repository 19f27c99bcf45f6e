//! Background worker for remote calls.
//!
//! The store and the summary generator are moved onto one worker thread.
//! Requests are processed strictly in the order they were sent and each
//! produces exactly one [`SyncEvent`], which lets callers count outstanding
//! work and wait for it.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use thiserror::Error;

use crate::models::{DailyReport, Task};
use crate::store::{DocumentStore, StoreError};
use crate::summary::{SummaryError, SummaryGenerator};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    Summary(#[from] SummaryError),
    #[error("Failed to save report: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub enum SyncRequest {
    Load { generation: u64, date: String },
    SaveTask(Task),
    DeleteTask(String),
    GenerateReport { date: String, tasks: Vec<Task> },
}

#[derive(Debug)]
pub enum SyncEvent {
    Loaded {
        generation: u64,
        date: String,
        tasks: Result<Vec<Task>, StoreError>,
        report: Result<Option<DailyReport>, StoreError>,
    },
    TaskSaved {
        id: String,
        result: Result<(), StoreError>,
    },
    TaskDeleted {
        id: String,
        result: Result<(), StoreError>,
    },
    ReportGenerated {
        date: String,
        result: Result<DailyReport, ReportError>,
    },
}

pub struct SyncHandle {
    requests: Option<Sender<SyncRequest>>,
    events: Receiver<SyncEvent>,
    in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Start the worker thread that owns `store` and `generator`
    pub fn spawn<S>(store: S, generator: SummaryGenerator) -> std::io::Result<Self>
    where
        S: DocumentStore + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("worklog-sync".to_string())
            .spawn(move || run_worker(store, generator, request_rx, event_tx))?;

        Ok(Self {
            requests: Some(request_tx),
            events: event_rx,
            in_flight: 0,
            worker: Some(worker),
        })
    }

    /// Queue a request. Returns false if the worker has stopped.
    pub fn send(&mut self, request: SyncRequest) -> bool {
        let Some(sender) = &self.requests else {
            return false;
        };
        match sender.send(request) {
            Ok(()) => {
                self.in_flight += 1;
                true
            }
            Err(e) => {
                log::error!("event=sync_send status=error request={:?}", e.0);
                false
            }
        }
    }

    /// Next completed request, without blocking
    pub fn try_recv(&mut self) -> Option<SyncEvent> {
        match self.events.try_recv() {
            Ok(event) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.in_flight = 0;
                None
            }
        }
    }

    /// Next completed request, blocking. `None` once the worker is gone.
    pub fn recv(&mut self) -> Option<SyncEvent> {
        match self.events.recv() {
            Ok(event) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(event)
            }
            Err(_) => {
                self.in_flight = 0;
                None
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Close the request queue and wait for queued work to finish
    pub fn shutdown(&mut self) {
        self.requests = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("event=sync_shutdown status=error reason=worker_panicked");
            }
        }
    }
}

fn run_worker<S: DocumentStore>(
    store: S,
    generator: SummaryGenerator,
    requests: Receiver<SyncRequest>,
    events: Sender<SyncEvent>,
) {
    log::debug!("event=sync_worker status=started");
    for request in requests {
        let event = match request {
            SyncRequest::Load { generation, date } => SyncEvent::Loaded {
                generation,
                tasks: store.query_tasks_by_date(&date),
                report: store.get_report(&date),
                date,
            },
            SyncRequest::SaveTask(task) => SyncEvent::TaskSaved {
                result: store.set_task(&task),
                id: task.id,
            },
            SyncRequest::DeleteTask(id) => SyncEvent::TaskDeleted {
                result: store.delete_task(&id),
                id,
            },
            SyncRequest::GenerateReport { date, tasks } => SyncEvent::ReportGenerated {
                result: generate_and_store(&store, &generator, &date, &tasks),
                date,
            },
        };

        if events.send(event).is_err() {
            break;
        }
    }
    log::debug!("event=sync_worker status=stopped");
}

fn generate_and_store<S: DocumentStore>(
    store: &S,
    generator: &SummaryGenerator,
    date: &str,
    tasks: &[Task],
) -> Result<DailyReport, ReportError> {
    let summary = generator.generate_daily_summary(date, tasks)?;
    let report = DailyReport {
        date: date.to_string(),
        summary,
        generated_at: crate::models::now_millis(),
    };
    store.set_report(&report)?;
    Ok(report)
}
