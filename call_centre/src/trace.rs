//! Per-event log of a run, in processing order

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceKind {
    Arrival,
    /// Joined the wait queue at this 1-based position
    Queued { position: usize },
    Assigned {
        server: usize,
        service_time: usize,
        end: usize,
    },
    Departure {
        server: usize,
        service_time: usize,
        wait: usize,
    },
}

impl TraceKind {
    pub fn label(&self) -> &'static str {
        match self {
            TraceKind::Arrival => "ARRIVAL",
            TraceKind::Queued { .. } => "QUEUED",
            TraceKind::Assigned { .. } => "ASSIGNED",
            TraceKind::Departure { .. } => "DEPARTURE",
        }
    }

    pub fn server(&self) -> Option<usize> {
        match *self {
            TraceKind::Assigned { server, .. } | TraceKind::Departure { server, .. } => {
                Some(server)
            }
            _ => None,
        }
    }

    pub fn service_time(&self) -> Option<usize> {
        match *self {
            TraceKind::Assigned { service_time, .. }
            | TraceKind::Departure { service_time, .. } => Some(service_time),
            _ => None,
        }
    }

    /// Short free-text detail column
    pub fn details(&self) -> String {
        match self {
            TraceKind::Arrival => String::new(),
            TraceKind::Queued { position } => format!("Pos={}", position),
            TraceKind::Assigned { end, .. } => format!("End={}", end),
            TraceKind::Departure { wait, .. } => format!("Wait={}", wait),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub minute: usize,
    pub customer_id: usize,
    #[serde(flatten)]
    pub kind: TraceKind,
}
