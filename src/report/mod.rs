/*!
 * Reporting
 * Load-time briefing, the per-tick trace, and the state dump rendering
 */

use crate::sim::{Event, EventKind, ProcessScript, Snapshot};
use std::fmt;
use std::fmt::Write as _;

/// Legend printed before a run
#[must_use]
pub fn banner(policy_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Simulating {policy_name} scheduler");
    let _ = writeln!(out);
    let _ = writeln!(out, "****************************************************");
    let _ = writeln!(out, "   N: Forked");
    let _ = writeln!(out, "   X: Finished");
    let _ = writeln!(out, "   =: Blocked");
    let _ = writeln!(out, "  +n: Acquire resource n");
    let _ = writeln!(out, "  -n: Release resource n");
    out
}

/// One line per process describing what the script will do
#[must_use]
pub fn briefing(scripts: &[ProcessScript]) -> String {
    let mut out = String::new();
    for script in scripts {
        let _ = writeln!(
            out,
            "- Process {}: Forked at tick {} and run for {} tick{} with initial priority {}",
            script.pid,
            script.start,
            script.lifespan,
            if script.lifespan >= 2 { "s" } else { "" },
            script.priority,
        );
        for acquire in &script.acquires {
            let _ = writeln!(
                out,
                "    Acquire resource {} at {} for {}",
                acquire.resource, acquire.at, acquire.duration
            );
        }
    }
    out
}

/// Render the event stream as the column-aligned trace: one line per event,
/// tick prefix, four spaces of indent per pid
#[must_use]
pub fn render_trace(events: &[Event]) -> String {
    let mut out = String::new();
    for event in events {
        let _ = match event.kind {
            EventKind::Forked { pid } => line(&mut out, event, pid, "N".into()),
            EventKind::Finished { pid } => line(&mut out, event, pid, "X".into()),
            EventKind::Ran { pid } => line(&mut out, event, pid, pid.to_string()),
            EventKind::Blocked { pid } => line(&mut out, event, pid, "=".into()),
            EventKind::Acquired { pid, resource } => {
                line(&mut out, event, pid, format!("+{resource}"))
            }
            EventKind::Released { pid, resource } => {
                line(&mut out, event, pid, format!("-{resource}"))
            }
            EventKind::Idle => writeln!(out, "{:>3}: idle", event.tick),
        };
    }
    out
}

fn line(out: &mut String, event: &Event, pid: u32, marker: String) -> fmt::Result {
    writeln!(
        out,
        "{:>3}: {}{}",
        event.tick,
        " ".repeat(4 * pid as usize),
        marker
    )
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "***** CURRENT *********")?;
        if let Some(p) = &self.current {
            writeln!(
                f,
                "{:>2} ({}): {} + {}/{} at {}",
                p.pid,
                p.state.code(),
                p.starts_at,
                p.age,
                p.lifespan,
                p.priority
            )?;
        }

        writeln!(f, "***** READY QUEUE *****")?;
        for p in &self.ready {
            writeln!(
                f,
                "{:>2} ({}): {} + {}/{} at {}",
                p.pid,
                p.state.code(),
                p.starts_at,
                p.age,
                p.lifespan,
                p.priority
            )?;
        }

        writeln!(f, "***** RESOURCES *******")?;
        for r in &self.resources {
            match r.owner {
                Some(owner) => writeln!(f, "{:>2}: owned by {}", r.resource, owner)?,
                None => writeln!(f, "{:>2}: owned by no one", r.resource)?,
            }
            for waiter in &r.waiters {
                writeln!(f, "    {waiter} is waiting")?;
            }
        }
        Ok(())
    }
}
