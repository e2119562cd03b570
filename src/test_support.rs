use crate::process::ProcessInspector;
use std::collections::HashMap;

/// A scripted process table for tests.
///
/// Pids registered via `with_process` count as running with the given
/// command line; every other pid counts as not running, including the test
/// process itself (coordinators under test then fall back to `env::args`
/// for their own identity, which is stable within one test run).
pub(crate) struct FakeInspector {
    table: HashMap<u32, Vec<String>>,
}

impl FakeInspector {
    pub(crate) fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub(crate) fn with_process(mut self, pid: u32, cmd: &[&str]) -> Self {
        self.table
            .insert(pid, cmd.iter().map(|s| s.to_string()).collect());
        self
    }
}

impl ProcessInspector for FakeInspector {
    fn cmdline(&self, pid: u32) -> Option<Vec<String>> {
        self.table.get(&pid).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_pids_are_running() {
        let inspector = FakeInspector::new().with_process(4242, &["python", "run_job.py"]);

        assert!(inspector.is_running(4242));
        assert_eq!(
            inspector.cmdline(4242),
            Some(vec!["python".to_string(), "run_job.py".to_string()])
        );
    }

    #[test]
    fn unknown_pids_are_dead() {
        let inspector = FakeInspector::new();
        assert!(!inspector.is_running(4242));
        assert!(inspector.cmdline(4242).is_none());
    }
}
