// tests/composition_props.rs

use proptest::prelude::*;

use assetpipe::dag::{Registry, Target, parallel, series, task};
use assetpipe_test_utils::{EventLog, ProjectFixture, RecordingTask};

fn run_target(registry: Registry, name: &str) {
    let project = ProjectFixture::new();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime
        .block_on(project.runner_with(registry).run(name))
        .unwrap();
}

fn step_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("step_{i}")).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// However long each step takes, a series never starts step i+1 before
    /// step i has ended.
    #[test]
    fn series_preserves_completion_order(delays in proptest::collection::vec(0u64..8, 1..6)) {
        let log = EventLog::new();
        let names = step_names(delays.len());
        let mut registry = Registry::new();
        for (name, ms) in names.iter().zip(&delays) {
            registry.register_task(name.as_str(), RecordingTask::new(name, &log).millis(*ms));
        }
        registry.register_target("all", series(names.iter().map(|n| task(n.as_str()))));

        run_target(registry, "all");

        let expected: Vec<String> = names
            .iter()
            .flat_map(|n| [format!("start:{n}"), format!("end:{n}")])
            .collect();
        prop_assert_eq!(log.entries(), expected);
    }

    /// A parallel group completes only after every member has ended, and the
    /// step after it starts last.
    #[test]
    fn parallel_completes_after_all_members(delays in proptest::collection::vec(0u64..8, 1..6)) {
        let log = EventLog::new();
        let names = step_names(delays.len());
        let mut registry = Registry::new();
        for (name, ms) in names.iter().zip(&delays) {
            registry.register_task(name.as_str(), RecordingTask::new(name, &log).millis(*ms));
        }
        registry.register_task("tail", RecordingTask::new("tail", &log));
        let group: Target = parallel(names.iter().map(|n| task(n.as_str())));
        registry.register_target("all", series([group, task("tail")]));

        run_target(registry, "all");

        let entries = log.entries();
        let tail = entries.iter().position(|e| e == "start:tail").unwrap();
        for name in &names {
            let end = entries.iter().position(|e| *e == format!("end:{name}")).unwrap();
            prop_assert!(end < tail);
        }
    }
}
