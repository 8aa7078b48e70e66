// tests/throttle_property.rs

use proptest::prelude::*;
use watchrun::engine::FileEvent;
use watchrun::runner::RunnerConfig;
use watchrun_test_utils::HarnessBuilder;

/// Reference model: an attempt at time `t` is accepted iff no accepted
/// attempt happened in `(t - throttle, t]`. Each accepted attempt spawns
/// exactly `delay` later.
fn expected_spawn_times(times: &[u64], throttle: u64, delay: u64) -> Vec<u64> {
    let mut last: Option<u64> = None;
    let mut spawns = Vec::new();
    for &t in times {
        if last.is_none_or(|l| t - l >= throttle) {
            last = Some(t);
            spawns.push(t + delay);
        }
    }
    spawns
}

proptest! {
    #[test]
    fn burst_of_changes_follows_throttle_model(
        gaps in proptest::collection::vec(0u64..400, 1..30),
        throttle in 0u64..800,
        delay in 0u64..300,
    ) {
        let h = HarnessBuilder::new()
            .runner(
                RunnerConfig::new()
                    .name("probe")
                    .startup(false)
                    .pattern("**/*.css")
                    .throttle_ms(throttle)
                    .delay_ms(delay)
                    .run(["probe"]),
            )
            .build();

        let mut times = Vec::new();
        let mut now = 0;
        let mut observed = Vec::new();
        let mut seen = 0;

        for gap in gaps {
            // Step 1ms at a time so each spawn gets an exact timestamp.
            for _ in 0..gap {
                h.timers.advance_ms(1);
                now += 1;
                while h.spawner.count() > seen {
                    observed.push(now);
                    seen += 1;
                }
            }
            times.push(now);
            h.engine.on_file_event(&FileEvent::change("styles/site.css"));
            // Zero-delay launches fire on the next advance of 0ms.
            h.timers.advance_ms(0);
            while h.spawner.count() > seen {
                observed.push(now);
                seen += 1;
            }
        }

        for _ in 0..(delay + throttle + 1) {
            h.timers.advance_ms(1);
            now += 1;
            while h.spawner.count() > seen {
                observed.push(now);
                seen += 1;
            }
        }

        prop_assert_eq!(observed, expected_spawn_times(&times, throttle, delay));
        prop_assert!(h.engine.executor().throttles().is_empty());
        prop_assert_eq!(h.engine.executor().in_flight().count(), 0);
    }
}
