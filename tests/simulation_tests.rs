#[cfg(test)]
mod tests {
    use generator_engine::*;
    use proptest::prelude::*;

    const DT: f64 = 0.05;

    fn neutral_sim() -> GeneratorSimulation<FixedNoise> {
        GeneratorSimulation::with_noise(GeneratorConfig::default(), FixedNoise::neutral(), 1000.0, 620.0)
            .unwrap()
    }

    /// Point on dial `node`'s rim at `angle` radians.
    fn rim<N: NoiseSource>(sim: &GeneratorSimulation<N>, node: usize, angle: f64) -> Point {
        let c = sim.layout().dial_centers[node];
        let r = sim.layout().dial_radius;
        Point::new(c.x + r * angle.cos(), c.y + r * angle.sin())
    }

    /// Grab a dial at angle 0 and turn it so its value becomes `target`.
    fn drag_to<N: NoiseSource>(sim: &mut GeneratorSimulation<N>, node: usize, target: f64) -> Option<f64> {
        let start = sim.state().nodes[node].value;
        let angle = (target - start) / sim.config().input.sensitivity;
        sim.pointer_down(rim(sim, node, 0.0), &mut Silent)?;
        let p = rim(sim, node, angle);
        let v = sim.pointer_move(p, 0.0, &mut Silent);
        sim.pointer_up();
        v
    }

    fn recenter_active(state: &mut SimState) {
        for n in state.nodes.iter_mut().filter(|n| n.active) {
            n.value = 0.5;
        }
    }

    fn count(events: &[SimEvent], f: impl Fn(&SimEvent) -> bool) -> usize {
        events.iter().filter(|e| f(e)).count()
    }

    // ========== Activation ==========

    #[test]
    fn test_activation_follows_clock() {
        let mut sim = neutral_sim();
        let mut was_active = [true, false, false];
        while sim.state().elapsed < 20.0 {
            recenter_active(sim.state_mut());
            sim.tick(DT, &mut Silent, &mut Silent);
            let s = sim.state();
            assert!(s.nodes[0].active);
            assert_eq!(s.nodes[1].active, s.elapsed >= 6.0, "node 1 at t={}", s.elapsed);
            assert_eq!(s.nodes[2].active, s.elapsed >= 14.0, "node 2 at t={}", s.elapsed);
            for i in 0..NODE_COUNT {
                assert!(!was_active[i] || s.nodes[i].active, "node {} deactivated", i);
                was_active[i] = s.nodes[i].active;
            }
        }
        assert_eq!(sim.stats().cooldowns, 0);
    }

    // ========== Grace Period ==========

    #[test]
    fn test_grace_period_then_accumulation() {
        let mut sim = neutral_sim();
        let mut first_gain = None;
        while sim.state().elapsed < 5.0 {
            sim.tick(DT, &mut Silent, &mut Silent);
            let s = sim.state();
            if s.elapsed < 4.0 {
                assert_eq!(s.stability_time, 0.0, "accumulated during grace at t={}", s.elapsed);
            } else if first_gain.is_none() {
                first_gain = Some((s.elapsed, s.stability_time, s.aggregate_output));
            }
        }
        let (t, stability, aggregate) = first_gain.unwrap();
        assert!((4.0..4.0 + DT).contains(&t));
        assert!((0.35..=0.65).contains(&aggregate), "node 0 drifted out of band: {}", aggregate);
        assert!((stability - DT).abs() < 1e-12);
    }

    // ========== Stability & Completion ==========

    #[test]
    fn test_steady_play_completes_once() {
        let mut sim = neutral_sim();
        let mut cues = CueQueue::default();
        let mut host = CompletionLatch::default();
        let mut events = Vec::new();

        for _ in 0..1000 {
            recenter_active(sim.state_mut());
            let r = sim.tick(DT, &mut cues, &mut host);
            events.extend(r.events);
        }

        assert!(sim.is_completed());
        assert_eq!(sim.state().stability_time, 20.0);
        assert_eq!(count(&events, |e| matches!(e, SimEvent::Completed)), 1);
        assert_eq!(host.calls(), 1);
        assert_eq!(host.task_id(), Some(TASK_ID));

        let at = sim.stats().completed_at.unwrap();
        assert!((at - 24.0).abs() < 2.0 * DT, "completed at {}", at);

        let milestones: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::StabilityMilestone { fraction } => Some(*fraction),
                _ => None,
            })
            .collect();
        assert_eq!(milestones, vec![0.25, 0.5, 0.75]);
        let hits = cues.drain().into_iter().filter(|c| *c == Cue::Hit).count();
        assert_eq!(hits, 3);
        assert_eq!(sim.snapshot().phase, TaskPhase::Completed);
    }

    // ========== Surge Hysteresis ==========

    #[test]
    fn test_drag_below_threshold_surges_once() {
        let mut sim = neutral_sim();
        let sens = sim.config().input.sensitivity;
        let low = rim(&sim, 0, (0.1 - 0.5) / sens);

        assert_eq!(sim.pointer_down(rim(&sim, 0, 0.0), &mut Silent), Some(0));
        let mut events = Vec::new();
        let mut triggered_at = None;
        let mut ended_at = None;
        for _ in 0..60 {
            // player keeps holding the dial at 0.1
            let v = sim.pointer_move(low, 0.0, &mut Silent).unwrap();
            assert!((v - 0.1).abs() < 1e-9);
            let r = sim.tick(DT, &mut Silent, &mut Silent);
            for e in &r.events {
                match e {
                    SimEvent::SurgeTriggered { node: 0 } => triggered_at = Some(sim.state().elapsed),
                    SimEvent::SurgeEnded { node: 0 } => ended_at = Some(sim.state().elapsed),
                    _ => {}
                }
            }
            events.extend(r.events);
        }
        sim.pointer_up();

        assert_eq!(count(&events, |e| matches!(e, SimEvent::SurgeTriggered { .. })), 1);
        let duration = ended_at.unwrap() - triggered_at.unwrap();
        assert!((duration - 1.5).abs() <= DT + 1e-9, "surge lasted {}", duration);
        assert!(!sim.state().nodes[0].surge_armed);

        // climb above 0.40 to re-arm, then drop again
        drag_to(&mut sim, 0, 0.6).unwrap();
        sim.tick(DT, &mut Silent, &mut Silent);
        assert!(sim.state().nodes[0].surge_armed);

        drag_to(&mut sim, 0, 0.1).unwrap();
        let r = sim.tick(DT, &mut Silent, &mut Silent);
        assert!(r.events.contains(&SimEvent::SurgeTriggered { node: 0 }));
        assert_eq!(sim.stats().surges, 2);
    }

    // ========== Overload / Cooldown / Recovery ==========

    fn overload_at_30s(sim: &mut GeneratorSimulation<FixedNoise>) {
        let s = sim.state_mut();
        s.elapsed = 30.0;
        s.stability_time = 10.0;
        for n in s.nodes.iter_mut() {
            n.active = true;
            n.value = 0.9;
        }
    }

    #[test]
    fn test_forced_overload_cools_down_and_resets() {
        let mut sim = neutral_sim();
        let mut cues = CueQueue::default();
        overload_at_30s(&mut sim);

        let r = sim.tick(DT, &mut cues, &mut Silent);
        assert!(r.events.iter().any(|e| matches!(e, SimEvent::CooldownEntered { .. })));
        assert!(sim.state().cooldown.active);
        assert!((sim.state().stability_time - 9.0).abs() < 1e-12);
        assert_eq!(cues.drain(), vec![Cue::Miss]);
        assert_eq!(r.snapshot.phase, TaskPhase::Cooldown);
        assert_eq!(r.snapshot.cooldown_seconds, 3);
        assert!(r.snapshot.sparks.len() >= 25);

        let entered = sim.state().elapsed;
        let frozen = sim.state().nodes.clone();
        let mut frames = 0;
        while sim.state().cooldown.active {
            sim.tick(DT, &mut Silent, &mut Silent);
            frames += 1;
            assert!(frames <= 62, "cooldown never ended");
            if sim.state().cooldown.active {
                assert_eq!(sim.state().nodes, frozen, "values moved during cooldown");
            }
        }
        let waited = sim.state().elapsed - entered;
        assert!((waited - 3.0).abs() <= DT + 1e-9);
        assert!(sim.state().nodes.iter().all(|n| n.value == 0.5));
        assert_eq!(sim.snapshot().phase, TaskPhase::Recovery);
        assert!((sim.state().recovery_until - (sim.state().elapsed + 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_recovery_suppresses_surge_and_failure() {
        let mut sim = neutral_sim();
        overload_at_30s(&mut sim);
        while !sim.state().cooldown.active {
            sim.tick(DT, &mut Silent, &mut Silent);
        }
        while sim.state().cooldown.active {
            sim.tick(DT, &mut Silent, &mut Silent);
        }
        let until = sim.state().recovery_until;
        let stability = sim.state().stability_time;

        // synthetic input slams every dial into the red or the floor
        while sim.state().elapsed + DT < until - 1e-9 {
            let s = sim.state_mut();
            s.nodes[0].value = 0.1;
            s.nodes[1].value = 0.95;
            s.nodes[2].value = 0.95;
            let r = sim.tick(DT, &mut Silent, &mut Silent);
            assert!(r.events.is_empty(), "{:?} during recovery", r.events);
            assert!(!sim.state().cooldown.active);
        }
        assert_eq!(sim.state().stability_time, stability);

        // window closed: the same input now fails
        let mut failed = false;
        for _ in 0..3 {
            let s = sim.state_mut();
            s.nodes[0].value = 0.1;
            s.nodes[1].value = 0.95;
            s.nodes[2].value = 0.95;
            let r = sim.tick(DT, &mut Silent, &mut Silent);
            if r.events.iter().any(|e| matches!(e, SimEvent::CooldownEntered { .. })) {
                assert!(r.events.contains(&SimEvent::SurgeTriggered { node: 0 }));
                failed = true;
                break;
            }
        }
        assert!(failed);
        assert_eq!(sim.stats().cooldowns, 2);
    }

    #[test]
    fn test_drag_blocked_while_cooling_down() {
        let mut sim = neutral_sim();
        overload_at_30s(&mut sim);
        sim.tick(DT, &mut Silent, &mut Silent);
        assert!(sim.state().cooldown.active);
        assert_eq!(sim.pointer_down(rim(&sim, 0, 0.0), &mut Silent), None);
    }

    #[test]
    fn test_activation_continues_during_cooldown() {
        let mut sim = neutral_sim();
        while sim.state().elapsed < 4.5 {
            recenter_active(sim.state_mut());
            sim.tick(DT, &mut Silent, &mut Silent);
        }
        sim.state_mut().nodes[0].value = 0.9;
        sim.tick(DT, &mut Silent, &mut Silent);
        assert!(sim.state().cooldown.active);
        assert!(!sim.state().nodes[1].active);

        let mut events = Vec::new();
        while sim.state().elapsed < 6.5 {
            let r = sim.tick(DT, &mut Silent, &mut Silent);
            events.extend(r.events);
        }
        assert!(sim.state().cooldown.active, "cooldown ended early");
        assert!(sim.state().nodes[1].active, "node 1 still dormant at t={}", sim.state().elapsed);
        assert_eq!(sim.state().nodes[1].value, 0.5);
        assert_eq!(count(&events, |e| matches!(e, SimEvent::NodeActivated { node: 1 })), 1);
        assert!(!sim.state().nodes[2].active);

        while sim.state().cooldown.active {
            sim.tick(DT, &mut Silent, &mut Silent);
        }
        assert!(sim.state().nodes[..2].iter().all(|n| n.active && n.value == 0.5));
        assert_eq!(sim.snapshot().phase, TaskPhase::Recovery);
    }

    // ========== Resize ==========

    #[test]
    fn test_resize_keeps_drag_and_uses_new_centre() {
        let mut sim = neutral_sim();
        let sens = sim.config().input.sensitivity;
        let start = sim.state().nodes[0].value;
        assert_eq!(sim.pointer_down(rim(&sim, 0, 0.0), &mut Silent), Some(0));

        let old_centre = sim.layout().dial_centers[0];
        sim.resize(2000.0, 1240.0);
        assert_ne!(sim.layout().dial_centers[0], old_centre);
        assert_eq!(sim.dragging(), Some(0));

        let v = sim.pointer_move(rim(&sim, 0, 0.5), 0.0, &mut Silent).unwrap();
        assert_eq!(sim.dragging(), Some(0));
        assert!((v - (start + 0.5 * sens)).abs() < 1e-9, "value {}", v);
        assert_eq!(sim.state().nodes[0].value, v);

        let v = sim.pointer_move(rim(&sim, 0, -0.25), 0.0, &mut Silent).unwrap();
        assert!((v - (start - 0.25 * sens)).abs() < 1e-9, "value {}", v);
        sim.pointer_up();
        assert_eq!(sim.dragging(), None);
    }

    // ========== Seeded Replay ==========

    #[test]
    fn test_seeded_replay_is_identical() {
        let mut a = GeneratorSimulation::new(99, 1000.0, 620.0);
        let mut b = GeneratorSimulation::new(99, 1000.0, 620.0);
        for i in 0..600 {
            let ts = i as f64 * 16.0;
            let ra = a.frame(ts, &mut Silent, &mut Silent);
            let rb = b.frame(ts, &mut Silent, &mut Silent);
            assert_eq!(ra.events, rb.events);
        }
        assert_eq!(a.state(), b.state());

        let mut c = GeneratorSimulation::new(100, 1000.0, 620.0);
        for i in 0..600 {
            c.frame(i as f64 * 16.0, &mut Silent, &mut Silent);
        }
        assert_ne!(a.state().nodes[0].value, c.state().nodes[0].value);
    }

    #[test]
    fn test_config_overrides_from_json() {
        let cfg = GeneratorConfig::from_json(r#"{ "stability": { "goal": 5.0 } }"#).unwrap();
        assert_eq!(cfg.stability.goal, 5.0);
        assert_eq!(cfg.surge.duration, 1.5);
        let mut sim = GeneratorSimulation::with_noise(cfg, FixedNoise::neutral(), 1000.0, 620.0).unwrap();
        for _ in 0..400 {
            recenter_active(sim.state_mut());
            sim.tick(DT, &mut Silent, &mut Silent);
        }
        assert!(sim.is_completed());
        assert!(sim.stats().completed_at.unwrap() < 9.1);

        assert!(matches!(
            GeneratorConfig::from_json(r#"{ "cooldown": { "duration": -1.0 } }"#),
            Err(ConfigError::NotPositive { .. })
        ));
        let mut bad = GeneratorConfig::default();
        bad.zones.safe_min = 0.7;
        assert!(GeneratorSimulation::with_config(bad, 1, 100.0, 100.0).is_err());
    }

    // ========== Properties ==========

    #[derive(Debug, Clone)]
    enum Op {
        Tick(f64),
        Drag { node: usize, angle: f64 },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (-0.02f64..0.2).prop_map(Op::Tick),
            1 => (0usize..3, -3.1f64..3.1).prop_map(|(node, angle)| Op::Drag { node, angle }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_values_stay_on_rail(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..400)) {
            let mut sim = GeneratorSimulation::new(seed, 1000.0, 620.0);
            for op in ops {
                match op {
                    Op::Tick(dt) => {
                        sim.tick(dt, &mut Silent, &mut Silent);
                        for n in sim.state().nodes.iter() {
                            prop_assert!((0.02..=0.98).contains(&n.value), "value {}", n.value);
                        }
                        prop_assert!((0.0..=20.0).contains(&sim.state().stability_time));
                    }
                    Op::Drag { node, angle } => {
                        if sim.pointer_down(rim(&sim, node, 0.0), &mut Silent).is_some() {
                            let p = rim(&sim, node, angle);
                            if let Some(v) = sim.pointer_move(p, 0.0, &mut Silent) {
                                prop_assert!((0.0..=1.0).contains(&v));
                            }
                            sim.pointer_up();
                        }
                    }
                }
            }
        }

        #[test]
        fn prop_surge_needs_rearm(values in prop::collection::vec(0.0f64..1.0, 1..70)) {
            let mut sim = neutral_sim();
            let rearm = sim.config().surge.threshold + sim.config().surge.hysteresis;
            let mut armed = true;
            for v in values {
                sim.state_mut().nodes[0].value = v;
                let r = sim.tick(DT, &mut Silent, &mut Silent);
                if r.events.contains(&SimEvent::SurgeTriggered { node: 0 }) {
                    prop_assert!(armed, "second surge without climbing above {}", rearm);
                    armed = false;
                }
                if sim.state().nodes[0].value > rearm {
                    armed = true;
                }
            }
        }

        #[test]
        fn prop_penalty_shrinks_by_tenth(stability in 0.0f64..1e6) {
            let cfg = GeneratorConfig::default();
            let p = surge::penalize(stability, &cfg);
            prop_assert!(p >= 0.0);
            prop_assert!((p - stability * 0.9).abs() <= 1e-9 * stability.max(1.0));
        }
    }
}
