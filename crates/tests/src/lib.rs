//! # Integration Tests
//!
//! Cross-crate tests.
//!
//! - Contract tests: snapshot JSON shape
//! - End to end: aggregator -> broadcaster -> subscriber
//! - Plan version gate under concurrent writers

#[cfg(test)]
mod contract_tests {
    use contracts::{AggregateSnapshot, ConfigVersion};

    #[test]
    fn test_contracts_compile() {
        let _ = ConfigVersion::V1;
    }

    #[test]
    fn test_empty_snapshot_shape() {
        let json = serde_json::to_string(&AggregateSnapshot::default()).unwrap();
        assert_eq!(json, r#"{"num_subs":0,"Subs":[],"Events":[]}"#);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use aggregator::{ManualClock, TelemetryAggregator};
    use chrono::{TimeZone, Utc};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        PlanBlock, PlanHeader, PlanMessage, PlanPath, PlanStamp, Pose, PoseStamped, Position,
        Report, ReportPoint,
    };
    use dispatcher::Broadcaster;

    const T0: i64 = 1_700_000_000;

    fn header(sec: i64) -> Option<PlanHeader> {
        Some(PlanHeader {
            stamp: Some(PlanStamp::new(sec, 0)),
            frame_id: None,
        })
    }

    /// Block stamped `version` with one pose per x, one second apart from `start`
    fn block(version: i64, start: i64, xs: &[f64]) -> PlanBlock {
        let poses = xs
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                Some(PoseStamped {
                    header: header(start + i as i64),
                    pose: Some(Pose {
                        position: Some(Position { x, y: 0.0, z: 0.0 }),
                        orientation: None,
                    }),
                })
            })
            .collect();

        PlanBlock {
            header: header(version),
            paths: Some(vec![Some(PlanPath {
                header: None,
                poses: Some(poses),
            })]),
        }
    }

    fn clocked() -> (Arc<ManualClock>, TelemetryAggregator) {
        let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(T0, 0).unwrap()));
        let aggregator = TelemetryAggregator::with_clock(&Default::default(), clock.clone());
        (clock, aggregator)
    }

    fn snapshot_json(data: &str) -> serde_json::Value {
        serde_json::from_str(data).expect("pushed payload is JSON")
    }

    /// End-to-end: plan ingestion -> snapshot broadcast -> channel subscriber
    #[tokio::test]
    async fn test_e2e_plan_reaches_subscriber() {
        let (_clock, aggregator) = clocked();
        let broadcaster = Broadcaster::new();
        let mut subscription = broadcaster.subscribe_channel(8);

        let hello = subscription.recv().await.unwrap();
        assert!(hello.is_handshake());

        let outcome = aggregator.ingest_plan(&PlanMessage {
            mid_plan: Some(block(T0, T0 + 10, &[1.0, 2.0, 3.0])),
            ..Default::default()
        });
        assert!(outcome.changed());

        let report = broadcaster.broadcast(&aggregator.build_snapshot()).unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(report.pruned, 0);

        let event = subscription.recv().await.unwrap();
        assert!(!event.is_handshake());
        let pushed = snapshot_json(&event.data);
        assert_eq!(pushed["num_subs"], 1);
        assert_eq!(pushed["Subs"][0]["role"], "mid");
        assert_eq!(pushed["Subs"][0]["travel_plan"].as_array().unwrap().len(), 3);
        assert_eq!(
            pushed["Subs"][0]["travel_plan"][0]["timestamp"],
            (T0 + 10) * 1000
        );
    }

    /// A subscriber joining after a broadcast gets the cached snapshot only
    #[tokio::test]
    async fn test_e2e_late_joiner_gets_cached_snapshot() {
        let (_clock, aggregator) = clocked();
        let broadcaster = Broadcaster::new();

        aggregator.ingest_plan(&PlanMessage {
            sub1_plan: Some(block(T0, T0 + 5, &[4.0])),
            ..Default::default()
        });
        broadcaster.broadcast(&aggregator.build_snapshot()).unwrap();

        let mut late = broadcaster.subscribe_channel(8);
        assert!(late.recv().await.unwrap().is_handshake());

        let cached = late.recv().await.unwrap();
        assert_eq!(snapshot_json(&cached.data)["Subs"][0]["role"], "sub1");
        assert!(late.try_recv().is_none());
    }

    /// A stalled subscriber is pruned while a draining one keeps receiving
    #[tokio::test]
    async fn test_e2e_stalled_subscriber_is_pruned() {
        let (_clock, aggregator) = clocked();
        let broadcaster = Broadcaster::new();

        let mut healthy = broadcaster.subscribe_channel(8);
        let stalled = broadcaster.subscribe_channel(2);
        assert!(healthy.recv().await.unwrap().is_handshake());

        let mut pruned_total = 0;
        for round in 0..3 {
            aggregator.ingest_report(&Report {
                report_stats: Some([("alpha".to_string(), Some(round))].into()),
                sub0_role: Some("alpha".to_string()),
                sub0_plan: Some(vec![ReportPoint::new(
                    (T0 + 60 + round) as f64,
                    round as f64,
                    0.0,
                    0.0,
                )]),
                ..Default::default()
            });
            let report = broadcaster.broadcast(&aggregator.build_snapshot()).unwrap();
            pruned_total += report.pruned;

            let event = healthy.recv().await.unwrap();
            assert_eq!(
                snapshot_json(&event.data)["Subs"][0]["new_reports"],
                round
            );
        }

        // Handshake plus one snapshot fill the stalled queue; the next send fails
        assert_eq!(pruned_total, 1);
        assert!(!broadcaster.is_subscribed(stalled.id()));
        assert!(broadcaster.is_subscribed(healthy.id()));
        assert_eq!(broadcaster.subscriber_count(), 1);
    }

    /// Concurrent plan writers: only the newest version survives
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_concurrent_plans_keep_newest_version() {
        let (_clock, aggregator) = clocked();
        let aggregator = Arc::new(aggregator);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let aggregator = Arc::clone(&aggregator);
                tokio::spawn(async move {
                    aggregator.ingest_plan(&PlanMessage {
                        sub2_plan: Some(block(T0 + i, T0 + 100, &[i as f64])),
                        ..Default::default()
                    })
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(
            aggregator.plan_stamp("sub2"),
            Some(Utc.timestamp_opt(T0 + 15, 0).unwrap())
        );
        let points = aggregator.plan_points("sub2").unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].position.x, 15.0);
    }

    /// Configured window flows from TOML into the deviation estimator
    #[test]
    fn test_config_window_drives_deviation() {
        let blueprint = ConfigLoader::load_from_str(
            "[aggregation]\ndeviation_window_secs = 5.0\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(T0, 0).unwrap()));
        let aggregator = TelemetryAggregator::with_clock(&blueprint.aggregation, clock);
        assert_eq!(aggregator.window_secs(), 5.0);

        let now = (T0 + 100) as f64;
        let plan = vec![
            ReportPoint::new(now - 10.0, 0.0, 0.0, 0.0),
            ReportPoint::new(now - 1.0, 0.0, 0.0, 0.0),
        ];
        let history = vec![
            ReportPoint::new(now - 10.0, 100.0, 0.0, 0.0),
            ReportPoint::new(now - 1.0, 2.0, 0.0, 0.0),
        ];
        let report = Report {
            snapshot_sent_time: Some(now),
            sub0_role: Some("alpha".to_string()),
            sub0_plan: Some(plan),
            sub0_history: Some(history),
            ..Default::default()
        };

        aggregator.ingest_report(&report);
        assert_eq!(aggregator.apply_avg_deviation(&report), 1);

        // The point 10 s back falls outside the 5 s window
        assert_eq!(aggregator.avg_deviation("alpha"), Some(2.0));
    }
}
